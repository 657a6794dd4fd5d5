//! Class-file decoding: header, constant pool, members and attributes, reduced
//! to the set of class names the class refers to.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::annotation::parse_annotations;
use crate::attribute::{Attribute, RUNTIME_VISIBLE_ANNOTATIONS, SOURCE_FILE};
use crate::class::{DecodedClass, DecodedClassBuilder};
use crate::constant_pool::{Constant, ConstantPool};
use crate::error::{DecodeError, DecodeResult};
use crate::filter::Filter;
use crate::member::Member;
use crate::reader::ByteReader;

pub const JAVA_MAGIC: u32 = 0xCAFE_BABE;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;

/// Called once for every class the decoder manages to build.
pub trait DecodeListener: Send + Sync {
    fn on_decoded(&self, class: &DecodedClass);
}

impl<F> DecodeListener for F
where
    F: Fn(&DecodedClass) + Send + Sync,
{
    fn on_decoded(&self, class: &DecodedClass) {
        self(class)
    }
}

#[derive(Clone, Default)]
pub struct ClassDecoder {
    filter: Filter,
    listeners: Vec<Arc<dyn DecodeListener>>,
}

impl std::fmt::Debug for ClassDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassDecoder")
            .field("filter", &self.filter)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ClassDecoder {
    pub fn new(filter: Filter, listeners: Vec<Arc<dyn DecodeListener>>) -> Self {
        Self { filter, listeners }
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn decode(&self, bytes: &[u8], origin: Option<&str>) -> DecodeResult<DecodedClass> {
        let mut reader = ByteReader::new(bytes);

        let magic = reader.read_u32()?;
        if magic != JAVA_MAGIC {
            return Err(DecodeError::NotAClassFile { magic });
        }
        let minor_version = reader.read_u16()?;
        let major_version = reader.read_u16()?;

        let pool = ConstantPool::read(&mut reader)?;

        let access_flags = reader.read_u16()?;
        let is_interface = access_flags & ACC_INTERFACE != 0;
        let is_abstract = access_flags & ACC_ABSTRACT != 0 && !is_interface;

        let this_class = reader.read_u16()?;
        let class_name = slashes_to_dots(pool.class_name(this_class)?);

        let mut raw_references: Vec<String> = Vec::new();

        let super_class = reader.read_u16()?;
        // Only java.lang.Object has no super class.
        if super_class != 0 {
            raw_references.push(pool.class_name(super_class)?.to_string());
        }

        let interfaces_count = reader.read_u16()?;
        for _ in 0..interfaces_count {
            let index = reader.read_u16()?;
            raw_references.push(pool.class_name(index)?.to_string());
        }

        let fields = Member::read_all(&mut reader, &pool)?;
        let methods = Member::read_all(&mut reader, &pool)?;
        for member in fields.iter().chain(methods.iter()) {
            raw_references.extend(member.types.iter().cloned());
        }

        let attributes = Attribute::read_all(&mut reader, &pool)?;
        let source_file = extract_source_file(&attributes, &pool)?;

        for (_, constant) in pool.entries() {
            if let Constant::Class { name_index } = constant {
                let name = pool.utf8(*name_index)?;
                if let Some(element) = array_element_class(name) {
                    raw_references.push(element.to_string());
                } else if !name.starts_with('[') {
                    raw_references.push(name.to_string());
                }
            }
        }

        let annotation_attributes = attributes
            .iter()
            .filter(|a| a.is(RUNTIME_VISIBLE_ANNOTATIONS))
            .chain(
                fields
                    .iter()
                    .chain(methods.iter())
                    .filter_map(|m| m.runtime_visible_annotations.as_ref()),
            );
        for attribute in annotation_attributes {
            for annotation in parse_annotations(&attribute.value)? {
                for type_index in annotation.type_indices() {
                    let descriptor = pool.utf8(type_index)?;
                    if let Some(name) = descriptor_class_name(descriptor) {
                        raw_references.push(name.to_string());
                    }
                }
            }
        }

        let references = raw_references
            .iter()
            .filter_map(|raw| normalize_reference(raw))
            .filter(|name| *name != class_name && self.filter.accept(name));

        let class = DecodedClassBuilder::new(class_name.clone())
            .version(minor_version, major_version)
            .maybe_source_file(source_file)
            .maybe_origin(origin.map(str::to_string))
            .is_abstract(is_abstract)
            .is_interface(is_interface)
            .references(references)
            .build();

        tracing::trace!(
            class = %class.name(),
            references = class.references().len(),
            "decoded class"
        );
        self.notify(&class);
        Ok(class)
    }

    fn notify(&self, class: &DecodedClass) {
        for listener in &self.listeners {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener.on_decoded(class)));
            if outcome.is_err() {
                tracing::warn!(class = %class.name(), "decode listener panicked; ignoring");
            }
        }
    }
}

fn extract_source_file(
    attributes: &[Attribute],
    pool: &ConstantPool,
) -> DecodeResult<Option<String>> {
    let Some(attribute) = attributes.iter().find(|a| a.is(SOURCE_FILE)) else {
        return Ok(None);
    };
    let &[b0, b1, ..] = attribute.value.as_slice() else {
        return Err(DecodeError::Truncated {
            offset: 0,
            needed: 2,
        });
    };
    let index = (b0 as u16) * 256 + b1 as u16;
    Ok(Some(pool.utf8(index)?.to_string()))
}

/// `Lcom/acme/Foo;` or `[[Lcom/acme/Foo;` to `com/acme/Foo;`; primitives and
/// `void` name no class.
fn descriptor_class_name(descriptor: &str) -> Option<&str> {
    descriptor
        .trim_start_matches('[')
        .strip_prefix('L')
        .filter(|rest| !rest.is_empty())
}

/// Element class of an array class constant such as `[Ljava/lang/String;`.
fn array_element_class(name: &str) -> Option<&str> {
    if name.starts_with('[') {
        descriptor_class_name(name)
    } else {
        None
    }
}

fn normalize_reference(raw: &str) -> Option<String> {
    let dotted = slashes_to_dots(raw.trim_end_matches(';'));
    if dotted.is_empty() { None } else { Some(dotted) }
}

fn slashes_to_dots(name: &str) -> String {
    name.replace('/', ".")
}
