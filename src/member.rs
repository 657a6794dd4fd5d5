use crate::attribute::{Attribute, RUNTIME_VISIBLE_ANNOTATIONS};
use crate::constant_pool::ConstantPool;
use crate::error::DecodeResult;
use crate::reader::ByteReader;

const CLASS_DESCRIPTOR: char = 'L';

/// One field or method record. Only lives as long as the class decode.
#[derive(Debug, Clone)]
pub struct Member {
    pub access_flags: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    /// Internal names pulled out of the descriptor.
    pub types: Vec<String>,
    pub runtime_visible_annotations: Option<Attribute>,
}

impl Member {
    pub fn read(reader: &mut ByteReader<'_>, pool: &ConstantPool) -> DecodeResult<Self> {
        let access_flags = reader.read_u16()?;
        let name_index = reader.read_u16()?;
        let descriptor_index = reader.read_u16()?;
        let types = descriptor_types(pool.utf8(descriptor_index)?);

        let mut runtime_visible_annotations = None;
        for attribute in Attribute::read_all(reader, pool)? {
            if attribute.is(RUNTIME_VISIBLE_ANNOTATIONS) {
                runtime_visible_annotations = Some(attribute);
            }
        }

        Ok(Self {
            access_flags,
            name_index,
            descriptor_index,
            types,
            runtime_visible_annotations,
        })
    }

    pub fn read_all(reader: &mut ByteReader<'_>, pool: &ConstantPool) -> DecodeResult<Vec<Self>> {
        let count = reader.read_u16()?;
        (0..count).map(|_| Member::read(reader, pool)).collect()
    }
}

/// Pulls reference type names out of a field or method descriptor.
///
/// This is a scan, not a grammar: the descriptor is split on `;` and whatever
/// follows the first `L` of each piece is taken as a name. `(ILjava/util/List;)V`
/// gives `java/util/List`. Fragments without an `L` contribute nothing.
pub fn descriptor_types(descriptor: &str) -> Vec<String> {
    descriptor
        .split(';')
        .filter_map(|fragment| {
            fragment
                .find(CLASS_DESCRIPTOR)
                .map(|pos| fragment[pos + 1..].to_string())
        })
        .collect()
}
