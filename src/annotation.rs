//! `RuntimeVisibleAnnotations` payload decoding.
//!
//! Only the parts of the element-value grammar that can name a type are
//! kept. Scalars are consumed and recorded without a type. Array values are
//! spliced into the enclosing sequence, so an [`Annotation`] never holds an
//! array node.

use crate::error::{DecodeError, DecodeResult};
use crate::reader::ByteReader;

const TAG_ENUM: u8 = b'e';
const TAG_CLASS: u8 = b'c';
const TAG_ANNOTATION: u8 = b'@';
const TAG_ARRAY: u8 = b'[';

/// Deepest run of nested arrays and annotations accepted in one payload.
pub const MAX_NESTING: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Pool index of the annotation's field descriptor, e.g. `Ljavax/inject/Named;`.
    pub type_index: u16,
    pub values: Vec<AnnotationValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationValue {
    Scalar { tag: u8, const_value_index: u16 },
    ClassLiteral { class_info_index: u16 },
    Enum { type_name_index: u16 },
    Nested(Annotation),
}

impl AnnotationValue {
    /// Pool index of the type this value names, if any.
    pub fn type_index(&self) -> Option<u16> {
        match self {
            AnnotationValue::Scalar { .. } => None,
            AnnotationValue::ClassLiteral { class_info_index } => Some(*class_info_index),
            AnnotationValue::Enum { type_name_index } => Some(*type_name_index),
            AnnotationValue::Nested(annotation) => Some(annotation.type_index),
        }
    }
}

impl Annotation {
    fn read(reader: &mut ByteReader<'_>, depth: usize) -> DecodeResult<Self> {
        let type_index = reader.read_u16()?;
        let mut values = Vec::new();
        read_values(reader, true, depth, &mut values)?;
        Ok(Self { type_index, values })
    }

    /// Every type index reachable from this annotation, its own type first.
    pub fn type_indices(&self) -> Vec<u16> {
        let mut out = Vec::new();
        self.collect_type_indices(&mut out);
        out
    }

    fn collect_type_indices(&self, out: &mut Vec<u16>) {
        out.push(self.type_index);
        for value in &self.values {
            match value {
                AnnotationValue::Nested(nested) => nested.collect_type_indices(out),
                other => out.extend(other.type_index()),
            }
        }
    }
}

/// Decodes a whole `RuntimeVisibleAnnotations` attribute payload.
pub fn parse_annotations(payload: &[u8]) -> DecodeResult<Vec<Annotation>> {
    let mut reader = ByteReader::new(payload);
    let count = reader.read_u16()?;
    (0..count).map(|_| Annotation::read(&mut reader, 0)).collect()
}

/// Reads a counted run of element values into `out`. Name/value pairs carry an
/// element-name index before each value; array elements do not.
fn read_values(
    reader: &mut ByteReader<'_>,
    named: bool,
    depth: usize,
    out: &mut Vec<AnnotationValue>,
) -> DecodeResult<()> {
    if depth > MAX_NESTING {
        return Err(DecodeError::AnnotationTooDeep {
            offset: reader.offset(),
            limit: MAX_NESTING,
        });
    }
    let count = reader.read_u16()?;
    for _ in 0..count {
        if named {
            reader.skip(2)?;
        }
        let tag = reader.read_u8()?;
        match tag {
            TAG_ENUM => {
                let type_name_index = reader.read_u16()?;
                reader.skip(2)?;
                out.push(AnnotationValue::Enum { type_name_index });
            }
            TAG_CLASS => out.push(AnnotationValue::ClassLiteral {
                class_info_index: reader.read_u16()?,
            }),
            TAG_ANNOTATION => {
                out.push(AnnotationValue::Nested(Annotation::read(reader, depth + 1)?))
            }
            TAG_ARRAY => read_values(reader, false, depth + 1, out)?,
            _ => out.push(AnnotationValue::Scalar {
                tag,
                const_value_index: reader.read_u16()?,
            }),
        }
    }
    Ok(())
}
