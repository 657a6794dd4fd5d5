//! Constant pool decoding.
//!
//! The pool is 1-indexed. `Long` and `Double` entries occupy two slots and
//! the second one is never addressable; every later index depends on that.

use crate::error::{DecodeError, DecodeResult};
use crate::reader::ByteReader;

pub const CONSTANT_UTF8: u8 = 1;
pub const CONSTANT_INTEGER: u8 = 3;
pub const CONSTANT_FLOAT: u8 = 4;
pub const CONSTANT_LONG: u8 = 5;
pub const CONSTANT_DOUBLE: u8 = 6;
pub const CONSTANT_CLASS: u8 = 7;
pub const CONSTANT_STRING: u8 = 8;
pub const CONSTANT_FIELD_REF: u8 = 9;
pub const CONSTANT_METHOD_REF: u8 = 10;
pub const CONSTANT_INTERFACE_METHOD_REF: u8 = 11;
pub const CONSTANT_NAME_AND_TYPE: u8 = 12;
pub const CONSTANT_METHOD_HANDLE: u8 = 15;
pub const CONSTANT_METHOD_TYPE: u8 = 16;
pub const CONSTANT_DYNAMIC: u8 = 17;
pub const CONSTANT_INVOKE_DYNAMIC: u8 = 18;
pub const CONSTANT_MODULE: u8 = 19;
pub const CONSTANT_PACKAGE: u8 = 20;

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class {
        name_index: u16,
    },
    String {
        string_index: u16,
    },
    MethodType {
        descriptor_index: u16,
    },
    FieldRef {
        class_index: u16,
        name_and_type_index: u16,
    },
    MethodRef {
        class_index: u16,
        name_and_type_index: u16,
    },
    InterfaceMethodRef {
        class_index: u16,
        name_and_type_index: u16,
    },
    NameAndType {
        name_index: u16,
        descriptor_index: u16,
    },
    MethodHandle {
        kind: u8,
        reference_index: u16,
    },
    Dynamic {
        bootstrap_method_attr_index: u16,
        name_and_type_index: u16,
    },
    InvokeDynamic {
        bootstrap_method_attr_index: u16,
        name_and_type_index: u16,
    },
    Module {
        name_index: u16,
    },
    Package {
        name_index: u16,
    },
}

impl Constant {
    pub fn tag(&self) -> u8 {
        match self {
            Constant::Utf8(_) => CONSTANT_UTF8,
            Constant::Integer(_) => CONSTANT_INTEGER,
            Constant::Float(_) => CONSTANT_FLOAT,
            Constant::Long(_) => CONSTANT_LONG,
            Constant::Double(_) => CONSTANT_DOUBLE,
            Constant::Class { .. } => CONSTANT_CLASS,
            Constant::String { .. } => CONSTANT_STRING,
            Constant::MethodType { .. } => CONSTANT_METHOD_TYPE,
            Constant::FieldRef { .. } => CONSTANT_FIELD_REF,
            Constant::MethodRef { .. } => CONSTANT_METHOD_REF,
            Constant::InterfaceMethodRef { .. } => CONSTANT_INTERFACE_METHOD_REF,
            Constant::NameAndType { .. } => CONSTANT_NAME_AND_TYPE,
            Constant::MethodHandle { .. } => CONSTANT_METHOD_HANDLE,
            Constant::Dynamic { .. } => CONSTANT_DYNAMIC,
            Constant::InvokeDynamic { .. } => CONSTANT_INVOKE_DYNAMIC,
            Constant::Module { .. } => CONSTANT_MODULE,
            Constant::Package { .. } => CONSTANT_PACKAGE,
        }
    }

    /// Eight-byte constants take up two pool slots.
    pub fn is_wide(&self) -> bool {
        matches!(self, Constant::Long(_) | Constant::Double(_))
    }

    fn read(reader: &mut ByteReader<'_>, index: u16) -> DecodeResult<Self> {
        let tag = reader.read_u8()?;
        let constant = match tag {
            CONSTANT_UTF8 => {
                let len = reader.read_u16()? as usize;
                Constant::Utf8(decode_modified_utf8(reader.read_bytes(len)?))
            }
            CONSTANT_INTEGER => Constant::Integer(reader.read_i32()?),
            CONSTANT_FLOAT => Constant::Float(reader.read_f32()?),
            CONSTANT_LONG => Constant::Long(reader.read_i64()?),
            CONSTANT_DOUBLE => Constant::Double(reader.read_f64()?),
            CONSTANT_CLASS => Constant::Class {
                name_index: reader.read_u16()?,
            },
            CONSTANT_STRING => Constant::String {
                string_index: reader.read_u16()?,
            },
            CONSTANT_METHOD_TYPE => Constant::MethodType {
                descriptor_index: reader.read_u16()?,
            },
            CONSTANT_FIELD_REF => Constant::FieldRef {
                class_index: reader.read_u16()?,
                name_and_type_index: reader.read_u16()?,
            },
            CONSTANT_METHOD_REF => Constant::MethodRef {
                class_index: reader.read_u16()?,
                name_and_type_index: reader.read_u16()?,
            },
            CONSTANT_INTERFACE_METHOD_REF => Constant::InterfaceMethodRef {
                class_index: reader.read_u16()?,
                name_and_type_index: reader.read_u16()?,
            },
            CONSTANT_NAME_AND_TYPE => Constant::NameAndType {
                name_index: reader.read_u16()?,
                descriptor_index: reader.read_u16()?,
            },
            CONSTANT_METHOD_HANDLE => Constant::MethodHandle {
                kind: reader.read_u8()?,
                reference_index: reader.read_u16()?,
            },
            CONSTANT_DYNAMIC => Constant::Dynamic {
                bootstrap_method_attr_index: reader.read_u16()?,
                name_and_type_index: reader.read_u16()?,
            },
            CONSTANT_INVOKE_DYNAMIC => Constant::InvokeDynamic {
                bootstrap_method_attr_index: reader.read_u16()?,
                name_and_type_index: reader.read_u16()?,
            },
            CONSTANT_MODULE => Constant::Module {
                name_index: reader.read_u16()?,
            },
            CONSTANT_PACKAGE => Constant::Package {
                name_index: reader.read_u16()?,
            },
            _ => return Err(DecodeError::MalformedConstantPool { index, tag }),
        };
        Ok(constant)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    slots: Vec<Option<Constant>>,
}

impl ConstantPool {
    /// Reads the pool-count field and every entry that follows it.
    pub fn read(reader: &mut ByteReader<'_>) -> DecodeResult<Self> {
        let count = reader.read_u16()? as usize;
        let mut slots: Vec<Option<Constant>> = vec![None; count];

        let mut index = 1usize;
        while index < count {
            // index < count <= u16::MAX, so the narrowing is lossless.
            let constant = Constant::read(reader, index as u16)?;
            let width = if constant.is_wide() { 2 } else { 1 };
            if index + width > count {
                return Err(DecodeError::MalformedConstantPool {
                    index: index as u16,
                    tag: constant.tag(),
                });
            }
            slots[index] = Some(constant);
            index += width;
        }

        Ok(Self { slots })
    }

    /// Declared pool count; valid indices lie in `1..size()`.
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn entry(&self, index: u16) -> DecodeResult<&Constant> {
        self.slots
            .get(index as usize)
            .and_then(Option::as_ref)
            .ok_or(DecodeError::InvalidConstantIndex { index })
    }

    pub fn utf8(&self, index: u16) -> DecodeResult<&str> {
        match self.entry(index)? {
            Constant::Utf8(value) => Ok(value),
            _ => Err(DecodeError::ConstantTypeMismatch {
                index,
                expected: "Utf8",
            }),
        }
    }

    /// Internal (slash-separated) name of a `Class` entry.
    pub fn class_name(&self, index: u16) -> DecodeResult<&str> {
        match self.entry(index)? {
            Constant::Class { name_index } => self.utf8(*name_index),
            _ => Err(DecodeError::ConstantTypeMismatch {
                index,
                expected: "Class",
            }),
        }
    }

    /// Live entries in index order; dead second slots are skipped.
    pub fn entries(&self) -> impl Iterator<Item = (u16, &Constant)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|c| (i as u16, c)))
    }
}

/// Decodes the class-file flavour of UTF-8 (two-byte NUL, surrogate pairs
/// encoded as separate three-byte sequences). Invalid input is replaced, not rejected.
fn decode_modified_utf8(bytes: &[u8]) -> String {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0usize;
    while i < bytes.len() {
        let b0 = bytes[i];
        if b0 & 0x80 == 0 {
            units.push(b0 as u16);
            i += 1;
        } else if b0 & 0xE0 == 0xC0 && i + 1 < bytes.len() {
            let b1 = bytes[i + 1];
            units.push((((b0 & 0x1F) as u16) << 6) | (b1 & 0x3F) as u16);
            i += 2;
        } else if b0 & 0xF0 == 0xE0 && i + 2 < bytes.len() {
            let b1 = bytes[i + 1];
            let b2 = bytes[i + 2];
            units.push(
                (((b0 & 0x0F) as u16) << 12) | (((b1 & 0x3F) as u16) << 6) | (b2 & 0x3F) as u16,
            );
            i += 3;
        } else {
            units.push(char::REPLACEMENT_CHARACTER as u16);
            i += 1;
        }
    }
    String::from_utf16_lossy(&units)
}
