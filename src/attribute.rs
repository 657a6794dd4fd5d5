use crate::constant_pool::ConstantPool;
use crate::error::DecodeResult;
use crate::reader::ByteReader;

pub const SOURCE_FILE: &str = "SourceFile";
pub const RUNTIME_VISIBLE_ANNOTATIONS: &str = "RuntimeVisibleAnnotations";

/// Name index reserved to mean "no name"; index 0 never addresses a constant.
const NO_NAME_INDEX: u16 = 0;

/// An attribute record with its payload left uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: Option<String>,
    pub value: Vec<u8>,
}

impl Attribute {
    pub fn read(reader: &mut ByteReader<'_>, pool: &ConstantPool) -> DecodeResult<Self> {
        let name_index = reader.read_u16()?;
        let name = if name_index == NO_NAME_INDEX {
            None
        } else {
            Some(pool.utf8(name_index)?.to_string())
        };
        let len = reader.read_u32()? as usize;
        let value = reader.read_bytes(len)?.to_vec();
        Ok(Self { name, value })
    }

    pub fn read_all(reader: &mut ByteReader<'_>, pool: &ConstantPool) -> DecodeResult<Vec<Self>> {
        let count = reader.read_u16()?;
        (0..count).map(|_| Attribute::read(reader, pool)).collect()
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }
}
