//! Big-endian cursor over an in-memory class-file image.

use crate::error::{DecodeError, DecodeResult};

#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn read_bytes(&mut self, len: usize) -> DecodeResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(DecodeError::Truncated {
                offset: self.offset,
                needed: len,
            });
        }
        let bytes = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    pub fn skip(&mut self, len: usize) -> DecodeResult<()> {
        self.read_bytes(len).map(|_| ())
    }

    pub fn read_u8(&mut self) -> DecodeResult<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> DecodeResult<u16> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn read_u32(&mut self) -> DecodeResult<u32> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_u64(&mut self) -> DecodeResult<u64> {
        let b = self.read_bytes(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(b);
        Ok(u64::from_be_bytes(buf))
    }

    pub fn read_i32(&mut self) -> DecodeResult<i32> {
        self.read_u32().map(|v| v as i32)
    }

    pub fn read_i64(&mut self) -> DecodeResult<i64> {
        self.read_u64().map(|v| v as i64)
    }

    pub fn read_f32(&mut self) -> DecodeResult<f32> {
        self.read_u32().map(f32::from_bits)
    }

    pub fn read_f64(&mut self) -> DecodeResult<f64> {
        self.read_u64().map(f64::from_bits)
    }
}
