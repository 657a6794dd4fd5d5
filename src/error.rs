use std::fmt;

/// Everything that can go wrong while turning one class-file stream into a
/// [`DecodedClass`](crate::class::DecodedClass).
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("not a class file: magic is {magic:#010x}, expected 0xcafebabe")]
    NotAClassFile { magic: u32 },

    #[error("malformed constant pool: unknown tag {tag} at index {index}")]
    MalformedConstantPool { index: u16, tag: u8 },

    #[error("invalid constant pool index: {index}")]
    InvalidConstantIndex { index: u16 },

    #[error("constant pool entry {index} is not a {expected} constant")]
    ConstantTypeMismatch { index: u16, expected: &'static str },

    #[error("annotation values nested deeper than {limit} at offset {offset}")]
    AnnotationTooDeep { offset: usize, limit: usize },

    #[error("unsupported archive entry: {name}")]
    UnsupportedArchiveEntry { name: String },

    #[error("truncated input: needed {needed} byte(s) at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    #[error("decoding panicked: {message}")]
    Panicked { message: String },

    #[error("unreadable input: {0}")]
    UnreadableInput(#[from] std::io::Error),
}

impl DecodeError {
    /// Whether the failure should be reported, as opposed to silently skipped.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, DecodeError::UnsupportedArchiveEntry { .. })
    }
}

pub type DecodeResult<T> = Result<T, DecodeError>;

/// A per-input failure, tagged with where the bytes came from.
#[derive(Debug)]
pub struct DecodeFailure {
    pub origin: String,
    pub error: DecodeError,
}

impl DecodeFailure {
    pub fn new(origin: impl Into<String>, error: DecodeError) -> Self {
        Self {
            origin: origin.into(),
            error,
        }
    }
}

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.origin, self.error)
    }
}

impl std::error::Error for DecodeFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_display_includes_origin_and_cause() {
        let failure = DecodeFailure::new("lib/app.jar", DecodeError::NotAClassFile { magic: 0 });
        let text = failure.to_string();
        assert!(text.starts_with("lib/app.jar: "));
        assert!(text.contains("0x00000000"));
    }

    #[test]
    fn unsupported_entries_are_not_fatal() {
        let skipped = DecodeError::UnsupportedArchiveEntry {
            name: "META-INF/MANIFEST.MF".to_string(),
        };
        assert!(!skipped.is_fatal());
        assert!(DecodeError::InvalidConstantIndex { index: 3 }.is_fatal());
    }
}
