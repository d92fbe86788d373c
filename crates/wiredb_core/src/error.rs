//! Error types for WireDB core.

use std::io;

use thiserror::Error;
use wiredb_codec::CodecError;

use crate::kind::Kind;
use crate::transform::TransformError;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Which direction of the transformer failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformStage {
    /// Canonical bytes on their way to storage.
    Encode,
    /// Stored bytes on their way back to canonical form.
    Decode,
}

impl std::fmt::Display for TransformStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode => f.write_str("encode"),
            Self::Decode => f.write_str("decode"),
        }
    }
}

/// Errors that can occur in the record layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The value has no kind mapping and cannot be stored.
    #[error("unsupported data type: {description}")]
    UnsupportedType {
        /// Description of the rejected value.
        description: String,
    },

    /// Canonical serialization failed.
    #[error("encode error: {0}")]
    Encode(#[source] CodecError),

    /// Canonical deserialization failed.
    #[error("decode error: {0}")]
    Decode(#[source] CodecError),

    /// The content transformer failed.
    #[error("transformer {stage} failed: {source}")]
    Transform {
        /// Which direction failed.
        stage: TransformStage,
        /// Error reported by the transformer.
        #[source]
        source: TransformError,
    },

    /// A segment was asked to convert into a kind it does not hold.
    #[error("cannot convert {actual} segment to {requested}")]
    TypeConversion {
        /// Kind the caller asked for.
        requested: Kind,
        /// Kind recorded in the segment header.
        actual: Kind,
    },

    /// A record failed its checksum or has a malformed header.
    #[error("corrupt record{}: {message}", display_offset(.offset))]
    CorruptRecord {
        /// Stream offset of the record, when known.
        offset: Option<u64>,
        /// Description of the corruption.
        message: String,
    },

    /// Caller supplied an argument outside the configured limits.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem.
        message: String,
    },

    /// The operation is not allowed in the current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Why the operation was refused.
        message: String,
    },

    /// I/O error from the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

fn display_offset(offset: &Option<u64>) -> String {
    match offset {
        Some(offset) => format!(" at offset {offset}"),
        None => String::new(),
    }
}

impl CoreError {
    /// Creates an unsupported type error.
    pub fn unsupported_type(description: impl Into<String>) -> Self {
        Self::UnsupportedType {
            description: description.into(),
        }
    }

    /// Creates a corrupt record error without a known offset.
    pub fn corrupt_record(message: impl Into<String>) -> Self {
        Self::CorruptRecord {
            offset: None,
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Attaches a stream offset to a corrupt record error.
    ///
    /// Other variants are returned unchanged, as is a corruption error that
    /// already carries an offset.
    #[must_use]
    pub fn at_offset(self, at: u64) -> Self {
        match self {
            Self::CorruptRecord {
                offset: None,
                message,
            } => Self::CorruptRecord {
                offset: Some(at),
                message,
            },
            other => other,
        }
    }

    /// Returns true for [`CoreError::CorruptRecord`].
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::CorruptRecord { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_error_names_both_kinds() {
        let err = CoreError::TypeConversion {
            requested: Kind::Text,
            actual: Kind::Number,
        };
        assert_eq!(err.to_string(), "cannot convert number segment to text");
    }

    #[test]
    fn corruption_message_includes_offset() {
        let err = CoreError::corrupt_record("checksum mismatch").at_offset(128);
        assert_eq!(
            err.to_string(),
            "corrupt record at offset 128: checksum mismatch"
        );
        assert!(err.is_corruption());

        let bare = CoreError::corrupt_record("short header");
        assert_eq!(bare.to_string(), "corrupt record: short header");
    }

    #[test]
    fn at_offset_keeps_first_offset() {
        let err = CoreError::corrupt_record("bad").at_offset(4).at_offset(9);
        assert!(matches!(
            err,
            CoreError::CorruptRecord {
                offset: Some(4),
                ..
            }
        ));
    }
}
