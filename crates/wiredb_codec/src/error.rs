//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors produced while encoding or decoding canonical CBOR.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A value could not be encoded.
    #[error("encoding failed: {message}")]
    EncodingFailed {
        /// Description of the encoding error.
        message: String,
    },

    /// Well-formed CBOR that does not have the shape the caller expected.
    #[error("unexpected shape: expected {expected}, found {found}")]
    UnexpectedShape {
        /// What the caller asked for.
        expected: &'static str,
        /// What the input actually contained.
        found: &'static str,
    },

    /// Floats have no canonical representation in WireDB payloads.
    #[error("float values are forbidden in canonical CBOR")]
    FloatForbidden,

    /// Indefinite-length items are forbidden.
    #[error("indefinite-length items are forbidden")]
    IndefiniteLengthForbidden,

    /// Text string is not valid UTF-8.
    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    /// Input ended in the middle of an item.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// Bytes follow the top-level item.
    #[error("{count} trailing bytes after top-level item")]
    TrailingBytes {
        /// Number of unconsumed bytes.
        count: usize,
    },

    /// Input violates the canonical form.
    #[error("non-canonical CBOR: {message}")]
    NonCanonical {
        /// Which canonical rule was violated.
        message: String,
    },

    /// Input uses a CBOR construct WireDB does not support.
    #[error("unsupported CBOR item: {item}")]
    Unsupported {
        /// Description of the unsupported item.
        item: String,
    },

    /// A declared length exceeds the decoder limit.
    #[error("declared length {claimed} exceeds limit {max_allowed}")]
    SizeLimitExceeded {
        /// Length declared by the input.
        claimed: u64,
        /// Configured maximum.
        max_allowed: u64,
    },

    /// Nesting is deeper than the decoder allows.
    #[error("nesting depth exceeds {max_depth}")]
    DepthLimitExceeded {
        /// Maximum supported depth.
        max_depth: usize,
    },
}

impl CodecError {
    /// Create an encoding failed error.
    pub fn encoding_failed(message: impl Into<String>) -> Self {
        Self::EncodingFailed {
            message: message.into(),
        }
    }

    /// Create a non-canonical input error.
    pub fn non_canonical(message: impl Into<String>) -> Self {
        Self::NonCanonical {
            message: message.into(),
        }
    }

    /// Create an unsupported item error.
    pub fn unsupported(item: impl Into<String>) -> Self {
        Self::Unsupported { item: item.into() }
    }

    /// Create an unexpected shape error.
    pub fn unexpected_shape(expected: &'static str, found: &'static str) -> Self {
        Self::UnexpectedShape { expected, found }
    }
}
