//! Size and nesting limits shared by the encoder and decoder.
//!
//! Both sides enforce the same bounds, so anything the encoder accepts the
//! decoder reads back.

/// Largest element count for arrays and maps.
pub const MAX_CONTAINER_ELEMENTS: u64 = 16 * 1024 * 1024;

/// Largest byte or text string.
pub const MAX_BYTES_LENGTH: u64 = 256 * 1024 * 1024;

/// Deepest nesting of arrays and maps.
pub const MAX_DEPTH: usize = 128;
