//! LZ4 compression stage.

use super::{TransformError, Transformer};

/// Compresses payloads with LZ4 block compression.
///
/// The uncompressed length is prepended (little-endian u32) so decoding can
/// size its buffer up front. Payloads larger than `max_decompressed_size`
/// are refused on encode, and decoding refuses to inflate beyond it.
#[derive(Debug, Clone, Copy)]
pub struct Lz4Transformer {
    max_decompressed_size: usize,
}

impl Lz4Transformer {
    /// Default inflation limit (64 MiB), matching the default value size limit.
    pub const DEFAULT_MAX_DECOMPRESSED_SIZE: usize = 64 * 1024 * 1024;

    /// Creates a transformer with the default inflation limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_decompressed_size: Self::DEFAULT_MAX_DECOMPRESSED_SIZE,
        }
    }

    /// Sets the largest payload encode accepts and decode will produce.
    #[must_use]
    pub const fn max_decompressed_size(mut self, size: usize) -> Self {
        self.max_decompressed_size = size;
        self
    }
}

impl Default for Lz4Transformer {
    fn default() -> Self {
        Self::new()
    }
}

impl Transformer for Lz4Transformer {
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        if data.len() > self.max_decompressed_size {
            return Err(TransformError::new(format!(
                "lz4: payload of {} bytes exceeds limit {}",
                data.len(),
                self.max_decompressed_size
            )));
        }
        Ok(lz4_flex::compress_prepend_size(data))
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        let header: [u8; 4] = data
            .get(..4)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| TransformError::new("lz4: missing size prefix"))?;
        let declared = u32::from_le_bytes(header) as usize;
        if declared > self.max_decompressed_size {
            return Err(TransformError::new(format!(
                "lz4: declared size {declared} exceeds limit {}",
                self.max_decompressed_size
            )));
        }
        lz4_flex::decompress_size_prepended(data)
            .map_err(|e| TransformError::new(format!("lz4: {e}")))
    }

    fn name(&self) -> &'static str {
        "lz4"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_shrinks_repetitive_data() {
        let data = vec![b'w'; 4096];
        let lz4 = Lz4Transformer::new();
        let compressed = lz4.encode(&data).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(lz4.decode(&compressed).unwrap(), data);
    }

    #[test]
    fn empty_payload() {
        let lz4 = Lz4Transformer::new();
        let compressed = lz4.encode(&[]).unwrap();
        assert!(lz4.decode(&compressed).unwrap().is_empty());
    }

    #[test]
    fn rejects_short_input() {
        assert!(Lz4Transformer::new().decode(&[1, 2]).is_err());
    }

    #[test]
    fn rejects_declared_size_over_limit() {
        let compressed = Lz4Transformer::new().encode(&[0u8; 64]).unwrap();
        let lz4 = Lz4Transformer::new().max_decompressed_size(16);
        let err = lz4.decode(&compressed).unwrap_err();
        assert!(err.message().contains("exceeds limit"), "{err}");
    }

    #[test]
    fn refuses_to_encode_what_it_would_not_decode() {
        let lz4 = Lz4Transformer::new().max_decompressed_size(16);
        let err = lz4.encode(&[0u8; 17]).unwrap_err();
        assert!(err.message().contains("exceeds limit"), "{err}");

        let at_limit = lz4.encode(&[0u8; 16]).unwrap();
        assert_eq!(lz4.decode(&at_limit).unwrap(), vec![0u8; 16]);
    }
}
