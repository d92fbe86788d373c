//! Content transformers.
//!
//! A transformer sits between canonical encoding and the segment: whatever
//! it returns from [`Transformer::encode`] is what lands on disk, and
//! [`Transformer::decode`] must invert it exactly. The segment codec never
//! chooses or configures one; the engine hands it in.
//!
//! Provided implementations:
//! - [`IdentityTransformer`] stores canonical bytes unchanged
//! - [`Lz4Transformer`] compresses with LZ4
//! - `AesGcmTransformer` (feature `encryption`) encrypts at rest
//! - [`TransformerChain`] composes stages, e.g. compress then encrypt

#[cfg(feature = "encryption")]
mod encrypted;
mod lz4;

#[cfg(feature = "encryption")]
pub use encrypted::{AesGcmTransformer, EncryptionKey, KEY_SIZE, NONCE_SIZE, TAG_SIZE};
pub use lz4::Lz4Transformer;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Failure reported by a transformer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct TransformError {
    message: String,
}

impl TransformError {
    /// Creates a transform error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Description of the failure.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A reversible byte-to-byte stage applied to canonical payloads.
pub trait Transformer: Send + Sync {
    /// Transforms canonical bytes into their stored form.
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>, TransformError>;

    /// Restores canonical bytes from their stored form.
    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, TransformError>;

    /// Short name for logs.
    fn name(&self) -> &'static str {
        "custom"
    }
}

/// Stores canonical bytes unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransformer;

impl Transformer for IdentityTransformer {
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        Ok(data.to_vec())
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        Ok(data.to_vec())
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}

/// Applies several transformers in sequence.
///
/// Encoding runs the stages in insertion order; decoding runs them in
/// reverse.
#[derive(Clone, Default)]
pub struct TransformerChain {
    stages: Vec<Arc<dyn Transformer>>,
}

impl TransformerChain {
    /// Creates an empty chain, which behaves like [`IdentityTransformer`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage.
    #[must_use]
    pub fn then(mut self, stage: impl Transformer + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if the chain has no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl fmt::Debug for TransformerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.stages.iter().map(|s| s.name()))
            .finish()
    }
}

impl Transformer for TransformerChain {
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        let mut bytes = data.to_vec();
        for stage in &self.stages {
            bytes = stage.encode(&bytes)?;
        }
        Ok(bytes)
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        let mut bytes = data.to_vec();
        for stage in self.stages.iter().rev() {
            bytes = stage.decode(&bytes)?;
        }
        Ok(bytes)
    }

    fn name(&self) -> &'static str {
        "chain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Adds a constant to every byte; decode subtracts it.
    struct Shift(u8);

    impl Transformer for Shift {
        fn encode(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
            Ok(data.iter().map(|b| b.wrapping_add(self.0)).collect())
        }

        fn decode(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
            Ok(data.iter().map(|b| b.wrapping_sub(self.0)).collect())
        }
    }

    /// Appends a marker byte; decode requires and strips it.
    struct Marker(u8);

    impl Transformer for Marker {
        fn encode(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
            let mut out = data.to_vec();
            out.push(self.0);
            Ok(out)
        }

        fn decode(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
            match data.split_last() {
                Some((last, rest)) if *last == self.0 => Ok(rest.to_vec()),
                _ => Err(TransformError::new("marker missing")),
            }
        }
    }

    #[test]
    fn identity_is_passthrough() {
        let data = b"payload";
        assert_eq!(IdentityTransformer.encode(data).unwrap(), data);
        assert_eq!(IdentityTransformer.decode(data).unwrap(), data);
    }

    #[test]
    fn chain_encodes_in_order_and_decodes_in_reverse() {
        let chain = TransformerChain::new().then(Shift(1)).then(Marker(0xAA));
        let encoded = chain.encode(&[1, 2]).unwrap();
        // Shift first, then the marker is appended unshifted.
        assert_eq!(encoded, vec![2, 3, 0xAA]);
        assert_eq!(chain.decode(&encoded).unwrap(), vec![1, 2]);
    }

    #[test]
    fn chain_propagates_stage_errors() {
        let chain = TransformerChain::new().then(Marker(1));
        let err = chain.decode(&[5, 2]).unwrap_err();
        assert_eq!(err.message(), "marker missing");
    }

    #[test]
    fn empty_chain_is_identity() {
        let chain = TransformerChain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.encode(b"x").unwrap(), b"x");
    }
}
