//! Segment codec configuration.

use serde::{Deserialize, Serialize};

/// Limits and checks applied by the segment codec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Largest key accepted when building or parsing a segment.
    pub max_key_size: u32,

    /// Largest stored value accepted when building or parsing a segment.
    pub max_value_size: u32,

    /// Whether parsing verifies the trailing CRC32.
    pub verify_checksums: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_key_size: 64 * 1024,          // 64 KiB
            max_value_size: 64 * 1024 * 1024, // 64 MiB
            verify_checksums: true,
        }
    }
}

impl CodecConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the key size limit.
    #[must_use]
    pub const fn max_key_size(mut self, size: u32) -> Self {
        self.max_key_size = size;
        self
    }

    /// Sets the value size limit.
    #[must_use]
    pub const fn max_value_size(mut self, size: u32) -> Self {
        self.max_value_size = size;
        self
    }

    /// Sets whether checksums are verified on parse.
    #[must_use]
    pub const fn verify_checksums(mut self, value: bool) -> Self {
        self.verify_checksums = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = CodecConfig::default();
        assert_eq!(config.max_key_size, 65_536);
        assert_eq!(config.max_value_size, 67_108_864);
        assert!(config.verify_checksums);
    }

    #[test]
    fn builder_pattern() {
        let config = CodecConfig::new()
            .max_key_size(16)
            .max_value_size(1024)
            .verify_checksums(false);

        assert_eq!(config.max_key_size, 16);
        assert_eq!(config.max_value_size, 1024);
        assert!(!config.verify_checksums);
    }

    #[test]
    fn deserializes_partial_config() {
        let config: CodecConfig = serde_json::from_str(r#"{"max_key_size": 128}"#).unwrap();
        assert_eq!(config.max_key_size, 128);
        assert_eq!(config.max_value_size, CodecConfig::default().max_value_size);
        assert!(config.verify_checksums);
    }
}
