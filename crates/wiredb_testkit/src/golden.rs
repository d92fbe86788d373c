//! Golden test utilities for format verification.
//!
//! Compares encoded segments byte for byte against files checked in under
//! `docs/test_vectors`. Set `UPDATE_GOLDEN=1` to rewrite them.

use std::fs;
use std::path::{Path, PathBuf};

/// A golden test that compares output against expected files.
pub struct GoldenTest {
    name: String,
    golden_dir: PathBuf,
    update_mode: bool,
}

impl GoldenTest {
    /// Creates a new golden test.
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the test (used for file naming)
    /// * `golden_dir` - Directory containing golden files
    pub fn new(name: impl Into<String>, golden_dir: impl AsRef<Path>) -> Self {
        Self {
            name: name.into(),
            golden_dir: golden_dir.as_ref().to_path_buf(),
            update_mode: std::env::var("UPDATE_GOLDEN").is_ok(),
        }
    }

    /// Creates a golden test using the workspace `docs/test_vectors` directory.
    pub fn with_default_dir(name: impl Into<String>) -> Self {
        let golden_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .and_then(|p| p.parent())
            .map(|p| p.join("docs").join("test_vectors"))
            .unwrap_or_else(|| PathBuf::from("test_vectors"));

        Self::new(name, golden_dir)
    }

    /// Asserts that the given bytes match the golden file.
    ///
    /// If `UPDATE_GOLDEN` environment variable is set, updates the golden file instead.
    pub fn assert_bytes(&self, suffix: &str, actual: &[u8]) {
        let path = self.file_path(suffix);

        if self.update_mode {
            self.update_golden_file(&path, actual);
            return;
        }

        assert!(
            path.exists(),
            "Golden file not found: {}\n\
             Run with UPDATE_GOLDEN=1 to create it.\n\
             Actual bytes (hex): {}",
            path.display(),
            hex_encode(actual)
        );

        let expected = fs::read(&path).expect("Failed to read golden file");
        assert!(
            actual == expected,
            "Golden test '{}' failed for '{}':\n\
             Expected ({} bytes): {}\n\
             Actual ({} bytes): {}\n\
             Run with UPDATE_GOLDEN=1 to update.",
            self.name,
            suffix,
            expected.len(),
            hex_encode(&expected),
            actual.len(),
            hex_encode(actual)
        );
    }

    /// Reads a golden file.
    pub fn read(&self, suffix: &str) -> Vec<u8> {
        fs::read(self.file_path(suffix)).expect("Failed to read golden file")
    }

    fn file_path(&self, suffix: &str) -> PathBuf {
        let filename = if suffix.is_empty() {
            format!("{}.golden", self.name)
        } else {
            format!("{}_{}.golden", self.name, suffix)
        };
        self.golden_dir.join(filename)
    }

    fn update_golden_file(&self, path: &Path, data: &[u8]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create golden directory");
        }
        fs::write(path, data).expect("Failed to write golden file");
        println!("Updated golden file: {}", path.display());
    }
}

/// Encodes bytes as hexadecimal string.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decodes hexadecimal string to bytes, ignoring whitespace.
///
/// # Panics
///
/// Panics with a description of the problem on an odd number of digits or a
/// non-hex character.
pub fn hex_decode(hex: &str) -> Vec<u8> {
    let digits: Vec<u8> = hex.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    assert!(
        digits.len() % 2 == 0,
        "Invalid hex: odd number of digits ({})",
        digits.len()
    );
    digits
        .chunks(2)
        .map(|pair| (hex_digit(pair[0]) << 4) | hex_digit(pair[1]))
        .collect()
}

#[allow(clippy::cast_possible_truncation)]
fn hex_digit(b: u8) -> u8 {
    char::from(b)
        .to_digit(16)
        .unwrap_or_else(|| panic!("Invalid hex digit {:?}", char::from(b))) as u8
}
