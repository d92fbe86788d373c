use std::fmt;

use wiredb_codec::{CodecError, CodecResult, Value};

/// A scalar UTF-8 string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Text {
    content: String,
}

impl Text {
    /// Wraps a string.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Borrow the content.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// Appends to the content.
    pub fn append(&mut self, suffix: &str) {
        self.content.push_str(suffix);
    }

    /// Length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Returns true for the empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Unwraps into the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.content
    }

    pub(crate) fn to_value(&self) -> Value {
        Value::Text(self.content.clone())
    }

    pub(crate) fn from_value(value: Value) -> CodecResult<Self> {
        match value {
            Value::Text(content) => Ok(Self { content }),
            other => Err(CodecError::unexpected_shape("text", other.type_name())),
        }
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Text {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
