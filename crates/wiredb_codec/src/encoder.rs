//! Canonical CBOR encoder.

use crate::error::{CodecError, CodecResult};
use crate::limits::{MAX_BYTES_LENGTH, MAX_CONTAINER_ELEMENTS, MAX_DEPTH};
use crate::value::{cmp_encoded, Value};

/// Major type numbers from RFC 8949.
pub(crate) mod major {
    pub const UNSIGNED: u8 = 0;
    pub const NEGATIVE: u8 = 1;
    pub const BYTES: u8 = 2;
    pub const TEXT: u8 = 3;
    pub const ARRAY: u8 = 4;
    pub const MAP: u8 = 5;
    pub const TAG: u8 = 6;
    pub const SIMPLE: u8 = 7;
}

pub(crate) const FALSE: u8 = 0xf4;
pub(crate) const TRUE: u8 = 0xf5;
pub(crate) const NULL: u8 = 0xf6;

/// Encodes a value to canonical CBOR bytes.
///
/// Output is canonical CBOR (RFC 7049 §3.9): integer and length heads use
/// the shortest form, all lengths are definite, and map entries are ordered
/// by their encoded keys, shorter first.
///
/// # Errors
///
/// Returns an error if a map contains the same key twice, or if the value
/// exceeds the nesting or length limits the decoder enforces.
pub fn to_canonical_cbor(value: &Value) -> CodecResult<Vec<u8>> {
    let mut encoder = CanonicalEncoder::new();
    encoder.encode(value)?;
    Ok(encoder.into_bytes())
}

/// Streaming canonical CBOR encoder writing into an owned buffer.
#[derive(Debug, Default)]
pub struct CanonicalEncoder {
    buffer: Vec<u8>,
    depth: usize,
}

impl CanonicalEncoder {
    /// Creates an empty encoder.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an encoder with a preallocated buffer.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            depth: 0,
        }
    }

    /// Appends one value.
    pub fn encode(&mut self, value: &Value) -> CodecResult<()> {
        match value {
            Value::Null => self.buffer.push(NULL),
            Value::Bool(b) => self.buffer.push(if *b { TRUE } else { FALSE }),
            Value::Integer(n) => self.write_integer(*n),
            Value::Bytes(b) => {
                self.write_length(major::BYTES, b.len(), MAX_BYTES_LENGTH)?;
                self.buffer.extend_from_slice(b);
            }
            Value::Text(s) => {
                self.write_length(major::TEXT, s.len(), MAX_BYTES_LENGTH)?;
                self.buffer.extend_from_slice(s.as_bytes());
            }
            Value::Array(items) => {
                self.write_length(major::ARRAY, items.len(), MAX_CONTAINER_ELEMENTS)?;
                self.nested(|e| items.iter().try_for_each(|item| e.encode(item)))?;
            }
            Value::Map(pairs) => {
                check_length(pairs.len(), MAX_CONTAINER_ELEMENTS)?;
                self.nested(|e| e.write_map(pairs))?;
            }
        }
        Ok(())
    }

    /// Returns the bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consumes the encoder, returning the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    fn nested<F>(&mut self, f: F) -> CodecResult<()>
    where
        F: FnOnce(&mut Self) -> CodecResult<()>,
    {
        if self.depth >= MAX_DEPTH {
            return Err(CodecError::DepthLimitExceeded {
                max_depth: MAX_DEPTH,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn write_length(&mut self, major: u8, len: usize, max_allowed: u64) -> CodecResult<()> {
        let len = check_length(len, max_allowed)?;
        self.write_head(major, len);
        Ok(())
    }

    #[allow(clippy::cast_sign_loss)]
    fn write_integer(&mut self, n: i64) {
        if n >= 0 {
            self.write_head(major::UNSIGNED, n as u64);
        } else {
            // -1 - n is non-negative for every negative i64.
            self.write_head(major::NEGATIVE, (-1 - n) as u64);
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn write_head(&mut self, major: u8, arg: u64) {
        let initial = major << 5;
        match arg {
            0..=23 => self.buffer.push(initial | arg as u8),
            24..=0xff => {
                self.buffer.push(initial | 24);
                self.buffer.push(arg as u8);
            }
            0x100..=0xffff => {
                self.buffer.push(initial | 25);
                self.buffer.extend_from_slice(&(arg as u16).to_be_bytes());
            }
            0x1_0000..=0xffff_ffff => {
                self.buffer.push(initial | 26);
                self.buffer.extend_from_slice(&(arg as u32).to_be_bytes());
            }
            _ => {
                self.buffer.push(initial | 27);
                self.buffer.extend_from_slice(&arg.to_be_bytes());
            }
        }
    }

    fn write_map(&mut self, pairs: &[(Value, Value)]) -> CodecResult<()> {
        let mut entries = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            // Keys sit at the map's depth, as the decoder sees them.
            let mut key_encoder = Self {
                buffer: Vec::new(),
                depth: self.depth,
            };
            key_encoder.encode(key)?;
            entries.push((key_encoder.buffer, value));
        }
        entries.sort_by(|a, b| cmp_encoded(&a.0, &b.0));

        if entries.windows(2).any(|w| w[0].0 == w[1].0) {
            return Err(CodecError::encoding_failed("duplicate map key"));
        }

        self.write_head(major::MAP, entries.len() as u64);
        for (key, value) in entries {
            self.buffer.extend_from_slice(&key);
            self.encode(value)?;
        }
        Ok(())
    }
}

fn check_length(len: usize, max_allowed: u64) -> CodecResult<u64> {
    let claimed = len as u64;
    if claimed > max_allowed {
        return Err(CodecError::SizeLimitExceeded {
            claimed,
            max_allowed,
        });
    }
    Ok(claimed)
}
