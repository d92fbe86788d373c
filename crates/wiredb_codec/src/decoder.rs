//! Canonical CBOR decoder.

use std::cmp::Ordering;

use crate::encoder::{major, FALSE, NULL, TRUE};
use crate::error::{CodecError, CodecResult};
use crate::limits::{MAX_BYTES_LENGTH, MAX_CONTAINER_ELEMENTS, MAX_DEPTH};
use crate::value::{cmp_encoded, Value};

/// Decodes exactly one canonical CBOR item from `bytes`.
///
/// # Errors
///
/// Fails on malformed input, on any deviation from the canonical form, on
/// floats and tags, and when bytes remain after the top-level item.
pub fn from_cbor(bytes: &[u8]) -> CodecResult<Value> {
    let mut decoder = CanonicalDecoder::new(bytes);
    let value = decoder.decode()?;
    if !decoder.is_empty() {
        return Err(CodecError::TrailingBytes {
            count: decoder.remaining().len(),
        });
    }
    Ok(value)
}

/// A validating decoder over a borrowed byte slice.
#[derive(Debug)]
pub struct CanonicalDecoder<'a> {
    data: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> CanonicalDecoder<'a> {
    /// Creates a decoder positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            depth: 0,
        }
    }

    /// Decodes the next item.
    #[allow(clippy::cast_possible_wrap)]
    pub fn decode(&mut self) -> CodecResult<Value> {
        let initial = self.take_byte()?;
        let major_type = initial >> 5;
        let info = initial & 0x1f;

        match major_type {
            major::UNSIGNED => {
                let n = self.read_argument(info)?;
                i64::try_from(n)
                    .map(Value::Integer)
                    .map_err(|_| CodecError::unsupported("unsigned integer above i64::MAX"))
            }
            major::NEGATIVE => {
                let n = self.read_argument(info)?;
                i64::try_from(n)
                    .map(|n| Value::Integer(-1 - n))
                    .map_err(|_| CodecError::unsupported("negative integer below i64::MIN"))
            }
            major::BYTES => {
                let len = self.read_length(info, MAX_BYTES_LENGTH)?;
                Ok(Value::Bytes(self.take(len)?.to_vec()))
            }
            major::TEXT => {
                let len = self.read_length(info, MAX_BYTES_LENGTH)?;
                let raw = self.take(len)?;
                let text = std::str::from_utf8(raw).map_err(|_| CodecError::InvalidUtf8)?;
                Ok(Value::Text(text.to_string()))
            }
            major::ARRAY => {
                let len = self.read_length(info, MAX_CONTAINER_ELEMENTS)?;
                self.nested(|d| {
                    let mut items = Vec::with_capacity(len.min(1024));
                    for _ in 0..len {
                        items.push(d.decode()?);
                    }
                    Ok(Value::Array(items))
                })
            }
            major::MAP => {
                let len = self.read_length(info, MAX_CONTAINER_ELEMENTS)?;
                self.nested(|d| d.decode_map_entries(len))
            }
            major::TAG => Err(CodecError::unsupported("tagged item")),
            major::SIMPLE => self.decode_simple(initial, info),
            _ => Err(CodecError::non_canonical("invalid major type")),
        }
    }

    /// Returns true once every input byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Returns the unconsumed input.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    fn nested<F>(&mut self, f: F) -> CodecResult<Value>
    where
        F: FnOnce(&mut Self) -> CodecResult<Value>,
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

    fn decode_map_entries(&mut self, len: usize) -> CodecResult<Value> {
        let data = self.data;
        let mut pairs = Vec::with_capacity(len.min(1024));
        let mut previous_key: Option<&'a [u8]> = None;

        for _ in 0..len {
            let key_start = self.pos;
            let key = self.decode()?;
            let encoded_key = &data[key_start..self.pos];

            if let Some(prev) = previous_key {
                if cmp_encoded(prev, encoded_key) != Ordering::Less {
                    return Err(CodecError::non_canonical(
                        "map keys not in strictly ascending order",
                    ));
                }
            }
            previous_key = Some(encoded_key);

            let value = self.decode()?;
            pairs.push((key, value));
        }

        Ok(Value::Map(pairs))
    }

    fn decode_simple(&mut self, initial: u8, info: u8) -> CodecResult<Value> {
        match initial {
            FALSE => Ok(Value::Bool(false)),
            TRUE => Ok(Value::Bool(true)),
            NULL => Ok(Value::Null),
            _ => match info {
                25..=27 => Err(CodecError::FloatForbidden),
                31 => Err(CodecError::IndefiniteLengthForbidden),
                _ => Err(CodecError::unsupported(format!("simple value {info}"))),
            },
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn read_length(&mut self, info: u8, max_allowed: u64) -> CodecResult<usize> {
        let claimed = self.read_argument(info)?;
        if claimed > max_allowed {
            return Err(CodecError::SizeLimitExceeded {
                claimed,
                max_allowed,
            });
        }
        Ok(claimed as usize)
    }

    fn read_argument(&mut self, info: u8) -> CodecResult<u64> {
        let (value, floor) = match info {
            0..=23 => return Ok(u64::from(info)),
            24 => (u64::from(self.take_byte()?), 24),
            25 => (u64::from(u16::from_be_bytes(self.take_array()?)), 0x100),
            26 => (u64::from(u32::from_be_bytes(self.take_array()?)), 0x1_0000),
            27 => (u64::from_be_bytes(self.take_array()?), 0x1_0000_0000),
            31 => return Err(CodecError::IndefiniteLengthForbidden),
            _ => return Err(CodecError::non_canonical("reserved additional info")),
        };
        if value < floor {
            return Err(CodecError::non_canonical(
                "argument not encoded in shortest form",
            ));
        }
        Ok(value)
    }

    fn take_byte(&mut self) -> CodecResult<u8> {
        let byte = *self.data.get(self.pos).ok_or(CodecError::UnexpectedEof)?;
        self.pos += 1;
        Ok(byte)
    }

    fn take(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        let end = self.pos.checked_add(len).ok_or(CodecError::UnexpectedEof)?;
        let slice = self
            .data
            .get(self.pos..end)
            .ok_or(CodecError::UnexpectedEof)?;
        self.pos = end;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> CodecResult<[u8; N]> {
        let slice = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }
}
