use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use wiredb_codec::{CodecError, CodecResult, Value};

use super::{expect_integer, expect_map, text_key};

const NUMBER_FIELD: &str = "number";
const TTL_FIELD: &str = "ttl";

/// An integer counter shared across threads without locking.
///
/// The value is only ever touched through atomic load, store, fetch-add and
/// compare-exchange; there is no plain read-modify-write path. Arithmetic
/// wraps on overflow (`i64::MAX + 1 == i64::MIN`).
///
/// `ttl` is informational only. Expiry is decided by the owning segment's
/// `expires_at`.
pub struct Number {
    value: AtomicI64,
    ttl: Option<u64>,
}

impl Number {
    /// Creates a counter holding `value`.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self {
            value: AtomicI64::new(value),
            ttl: None,
        }
    }

    /// Attaches an informational TTL in seconds.
    #[must_use]
    pub const fn with_ttl(mut self, ttl_seconds: u64) -> Self {
        self.ttl = Some(ttl_seconds);
        self
    }

    /// Informational TTL in seconds.
    #[must_use]
    pub const fn ttl(&self) -> Option<u64> {
        self.ttl
    }

    /// Adds `delta` and returns the new value.
    pub fn add(&self, delta: i64) -> i64 {
        self.value.fetch_add(delta, Ordering::SeqCst).wrapping_add(delta)
    }

    /// Subtracts `delta` and returns the new value.
    pub fn subtract(&self, delta: i64) -> i64 {
        self.value.fetch_sub(delta, Ordering::SeqCst).wrapping_sub(delta)
    }

    /// Adds one and returns the new value.
    pub fn increment(&self) -> i64 {
        self.add(1)
    }

    /// Subtracts one and returns the new value.
    pub fn decrement(&self) -> i64 {
        self.subtract(1)
    }

    /// Overwrites the value.
    pub fn set(&self, value: i64) {
        self.value.store(value, Ordering::SeqCst);
    }

    /// Reads the value.
    #[must_use]
    pub fn get(&self) -> i64 {
        self.value.load(Ordering::SeqCst)
    }

    /// Stores `new` only if the current value equals `expected`.
    /// Returns whether the swap happened.
    pub fn compare_and_swap(&self, expected: i64, new: i64) -> bool {
        self.value
            .compare_exchange(expected, new, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub(crate) fn to_value(&self) -> Value {
        let mut fields = vec![(Value::from(NUMBER_FIELD), Value::Integer(self.get()))];
        if let Some(ttl) = self.ttl {
            // TTLs above i64::MAX seconds are clamped; they are not reachable
            // through any nanosecond clock anyway.
            let ttl = i64::try_from(ttl).unwrap_or(i64::MAX);
            fields.push((Value::from(TTL_FIELD), Value::Integer(ttl)));
        }
        Value::Map(fields)
    }

    pub(crate) fn from_value(value: Value) -> CodecResult<Self> {
        let mut number = None;
        let mut ttl = None;
        for (key, field) in expect_map(value)? {
            match text_key(key)?.as_str() {
                NUMBER_FIELD => number = Some(expect_integer(&field)?),
                TTL_FIELD => {
                    let secs = u64::try_from(expect_integer(&field)?).map_err(|_| {
                        CodecError::unexpected_shape("unsigned ttl", "negative integer")
                    })?;
                    ttl = Some(secs);
                }
                _ => return Err(CodecError::unsupported("unknown number field")),
            }
        }
        let value = number.ok_or(CodecError::unexpected_shape("number field", "missing"))?;
        Ok(Self {
            value: AtomicI64::new(value),
            ttl,
        })
    }
}

impl Clone for Number {
    fn clone(&self) -> Self {
        Self {
            value: AtomicI64::new(self.get()),
            ttl: self.ttl,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get() && self.ttl == other.ttl
    }
}

impl Eq for Number {}

impl Default for Number {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Debug for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Number")
            .field("value", &self.get())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}
