//! Building segments from values and reading values back out.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::config::CodecConfig;
use crate::error::{CoreError, CoreResult, TransformStage};
use crate::kind::kind_of;
use crate::transform::{IdentityTransformer, Transformer};
use crate::types::{
    Deserializable, List, Number, Serializable, Set, SortedSet, Table, Text, TypedValue,
};

use super::record::{decode_exact, decode_with, Segment};

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Converts between typed values and [`Segment`]s.
///
/// The codec owns a [`Transformer`] applied to every payload, a [`Clock`]
/// used for `created_at` and TTL checks, and the size limits from
/// [`CodecConfig`]. It is cheap to clone and safe to share across threads.
#[derive(Clone)]
pub struct SegmentCodec {
    transformer: Arc<dyn Transformer>,
    clock: Arc<dyn Clock>,
    config: CodecConfig,
}

impl SegmentCodec {
    /// Creates a codec with the given transformer, the system clock and
    /// default limits.
    pub fn new(transformer: impl Transformer + 'static) -> Self {
        Self::with_shared_transformer(Arc::new(transformer))
    }

    /// Creates a codec around an already shared transformer.
    pub fn with_shared_transformer(transformer: Arc<dyn Transformer>) -> Self {
        Self {
            transformer,
            clock: Arc::new(SystemClock),
            config: CodecConfig::default(),
        }
    }

    /// Creates a codec that stores canonical bytes unchanged.
    #[must_use]
    pub fn identity() -> Self {
        Self::new(IdentityTransformer)
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the limits.
    #[must_use]
    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// Active limits.
    #[must_use]
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Builds a live segment holding `value` under `key`.
    ///
    /// `ttl_seconds` of 0 means the segment never expires; otherwise
    /// `expires_at` is `created_at + ttl_seconds` in nanoseconds, saturating.
    ///
    /// # Errors
    ///
    /// - [`CoreError::UnsupportedType`] if the value has no kind
    /// - [`CoreError::InvalidArgument`] if key or stored value exceed limits
    /// - [`CoreError::Encode`] if canonical serialization fails
    /// - [`CoreError::Transform`] if the transformer fails
    pub fn build_live<S>(
        &self,
        key: impl AsRef<[u8]>,
        value: &S,
        ttl_seconds: u64,
    ) -> CoreResult<Segment>
    where
        S: Serializable + ?Sized,
    {
        let kind = kind_of(value)?;
        let key = key.as_ref();
        self.check_key(key)?;

        let created_at = self.clock.now_nanos();
        let expires_at = if ttl_seconds > 0 {
            created_at.saturating_add(ttl_seconds.saturating_mul(NANOS_PER_SECOND))
        } else {
            0
        };

        let canonical = value.to_canonical().map_err(CoreError::Encode)?;
        let stored = self
            .transformer
            .encode(&canonical)
            .map_err(|source| CoreError::Transform {
                stage: TransformStage::Encode,
                source,
            })?;
        if stored.len() > self.config.max_value_size as usize {
            return Err(CoreError::invalid_argument(format!(
                "stored value of {} bytes exceeds limit {}",
                stored.len(),
                self.config.max_value_size
            )));
        }

        debug!(
            %kind,
            key_size = key.len(),
            value_size = stored.len(),
            ttl_seconds,
            transformer = self.transformer.name(),
            "built live segment"
        );
        Ok(Segment::live(kind, key.to_vec(), stored, created_at, expires_at))
    }

    /// Builds a tombstone marking `key` as deleted.
    ///
    /// Never fails. The key size limit is not applied here: a key that
    /// [`SegmentCodec::build_live`] rejected has nothing to delete.
    pub fn build_tombstone(&self, key: impl AsRef<[u8]>) -> Segment {
        let key = key.as_ref();
        debug!(key_size = key.len(), "built tombstone");
        Segment::tombstone(key.to_vec(), self.clock.now_nanos())
    }

    fn check_key(&self, key: &[u8]) -> CoreResult<()> {
        if key.len() > self.config.max_key_size as usize {
            return Err(CoreError::invalid_argument(format!(
                "key of {} bytes exceeds limit {}",
                key.len(),
                self.config.max_key_size
            )));
        }
        Ok(())
    }

    /// Nanoseconds until `segment` expires, or `-1` if it never expires or
    /// already has. See [`Segment::ttl_remaining_at`].
    #[must_use]
    pub fn ttl_remaining(&self, segment: &Segment) -> i64 {
        segment.ttl_remaining_at(self.clock.now_nanos())
    }

    /// Returns true if `segment` has expired by the codec's clock.
    #[must_use]
    pub fn is_expired(&self, segment: &Segment) -> bool {
        segment.is_expired_at(self.clock.now_nanos())
    }

    /// Decodes the payload of a segment of kind `T::KIND`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::TypeConversion`] if the segment holds another kind
    /// - [`CoreError::Transform`] if the transformer cannot restore the bytes
    /// - [`CoreError::Decode`] if the canonical bytes have the wrong shape
    pub fn decode_as<T: Deserializable>(&self, segment: &Segment) -> CoreResult<T> {
        if segment.kind() != T::KIND {
            return Err(CoreError::TypeConversion {
                requested: T::KIND,
                actual: segment.kind(),
            });
        }
        let canonical = self.restore(segment)?;
        T::from_canonical(&canonical).map_err(CoreError::Decode)
    }

    /// Decodes a [`Set`] payload.
    ///
    /// # Errors
    ///
    /// See [`SegmentCodec::decode_as`].
    pub fn to_set(&self, segment: &Segment) -> CoreResult<Set> {
        self.decode_as(segment)
    }

    /// Decodes a [`SortedSet`] payload.
    ///
    /// # Errors
    ///
    /// See [`SegmentCodec::decode_as`].
    pub fn to_sorted_set(&self, segment: &Segment) -> CoreResult<SortedSet> {
        self.decode_as(segment)
    }

    /// Decodes a [`List`] payload.
    ///
    /// # Errors
    ///
    /// See [`SegmentCodec::decode_as`].
    pub fn to_list(&self, segment: &Segment) -> CoreResult<List> {
        self.decode_as(segment)
    }

    /// Decodes a [`Text`] payload.
    ///
    /// # Errors
    ///
    /// See [`SegmentCodec::decode_as`].
    pub fn to_text(&self, segment: &Segment) -> CoreResult<Text> {
        self.decode_as(segment)
    }

    /// Decodes a [`Table`] payload.
    ///
    /// # Errors
    ///
    /// See [`SegmentCodec::decode_as`].
    pub fn to_table(&self, segment: &Segment) -> CoreResult<Table> {
        self.decode_as(segment)
    }

    /// Decodes a [`Number`] payload.
    ///
    /// # Errors
    ///
    /// See [`SegmentCodec::decode_as`].
    pub fn to_number(&self, segment: &Segment) -> CoreResult<Number> {
        self.decode_as(segment)
    }

    /// Decodes whatever the segment holds. Tombstones yield `None`.
    ///
    /// # Errors
    ///
    /// [`CoreError::Transform`] or [`CoreError::Decode`] as for
    /// [`SegmentCodec::decode_as`].
    pub fn decode_value(&self, segment: &Segment) -> CoreResult<Option<TypedValue>> {
        if segment.is_tombstone() {
            return Ok(None);
        }
        let canonical = self.restore(segment)?;
        TypedValue::from_canonical(segment.kind(), &canonical)
            .map(Some)
            .map_err(CoreError::Decode)
    }

    fn restore(&self, segment: &Segment) -> CoreResult<Vec<u8>> {
        self.transformer
            .decode(segment.value())
            .map_err(|source| CoreError::Transform {
                stage: TransformStage::Decode,
                source,
            })
    }

    /// Parses exactly one wire record under this codec's limits.
    ///
    /// # Errors
    ///
    /// [`CoreError::CorruptRecord`] for any malformed input.
    pub fn parse(&self, data: &[u8]) -> CoreResult<Segment> {
        decode_exact(data, &self.config)
    }

    /// Parses the wire record at the start of `data`, returning it with
    /// the number of bytes consumed.
    ///
    /// # Errors
    ///
    /// [`CoreError::CorruptRecord`] for any malformed input.
    pub fn parse_prefix(&self, data: &[u8]) -> CoreResult<(Segment, usize)> {
        decode_with(data, &self.config)
    }
}

impl Default for SegmentCodec {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for SegmentCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentCodec")
            .field("transformer", &self.transformer.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
