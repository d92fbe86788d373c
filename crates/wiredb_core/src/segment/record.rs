//! Segment record type and wire format.

use bytes::{BufMut, BytesMut};

use crate::config::CodecConfig;
use crate::error::{CoreError, CoreResult};
use crate::kind::Kind;

/// Fixed header size: tombstone (1) + kind (1) + expires_at (8) +
/// created_at (8) + key_size (4) + value_size (4) = 26.
pub const HEADER_SIZE: usize = 26;

/// Trailing CRC32 size.
pub const CHECKSUM_SIZE: usize = 4;

const TOMBSTONE: u8 = 1;
const LIVE: u8 = 0;

/// Decoded fixed-size header of a segment.
///
/// Enough to learn how long the full record is before reading it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentHeader {
    /// Raw tombstone flag byte.
    pub tombstone: u8,
    /// Raw kind tag byte.
    pub kind: u8,
    /// Expiry time in nanoseconds, 0 for never.
    pub expires_at: u64,
    /// Creation time in nanoseconds.
    pub created_at: u64,
    /// Length of the key region.
    pub key_size: u32,
    /// Length of the value region.
    pub value_size: u32,
}

impl SegmentHeader {
    /// Reads a header from its 26 wire bytes.
    #[must_use]
    pub fn parse(bytes: &[u8; HEADER_SIZE]) -> Self {
        let u64_at = |at: usize| {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&bytes[at..at + 8]);
            u64::from_le_bytes(raw)
        };
        let u32_at = |at: usize| {
            let mut raw = [0u8; 4];
            raw.copy_from_slice(&bytes[at..at + 4]);
            u32::from_le_bytes(raw)
        };

        Self {
            tombstone: bytes[0],
            kind: bytes[1],
            expires_at: u64_at(2),
            created_at: u64_at(10),
            key_size: u32_at(18),
            value_size: u32_at(22),
        }
    }

    /// Checks the declared lengths against `config`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CorruptRecord`] if either length is over its limit.
    pub fn check_limits(&self, config: &CodecConfig) -> CoreResult<()> {
        if self.key_size > config.max_key_size {
            return Err(CoreError::corrupt_record(format!(
                "key size {} exceeds limit {}",
                self.key_size, config.max_key_size
            )));
        }
        if self.value_size > config.max_value_size {
            return Err(CoreError::corrupt_record(format!(
                "value size {} exceeds limit {}",
                self.value_size, config.max_value_size
            )));
        }
        Ok(())
    }

    /// Full wire length of the record this header starts.
    #[must_use]
    pub fn record_size(&self) -> usize {
        HEADER_SIZE + self.key_size as usize + self.value_size as usize + CHECKSUM_SIZE
    }
}

/// One durable key/value record.
///
/// Wire layout, all integers little-endian:
///
/// ```text
/// | tombstone 1 | kind 1 | expires_at 8 | created_at 8 | key_size 4 | value_size 4 | key | value | crc32 4 |
/// ```
///
/// The CRC32 (IEEE) covers every byte before it. Segments are immutable:
/// updates and deletes produce new segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    tombstone: u8,
    kind: Kind,
    expires_at: u64,
    created_at: u64,
    key: Vec<u8>,
    value: Vec<u8>,
}

impl Segment {
    /// Assembles a live segment. Sizes must already be checked.
    pub(crate) fn live(
        kind: Kind,
        key: Vec<u8>,
        value: Vec<u8>,
        created_at: u64,
        expires_at: u64,
    ) -> Self {
        Self {
            tombstone: LIVE,
            kind,
            expires_at,
            created_at,
            key,
            value,
        }
    }

    /// Assembles a tombstone. The key size must already be checked.
    pub(crate) fn tombstone(key: Vec<u8>, created_at: u64) -> Self {
        Self {
            tombstone: TOMBSTONE,
            kind: Kind::Unknown,
            expires_at: 0,
            created_at,
            key,
            value: Vec::new(),
        }
    }

    /// Returns true if this segment marks a deletion.
    #[must_use]
    pub fn is_tombstone(&self) -> bool {
        self.tombstone == TOMBSTONE
    }

    /// Kind of the stored value ([`Kind::Unknown`] for tombstones).
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Expiry time in nanoseconds since the epoch; 0 means never.
    #[must_use]
    pub fn expires_at(&self) -> u64 {
        self.expires_at
    }

    /// Creation time in nanoseconds since the epoch.
    #[must_use]
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Raw key bytes.
    #[must_use]
    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Stored (transformer-encoded) value bytes.
    #[must_use]
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Length of the key region.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn key_size(&self) -> u32 {
        // Keys come from build_live, which caps them at max_key_size.
        self.key.len() as u32
    }

    /// Length of the value region.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn value_size(&self) -> u32 {
        self.value.len() as u32
    }

    /// Exact number of bytes [`Segment::encode`] produces.
    #[must_use]
    pub fn size(&self) -> usize {
        HEADER_SIZE + self.key.len() + self.value.len() + CHECKSUM_SIZE
    }

    /// Nanoseconds left before expiry, measured at `now`.
    ///
    /// Returns `-1` both when the segment never expires and when it has
    /// already expired; callers tell the two apart with `expires_at() == 0`.
    /// Values beyond `i64::MAX` clamp.
    #[must_use]
    pub fn ttl_remaining_at(&self, now: u64) -> i64 {
        if self.expires_at > 0 && self.expires_at > now {
            i64::try_from(self.expires_at - now).unwrap_or(i64::MAX)
        } else {
            -1
        }
    }

    /// Returns true if the segment has an expiry that is at or before `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.expires_at > 0 && self.expires_at <= now
    }

    fn header_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut header = [0u8; HEADER_SIZE];
        header[0] = self.tombstone;
        header[1] = self.kind.as_byte();
        header[2..10].copy_from_slice(&self.expires_at.to_le_bytes());
        header[10..18].copy_from_slice(&self.created_at.to_le_bytes());
        header[18..22].copy_from_slice(&self.key_size().to_le_bytes());
        header[22..26].copy_from_slice(&self.value_size().to_le_bytes());
        header
    }

    /// CRC32 over header, key and value.
    #[must_use]
    pub fn checksum(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&self.header_bytes());
        hasher.update(&self.key);
        hasher.update(&self.value);
        hasher.finalize()
    }

    /// Writes the wire form, checksum included, into `buf`.
    pub fn write_to<B: BufMut>(&self, buf: &mut B) {
        buf.put_slice(&self.header_bytes());
        buf.put_slice(&self.key);
        buf.put_slice(&self.value);
        buf.put_u32_le(self.checksum());
    }

    /// Serializes to the wire form.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(self.size());
        self.write_to(&mut buf);
        buf.to_vec()
    }

    /// Parses exactly one record using the default limits.
    ///
    /// # Errors
    ///
    /// Any malformed input, checksum mismatch or trailing byte is a
    /// [`CoreError::CorruptRecord`].
    pub fn decode(data: &[u8]) -> CoreResult<Self> {
        decode_exact(data, &CodecConfig::default())
    }

    /// Parses the record at the start of `data`, returning it with the
    /// number of bytes it occupied.
    ///
    /// # Errors
    ///
    /// Same as [`Segment::decode`], except trailing bytes are allowed.
    pub fn decode_prefix(data: &[u8]) -> CoreResult<(Self, usize)> {
        decode_with(data, &CodecConfig::default())
    }
}

/// Parses exactly one record under `config`.
pub(crate) fn decode_exact(data: &[u8], config: &CodecConfig) -> CoreResult<Segment> {
    let (segment, consumed) = decode_with(data, config)?;
    if consumed != data.len() {
        return Err(CoreError::corrupt_record(format!(
            "{} trailing bytes after record",
            data.len() - consumed
        )));
    }
    Ok(segment)
}

/// Parses the record at the start of `data` under `config`.
pub(crate) fn decode_with(data: &[u8], config: &CodecConfig) -> CoreResult<(Segment, usize)> {
    let header_bytes: &[u8; HEADER_SIZE] = data
        .get(..HEADER_SIZE)
        .and_then(|h| h.try_into().ok())
        .ok_or_else(|| {
            CoreError::corrupt_record(format!("truncated header: {} bytes", data.len()))
        })?;
    let header = SegmentHeader::parse(header_bytes);
    header.check_limits(config)?;

    let total = header.record_size();
    if data.len() < total {
        return Err(CoreError::corrupt_record(format!(
            "truncated record: need {total} bytes, have {}",
            data.len()
        )));
    }

    let body_end = total - CHECKSUM_SIZE;
    if config.verify_checksums {
        let mut stored = [0u8; CHECKSUM_SIZE];
        stored.copy_from_slice(&data[body_end..total]);
        let stored = u32::from_le_bytes(stored);
        let computed = crc32fast::hash(&data[..body_end]);
        if stored != computed {
            return Err(CoreError::corrupt_record(format!(
                "checksum mismatch: stored {stored:08x}, computed {computed:08x}"
            )));
        }
    }

    let segment = validate(&header, data)?;
    Ok((segment, total))
}

fn validate(header: &SegmentHeader, data: &[u8]) -> CoreResult<Segment> {
    let kind = Kind::from_byte(header.kind)
        .ok_or_else(|| CoreError::corrupt_record(format!("unknown kind tag {}", header.kind)))?;

    match header.tombstone {
        TOMBSTONE if kind != Kind::Unknown || header.value_size != 0 => {
            return Err(CoreError::corrupt_record(
                "tombstone must have unknown kind and empty value",
            ));
        }
        LIVE if kind == Kind::Unknown => {
            return Err(CoreError::corrupt_record("live record has unknown kind"));
        }
        TOMBSTONE | LIVE => {}
        other => {
            return Err(CoreError::corrupt_record(format!(
                "invalid tombstone flag {other}"
            )));
        }
    }

    if header.expires_at != 0 && header.expires_at <= header.created_at {
        return Err(CoreError::corrupt_record("expires_at not after created_at"));
    }

    let key_end = HEADER_SIZE + header.key_size as usize;
    let value_end = key_end + header.value_size as usize;
    Ok(Segment {
        tombstone: header.tombstone,
        kind,
        expires_at: header.expires_at,
        created_at: header.created_at,
        key: data[HEADER_SIZE..key_end].to_vec(),
        value: data[key_end..value_end].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Segment {
        Segment::live(
            Kind::Text,
            b"greeting".to_vec(),
            vec![0x62, b'h', b'i'],
            1_000,
            5_000,
        )
    }

    #[test]
    fn header_layout_is_little_endian() {
        let bytes = sample().encode();
        assert_eq!(bytes[0], 0);
        assert_eq!(bytes[1], Kind::Text.as_byte());
        assert_eq!(&bytes[2..10], &5_000u64.to_le_bytes());
        assert_eq!(&bytes[10..18], &1_000u64.to_le_bytes());
        assert_eq!(&bytes[18..22], &8u32.to_le_bytes());
        assert_eq!(&bytes[22..26], &3u32.to_le_bytes());
        assert_eq!(&bytes[26..34], b"greeting");
        assert_eq!(&bytes[34..37], &[0x62, b'h', b'i']);
        assert_eq!(&bytes[37..], &crc32fast::hash(&bytes[..37]).to_le_bytes());
    }

    #[test]
    fn size_matches_encoding() {
        let live = sample();
        assert_eq!(live.size(), live.encode().len());
        assert_eq!(live.size(), 26 + 8 + 3 + 4);

        let tomb = Segment::tombstone(b"k".to_vec(), 1);
        assert_eq!(tomb.size(), tomb.encode().len());
        assert_eq!(tomb.size(), 31);
    }

    #[test]
    fn roundtrip() {
        let segment = sample();
        assert_eq!(Segment::decode(&segment.encode()).unwrap(), segment);

        let tomb = Segment::tombstone(b"gone".to_vec(), 77);
        let decoded = Segment::decode(&tomb.encode()).unwrap();
        assert!(decoded.is_tombstone());
        assert_eq!(decoded, tomb);
    }

    #[test]
    fn every_single_byte_flip_is_detected() {
        let bytes = sample().encode();
        for i in 0..bytes.len() {
            let mut corrupted = bytes.clone();
            corrupted[i] ^= 0xff;
            let err = Segment::decode(&corrupted).unwrap_err();
            assert!(err.is_corruption(), "byte {i}: {err}");
        }
    }

    #[test]
    fn decode_prefix_reports_consumed_length() {
        let first = sample();
        let second = Segment::tombstone(b"x".to_vec(), 9);
        let mut stream = first.encode();
        stream.extend(second.encode());

        let (a, used) = Segment::decode_prefix(&stream).unwrap();
        assert_eq!(a, first);
        assert_eq!(used, first.size());
        let (b, _) = Segment::decode_prefix(&stream[used..]).unwrap();
        assert_eq!(b, second);
    }

    #[test]
    fn decode_rejects_trailing_bytes() {
        let mut bytes = sample().encode();
        bytes.push(0);
        assert!(Segment::decode(&bytes).unwrap_err().is_corruption());
    }

    #[test]
    fn decode_rejects_truncation() {
        let bytes = sample().encode();
        assert!(Segment::decode(&bytes[..10]).unwrap_err().is_corruption());
        assert!(Segment::decode(&bytes[..bytes.len() - 1])
            .unwrap_err()
            .is_corruption());
    }

    /// Re-seals a header edit with a valid checksum so semantic checks run.
    fn reseal(mut bytes: Vec<u8>, edit: impl FnOnce(&mut [u8])) -> Vec<u8> {
        edit(&mut bytes);
        let body = bytes.len() - CHECKSUM_SIZE;
        let crc = crc32fast::hash(&bytes[..body]);
        bytes[body..].copy_from_slice(&crc.to_le_bytes());
        bytes
    }

    #[test]
    fn rejects_semantically_invalid_headers() {
        let live = sample().encode();
        let tomb = Segment::tombstone(b"k".to_vec(), 1).encode();

        let bad_kind = reseal(live.clone(), |b| b[1] = 9);
        let bad_flag = reseal(live.clone(), |b| b[0] = 2);
        let live_unknown = reseal(live.clone(), |b| b[1] = Kind::Unknown.as_byte());
        let tomb_with_kind = reseal(tomb, |b| b[1] = Kind::Set.as_byte());
        let expires_before_created =
            reseal(live, |b| b[2..10].copy_from_slice(&500u64.to_le_bytes()));

        for bytes in [
            bad_kind,
            bad_flag,
            live_unknown,
            tomb_with_kind,
            expires_before_created,
        ] {
            assert!(Segment::decode(&bytes).unwrap_err().is_corruption());
        }
    }

    #[test]
    fn limits_are_checked_before_reading_body() {
        let bytes = sample().encode();
        let tight = CodecConfig::new().max_key_size(4);
        let err = decode_exact(&bytes, &tight).unwrap_err();
        assert!(err.to_string().contains("key size 8 exceeds limit 4"), "{err}");
    }

    #[test]
    fn checksum_verification_can_be_disabled() {
        let mut bytes = sample().encode();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;

        let lenient = CodecConfig::new().verify_checksums(false);
        assert_eq!(decode_exact(&bytes, &lenient).unwrap(), sample());
    }

    #[test]
    fn ttl_remaining_sentinel() {
        let permanent = Segment::live(Kind::Text, vec![], vec![], 100, 0);
        assert_eq!(permanent.ttl_remaining_at(100), -1);
        assert_eq!(permanent.ttl_remaining_at(u64::MAX), -1);
        assert!(!permanent.is_expired_at(u64::MAX));

        let expiring = Segment::live(Kind::Text, vec![], vec![], 100, 1_100);
        assert_eq!(expiring.ttl_remaining_at(100), 1_000);
        assert_eq!(expiring.ttl_remaining_at(1_099), 1);
        assert_eq!(expiring.ttl_remaining_at(1_100), -1);
        assert!(expiring.is_expired_at(1_100));
        assert!(!expiring.is_expired_at(1_099));
    }

    #[test]
    fn ttl_remaining_clamps_to_i64_max() {
        let far = Segment::live(Kind::Text, vec![], vec![], 0, u64::MAX);
        assert_eq!(far.ttl_remaining_at(0), i64::MAX);
    }
}
