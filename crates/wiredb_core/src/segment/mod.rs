//! Segment records: the on-disk unit of storage.
//!
//! A segment is one self-delimiting key/value record:
//!
//! ```text
//! offset  size  field
//!      0     1  tombstone    0 = live, 1 = deleted
//!      1     1  kind         Kind tag of the payload
//!      2     8  expires_at   ns since epoch, 0 = never
//!     10     8  created_at   ns since epoch
//!     18     4  key_size
//!     22     4  value_size
//!     26     k  key
//!   26+k     v  value        transformer output
//! 26+k+v     4  crc32        IEEE, over bytes [0, 26+k+v)
//! ```
//!
//! All integers are little-endian. [`SegmentCodec`] builds segments from
//! typed values and converts them back; [`SegmentWriter`] and
//! [`SegmentReader`] move them through byte streams.

mod codec;
mod record;
mod stream;

pub use codec::SegmentCodec;
pub use record::{Segment, SegmentHeader, CHECKSUM_SIZE, HEADER_SIZE};
pub use stream::{SegmentReader, SegmentWriter};
