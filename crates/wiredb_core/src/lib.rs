//! # WireDB Core
//!
//! Record layer for WireDB.
//!
//! This crate provides:
//! - [`Kind`], the one-byte registry of storable value kinds
//! - the value variants ([`Set`], [`SortedSet`], [`List`], [`Text`],
//!   [`Table`], and the atomic counter [`Number`])
//! - [`Segment`], the checksummed on-disk record, and [`SegmentCodec`],
//!   which builds segments from values and reads them back
//! - content [`Transformer`]s applied to payloads (compression, and
//!   encryption behind the `encryption` feature)
//! - [`SegmentWriter`] / [`SegmentReader`] for append-only streams
//!
//! ```
//! use wiredb_core::{Number, SegmentCodec};
//!
//! let codec = SegmentCodec::identity();
//! let segment = codec.build_live("user:1", &Number::new(42), 0)?;
//! let bytes = segment.encode();
//! assert_eq!(bytes.len(), segment.size());
//!
//! let parsed = codec.parse(&bytes)?;
//! assert_eq!(codec.to_number(&parsed)?.get(), 42);
//! # Ok::<(), wiredb_core::CoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod config;
mod error;
mod kind;
mod segment;
pub mod transform;
mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CodecConfig;
pub use error::{CoreError, CoreResult, TransformStage};
pub use kind::{kind_of, Kind};
pub use segment::{
    Segment, SegmentCodec, SegmentHeader, SegmentReader, SegmentWriter, CHECKSUM_SIZE,
    HEADER_SIZE,
};
pub use transform::{
    IdentityTransformer, Lz4Transformer, TransformError, Transformer, TransformerChain,
};
pub use types::{
    Deserializable, List, Number, Serializable, Set, SortedSet, Table, Text, TypedValue,
};
