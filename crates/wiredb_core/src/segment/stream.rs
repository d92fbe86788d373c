//! Appending segments to a byte stream and reading them back.
//!
//! Segments are self-delimiting, so a log file is just records written
//! back to back. The reader yields `(offset, segment)` pairs and applies
//! this recovery policy:
//!
//! - a record whose header is readable but whose checksum or contents are
//!   invalid is reported as an error and skipped, and reading resumes at
//!   the next record boundary
//! - a header that is incomplete, or that declares sizes beyond the
//!   configured limits, ends the stream, since the next boundary cannot
//!   be trusted
//! - a record cut short by end of input ends the stream with a warning
//!   (a torn final write)
//!
//! A writer whose write fails part way stops accepting appends, since the
//! stream now ends in a torn record. [`SegmentWriter::failed_at`] gives the
//! offset to truncate to before writing again.

use std::io::{self, Read, Write};

use bytes::BytesMut;
use tracing::{trace, warn};

use crate::config::CodecConfig;
use crate::error::{CoreError, CoreResult};

use super::record::{decode_with, Segment, SegmentHeader, HEADER_SIZE};

/// Writes segments back to back into any [`Write`].
#[derive(Debug)]
pub struct SegmentWriter<W: Write> {
    inner: W,
    offset: u64,
    buf: BytesMut,
    failed_at: Option<u64>,
}

impl<W: Write> SegmentWriter<W> {
    /// Creates a writer whose first record lands at offset 0.
    pub fn new(inner: W) -> Self {
        Self::starting_at(inner, 0)
    }

    /// Creates a writer for a stream that already holds `offset` bytes.
    pub fn starting_at(inner: W, offset: u64) -> Self {
        Self {
            inner,
            offset,
            buf: BytesMut::new(),
            failed_at: None,
        }
    }

    /// Appends one segment and returns the offset it was written at.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Io`] if the underlying write fails. Part of the
    /// record may have reached the stream, so every later append fails with
    /// [`CoreError::InvalidOperation`].
    pub fn append(&mut self, segment: &Segment) -> CoreResult<u64> {
        if let Some(at) = self.failed_at {
            return Err(CoreError::invalid_operation(format!(
                "writer failed at offset {at}; truncate the stream there before appending"
            )));
        }

        self.buf.clear();
        self.buf.reserve(segment.size());
        segment.write_to(&mut self.buf);
        if let Err(e) = self.inner.write_all(&self.buf) {
            warn!(offset = self.offset, error = %e, "segment write failed, writer stopped");
            self.failed_at = Some(self.offset);
            return Err(e.into());
        }

        let at = self.offset;
        self.offset += self.buf.len() as u64;
        trace!(
            offset = at,
            size = self.buf.len(),
            kind = %segment.kind(),
            "appended segment"
        );
        Ok(at)
    }

    /// Flushes the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Io`] if the flush fails.
    pub fn flush(&mut self) -> CoreResult<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Offset of the record whose write failed, if any.
    #[must_use]
    pub fn failed_at(&self) -> Option<u64> {
        self.failed_at
    }

    /// Offset the next record will be written at.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Iterates over segments stored back to back in any [`Read`].
///
/// Wrap file handles in a [`std::io::BufReader`]; the reader issues two
/// reads per record.
#[derive(Debug)]
pub struct SegmentReader<R: Read> {
    inner: R,
    offset: u64,
    config: CodecConfig,
    finished: bool,
}

impl<R: Read> SegmentReader<R> {
    /// Creates a reader with default limits, starting at offset 0.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            offset: 0,
            config: CodecConfig::default(),
            finished: false,
        }
    }

    /// Replaces the limits.
    #[must_use]
    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// Reports offsets relative to `offset`, for readers positioned mid-stream.
    #[must_use]
    pub fn starting_at(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Offset of the next record to be read.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn read_next(&mut self) -> CoreResult<Option<(u64, Segment)>> {
        let start = self.offset;

        let mut header_bytes = [0u8; HEADER_SIZE];
        match read_full(&mut self.inner, &mut header_bytes)? {
            0 => {
                self.finished = true;
                return Ok(None);
            }
            n if n < HEADER_SIZE => {
                warn!(offset = start, bytes = n, "truncated segment header at end of stream");
                self.finished = true;
                return Ok(None);
            }
            _ => {}
        }

        let header = SegmentHeader::parse(&header_bytes);
        if let Err(e) = header.check_limits(&self.config) {
            self.finished = true;
            return Err(e.at_offset(start));
        }

        let size = header.record_size();
        let mut record = Vec::with_capacity(size);
        record.extend_from_slice(&header_bytes);
        record.resize(size, 0);
        let got = read_full(&mut self.inner, &mut record[HEADER_SIZE..])?;
        if got < size - HEADER_SIZE {
            warn!(
                offset = start,
                expected = size,
                got = HEADER_SIZE + got,
                "truncated segment at end of stream"
            );
            self.finished = true;
            return Ok(None);
        }

        self.offset += size as u64;
        match decode_with(&record, &self.config) {
            Ok((segment, _)) => Ok(Some((start, segment))),
            Err(e) => {
                warn!(offset = start, size, error = %e, "skipping corrupt segment");
                Err(e.at_offset(start))
            }
        }
    }
}

impl<R: Read> Iterator for SegmentReader<R> {
    type Item = CoreResult<(u64, Segment)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.read_next() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => None,
            Err(e @ CoreError::CorruptRecord { .. }) => Some(Err(e)),
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Reads until `buf` is full or the input ends, returning the bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
