//! Test fixtures and codec helpers.
//!
//! Provides deterministic codecs, temporary segment logs, and
//! misbehaving transformers for error-path tests.

use std::fs::File;
use std::io::{BufReader, BufWriter, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use tempfile::TempDir;
use tracing_subscriber::EnvFilter;
use wiredb_core::{
    CoreResult, ManualClock, Segment, SegmentCodec, SegmentReader, SegmentWriter, TransformError,
    Transformer,
};

/// Fixed clock reading used by fixtures: 2023-11-14T22:13:20Z in nanoseconds.
pub const FIXED_START: u64 = 1_700_000_000_000_000_000;

static TRACING: Once = Once::new();

/// Installs a test subscriber honouring `RUST_LOG`, once per process.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A codec driven by a manual clock.
pub struct CodecFixture {
    /// The codec under test.
    pub codec: SegmentCodec,
    /// The clock it reads; advance it to test TTLs.
    pub clock: Arc<ManualClock>,
}

impl CodecFixture {
    /// Creates an identity codec whose clock reads [`FIXED_START`].
    pub fn new() -> Self {
        Self::with_transformer(wiredb_core::IdentityTransformer)
    }

    /// Creates a codec with the given transformer and a clock at [`FIXED_START`].
    pub fn with_transformer(transformer: impl Transformer + 'static) -> Self {
        init_test_tracing();
        let clock = Arc::new(ManualClock::new(FIXED_START));
        let codec = SegmentCodec::new(transformer).with_clock(clock.clone());
        Self { codec, clock }
    }
}

impl Default for CodecFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A segment log file in a temporary directory, removed on drop.
pub struct TestLog {
    path: PathBuf,
    _temp_dir: TempDir,
}

impl TestLog {
    /// Creates an empty log file.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("segments.log");
        File::create(&path).expect("Failed to create log file");
        Self {
            path,
            _temp_dir: temp_dir,
        }
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends segments and returns the offset of each.
    pub fn append_all(&self, segments: &[Segment]) -> CoreResult<Vec<u64>> {
        let mut file = File::options().append(true).open(&self.path)?;
        let start = file.seek(SeekFrom::End(0))?;
        let mut writer = SegmentWriter::starting_at(BufWriter::new(file), start);
        let offsets = segments
            .iter()
            .map(|segment| writer.append(segment))
            .collect::<CoreResult<Vec<_>>>()?;
        writer.flush()?;
        Ok(offsets)
    }

    /// Opens a reader over the whole log.
    pub fn reader(&self) -> CoreResult<SegmentReader<BufReader<File>>> {
        let file = File::open(&self.path)?;
        Ok(SegmentReader::new(BufReader::new(file)))
    }

    /// Raw bytes of the log.
    pub fn bytes(&self) -> Vec<u8> {
        std::fs::read(&self.path).expect("Failed to read log file")
    }

    /// Overwrites the log with `bytes`.
    pub fn overwrite(&self, bytes: &[u8]) {
        std::fs::write(&self.path, bytes).expect("Failed to write log file");
    }
}

impl Default for TestLog {
    fn default() -> Self {
        Self::new()
    }
}

/// A transformer that fails on demand and counts its calls.
#[derive(Debug, Default)]
pub struct FailingTransformer {
    fail_encode: bool,
    fail_decode: bool,
    calls: AtomicUsize,
}

impl FailingTransformer {
    /// Fails every encode.
    pub fn on_encode() -> Self {
        Self {
            fail_encode: true,
            ..Self::default()
        }
    }

    /// Fails every decode.
    pub fn on_decode() -> Self {
        Self {
            fail_decode: true,
            ..Self::default()
        }
    }

    /// Number of encode and decode calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transformer for FailingTransformer {
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_encode {
            return Err(TransformError::new("injected encode failure"));
        }
        Ok(data.to_vec())
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, TransformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_decode {
            return Err(TransformError::new("injected decode failure"));
        }
        Ok(data.to_vec())
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiredb_core::{CoreError, Number, TransformStage};

    #[test]
    fn fixture_clock_is_fixed() {
        let fixture = CodecFixture::new();
        let segment = fixture.codec.build_tombstone("k");
        assert_eq!(segment.created_at(), FIXED_START);
    }

    #[test]
    fn test_log_appends_and_reads() {
        let fixture = CodecFixture::new();
        let log = TestLog::new();
        let a = fixture.codec.build_live("a", &Number::new(1), 0).unwrap();
        let b = fixture.codec.build_tombstone("a");

        let first = log.append_all(&[a.clone()]).unwrap();
        let second = log.append_all(&[b.clone()]).unwrap();
        assert_eq!(first, vec![0]);
        assert_eq!(second, vec![a.size() as u64]);

        let read: Vec<_> = log.reader().unwrap().map(|r| r.unwrap().1).collect();
        assert_eq!(read, vec![a, b]);
    }

    #[test]
    fn failing_transformer_fails_requested_stage() {
        let fixture = CodecFixture::with_transformer(FailingTransformer::on_decode());
        let segment = fixture.codec.build_live("k", &Number::new(1), 0).unwrap();
        assert!(matches!(
            fixture.codec.to_number(&segment),
            Err(CoreError::Transform {
                stage: TransformStage::Decode,
                ..
            })
        ));
    }
}
