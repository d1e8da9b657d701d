use std::fmt::Display;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Weak};

use clap::ValueEnum;
use enum_iterator::Sequence;
use tempfile::TempDir;
use tracing::debug;

use crate::device::DeviceBuffer;

/// Backing storage for a coupled benchmark source/sink.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, ValueEnum, Sequence)]
pub enum IoType {
    #[clap(name = "file")]
    FilePath,
    #[clap(name = "buffer")]
    HostBuffer,
    #[clap(name = "device")]
    DeviceBuffer,
    #[clap(name = "void")]
    Void,
}

impl IoType {
    pub fn name(&self) -> &str {
        match self {
            IoType::FilePath => "file",
            IoType::HostBuffer => "host-buffer",
            IoType::DeviceBuffer => "device-buffer",
            IoType::Void => "void",
        }
    }
}

impl Display for IoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

static SHARED_TMPDIR: Mutex<Weak<TempDir>> = Mutex::new(Weak::new());

/// Process-wide directory holding the backing files of all file-backed pairs.
/// Created on first use; removed when the last pair holding a reference
/// drops.
fn shared_tmpdir() -> io::Result<Arc<TempDir>> {
    let mut slot = SHARED_TMPDIR
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(dir) = slot.upgrade() {
        return Ok(dir);
    }
    let dir = Arc::new(tempfile::Builder::new().prefix("bench-io-").tempdir()?);
    debug!("created shared benchmark directory {:?}", dir.path());
    *slot = Arc::downgrade(&dir);
    Ok(dir)
}

enum Backing {
    File {
        path: PathBuf,
        /// Keeps the shared directory alive until the last file-backed pair
        /// drops.
        _dir: Arc<TempDir>,
    },
    Host(Vec<u8>),
    Device {
        staging: Vec<u8>,
        device: DeviceBuffer,
        stale: bool,
    },
    Void(u64),
}

/// A coupled write target and read source over a single backing store.
///
/// The source produced by [`make_source`](Self::make_source) reads back
/// exactly the bytes written through the sink produced by
/// [`make_sink`](Self::make_sink), whatever the backing store. Descriptors
/// mutably borrow the pair, so the write-then-read protocol is enforced at
/// compile time.
pub struct SourceSinkPair {
    backing: Backing,
}

impl SourceSinkPair {
    /// Allocates the backing store for the given io type. File-backed pairs
    /// only reserve a unique name inside the shared directory; the file is
    /// created by the first write session.
    pub fn new(io_type: IoType) -> anyhow::Result<Self> {
        let backing = match io_type {
            IoType::FilePath => {
                let dir = shared_tmpdir()?;
                let path = dir.path().join(format!("{}.bin", uuid::Uuid::new_v4()));
                Backing::File { path, _dir: dir }
            }
            IoType::HostBuffer => Backing::Host(Vec::new()),
            IoType::DeviceBuffer => Backing::Device {
                staging: Vec::new(),
                device: DeviceBuffer::new(),
                stale: false,
            },
            IoType::Void => Backing::Void(0),
        };
        Ok(Self { backing })
    }

    pub fn io_type(&self) -> IoType {
        match &self.backing {
            Backing::File { .. } => IoType::FilePath,
            Backing::Host(_) => IoType::HostBuffer,
            Backing::Device { .. } => IoType::DeviceBuffer,
            Backing::Void(_) => IoType::Void,
        }
    }

    /// Returns a write target addressing this pair's backing store.
    ///
    /// Each call starts a fresh write session: afterwards the store holds
    /// exactly the bytes written through the returned sink. Device-backed
    /// pairs write into a host staging buffer; the device copy is made when
    /// the matching source is requested. Void sinks count bytes and discard
    /// the payload.
    pub fn make_sink(&mut self) -> io::Result<Sink<'_>> {
        let inner = match &mut self.backing {
            Backing::File { path, .. } => SinkInner::File(File::create(path)?),
            Backing::Host(buf) => {
                buf.clear();
                SinkInner::Buffer(buf)
            }
            Backing::Device { staging, stale, .. } => {
                staging.clear();
                *stale = true;
                SinkInner::Buffer(staging)
            }
            Backing::Void(count) => {
                *count = 0;
                SinkInner::Void(count)
            }
        };
        Ok(Sink { inner })
    }

    /// Returns a read source yielding the bytes most recently written through
    /// [`make_sink`](Self::make_sink). Valid before any write, in which case
    /// it yields zero bytes.
    ///
    /// For device-backed pairs this is where the host staging bytes are
    /// copied to device memory. The copy is lazy: repeated calls reuse the
    /// cached device copy until the next write session invalidates it.
    pub fn make_source(&mut self) -> io::Result<Source<'_>> {
        Ok(match &mut self.backing {
            Backing::File { path, .. } => Source::File(path.as_path()),
            Backing::Host(buf) => Source::Bytes(buf),
            Backing::Device {
                staging,
                device,
                stale,
            } => {
                if *stale {
                    device
                        .copy_from_host(staging)
                        .map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e))?;
                    *stale = false;
                }
                Source::Device(device)
            }
            Backing::Void(_) => Source::Bytes(&[]),
        })
    }

    /// Number of bytes currently held by the backing store. A file-size query
    /// for file-backed pairs, a length read otherwise.
    pub fn size(&self) -> io::Result<u64> {
        Ok(match &self.backing {
            Backing::File { path, .. } => match std::fs::metadata(path) {
                Ok(meta) => meta.len(),
                // no write session yet
                Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
                Err(e) => return Err(e),
            },
            Backing::Host(buf) => buf.len() as u64,
            // the staging buffer always mirrors the last write; the device
            // copy may lag behind it
            Backing::Device { staging, .. } => staging.len() as u64,
            Backing::Void(count) => *count,
        })
    }
}

impl Drop for SourceSinkPair {
    fn drop(&mut self) {
        if let Backing::File { path, .. } = &self.backing {
            // best effort; benchmarks must not fail on cleanup
            let _ = std::fs::remove_file(path);
        }
    }
}

/// Write-target descriptor produced by [`SourceSinkPair::make_sink`].
pub struct Sink<'a> {
    inner: SinkInner<'a>,
}

enum SinkInner<'a> {
    File(File),
    Buffer(&'a mut Vec<u8>),
    Void(&'a mut u64),
}

impl Write for Sink<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.inner {
            SinkInner::File(file) => file.write(buf),
            SinkInner::Buffer(bytes) => {
                bytes.extend_from_slice(buf);
                Ok(buf.len())
            }
            SinkInner::Void(count) => {
                **count += buf.len() as u64;
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.inner {
            SinkInner::File(file) => file.flush(),
            SinkInner::Buffer(_) | SinkInner::Void(_) => Ok(()),
        }
    }
}

/// Read-source descriptor paired with a previously produced sink.
///
/// Readers under benchmark can match on the variant to address the backing
/// store natively, or stream through [`into_read`](Self::into_read).
pub enum Source<'a> {
    /// Bytes on disk. The file may not exist if nothing was written yet.
    File(&'a Path),
    /// Bytes resident in host memory.
    Bytes(&'a [u8]),
    /// Bytes resident in device memory.
    Device(&'a DeviceBuffer),
}

impl<'a> Source<'a> {
    pub fn into_read(self) -> io::Result<Box<dyn Read + 'a>> {
        Ok(match self {
            Source::File(path) => match File::open(path) {
                Ok(file) => Box::new(file),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Box::new(io::empty()),
                Err(e) => return Err(e),
            },
            Source::Bytes(bytes) => Box::new(bytes),
            Source::Device(device) => Box::new(device.as_slice()),
        })
    }

    /// Reads the entire source into host memory. Convenience for tests and
    /// whole-file read benchmarks.
    pub fn read_all(self) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        self.into_read()?.read_to_end(&mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    fn write_through_sink(pair: &mut SourceSinkPair, bytes: &[u8]) {
        let mut sink = pair.make_sink().unwrap();
        sink.write_all(bytes).unwrap();
        sink.flush().unwrap();
    }

    #[rstest]
    #[case::file(IoType::FilePath)]
    #[case::host(IoType::HostBuffer)]
    #[case::device(IoType::DeviceBuffer)]
    fn roundtrip_yields_written_bytes(
        #[case] io_type: IoType,
        #[values(0, 1, (1 << 20) + 3)] len: usize,
    ) {
        let bytes = payload(len);
        let mut pair = SourceSinkPair::new(io_type).unwrap();
        write_through_sink(&mut pair, &bytes);
        assert_eq!(pair.size().unwrap(), len as u64);
        assert_eq!(pair.make_source().unwrap().read_all().unwrap(), bytes);
        // size is unchanged by reading
        assert_eq!(pair.size().unwrap(), len as u64);
    }

    #[rstest]
    #[case::file(IoType::FilePath)]
    #[case::host(IoType::HostBuffer)]
    #[case::device(IoType::DeviceBuffer)]
    #[case::void(IoType::Void)]
    fn source_before_any_write_is_empty(#[case] io_type: IoType) {
        let mut pair = SourceSinkPair::new(io_type).unwrap();
        assert_eq!(pair.size().unwrap(), 0);
        assert!(pair.make_source().unwrap().read_all().unwrap().is_empty());
    }

    #[rstest]
    #[case::file(IoType::FilePath)]
    #[case::host(IoType::HostBuffer)]
    #[case::device(IoType::DeviceBuffer)]
    #[case::void(IoType::Void)]
    fn new_write_session_replaces_previous_bytes(#[case] io_type: IoType) {
        let mut pair = SourceSinkPair::new(io_type).unwrap();
        write_through_sink(&mut pair, &payload(4096));
        write_through_sink(&mut pair, &payload(10));
        assert_eq!(pair.size().unwrap(), 10);
        if io_type != IoType::Void {
            assert_eq!(pair.make_source().unwrap().read_all().unwrap(), payload(10));
        }
    }

    #[test]
    fn void_counts_and_discards() {
        let mut pair = SourceSinkPair::new(IoType::Void).unwrap();
        write_through_sink(&mut pair, &payload(12345));
        assert_eq!(pair.size().unwrap(), 12345);
        assert!(pair.make_source().unwrap().read_all().unwrap().is_empty());
        assert_eq!(pair.size().unwrap(), 12345);
    }

    #[test]
    fn device_source_is_cached_between_reads() {
        let mut pair = SourceSinkPair::new(IoType::DeviceBuffer).unwrap();
        write_through_sink(&mut pair, &payload(100));
        assert_eq!(pair.make_source().unwrap().read_all().unwrap(), payload(100));
        // second request must reuse the materialized copy
        assert_eq!(pair.make_source().unwrap().read_all().unwrap(), payload(100));
        // and a new write session must invalidate it
        write_through_sink(&mut pair, &payload(7));
        assert_eq!(pair.make_source().unwrap().read_all().unwrap(), payload(7));
    }

    #[test]
    fn file_pairs_share_one_directory() {
        let mut a = SourceSinkPair::new(IoType::FilePath).unwrap();
        let mut b = SourceSinkPair::new(IoType::FilePath).unwrap();
        let path_of = |pair: &mut SourceSinkPair| match pair.make_source().unwrap() {
            Source::File(path) => path.to_path_buf(),
            _ => unreachable!("file-backed pair must produce a file source"),
        };
        let (path_a, path_b) = (path_of(&mut a), path_of(&mut b));
        assert_ne!(path_a, path_b);
        assert_eq!(path_a.parent(), path_b.parent());
    }

    #[test]
    fn dropping_file_pair_removes_backing_file() {
        let mut pair = SourceSinkPair::new(IoType::FilePath).unwrap();
        write_through_sink(&mut pair, &payload(64));
        let path = match pair.make_source().unwrap() {
            Source::File(path) => path.to_path_buf(),
            _ => unreachable!("file-backed pair must produce a file source"),
        };
        assert!(path.exists());
        drop(pair);
        assert!(!path.exists());
    }

    #[test]
    fn io_type_reports_backing_kind() {
        for io_type in enum_iterator::all::<IoType>() {
            assert_eq!(SourceSinkPair::new(io_type).unwrap().io_type(), io_type);
        }
    }
}
