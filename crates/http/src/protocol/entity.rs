//! The entity store: a message body with its wire-encoding flags.
//!
//! An [`Entity`] always holds *decoded* bytes (dechunked, de-gzipped) in
//! exactly one backing store (an in-memory buffer, a caller-supplied file, or
//! an owned temp file) together with the two wire flags `chunked` and `gzip`
//! describing how the body is framed on the wire. Keeping decoded bytes plus
//! the original flags lets a relayed entity reproduce its original wire
//! encoding when re-sent.
//!
//! The wire-ready representation is materialized lazily and memoized: the
//! gzip transform runs at most once per entity instance, and every subsequent
//! `length`/`write_to` call reuses the cached result.

use bytes::{Bytes, BytesMut};
use flate2::Compression;
use flate2::write::{GzDecoder, GzEncoder};
use once_cell::sync::OnceCell;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::codec::Encoder;
use tracing::{debug, trace, warn};

use crate::codec::body::ChunkedEncoder;
use crate::protocol::{BodyKind, PayloadItem, SendError};

/// Bodies with a known length below this stay in memory; everything else is
/// spooled to a temp file. Gzipped content spools regardless of size since the
/// compression ratio is unknown up front.
const MEMORY_STORE_LIMIT: u64 = 100 * 1024;

/// Unit size for streaming a materialized body to a sink.
const WRITE_CHUNK_SIZE: usize = 2 * 1024;

/// A message body plus its wire flags, backed by memory or a file.
#[derive(Debug)]
pub struct Entity {
    source: Source,
    chunked: bool,
    gzip: bool,
    cache: OnceCell<WireCache>,
}

/// The single backing store holding the decoded bytes.
#[derive(Debug)]
enum Source {
    Buffer(Bytes),
    File(PathBuf),
    Temp(TempFile),
}

/// The memoized wire-ready representation.
#[derive(Debug)]
enum WireCache {
    /// Wire bytes equal the source buffer.
    Buffer(Bytes),
    /// Transformed bytes spooled to an owned temp file.
    Spooled(TempFile),
    /// Wire bytes are served straight from the (untransformed) source file.
    SourceFile(PathBuf),
}

impl Entity {
    /// Creates an entity over an in-memory buffer of decoded bytes.
    ///
    /// The flags describe how the content is to be framed when written to a
    /// sink via [`Entity::write_to`].
    pub fn from_bytes(bytes: impl Into<Bytes>, chunked: bool, gzip: bool) -> Self {
        Self { source: Source::Buffer(bytes.into()), chunked, gzip, cache: OnceCell::new() }
    }

    /// Creates an entity over an existing file of decoded bytes.
    ///
    /// Fails immediately if the file cannot be found. The file is borrowed,
    /// not owned: it is never deleted by the entity.
    pub fn from_file(path: impl Into<PathBuf>, chunked: bool, gzip: bool) -> io::Result<Self> {
        let path = path.into();
        fs::metadata(&path)?;
        Ok(Self { source: Source::File(path), chunked, gzip, cache: OnceCell::new() })
    }

    fn from_temp(temp: TempFile, chunked: bool, gzip: bool) -> Self {
        Self { source: Source::Temp(temp), chunked, gzip, cache: OnceCell::new() }
    }

    /// Whether the body is chunk-framed on the wire.
    pub fn is_chunked(&self) -> bool {
        self.chunked
    }

    /// Whether the body is gzip-compressed on the wire.
    pub fn is_gzip(&self) -> bool {
        self.gzip
    }

    /// A fresh reader over the decoded content.
    ///
    /// This is the body access collaborators get; the wire cache is never
    /// exposed. Every call returns a new reader positioned at the start.
    pub fn content(&self) -> io::Result<ContentReader> {
        let inner = match &self.source {
            Source::Buffer(bytes) => ReaderInner::Memory(Cursor::new(bytes.clone())),
            Source::File(path) => ReaderInner::File(File::open(path)?),
            Source::Temp(temp) => ReaderInner::File(File::open(temp.path())?),
        };
        Ok(ContentReader(inner))
    }

    /// The number of bytes that will be written for this entity, or `None`
    /// when it is chunk-framed (length unknowable ahead of framing).
    ///
    /// Triggers materialization on first call; the result is cached.
    pub fn length(&self) -> io::Result<Option<u64>> {
        if self.chunked {
            return Ok(None);
        }

        let length = match self.ensure_cache()? {
            WireCache::Buffer(bytes) => bytes.len() as u64,
            WireCache::Spooled(temp) => fs::metadata(temp.path())?.len(),
            WireCache::SourceFile(path) => fs::metadata(path)?.len(),
        };
        Ok(Some(length))
    }

    /// Streams the wire representation of this entity into `out`.
    ///
    /// Applies chunk framing when the `chunked` flag is set (including the
    /// terminating zero chunk) and writes raw bytes otherwise, flushing per
    /// internal buffer unit. The gzip transform, if any, happened during
    /// materialization and is reused here.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<(), SendError> {
        trace!(chunked = self.chunked, gzip = self.gzip, "writing entity body");

        let mut reader = self.cache_reader()?;
        let mut encoder = self.chunked.then(ChunkedEncoder::new);
        let mut wire = BytesMut::with_capacity(WRITE_CHUNK_SIZE + 16);
        let mut buf = [0u8; WRITE_CHUNK_SIZE];

        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            match &mut encoder {
                Some(encoder) => {
                    encoder.encode(PayloadItem::Chunk(Bytes::copy_from_slice(&buf[..n])), &mut wire)?;
                }
                None => wire.extend_from_slice(&buf[..n]),
            }
            out.write_all(&wire)?;
            wire.clear();
            out.flush()?;
        }

        if let Some(encoder) = &mut encoder {
            encoder.encode(PayloadItem::Eof, &mut wire)?;
            out.write_all(&wire)?;
        }
        out.flush()?;
        Ok(())
    }

    /// Drops a spooled wire cache, deleting its temp file now.
    ///
    /// The next `length`/`write_to` call would materialize again; without an
    /// explicit call the spooled file is still removed when the entity drops.
    pub fn clear_cache(&mut self) {
        if self.cache.take().is_some() {
            debug!("cleared entity wire cache");
        }
    }

    /// Computes the wire representation once and memoizes it.
    fn ensure_cache(&self) -> io::Result<&WireCache> {
        self.cache.get_or_try_init(|| {
            if !self.gzip {
                // no transform: the decoded source already is the wire form
                return Ok(match &self.source {
                    Source::Buffer(bytes) => WireCache::Buffer(bytes.clone()),
                    Source::File(path) => WireCache::SourceFile(path.clone()),
                    Source::Temp(temp) => WireCache::SourceFile(temp.path().to_path_buf()),
                });
            }

            let (file, temp) = TempFile::create()?;
            let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
            let mut reader = self.content()?;
            let mut buf = [0u8; WRITE_CHUNK_SIZE];
            loop {
                let n = reader.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                encoder.write_all(&buf[..n])?;
            }
            encoder.finish()?.flush()?;
            debug!(path = %temp.path().display(), "spooled gzip wire cache");
            Ok(WireCache::Spooled(temp))
        })
    }

    fn cache_reader(&self) -> io::Result<ContentReader> {
        let inner = match self.ensure_cache()? {
            WireCache::Buffer(bytes) => ReaderInner::Memory(Cursor::new(bytes.clone())),
            WireCache::Spooled(temp) => ReaderInner::File(File::open(temp.path())?),
            WireCache::SourceFile(path) => ReaderInner::File(File::open(path)?),
        };
        Ok(ContentReader(inner))
    }
}

/// Polymorphic reader over an entity's backing store.
#[derive(Debug)]
pub struct ContentReader(ReaderInner);

#[derive(Debug)]
enum ReaderInner {
    Memory(Cursor<Bytes>),
    File(File),
}

impl Read for ContentReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.0 {
            ReaderInner::Memory(cursor) => cursor.read(buf),
            ReaderInner::File(file) => file.read(buf),
        }
    }
}

/// Sink that reconstructs an [`Entity`] from an inbound transfer-decoded
/// stream.
///
/// The connection layer pushes decoded payload chunks into the sink; the sink
/// routes them into memory or a spooled temp file per the store policy, and
/// unwraps gzip on the fly when the wire was compressed. `finish` produces the
/// entity tagged with the original wire flags.
pub struct EntitySink {
    writer: SinkWriter,
    chunked: bool,
    gzip: bool,
}

enum SinkWriter {
    Plain(Store),
    Gzip(Box<GzDecoder<Store>>),
}

enum Store {
    Memory(Vec<u8>),
    Spool { file: BufWriter<File>, temp: TempFile },
}

impl Write for Store {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Store::Memory(vec) => vec.write(buf),
            Store::Spool { file, .. } => file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Store::Memory(_) => Ok(()),
            Store::Spool { file, .. } => file.flush(),
        }
    }
}

impl EntitySink {
    /// Picks the backing store for an inbound body.
    ///
    /// A fixed-length body below [`MEMORY_STORE_LIMIT`] with no gzip unwrap
    /// stays in memory; a chunked body always spools since its size is not
    /// known in advance.
    pub fn new(kind: BodyKind, gzip: bool) -> io::Result<Self> {
        let store = match kind {
            BodyKind::Fixed(size) if size < MEMORY_STORE_LIMIT && !gzip => {
                Store::Memory(Vec::with_capacity(size as usize))
            }
            BodyKind::Empty => Store::Memory(Vec::new()),
            _ => {
                let (file, temp) = TempFile::create()?;
                trace!(path = %temp.path().display(), "spooling inbound body");
                Store::Spool { file: BufWriter::new(file), temp }
            }
        };

        let writer =
            if gzip { SinkWriter::Gzip(Box::new(GzDecoder::new(store))) } else { SinkWriter::Plain(store) };

        Ok(Self { writer, chunked: kind.is_chunked(), gzip })
    }

    /// Appends a run of transfer-decoded (but possibly still gzipped) bytes.
    pub fn push(&mut self, bytes: &[u8]) -> io::Result<()> {
        match &mut self.writer {
            SinkWriter::Plain(store) => store.write_all(bytes),
            SinkWriter::Gzip(decoder) => decoder.write_all(bytes),
        }
    }

    /// Completes the body, producing an entity that holds the decoded bytes
    /// tagged with the original wire flags.
    pub fn finish(self) -> io::Result<Entity> {
        let store = match self.writer {
            SinkWriter::Plain(store) => store,
            SinkWriter::Gzip(decoder) => decoder.finish()?,
        };

        match store {
            Store::Memory(vec) => Ok(Entity::from_bytes(vec, self.chunked, self.gzip)),
            Store::Spool { mut file, temp } => {
                file.flush()?;
                drop(file);
                Ok(Entity::from_temp(temp, self.chunked, self.gzip))
            }
        }
    }
}

impl fmt::Debug for EntitySink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntitySink").field("chunked", &self.chunked).field("gzip", &self.gzip).finish()
    }
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A uniquely named file under the OS temp directory, owned exclusively by
/// its holder and removed on drop.
#[derive(Debug)]
struct TempFile {
    path: PathBuf,
}

impl TempFile {
    fn create() -> io::Result<(File, TempFile)> {
        let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!("framewire-{}-{}.body", process::id(), seq));
        let file = File::options().read(true).write(true).create_new(true).open(&path)?;
        Ok((file, TempFile { path }))
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "failed to remove spooled body file");
            }
        }
    }
}
