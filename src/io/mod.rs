//! On-disk DAG files.
//!
//! Layout: `[8-byte magic, native byte order][dataset bytes]`. One file per
//! epoch, named from the format revision and the seed hash, reused across
//! runs when its size and magic number check out. Contents are never
//! re-verified; the magic number is only written once generation completed.

#[cfg(unix)]
pub mod posix;
#[cfg(windows)]
pub mod windows;

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::ethash::{EthashError, EthashResult, DAG_MAGIC_NUM, DAG_MAGIC_NUM_SIZE};

#[cfg(unix)]
pub use posix::PosixIo as NativeIo;
#[cfg(windows)]
pub use windows::WindowsIo as NativeIo;

/// File and path primitives the persistence layer needs from the platform.
///
/// All calls are blocking.
pub trait DagIo {
    /// Create `dirname`; an existing directory is not an error
    fn mkdir(&self, dirname: &Path) -> std::io::Result<()>;

    /// Open an existing file for read and write
    fn open_existing(&self, path: &Path) -> std::io::Result<File>;

    /// Create or truncate a file for read and write
    fn create(&self, path: &Path) -> std::io::Result<File>;

    fn file_size(&self, file: &File) -> std::io::Result<u64>;

    fn join_path(&self, dirname: &Path, filename: &str) -> PathBuf;

    /// Per-user application data directory for DAG files
    fn default_dirname(&self) -> Option<PathBuf>;
}

/// Why an existing DAG file cannot be reused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stale {
    SizeMismatch { expected: u64, found: u64 },
    /// `found` is `None` when the prefix could not be read
    MagicMismatch { found: Option<u64> },
}

/// Outcome of [`prepare`]
#[derive(Debug)]
pub enum Memo {
    /// Existing file with the right size and magic; contents are trusted
    Match(File),
    /// Freshly created file of the right length; contents must be generated
    Mismatch(File),
    /// Existing file that must be recreated; it has been closed
    Stale(Stale),
}

/// DAG file name for a seed. The whole seed is encoded so files of different
/// epochs can never share a name.
pub fn mutable_name(revision: u32, seed_hash: &[u8; 32]) -> String {
    format!("full-R{}-{}", revision, hex::encode(seed_hash))
}

pub fn dag_path<I: DagIo + ?Sized>(io: &I, dirname: &Path, revision: u32, seed_hash: &[u8; 32]) -> PathBuf {
    io.join_path(dirname, &mutable_name(revision, seed_hash))
}

/// Open the DAG file for `seed_hash` under `dirname`, reusing it when it is
/// valid, otherwise creating it at its full length.
///
/// `file_size` is the dataset size without the magic prefix. Every filesystem
/// failure is fatal for this attempt and comes back as [`EthashError::Io`].
pub fn prepare<I: DagIo + ?Sized>(
    io: &I,
    dirname: &Path,
    revision: u32,
    seed_hash: &[u8; 32],
    file_size: u64,
    force_create: bool,
) -> EthashResult<Memo> {
    io.mkdir(dirname)
        .map_err(|e| EthashError::io("Could not create the DAG directory", dirname, e))?;

    let path = dag_path(io, dirname, revision, seed_hash);
    tracing::debug!(path = %path.display(), force_create, "Preparing DAG file");

    if !force_create {
        match io.open_existing(&path) {
            Ok(file) => return probe(io, file, &path, file_size),
            Err(e) => tracing::debug!(path = %path.display(), error = %e, "No existing DAG file"),
        }
    }

    let mut file = io
        .create(&path)
        .map_err(|e| EthashError::io("Could not create DAG file", &path, e))?;
    // reserve the exact length up front, then fill
    file.seek(SeekFrom::Start(file_size + DAG_MAGIC_NUM_SIZE - 1))
        .map_err(|e| {
            EthashError::io("Could not seek to the end of DAG file. Insufficient space?", &path, e)
        })?;
    file.write_all(b"\n")
        .map_err(|e| {
            EthashError::io("Could not write in the end of DAG file. Insufficient space?", &path, e)
        })?;
    file.flush()
        .map_err(|e| EthashError::io("Could not flush at end of DAG file. Insufficient space?", &path, e))?;

    Ok(Memo::Mismatch(file))
}

/// Size and magic number checks on an existing file
fn probe<I: DagIo + ?Sized>(io: &I, mut file: File, path: &Path, file_size: u64) -> EthashResult<Memo> {
    let found_size = io
        .file_size(&file)
        .map_err(|e| EthashError::io("Could not query size of DAG file", path, e))?;

    let stored = found_size.checked_sub(DAG_MAGIC_NUM_SIZE);
    if stored != Some(file_size) {
        return Ok(Memo::Stale(Stale::SizeMismatch {
            expected: file_size,
            found: stored.unwrap_or(0),
        }));
    }

    let mut magic = [0u8; DAG_MAGIC_NUM_SIZE as usize];
    if let Err(e) = file.read_exact(&mut magic) {
        tracing::error!(path = %path.display(), error = %e, "Could not read from DAG file");
        return Ok(Memo::Stale(Stale::MagicMismatch { found: None }));
    }
    // written by this host, so native order
    let magic = u64::from_ne_bytes(magic);
    if magic != DAG_MAGIC_NUM {
        return Ok(Memo::Stale(Stale::MagicMismatch { found: Some(magic) }));
    }

    Ok(Memo::Match(file))
}
