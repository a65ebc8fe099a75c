use std::fmt;
use std::fs::File;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::time::Instant;

use memmap2::MmapMut;

use super::dag::dataset_size;
use super::dataset::{compute_full_data, compute_full_data_parallel, dataset_nodes};
use super::error::{EthashError, EthashResult, FullNewError};
use super::hashimoto::{full_compute, ReturnValue};
use super::light::Light;
use super::{DAG_MAGIC_NUM, DAG_MAGIC_NUM_SIZE, REVISION};
use crate::io::{self, DagIo, Memo, NativeIo};

/// Full handle construction settings
#[derive(Debug, Clone, Default)]
pub struct FullOptions {
    /// DAG directory; `None` uses the platform default
    pub dirname: Option<PathBuf>,
    /// Skip the reuse probe and always regenerate
    pub force_create: bool,
    /// Generate the dataset on the rayon thread pool
    pub parallel: bool,
}

/// Backing memory of a dataset. A mapped DAG owns its open file; both are
/// released together when the storage drops.
enum Storage {
    Mapped {
        map: MmapMut,
        _file: File,
        path: PathBuf,
    },
    Memory(Vec<u8>),
}

impl Storage {
    fn dataset(&self) -> &[u8] {
        match self {
            Storage::Mapped { map, .. } => &map[DAG_MAGIC_NUM_SIZE as usize..],
            Storage::Memory(data) => data,
        }
    }
}

/// Full client handle: the materialized dataset plus the cache it was built from
pub struct Full {
    storage: Storage,
    full_size: u64,
    light: Light,
}

impl Full {
    /// Build or reuse the DAG of `light`'s epoch in the default directory.
    ///
    /// Takes the light handle; it is handed back inside the error if
    /// construction fails. Handles from [`Light::with_seed`] have no epoch
    /// and are refused; use [`Full::new_in`] with their dataset size.
    pub fn new<F>(light: Light, progress: F) -> Result<Self, FullNewError>
    where
        F: Fn(u32) -> ControlFlow<()> + Sync,
    {
        Self::with_options(light, &FullOptions::default(), progress)
    }

    pub fn with_options<F>(light: Light, options: &FullOptions, progress: F) -> Result<Self, FullNewError>
    where
        F: Fn(u32) -> ControlFlow<()> + Sync,
    {
        let block_number = match light.epoch_block() {
            Ok(block_number) => block_number,
            Err(e) => return Err(FullNewError::new(light, e)),
        };
        let dirname = match options.dirname.clone().or_else(|| NativeIo.default_dirname()) {
            Some(dir) => dir,
            None => return Err(FullNewError::new(light, EthashError::DefaultDirUnavailable)),
        };
        let seed_hash = *light.seed_hash();
        Self::new_in(
            &dirname,
            &seed_hash,
            dataset_size(block_number),
            light,
            options,
            progress,
        )
    }

    /// Build or reuse a DAG of explicit size and seed under `dirname`.
    /// `options.dirname` is ignored.
    pub fn new_in<F>(
        dirname: &Path,
        seed_hash: &[u8; 32],
        full_size: u64,
        light: Light,
        options: &FullOptions,
        progress: F,
    ) -> Result<Self, FullNewError>
    where
        F: Fn(u32) -> ControlFlow<()> + Sync,
    {
        Self::new_in_with_io(&NativeIo, dirname, seed_hash, full_size, light, options, progress)
    }

    /// [`Full::new_in`] over a caller-supplied set of file primitives
    pub fn new_in_with_io<I, F>(
        io: &I,
        dirname: &Path,
        seed_hash: &[u8; 32],
        full_size: u64,
        light: Light,
        options: &FullOptions,
        progress: F,
    ) -> Result<Self, FullNewError>
    where
        I: DagIo + ?Sized,
        F: Fn(u32) -> ControlFlow<()> + Sync,
    {
        match map_dag(io, dirname, seed_hash, full_size, &light, options, &progress) {
            Ok(storage) => Ok(Self {
                storage,
                full_size,
                light,
            }),
            Err(e) => Err(FullNewError::new(light, e)),
        }
    }

    /// Dataset held in memory only, for callers that cannot or will not use a DAG file
    pub fn in_memory<F>(light: Light, parallel: bool, progress: F) -> Result<Self, FullNewError>
    where
        F: Fn(u32) -> ControlFlow<()> + Sync,
    {
        let full_size = match light.epoch_block() {
            Ok(block_number) => dataset_size(block_number),
            Err(e) => return Err(FullNewError::new(light, e)),
        };
        Self::in_memory_with_size(light, full_size, parallel, progress)
    }

    pub fn in_memory_with_size<F>(
        light: Light,
        full_size: u64,
        parallel: bool,
        progress: F,
    ) -> Result<Self, FullNewError>
    where
        F: Fn(u32) -> ControlFlow<()> + Sync,
    {
        match fill_memory(full_size, &light, parallel, &progress) {
            Ok(data) => Ok(Self {
                storage: Storage::Memory(data),
                full_size,
                light,
            }),
            Err(e) => Err(FullNewError::new(light, e)),
        }
    }

    pub fn compute(&self, header_hash: &[u8; 32], nonce: u64) -> EthashResult<ReturnValue> {
        full_compute(self.dag(), header_hash, nonce)
    }

    /// Raw dataset bytes, without the file's magic prefix
    pub fn dag(&self) -> &[u8] {
        self.storage.dataset()
    }

    pub fn dag_size(&self) -> u64 {
        self.full_size
    }

    pub fn light(&self) -> &Light {
        &self.light
    }

    /// Backing DAG file, `None` for an in-memory dataset
    pub fn path(&self) -> Option<&Path> {
        match &self.storage {
            Storage::Mapped { path, .. } => Some(path),
            Storage::Memory(_) => None,
        }
    }

    /// Release the dataset and take the cache back
    pub fn into_light(self) -> Light {
        self.light
    }
}

impl fmt::Debug for Full {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Full")
            .field("full_size", &self.full_size)
            .field("path", &self.path())
            .field("light", &self.light)
            .finish()
    }
}

fn generate<F>(mem: &mut [u8], light: &Light, parallel: bool, progress: &F) -> EthashResult<()>
where
    F: Fn(u32) -> ControlFlow<()> + Sync,
{
    tracing::info!(
        dataset_mb = (mem.len() as f64) / (1024.0 * 1024.0),
        parallel,
        "Generating DAG"
    );
    let started = Instant::now();
    if parallel {
        compute_full_data_parallel(mem, light.cache(), progress)?;
    } else {
        compute_full_data(mem, light.cache(), progress)?;
    }
    tracing::info!(elapsed_ms = started.elapsed().as_millis() as u64, "DAG generated");
    Ok(())
}

fn map_dag<I, F>(
    io: &I,
    dirname: &Path,
    seed_hash: &[u8; 32],
    full_size: u64,
    light: &Light,
    options: &FullOptions,
    progress: &F,
) -> EthashResult<Storage>
where
    I: DagIo + ?Sized,
    F: Fn(u32) -> ControlFlow<()> + Sync,
{
    dataset_nodes(full_size)?;
    let path = io::dag_path(io, dirname, REVISION, seed_hash);

    let memo = io::prepare(io, dirname, REVISION, seed_hash, full_size, options.force_create)?;
    let (file, reuse) = match memo {
        Memo::Match(file) => (file, true),
        Memo::Mismatch(file) => (file, false),
        Memo::Stale(stale) => {
            tracing::warn!(path = %path.display(), ?stale, "Existing DAG file is stale, recreating");
            match io::prepare(io, dirname, REVISION, seed_hash, full_size, true)? {
                Memo::Mismatch(file) => (file, false),
                other => {
                    return Err(EthashError::io(
                        "Could not recreate DAG file after finding existing DAG with unexpected size",
                        &path,
                        std::io::Error::new(std::io::ErrorKind::Other, format!("{:?}", other)),
                    ))
                }
            }
        }
    };

    file.set_len(full_size + DAG_MAGIC_NUM_SIZE)
        .map_err(|e| EthashError::io("Could not resize DAG file", &path, e))?;
    // SAFETY: the mapping lives next to its file in `Storage`; two handles on
    // one path must be serialized by the caller
    let mut map = unsafe { MmapMut::map_mut(&file) }
        .map_err(|e| EthashError::io("Could not memory map DAG file", &path, e))?;

    if reuse {
        tracing::info!(path = %path.display(), "DAG file already existed; reusing");
        return Ok(Storage::Mapped { map, _file: file, path });
    }

    let data_start = DAG_MAGIC_NUM_SIZE as usize;
    generate(&mut map[data_start..], light, options.parallel, progress)?;
    map.flush()
        .map_err(|e| EthashError::io("Could not flush DAG contents", &path, e))?;

    // only a complete DAG gets its magic number
    map[..data_start].copy_from_slice(&DAG_MAGIC_NUM.to_ne_bytes());
    map.flush_range(0, data_start)
        .map_err(|e| EthashError::io("Could not write the DAG magic number", &path, e))?;

    Ok(Storage::Mapped { map, _file: file, path })
}

fn fill_memory<F>(full_size: u64, light: &Light, parallel: bool, progress: &F) -> EthashResult<Vec<u8>>
where
    F: Fn(u32) -> ControlFlow<()> + Sync,
{
    dataset_nodes(full_size)?;
    let len = usize::try_from(full_size).map_err(|_| EthashError::Allocation { bytes: full_size })?;
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| EthashError::Allocation { bytes: full_size })?;
    data.resize(len, 0);
    generate(&mut data, light, parallel, progress)?;
    Ok(data)
}
