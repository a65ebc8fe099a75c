//! Okcash proof-of-work engine.
//!
//! Okcash runs Ethash with its own growth parameters: a 1 GiB cache and a
//! 1 GiB dataset at epoch 0. Everything here is consensus critical, so the
//! word layout is little-endian regardless of the host.

pub mod cache;
pub mod dag;
pub mod dataset;
pub mod difficulty;
pub mod error;
pub mod full;
pub mod hashimoto;
pub mod keccak;
pub mod light;
pub mod node;

pub use cache::Cache;
pub use dag::{cache_size, check_block_number, dataset_size, epoch_from_height, seedhash, EpochInfo};
pub use dataset::{calc_dataset_item, compute_full_data, compute_full_data_parallel};
pub use difficulty::{boundary_from_difficulty, check_difficulty, quick_check_difficulty, quick_hash};
pub use error::{EthashError, EthashResult, FullNewError};
pub use full::{Full, FullOptions};
pub use hashimoto::{full_compute, light_compute, ReturnValue};
pub use light::Light;
pub use node::{fnv_hash, Node};

/// DAG file format revision, part of the file name
pub const REVISION: u32 = 23;
/// Dataset size at epoch 0 (2^30)
pub const DATASET_BYTES_INIT: u64 = 1 << 30;
/// Dataset growth per epoch (2^23)
pub const DATASET_BYTES_GROWTH: u64 = 1 << 23;
/// Cache size at epoch 0 (2^30)
pub const CACHE_BYTES_INIT: u64 = 1 << 30;
/// Cache growth per epoch (2^17)
pub const CACHE_BYTES_GROWTH: u64 = 1 << 17;
/// Blocks per epoch
pub const EPOCH_LENGTH: u64 = 30_000;
/// Last epoch whose dataset node indices still fit in a u32 (dataset < 2^38 bytes)
pub const MAX_EPOCH: u64 = ((1 << 38) - DATASET_BYTES_INIT) / DATASET_BYTES_GROWTH;
/// Width of the mix buffer in bytes
pub const MIX_BYTES: u64 = 128;
/// Keccak-512 output, also the node size
pub const HASH_BYTES: u64 = 64;
/// Cache parents folded into every dataset item
pub const DATASET_PARENTS: u32 = 256;
/// Memory-hardening passes over the cache
pub const CACHE_ROUNDS: u32 = 3;
/// Dataset page reads per hash
pub const ACCESSES: u32 = 64;
/// Length of the magic number prefix of a DAG file
pub const DAG_MAGIC_NUM_SIZE: u64 = 8;
/// Marks a fully generated DAG file
pub const DAG_MAGIC_NUM: u64 = 0xFEE1_DEAD_BADD_CAFE;

/// 32-bit words in the mix buffer
pub const MIX_WORDS: usize = (MIX_BYTES / 4) as usize;
/// Nodes fetched per dataset access
pub const MIX_NODES: usize = MIX_WORDS / node::NODE_WORDS;
