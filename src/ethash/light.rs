use std::fmt;

use super::cache::Cache;
use super::dag::{cache_size, check_block_number, dataset_size, seedhash};
use super::dataset::calc_dataset_item;
use super::error::{EthashError, EthashResult};
use super::hashimoto::{light_compute, ReturnValue};
use super::node::Node;

/// Light client handle: owns the epoch cache and verifies hashes without the DAG
pub struct Light {
    cache: Cache,
    seed_hash: [u8; 32],
    block_number: Option<u64>,
}

impl Light {
    /// Build the cache for the epoch of `block_number`
    pub fn new(block_number: u64) -> EthashResult<Self> {
        check_block_number(block_number)?;
        let seed_hash = seedhash(block_number);
        Ok(Self {
            cache: Cache::build(cache_size(block_number), &seed_hash)?,
            seed_hash,
            block_number: Some(block_number),
        })
    }

    /// Build a cache of an explicit size from an explicit seed.
    ///
    /// The handle belongs to no epoch: [`Light::compute`] and the epoch-sized
    /// full constructors refuse it, use the `*_with_size` calls instead.
    pub fn with_seed(cache_size: u64, seed: &[u8; 32]) -> EthashResult<Self> {
        Ok(Self {
            cache: Cache::build(cache_size, seed)?,
            seed_hash: *seed,
            block_number: None,
        })
    }

    /// Proof-of-work against the dataset size of this handle's epoch
    pub fn compute(&self, header_hash: &[u8; 32], nonce: u64) -> EthashResult<ReturnValue> {
        self.compute_with_size(dataset_size(self.epoch_block()?), header_hash, nonce)
    }

    pub fn compute_with_size(
        &self,
        full_size: u64,
        header_hash: &[u8; 32],
        nonce: u64,
    ) -> EthashResult<ReturnValue> {
        light_compute(&self.cache, full_size, header_hash, nonce)
    }

    /// One dataset node, recomputed from the cache
    pub fn dataset_item(&self, node_index: u32) -> Node {
        calc_dataset_item(&self.cache, node_index)
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn cache_size(&self) -> u64 {
        self.cache.size_bytes()
    }

    /// Block the cache was built for, `None` for [`Light::with_seed`] handles
    pub fn block_number(&self) -> Option<u64> {
        self.block_number
    }

    pub fn seed_hash(&self) -> &[u8; 32] {
        &self.seed_hash
    }

    /// Block number of an epoch-built handle, an error for explicit-seed ones
    pub(crate) fn epoch_block(&self) -> EthashResult<u64> {
        self.block_number.ok_or_else(|| {
            EthashError::invalid(
                "light handle was built from an explicit seed and has no epoch; pass a dataset size",
            )
        })
    }
}

impl fmt::Debug for Light {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Light")
            .field("block_number", &self.block_number)
            .field("cache_size", &self.cache_size())
            .finish()
    }
}
