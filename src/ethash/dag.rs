use super::error::{EthashError, EthashResult};
use super::keccak::keccak_256;
use super::{
    CACHE_BYTES_GROWTH, CACHE_BYTES_INIT, DATASET_BYTES_GROWTH, DATASET_BYTES_INIT, EPOCH_LENGTH,
    HASH_BYTES, MAX_EPOCH, MIX_BYTES,
};

/// Per-epoch DAG parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpochInfo {
    pub epoch: u64,
    pub seed_hash: [u8; 32],
    pub cache_bytes: u64,
    pub dataset_bytes: u64,
}

impl EpochInfo {
    pub fn for_block(block_number: u64) -> Self {
        Self {
            epoch: epoch_from_height(block_number),
            seed_hash: seedhash(block_number),
            cache_bytes: cache_size(block_number),
            dataset_bytes: dataset_size(block_number),
        }
    }

    /// Like [`EpochInfo::for_block`], but rejects blocks past [`MAX_EPOCH`]
    pub fn try_for_block(block_number: u64) -> EthashResult<Self> {
        check_block_number(block_number)?;
        Ok(Self::for_block(block_number))
    }
}

/// Compute epoch from block height
pub fn epoch_from_height(height: u64) -> u64 {
    height / EPOCH_LENGTH
}

/// Epoch of `block_number`, or an error if it lies past [`MAX_EPOCH`]
pub fn check_block_number(block_number: u64) -> EthashResult<u64> {
    let epoch = epoch_from_height(block_number);
    if epoch > MAX_EPOCH {
        return Err(EthashError::invalid(format!(
            "block {} is in epoch {}, past the last supported epoch {}",
            block_number, epoch, MAX_EPOCH
        )));
    }
    Ok(epoch)
}

/// Simple primality test for size rounding
fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3u64;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

/// Largest `init + growth * epoch - unit - 2k * unit` whose unit count is prime.
/// `epoch` is clamped to [`MAX_EPOCH`].
fn prime_scaled_size(init: u64, growth: u64, unit: u64, epoch: u64) -> u64 {
    let mut sz = init + growth * epoch.min(MAX_EPOCH) - unit;
    while !is_prime(sz / unit) {
        sz -= 2 * unit;
    }
    sz
}

/// Cache size in bytes for the epoch of `block_number`.
///
/// Blocks past [`MAX_EPOCH`] get the sizes of that epoch; use
/// [`check_block_number`] to reject them instead.
pub fn cache_size(block_number: u64) -> u64 {
    prime_scaled_size(
        CACHE_BYTES_INIT,
        CACHE_BYTES_GROWTH,
        HASH_BYTES,
        epoch_from_height(block_number),
    )
}

/// Dataset size in bytes for the epoch of `block_number`
pub fn dataset_size(block_number: u64) -> u64 {
    prime_scaled_size(
        DATASET_BYTES_INIT,
        DATASET_BYTES_GROWTH,
        MIX_BYTES,
        epoch_from_height(block_number),
    )
}

/// Epoch seed: 32 zero bytes re-hashed once per elapsed epoch, clamped to [`MAX_EPOCH`]
pub fn seedhash(block_number: u64) -> [u8; 32] {
    let mut seed = [0u8; 32];
    for _ in 0..epoch_from_height(block_number).min(MAX_EPOCH) {
        seed = keccak_256(&seed);
    }
    seed
}
