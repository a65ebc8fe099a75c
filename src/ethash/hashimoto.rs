//! Mix engine: turns (header hash, nonce) into a result hash and mix digest
//! by sampling dataset pages. Light and full mode share one loop and differ
//! only in where dataset nodes come from.

use super::cache::Cache;
use super::dataset::{calc_dataset_item, dataset_nodes};
use super::error::EthashResult;
use super::keccak::{keccak_256, keccak_512};
use super::node::{fnv_hash, Node, NODE_BYTES, NODE_WORDS};
use super::{ACCESSES, MIX_NODES, MIX_WORDS};

/// Outcome of one proof-of-work evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnValue {
    pub result: [u8; 32],
    pub mix_hash: [u8; 32],
}

/// Source of dataset nodes for the mix loop
pub trait DatasetLookup {
    fn lookup(&self, index: u32) -> Node;
}

/// Recomputes every node from the cache (light mode)
pub struct CacheLookup<'a>(pub &'a Cache);

impl DatasetLookup for CacheLookup<'_> {
    fn lookup(&self, index: u32) -> Node {
        calc_dataset_item(self.0, index)
    }
}

/// Reads nodes straight out of a materialized dataset (full mode)
pub struct DatasetSlice<'a>(pub &'a [u8]);

impl DatasetLookup for DatasetSlice<'_> {
    fn lookup(&self, index: u32) -> Node {
        let at = index as usize * NODE_BYTES;
        Node::read(&self.0[at..at + NODE_BYTES])
    }
}

/// Keccak-512 of header hash followed by the little-endian nonce
pub(crate) fn seed_hash(header_hash: &[u8; 32], nonce: u64) -> [u8; 64] {
    let mut input = [0u8; 40];
    input[..32].copy_from_slice(header_hash);
    input[32..].copy_from_slice(&nonce.to_le_bytes());
    keccak_512(&input)
}

/// Keccak-256 of the seed hash followed by the compressed mix
pub(crate) fn final_hash(seed: &[u8; 64], mix_hash: &[u8; 32]) -> [u8; 32] {
    let mut input = [0u8; 96];
    input[..64].copy_from_slice(seed);
    input[64..].copy_from_slice(mix_hash);
    keccak_256(&input)
}

/// Core proof-of-work loop over any dataset source of `full_size` bytes
pub fn hashimoto<L: DatasetLookup + ?Sized>(
    lookup: &L,
    full_size: u64,
    header_hash: &[u8; 32],
    nonce: u64,
) -> EthashResult<ReturnValue> {
    // every node index, not just every page index, must fit in a u32
    let num_full_pages = dataset_nodes(full_size)? / MIX_NODES as u32;

    let seed = seed_hash(header_hash, nonce);
    let seed_words = Node::from_bytes(seed).words();

    let mut mix = [0u32; MIX_WORDS];
    for (w, word) in mix.iter_mut().enumerate() {
        *word = seed_words[w % NODE_WORDS];
    }

    for i in 0..ACCESSES {
        let index = fnv_hash(seed_words[0] ^ i, mix[i as usize % MIX_WORDS]) % num_full_pages;
        for n in 0..MIX_NODES {
            let dag_node = lookup.lookup(index * MIX_NODES as u32 + n as u32).words();
            let page = &mut mix[n * NODE_WORDS..(n + 1) * NODE_WORDS];
            for (w, d) in page.iter_mut().zip(dag_node) {
                *w = fnv_hash(*w, d);
            }
        }
    }

    // compress: every 4 words fold into 1
    let mut mix_hash = [0u8; 32];
    for (out, group) in mix_hash.chunks_exact_mut(4).zip(mix.chunks_exact(4)) {
        let reduction = group[1..].iter().fold(group[0], |acc, &w| fnv_hash(acc, w));
        out.copy_from_slice(&reduction.to_le_bytes());
    }

    Ok(ReturnValue {
        result: final_hash(&seed, &mix_hash),
        mix_hash,
    })
}

/// Light mode: dataset nodes recomputed from the cache on every access
pub fn light_compute(
    cache: &Cache,
    full_size: u64,
    header_hash: &[u8; 32],
    nonce: u64,
) -> EthashResult<ReturnValue> {
    hashimoto(&CacheLookup(cache), full_size, header_hash, nonce)
}

/// Full mode: `dataset` is the whole materialized DAG
pub fn full_compute(dataset: &[u8], header_hash: &[u8; 32], nonce: u64) -> EthashResult<ReturnValue> {
    hashimoto(&DatasetSlice(dataset), dataset.len() as u64, header_hash, nonce)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ethash::dataset::compute_full_data;
    use std::ops::ControlFlow;

    const HEADER: &str = "c9149cc0386e689d789a1c2f3d5d169a61a6218ed30e74414dc736e442ef3d1f";

    fn header() -> [u8; 32] {
        let mut h = [0u8; 32];
        h.copy_from_slice(&hex::decode(HEADER).unwrap());
        h
    }

    #[test]
    fn test_light_golden_vector() {
        let cache = Cache::build(1024, &[0u8; 32]).unwrap();
        let out = light_compute(&cache, 32 * 1024, &header(), 0).unwrap();
        assert_eq!(
            hex::encode(out.mix_hash),
            "e4073cffaef931d37117cefd9afd27ea0f1cad6a981dd2605c4a1ac97c519800"
        );
        assert_eq!(
            hex::encode(out.result),
            "d3539235ee2e6f8db665c0a72169f55b7f6c605712330b778ec3944f0eb5a557"
        );
    }

    #[test]
    fn test_full_matches_light() {
        let cache = Cache::build(1024, &[0u8; 32]).unwrap();
        let mut dataset = vec![0u8; 32 * 1024];
        compute_full_data(&mut dataset, &cache, |_| ControlFlow::Continue(())).unwrap();

        for nonce in [0u64, 1, 0x7c7c_597c, u64::MAX] {
            let light = light_compute(&cache, 32 * 1024, &header(), nonce).unwrap();
            let full = full_compute(&dataset, &header(), nonce).unwrap();
            assert_eq!(light, full, "nonce {}", nonce);
        }
    }

    #[test]
    fn test_nonce_is_little_endian() {
        let cache = Cache::build(1024, &[0u8; 32]).unwrap();
        let out = light_compute(&cache, 32 * 1024, &header(), 0x7c7c_597c).unwrap();
        assert_eq!(
            hex::encode(out.mix_hash),
            "5b615271609de2776996812776edbafeae5e4952427e769e6bc44bbd174ac6b5"
        );
        assert_eq!(
            hex::encode(out.result),
            "faea37e96a77c8b2084ac89625004f1147dd0ac251d312a646a92df33351bbb7"
        );
    }

    #[test]
    fn test_rejects_node_count_beyond_u32() {
        struct Zero;
        impl DatasetLookup for Zero {
            fn lookup(&self, _index: u32) -> Node {
                Node::zeroed()
            }
        }

        // 3 * 2^30 pages: the page count fits a u32, the node count does not
        let too_large = 3 * (1u64 << 30) * 128;
        assert!(hashimoto(&Zero, too_large, &header(), 7).is_err());

        // largest size whose node indices all fit
        let largest = (u32::MAX as u64 - 1) * 64;
        for nonce in [0u64, 7, u64::MAX] {
            assert!(hashimoto(&Zero, largest, &header(), nonce).is_ok());
        }
    }

    #[test]
    fn test_rejects_bad_dataset_size() {
        let cache = Cache::build(1024, &[0u8; 32]).unwrap();
        assert!(light_compute(&cache, 32 * 1024 + 64, &header(), 0).is_err());
        assert!(light_compute(&cache, 0, &header(), 0).is_err());
        assert!(full_compute(&[0u8; 64], &header(), 0).is_err());
    }
}
