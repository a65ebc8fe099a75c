use std::time::Instant;

use super::error::{EthashError, EthashResult};
use super::keccak::keccak_512;
use super::node::{Node, NODE_BYTES};
use super::CACHE_ROUNDS;

/// Epoch cache: the node array light verification and DAG generation read from.
///
/// Read-only once built. Construction is strictly sequential; every node
/// depends on the one before it.
#[derive(Clone, PartialEq, Eq)]
pub struct Cache {
    nodes: Vec<Node>,
}

impl Cache {
    /// Build the cache for `seed`.
    ///
    /// `cache_size` must be a non-zero multiple of the node size. It is
    /// validated before anything is allocated.
    pub fn build(cache_size: u64, seed: &[u8; 32]) -> EthashResult<Self> {
        if cache_size == 0 || cache_size % NODE_BYTES as u64 != 0 {
            return Err(EthashError::invalid(format!(
                "cache size {} is not a non-zero multiple of {}",
                cache_size, NODE_BYTES
            )));
        }
        let num_nodes = cache_size / NODE_BYTES as u64;
        if num_nodes > u32::MAX as u64 {
            return Err(EthashError::invalid(format!("cache size {} too large", cache_size)));
        }
        let num_nodes = usize::try_from(num_nodes)
            .map_err(|_| EthashError::Allocation { bytes: cache_size })?;

        let mut nodes = Vec::new();
        nodes
            .try_reserve_exact(num_nodes)
            .map_err(|_| EthashError::Allocation { bytes: cache_size })?;

        tracing::info!(
            cache_mb = (cache_size as f64) / (1024.0 * 1024.0),
            nodes = num_nodes,
            "Building cache"
        );
        let started = Instant::now();

        nodes.push(Node::from_bytes(keccak_512(seed)));
        for i in 1..num_nodes {
            let next = keccak_512(nodes[i - 1].as_bytes());
            nodes.push(Node::from_bytes(next));
        }

        let n = num_nodes as u32;
        for _ in 0..CACHE_ROUNDS {
            for i in 0..num_nodes {
                let src = (nodes[i].word(0) % n) as usize;
                let mut data = nodes[(num_nodes - 1 + i) % num_nodes];
                data ^= &nodes[src];
                nodes[i] = Node::from_bytes(keccak_512(data.as_bytes()));
            }
        }

        tracing::info!(elapsed_ms = started.elapsed().as_millis() as u64, "Cache ready");
        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes, never zero
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn size_bytes(&self) -> u64 {
        (self.nodes.len() * NODE_BYTES) as u64
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("nodes", &self.nodes.len())
            .field("size_bytes", &self.size_bytes())
            .finish()
    }
}
