use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use super::cache::Cache;
use super::error::{EthashError, EthashResult};
use super::keccak::keccak_512;
use super::node::{fnv_hash, Node, NODE_BYTES, NODE_WORDS};
use super::{DATASET_PARENTS, MIX_BYTES};

/// Compute one dataset node from the cache.
///
/// Pure in `(cache, node_index)`, so items can be generated in any order and
/// on any thread.
pub fn calc_dataset_item(cache: &Cache, node_index: u32) -> Node {
    let nodes = cache.nodes();
    let num_parent_nodes = nodes.len() as u32;

    let mut init = nodes[(node_index % num_parent_nodes) as usize];
    init.set_word(0, init.word(0) ^ node_index);
    let mut mix = Node::from_bytes(keccak_512(init.as_bytes())).words();

    for i in 0..DATASET_PARENTS {
        let parent_index = fnv_hash(node_index ^ i, mix[i as usize % NODE_WORDS]) % num_parent_nodes;
        let parent = nodes[parent_index as usize].words();
        for (w, p) in mix.iter_mut().zip(parent) {
            *w = fnv_hash(*w, p);
        }
    }

    Node::from_bytes(keccak_512(Node::from_words(&mix).as_bytes()))
}

/// Node count of a dataset buffer, after checking it is a whole number of mix pages
pub(crate) fn dataset_nodes(full_size: u64) -> EthashResult<u32> {
    if full_size == 0 || full_size % MIX_BYTES != 0 {
        return Err(EthashError::invalid(format!(
            "dataset size {} is not a non-zero multiple of {}",
            full_size, MIX_BYTES
        )));
    }
    u32::try_from(full_size / NODE_BYTES as u64)
        .map_err(|_| EthashError::invalid(format!("dataset size {} too large", full_size)))
}

/// Progress reported at item `n` of `max_n`, rounded up
fn percent(n: u32, max_n: u32) -> u32 {
    ((n as u64 * 100).div_ceil(max_n as u64)) as u32
}

/// Items between two progress reports (about 1%)
fn progress_step(max_n: u32) -> u32 {
    (max_n / 100).max(1)
}

/// Materialize the whole dataset into `mem`.
///
/// `progress` is called with a percentage roughly every 1% of items; returning
/// `ControlFlow::Break` stops generation with [`EthashError::Cancelled`].
pub fn compute_full_data<F>(mem: &mut [u8], cache: &Cache, progress: F) -> EthashResult<()>
where
    F: Fn(u32) -> ControlFlow<()>,
{
    let max_n = dataset_nodes(mem.len() as u64)?;
    let step = progress_step(max_n);

    for (n, chunk) in mem.chunks_exact_mut(NODE_BYTES).enumerate() {
        let n = n as u32;
        if n % step == 0 {
            let percent = percent(n, max_n);
            tracing::debug!(percent, "DAG progress");
            if progress(percent).is_break() {
                tracing::info!(item = n, "DAG generation cancelled");
                return Err(EthashError::Cancelled);
            }
        }
        chunk.copy_from_slice(calc_dataset_item(cache, n).as_bytes());
    }
    Ok(())
}

/// Parallel form of [`compute_full_data`].
///
/// Workers fill disjoint chunks of one progress step each. `progress` runs on
/// whichever worker starts a chunk, so percentages may arrive out of order.
pub fn compute_full_data_parallel<F>(mem: &mut [u8], cache: &Cache, progress: F) -> EthashResult<()>
where
    F: Fn(u32) -> ControlFlow<()> + Sync,
{
    let max_n = dataset_nodes(mem.len() as u64)?;
    let step = progress_step(max_n);
    let cancelled = AtomicBool::new(false);

    mem.par_chunks_mut(step as usize * NODE_BYTES)
        .enumerate()
        .for_each(|(chunk_index, chunk)| {
            if cancelled.load(Ordering::Relaxed) {
                return;
            }
            let first = chunk_index as u32 * step;
            let percent = percent(first, max_n);
            tracing::debug!(percent, "DAG progress");
            if progress(percent).is_break() {
                cancelled.store(true, Ordering::Relaxed);
                return;
            }
            for (offset, node) in chunk.chunks_exact_mut(NODE_BYTES).enumerate() {
                if cancelled.load(Ordering::Relaxed) {
                    return;
                }
                let item = calc_dataset_item(cache, first + offset as u32);
                node.copy_from_slice(item.as_bytes());
            }
        });

    if cancelled.into_inner() {
        tracing::info!("DAG generation cancelled");
        return Err(EthashError::Cancelled);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn test_cache() -> Cache {
        Cache::build(1024, &[0u8; 32]).unwrap()
    }

    #[test]
    fn test_item_zero_vector() {
        let item = calc_dataset_item(&test_cache(), 0);
        assert_eq!(
            hex::encode(item.as_bytes()),
            "4bc09fbd530a041dd2ec296110a29e8f130f179c59d223f51ecce3126e8b0c74\
             326abc2f32ccd9d7f976bd0944e3ccf8479db39343cbbffa467046ca97e2da63"
        );
    }

    #[test]
    fn test_bulk_matches_single_items() {
        let cache = test_cache();
        let mut mem = vec![0u8; 32 * 1024];
        compute_full_data(&mut mem, &cache, |_| ControlFlow::Continue(())).unwrap();

        for (i, chunk) in mem.chunks_exact(NODE_BYTES).enumerate() {
            assert_eq!(Node::read(chunk), calc_dataset_item(&cache, i as u32), "item {}", i);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let cache = test_cache();
        let mut seq = vec![0u8; 32 * 1024];
        let mut par = vec![0u8; 32 * 1024];
        compute_full_data(&mut seq, &cache, |_| ControlFlow::Continue(())).unwrap();
        compute_full_data_parallel(&mut par, &cache, |_| ControlFlow::Continue(())).unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn test_rejects_partial_mix_page() {
        let cache = test_cache();
        let mut mem = vec![0u8; 64 * 3];
        let err = compute_full_data(&mut mem, &cache, |_| ControlFlow::Continue(())).unwrap_err();
        assert!(matches!(err, EthashError::InvalidParameters(_)));
        assert!(compute_full_data(&mut [], &cache, |_| ControlFlow::Continue(())).is_err());
    }

    #[test]
    fn test_progress_every_percent() {
        let cache = test_cache();
        // 512 items: step 5, so reports at 0, 5, 10, ...
        let mut mem = vec![0u8; 32 * 1024];
        let seen = Mutex::new(Vec::new());
        compute_full_data(&mut mem, &cache, |p| {
            seen.lock().unwrap().push(p);
            ControlFlow::Continue(())
        })
        .unwrap();

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 103);
        assert_eq!(seen[0], 0);
        assert_eq!(seen[1], 1);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert!(*seen.last().unwrap() <= 100);
    }

    #[test]
    fn test_progress_logged_at_debug() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let cache = test_cache();
        let mut mem = vec![0u8; 32 * 1024];
        let reports = AtomicU32::new(0);
        tracing::subscriber::with_default(subscriber, || {
            compute_full_data(&mut mem, &cache, |_| {
                reports.fetch_add(1, Ordering::Relaxed);
                ControlFlow::Continue(())
            })
            .unwrap();
        });

        let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert_eq!(text.matches("DAG progress").count() as u32, reports.into_inner());
        assert!(text.contains("percent=0"));
    }

    #[test]
    fn test_small_dataset_reports_every_item() {
        let cache = test_cache();
        let mut mem = vec![0u8; 128 * 4];
        let calls = AtomicU32::new(0);
        compute_full_data(&mut mem, &cache, |_| {
            calls.fetch_add(1, Ordering::Relaxed);
            ControlFlow::Continue(())
        })
        .unwrap();
        assert_eq!(calls.into_inner(), 8);
    }

    #[test]
    fn test_cancel_on_first_report() {
        let cache = test_cache();
        let mut mem = vec![0u8; 32 * 1024];
        let err = compute_full_data(&mut mem, &cache, |_| ControlFlow::Break(())).unwrap_err();
        assert!(err.is_cancelled());
        assert!(mem.iter().all(|&b| b == 0));

        let err = compute_full_data_parallel(&mut mem, &cache, |_| ControlFlow::Break(())).unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn test_cancel_midway() {
        let cache = test_cache();
        let mut mem = vec![0u8; 32 * 1024];
        let err = compute_full_data(&mut mem, &cache, |p| {
            if p >= 50 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(Node::read(&mem[..NODE_BYTES]), calc_dataset_item(&cache, 0));
    }
}
