//! Light-mode hashing throughput on a small test cache.
//!
//! cargo run --release --example bench_light [iterations]

use std::time::Instant;

use okcash_pow::Light;

fn main() {
    let iterations: u64 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(2_000);

    // 1 MiB cache, 64 MiB dataset: far below epoch 0, same access pattern
    let cache_bytes = 1 << 20;
    let full_size = 64 << 20;

    let started = Instant::now();
    let light = match Light::with_seed(cache_bytes, &[0u8; 32]) {
        Ok(light) => light,
        Err(e) => {
            eprintln!("cache build failed: {}", e);
            std::process::exit(1);
        }
    };
    println!("cache: {} bytes in {:?}", light.cache_size(), started.elapsed());

    let header = [0x5au8; 32];
    let started = Instant::now();
    let mut best = [0xFFu8; 32];
    for nonce in 0..iterations {
        match light.compute_with_size(full_size, &header, nonce) {
            Ok(out) if out.result < best => best = out.result,
            Ok(_) => {}
            Err(e) => {
                eprintln!("hash failed: {}", e);
                std::process::exit(1);
            }
        }
    }
    let elapsed = started.elapsed().as_secs_f64();

    println!("{} hashes in {:.3}s", iterations, elapsed);
    println!("hashrate: {:.1} H/s", iterations as f64 / elapsed);
    println!("best result: {}", hex::encode(best));
}
