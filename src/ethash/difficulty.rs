use super::hashimoto::{final_hash, seed_hash};

/// True if `hash <= boundary`, both read as 256-bit big-endian integers.
///
/// The boundary is 2^256 / difficulty.
pub fn check_difficulty(hash: &[u8; 32], boundary: &[u8; 32]) -> bool {
    // Compare as big-endian (MSB first)
    for i in 0..32 {
        if hash[i] != boundary[i] {
            return hash[i] < boundary[i];
        }
    }
    true // equal to the boundary still passes
}

/// Result hash implied by a claimed mix digest, without touching cache or DAG
pub fn quick_hash(header_hash: &[u8; 32], nonce: u64, mix_hash: &[u8; 32]) -> [u8; 32] {
    final_hash(&seed_hash(header_hash, nonce), mix_hash)
}

/// Cheap pre-verification of a submitted nonce.
///
/// Only proves the claimed mix digest would meet the boundary; the mix itself
/// still has to be checked with a light or full compute.
pub fn quick_check_difficulty(
    header_hash: &[u8; 32],
    nonce: u64,
    mix_hash: &[u8; 32],
    boundary: &[u8; 32],
) -> bool {
    check_difficulty(&quick_hash(header_hash, nonce, mix_hash), boundary)
}

/// Boundary for a difficulty: floor(2^256 / difficulty), big-endian.
///
/// Difficulty 0 and 1 both map to the all-ones boundary.
pub fn boundary_from_difficulty(difficulty: u64) -> [u8; 32] {
    if difficulty <= 1 {
        return [0xFF; 32];
    }
    let d = difficulty as u128;
    let mut boundary = [0u8; 32];
    // long division of 1 followed by 32 zero bytes
    let mut rem: u128 = 1;
    for byte in boundary.iter_mut() {
        let cur = rem << 8;
        *byte = (cur / d) as u8;
        rem = cur % d;
    }
    boundary
}
