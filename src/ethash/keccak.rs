use sha3::{Digest, Keccak256, Keccak512};

/// Keccak-256 (original padding, not FIPS SHA3-256)
pub fn keccak_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Keccak-512 (original padding, not FIPS SHA3-512)
pub fn keccak_512(data: &[u8]) -> [u8; 64] {
    let mut hasher = Keccak512::new();
    hasher.update(data);
    let mut out = [0u8; 64];
    out.copy_from_slice(&hasher.finalize());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak_256_empty() {
        assert_eq!(
            hex::encode(keccak_256(&[])),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_keccak_256_zero_word() {
        assert_eq!(
            hex::encode(keccak_256(&[0u8; 32])),
            "290decd9548b62a8d60345a988386fc84ba6bc95484008f6362f93160ef3e563"
        );
    }

    #[test]
    fn test_keccak_512_width() {
        let a = keccak_512(b"okcash");
        let b = keccak_512(b"okcash");
        assert_eq!(a, b);
        assert_ne!(a[..32], a[32..]);
    }
}
