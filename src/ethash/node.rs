use std::fmt;
use std::ops::BitXorAssign;

/// Bytes per node
pub const NODE_BYTES: usize = 64;
/// 32-bit words per node
pub const NODE_WORDS: usize = NODE_BYTES / 4;

pub const FNV_PRIME: u32 = 0x0100_0193;

/// FNV-style combine used between the Keccak calls
#[inline]
pub fn fnv_hash(a: u32, b: u32) -> u32 {
    a.wrapping_mul(FNV_PRIME) ^ b
}

/// 64-byte unit of cache and dataset storage.
///
/// Stored as raw bytes; word views decode little-endian on demand so the
/// layout is the same on every host.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Node([u8; NODE_BYTES]);

impl Node {
    pub const fn zeroed() -> Self {
        Self([0u8; NODE_BYTES])
    }

    pub const fn from_bytes(bytes: [u8; NODE_BYTES]) -> Self {
        Self(bytes)
    }

    /// Read a node out of a 64-byte slice of cache or dataset memory
    pub fn read(bytes: &[u8]) -> Self {
        let mut node = [0u8; NODE_BYTES];
        node.copy_from_slice(bytes);
        Self(node)
    }

    pub fn from_words(words: &[u32; NODE_WORDS]) -> Self {
        let mut node = Self::zeroed();
        for (chunk, word) in node.0.chunks_exact_mut(4).zip(words) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        node
    }

    pub fn as_bytes(&self) -> &[u8; NODE_BYTES] {
        &self.0
    }

    #[inline]
    pub fn word(&self, i: usize) -> u32 {
        let at = i * 4;
        u32::from_le_bytes([self.0[at], self.0[at + 1], self.0[at + 2], self.0[at + 3]])
    }

    #[inline]
    pub fn set_word(&mut self, i: usize, value: u32) {
        let at = i * 4;
        self.0[at..at + 4].copy_from_slice(&value.to_le_bytes());
    }

    pub fn double_word(&self, i: usize) -> u64 {
        let at = i * 8;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.0[at..at + 8]);
        u64::from_le_bytes(bytes)
    }

    pub fn words(&self) -> [u32; NODE_WORDS] {
        let mut words = [0u32; NODE_WORDS];
        for (i, word) in words.iter_mut().enumerate() {
            *word = self.word(i);
        }
        words
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl BitXorAssign<&Node> for Node {
    fn bitxor_assign(&mut self, rhs: &Node) {
        for (a, b) in self.0.iter_mut().zip(rhs.0.iter()) {
            *a ^= b;
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_views_are_little_endian() {
        let mut bytes = [0u8; NODE_BYTES];
        bytes[0] = 0x01;
        bytes[1] = 0x02;
        bytes[4] = 0xff;
        let node = Node::from_bytes(bytes);

        assert_eq!(node.word(0), 0x0201);
        assert_eq!(node.word(1), 0xff);
        assert_eq!(node.double_word(0), 0xff_0000_0201);
    }

    #[test]
    fn test_words_round_trip() {
        let mut words = [0u32; NODE_WORDS];
        for (i, w) in words.iter_mut().enumerate() {
            *w = (i as u32).wrapping_mul(0x9e37_79b9);
        }
        let node = Node::from_words(&words);
        assert_eq!(node.words(), words);

        let mut copy = node;
        copy.set_word(3, 7);
        assert_eq!(copy.word(3), 7);
        assert_eq!(copy.word(2), node.word(2));
    }

    #[test]
    fn test_xor_assign() {
        let a = Node::from_bytes([0xaa; NODE_BYTES]);
        let mut b = Node::from_bytes([0x0f; NODE_BYTES]);
        b ^= &a;
        assert_eq!(b.as_bytes(), &[0xa5; NODE_BYTES]);
    }

    #[test]
    fn test_fnv_hash() {
        assert_eq!(fnv_hash(0, 5), 5);
        assert_eq!(fnv_hash(1, 0), FNV_PRIME);
        // wraps in 32 bits
        assert_eq!(fnv_hash(0xffff_ffff, 0), 0u32.wrapping_sub(FNV_PRIME));
    }
}
