use std::hash::Hasher;

const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a 64-bit hasher.
///
/// Unlike `DefaultHasher`, the algorithm is fixed, so digests are stable
/// across processes and toolchain versions.
#[derive(Clone, Copy, Debug)]
pub struct Fnv1aHasher(u64);

impl Fnv1aHasher {
    pub const fn new() -> Self {
        Self(OFFSET_BASIS)
    }

    /// One-shot digest of a byte slice.
    pub fn digest(bytes: &[u8]) -> u64 {
        let mut h = Self::new();
        h.write(bytes);
        h.finish()
    }
}

impl Default for Fnv1aHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= u64::from(b);
            self.0 = self.0.wrapping_mul(PRIME);
        }
    }

    // Integers are fed little-endian so digests do not depend on the host.
    fn write_u64(&mut self, i: u64) {
        self.write(&i.to_le_bytes());
    }
}
