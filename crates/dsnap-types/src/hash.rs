use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Structural hash of a serialized subtree.
///
/// A `NodeHash` is a change-detection aid, not an identity guarantee:
/// identical subtrees always produce the same value, but unrelated subtrees
/// may collide. It is displayed and serialized as 16 lower-case hex digits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodeHash(u64);

impl NodeHash {
    /// Wrap a raw 64-bit digest.
    pub const fn from_u64(value: u64) -> Self {
        Self(value)
    }

    /// The raw 64-bit digest.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Big-endian byte representation.
    pub fn to_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.to_bytes()[..4])
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        let arr: [u8; 8] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| TypeError::InvalidLength {
                expected: 8,
                actual: bytes.len(),
            })?;
        Ok(Self(u64::from_be_bytes(arr)))
    }
}

impl fmt::Debug for NodeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeHash({})", self.short_hex())
    }
}

impl fmt::Display for NodeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for NodeHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for NodeHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
