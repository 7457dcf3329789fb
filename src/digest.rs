//! Content digests for change detection.
//!
//! Equality-only: the digest decides whether a payload changed since the
//! last sync. The archive's encryption layer owns authenticity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, de};
use sha2::{Digest, Sha256};

/// SHA-256 of a fetched payload, as it existed at last successful fetch.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentDigest(pub [u8; 32]);

impl ContentDigest {
    /// Hash a payload. Pure and deterministic.
    pub fn of(payload: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(payload);
        let out = hasher.finalize();
        let mut buf = [0u8; 32];
        buf.copy_from_slice(&out);
        Self(buf)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", hex::encode(self.0))
    }
}

/// Hex parse error for a persisted digest.
#[derive(Debug, thiserror::Error)]
#[error("content digest `{raw}` is invalid: {reason}")]
pub struct InvalidDigest {
    pub raw: String,
    pub reason: String,
}

impl FromStr for ContentDigest {
    type Err = InvalidDigest;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| InvalidDigest {
            raw: s.to_string(),
            reason: e.to_string(),
        })?;
        let buf: [u8; 32] = bytes.try_into().map_err(|_| InvalidDigest {
            raw: s.to_string(),
            reason: "expected 32 bytes".into(),
        })?;
        Ok(Self(buf))
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ContentDigest {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic() {
        let a = ContentDigest::of(b"1721\n979\n366\n");
        let b = ContentDigest::of(b"1721\n979\n366\n");
        assert_eq!(a, b);
    }

    #[test]
    fn different_payloads_differ() {
        assert_ne!(ContentDigest::of(b"abc"), ContentDigest::of(b"abd"));
    }

    #[test]
    fn hex_roundtrip() {
        let digest = ContentDigest::of(b"payload");
        let parsed: ContentDigest = digest.to_string().parse().unwrap();
        assert_eq!(digest, parsed);
    }

    #[test]
    fn rejects_short_hex() {
        assert!("deadbeef".parse::<ContentDigest>().is_err());
        assert!("zz".parse::<ContentDigest>().is_err());
    }
}
