//! Content fingerprints and composite cache keys (C1).
//!
//! Fingerprints are 128-bit, non-cryptographic, keyed by a fixed seed
//! (xxh3-128) — collision-resistant enough for cache identity without the
//! cost of a cryptographic hash. Non-UTF-8 byte sequences are hashed
//! verbatim; nothing here ever attempts to decode the input.

use serde::{Deserialize, Serialize};

/// Fixed seed so that `hash_content` is stable across process restarts and
/// across machines. Bumping this would invalidate every cache on disk, so
/// it is a crate-level constant rather than configuration.
const FINGERPRINT_SEED: u64 = 0x5347_5452_4541_534F; // "SGTREASO"

/// A 128-bit content digest (C1 `Fingerprint`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(pub u128);

impl Fingerprint {
    /// Hash a byte sequence with the crate's fixed seed.
    pub fn compute(bytes: &[u8]) -> Self {
        Self(xxhash_rust::xxh3::xxh3_128_with_seed(bytes, FINGERPRINT_SEED))
    }

    pub fn zero() -> Self {
        Self(0)
    }

    pub fn to_hex(&self) -> String {
        format!("{:032x}", self.0)
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        u128::from_str_radix(hex, 16).ok().map(Self)
    }

    pub fn as_bytes(&self) -> [u8; 16] {
        self.0.to_be_bytes()
    }
}

/// Per-cache-family compile-time version pair. Bumping either value
/// invalidates all prior entries in that family (C1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionPair {
    pub schema_version: u32,
    pub engine_version: u32,
}

impl VersionPair {
    pub const fn new(schema_version: u32, engine_version: u32) -> Self {
        Self {
            schema_version,
            engine_version,
        }
    }

    /// Pack a dotted version string like "1.0.0" into a stable 32-bit int:
    /// `major*10000 + minor*100 + patch`. Per spec §9 open question, the
    /// on-disk encoding reserves the upper bits rather than overflowing an
    /// 8-byte field.
    pub fn pack_dotted(version: &str) -> u32 {
        let mut parts = version.split('.').map(|p| p.parse::<u32>().unwrap_or(0));
        let major = parts.next().unwrap_or(0);
        let minor = parts.next().unwrap_or(0);
        let patch = parts.next().unwrap_or(0);
        major * 10_000 + minor * 100 + patch
    }
}

/// Composite cache key: `(content_hash, schema_version, engine_version,
/// logical_path)`. Equality is defined over the first three fields only —
/// `logical_path` is metadata carried for debugging and does not
/// participate in `Eq`/`Hash`.
#[derive(Debug, Clone)]
pub struct CacheKey {
    pub content_hash: Fingerprint,
    pub versions: VersionPair,
    pub logical_path: String,
}

impl CacheKey {
    pub fn new(content_hash: Fingerprint, versions: VersionPair, logical_path: impl Into<String>) -> Self {
        Self {
            content_hash,
            versions,
            logical_path: logical_path.into(),
        }
    }

    pub fn build(content: &[u8], versions: VersionPair, logical_path: impl Into<String>) -> Self {
        Self::new(Fingerprint::compute(content), versions, logical_path)
    }

    /// Stable string suitable for content-addressed filenames (C4).
    pub fn stable_id(&self) -> String {
        format!(
            "{}_{:08x}{:08x}",
            self.content_hash.to_hex(),
            self.versions.schema_version,
            self.versions.engine_version
        )
    }
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        self.content_hash == other.content_hash && self.versions == other.versions
    }
}
impl Eq for CacheKey {}

impl std::hash::Hash for CacheKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.content_hash.hash(state);
        self.versions.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_deterministic() {
        let a = Fingerprint::compute(b"fn main() {}");
        let b = Fingerprint::compute(b"fn main() {}");
        assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_hex_roundtrip() {
        let fp = Fingerprint::compute(b"hello");
        let hex = fp.to_hex();
        assert_eq!(Fingerprint::from_hex(&hex), Some(fp));
    }

    #[test]
    fn non_utf8_bytes_hash_without_panicking() {
        let bytes: &[u8] = &[0xff, 0xfe, 0x00, 0xd8];
        let fp = Fingerprint::compute(bytes);
        assert_ne!(fp, Fingerprint::zero());
    }

    // Testable property #1: key invariance under path noise, divergence under version bump.
    #[test]
    fn cache_key_invariant_under_path_change_varies_under_version_bump() {
        let v1 = VersionPair::new(1, 1);
        let key_a = CacheKey::build(b"content", v1, "path/a.rs");
        let key_b = CacheKey::build(b"content", v1, "path/b.rs");
        assert_eq!(key_a, key_b, "path must not affect equality");

        let v2 = VersionPair::new(2, 1);
        let key_c = CacheKey::build(b"content", v2, "path/a.rs");
        assert_ne!(key_a, key_c, "schema version bump must invalidate");
    }

    #[test]
    fn pack_dotted_version() {
        assert_eq!(VersionPair::pack_dotted("1.0.0"), 10_000);
        assert_eq!(VersionPair::pack_dotted("1.2.3"), 10_203);
    }
}
