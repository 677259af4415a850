//! L2 Disk Cache (C4): one file per key, fixed 27-byte binary header,
//! checksum, pluggable serializer.
//!
//! The teacher's L2 (`l2_disk_cache.rs`) uses `rkyv` + `mmap2` for
//! zero-copy reads. The spec fixes an exact byte layout instead, so this
//! tier writes the header by hand with `byteorder` and keeps the teacher's
//! atomic-write-plus-index idiom around it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};

use crate::errors::{CoreError, CoreResult};
use crate::features::cache::atomic_io::{self, ReadOutcome};
use crate::features::cache::config::DiskCacheConfig;
use crate::shared::models::CacheKey;

const MAGIC: &[u8; 4] = b"CGIR";
const FORMAT_VERSION: u16 = 1;
const HEADER_LEN: usize = 4 + 2 + 8 + 8 + 4 + 1; // 27

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializerType {
    MsgPack = 1,
    NativeSafe = 2,
}

impl SerializerType {
    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::MsgPack),
            2 => Some(Self::NativeSafe),
            _ => None,
        }
    }
}

struct Header {
    version: u16,
    schema_version_packed: u64,
    engine_version_packed: u64,
    payload_checksum: u32,
    serializer_type: SerializerType,
}

fn encode_header(header: &Header, out: &mut Vec<u8>) {
    out.extend_from_slice(MAGIC);
    out.write_u16::<LittleEndian>(header.version).unwrap();
    out.write_u64::<LittleEndian>(header.schema_version_packed).unwrap();
    out.write_u64::<LittleEndian>(header.engine_version_packed).unwrap();
    out.write_u32::<LittleEndian>(header.payload_checksum).unwrap();
    out.push(header.serializer_type as u8);
}

fn decode_header(bytes: &[u8]) -> CoreResult<Header> {
    if bytes.len() < HEADER_LEN {
        return Err(CoreError::CacheCorrupt("header truncated".into()));
    }
    if &bytes[0..4] != MAGIC {
        return Err(CoreError::CacheCorrupt("bad magic".into()));
    }
    let mut cursor = &bytes[4..];
    let version = cursor.read_u16::<LittleEndian>().unwrap();
    let schema_version_packed = cursor.read_u64::<LittleEndian>().unwrap();
    let engine_version_packed = cursor.read_u64::<LittleEndian>().unwrap();
    let payload_checksum = cursor.read_u32::<LittleEndian>().unwrap();
    let serializer_tag = cursor.read_u8().unwrap();
    let serializer_type = SerializerType::from_tag(serializer_tag)
        .ok_or_else(|| CoreError::CacheCorrupt(format!("unknown serializer tag {serializer_tag}")))?;

    Ok(Header {
        version,
        schema_version_packed,
        engine_version_packed,
        payload_checksum,
        serializer_type,
    })
}

fn serialize_payload<T: Serialize>(value: &T, kind: SerializerType) -> CoreResult<Vec<u8>> {
    match kind {
        SerializerType::MsgPack => {
            rmp_serde::to_vec(value).map_err(|e| CoreError::CacheSerializationError(e.to_string()))
        }
        SerializerType::NativeSafe => {
            serde_json::to_vec(value).map_err(|e| CoreError::CacheSerializationError(e.to_string()))
        }
    }
}

fn deserialize_payload<T: DeserializeOwned>(bytes: &[u8], kind: SerializerType) -> CoreResult<T> {
    match kind {
        SerializerType::MsgPack => {
            rmp_serde::from_slice(bytes).map_err(|e| CoreError::CacheSerializationError(e.to_string()))
        }
        SerializerType::NativeSafe => {
            serde_json::from_slice(bytes).map_err(|e| CoreError::CacheSerializationError(e.to_string()))
        }
    }
}

/// Versioned, content-addressed, per-key file cache.
pub struct DiskCache {
    config: DiskCacheConfig,
    /// key -> file path, rebuilt at `open` from what's on disk.
    index: DashMap<CacheKey, PathBuf>,
}

impl DiskCache {
    pub fn open(config: DiskCacheConfig) -> CoreResult<Self> {
        std::fs::create_dir_all(&config.cache_dir)?;
        atomic_io::cleanup_orphans(&config.cache_dir, ".cgir");
        Ok(Self {
            config,
            index: DashMap::new(),
        })
    }

    fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.config.cache_dir.join(format!("{}.cgir", key.stable_id()))
    }

    pub fn put<T: Serialize>(
        &self,
        key: &CacheKey,
        value: &T,
        serializer: SerializerType,
    ) -> CoreResult<()> {
        let payload = serialize_payload(value, serializer)?;
        let checksum = xxhash_rust::xxh32::xxh32(&payload, 0);

        let header = Header {
            version: FORMAT_VERSION,
            schema_version_packed: key.versions.schema_version as u64,
            engine_version_packed: key.versions.engine_version as u64,
            payload_checksum: checksum,
            serializer_type: serializer,
        };

        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
        encode_header(&header, &mut bytes);
        bytes.extend_from_slice(&payload);

        let path = self.path_for(key);
        atomic_io::atomic_write(&path, &bytes, self.config.fsync, self.config.advisory_lock)?;
        self.index.insert(key.clone(), path);
        Ok(())
    }

    /// Returns `Ok(None)` on any miss or corruption (the file is removed on
    /// corruption so subsequent reads don't pay the same cost twice).
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> CoreResult<Option<T>> {
        let path = match self.index.get(key) {
            Some(p) => p.clone(),
            None => {
                let candidate = self.path_for(key);
                if candidate.exists() {
                    candidate
                } else {
                    return Ok(None);
                }
            }
        };

        let bytes = match atomic_io::read_with_retry(&path, 3, 20, None) {
            Ok(b) => b,
            Err(ReadOutcome::Missing) => {
                self.index.remove(key);
                return Ok(None);
            }
            Err(ReadOutcome::Corrupt) => {
                let _ = std::fs::remove_file(&path);
                self.index.remove(key);
                return Ok(None);
            }
        };

        let header = match decode_header(&bytes) {
            Ok(h) => h,
            Err(_) => {
                let _ = std::fs::remove_file(&path);
                self.index.remove(key);
                return Ok(None);
            }
        };

        if header.schema_version_packed != key.versions.schema_version as u64
            || header.engine_version_packed != key.versions.engine_version as u64
        {
            let _ = std::fs::remove_file(&path);
            self.index.remove(key);
            return Ok(None);
        }

        let payload = &bytes[HEADER_LEN..];
        let checksum = xxhash_rust::xxh32::xxh32(payload, 0);
        if checksum != header.payload_checksum {
            let _ = std::fs::remove_file(&path);
            self.index.remove(key);
            return Ok(None);
        }

        match deserialize_payload(payload, header.serializer_type) {
            Ok(value) => {
                self.index.insert(key.clone(), path);
                Ok(Some(value))
            }
            Err(_) => {
                let _ = std::fs::remove_file(&path);
                self.index.remove(key);
                Ok(None)
            }
        }
    }

    pub fn invalidate(&self, key: &CacheKey) {
        if let Some((_, path)) = self.index.remove(key) {
            let _ = std::fs::remove_file(&path);
        }
    }

    /// Not required to be immediate (spec §4.5): marks the matching files
    /// for removal right away since this tier has no async task queue.
    pub fn invalidate_matching(&self, predicate: impl Fn(&CacheKey) -> bool) -> usize {
        let to_remove: Vec<CacheKey> = self
            .index
            .iter()
            .filter(|entry| predicate(entry.key()))
            .map(|entry| entry.key().clone())
            .collect();
        let count = to_remove.len();
        for key in to_remove {
            self.invalidate(&key);
        }
        count
    }

    pub fn entry_count(&self) -> usize {
        self.index.len()
    }
}

impl std::fmt::Debug for DiskCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskCache")
            .field("cache_dir", &self.config.cache_dir)
            .field("entries", &self.index.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{Fingerprint, VersionPair};
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Payload {
        blob: Vec<u8>,
        note: String,
    }

    fn cache(dir: &Path) -> DiskCache {
        DiskCache::open(DiskCacheConfig {
            cache_dir: dir.to_path_buf(),
            fsync: false,
            advisory_lock: false,
        })
        .unwrap()
    }

    #[test]
    fn put_then_get_round_trips_msgpack() {
        let dir = tempdir().unwrap();
        let cache = cache(dir.path());
        let key = CacheKey::build(b"content", VersionPair::new(1, 1), "a.rs");
        let value = Payload {
            blob: vec![1, 2, 3],
            note: "x".into(),
        };
        cache.put(&key, &value, SerializerType::MsgPack).unwrap();

        let got: Option<Payload> = cache.get(&key).unwrap();
        assert_eq!(got, Some(value));
    }

    #[test]
    fn put_then_get_round_trips_native_safe() {
        let dir = tempdir().unwrap();
        let cache = cache(dir.path());
        let key = CacheKey::build(b"content", VersionPair::new(1, 1), "a.rs");
        let value = Payload {
            blob: vec![9],
            note: "y".into(),
        };
        cache.put(&key, &value, SerializerType::NativeSafe).unwrap();

        let got: Option<Payload> = cache.get(&key).unwrap();
        assert_eq!(got, Some(value));
    }

    #[test]
    fn version_mismatch_is_a_miss() {
        let dir = tempdir().unwrap();
        let cache = cache(dir.path());
        let key = CacheKey::build(b"content", VersionPair::new(1, 1), "a.rs");
        cache
            .put(&key, &Payload { blob: vec![], note: "".into() }, SerializerType::MsgPack)
            .unwrap();

        // Same content/path, bumped schema version -> different CacheKey, different file.
        let bumped = CacheKey::build(b"content", VersionPair::new(2, 1), "a.rs");
        let got: Option<Payload> = cache.get(&bumped).unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn corrupted_payload_checksum_is_reported_as_a_miss() {
        let dir = tempdir().unwrap();
        let cache = cache(dir.path());
        let key = CacheKey::build(b"content", VersionPair::new(1, 1), "a.rs");
        cache
            .put(&key, &Payload { blob: vec![7], note: "z".into() }, SerializerType::MsgPack)
            .unwrap();

        let path = cache.path_for(&key);
        let mut bytes = std::fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        std::fs::write(&path, bytes).unwrap();

        let got: Option<Payload> = cache.get(&key).unwrap();
        assert!(got.is_none());
        assert!(!path.exists(), "corrupt file should be removed on detection");
    }

    #[test]
    fn header_is_27_bytes() {
        assert_eq!(HEADER_LEN, 27);
    }
}
