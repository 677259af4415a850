//! Rebuild cache key grammar (spec §4.15/§6): `(repo_id, snapshot_id,
//! sorted-change-ids, content-hash-of-change-bodies)`.

use crate::shared::models::{Fingerprint, SymbolId};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RebuildCacheKey {
    pub repo_id: String,
    pub snapshot_id: String,
    pub change_ids: Vec<SymbolId>,
    pub content_hash: Fingerprint,
}

impl RebuildCacheKey {
    /// Builds a reproducible key: ids are sorted and the code pair for
    /// each change is encoded with a stable separator before hashing, so
    /// the same change set hashes identically across processes.
    pub fn build(
        repo_id: impl Into<String>,
        snapshot_id: impl Into<String>,
        changes: &std::collections::BTreeMap<SymbolId, (String, String)>,
    ) -> Self {
        let change_ids: Vec<SymbolId> = changes.keys().cloned().collect();
        let mut buf = String::new();
        for id in &change_ids {
            let (old, new) = &changes[id];
            buf.push_str(id);
            buf.push('\0');
            buf.push_str(old);
            buf.push('\0');
            buf.push_str(new);
            buf.push('\0');
        }
        Self {
            repo_id: repo_id.into(),
            snapshot_id: snapshot_id.into(),
            change_ids,
            content_hash: Fingerprint::compute(buf.as_bytes()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_is_deterministic_regardless_of_map_insertion_order() {
        let mut a = std::collections::BTreeMap::new();
        a.insert("b".to_string(), ("1".to_string(), "2".to_string()));
        a.insert("a".to_string(), ("3".to_string(), "4".to_string()));

        let mut b = std::collections::BTreeMap::new();
        b.insert("a".to_string(), ("3".to_string(), "4".to_string()));
        b.insert("b".to_string(), ("1".to_string(), "2".to_string()));

        let key_a = RebuildCacheKey::build("repo", "snap", &a);
        let key_b = RebuildCacheKey::build("repo", "snap", &b);
        assert_eq!(key_a, key_b);
        assert_eq!(key_a.change_ids, vec!["a".to_string(), "b".to_string()]);
    }
}
