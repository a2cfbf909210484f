//! Key-value storage abstraction.
//!
//! Persistence is an external collaborator reached through [`KvStore`]:
//! plain values, membership sets, and score-ordered sets - the exact
//! surface the dashboard's hosted key-value backend exposes. The core
//! never sees a wire format; backends return opaque strings.
//!
//! [`MemoryKv`] is the in-process implementation used by tests and local
//! demo clients. It is the only backend shipped with the core; network
//! backends live with the embedding client.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

use crate::error::{AutopilotError, Result};

/// Operations the core requires from a key-value backend.
///
/// Methods take `&self`; implementations provide their own interior
/// mutability or connection handling. Any method may fail - the engine
/// treats every failure as retryable and never discards session state
/// because of one.
pub trait KvStore {
    /// Reads the value at `key`, if present.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes `value` at `key`, replacing any existing value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Deletes `key` and whatever is stored at it, plain value or set.
    /// Deleting a missing key is not an error.
    fn del(&self, key: &str) -> Result<()>;

    /// Adds `member` to the set at `key`.
    fn sadd(&self, key: &str, member: &str) -> Result<()>;

    /// Removes `member` from the set at `key`.
    fn srem(&self, key: &str, member: &str) -> Result<()>;

    /// Returns all members of the set at `key` (empty if missing).
    fn smembers(&self, key: &str) -> Result<Vec<String>>;

    /// Adds `member` with `score` to the sorted set at `key`, updating the
    /// score if the member already exists.
    fn zadd(&self, key: &str, score: i64, member: &str) -> Result<()>;

    /// Returns up to `limit` members of the sorted set at `key`, highest
    /// score first.
    fn zrange_rev(&self, key: &str, limit: usize) -> Result<Vec<String>>;
}

#[derive(Debug, Default)]
struct MemoryInner {
    values: HashMap<String, String>,
    sets: HashMap<String, BTreeSet<String>>,
    zsets: HashMap<String, Vec<(i64, String)>>,
}

/// In-memory [`KvStore`] backend.
///
/// Interior mutability via a `Mutex` so the store can be shared behind
/// `&self` like a connection would be; the core itself is single-threaded
/// per the crate's concurrency model.
#[derive(Debug, Default)]
pub struct MemoryKv {
    inner: Mutex<MemoryInner>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryInner>> {
        self.inner
            .lock()
            .map_err(|_| AutopilotError::storage("memory store", "lock poisoned"))
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?
            .values
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn del(&self, key: &str) -> Result<()> {
        let mut inner = self.lock()?;
        inner.values.remove(key);
        inner.sets.remove(key);
        inner.zsets.remove(key);
        Ok(())
    }

    fn sadd(&self, key: &str, member: &str) -> Result<()> {
        self.lock()?
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    fn srem(&self, key: &str, member: &str) -> Result<()> {
        if let Some(set) = self.lock()?.sets.get_mut(key) {
            set.remove(member);
        }
        Ok(())
    }

    fn smembers(&self, key: &str) -> Result<Vec<String>> {
        Ok(self
            .lock()?
            .sets
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn zadd(&self, key: &str, score: i64, member: &str) -> Result<()> {
        let mut inner = self.lock()?;
        let zset = inner.zsets.entry(key.to_string()).or_default();
        match zset.iter_mut().find(|(_, m)| m == member) {
            Some(entry) => entry.0 = score,
            None => zset.push((score, member.to_string())),
        }
        Ok(())
    }

    fn zrange_rev(&self, key: &str, limit: usize) -> Result<Vec<String>> {
        let inner = self.lock()?;
        let Some(zset) = inner.zsets.get(key) else {
            return Ok(Vec::new());
        };
        let mut entries = zset.clone();
        // Ties broken by member, descending, for a stable listing order.
        entries.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));
        Ok(entries
            .into_iter()
            .take(limit)
            .map(|(_, member)| member)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_key_is_none() {
        let kv = MemoryKv::new();
        assert_eq!(kv.get("nope").unwrap(), None);
    }

    #[test]
    fn test_set_then_get_roundtrips() {
        let kv = MemoryKv::new();
        kv.set("k", "v").unwrap();
        assert_eq!(kv.get("k").unwrap().as_deref(), Some("v"));
        kv.del("k").unwrap();
        assert_eq!(kv.get("k").unwrap(), None);
    }

    #[test]
    fn test_set_membership() {
        let kv = MemoryKv::new();
        kv.sadd("s", "a").unwrap();
        kv.sadd("s", "b").unwrap();
        kv.sadd("s", "a").unwrap();
        assert_eq!(kv.smembers("s").unwrap(), vec!["a", "b"]);
        kv.srem("s", "a").unwrap();
        assert_eq!(kv.smembers("s").unwrap(), vec!["b"]);
    }

    #[test]
    fn test_del_removes_sets_too() {
        let kv = MemoryKv::new();
        kv.sadd("s", "a").unwrap();
        kv.zadd("z", 1, "m").unwrap();
        kv.del("s").unwrap();
        kv.del("z").unwrap();
        assert!(kv.smembers("s").unwrap().is_empty());
        assert!(kv.zrange_rev("z", 10).unwrap().is_empty());
    }

    #[test]
    fn test_zrange_rev_orders_by_score_desc() {
        let kv = MemoryKv::new();
        kv.zadd("z", 10, "oldest").unwrap();
        kv.zadd("z", 30, "newest").unwrap();
        kv.zadd("z", 20, "middle").unwrap();
        assert_eq!(
            kv.zrange_rev("z", 10).unwrap(),
            vec!["newest", "middle", "oldest"]
        );
        assert_eq!(kv.zrange_rev("z", 2).unwrap(), vec!["newest", "middle"]);
    }

    #[test]
    fn test_zadd_updates_existing_score() {
        let kv = MemoryKv::new();
        kv.zadd("z", 1, "m").unwrap();
        kv.zadd("z", 99, "m").unwrap();
        kv.zadd("z", 50, "other").unwrap();
        assert_eq!(kv.zrange_rev("z", 10).unwrap(), vec!["m", "other"]);
    }
}
