//! Memory Store - cross-run behavior frequency table
//!
//! Memory maps a fingerprint to how often each behavior has been observed for
//! it across analysis runs. It only grows by accumulation and only shrinks by
//! least-recently-seen eviction of whole fingerprints.
//!
//! `update_memory` and `evict_memory` are pure: they return a new mapping and
//! leave their input untouched. Loading and saving go through a
//! [`StorageAdapter`] holding the whole mapping under one key.

use crate::error::Result;
use crate::storage::StorageAdapter;
use chrono::Utc;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Storage key the whole memory mapping lives under
pub const DEFAULT_MEMORY_KEY: &str = "patternPalMemory";

/// Default cap on distinct fingerprints kept in memory
pub const DEFAULT_MAX_ENTRIES: usize = 200;

/// Fingerprint → historical statistics, in insertion order
pub type Memory = IndexMap<String, MemoryEntry>;

/// Historical statistics for one fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryEntry {
    /// Lifetime observation count (monotonic)
    pub total_observations: u64,

    /// Behavior → observation count; keys are never removed
    pub behavior_counts: IndexMap<String, u64>,

    /// Milliseconds since the Unix epoch of the most recent update
    pub last_seen: i64,
}

impl MemoryEntry {
    /// Record one observation of `behavior` at `now`
    pub fn observe(&mut self, behavior: &str, now: i64) {
        self.total_observations += 1;
        *self.behavior_counts.entry(behavior.to_string()).or_insert(0) += 1;
        self.last_seen = now;
    }

    /// Most frequently observed behavior
    ///
    /// Exact ties go to the behavior recorded first. Returns `None` when no
    /// behavior has a positive count.
    pub fn majority_behavior(&self) -> Option<(&str, u64)> {
        let mut best: Option<(&str, u64)> = None;
        for (behavior, &count) in &self.behavior_counts {
            if count > best.map_or(0, |(_, c)| c) {
                best = Some((behavior.as_str(), count));
            }
        }
        best
    }
}

/// Retention policy for the persisted memory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryPolicy {
    /// Maximum number of distinct fingerprints retained after eviction
    pub max_entries: usize,

    /// Key under which the memory is persisted
    pub storage_key: String,
}

impl Default for MemoryPolicy {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            storage_key: DEFAULT_MEMORY_KEY.to_string(),
        }
    }
}

/// Load memory from storage
///
/// Missing or non-object values yield an empty memory. Members that do not
/// decode as a [`MemoryEntry`] are skipped.
pub async fn load_memory<S>(storage: &S, key: &str) -> Result<Memory>
where
    S: StorageAdapter + ?Sized,
{
    let Some(serde_json::Value::Object(map)) = storage.get(key).await? else {
        debug!(key, "no persisted memory, starting empty");
        return Ok(Memory::new());
    };

    let mut memory = Memory::with_capacity(map.len());
    for (fingerprint, value) in map {
        match serde_json::from_value::<MemoryEntry>(value) {
            Ok(entry) => {
                memory.insert(fingerprint, entry);
            }
            Err(e) => {
                warn!(fingerprint = %fingerprint, error = %e, "skipping malformed memory entry");
            }
        }
    }

    Ok(memory)
}

/// Persist the whole memory as a single value
pub async fn save_memory<S>(storage: &S, key: &str, memory: &Memory) -> Result<()>
where
    S: StorageAdapter + ?Sized,
{
    let value = serde_json::to_value(memory)?;
    storage.set(key, value).await
}

/// Record one observation per (fingerprint, behavior) pair, stamped now
///
/// `fingerprints` and `behaviors` are parallel sequences; extra items in the
/// longer one are ignored.
pub fn update_memory<F, B>(memory: &Memory, fingerprints: &[F], behaviors: &[B]) -> Memory
where
    F: AsRef<str>,
    B: AsRef<str>,
{
    update_memory_at(memory, fingerprints, behaviors, Utc::now().timestamp_millis())
}

/// [`update_memory`] with an explicit timestamp
pub fn update_memory_at<F, B>(memory: &Memory, fingerprints: &[F], behaviors: &[B], now: i64) -> Memory
where
    F: AsRef<str>,
    B: AsRef<str>,
{
    let mut result = memory.clone();

    for (fingerprint, behavior) in fingerprints.iter().zip(behaviors) {
        result
            .entry(fingerprint.as_ref().to_string())
            .or_default()
            .observe(behavior.as_ref(), now);
    }

    result
}

/// Keep at most `max_size` fingerprints, dropping the least recently seen
///
/// Entries with equal `last_seen` keep their relative order, so among ties
/// the ones inserted later survive.
pub fn evict_memory(memory: &Memory, max_size: usize) -> Memory {
    if memory.len() <= max_size {
        return memory.clone();
    }

    let mut by_age: Vec<(&String, &MemoryEntry)> = memory.iter().collect();
    by_age.sort_by_key(|(_, entry)| entry.last_seen);

    let evicted = by_age.len() - max_size;
    debug!(evicted, kept = max_size, "evicting least recently seen fingerprints");

    by_age
        .into_iter()
        .skip(evicted)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStorage;

    fn entry(last_seen: i64) -> MemoryEntry {
        MemoryEntry {
            total_observations: 1,
            behavior_counts: IndexMap::from([("x".to_string(), 1)]),
            last_seen,
        }
    }

    #[test]
    fn test_update_seeds_new_entry() {
        let memory = update_memory_at(&Memory::new(), &["fp"], &["inline"], 42);

        let e = &memory["fp"];
        assert_eq!(e.total_observations, 1);
        assert_eq!(e.behavior_counts["inline"], 1);
        assert_eq!(e.last_seen, 42);
    }

    #[test]
    fn test_update_is_pure() {
        let original = update_memory_at(&Memory::new(), &["fp"], &["inline"], 1);
        let snapshot = original.clone();

        let updated = update_memory_at(&original, &["fp", "other"], &["submit", "inline"], 2);

        assert_eq!(original, snapshot);
        assert_eq!(updated["fp"].total_observations, 2);
        assert_eq!(updated.len(), 2);
    }

    #[test]
    fn test_update_twice_accumulates() {
        let once = update_memory(&Memory::new(), &["fp"], &["b"]);
        let twice = update_memory(&once, &["fp"], &["b"]);

        assert_eq!(twice["fp"].total_observations, 2);
        assert_eq!(twice["fp"].behavior_counts["b"], 2);
    }

    #[test]
    fn test_update_stamps_whole_batch() {
        let memory = update_memory_at(
            &Memory::new(),
            &["a", "b", "a"],
            &["x", "y", "z"],
            1_000,
        );

        assert!(memory.values().all(|e| e.last_seen == 1_000));
        assert_eq!(memory["a"].total_observations, 2);
        let keys: Vec<&String> = memory["a"].behavior_counts.keys().collect();
        assert_eq!(keys, vec!["x", "z"]);
    }

    #[test]
    fn test_update_ignores_unpaired_items() {
        let memory = update_memory_at(&Memory::new(), &["a", "b"], &["x"], 1);
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn test_majority_tie_goes_to_first() {
        let mut e = MemoryEntry::default();
        e.observe("inline", 1);
        e.observe("submit", 1);

        assert_eq!(e.majority_behavior(), Some(("inline", 1)));

        e.observe("submit", 2);
        assert_eq!(e.majority_behavior(), Some(("submit", 2)));
        assert_eq!(MemoryEntry::default().majority_behavior(), None);
    }

    #[test]
    fn test_evict_under_cap_is_copy() {
        let memory: Memory = [("a".to_string(), entry(1)), ("b".to_string(), entry(2))]
            .into_iter()
            .collect();

        assert_eq!(evict_memory(&memory, 2), memory);
        assert_eq!(evict_memory(&memory, 200), memory);
    }

    #[test]
    fn test_evict_keeps_most_recent() {
        let memory: Memory = [
            ("old".to_string(), entry(10)),
            ("newest".to_string(), entry(30)),
            ("oldest".to_string(), entry(5)),
            ("mid".to_string(), entry(20)),
        ]
        .into_iter()
        .collect();

        let evicted = evict_memory(&memory, 2);

        assert_eq!(evicted.len(), 2);
        assert!(evicted.contains_key("newest"));
        assert!(evicted.contains_key("mid"));
    }

    #[test]
    fn test_evict_ties_keep_later_inserted() {
        let memory: Memory = [
            ("first".to_string(), entry(7)),
            ("second".to_string(), entry(7)),
            ("third".to_string(), entry(7)),
        ]
        .into_iter()
        .collect();

        let evicted = evict_memory(&memory, 2);

        let keys: Vec<&str> = evicted.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["second", "third"]);
    }

    #[test]
    fn test_evict_to_zero() {
        let memory: Memory = [("a".to_string(), entry(1))].into_iter().collect();
        assert!(evict_memory(&memory, 0).is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let memory = update_memory_at(&Memory::new(), &["fp"], &["inline"], 7);
        let json = serde_json::to_value(&memory).unwrap();

        assert_eq!(json["fp"]["totalObservations"], 1);
        assert_eq!(json["fp"]["behaviorCounts"]["inline"], 1);
        assert_eq!(json["fp"]["lastSeen"], 7);
    }

    #[tokio::test]
    async fn test_load_empty_storage() {
        let storage = InMemoryStorage::new();
        let memory = load_memory(&storage, DEFAULT_MEMORY_KEY).await.unwrap();
        assert!(memory.is_empty());
    }

    #[tokio::test]
    async fn test_load_non_object_value() {
        let storage = InMemoryStorage::new();
        storage
            .set(DEFAULT_MEMORY_KEY, serde_json::json!("not a map"))
            .await
            .unwrap();

        let memory = load_memory(&storage, DEFAULT_MEMORY_KEY).await.unwrap();
        assert!(memory.is_empty());
    }

    #[tokio::test]
    async fn test_load_skips_malformed_entries() {
        let storage = InMemoryStorage::new();
        storage
            .set(
                DEFAULT_MEMORY_KEY,
                serde_json::json!({
                    "good": { "totalObservations": 1, "behaviorCounts": { "x": 1 }, "lastSeen": 5 },
                    "bad": 17
                }),
            )
            .await
            .unwrap();

        let memory = load_memory(&storage, DEFAULT_MEMORY_KEY).await.unwrap();
        assert_eq!(memory.len(), 1);
        assert_eq!(memory["good"].last_seen, 5);
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let storage = InMemoryStorage::new();
        let memory = update_memory_at(&Memory::new(), &["b", "a"], &["y", "x"], 3);

        save_memory(&storage, DEFAULT_MEMORY_KEY, &memory).await.unwrap();
        let loaded = load_memory(&storage, DEFAULT_MEMORY_KEY).await.unwrap();

        assert_eq!(loaded, memory);
    }
}
