/// Optimistic list cache
///
/// A query cache keyed by resource list (resource kind + query fingerprint)
/// holding the last fetched `Vec<T>` per key. Mutations go through a single
/// centralized helper instead of ad-hoc per-resource bookkeeping:
///
/// 1. The key's generation is bumped, which cancels any in-flight refetch —
///    a refetch completing against an older generation is discarded.
/// 2. The current list is snapshotted.
/// 3. The local mutation is applied atomically, so readers see either the
///    old list or the fully mutated one, never a partial merge.
/// 4. On server success the key is marked stale so a background refetch
///    reconciles with server truth.
/// 5. On server failure the snapshot is restored unchanged and the error is
///    returned for the caller to surface.
///
/// # Example
///
/// ```
/// use taskflow_client::cache::{CacheKey, QueryCache};
///
/// # async fn example() {
/// let cache: QueryCache<i64> = QueryCache::new();
/// let key = CacheKey::new("tasks", "");
///
/// let generation = cache.begin_refetch(&key);
/// cache.complete_refetch(&key, generation, vec![1, 2, 3]);
///
/// let result = cache
///     .optimistic_update(&key, |items| items.retain(|i| *i != 2), async { Ok::<_, ()>(()) })
///     .await;
///
/// assert!(result.is_ok());
/// assert_eq!(cache.get(&key), Some(vec![1, 3]));
/// # }
/// ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Mutex;

/// Cache key: resource kind plus a query fingerprint
///
/// Two queries over the same resource with different filters are distinct
/// keys, mirroring how list queries are cached per filter set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    resource: String,
    query: String,
}

impl CacheKey {
    /// Creates a key from a resource kind and query fingerprint
    pub fn new(resource: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            query: query.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.query.is_empty() {
            write!(f, "{}", self.resource)
        } else {
            write!(f, "{}?{}", self.resource, self.query)
        }
    }
}

#[derive(Debug)]
struct Entry<T> {
    items: Vec<T>,
    generation: u64,
    stale: bool,
}

/// Generic optimistic list cache
#[derive(Debug, Default)]
pub struct QueryCache<T> {
    entries: Mutex<HashMap<CacheKey, Entry<T>>>,
}

impl<T: Clone> QueryCache<T> {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached list for a key, if any
    pub fn get(&self, key: &CacheKey) -> Option<Vec<T>> {
        let entries = self.entries.lock().expect("cache lock");
        entries.get(key).map(|e| e.items.clone())
    }

    /// Whether a key is marked stale (needs a refetch)
    pub fn is_stale(&self, key: &CacheKey) -> bool {
        let entries = self.entries.lock().expect("cache lock");
        entries.get(key).map(|e| e.stale).unwrap_or(true)
    }

    /// Marks a key stale so the next reader triggers a refetch
    pub fn invalidate(&self, key: &CacheKey) {
        let mut entries = self.entries.lock().expect("cache lock");
        if let Some(entry) = entries.get_mut(key) {
            entry.stale = true;
        }
    }

    /// Starts a refetch, returning the generation it must complete against
    pub fn begin_refetch(&self, key: &CacheKey) -> u64 {
        let entries = self.entries.lock().expect("cache lock");
        entries.get(key).map(|e| e.generation).unwrap_or(0)
    }

    /// Completes a refetch
    ///
    /// The fetched items are stored only if the key's generation is still
    /// the one observed at `begin_refetch`; a stale response that lost the
    /// race against an optimistic write is discarded. Returns whether the
    /// result was applied.
    pub fn complete_refetch(&self, key: &CacheKey, generation: u64, items: Vec<T>) -> bool {
        let mut entries = self.entries.lock().expect("cache lock");

        match entries.get_mut(key) {
            Some(entry) => {
                if entry.generation != generation {
                    tracing::debug!(key = %key, "Discarding stale refetch result");
                    return false;
                }
                entry.items = items;
                entry.stale = false;
                true
            }
            None => {
                if generation != 0 {
                    return false;
                }
                entries.insert(
                    key.clone(),
                    Entry {
                        items,
                        generation: 0,
                        stale: false,
                    },
                );
                true
            }
        }
    }

    /// Runs a mutation optimistically against the cached list
    ///
    /// Applies `apply` to the cached list immediately (bumping the
    /// generation so in-flight refetches are cancelled), then awaits
    /// `server_call`. Success marks the key stale for reconciliation;
    /// failure restores the pre-mutation snapshot exactly and passes the
    /// error through.
    ///
    /// Keys with no cached entry skip the local bookkeeping and just await
    /// the server call.
    pub async fn optimistic_update<F, Fut, R, E>(
        &self,
        key: &CacheKey,
        apply: F,
        server_call: Fut,
    ) -> Result<R, E>
    where
        F: FnOnce(&mut Vec<T>),
        Fut: Future<Output = Result<R, E>>,
    {
        // Snapshot + apply, atomically under the lock
        let snapshot = {
            let mut entries = self.entries.lock().expect("cache lock");
            match entries.get_mut(key) {
                Some(entry) => {
                    entry.generation += 1;
                    let snapshot = entry.items.clone();
                    apply(&mut entry.items);
                    Some(snapshot)
                }
                None => None,
            }
        };

        match server_call.await {
            Ok(result) => {
                self.invalidate(key);
                Ok(result)
            }
            Err(err) => {
                if let Some(snapshot) = snapshot {
                    let mut entries = self.entries.lock().expect("cache lock");
                    if let Some(entry) = entries.get_mut(key) {
                        entry.items = snapshot;
                        entry.generation += 1;
                    }
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_display() {
        assert_eq!(CacheKey::new("tasks", "").to_string(), "tasks");
        assert_eq!(
            CacheKey::new("tasks", "status=done").to_string(),
            "tasks?status=done"
        );
    }

    #[test]
    fn test_refetch_roundtrip() {
        let cache: QueryCache<i64> = QueryCache::new();
        let key = CacheKey::new("tasks", "");

        let generation = cache.begin_refetch(&key);
        assert!(cache.complete_refetch(&key, generation, vec![1, 2, 3]));
        assert_eq!(cache.get(&key), Some(vec![1, 2, 3]));
        assert!(!cache.is_stale(&key));
    }

    #[test]
    fn test_invalidate_marks_stale() {
        let cache: QueryCache<i64> = QueryCache::new();
        let key = CacheKey::new("tasks", "");

        cache.complete_refetch(&key, 0, vec![1]);
        assert!(!cache.is_stale(&key));

        cache.invalidate(&key);
        assert!(cache.is_stale(&key));
        // Stale data is still readable until the refetch lands
        assert_eq!(cache.get(&key), Some(vec![1]));
    }

    #[tokio::test]
    async fn test_optimistic_success_marks_stale() {
        let cache: QueryCache<i64> = QueryCache::new();
        let key = CacheKey::new("tasks", "");
        cache.complete_refetch(&key, 0, vec![1, 2, 3]);

        let result: Result<(), ()> = cache
            .optimistic_update(&key, |items| items.push(4), async { Ok(()) })
            .await;

        assert!(result.is_ok());
        assert_eq!(cache.get(&key), Some(vec![1, 2, 3, 4]));
        assert!(cache.is_stale(&key));
    }

    #[tokio::test]
    async fn test_optimistic_failure_restores_snapshot() {
        let cache: QueryCache<i64> = QueryCache::new();
        let key = CacheKey::new("tasks", "");
        cache.complete_refetch(&key, 0, vec![1, 2, 3]);

        let result: Result<(), &str> = cache
            .optimistic_update(&key, |items| items.clear(), async { Err("boom") })
            .await;

        assert_eq!(result, Err("boom"));
        assert_eq!(cache.get(&key), Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_optimistic_update_cancels_inflight_refetch() {
        let cache: QueryCache<i64> = QueryCache::new();
        let key = CacheKey::new("tasks", "");
        cache.complete_refetch(&key, 0, vec![1, 2, 3]);

        // A refetch starts...
        let refetch_generation = cache.begin_refetch(&key);

        // ...then an optimistic delete lands before it completes
        let result: Result<(), ()> = cache
            .optimistic_update(&key, |items| items.retain(|i| *i != 2), async { Ok(()) })
            .await;
        assert!(result.is_ok());

        // The stale refetch must not clobber the optimistic state
        assert!(!cache.complete_refetch(&key, refetch_generation, vec![9, 9, 9]));
        assert_eq!(cache.get(&key), Some(vec![1, 3]));
    }

    #[tokio::test]
    async fn test_optimistic_update_without_cached_entry() {
        let cache: QueryCache<i64> = QueryCache::new();
        let key = CacheKey::new("tasks", "");

        // No cached list: the server call still runs
        let result: Result<i32, ()> = cache
            .optimistic_update(&key, |_| unreachable!(), async { Ok(42) })
            .await;

        assert_eq!(result, Ok(42));
        assert_eq!(cache.get(&key), None);
    }
}
