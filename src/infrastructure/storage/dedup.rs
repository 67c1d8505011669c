// In-memory request de-duplication using DashMap and shared futures
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

pub const DEFAULT_WINDOW: Duration = Duration::from_millis(2000);
pub const DEFAULT_GRACE: Duration = Duration::from_millis(1000);

/// Outcome handed to every caller sharing one request.
pub type SharedResult<T, E> = Result<T, Arc<E>>;

/// Future returned by [`RequestDeduplicator::get_or_create`].
pub type SharedRequest<T, E> = Shared<BoxFuture<'static, SharedResult<T, E>>>;

struct CacheEntry<T, E> {
    created_at: Instant,
    generation: u64,
    future: SharedRequest<T, E>,
}

struct Inner<K, T, E> {
    entries: DashMap<K, CacheEntry<T, E>>,
    window: Duration,
    grace: Duration,
    evict_failures: bool,
    next_generation: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, T, E> Inner<K, T, E>
where
    K: Eq + Hash,
{
    // Only the entry the eviction was scheduled for may be removed
    fn remove_if_current(&self, key: &K, generation: u64) -> bool {
        self.entries
            .remove_if(key, |_, entry| entry.generation == generation)
            .is_some()
    }
}

/// Settings fixed when a [`RequestDeduplicator`] is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupOptions {
    pub window: Duration,
    pub grace: Duration,
    /// Drop failed entries as soon as they settle instead of replaying the
    /// failure for the rest of the window.
    pub evict_failures: bool,
}

impl DedupOptions {
    pub fn from_millis(window_ms: u64, grace_ms: u64) -> Self {
        Self {
            window: Duration::from_millis(window_ms),
            grace: Duration::from_millis(grace_ms),
            ..Self::default()
        }
    }
}

impl Default for DedupOptions {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            grace: DEFAULT_GRACE,
            evict_failures: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DedupStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Short-window cache of in-flight and recently settled requests.
///
/// The first call for a key runs its factory and stores the resulting future;
/// any call for the same key within `window` gets a clone of that future, so
/// the underlying request runs once and every caller sees the same outcome,
/// failures included. Entries stop being visible after `window` and are
/// removed from the map after `window + grace`.
///
/// Cloning is cheap; clones share the same map.
pub struct RequestDeduplicator<K, T, E> {
    inner: Arc<Inner<K, T, E>>,
}

impl<K, T, E> Clone for RequestDeduplicator<K, T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, T, E> RequestDeduplicator<K, T, E>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    pub fn new(window: Duration, grace: Duration) -> Self {
        Self::with_options(DedupOptions {
            window,
            grace,
            evict_failures: false,
        })
    }

    pub fn with_options(options: DedupOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: DashMap::new(),
                window: options.window,
                grace: options.grace,
                evict_failures: options.evict_failures,
                next_generation: AtomicU64::new(0),
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
            }),
        }
    }

    pub fn with_millis(window_ms: u64, grace_ms: u64) -> Self {
        Self::with_options(DedupOptions::from_millis(window_ms, grace_ms))
    }

    /// Return the shared request for `key`, running `factory` only if no
    /// fresh entry exists.
    ///
    /// `factory` runs while the key's shard is locked, so it must not call
    /// back into this deduplicator; it should only build the future.
    ///
    /// Inside a tokio runtime the returned work is spawned right away, so it
    /// runs to completion even if every caller drops its future. Outside a
    /// runtime it starts when a caller first polls it.
    pub fn get_or_create<F, Fut>(&self, key: K, factory: F) -> SharedRequest<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let now = Instant::now();
        let window = self.inner.window;

        let (future, generation) = match self.inner.entries.entry(key.clone()) {
            Entry::Occupied(occupied)
                if now.saturating_duration_since(occupied.get().created_at) < window =>
            {
                self.inner.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = ?key, "request deduplicated");
                return occupied.get().future.clone();
            }
            entry => {
                self.inner.misses.fetch_add(1, Ordering::Relaxed);
                let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
                let future = self.wrap(key.clone(), generation, factory());
                let cache_entry = CacheEntry {
                    created_at: now,
                    generation,
                    future: future.clone(),
                };

                match entry {
                    Entry::Occupied(mut occupied) => {
                        trace!(key = ?key, "replacing stale entry");
                        occupied.insert(cache_entry);
                    }
                    Entry::Vacant(vacant) => {
                        vacant.insert(cache_entry);
                    }
                }

                debug!(key = ?key, generation, "request issued");
                (future, generation)
            }
        };

        self.start(&future);
        self.schedule_eviction(key, generation, now);
        future
    }

    // Drive a clone of the shared future on the runtime; its outcome is
    // stored in the `Shared` for every other holder
    fn start(&self, future: &SharedRequest<T, E>) {
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(future.clone().map(|_| ()));
        }
    }

    fn wrap<Fut>(&self, key: K, generation: u64, fut: Fut) -> SharedRequest<T, E>
    where
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let evict = self.inner.evict_failures;
        let inner = Arc::downgrade(&self.inner);

        async move {
            let result = fut.await.map_err(Arc::new);
            if evict && result.is_err() {
                if let Some(inner) = inner.upgrade() {
                    if inner.remove_if_current(&key, generation) {
                        debug!(key = ?key, "failed request evicted early");
                    }
                }
            }
            result
        }
        .boxed()
        .shared()
    }

    fn schedule_eviction(&self, key: K, generation: u64, created_at: Instant) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            // No runtime to run timers on; fall back to sweeping on insert
            self.purge_expired();
            return;
        };

        let inner: Weak<Inner<K, T, E>> = Arc::downgrade(&self.inner);
        let deadline = created_at + self.inner.window + self.inner.grace;

        handle.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(inner) = inner.upgrade() {
                if inner.remove_if_current(&key, generation) {
                    trace!(key = ?key, generation, "entry evicted");
                }
            }
        });
    }

    /// Remove every entry older than `window + grace`.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let ttl = self.inner.window + self.inner.grace;
        let before = self.inner.entries.len();
        self.inner
            .entries
            .retain(|_, entry| now.saturating_duration_since(entry.created_at) < ttl);
        before.saturating_sub(self.inner.entries.len())
    }

    /// Whether `key` has an entry that callers would still be handed.
    pub fn is_fresh(&self, key: &K) -> bool {
        let now = Instant::now();
        self.inner
            .entries
            .get(key)
            .map(|entry| now.saturating_duration_since(entry.created_at) < self.inner.window)
            .unwrap_or(false)
    }

    /// Whether the map physically holds an entry for `key`, fresh or not.
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    pub fn clear(&self) {
        self.inner.entries.clear();
    }

    pub fn window(&self) -> Duration {
        self.inner.window
    }

    pub fn grace(&self) -> Duration {
        self.inner.grace
    }

    pub fn stats(&self) -> DedupStats {
        DedupStats {
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            entries: self.inner.entries.len(),
        }
    }
}

impl<K, T, E> Default for RequestDeduplicator<K, T, E>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::with_options(DedupOptions::default())
    }
}
