//! URL-keyed resource cache with at-most-once load semantics. Concurrent
//! requests for the same URL coalesce onto a single in-flight load; waiters
//! settle in arrival order with a shared result. Errors are terminal for a
//! URL within the session, so a retry needs a fresh cache-busting URL.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, info};

/// Terminal failure for one resource URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    pub url: String,
    pub reason: String,
}

impl LoadError {
    pub fn new(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to load {}: {}", self.url, self.reason)
    }
}

impl std::error::Error for LoadError {}

pub type LoadResult = Result<Arc<Value>, LoadError>;

/// Source of JSON resources. Implementations are substituted in tests to
/// count and gate loads.
#[async_trait]
pub trait ResourceLoader: Send + Sync {
    async fn load(&self, url: &str) -> Result<Value, LoadError>;
}

/// URL without its cache-busting query; entries with the same base address
/// the same resource under different tokens.
fn base_of(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

enum Entry {
    /// One load in flight; senders queued in request-arrival order.
    Loading(Vec<oneshot::Sender<LoadResult>>),
    Settled(LoadResult),
}

/// Process-wide cache. A fresh cache-busting token supersedes earlier
/// settlements of the same base resource and evicts them on insert, so the
/// map stays bounded by distinct resources, not distinct tokens.
#[derive(Clone)]
pub struct ResourceCache {
    loader: Arc<dyn ResourceLoader>,
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl ResourceCache {
    pub fn new(loader: Arc<dyn ResourceLoader>) -> Self {
        Self {
            loader,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Requests a resource. The first caller for a URL issues the single
    /// underlying load; everyone else waits on the same settlement.
    pub async fn request(&self, url: &str) -> LoadResult {
        let receiver = {
            let mut entries = self.entries.lock().await;
            match entries.get_mut(url) {
                Some(Entry::Settled(result)) => return result.clone(),
                Some(Entry::Loading(waiters)) => {
                    let (tx, rx) = oneshot::channel();
                    waiters.push(tx);
                    rx
                }
                None => {
                    let (tx, rx) = oneshot::channel();
                    // A new token supersedes older settlements of the same
                    // resource. In-flight loads keep their waiters.
                    let base = base_of(url);
                    entries.retain(|key, entry| {
                        !matches!(entry, Entry::Settled(_)) || base_of(key) != base
                    });
                    entries.insert(url.to_string(), Entry::Loading(vec![tx]));
                    let cache = self.clone();
                    let url = url.to_string();
                    tokio::spawn(async move { cache.run_load(url).await });
                    rx
                }
            }
        };

        match receiver.await {
            Ok(result) => result,
            // The load task always settles before dropping its senders; a
            // closed channel can only mean the runtime is shutting down.
            Err(_) => Err(LoadError::new(url, "load task dropped")),
        }
    }

    /// Fire-and-forget warm-up. The outcome is discarded; failures surface
    /// later, if ever, through a `request` for the same URL.
    pub fn prefetch(&self, url: &str) {
        let cache = self.clone();
        let url = url.to_string();
        tokio::spawn(async move {
            if let Err(err) = cache.request(&url).await {
                debug!("prefetch settled with error: {err}");
            }
        });
    }

    async fn run_load(&self, url: String) {
        let result = match self.loader.load(&url).await {
            Ok(value) => Ok(Arc::new(value)),
            Err(err) => Err(err),
        };

        let waiters = {
            let mut entries = self.entries.lock().await;
            match entries.insert(url.clone(), Entry::Settled(result.clone())) {
                Some(Entry::Loading(waiters)) => waiters,
                _ => Vec::new(),
            }
        };

        match &result {
            Ok(_) => info!("loaded {url} ({} waiter(s))", waiters.len()),
            Err(err) => info!("load failed, caching error: {err}"),
        }

        // Drain in arrival order. Closed receivers belong to detached
        // prefetches and are skipped silently.
        for waiter in waiters {
            let _ = waiter.send(result.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;
    use tokio::task::yield_now;

    struct GatedLoader {
        loads: AtomicUsize,
        gate: Notify,
        fail: bool,
    }

    impl GatedLoader {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                loads: AtomicUsize::new(0),
                gate: Notify::new(),
                fail,
            })
        }
    }

    #[async_trait]
    impl ResourceLoader for GatedLoader {
        async fn load(&self, url: &str) -> Result<Value, LoadError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            if self.fail {
                Err(LoadError::new(url, "synthetic failure"))
            } else {
                Ok(json!({ "url": url }))
            }
        }
    }

    async fn settle() {
        for _ in 0..20 {
            yield_now().await;
        }
    }

    #[tokio::test]
    async fn concurrent_requests_share_one_load_in_fifo_order() {
        let loader = GatedLoader::new(false);
        let cache = ResourceCache::new(loader.clone());
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for i in 0..5 {
            let cache = cache.clone();
            let order = Arc::clone(&order);
            handles.push(tokio::spawn(async move {
                let result = cache.request("weekly.json?v=1").await;
                order.lock().unwrap().push(i);
                result
            }));
        }

        settle().await;
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
        loader.gate.notify_one();

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        let first = results[0].as_ref().unwrap();
        for result in &results {
            assert!(Arc::ptr_eq(first, result.as_ref().unwrap()));
        }
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3, 4]);
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn settled_entry_answers_without_a_second_load() {
        let loader = GatedLoader::new(false);
        let cache = ResourceCache::new(loader.clone());

        loader.gate.notify_one();
        cache.request("daily.json").await.unwrap();
        let value = cache.request("daily.json").await.unwrap();
        assert_eq!(value["url"], "daily.json");
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn errors_are_terminal_per_url() {
        let loader = GatedLoader::new(true);
        let cache = ResourceCache::new(loader.clone());

        loader.gate.notify_one();
        let first = cache.request("weekly.json?v=1").await.unwrap_err();
        let second = cache.request("weekly.json?v=1").await.unwrap_err();
        assert_eq!(first, second);
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);

        // A different cache-busting URL is a distinct key and loads again.
        loader.gate.notify_one();
        let _ = cache.request("weekly.json?v=2").await;
        assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn fresh_tokens_supersede_settled_entries_per_resource() {
        let loader = GatedLoader::new(false);
        let cache = ResourceCache::new(loader.clone());

        // One page view per token; the map must not grow with them.
        for t in 0..3 {
            loader.gate.notify_one();
            cache.request(&format!("daily.json?t={t}")).await.unwrap();
        }
        loader.gate.notify_one();
        cache.request("weekly.json?v=1").await.unwrap();

        assert_eq!(loader.loads.load(Ordering::SeqCst), 4);
        let entries = cache.entries.lock().await;
        assert_eq!(entries.len(), 2);
        assert!(entries.contains_key("daily.json?t=2"));
        assert!(entries.contains_key("weekly.json?v=1"));
    }

    #[tokio::test]
    async fn prefetch_discards_failures_and_still_coalesces() {
        let loader = GatedLoader::new(true);
        let cache = ResourceCache::new(loader.clone());

        cache.prefetch("weekly.json?v=9");
        settle().await;
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
        loader.gate.notify_one();
        settle().await;

        // The prefetch already settled the entry; this observes its error.
        let err = cache.request("weekly.json?v=9").await.unwrap_err();
        assert_eq!(err.reason, "synthetic failure");
        assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    }
}
