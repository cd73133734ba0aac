//! Request-signature cache.
//!
//! Every read goes through [`QueryCache::fetch`] with a [`QueryKey`] built from
//! the resource name, its filter parameters and the language tag, plus a
//! staleness window:
//! - a fresh entry is served without a request;
//! - a stale entry is served as-is while a background refetch replaces it;
//! - a missing entry is fetched and awaited;
//! - callers asking for the same key while a request is in flight share it.
//!
//! The cache is the only shared mutable structure; handlers never write to it
//! except through these methods.

pub mod hooks;

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, FutureExt, Shared};

use crate::errors::ApiError;

pub use hooks::PortfolioQueries;

type Payload = Arc<dyn Any + Send + Sync>;
type InFlight = Shared<BoxFuture<'static, Result<Payload, ApiError>>>;

/// Signature of a cached request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    resource: &'static str,
    params: Vec<(&'static str, String)>,
    lang: String,
}

impl QueryKey {
    pub fn new(resource: &'static str, lang: &str) -> Self {
        Self {
            resource,
            params: Vec::new(),
            lang: lang.to_string(),
        }
    }

    /// Add a parameter. Unset and empty values are left out so that
    /// `filter=None` and `filter=""` share one entry.
    pub fn param(mut self, name: &'static str, value: Option<&str>) -> Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.params.push((name, value.to_string()));
        }
        self
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resource)?;
        for (i, (name, value)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, name, value)?;
        }
        write!(f, " [{}]", self.lang)
    }
}

/// What a consumer observes for one key.
///
/// `data` may be stale while `is_fetching` is set; consumers render it anyway.
#[derive(Debug, Clone)]
pub struct QueryState<T> {
    pub data: Option<T>,
    pub error: Option<ApiError>,
    /// No data yet and a request is in flight
    pub is_loading: bool,
    /// A request for this key is in flight
    pub is_fetching: bool,
    /// `data` is older than the staleness window
    pub is_stale: bool,
}

impl<T> QueryState<T> {
    fn idle() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: false,
            is_fetching: false,
            is_stale: true,
        }
    }

    fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            is_loading: false,
            is_fetching: false,
            is_stale: false,
        }
    }

    fn failure(error: ApiError) -> Self {
        Self {
            error: Some(error),
            ..Self::idle()
        }
    }

    /// Data if present (possibly stale), else the error.
    ///
    /// `None` means nothing was ever loaded for the key.
    pub fn into_result(self) -> Option<Result<T, ApiError>> {
        match (self.data, self.error) {
            (Some(data), _) => Some(Ok(data)),
            (None, Some(err)) => Some(Err(err)),
            (None, None) => None,
        }
    }
}

struct Slot {
    value: Option<Payload>,
    updated_at: Option<Instant>,
    error: Option<ApiError>,
    in_flight: Option<(u64, InFlight)>,
    last_used: Instant,
}

impl Slot {
    fn new() -> Self {
        Self {
            value: None,
            updated_at: None,
            error: None,
            in_flight: None,
            last_used: Instant::now(),
        }
    }

    fn cached<T: Clone + 'static>(&self) -> Option<T> {
        self.value
            .as_ref()
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
    }

    fn is_fresh(&self, stale_time: Duration) -> bool {
        self.updated_at
            .is_some_and(|at| at.elapsed() < stale_time)
    }
}

struct Inner {
    slots: Mutex<HashMap<QueryKey, Slot>>,
    next_attempt: AtomicU64,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Slot>> {
        // A panic while holding the lock leaves the map consistent.
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the outcome of an attempt unless it was superseded.
    fn settle(&self, key: &QueryKey, attempt: u64, result: &Result<Payload, ApiError>) {
        let mut slots = self.lock();
        let Some(slot) = slots.get_mut(key) else {
            tracing::debug!(%key, "Dropping result for invalidated query");
            return;
        };
        if !matches!(&slot.in_flight, Some((id, _)) if *id == attempt) {
            tracing::debug!(%key, "Dropping superseded query result");
            return;
        }

        slot.in_flight = None;
        match result {
            Ok(payload) => {
                slot.value = Some(payload.clone());
                slot.updated_at = Some(Instant::now());
                slot.error = None;
            }
            Err(err) => {
                tracing::debug!(%key, kind = ?err.kind(), "Query failed");
                slot.error = Some(err.clone());
            }
        }
    }
}

enum Plan<T> {
    Fresh(T),
    Stale(T, Option<ApiError>),
    Wait(InFlight),
}

/// Shared cache of content API results.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.len())
            .finish()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                slots: Mutex::new(HashMap::new()),
                next_attempt: AtomicU64::new(1),
            }),
        }
    }

    /// Serve `key` from cache or through `fetcher`.
    ///
    /// Must be called within a tokio runtime: requests run on spawned tasks so
    /// that a dropped caller does not stall other callers sharing the request.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, stale_time: Duration, fetcher: F) -> QueryState<T>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let plan = {
            let mut slots = self.inner.lock();
            let slot = slots.entry(key.clone()).or_insert_with(Slot::new);
            slot.last_used = Instant::now();

            let cached = slot.cached::<T>();
            match cached {
                Some(data) if slot.is_fresh(stale_time) => Plan::Fresh(data),
                cached => {
                    let existing = slot.in_flight.as_ref().map(|(_, f)| f.clone());
                    let in_flight = match existing {
                        Some(in_flight) => in_flight,
                        None => {
                            let attempt = self.inner.next_attempt.fetch_add(1, Ordering::Relaxed);
                            tracing::debug!(%key, refetch = cached.is_some(), "Fetching query");
                            let in_flight = self.start(key.clone(), attempt, fetcher());
                            slot.in_flight = Some((attempt, in_flight.clone()));
                            in_flight
                        }
                    };
                    match cached {
                        Some(data) => Plan::Stale(data, slot.error.clone()),
                        None => Plan::Wait(in_flight),
                    }
                }
            }
        };

        match plan {
            Plan::Fresh(data) => QueryState::success(data),
            Plan::Stale(data, error) => QueryState {
                data: Some(data),
                error,
                is_loading: false,
                is_fetching: true,
                is_stale: true,
            },
            Plan::Wait(in_flight) => match in_flight.await {
                Ok(payload) => match payload.downcast::<T>() {
                    Ok(data) => QueryState::success((*data).clone()),
                    Err(_) => {
                        tracing::error!(%key, "Query key shared by different result types");
                        QueryState::idle()
                    }
                },
                Err(err) => QueryState::failure(err),
            },
        }
    }

    fn start<T, Fut>(&self, key: QueryKey, attempt: u64, request: Fut) -> InFlight
    where
        T: Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        let in_flight = async move {
            let result = request.await.map(|data| Arc::new(data) as Payload);
            if let Some(inner) = inner.upgrade() {
                inner.settle(&key, attempt, &result);
            }
            result
        }
        .boxed()
        .shared();

        tokio::spawn(in_flight.clone());
        in_flight
    }

    /// Current state of `key` without issuing a request.
    pub fn peek<T: Clone + 'static>(&self, key: &QueryKey, stale_time: Duration) -> QueryState<T> {
        let slots = self.inner.lock();
        let Some(slot) = slots.get(key) else {
            return QueryState::idle();
        };

        let data = slot.cached::<T>();
        let is_fetching = slot.in_flight.is_some();
        QueryState {
            is_loading: is_fetching && data.is_none(),
            is_stale: !slot.is_fresh(stale_time),
            data,
            error: slot.error.clone(),
            is_fetching,
        }
    }

    /// Drop every entry for `resource`. Results of requests still in flight
    /// for those entries are discarded.
    pub fn invalidate(&self, resource: &str) -> usize {
        let mut slots = self.inner.lock();
        let before = slots.len();
        slots.retain(|key, _| key.resource != resource);
        before - slots.len()
    }

    /// Drop every entry.
    pub fn clear(&self) -> usize {
        let mut slots = self.inner.lock();
        let removed = slots.len();
        slots.clear();
        removed
    }

    /// Drop idle entries not read within `max_idle`.
    pub fn prune(&self, max_idle: Duration) -> usize {
        let mut slots = self.inner.lock();
        let before = slots.len();
        slots.retain(|_, slot| slot.in_flight.is_some() || slot.last_used.elapsed() <= max_idle);
        before - slots.len()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    const HOUR: Duration = Duration::from_secs(3600);

    fn counting(
        counter: &Arc<AtomicUsize>,
        value: &'static str,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<String, ApiError>> {
        let counter = counter.clone();
        move || {
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(value.to_string())
            }
            .boxed()
        }
    }

    fn not_found() -> ApiError {
        crate::client::classify(reqwest::StatusCode::NOT_FOUND, &serde_json::Value::Null)
    }

    #[tokio::test]
    async fn test_fresh_entry_served_without_request() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("profile", "en");

        let first = cache.fetch(key.clone(), HOUR, counting(&calls, "v1")).await;
        let second = cache.fetch(key, HOUR, counting(&calls, "v2")).await;

        assert_eq!(first.data.as_deref(), Some("v1"));
        assert_eq!(second.data.as_deref(), Some("v1"));
        assert!(!second.is_fetching);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_identical_keys_share_request() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("images", "en").param("filter", Some("deepsky"));

        let (a, b) = tokio::join!(
            cache.fetch(key.clone(), HOUR, counting(&calls, "list")),
            cache.fetch(key.clone(), HOUR, counting(&calls, "list")),
        );

        assert_eq!(a.data.as_deref(), Some("list"));
        assert_eq!(b.data.as_deref(), Some("list"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_key_change_triggers_new_fetch() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        cache
            .fetch(QueryKey::new("images", "en").param("tag", Some("galaxy")), HOUR, counting(&calls, "a"))
            .await;
        cache
            .fetch(QueryKey::new("images", "en").param("tag", Some("nebula")), HOUR, counting(&calls, "b"))
            .await;
        cache
            .fetch(QueryKey::new("images", "pl").param("tag", Some("nebula")), HOUR, counting(&calls, "c"))
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(cache.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_param_shares_entry_with_unset() {
        let a = QueryKey::new("tags", "en").param("filter", Some(""));
        let b = QueryKey::new("tags", "en").param("filter", None);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "tags [en]");
        assert_eq!(
            QueryKey::new("images", "en")
                .param("filter", Some("deepsky"))
                .param("tag", Some("m31"))
                .to_string(),
            "images?filter=deepsky&tag=m31 [en]"
        );
    }

    #[tokio::test]
    async fn test_stale_entry_served_while_refetching() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("projects", "en");

        cache.fetch(key.clone(), Duration::ZERO, counting(&calls, "old")).await;
        let stale = cache.fetch(key.clone(), Duration::ZERO, counting(&calls, "new")).await;

        assert_eq!(stale.data.as_deref(), Some("old"));
        assert!(stale.is_fetching);
        assert!(stale.is_stale);
        assert!(!stale.is_loading);

        tokio::time::sleep(Duration::from_millis(100)).await;
        let refreshed: QueryState<String> = cache.peek(&key, HOUR);
        assert_eq!(refreshed.data.as_deref(), Some("new"));
        assert!(!refreshed.is_fetching);
        assert!(!refreshed.is_stale);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_is_reported_and_not_cached() {
        let cache = QueryCache::new();
        let key = QueryKey::new("background", "en");

        let failed: QueryState<String> = cache
            .fetch(key.clone(), HOUR, || async { Err(not_found()) })
            .await;
        assert!(failed.data.is_none());
        assert!(failed.error.as_ref().is_some_and(ApiError::is_not_found));

        let retried = cache
            .fetch(key.clone(), HOUR, || async { Ok("bg".to_string()) })
            .await;
        assert_eq!(retried.data.as_deref(), Some("bg"));
        assert!(retried.error.is_none());
    }

    #[tokio::test]
    async fn test_failed_refetch_keeps_previous_data() {
        let cache = QueryCache::new();
        let key = QueryKey::new("tags", "en");

        cache
            .fetch(key.clone(), Duration::ZERO, || async { Ok(vec!["galaxy".to_string()]) })
            .await;
        cache
            .fetch::<Vec<String>, _, _>(key.clone(), Duration::ZERO, || async { Err(not_found()) })
            .await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        let state: QueryState<Vec<String>> = cache.peek(&key, Duration::ZERO);
        assert_eq!(state.data, Some(vec!["galaxy".to_string()]));
        assert!(state.error.is_some());
        assert!(matches!(state.into_result(), Some(Ok(_))));
    }

    #[tokio::test]
    async fn test_peek_reports_loading() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("categories", "en");

        let pending = {
            let cache = cache.clone();
            let key = key.clone();
            let fetcher = counting(&calls, "cats");
            tokio::spawn(async move { cache.fetch(key, HOUR, fetcher).await })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;

        let loading: QueryState<String> = cache.peek(&key, HOUR);
        assert!(loading.is_loading);
        assert!(loading.data.is_none());

        let done = pending.await.unwrap();
        assert_eq!(done.data.as_deref(), Some("cats"));
        assert!(cache.peek::<String>(&QueryKey::new("nothing", "en"), HOUR).into_result().is_none());
    }

    #[tokio::test]
    async fn test_invalidate_discards_in_flight_result() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("images", "en");

        let pending = {
            let cache = cache.clone();
            let key = key.clone();
            let fetcher = counting(&calls, "superseded");
            tokio::spawn(async move { cache.fetch(key, HOUR, fetcher).await })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(cache.invalidate("images"), 1);

        // The waiting caller still gets its answer.
        assert_eq!(pending.await.unwrap().data.as_deref(), Some("superseded"));
        assert!(cache.peek::<String>(&key, HOUR).data.is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_prune_and_clear() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.fetch(QueryKey::new("a", "en"), HOUR, counting(&calls, "a")).await;
        cache.fetch(QueryKey::new("b", "en"), HOUR, counting(&calls, "b")).await;

        assert_eq!(cache.prune(HOUR), 0);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(cache.prune(Duration::from_millis(1)), 2);

        cache.fetch(QueryKey::new("a", "en"), HOUR, counting(&calls, "a")).await;
        assert_eq!(cache.clear(), 1);
    }
}
