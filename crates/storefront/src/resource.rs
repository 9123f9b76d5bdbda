//! Fetch-on-demand state holder with loading and error tracking.
//!
//! A [`Resource`] wraps an async fetcher and exposes `{data, loading, error}`
//! as a cloneable [`ResourceState`] snapshot. It is the building block for
//! every list and detail view.
//!
//! # Unmount semantics
//!
//! The state lives behind an `Arc` owned by the `Resource`. Background
//! fetches started with [`Resource::spawn_fetch`] hold only a `Weak`
//! reference; once the `Resource` is dropped, an in-flight fetch finishes
//! and silently discards its result.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures::future::BoxFuture;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{ApiError, GENERIC_ERROR_MESSAGE};

/// Async function producing a resource's value.
pub type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, ApiError>> + Send + Sync>;

/// Snapshot of a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceState<T> {
    /// Last successfully fetched (or manually set) value.
    pub data: Option<T>,
    /// Whether a fetch is in flight.
    pub loading: bool,
    /// Message of the last failed fetch; cleared when a fetch starts.
    pub error: Option<String>,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

struct Shared<T> {
    state: ResourceState<T>,
    /// Sequence number of the most recent fetch; older fetches are ignored.
    latest: u64,
    deps: Option<u64>,
}

/// Wrapper around an async fetcher with observable state.
pub struct Resource<T> {
    shared: Arc<Mutex<Shared<T>>>,
    fetcher: Fetcher<T>,
}

impl<T> Resource<T>
where
    T: Clone + Send + 'static,
{
    /// Create a resource that fetches only when asked.
    pub fn new<F>(fetcher: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, Result<T, ApiError>> + Send + Sync + 'static,
    {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                state: ResourceState::default(),
                latest: 0,
                deps: None,
            })),
            fetcher: Arc::new(fetcher),
        }
    }

    /// Create a resource and start fetching immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(fetcher: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, Result<T, ApiError>> + Send + Sync + 'static,
    {
        let resource = Self::new(fetcher);
        resource.spawn_fetch();
        resource
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> ResourceState<T> {
        self.lock().state.clone()
    }

    /// Current data, if any.
    #[must_use]
    pub fn data(&self) -> Option<T> {
        self.lock().state.data.clone()
    }

    /// Fetch now and wait for the result.
    ///
    /// The state is updated only if no newer fetch was started meanwhile.
    ///
    /// # Errors
    ///
    /// Returns the fetcher's error; it is also recorded in the state.
    pub async fn refetch(&self) -> Result<T, ApiError> {
        let sequence = begin(&self.shared);
        let result = (self.fetcher)().await;
        finish(&self.shared, sequence, result.as_ref().map_err(ApiError::user_message).cloned());
        result
    }

    /// Start a fetch in the background.
    ///
    /// The task holds only a weak reference to the state; dropping the
    /// resource discards the result.
    pub fn spawn_fetch(&self) -> JoinHandle<()> {
        let sequence = begin(&self.shared);
        let weak = Arc::downgrade(&self.shared);
        let fetch = (self.fetcher)();
        tokio::spawn(async move {
            let result = fetch.await.map_err(|e| e.user_message());
            complete(&weak, sequence, result);
        })
    }

    /// Replace the data locally, e.g. after a mutation returned the new value.
    pub fn set_data(&self, data: T) {
        let mut shared = self.lock();
        shared.state.data = Some(data);
        shared.state.error = None;
    }

    /// Record the dependency key; starts a background fetch if it changed.
    ///
    /// Returns `true` when a fetch was started.
    pub fn set_deps<K: Hash + ?Sized>(&self, deps: &K) -> bool {
        let mut hasher = DefaultHasher::new();
        deps.hash(&mut hasher);
        let key = hasher.finish();

        let changed = {
            let mut shared = self.lock();
            let changed = shared.deps != Some(key);
            shared.deps = Some(key);
            changed
        };
        if changed {
            self.spawn_fetch();
        }
        changed
    }

    fn lock(&self) -> MutexGuard<'_, Shared<T>> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> std::fmt::Debug for Resource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource").finish_non_exhaustive()
    }
}

fn begin<T>(shared: &Mutex<Shared<T>>) -> u64 {
    let mut shared = shared.lock().unwrap_or_else(PoisonError::into_inner);
    shared.latest += 1;
    shared.state.loading = true;
    shared.state.error = None;
    shared.latest
}

fn complete<T>(weak: &Weak<Mutex<Shared<T>>>, sequence: u64, result: Result<T, String>) {
    let Some(shared) = weak.upgrade() else {
        debug!("Resource dropped before fetch completed");
        return;
    };
    finish(&shared, sequence, result);
}

fn finish<T>(shared: &Mutex<Shared<T>>, sequence: u64, result: Result<T, String>) {
    let mut shared = shared.lock().unwrap_or_else(PoisonError::into_inner);
    if sequence != shared.latest {
        debug!(sequence, latest = shared.latest, "Ignoring stale fetch result");
        return;
    }
    shared.state.loading = false;
    match result {
        Ok(data) => {
            shared.state.data = Some(data);
            shared.state.error = None;
        }
        Err(message) => {
            let message = if message.trim().is_empty() {
                GENERIC_ERROR_MESSAGE.to_string()
            } else {
                message
            };
            shared.state.error = Some(message);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use futures::FutureExt;

    use super::*;

    fn counting() -> (Arc<AtomicU32>, Resource<u32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let resource = Resource::new(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Ok(n) }.boxed()
        });
        (calls, resource)
    }

    #[tokio::test]
    async fn test_refetch_updates_state() {
        let (calls, resource) = counting();
        assert_eq!(resource.snapshot(), ResourceState::default());

        assert_eq!(resource.refetch().await.unwrap(), 1);
        let state = resource.snapshot();
        assert_eq!(state.data, Some(1));
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_error_keeps_previous_data() {
        let fail = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = fail.clone();
        let resource = Resource::new(move || {
            let fail = flag.load(Ordering::SeqCst);
            async move {
                if fail {
                    Err(ApiError::Status {
                        status: 500,
                        message: "Server Error".to_string(),
                    })
                } else {
                    Ok(7)
                }
            }
            .boxed()
        });

        resource.refetch().await.unwrap();
        fail.store(true, Ordering::SeqCst);
        assert!(resource.refetch().await.is_err());

        let state = resource.snapshot();
        assert_eq!(state.data, Some(7));
        assert_eq!(state.error.as_deref(), Some("Server Error"));
    }

    #[tokio::test]
    async fn test_empty_error_message_uses_generic_fallback() {
        let resource: Resource<u32> = Resource::new(|| {
            async {
                Err(ApiError::Status {
                    status: 500,
                    message: String::new(),
                })
            }
            .boxed()
        });
        let _ = resource.refetch().await;
        assert_eq!(resource.snapshot().error.as_deref(), Some(GENERIC_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn test_set_deps_fetches_only_on_change() {
        let (calls, resource) = counting();
        assert!(resource.set_deps(&("popular", 1)));
        assert!(!resource.set_deps(&("popular", 1)));
        assert!(resource.set_deps(&("popular", 2)));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_resource_discards_result() {
        let resource = Resource::new(|| {
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok(1_u32)
            }
            .boxed()
        });
        let handle = resource.spawn_fetch();
        assert!(resource.snapshot().loading);
        let weak = Arc::downgrade(&resource.shared);

        drop(resource);
        handle.await.unwrap();
        assert!(weak.upgrade().is_none());
    }

    #[tokio::test]
    async fn test_set_data_overrides() {
        let (_calls, resource) = counting();
        resource.set_data(42);
        assert_eq!(resource.data(), Some(42));
    }
}
