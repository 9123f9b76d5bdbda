//! Transient notifications.
//!
//! At most [`MAX_VISIBLE`] toasts are visible; pushing another evicts the
//! oldest. Each toast removes itself after its duration, or earlier when
//! dismissed. Ids come from a process-wide counter and only ever increase.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::AbortHandle;

/// Maximum number of toasts visible at once.
pub const MAX_VISIBLE: usize = 5;

static NEXT_TOAST_ID: AtomicU64 = AtomicU64::new(1);

/// Severity of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastKind {
    Success,
    Error,
    Info,
    Warning,
}

/// A visible toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
    pub duration: Duration,
}

struct Entry {
    toast: Toast,
    expiry: AbortHandle,
}

/// Bounded queue of visible toasts.
///
/// Cheap to clone; clones share the queue. Pushing requires a tokio runtime
/// for the expiry timer.
#[derive(Clone)]
pub struct ToastQueue {
    entries: Arc<Mutex<Vec<Entry>>>,
    default_duration: Duration,
}

impl ToastQueue {
    #[must_use]
    pub fn new(default_duration: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            default_duration,
        }
    }

    /// Show a toast for the default duration. Returns its id.
    pub fn push(&self, message: impl Into<String>, kind: ToastKind) -> u64 {
        self.push_with_duration(message, kind, self.default_duration)
    }

    /// Show a toast for `duration`. Returns its id.
    pub fn push_with_duration(
        &self,
        message: impl Into<String>,
        kind: ToastKind,
        duration: Duration,
    ) -> u64 {
        let id = NEXT_TOAST_ID.fetch_add(1, Ordering::Relaxed);

        let queue = self.clone();
        let expiry = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            queue.remove(id);
        })
        .abort_handle();

        let mut entries = self.lock();
        entries.push(Entry {
            toast: Toast {
                id,
                message: message.into(),
                kind,
                duration,
            },
            expiry,
        });
        while entries.len() > MAX_VISIBLE {
            let evicted = entries.remove(0);
            evicted.expiry.abort();
        }
        id
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.push(message, ToastKind::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.push(message, ToastKind::Error)
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.push(message, ToastKind::Info)
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.push(message, ToastKind::Warning)
    }

    /// Remove a toast before it expires (e.g. on click).
    ///
    /// Returns `false` if it was already gone.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut entries = self.lock();
        let Some(position) = entries.iter().position(|e| e.toast.id == id) else {
            return false;
        };
        entries.remove(position).expiry.abort();
        true
    }

    /// Visible toasts, oldest first.
    #[must_use]
    pub fn visible(&self) -> Vec<Toast> {
        self.lock().iter().map(|e| e.toast.clone()).collect()
    }

    fn remove(&self, id: u64) {
        self.lock().retain(|e| e.toast.id != id);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ToastQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToastQueue")
            .field("visible", &self.lock().len())
            .field("default_duration", &self.default_duration)
            .finish()
    }
}
