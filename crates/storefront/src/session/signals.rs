//! Session-wide signals: "a call came back unauthorized", "the user logged out".
//!
//! The HTTP client receives a [`SessionSignals`] handle at construction and
//! emits [`SessionSignal::Unauthorized`] whenever any request is rejected
//! with 401. The auth orchestrator registers itself as a listener, so a
//! rejected call anywhere resets the session without the caller holding a
//! reference to the orchestrator.

use std::sync::{Arc, Mutex, PoisonError, Weak};

use tracing::debug;

/// A session-wide event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionSignal {
    /// A request was rejected with HTTP 401.
    Unauthorized,
    /// The session was explicitly ended.
    LoggedOut,
}

/// Receiver of [`SessionSignal`]s.
pub trait SessionListener: Send + Sync {
    fn on_signal(&self, signal: SessionSignal);
}

/// Listener registry shared by the HTTP client and the session owners.
///
/// Listeners are held weakly; dropped listeners are pruned on the next emit.
#[derive(Clone, Default)]
pub struct SessionSignals {
    listeners: Arc<Mutex<Vec<Weak<dyn SessionListener>>>>,
}

impl SessionSignals {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener.
    pub fn register(&self, listener: Weak<dyn SessionListener>) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// Deliver `signal` to every live listener.
    ///
    /// Listeners run synchronously, outside the registry lock, so they may
    /// register further listeners or emit in turn.
    pub fn emit(&self, signal: SessionSignal) {
        let live: Vec<Arc<dyn SessionListener>> = {
            let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
            listeners.retain(|l| l.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };

        debug!(?signal, listeners = live.len(), "Emitting session signal");
        for listener in live {
            listener.on_signal(signal);
        }
    }

    /// Number of live listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|l| l.strong_count() > 0)
            .count()
    }
}

impl std::fmt::Debug for SessionSignals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSignals")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
