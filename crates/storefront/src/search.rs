//! Supersession of in-flight requests.
//!
//! [`SearchCoordinator`] allows at most one in-flight call per coordinator.
//! Starting a new call cancels the previous one; a cancelled call resolves
//! to `Ok(None)` rather than an error, and never delivers a result after
//! its successor was started.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::Result;

#[derive(Default)]
struct Slot {
    generation: u64,
    token: Option<CancellationToken>,
}

/// Frees the slot when a call ends, including when its future is dropped.
struct Release<'a> {
    slot: &'a Mutex<Slot>,
    generation: u64,
}

impl Drop for Release<'_> {
    fn drop(&mut self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.generation == self.generation {
            slot.token = None;
        }
    }
}

/// Cancels the previous call whenever a new one starts.
///
/// Clones share the slot, so they supersede each other.
#[derive(Clone, Default)]
pub struct SearchCoordinator {
    slot: Arc<Mutex<Slot>>,
}

impl SearchCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `fut`, cancelling whichever call is still in flight.
    ///
    /// Returns `Ok(None)` if this call is itself superseded before it
    /// completes.
    ///
    /// # Errors
    ///
    /// Returns the future's error if it completes unsuperseded with one.
    pub async fn run<T, F>(&self, fut: F) -> Result<Option<T>>
    where
        F: Future<Output = Result<T>>,
    {
        let token = CancellationToken::new();
        let generation = {
            let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(previous) = slot.token.replace(token.clone()) {
                previous.cancel();
            }
            slot.generation += 1;
            slot.generation
        };

        let release = Release {
            slot: &self.slot,
            generation,
        };

        let outcome = tokio::select! {
            biased;
            () = token.cancelled() => None,
            result = fut => Some(result),
        };
        drop(release);

        match outcome {
            Some(_) if token.is_cancelled() => {
                debug!("Discarding result of superseded call");
                Ok(None)
            }
            Some(result) => result.map(Some),
            None => {
                debug!("Call superseded");
                Ok(None)
            }
        }
    }

    /// Cancel the in-flight call, if any.
    pub fn cancel(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = slot.token.take() {
            token.cancel();
        }
    }

    /// Whether a call is currently in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .is_some()
    }
}

impl std::fmt::Debug for SearchCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchCoordinator")
            .field("busy", &self.is_busy())
            .finish()
    }
}
