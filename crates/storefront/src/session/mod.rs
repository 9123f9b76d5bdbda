//! Persisted session keys and the store abstraction behind them.
//!
//! The token, guest id, module id and zone ids are the only process-wide
//! mutable values in the client. They live behind the [`SessionStore`] trait,
//! which is handed to the HTTP client and the auth orchestrator at
//! construction instead of being read from ambient globals.
//!
//! # Stores
//!
//! - [`MemorySessionStore`] - ephemeral, for tests and short-lived hosts
//! - [`FileSessionStore`] - JSON file rewritten on every mutation

mod file;
mod memory;
mod signals;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;
pub use signals::{SessionListener, SessionSignal, SessionSignals};

use thiserror::Error;
use wellspring_core::{AuthToken, GuestId, ModuleId, ZoneId};

/// Errors raised by persistent session stores.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    /// Reading or writing the backing file failed.
    #[error("session store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not valid JSON.
    #[error("session store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Keys of the persisted session values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SessionKey {
    Token,
    GuestId,
    ModuleId,
    ZoneIds,
}

impl SessionKey {
    /// All keys, in storage order.
    pub const ALL: [Self; 4] = [Self::Token, Self::GuestId, Self::ModuleId, Self::ZoneIds];

    /// Name under which the value is persisted.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::GuestId => "guest_id",
            Self::ModuleId => "module_id",
            Self::ZoneIds => "zone_id",
        }
    }
}

/// Synchronous key/value store for session values.
///
/// Implementations do no validation; typed access goes through
/// [`SessionStoreExt`].
pub trait SessionStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: SessionKey) -> Option<String>;

    /// Write a value.
    ///
    /// # Errors
    ///
    /// Returns an error if a persistent store cannot be written.
    fn set(&self, key: SessionKey, value: &str) -> Result<(), SessionStoreError>;

    /// Delete a value.
    ///
    /// # Errors
    ///
    /// Returns an error if a persistent store cannot be written.
    fn remove(&self, key: SessionKey) -> Result<(), SessionStoreError>;

    /// Delete every value.
    ///
    /// # Errors
    ///
    /// Returns an error if a persistent store cannot be written.
    fn clear(&self) -> Result<(), SessionStoreError>;
}

/// Typed accessors over any [`SessionStore`].
pub trait SessionStoreExt: SessionStore {
    fn token(&self) -> Option<AuthToken> {
        self.get(SessionKey::Token)
            .filter(|t| !t.is_empty())
            .map(AuthToken::new)
    }

    /// # Errors
    ///
    /// Returns an error if a persistent store cannot be written.
    fn set_token(&self, token: &AuthToken) -> Result<(), SessionStoreError> {
        self.set(SessionKey::Token, token.expose())
    }

    fn guest_id(&self) -> Option<GuestId> {
        self.get(SessionKey::GuestId)
            .filter(|g| !g.is_empty())
            .map(GuestId::new)
    }

    /// # Errors
    ///
    /// Returns an error if a persistent store cannot be written.
    fn set_guest_id(&self, guest_id: &GuestId) -> Result<(), SessionStoreError> {
        self.set(SessionKey::GuestId, guest_id.as_str())
    }

    fn module_id(&self) -> Option<ModuleId> {
        self.get(SessionKey::ModuleId)
            .and_then(|m| m.trim().parse::<i64>().ok())
            .map(ModuleId::new)
    }

    /// # Errors
    ///
    /// Returns an error if a persistent store cannot be written.
    fn set_module_id(&self, module_id: ModuleId) -> Result<(), SessionStoreError> {
        self.set(SessionKey::ModuleId, &module_id.to_string())
    }

    /// Zone ids, stored as a JSON array. Unreadable values read as empty.
    fn zone_ids(&self) -> Vec<ZoneId> {
        self.get(SessionKey::ZoneIds)
            .and_then(|z| serde_json::from_str(&z).ok())
            .unwrap_or_default()
    }

    /// # Errors
    ///
    /// Returns an error if a persistent store cannot be written.
    fn set_zone_ids(&self, zone_ids: &[ZoneId]) -> Result<(), SessionStoreError> {
        let encoded = serde_json::to_string(zone_ids)?;
        self.set(SessionKey::ZoneIds, &encoded)
    }
}

impl<T: SessionStore + ?Sized> SessionStoreExt for T {}
