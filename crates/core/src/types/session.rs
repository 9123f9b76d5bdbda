//! Session snapshot: who the current actor is.
//!
//! The backend recognises two kinds of actor: an authenticated customer
//! (bearer token) and an anonymous guest (guest id). The client may keep a
//! stale guest id around after login, so "logged in" is decided by the token
//! together with the guest flag, never by the guest id alone.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Bearer token issued by the login endpoints.
///
/// `Debug` is redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a raw token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

/// Anonymous guest identifier issued by the guest-login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestId(String);

impl GuestId {
    /// Wrap a raw guest id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the guest id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// In-memory view of the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Bearer token, present once the customer has logged in.
    pub token: Option<AuthToken>,
    /// Guest id, present while browsing anonymously (may be stale after login).
    pub guest_id: Option<GuestId>,
    /// Whether the session currently acts as a guest.
    pub is_guest: bool,
}

impl Session {
    /// A session with no actor at all.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A guest session.
    #[must_use]
    pub const fn guest(guest_id: GuestId) -> Self {
        Self {
            token: None,
            guest_id: Some(guest_id),
            is_guest: true,
        }
    }

    /// An authenticated session. Any previous guest id is kept but inactive.
    #[must_use]
    pub const fn authenticated(token: AuthToken, stale_guest_id: Option<GuestId>) -> Self {
        Self {
            token: Some(token),
            guest_id: stale_guest_id,
            is_guest: false,
        }
    }

    /// `true` iff a token is present and the guest flag is off.
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.token.is_some() && !self.is_guest
    }

    /// `true` while acting as a guest with a usable guest id.
    #[must_use]
    pub const fn is_active_guest(&self) -> bool {
        self.is_guest && self.guest_id.is_some()
    }

    /// Whether there is any actor the backend can attribute a cart to.
    #[must_use]
    pub const fn has_actor(&self) -> bool {
        self.is_logged_in() || self.is_active_guest()
    }
}
