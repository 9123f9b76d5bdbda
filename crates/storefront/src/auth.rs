//! Session orchestration: who the current actor is.
//!
//! [`AuthSession`] owns the authenticated/guest duality. It restores a
//! persisted token on startup (or obtains a guest id), handles login and
//! logout, and listens for [`SessionSignal::Unauthorized`] so a 401 from any
//! request resets the session.
//!
//! # Phases
//!
//! ```text
//! Uninitialized -> LoadingUser  -> Authenticated
//!               -> LoadingGuest -> Guest | Unauthenticated
//! Authenticated -> Guest | Unauthenticated   (logout or 401)
//! ```
//!
//! State changes are published on a `watch` channel; see
//! [`AuthSession::subscribe`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use secrecy::SecretString;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};
use wellspring_core::{AuthToken, GuestId, Session, UserProfile};

use crate::error::{ApiError, Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::http::ApiClient;
use crate::services::{AuthService, RegisterRequest, SocialLoginRequest};
use crate::session::{SessionKey, SessionListener, SessionSignal, SessionStoreExt};

/// Lifecycle phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthPhase {
    #[default]
    Uninitialized,
    LoadingGuest,
    LoadingUser,
    Guest,
    Authenticated,
    Unauthenticated,
}

/// The actor the backend attributes requests to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// Neither a token nor an active guest id.
    None,
    Guest(GuestId),
    Customer(AuthToken),
}

/// Published session state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthSnapshot {
    pub phase: AuthPhase,
    pub session: Session,
    /// Profile of the signed-in customer; `None` for guests and when the
    /// profile could not be loaded.
    pub user: Option<UserProfile>,
    /// Incremented on every state change.
    pub revision: u64,
}

impl AuthSnapshot {
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    #[must_use]
    pub const fn is_guest(&self) -> bool {
        self.session.is_guest
    }

    /// The actor requests are made on behalf of.
    #[must_use]
    pub fn actor(&self) -> Actor {
        if let (true, Some(token)) = (self.session.is_logged_in(), &self.session.token) {
            return Actor::Customer(token.clone());
        }
        match (&self.session.guest_id, self.session.is_guest) {
            (Some(guest_id), true) => Actor::Guest(guest_id.clone()),
            _ => Actor::None,
        }
    }
}

/// Session orchestrator.
pub struct AuthSession {
    api: ApiClient,
    auth: AuthService,
    state: watch::Sender<AuthSnapshot>,
    initialized: AtomicBool,
}

impl AuthSession {
    /// Create the orchestrator and register it for session signals.
    #[must_use]
    pub fn new(api: &ApiClient, auth: AuthService) -> Arc<Self> {
        let session = Arc::new(Self {
            api: api.clone(),
            auth,
            state: watch::Sender::new(AuthSnapshot::default()),
            initialized: AtomicBool::new(false),
        });
        let listener: Weak<dyn SessionListener> = Arc::downgrade(&session) as Weak<dyn SessionListener>;
        api.signals().register(listener);
        session
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> AuthSnapshot {
        self.state.borrow().clone()
    }

    /// Current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.state.borrow().session.clone()
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.state.borrow().is_logged_in()
    }

    /// Receive every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.state.subscribe()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Restore the persisted session or start a guest session.
    ///
    /// Runs once; later calls return the current state without any request.
    /// Failures are non-fatal: a profile error other than 401 keeps the
    /// token, and a failed guest login leaves the session unauthenticated.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> AuthSnapshot {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return self.snapshot();
        }

        let store = self.api.session_store();
        if let Some(token) = store.token() {
            let stale_guest = store.guest_id();
            self.transition(|s| {
                s.phase = AuthPhase::LoadingUser;
                s.session = Session::authenticated(token, stale_guest);
                s.user = None;
            });
            match self.load_profile().await {
                Ok(()) => return self.snapshot(),
                Err(e) if e.is_unauthorized() => {
                    info!("Stored token rejected, continuing as guest");
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load profile, keeping session");
                    self.transition(|s| s.phase = AuthPhase::Authenticated);
                    return self.snapshot();
                }
            }
        }

        self.start_guest().await;
        self.snapshot()
    }

    /// Adopt a freshly issued token and load the profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be persisted or the backend
    /// rejects it with 401. Other profile failures are logged and the
    /// session stays authenticated.
    #[instrument(skip(self, token))]
    pub async fn on_login_success(&self, token: AuthToken) -> Result<()> {
        let store = self.api.session_store();
        store.set_token(&token)?;
        let stale_guest = store.guest_id();
        self.transition(|s| {
            s.phase = AuthPhase::LoadingUser;
            s.session = Session::authenticated(token, stale_guest);
            s.user = None;
        });
        add_breadcrumb("auth", "Logged in", None);

        match self.load_profile().await {
            Ok(()) => Ok(()),
            Err(e) if e.is_unauthorized() => Err(e),
            Err(e) => {
                warn!(error = %e, "Failed to load profile after login");
                self.transition(|s| s.phase = AuthPhase::Authenticated);
                Ok(())
            }
        }
    }

    /// Log in with an email address or phone number.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email_or_phone: &str, password: &SecretString) -> Result<()> {
        let token = self.auth.login(email_or_phone, password).await?;
        self.on_login_success(token).await
    }

    /// Create an account and log in.
    ///
    /// # Errors
    ///
    /// Returns an error if registration fails.
    #[instrument(skip(self, request))]
    pub async fn register(&self, request: RegisterRequest) -> Result<()> {
        let token = self.auth.register(request).await?;
        self.on_login_success(token).await
    }

    /// Log in through an external identity provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider token is rejected.
    #[instrument(skip(self, request))]
    pub async fn social_login(&self, request: SocialLoginRequest) -> Result<()> {
        let token = self.auth.social_login(request).await?;
        self.on_login_success(token).await
    }

    /// End the session: clear every persisted key and reset in-memory state.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be cleared. In-memory state is
    /// reset regardless.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<()> {
        let cleared = self.api.session_store().clear();
        self.transition(|s| {
            s.phase = AuthPhase::Unauthenticated;
            s.session = Session::anonymous();
            s.user = None;
        });
        clear_sentry_user();
        add_breadcrumb("auth", "Logged out", None);
        self.api.signals().emit(SessionSignal::LoggedOut);
        info!("Logged out");
        cleared.map_err(ApiError::from)
    }

    /// Reload the signed-in customer's profile.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn` for guests, or the request's error.
    #[instrument(skip(self))]
    pub async fn refresh_user(&self) -> Result<UserProfile> {
        if !self.is_logged_in() {
            return Err(ApiError::NotSignedIn);
        }
        let user = self.auth.profile().await?;
        set_sentry_user(&user.id, user.email.as_deref());
        let published = user.clone();
        self.transition(|s| s.user = Some(published));
        Ok(user)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn load_profile(&self) -> Result<()> {
        let user = self.auth.profile().await?;
        set_sentry_user(&user.id, user.email.as_deref());
        debug!(user_id = %user.id, "Profile loaded");
        self.transition(|s| {
            if s.session.is_logged_in() {
                s.phase = AuthPhase::Authenticated;
                s.user = Some(user);
            }
        });
        Ok(())
    }

    async fn start_guest(&self) {
        self.transition(|s| {
            s.phase = AuthPhase::LoadingGuest;
            s.session = Session::anonymous();
            s.user = None;
        });
        match self.auth.guest_login().await {
            Ok(guest_id) => self.transition(|s| {
                s.phase = AuthPhase::Guest;
                s.session = Session::guest(guest_id);
            }),
            Err(e) => {
                warn!(error = %e, "Guest login failed, browsing without a session");
                self.transition(|s| s.phase = AuthPhase::Unauthenticated);
            }
        }
    }

    fn transition(&self, apply: impl FnOnce(&mut AuthSnapshot)) {
        self.state.send_modify(|s| {
            apply(s);
            s.revision += 1;
        });
    }

    /// Drop the token after a 401. Only acts while a token is held, so a
    /// burst of rejected calls resets the session once.
    fn reset_unauthorized(&self) {
        let store = self.api.session_store();
        if let Err(e) = store.remove(SessionKey::Token) {
            warn!(error = %e, "Failed to remove rejected token");
        }
        let guest_id = store.guest_id();

        let reset = self.state.send_if_modified(|s| {
            if s.session.token.is_none() {
                return false;
            }
            match guest_id {
                Some(guest_id) => {
                    s.phase = AuthPhase::Guest;
                    s.session = Session::guest(guest_id);
                }
                None => {
                    s.phase = AuthPhase::Unauthenticated;
                    s.session = Session::anonymous();
                }
            }
            s.user = None;
            s.revision += 1;
            true
        });

        if reset {
            clear_sentry_user();
            add_breadcrumb("auth", "Session rejected", None);
            info!("Session reset after unauthorized response");
        }
    }
}

impl SessionListener for AuthSession {
    fn on_signal(&self, signal: SessionSignal) {
        match signal {
            SessionSignal::Unauthorized => self.reset_unauthorized(),
            SessionSignal::LoggedOut => debug!("Logout signal received"),
        }
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("phase", &self.state.borrow().phase)
            .finish_non_exhaustive()
    }
}
