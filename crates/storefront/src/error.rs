//! Unified error handling with Sentry integration.
//!
//! Every service call and orchestration step returns `Result<T, ApiError>`.
//! HTTP failures carry the backend's status and normalized message so the
//! UI layer can show them as a toast or inline error.

use thiserror::Error;

use crate::session::SessionStoreError;

/// Message shown when an error carries no usable text.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong";

/// Errors that can occur when talking to the marketplace backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },

    /// Backend rejected the session (HTTP 401).
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request URL could not be built.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A session value could not be sent as a header.
    #[error("Invalid value for header {0}")]
    InvalidHeader(&'static str),

    /// A login-type response carried no token (e.g. the account still needs
    /// phone or email verification).
    #[error("{0}")]
    MissingToken(String),

    /// A protected call was attempted with neither a token nor a guest id.
    #[error("No active session: sign in or continue as guest first")]
    NotSignedIn,

    /// Persisting session state failed.
    #[error("Session store error: {0}")]
    Session(#[from] SessionStoreError),
}

impl ApiError {
    /// HTTP status of the failed response, if there was one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Unauthorized { .. } => Some(401),
            _ => None,
        }
    }

    /// Whether the backend rejected the session.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Message suitable for showing to the customer.
    ///
    /// Backend messages are passed through; everything else falls back to
    /// the error's display text, or [`GENERIC_ERROR_MESSAGE`] when empty.
    #[must_use]
    pub fn user_message(&self) -> String {
        let message = match self {
            Self::Status { message, .. }
            | Self::Unauthorized { message }
            | Self::MissingToken(message) => message.clone(),
            other => other.to_string(),
        };
        if message.trim().is_empty() {
            GENERIC_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Set the Sentry user context from the customer's id.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout or session reset to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for session and cart actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("item_id", "7")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = ApiError::Status {
            status: 403,
            message: "Store is closed".to_string(),
        };
        assert_eq!(err.to_string(), "Store is closed (HTTP 403)");
        assert_eq!(err.status(), Some(403));
        assert_eq!(err.user_message(), "Store is closed");
    }

    #[test]
    fn test_unauthorized_status() {
        let err = ApiError::Unauthorized {
            message: "Unauthenticated.".to_string(),
        };
        assert!(err.is_unauthorized());
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn test_user_message_falls_back_when_empty() {
        let err = ApiError::Status {
            status: 500,
            message: "  ".to_string(),
        };
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn test_not_signed_in_has_no_status() {
        let err = ApiError::NotSignedIn;
        assert_eq!(err.status(), None);
        assert!(!err.is_unauthorized());
        assert!(err.user_message().contains("sign in"));
    }
}
