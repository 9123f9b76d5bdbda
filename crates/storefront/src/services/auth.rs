//! Authentication endpoints.
//!
//! Login-type calls persist the returned token in the session store before
//! returning; guest login persists the guest id. The calling orchestrator
//! decides what state transition follows.

use reqwest::multipart;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, instrument};
use wellspring_core::{AuthToken, Email, GuestId, UserProfile};

use super::MessageResponse;
use crate::error::{ApiError, Result};
use crate::http::ApiClient;
use crate::session::SessionStoreExt;

/// Response of the login-type endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<AuthToken>,
    #[serde(default)]
    pub is_phone_verified: Option<u8>,
    #[serde(default)]
    pub is_email_verified: Option<u8>,
    #[serde(default)]
    pub message: Option<String>,
}

impl AuthResponse {
    /// The token, or [`ApiError::MissingToken`] carrying the backend's reason.
    ///
    /// # Errors
    ///
    /// Returns `MissingToken` when the response holds no token.
    pub fn into_token(self) -> Result<AuthToken> {
        self.token.ok_or_else(|| {
            ApiError::MissingToken(
                self.message
                    .unwrap_or_else(|| "Account verification required".to_string()),
            )
        })
    }
}

/// Response of the guest-login endpoint. `guest_id` arrives as a number or a string.
#[derive(Debug, Clone, Deserialize)]
pub struct GuestLoginResponse {
    #[serde(deserialize_with = "guest_id_from_any")]
    pub guest_id: GuestId,
    #[serde(default)]
    pub message: Option<String>,
}

fn guest_id_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<GuestId, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => GuestId::new(s),
        Raw::Number(n) => GuestId::new(n.to_string()),
    })
}

/// Body of the sign-up endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub f_name: String,
    pub l_name: String,
    pub email: String,
    pub phone: String,
    #[serde(serialize_with = "serialize_secret")]
    pub password: SecretString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_id: Option<GuestId>,
}

/// Body of the social-login endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SocialLoginRequest {
    /// Provider access token
    #[serde(serialize_with = "serialize_secret")]
    pub token: SecretString,
    /// Provider account id
    pub unique_id: String,
    pub email: String,
    /// Provider name (`google`, `facebook`, `apple`)
    pub medium: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_id: Option<GuestId>,
}

/// Image attached to a profile update.
#[derive(Debug, Clone)]
pub struct ProfileImage {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Fields of a profile update.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub f_name: String,
    pub l_name: String,
    pub email: String,
    pub phone: String,
    pub image: Option<ProfileImage>,
}

impl ProfileUpdate {
    fn into_form(self) -> Result<multipart::Form> {
        let mut form = multipart::Form::new()
            .text("f_name", self.f_name)
            .text("l_name", self.l_name)
            .text("email", self.email)
            .text("phone", self.phone);
        if let Some(image) = self.image {
            let part = multipart::Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(&image.mime)?;
            form = form.part("image", part);
        }
        Ok(form)
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email_or_phone: &'a str,
    password: &'a str,
    field_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    guest_id: Option<&'a str>,
}

#[derive(Serialize)]
struct VerifyPhoneRequest<'a> {
    phone: &'a str,
    otp: &'a str,
}

fn serialize_secret<S: serde::Serializer>(
    secret: &SecretString,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Authentication service.
#[derive(Debug, Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Log in with an email address or phone number.
    ///
    /// A stored guest id is sent along so the backend can merge the guest
    /// cart. The returned token is persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response holds no token.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email_or_phone: &str, password: &SecretString) -> Result<AuthToken> {
        let email_or_phone = email_or_phone.trim();
        let field_type = if Email::parse(email_or_phone).is_ok() {
            "email"
        } else {
            "phone"
        };
        let guest_id = self.api.session_store().guest_id();
        let body = LoginRequest {
            email_or_phone,
            password: password.expose_secret(),
            field_type,
            guest_id: guest_id.as_ref().map(GuestId::as_str),
        };

        let response: AuthResponse = self.api.post("api/v1/auth/login", &body).await?;
        self.persist_token(response)
    }

    /// Create an account. The returned token is persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response holds no token.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, mut request: RegisterRequest) -> Result<AuthToken> {
        if request.guest_id.is_none() {
            request.guest_id = self.api.session_store().guest_id();
        }
        let response: AuthResponse = self.api.post("api/v1/auth/sign-up", &request).await?;
        self.persist_token(response)
    }

    /// Log in through an external identity provider. The returned token is persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response holds no token.
    #[instrument(skip(self, request), fields(medium = %request.medium))]
    pub async fn social_login(&self, mut request: SocialLoginRequest) -> Result<AuthToken> {
        if request.guest_id.is_none() {
            request.guest_id = self.api.session_store().guest_id();
        }
        let response: AuthResponse = self
            .api
            .post("api/v1/auth/social-login", &request)
            .await?;
        self.persist_token(response)
    }

    /// Obtain an anonymous guest id and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the id cannot be persisted.
    #[instrument(skip(self))]
    pub async fn guest_login(&self) -> Result<GuestId> {
        let response: GuestLoginResponse = self
            .api
            .post("api/v1/auth/guest/request", &serde_json::json!({}))
            .await?;
        self.api.session_store().set_guest_id(&response.guest_id)?;
        debug!(guest_id = %response.guest_id, "Guest session issued");
        Ok(response.guest_id)
    }

    /// Fetch the signed-in customer's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<UserProfile> {
        self.api.get("api/v1/customer/info").await
    }

    /// Update the profile, optionally uploading a new image.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the image MIME type is invalid.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<MessageResponse> {
        let form = update.into_form()?;
        self.api
            .post_multipart("api/v1/customer/update-profile", form)
            .await
    }

    /// Start a password reset for an email address or phone number.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn forgot_password(&self, email_or_phone: &str) -> Result<MessageResponse> {
        let email_or_phone = email_or_phone.trim();
        let body = if Email::parse(email_or_phone).is_ok() {
            serde_json::json!({ "email": email_or_phone, "verification_method": "email" })
        } else {
            serde_json::json!({ "phone": email_or_phone, "verification_method": "phone" })
        };
        self.api.post("api/v1/auth/forgot-password", &body).await
    }

    /// Confirm a phone number with the one-time code. The returned token is persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response holds no token.
    #[instrument(skip(self, otp))]
    pub async fn verify_phone(&self, phone: &str, otp: &str) -> Result<AuthToken> {
        let response: AuthResponse = self
            .api
            .post("api/v1/auth/verify-phone", &VerifyPhoneRequest { phone, otp })
            .await?;
        self.persist_token(response)
    }

    fn persist_token(&self, response: AuthResponse) -> Result<AuthToken> {
        let token = response.into_token()?;
        self.api.session_store().set_token(&token)?;
        Ok(token)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use url::Url;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::session::{MemorySessionStore, SessionSignals, SessionStore};

    async fn service() -> (MockServer, AuthService, Arc<MemorySessionStore>) {
        let server = MockServer::start().await;
        let store = Arc::new(MemorySessionStore::new());
        let config = StorefrontConfig::new(Url::parse(&server.uri()).unwrap());
        let api = ApiClient::new(&config, store.clone(), SessionSignals::new()).unwrap();
        (server, AuthService::new(api), store)
    }

    #[test]
    fn test_guest_id_accepts_number_or_string() {
        let numeric: GuestLoginResponse = serde_json::from_str(r#"{"guest_id": 123}"#).unwrap();
        let text: GuestLoginResponse = serde_json::from_str(r#"{"guest_id": "g123"}"#).unwrap();
        assert_eq!(numeric.guest_id.as_str(), "123");
        assert_eq!(text.guest_id.as_str(), "g123");
    }

    #[test]
    fn test_missing_token_carries_message() {
        let response = AuthResponse {
            message: Some("Verify your phone".to_string()),
            ..AuthResponse::default()
        };
        let err = response.into_token().unwrap_err();
        assert_eq!(err.user_message(), "Verify your phone");
    }

    #[test]
    fn test_register_request_exposes_password_only_in_body() {
        let request = RegisterRequest {
            f_name: "Ada".to_string(),
            l_name: "L".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+15550100".to_string(),
            password: SecretString::from("hunter22"),
            ref_code: None,
            guest_id: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["password"], "hunter22");
        assert!(json.get("ref_code").is_none());
        assert!(!format!("{request:?}").contains("hunter22"));
    }

    #[tokio::test]
    async fn test_guest_login_persists_guest_id() {
        let (server, auth, store) = service().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/guest/request"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "guest_verified",
                "guest_id": "g123"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let guest_id = auth.guest_login().await.unwrap();
        assert_eq!(guest_id.as_str(), "g123");
        assert_eq!(store.guest_id().unwrap().as_str(), "g123");
        assert!(store.token().is_none());
    }

    #[tokio::test]
    async fn test_login_sends_field_type_and_guest_id() {
        let (server, auth, store) = service().await;
        store.set_guest_id(&GuestId::new("g9")).unwrap();
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login"))
            .and(body_json(serde_json::json!({
                "email_or_phone": "ada@example.com",
                "password": "hunter22",
                "field_type": "email",
                "guest_id": "g9"
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "tok-ada"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let token = auth
            .login(" ada@example.com ", &SecretString::from("hunter22"))
            .await
            .unwrap();
        assert_eq!(token.expose(), "tok-ada");
        assert_eq!(store.token().unwrap().expose(), "tok-ada");
        assert!(store.get(crate::session::SessionKey::GuestId).is_some());
    }

    #[tokio::test]
    async fn test_login_failure_persists_nothing() {
        let (server, auth, store) = service().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/auth/login"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "errors": [{"code": "auth-001", "message": "Invalid credentials"}]
            })))
            .mount(&server)
            .await;

        let err = auth
            .login("5550100", &SecretString::from("nope"))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Invalid credentials");
        assert!(store.token().is_none());
    }
}
