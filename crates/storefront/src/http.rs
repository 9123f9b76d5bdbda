//! HTTP client wrapper for the marketplace REST API.
//!
//! Every request carries the session headers read from the injected
//! [`SessionStore`]:
//!
//! | Header | Source |
//! |---|---|
//! | `Authorization: Bearer <token>` | stored token |
//! | `guest-id` | stored guest id |
//! | `moduleId` | selected module |
//! | `zoneId` | zone ids as a JSON array |
//! | `X-localization` | configured locale |
//!
//! Non-success responses become [`ApiError::Status`] with the backend's
//! message. A 401 additionally emits [`SessionSignal::Unauthorized`] on the
//! injected [`SessionSignals`] before the error is returned.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode, multipart};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};
use url::Url;

use crate::config::StorefrontConfig;
use crate::error::{ApiError, Result};
use crate::session::{SessionSignal, SessionSignals, SessionStore, SessionStoreExt};

/// Longest response excerpt written to logs.
const LOG_BODY_LIMIT: usize = 500;

// =============================================================================
// ApiClient
// =============================================================================

/// Authenticated JSON client for the backend.
///
/// Cheap to clone; clones share the connection pool, store and signals.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    locale: String,
    store: Arc<dyn SessionStore>,
    signals: SessionSignals,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(
        config: &StorefrontConfig,
        store: Arc<dyn SessionStore>,
        signals: SessionSignals,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        headers.insert(
            "X-localization",
            HeaderValue::from_str(&config.locale)
                .map_err(|_| ApiError::InvalidHeader("X-localization"))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_base_url.as_str().trim_end_matches('/').to_string(),
                locale: config.locale.clone(),
                store,
                signals,
            }),
        })
    }

    /// The session store this client reads headers from.
    #[must_use]
    pub fn session_store(&self) -> &Arc<dyn SessionStore> {
        &self.inner.store
    }

    /// The signal registry this client reports 401s to.
    #[must_use]
    pub fn signals(&self) -> &SessionSignals {
        &self.inner.signals
    }

    /// Locale sent with every request.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.inner.locale
    }

    // =========================================================================
    // Request Methods
    // =========================================================================

    /// GET `path` and decode the JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status or bad JSON.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_with_query(path, &[]).await
    }

    /// GET `path?query` and decode the JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status or bad JSON.
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let request = self.request(Method::GET, path, query)?;
        decode(&self.execute(request).await?)
    }

    /// POST a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status or bad JSON.
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.request(Method::POST, path, &[])?.json(body);
        decode(&self.execute(request).await?)
    }

    /// POST a JSON body, ignoring the response body.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-success status.
    pub async fn post_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        let request = self.request(Method::POST, path, &[])?.json(body);
        self.execute(request).await.map(drop)
    }

    /// PUT a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status or bad JSON.
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.request(Method::PUT, path, &[])?.json(body);
        decode(&self.execute(request).await?)
    }

    /// DELETE `path?query`, ignoring the response body.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-success status.
    pub async fn delete(&self, path: &str, query: &[(&str, &str)]) -> Result<()> {
        let request = self.request(Method::DELETE, path, query)?;
        self.execute(request).await.map(drop)
    }

    /// POST a multipart form and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status or bad JSON.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: multipart::Form,
    ) -> Result<T> {
        let request = self.request(Method::POST, path, &[])?.multipart(form);
        decode(&self.execute(request).await?)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Build the full URL for `path` with `query` appended.
    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/{}",
            self.inner.base_url,
            path.trim_start_matches('/')
        ))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Session headers for the current store contents.
    fn session_headers(&self) -> Result<HeaderMap> {
        let store = &self.inner.store;
        let mut headers = HeaderMap::new();

        if let Some(token) = store.token() {
            let value = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
                .map_err(|_| ApiError::InvalidHeader("Authorization"))?;
            headers.insert(AUTHORIZATION, value);
        }
        if let Some(guest_id) = store.guest_id() {
            let value = HeaderValue::from_str(guest_id.as_str())
                .map_err(|_| ApiError::InvalidHeader("guest-id"))?;
            headers.insert("guest-id", value);
        }
        if let Some(module_id) = store.module_id() {
            headers.insert("moduleId", HeaderValue::from(module_id.as_i64()));
        }
        let zone_ids = store.zone_ids();
        if !zone_ids.is_empty() {
            let encoded = serde_json::to_string(&zone_ids)?;
            let value =
                HeaderValue::from_str(&encoded).map_err(|_| ApiError::InvalidHeader("zoneId"))?;
            headers.insert("zoneId", value);
        }

        Ok(headers)
    }

    fn request(&self, method: Method, path: &str, query: &[(&str, &str)]) -> Result<RequestBuilder> {
        let url = self.url(path, query)?;
        Ok(self
            .inner
            .client
            .request(method, url)
            .headers(self.session_headers()?))
    }

    /// Send the request and return the body of a successful response.
    async fn execute(&self, request: RequestBuilder) -> Result<String> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.text().await?;

        if status.is_success() {
            debug!(status = %status, path = %url, "API request succeeded");
            return Ok(body);
        }

        let message = error_message(&body, status);

        if status == StatusCode::UNAUTHORIZED {
            warn!(path = %url, message = %message, "API request unauthorized");
            self.inner.signals.emit(SessionSignal::Unauthorized);
            return Err(ApiError::Unauthorized { message });
        }

        if status.is_server_error() {
            error!(
                status = %status,
                path = %url,
                body = %excerpt(&body),
                "Backend returned server error"
            );
        } else {
            debug!(status = %status, path = %url, message = %message, "API request rejected");
        }

        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("locale", &self.inner.locale)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Decode a JSON body, treating an empty body as `null`.
fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| {
        error!(error = %e, body = %excerpt(body), "Failed to parse API response");
        ApiError::Parse(e)
    })
}

/// Extract the human-readable message from an error body.
///
/// Recognised shapes, in order: `{"errors": [{"message": ...}]}`,
/// `{"message": ...}`, `{"error": ...}`. Anything else falls back to the
/// status reason phrase.
fn error_message(body: &str, status: StatusCode) -> String {
    let from_body = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            let text = |value: Option<&serde_json::Value>| {
                value
                    .and_then(serde_json::Value::as_str)
                    .filter(|m| !m.trim().is_empty())
                    .map(str::to_string)
            };
            text(
                json.get("errors")
                    .and_then(|errors| errors.get(0))
                    .and_then(|first| first.get("message")),
            )
            .or_else(|| text(json.get("message")))
            .or_else(|| text(json.get("error")))
        });

    from_body.unwrap_or_else(|| {
        status
            .canonical_reason()
            .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_string)
    })
}

fn excerpt(body: &str) -> String {
    body.chars().take(LOG_BODY_LIMIT).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Weak;

    use wellspring_core::{AuthToken, GuestId, ModuleId, ZoneId};
    use wiremock::matchers::{header, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::session::{MemorySessionStore, SessionListener};

    fn client_for(server: &MockServer) -> (ApiClient, Arc<MemorySessionStore>) {
        let store = Arc::new(MemorySessionStore::new());
        let config = StorefrontConfig::new(Url::parse(&server.uri()).unwrap());
        let client = ApiClient::new(&config, store.clone(), SessionSignals::new()).unwrap();
        (client, store)
    }

    #[test]
    fn test_error_message_shapes() {
        let status = StatusCode::FORBIDDEN;
        assert_eq!(
            error_message(r#"{"errors":[{"code":"auth","message":"Invalid credentials"}]}"#, status),
            "Invalid credentials"
        );
        assert_eq!(error_message(r#"{"message":"Store closed"}"#, status), "Store closed");
        assert_eq!(error_message(r#"{"error":"Bad zone"}"#, status), "Bad zone");
        assert_eq!(error_message("<html>oops</html>", status), "Forbidden");
        assert_eq!(error_message(r#"{"message":""}"#, status), "Forbidden");
    }

    #[test]
    fn test_error_message_skips_non_text_candidates() {
        let status = StatusCode::UNPROCESSABLE_ENTITY;
        assert_eq!(
            error_message(r#"{"errors":[{"code":"x","message":{"en":"nested"}}],"message":"Invalid phone"}"#, status),
            "Invalid phone"
        );
        assert_eq!(
            error_message(r#"{"errors":[{"message":"  "}],"message":null,"error":"Zone closed"}"#, status),
            "Zone closed"
        );
        assert_eq!(error_message(r#"{"message":42}"#, status), "Unprocessable Entity");
    }

    #[test]
    fn test_decode_empty_body_as_null() {
        let value: Option<u32> = decode("  ").unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_session_headers_are_attached() {
        let server = MockServer::start().await;
        let (client, store) = client_for(&server);
        store.set_token(&AuthToken::new("tok-1")).unwrap();
        store.set_guest_id(&GuestId::new("g123")).unwrap();
        store.set_module_id(ModuleId::new(3)).unwrap();
        store.set_zone_ids(&[ZoneId::new(4)]).unwrap();

        Mock::given(method("GET"))
            .and(path("/api/v1/config"))
            .and(header("Authorization", "Bearer tok-1"))
            .and(header("guest-id", "g123"))
            .and(header("moduleId", "3"))
            .and(header("zoneId", "[4]"))
            .and(header("X-localization", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let body: serde_json::Value = client.get("api/v1/config").await.unwrap();
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_no_auth_header_without_token() {
        let server = MockServer::start().await;
        let (client, _store) = client_for(&server);

        Mock::given(method("GET"))
            .and(path("/api/v1/items/popular"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;
        Mock::given(header_exists("Authorization"))
            .respond_with(ResponseTemplate::new(500))
            .with_priority(1)
            .mount(&server)
            .await;

        let items: Vec<serde_json::Value> = client
            .get_with_query("/api/v1/items/popular", &[("limit", "10")])
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_status_error_carries_backend_message() {
        let server = MockServer::start().await;
        let (client, _store) = client_for(&server);

        Mock::given(method("POST"))
            .and(path("/api/v1/customer/cart/add"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(serde_json::json!({"errors": [{"code": "stock", "message": "Out of stock"}]})),
            )
            .mount(&server)
            .await;

        let err = client
            .post_unit("api/v1/customer/cart/add", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(403));
        assert_eq!(err.user_message(), "Out of stock");
    }

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl SessionListener for Counter {
        fn on_signal(&self, signal: SessionSignal) {
            if signal == SessionSignal::Unauthorized {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[tokio::test]
    async fn test_unauthorized_emits_signal() {
        let server = MockServer::start().await;
        let (client, _store) = client_for(&server);
        let counter = Arc::new(Counter::default());
        let weak: Weak<dyn SessionListener> = Arc::downgrade(&counter) as Weak<dyn SessionListener>;
        client.signals().register(weak);

        Mock::given(method("GET"))
            .and(path("/api/v1/customer/info"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(serde_json::json!({"message": "Unauthenticated."})),
            )
            .mount(&server)
            .await;

        let err = client
            .get::<serde_json::Value>("api/v1/customer/info")
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.user_message(), "Unauthenticated.");
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    }
}
