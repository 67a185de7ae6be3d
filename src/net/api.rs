//! REST client for the blog backend.
//!
//! ERROR HANDLING
//! ==============
//! Every call reduces to `Result<_, ApiError>`. The error variants keep auth
//! failures, user-correctable rejections, server faults and transport faults
//! apart so the synchronizer can force a logout on 401/403 and surface the
//! rest without guessing from strings.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::{Credentials, Id, Post, PostDraft, PostPatch, Session};
use crate::config::{ClientConfig, HttpTimeouts};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by backend calls.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The backend refused the bearer credential.
    #[error("not authorized (status {status})")]
    Unauthorized { status: u16 },

    /// The backend rejected the request body or target.
    #[error("request rejected (status {status}): {message}")]
    Rejected { status: u16, message: String },

    /// The backend failed while handling the request.
    #[error("server error (status {status})")]
    Server { status: u16, body: String },

    /// The response body did not match the expected schema.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// Classify a non-2xx response.
    #[must_use]
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::Unauthorized { status },
            400..=499 => Self::Rejected { status, message: rejection_message(&body) },
            _ => Self::Server { status, body },
        }
    }

    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "E_TRANSPORT",
            Self::Unauthorized { .. } => "E_UNAUTHORIZED",
            Self::Rejected { .. } => "E_REJECTED",
            Self::Server { .. } => "E_SERVER",
            Self::Malformed(_) => "E_MALFORMED",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    /// Whether repeating the same call could succeed. Informational only;
    /// nothing in this crate retries.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Server { .. } | Self::Rejected { status: 408 | 429, .. })
    }

    /// Whether the session should be dropped in response.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// Pull a human-readable message out of an error body.
///
/// Express-style backends answer `{"error": "..."}`; anything else is shown
/// as-is, trimmed.
fn rejection_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "message"] {
            if let Some(text) = value.get(key).and_then(serde_json::Value::as_str) {
                return text.to_owned();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() { "no details".to_owned() } else { trimmed.to_owned() }
}

// =============================================================================
// ENDPOINTS
// =============================================================================

// Endpoints are path segments; ids are percent-encoded when appended, so
// an id can never reach a different resource.

const LOGIN_ENDPOINT: [&str; 3] = ["api", "users", "login"];
const POSTS_ENDPOINT: [&str; 2] = ["api", "posts"];

fn post_endpoint(id: &Id) -> [&str; 3] {
    ["api", "posts", id.as_str()]
}

fn comment_endpoint<'a>(post_id: &'a Id, comment_id: &'a Id) -> [&'a str; 5] {
    ["api", "posts", post_id.as_str(), "comments", comment_id.as_str()]
}

// =============================================================================
// BACKEND TRAIT
// =============================================================================

/// Blog backend seam. Enables mocking in tests.
#[async_trait::async_trait]
pub trait BlogBackend: Send + Sync {
    /// Exchange credentials for a session.
    async fn login(&self, credentials: &Credentials) -> Result<Session, ApiError>;

    /// Fetch every post. No credential is sent.
    async fn fetch_posts(&self) -> Result<Vec<Post>, ApiError>;

    async fn create_post(&self, session: &Session, draft: &PostDraft) -> Result<Post, ApiError>;

    /// Used both for full edits and for flipping the hidden flag.
    async fn update_post(&self, session: &Session, id: &Id, patch: &PostPatch) -> Result<Post, ApiError>;

    /// The response body is ignored.
    async fn delete_post(&self, session: &Session, id: &Id) -> Result<(), ApiError>;

    /// Returns the parent post without the removed comment.
    async fn delete_comment(&self, session: &Session, post_id: &Id, comment_id: &Id) -> Result<Post, ApiError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub struct HttpBackend {
    http: reqwest::Client,
    base_url: reqwest::Url,
}

impl HttpBackend {
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if `base_url` is not a usable
    /// http(s) base or the TLS backend fails to initialize.
    pub fn new(base_url: &str, timeouts: HttpTimeouts) -> Result<Self, ApiError> {
        let base_url = reqwest::Url::parse(base_url)
            .map_err(|e| ApiError::HttpClientBuild(format!("invalid base URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::HttpClientBuild(format!("'{base_url}' cannot be a base URL")));
        }
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeouts.request() {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = timeouts.connect() {
            builder = builder.connect_timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    /// # Errors
    ///
    /// See [`HttpBackend::new`].
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::new(&config.api_url, config.timeouts)
    }

    fn url(&self, segments: &[&str]) -> reqwest::Url {
        let mut url = self.base_url.clone();
        // `new` rejected cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16(), text));
        }
        Ok(text)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let text = self.send(request).await?;
        parse_body(&text)
    }

    fn authed(&self, method: reqwest::Method, path: &[&str], session: &Session) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header(reqwest::header::AUTHORIZATION, session.bearer())
    }

    fn authed_json<B: Serialize + ?Sized>(
        &self,
        method: reqwest::Method,
        path: &[&str],
        session: &Session,
        body: &B,
    ) -> reqwest::RequestBuilder {
        self.authed(method, path, session).json(body)
    }
}

fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Malformed(e.to_string()))
}

#[async_trait::async_trait]
impl BlogBackend for HttpBackend {
    async fn login(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        let request = self.http.post(self.url(&LOGIN_ENDPOINT)).json(credentials);
        let session: Session = self.send_json(request).await?;
        if !session.is_well_formed() {
            return Err(ApiError::Malformed("login response carried no token".to_owned()));
        }
        Ok(session)
    }

    async fn fetch_posts(&self) -> Result<Vec<Post>, ApiError> {
        self.send_json(self.http.get(self.url(&POSTS_ENDPOINT))).await
    }

    async fn create_post(&self, session: &Session, draft: &PostDraft) -> Result<Post, ApiError> {
        let request = self.authed_json(reqwest::Method::POST, &POSTS_ENDPOINT, session, draft);
        self.send_json(request).await
    }

    async fn update_post(&self, session: &Session, id: &Id, patch: &PostPatch) -> Result<Post, ApiError> {
        let request = self.authed_json(reqwest::Method::PUT, &post_endpoint(id), session, patch);
        self.send_json(request).await
    }

    async fn delete_post(&self, session: &Session, id: &Id) -> Result<(), ApiError> {
        let request = self.authed(reqwest::Method::DELETE, &post_endpoint(id), session);
        self.send(request).await.map(|_| ())
    }

    async fn delete_comment(&self, session: &Session, post_id: &Id, comment_id: &Id) -> Result<Post, ApiError> {
        let request = self.authed(reqwest::Method::DELETE, &comment_endpoint(post_id, comment_id), session);
        self.send_json(request).await
    }
}
