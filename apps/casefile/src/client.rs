//! # Record API Client
//!
//! HTTP fetch layer for the two Casefile views.
//!
//! ## Endpoints
//!
//! - `GET /evidence?page=&page_size=` → `{ items, total_count, total_pages }`
//! - `GET /search?q=` → `[ { id, entity_type, name, subtitle } ]`
//!   (a `{ "results": [...] }` envelope is accepted too)

use crate::config::Config;
use casefile_core::{CasefileError, EvidencePageResponse, FetchError, PageRequest, RawSearchHit};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// FETCH LAYER SEAM
// =============================================================================

/// The fetch layer the view driver depends on.
pub trait RecordSource {
    /// Load one page of the evidence register.
    fn fetch_evidence_page(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = Result<EvidencePageResponse, FetchError>> + Send;

    /// Run an entity search.
    fn fetch_entity_search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<RawSearchHit>, FetchError>> + Send;
}

// =============================================================================
// CLIENT ERRORS
// =============================================================================

/// Errors from the HTTP client layer.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Cannot reach the record API.
    #[error("Cannot connect to record API at {0}")]
    ConnectionFailed(String),
    /// 401 Unauthorized - invalid or missing API key.
    #[error("Unauthorized: invalid or missing API key")]
    Unauthorized,
    /// 429 Too Many Requests.
    #[error("Rate limited: too many requests")]
    RateLimited,
    /// Any other non-success status.
    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),
    /// Failed to parse response body.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<ClientError> for FetchError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::ConnectionFailed(target) => Self::Unreachable(target),
            ClientError::Unauthorized => Self::Unauthorized,
            ClientError::RateLimited => Self::Status {
                status: 429,
                message: "rate limited".to_string(),
            },
            ClientError::ServerError(status, message) => Self::Status { status, message },
            ClientError::ParseError(msg) => Self::Malformed(msg),
        }
    }
}

/// Search bodies come bare or wrapped in a `results` envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum SearchBody {
    Bare(Vec<RawSearchHit>),
    Envelope { results: Vec<RawSearchHit> },
}

impl SearchBody {
    fn into_hits(self) -> Vec<RawSearchHit> {
        match self {
            Self::Bare(hits) | Self::Envelope { results: hits } => hits,
        }
    }
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

/// HTTP client that wraps calls to the record API.
#[derive(Debug, Clone)]
pub struct RecordClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl RecordClient {
    /// Create a client from a validated configuration.
    pub fn new(config: &Config) -> Result<Self, CasefileError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| CasefileError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a GET request with optional Bearer auth.
    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.get(&url);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    /// Send a request and handle connection errors.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, ClientError> {
        req.send()
            .await
            .map_err(|e| ClientError::ConnectionFailed(format!("{}: {e}", self.base_url)))
    }

    /// Check status codes and decode the JSON body.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::RateLimited);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::ServerError(status.as_u16(), body));
        }
        resp.json::<T>()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))
    }

    /// GET /evidence
    pub async fn evidence_page(
        &self,
        request: PageRequest,
    ) -> Result<EvidencePageResponse, ClientError> {
        let req = self.get("/evidence").query(&[
            ("page", request.page),
            ("page_size", request.page_size),
        ]);
        let resp = self.send(req).await?;
        self.handle_response(resp).await
    }

    /// GET /search
    pub async fn entity_search(&self, query: &str) -> Result<Vec<RawSearchHit>, ClientError> {
        let req = self.get("/search").query(&[("q", query)]);
        let resp = self.send(req).await?;
        let body: SearchBody = self.handle_response(resp).await?;
        Ok(body.into_hits())
    }
}

impl RecordSource for RecordClient {
    async fn fetch_evidence_page(
        &self,
        request: PageRequest,
    ) -> Result<EvidencePageResponse, FetchError> {
        tracing::debug!(page = request.page, page_size = request.page_size, "Fetching evidence page");
        self.evidence_page(request).await.map_err(FetchError::from)
    }

    async fn fetch_entity_search(&self, query: &str) -> Result<Vec<RawSearchHit>, FetchError> {
        tracing::debug!(query, "Fetching entity search");
        self.entity_search(query).await.map_err(FetchError::from)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn client_error_maps_to_fetch_error() {
        assert_eq!(
            FetchError::from(ClientError::Unauthorized),
            FetchError::Unauthorized
        );
        assert_eq!(
            FetchError::from(ClientError::ServerError(502, "bad gateway".into())),
            FetchError::Status {
                status: 502,
                message: "bad gateway".into()
            }
        );
        assert!(matches!(
            FetchError::from(ClientError::RateLimited),
            FetchError::Status { status: 429, .. }
        ));
    }

    #[test]
    fn search_body_accepts_both_shapes() {
        let bare: SearchBody =
            serde_json::from_str(r#"[{"id": 1, "entity_type": "person", "name": "A"}]"#)
                .unwrap();
        assert_eq!(bare.into_hits().len(), 1);

        let wrapped: SearchBody = serde_json::from_str(
            r#"{"results": [{"id": "x", "entityType": "event", "name": "B", "subtitle": "2021"}]}"#,
        )
        .unwrap();
        let hits = wrapped.into_hits();
        assert_eq!(hits[0].type_tag(), "event");
        assert_eq!(hits[0].subtitle.as_deref(), Some("2021"));
    }

    #[test]
    fn untyped_hits_do_not_fail_the_body() {
        let body: SearchBody = serde_json::from_str(
            r#"[
                {"id": 1, "name": "no type"},
                {"id": 2, "entity_type": null, "name": "null type"},
                {"id": 3, "entity_type": "person", "name": "Jane"}
            ]"#,
        )
        .unwrap();
        let hits = body.into_hits();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].entity_type, None);
        assert_eq!(hits[1].entity_type, None);
        assert_eq!(hits[2].type_tag(), "person");
    }
}
