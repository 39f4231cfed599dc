//! Aggregation service client
//!
//! [`AggregationService`] is the whole contract the console needs from the
//! service side: operator registration, the session lifecycle calls and the
//! read-only projections. [`HttpAggregationClient`] speaks it over the JSON
//! envelope API; tests substitute in-process fakes.

use async_trait::async_trait;
use opcon_common::api::types::{
    Ack, AddMediaRequest, AddMediaResponse, EndSessionRequest, HistoryResponse, LeaderboardResponse,
    MediaListResponse, RecordEventRequest, RegisterOperatorRequest, SeedResponse,
    StartSessionRequest, StartSessionResponse, StatsResponse,
};
use opcon_common::api::{open_envelope, EnvelopeError, GENERIC_API_ERROR};
use opcon_common::events::EventRecord;
use opcon_common::models::{
    HistoryEntry, LeaderboardRow, MediaItem, MediaKind, Operator, SessionId, StatsSnapshot,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("opcon-console/", env!("CARGO_PKG_VERSION"));

/// Operations the console performs against the aggregation service
#[async_trait]
pub trait AggregationService: Send + Sync {
    /// `Validation` when name or DNI is empty
    async fn register_operator(&self, name: &str, dni: &str) -> Result<Operator>;

    async fn start_session(&self, operator_id: i64, media_item_id: i64) -> Result<SessionId>;

    /// Telemetry; callers ignore failures
    async fn record_event(&self, session_id: SessionId, record: &EventRecord) -> Result<()>;

    async fn end_session(&self, session_id: SessionId, last_position: f64, completed: bool) -> Result<()>;

    async fn fetch_stats(&self) -> Result<StatsSnapshot>;

    /// Rows in the service's ranking order
    async fn fetch_leaderboard(&self) -> Result<Vec<LeaderboardRow>>;

    async fn fetch_history(&self, operator_id: i64, limit: i64) -> Result<Vec<HistoryEntry>>;

    async fn fetch_media(&self, kind: Option<MediaKind>) -> Result<Vec<MediaItem>>;

    /// Add a catalog entry; returns the new media id
    async fn add_media(
        &self,
        title: &str,
        kind: MediaKind,
        source_url: &str,
        duration_seconds: i64,
        genre: Option<&str>,
    ) -> Result<i64>;

    /// Ask the service to generate demo data; returns its message
    async fn seed_demo(&self) -> Result<String>;
}

/// Map a failure envelope to the console taxonomy by HTTP status
fn classify(status: StatusCode, message: String) -> Error {
    match status.as_u16() {
        400 => Error::Validation(message),
        404 => Error::NotFound(message),
        _ => Error::Service(message),
    }
}

/// HTTP implementation of [`AggregationService`]
pub struct HttpAggregationClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpAggregationClient {
    /// Create a client for the service at `base_url` (e.g. `http://127.0.0.1:5070`)
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        Self::decode(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        debug!(url = %url, "POST");
        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        Self::decode(response).await
    }

    /// Open the response envelope, classifying failures by status
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let body: Value = match serde_json::from_slice(&bytes) {
            Ok(body) => body,
            Err(e) if status.is_success() => {
                return Err(Error::Network(format!("Unreadable response: {}", e)));
            }
            Err(_) => return Err(classify(status, format!("HTTP {}", status))),
        };

        let message = match open_envelope::<T>(body) {
            Ok(value) if status.is_success() => return Ok(value),
            Ok(_) => GENERIC_API_ERROR.to_string(),
            Err(EnvelopeError::Failure(message)) => message,
            Err(EnvelopeError::Malformed(e)) if status.is_success() => {
                return Err(Error::Network(format!("Malformed response: {}", e)));
            }
            Err(EnvelopeError::Malformed(_)) => GENERIC_API_ERROR.to_string(),
        };
        Err(classify(status, message))
    }
}

#[async_trait]
impl AggregationService for HttpAggregationClient {
    async fn register_operator(&self, name: &str, dni: &str) -> Result<Operator> {
        let request = RegisterOperatorRequest {
            name: name.to_string(),
            dni: dni.to_string(),
        };
        self.post("/api/operators/register", &request).await
    }

    async fn start_session(&self, operator_id: i64, media_item_id: i64) -> Result<SessionId> {
        let request = StartSessionRequest::new(operator_id, media_item_id);
        let response: StartSessionResponse = self.post("/api/sessions/start", &request).await?;
        Ok(response.session_id)
    }

    async fn record_event(&self, session_id: SessionId, record: &EventRecord) -> Result<()> {
        let request = RecordEventRequest::new(session_id, record);
        let _: Ack = self.post("/api/sessions/event", &request).await?;
        Ok(())
    }

    async fn end_session(&self, session_id: SessionId, last_position: f64, completed: bool) -> Result<()> {
        let request = EndSessionRequest::new(session_id, last_position, completed);
        let _: Ack = self.post("/api/sessions/end", &request).await?;
        Ok(())
    }

    async fn fetch_stats(&self) -> Result<StatsSnapshot> {
        let response: StatsResponse = self.get("/api/stats").await?;
        Ok(response.stats)
    }

    async fn fetch_leaderboard(&self) -> Result<Vec<LeaderboardRow>> {
        let response: LeaderboardResponse = self.get("/api/leaderboard").await?;
        Ok(response.leaders)
    }

    async fn fetch_history(&self, operator_id: i64, limit: i64) -> Result<Vec<HistoryEntry>> {
        let path = format!("/api/operators/{}/history?limit={}", operator_id, limit);
        let response: HistoryResponse = self.get(&path).await?;
        Ok(response.sessions)
    }

    async fn fetch_media(&self, kind: Option<MediaKind>) -> Result<Vec<MediaItem>> {
        let path = match kind {
            Some(kind) => format!("/api/media?kind={}", kind.as_str()),
            None => "/api/media".to_string(),
        };
        let response: MediaListResponse = self.get(&path).await?;
        Ok(response.items)
    }

    async fn add_media(
        &self,
        title: &str,
        kind: MediaKind,
        source_url: &str,
        duration_seconds: i64,
        genre: Option<&str>,
    ) -> Result<i64> {
        let request = AddMediaRequest {
            title: title.to_string(),
            kind: kind.as_str().to_string(),
            source_url: source_url.to_string(),
            duration_seconds: Some(duration_seconds),
            genre: genre.map(str::to_string),
        };
        let response: AddMediaResponse = self.post("/api/media", &request).await?;
        Ok(response.media_id)
    }

    async fn seed_demo(&self) -> Result<String> {
        let response: SeedResponse = self.post("/api/seed", &serde_json::json!({})).await?;
        Ok(response.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpAggregationClient::new("http://127.0.0.1:5070/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:5070");
        assert_eq!(client.url("/api/stats"), "http://127.0.0.1:5070/api/stats");
    }

    #[test]
    fn test_classify_by_status() {
        assert!(matches!(classify(StatusCode::BAD_REQUEST, "x".into()), Error::Validation(_)));
        assert!(matches!(classify(StatusCode::NOT_FOUND, "x".into()), Error::NotFound(_)));
        assert!(matches!(classify(StatusCode::CONFLICT, "x".into()), Error::Service(_)));
        assert!(matches!(
            classify(StatusCode::INTERNAL_SERVER_ERROR, "x".into()),
            Error::Service(_)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_network_error() {
        // Port 9 (discard) is essentially never served on loopback
        let client = HttpAggregationClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let err = client.fetch_stats().await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }
}
