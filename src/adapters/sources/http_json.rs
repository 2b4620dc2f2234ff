//! JSON-over-HTTP Match Source
//!
//! Fetches a JSON array of records with a single GET per cycle. Every
//! array element is decoded on its own: an element of the wrong shape
//! becomes an empty raw record, which the ingest step then drops and
//! logs. Transport or top-level decoding failures mark the whole source
//! unavailable for the cycle. No retries.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::ports::match_source::{OddsSource, RawOddsRecord, RawStatsRecord, StatsSource};

/// One HTTP endpoint serving a JSON array of match records.
pub struct HttpJsonSource {
    /// Underlying HTTP client.
    http: Client,
    /// Source name for logs.
    name: String,
    /// Endpoint URL.
    url: String,
}

impl HttpJsonSource {
    /// Create a source with a per-request timeout.
    pub fn new(name: impl Into<String>, url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            name: name.into(),
            url: url.into(),
        })
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    #[instrument(skip(self), fields(source = %self.name, url = %self.url))]
    async fn fetch_records<T: DeserializeOwned + Default>(&self) -> Result<Vec<T>> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", self.url))?
            .error_for_status()
            .with_context(|| format!("GET {} returned an error status", self.url))?;

        let body: Value = response
            .json()
            .await
            .with_context(|| format!("Response from {} is not JSON", self.url))?;

        let records = decode_batch(body)?;
        debug!(records = records.len(), "Batch fetched");
        Ok(records)
    }
}

/// Decode a top-level JSON array element by element.
pub fn decode_batch<T: DeserializeOwned + Default>(body: Value) -> Result<Vec<T>> {
    let Value::Array(items) = body else {
        anyhow::bail!("expected a JSON array of records");
    };
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

#[async_trait]
impl OddsSource for HttpJsonSource {
    async fn fetch_odds(&self) -> Result<Vec<RawOddsRecord>> {
        self.fetch_records().await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl StatsSource for HttpJsonSource {
    async fn fetch_stats(&self) -> Result<Vec<RawStatsRecord>> {
        self.fetch_records().await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;
    use serde_json::json;

    async fn spawn_server(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_decode_batch_tolerates_bad_elements() {
        let body = json!([
            {"home": "A", "away": "B", "home_shots": 10, "away_shots": 3},
            42,
            {"home": 7, "away": "C"}
        ]);
        let records: Vec<RawStatsRecord> = decode_batch(body).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].home.as_deref(), Some("A"));
        assert_eq!(records[1], RawStatsRecord::default());
        assert_eq!(records[2], RawStatsRecord::default());
    }

    #[test]
    fn test_decode_batch_rejects_non_array() {
        let result: Result<Vec<RawOddsRecord>> = decode_batch(json!({"matches": []}));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fetch_odds_over_http() {
        let app = Router::new().route(
            "/odds",
            get(|| async {
                axum::Json(json!([{"home": "A", "away": "B", "1": 1.8, "X": 3.5, "2": "4.2"}]))
            }),
        );
        let base = spawn_server(app).await;
        let source = HttpJsonSource::new("odds", format!("{base}/odds"), Duration::from_secs(5)).unwrap();

        let batch = source.fetch_odds().await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].away_odds, Some(json!("4.2")));
        assert_eq!(OddsSource::name(&source), "odds");
    }

    #[tokio::test]
    async fn test_error_status_is_unavailable() {
        let app = Router::new().route(
            "/stats",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        );
        let base = spawn_server(app).await;
        let source = HttpJsonSource::new("stats", format!("{base}/stats"), Duration::from_secs(5)).unwrap();

        assert!(source.fetch_stats().await.is_err());
    }
}
