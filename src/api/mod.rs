//! Dashboard backend API client
//!
//! This module provides HTTP client functionality for the agricultural
//! extension backend: historical weather, alerts, farmers, locations, and
//! broadcast messaging. Transient failures are retried with exponential
//! backoff; list responses go through the envelope normalizer because the
//! backend's list shapes are not contractually fixed.

pub mod envelope;

use crate::config::AgroClimConfig;
use crate::models::{
    Alert, BroadcastMessage, Farmer, HistoricalRecord, Location, MessageReceipt, NewAlert,
    NewFarmer,
};
use crate::{AgroClimError, ErrorCode, cache};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

pub use envelope::{ListPage, Pagination, parse_list_page};

/// Query parameters for the historical weather endpoint.
#[derive(Debug, Clone)]
pub struct HistoricalQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub limit: u32,
    pub sort_by: String,
    pub sort_order: String,
}

impl HistoricalQuery {
    /// Date-range query with the backend's default sort (oldest first).
    #[must_use]
    pub fn for_range(start_date: NaiveDate, end_date: NaiveDate, limit: u32) -> Self {
        Self {
            start_date,
            end_date,
            limit,
            sort_by: "date".to_string(),
            sort_order: "asc".to_string(),
        }
    }

    fn to_query_string(&self) -> String {
        format!(
            "startDate={}&endDate={}&limit={}&sortBy={}&sortOrder={}",
            self.start_date,
            self.end_date,
            self.limit,
            urlencoding::encode(&self.sort_by),
            urlencoding::encode(&self.sort_order),
        )
    }
}

/// Source of historical weather records.
///
/// The dashboard's views depend on this trait rather than the concrete
/// client so they can be exercised against fixture data in tests.
#[async_trait]
pub trait WeatherHistoryProvider {
    async fn historical_weather(
        &self,
        location_id: &str,
        query: &HistoricalQuery,
    ) -> Result<Vec<HistoricalRecord>>;
}

/// HTTP client for the dashboard backend.
pub struct BackendClient {
    client: ClientWithMiddleware,
    base_url: String,
    access_token: Option<String>,
}

impl BackendClient {
    /// Create a new backend client from application config.
    pub fn new(config: &AgroClimConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.backend.timeout_seconds.into());

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("agroclim/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(config.backend.max_retries);
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: config.backend.base_url.trim_end_matches('/').to_string(),
            access_token: config.backend.access_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(
        &self,
        request: reqwest_middleware::RequestBuilder,
    ) -> reqwest_middleware::RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// GET a JSON body, mapping failures to friendly API errors.
    #[instrument(skip(self))]
    async fn get_json(&self, path: &str) -> Result<Value> {
        let start_time = Instant::now();
        let url = self.url(path);
        debug!("GET {}", url);

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| network_error(&url, &e.to_string()))?;

        let response = check_status(response, &url).await?;

        let body: Value = response.json().await.map_err(|e| {
            AgroClimError::api_with_context(
                format!("Invalid JSON from backend: {e}"),
                ErrorCode::ApiInvalidResponse,
                HashMap::from([("url".to_string(), url.clone())]),
            )
        })?;

        let total_duration = start_time.elapsed();
        info!("GET {} completed in {:.3}s", path, total_duration.as_secs_f64());
        if total_duration.as_secs() > 5 {
            warn!("Slow backend response: {:.3}s", total_duration.as_secs_f64());
        }

        Ok(body)
    }

    /// POST a JSON payload; 2xx with optional `{message}` is success.
    #[instrument(skip(self, payload))]
    async fn post_json<P: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &P,
    ) -> Result<MessageReceipt> {
        let url = self.url(path);
        debug!("POST {}", url);

        let response = self
            .authorize(self.client.post(&url))
            .json(payload)
            .send()
            .await
            .map_err(|e| network_error(&url, &e.to_string()))?;

        let response = check_status(response, &url).await?;
        Ok(response.json().await.unwrap_or_default())
    }

    /// DELETE a resource; 2xx with optional `{message}` is success.
    #[instrument(skip(self))]
    async fn delete(&self, path: &str) -> Result<MessageReceipt> {
        let url = self.url(path);
        debug!("DELETE {}", url);

        let response = self
            .authorize(self.client.delete(&url))
            .send()
            .await
            .map_err(|e| network_error(&url, &e.to_string()))?;

        let response = check_status(response, &url).await?;
        Ok(response.json().await.unwrap_or_default())
    }

    /// Fetch daily historical weather records for a location.
    ///
    /// Served from the response cache when a fresh entry exists for the
    /// exact (location, range) key; historical days do not change.
    #[instrument(skip(self, query), fields(location = location_id))]
    pub async fn historical_weather(
        &self,
        location_id: &str,
        query: &HistoricalQuery,
    ) -> Result<Vec<HistoricalRecord>> {
        if location_id.is_empty() {
            return Err(AgroClimError::validation("Location id cannot be empty").into());
        }

        let cache_key = cache::history_key(
            location_id,
            &query.start_date.to_string(),
            &query.end_date.to_string(),
        );

        if cache::is_initialized() {
            if let Some(cached) = cache::get::<Vec<HistoricalRecord>>(&cache_key).await? {
                info!("Historical weather served from cache");
                return Ok(cached);
            }
        }

        let path = format!(
            "weather/historical/location/{}?{}",
            urlencoding::encode(location_id),
            query.to_query_string()
        );
        let body = self.get_json(&path).await?;
        let page: ListPage<HistoricalRecord> = parse_list_page(&body, "records");
        info!("Fetched {} historical records", page.records.len());

        if cache::is_initialized() && !page.records.is_empty() {
            if let Err(e) = cache::put(&cache_key, page.records.clone()).await {
                warn!("Failed to cache historical records: {}", e);
            }
        }

        Ok(page.records)
    }

    /// List active weather alerts.
    pub async fn alerts(&self) -> Result<ListPage<Alert>> {
        let body = self.get_json("weather/alerts").await?;
        Ok(parse_list_page(&body, "alerts"))
    }

    /// Create a weather alert for broadcast.
    pub async fn create_alert(&self, alert: &NewAlert) -> Result<MessageReceipt> {
        if alert.title.is_empty() {
            return Err(AgroClimError::validation("Alert title cannot be empty").into());
        }
        self.post_json("weather/alerts", alert).await
    }

    /// Delete an alert by id.
    pub async fn delete_alert(&self, alert_id: &str) -> Result<MessageReceipt> {
        if alert_id.is_empty() {
            return Err(AgroClimError::validation("Alert id cannot be empty").into());
        }
        self.delete(&format!("weather/alerts/{}", urlencoding::encode(alert_id)))
            .await
    }

    /// List registered farmers with pagination.
    pub async fn farmers(&self, page: u32, limit: u32) -> Result<ListPage<Farmer>> {
        let body = self
            .get_json(&format!("admin/farmers?page={page}&limit={limit}"))
            .await?;
        Ok(parse_list_page(&body, "farmers"))
    }

    /// Register a new farmer.
    pub async fn register_farmer(&self, farmer: &NewFarmer) -> Result<MessageReceipt> {
        if farmer.name.is_empty() {
            return Err(AgroClimError::validation("Farmer name cannot be empty").into());
        }
        self.post_json("admin/farmers", farmer).await
    }

    /// List all locations the dashboard can report on.
    pub async fn locations(&self) -> Result<Vec<Location>> {
        let body = self.get_json("users/locations/all").await?;
        let page: ListPage<Location> = parse_list_page(&body, "locations");
        Ok(page.records)
    }

    /// List locations through the admin endpoint. Same shape as
    /// [`Self::locations`] but includes locations not yet published to users.
    pub async fn admin_locations(&self) -> Result<Vec<Location>> {
        let body = self.get_json("admin/locations").await?;
        let page: ListPage<Location> = parse_list_page(&body, "locations");
        Ok(page.records)
    }

    /// Send an SMS-style broadcast message.
    pub async fn broadcast(&self, message: &BroadcastMessage) -> Result<MessageReceipt> {
        if message.body.is_empty() {
            return Err(AgroClimError::validation("Message body cannot be empty").into());
        }
        self.post_json("messages/broadcast", message).await
    }
}

#[async_trait]
impl WeatherHistoryProvider for BackendClient {
    async fn historical_weather(
        &self,
        location_id: &str,
        query: &HistoricalQuery,
    ) -> Result<Vec<HistoricalRecord>> {
        BackendClient::historical_weather(self, location_id, query).await
    }
}

fn network_error(url: &str, detail: &str) -> AgroClimError {
    AgroClimError::api_with_context(
        format!("Request to backend failed: {detail}"),
        ErrorCode::ApiNetworkError,
        HashMap::from([("url".to_string(), url.to_string())]),
    )
}

/// Map non-2xx statuses to friendly API errors, extracting the backend's
/// own error message (`{message}` or `{error}`) when it sends one.
async fn check_status(
    response: reqwest::Response,
    url: &str,
) -> std::result::Result<reqwest::Response, AgroClimError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let code = match status.as_u16() {
        401 | 403 => ErrorCode::ApiUnauthorized,
        404 => ErrorCode::ApiNotFound,
        429 => ErrorCode::ApiRateLimit,
        _ => ErrorCode::ApiNetworkError,
    };

    // Best-effort message extraction from the error body.
    let fallback = format!(
        "HTTP {} - {}",
        status,
        status.canonical_reason().unwrap_or("Unknown error")
    );
    let message = match response.json::<Value>().await {
        Ok(body) => extract_error_message(&body).unwrap_or(fallback),
        Err(_) => fallback,
    };

    warn!("Backend request to {} failed: {}", url, message);
    Err(AgroClimError::api_with_context(
        message,
        code,
        HashMap::from([
            ("url".to_string(), url.to_string()),
            ("status".to_string(), status.as_u16().to_string()),
        ]),
    ))
}

fn extract_error_message(body: &Value) -> Option<String> {
    body.get("message")
        .or_else(|| body.get("error"))
        .or_else(|| body.get("data").and_then(|d| d.get("message")))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_historical_query_string() {
        let query = HistoricalQuery::for_range(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            365,
        );
        assert_eq!(
            query.to_query_string(),
            "startDate=2024-01-01&endDate=2024-12-31&limit=365&sortBy=date&sortOrder=asc"
        );
    }

    #[test]
    fn test_extract_error_message_variants() {
        let top = serde_json::json!({"message": "bad request"});
        assert_eq!(extract_error_message(&top).as_deref(), Some("bad request"));

        let error_key = serde_json::json!({"error": "boom"});
        assert_eq!(extract_error_message(&error_key).as_deref(), Some("boom"));

        let nested = serde_json::json!({"data": {"message": "nested"}});
        assert_eq!(extract_error_message(&nested).as_deref(), Some("nested"));

        let none = serde_json::json!({"status": 500});
        assert!(extract_error_message(&none).is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let mut config = AgroClimConfig::default();
        config.backend.base_url = "http://localhost:5000/api/".to_string();
        let client = BackendClient::new(&config).unwrap();
        assert_eq!(
            client.url("weather/alerts"),
            "http://localhost:5000/api/weather/alerts"
        );
    }
}
