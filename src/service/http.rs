//! HTTP binding of the boat data service
//!
//! | Operation          | Request                                              |
//! |--------------------|------------------------------------------------------|
//! | `list_boat_types`  | `GET  {base}/boat-types`                             |
//! | `search_boats`     | `GET  {base}/boats?boatTypeId=`                      |
//! | `search_boats_near`| `GET  {base}/boats/near?latitude=&longitude=&boatTypeId=` |
//! | `update_boats`     | `PATCH {base}/boats` with `{"data": [...]}`          |
//!
//! The near-me endpoint returns the serialized array as its body; it is handed
//! back verbatim.

use super::BoatDataService;
use crate::error::ServiceError;
use crate::model::{BoatRecord, BoatType, RowEditBatch};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Data service reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpBoatService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBoatService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(4)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ServiceError> {
        let response = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(transport)?;
        let response = ensure_success(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

fn transport(err: reqwest::Error) -> ServiceError {
    ServiceError::Transport(err.to_string())
}

/// Turn a non-2xx response into `ServiceError::Rejected`
async fn ensure_success(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ServiceError::Rejected(error_message(status, &body)))
}

/// User-facing message of an error response
///
/// Prefers `{"message": ...}`, then `{"body": {"message": ...}}`, then the raw
/// body, then the status line.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let message = value
            .get("message")
            .or_else(|| value.get("body").and_then(|b| b.get("message")))
            .and_then(|m| m.as_str());
        if let Some(message) = message {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {status}")
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl BoatDataService for HttpBoatService {
    async fn list_boat_types(&self) -> Result<Vec<BoatType>, ServiceError> {
        debug!("GET boat-types");
        self.get_json("boat-types", &[]).await
    }

    async fn search_boats(&self, boat_type_id: &str) -> Result<Vec<BoatRecord>, ServiceError> {
        debug!(boat_type_id, "GET boats");
        self.get_json("boats", &[("boatTypeId", boat_type_id.to_string())])
            .await
    }

    async fn search_boats_near(
        &self,
        latitude: f64,
        longitude: f64,
        boat_type_id: &str,
    ) -> Result<String, ServiceError> {
        debug!(latitude, longitude, boat_type_id, "GET boats/near");
        let response = self
            .client
            .get(self.url("boats/near"))
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("boatTypeId", boat_type_id.to_string()),
            ])
            .send()
            .await
            .map_err(transport)?;
        let response = ensure_success(response).await?;
        response
            .text()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }

    async fn update_boats(&self, batch: &RowEditBatch) -> Result<(), ServiceError> {
        debug!(rows = batch.len(), "PATCH boats");
        let response = self
            .client
            .patch(self.url("boats"))
            .json(batch)
            .send()
            .await
            .map_err(transport)?;
        ensure_success(response).await.map(|_| ())
    }
}
