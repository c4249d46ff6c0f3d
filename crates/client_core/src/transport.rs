//! HTTP access to the exhibitor backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    Client,
};
use serde_json::Value;
use shared::{domain::ExhibitorRecord, protocol::decode_exhibitor_list};
use tracing::{debug, warn};
use url::Url;

use crate::error::FetchError;

#[async_trait]
pub trait ExhibitorTransport: Send + Sync {
    /// `GET url` and decode the body as a list of exhibitors.
    async fn get_exhibitors(
        &self,
        url: &Url,
        timeout: Duration,
    ) -> Result<Vec<ExhibitorRecord>, FetchError>;

    /// `GET url` and report the status code of a successful response.
    async fn probe(&self, url: &Url, timeout: Duration) -> Result<u16, FetchError>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }

    async fn get_json(&self, url: &Url, timeout: Duration) -> Result<reqwest::Response, FetchError> {
        let response = self
            .http
            .get(url.clone())
            .timeout(timeout)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        debug!(%url, status = status.as_u16(), "exhibitor endpoint responded");
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl ExhibitorTransport for HttpTransport {
    async fn get_exhibitors(
        &self,
        url: &Url,
        timeout: Duration,
    ) -> Result<Vec<ExhibitorRecord>, FetchError> {
        let body: Value = self
            .get_json(url, timeout)
            .await?
            .json()
            .await
            .map_err(FetchError::from_reqwest)?;

        let decoded = decode_exhibitor_list(body)?;
        for rejected in &decoded.rejected {
            warn!(%url, error = %rejected, "dropping undecodable exhibitor");
        }
        Ok(decoded.records)
    }

    async fn probe(&self, url: &Url, timeout: Duration) -> Result<u16, FetchError> {
        let response = self.get_json(url, timeout).await?;
        Ok(response.status().as_u16())
    }
}
