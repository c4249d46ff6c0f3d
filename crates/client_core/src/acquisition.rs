//! Exhibitor acquisition: primary endpoint, then backup, then the static
//! fallback catalog. Callers always receive a non-empty list.

use std::{fmt, sync::Arc, time::Duration};

use serde::Serialize;
use shared::{
    domain::ExhibitorRecord,
    error::{ApiError, ErrorCode},
};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    config::{RetryPolicy, Settings},
    counter::CallCounter,
    error::FetchError,
    fallback::fallback_exhibitors,
    transport::{ExhibitorTransport, HttpTransport},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Primary,
    Backup,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => f.write_str("primary"),
            Self::Backup => f.write_str("backup"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// Every endpoint failed or none was configured.
    Unavailable,
    /// An endpoint answered successfully with zero exhibitors.
    EmptyResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Primary,
    Backup,
    Fallback(FallbackReason),
    /// Data rehydrated by a consumer from an earlier snapshot.
    Cache,
}

impl DataSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Primary | Self::Backup => "api",
            Self::Fallback(_) => "mock",
            Self::Cache => "cache",
        }
    }
}

impl From<Endpoint> for DataSource {
    fn from(value: Endpoint) -> Self {
        match value {
            Endpoint::Primary => Self::Primary,
            Endpoint::Backup => Self::Backup,
        }
    }
}

/// Outcome of one acquisition call.
#[derive(Debug, Clone, PartialEq)]
pub struct Acquisition {
    pub records: Vec<ExhibitorRecord>,
    pub source: DataSource,
    /// Why fallback data was served, when it was.
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub endpoint: Endpoint,
    pub url: Option<String>,
    pub success: bool,
    pub status: Option<u16>,
    pub error: Option<String>,
}

pub struct ExhibitorAcquirer {
    transport: Arc<dyn ExhibitorTransport>,
    primary_url: Option<Url>,
    backup_url: Option<Url>,
    primary_timeout: Duration,
    backup_timeout: Duration,
    probe_timeout: Duration,
    retry: RetryPolicy,
    counter: CallCounter,
    fallback: Vec<ExhibitorRecord>,
}

impl ExhibitorAcquirer {
    pub fn new(settings: &Settings, counter: CallCounter) -> Self {
        Self::with_transport(Arc::new(HttpTransport::new()), settings, counter)
    }

    pub fn with_transport(
        transport: Arc<dyn ExhibitorTransport>,
        settings: &Settings,
        counter: CallCounter,
    ) -> Self {
        Self {
            transport,
            primary_url: settings.primary_url.clone(),
            backup_url: settings.backup_url.clone(),
            primary_timeout: settings.primary_timeout,
            backup_timeout: settings.backup_timeout,
            probe_timeout: settings.probe_timeout,
            retry: settings.retry,
            counter,
            fallback: fallback_exhibitors(),
        }
    }

    /// Replaces the fallback catalog. An empty replacement is ignored so the
    /// non-empty guarantee holds.
    pub fn with_fallback(mut self, fallback: Vec<ExhibitorRecord>) -> Self {
        if fallback.is_empty() {
            warn!("ignoring empty fallback catalog");
        } else {
            self.fallback = fallback;
        }
        self
    }

    pub fn counter(&self) -> &CallCounter {
        &self.counter
    }

    pub fn fallback(&self) -> &[ExhibitorRecord] {
        &self.fallback
    }

    /// Fetches the exhibitor list. Never fails: network, status, and body
    /// errors and empty responses are all answered with the fallback catalog.
    pub async fn fetch_exhibitors(&self) -> Acquisition {
        let call = self.counter.increment();
        let mut attempt = 0;

        let failure = loop {
            match self.fetch_round(call).await {
                Ok((records, endpoint)) if records.is_empty() => {
                    warn!(call, %endpoint, "endpoint returned no exhibitors, serving fallback");
                    return self.fallback_result(
                        FallbackReason::EmptyResult,
                        ApiError::new(
                            ErrorCode::EmptyResult,
                            format!("{endpoint} endpoint returned an empty exhibitor list"),
                        ),
                    );
                }
                Ok((records, endpoint)) => {
                    info!(call, %endpoint, count = records.len(), "loaded exhibitors");
                    return Acquisition {
                        records,
                        source: endpoint.into(),
                        error: None,
                    };
                }
                Err(err) if err.is_retryable() && attempt < self.retry.retries => {
                    let delay = self.retry.delay_for(attempt);
                    attempt += 1;
                    warn!(call, attempt, ?delay, error = %err, "exhibitor fetch failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(err) => break err,
            }
        };

        warn!(call, error = %failure, "exhibitor endpoints unavailable, serving fallback");
        self.fallback_result(FallbackReason::Unavailable, failure.to_api_error())
    }

    pub async fn probe(&self, endpoint: Endpoint) -> ProbeReport {
        let Some(url) = self.url_for(endpoint) else {
            return ProbeReport {
                endpoint,
                url: None,
                success: false,
                status: None,
                error: Some(FetchError::NotConfigured.to_string()),
            };
        };

        info!(%endpoint, %url, "probing endpoint");
        match self.transport.probe(url, self.probe_timeout).await {
            Ok(status) => ProbeReport {
                endpoint,
                url: Some(url.to_string()),
                success: true,
                status: Some(status),
                error: None,
            },
            Err(err) => {
                warn!(%endpoint, error = %err, "probe failed");
                let status = match &err {
                    FetchError::Status { status, .. } => Some(*status),
                    _ => None,
                };
                ProbeReport {
                    endpoint,
                    url: Some(url.to_string()),
                    success: false,
                    status,
                    error: Some(err.to_string()),
                }
            }
        }
    }

    /// One primary-then-backup round. The reported error is the primary's
    /// unless the primary simply was not configured.
    async fn fetch_round(
        &self,
        call: u64,
    ) -> Result<(Vec<ExhibitorRecord>, Endpoint), FetchError> {
        let primary_err = match self.try_endpoint(Endpoint::Primary, call).await {
            Ok(records) => return Ok((records, Endpoint::Primary)),
            Err(err) => err,
        };
        warn!(call, error = %primary_err, "primary endpoint failed, trying backup");

        match self.try_endpoint(Endpoint::Backup, call).await {
            Ok(records) => Ok((records, Endpoint::Backup)),
            Err(backup_err) => {
                warn!(call, error = %backup_err, "backup endpoint failed");
                if matches!(primary_err, FetchError::NotConfigured) {
                    Err(backup_err)
                } else {
                    Err(primary_err)
                }
            }
        }
    }

    async fn try_endpoint(
        &self,
        endpoint: Endpoint,
        call: u64,
    ) -> Result<Vec<ExhibitorRecord>, FetchError> {
        let url = self.url_for(endpoint).ok_or(FetchError::NotConfigured)?;
        let timeout = match endpoint {
            Endpoint::Primary => self.primary_timeout,
            Endpoint::Backup => self.backup_timeout,
        };
        debug!(call, %endpoint, %url, ?timeout, "fetching exhibitors");
        self.transport.get_exhibitors(url, timeout).await
    }

    fn url_for(&self, endpoint: Endpoint) -> Option<&Url> {
        match endpoint {
            Endpoint::Primary => self.primary_url.as_ref(),
            Endpoint::Backup => self.backup_url.as_ref(),
        }
    }

    fn fallback_result(&self, reason: FallbackReason, error: ApiError) -> Acquisition {
        Acquisition {
            records: self.fallback.clone(),
            source: DataSource::Fallback(reason),
            error: Some(error),
        }
    }
}

#[cfg(test)]
#[path = "tests/acquisition_tests.rs"]
mod tests;
