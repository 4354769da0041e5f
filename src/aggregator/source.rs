//! Metrics sources
//!
//! The aggregator pulls live data through [`MetricsSource`]. The production
//! implementation talks to the FRR metrics exporter over HTTP and samples
//! the host with `sysinfo`; tests substitute scripted sources.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::system::SystemSampler;
use crate::error::SourceError;
use crate::model::{OspfState, SystemMetrics};

/// Provider of the live inputs of one collection cycle
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Fetch current OSPF protocol state
    async fn fetch_ospf(&self) -> Result<OspfState, SourceError>;

    /// Sample host resource usage
    async fn collect_system_metrics(&self) -> Result<SystemMetrics, SourceError>;
}

/// Source backed by the FRR metrics exporter and the local host
pub struct ExporterSource {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
    sampler: SystemSampler,
}

impl ExporterSource {
    /// Create a source polling `url` with the given per-request timeout
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Request` if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let url = url.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::request(&url, e.to_string()))?;

        Ok(Self {
            client,
            url,
            timeout,
            sampler: SystemSampler::new(),
        })
    }

    /// Exporter URL
    pub fn url(&self) -> &str {
        &self.url
    }

    fn map_reqwest_error(&self, e: &reqwest::Error) -> SourceError {
        if e.is_timeout() {
            SourceError::Timeout {
                url: self.url.clone(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else if e.is_decode() {
            SourceError::Decode(e.to_string())
        } else {
            SourceError::request(&self.url, e.to_string())
        }
    }
}

#[async_trait]
impl MetricsSource for ExporterSource {
    async fn fetch_ospf(&self) -> Result<OspfState, SourceError> {
        debug!("Fetching OSPF metrics from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let state: OspfState = response
            .json()
            .await
            .map_err(|e| self.map_reqwest_error(&e))?;

        debug!(
            neighbors = state.neighbors.len(),
            routes = state.routes.len(),
            lsas = state.lsas.len(),
            "Fetched OSPF metrics"
        );
        Ok(state)
    }

    async fn collect_system_metrics(&self) -> Result<SystemMetrics, SourceError> {
        self.sampler.sample()
    }
}

impl std::fmt::Debug for ExporterSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExporterSource")
            .field("url", &self.url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
