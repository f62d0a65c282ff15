//! Backend metrics client
//!
//! Three authorized GETs against the dashboard API:
//!
//! | operation | path | 404 |
//! |---|---|---|
//! | [`MetricsClient::fetch_latest_metrics`] | `/api/metrics` | not computed |
//! | [`MetricsClient::fetch_metrics_by_version`] | `/api/metrics/{id}` | version not found |
//! | [`MetricsClient::list_metric_versions`] | `/api/metrics/history` | transport |

use crate::enrich::Enricher;
use crate::error::{MetricsError, NotFoundKind};
use crate::model::{decode_metrics, EnrichedMetrics, MetricPlaceholders, MetricVersion, VersionHistory};
use crate::taxonomy::MetricTaxonomy;
use indexmap::IndexMap;
use reqwest::header::AUTHORIZATION;
use reqwest::{Response, Url};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tissue_session::{AuthBypass, SessionManager};

/// Token template the backend verifies
pub const TOKEN_TEMPLATE: &str = "backend";

/// Authorized client for the metrics endpoints
#[derive(Debug, Clone)]
pub struct MetricsClient {
    http: reqwest::Client,
    base: Url,
    session: SessionManager,
    bypass: AuthBypass,
    timeout: Option<Duration>,
    enricher: Enricher,
}

impl MetricsClient {
    /// Create client for an API base URL
    ///
    /// # Errors
    /// `MetricsError::InvalidBaseUrl` if the URL does not parse or cannot
    /// carry path segments.
    pub fn new(
        base_url: &str,
        session: SessionManager,
        taxonomy: Arc<MetricTaxonomy>,
    ) -> Result<Self, MetricsError> {
        let base = Url::parse(base_url)
            .map_err(|e| MetricsError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(MetricsError::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base,
            session,
            bypass: AuthBypass::disabled(),
            timeout: None,
            enricher: Enricher::new(taxonomy),
        })
    }

    /// With development auth bypass
    #[inline]
    #[must_use]
    pub fn with_bypass(mut self, bypass: AuthBypass) -> Self {
        self.bypass = bypass;
        self
    }

    /// With a preconfigured HTTP client
    #[inline]
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// With a per-request timeout, applied on top of the HTTP client's own
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// With custom loading placeholders
    #[inline]
    #[must_use]
    pub fn with_placeholders(mut self, placeholders: MetricPlaceholders) -> Self {
        self.enricher = self.enricher.with_placeholders(placeholders);
        self
    }

    /// API base URL
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Per-request timeout, if any
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Enricher applied to every fetch
    #[inline]
    #[must_use]
    pub fn enricher(&self) -> &Enricher {
        &self.enricher
    }

    /// `Authorization` header value for the next request
    ///
    /// `None` when the bypass is active or no token is available.
    ///
    /// # Errors
    /// `MetricsError::Session` if the session could not be established or
    /// the provider failed to issue a token.
    pub async fn authorization(&self) -> Result<Option<String>, MetricsError> {
        if self.bypass.is_active() {
            tracing::debug!("auth bypass active, sending request without credentials");
            return Ok(None);
        }

        let token = self.session.get_session_token(Some(TOKEN_TEMPLATE)).await?;
        Ok(token
            .filter(|token| !token.is_empty())
            .map(|token| format!("Bearer {token}")))
    }

    /// Latest metrics, enriched
    ///
    /// # Errors
    /// `NotFound(NotComputed)` on 404, `Transport` on other failures.
    pub async fn fetch_latest_metrics(&self) -> Result<EnrichedMetrics, MetricsError> {
        let result = self.fetch_metrics(&[], NotFoundKind::NotComputed).await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "failed to fetch latest metrics");
        }
        result
    }

    /// Metrics computed for one model version, enriched
    ///
    /// # Errors
    /// `NotFound(Version)` on 404, `Transport` on other failures.
    pub async fn fetch_metrics_by_version(
        &self,
        version_id: &str,
    ) -> Result<EnrichedMetrics, MetricsError> {
        let result = self
            .fetch_metrics(&[version_id], NotFoundKind::Version(version_id.to_string()))
            .await;
        if let Err(e) = &result {
            tracing::error!(version_id, error = %e, "failed to fetch metrics for version");
        }
        result
    }

    /// Version history of computed metrics
    ///
    /// # Errors
    /// `Transport` on any non-success status.
    pub async fn list_metric_versions(&self) -> Result<Vec<MetricVersion>, MetricsError> {
        let result = self.fetch_history().await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "failed to fetch metrics history");
        }
        result
    }

    async fn fetch_history(&self) -> Result<Vec<MetricVersion>, MetricsError> {
        let response = self.get(self.endpoint(&["history"])?).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MetricsError::Transport {
                status: status.as_u16(),
                detail: None,
            });
        }

        let body = response.text().await?;
        let history: VersionHistory = serde_json::from_str(&body)?;
        Ok(history.into_versions())
    }

    async fn fetch_metrics(
        &self,
        tail: &[&str],
        missing: NotFoundKind,
    ) -> Result<EnrichedMetrics, MetricsError> {
        let response = self.get(self.endpoint(tail)?).await?;
        let status = response.status();
        if !status.is_success() {
            let detail = error_detail(response).await;
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(MetricsError::NotFound(missing));
            }
            return Err(MetricsError::Transport {
                status: status.as_u16(),
                detail,
            });
        }

        let body = response.text().await?;
        let raw: Option<IndexMap<String, Value>> = serde_json::from_str(&body)?;
        let metrics = decode_metrics(raw.unwrap_or_default());
        tracing::debug!(count = metrics.len(), "received metrics");
        Ok(self.enricher.enrich(metrics))
    }

    async fn get(&self, url: Url) -> Result<Response, MetricsError> {
        let authorization = self.authorization().await?;
        let mut request = self.http.get(url);
        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        Ok(request.send().await?)
    }

    fn endpoint(&self, tail: &[&str]) -> Result<Url, MetricsError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| MetricsError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(["api", "metrics"])
            .extend(tail);
        Ok(url)
    }
}

/// Human-readable `detail` from an error body, if there is one
async fn error_detail(response: Response) -> Option<String> {
    let body = response.text().await.ok()?;
    let parsed: Value = serde_json::from_str(&body).ok()?;
    match parsed.get("detail")? {
        Value::Null => None,
        Value::String(detail) if detail.is_empty() => None,
        Value::String(detail) => Some(detail.clone()),
        other => Some(other.to_string()),
    }
}
