//! Dashboard context
//!
//! Wires one session manager, route guard and metrics client together from a
//! [`ClientConfig`]. Views hold a [`DashboardClient`] and never construct the
//! parts themselves.

use crate::config::ClientConfig;
use crate::error::ClientError;
use std::sync::Arc;
use tissue_metrics::{BoundKpiGroup, KpiBinder, KpiGroup, MetricTaxonomy, MetricVersion, MetricsClient};
use tissue_session::{IdentityProvider, RouteGuard, SessionManager};

/// Shared client context for the dashboard views
#[derive(Debug, Clone)]
pub struct DashboardClient {
    config: ClientConfig,
    session: SessionManager,
    guard: RouteGuard,
    metrics: MetricsClient,
    binder: KpiBinder,
}

impl DashboardClient {
    /// Create context with the built-in metric taxonomy
    ///
    /// # Errors
    /// Invalid configuration.
    pub fn new(
        config: ClientConfig,
        provider: Arc<dyn IdentityProvider>,
    ) -> Result<Self, ClientError> {
        Self::with_taxonomy(config, provider, Arc::new(MetricTaxonomy::builtin()))
    }

    /// Create context with a custom metric taxonomy
    ///
    /// # Errors
    /// Invalid configuration.
    pub fn with_taxonomy(
        config: ClientConfig,
        provider: Arc<dyn IdentityProvider>,
        taxonomy: Arc<MetricTaxonomy>,
    ) -> Result<Self, ClientError> {
        config.validate()?;

        let session = SessionManager::new(provider, config.session.clone());
        let guard = RouteGuard::new(session.clone(), config.redirects.clone())
            .with_bypass(config.bypass());

        let mut metrics = MetricsClient::new(&config.api_url, session.clone(), Arc::clone(&taxonomy))?
            .with_bypass(config.bypass());
        if let Some(timeout) = config.request_timeout() {
            metrics = metrics.with_timeout(timeout);
        }

        if config.bypass().is_active() {
            tracing::warn!("authentication bypass is active; requests are sent without credentials");
        }
        tracing::info!(api_url = %config.api_url, metrics = taxonomy.len(), "dashboard client ready");

        Ok(Self {
            config,
            session,
            guard,
            metrics,
            binder: KpiBinder::new(taxonomy),
        })
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Session manager
    #[inline]
    #[must_use]
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Route guard
    #[inline]
    #[must_use]
    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    /// Metrics client
    #[inline]
    #[must_use]
    pub fn metrics(&self) -> &MetricsClient {
        &self.metrics
    }

    /// Fetch the latest metrics and bind them to `groups`
    ///
    /// # Errors
    /// Any fetch error.
    pub async fn load_kpis(&self, groups: &[KpiGroup]) -> Result<Vec<BoundKpiGroup>, ClientError> {
        let enriched = self.metrics.fetch_latest_metrics().await?;
        Ok(self.binder.bind(groups, &enriched))
    }

    /// Fetch one version's metrics and bind them to `groups`
    ///
    /// # Errors
    /// Any fetch error.
    pub async fn load_kpis_for_version(
        &self,
        groups: &[KpiGroup],
        version_id: &str,
    ) -> Result<Vec<BoundKpiGroup>, ClientError> {
        let enriched = self.metrics.fetch_metrics_by_version(version_id).await?;
        Ok(self.binder.bind(groups, &enriched))
    }

    /// Metric version history
    ///
    /// # Errors
    /// Any fetch error.
    pub async fn versions(&self) -> Result<Vec<MetricVersion>, ClientError> {
        Ok(self.metrics.list_metric_versions().await?)
    }

    /// Sign out and return where to navigate next
    ///
    /// # Errors
    /// Provider rejected the sign-out.
    pub async fn sign_out(&self) -> Result<String, ClientError> {
        self.session.sign_out().await?;
        Ok(self.config.redirects.after_sign_out_url.clone())
    }
}
