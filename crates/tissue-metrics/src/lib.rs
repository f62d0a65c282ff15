//! Tissue Metrics - server metrics for the dashboard
//!
//! Turns backend metric results into display-ready KPI groups:
//! - Authorized fetches of latest, per-version and historical metrics
//! - Enrichment with the client-held metric taxonomy
//! - Binding of statically declared KPI groups to enriched metrics
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tissue_metrics::{KpiBinder, KpiCatalog, MetricTaxonomy, MetricsClient};
//!
//! # async fn example(session: tissue_session::SessionManager) -> Result<(), Box<dyn std::error::Error>> {
//! let taxonomy = Arc::new(MetricTaxonomy::builtin());
//! let client = MetricsClient::new("https://api.example.com", session, taxonomy.clone())?;
//!
//! let catalog = KpiCatalog::from_yaml_str("- name: Light\n  metrics: [daylight_potential]")?;
//! let metrics = client.fetch_latest_metrics().await?;
//! let groups = KpiBinder::new(taxonomy).bind(catalog.groups(), &metrics);
//!
//! println!("Bound {} groups", groups.len());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod client;
pub mod enrich;
pub mod error;
pub mod kpi;
pub mod model;
pub mod taxonomy;

// Re-exports for convenience
pub use client::{MetricsClient, TOKEN_TEMPLATE};
pub use enrich::Enricher;
pub use error::{CatalogError, MetricsError, NotFoundKind};
pub use kpi::{
    BoundKpiGroup, KpiBinder, KpiCatalog, KpiGroup, KpiMetric, MetricRefRecord, MetricRefs,
};
pub use model::{
    Breakdown, EnrichedMetric, EnrichedMetrics, MetricDefinition, MetricPlaceholders,
    MetricResult, MetricVersion, MetricsMap,
};
pub use taxonomy::MetricTaxonomy;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Tissue Metrics
    pub use crate::{
        EnrichedMetrics, Enricher, KpiBinder, KpiCatalog, KpiGroup, MetricTaxonomy,
        MetricsClient, MetricsError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
