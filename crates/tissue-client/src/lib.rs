//! Tissue Client - dashboard client context
//!
//! Everything a dashboard view needs, built once at start-up:
//! - [`ClientConfig`] from the environment or a TOML file
//! - Tracing initialisation
//! - [`DashboardClient`] bundling session, route guard and metrics
//!
//! # Example
//!
//! ```rust,ignore
//! use tissue_client::{init_tracing, ClientConfig, DashboardClient, LogFormat};
//! use tissue_metrics::KpiCatalog;
//!
//! # async fn example(provider: std::sync::Arc<dyn tissue_session::IdentityProvider>) -> Result<(), Box<dyn std::error::Error>> {
//! init_tracing("info,tissue_metrics=debug", LogFormat::Pretty)?;
//!
//! let dashboard = DashboardClient::new(ClientConfig::from_env()?, provider)?;
//! let catalog = KpiCatalog::from_yaml_str(include_str!("kpis.yaml"))?;
//! let groups = dashboard.load_kpis(catalog.groups()).await?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod dashboard;
pub mod error;
pub mod telemetry;

pub use config::ClientConfig;
pub use dashboard::DashboardClient;
pub use error::{ClientError, ConfigError};
pub use telemetry::{init_tracing, LogFormat};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
