//! Error types for metrics
//!
//! Provides error handling for:
//! - Backend fetches (missing data, non-success statuses, network failures)
//! - Loading the static metric taxonomy and KPI catalog

use std::fmt;
use tissue_session::SessionError;

/// Which lookup came back empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundKind {
    /// Backend has not computed any metrics yet
    NotComputed,
    /// Requested version does not exist
    Version(String),
}

impl fmt::Display for NotFoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotComputed => write!(f, "metrics have not been computed yet"),
            Self::Version(version_id) => write!(f, "metrics not found for version {version_id}"),
        }
    }
}

/// Main metrics error type
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Backend has no data for the request
    #[error("{0}")]
    NotFound(NotFoundKind),

    /// Backend answered with a non-success status
    #[error("backend request failed ({status}){}", detail_suffix(.detail))]
    Transport {
        /// HTTP status code
        status: u16,
        /// Human-readable detail from the error body
        detail: Option<String>,
    },

    /// Request never produced a response
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response body was not a valid metrics payload
    #[error("invalid metrics payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// Base URL cannot carry API paths
    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    /// No token could be obtained
    #[error("authorization failed: {0}")]
    Session(#[from] SessionError),
}

impl MetricsError {
    /// Check if error is a not-found condition
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// HTTP status, when the backend answered
    #[inline]
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound(_) => Some(404),
            Self::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|detail| format!(": {detail}"))
        .unwrap_or_default()
}

/// Errors loading static catalogs (metric taxonomy, KPI groups)
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Two definitions share a slug
    #[error("duplicate metric slug: '{0}'")]
    DuplicateSlug(String),

    /// Malformed YAML document
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Malformed JSON document
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
