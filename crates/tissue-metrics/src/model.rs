//! Metric data model
//!
//! - [`MetricDefinition`]: client-held description of a metric
//! - [`MetricResult`]: server-computed values for one metric
//! - [`EnrichedMetric`]: the two merged, ready for display
//! - [`MetricVersion`]: one entry of the backend's version history

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Per-level or per-cluster values, in server order
pub type Breakdown = IndexMap<String, Option<f64>>;

/// Raw backend response, keyed by slug
pub type MetricsMap = IndexMap<String, MetricResult>;

/// Enrichment output, keyed by slug
pub type EnrichedMetrics = IndexMap<String, EnrichedMetric>;

/// Static, client-held description of one metric
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricDefinition {
    /// Unique key
    pub slug: String,
    /// Display name
    pub name: String,
    /// Short label for charts
    #[serde(default)]
    pub label: Option<String>,
    /// Human-readable formula
    #[serde(default)]
    pub formula: Option<String>,
    /// Remediation text shown when the benchmark is missed
    #[serde(default)]
    pub action: Option<String>,
}

impl MetricDefinition {
    /// Create definition with slug and name
    #[inline]
    #[must_use]
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            label: None,
            formula: None,
            action: None,
        }
    }

    /// With label
    #[inline]
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// With formula
    #[inline]
    #[must_use]
    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = Some(formula.into());
        self
    }

    /// With remediation action
    #[inline]
    #[must_use]
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

/// Server-computed values for one metric
///
/// Every field is optional; the backend is free to omit any of them. Fields
/// this type does not know about are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricResult {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub label: Option<String>,
    pub formula: Option<String>,
    pub action: Option<String>,
    pub total_value: Option<f64>,
    pub benchmark: Option<f64>,
    /// Chart payload, passed through to the view layer untouched
    pub chart_data: Option<Value>,
    pub value_per_level: Option<Breakdown>,
    pub value_per_cluster: Option<Breakdown>,
    pub viewer_filter: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MetricResult {
    /// Decode one backend entry field by field
    ///
    /// A field of the wrong type is dropped with a warning and the rest of
    /// the entry is kept. A bare number is read as `total_value`.
    #[must_use]
    pub fn from_value(slug: &str, raw: Value) -> Self {
        match raw {
            Value::Object(fields) => Self::from_fields(slug, fields),
            Value::Number(value) => Self {
                total_value: value.as_f64(),
                ..Self::default()
            },
            Value::Null => Self::default(),
            other => {
                tracing::warn!(
                    slug,
                    value = %other,
                    "metric entry is not an object, keeping slug only"
                );
                Self::default()
            }
        }
    }

    fn from_fields(slug: &str, mut fields: Map<String, Value>) -> Self {
        Self {
            slug: field(slug, &mut fields, "slug"),
            name: field(slug, &mut fields, "name"),
            label: field(slug, &mut fields, "label"),
            formula: field(slug, &mut fields, "formula"),
            action: field(slug, &mut fields, "action"),
            total_value: field(slug, &mut fields, "total_value"),
            benchmark: field(slug, &mut fields, "benchmark"),
            chart_data: fields.remove("chart_data").filter(|v| !v.is_null()),
            value_per_level: field(slug, &mut fields, "value_per_level"),
            value_per_cluster: field(slug, &mut fields, "value_per_cluster"),
            viewer_filter: field(slug, &mut fields, "viewer_filter"),
            extra: fields,
        }
    }
}

/// Remove and decode `name`; `None` if absent, null or malformed
fn field<T: DeserializeOwned>(
    slug: &str,
    fields: &mut Map<String, Value>,
    name: &str,
) -> Option<T> {
    let raw = fields.remove(name)?;
    match serde_json::from_value::<Option<T>>(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(slug, field = name, error = %e, "dropping malformed metric field");
            None
        }
    }
}

/// Decode a backend response body's entries, keeping every slug
pub(crate) fn decode_metrics(raw: IndexMap<String, Value>) -> MetricsMap {
    raw.into_iter()
        .map(|(slug, value)| {
            let result = MetricResult::from_value(&slug, value);
            (slug, result)
        })
        .collect()
}

/// Loading-state strings shown before real numbers arrive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricPlaceholders {
    pub value: String,
    pub benchmark: String,
}

impl Default for MetricPlaceholders {
    fn default() -> Self {
        Self {
            value: "xx.XX".to_string(),
            benchmark: "xx.XX".to_string(),
        }
    }
}

/// Server result merged with the client definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedMetric {
    pub slug: String,
    pub name: String,
    pub label: Option<String>,
    pub formula: Option<String>,
    pub action: Option<String>,
    #[serde(rename = "total_value")]
    pub value: Option<f64>,
    pub benchmark: Option<f64>,
    pub chart_data: Option<Value>,
    pub value_per_level: Option<Breakdown>,
    pub value_per_cluster: Option<Breakdown>,
    pub viewer_filter: Option<String>,
    pub value_placeholder: String,
    pub benchmark_placeholder: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of the backend's metric version history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricVersion {
    /// Model version the metrics were computed for
    #[serde(alias = "id", alias = "versionId")]
    pub version_id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Where the backend keeps this version's metrics
    #[serde(default, alias = "path")]
    pub location: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MetricVersion {
    /// Create version entry
    #[inline]
    #[must_use]
    pub fn new(version_id: impl Into<String>) -> Self {
        Self {
            version_id: version_id.into(),
            created_at: None,
            location: None,
            extra: Map::new(),
        }
    }
}

/// Shapes the history endpoint may answer with
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum VersionHistory {
    List(Vec<MetricVersion>),
    Wrapped { versions: Vec<MetricVersion> },
    /// Version ID → storage location, as the metrics cache indexes them
    Index(IndexMap<String, Value>),
}

impl VersionHistory {
    pub(crate) fn into_versions(self) -> Vec<MetricVersion> {
        match self {
            Self::List(versions) | Self::Wrapped { versions } => versions,
            Self::Index(index) => index
                .into_iter()
                .map(|(version_id, location)| MetricVersion {
                    location: location.as_str().map(str::to_owned),
                    ..MetricVersion::new(version_id)
                })
                .collect(),
        }
    }
}
