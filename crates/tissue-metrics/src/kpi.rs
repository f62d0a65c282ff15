//! KPI groups and binding
//!
//! A KPI group declares which metrics it shows. The declaration comes in one
//! of three encodings, all normalised to an ordered slug list by
//! [`MetricRefs::slugs`]:
//!
//! ```yaml
//! metrics: [daylight_potential, green_space_index]          # slug list
//! metrics: {daylight_potential: true, green_space_index: 1} # flag map
//! metrics: [{slug: daylight_potential}, {key: green_space_index}]  # records
//! ```
//!
//! [`KpiBinder::bind`] resolves each slug against the enriched metrics of a
//! fetch. A slug the backend did not return is logged and replaced by a
//! placeholder with no values; binding itself never fails.

use crate::enrich::{non_blank, prefer};
use crate::error::CatalogError;
use crate::model::{Breakdown, EnrichedMetric, EnrichedMetrics, MetricPlaceholders};
use crate::taxonomy::MetricTaxonomy;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Record form of a metric reference
///
/// Non-string field values are read as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRefRecord {
    #[serde(default, deserialize_with = "string_only", skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "string_only", skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, deserialize_with = "string_only", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

fn string_only<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(value)) => Ok(Some(value)),
        _ => Ok(None),
    }
}

impl MetricRefRecord {
    /// Record carrying `slug`
    #[inline]
    #[must_use]
    pub fn with_slug(slug: impl Into<String>) -> Self {
        Self {
            slug: Some(slug.into()),
            ..Self::default()
        }
    }

    /// First non-blank of `slug`, `key`, `name`
    #[must_use]
    pub fn resolve(&self) -> Option<&str> {
        [&self.slug, &self.key, &self.name]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find_map(non_blank)
    }
}

/// A KPI group's metric references, in any of the accepted encodings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricRefs {
    /// Ordered slug strings
    Slugs(Vec<String>),
    /// Ordered records carrying a slug
    Records(Vec<MetricRefRecord>),
    /// Slug → flag, in document order
    Flags(IndexMap<String, Value>),
}

impl Default for MetricRefs {
    fn default() -> Self {
        Self::Slugs(Vec::new())
    }
}

impl MetricRefs {
    /// Ordered slug list
    ///
    /// Flag maps contribute every key; records without a usable slug are
    /// dropped.
    #[must_use]
    pub fn slugs(&self) -> Vec<String> {
        match self {
            Self::Slugs(slugs) => slugs.clone(),
            Self::Flags(flags) => flags.keys().cloned().collect(),
            Self::Records(records) => records
                .iter()
                .filter_map(MetricRefRecord::resolve)
                .map(str::to_owned)
                .collect(),
        }
    }
}

impl From<Vec<String>> for MetricRefs {
    fn from(slugs: Vec<String>) -> Self {
        Self::Slugs(slugs)
    }
}

impl From<&[&str]> for MetricRefs {
    fn from(slugs: &[&str]) -> Self {
        Self::Slugs(slugs.iter().map(|s| (*s).to_string()).collect())
    }
}

/// `null` metric references mean "none"
fn null_as_empty<'de, D>(deserializer: D) -> Result<MetricRefs, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<MetricRefs>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Statically declared KPI group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiGroup {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub metrics: MetricRefs,
}

impl KpiGroup {
    /// Create group
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, metrics: impl Into<MetricRefs>) -> Self {
        Self {
            name: name.into(),
            description: None,
            icon: None,
            metrics: metrics.into(),
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// With icon
    #[inline]
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// Static list of KPI groups
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KpiCatalog {
    groups: Vec<KpiGroup>,
}

impl KpiCatalog {
    /// Create catalog
    #[inline]
    #[must_use]
    pub fn new(groups: Vec<KpiGroup>) -> Self {
        Self { groups }
    }

    /// Parse a YAML list of groups
    ///
    /// # Errors
    /// Malformed YAML.
    pub fn from_yaml_str(source: &str) -> Result<Self, CatalogError> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Parse a JSON list of groups
    ///
    /// # Errors
    /// Malformed JSON.
    pub fn from_json_str(source: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Declared groups
    #[inline]
    #[must_use]
    pub fn groups(&self) -> &[KpiGroup] {
        &self.groups
    }
}

/// Display record for one metric of a bound KPI group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiMetric {
    pub slug: String,
    pub name: String,
    pub label: Option<String>,
    pub formula: Option<String>,
    pub action: Option<String>,
    pub value: Option<f64>,
    pub benchmark: Option<f64>,
    pub chart_data: Option<Value>,
    pub value_per_level: Option<Breakdown>,
    pub value_per_cluster: Option<Breakdown>,
    pub value_placeholder: String,
    pub benchmark_placeholder: String,
}

impl KpiMetric {
    fn from_enriched(metric: &EnrichedMetric) -> Self {
        Self {
            slug: metric.slug.clone(),
            name: metric.name.clone(),
            label: metric.label.clone(),
            formula: metric.formula.clone(),
            action: metric.action.clone(),
            value: metric.value,
            benchmark: metric.benchmark,
            chart_data: metric.chart_data.clone(),
            value_per_level: metric.value_per_level.clone(),
            value_per_cluster: metric.value_per_cluster.clone(),
            value_placeholder: metric.value_placeholder.clone(),
            benchmark_placeholder: metric.benchmark_placeholder.clone(),
        }
    }
}

/// KPI group with its metrics resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundKpiGroup {
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub metrics: Vec<KpiMetric>,
}

/// Resolves KPI groups against enriched metrics
#[derive(Debug, Clone)]
pub struct KpiBinder {
    taxonomy: Arc<MetricTaxonomy>,
    placeholders: MetricPlaceholders,
}

impl KpiBinder {
    /// Create binder
    #[inline]
    #[must_use]
    pub fn new(taxonomy: Arc<MetricTaxonomy>) -> Self {
        Self {
            taxonomy,
            placeholders: MetricPlaceholders::default(),
        }
    }

    /// With custom placeholders
    #[inline]
    #[must_use]
    pub fn with_placeholders(mut self, placeholders: MetricPlaceholders) -> Self {
        self.placeholders = placeholders;
        self
    }

    /// Bind every group; the input groups are only read
    #[must_use]
    pub fn bind(&self, groups: &[KpiGroup], enriched: &EnrichedMetrics) -> Vec<BoundKpiGroup> {
        groups
            .iter()
            .map(|group| self.bind_group(group, enriched))
            .collect()
    }

    /// Bind a single group
    #[must_use]
    pub fn bind_group(&self, group: &KpiGroup, enriched: &EnrichedMetrics) -> BoundKpiGroup {
        let metrics = group
            .metrics
            .slugs()
            .into_iter()
            .map(|slug| match enriched.get(&slug) {
                Some(metric) => KpiMetric::from_enriched(metric),
                None => {
                    tracing::warn!(kpi = %group.name, slug = %slug, "metric not found in backend response");
                    self.placeholder(slug)
                }
            })
            .collect();

        BoundKpiGroup {
            name: group.name.clone(),
            description: group.description.clone(),
            icon: group.icon.clone(),
            metrics,
        }
    }

    fn placeholder(&self, slug: String) -> KpiMetric {
        let definition = self.taxonomy.get(&slug);
        KpiMetric {
            name: definition
                .map(|d| d.name.as_str())
                .and_then(non_blank)
                .unwrap_or(&slug)
                .to_string(),
            label: prefer(definition, |d| &d.label, None),
            formula: prefer(definition, |d| &d.formula, None),
            action: prefer(definition, |d| &d.action, None),
            value: None,
            benchmark: None,
            chart_data: None,
            value_per_level: None,
            value_per_cluster: None,
            value_placeholder: self.placeholders.value.clone(),
            benchmark_placeholder: self.placeholders.benchmark.clone(),
            slug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::Enricher;
    use crate::model::{MetricDefinition, MetricsMap};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    fn refs(raw: Value) -> MetricRefs {
        serde_json::from_value(raw).unwrap()
    }

    fn taxonomy() -> Arc<MetricTaxonomy> {
        Arc::new(
            MetricTaxonomy::from_definitions(vec![
                MetricDefinition::new("a", "Alpha").with_label("alpha label"),
                MetricDefinition::new("b", "Beta").with_action("Raise beta."),
            ])
            .unwrap(),
        )
    }

    fn enriched(raw: Value) -> EnrichedMetrics {
        let metrics: MetricsMap = serde_json::from_value(raw).unwrap();
        Enricher::new(taxonomy()).enrich(metrics)
    }

    #[test]
    fn every_encoding_normalises_to_the_same_slugs() {
        let expected = vec!["a".to_string(), "b".to_string()];

        assert_eq!(refs(json!(["a", "b"])).slugs(), expected);
        assert_eq!(refs(json!({"a": true, "b": true})).slugs(), expected);
        assert_eq!(refs(json!([{"slug": "a"}, {"slug": "b"}])).slugs(), expected);
        assert_eq!(refs(json!([{"key": "a"}, {"key": "b"}])).slugs(), expected);
        assert_eq!(refs(json!([{"name": "a"}, {"name": "b"}])).slugs(), expected);
        assert_eq!(refs(json!([{"slug": "a"}, {"name": "b"}])).slugs(), expected);
    }

    #[test]
    fn record_keys_follow_priority_and_unusable_records_drop() {
        let parsed = refs(json!([
            {"name": "n", "key": "k", "slug": "s"},
            {"name": "n2", "key": "k2"},
            {"label": "no slug here"},
            {"slug": "", "name": "fallback"}
        ]));
        assert_eq!(parsed.slugs(), vec!["s", "k2", "fallback"]);
    }

    #[test]
    fn non_string_record_fields_fall_through() {
        let parsed = refs(json!([
            {"slug": 5, "key": "a"},
            {"slug": "b"},
            {"slug": ["x"], "name": null},
            {"key": {"nested": true}, "name": "c"}
        ]));
        assert_eq!(parsed.slugs(), vec!["a", "b", "c"]);

        let catalog = KpiCatalog::from_yaml_str(
            "- name: Mixed\n  metrics:\n    - {slug: 7, key: a}\n    - {slug: b}\n",
        )
        .unwrap();
        assert_eq!(catalog.groups()[0].metrics.slugs(), vec!["a", "b"]);
    }

    #[test]
    fn placeholder_drops_blank_definition_text() {
        let taxonomy = Arc::new(
            MetricTaxonomy::from_definitions(vec![MetricDefinition::new("a", "Alpha")
                .with_label("  ")
                .with_formula("")
                .with_action("Do more.")])
            .unwrap(),
        );
        let binder = KpiBinder::new(Arc::clone(&taxonomy));
        let groups = vec![KpiGroup::new("Light", &["a"][..])];

        let bound = binder.bind(&groups, &EnrichedMetrics::new());
        let metric = &bound[0].metrics[0];
        assert_eq!(metric.label, None);
        assert_eq!(metric.formula, None);
        assert_eq!(metric.action.as_deref(), Some("Do more."));

        let served = Enricher::new(taxonomy).enrich_one("a", Default::default());
        assert_eq!(metric.label, served.label);
        assert_eq!(metric.formula, served.formula);
    }

    #[test]
    fn flag_map_keeps_document_order() {
        let parsed = refs(json!({"z": 1, "a": true, "m": "yes"}));
        assert_eq!(parsed.slugs(), vec!["z", "a", "m"]);
    }

    #[test]
    fn null_or_missing_metrics_mean_no_metrics() {
        let group: KpiGroup = serde_json::from_value(json!({"name": "Empty", "metrics": null})).unwrap();
        assert!(group.metrics.slugs().is_empty());

        let group: KpiGroup = serde_json::from_value(json!({"name": "Bare"})).unwrap();
        assert!(group.metrics.slugs().is_empty());
    }

    #[test]
    fn present_metrics_carry_server_numbers() {
        let binder = KpiBinder::new(taxonomy());
        let metrics = enriched(json!({
            "a": {"total_value": 0.3, "benchmark": 0.2, "value_per_level": {"0": 0.1}}
        }));
        let groups = vec![KpiGroup::new("Light", &["a"][..])];

        let bound = binder.bind(&groups, &metrics);
        let metric = &bound[0].metrics[0];
        assert_eq!(metric.name, "Alpha");
        assert_eq!(metric.label.as_deref(), Some("alpha label"));
        assert_eq!(metric.value, Some(0.3));
        assert_eq!(metric.benchmark, Some(0.2));
        assert_eq!(metric.value_per_level.as_ref().unwrap().len(), 1);
        assert_eq!(metric.value_placeholder, "xx.XX");
    }

    #[test]
    fn missing_metric_becomes_null_placeholder() {
        let binder = KpiBinder::new(taxonomy());
        let metrics = enriched(json!({"a": {"total_value": 0.5}}));
        let groups = vec![KpiGroup::new("Mixed", &["a", "b", "unknown"][..])];

        let bound = binder.bind(&groups, &metrics);
        let slugs: Vec<_> = bound[0].metrics.iter().map(|m| m.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a", "b", "unknown"]);

        let beta = &bound[0].metrics[1];
        assert_eq!(beta.value, None);
        assert_eq!(beta.benchmark, None);
        assert_eq!(beta.name, "Beta");
        assert_eq!(beta.action.as_deref(), Some("Raise beta."));
        assert_eq!(beta.benchmark_placeholder, "xx.XX");

        let unknown = &bound[0].metrics[2];
        assert_eq!(unknown.name, "unknown");
        assert_eq!(unknown.label, None);
    }

    #[test]
    fn binding_leaves_declarations_untouched() {
        let binder = KpiBinder::new(taxonomy());
        let groups = vec![
            KpiGroup::new("Light", &["a"][..]).with_icon("sun"),
            KpiGroup::new("Flags", refs(json!({"b": true}))),
        ];
        let before = groups.clone();

        let first = binder.bind(&groups, &enriched(json!({"a": {"total_value": 1.0}})));
        let second = binder.bind(&groups, &enriched(json!({"b": {"total_value": 2.0}})));

        assert_eq!(groups, before);
        assert_eq!(first[0].icon.as_deref(), Some("sun"));
        assert_eq!(first[0].metrics[0].value, Some(1.0));
        assert_eq!(second[0].metrics[0].value, None);
        assert_eq!(second[1].metrics[0].value, Some(2.0));
    }

    #[test]
    fn catalog_loads_all_encodings_from_yaml() {
        let yaml = r"
- name: Environment
  icon: leaf
  metrics: [daylight_potential, green_space_index]
- name: Efficiency
  metrics:
    circulation_efficiency: true
    occupancy_efficiency: true
- name: Carbon
  metrics:
    - slug: carbon_efficiency
    - key: envelope_efficiency
";
        let catalog = KpiCatalog::from_yaml_str(yaml).unwrap();
        let slugs: Vec<_> = catalog.groups().iter().map(|g| g.metrics.slugs()).collect();
        assert_eq!(
            slugs,
            vec![
                vec!["daylight_potential", "green_space_index"],
                vec!["circulation_efficiency", "occupancy_efficiency"],
                vec!["carbon_efficiency", "envelope_efficiency"],
            ]
        );
    }

    proptest! {
        #[test]
        fn prop_encodings_agree(slugs in prop::collection::vec("[a-z_]{1,12}", 0..8)) {
            let mut unique = Vec::new();
            for slug in slugs {
                if !unique.contains(&slug) {
                    unique.push(slug);
                }
            }

            let list = MetricRefs::Slugs(unique.clone());
            let flags = MetricRefs::Flags(
                unique.iter().map(|s| (s.clone(), Value::Bool(true))).collect(),
            );
            let records = MetricRefs::Records(
                unique.iter().map(MetricRefRecord::with_slug).collect(),
            );

            prop_assert_eq!(list.slugs(), unique.clone());
            prop_assert_eq!(flags.slugs(), unique.clone());
            prop_assert_eq!(records.slugs(), unique);
        }
    }
}
