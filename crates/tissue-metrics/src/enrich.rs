//! Metrics enrichment
//!
//! Merges each server [`MetricResult`] with its client [`MetricDefinition`]:
//!
//! | field | source |
//! |---|---|
//! | name | definition → server → slug |
//! | label, formula, action | definition → server → none |
//! | value, benchmark, chart data, breakdowns | server only |
//!
//! Blank strings count as absent. Slugs the client has no definition for are
//! kept.

use crate::model::{
    EnrichedMetric, EnrichedMetrics, MetricDefinition, MetricPlaceholders, MetricResult,
    MetricsMap,
};
use crate::taxonomy::MetricTaxonomy;
use std::sync::Arc;

/// Applies the client taxonomy to server results
#[derive(Debug, Clone)]
pub struct Enricher {
    taxonomy: Arc<MetricTaxonomy>,
    placeholders: MetricPlaceholders,
}

impl Enricher {
    /// Create enricher
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

    /// Taxonomy in use
    #[inline]
    #[must_use]
    pub fn taxonomy(&self) -> &Arc<MetricTaxonomy> {
        &self.taxonomy
    }

    /// Placeholders in use
    #[inline]
    #[must_use]
    pub fn placeholders(&self) -> &MetricPlaceholders {
        &self.placeholders
    }

    /// Enrich every metric in a backend response
    #[must_use]
    pub fn enrich(&self, metrics: MetricsMap) -> EnrichedMetrics {
        metrics
            .into_iter()
            .map(|(slug, result)| {
                let enriched = self.enrich_one(&slug, result);
                (slug, enriched)
            })
            .collect()
    }

    /// Enrich a single result
    #[must_use]
    pub fn enrich_one(&self, slug: &str, result: MetricResult) -> EnrichedMetric {
        let definition = self.taxonomy.get(slug);
        if definition.is_none() {
            tracing::debug!(slug, "no client definition for metric");
        }

        let name = definition
            .map(|d| d.name.as_str())
            .and_then(non_blank)
            .or_else(|| result.name.as_deref().and_then(non_blank))
            .unwrap_or(slug)
            .to_string();

        EnrichedMetric {
            slug: slug.to_string(),
            name,
            label: prefer(definition, |d| &d.label, result.label),
            formula: prefer(definition, |d| &d.formula, result.formula),
            action: prefer(definition, |d| &d.action, result.action),
            value: result.total_value,
            benchmark: result.benchmark,
            chart_data: result.chart_data,
            value_per_level: result.value_per_level,
            value_per_cluster: result.value_per_cluster,
            viewer_filter: result.viewer_filter,
            value_placeholder: self.placeholders.value.clone(),
            benchmark_placeholder: self.placeholders.benchmark.clone(),
            extra: result.extra,
        }
    }
}

/// Definition's field if set, else the server's
pub(crate) fn prefer(
    definition: Option<&MetricDefinition>,
    field: impl Fn(&MetricDefinition) -> &Option<String>,
    server: Option<String>,
) -> Option<String> {
    definition
        .and_then(|d| field(d).as_deref())
        .and_then(non_blank)
        .map(str::to_owned)
        .or_else(|| server.filter(|s| !s.trim().is_empty()))
}

pub(crate) fn non_blank(value: &str) -> Option<&str> {
    (!value.trim().is_empty()).then_some(value)
}
