//! Static metric taxonomy
//!
//! The client owns the semantic side of every metric (name, label, formula,
//! remediation action); the backend only supplies numbers. Lookups are by
//! exact slug.

use crate::error::CatalogError;
use crate::model::MetricDefinition;
use indexmap::IndexMap;

/// Built-in definitions: (slug, name, label, formula, action)
const BUILTIN: &[(&str, &str, &str, &str, &str)] = &[
    (
        "daylight_potential",
        "Daylight Potential",
        "Glazed facade area",
        "window_area / net_floor_area",
        "The windows area to be increased to meet the benchmark.",
    ),
    (
        "green_space_index",
        "Green Space Index",
        "Distance to green space",
        "max (0, 1 - distance_to_green / target*)\n*300 m",
        "The distance of residential units to green space needs to be decreased to meet the benchmark.",
    ),
    (
        "program_diversity_index",
        "Program Diversity Index",
        "Program distribution",
        "1 - (program_frequencies / program_units_count²)",
        "The diversity of programs needs to be increased to meet the benchmark.",
    ),
    (
        "circulation_efficiency",
        "Circulation Efficiency",
        "Circulation area ratio",
        "1 - (circulation_area / total_area)",
        "The circulation area needs to be decreased to meet the benchmark.",
    ),
    (
        "occupancy_efficiency",
        "Occupancy Efficiency",
        "Usable area ratio",
        "usable_area / total_area",
        "The usable area needs to be increased to meet the benchmark.",
    ),
    (
        "net_floor_area_ratio",
        "Net-Floor-Area Ratio",
        "Net-floor-area ratio",
        "net_floor_area / gross_floor_area",
        "The net-floor-area ratio needs to be optimized to meet the benchmark.",
    ),
    (
        "envelope_efficiency",
        "Envelope Efficiency",
        "Envelope components",
        "building_volume / envelope_area",
        "The envelope efficiency needs to be optimized to meet the benchmark.",
    ),
    (
        "carbon_efficiency",
        "Carbon Efficiency",
        "Carbon by material",
        "max (0, 1 - embodied_carbon_intensity / target*)\n*600 kgCO2e/kg",
        "The embodied carbon needs to be decreased to meet the benchmark.",
    ),
];

/// Immutable set of metric definitions, keyed by slug
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricTaxonomy {
    definitions: IndexMap<String, MetricDefinition>,
}

impl MetricTaxonomy {
    /// Empty taxonomy
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The platform's built-in metrics
    #[must_use]
    pub fn builtin() -> Self {
        let definitions = BUILTIN
            .iter()
            .map(|&(slug, name, label, formula, action)| {
                let definition = MetricDefinition::new(slug, name)
                    .with_label(label)
                    .with_formula(formula)
                    .with_action(action);
                (slug.to_string(), definition)
            })
            .collect();
        Self { definitions }
    }

    /// Build from definitions, rejecting duplicate slugs
    ///
    /// # Errors
    /// `CatalogError::DuplicateSlug` naming the first repeated slug.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = MetricDefinition>,
    ) -> Result<Self, CatalogError> {
        let mut map = IndexMap::new();
        for definition in definitions {
            if map.contains_key(&definition.slug) {
                return Err(CatalogError::DuplicateSlug(definition.slug));
            }
            map.insert(definition.slug.clone(), definition);
        }
        Ok(Self { definitions: map })
    }

    /// Parse a YAML list of definitions
    ///
    /// # Errors
    /// Malformed YAML or duplicate slugs.
    pub fn from_yaml_str(source: &str) -> Result<Self, CatalogError> {
        let definitions: Vec<MetricDefinition> = serde_yaml::from_str(source)?;
        Self::from_definitions(definitions)
    }

    /// Parse a JSON list of definitions
    ///
    /// # Errors
    /// Malformed JSON or duplicate slugs.
    pub fn from_json_str(source: &str) -> Result<Self, CatalogError> {
        let definitions: Vec<MetricDefinition> = serde_json::from_str(source)?;
        Self::from_definitions(definitions)
    }

    /// Definition for a slug
    #[inline]
    #[must_use]
    pub fn get(&self, slug: &str) -> Option<&MetricDefinition> {
        self.definitions.get(slug)
    }

    /// Check if slug is defined
    #[inline]
    #[must_use]
    pub fn contains(&self, slug: &str) -> bool {
        self.definitions.contains_key(slug)
    }

    /// Number of definitions
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the taxonomy is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Definitions in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &MetricDefinition> {
        self.definitions.values()
    }
}
