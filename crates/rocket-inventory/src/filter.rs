//! Part filtering: each field is an OR over its members, fields AND together.

use std::collections::HashSet;

use uuid::Uuid;

use crate::model::{Category, Part};

/// Catalog filter. An empty field places no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartsFilter {
    pub part_uuids: HashSet<Uuid>,
    pub names: HashSet<String>,
    pub categories: HashSet<Category>,
    pub manufacturer_countries: HashSet<String>,
    pub manufacturer_names: HashSet<String>,
    pub tags: HashSet<String>,
}

impl PartsFilter {
    /// Filter on a set of ids only.
    pub fn by_ids(ids: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            part_uuids: ids.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Build the id set from raw strings, dropping entries that are not UUIDs.
    pub fn with_raw_ids<'a>(mut self, ids: impl IntoIterator<Item = &'a str>) -> Self {
        self.part_uuids
            .extend(ids.into_iter().filter_map(|s| Uuid::parse_str(s.trim()).ok()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.part_uuids.is_empty()
            && self.names.is_empty()
            && self.categories.is_empty()
            && self.manufacturer_countries.is_empty()
            && self.manufacturer_names.is_empty()
            && self.tags.is_empty()
    }

    pub fn matches(&self, part: &Part) -> bool {
        fn any<T: Eq + std::hash::Hash>(set: &HashSet<T>, value: &T) -> bool {
            set.is_empty() || set.contains(value)
        }

        any(&self.part_uuids, &part.part_uuid)
            && any(&self.names, &part.name)
            && any(&self.categories, &part.category)
            && any(&self.manufacturer_countries, &part.manufacturer.country)
            && any(&self.manufacturer_names, &part.manufacturer.name)
            && (self.tags.is_empty() || part.tags.iter().any(|t| self.tags.contains(t)))
    }
}

/// Apply an optional filter; `None` keeps everything.
pub fn apply<'a>(
    parts: impl IntoIterator<Item = &'a Part>,
    filter: Option<&PartsFilter>,
) -> Vec<Part> {
    parts
        .into_iter()
        .filter(|p| filter.is_none_or(|f| f.matches(p)))
        .cloned()
        .collect()
}
