//! Derived dropdown contents and aggregate counts.

use std::collections::BTreeSet;

use serde::Serialize;

use super::params::{SortBy, ALL_PROGRAMS, ALL_TYPES, ALL_YEARS};
use crate::location::Location;

/// Distinct values present in the unfiltered list, each list headed by its
/// "All …" sentinel. Programs and types ascend; years descend (newest first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub programs: Vec<String>,
    pub types: Vec<String>,
    pub years: Vec<String>,
    pub sort_options: Vec<SortOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortOption {
    pub value: SortBy,
    pub label: &'static str,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self::from_locations(&[])
    }
}

impl FilterOptions {
    #[must_use]
    pub fn from_locations(locations: &[Location]) -> Self {
        let mut programs = BTreeSet::new();
        let mut types = BTreeSet::new();
        let mut years = BTreeSet::new();

        for location in locations {
            programs.extend(location.programs.iter().filter(|p| !p.is_empty()).cloned());
            if !location.kind.is_empty() {
                types.insert(location.kind.clone());
            }
            if let Some(year) = location.year.filter(|y| *y != 0) {
                years.insert(year);
            }
        }

        Self {
            programs: with_sentinel(ALL_PROGRAMS, programs.into_iter()),
            types: with_sentinel(ALL_TYPES, types.into_iter()),
            years: with_sentinel(ALL_YEARS, years.into_iter().rev().map(|y| y.to_string())),
            sort_options: SortBy::ALL
                .into_iter()
                .map(|value| SortOption {
                    value,
                    label: value.label(),
                })
                .collect(),
        }
    }
}

fn with_sentinel(sentinel: &str, values: impl Iterator<Item = String>) -> Vec<String> {
    std::iter::once(sentinel.to_owned()).chain(values).collect()
}

/// Counts shown next to the result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterStats {
    pub total: usize,
    pub filtered: usize,
    pub has_active_filters: bool,
}
