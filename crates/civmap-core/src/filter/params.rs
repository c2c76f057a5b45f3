//! User-controlled filter parameters and the change events that mutate them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Selector sentinel meaning "no program filter".
pub const ALL_PROGRAMS: &str = "All programs";
/// Selector sentinel meaning "no type filter".
pub const ALL_TYPES: &str = "All types";
/// Selector sentinel meaning "no year filter".
pub const ALL_YEARS: &str = "All years";

/// Ceiling of the distance slider; also the default bound.
pub const MAX_DISTANCE_CEILING_KM: f64 = 500.0;
/// Floor of the distance slider.
pub const MIN_DISTANCE_KM: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Distance,
    Rating,
    Name,
    Year,
}

impl SortBy {
    pub const ALL: [SortBy; 4] = [SortBy::Distance, SortBy::Rating, SortBy::Name, SortBy::Year];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::Distance => "distance",
            SortBy::Rating => "rating",
            SortBy::Name => "name",
            SortBy::Year => "year",
        }
    }

    /// Label shown in the sort dropdown.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SortBy::Distance => "Distance",
            SortBy::Rating => "Rating",
            SortBy::Name => "Name",
            SortBy::Year => "Year (Newest)",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortBy::ALL
            .into_iter()
            .find(|sort| sort.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown sort order \"{s}\""))
    }
}

/// The full set of search/filter/sort inputs.
///
/// `None` selectors correspond to the "All …" sentinels of the dropdowns.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParams {
    pub search_query: String,
    pub program: Option<String>,
    pub location_type: Option<String>,
    pub year: Option<i32>,
    pub sort_by: SortBy,
    pub max_distance_km: f64,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            search_query: String::new(),
            program: None,
            location_type: None,
            year: None,
            sort_by: SortBy::Distance,
            max_distance_km: MAX_DISTANCE_CEILING_KM,
        }
    }
}

/// One UI input event. Each variant maps 1:1 onto a [`FilterParams`] field;
/// selector values arrive as the dropdown strings, sentinels included.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterChange {
    Search(String),
    Program(String),
    LocationType(String),
    Year(String),
    SortBy(SortBy),
    MaxDistance(f64),
    Clear,
}

impl FilterParams {
    /// `true` iff any parameter differs from its default, sort order excluded.
    #[must_use]
    pub fn has_active_filters(&self) -> bool {
        !self.search_query.trim().is_empty()
            || self.program.is_some()
            || self.location_type.is_some()
            || self.year.is_some()
            || self.max_distance_km < MAX_DISTANCE_CEILING_KM
    }

    /// Trimmed, lower-cased search query; `None` when blank.
    #[must_use]
    pub fn normalized_query(&self) -> Option<String> {
        let trimmed = self.search_query.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
    }

    /// Applies one input event. A failed change leaves the parameters untouched.
    ///
    /// # Errors
    ///
    /// - [`CoreError::InvalidYear`] when a year selector is neither the
    ///   sentinel nor an integer.
    /// - [`CoreError::InvalidMaxDistance`] for a non-finite distance bound.
    pub fn apply(&mut self, change: FilterChange) -> Result<(), CoreError> {
        match change {
            FilterChange::Search(query) => self.search_query = query,
            FilterChange::Program(value) => self.program = selection(value, ALL_PROGRAMS),
            FilterChange::LocationType(value) => {
                self.location_type = selection(value, ALL_TYPES);
            }
            FilterChange::Year(value) => self.year = parse_year_selection(&value)?,
            FilterChange::SortBy(sort_by) => self.sort_by = sort_by,
            FilterChange::MaxDistance(km) => {
                if !km.is_finite() {
                    return Err(CoreError::InvalidMaxDistance(km));
                }
                self.max_distance_km = km.clamp(MIN_DISTANCE_KM, MAX_DISTANCE_CEILING_KM);
            }
            FilterChange::Clear => self.clear(),
        }
        Ok(())
    }

    /// Resets every field to its default in one assignment.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn selection(value: String, sentinel: &str) -> Option<String> {
    (value != sentinel).then_some(value)
}

fn parse_year_selection(value: &str) -> Result<Option<i32>, CoreError> {
    let trimmed = value.trim();
    if trimmed == ALL_YEARS {
        return Ok(None);
    }
    trimmed
        .parse::<i32>()
        .map(Some)
        .map_err(|_| CoreError::InvalidYear(value.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_inactive() {
        let params = FilterParams::default();
        assert!(!params.has_active_filters());
        assert_eq!(params.sort_by, SortBy::Distance);
        assert!((params.max_distance_km - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn whitespace_search_is_not_active() {
        let params = FilterParams {
            search_query: "   ".to_owned(),
            ..FilterParams::default()
        };
        assert!(!params.has_active_filters());
        assert!(params.normalized_query().is_none());
    }

    #[test]
    fn sort_change_alone_is_not_an_active_filter() {
        let mut params = FilterParams::default();
        params.apply(FilterChange::SortBy(SortBy::Name)).unwrap();
        assert!(!params.has_active_filters());
    }

    #[test]
    fn sentinel_selections_clear_the_selector() {
        let mut params = FilterParams::default();
        params
            .apply(FilterChange::Program("Fire safety".to_owned()))
            .unwrap();
        assert_eq!(params.program.as_deref(), Some("Fire safety"));
        params
            .apply(FilterChange::Program(ALL_PROGRAMS.to_owned()))
            .unwrap();
        assert!(params.program.is_none());

        params
            .apply(FilterChange::LocationType("riskZone".to_owned()))
            .unwrap();
        assert!(params.has_active_filters());
        params
            .apply(FilterChange::LocationType(ALL_TYPES.to_owned()))
            .unwrap();
        assert!(params.location_type.is_none());
    }

    #[test]
    fn year_selection_parses_integer() {
        let mut params = FilterParams::default();
        params.apply(FilterChange::Year("2566".to_owned())).unwrap();
        assert_eq!(params.year, Some(2566));
        params.apply(FilterChange::Year(ALL_YEARS.to_owned())).unwrap();
        assert_eq!(params.year, None);
    }

    #[test]
    fn invalid_year_leaves_params_untouched() {
        let mut params = FilterParams::default();
        params.apply(FilterChange::Year("2020".to_owned())).unwrap();
        let err = params
            .apply(FilterChange::Year("last year".to_owned()))
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidYear(_)));
        assert_eq!(params.year, Some(2020));
    }

    #[test]
    fn max_distance_is_clamped_to_slider_range() {
        let mut params = FilterParams::default();
        params.apply(FilterChange::MaxDistance(900.0)).unwrap();
        assert!((params.max_distance_km - 500.0).abs() < f64::EPSILON);
        params.apply(FilterChange::MaxDistance(2.0)).unwrap();
        assert!((params.max_distance_km - 10.0).abs() < f64::EPSILON);
        assert!(params.has_active_filters());
        assert!(params.apply(FilterChange::MaxDistance(f64::NAN)).is_err());
    }

    #[test]
    fn clear_resets_all_fields() {
        let mut params = FilterParams {
            search_query: "market".to_owned(),
            program: Some("Fire safety".to_owned()),
            location_type: Some("riskZone".to_owned()),
            year: Some(2023),
            sort_by: SortBy::Rating,
            max_distance_km: 50.0,
        };
        params.apply(FilterChange::Clear).unwrap();
        assert_eq!(params, FilterParams::default());
    }

    #[test]
    fn sort_by_parses_case_insensitively() {
        assert_eq!("Rating".parse::<SortBy>().unwrap(), SortBy::Rating);
        assert!("popularity".parse::<SortBy>().is_err());
    }
}
