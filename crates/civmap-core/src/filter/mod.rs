//! Client-side search, filtering, and sorting over the in-memory location list.
//!
//! The engine is a pure derivation: it never mutates the list it is given and
//! recomputes the whole view from the latest complete parameter set. The
//! search, program, type, year, and distance steps form a single conjunctive
//! predicate; sorting runs once afterwards and is stable for ties.

mod options;
mod params;

use std::cmp::Ordering;
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

use feruca::Collator;

pub use options::{FilterOptions, FilterStats, SortOption};
pub use params::{
    FilterChange, FilterParams, SortBy, ALL_PROGRAMS, ALL_TYPES, ALL_YEARS,
    MAX_DISTANCE_CEILING_KM, MIN_DISTANCE_KM,
};

use crate::location::Location;
use crate::CoreError;

/// Returns the locations matching every active filter, sorted per
/// `params.sort_by`.
#[must_use]
pub fn filter_locations<'a>(locations: &'a [Location], params: &FilterParams) -> Vec<&'a Location> {
    let query = params.normalized_query();
    let mut filtered: Vec<&Location> = locations
        .iter()
        .filter(|location| matches(location, params, query.as_deref()))
        .collect();
    match params.sort_by {
        SortBy::Name => {
            let mut collator = collator();
            filtered.sort_by(|a, b| collator.collate(a.name.as_str(), b.name.as_str()));
        }
        sort_by => filtered.sort_by(|a, b| compare(a, b, sort_by)),
    }
    filtered
}

/// The conjunctive predicate. `query` must already be trimmed and lower-cased.
fn matches(location: &Location, params: &FilterParams, query: Option<&str>) -> bool {
    if let Some(query) = query {
        if !matches_query(location, query) {
            return false;
        }
    }

    if let Some(program) = &params.program {
        if !location.programs.iter().any(|p| p == program) {
            return false;
        }
    }

    if let Some(kind) = &params.location_type {
        if location.kind != *kind {
            return false;
        }
    }

    if let Some(year) = params.year {
        if location.year != Some(year) {
            return false;
        }
    }

    // Unparseable distances never satisfy the bound.
    location
        .distance_km()
        .is_some_and(|km| km <= params.max_distance_km)
}

fn matches_query(location: &Location, query: &str) -> bool {
    let contains = |field: &str| field.to_lowercase().contains(query);
    contains(&location.name)
        || contains(&location.address)
        || contains(&location.description)
        || location.programs.iter().any(|p| contains(p))
}

fn compare(a: &Location, b: &Location, sort_by: SortBy) -> Ordering {
    match sort_by {
        SortBy::Distance => {
            let da = a.distance_km().unwrap_or(f64::INFINITY);
            let db = b.distance_km().unwrap_or(f64::INFINITY);
            da.total_cmp(&db)
        }
        SortBy::Rating => b.rating.total_cmp(&a.rating),
        SortBy::Name => locale_cmp(&a.name, &b.name),
        SortBy::Year => b.year.unwrap_or(0).cmp(&a.year.unwrap_or(0)),
    }
}

/// Unicode Collation Algorithm collator with the CLDR root tailoring.
static COLLATOR: LazyLock<Mutex<Collator>> = LazyLock::new(|| Mutex::new(Collator::default()));

fn collator() -> MutexGuard<'static, Collator> {
    COLLATOR.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Locale-aware ordering of display names: accents are secondary to base
/// letters (`"école"` sorts before `"fable"`) and Thai pre-posed vowels sort
/// by the consonant they precede (`"เกาะ"` before `"ขนอม"`).
///
/// Takes the shared collator lock per call; sorting a whole list goes
/// through [`filter_locations`], which takes it once.
#[must_use]
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    collator().collate(a, b)
}

/// Filtered, sorted subset plus its statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView<'a> {
    pub locations: Vec<&'a Location>,
    pub stats: FilterStats,
}

/// Filter state owned by the view: the current parameters and the option
/// sets derived from the last location list it was shown.
#[derive(Debug, Clone, Default)]
pub struct LocationFilter {
    params: FilterParams,
    options: FilterOptions,
}

impl LocationFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_params(params: FilterParams) -> Self {
        Self {
            params,
            options: FilterOptions::default(),
        }
    }

    #[must_use]
    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    #[must_use]
    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// Recomputes the dropdown option sets from the full, unfiltered list.
    /// Call whenever the location list changes.
    pub fn set_locations(&mut self, locations: &[Location]) {
        self.options = FilterOptions::from_locations(locations);
    }

    /// Applies one UI input event.
    ///
    /// # Errors
    ///
    /// Propagates [`FilterParams::apply`] errors; the parameters are left
    /// unchanged on error.
    pub fn apply(&mut self, change: FilterChange) -> Result<(), CoreError> {
        self.params.apply(change)
    }

    /// Resets all six parameters at once.
    pub fn clear_filters(&mut self) {
        self.params.clear();
    }

    #[must_use]
    pub fn view<'a>(&self, locations: &'a [Location]) -> FilteredView<'a> {
        let filtered = filter_locations(locations, &self.params);
        let stats = FilterStats {
            total: locations.len(),
            filtered: filtered.len(),
            has_active_filters: self.params.has_active_filters(),
        };
        FilteredView {
            locations: filtered,
            stats,
        }
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
