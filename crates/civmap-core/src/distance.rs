//! Distance parsing, formatting, and great-circle math.

use std::sync::LazyLock;

use regex::Regex;

use crate::location::Coordinates;

/// Mean Earth radius used by [`haversine_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

static DISTANCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*([+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:e[+-]?\d+)?)\s*(?:km)?\s*$")
        .expect("distance regex is valid")
});

/// Parses a display distance such as `"3.2 km"` into kilometers.
///
/// The unit suffix is optional (`"12"` parses as 12 km). Returns `None` for
/// anything else, including values that would overflow to infinity. Callers
/// treat `None` as "exclude from distance filtering".
#[must_use]
pub fn parse_distance_km(distance: &str) -> Option<f64> {
    let caps = DISTANCE_RE.captures(distance)?;
    let km = caps.get(1)?.as_str().parse::<f64>().ok()?;
    km.is_finite().then_some(km)
}

/// Formats kilometers for display: whole meters below 1 km (`"350m"`),
/// one-decimal kilometers otherwise (`"3.2km"`).
#[must_use]
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        #[allow(clippy::cast_possible_truncation)]
        let meters = (km * 1000.0).round() as i64;
        format!("{meters}m")
    } else {
        format!("{km:.1}km")
    }
}

/// Great-circle distance between two points in kilometers.
#[must_use]
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Returns `true` when `lat` is within [-90, 90] and `lng` within [-180, 180].
#[must_use]
pub fn validate_coordinates(lat: f64, lng: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)
}
