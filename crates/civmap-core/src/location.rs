//! Location records as the portal holds them in memory.
//!
//! A [`Location`] is a read-only value once fetched. The raw backend shapes
//! are converted into this type by the client crate; everything downstream
//! (filter engine, marker layer, synchronizer) only ever reads it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category tag for building-control records.
pub const KIND_BUILDING_CONTROL: &str = "buildingControl";
/// Category tag for risk-zone records.
pub const KIND_RISK_ZONE: &str = "riskZone";
/// Category tag for zoning-plan records.
pub const KIND_ZONING_PLAN: &str = "zoningPlan";

/// Placeholder distance for records the backend did not compute a distance for.
pub const PLACEHOLDER_DISTANCE: &str = "0 km";

/// Stable identifier of a location within one in-memory batch.
///
/// The backend sends ids as JSON numbers or strings; both are accepted and
/// kept in their textual form so `7` and `"7"` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LocationId(String);

impl LocationId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LocationId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<i64> for LocationId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for LocationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Int(i64),
            Float(f64),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Ok(Self(s)),
            RawId::Int(n) => Ok(Self(n.to_string())),
            RawId::Float(f) => Ok(Self(f.to_string())),
        }
    }
}

/// A latitude/longitude pair in degrees, serialized as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns `true` when both components are finite and inside the
    /// latitude/longitude ranges a map can place a marker at.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        crate::distance::validate_coordinates(self.lat, self.lng)
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(c: Coordinates) -> Self {
        [c.lat, c.lng]
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// One gallery entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    #[serde(default)]
    pub caption: Option<String>,
}

/// A facility or point of interest shown as a card and a map marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// `None` when the record carried no usable pair; such records are kept
    /// in lists but never get a marker.
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    /// Open enumeration: one of the `KIND_*` tags or a free-form program type.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub programs: Vec<String>,
    /// Display value formatted as `"<number> km"`.
    #[serde(default = "placeholder_distance")]
    pub distance: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub opening_hours: Option<String>,
    #[serde(default)]
    pub document_url: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

fn placeholder_distance() -> String {
    PLACEHOLDER_DISTANCE.to_owned()
}

impl Location {
    /// Minimal record with every optional field empty. Mostly useful for
    /// building fixtures.
    #[must_use]
    pub fn new(id: impl Into<LocationId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: String::new(),
            phone: None,
            coordinates: None,
            kind: String::new(),
            programs: Vec::new(),
            distance: placeholder_distance(),
            rating: 0.0,
            year: None,
            description: String::new(),
            opening_hours: None,
            document_url: None,
            image: None,
            images: Vec::new(),
        }
    }

    /// Distance in kilometers parsed from the display string, `None` when the
    /// string is malformed.
    #[must_use]
    pub fn distance_km(&self) -> Option<f64> {
        crate::distance::parse_distance_km(&self.distance)
    }
}
