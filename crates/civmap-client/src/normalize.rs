//! Normalization from raw backend records to [`civmap_core::Location`].
//!
//! Two shapes arrive from the upstream API. Map-point records carry flat
//! `latitude`/`longitude` columns plus an optional nested `buildingControl`
//! object; portal records already look like a [`Location`]. Both end up in
//! the same type, with defaults filled in for anything missing.

use chrono::Datelike;
use civmap_core::location::PLACEHOLDER_DISTANCE;
use civmap_core::{Coordinates, ImageRef, Location, LocationId};
use serde_json::{Map, Value};

use crate::error::ClientError;

const UNKNOWN: &str = "Unknown";
const ADDRESS_PARTS: [&str; 6] = [
    "house_no",
    "road",
    "subdistrict",
    "district",
    "province",
    "postcode",
];

/// Normalizes every record, dropping (and logging) the ones that cannot be
/// converted. Map-point records without a year get the current year.
#[must_use]
pub fn normalize_records(records: &[Value]) -> Vec<Location> {
    let current_year = chrono::Local::now().year();
    records
        .iter()
        .filter_map(|record| match normalize_record(record, current_year) {
            Ok(location) => Some(location),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed location record");
                None
            }
        })
        .collect()
}

/// Normalizes one raw record.
///
/// # Errors
///
/// Returns [`ClientError::Normalization`] if the record is not an object or
/// has no usable `id`.
pub fn normalize_record(record: &Value, current_year: i32) -> Result<Location, ClientError> {
    let obj = record.as_object().ok_or_else(|| ClientError::Normalization {
        reason: format!("expected an object, got {}", kind_of(record)),
    })?;
    let id = obj
        .get("id")
        .and_then(parse_id)
        .ok_or_else(|| ClientError::Normalization {
            reason: "record has no usable id".to_owned(),
        })?;

    let lat = obj.get("latitude").and_then(number);
    let lng = obj.get("longitude").and_then(number);
    match (lat, lng) {
        (Some(lat), Some(lng)) if lat != 0.0 && lng != 0.0 => {
            Ok(from_map_point(obj, id, Coordinates::new(lat, lng), current_year))
        }
        _ => Ok(from_portal(obj, id)),
    }
}

fn from_map_point(
    obj: &Map<String, Value>,
    id: LocationId,
    coordinates: Coordinates,
    current_year: i32,
) -> Location {
    let building = obj.get("buildingControl").and_then(Value::as_object);
    let building_field = |name: &str| {
        building
            .and_then(|b| b.get(name))
            .and_then(text)
            .unwrap_or_else(|| UNKNOWN.to_owned())
    };
    let building_type = building_field("building_type");
    let use_purpose = building_field("use_purpose");
    let year = building
        .and_then(|b| b.get("year"))
        .and_then(parse_year)
        .unwrap_or(current_year);

    let address = ADDRESS_PARTS
        .iter()
        .filter_map(|key| obj.get(*key).and_then(text))
        .collect::<Vec<_>>()
        .join(" ");

    Location {
        address,
        coordinates: Some(coordinates).filter(Coordinates::is_valid),
        kind: building_type.clone(),
        description: format!("Building type: {building_type}, purpose: {use_purpose}"),
        programs: vec![building_type, use_purpose],
        year: Some(year),
        ..Location::new(id, obj.get("name_local").and_then(text).unwrap_or_default())
    }
}

fn from_portal(obj: &Map<String, Value>, id: LocationId) -> Location {
    let string = |key: &str| obj.get(key).and_then(text);

    let distance = match obj.get("distance") {
        Some(Value::Number(n)) => format!("{n} km"),
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => PLACEHOLDER_DISTANCE.to_owned(),
    };

    let programs = obj
        .get("programs")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(text).collect())
        .unwrap_or_default();

    let images = obj
        .get("images")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(image_ref).collect())
        .unwrap_or_default();

    let year = obj
        .get("year")
        .and_then(parse_year)
        .or_else(|| obj.get("establishedYear").and_then(parse_year));

    Location {
        address: string("address").unwrap_or_default(),
        phone: string("phone"),
        coordinates: obj.get("coordinates").and_then(coordinate_pair),
        kind: string("type").unwrap_or_default(),
        programs,
        distance,
        rating: obj.get("rating").and_then(number).unwrap_or(0.0),
        year,
        description: string("description").unwrap_or_default(),
        opening_hours: string("openingHours"),
        document_url: string("documentUrl"),
        image: string("image"),
        images,
        ..Location::new(id, string("name").unwrap_or_default())
    }
}

fn parse_id(value: &Value) -> Option<LocationId> {
    match value {
        Value::Number(n) => Some(LocationId::new(n.to_string())),
        Value::String(s) if !s.trim().is_empty() => Some(LocationId::new(s.trim())),
        _ => None,
    }
}

/// Non-blank string, or a number rendered as text (house numbers and
/// postcodes often arrive as numbers).
fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

/// A non-zero calendar year from a number or numeric string.
fn parse_year(value: &Value) -> Option<i32> {
    let n = match value {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    i32::try_from(n).ok().filter(|y| *y != 0)
}

/// `[lat, lng]` or `{lat, lng}`; anything else, or an out-of-range pair,
/// yields `None`.
fn coordinate_pair(value: &Value) -> Option<Coordinates> {
    let coordinates = match value {
        Value::Array(items) => match items.as_slice() {
            [lat, lng] => Coordinates::new(number(lat)?, number(lng)?),
            _ => return None,
        },
        Value::Object(obj) => {
            Coordinates::new(obj.get("lat").and_then(number)?, obj.get("lng").and_then(number)?)
        }
        _ => return None,
    };
    Some(coordinates).filter(Coordinates::is_valid)
}

fn image_ref(value: &Value) -> Option<ImageRef> {
    let obj = value.as_object()?;
    Some(ImageRef {
        url: obj.get("url").and_then(text)?,
        caption: obj.get("caption").and_then(text),
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
