//! Static GeoJSON overlays (zoning boundaries, road lines) drawn over the
//! tile layers.
//!
//! GeoJSON positions are `[lng, lat]`; every shape produced here is already
//! flipped to [`Coordinates`] (`lat`, `lng`).

use serde::{Deserialize, Serialize};

use crate::location::Coordinates;
use crate::CoreError;

/// Stroke color used when a feature carries none.
pub const DEFAULT_OVERLAY_COLOR: &str = "#ff0000";

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<Properties>,
}

#[derive(Debug, Default, Deserialize)]
struct Properties {
    #[serde(default)]
    color: Option<String>,
}

type Position = Vec<f64>;

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Polygon,
    Polyline,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayShape {
    pub kind: ShapeKind,
    /// Polygons carry one ring per entry (multi-polygons are flattened);
    /// polylines carry exactly one.
    pub rings: Vec<Vec<Coordinates>>,
    pub color: String,
}

/// Parses a GeoJSON `FeatureCollection` into drawable shapes. Features with
/// no geometry, an unsupported geometry type, or no usable positions are
/// dropped.
///
/// # Errors
///
/// Returns [`CoreError::InvalidOverlay`] if `json` is not a feature collection.
pub fn parse_overlay(json: &str) -> Result<Vec<OverlayShape>, CoreError> {
    let collection: FeatureCollection = serde_json::from_str(json)?;
    let total = collection.features.len();

    let shapes: Vec<OverlayShape> = collection
        .features
        .into_iter()
        .filter_map(|feature| {
            let color = feature
                .properties
                .and_then(|p| p.color)
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_OVERLAY_COLOR.to_owned());
            let geometry = feature.geometry?;
            let (kind, rings) = match geometry_rings(geometry) {
                Ok(Some(converted)) => converted,
                Ok(None) => return None,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping overlay feature with malformed coordinates");
                    return None;
                }
            };
            (!rings.is_empty()).then_some(OverlayShape { kind, rings, color })
        })
        .collect();

    tracing::debug!(features = total, shapes = shapes.len(), "parsed overlay");
    Ok(shapes)
}

fn geometry_rings(
    geometry: Geometry,
) -> Result<Option<(ShapeKind, Vec<Vec<Coordinates>>)>, serde_json::Error> {
    let converted = match geometry.kind.as_str() {
        "Polygon" => {
            let rings: Vec<Vec<Position>> = serde_json::from_value(geometry.coordinates)?;
            (ShapeKind::Polygon, flip_rings(rings))
        }
        "MultiPolygon" => {
            let polygons: Vec<Vec<Vec<Position>>> = serde_json::from_value(geometry.coordinates)?;
            (
                ShapeKind::Polygon,
                flip_rings(polygons.into_iter().flatten().collect()),
            )
        }
        "LineString" => {
            let line: Vec<Position> = serde_json::from_value(geometry.coordinates)?;
            (ShapeKind::Polyline, flip_rings(vec![line]))
        }
        _ => return Ok(None),
    };
    Ok(Some(converted))
}

fn flip_rings(rings: Vec<Vec<Position>>) -> Vec<Vec<Coordinates>> {
    rings
        .into_iter()
        .map(|ring| {
            ring.into_iter()
                .filter_map(|pos| match pos.as_slice() {
                    [lng, lat, ..] => Some(Coordinates::new(*lat, *lng)),
                    _ => None,
                })
                .collect::<Vec<_>>()
        })
        .filter(|ring| !ring.is_empty())
        .collect()
}

/// South-west and north-east corners enclosing every shape, `None` when
/// there is nothing to enclose.
#[must_use]
pub fn overlay_bounds(shapes: &[OverlayShape]) -> Option<(Coordinates, Coordinates)> {
    shapes
        .iter()
        .flat_map(|s| s.rings.iter().flatten())
        .fold(None, |acc, c| {
            Some(match acc {
                None => (*c, *c),
                Some((sw, ne)) => (
                    Coordinates::new(sw.lat.min(c.lat), sw.lng.min(c.lng)),
                    Coordinates::new(ne.lat.max(c.lat), ne.lng.max(c.lng)),
                ),
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "color": "#00ff00" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[99.60, 7.55], [99.62, 7.55], [99.62, 7.57], [99.60, 7.55]]]
                }
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[99.61, 7.56, 12.0], [99.65, 7.60]]
                }
            },
            {
                "type": "Feature",
                "properties": null,
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[99.0, 7.0], [99.1, 7.0], [99.1, 7.1]]],
                        [[[98.0, 8.0], [98.1, 8.0], [98.1, 8.1]]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": { "type": "Point", "coordinates": [99.6, 7.5] }
            },
            { "type": "Feature", "properties": {}, "geometry": null }
        ]
    }"##;

    #[test]
    fn converts_supported_geometries() {
        let shapes = parse_overlay(SAMPLE).unwrap();
        assert_eq!(shapes.len(), 3);

        assert_eq!(shapes[0].kind, ShapeKind::Polygon);
        assert_eq!(shapes[0].color, "#00ff00");
        assert_eq!(shapes[0].rings[0][1], Coordinates::new(7.55, 99.62));

        assert_eq!(shapes[1].kind, ShapeKind::Polyline);
        assert_eq!(shapes[1].color, DEFAULT_OVERLAY_COLOR);
        assert_eq!(shapes[1].rings, vec![vec![
            Coordinates::new(7.56, 99.61),
            Coordinates::new(7.60, 99.65)
        ]]);

        assert_eq!(shapes[2].kind, ShapeKind::Polygon);
        assert_eq!(shapes[2].rings.len(), 2, "multi-polygon rings are flattened");
    }

    #[test]
    fn bounds_cover_every_vertex() {
        let shapes = parse_overlay(SAMPLE).unwrap();
        let (sw, ne) = overlay_bounds(&shapes).unwrap();
        assert_eq!(sw, Coordinates::new(7.0, 98.0));
        assert_eq!(ne, Coordinates::new(8.1, 99.65));
        assert!(overlay_bounds(&[]).is_none());
    }

    #[test]
    fn rejects_non_json() {
        assert!(matches!(
            parse_overlay("not json"),
            Err(CoreError::InvalidOverlay(_))
        ));
    }
}
