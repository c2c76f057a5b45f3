//! Marker layer built from the filtered location list.

use serde::Serialize;

use super::icons::{IconRegistry, MarkerIcon};
use crate::location::{Coordinates, Location, LocationId};

/// Emitted when the user clicks a marker. Carries only identity and
/// position; the selection itself is made by [`crate::MapSync`].
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerActivated {
    pub id: LocationId,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub id: LocationId,
    pub position: Coordinates,
    pub title: String,
    pub icon: MarkerIcon,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerLayer {
    pub markers: Vec<Marker>,
    /// Records left off the map because their coordinates were missing or
    /// out of range.
    pub skipped: usize,
}

impl MarkerLayer {
    /// One marker per location with valid coordinates, in input order.
    #[must_use]
    pub fn build<'a, I>(locations: I, icons: &IconRegistry) -> Self
    where
        I: IntoIterator<Item = &'a Location>,
    {
        let mut layer = Self::default();
        for location in locations {
            match location.coordinates.filter(Coordinates::is_valid) {
                Some(position) => layer.markers.push(Marker {
                    id: location.id.clone(),
                    position,
                    title: location.name.clone(),
                    icon: icons.icon_for(&location.kind).clone(),
                }),
                None => {
                    tracing::debug!(id = %location.id, "skipping marker without valid coordinates");
                    layer.skipped += 1;
                }
            }
        }
        layer
    }

    #[must_use]
    pub fn get(&self, id: &LocationId) -> Option<&Marker> {
        self.markers.iter().find(|m| &m.id == id)
    }

    /// Simulates a click on the marker for `id`.
    #[must_use]
    pub fn activate(&self, id: &LocationId) -> Option<MarkerActivated> {
        self.get(id).map(|m| MarkerActivated {
            id: m.id.clone(),
            coordinates: m.position,
        })
    }
}
