//! Selection/map synchronization.
//!
//! [`MapSync`] is the single writer of the selected location and the only
//! component that issues positioning commands to the map. Card clicks call
//! [`MapSync::select_location`] directly; marker clicks arrive as
//! [`MarkerActivated`] events and are routed through the same method.

use std::time::Duration;

use crate::app_config::MapDefaults;
use crate::location::{Coordinates, Location, LocationId};
use crate::map::MarkerActivated;
use crate::CoreError;

/// Parameters of an animated viewport transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyAnimation {
    pub duration: Duration,
    pub ease_linearity: f64,
}

/// A request to move the map. Last write wins; commands are never queued.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportCommand {
    pub center: Coordinates,
    pub zoom: u8,
    /// `None` means snap immediately.
    pub animation: Option<FlyAnimation>,
}

/// Positioning capability exposed by a constructed map instance.
pub trait MapViewport {
    /// Whether the map can fly between viewports instead of snapping.
    fn supports_animation(&self) -> bool;

    fn set_viewport(&mut self, command: &ViewportCommand);
}

#[derive(Debug)]
pub struct MapSync<V> {
    selected: Option<LocationId>,
    viewport: Option<V>,
    defaults: MapDefaults,
}

impl<V: MapViewport> MapSync<V> {
    #[must_use]
    pub fn new(defaults: MapDefaults) -> Self {
        Self {
            selected: None,
            viewport: None,
            defaults,
        }
    }

    /// Where a freshly constructed map opens: the configured center at the
    /// initial zoom, snapped.
    #[must_use]
    pub fn initial_viewport(&self) -> ViewportCommand {
        ViewportCommand {
            center: self.defaults.center,
            zoom: self.defaults.initial_zoom,
            animation: None,
        }
    }

    /// `true` once a map instance has been attached.
    #[must_use]
    pub fn map_ready(&self) -> bool {
        self.viewport.is_some()
    }

    /// One-time "map constructed" callback. Attaching does not reposition the
    /// map to an earlier selection; the next selection does.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MapAlreadyAttached`] if a map is already attached;
    /// the existing instance is kept.
    pub fn attach_map(&mut self, viewport: V) -> Result<(), CoreError> {
        if self.viewport.is_some() {
            return Err(CoreError::MapAlreadyAttached);
        }
        tracing::debug!(animated = viewport.supports_animation(), "map instance ready");
        self.viewport = Some(viewport);
        Ok(())
    }

    /// Tears down the current map instance, returning it to the caller.
    pub fn detach_map(&mut self) -> Option<V> {
        self.viewport.take()
    }

    #[must_use]
    pub fn viewport(&self) -> Option<&V> {
        self.viewport.as_ref()
    }

    #[must_use]
    pub fn selected_id(&self) -> Option<&LocationId> {
        self.selected.as_ref()
    }

    /// Resolves the current selection against `locations`. Returns `None`
    /// when nothing is selected or the record is no longer in the list.
    #[must_use]
    pub fn selected<'a>(&self, locations: &'a [Location]) -> Option<&'a Location> {
        let id = self.selected.as_ref()?;
        locations.iter().find(|l| &l.id == id)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Records `location` as selected and, if the map is ready, moves the
    /// viewport onto it at the focus zoom. Calling twice with the same
    /// location yields the same final viewport.
    pub fn select_location(&mut self, location: &Location) {
        self.selected = Some(location.id.clone());

        let Some(viewport) = self.viewport.as_mut() else {
            tracing::debug!(id = %location.id, "map not ready; selection recorded only");
            return;
        };

        let Some(center) = location.coordinates.filter(Coordinates::is_valid) else {
            tracing::warn!(id = %location.id, "selected location has no usable coordinates");
            return;
        };

        let animation = viewport.supports_animation().then_some(FlyAnimation {
            duration: self.defaults.fly_duration,
            ease_linearity: self.defaults.ease_linearity,
        });
        let command = ViewportCommand {
            center,
            zoom: self.defaults.focus_zoom,
            animation,
        };
        tracing::debug!(id = %location.id, %center, zoom = command.zoom, "repositioning map");
        viewport.set_viewport(&command);
    }

    /// Marker-click path. Looks the clicked marker up in `locations` and
    /// hands it to [`Self::select_location`]. Returns `false` if the marker
    /// refers to a record that is no longer listed.
    pub fn handle_marker_event(&mut self, event: &MarkerActivated, locations: &[Location]) -> bool {
        match locations.iter().find(|l| l.id == event.id) {
            Some(location) => {
                self.select_location(location);
                true
            }
            None => {
                tracing::warn!(id = %event.id, "marker activated for unknown location");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct RecordingViewport {
        animated: bool,
        commands: Vec<ViewportCommand>,
    }

    impl MapViewport for RecordingViewport {
        fn supports_animation(&self) -> bool {
            self.animated
        }

        fn set_viewport(&mut self, command: &ViewportCommand) {
            self.commands.push(*command);
        }
    }

    fn place(id: i64, lat: f64, lng: f64) -> Location {
        Location {
            coordinates: Some(Coordinates::new(lat, lng)),
            ..Location::new(id, format!("place {id}"))
        }
    }

    fn commands(sync: &MapSync<RecordingViewport>) -> &[ViewportCommand] {
        sync
            .viewport()
            .map(|v| v.commands.as_slice())
            .unwrap_or_default()
    }

    #[test]
    fn selection_before_ready_issues_no_command() {
        let mut sync = MapSync::<RecordingViewport>::new(MapDefaults::default());
        let a = place(1, 7.55, 99.61);

        sync.select_location(&a);
        assert_eq!(sync.selected_id(), Some(&a.id));
        assert!(!sync.map_ready());

        sync.attach_map(RecordingViewport::default()).unwrap();
        assert!(sync.map_ready());
        assert!(commands(&sync).is_empty(), "attaching must not reposition");

        sync.select_location(&a);
        assert_eq!(commands(&sync).len(), 1);
        assert_eq!(commands(&sync)[0].center, Coordinates::new(7.55, 99.61));
        assert_eq!(commands(&sync)[0].zoom, 18);
    }

    #[test]
    fn snaps_without_animation_capability() {
        let mut sync = MapSync::new(MapDefaults::default());
        sync.attach_map(RecordingViewport::default()).unwrap();
        sync.select_location(&place(1, 7.0, 99.0));
        assert!(commands(&sync)[0].animation.is_none());
    }

    #[test]
    fn flies_when_animation_is_supported() {
        let mut sync = MapSync::new(MapDefaults::default());
        sync.attach_map(RecordingViewport {
            animated: true,
            ..RecordingViewport::default()
        })
        .unwrap();
        sync.select_location(&place(1, 7.0, 99.0));
        let animation = commands(&sync)[0].animation.expect("animated command");
        assert_eq!(animation.duration, Duration::from_millis(1500));
        assert!((animation.ease_linearity - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn reselecting_is_idempotent() {
        let mut sync = MapSync::new(MapDefaults::default());
        sync.attach_map(RecordingViewport::default()).unwrap();
        let a = place(1, 7.0, 99.0);
        sync.select_location(&a);
        sync.select_location(&a);
        let issued = commands(&sync);
        assert_eq!(issued.len(), 2);
        assert_eq!(issued[0], issued[1]);
    }

    #[test]
    fn last_selection_wins() {
        let mut sync = MapSync::new(MapDefaults::default());
        sync.attach_map(RecordingViewport::default()).unwrap();
        let a = place(1, 7.0, 99.0);
        let b = place(2, 8.0, 98.0);
        sync.select_location(&a);
        sync.select_location(&b);
        assert_eq!(sync.selected_id(), Some(&b.id));
        assert_eq!(
            commands(&sync).last().map(|c| c.center),
            Some(Coordinates::new(8.0, 98.0))
        );
    }

    #[test]
    fn marker_click_goes_through_the_same_path() {
        let locations = vec![place(1, 7.0, 99.0), place(2, 8.0, 98.0)];
        let mut sync = MapSync::new(MapDefaults::default());
        sync.attach_map(RecordingViewport::default()).unwrap();

        let event = MarkerActivated {
            id: LocationId::from(2),
            coordinates: Coordinates::new(8.0, 98.0),
        };
        assert!(sync.handle_marker_event(&event, &locations));
        assert_eq!(sync.selected(&locations).map(|l| l.name.as_str()), Some("place 2"));
        assert_eq!(commands(&sync).len(), 1);
        assert_eq!(commands(&sync)[0].zoom, 18);
    }

    #[test]
    fn unknown_marker_is_ignored() {
        let locations = vec![place(1, 7.0, 99.0)];
        let mut sync = MapSync::new(MapDefaults::default());
        sync.attach_map(RecordingViewport::default()).unwrap();
        let event = MarkerActivated {
            id: LocationId::from(99),
            coordinates: Coordinates::new(0.0, 0.0),
        };
        assert!(!sync.handle_marker_event(&event, &locations));
        assert!(sync.selected_id().is_none());
        assert!(commands(&sync).is_empty());
    }

    #[test]
    fn missing_coordinates_record_selection_only() {
        let mut sync = MapSync::new(MapDefaults::default());
        sync.attach_map(RecordingViewport::default()).unwrap();
        let bare = Location::new(5, "no coordinates");
        sync.select_location(&bare);
        assert_eq!(sync.selected_id(), Some(&bare.id));
        assert!(commands(&sync).is_empty());
    }

    #[test]
    fn second_attach_is_rejected() {
        let mut sync = MapSync::new(MapDefaults::default());
        sync.attach_map(RecordingViewport::default()).unwrap();
        let err = sync.attach_map(RecordingViewport::default()).unwrap_err();
        assert!(matches!(err, CoreError::MapAlreadyAttached));

        assert!(sync.detach_map().is_some());
        assert!(!sync.map_ready());
        sync.attach_map(RecordingViewport::default()).unwrap();
    }

    #[test]
    fn initial_viewport_is_the_configured_center() {
        let sync = MapSync::<RecordingViewport>::new(MapDefaults::default());
        let initial = sync.initial_viewport();
        assert_eq!(initial.center, Coordinates::new(7.5611, 99.6111));
        assert_eq!(initial.zoom, 11);
        assert!(initial.animation.is_none());
    }

    #[test]
    fn focus_zoom_follows_config() {
        let defaults = MapDefaults {
            focus_zoom: 15,
            ..MapDefaults::default()
        };
        let mut sync = MapSync::new(defaults);
        sync.attach_map(RecordingViewport::default()).unwrap();
        sync.select_location(&place(1, 7.0, 99.0));
        assert_eq!(commands(&sync)[0].zoom, 15);
    }
}
