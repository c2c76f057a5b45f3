//! Map-side building blocks that do not depend on a renderer: tile layers,
//! marker icons, the marker layer, and GeoJSON overlays.

pub mod icons;
pub mod layers;
pub mod markers;
pub mod overlay;

pub use icons::{IconRegistry, MarkerIcon};
pub use layers::{load_tile_layers, parse_tile_layers, LayerSelection, TileLayer, TileLayerCatalog};
pub use markers::{Marker, MarkerActivated, MarkerLayer};
pub use overlay::{overlay_bounds, parse_overlay, OverlayShape, ShapeKind, DEFAULT_OVERLAY_COLOR};
