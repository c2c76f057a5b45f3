pub mod app_config;
pub mod config;
pub mod distance;
pub mod error;
pub mod filter;
pub mod location;
pub mod map;
pub mod sync;

pub use app_config::{AppConfig, Environment, MapDefaults};
pub use config::{load_app_config, load_app_config_from_env};
pub use distance::{format_distance, haversine_km, parse_distance_km, validate_coordinates};
pub use error::{ConfigError, CoreError};
pub use filter::{
    filter_locations, FilterChange, FilterOptions, FilterParams, FilterStats, FilteredView,
    LocationFilter, SortBy,
};
pub use location::{Coordinates, ImageRef, Location, LocationId};
pub use map::{
    IconRegistry, LayerSelection, MarkerActivated, MarkerLayer, OverlayShape, TileLayerCatalog,
};
pub use sync::{FlyAnimation, MapSync, MapViewport, ViewportCommand};
