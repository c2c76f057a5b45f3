//! Tile-layer catalog and the base/overlay selection state of the layer control.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, CoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    /// Lookup key used by the layer control.
    pub key: String,
    /// Label shown to the user.
    pub name: String,
    /// URL template with `{s}`, `{z}`, `{x}`, `{y}` (and optionally `{r}`) placeholders.
    pub url: String,
    pub attribution: String,
    #[serde(default)]
    pub opacity: Option<f64>,
}

impl TileLayer {
    /// Opacity to render with; layers without one are opaque.
    #[must_use]
    pub fn effective_opacity(&self) -> f64 {
        self.opacity.unwrap_or(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayerCatalog {
    pub default_base: String,
    pub base_layers: Vec<TileLayer>,
    #[serde(default)]
    pub overlay_layers: Vec<TileLayer>,
}

fn layer(key: &str, name: &str, url: &str, attribution: &str, opacity: Option<f64>) -> TileLayer {
    TileLayer {
        key: key.to_owned(),
        name: name.to_owned(),
        url: url.to_owned(),
        attribution: attribution.to_owned(),
        opacity,
    }
}

const OSM_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";
const CARTO_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors &copy; <a href=\"https://carto.com/attributions\">CARTO</a>";

impl TileLayerCatalog {
    /// The catalog shipped with the portal (mirrors `config/tile_layers.yaml`).
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            default_base: "OpenStreetMap".to_owned(),
            base_layers: vec![
                layer(
                    "OpenStreetMap",
                    "OpenStreetMap",
                    "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
                    OSM_ATTRIBUTION,
                    None,
                ),
                layer(
                    "CartoDB Positron",
                    "CartoDB Positron",
                    "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png",
                    CARTO_ATTRIBUTION,
                    None,
                ),
                layer(
                    "CartoDB Dark",
                    "CartoDB Dark",
                    "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png",
                    CARTO_ATTRIBUTION,
                    None,
                ),
                layer(
                    "Stamen Terrain",
                    "Stamen Terrain",
                    "https://stamen-tiles-{s}.a.ssl.fastly.net/terrain/{z}/{x}/{y}{r}.png",
                    "Map tiles by <a href=\"http://stamen.com\">Stamen Design</a> (CC BY 3.0), map data &copy; OpenStreetMap",
                    None,
                ),
            ],
            overlay_layers: vec![
                layer(
                    "OpenStreetMap Overlay",
                    "OSM Overlay",
                    "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
                    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a>",
                    Some(0.3),
                ),
                layer(
                    "Satellite",
                    "Satellite",
                    "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
                    "Tiles © Esri & partners",
                    Some(0.7),
                ),
            ],
        }
    }

    #[must_use]
    pub fn base(&self, key: &str) -> Option<&TileLayer> {
        self.base_layers.iter().find(|l| l.key == key)
    }

    #[must_use]
    pub fn overlay(&self, key: &str) -> Option<&TileLayer> {
        self.overlay_layers.iter().find(|l| l.key == key)
    }
}

impl Default for TileLayerCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Load and validate a tile-layer catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_tile_layers(path: &Path) -> Result<TileLayerCatalog, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LayersFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_tile_layers(&content)
}

/// Parse and validate a tile-layer catalog from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_tile_layers(yaml: &str) -> Result<TileLayerCatalog, ConfigError> {
    let catalog: TileLayerCatalog = serde_yaml::from_str(yaml)?;
    validate_tile_layers(&catalog)?;
    Ok(catalog)
}

fn validate_tile_layers(catalog: &TileLayerCatalog) -> Result<(), ConfigError> {
    if catalog.base_layers.is_empty() {
        return Err(ConfigError::Validation(
            "at least one base layer is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for layer in catalog.base_layers.iter().chain(&catalog.overlay_layers) {
        if layer.key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "tile layer key must be non-empty".to_string(),
            ));
        }
        if !seen.insert(layer.key.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate tile layer key: '{}'",
                layer.key
            )));
        }
        if !layer.url.contains("{z}") {
            return Err(ConfigError::Validation(format!(
                "tile layer '{}' url has no {{z}} placeholder",
                layer.key
            )));
        }
        if let Some(opacity) = layer.opacity {
            if !(0.0..=1.0).contains(&opacity) {
                return Err(ConfigError::Validation(format!(
                    "tile layer '{}' has opacity {opacity}; must be within 0..=1",
                    layer.key
                )));
            }
        }
    }

    if catalog.base(&catalog.default_base).is_none() {
        return Err(ConfigError::Validation(format!(
            "default_base '{}' is not a base layer",
            catalog.default_base
        )));
    }

    Ok(())
}

/// Which base layer is shown and which overlays are switched on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSelection {
    base: String,
    overlays: BTreeSet<String>,
}

impl LayerSelection {
    /// Starts on the catalog's default base layer with no overlays.
    #[must_use]
    pub fn new(catalog: &TileLayerCatalog) -> Self {
        Self {
            base: catalog.default_base.clone(),
            overlays: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn base_key(&self) -> &str {
        &self.base
    }

    pub fn overlay_keys(&self) -> impl Iterator<Item = &str> {
        self.overlays.iter().map(String::as_str)
    }

    /// # Errors
    ///
    /// Returns [`CoreError::UnknownLayer`] if `key` is not a base layer.
    pub fn select_base(&mut self, catalog: &TileLayerCatalog, key: &str) -> Result<(), CoreError> {
        if catalog.base(key).is_none() {
            return Err(CoreError::UnknownLayer(key.to_owned()));
        }
        key.clone_into(&mut self.base);
        Ok(())
    }

    /// Flips an overlay on or off and returns whether it is now enabled.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownLayer`] if `key` is not an overlay layer.
    pub fn toggle_overlay(
        &mut self,
        catalog: &TileLayerCatalog,
        key: &str,
    ) -> Result<bool, CoreError> {
        if catalog.overlay(key).is_none() {
            return Err(CoreError::UnknownLayer(key.to_owned()));
        }
        if self.overlays.remove(key) {
            Ok(false)
        } else {
            self.overlays.insert(key.to_owned());
            Ok(true)
        }
    }

    /// Layers to render, bottom first: the base, then enabled overlays in
    /// catalog order.
    #[must_use]
    pub fn active_layers<'a>(&self, catalog: &'a TileLayerCatalog) -> Vec<&'a TileLayer> {
        catalog
            .base(&self.base)
            .into_iter()
            .chain(
                catalog
                    .overlay_layers
                    .iter()
                    .filter(|l| self.overlays.contains(&l.key)),
            )
            .collect()
    }
}
