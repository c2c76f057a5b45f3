//! Map-layer command handlers: tile layers, GeoJSON overlays, and distances.

use std::path::Path;

use civmap_core::map::{load_tile_layers, overlay_bounds, parse_overlay, ShapeKind, TileLayer};
use civmap_core::{
    format_distance, haversine_km, validate_coordinates, AppConfig, Coordinates, LayerSelection,
    TileLayerCatalog,
};

/// The configured catalog, or the built-in one when `CIVMAP_LAYERS_PATH` is unset.
fn catalog(config: &AppConfig) -> anyhow::Result<TileLayerCatalog> {
    match &config.layers_path {
        Some(path) => Ok(load_tile_layers(path)?),
        None => Ok(TileLayerCatalog::builtin()),
    }
}

fn layer_row(layer: &TileLayer, active: bool) -> String {
    format!(
        "{:<3}{:<24}{:<24}{:<9.2}{}",
        if active { "*" } else { "" },
        layer.key,
        layer.name,
        layer.effective_opacity(),
        layer.url
    )
}

/// Print the tile-layer catalog, marking the layers a selection would render.
///
/// `base` switches the base layer and each key in `overlays` is toggled, in
/// order, starting from the catalog default.
///
/// # Errors
///
/// Returns an error if the catalog file is invalid or a key is unknown.
pub(crate) fn run_layers(
    config: &AppConfig,
    base: Option<&str>,
    overlays: &[String],
) -> anyhow::Result<()> {
    let catalog = catalog(config)?;
    let mut selection = LayerSelection::new(&catalog);
    if let Some(key) = base {
        selection.select_base(&catalog, key)?;
    }
    for key in overlays {
        selection.toggle_overlay(&catalog, key)?;
    }
    let active: Vec<&str> = selection
        .active_layers(&catalog)
        .into_iter()
        .map(|l| l.key.as_str())
        .collect();

    let header = format!("{:<3}{:<24}{:<24}{:<9}URL", "", "KEY", "NAME", "OPACITY");
    println!("Base layers");
    println!("{header}");
    for layer in &catalog.base_layers {
        println!("{}", layer_row(layer, active.contains(&layer.key.as_str())));
    }
    println!();
    println!("Overlays");
    println!("{header}");
    for layer in &catalog.overlay_layers {
        println!("{}", layer_row(layer, active.contains(&layer.key.as_str())));
    }
    println!();
    println!("Render order: {}", active.join(" > "));

    Ok(())
}

/// Summarize a GeoJSON overlay: shape counts, colors, and bounds.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a feature collection.
pub(crate) fn run_overlay(file: &Path) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", file.display()))?;
    let shapes = parse_overlay(&json)?;

    let polygons = shapes
        .iter()
        .filter(|s| s.kind == ShapeKind::Polygon)
        .count();
    let polylines = shapes.len() - polygons;
    let points: usize = shapes
        .iter()
        .flat_map(|s| s.rings.iter())
        .map(Vec::len)
        .sum();

    println!("{}", file.display());
    println!("Shapes:    {} ({polygons} polygons, {polylines} polylines)", shapes.len());
    println!("Vertices:  {points}");

    let mut colors: Vec<&str> = shapes.iter().map(|s| s.color.as_str()).collect();
    colors.sort_unstable();
    colors.dedup();
    if !colors.is_empty() {
        println!("Colors:    {}", colors.join(", "));
    }

    match overlay_bounds(&shapes) {
        Some((south_west, north_east)) => {
            println!("Bounds:    SW {south_west} / NE {north_east}");
        }
        None => println!("Bounds:    \u{2014}"),
    }

    Ok(())
}

/// Print the great-circle distance between two points.
///
/// # Errors
///
/// Returns an error if either point is outside the valid coordinate ranges.
pub(crate) fn run_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> anyhow::Result<()> {
    for (lat, lng) in [(lat1, lng1), (lat2, lng2)] {
        if !validate_coordinates(lat, lng) {
            anyhow::bail!("invalid coordinates {lat}, {lng}");
        }
    }
    let km = haversine_km(Coordinates::new(lat1, lng1), Coordinates::new(lat2, lng2));
    println!("{} ({km:.3} km)", format_distance(km));
    Ok(())
}
