//! Location list command handlers for the CLI.
//!
//! Every handler builds a [`LocationStore`] over the configured relay, loads
//! the list through it, and derives what it prints with the filter engine or
//! the selection synchronizer from `civmap_core`.

use civmap_client::{LocationStore, PortalApi, RelayClient};
use civmap_core::{
    AppConfig, FilterChange, IconRegistry, Location, LocationFilter, LocationId, MapSync,
    MapViewport, MarkerLayer, SortBy,
};
use clap::Args;

use crate::viewport::{describe, TerminalViewport};

/// Search, filter, and paging flags of `list`.
#[derive(Debug, Args)]
pub(crate) struct ListArgs {
    /// Search term (backend search, with client-side fallback)
    #[arg(long)]
    pub search: Option<String>,
    /// Only show locations offering this program
    #[arg(long)]
    pub program: Option<String>,
    /// Only show locations of this type (e.g., riskZone)
    #[arg(long = "type")]
    pub location_type: Option<String>,
    /// Only show locations from this year
    #[arg(long)]
    pub year: Option<i32>,
    /// Sort order: distance, rating, name, or year
    #[arg(long, default_value_t = SortBy::Distance)]
    pub sort: SortBy,
    /// Maximum distance in km (clamped to 10..=500)
    #[arg(long)]
    pub max_distance: Option<f64>,
    /// Keep loading pages until the last one
    #[arg(long)]
    pub all_pages: bool,
    /// Page size (defaults to `CIVMAP_PAGE_SIZE`)
    #[arg(long)]
    pub limit: Option<u32>,
}

impl ListArgs {
    /// The filter-engine events this invocation stands for, in the order a
    /// user would produce them.
    fn filter_changes(&self) -> Vec<FilterChange> {
        let mut changes = Vec::new();
        if let Some(search) = &self.search {
            changes.push(FilterChange::Search(search.clone()));
        }
        if let Some(program) = &self.program {
            changes.push(FilterChange::Program(program.clone()));
        }
        if let Some(kind) = &self.location_type {
            changes.push(FilterChange::LocationType(kind.clone()));
        }
        if let Some(year) = self.year {
            changes.push(FilterChange::Year(year.to_string()));
        }
        changes.push(FilterChange::SortBy(self.sort));
        if let Some(km) = self.max_distance {
            changes.push(FilterChange::MaxDistance(km));
        }
        changes
    }
}

fn open_store(config: &AppConfig, limit: Option<u32>) -> anyhow::Result<LocationStore<PortalApi>> {
    let relay = RelayClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build location API client: {e}"))?;
    Ok(LocationStore::new(
        PortalApi::new(relay),
        limit.unwrap_or(config.page_size),
    ))
}

/// Loads pages after the first until the last one, or until a page fails.
async fn load_remaining(store: &LocationStore<PortalApi>) {
    while store.has_more() {
        store.load_more().await;
        if let Some(error) = store.snapshot().error {
            tracing::warn!(%error, "stopped paging early");
            break;
        }
    }
}

/// Fetches the first page (all pages with `all_pages`) and returns the list.
///
/// # Errors
///
/// Returns an error if the first page cannot be loaded.
async fn load_locations(
    store: &LocationStore<PortalApi>,
    all_pages: bool,
) -> anyhow::Result<Vec<Location>> {
    store.fetch(store.query()).await;
    store.snapshot().check()?;
    if all_pages {
        load_remaining(store).await;
    }
    Ok(store.snapshot().locations)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_owned()
    }
}

/// List locations as a table followed by filter statistics.
///
/// With `--search` the backend is asked first; when it cannot search, the
/// unfiltered list already loaded is searched locally instead. Program, type,
/// year, sort, and distance are always applied client-side.
///
/// # Errors
///
/// Returns an error if the client cannot be built, the first page cannot be
/// loaded, or a filter value is rejected.
pub(crate) async fn run_list(config: &AppConfig, args: &ListArgs) -> anyhow::Result<()> {
    let store = open_store(config, args.limit)?;

    store.fetch(store.query()).await;
    store.snapshot().check()?;
    if let Some(term) = args.search.as_deref() {
        store.search(term, store.query()).await;
        let snapshot = store.snapshot();
        if snapshot.search_fallback {
            println!(
                "note: backend search unavailable ({}); filtering loaded locations locally",
                snapshot
                    .search_error
                    .as_deref()
                    .unwrap_or("no reason given")
            );
        }
    }
    if args.all_pages {
        load_remaining(&store).await;
    }

    let snapshot = store.snapshot();
    store.dispose();

    let mut filter = LocationFilter::new();
    filter.set_locations(&snapshot.locations);
    for change in args.filter_changes() {
        filter.apply(change)?;
    }
    let view = filter.view(&snapshot.locations);

    if view.locations.is_empty() {
        println!("no locations match the current filters");
    } else {
        let header = format!(
            "{:<8}{:<34}{:<18}{:<10}{:<6}{:<7}ADDRESS",
            "ID", "NAME", "TYPE", "DISTANCE", "YEAR", "RATING"
        );
        println!("{header}");
        for location in &view.locations {
            println!(
                "{:<8}{:<34}{:<18}{:<10}{:<6}{:<7.1}{}",
                truncate(location.id.as_str(), 6),
                truncate(&location.name, 30),
                truncate(&location.kind, 16),
                location.distance,
                location
                    .year
                    .map_or_else(|| "\u{2014}".to_string(), |y| y.to_string()),
                location.rating,
                truncate(&location.address, 40),
            );
        }
    }

    println!();
    println!(
        "showing {} of {} locations{}",
        view.stats.filtered,
        view.stats.total,
        if view.stats.has_active_filters {
            " (filters active)"
        } else {
            ""
        }
    );
    if snapshot.has_more() {
        println!(
            "page {} of {}; pass --all-pages to load the rest",
            snapshot.pagination.page, snapshot.pagination.total_pages
        );
    }

    Ok(())
}

/// Print the dropdown options derived from the loaded list.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the list cannot be loaded.
pub(crate) async fn run_options(config: &AppConfig, all_pages: bool) -> anyhow::Result<()> {
    let store = open_store(config, None)?;
    let locations = load_locations(&store, all_pages).await?;

    let mut filter = LocationFilter::new();
    filter.set_locations(&locations);
    let options = filter.options();

    println!("Programs: {}", options.programs.join(", "));
    println!("Types:    {}", options.types.join(", "));
    println!("Years:    {}", options.years.join(", "));
    let sorts: Vec<String> = options
        .sort_options
        .iter()
        .map(|o| format!("{} ({})", o.label, o.value))
        .collect();
    println!("Sort by:  {}", sorts.join(", "));

    Ok(())
}

/// Select a location the way a marker click would and print the resulting
/// positioning command.
///
/// Pages are loaded until the id is found. A location without usable
/// coordinates has no marker; it is still selected, but the map does not move.
///
/// # Errors
///
/// Returns an error if the list cannot be loaded or the id is not listed.
pub(crate) async fn run_show(config: &AppConfig, id: &str, animated: bool) -> anyhow::Result<()> {
    let store = open_store(config, None)?;
    let target = LocationId::new(id);

    store.fetch(store.query()).await;
    store.snapshot().check()?;
    while !store.snapshot().locations.iter().any(|l| l.id == target) && store.has_more() {
        store.load_more().await;
        if store.snapshot().error.is_some() {
            break;
        }
    }
    let locations = store.snapshot().locations;

    let mut sync = MapSync::new(config.map.clone());
    let mut viewport = TerminalViewport::new(animated);
    viewport.set_viewport(&sync.initial_viewport());
    sync.attach_map(viewport)?;

    let markers = MarkerLayer::build(&locations, &IconRegistry::default());
    match markers.activate(&target) {
        Some(event) => {
            sync.handle_marker_event(&event, &locations);
        }
        None => {
            let location = locations
                .iter()
                .find(|l| l.id == target)
                .ok_or_else(|| anyhow::anyhow!("location '{id}' not found"))?;
            sync.select_location(location);
        }
    }

    let location = sync
        .selected(&locations)
        .ok_or_else(|| anyhow::anyhow!("location '{id}' is no longer listed"))?;
    print_location(location, markers.get(&location.id).map(|m| m.icon.glyph.as_str()));

    println!();
    let initial = sync.initial_viewport();
    println!("Map opened: {}", describe(&initial));
    match sync.viewport().and_then(TerminalViewport::last_command) {
        Some(command) if *command != initial => println!("Map: {}", describe(command)),
        _ => println!("Map: unchanged (no coordinates on record)"),
    }

    Ok(())
}

fn print_location(location: &Location, glyph: Option<&str>) {
    let dash = || "\u{2014}".to_string();
    match glyph {
        Some(glyph) => println!("{glyph} {} [{}]", location.name, location.id),
        None => println!("{} [{}]", location.name, location.id),
    }
    println!("Type:        {}", location.kind);
    println!("Address:     {}", location.address);
    println!("Programs:    {}", location.programs.join(", "));
    println!("Distance:    {}", location.distance);
    println!(
        "Year:        {}",
        location.year.map_or_else(dash, |y| y.to_string())
    );
    println!(
        "Coordinates: {}",
        location.coordinates.map_or_else(dash, |c| c.to_string())
    );
    if let Some(phone) = &location.phone {
        println!("Phone:       {phone}");
    }
    if let Some(hours) = &location.opening_hours {
        println!("Hours:       {hours}");
    }
    if !location.description.is_empty() {
        println!("Description: {}", location.description);
    }
}
