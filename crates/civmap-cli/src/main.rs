mod locations;
mod map;
mod viewport;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::locations::ListArgs;

#[derive(Debug, Parser)]
#[command(name = "civmap")]
#[command(about = "Municipal map portal command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List locations matching the given search and filters
    List(ListArgs),
    /// Show the filter dropdown options derived from the location list
    Options {
        /// Walk every page before deriving options
        #[arg(long)]
        all_pages: bool,
    },
    /// Select a location and print the map positioning command
    Show {
        /// Location id
        id: String,
        /// Emulate a map that can fly between viewports
        #[arg(long)]
        animated: bool,
    },
    /// Print the tile-layer catalog and the active layer stack
    Layers {
        /// Base layer key to switch to
        #[arg(long)]
        base: Option<String>,
        /// Overlay layer key to toggle (repeatable)
        #[arg(long = "overlay")]
        overlays: Vec<String>,
    },
    /// Summarize a GeoJSON overlay file
    Overlay {
        /// Path to a GeoJSON `FeatureCollection`
        file: PathBuf,
    },
    /// Great-circle distance between two points
    #[command(allow_negative_numbers = true)]
    Distance {
        lat1: f64,
        lng1: f64,
        lat2: f64,
        lng2: f64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = civmap_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(env = %config.env, api = %config.api_base_url, "configuration loaded");

    match cli.command {
        Some(Commands::List(args)) => locations::run_list(&config, &args).await?,
        Some(Commands::Options { all_pages }) => {
            locations::run_options(&config, all_pages).await?;
        }
        Some(Commands::Show { id, animated }) => {
            locations::run_show(&config, &id, animated).await?;
        }
        Some(Commands::Layers { base, overlays }) => {
            map::run_layers(&config, base.as_deref(), &overlays)?;
        }
        Some(Commands::Overlay { file }) => map::run_overlay(&file)?,
        Some(Commands::Distance {
            lat1,
            lng1,
            lat2,
            lng2,
        }) => map::run_distance(lat1, lng1, lat2, lng2)?,
        None => println!("civmap ready; run `civmap --help` for the available commands"),
    }

    Ok(())
}
