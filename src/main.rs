use anyhow::{bail, Context};
use clap::{ArgAction, Parser};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use valhalla_speed_trace::{
    sdk::config::ValhallaConfig,
    sdk::output::{write_geojson, write_geojson_with_speed, write_text},
    sdk::routing::{
        coord::{parse_lat_lon, Coord},
        get_annotated_route,
        provider::types::{ShapeMatch, Units},
    },
    sdk::util::log::init_logging,
};

/// Routes between waypoints with Valhalla and annotates the route with speed limits
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Waypoints as `lat,lon` (e.g. "47.6287,-122.3462"), at least two
    #[arg(required = true, num_args = 2.., allow_hyphen_values = true, value_parser = parse_lat_lon)]
    waypoints: Vec<Coord>,

    /// Valhalla base URL [env: VALHALLA_URL, default: http://localhost:8002]
    #[arg(long)]
    url: Option<String>,

    /// Maximum points per trace_attributes request [env: VALHALLA_BATCH_SIZE, default: 100]
    #[arg(long)]
    batch_size: Option<NonZeroUsize>,

    /// Concurrent trace_attributes requests [env: VALHALLA_MAX_IN_FLIGHT, default: 1]
    #[arg(long)]
    max_in_flight: Option<NonZeroUsize>,

    /// Costing model [env: VALHALLA_COSTING, default: auto]
    #[arg(long)]
    costing: Option<String>,

    /// Unit system for reported speeds [env: VALHALLA_UNITS, default: miles]
    #[arg(long, value_enum)]
    units: Option<Units>,

    /// Shape matching mode for trace_attributes [env: VALHALLA_SHAPE_MATCH, default: map-snap]
    #[arg(long, value_enum)]
    shape_match: Option<ShapeMatch>,

    /// Directory receiving route.txt, route.geojson and route_speed.geojson
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Skip route_speed.geojson
    #[arg(long)]
    no_markers: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn apply(&self, config: &mut ValhallaConfig) {
        if let Some(url) = &self.url {
            config.base_url = url.clone();
        }
        if let Some(batch_size) = self.batch_size {
            config.trace.batch_size = batch_size;
        }
        if let Some(max_in_flight) = self.max_in_flight {
            config.trace.max_in_flight = max_in_flight;
        }
        if let Some(costing) = &self.costing {
            config.options.costing = costing.clone();
        }
        if let Some(units) = self.units {
            config.options.units = units;
        }
        if let Some(shape_match) = self.shape_match {
            config.options.shape_match = shape_match;
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    dotenvy::dotenv().ok();

    // --- 1. Configuration ---
    let mut config = ValhallaConfig::from_env().context("Invalid Valhalla configuration")?;
    cli.apply(&mut config);
    log::info!(
        "Using Valhalla at {} (costing {}, batches of {}, {} in flight)",
        config.base_url,
        config.options.costing,
        config.trace.batch_size,
        config.trace.max_in_flight
    );

    let provider = config
        .build_provider()
        .context("Failed to build HTTP client")?;

    // --- 2. Route and annotate ---
    let route = get_annotated_route(&provider, &cli.waypoints, &config.trace)?;
    if route.samples.is_empty() {
        bail!("No speed data extracted ({} batches failed)", route.failures.len());
    }
    log::info!(
        "Collected {} speed samples, {} batches skipped",
        route.samples.len(),
        route.failures.len()
    );
    for failure in &route.failures {
        log::warn!("Missing {}", failure);
    }

    // --- 3. Output ---
    write_text(&route.samples, cli.out_dir.join("route.txt"))?;
    write_geojson(&route.samples, cli.out_dir.join("route.geojson"))?;
    if !cli.no_markers {
        write_geojson_with_speed(
            &route.samples,
            config.options.units,
            cli.out_dir.join("route_speed.geojson"),
        )?;
    }

    Ok(())
}
