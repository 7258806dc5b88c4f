//! Command-line interface for drivetime routing.
//!
//! Thin layer over `drivetime-lib`: argument parsing, output formatting, and
//! provider construction live here; all routing logic stays in the library.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use drivetime_lib::{Coordinate, OverpassProvider, Route, RoutePlanner};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Fastest-time routing over the OpenStreetMap road network"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute the fastest route between two coordinates.
    Route {
        /// Start coordinate as "LAT,LON" (degrees).
        #[arg(long, value_parser = parse_coordinate)]
        from: Coordinate,
        /// End coordinate as "LAT,LON" (degrees).
        #[arg(long, value_parser = parse_coordinate)]
        to: Coordinate,
        /// Emit the route as JSON instead of text.
        #[arg(long)]
        json: bool,
        /// Override the Overpass interpreter endpoint.
        #[arg(long)]
        overpass_url: Option<String>,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Route {
            from,
            to,
            json,
            overpass_url,
        } => handle_route(from, to, json, overpass_url.as_deref()),
    }
}

fn handle_route(
    from: Coordinate,
    to: Coordinate,
    json: bool,
    overpass_url: Option<&str>,
) -> Result<()> {
    let provider = match overpass_url {
        Some(url) => OverpassProvider::with_endpoint(url),
        None => OverpassProvider::new(),
    }
    .context("failed to construct the Overpass provider")?;

    let planner = RoutePlanner::new(Box::new(provider));
    let route = planner
        .find_route(from, to)
        .context("route computation failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&route)?);
    } else {
        print!("{}", render_route(&route));
    }
    Ok(())
}

/// Parse a "LAT,LON" pair into a coordinate. Used as a clap value parser.
pub fn parse_coordinate(raw: &str) -> std::result::Result<Coordinate, String> {
    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got '{raw}'"))?;
    let latitude: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("invalid latitude '{}'", lat.trim()))?;
    let longitude: f64 = lon
        .trim()
        .parse()
        .map_err(|_| format!("invalid longitude '{}'", lon.trim()))?;
    Ok(Coordinate::new(latitude, longitude))
}

/// Human-readable rendering of a route.
pub fn render_route(route: &Route) -> String {
    let mut out = format!(
        "Fastest route: {:.1} minutes over {} waypoints\n",
        route.minutes,
        route.coordinates.len()
    );
    for coordinate in &route.coordinates {
        out.push_str(&format!(
            "  {:.5}, {:.5}\n",
            coordinate.latitude, coordinate.longitude
        ));
    }
    out
}
