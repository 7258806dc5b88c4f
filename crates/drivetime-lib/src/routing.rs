//! Route planning facade: snap, search, and aggregate travel time.

use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::GraphCache;
use crate::error::{Error, Result};
use crate::geo::Coordinate;
use crate::graph::RoadGraph;
use crate::path::find_fastest_path;
use crate::provider::RoadNetworkProvider;

/// A computed route: the node coordinates from start to end inclusive and
/// the total traversal time in minutes, rounded to one decimal.
#[derive(Debug, Clone, Serialize)]
pub struct Route {
    pub coordinates: Vec<Coordinate>,
    pub minutes: f64,
}

/// Fastest-time route planner over an injected road-network provider.
///
/// Owns the graph cache; a service instance is expected to construct one
/// planner and share it across requests (`RoutePlanner` is `Send + Sync`).
pub struct RoutePlanner {
    provider: Box<dyn RoadNetworkProvider>,
    cache: GraphCache,
}

impl RoutePlanner {
    pub fn new(provider: Box<dyn RoadNetworkProvider>) -> Self {
        Self {
            provider,
            cache: GraphCache::new(),
        }
    }

    /// Compute the fastest route between two coordinates.
    ///
    /// Resolves (or acquires) the road network for the surrounding area,
    /// snaps both endpoints to their nearest nodes, and runs the
    /// travel-time search. Every failure is a typed [`Error`] outcome.
    pub fn find_route(&self, start: Coordinate, end: Coordinate) -> Result<Route> {
        validate(&start)?;
        validate(&end)?;

        let graph = self.cache.graph_for(self.provider.as_ref(), &start, &end)?;
        route_over_graph(&graph, &start, &end)
    }

    /// The planner's graph cache, exposed for inspection.
    pub fn cache(&self) -> &GraphCache {
        &self.cache
    }
}

fn validate(coordinate: &Coordinate) -> Result<()> {
    if coordinate.is_valid() {
        Ok(())
    } else {
        Err(Error::InvalidCoordinate {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
        })
    }
}

/// Route between two coordinates over an already-acquired graph.
pub fn route_over_graph(graph: &RoadGraph, start: &Coordinate, end: &Coordinate) -> Result<Route> {
    let start_node = graph.nearest_node(start).ok_or(Error::EmptyGraph)?;
    let end_node = graph.nearest_node(end).ok_or(Error::EmptyGraph)?;

    let path = find_fastest_path(graph, start_node, end_node).ok_or(Error::NoRouteFound)?;

    let coordinates: Vec<Coordinate> = path
        .iter()
        .filter_map(|id| graph.node(*id))
        .map(|node| node.coordinate())
        .collect();

    let mut total_seconds = 0.0;
    for pair in path.windows(2) {
        match graph.edge_between(pair[0], pair[1]) {
            Some(edge) => total_seconds += edge.weight_seconds(),
            // Unreachable for paths produced by the search; guard anyway.
            None => warn!(from = pair[0], to = pair[1], "path edge missing from graph"),
        }
    }

    debug!(
        nodes = path.len(),
        total_seconds, "route computed between snapped nodes"
    );

    Ok(Route {
        coordinates,
        minutes: (total_seconds / 60.0 * 10.0).round() / 10.0,
    })
}
