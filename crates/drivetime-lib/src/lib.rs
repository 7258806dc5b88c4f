//! drivetime library entry points.
//!
//! This crate finds fastest-time routes between two geographic points. It
//! acquires an area-bounded road network through a pluggable provider,
//! caches fetched graphs by rounded area, and runs an A* search over
//! travel-time weights. Higher-level consumers (CLI, services) should only
//! depend on the types exported here.

#![deny(warnings)]

pub mod cache;
pub mod error;
pub mod geo;
pub mod graph;
pub mod overpass;
pub mod path;
pub mod provider;
pub mod routing;

pub use cache::{initial_search_radius_m, CacheKey, GraphCache};
pub use error::{AttemptFailure, Error, Result};
pub use geo::Coordinate;
pub use graph::{Edge, Node, NodeId, RoadGraph};
pub use overpass::OverpassProvider;
pub use path::find_fastest_path;
pub use provider::{ProviderError, RoadNetworkProvider};
pub use routing::{route_over_graph, Route, RoutePlanner};
