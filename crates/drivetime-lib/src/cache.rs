//! Area-bounded graph acquisition with caching and retry expansion.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::error::{AttemptFailure, Error, Result};
use crate::geo::Coordinate;
use crate::graph::RoadGraph;
use crate::provider::RoadNetworkProvider;

/// Floor for the fetch radius so short requests still pull a usable area.
pub const MIN_RADIUS_M: f64 = 5_000.0;

/// Ceiling applied to the initial radius. Retry expansion may exceed it;
/// finding some graph outranks strict radius discipline.
pub const MAX_INITIAL_RADIUS_M: f64 = 50_000.0;

/// Padding factor applied to the straight-line span so both endpoints land
/// comfortably inside the fetched area.
const RADIUS_PADDING: f64 = 1.5;

const ACQUIRE_ATTEMPTS: usize = 3;

/// Fetch radius in meters for a route between `start` and `end`, before any
/// retry expansion.
pub fn initial_search_radius_m(start: &Coordinate, end: &Coordinate) -> f64 {
    let distance_km = start.distance_km(end);
    (distance_km * 1000.0 * RADIUS_PADDING)
        .max(MIN_RADIUS_M)
        .min(MAX_INITIAL_RADIUS_M)
}

/// Bucketed cache key: midpoint rounded to 2 decimal degrees, radius rounded
/// to the nearest 1000 m. Nearby, overlapping requests deliberately share one
/// fetched graph at the cost of possible mismatch near bucket boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    lat_centideg: i32,
    lon_centideg: i32,
    radius_m: i64,
}

impl CacheKey {
    pub fn new(center: &Coordinate, radius_m: f64) -> Self {
        Self {
            lat_centideg: (center.latitude * 100.0).round() as i32,
            lon_centideg: (center.longitude * 100.0).round() as i32,
            radius_m: (radius_m / 1000.0).round() as i64 * 1000,
        }
    }

    /// Key a route request between `start` and `end` resolves to.
    pub fn for_request(start: &Coordinate, end: &Coordinate) -> Self {
        Self::new(&start.midpoint(end), initial_search_radius_m(start, end))
    }
}

/// Session-lifetime cache of fetched road graphs, keyed by bucketed area.
///
/// Unbounded, no eviction, no TTL. Each key holds a single-flight cell so
/// concurrent requests for the same area block on one provider fetch instead
/// of stampeding; a failed fetch leaves the cell unpopulated and the next
/// request retries.
#[derive(Debug, Default)]
pub struct GraphCache {
    entries: Mutex<HashMap<CacheKey, Arc<OnceCell<Arc<RoadGraph>>>>>,
}

impl GraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a graph covering the area between `start` and `end`, fetching
    /// through `provider` on a cache miss.
    pub fn graph_for(
        &self,
        provider: &dyn RoadNetworkProvider,
        start: &Coordinate,
        end: &Coordinate,
    ) -> Result<Arc<RoadGraph>> {
        let radius_m = initial_search_radius_m(start, end);
        let center = start.midpoint(end);
        let key = CacheKey::new(&center, radius_m);

        let cell = {
            let mut entries = self
                .entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            Arc::clone(entries.entry(key).or_default())
        };

        cell.get_or_try_init(|| acquire_with_expansion(provider, center, radius_m))
            .map(Arc::clone)
    }

    /// Whether a populated graph exists for `key`. An in-flight or failed
    /// acquisition does not count.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .is_some_and(|cell| cell.get().is_some())
    }

    /// Number of populated entries.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|cell| cell.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Up to three provider attempts, doubling the radius after each failure.
/// Success requires a graph with at least one node. Every failure reason is
/// retained so exhaustion reports the whole story, not just the last error.
fn acquire_with_expansion(
    provider: &dyn RoadNetworkProvider,
    center: Coordinate,
    initial_radius_m: f64,
) -> Result<Arc<RoadGraph>> {
    let mut radius_m = initial_radius_m;
    let mut attempts = Vec::with_capacity(ACQUIRE_ATTEMPTS);

    for attempt in 1..=ACQUIRE_ATTEMPTS {
        let reason = match provider.fetch(center, radius_m) {
            Ok(graph) if !graph.is_empty() => {
                debug!(
                    attempt,
                    radius_m,
                    nodes = graph.node_count(),
                    "road network acquired"
                );
                return Ok(Arc::new(graph));
            }
            Ok(_) => "provider returned an empty graph".to_string(),
            Err(error) => error.to_string(),
        };

        warn!(attempt, radius_m, %reason, "road network fetch failed");
        attempts.push(AttemptFailure { radius_m, reason });
        radius_m *= 2.0;
    }

    Err(Error::NoNetworkData { attempts })
}
