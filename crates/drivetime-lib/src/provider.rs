//! Capability contract for acquiring road-network graphs.

use thiserror::Error;

use crate::geo::Coordinate;
use crate::graph::RoadGraph;

/// Errors a provider may report for a single fetch. The acquisition loop
/// converts these into retry-attempt failures; they are never propagated raw
/// to routing callers.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Underlying HTTP request failed.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status code.
    #[error("provider returned status {status}")]
    Status { status: u16 },

    /// Provider payload could not be interpreted as a road network.
    #[error("malformed provider response: {message}")]
    Malformed { message: String },
}

/// Source of road-network graphs for an area.
///
/// Implementations fetch (or synthesize) the drivable network within
/// `radius_m` meters of `center`, with per-edge speed and travel-time
/// annotations attached where derivable. Missing annotations are covered by
/// the route finder's fallback weight.
pub trait RoadNetworkProvider: Send + Sync {
    fn fetch(&self, center: Coordinate, radius_m: f64) -> Result<RoadGraph, ProviderError>;
}

/// Shared providers are providers too; lets callers keep a handle for
/// inspection while the planner owns its own.
impl<P: RoadNetworkProvider + ?Sized> RoadNetworkProvider for std::sync::Arc<P> {
    fn fetch(&self, center: Coordinate, radius_m: f64) -> Result<RoadGraph, ProviderError> {
        (**self).fetch(center, radius_m)
    }
}
