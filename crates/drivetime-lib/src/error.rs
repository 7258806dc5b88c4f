use thiserror::Error;

/// Convenient result alias for the drivetime library.
pub type Result<T> = std::result::Result<T, Error>;

/// A single failed acquisition attempt, retained for diagnostics.
#[derive(Debug)]
pub struct AttemptFailure {
    /// Radius in meters that was requested on this attempt.
    pub radius_m: f64,
    /// Why the attempt failed (provider error or empty graph).
    pub reason: String,
}

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when the road-network provider exhausted its retry budget.
    #[error("no road network data for the requested area after {} attempts", .attempts.len())]
    NoNetworkData { attempts: Vec<AttemptFailure> },

    /// Raised when no path connects the snapped start and end nodes.
    #[error("no route found between the requested points")]
    NoRouteFound,

    /// Raised when a coordinate falls outside its valid WGS84 range.
    #[error("coordinate ({latitude}, {longitude}) is outside the valid range")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// Raised when a graph has no nodes to snap an endpoint onto.
    #[error("road graph contains no nodes")]
    EmptyGraph,
}
