//! In-memory road network used by the route search.

use std::collections::HashMap;

use tracing::warn;

use crate::geo::Coordinate;

/// Identifier for a road-network node (OSM node ids in practice).
pub type NodeId = i64;

/// Assumed speed in kph when an edge carries no speed annotation. Also the
/// floor for the heuristic scaling speed so empty graphs stay well-defined.
pub const DEFAULT_SPEED_KPH: f64 = 30.0;

/// A junction or geometry point in the road network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub latitude: f64,
    pub longitude: f64,
}

impl Node {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// A directed road segment between two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    /// Segment length in meters.
    pub length_m: f64,
    /// Posted or inferred speed in kph, when known.
    pub speed_kph: Option<f64>,
    /// Precomputed traversal time in seconds, when known. Non-negative.
    pub travel_time_s: Option<f64>,
}

impl Edge {
    /// Traversal time in seconds: the precomputed value when present,
    /// otherwise derived from length and speed (30 kph assumed when the
    /// speed is also missing). Always computable.
    pub fn weight_seconds(&self) -> f64 {
        match self.travel_time_s {
            Some(seconds) => seconds,
            None => {
                let speed = self.speed_kph.unwrap_or(DEFAULT_SPEED_KPH);
                self.length_m / 1000.0 / speed * 3600.0
            }
        }
    }
}

/// Directed road network over which routes are computed.
///
/// Parallel edges between the same node pair are allowed; wherever a single
/// edge must be chosen for a node pair, the first enumerated edge wins.
#[derive(Debug, Clone, Default)]
pub struct RoadGraph {
    nodes: HashMap<NodeId, Node>,
    adjacency: HashMap<NodeId, Vec<Edge>>,
}

impl RoadGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) {
        self.adjacency.entry(node.id).or_default();
        self.nodes.insert(node.id, node);
    }

    /// Insert a directed edge. Edges referencing a node that is not part of
    /// the graph are dropped with a warning so the adjacency invariant holds.
    pub fn add_edge(&mut self, edge: Edge) {
        if !self.nodes.contains_key(&edge.from) || !self.nodes.contains_key(&edge.to) {
            warn!(from = edge.from, to = edge.to, "dropping edge with missing endpoint");
            return;
        }
        self.adjacency.entry(edge.from).or_default().push(edge);
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Outgoing edges from `node`, in insertion order.
    pub fn edges_from(&self, node: NodeId) -> &[Edge] {
        self.adjacency.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First enumerated edge from `from` to `to`, the authoritative one for
    /// weight lookups when parallel edges exist.
    pub fn edge_between(&self, from: NodeId, to: NodeId) -> Option<&Edge> {
        self.edges_from(from).iter().find(|edge| edge.to == to)
    }

    /// Snap a coordinate to the nearest node by great-circle distance.
    /// Returns `None` only for an empty graph. Linear scan; the graphs here
    /// are area-bounded, not planet-sized.
    pub fn nearest_node(&self, point: &Coordinate) -> Option<NodeId> {
        self.nodes
            .values()
            .map(|node| (node.id, point.distance_km(&node.coordinate())))
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(id, _)| id)
    }

    /// Maximum annotated edge speed in kph, floored at the default speed.
    /// Used to scale the search heuristic so it never overestimates.
    pub fn max_speed_kph(&self) -> f64 {
        self.adjacency
            .values()
            .flatten()
            .filter_map(|edge| edge.speed_kph)
            .fold(DEFAULT_SPEED_KPH, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: NodeId, lat: f64, lon: f64) -> Node {
        Node {
            id,
            latitude: lat,
            longitude: lon,
        }
    }

    fn sample_graph() -> RoadGraph {
        let mut graph = RoadGraph::new();
        graph.add_node(node(1, 40.00, -73.00));
        graph.add_node(node(2, 40.01, -73.00));
        graph.add_node(node(3, 40.02, -73.00));
        graph.add_edge(Edge {
            from: 1,
            to: 2,
            length_m: 1100.0,
            speed_kph: Some(50.0),
            travel_time_s: Some(79.2),
        });
        graph.add_edge(Edge {
            from: 2,
            to: 3,
            length_m: 1100.0,
            speed_kph: Some(50.0),
            travel_time_s: Some(79.2),
        });
        graph
    }

    #[test]
    fn nearest_node_snaps_to_closest() {
        let graph = sample_graph();
        let near_two = Coordinate::new(40.011, -73.001);
        assert_eq!(graph.nearest_node(&near_two), Some(2));
    }

    #[test]
    fn nearest_node_on_empty_graph_is_none() {
        let graph = RoadGraph::new();
        assert_eq!(graph.nearest_node(&Coordinate::new(0.0, 0.0)), None);
    }

    #[test]
    fn first_parallel_edge_wins() {
        let mut graph = sample_graph();
        graph.add_edge(Edge {
            from: 1,
            to: 2,
            length_m: 900.0,
            speed_kph: Some(80.0),
            travel_time_s: Some(40.5),
        });
        let edge = graph.edge_between(1, 2).expect("edge exists");
        assert_eq!(edge.travel_time_s, Some(79.2));
    }

    #[test]
    fn edge_with_missing_endpoint_is_dropped() {
        let mut graph = sample_graph();
        graph.add_edge(Edge {
            from: 1,
            to: 99,
            length_m: 10.0,
            speed_kph: None,
            travel_time_s: None,
        });
        assert!(graph.edge_between(1, 99).is_none());
    }

    #[test]
    fn weight_falls_back_to_length_over_speed() {
        let edge = Edge {
            from: 1,
            to: 2,
            length_m: 1000.0,
            speed_kph: Some(60.0),
            travel_time_s: None,
        };
        assert!((edge.weight_seconds() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn weight_assumes_thirty_kph_without_speed() {
        let edge = Edge {
            from: 1,
            to: 2,
            length_m: 1000.0,
            speed_kph: None,
            travel_time_s: None,
        };
        assert!((edge.weight_seconds() - 120.0).abs() < 1e-9);
    }

    #[test]
    fn max_speed_is_floored_at_default() {
        let graph = RoadGraph::new();
        assert_eq!(graph.max_speed_kph(), DEFAULT_SPEED_KPH);
        assert_eq!(sample_graph().max_speed_kph(), 50.0);
    }
}
