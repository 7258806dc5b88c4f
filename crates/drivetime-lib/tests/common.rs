// Shared helpers for drivetime-lib integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use drivetime_lib::{
    Coordinate, Edge, Node, NodeId, ProviderError, RoadGraph, RoadNetworkProvider,
};

/// One scripted provider response.
pub enum Outcome {
    Graph(RoadGraph),
    Empty,
    Fail(String),
}

/// Provider that replays a fixed script and records the radius of every
/// fetch, so tests can assert on retry expansion and cache hits without any
/// network.
pub struct ScriptedProvider {
    outcomes: Mutex<VecDeque<Outcome>>,
    radii: Mutex<Vec<f64>>,
}

impl ScriptedProvider {
    pub fn new(outcomes: Vec<Outcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            radii: Mutex::new(Vec::new()),
        }
    }

    /// Radii requested so far, in call order.
    pub fn radii_seen(&self) -> Vec<f64> {
        self.radii.lock().expect("radii lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.radii.lock().expect("radii lock").len()
    }
}

impl RoadNetworkProvider for ScriptedProvider {
    fn fetch(&self, _center: Coordinate, radius_m: f64) -> Result<RoadGraph, ProviderError> {
        self.radii.lock().expect("radii lock").push(radius_m);
        match self.outcomes.lock().expect("script lock").pop_front() {
            Some(Outcome::Graph(graph)) => Ok(graph),
            Some(Outcome::Empty) => Ok(RoadGraph::new()),
            Some(Outcome::Fail(message)) => Err(ProviderError::Malformed { message }),
            None => Err(ProviderError::Malformed {
                message: "script exhausted".to_string(),
            }),
        }
    }
}

fn node(id: NodeId, lat: f64, lon: f64) -> Node {
    Node {
        id,
        latitude: lat,
        longitude: lon,
    }
}

fn two_way(graph: &mut RoadGraph, from: NodeId, to: NodeId, seconds: f64) {
    for (a, b) in [(from, to), (to, from)] {
        graph.add_edge(Edge {
            from: a,
            to: b,
            length_m: 1000.0,
            speed_kph: Some(50.0),
            travel_time_s: Some(seconds),
        });
    }
}

/// Connected chain spanning (40.00,-73.00) .. (40.10,-73.10).
pub fn chain_graph() -> RoadGraph {
    let mut graph = RoadGraph::new();
    graph.add_node(node(1, 40.00, -73.00));
    graph.add_node(node(2, 40.05, -73.05));
    graph.add_node(node(3, 40.10, -73.10));
    two_way(&mut graph, 1, 2, 600.0);
    two_way(&mut graph, 2, 3, 600.0);
    graph
}

/// Same node layout as [`chain_graph`] but with no edge reaching node 3.
pub fn split_graph() -> RoadGraph {
    let mut graph = RoadGraph::new();
    graph.add_node(node(1, 40.00, -73.00));
    graph.add_node(node(2, 40.05, -73.05));
    graph.add_node(node(3, 40.10, -73.10));
    two_way(&mut graph, 1, 2, 600.0);
    graph
}
