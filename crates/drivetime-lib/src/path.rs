//! A* shortest-path search over travel-time weights.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::graph::{NodeId, RoadGraph};

/// Find the path from `start` to `goal` minimizing cumulative travel time in
/// seconds. Returns the node sequence, or `None` when the nodes are not
/// connected.
///
/// The heuristic is the great-circle distance to the goal converted to
/// seconds at the graph's maximum edge speed. No edge can be traversed
/// faster than that speed, so the estimate never overestimates the
/// remaining cost and the search stays optimal.
pub fn find_fastest_path(graph: &RoadGraph, start: NodeId, goal: NodeId) -> Option<Vec<NodeId>> {
    if start == goal {
        return Some(vec![start]);
    }

    let max_speed_kph = graph.max_speed_kph();
    let heuristic = |node: NodeId| heuristic_seconds(graph, node, goal, max_speed_kph);

    let mut g_score: HashMap<NodeId, f64> = HashMap::new();
    let mut parents: HashMap<NodeId, Option<NodeId>> = HashMap::new();
    let mut queue = BinaryHeap::new();

    g_score.insert(start, 0.0);
    parents.insert(start, None);
    queue.push(AStarEntry::new(start, 0.0, heuristic(start)));

    while let Some(entry) = queue.pop() {
        let current_score = match g_score.get(&entry.node) {
            // Skip stale queue entries superseded by a cheaper path.
            Some(score) if *score < entry.cost.0 => continue,
            Some(score) => *score,
            None => continue,
        };

        if entry.node == goal {
            return Some(reconstruct_path(&parents, start, goal));
        }

        for edge in graph.edges_from(entry.node) {
            let next = edge.to;
            let tentative_g = current_score + edge.weight_seconds();
            if tentative_g < *g_score.get(&next).unwrap_or(&f64::INFINITY) {
                g_score.insert(next, tentative_g);
                parents.insert(next, Some(entry.node));
                queue.push(AStarEntry::new(next, tentative_g, heuristic(next)));
            }
        }
    }

    None
}

fn heuristic_seconds(graph: &RoadGraph, from: NodeId, goal: NodeId, max_speed_kph: f64) -> f64 {
    let (Some(from), Some(goal)) = (graph.node(from), graph.node(goal)) else {
        return 0.0;
    };
    let distance_km = from.coordinate().distance_km(&goal.coordinate());
    distance_km / max_speed_kph * 3600.0
}

fn reconstruct_path(
    parents: &HashMap<NodeId, Option<NodeId>>,
    start: NodeId,
    goal: NodeId,
) -> Vec<NodeId> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(node) = current {
        path.push(node);
        if node == start {
            break;
        }
        current = parents.get(&node).copied().flatten();
    }
    path.reverse();
    path
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct AStarEntry {
    node: NodeId,
    cost: FloatOrd,
    estimate: FloatOrd,
}

impl AStarEntry {
    fn new(node: NodeId, cost: f64, heuristic: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
            estimate: FloatOrd(cost + heuristic),
        }
    }
}

impl Ord for AStarEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by estimate.
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for AStarEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
