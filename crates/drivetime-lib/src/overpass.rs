//! Road-network provider backed by the Overpass API.
//!
//! Fetches the drivable ways around a center point, then annotates every
//! edge with a speed (posted `maxspeed` where parseable, a per-class default
//! otherwise) and a derived travel time, so the route finder rarely needs
//! its fallback weight.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::geo::Coordinate;
use crate::graph::{Edge, Node, RoadGraph};
use crate::provider::{ProviderError, RoadNetworkProvider};

const DEFAULT_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

/// Environment override for the Overpass endpoint, mainly for tests and
/// self-hosted instances.
const ENDPOINT_ENV: &str = "DRIVETIME_OVERPASS_URL";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Highway classes that are not drivable and get filtered out server-side.
const NON_DRIVABLE_CLASSES: &str =
    "footway|path|cycleway|steps|pedestrian|bridleway|corridor|construction|proposed|track";

const MPH_TO_KPH: f64 = 1.609344;

/// Provider speaking the Overpass QL interpreter endpoint.
pub struct OverpassProvider {
    client: Client,
    endpoint: String,
}

impl OverpassProvider {
    /// Build a provider against the default (or env-overridden) endpoint.
    pub fn new() -> Result<Self, ProviderError> {
        let endpoint = env::var(ENDPOINT_ENV).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        Self::with_endpoint(endpoint)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("drivetime/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl RoadNetworkProvider for OverpassProvider {
    fn fetch(&self, center: Coordinate, radius_m: f64) -> Result<RoadGraph, ProviderError> {
        let query = build_query(&center, radius_m);
        debug!(endpoint = %self.endpoint, radius_m, "querying overpass");

        let response = self.client.post(&self.endpoint).body(query).send()?;
        if !response.status().is_success() {
            return Err(ProviderError::Status {
                status: response.status().as_u16(),
            });
        }

        let payload: OverpassResponse = response.json()?;
        let graph = graph_from_elements(payload.elements);
        debug!(nodes = graph.node_count(), "overpass graph assembled");
        Ok(graph)
    }
}

fn build_query(center: &Coordinate, radius_m: f64) -> String {
    format!(
        "[out:json][timeout:25];\n\
         way[\"highway\"][\"highway\"!~\"{classes}\"]\
         (around:{radius:.0},{lat},{lon});\n\
         (._;>;);\n\
         out body;",
        classes = NON_DRIVABLE_CLASSES,
        radius = radius_m,
        lat = center.latitude,
        lon = center.longitude,
    )
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(rename = "type")]
    kind: String,
    id: i64,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    nodes: Vec<i64>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

/// Assemble a road graph from Overpass elements: nodes first, then one
/// directed edge per consecutive way-node pair (both directions unless the
/// way is oneway).
fn graph_from_elements(elements: Vec<OverpassElement>) -> RoadGraph {
    let mut graph = RoadGraph::new();

    for element in &elements {
        if element.kind != "node" {
            continue;
        }
        if let (Some(lat), Some(lon)) = (element.lat, element.lon) {
            graph.add_node(Node {
                id: element.id,
                latitude: lat,
                longitude: lon,
            });
        }
    }

    for element in &elements {
        if element.kind != "way" || element.nodes.len() < 2 {
            continue;
        }
        let speed_kph = way_speed_kph(&element.tags);
        let direction = way_direction(&element.tags);

        for pair in element.nodes.windows(2) {
            let (Some(from), Some(to)) = (graph.node(pair[0]), graph.node(pair[1])) else {
                continue;
            };
            let length_m = from.coordinate().distance_km(&to.coordinate()) * 1000.0;
            let travel_time_s = length_m / 1000.0 / speed_kph * 3600.0;

            if direction != WayDirection::Backward {
                graph.add_edge(directed_edge(pair[0], pair[1], length_m, speed_kph, travel_time_s));
            }
            if direction != WayDirection::Forward {
                graph.add_edge(directed_edge(pair[1], pair[0], length_m, speed_kph, travel_time_s));
            }
        }
    }

    graph
}

fn directed_edge(from: i64, to: i64, length_m: f64, speed_kph: f64, travel_time_s: f64) -> Edge {
    Edge {
        from,
        to,
        length_m,
        speed_kph: Some(speed_kph),
        travel_time_s: Some(travel_time_s),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum WayDirection {
    Both,
    Forward,
    Backward,
}

fn way_direction(tags: &HashMap<String, String>) -> WayDirection {
    match tags.get("oneway").map(String::as_str) {
        Some("yes") | Some("true") | Some("1") => WayDirection::Forward,
        Some("-1") | Some("reverse") => WayDirection::Backward,
        _ if tags.get("junction").map(String::as_str) == Some("roundabout") => {
            WayDirection::Forward
        }
        _ => WayDirection::Both,
    }
}

/// Speed for a way: parsed `maxspeed` when present and numeric, otherwise a
/// default for its highway class.
fn way_speed_kph(tags: &HashMap<String, String>) -> f64 {
    tags.get("maxspeed")
        .and_then(|raw| parse_maxspeed(raw))
        .unwrap_or_else(|| default_speed_kph(tags.get("highway").map(String::as_str)))
}

fn parse_maxspeed(raw: &str) -> Option<f64> {
    // Multi-valued tags ("50;30") use the first value.
    let value = raw.split(';').next()?.trim();
    if let Some(mph) = value.strip_suffix("mph") {
        return mph.trim().parse::<f64>().ok().map(|v| v * MPH_TO_KPH);
    }
    let numeric = value.strip_suffix("km/h").map(str::trim).unwrap_or(value);
    numeric.parse::<f64>().ok().filter(|speed| *speed > 0.0)
}

fn default_speed_kph(highway: Option<&str>) -> f64 {
    match highway {
        Some("motorway") => 110.0,
        Some("motorway_link") => 70.0,
        Some("trunk") => 90.0,
        Some("trunk_link") => 60.0,
        Some("primary") => 65.0,
        Some("primary_link") => 50.0,
        Some("secondary") => 55.0,
        Some("secondary_link") => 45.0,
        Some("tertiary") => 50.0,
        Some("tertiary_link") => 40.0,
        Some("residential") => 30.0,
        Some("living_street") => 10.0,
        Some("service") => 20.0,
        _ => 40.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "elements": [
            {"type": "node", "id": 1, "lat": 40.00, "lon": -73.00},
            {"type": "node", "id": 2, "lat": 40.01, "lon": -73.00},
            {"type": "node", "id": 3, "lat": 40.02, "lon": -73.00},
            {"type": "way", "id": 10, "nodes": [1, 2],
             "tags": {"highway": "residential"}},
            {"type": "way", "id": 11, "nodes": [2, 3],
             "tags": {"highway": "primary", "maxspeed": "30 mph", "oneway": "yes"}}
        ]
    }"#;

    fn sample_graph() -> RoadGraph {
        let payload: OverpassResponse = serde_json::from_str(SAMPLE).expect("sample parses");
        graph_from_elements(payload.elements)
    }

    #[test]
    fn nodes_and_edges_are_assembled() {
        let graph = sample_graph();
        assert_eq!(graph.node_count(), 3);
        // Two-way residential contributes both directions.
        assert!(graph.edge_between(1, 2).is_some());
        assert!(graph.edge_between(2, 1).is_some());
    }

    #[test]
    fn oneway_contributes_a_single_direction() {
        let graph = sample_graph();
        assert!(graph.edge_between(2, 3).is_some());
        assert!(graph.edge_between(3, 2).is_none());
    }

    #[test]
    fn maxspeed_mph_is_converted() {
        let graph = sample_graph();
        let edge = graph.edge_between(2, 3).expect("edge exists");
        let speed = edge.speed_kph.expect("speed annotated");
        assert!((speed - 30.0 * MPH_TO_KPH).abs() < 1e-9);
    }

    #[test]
    fn residential_without_maxspeed_uses_class_default() {
        let graph = sample_graph();
        let edge = graph.edge_between(1, 2).expect("edge exists");
        assert_eq!(edge.speed_kph, Some(30.0));
    }

    #[test]
    fn travel_time_matches_length_over_speed() {
        let graph = sample_graph();
        let edge = graph.edge_between(1, 2).expect("edge exists");
        let expected = edge.length_m / 1000.0 / 30.0 * 3600.0;
        let annotated = edge.travel_time_s.expect("travel time annotated");
        assert!((annotated - expected).abs() < 1e-9);
    }

    #[test]
    fn maxspeed_parsing_handles_common_forms() {
        assert_eq!(parse_maxspeed("50"), Some(50.0));
        assert_eq!(parse_maxspeed("50 km/h"), Some(50.0));
        assert_eq!(parse_maxspeed("50;30"), Some(50.0));
        assert_eq!(parse_maxspeed("signals"), None);
        assert_eq!(parse_maxspeed("none"), None);
        let mph = parse_maxspeed("60 mph").expect("parses");
        assert!((mph - 96.56064).abs() < 1e-6);
    }

    #[test]
    fn roundabouts_are_oneway() {
        let tags: HashMap<String, String> = [("junction".to_string(), "roundabout".to_string())]
            .into_iter()
            .collect();
        assert_eq!(way_direction(&tags), WayDirection::Forward);
    }

    #[test]
    fn query_embeds_center_and_radius() {
        let query = build_query(&Coordinate::new(40.05, -73.05), 21_000.0);
        assert!(query.contains("around:21000,40.05,-73.05"));
        assert!(query.contains("[\"highway\"]"));
    }
}
