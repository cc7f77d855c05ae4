use super::edge::Edge;
use super::node::Node;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// A complete diagram as exported to and imported from JSON.
///
/// Fields other than `nodes` and `edges` (viewport, zoom) are carried in
/// `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagramDocument {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DiagramDocument {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self {
            nodes,
            edges,
            extra: Map::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Drop edges whose endpoints are not in the node set; returns their ids.
    pub fn prune_dangling_edges(&mut self) -> Vec<String> {
        let node_ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        let mut removed = Vec::new();
        self.edges.retain(|edge| {
            let live =
                node_ids.contains(edge.source.as_str()) && node_ids.contains(edge.target.as_str());
            if !live {
                removed.push(edge.id.clone());
            }
            live
        });
        removed
    }

    /// Node ids that occur more than once.
    pub fn duplicate_node_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for node in &self.nodes {
            if !seen.insert(node.id.as_str()) && !duplicates.contains(&node.id) {
                duplicates.push(node.id.clone());
            }
        }
        duplicates
    }
}
