//! Identifier allocation for diagram entities.

use super::enums::NodeKind;
use uuid::Uuid;

/// Allocate a node id of the form `{kind}-{uuid}`.
///
/// The kind prefix keeps ids readable in exported files; the uuid suffix
/// keeps them unique even when several nodes are created in the same instant.
pub fn new_node_id(kind: NodeKind) -> String {
    format!("{}-{}", kind.as_str(), Uuid::new_v4().simple())
}

/// Derive an edge id from its endpoints and anchors.
///
/// Matches the id scheme of the browser canvas so files exported there import
/// without id churn.
pub fn edge_id(
    source: &str,
    source_handle: Option<&str>,
    target: &str,
    target_handle: Option<&str>,
) -> String {
    format!(
        "reactflow__edge-{}{}-{}{}",
        source,
        source_handle.unwrap_or(""),
        target,
        target_handle.unwrap_or("")
    )
}
