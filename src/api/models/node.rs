use super::column::Column;
use super::enums::{FontSize, FontWeight, NodeKind};
use super::ids::new_node_id;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Placeholder label of a freshly dropped text annotation.
pub const TEXT_PLACEHOLDER: &str = "Click to edit text";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Kind-specific payload of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Process {
        label: String,
    },
    Database {
        label: String,
        columns: Vec<Column>,
    },
    Application {
        label: String,
    },
    Schema {
        label: String,
        columns: Vec<Column>,
    },
    Text {
        label: String,
        font_size: FontSize,
        font_weight: FontWeight,
    },
}

impl NodeData {
    /// Default payload for a node of `kind`.
    pub fn default_for(kind: NodeKind) -> Self {
        let label = kind.default_label();
        match kind {
            NodeKind::Process => NodeData::Process { label },
            NodeKind::Database => NodeData::Database {
                label,
                columns: Vec::new(),
            },
            NodeKind::Application => NodeData::Application { label },
            NodeKind::Schema => NodeData::Schema {
                label,
                columns: Vec::new(),
            },
            NodeKind::Text => NodeData::Text {
                label: TEXT_PLACEHOLDER.to_string(),
                font_size: FontSize::default(),
                font_weight: FontWeight::default(),
            },
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Process { .. } => NodeKind::Process,
            NodeData::Database { .. } => NodeKind::Database,
            NodeData::Application { .. } => NodeKind::Application,
            NodeData::Schema { .. } => NodeKind::Schema,
            NodeData::Text { .. } => NodeKind::Text,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            NodeData::Process { label }
            | NodeData::Database { label, .. }
            | NodeData::Application { label }
            | NodeData::Schema { label, .. }
            | NodeData::Text { label, .. } => label,
        }
    }

    pub fn set_label(&mut self, new_label: String) {
        match self {
            NodeData::Process { label }
            | NodeData::Database { label, .. }
            | NodeData::Application { label }
            | NodeData::Schema { label, .. }
            | NodeData::Text { label, .. } => *label = new_label,
        }
    }

    /// Column rows, only for kinds that carry them.
    pub fn columns(&self) -> Option<&[Column]> {
        match self {
            NodeData::Database { columns, .. } | NodeData::Schema { columns, .. } => {
                Some(columns)
            }
            _ => None,
        }
    }

    pub fn columns_mut(&mut self) -> Option<&mut Vec<Column>> {
        match self {
            NodeData::Database { columns, .. } | NodeData::Schema { columns, .. } => {
                Some(columns)
            }
            _ => None,
        }
    }

    /// Font attributes, only for text annotations.
    pub fn font(&self) -> Option<(FontSize, FontWeight)> {
        match self {
            NodeData::Text {
                font_size,
                font_weight,
                ..
            } => Some((*font_size, *font_weight)),
            _ => None,
        }
    }
}

/// A shape on the canvas.
///
/// `extra` holds fields written by the canvas library (`width`, `height`,
/// `positionAbsolute`, ...) so they survive an import/export cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NodeRecord", into = "NodeRecord")]
pub struct Node {
    pub id: String,
    pub position: Position,
    pub data: NodeData,
    /// Keys under `data` that none of the node kinds use.
    pub data_extra: Map<String, Value>,
    pub extra: Map<String, Value>,
}

impl Node {
    /// Create a node of `kind` at `position` with a fresh id and default data.
    pub fn new(kind: NodeKind, position: Position) -> Self {
        Self {
            id: new_node_id(kind),
            position,
            data: NodeData::default_for(kind),
            data_extra: Map::new(),
            extra: Map::new(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    pub fn label(&self) -> &str {
        self.data.label()
    }
}

/// Wire shape of a node as found in exported JSON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NodeRecord {
    id: String,
    #[serde(rename = "type")]
    kind: NodeKind,
    #[serde(default)]
    position: Position,
    #[serde(default)]
    data: NodeDataRecord,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeDataRecord {
    #[serde(default)]
    label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    columns: Option<Vec<Column>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    font_size: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    font_weight: Option<FontWeight>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Accepts `"16px"`, `"16"` or `16`; anything else falls back to the default.
fn parse_font_size(value: Option<&Value>) -> FontSize {
    let pixels = match value {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().trim_end_matches("px").trim().parse().ok(),
        _ => None,
    };
    pixels
        .and_then(|px| FontSize::ALL.into_iter().find(|size| u64::from(size.pixels()) == px))
        .unwrap_or_default()
}

impl TryFrom<NodeRecord> for Node {
    type Error = String;

    fn try_from(record: NodeRecord) -> Result<Self, Self::Error> {
        if record.id.is_empty() {
            return Err("node id must not be empty".to_string());
        }

        let NodeDataRecord {
            label,
            columns,
            font_size,
            font_weight,
            extra: data_extra,
        } = record.data;

        let data = match record.kind {
            NodeKind::Process => NodeData::Process { label },
            NodeKind::Application => NodeData::Application { label },
            NodeKind::Database => NodeData::Database {
                label,
                columns: columns.unwrap_or_default(),
            },
            NodeKind::Schema => NodeData::Schema {
                label,
                columns: columns.unwrap_or_default(),
            },
            NodeKind::Text => NodeData::Text {
                label,
                font_size: parse_font_size(font_size.as_ref()),
                font_weight: font_weight.unwrap_or_default(),
            },
        };

        Ok(Node {
            id: record.id,
            position: record.position,
            data,
            data_extra,
            extra: record.extra,
        })
    }
}

impl From<Node> for NodeRecord {
    fn from(node: Node) -> Self {
        let kind = node.kind();
        let mut data = match node.data {
            NodeData::Process { label } | NodeData::Application { label } => NodeDataRecord {
                label,
                ..Default::default()
            },
            NodeData::Database { label, columns } | NodeData::Schema { label, columns } => {
                NodeDataRecord {
                    label,
                    columns: Some(columns),
                    ..Default::default()
                }
            }
            NodeData::Text {
                label,
                font_size,
                font_weight,
            } => NodeDataRecord {
                label,
                columns: None,
                font_size: Some(Value::String(format!("{}px", font_size.pixels()))),
                font_weight: Some(font_weight),
                extra: Map::new(),
            },
        };
        data.extra = node.data_extra;

        NodeRecord {
            id: node.id,
            kind,
            position: node.position,
            data,
            extra: node.extra,
        }
    }
}
