//! Node variant renderers.
//!
//! Each node kind has a renderer that turns a [`Node`] plus the current
//! interaction state into a [`NodeView`]: a plain description of what the
//! canvas draws (border emphasis, anchors, icon, label and the kind-specific
//! body). The browser draws the view; tests and the PNG exporter read it.

use super::text::TextAnnotationEditor;
use crate::models::{Column, FontSize, FontWeight, Node, NodeKind, Side};
use serde::Serialize;
use std::collections::HashSet;

pub const DEFAULT_NODE_WIDTH: f64 = 150.0;
pub const DEFAULT_NODE_HEIGHT: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorRole {
    Target,
    Source,
}

impl AnchorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnchorRole::Target => "target",
            AnchorRole::Source => "source",
        }
    }
}

/// A connection point on the border of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anchor {
    pub id: String,
    pub side: Side,
    pub role: AnchorRole,
}

impl Anchor {
    fn new(node_id: &str, side: Side, role: AnchorRole) -> Self {
        Self {
            id: format!("{}-{}-{}", node_id, side.as_str(), role.as_str()),
            side,
            role,
        }
    }
}

/// Work out which side an anchor id refers to (`{node}-{side}-{role}`).
pub fn anchor_side(handle: &str) -> Option<Side> {
    let without_role = handle
        .strip_suffix("-target")
        .or_else(|| handle.strip_suffix("-source"))?;
    Side::ALL
        .into_iter()
        .find(|side| without_role.ends_with(&format!("-{}", side.as_str())))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderEmphasis {
    Normal,
    Selected,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnListView {
    /// The disclosure control is only shown when there is something to show.
    pub disclosure_visible: bool,
    pub expanded: bool,
    /// Rows in insertion order; empty while collapsed.
    pub rows: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontToolbar {
    pub sizes: Vec<FontSize>,
    pub weights: Vec<FontWeight>,
    pub current_size: FontSize,
    pub current_weight: FontWeight,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlockView {
    pub text: String,
    pub editing: bool,
    pub autofocus: bool,
    pub font_size: FontSize,
    pub font_weight: FontWeight,
    pub toolbar: Option<FontToolbar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub id: String,
    pub kind: NodeKind,
    pub icon: &'static str,
    pub label: String,
    pub border: BorderEmphasis,
    pub anchors: Vec<Anchor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<ColumnListView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextBlockView>,
}

/// Interaction state a renderer needs besides the node itself.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub selected: &'a HashSet<String>,
    pub expanded: &'a HashSet<String>,
    pub text_editor: Option<&'a TextAnnotationEditor>,
}

impl RenderContext<'_> {
    pub fn is_selected(&self, node_id: &str) -> bool {
        self.selected.contains(node_id)
    }

    pub fn is_expanded(&self, node_id: &str) -> bool {
        self.expanded.contains(node_id)
    }
}

/// Shared contract of the per-kind renderers.
pub trait NodeRenderer: Send + Sync {
    fn kind(&self) -> NodeKind;

    fn icon(&self) -> &'static str;

    fn anchors(&self, node_id: &str) -> Vec<Anchor> {
        Side::ALL
            .into_iter()
            .flat_map(|side| {
                [
                    Anchor::new(node_id, side, AnchorRole::Target),
                    Anchor::new(node_id, side, AnchorRole::Source),
                ]
            })
            .collect()
    }

    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> NodeView {
        NodeView {
            id: node.id.clone(),
            kind: node.kind(),
            icon: self.icon(),
            label: node.label().to_string(),
            border: border_for(node, ctx),
            anchors: self.anchors(&node.id),
            columns: None,
            text: None,
        }
    }
}

fn border_for(node: &Node, ctx: &RenderContext<'_>) -> BorderEmphasis {
    if ctx.is_selected(&node.id) {
        BorderEmphasis::Selected
    } else {
        BorderEmphasis::Normal
    }
}

pub struct ProcessRenderer;

impl NodeRenderer for ProcessRenderer {
    fn kind(&self) -> NodeKind {
        NodeKind::Process
    }

    fn icon(&self) -> &'static str {
        "share-2"
    }
}

pub struct ApplicationRenderer;

impl NodeRenderer for ApplicationRenderer {
    fn kind(&self) -> NodeKind {
        NodeKind::Application
    }

    fn icon(&self) -> &'static str {
        "layout"
    }
}

/// Renderer for kinds that carry a collapsible column list.
pub struct TabularRenderer {
    kind: NodeKind,
    icon: &'static str,
}

impl NodeRenderer for TabularRenderer {
    fn kind(&self) -> NodeKind {
        self.kind
    }

    fn icon(&self) -> &'static str {
        self.icon
    }

    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> NodeView {
        let columns = node.data.columns().unwrap_or_default();
        let has_rows = !columns.is_empty();
        let expanded = has_rows && ctx.is_expanded(&node.id);

        NodeView {
            id: node.id.clone(),
            kind: node.kind(),
            icon: self.icon,
            label: node.label().to_string(),
            border: border_for(node, ctx),
            anchors: self.anchors(&node.id),
            columns: Some(ColumnListView {
                disclosure_visible: has_rows,
                expanded,
                rows: if expanded { columns.to_vec() } else { Vec::new() },
            }),
            text: None,
        }
    }
}

pub struct TextRenderer;

impl NodeRenderer for TextRenderer {
    fn kind(&self) -> NodeKind {
        NodeKind::Text
    }

    fn icon(&self) -> &'static str {
        "type"
    }

    fn anchors(&self, _node_id: &str) -> Vec<Anchor> {
        Vec::new()
    }

    fn render(&self, node: &Node, ctx: &RenderContext<'_>) -> NodeView {
        let (font_size, font_weight) = node.data.font().unwrap_or_default();
        let editor = ctx.text_editor.filter(|editor| editor.node_id() == node.id);
        let selected = ctx.is_selected(&node.id);

        // While editing, the draft and its pending font choice are what the
        // user sees.
        let (text, font_size, font_weight) = match editor {
            Some(editor) => (
                editor.draft().to_string(),
                editor.font_size(),
                editor.font_weight(),
            ),
            None => (node.label().to_string(), font_size, font_weight),
        };

        NodeView {
            id: node.id.clone(),
            kind: NodeKind::Text,
            icon: self.icon(),
            label: node.label().to_string(),
            border: border_for(node, ctx),
            anchors: Vec::new(),
            columns: None,
            text: Some(TextBlockView {
                text,
                editing: editor.is_some(),
                autofocus: editor.is_some(),
                font_size,
                font_weight,
                toolbar: selected.then(|| FontToolbar {
                    sizes: FontSize::ALL.to_vec(),
                    weights: FontWeight::ALL.to_vec(),
                    current_size: font_size,
                    current_weight: font_weight,
                }),
            }),
        }
    }
}

static PROCESS: ProcessRenderer = ProcessRenderer;
static APPLICATION: ApplicationRenderer = ApplicationRenderer;
static DATABASE: TabularRenderer = TabularRenderer {
    kind: NodeKind::Database,
    icon: "database",
};
static SCHEMA: TabularRenderer = TabularRenderer {
    kind: NodeKind::Schema,
    icon: "file-spreadsheet",
};
static TEXT: TextRenderer = TextRenderer;

/// Renderer registered for `kind`.
pub fn renderer_for(kind: NodeKind) -> &'static dyn NodeRenderer {
    match kind {
        NodeKind::Process => &PROCESS,
        NodeKind::Application => &APPLICATION,
        NodeKind::Database => &DATABASE,
        NodeKind::Schema => &SCHEMA,
        NodeKind::Text => &TEXT,
    }
}

/// Render `node` with the renderer of its kind.
pub fn render_node(node: &Node, ctx: &RenderContext<'_>) -> NodeView {
    renderer_for(node.kind()).render(node, ctx)
}

/// Axis-aligned box of a node on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NodeBounds {
    /// Bounds from the node position and the size the canvas measured, if any.
    pub fn of(node: &Node) -> Self {
        let measured = |key: &str| {
            node.extra
                .get(key)
                .and_then(|v| v.as_f64())
                .filter(|v| *v > 0.0)
        };
        Self {
            x: node.position.x,
            y: node.position.y,
            width: measured("width").unwrap_or(DEFAULT_NODE_WIDTH),
            height: measured("height").unwrap_or(DEFAULT_NODE_HEIGHT),
        }
    }

    /// Midpoint of the border on `side`.
    pub fn anchor_point(&self, side: Side) -> (f64, f64) {
        match side {
            Side::Top => (self.x + self.width / 2.0, self.y),
            Side::Right => (self.x + self.width, self.y + self.height / 2.0),
            Side::Bottom => (self.x + self.width / 2.0, self.y + self.height),
            Side::Left => (self.x, self.y + self.height / 2.0),
        }
    }
}
