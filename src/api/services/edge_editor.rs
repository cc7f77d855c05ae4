//! Floating property editor for a single edge.

use crate::models::{ArrowDirection, Edge, LineStyle, MarkerKind, PathType};
use crate::render::EdgeGeometry;
use serde::{Deserialize, Serialize};

/// Partial update of an edge's editable properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct EdgePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_type: Option<PathType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrow_direction: Option<ArrowDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker_kind: Option<MarkerKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_style: Option<LineStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl EdgePatch {
    pub fn is_empty(&self) -> bool {
        self.path_type.is_none()
            && self.arrow_direction.is_none()
            && self.marker_kind.is_none()
            && self.line_style.is_none()
            && self.animated.is_none()
            && self.text.is_none()
    }

    pub fn apply(&self, edge: &mut Edge) {
        if let Some(path_type) = self.path_type {
            edge.data.path_type = path_type;
        }
        if let Some(direction) = self.arrow_direction {
            edge.set_arrow_direction(direction);
        }
        if let Some(kind) = self.marker_kind {
            edge.set_marker_kind(kind);
        }
        if let Some(line_style) = self.line_style {
            edge.set_line_style(line_style);
        }
        if let Some(animated) = self.animated {
            edge.animated = animated;
        }
        if let Some(text) = &self.text {
            edge.data.text = text.clone();
        }
    }
}

/// One user action inside the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum EdgeEditorAction {
    SetPathType(PathType),
    SetArrowDirection(ArrowDirection),
    SetMarkerKind(MarkerKind),
    SetLineStyle(LineStyle),
    SetAnimated(bool),
    /// Typing in the label field; not applied until `Confirm`.
    EditLabel(String),
    Confirm,
}

/// Current state of the editor as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeEditorView {
    pub edge_id: String,
    pub anchor_x: f64,
    pub anchor_y: f64,
    pub path_type: PathType,
    pub arrow_direction: ArrowDirection,
    pub marker_kind: MarkerKind,
    pub line_style: LineStyle,
    pub animated: bool,
    pub label_draft: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeEditor {
    edge_id: String,
    anchor: (f64, f64),
    label_draft: String,
}

impl EdgeEditor {
    /// Open the editor on `edge`, anchored at the path midpoint.
    pub fn open(edge: &Edge, geometry: Option<&EdgeGeometry>) -> Self {
        Self {
            edge_id: edge.id.clone(),
            anchor: geometry.map(|g| (g.label_x, g.label_y)).unwrap_or_default(),
            label_draft: edge.data.text.clone(),
        }
    }

    pub fn edge_id(&self) -> &str {
        &self.edge_id
    }

    pub fn label_draft(&self) -> &str {
        &self.label_draft
    }

    /// Apply `action`; returns the change to write to the edge, if any.
    ///
    /// Selectors and the animated toggle take effect immediately. Label text
    /// only reaches the edge on explicit confirmation.
    pub fn handle(&mut self, action: EdgeEditorAction) -> Option<EdgePatch> {
        let patch = match action {
            EdgeEditorAction::SetPathType(path_type) => EdgePatch {
                path_type: Some(path_type),
                ..Default::default()
            },
            EdgeEditorAction::SetArrowDirection(direction) => EdgePatch {
                arrow_direction: Some(direction),
                ..Default::default()
            },
            EdgeEditorAction::SetMarkerKind(kind) => EdgePatch {
                marker_kind: Some(kind),
                ..Default::default()
            },
            EdgeEditorAction::SetLineStyle(line_style) => EdgePatch {
                line_style: Some(line_style),
                ..Default::default()
            },
            EdgeEditorAction::SetAnimated(animated) => EdgePatch {
                animated: Some(animated),
                ..Default::default()
            },
            EdgeEditorAction::EditLabel(text) => {
                self.label_draft = text;
                return None;
            }
            EdgeEditorAction::Confirm => EdgePatch {
                text: Some(self.label_draft.clone()),
                ..Default::default()
            },
        };
        Some(patch)
    }

    pub fn view(&self, edge: &Edge) -> EdgeEditorView {
        EdgeEditorView {
            edge_id: self.edge_id.clone(),
            anchor_x: self.anchor.0,
            anchor_y: self.anchor.1,
            path_type: edge.data.path_type,
            arrow_direction: edge.arrow_direction(),
            marker_kind: edge.marker_kind(),
            line_style: edge.line_style(),
            animated: edge.animated,
            label_draft: self.label_draft.clone(),
        }
    }
}
