//! Diagram controller.
//!
//! Owns the node and edge collections of the canvas together with the
//! interaction state around them (selection, delete mode, open editors,
//! context menu, pending notifications). Every mutation of the diagram goes
//! through this type so the invariants hold in one place:
//!
//! * node ids are unique
//! * every edge references two existing nodes
//! * deleting a node removes the edges touching it

use super::edge_editor::{EdgeEditor, EdgeEditorAction, EdgeEditorView, EdgePatch};
use super::schema_editor::{ColumnSink, SchemaEditor};
use crate::models::{
    Column, ColumnField, DiagramDocument, Edge, FontSize, FontWeight, Node, NodeData, NodeKind,
    Notification, Position,
};
use crate::render::{
    AnchorRole, EdgeGeometry, NodeView, RenderContext, TextAnnotationEditor, edge_geometry,
    render_node, renderer_for,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashSet, VecDeque};
use thiserror::Error;
use tracing::{info, warn};

/// Offset applied to a duplicated node, in canvas units on both axes.
pub const DUPLICATE_OFFSET: f64 = 50.0;

/// Notifications kept while nobody collects them; older ones are dropped.
pub const MAX_PENDING_NOTIFICATIONS: usize = 50;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiagramError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),
    #[error("Edge not found: {0}")]
    EdgeNotFound(String),
    #[error("Node {node_id} of kind {kind} has no column list")]
    NoColumns { node_id: String, kind: NodeKind },
    #[error("Column index {index} out of range for node {node_id}")]
    ColumnOutOfRange { node_id: String, index: usize },
    #[error("Invalid connection: {0}")]
    InvalidConnection(String),
    #[error("Edge already exists: {0}")]
    DuplicateEdge(String),
    #[error("Duplicate node id: {0}")]
    DuplicateNodeId(String),
    #[error("No editor is open")]
    NoOpenEditor,
}

/// Where keyboard focus is when a key is pressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum KeyFocus {
    #[default]
    Canvas,
    /// An input or text area has focus; editing keys belong to it.
    TextInput,
    /// Inside the node property dialog, which swallows its own key events.
    Dialog,
}

/// Element a context menu was opened on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ContextTarget {
    Node(String),
    Edge(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContextAction {
    Duplicate,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextMenu {
    pub target: ContextTarget,
    pub x: f64,
    pub y: f64,
}

impl ContextMenu {
    /// Actions offered for the target; edges cannot be duplicated.
    pub fn actions(&self) -> Vec<ContextAction> {
        match self.target {
            ContextTarget::Node(_) => vec![ContextAction::Duplicate, ContextAction::Delete],
            ContextTarget::Edge(_) => vec![ContextAction::Delete],
        }
    }
}

/// Node property dialog opened by double click.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDialog {
    node_id: String,
    label_draft: String,
    columns: Option<SchemaEditor>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDialogView {
    pub node_id: String,
    pub kind: NodeKind,
    pub label_draft: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<Column>>,
}

/// Result of a bulk delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct DeletionSummary {
    pub nodes: usize,
    pub edges: usize,
}

/// Snapshot of the interaction state, for clients that redraw from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionState {
    pub delete_mode: bool,
    pub selected_node: Option<String>,
    pub selected_edges: Vec<String>,
    pub expanded_nodes: Vec<String>,
    pub editing_text: Option<String>,
    pub node_dialog: Option<NodeDialogView>,
    pub edge_editor: Option<EdgeEditorView>,
    pub context_menu: Option<ContextMenu>,
}

#[derive(Debug, Default)]
pub struct MapperService {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    /// Document fields besides nodes and edges (viewport), kept for export.
    extra: Map<String, Value>,
    selected_node: Option<String>,
    delete_mode: bool,
    expanded: HashSet<String>,
    text_editor: Option<TextAnnotationEditor>,
    node_dialog: Option<NodeDialog>,
    edge_editor: Option<EdgeEditor>,
    context_menu: Option<ContextMenu>,
    notifications: VecDeque<Notification>,
}

impl MapperService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(document: DiagramDocument) -> Self {
        let mut service = Self::new();
        service.replace_diagram(document);
        service
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn is_delete_mode(&self) -> bool {
        self.delete_mode
    }

    pub fn selected_node(&self) -> Option<&str> {
        self.selected_node.as_deref()
    }

    /// Current diagram as a document.
    pub fn document(&self) -> DiagramDocument {
        DiagramDocument {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
            extra: self.extra.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// A new node of `kind` at `position`; not yet part of the diagram.
    pub fn create_node(kind: NodeKind, position: Position) -> Node {
        Node::new(kind, position)
    }

    /// Create a node from a palette drop and add it to the diagram.
    pub fn drop_node(&mut self, kind: NodeKind, position: Position) -> &Node {
        let node = Self::create_node(kind, position);
        info!(
            "Dropped {} node {} at ({}, {})",
            kind, node.id, position.x, position.y
        );
        self.nodes.push(node);
        &self.nodes[self.nodes.len() - 1]
    }

    /// Add a fully formed node; its id must not be in use.
    pub fn add_node(&mut self, node: Node) -> Result<&Node, DiagramError> {
        if self.node(&node.id).is_some() {
            return Err(DiagramError::DuplicateNodeId(node.id));
        }
        self.nodes.push(node);
        Ok(&self.nodes[self.nodes.len() - 1])
    }

    /// Replace a node's label; text annotations may also change font.
    ///
    /// Returns `false` and changes nothing when the node does not exist.
    pub fn update_node_label(
        &mut self,
        node_id: &str,
        label: impl Into<String>,
        font_size: Option<FontSize>,
        font_weight: Option<FontWeight>,
    ) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == node_id) else {
            return false;
        };
        node.data.set_label(label.into());
        if let NodeData::Text {
            font_size: size,
            font_weight: weight,
            ..
        } = &mut node.data
        {
            if let Some(font_size) = font_size {
                *size = font_size;
            }
            if let Some(font_weight) = font_weight {
                *weight = font_weight;
            }
        }
        true
    }

    /// Move a node to `position`.
    pub fn move_node(&mut self, node_id: &str, position: Position) -> Result<(), DiagramError> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.id == node_id)
            .ok_or_else(|| DiagramError::NodeNotFound(node_id.to_string()))?;
        node.position = position;
        Ok(())
    }

    /// Replace the column list of a database or schema node.
    pub fn set_node_columns(
        &mut self,
        node_id: &str,
        columns: Vec<Column>,
    ) -> Result<(), DiagramError> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.id == node_id)
            .ok_or_else(|| DiagramError::NodeNotFound(node_id.to_string()))?;
        let kind = node.kind();
        let slot = node
            .data
            .columns_mut()
            .ok_or_else(|| DiagramError::NoColumns {
                node_id: node_id.to_string(),
                kind,
            })?;
        *slot = columns;
        if slot.is_empty() {
            self.expanded.remove(node_id);
        }
        Ok(())
    }

    /// Delete a node and every edge touching it.
    pub fn delete_node(&mut self, node_id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != node_id);
        if self.nodes.len() == before {
            return false;
        }

        let removed_edges: Vec<String> = self
            .edges
            .iter()
            .filter(|e| e.touches(node_id))
            .map(|e| e.id.clone())
            .collect();
        self.edges.retain(|e| !e.touches(node_id));

        self.forget_node(node_id);
        for edge_id in &removed_edges {
            self.forget_edge(edge_id);
        }
        info!(
            "Deleted node {} and {} connected edge(s)",
            node_id,
            removed_edges.len()
        );
        true
    }

    /// Copy a node (kind, label, columns, font) at a fixed offset with a new id.
    pub fn duplicate_node(&mut self, node_id: &str) -> Result<&Node, DiagramError> {
        let original = self
            .node(node_id)
            .ok_or_else(|| DiagramError::NodeNotFound(node_id.to_string()))?;

        let mut copy = Node::new(
            original.kind(),
            original
                .position
                .offset(DUPLICATE_OFFSET, DUPLICATE_OFFSET),
        );
        copy.data = original.data.clone();
        copy.extra = original.extra.clone();
        copy.extra.remove("selected");
        copy.extra.remove("dragging");
        copy.extra.remove("positionAbsolute");

        info!("Duplicated node {} as {}", node_id, copy.id);
        self.add_node(copy)
    }

    /// Flip the column list of a tabular node open or closed.
    ///
    /// Nodes without rows have no disclosure control and stay collapsed.
    pub fn toggle_columns(&mut self, node_id: &str) -> Result<bool, DiagramError> {
        let node = self
            .node(node_id)
            .ok_or_else(|| DiagramError::NodeNotFound(node_id.to_string()))?;
        let has_rows = node.data.columns().is_some_and(|c| !c.is_empty());
        if !has_rows {
            self.expanded.remove(node_id);
            return Ok(false);
        }
        if self.expanded.remove(node_id) {
            Ok(false)
        } else {
            self.expanded.insert(node_id.to_string());
            Ok(true)
        }
    }

    // ------------------------------------------------------------------
    // Edges
    // ------------------------------------------------------------------

    /// Connect two anchors with a new edge carrying the editor defaults.
    pub fn connect(
        &mut self,
        source: &str,
        target: &str,
        source_handle: Option<String>,
        target_handle: Option<String>,
    ) -> Result<&Edge, DiagramError> {
        if source == target {
            return Err(DiagramError::InvalidConnection(format!(
                "node {} cannot connect to itself",
                source
            )));
        }
        let source_node = self
            .node(source)
            .ok_or_else(|| DiagramError::NodeNotFound(source.to_string()))?;
        let target_node = self
            .node(target)
            .ok_or_else(|| DiagramError::NodeNotFound(target.to_string()))?;

        check_anchor(source_node, source_handle.as_deref(), AnchorRole::Source)?;
        check_anchor(target_node, target_handle.as_deref(), AnchorRole::Target)?;

        let edge = Edge::new(source, target, source_handle, target_handle);
        if self
            .edges
            .iter()
            .any(|e| e.id == edge.id || e.connects_same(&edge))
        {
            return Err(DiagramError::DuplicateEdge(edge.id));
        }

        info!("Connected {} -> {} ({})", source, target, edge.id);
        self.edges.push(edge);
        Ok(&self.edges[self.edges.len() - 1])
    }

    pub fn delete_edge(&mut self, edge_id: &str) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| e.id != edge_id);
        let removed = self.edges.len() != before;
        if removed {
            self.forget_edge(edge_id);
            info!("Deleted edge {}", edge_id);
        }
        removed
    }

    /// Apply a property change to an edge.
    pub fn update_edge(&mut self, edge_id: &str, patch: &EdgePatch) -> Result<&Edge, DiagramError> {
        let index = self
            .edges
            .iter()
            .position(|e| e.id == edge_id)
            .ok_or_else(|| DiagramError::EdgeNotFound(edge_id.to_string()))?;
        patch.apply(&mut self.edges[index]);
        Ok(&self.edges[index])
    }

    /// Path and label placement of an edge.
    pub fn edge_geometry(&self, edge_id: &str) -> Option<EdgeGeometry> {
        let edge = self.edge(edge_id)?;
        let source = self.node(&edge.source)?;
        let target = self.node(&edge.target)?;
        Some(edge_geometry(edge, source, target))
    }

    // ------------------------------------------------------------------
    // Selection and modes
    // ------------------------------------------------------------------

    /// Toggle delete mode; returns the new state.
    ///
    /// Delete mode and selection exclude each other, so entering it drops
    /// the selection and closes any open editor.
    pub fn toggle_delete_mode(&mut self) -> bool {
        self.delete_mode = !self.delete_mode;
        if self.delete_mode {
            self.commit_text_edit();
            self.selected_node = None;
            for edge in &mut self.edges {
                edge.selected = false;
            }
            self.node_dialog = None;
            self.edge_editor = None;
            self.context_menu = None;
        }
        info!(
            "Delete mode {}",
            if self.delete_mode { "on" } else { "off" }
        );
        self.delete_mode
    }

    /// Primary click on a node: delete it in delete mode, select it otherwise.
    ///
    /// Selecting a text annotation starts editing it in place.
    pub fn click_node(&mut self, node_id: &str) -> Result<(), DiagramError> {
        if self.node(node_id).is_none() {
            return Err(DiagramError::NodeNotFound(node_id.to_string()));
        }
        self.context_menu = None;

        if self.delete_mode {
            self.delete_node(node_id);
            return Ok(());
        }

        if self
            .text_editor
            .as_ref()
            .is_some_and(|editor| editor.node_id() != node_id)
        {
            self.commit_text_edit();
        }
        self.selected_node = Some(node_id.to_string());

        if self.text_editor.is_none()
            && let Some(node) = self.node(node_id)
        {
            self.text_editor = TextAnnotationEditor::begin(node);
        }
        Ok(())
    }

    /// Primary click on an edge: delete it in delete mode, otherwise toggle
    /// its selection and deselect every other edge.
    pub fn click_edge(&mut self, edge_id: &str) -> Result<(), DiagramError> {
        if self.edge(edge_id).is_none() {
            return Err(DiagramError::EdgeNotFound(edge_id.to_string()));
        }
        self.context_menu = None;

        if self.delete_mode {
            self.delete_edge(edge_id);
            return Ok(());
        }

        for edge in &mut self.edges {
            edge.selected = if edge.id == edge_id {
                !edge.selected
            } else {
                false
            };
        }
        Ok(())
    }

    /// Click on empty canvas.
    pub fn click_pane(&mut self) {
        self.commit_text_edit();
        self.selected_node = None;
        self.context_menu = None;
    }

    // ------------------------------------------------------------------
    // Keyboard
    // ------------------------------------------------------------------

    /// Handle a key press; returns whether it changed the diagram.
    ///
    /// Delete and Backspace remove the selection unless focus is in a text
    /// input or the property dialog.
    pub fn key_down(&mut self, key: &str, focus: KeyFocus) -> bool {
        if focus != KeyFocus::Canvas {
            return false;
        }
        match key {
            "Delete" | "Backspace" => {
                let summary = self.delete_selected_elements();
                summary.nodes > 0 || summary.edges > 0
            }
            "Escape" => {
                self.context_menu = None;
                self.edge_editor = None;
                false
            }
            _ => false,
        }
    }

    /// Delete the selected node (with its edges) and every selected edge.
    pub fn delete_selected_elements(&mut self) -> DeletionSummary {
        let mut summary = DeletionSummary::default();

        if let Some(node_id) = self.selected_node.take() {
            let edges_before = self.edges.len();
            if self.delete_node(&node_id) {
                summary.nodes = 1;
                summary.edges += edges_before - self.edges.len();
            }
        }

        let selected: Vec<String> = self
            .edges
            .iter()
            .filter(|e| e.selected)
            .map(|e| e.id.clone())
            .collect();
        for edge_id in selected {
            if self.delete_edge(&edge_id) {
                summary.edges += 1;
            }
        }
        summary
    }

    // ------------------------------------------------------------------
    // Text annotations
    // ------------------------------------------------------------------

    pub fn text_editor(&self) -> Option<&TextAnnotationEditor> {
        self.text_editor.as_ref()
    }

    pub fn edit_text_draft(&mut self, text: impl Into<String>) -> Result<(), DiagramError> {
        let editor = self.text_editor.as_mut().ok_or(DiagramError::NoOpenEditor)?;
        editor.set_draft(text);
        Ok(())
    }

    /// Pick a font size from the toolbar; applies to the node right away.
    pub fn set_text_font_size(&mut self, font_size: FontSize) -> Result<(), DiagramError> {
        let editor = self.text_editor.as_mut().ok_or(DiagramError::NoOpenEditor)?;
        editor.set_font_size(font_size);
        let node_id = editor.node_id().to_string();
        let label = self.node(&node_id).map(|n| n.label().to_string());
        if let Some(label) = label {
            self.update_node_label(&node_id, label, Some(font_size), None);
        }
        Ok(())
    }

    pub fn set_text_font_weight(&mut self, font_weight: FontWeight) -> Result<(), DiagramError> {
        let editor = self.text_editor.as_mut().ok_or(DiagramError::NoOpenEditor)?;
        editor.set_font_weight(font_weight);
        let node_id = editor.node_id().to_string();
        let label = self.node(&node_id).map(|n| n.label().to_string());
        if let Some(label) = label {
            self.update_node_label(&node_id, label, None, Some(font_weight));
        }
        Ok(())
    }

    /// Write the open text edit back to its node (the text area lost focus).
    pub fn commit_text_edit(&mut self) -> bool {
        let Some(editor) = self.text_editor.take() else {
            return false;
        };
        let commit = editor.commit();
        self.update_node_label(
            &commit.node_id,
            commit.label,
            Some(commit.font_size),
            Some(commit.font_weight),
        )
    }

    // ------------------------------------------------------------------
    // Node property dialog
    // ------------------------------------------------------------------

    /// Double click on a node: select it and open its property dialog.
    pub fn double_click_node(&mut self, node_id: &str) -> Result<(), DiagramError> {
        let node = self
            .node(node_id)
            .ok_or_else(|| DiagramError::NodeNotFound(node_id.to_string()))?;
        let label_draft = node.label().to_string();
        let columns = if node.kind().has_columns() {
            Some(SchemaEditor::open(self, node_id)?)
        } else {
            None
        };

        self.selected_node = Some(node_id.to_string());
        self.context_menu = None;
        self.node_dialog = Some(NodeDialog {
            node_id: node_id.to_string(),
            label_draft,
            columns,
        });
        Ok(())
    }

    pub fn node_dialog(&self) -> Option<NodeDialogView> {
        let dialog = self.node_dialog.as_ref()?;
        let node = self.node(&dialog.node_id)?;
        Some(NodeDialogView {
            node_id: dialog.node_id.clone(),
            kind: node.kind(),
            label_draft: dialog.label_draft.clone(),
            columns: dialog.columns.as_ref().map(|c| c.columns().to_vec()),
        })
    }

    pub fn set_dialog_label_draft(&mut self, text: impl Into<String>) -> Result<(), DiagramError> {
        let dialog = self.node_dialog.as_mut().ok_or(DiagramError::NoOpenEditor)?;
        dialog.label_draft = text.into();
        Ok(())
    }

    /// The label field lost focus: commit the draft.
    pub fn blur_dialog_label(&mut self) -> Result<(), DiagramError> {
        let dialog = self.node_dialog.as_ref().ok_or(DiagramError::NoOpenEditor)?;
        let (node_id, label) = (dialog.node_id.clone(), dialog.label_draft.clone());
        if !self.update_node_label(&node_id, label, None, None) {
            return Err(DiagramError::NodeNotFound(node_id));
        }
        Ok(())
    }

    /// Close the dialog. An uncommitted label draft is discarded.
    pub fn close_node_dialog(&mut self) {
        self.node_dialog = None;
    }

    pub fn dialog_add_column(&mut self) -> Result<(), DiagramError> {
        self.with_column_editor(|editor, sink| editor.add_column(sink))
    }

    pub fn dialog_remove_column(&mut self, index: usize) -> Result<(), DiagramError> {
        self.with_column_editor(|editor, sink| editor.remove_column(index, sink))
    }

    pub fn dialog_edit_column(
        &mut self,
        index: usize,
        field: ColumnField,
        value: impl Into<String>,
    ) -> Result<(), DiagramError> {
        let value = value.into();
        self.with_column_editor(|editor, sink| editor.edit_column(index, field, value, sink))
    }

    fn with_column_editor<F>(&mut self, f: F) -> Result<(), DiagramError>
    where
        F: FnOnce(&mut SchemaEditor, &mut Self) -> Result<(), DiagramError>,
    {
        let mut editor = self
            .node_dialog
            .as_mut()
            .and_then(|d| d.columns.take())
            .ok_or(DiagramError::NoOpenEditor)?;
        let result = f(&mut editor, self);
        if let Some(dialog) = self.node_dialog.as_mut() {
            dialog.columns = Some(editor);
        }
        result
    }

    // ------------------------------------------------------------------
    // Edge property editor
    // ------------------------------------------------------------------

    /// Double click on an edge opens its property editor at the midpoint.
    pub fn double_click_edge(&mut self, edge_id: &str) -> Result<(), DiagramError> {
        let edge = self
            .edge(edge_id)
            .ok_or_else(|| DiagramError::EdgeNotFound(edge_id.to_string()))?;
        let geometry = self.edge_geometry(edge_id);
        self.edge_editor = Some(EdgeEditor::open(edge, geometry.as_ref()));
        self.context_menu = None;
        Ok(())
    }

    pub fn edge_editor(&self) -> Option<EdgeEditorView> {
        let editor = self.edge_editor.as_ref()?;
        let edge = self.edge(editor.edge_id())?;
        Some(editor.view(edge))
    }

    /// Feed a user action to the open edge editor.
    pub fn edge_editor_action(&mut self, action: EdgeEditorAction) -> Result<(), DiagramError> {
        let editor = self.edge_editor.as_mut().ok_or(DiagramError::NoOpenEditor)?;
        let edge_id = editor.edge_id().to_string();
        if let Some(patch) = editor.handle(action) {
            self.update_edge(&edge_id, &patch)?;
        }
        Ok(())
    }

    pub fn close_edge_editor(&mut self) {
        self.edge_editor = None;
    }

    // ------------------------------------------------------------------
    // Context menu
    // ------------------------------------------------------------------

    /// Secondary click on a node or edge at pointer position (`x`, `y`).
    pub fn open_context_menu(
        &mut self,
        target: ContextTarget,
        x: f64,
        y: f64,
    ) -> Result<&ContextMenu, DiagramError> {
        match &target {
            ContextTarget::Node(id) if self.node(id).is_none() => {
                return Err(DiagramError::NodeNotFound(id.clone()));
            }
            ContextTarget::Edge(id) if self.edge(id).is_none() => {
                return Err(DiagramError::EdgeNotFound(id.clone()));
            }
            _ => {}
        }
        Ok(self.context_menu.insert(ContextMenu { target, x, y }))
    }

    pub fn context_menu(&self) -> Option<&ContextMenu> {
        self.context_menu.as_ref()
    }

    /// Run a menu action; the menu closes afterwards either way.
    pub fn context_menu_action(&mut self, action: ContextAction) -> Result<(), DiagramError> {
        let menu = self.context_menu.take().ok_or(DiagramError::NoOpenEditor)?;
        match (action, menu.target) {
            (ContextAction::Duplicate, ContextTarget::Node(id)) => {
                self.duplicate_node(&id)?;
            }
            (ContextAction::Delete, ContextTarget::Node(id)) => {
                self.delete_node(&id);
            }
            (ContextAction::Delete, ContextTarget::Edge(id)) => {
                self.delete_edge(&id);
            }
            (ContextAction::Duplicate, ContextTarget::Edge(id)) => {
                warn!("Ignoring duplicate action on edge {}", id);
            }
        }
        Ok(())
    }

    pub fn context_menu_duplicate(&mut self) -> Result<(), DiagramError> {
        self.context_menu_action(ContextAction::Duplicate)
    }

    pub fn context_menu_delete(&mut self) -> Result<(), DiagramError> {
        self.context_menu_action(ContextAction::Delete)
    }

    pub fn close_context_menu(&mut self) {
        self.context_menu = None;
    }

    // ------------------------------------------------------------------
    // Whole diagram
    // ------------------------------------------------------------------

    /// Swap in a new diagram (import or flow load).
    ///
    /// Edges pointing at missing nodes are dropped. Interaction state is
    /// reset since it refers to the old diagram.
    pub fn replace_diagram(&mut self, mut document: DiagramDocument) {
        let dropped = document.prune_dangling_edges();
        if !dropped.is_empty() {
            warn!(
                "Dropped {} edge(s) with missing endpoints: {:?}",
                dropped.len(),
                dropped
            );
        }

        // Only one node can be selected; the last flagged one wins.
        let mut selected_node = None;
        for node in &mut document.nodes {
            if node.extra.remove("selected") == Some(Value::Bool(true)) {
                selected_node = Some(node.id.clone());
            }
        }

        self.nodes = document.nodes;
        self.edges = document.edges;
        self.extra = document.extra;
        self.selected_node = selected_node;
        self.expanded.clear();
        self.text_editor = None;
        self.node_dialog = None;
        self.edge_editor = None;
        self.context_menu = None;
        info!(
            "Loaded diagram with {} node(s) and {} edge(s)",
            self.nodes.len(),
            self.edges.len()
        );
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    pub fn render_node(&self, node_id: &str) -> Option<NodeView> {
        let node = self.node(node_id)?;
        let selected = self.selection_set();
        Some(render_node(node, &self.render_context(&selected)))
    }

    pub fn render_nodes(&self) -> Vec<NodeView> {
        let selected = self.selection_set();
        let ctx = self.render_context(&selected);
        self.nodes.iter().map(|n| render_node(n, &ctx)).collect()
    }

    pub fn interaction(&self) -> InteractionState {
        let mut expanded: Vec<String> = self.expanded.iter().cloned().collect();
        expanded.sort();
        InteractionState {
            delete_mode: self.delete_mode,
            selected_node: self.selected_node.clone(),
            selected_edges: self
                .edges
                .iter()
                .filter(|e| e.selected)
                .map(|e| e.id.clone())
                .collect(),
            expanded_nodes: expanded,
            editing_text: self.text_editor.as_ref().map(|e| e.node_id().to_string()),
            node_dialog: self.node_dialog(),
            edge_editor: self.edge_editor(),
            context_menu: self.context_menu.clone(),
        }
    }

    fn selection_set(&self) -> HashSet<String> {
        self.selected_node.iter().cloned().collect()
    }

    fn render_context<'a>(&'a self, selected: &'a HashSet<String>) -> RenderContext<'a> {
        RenderContext {
            selected,
            expanded: &self.expanded,
            text_editor: self.text_editor.as_ref(),
        }
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    pub fn notify(&mut self, notification: Notification) {
        if notification.is_error() {
            warn!("{}: {}", notification.title, notification.description);
        } else {
            info!("{}: {}", notification.title, notification.description);
        }
        if self.notifications.len() >= MAX_PENDING_NOTIFICATIONS
            && let Some(dropped) = self.notifications.pop_front()
        {
            warn!("Notification queue full, dropping \"{}\"", dropped.title);
        }
        self.notifications.push_back(notification);
    }

    pub fn pending_notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    /// Hand out queued notifications, oldest first, and clear the queue.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    // Drop interaction state referring to a removed node.
    fn forget_node(&mut self, node_id: &str) {
        if self.selected_node.as_deref() == Some(node_id) {
            self.selected_node = None;
        }
        self.expanded.remove(node_id);
        if self
            .text_editor
            .as_ref()
            .is_some_and(|e| e.node_id() == node_id)
        {
            self.text_editor = None;
        }
        if self
            .node_dialog
            .as_ref()
            .is_some_and(|d| d.node_id == node_id)
        {
            self.node_dialog = None;
        }
        if matches!(&self.context_menu, Some(ContextMenu { target: ContextTarget::Node(id), .. }) if id == node_id)
        {
            self.context_menu = None;
        }
    }

    fn forget_edge(&mut self, edge_id: &str) {
        if self
            .edge_editor
            .as_ref()
            .is_some_and(|e| e.edge_id() == edge_id)
        {
            self.edge_editor = None;
        }
        if matches!(&self.context_menu, Some(ContextMenu { target: ContextTarget::Edge(id), .. }) if id == edge_id)
        {
            self.context_menu = None;
        }
    }
}

impl ColumnSink for MapperService {
    fn set_node_columns(
        &mut self,
        node_id: &str,
        columns: Vec<Column>,
    ) -> Result<(), DiagramError> {
        MapperService::set_node_columns(self, node_id, columns)
    }
}

/// A handle, when given, must be an anchor of `node` with the right role.
fn check_anchor(node: &Node, handle: Option<&str>, role: AnchorRole) -> Result<(), DiagramError> {
    let anchors = renderer_for(node.kind()).anchors(&node.id);
    if anchors.is_empty() {
        return Err(DiagramError::InvalidConnection(format!(
            "{} nodes have no anchors",
            node.kind()
        )));
    }
    match handle {
        None => Ok(()),
        Some(handle) if anchors.iter().any(|a| a.id == handle && a.role == role) => Ok(()),
        Some(handle) => Err(DiagramError::InvalidConnection(format!(
            "{} is not a {} anchor of {}",
            handle,
            role.as_str(),
            node.id
        ))),
    }
}
