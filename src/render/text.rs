//! Inline editing state of a text annotation.

use crate::models::{FontSize, FontWeight, Node};

/// Edit session opened by clicking a text annotation.
///
/// Holds the uncommitted text and font choice; the controller commits them
/// when the text area loses focus.
#[derive(Debug, Clone, PartialEq)]
pub struct TextAnnotationEditor {
    node_id: String,
    draft: String,
    font_size: FontSize,
    font_weight: FontWeight,
}

/// What a committed edit writes back to the node.
#[derive(Debug, Clone, PartialEq)]
pub struct TextCommit {
    pub node_id: String,
    pub label: String,
    pub font_size: FontSize,
    pub font_weight: FontWeight,
}

impl TextAnnotationEditor {
    /// Start editing `node`; `None` if it is not a text annotation.
    pub fn begin(node: &Node) -> Option<Self> {
        let (font_size, font_weight) = node.data.font()?;
        Some(Self {
            node_id: node.id.clone(),
            draft: node.label().to_string(),
            font_size,
            font_weight,
        })
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn font_size(&self) -> FontSize {
        self.font_size
    }

    pub fn font_weight(&self) -> FontWeight {
        self.font_weight
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn set_font_size(&mut self, font_size: FontSize) {
        self.font_size = font_size;
    }

    pub fn set_font_weight(&mut self, font_weight: FontWeight) {
        self.font_weight = font_weight;
    }

    /// Finish the session (focus lost).
    pub fn commit(self) -> TextCommit {
        TextCommit {
            node_id: self.node_id,
            label: self.draft,
            font_size: self.font_size,
            font_weight: self.font_weight,
        }
    }
}
