//! Column editor for database and schema nodes.
//!
//! The editor keeps a local copy of the node's columns so the dialog can show
//! rows while they are half filled in, and pushes every change straight to
//! the model; there is no separate save step.

use crate::models::{Column, ColumnField};
use crate::services::mapper_service::{DiagramError, MapperService};

/// Receiver of column changes, normally the mapper controller.
pub trait ColumnSink {
    fn set_node_columns(&mut self, node_id: &str, columns: Vec<Column>)
    -> Result<(), DiagramError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaEditor {
    node_id: String,
    columns: Vec<Column>,
}

impl SchemaEditor {
    /// Open the editor for `node_id`, copying the node's current columns.
    pub fn open(mapper: &MapperService, node_id: &str) -> Result<Self, DiagramError> {
        let node = mapper
            .node(node_id)
            .ok_or_else(|| DiagramError::NodeNotFound(node_id.to_string()))?;
        let columns = node
            .data
            .columns()
            .ok_or_else(|| DiagramError::NoColumns {
                node_id: node_id.to_string(),
                kind: node.kind(),
            })?
            .to_vec();

        Ok(Self {
            node_id: node_id.to_string(),
            columns,
        })
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Re-read the columns from the model, dropping local state.
    pub fn sync(&mut self, mapper: &MapperService) -> Result<(), DiagramError> {
        *self = Self::open(mapper, &self.node_id)?;
        Ok(())
    }

    /// Append an empty row.
    pub fn add_column(&mut self, sink: &mut impl ColumnSink) -> Result<(), DiagramError> {
        let mut next = self.columns.clone();
        next.push(Column::default());
        self.publish(next, sink)
    }

    pub fn remove_column(
        &mut self,
        index: usize,
        sink: &mut impl ColumnSink,
    ) -> Result<(), DiagramError> {
        if index >= self.columns.len() {
            return Err(DiagramError::ColumnOutOfRange {
                node_id: self.node_id.clone(),
                index,
            });
        }
        let mut next = self.columns.clone();
        next.remove(index);
        self.publish(next, sink)
    }

    pub fn edit_column(
        &mut self,
        index: usize,
        field: ColumnField,
        value: impl Into<String>,
        sink: &mut impl ColumnSink,
    ) -> Result<(), DiagramError> {
        let mut next = self.columns.clone();
        let column = next
            .get_mut(index)
            .ok_or_else(|| DiagramError::ColumnOutOfRange {
                node_id: self.node_id.clone(),
                index,
            })?;
        match field {
            ColumnField::Name => column.name = value.into(),
            ColumnField::Type => column.data_type = value.into(),
        }
        self.publish(next, sink)
    }

    // The model is updated first so a rejected change leaves the local copy
    // matching what the canvas shows.
    fn publish(
        &mut self,
        next: Vec<Column>,
        sink: &mut impl ColumnSink,
    ) -> Result<(), DiagramError> {
        sink.set_node_columns(&self.node_id, next.clone())?;
        self.columns = next;
        Ok(())
    }
}
