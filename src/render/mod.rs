//! Render descriptors for nodes and edges.
//!
//! Nothing here draws pixels; the module computes what the canvas needs to
//! draw (node views, anchor points, edge paths and label placement).

pub mod edge;
pub mod node;
pub mod text;

pub use edge::{EdgeGeometry, Point, bezier_geometry, edge_geometry, upright_angle};
pub use node::{
    Anchor, AnchorRole, BorderEmphasis, ColumnListView, FontToolbar, NodeBounds, NodeRenderer,
    NodeView, RenderContext, TextBlockView, render_node, renderer_for,
};
pub use text::{TextAnnotationEditor, TextCommit};
