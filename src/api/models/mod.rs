// Models module - contains Node, Edge, Column, DiagramDocument, Flow and enums

pub mod column;
pub mod diagram;
pub mod edge;
#[path = "enums.rs"]
pub mod enums;
pub mod flow;
pub mod ids;
pub mod node;
pub mod notification;

pub use column::{Column, ColumnField};
pub use diagram::DiagramDocument;
pub use edge::{Edge, EdgeData, EdgeStyle, Marker};
pub use enums::{
    ArrowDirection, FontSize, FontWeight, LineStyle, MarkerKind, NodeKind, PathType, Side,
};
pub use flow::{Flow, FlowSummary};
pub use node::{Node, NodeData, Position};
pub use notification::{Notification, NotificationVariant};
