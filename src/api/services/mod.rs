//! Services module - the diagram controller and the services around it.

pub mod edge_editor;
pub mod export_service;
pub mod flows_dialog;
pub mod import_service;
pub mod jwt_service;
pub mod mapper_service;
pub mod schema_editor;
pub mod session_service;

// Re-export for convenience
pub use edge_editor::{EdgeEditor, EdgeEditorAction, EdgeEditorView, EdgePatch};
pub use export_service::{ExportArtifact, ExportFormat, ExportService};
pub use flows_dialog::{FlowsDialog, FlowsError, RefreshResult, RefreshTicket};
pub use import_service::{ImportError, ImportFormat, ImportService, ImportSummary};
pub use jwt_service::{Claims, JwtService, SharedJwtService, TokenPair, TokenType};
pub use mapper_service::{
    ContextAction, ContextMenu, ContextTarget, DeletionSummary, DiagramError, InteractionState,
    KeyFocus, MapperService, NodeDialogView,
};
pub use schema_editor::{ColumnSink, SchemaEditor};
pub use session_service::{SessionContext, SessionSubscription, UserIdentity};
