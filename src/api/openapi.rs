//! OpenAPI specification definition.
//!
//! Aggregates all route handlers and schemas for OpenAPI documentation generation.

use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health_check,
        // Diagram
        crate::routes::diagram::get_palette,
        crate::routes::diagram::get_diagram,
        crate::routes::diagram::get_interaction_state,
        crate::routes::diagram::take_notifications,
        crate::routes::diagram::list_node_views,
        crate::routes::diagram::drop_node,
        crate::routes::diagram::delete_node,
        crate::routes::diagram::update_node_label,
        crate::routes::diagram::move_node,
        crate::routes::diagram::set_node_columns,
        crate::routes::diagram::toggle_columns,
        crate::routes::diagram::duplicate_node,
        crate::routes::diagram::click_node,
        crate::routes::diagram::double_click_node,
        crate::routes::diagram::get_node_view,
        crate::routes::diagram::connect,
        crate::routes::diagram::patch_edge,
        crate::routes::diagram::delete_edge,
        crate::routes::diagram::click_edge,
        crate::routes::diagram::double_click_edge,
        crate::routes::diagram::get_edge_geometry,
        crate::routes::diagram::edge_editor_action,
        crate::routes::diagram::click_pane,
        crate::routes::diagram::toggle_delete_mode,
        crate::routes::diagram::key_down,
        crate::routes::diagram::delete_selected,
        crate::routes::diagram::open_context_menu,
        crate::routes::diagram::close_context_menu,
        crate::routes::diagram::context_menu_action,
        // Import / export
        crate::routes::import::import_file,
        crate::routes::import::import_text,
        crate::routes::export::export_diagram,
        // Authentication
        crate::routes::auth::auth_status,
        crate::routes::auth::sign_in,
        crate::routes::auth::refresh_token,
        crate::routes::auth::logout,
        // Flows
        crate::routes::flows::list_flows,
        crate::routes::flows::save_flow,
        crate::routes::flows::get_flow,
        crate::routes::flows::update_flow,
        crate::routes::flows::delete_flow,
        crate::routes::flows::load_flow,
        // OpenAPI
        crate::routes::openapi::serve_openapi_json,
    ),
    components(schemas(
        crate::models::NodeKind,
        crate::models::Column,
        crate::models::ColumnField,
        crate::models::FontSize,
        crate::models::FontWeight,
        crate::models::PathType,
        crate::models::ArrowDirection,
        crate::models::MarkerKind,
        crate::models::LineStyle,
        crate::models::Position,
        crate::models::Flow,
        crate::models::FlowSummary,
        crate::models::Notification,
        crate::models::NotificationVariant,
        crate::services::edge_editor::EdgePatch,
        crate::services::edge_editor::EdgeEditorAction,
        crate::services::export_service::ExportFormat,
        crate::services::import_service::ImportFormat,
        crate::services::import_service::ImportSummary,
        crate::services::mapper_service::KeyFocus,
        crate::services::mapper_service::ContextTarget,
        crate::services::mapper_service::ContextAction,
        crate::services::mapper_service::DeletionSummary,
        crate::services::session_service::UserIdentity,
        crate::routes::diagram::PaletteEntry,
        crate::routes::diagram::DropNodeRequest,
        crate::routes::diagram::UpdateLabelRequest,
        crate::routes::diagram::MoveNodeRequest,
        crate::routes::diagram::SetColumnsRequest,
        crate::routes::diagram::ConnectRequest,
        crate::routes::diagram::KeyRequest,
        crate::routes::diagram::KeyResponse,
        crate::routes::diagram::DeleteModeResponse,
        crate::routes::diagram::ToggleColumnsResponse,
        crate::routes::diagram::ContextMenuRequest,
        crate::routes::import::ImportTextRequest,
        crate::routes::auth::AuthStatusResponse,
        crate::routes::auth::RefreshTokenRequest,
        crate::routes::flows::FlowListResponse,
        crate::routes::flows::SaveFlowRequest,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Diagram", description = "Nodes, edges and canvas interaction"),
        (name = "Import", description = "JSON and C4 text import"),
        (name = "Export", description = "PNG, JSON and TXT downloads"),
        (name = "Auth", description = "Token status and refresh"),
        (name = "Flows", description = "Saved flows, at most five per user"),
        (name = "OpenAPI", description = "OpenAPI specification endpoints")
    ),
    info(
        title = "Process Mapper API",
        description = "Diagram editor for data process maps: typed nodes, edges, exports and saved flows",
        version = "1.0.0",
        contact(
            name = "API Support",
            email = "mark@olliver.me.uk"
        ),
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8081/api/v1", description = "Local development server")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        // Update version to match Cargo.toml version
        openapi.info.version = env!("CARGO_PKG_VERSION").to_string();

        use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::new);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
