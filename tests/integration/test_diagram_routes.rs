//! Diagram editing over HTTP

use axum::http::StatusCode;
use axum_test::TestServer;
use process_mapper_api::config::ApiConfig;
use process_mapper_api::routes::{self, AppState};
use process_mapper_api::services::JwtService;
use serde_json::{Value, json};

fn server() -> TestServer {
    let app_state = AppState::new(ApiConfig::default(), JwtService::new("diagram-routes-secret"));
    TestServer::new(routes::create_app(app_state)).unwrap()
}

async fn drop_node(server: &TestServer, kind: &str, x: f64, y: f64) -> String {
    let response = server
        .post("/api/v1/diagram/nodes")
        .json(&json!({"kind": kind, "x": x, "y": y}))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let node: Value = response.json();
    node["id"].as_str().unwrap().to_string()
}

async fn connect(server: &TestServer, source: &str, target: &str) -> String {
    let response = server
        .post("/api/v1/diagram/edges")
        .json(&json!({"source": source, "target": target}))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let edge: Value = response.json();
    edge["id"].as_str().unwrap().to_string()
}

async fn diagram(server: &TestServer) -> Value {
    server.get("/api/v1/diagram").await.json()
}

#[tokio::test]
async fn test_drop_node_returns_wire_format() {
    let server = server();
    let response = server
        .post("/api/v1/diagram/nodes")
        .json(&json!({"kind": "database", "x": 40, "y": 80}))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let node: Value = response.json();
    assert_eq!(node["type"], "database");
    assert_eq!(node["position"], json!({"x": 40.0, "y": 80.0}));
    assert_eq!(node["data"]["label"], "Database");
    assert_eq!(node["data"]["columns"], json!([]));
    assert!(node["id"].as_str().unwrap().starts_with("database-"));
}

#[tokio::test]
async fn test_delete_node_cascades_to_edges() {
    let server = server();
    let a = drop_node(&server, "process", 0.0, 0.0).await;
    let b = drop_node(&server, "application", 300.0, 0.0).await;
    let c = drop_node(&server, "database", 150.0, 200.0).await;
    connect(&server, &a, &b).await;
    connect(&server, &b, &c).await;
    let survivor = connect(&server, &a, &c).await;

    let response = server.delete(&format!("/api/v1/diagram/nodes/{}", b)).await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let document = diagram(&server).await;
    assert_eq!(document["nodes"].as_array().unwrap().len(), 2);
    let edges = document["edges"].as_array().unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0]["id"], survivor.as_str());

    let again = server.delete(&format!("/api/v1/diagram/nodes/{}", b)).await;
    assert_eq!(again.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_connection_errors() {
    let server = server();
    let a = drop_node(&server, "process", 0.0, 0.0).await;
    let b = drop_node(&server, "schema", 0.0, 200.0).await;
    let note = drop_node(&server, "text", 300.0, 0.0).await;
    connect(&server, &a, &b).await;

    let duplicate = server
        .post("/api/v1/diagram/edges")
        .json(&json!({"source": a, "target": b}))
        .await;
    assert_eq!(duplicate.status_code(), StatusCode::CONFLICT);

    let to_text = server
        .post("/api/v1/diagram/edges")
        .json(&json!({"source": a, "target": note}))
        .await;
    assert_eq!(to_text.status_code(), StatusCode::BAD_REQUEST);

    let missing = server
        .post("/api/v1/diagram/edges")
        .json(&json!({"source": a, "target": "process-missing"}))
        .await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    let body: Value = missing.json();
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn test_patch_edge_properties() {
    let server = server();
    let a = drop_node(&server, "process", 0.0, 0.0).await;
    let b = drop_node(&server, "process", 0.0, 200.0).await;
    let edge = connect(&server, &a, &b).await;

    let response = server
        .patch(&format!("/api/v1/diagram/edges/{}", edge))
        .json(&json!({
            "arrow_direction": "both",
            "line_style": "dashed",
            "path_type": "smoothstep",
            "text": "feeds"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let edge: Value = response.json();
    assert_eq!(edge["markerStart"]["type"], "arrowclosed");
    assert_eq!(edge["markerEnd"]["type"], "arrowclosed");
    assert_eq!(edge["style"]["strokeDasharray"], "5,5");
    assert_eq!(edge["data"]["pathType"], "smoothstep");
    assert_eq!(edge["data"]["text"], "feeds");
}

#[tokio::test]
async fn test_patch_edge_marker_kind() {
    let server = server();
    let a = drop_node(&server, "process", 0.0, 0.0).await;
    let b = drop_node(&server, "process", 0.0, 200.0).await;
    let edge = connect(&server, &a, &b).await;

    let response = server
        .patch(&format!("/api/v1/diagram/edges/{}", edge))
        .json(&json!({"marker_kind": "arrow", "arrow_direction": "both"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let edge: Value = response.json();
    assert_eq!(edge["markerStart"]["type"], "arrow");
    assert_eq!(edge["markerEnd"]["type"], "arrow");
}

#[tokio::test]
async fn test_edge_editor_flow() {
    let server = server();
    let a = drop_node(&server, "process", 0.0, 0.0).await;
    let b = drop_node(&server, "process", 0.0, 200.0).await;
    let edge = connect(&server, &a, &b).await;

    let state: Value = server
        .post(&format!("/api/v1/diagram/edges/{}/double-click", edge))
        .await
        .json();
    assert_eq!(state["edge_editor"]["edge_id"], edge.as_str());

    server
        .post("/api/v1/diagram/edge-editor")
        .json(&json!({"action": "edit_label", "value": "nightly"}))
        .await;
    let document = diagram(&server).await;
    assert_eq!(document["edges"][0]["data"]["text"], "");

    let response = server
        .post("/api/v1/diagram/edge-editor")
        .json(&json!({"action": "confirm"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let document = diagram(&server).await;
    assert_eq!(document["edges"][0]["data"]["text"], "nightly");

    let geometry: Value = server
        .get(&format!("/api/v1/diagram/edges/{}/geometry", edge))
        .await
        .json();
    assert_eq!(geometry["label_angle"], 90.0);
}

#[tokio::test]
async fn test_duplicate_offsets_position() {
    let server = server();
    let id = drop_node(&server, "schema", 100.0, 100.0).await;

    let response = server
        .post(&format!("/api/v1/diagram/nodes/{}/duplicate", id))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let copy: Value = response.json();
    assert_ne!(copy["id"], id.as_str());
    assert_eq!(copy["position"], json!({"x": 150.0, "y": 150.0}));
}

#[tokio::test]
async fn test_columns_expand_and_collapse() {
    let server = server();
    let id = drop_node(&server, "database", 0.0, 0.0).await;
    let toggle = format!("/api/v1/diagram/nodes/{}/toggle-columns", id);
    let view = format!("/api/v1/diagram/nodes/{}/view", id);

    let empty: Value = server.post(&toggle).await.json();
    assert_eq!(empty["expanded"], false);

    let response = server
        .put(&format!("/api/v1/diagram/nodes/{}/columns", id))
        .json(&json!({"columns": [{"name": "id", "type": "int"}]}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let opened: Value = server.post(&toggle).await.json();
    assert_eq!(opened["expanded"], true);
    let node_view: Value = server.get(&view).await.json();
    assert_eq!(node_view["columns"]["rows"][0]["name"], "id");

    let closed: Value = server.post(&toggle).await.json();
    assert_eq!(closed["expanded"], false);
    let node_view: Value = server.get(&view).await.json();
    assert_eq!(node_view["columns"]["rows"], json!([]));
}

#[tokio::test]
async fn test_columns_on_process_are_rejected() {
    let server = server();
    let id = drop_node(&server, "process", 0.0, 0.0).await;

    let response = server
        .put(&format!("/api/v1/diagram/nodes/{}/columns", id))
        .json(&json!({"columns": []}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_label_update_on_unknown_node() {
    let server = server();
    let response = server
        .put("/api/v1/diagram/nodes/process-missing/label")
        .json(&json!({"label": "Nope"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_key_respects_focus() {
    let server = server();
    let id = drop_node(&server, "process", 0.0, 0.0).await;
    server
        .post(&format!("/api/v1/diagram/nodes/{}/click", id))
        .await;

    let ignored: Value = server
        .post("/api/v1/diagram/keys")
        .json(&json!({"key": "Delete", "focus": "text_input"}))
        .await
        .json();
    assert_eq!(ignored["handled"], false);

    let handled: Value = server
        .post("/api/v1/diagram/keys")
        .json(&json!({"key": "Backspace"}))
        .await
        .json();
    assert_eq!(handled["handled"], true);
    assert_eq!(diagram(&server).await["nodes"], json!([]));
}

#[tokio::test]
async fn test_delete_mode_click_deletes() {
    let server = server();
    let id = drop_node(&server, "application", 0.0, 0.0).await;

    let mode: Value = server.post("/api/v1/diagram/delete-mode").await.json();
    assert_eq!(mode["delete_mode"], true);

    server
        .post(&format!("/api/v1/diagram/nodes/{}/click", id))
        .await;
    assert_eq!(diagram(&server).await["nodes"], json!([]));
}

#[tokio::test]
async fn test_context_menu_actions() {
    let server = server();
    let id = drop_node(&server, "process", 10.0, 10.0).await;

    let state: Value = server
        .post("/api/v1/diagram/context-menu")
        .json(&json!({"target": {"kind": "node", "id": id}, "x": 20, "y": 20}))
        .await
        .json();
    assert_eq!(state["context_menu"]["target"]["id"], id.as_str());

    let response = server.post("/api/v1/diagram/context-menu/duplicate").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(diagram(&server).await["nodes"].as_array().unwrap().len(), 2);

    let closed = server.post("/api/v1/diagram/context-menu/delete").await;
    assert_eq!(closed.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_text_annotation_defaults_and_font() {
    let server = server();
    let id = drop_node(&server, "text", 0.0, 0.0).await;

    let node: Value = server
        .put(&format!("/api/v1/diagram/nodes/{}/label", id))
        .json(&json!({"label": "Runs nightly", "font_size": "20px", "font_weight": "bold"}))
        .await
        .json();

    assert_eq!(node["data"]["label"], "Runs nightly");
    assert_eq!(node["data"]["fontSize"], "20px");
    assert_eq!(node["data"]["fontWeight"], "bold");

    let view: Value = server
        .get(&format!("/api/v1/diagram/nodes/{}/view", id))
        .await
        .json();
    assert_eq!(view["anchors"], json!([]));
    assert_eq!(view["icon"], "type");
}
