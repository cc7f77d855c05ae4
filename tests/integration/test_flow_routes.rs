//! Saved flows and auth over HTTP

use axum::http::StatusCode;
use axum_test::TestServer;
use process_mapper_api::config::ApiConfig;
use process_mapper_api::routes::{self, AppState};
use process_mapper_api::services::JwtService;
use serde_json::{Value, json};
use uuid::Uuid;

const SECRET: &str = "flow-routes-secret-0123456789abcdefgh";

struct Harness {
    server: TestServer,
    state: AppState,
}

impl Harness {
    fn new() -> Self {
        let state = AppState::new(ApiConfig::default(), JwtService::new(SECRET));
        let server = TestServer::new(routes::create_app(state.clone())).unwrap();
        Self { server, state }
    }

    fn token_for(&self, user_id: Uuid) -> String {
        self.state
            .jwt
            .generate_token_pair(user_id, "mapper@example.com", "session-1")
            .unwrap()
            .access_token
    }

    async fn save(&self, token: &str, name: &str) -> axum_test::TestResponse {
        self.server
            .post("/api/v1/flows")
            .authorization_bearer(token)
            .json(&json!({ "name": name }))
            .await
    }
}

#[tokio::test]
async fn test_flows_require_a_token() {
    let harness = Harness::new();

    let response = harness.server.get("/api/v1/flows").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = harness
        .server
        .post("/api/v1/flows")
        .authorization_bearer("not-a-jwt")
        .json(&json!({"name": "x"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_save_list_get_delete() {
    let harness = Harness::new();
    let token = harness.token_for(Uuid::new_v4());

    harness
        .server
        .post("/api/v1/diagram/nodes")
        .json(&json!({"kind": "process", "x": 0, "y": 0}))
        .await;

    let response = harness.save(&token, "Billing").await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let flow: Value = response.json();
    let id = flow["id"].as_str().unwrap().to_string();
    assert_eq!(flow["name"], "Billing");

    let listing: Value = harness
        .server
        .get("/api/v1/flows")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(listing["count"], 1);
    assert_eq!(listing["limit"], 5);
    assert_eq!(listing["flows"][0]["id"], id.as_str());
    assert!(listing["flows"][0].get("data").is_none());

    let fetched: Value = harness
        .server
        .get(&format!("/api/v1/flows/{}", id))
        .authorization_bearer(&token)
        .await
        .json();
    let stored: Value = serde_json::from_str(fetched["data"].as_str().unwrap()).unwrap();
    assert_eq!(stored["nodes"][0]["type"], "process");

    let response = harness
        .server
        .delete(&format!("/api/v1/flows/{}", id))
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = harness
        .server
        .get(&format!("/api/v1/flows/{}", id))
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sixth_flow_is_conflict() {
    let harness = Harness::new();
    let token = harness.token_for(Uuid::new_v4());

    for i in 1..=5 {
        let response = harness.save(&token, &format!("Flow {}", i)).await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
    }

    let response = harness.save(&token, "Flow 6").await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(
        body["error"],
        "You can only save up to 5 flows. Delete one to save a new flow."
    );
}

#[tokio::test]
async fn test_limit_is_per_user() {
    let harness = Harness::new();
    let full = harness.token_for(Uuid::new_v4());
    let other = harness.token_for(Uuid::new_v4());

    for i in 1..=5 {
        harness.save(&full, &format!("Flow {}", i)).await;
    }

    let response = harness.save(&other, "Mine").await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let listing: Value = harness
        .server
        .get("/api/v1/flows")
        .authorization_bearer(&other)
        .await
        .json();
    assert_eq!(listing["count"], 1);
}

#[tokio::test]
async fn test_blank_name_is_bad_request() {
    let harness = Harness::new();
    let token = harness.token_for(Uuid::new_v4());

    let response = harness.save(&token, "   ").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_other_users_flow_is_not_found() {
    let harness = Harness::new();
    let owner = harness.token_for(Uuid::new_v4());
    let stranger = harness.token_for(Uuid::new_v4());

    let flow: Value = harness.save(&owner, "Private").await.json();
    let id = flow["id"].as_str().unwrap();

    let response = harness
        .server
        .post(&format!("/api/v1/flows/{}/load", id))
        .authorization_bearer(&stranger)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_then_load_restores_snapshot() {
    let harness = Harness::new();
    let token = harness.token_for(Uuid::new_v4());

    let flow: Value = harness.save(&token, "Snapshot").await.json();
    let id = flow["id"].as_str().unwrap().to_string();

    harness
        .server
        .post("/api/v1/diagram/nodes")
        .json(&json!({"kind": "schema", "x": 10, "y": 10}))
        .await;
    let updated = harness
        .server
        .put(&format!("/api/v1/flows/{}", id))
        .authorization_bearer(&token)
        .await;
    assert_eq!(updated.status_code(), StatusCode::OK);
    let updated: Value = updated.json();
    assert_eq!(updated["name"], "Snapshot");

    harness
        .server
        .post("/api/v1/diagram/nodes")
        .json(&json!({"kind": "process", "x": 400, "y": 10}))
        .await;

    let loaded = harness
        .server
        .post(&format!("/api/v1/flows/{}/load", id))
        .authorization_bearer(&token)
        .await;
    assert_eq!(loaded.status_code(), StatusCode::OK);
    let document: Value = loaded.json();
    let nodes = document["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0]["type"], "schema");
}

#[tokio::test]
async fn test_auth_status_session_and_logout() {
    let harness = Harness::new();
    let user_id = Uuid::new_v4();
    let token = harness.token_for(user_id);

    let anonymous: Value = harness.server.get("/api/v1/auth/status").await.json();
    assert_eq!(anonymous["authenticated"], false);

    let status: Value = harness
        .server
        .get("/api/v1/auth/status")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(status["authenticated"], true);
    assert_eq!(status["user"]["user_id"], user_id.to_string());
    assert_eq!(status["session"], Value::Null);
    assert!(!harness.state.session.is_signed_in());

    let response = harness
        .server
        .post("/api/v1/auth/session")
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let status: Value = response.json();
    assert_eq!(status["session"]["user_id"], user_id.to_string());
    assert!(harness.state.session.is_signed_in());

    let response = harness
        .server
        .post("/api/v1/auth/logout")
        .authorization_bearer(&token)
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    assert!(!harness.state.session.is_signed_in());
}

#[tokio::test]
async fn test_session_holder_blocks_other_users_flow_changes() {
    let harness = Harness::new();
    let holder = harness.token_for(Uuid::new_v4());
    let other = harness.token_for(Uuid::new_v4());

    harness
        .server
        .post("/api/v1/auth/session")
        .authorization_bearer(&holder)
        .await;

    let response = harness.save(&other, "Intruder").await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let response = harness.save(&holder, "Mine").await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    harness
        .server
        .post("/api/v1/auth/logout")
        .authorization_bearer(&holder)
        .await;
    let response = harness.save(&other, "Now free").await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_refresh_token() {
    let harness = Harness::new();
    let pair = harness
        .state
        .jwt
        .generate_token_pair(Uuid::new_v4(), "mapper@example.com", "session-1")
        .unwrap();

    let response = harness
        .server
        .post("/api/v1/auth/refresh")
        .json(&json!({"refresh_token": pair.refresh_token}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let fresh: Value = response.json();
    assert!(fresh["access_token"].as_str().is_some());

    // An access token is not accepted as a refresh token
    let response = harness
        .server
        .post("/api/v1/auth/refresh")
        .json(&json!({"refresh_token": pair.access_token}))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}
