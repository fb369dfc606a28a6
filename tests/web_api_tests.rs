//! Integration tests for the Stagecard Web API.
//!
//! These tests require the `web` feature to be enabled:
//! ```bash
//! cargo test --features web web_api
//! ```

#![cfg(feature = "web")]

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;
use tower::ServiceExt;

use stagecard::config::Config;
use stagecard::models::{BalloonArea, ToolKind};
use stagecard::services::LayoutRepository;
use stagecard::web::{create_router, AppState};

mod fixtures;
use fixtures::*;

/// Creates a router over a temp copy of `template`, with an in-memory layout store.
fn create_test_app(template: &stagecard::models::WorkflowTemplate) -> (axum::Router, PathBuf, TempDir) {
    let (path, temp_dir) = create_temp_template_file(template);
    let state = AppState::new(Config::default(), path.clone(), LayoutRepository::in_memory())
        .expect("Failed to create app state");
    (create_router(state), path, temp_dir)
}

/// Sends a request with an optional JSON body and returns status and JSON body.
async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    (status, json)
}

async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None).await
}

// ============================================================================
// Health / Tools / Stages
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let (app, _path, _temp_dir) = create_test_app(&minimal_template());

    let (status, json) = get_json(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_list_tools_in_canonical_order() {
    let (app, _path, _temp_dir) = create_test_app(&minimal_template());

    let (status, json) = get_json(&app, "/api/tools").await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert_eq!(
        ids,
        vec![
            "management",
            "main_form",
            "stage_panel",
            "stage_actions",
            "comments",
            "signatures",
            "doc_view"
        ]
    );
}

#[tokio::test]
async fn test_list_stages() {
    let (app, _path, _temp_dir) = create_test_app(&sample_template());

    let (status, json) = get_json(&app, "/api/stages").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["template"], "Contratação padrão");
    let stages = json["stages"].as_array().unwrap();
    assert_eq!(stages.len(), 6);
    assert_eq!(stages[1]["id"], "dfd-approval");
    assert_eq!(stages[1]["status"], "in_progress");
}

#[tokio::test]
async fn test_get_stage_not_found() {
    let (app, _path, _temp_dir) = create_test_app(&minimal_template());

    let (status, json) = get_json(&app, "/api/stages/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("nope"));
}

#[tokio::test]
async fn test_patch_stage_persists() {
    let (app, path, _temp_dir) = create_test_app(&minimal_template());

    let (status, json) = send(
        &app,
        "PATCH",
        "/api/stages/review",
        Some(json!({"title": "  Revisão final ", "days": 4})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "Revisão final");
    assert_eq!(json["days"], 4);

    let stage = read_template_file(&path).stage(REVIEW_STAGE).unwrap().clone();
    assert_eq!(stage.title, "Revisão final");
    assert_eq!(stage.days, 4);
}

#[tokio::test]
async fn test_patch_stage_rejects_blank_title() {
    let (app, _path, _temp_dir) = create_test_app(&minimal_template());

    let (status, _) = send(&app, "PATCH", "/api/stages/review", Some(json!({"title": " "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "PATCH", "/api/stages/review", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Tools
// ============================================================================

#[tokio::test]
async fn test_disable_tool_cascades_and_updates_layout() {
    let (app, path, _temp_dir) = create_test_app(&sample_template());

    // stage_actions requires main_form on the dispatch stage
    let (status, json) = send(&app, "DELETE", "/api/stages/dispatch/tools/main_form", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["affected"], json!(["main_form", "stage_actions"]));
    assert_eq!(json["tools"], json!([]));

    let (_, layout) = get_json(&app, "/api/stages/dispatch/layout").await;
    assert_eq!(layout["layout"]["orderStack"], json!([]));

    let stage = read_template_file(&path).stage("dispatch").unwrap().clone();
    assert!(stage.tools.is_empty());
}

#[tokio::test]
async fn test_enable_tool_and_unknown_tool() {
    let (app, _path, _temp_dir) = create_test_app(&minimal_template());

    let (status, json) = send(&app, "PUT", "/api/stages/review/tools/signatures", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["affected"], json!(["signatures"]));

    let (status, _) = send(&app, "DELETE", "/api/stages/review/tools/main_form", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, json) = send(&app, "PUT", "/api/stages/review/tools/stage_actions", None).await;
    assert_eq!(json["affected"], json!(["stage_actions", "main_form"]));

    let (status, _) = send(&app, "PUT", "/api/stages/review/tools/fax", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_disable_comments_scenario() {
    let (app, _path, _temp_dir) = create_test_app(&minimal_template());

    let (status, json) = send(&app, "DELETE", "/api/stages/review/tools/comments", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["tools"], json!(["main_form"]));
    let (_, layout) = get_json(&app, "/api/stages/review/layout").await;
    assert_eq!(layout["layout"]["mode"], "stacked");
    assert_eq!(layout["layout"]["orderStack"], json!(["main_form"]));
}

// ============================================================================
// Layout
// ============================================================================

#[tokio::test]
async fn test_layout_mode_then_reset() {
    let (app, _path, _temp_dir) = create_test_app(&minimal_template());

    let (status, json) = get_json(&app, "/api/stages/review/layout").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["stored"], false);

    let (status, json) = send(
        &app,
        "PUT",
        "/api/stages/review/layout/mode",
        Some(json!({"mode": "40-60"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["stored"], true);
    assert_eq!(json["layout"]["mode"], "40-60");
    assert_eq!(json["layout"]["orderLeft"], json!(["main_form", "comments"]));

    let (status, _) = send(&app, "DELETE", "/api/stages/review/layout", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, json) = get_json(&app, "/api/stages/review/layout").await;
    assert_eq!(json["stored"], false);
    assert_eq!(json["layout"]["mode"], "stacked");
}

#[tokio::test]
async fn test_put_layout_is_reconciled() {
    let (app, _path, _temp_dir) = create_test_app(&minimal_template());

    let body = json!({
        "mode": "50-50",
        "scale": 5.0,
        "orderLeft": ["comments", "signatures"],
        "orderRight": [],
        "orderStack": []
    });
    let (status, json) = send(&app, "PUT", "/api/stages/review/layout", Some(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["layout"]["orderLeft"], json!(["comments", "main_form"]));
    assert_eq!(json["layout"]["scale"], 2.0);
}

#[tokio::test]
async fn test_layout_mode_restores_stored_split() {
    let (app, _path, _temp_dir) = create_test_app(&minimal_template());

    let body = json!({
        "mode": "50-50",
        "orderLeft": ["main_form"],
        "orderRight": ["comments"],
        "orderStack": []
    });
    let (status, _) = send(&app, "PUT", "/api/stages/review/layout", Some(body)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(
        &app,
        "PUT",
        "/api/stages/review/layout/mode",
        Some(json!({"mode": "stacked"})),
    )
    .await;
    assert_eq!(json["layout"]["orderStack"], json!(["main_form", "comments"]));

    let (status, json) = send(
        &app,
        "PUT",
        "/api/stages/review/layout/mode",
        Some(json!({"mode": "60-40"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["layout"]["orderLeft"], json!(["main_form"]));
    assert_eq!(json["layout"]["orderRight"], json!(["comments"]));
    assert_eq!(json["layout"]["orderStack"], json!([]));
}

#[tokio::test]
async fn test_layout_mode_rejects_unknown_mode() {
    let (app, _path, _temp_dir) = create_test_app(&minimal_template());

    let (status, _) = send(
        &app,
        "PUT",
        "/api/stages/review/layout/mode",
        Some(json!({"mode": "70-30"})),
    )
    .await;

    assert!(status.is_client_error());
}

// ============================================================================
// Catalogs
// ============================================================================

#[tokio::test]
async fn test_get_catalog_sample() {
    let (app, _path, _temp_dir) = create_test_app(&sample_template());

    let (status, json) = get_json(&app, "/api/stages/dispatch/catalogs/action_catalog").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["area"], "action_catalog");
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["label"], "Encaminhar");
    assert_eq!(items[0]["meta"]["action_type"], "forward");
}

#[tokio::test]
async fn test_unknown_area_is_not_found() {
    let (app, _path, _temp_dir) = create_test_app(&minimal_template());

    let (status, _) = get_json(&app, "/api/stages/review/catalogs/attachments").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_balloon_validates_label() {
    let (app, path, _temp_dir) = create_test_app(&minimal_template());
    let uri = "/api/stages/review/catalogs/required_fields";

    let (status, json) = send(&app, "POST", uri, Some(json!({"label": "Urgente", "color": "amber"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["label"], "Urgente");
    assert_eq!(json["color"], "amber");
    assert!(!json["id"].as_str().unwrap().is_empty());

    let (status, json) = send(&app, "POST", uri, Some(json!({"label": "URGENTE"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());

    let (status, _) = send(&app, "POST", uri, Some(json!({"label": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let template = read_template_file(&path);
    assert_eq!(
        catalog_labels(&template, REVIEW_STAGE, BalloonArea::RequiredFields),
        vec!["Urgente"]
    );
}

#[tokio::test]
async fn test_catalog_scenario_over_http() {
    let (app, path, _temp_dir) = create_test_app(&minimal_template());
    let uri = "/api/stages/review/catalogs/required_fields";

    let (_, urgente) = send(&app, "POST", uri, Some(json!({"label": "Urgente", "color": "amber"}))).await;
    let (_, rotineiro) = send(&app, "POST", uri, Some(json!({"label": "Rotineiro"}))).await;
    let urgente_id = urgente["id"].as_str().unwrap().to_string();
    let rotineiro_id = rotineiro["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("{uri}/order"),
        Some(json!({"ids": [rotineiro_id, urgente_id]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(
        &app,
        "PATCH",
        &format!("{uri}/{urgente_id}"),
        Some(json!({"label": "Prioritário"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["color"], "amber");

    let (_, json) = get_json(&app, uri).await;
    let labels: Vec<&str> = json["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["Rotineiro", "Prioritário"]);

    let template = read_template_file(&path);
    assert_eq!(
        catalog_labels(&template, REVIEW_STAGE, BalloonArea::RequiredFields),
        vec!["Rotineiro", "Prioritário"]
    );
}

#[tokio::test]
async fn test_reorder_rejects_partial_order() {
    let (app, _path, _temp_dir) = create_test_app(&minimal_template());
    let uri = "/api/stages/review/catalogs/required_fields";
    let (_, a) = send(&app, "POST", uri, Some(json!({"label": "A"}))).await;
    send(&app, "POST", uri, Some(json!({"label": "B"}))).await;

    let (status, _) = send(
        &app,
        "PUT",
        &format!("{uri}/order"),
        Some(json!({"ids": [a["id"]]})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_balloon_icon_and_clear() {
    let (app, _path, _temp_dir) = create_test_app(&minimal_template());
    let uri = "/api/stages/review/catalogs/required_fields";
    let (_, item) = send(&app, "POST", uri, Some(json!({"label": "Urgente"}))).await;
    let item_uri = format!("{uri}/{}", item["id"].as_str().unwrap());

    let (status, json) = send(&app, "PATCH", &item_uri, Some(json!({"icon": "flag"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["icon"], "flag");

    let (status, json) = send(&app, "PATCH", &item_uri, Some(json!({"clear_icon": true}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json.get("icon").is_none());

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("{uri}/missing"),
        Some(json!({"label": "X"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_balloon_is_idempotent() {
    let (app, path, _temp_dir) = create_test_app(&minimal_template());
    let uri = "/api/stages/review/catalogs/required_fields";
    let (_, item) = send(&app, "POST", uri, Some(json!({"label": "Urgente"}))).await;
    let item_uri = format!("{uri}/{}", item["id"].as_str().unwrap());

    let (status, _) = send(&app, "DELETE", &item_uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &item_uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let template = read_template_file(&path);
    assert!(catalog_labels(&template, REVIEW_STAGE, BalloonArea::RequiredFields).is_empty());
    assert!(template.stage(REVIEW_STAGE).unwrap().has_tool(ToolKind::MainForm));
}
