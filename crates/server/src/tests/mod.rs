// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode as HttpStatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;

/// Helper to create test app state with in-memory persistence.
fn create_test_app_state() -> AppState {
    let persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        max_attempts: 3,
    }
}

fn create_test_app() -> Router {
    build_router(create_test_app_state())
}

/// Sends one request and returns the status with the decoded JSON body.
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (HttpStatusCode, Value) {
    let request: Request<Body> = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap();

    let response: Response = app.clone().oneshot(request).await.unwrap();
    let status: HttpStatusCode = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn admin(mut body: Value) -> Value {
    body["actor_id"] = json!("admin1");
    body["actor_role"] = json!("admin");
    body
}

async fn catalog(app: &Router, body: Value) -> Value {
    let (status, value): (HttpStatusCode, Value) =
        send(app, "POST", "/catalog/events", Some(admin(body))).await;
    assert_eq!(status, HttpStatusCode::OK, "{value}");
    value
}

#[tokio::test]
async fn test_health() {
    let app: Router = create_test_app();

    let (status, body): (HttpStatusCode, Value) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_create_preset_as_viewer_is_forbidden() {
    let app: Router = create_test_app();

    let (status, body): (HttpStatusCode, Value) = send(
        &app,
        "POST",
        "/presets",
        Some(json!({
            "actor_id": "viewer1",
            "actor_role": "viewer",
            "name": "Year 9",
            "categories": [1],
        })),
    )
    .await;

    assert_eq!(status, HttpStatusCode::FORBIDDEN);
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn test_unknown_role_is_unauthorized() {
    let app: Router = create_test_app();

    let (status, _): (HttpStatusCode, Value) = send(
        &app,
        "POST",
        "/setup",
        Some(json!({ "actor_id": "x", "actor_role": "teacher" })),
    )
    .await;

    assert_eq!(status, HttpStatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_empty_preset_is_unprocessable() {
    let app: Router = create_test_app();

    let (status, body): (HttpStatusCode, Value) = send(
        &app,
        "POST",
        "/presets",
        Some(admin(json!({ "name": "Nothing" }))),
    )
    .await;

    assert_eq!(status, HttpStatusCode::UNPROCESSABLE_ENTITY);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("at least one of the following entities")
    );
}

#[tokio::test]
async fn test_missing_resources_are_not_found() {
    let app: Router = create_test_app();

    let (preset_status, _): (HttpStatusCode, Value) =
        send(&app, "GET", "/presets/42", None).await;
    let (retry_status, _): (HttpStatusCode, Value) =
        send(&app, "POST", "/tasks/42/retry", Some(admin(json!({})))).await;

    assert_eq!(preset_status, HttpStatusCode::NOT_FOUND);
    assert_eq!(retry_status, HttpStatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bad_task_filter_is_bad_request() {
    let app: Router = create_test_app();

    let (status, _): (HttpStatusCode, Value) =
        send(&app, "GET", "/tasks?status=stuck", None).await;

    assert_eq!(status, HttpStatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_catalog_to_membership_flow() {
    let app: Router = create_test_app();

    let category: Value =
        catalog(&app, json!({ "op": "create_category", "name": "Science" })).await;
    let category_id: i64 = category["item"]["item_id"].as_i64().unwrap();
    let course: Value = catalog(
        &app,
        json!({ "op": "create_course", "fullname": "Chemistry", "category_id": category_id }),
    )
    .await;
    assert_eq!(course["event"], "course_created");

    let (status, preset): (HttpStatusCode, Value) = send(
        &app,
        "POST",
        "/presets",
        Some(admin(json!({ "name": "Year 9", "categories": [category_id] }))),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK, "{preset}");
    assert_eq!(preset["event"], "preset_created");

    let (_, tasks): (HttpStatusCode, Value) = send(&app, "GET", "/tasks", None).await;
    // One for the category, two for the course, one for the preset.
    assert_eq!(tasks["pending"], 4);

    let (status, report): (HttpStatusCode, Value) = send(
        &app,
        "POST",
        "/tasks/run",
        Some(admin(json!({ "limit": 100 }))),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(report["completed"], 4);
    assert_eq!(report["parked"], 0);

    let (_, courses): (HttpStatusCode, Value) = send(&app, "GET", "/catalog/courses", None).await;
    // Category, course and preset groups.
    assert_eq!(courses["courses"][0]["group_ids"].as_array().unwrap().len(), 3);

    let (status, groups): (HttpStatusCode, Value) = send(
        &app,
        "PUT",
        "/users/5/profile",
        Some(admin(json!({ "selections": { "preset": ["Year 9"] } }))),
    )
    .await;
    assert_eq!(status, HttpStatusCode::OK, "{groups}");
    assert_eq!(groups["groups"].as_array().unwrap().len(), 1);
    assert_eq!(groups["groups"][0]["item_type"], "preset");
}

#[tokio::test]
async fn test_setup_plan_and_run() {
    let app: Router = create_test_app();
    catalog(&app, json!({ "op": "create_tag", "name": "Lab" })).await;

    let (status, plan): (HttpStatusCode, Value) = send(&app, "GET", "/setup", None).await;
    assert_eq!(status, HttpStatusCode::OK);
    assert_eq!(plan["tags"], 1);

    let (status, run): (HttpStatusCode, Value) =
        send(&app, "POST", "/setup", Some(admin(json!({})))).await;
    assert_eq!(status, HttpStatusCode::OK, "{run}");
    assert_eq!(run["plan"]["entries"].as_array().unwrap().len(), 1);
}
