mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{day, memory_deps, test_settings};
use rusty_librarian::api::handlers::AppState;
use rusty_librarian::api::router::create_router;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

// ============================================================================
// APIテスト用のヘルパー関数
// ============================================================================

fn setup_app() -> axum::Router {
    let service_deps = memory_deps(test_settings());
    create_router(Arc::new(AppState { service_deps }))
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn post_command(app: &axum::Router, command: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/commands")
        .header("content-type", "application/json")
        .body(Body::from(command.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

/// 資料と会員を登録し、IDを返す
async fn register(app: &axum::Router) -> (String, String) {
    let (status, body) = post_command(
        app,
        json!({
            "action": "register_item",
            "title": "Dune",
            "loanable": true,
            "condition": "good",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["outcome"], "item_registered");
    let item_id = body["item_id"].as_str().unwrap().to_string();

    let (status, body) = post_command(
        app,
        json!({ "action": "register_member", "name": "Ada" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let member_id = body["member_id"].as_str().unwrap().to_string();

    (item_id, member_id)
}

// ============================================================================
// テスト
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = setup_app();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_schedule_give_return_flow() {
    let app = setup_app();
    let (item_id, member_id) = register(&app).await;

    // 予約
    let (status, body) = post_command(
        &app,
        json!({
            "action": "schedule_loan",
            "item_id": item_id,
            "member_id": member_id,
            "start": day(1),
            "end": day(15),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let loan_id = body["loan_id"].as_str().unwrap().to_string();

    // 受け渡し
    let (status, body) = post_command(
        &app,
        json!({ "action": "give_item", "loan_id": loan_id, "given_at": day(2) }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "item_given");

    // 貸出の概要
    let uri = format!("/loans/{}?as_of={}", loan_id, "2024-05-19T10:00:00Z");
    let (status, body) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["loan"]["status"], "on_loan");
    assert_eq!(body["days_until_due"], -3);
    assert_eq!(body["is_late"], true);

    // 延滞返却は罰金の指定が必要
    let (status, body) = post_command(
        &app,
        json!({ "action": "return_item", "loan_id": loan_id, "returned_at": day(18) }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 308);

    let (status, body) = post_command(
        &app,
        json!({
            "action": "return_item",
            "loan_id": loan_id,
            "returned_at": day(18),
            "fine_decision": "fine",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "returned_late_fined");
    assert_eq!(body["fine"]["amount"], 600);

    // 会員の残高
    let (status, body) = get(&app, &format!("/members/{}/balance", member_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["owed"], 600);

    // 履歴
    let (status, body) = get(&app, &format!("/loans/{}/history", loan_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(3));

    // 会員の貸出一覧（状態で絞り込み）
    let uri = format!("/members/{}/loans?status=returned_late_fined", member_id);
    let (status, body) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_conflicting_schedule_returns_unprocessable() {
    let app = setup_app();
    let (item_id, member_id) = register(&app).await;

    let schedule = |start: i64, end: i64| {
        json!({
            "action": "schedule_loan",
            "item_id": item_id,
            "member_id": member_id,
            "start": day(start),
            "end": day(end),
        })
    };

    let (status, _) = post_command(&app, schedule(10, 20)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post_command(&app, schedule(20, 30)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "operation_failed");
    assert_eq!(body["code"], 402);

    let uri = format!("/items/{}/status?as_of=2024-05-01T10:00:00Z", item_id);
    let (status, body) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["on_loan"], false);
    assert_eq!(body["upcoming"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_late_loans_endpoint() {
    let app = setup_app();
    let (item_id, member_id) = register(&app).await;

    let (status, body) = post_command(
        &app,
        json!({
            "action": "loan_item",
            "item_id": item_id,
            "member_id": member_id,
            "loaned_at": day(0),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["outcome"], "item_loaned");

    // 貸出日数12日 → 期限は5/13、5/16時点で3日延滞
    let (status, body) = get(&app, "/loans/late?as_of=2024-05-16T10:00:00Z").await;
    assert_eq!(status, StatusCode::OK);
    let late = body.as_array().unwrap();
    assert_eq!(late.len(), 1);
    assert_eq!(late[0]["days_late"], 3);
    assert_eq!(late[0]["projected_fine"], 600);
}

#[tokio::test]
async fn test_unknown_loan_returns_not_found() {
    let app = setup_app();
    let uri = format!("/loans/{}", uuid::Uuid::new_v4());

    let (status, body) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["code"], 303);
}

#[tokio::test]
async fn test_malformed_command_is_rejected() {
    let app = setup_app();

    let (status, body) = post_command(&app, json!({ "action": "burn_item" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_command");
    assert_eq!(body["code"], 502);
}
