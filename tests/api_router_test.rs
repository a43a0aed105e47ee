// ==========================================
// HTTP 路由端到端测试
// ==========================================
// 测试目标: 通过 axum Router（进程内 oneshot）验证导入/令牌/查询接口
// ==========================================


use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use rusqlite::{params, Connection};
use serde_json::{json, Value};
use task_import::api;
use task_import::logging;
use test_helpers::{count_tasks, valid_row, valid_rows, TestEnv};
use tower::ServiceExt;

const CLIENT_ID: &str = "6f1c1f8e-4a8e-4c61-9a52-3f0c2b1d7e10";

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post(uri: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap()
}

fn get_with_auth(uri: &str, auth: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(value) = auth {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(body).unwrap()
}

async fn issue_token(env: &TestEnv) -> String {
    let body = json!({ "client_name": "acme", "client_id": CLIENT_ID }).to_string();
    let (status, json) = send(
        api::router(env.state.clone()),
        post("/api/auth/token", Body::from(body)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    json["token"].as_str().unwrap().to_string()
}

/// 为 acme 客户端写入任务与状态历史
fn seed_client_data(db_path: &str) {
    let conn = Connection::open(db_path).unwrap();
    conn.execute(
        "UPDATE tasks SET client_name = 'acme', client_id = ?1",
        params![CLIENT_ID],
    )
    .unwrap();
    conn.execute("UPDATE tasks SET is_active = 0 WHERE id = 2", [])
        .unwrap();

    let older = Utc::now() - Duration::hours(2);
    let newer = Utc::now();
    for (status, at) in [("PENDING", older), ("DONE", newer)] {
        conn.execute(
            r#"
            INSERT INTO task_status
                (task_id, client_name, client_id, status, status_description, updated_by, created_at)
            VALUES (1, 'acme', ?1, ?2, '', 'system', ?3)
            "#,
            params![CLIENT_ID, status, at],
        )
        .unwrap();
    }
}

#[tokio::test]
async fn test_healthz() {
    let env = TestEnv::new();
    let req = Request::builder()
        .uri("/healthz")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(api::router(env.state.clone()), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_import_endpoint_success() {
    logging::init_test();
    let env = TestEnv::new();
    env.write_csv(&valid_rows(3));

    let (status, body) = send(
        api::router(env.state.clone()),
        post("/api/commands/import", Body::empty()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["total_entries"], 3);
    assert_eq!(body["stats"]["success_count"], 3);
    assert_eq!(count_tasks(&env.db_path), 3);
}

#[tokio::test]
async fn test_import_endpoint_failure_returns_500_with_result() {
    logging::init_test();
    let env = TestEnv::new();
    env.write_csv(&[
        valid_row(1),
        "User 2,user2@example.com,abc,2 Main St,555-010-0002,Engineering,Developer,50000,15/03/2021"
            .to_string(),
    ]);

    let (status, body) = send(
        api::router(env.state.clone()),
        post("/api/commands/import", Body::empty()),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Import failed");
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);
    assert_eq!(count_tasks(&env.db_path), 0);
}

#[tokio::test]
async fn test_import_v1_with_subdirectory() {
    logging::init_test();
    let env = TestEnv::new();
    let sub = env.import_dir.path().join("batch1");
    std::fs::create_dir(&sub).unwrap();
    test_helpers::write_csv(&sub, "batch.csv", &valid_rows(2));

    let body = json!({ "directory_path": sub.to_string_lossy() }).to_string();
    let (status, json) = send(
        api::router(env.state.clone()),
        post("/api/v1/commands/import-tasks", Body::from(body)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["stats"]["success_count"], 2);
}

#[tokio::test]
async fn test_import_v1_rejects_bad_requests() {
    let env = TestEnv::new();

    let (status, json) = send(
        api::router(env.state.clone()),
        post("/api/v1/commands/import-tasks", Body::from("{oops")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid request format");

    let outside = tempfile::tempdir().unwrap();
    let body = json!({ "directory_path": outside.path().to_string_lossy() }).to_string();
    let (status, json) = send(
        api::router(env.state.clone()),
        post("/api/v1/commands/import-tasks", Body::from(body)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_token_rejects_invalid_client() {
    let env = TestEnv::new();

    for body in [
        json!({ "client_name": "acme", "client_id": "not-a-uuid" }).to_string(),
        json!({ "client_name": " ", "client_id": CLIENT_ID }).to_string(),
        "not json".to_string(),
    ] {
        let (status, json) = send(
            api::router(env.state.clone()),
            post("/api/auth/token", Body::from(body)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Invalid request format");
    }
}

#[tokio::test]
async fn test_protected_routes_require_bearer() {
    let env = TestEnv::new();
    let cases = [
        (None, "Authorization header is required"),
        (Some("Token abc"), "Invalid authorization format"),
        (Some("Bearer not.a.jwt"), "Invalid token"),
    ];

    for (auth, message) in cases {
        let (status, json) = send(
            api::router(env.state.clone()),
            get_with_auth("/api/queries/tasks/active", auth, Body::empty()),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["message"], message);
    }
}

#[tokio::test]
async fn test_active_tasks_and_history() {
    logging::init_test();
    let env = TestEnv::new();
    env.write_csv(&valid_rows(3));
    env.state.importer.import().await.unwrap();
    seed_client_data(&env.db_path);

    let token = issue_token(&env).await;
    let auth = format!("Bearer {token}");

    let (status, json) = send(
        api::router(env.state.clone()),
        get_with_auth("/api/queries/tasks/active", Some(&auth), Body::empty()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Successfully retrieved active tasks");
    assert_eq!(json["total_count"], 2);
    let ids: Vec<i64> = json["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 3]);

    let (status, json) = send(
        api::router(env.state.clone()),
        get_with_auth("/api/queries/tasks/history", Some(&auth), Body::empty()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_count"], 2);
    assert_eq!(json["history"][0]["status"], "DONE");
    assert_eq!(json["history"][1]["status"], "PENDING");
}

#[tokio::test]
async fn test_history_body_overrides_claims() {
    let env = TestEnv::new();
    let token = issue_token(&env).await;
    let auth = format!("Bearer {token}");

    let body = json!({ "client_name": "acme", "client_id": "bad-id" }).to_string();
    let (status, json) = send(
        api::router(env.state.clone()),
        get_with_auth("/api/queries/tasks/history", Some(&auth), Body::from(body)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], false);
    assert_eq!(
        json["message"],
        "Invalid parameters: invalid client ID format: must be a valid UUID"
    );

    let (status, json) = send(
        api::router(env.state.clone()),
        get_with_auth("/api/queries/tasks/history", Some(&auth), Body::from("{bad")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Invalid request format");
}
