//! HTTP backend tests against a mock server.

use std::time::Duration;

use logscope_client::{ClientError, CreateLogRequest, DEFAULT_TIMEOUT, HttpBackend, LogBackend};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> HttpBackend {
    HttpBackend::new(&server.uri(), DEFAULT_TIMEOUT).expect("mock server uri is a valid base")
}

#[tokio::test]
async fn test_list_schemas() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/schemas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "1", "name": "login"},
            {"id": "2", "name": "action"}
        ])))
        .mount(&mock_server)
        .await;

    let schemas = backend_for(&mock_server).list_schemas().await.unwrap();
    assert_eq!(schemas.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_list_logs_uses_names_in_path() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/logs/login/logout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"Output": "bye", "LogLevel": "INFO"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let logs = backend_for(&mock_server)
        .list_logs("login", "logout")
        .await
        .unwrap();
    assert_eq!(logs[0]["Output"], "bye");
}

#[tokio::test]
async fn test_list_logs_by_schema_route() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/logs/by-schema/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let logs = backend_for(&mock_server)
        .list_logs_by_schema("42")
        .await
        .unwrap();
    assert_eq!(logs, json!([]));
}

#[tokio::test]
async fn test_null_body_reads_as_empty_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/modules/7"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&mock_server)
        .await;

    let modules = backend_for(&mock_server).list_modules("7").await.unwrap();
    assert_eq!(modules, json!([]));
}

#[tokio::test]
async fn test_error_status_carries_backend_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/modules/7"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": "query failed"})),
        )
        .mount(&mock_server)
        .await;

    let err = backend_for(&mock_server).list_modules("7").await.unwrap_err();
    match err {
        ClientError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "internal server error: query failed");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_error_status_without_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/schemas"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let err = backend_for(&mock_server).list_schemas().await.unwrap_err();
    assert!(err.to_string().contains("resource not found"));
}

#[tokio::test]
async fn test_error_field_in_ok_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/schemas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "db down"})))
        .mount(&mock_server)
        .await;

    let err = backend_for(&mock_server).list_schemas().await.unwrap_err();
    assert!(matches!(err, ClientError::Backend(ref m) if m == "db down"));
}

#[tokio::test]
async fn test_create_log_posts_snake_case_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/logs"))
        .and(body_json(json!({
            "schema": "login",
            "module": "login",
            "output": "user signed in",
            "service": "auth",
            "log_level": "info"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = CreateLogRequest {
        schema: "login".to_string(),
        module: "login".to_string(),
        output: "user signed in".to_string(),
        service: "auth".to_string(),
        log_level: Some("info".to_string()),
        ..Default::default()
    };

    let created = backend_for(&mock_server).create_log(&request).await.unwrap();
    assert_eq!(created["message"], "ok");
}

#[tokio::test]
async fn test_create_log_failure_is_propagated() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/logs"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "bad payload"})))
        .mount(&mock_server)
        .await;

    let request = CreateLogRequest {
        schema: "login".to_string(),
        module: "login".to_string(),
        output: "x".to_string(),
        service: "auth".to_string(),
        ..Default::default()
    };

    let err = backend_for(&mock_server).create_log(&request).await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 400, .. }));
}

#[tokio::test]
async fn test_create_log_validates_before_sending() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/logs"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let request = CreateLogRequest {
        schema: "login".to_string(),
        module: "login".to_string(),
        output: "x".to_string(),
        ..Default::default()
    };

    let err = backend_for(&mock_server).create_log(&request).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidRequest(ref m) if m.contains("service")));
}

#[tokio::test]
async fn test_create_schema() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/schemas"))
        .and(body_json(json!({"name": "billing"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"schema": "billing", "id": 3})),
        )
        .mount(&mock_server)
        .await;

    let created = backend_for(&mock_server)
        .create_schema("billing")
        .await
        .unwrap();
    assert_eq!(created["id"], 3);
}

#[tokio::test]
async fn test_request_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/schemas"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&mock_server)
        .await;

    let backend = HttpBackend::new(&mock_server.uri(), Duration::from_millis(50)).unwrap();
    let err = backend.list_schemas().await.unwrap_err();
    assert!(err.is_timeout());
}
