//! Integration tests for the checker HTTP client

use checker_http::client::{ApiClient, error::ClientError};
use checker_http::types::{LoginForm, RegisterForm};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn register_form() -> RegisterForm {
    RegisterForm {
        username: "asha".to_string(),
        email: "asha@example.edu".to_string(),
        first_name: "Asha".to_string(),
        last_name: "Rao".to_string(),
        role: "student".to_string(),
        password: "hunter22".to_string(),
        password2: "hunter22".to_string(),
        regdno: Some("21CS042".to_string()),
    }
}

#[tokio::test]
async fn test_client_builder() {
    let client = ApiClient::builder()
        .base_url("http://localhost:8000/")
        .user_agent("checker-tests")
        .build();

    assert!(client.is_ok());
    let client = client.unwrap();
    assert_eq!(client.base_url(), "http://localhost:8000");
}

#[tokio::test]
async fn test_client_builder_requires_base_url() {
    let result = ApiClient::builder().build();
    assert!(matches!(result, Err(ClientError::Configuration(_))));

    let result = ApiClient::builder().base_url("  ").build();
    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[tokio::test]
async fn test_login_posts_multipart_form() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("name=\"username\""))
        .and(body_string_contains("asha"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "a1", "refresh": "r1"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    let tokens = client
        .login(&LoginForm::new("asha", "hunter22"))
        .await
        .unwrap();

    assert_eq!(tokens.access, "a1");
    assert_eq!(tokens.refresh, "r1");
}

#[tokio::test]
async fn test_register_ignores_success_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/register"))
        .and(body_string_contains("name=\"regdno\""))
        .respond_with(ResponseTemplate::new(201).set_body_string("created"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    assert!(client.register(&register_form()).await.is_ok());
}

#[tokio::test]
async fn test_refresh_sends_json_and_ignores_extra_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/token/refresh"))
        .and(body_json(json!({"refresh": "r1"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "a2", "issued": 1})),
        )
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    let response = client.refresh_token("r1").await.unwrap();
    assert_eq!(response.access, "a2");
}

#[tokio::test]
async fn test_current_user_uses_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/user"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "username": "asha",
            "email": "asha@example.edu",
            "first_name": "Asha",
            "last_name": "Rao",
            "role": "student",
            "regdno": "21CS042"
        })))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    let user = client.current_user("a1").await.unwrap();
    assert_eq!(user.id, 3);
    assert_eq!(user.registration_number.as_deref(), Some("21CS042"));
}

#[tokio::test]
async fn test_error_handling() {
    let mock_server = MockServer::start().await;

    // Test 401 Unauthorized
    Mock::given(method("GET"))
        .and(path("/api/user"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&mock_server)
        .await;

    // Test 500 on refresh
    Mock::given(method("POST"))
        .and(path("/api/token/refresh"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();

    let result = client.current_user("stale").await;
    assert!(matches!(result, Err(ClientError::AuthenticationFailed(_))));
    assert!(result.unwrap_err().is_auth_expired());

    let result = client.refresh_token("r1").await;
    assert!(matches!(
        result,
        Err(ClientError::ServerError { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_malformed_success_body_is_a_serialization_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    let result = client.login(&LoginForm::new("asha", "x")).await;
    assert!(matches!(result, Err(ClientError::Serialization(_))));
}
