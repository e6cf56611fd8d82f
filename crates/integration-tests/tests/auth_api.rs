//! Registration and login over real HTTP.

use customer_registry_integration_tests::TestServer;
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
async fn test_register_login_and_use_token() {
    let server = TestServer::spawn().await;
    let token = server.token_for("operator", "hunter22").await;

    assert_eq!(token.split('.').count(), 3);

    let resp = server
        .authed(reqwest::Method::GET, "/api/customers", &token)
        .send()
        .await
        .expect("Failed to list customers");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_duplicate_handle_conflicts() {
    let server = TestServer::spawn().await;
    server.token_for("operator", "hunter22").await;

    let resp = server
        .client
        .post(server.url("/api/auth/register"))
        .json(&json!({"handle": "operator", "secret": "different"}))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let body: Value = resp.json().await.expect("Body is not JSON");
    assert_eq!(body["code"], "HANDLE_ALREADY_EXISTS");
}

#[tokio::test]
async fn test_unknown_handle_and_wrong_secret_are_indistinguishable() {
    let server = TestServer::spawn().await;
    server.token_for("operator", "hunter22").await;

    let mut bodies = Vec::new();
    for credentials in [
        json!({"handle": "operator", "secret": "wrong-secret"}),
        json!({"handle": "stranger", "secret": "hunter22"}),
    ] {
        let resp = server
            .client
            .post(server.url("/api/auth/login"))
            .json(&credentials)
            .send()
            .await
            .expect("Failed to log in");
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let mut body: Value = resp.json().await.expect("Body is not JSON");
        if let Some(object) = body.as_object_mut() {
            object.remove("timestamp");
        }
        bodies.push(body);
    }

    assert_eq!(bodies.first(), bodies.last());
    assert_eq!(bodies.first().map(|b| b["code"].clone()), Some(json!("AUTHENTICATION_FAILED")));
}

#[tokio::test]
async fn test_malformed_json_is_reported() {
    let server = TestServer::spawn().await;

    let resp = server
        .client
        .post(server.url("/api/auth/login"))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{\"handle\": ")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await.expect("Body is not JSON");
    assert_eq!(body["code"], "BAD_FORMAT_JSON");
}
