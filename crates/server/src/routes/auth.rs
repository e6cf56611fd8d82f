//! Identity registration and login routes.

use axum::{Router, extract::State, http::StatusCode, response::Response, routing::post};
use serde::{Deserialize, Serialize};

use customer_registry_core::Clock;

use crate::error::Result;
use crate::extract::ValidatedJson;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::validation::{Validate, ValidationErrors, length_between, required_text};

/// Handle and secret length limits, in characters.
pub const HANDLE_MIN: usize = 4;
pub const HANDLE_MAX: usize = 50;
pub const SECRET_MIN: usize = 4;
pub const SECRET_MAX: usize = 50;

/// Build the public auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
}

// =============================================================================
// Request Types
// =============================================================================

/// Registration body. Secrets are never trimmed.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub handle: Option<String>,
    pub secret: Option<String>,
}

/// Validated registration credentials.
pub struct Registration {
    pub handle: String,
    pub secret: String,
}

impl Validate for RegisterRequest {
    type Output = Registration;

    fn validate(self, _clock: &dyn Clock) -> std::result::Result<Registration, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let handle = errors.check(
            "handle",
            required_text(self.handle)
                .and_then(|handle| length_between(handle, HANDLE_MIN, HANDLE_MAX)),
        );
        let secret = errors.check(
            "secret",
            non_blank(self.secret)
                .and_then(|secret| length_between(secret, SECRET_MIN, SECRET_MAX)),
        );

        match (handle, secret) {
            (Some(handle), Some(secret)) => Ok(Registration { handle, secret }),
            _ => Err(errors),
        }
    }
}

/// Login body.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub handle: Option<String>,
    pub secret: Option<String>,
}

/// Credentials presented at login.
pub struct Credentials {
    pub handle: String,
    pub secret: String,
}

impl Validate for LoginRequest {
    type Output = Credentials;

    fn validate(self, _clock: &dyn Clock) -> std::result::Result<Credentials, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let handle = errors.check("handle", required_text(self.handle));
        let secret = errors.check("secret", non_blank(self.secret));

        match (handle, secret) {
            (Some(handle), Some(secret)) => Ok(Credentials { handle, secret }),
            _ => Err(errors),
        }
    }
}

/// Like `required_text` but returns the value untouched.
fn non_blank(value: Option<String>) -> std::result::Result<String, String> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err("must not be blank".to_owned()),
    }
}

#[derive(Debug, Serialize)]
struct Registered {
    handle: String,
}

// =============================================================================
// Handlers
// =============================================================================

async fn register(
    State(state): State<AppState>,
    ValidatedJson(registration): ValidatedJson<RegisterRequest>,
) -> Result<Response> {
    let handle = state
        .auth_service()
        .register(&registration.handle, &registration.secret)
        .await?;

    Ok(ApiResponse::success(Registered { handle }).with_status(StatusCode::CREATED))
}

async fn login(
    State(state): State<AppState>,
    ValidatedJson(credentials): ValidatedJson<LoginRequest>,
) -> Result<Response> {
    let token = state
        .auth_service()
        .login(&credentials.handle, &credentials.secret)
        .await?;

    Ok(ApiResponse::success(token).with_status(StatusCode::OK))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, header};
    use customer_registry_core::SystemClock;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::routes::router;
    use crate::routes::tests::test_state;

    async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_register_rules() {
        let errors = RegisterRequest {
            handle: Some("  ab ".to_owned()),
            secret: Some("    ".to_owned()),
        }
        .validate(&SystemClock)
        .err()
        .unwrap();

        assert_eq!(
            errors.get("handle"),
            Some("must be between 4 and 50 characters")
        );
        assert_eq!(errors.get("secret"), Some("must not be blank"));
    }

    #[test]
    fn test_register_keeps_secret_whitespace() {
        let Ok(registration) = (RegisterRequest {
            handle: Some(" operator ".to_owned()),
            secret: Some(" pass word ".to_owned()),
        })
        .validate(&SystemClock) else {
            panic!("registration should validate");
        };

        assert_eq!(registration.handle, "operator");
        assert_eq!(registration.secret, " pass word ");
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let app = router(test_state());
        let credentials = json!({"handle": "operator", "secret": "hunter22"});

        let (status, body) = post_json(&app, "/api/auth/register", credentials.clone()).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["handle"], "operator");

        let (status, body) = post_json(&app, "/api/auth/register", credentials.clone()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "HANDLE_ALREADY_EXISTS");

        let (status, body) = post_json(&app, "/api/auth/login", credentials).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["token_type"], "Bearer");
        assert!(body["data"]["token"].as_str().unwrap().contains('.'));
    }

    #[tokio::test]
    async fn test_login_failures_look_alike() {
        let app = router(test_state());
        post_json(
            &app,
            "/api/auth/register",
            json!({"handle": "operator", "secret": "hunter22"}),
        )
        .await;

        let (wrong_status, wrong_body) = post_json(
            &app,
            "/api/auth/login",
            json!({"handle": "operator", "secret": "hunter23"}),
        )
        .await;
        let (unknown_status, unknown_body) = post_json(
            &app,
            "/api/auth/login",
            json!({"handle": "nobody", "secret": "hunter22"}),
        )
        .await;

        assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_status, unknown_status);
        assert_eq!(wrong_body["code"], "AUTHENTICATION_FAILED");
        assert_eq!(wrong_body["code"], unknown_body["code"]);
        assert_eq!(wrong_body["message"], unknown_body["message"]);
    }

    #[tokio::test]
    async fn test_login_requires_fields() {
        let app = router(test_state());
        let (status, body) = post_json(&app, "/api/auth/login", json!({"handle": ""})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["data"]["handle"], "must not be blank");
        assert_eq!(body["data"]["secret"], "must not be blank");
    }
}
