//! Integration tests for the customer registry.
//!
//! # Running Tests
//!
//! ```bash
//! # HTTP tests against an in-memory server (no external services)
//! cargo test -p customer-registry-integration-tests
//!
//! # Store tests against PostgreSQL
//! REGISTRY_TEST_DATABASE_URL=postgres://... \
//!     cargo test -p customer-registry-integration-tests -- --ignored
//! ```
//!
//! Each HTTP test gets its own server bound to an ephemeral port, so tests
//! never share stores.

use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};

use customer_registry_core::FixedClock;
use customer_registry_server::config::JwtConfig;
use customer_registry_server::services::auth::Argon2Hasher;
use customer_registry_server::{AppState, router};

/// Date the test servers treat as today.
pub const TODAY: (i32, u32, u32) = (2024, 6, 15);

/// Checksum-valid identifiers for fixtures.
pub const VALID_IDENTIFIERS: [&str; 6] = [
    "68691814039",
    "12345678909",
    "52998224725",
    "11144477735",
    "93541134780",
    "39053344705",
];

/// A running registry server and a client pointed at it.
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
}

impl TestServer {
    /// Spawn a server over empty in-memory stores.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot bind or the fixture date is invalid.
    #[allow(clippy::expect_used)]
    pub async fn spawn() -> Self {
        let (y, m, d) = TODAY;
        let today = NaiveDate::from_ymd_opt(y, m, d).expect("valid fixture date");
        let state = AppState::in_memory(
            Argon2Hasher::with_params(1024, 1, 1).expect("valid argon2 params"),
            &JwtConfig {
                secret: SecretString::from("Vq7#pL2!xR9@mZ4$tK8^wN1&bH6*jD3%"),
                ttl_minutes: 5,
                issuer: "registry-integration".to_owned(),
            },
            FixedClock::on(today),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");

        tokio::spawn(async move {
            let _ = axum::serve(listener, router(state)).await;
        });

        Self {
            base_url: format!("http://{addr}"),
            client: Client::new(),
        }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Register `handle` and return a bearer token for it.
    ///
    /// # Panics
    ///
    /// Panics if registration or login does not succeed.
    #[allow(clippy::expect_used)]
    pub async fn token_for(&self, handle: &str, secret: &str) -> String {
        let credentials = json!({"handle": handle, "secret": secret});

        let resp = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&credentials)
            .send()
            .await
            .expect("Failed to register");
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&credentials)
            .send()
            .await
            .expect("Failed to log in")
            .json()
            .await
            .expect("Login body is not JSON");

        body["data"]["token"]
            .as_str()
            .expect("Login response has no token")
            .to_owned()
    }

    /// Request builder for `path` carrying `token`.
    #[must_use]
    pub fn authed(&self, method: reqwest::Method, path: &str, token: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .bearer_auth(token)
    }
}

/// A create/update body for a customer.
#[must_use]
pub fn customer_body(identifier: &str, name: &str, birth_date: &str, email: &str) -> Value {
    json!({
        "identifier": identifier,
        "name": name,
        "birth_date": birth_date,
        "email": email,
    })
}
