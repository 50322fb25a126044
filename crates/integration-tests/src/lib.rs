//! Integration tests for the Riziky-Beauté storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p riziky-integration-tests
//! ```
//!
//! The storefront router is built in-process and driven with
//! `tower::ServiceExt::oneshot`; no server or network is involved.
//! [`TestClient`] keeps the session cookie between requests like a browser.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use riziky_storefront::config::StorefrontConfig;
use riziky_storefront::middleware::session::SESSION_COOKIE_NAME;
use riziky_storefront::state::AppState;
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;

/// Admin account used by the tests.
pub const ADMIN_EMAIL: &str = "admin@example.com";

/// Configuration for tests: no simulated latency.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        simulated_latency: Duration::ZERO,
        ..StorefrontConfig::default()
    }
}

/// A response as seen by the test.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Browser-like client over an in-process router.
pub struct TestClient {
    app: Router,
    cookie: Option<String>,
}

impl TestClient {
    /// Client for a fresh storefront with the demo catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::with_state(AppState::new(test_config()))
    }

    /// Client for a storefront with the given state.
    #[must_use]
    pub fn with_state(state: AppState) -> Self {
        Self {
            app: riziky_storefront::app(state),
            cookie: None,
        }
    }

    /// A second visitor on the same storefront, without this one's cookie.
    #[must_use]
    pub fn other_visitor(&self) -> Self {
        Self {
            app: self.app.clone(),
            cookie: None,
        }
    }

    /// Send a request, remembering any session cookie in the response.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the router fails.
    pub async fn send(&mut self, method: Method, path: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(cookie) = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(&format!("{SESSION_COOKIE_NAME}=")))
        {
            self.cookie = cookie.split(';').next().map(str::to_owned);
        }

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse { status, body }
    }

    /// `GET path`.
    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None).await
    }

    /// `POST path` with a JSON body.
    pub async fn post(&mut self, path: &str, body: Value) -> TestResponse {
        self.send(Method::POST, path, Some(body)).await
    }

    /// `PUT path` with a JSON body.
    pub async fn put(&mut self, path: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, path, Some(body)).await
    }

    /// `DELETE path`.
    pub async fn delete(&mut self, path: &str) -> TestResponse {
        self.send(Method::DELETE, path, None).await
    }

    /// Sign in as `email`.
    ///
    /// # Panics
    ///
    /// Panics if the login is rejected.
    pub async fn login(&mut self, email: &str) -> TestResponse {
        let response = self
            .post(
                "/auth/login",
                serde_json::json!({ "email": email, "password": "motdepasse" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {response:?}");
        response
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}
