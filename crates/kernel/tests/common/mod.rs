#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! [`TestApp`] runs the REAL kernel router and login flow. Only the
//! collaborators at the edges are swapped: the content store is the
//! in-memory one from `folio-test-utils` and sessions live in a
//! `MemoryStore` instead of Redis.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::{MemoryStore, Session, SessionManagerLayer};

use folio_kernel::AppState;
use folio_kernel::auth::{Authenticator, PasswordAuthenticator};
use folio_kernel::routes;
use folio_kernel::tap::TapRegistry;
use folio_test_utils::MemoryContentStore;

pub const SITE_URL: &str = "http://localhost:3000";

/// Test application wrapper using the REAL kernel routes and state.
pub struct TestApp {
    router: Router,
    pub store: Arc<MemoryContentStore>,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_taps(TapRegistry::new())
    }

    /// Build the app with pre-registered taps.
    pub fn with_taps(taps: TapRegistry) -> Self {
        let store = Arc::new(MemoryContentStore::new());
        let authenticator = Arc::new(PasswordAuthenticator::new(store.clone()));
        Self::build(store, authenticator, taps)
    }

    /// Build the app around a custom authenticator.
    pub fn with_authenticator(authenticator: Arc<dyn Authenticator>) -> Self {
        Self::build(
            Arc::new(MemoryContentStore::new()),
            authenticator,
            TapRegistry::new(),
        )
    }

    fn build(
        store: Arc<MemoryContentStore>,
        authenticator: Arc<dyn Authenticator>,
        taps: TapRegistry,
    ) -> Self {
        let state = AppState::from_parts(store.clone(), authenticator, taps, SITE_URL);

        // Must match main.rs, minus CORS.
        let router = routes::router()
            .layer(SessionManagerLayer::new(MemoryStore::default()).with_secure(false))
            .layer(tower_http::trace::TraceLayer::new_for_http())
            .with_state(state.clone());

        Self {
            router,
            store,
            state,
        }
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// Send a request with cookies from a previous response.
    pub async fn request_with_cookies(
        &self,
        mut request: Request<Body>,
        cookies: &str,
    ) -> Response {
        if !cookies.is_empty() {
            request.headers_mut().insert(
                header::COOKIE,
                cookies.parse().expect("Invalid cookie header"),
            );
        }
        self.request(request).await
    }

    /// GET a JSON endpoint.
    pub async fn get_json(&self, uri: &str, cookies: &str) -> (StatusCode, Value) {
        let response = self
            .request_with_cookies(Request::get(uri).body(Body::empty()).unwrap(), cookies)
            .await;
        let status = response.status();
        (status, response_json(response).await)
    }

    /// Login via the JSON endpoint and return session cookies.
    ///
    /// # Panics
    ///
    /// Panics if the login response is not 200 OK.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .request(
                Request::post("/user/login/json")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "username": username,
                            "password": password
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await;

        assert_eq!(
            response.status(),
            StatusCode::OK,
            "Login failed for user '{username}' (status {})",
            response.status()
        );

        extract_cookies(&response)
    }
}

/// A session not tied to any request, for calling handlers' logic directly.
pub fn fresh_session() -> Session {
    Session::new(None, Arc::new(MemoryStore::default()), None)
}

/// Extract Set-Cookie headers from a response for use in subsequent requests.
pub fn extract_cookies(response: &Response) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|cookie| {
            // Extract just the cookie name=value, ignoring attributes
            cookie.split(';').next()
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Use the newest cookies when a response set any, else keep the old ones.
pub fn merge_cookies(previous: &str, response: &Response) -> String {
    let fresh = extract_cookies(response);
    if fresh.is_empty() {
        previous.to_string()
    } else {
        fresh
    }
}

/// The redirect target of a response.
pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Collect a response body as JSON (`Null` when empty or not JSON).
pub async fn response_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}
