//! Integration tests for Pup Market.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pup-market-integration-tests
//! ```
//!
//! No external services are needed: each test starts a `wiremock` server
//! standing in for the Airtable REST API and drives the real router in
//! process with `tower::ServiceExt::oneshot`.
//!
//! # Test Categories
//!
//! - `listings` - Puppy and pet shop listings, detail pages, caching
//! - `registrations` - Registration inquiry submission
//! - `http_surface` - Health, CORS, request ids, route aliases

use std::net::{IpAddr, Ipv4Addr};

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use pup_market_storefront::{
    app,
    config::{AirtableConfig, CatalogConfig, StorefrontConfig},
    state::AppState,
};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use url::Url;
use wiremock::MockServer;

/// Base id used for every mocked Airtable request.
pub const BASE_ID: &str = "appTestBase";

/// API key used for every mocked Airtable request.
pub const API_KEY: &str = "patIntegrationKey";

/// Path of a table under the mocked base, percent-encoded as sent on the wire.
#[must_use]
pub fn table_path(table: &str) -> String {
    format!("/{BASE_ID}/{}", table.replace(' ', "%20"))
}

/// Storefront configuration pointing at `server`.
///
/// # Panics
///
/// Panics if the mock server URI is not a valid URL.
#[must_use]
pub fn config_for(server: &MockServer) -> StorefrontConfig {
    StorefrontConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        airtable: AirtableConfig::new(
            Some(SecretString::from(API_KEY)),
            Some(BASE_ID.to_string()),
            Url::parse(&server.uri()).expect("mock server uri"),
        ),
        catalog: CatalogConfig::default(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A running mock record store plus the application under test.
pub struct TestContext {
    pub server: MockServer,
    pub app: Router,
}

impl TestContext {
    /// Start a mock Airtable and build the app against it.
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let config = config_for(&server);
        Self::with_config(server, config)
    }

    /// Build the app with a custom configuration.
    ///
    /// # Panics
    ///
    /// Panics if application state cannot be built.
    #[must_use]
    pub fn with_config(server: MockServer, config: StorefrontConfig) -> Self {
        let state = AppState::new(config).expect("application state");
        Self {
            server,
            app: app(state),
        }
    }

    /// Send a request through the router.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("response body")
            .to_bytes();

        TestResponse {
            status,
            headers,
            body: bytes.to_vec(),
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body)).await
    }
}

/// Collected response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parse the body as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("JSON body")
    }

    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
