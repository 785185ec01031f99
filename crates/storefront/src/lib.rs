//! Pup Market Storefront library.
//!
//! JSON API over an Airtable base of puppies and pet shops, consumed by the
//! browsing frontend. Exposed as a library so the router can be driven in
//! tests without binding a socket.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod airtable;
pub mod catalog;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, body::Body, http::Request, middleware::from_fn};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the full application: routes plus the middleware stack.
pub fn app(state: AppState) -> Router {
    routes::routes()
        .with_state(state)
        .layer(from_fn(middleware::cors_middleware))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
        .layer(sentry_tower::NewSentryLayer::new_from_top())
}
