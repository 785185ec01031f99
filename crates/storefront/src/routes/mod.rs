//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//!
//! # Listings
//! GET  /api/puppies            - Puppy listing (cached)
//! GET  /api/puppies/{id}       - Puppy detail
//! GET  /api/shops              - Pet shop listing (cached)
//! GET  /api/shops/{id}         - Pet shop detail with its puppies
//!
//! # Registrations
//! POST /api/registrations      - Submit a pet shop inquiry
//! GET  /api/registrations      - Configuration check
//!
//! # Aliases kept for older frontend builds
//! /api/dogs/...                - Same as /api/puppies
//! /api/pet-shops/...           - Same as /api/shops
//! ```

pub mod puppies;
pub mod registrations;
pub mod shops;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Create the puppy routes router.
pub fn puppy_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(puppies::index))
        .route("/{id}", get(puppies::show))
}

/// Create the pet shop routes router.
pub fn shop_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(shops::index))
        .route("/{id}", get(shops::show))
}

/// Create the `/api` router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/puppies", puppy_routes())
        .nest("/dogs", puppy_routes())
        .nest("/shops", shop_routes())
        .nest("/pet-shops", shop_routes())
        .route(
            "/registrations",
            get(registrations::status).post(registrations::submit),
        )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the record store.
async fn health() -> &'static str {
    "ok"
}
