//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (per-request hub, transactions)
//! 2. `TraceLayer` (request span with an empty `request_id` field)
//! 3. Request ID (fills the span field, echoes `x-request-id`)
//! 4. CORS (answers preflights, decorates every response)

pub mod cors;
pub mod request_id;

pub use cors::cors_middleware;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
