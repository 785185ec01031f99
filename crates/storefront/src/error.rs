//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers should return
//! `Result<T, AppError>`. Bodies are always `{"message": "..."}` and never
//! carry upstream error text.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::airtable::{AirtableError, UpstreamFailure};
use crate::services::RegistrationError;

const CONFIGURATION_MESSAGE: &str =
    "Airtable base or table not found. Please check configuration.";
const LISTING_FAILED_MESSAGE: &str = "Failed to load listings. Please try again later.";
const SCHEMA_MESSAGE: &str =
    "Missing required fields in Airtable. Please check the table structure.";
const SUBMIT_FAILED_MESSAGE: &str = "Failed to submit inquiry. Please try again later.";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Reading listings from the record store failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] AirtableError),

    /// Registration submission failed.
    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),

    /// Resource not found. The message is shown to the client.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Catalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Registration(err) => match err {
                RegistrationError::MissingFields(_) | RegistrationError::InvalidEmail(_) => {
                    StatusCode::BAD_REQUEST
                }
                RegistrationError::Store(e) if e.failure() == UpstreamFailure::MissingField => {
                    StatusCode::BAD_REQUEST
                }
                RegistrationError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-facing message. Internal details are never exposed.
    fn public_message(&self) -> String {
        match self {
            Self::Catalog(e) if e.failure().is_configuration() => CONFIGURATION_MESSAGE.to_string(),
            Self::Catalog(_) => LISTING_FAILED_MESSAGE.to_string(),
            Self::Registration(err) => match err {
                RegistrationError::MissingFields(_) => err.to_string(),
                RegistrationError::InvalidEmail(_) => "Invalid email address".to_string(),
                RegistrationError::Store(e) => match e.failure() {
                    UpstreamFailure::MissingField => SCHEMA_MESSAGE.to_string(),
                    failure if failure.is_configuration() => CONFIGURATION_MESSAGE.to_string(),
                    _ => SUBMIT_FAILED_MESSAGE.to_string(),
                },
            },
            Self::NotFound(message) | Self::BadRequest(message) => message.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else if let Self::Registration(RegistrationError::Store(e)) = &self {
            tracing::warn!(error = %e, "Registration rejected by record store schema");
        }

        (status, Json(json!({ "message": self.public_message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
