//! Airtable record store client.
//!
//! # Architecture
//!
//! - Plain REST over `reqwest`; Airtable is the source of truth, nothing is
//!   persisted locally
//! - [`RecordStore`] is the seam the catalog depends on, so listings can be
//!   tested against an in-memory fake
//! - Failures are classified into [`UpstreamFailure`] from the HTTP status and
//!   Airtable's error `type` code (best-effort)
//!
//! # Example
//!
//! ```rust,ignore
//! use pup_market_storefront::airtable::{AirtableClient, ListQuery, RecordStore};
//!
//! let client = AirtableClient::new(&config.airtable)?;
//! let puppies = client
//!     .list("Puppies", &ListQuery::filtered("Available = TRUE()"))
//!     .await?;
//! ```

mod client;
pub mod types;

pub use client::AirtableClient;
pub use types::*;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// Airtable error codes meaning a field referenced by the request does not
/// exist (or was renamed) in the table.
const MISSING_FIELD_CODES: &[&str] = &["INVALID_REQUEST_MISSING_FIELDS", "UNKNOWN_FIELD_NAME"];

/// Airtable error codes meaning the base or table could not be resolved.
const TABLE_NOT_FOUND_CODES: &[&str] = &[
    "NOT_FOUND",
    "TABLE_NOT_FOUND",
    "INVALID_PERMISSIONS_OR_MODEL_NOT_FOUND",
];

/// Airtable error codes for rejected credentials.
const AUTHENTICATION_CODES: &[&str] = &[
    "AUTHENTICATION_REQUIRED",
    "INVALID_PERMISSIONS",
    "INVALID_API_KEY",
];

/// Errors that can occur when interacting with the record store.
#[derive(Debug, Error)]
pub enum AirtableError {
    /// API key or base id is missing from configuration.
    #[error("Record store is not configured: {0} is missing")]
    NotConfigured(&'static str),

    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// Rate limited by Airtable.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Table endpoint could not be built.
    #[error("Invalid endpoint: {0}")]
    Endpoint(String),
}

/// Recognized categories of upstream failure.
///
/// Detection is best-effort: Airtable does not promise stable error codes, so
/// anything unrecognized lands in [`UpstreamFailure::Unclassified`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamFailure {
    /// A field the request referenced is missing from the remote table.
    MissingField,
    /// The base or table does not exist, or credentials are not configured.
    TableNotFound,
    /// Credentials were rejected.
    Authentication,
    /// Network failure, timeout, rate limit or server error. Retrying later may help.
    Transient,
    /// Anything else.
    Unclassified,
}

impl UpstreamFailure {
    /// Whether the failure points at deployment configuration rather than a
    /// passing outage or the caller's data.
    #[must_use]
    pub const fn is_configuration(self) -> bool {
        matches!(self, Self::TableNotFound | Self::Authentication)
    }
}

impl AirtableError {
    /// Classify this error into an [`UpstreamFailure`] category.
    #[must_use]
    pub fn failure(&self) -> UpstreamFailure {
        match self {
            Self::NotConfigured(_) | Self::Endpoint(_) => UpstreamFailure::TableNotFound,
            Self::Http(_) | Self::RateLimited(_) => UpstreamFailure::Transient,
            Self::Parse(_) => UpstreamFailure::Unclassified,
            Self::Api { status, code, .. } => classify(*status, code),
        }
    }
}

/// Map an HTTP status and Airtable error code to a failure category.
fn classify(status: u16, code: &str) -> UpstreamFailure {
    if MISSING_FIELD_CODES.contains(&code) {
        UpstreamFailure::MissingField
    } else if TABLE_NOT_FOUND_CODES.contains(&code) {
        UpstreamFailure::TableNotFound
    } else if AUTHENTICATION_CODES.contains(&code) || status == 401 {
        UpstreamFailure::Authentication
    } else if status == 404 {
        UpstreamFailure::TableNotFound
    } else if status == 429 || status >= 500 {
        UpstreamFailure::Transient
    } else {
        UpstreamFailure::Unclassified
    }
}

/// Operations this service needs from the record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// List every record of `table` matching `query`, following pagination.
    async fn list(&self, table: &str, query: &ListQuery) -> Result<Vec<RawRecord>, AirtableError>;

    /// Fetch one record by id. Returns `Ok(None)` if the record does not exist.
    async fn find(&self, table: &str, id: &str) -> Result<Option<RawRecord>, AirtableError>;

    /// Create a record with the given fields and return it as stored.
    async fn create(
        &self,
        table: &str,
        fields: Map<String, Value>,
    ) -> Result<RawRecord, AirtableError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: u16, code: &str) -> AirtableError {
        AirtableError::Api {
            status,
            code: code.to_string(),
            message: String::new(),
        }
    }

    #[test]
    fn test_missing_field_codes() {
        assert_eq!(
            api_error(422, "INVALID_REQUEST_MISSING_FIELDS").failure(),
            UpstreamFailure::MissingField
        );
        assert_eq!(
            api_error(422, "UNKNOWN_FIELD_NAME").failure(),
            UpstreamFailure::MissingField
        );
    }

    #[test]
    fn test_table_not_found_codes() {
        assert_eq!(
            api_error(404, "NOT_FOUND").failure(),
            UpstreamFailure::TableNotFound
        );
        assert_eq!(
            api_error(403, "INVALID_PERMISSIONS_OR_MODEL_NOT_FOUND").failure(),
            UpstreamFailure::TableNotFound
        );
        assert_eq!(
            api_error(404, "SOMETHING_NEW").failure(),
            UpstreamFailure::TableNotFound
        );
    }

    #[test]
    fn test_authentication_codes() {
        assert_eq!(
            api_error(401, "AUTHENTICATION_REQUIRED").failure(),
            UpstreamFailure::Authentication
        );
        assert_eq!(api_error(401, "").failure(), UpstreamFailure::Authentication);
    }

    #[test]
    fn test_transient() {
        assert_eq!(
            AirtableError::RateLimited(30).failure(),
            UpstreamFailure::Transient
        );
        assert_eq!(
            api_error(503, "SERVICE_UNAVAILABLE").failure(),
            UpstreamFailure::Transient
        );
    }

    #[test]
    fn test_unclassified() {
        assert_eq!(
            api_error(422, "INVALID_VALUE_FOR_COLUMN").failure(),
            UpstreamFailure::Unclassified
        );
    }

    #[test]
    fn test_not_configured_is_configuration_error() {
        let failure = AirtableError::NotConfigured("AIRTABLE_API_KEY").failure();
        assert!(failure.is_configuration());
        assert!(!UpstreamFailure::Transient.is_configuration());
    }

    #[test]
    fn test_error_display() {
        let err = api_error(404, "NOT_FOUND");
        assert_eq!(err.to_string(), "API error: 404 NOT_FOUND: ");
        assert_eq!(
            AirtableError::NotConfigured("AIRTABLE_BASE_ID").to_string(),
            "Record store is not configured: AIRTABLE_BASE_ID is missing"
        );
    }
}
