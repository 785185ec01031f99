//! Pet shop registration inquiries.
//!
//! Inquiries are validated here and written to the registrations table. They
//! are never read back and never touch the listing caches.

use chrono::{DateTime, SecondsFormat, Utc};
use pup_market_core::{Email, EmailError, RegistrationId, RegistrationStatus};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::instrument;

use crate::airtable::{AirtableError, RecordStore};

/// Field names in the registrations table.
mod fields {
    pub const SHOP_NAME: &str = "Pet Shop Name";
    pub const PHONE_NUMBER: &str = "Phone Number";
    pub const CONTACT_PERSON: &str = "Contact Person";
    pub const EMAIL: &str = "Email Address";
    pub const MESSAGE: &str = "Message";
    pub const STATUS: &str = "Status";
    pub const SUBMITTED_AT: &str = "Submitted At";
}

/// Errors that can occur while submitting an inquiry.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Required form fields are blank or absent.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Email is not a structurally valid address.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The record store rejected or failed the write.
    #[error("Record store error: {0}")]
    Store(#[from] AirtableError),
}

/// Registration form as posted by the frontend.
///
/// Scalars are accepted as text, so a phone number posted as a JSON number
/// still validates. Arrays and objects count as missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationForm {
    #[serde(deserialize_with = "scalar_text")]
    pub shop_name: Option<String>,
    #[serde(deserialize_with = "scalar_text")]
    pub phone_number: Option<String>,
    #[serde(deserialize_with = "scalar_text")]
    pub contact_name: Option<String>,
    #[serde(deserialize_with = "scalar_text")]
    pub email: Option<String>,
    #[serde(deserialize_with = "scalar_text")]
    pub message: Option<String>,
}

fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}

/// A validated inquiry ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationInquiry {
    pub shop_name: String,
    pub phone_number: Option<String>,
    pub contact_name: Option<String>,
    pub email: Email,
    pub message: String,
    pub status: RegistrationStatus,
    pub submitted_at: DateTime<Utc>,
}

impl RegistrationForm {
    /// Check required fields and build an inquiry stamped with `submitted_at`.
    ///
    /// Requires a shop name, an email, and at least one of phone number or
    /// contact name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::MissingFields`] naming every missing
    /// field, or [`RegistrationError::InvalidEmail`].
    pub fn validate(
        self,
        submitted_at: DateTime<Utc>,
    ) -> Result<RegistrationInquiry, RegistrationError> {
        let shop_name = non_blank(self.shop_name);
        let phone_number = non_blank(self.phone_number);
        let contact_name = non_blank(self.contact_name);
        let email = non_blank(self.email);

        let mut missing = Vec::new();
        if shop_name.is_none() {
            missing.push("shopName");
        }
        if email.is_none() {
            missing.push("email");
        }
        if phone_number.is_none() && contact_name.is_none() {
            missing.push("phoneNumber or contactName");
        }

        let (Some(shop_name), Some(email)) = (shop_name, email) else {
            return Err(RegistrationError::MissingFields(missing));
        };
        if !missing.is_empty() {
            return Err(RegistrationError::MissingFields(missing));
        }

        Ok(RegistrationInquiry {
            shop_name,
            phone_number,
            contact_name,
            email: Email::parse(&email)?,
            message: non_blank(self.message).unwrap_or_default(),
            status: RegistrationStatus::New,
            submitted_at,
        })
    }
}

impl RegistrationInquiry {
    /// Record fields for the registrations table.
    #[must_use]
    pub fn into_fields(self) -> Map<String, Value> {
        let mut record = Map::new();
        record.insert(fields::SHOP_NAME.to_string(), Value::String(self.shop_name));
        if let Some(phone) = self.phone_number {
            record.insert(fields::PHONE_NUMBER.to_string(), Value::String(phone));
        }
        if let Some(contact) = self.contact_name {
            record.insert(fields::CONTACT_PERSON.to_string(), Value::String(contact));
        }
        record.insert(
            fields::EMAIL.to_string(),
            Value::String(self.email.into_inner()),
        );
        record.insert(fields::MESSAGE.to_string(), Value::String(self.message));
        record.insert(
            fields::STATUS.to_string(),
            Value::String(self.status.as_str().to_string()),
        );
        record.insert(
            fields::SUBMITTED_AT.to_string(),
            Value::String(self.submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        record
    }
}

/// Validate `form` and store it in `table`.
///
/// # Errors
///
/// Returns an error if validation fails or the record store write fails.
#[instrument(skip(store, form))]
pub async fn submit(
    store: &dyn RecordStore,
    table: &str,
    form: RegistrationForm,
) -> Result<RegistrationId, RegistrationError> {
    let inquiry = form.validate(Utc::now())?;
    let record = store.create(table, inquiry.into_fields()).await?;

    tracing::info!(record_id = %record.id, "Registration inquiry saved");

    Ok(RegistrationId::new(record.id))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::airtable::UpstreamFailure;
    use crate::catalog::tests::FakeStore;

    fn form(value: Value) -> RegistrationForm {
        serde_json::from_value(value).unwrap()
    }

    fn submitted_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_missing_contact_details_named() {
        let err = form(json!({"shopName": "Acme Pets", "email": "hi@acme.com"}))
            .validate(submitted_at())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required fields: phoneNumber or contactName"
        );
    }

    #[test]
    fn test_blank_fields_count_as_missing() {
        let err = form(json!({"shopName": "  ", "phoneNumber": "0123"}))
            .validate(submitted_at())
            .unwrap_err();
        match err {
            RegistrationError::MissingFields(missing) => {
                assert_eq!(missing, vec!["shopName", "email"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_numeric_phone_number_accepted() {
        let inquiry = form(json!({"shopName": "Acme", "phoneNumber": 60_123_456_789_u64, "email": "a@b.com"}))
            .validate(submitted_at())
            .unwrap();
        assert_eq!(inquiry.phone_number.as_deref(), Some("60123456789"));
    }

    #[test]
    fn test_non_scalar_values_count_as_missing() {
        let err = form(json!({"shopName": ["Acme"], "phoneNumber": {"number": "0123"}, "email": "a@b.com"}))
            .validate(submitted_at())
            .unwrap_err();
        match err {
            RegistrationError::MissingFields(missing) => {
                assert_eq!(missing, vec!["shopName", "phoneNumber or contactName"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_email_rejected() {
        let err = form(json!({"shopName": "Acme", "email": "not-an-email", "contactName": "Sam"}))
            .validate(submitted_at())
            .unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidEmail(_)));
    }

    #[test]
    fn test_contact_name_alone_is_enough() {
        let inquiry = form(json!({"shopName": "Acme", "email": "Hi@Acme.com", "contactName": "Sam"}))
            .validate(submitted_at())
            .unwrap();
        assert_eq!(inquiry.contact_name.as_deref(), Some("Sam"));
        assert!(inquiry.phone_number.is_none());
        assert_eq!(inquiry.email.as_str(), "hi@acme.com");
    }

    #[test]
    fn test_record_fields() {
        let fields = form(json!({
            "shopName": " Acme Pets ",
            "phoneNumber": "012-3456789",
            "email": "hi@acme.com"
        }))
        .validate(submitted_at())
        .unwrap()
        .into_fields();

        assert_eq!(
            Value::Object(fields),
            json!({
                "Pet Shop Name": "Acme Pets",
                "Phone Number": "012-3456789",
                "Email Address": "hi@acme.com",
                "Message": "",
                "Status": "New",
                "Submitted At": "2025-01-02T03:04:05.000Z"
            })
        );
    }

    #[tokio::test]
    async fn test_submit_creates_record() {
        let store = Arc::new(FakeStore::default());
        let id = submit(
            store.as_ref(),
            "Registrations",
            form(json!({"shopName": "Acme", "email": "hi@acme.com", "phoneNumber": "0123"})),
        )
        .await
        .unwrap();

        assert_eq!(id.as_str(), "recCreated");
        let created = store.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].0, "Registrations");
        assert_eq!(created[0].1["Status"], json!("New"));
    }

    #[tokio::test]
    async fn test_submit_does_not_write_invalid_form() {
        let store = FakeStore::default();
        let err = submit(&store, "Registrations", RegistrationForm::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistrationError::MissingFields(_)));
        assert!(store.created().is_empty());
    }

    #[tokio::test]
    async fn test_submit_surfaces_store_failure() {
        let store = FakeStore::default();
        store.fail_next_create(AirtableError::Api {
            status: 422,
            code: "UNKNOWN_FIELD_NAME".to_string(),
            message: "Unknown field name: \"Contact Person\"".to_string(),
        });

        let err = submit(
            &store,
            "Registrations",
            form(json!({"shopName": "Acme", "email": "hi@acme.com", "contactName": "Sam"})),
        )
        .await
        .unwrap_err();

        match err {
            RegistrationError::Store(e) => assert_eq!(e.failure(), UpstreamFailure::MissingField),
            other => panic!("unexpected error: {other}"),
        }
    }
}
