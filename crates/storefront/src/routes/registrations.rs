//! Pet shop registration handlers.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::services::{RegistrationForm, registrations};
use crate::state::AppState;

const INVALID_BODY_MESSAGE: &str = "Invalid request body. Expected a JSON object.";

/// Body returned after a successful submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedResponse {
    pub message: &'static str,
    pub record_id: String,
}

/// Configuration check for deployment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub message: &'static str,
    pub has_api_key: bool,
    pub has_base_id: bool,
    pub timestamp: String,
}

/// Submit a registration inquiry.
///
/// A body that is not a JSON object is rejected with 400 before validation.
pub async fn submit(
    State(state): State<AppState>,
    body: std::result::Result<Json<RegistrationForm>, axum::extract::rejection::JsonRejection>,
) -> Result<(StatusCode, Json<SubmittedResponse>)> {
    let Json(form) = body.map_err(|e| {
        tracing::debug!(error = %e.body_text(), "Rejected registration body");
        AppError::BadRequest(INVALID_BODY_MESSAGE.to_string())
    })?;

    tracing::info!(
        has_phone = form.phone_number.is_some(),
        has_contact = form.contact_name.is_some(),
        "Registration submitted"
    );

    let id = registrations::submit(
        state.store(),
        &state.config().catalog.registrations_table,
        form,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmittedResponse {
            message: "Inquiry submitted successfully! Our team will contact you soon.",
            record_id: id.into_inner(),
        }),
    ))
}

/// Report whether record store credentials are present. Never exposes them.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let airtable = &state.config().airtable;
    Json(StatusResponse {
        message: "Registrations API is working!",
        has_api_key: airtable.api_key.is_some(),
        has_base_id: airtable.base_id.is_some(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
