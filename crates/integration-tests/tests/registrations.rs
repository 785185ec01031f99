//! Registration inquiry submission end to end.

use axum::http::StatusCode;
use pup_market_integration_tests::{TestContext, config_for, table_path};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_complete_form_creates_record() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path(table_path("Registrations")))
        .and(header("authorization", "Bearer patIntegrationKey"))
        .and(body_partial_json(json!({
            "records": [{
                "fields": {
                    "Pet Shop Name": "Acme Pets",
                    "Phone Number": "012-3456789",
                    "Email Address": "hello@acme.test",
                    "Message": "",
                    "Status": "New"
                }
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{"id": "recInquiry1", "fields": {}}]
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let response = ctx
        .post_json(
            "/api/registrations",
            json!({
                "shopName": "Acme Pets",
                "phoneNumber": "012-3456789",
                "email": "Hello@Acme.test"
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let body = response.json();
    assert_eq!(body["recordId"], "recInquiry1");
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
}

#[tokio::test]
async fn test_missing_contact_details_rejected() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let response = ctx
        .post_json(
            "/api/registrations",
            json!({"shopName": "Acme Pets", "email": "hello@acme.test"}),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let message = response.json()["message"].as_str().unwrap_or_default().to_string();
    assert!(message.contains("phoneNumber"), "{message}");
    assert!(message.contains("contactName"), "{message}");
}

#[tokio::test]
async fn test_invalid_email_rejected() {
    let ctx = TestContext::new().await;

    let response = ctx
        .post_json(
            "/api/registrations",
            json!({"shopName": "Acme", "email": "acme-at-example", "contactName": "Sam"}),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json(), json!({"message": "Invalid email address"}));
}

#[tokio::test]
async fn test_renamed_remote_field_is_client_error() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path(table_path("Registrations")))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "error": {"type": "UNKNOWN_FIELD_NAME", "message": "Unknown field name: \"Contact Person\""}
        })))
        .mount(&ctx.server)
        .await;

    let response = ctx
        .post_json(
            "/api/registrations",
            json!({"shopName": "Acme", "email": "hello@acme.test", "contactName": "Sam"}),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json()["message"],
        "Missing required fields in Airtable. Please check the table structure."
    );
}

#[tokio::test]
async fn test_unconfigured_store_is_configuration_error() {
    let server = MockServer::start().await;
    let mut config = config_for(&server);
    config.airtable.base_id = None;
    let ctx = TestContext::with_config(server, config);

    let response = ctx
        .post_json(
            "/api/registrations",
            json!({"shopName": "Acme", "email": "hello@acme.test", "phoneNumber": "0123"}),
        )
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json()["message"],
        "Airtable base or table not found. Please check configuration."
    );
}

#[tokio::test]
async fn test_status_reports_configuration() {
    let server = MockServer::start().await;
    let mut config = config_for(&server);
    config.airtable.api_key = None;
    let ctx = TestContext::with_config(server, config);

    let response = ctx.get("/api/registrations").await;
    assert_eq!(response.status, StatusCode::OK);

    let body = response.json();
    assert_eq!(body["hasApiKey"], json!(false));
    assert_eq!(body["hasBaseId"], json!(true));
    assert!(body["timestamp"].as_str().is_some());
    assert!(!response.text().contains("patIntegrationKey"));
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let ctx = TestContext::new().await;

    let response = ctx
        .request(
            axum::http::Method::POST,
            "/api/registrations",
            Some(json!(["not", "an", "object"])),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json()["message"],
        "Invalid request body. Expected a JSON object."
    );
}

#[tokio::test]
async fn test_numeric_phone_number_stored_as_text() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path(table_path("Registrations")))
        .and(body_partial_json(json!({
            "records": [{"fields": {"Phone Number": "60123456789"}}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{"id": "recNumericPhone", "fields": {}}]
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let response = ctx
        .post_json(
            "/api/registrations",
            json!({"shopName": "Acme", "phoneNumber": 60_123_456_789_u64, "email": "a@b.com"}),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json()["recordId"], "recNumericPhone");
}
