//! Airtable REST API client implementation.
//!
//! Uses `reqwest` with bearer authentication and a per-request timeout.
//! List calls follow Airtable's `offset` cursor until the last page.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use tracing::{debug, instrument};
use url::Url;

use super::types::{
    CreateRecords, CreatedRecords, ErrorBody, ListPage, ListQuery, NewRecord, RawRecord,
};
use super::{AirtableError, RecordStore};
use crate::config::AirtableConfig;

/// Largest page size Airtable accepts.
const PAGE_SIZE: &str = "100";

/// Error code Airtable uses when a table name does not resolve.
const TABLE_NOT_FOUND: &str = "TABLE_NOT_FOUND";

/// Client for the Airtable REST API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct AirtableClient {
    inner: Arc<AirtableClientInner>,
}

struct AirtableClientInner {
    client: reqwest::Client,
    api_url: Url,
    api_key: Option<SecretString>,
    base_id: Option<String>,
}

impl std::fmt::Debug for AirtableClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirtableClient")
            .field("api_url", &self.inner.api_url.as_str())
            .field("api_key", &"[REDACTED]")
            .field("base_id", &self.inner.base_id)
            .finish()
    }
}

impl AirtableClient {
    /// Create a new Airtable client.
    ///
    /// Missing credentials are accepted here; each request then fails with
    /// [`AirtableError::NotConfigured`].
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &AirtableConfig) -> Result<Self, AirtableError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(AirtableClientInner {
                client,
                api_url: config.api_url.clone(),
                api_key: config.api_key.clone(),
                base_id: config.base_id.clone(),
            }),
        })
    }

    fn api_key(&self) -> Result<&str, AirtableError> {
        self.inner
            .api_key
            .as_ref()
            .map(|key| key.expose_secret())
            .ok_or(AirtableError::NotConfigured("AIRTABLE_API_KEY"))
    }

    /// Build `{api_url}/{base_id}/{table}[/{record_id}]` with each segment
    /// percent-encoded.
    fn endpoint(&self, table: &str, record_id: Option<&str>) -> Result<Url, AirtableError> {
        let base_id = self
            .inner
            .base_id
            .as_deref()
            .ok_or(AirtableError::NotConfigured("AIRTABLE_BASE_ID"))?;

        let mut url = self.inner.api_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                AirtableError::Endpoint(format!("{} cannot be a base URL", self.inner.api_url))
            })?;
            segments.pop_if_empty().push(base_id).push(table);
            if let Some(id) = record_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    /// Fetch a single page of a listing.
    async fn list_page(
        &self,
        url: &Url,
        query: &ListQuery,
        offset: Option<&str>,
    ) -> Result<ListPage, AirtableError> {
        let mut params: Vec<(&str, &str)> = vec![("pageSize", PAGE_SIZE)];
        if let Some(formula) = query.filter_by_formula.as_deref() {
            params.push(("filterByFormula", formula));
        }
        if let Some(view) = query.view.as_deref() {
            params.push(("view", view));
        }
        if let Some(offset) = offset {
            params.push(("offset", offset));
        }

        let response = self
            .inner
            .client
            .get(url.clone())
            .bearer_auth(self.api_key()?)
            .query(&params)
            .send()
            .await?;

        let body = check_status(response).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl RecordStore for AirtableClient {
    #[instrument(skip(self, query), fields(table = %table))]
    async fn list(&self, table: &str, query: &ListQuery) -> Result<Vec<RawRecord>, AirtableError> {
        let url = self.endpoint(table, None)?;
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let page = self.list_page(&url, query, offset.as_deref()).await?;
            records.extend(page.records);

            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        debug!(count = records.len(), "Listed records");
        Ok(records)
    }

    #[instrument(skip(self), fields(table = %table, id = %id))]
    async fn find(&self, table: &str, id: &str) -> Result<Option<RawRecord>, AirtableError> {
        let url = self.endpoint(table, Some(id))?;

        let response = self
            .inner
            .client
            .get(url)
            .bearer_auth(self.api_key()?)
            .send()
            .await?;

        match check_status(response).await {
            Ok(body) => Ok(Some(serde_json::from_str(&body)?)),
            // A 404 on a record URL means the record is gone, unless Airtable
            // says the table itself is missing
            Err(AirtableError::Api { status: 404, code, .. }) if code != TABLE_NOT_FOUND => {
                debug!("Record not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, values), fields(table = %table))]
    async fn create(
        &self,
        table: &str,
        values: Map<String, Value>,
    ) -> Result<RawRecord, AirtableError> {
        let url = self.endpoint(table, None)?;
        let body = CreateRecords {
            records: vec![NewRecord { fields: values }],
        };

        let response = self
            .inner
            .client
            .post(url)
            .bearer_auth(self.api_key()?)
            .json(&body)
            .send()
            .await?;

        let text = check_status(response).await?;
        let created: CreatedRecords = serde_json::from_str(&text)?;

        let record = created.records.into_iter().next().ok_or_else(|| AirtableError::Api {
            status: StatusCode::OK.as_u16(),
            code: "EMPTY_RESPONSE".to_string(),
            message: "Create response contained no records".to_string(),
        })?;

        debug!(id = %record.id, "Created record");
        Ok(record)
    }
}

/// Turn a non-success response into an [`AirtableError`], otherwise return
/// the body text.
async fn check_status(response: Response) -> Result<String, AirtableError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);
        return Err(AirtableError::RateLimited(retry_after));
    }

    let text = response.text().await?;

    if status.is_success() {
        return Ok(text);
    }

    let (code, message) = serde_json::from_str::<ErrorBody>(&text).map_or_else(
        |_| {
            (
                status.canonical_reason().unwrap_or("UNKNOWN").to_string(),
                text.chars().take(200).collect(),
            )
        },
        |body| body.error.into_parts(),
    );

    tracing::warn!(
        status = %status,
        code = %code,
        message = %message,
        "Airtable API returned non-success status"
    );

    Err(AirtableError::Api {
        status: status.as_u16(),
        code,
        message,
    })
}
