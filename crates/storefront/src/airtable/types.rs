//! Airtable wire types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A record as returned by the record store.
///
/// Field names and value shapes belong to whoever administers the table, so
/// the fields stay untyped here; only the catalog's projection reads them.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawRecord {
    /// Opaque record id (e.g., `recXXXXXXXXXXXXXX`).
    pub id: String,
    /// Field name → untyped value. Empty fields are omitted by Airtable.
    #[serde(default)]
    pub fields: Map<String, Value>,
    /// Creation timestamp (ISO 8601).
    #[serde(rename = "createdTime", default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
}

impl RawRecord {
    /// Build a record from an id and a JSON object of fields.
    ///
    /// Non-object values produce a record with no fields.
    #[must_use]
    pub fn new(id: impl Into<String>, fields: Value) -> Self {
        let fields = match fields {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            id: id.into(),
            fields,
            created_time: None,
        }
    }
}

/// Options for listing a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Airtable formula; only records evaluating truthy are returned.
    pub filter_by_formula: Option<String>,
    /// Named view whose filters and sort order apply.
    pub view: Option<String>,
}

impl ListQuery {
    /// List every record.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// List records matching `formula`.
    #[must_use]
    pub fn filtered(formula: impl Into<String>) -> Self {
        Self {
            filter_by_formula: Some(formula.into()),
            view: None,
        }
    }

    /// Restrict the listing to a named view.
    #[must_use]
    pub fn with_view(mut self, view: Option<String>) -> Self {
        self.view = view;
        self
    }
}

/// One page of a list response.
#[derive(Debug, Deserialize)]
pub(crate) struct ListPage {
    #[serde(default)]
    pub records: Vec<RawRecord>,
    /// Cursor for the next page; absent on the last page.
    pub offset: Option<String>,
}

/// Body of a create request.
#[derive(Debug, Serialize)]
pub(crate) struct CreateRecords {
    pub records: Vec<NewRecord>,
}

/// A record to create.
#[derive(Debug, Serialize)]
pub(crate) struct NewRecord {
    pub fields: Map<String, Value>,
}

/// Body of a create response.
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedRecords {
    #[serde(default)]
    pub records: Vec<RawRecord>,
}

/// Airtable error body.
///
/// Airtable uses two shapes: `{"error": "NOT_FOUND"}` and
/// `{"error": {"type": "...", "message": "..."}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorDetail {
    Code(String),
    Typed {
        #[serde(rename = "type")]
        code: String,
        #[serde(default)]
        message: String,
    },
}

impl ErrorDetail {
    /// Split into `(code, message)`.
    pub fn into_parts(self) -> (String, String) {
        match self {
            Self::Code(code) => (code, String::new()),
            Self::Typed { code, message } => (code, message),
        }
    }
}
