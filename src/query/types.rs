use serde::Deserialize;
use serde_json::Value;

use crate::schema::{FieldError, Record, ValidationError};

fn default_limit() -> usize {
    100
}

fn default_order_by() -> String {
    "ASCENDING".to_string()
}

/// Typed collection query, read from validated query-string parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuerySpec {
    /// Clauses of the form `field operator value`
    #[serde(rename = "where", default)]
    pub where_clauses: Option<Vec<String>>,

    #[serde(default = "default_limit")]
    pub limit: usize,

    #[serde(default)]
    pub offset: usize,

    #[serde(default = "default_order_by")]
    pub order_by: String,

    /// Remaining parameters, each an equality filter on the field of the same name
    #[serde(flatten)]
    pub filters: Record,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            where_clauses: None,
            limit: default_limit(),
            offset: 0,
            order_by: default_order_by(),
            filters: Record::new(),
        }
    }
}

impl QuerySpec {
    /// Build from a record already validated by a query schema.
    pub fn from_record(record: Record) -> Result<Self, ValidationError> {
        serde_json::from_value(Value::Object(record)).map_err(|e| {
            ValidationError::new(
                "QuerySpec",
                vec![FieldError::new("__root__", e.to_string(), "type_error")],
            )
        })
    }
}
