//! Record and query-parameter validation
//!
//! A [`Schema`] declares a handful of typed fields and a policy for every
//! other key. Resources validate request bodies, stored documents and query
//! strings against schemas; when a resource has no schema for an operation
//! the permissive [`BASE_SCHEMA`] is used instead.

pub mod error;
pub mod field;

pub use error::{FieldError, ValidationError};
pub use field::{Field, FieldType, Preprocess};

use once_cell::sync::Lazy;
use serde_json::{Map, Value};

/// One document as a field-name to value mapping.
pub type Record = Map<String, Value>;

/// Literal separator of the compound `where` syntax.
pub const WHERE_SEPARATOR: &str = " AND ";

/// Policy for keys a schema does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Extra {
    /// Pass undeclared keys through unchanged.
    #[default]
    Allow,
    /// Drop undeclared keys from the output.
    Ignore,
    /// Reject undeclared keys.
    Forbid,
}

#[derive(Debug, Clone)]
pub struct Schema {
    name: String,
    fields: Vec<Field>,
    extra: Extra,
}

/// Accepts any mapping, declares nothing.
pub static BASE_SCHEMA: Lazy<Schema> = Lazy::new(|| Schema::new("BaseSchema"));

/// `where`, `limit`, `offset`, `order_by`; other keys pass through as field filters.
pub static BASE_QUERY_SCHEMA: Lazy<Schema> = Lazy::new(Schema::base_query);

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: vec![],
            extra: Extra::default(),
        }
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.retain(|f| f.name != field.name);
        self.fields.push(field);
        self
    }

    pub fn extra(mut self, extra: Extra) -> Self {
        self.extra = extra;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The query-parameter schema resources fall back to.
    ///
    /// Custom query schemas usually start from this one and add fields.
    pub fn base_query() -> Self {
        Schema::new("BaseQuerySchema")
            .field(
                Field::new("where", FieldType::Array)
                    .items(FieldType::String)
                    .pre(split_clauses),
            )
            .field(Field::new("limit", FieldType::Integer).default_value(100).ge(0.0))
            .field(Field::new("offset", FieldType::Integer).default_value(0).ge(0.0))
            .field(Field::new("order_by", FieldType::String).default_value("ASCENDING"))
    }

    /// Validate `data`, returning the typed record or every failure found.
    pub fn validate(&self, data: &Value) -> Result<Record, ValidationError> {
        let input = match data {
            Value::Object(map) => map,
            _ => {
                return Err(ValidationError::new(
                    &self.name,
                    vec![FieldError::new("__root__", "value is not a valid dict", "type_error.dict")],
                ))
            }
        };

        let mut errors = Vec::new();
        let mut out = Record::new();

        for field in &self.fields {
            if let Some(value) = field.validate(input.get(&field.name), &mut errors) {
                out.insert(field.name.clone(), value);
            }
        }

        for (key, value) in input {
            if self.get_field(key).is_some() {
                continue;
            }
            match self.extra {
                Extra::Allow => {
                    out.insert(key.clone(), value.clone());
                }
                Extra::Ignore => {}
                Extra::Forbid => errors.push(FieldError::new(
                    key.as_str(),
                    "extra fields not permitted",
                    "value_error.extra",
                )),
            }
        }

        if errors.is_empty() {
            Ok(out)
        } else {
            Err(ValidationError::new(&self.name, errors))
        }
    }
}

/// Validate against `schema`, or against [`BASE_SCHEMA`] when unset.
pub fn validate(schema: Option<&Schema>, data: &Value) -> Result<Record, ValidationError> {
    schema.unwrap_or(&BASE_SCHEMA).validate(data)
}

/// Pre-processor for `where`: `"a == 1 AND b > 2"` becomes `["a == 1", "b > 2"]`.
pub fn split_clauses(value: Value) -> Value {
    match value {
        Value::String(s) => Value::Array(
            s.split(WHERE_SEPARATOR)
                .map(|clause| Value::String(clause.to_string()))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_schema() -> Schema {
        Schema::new("User")
            .field(Field::new("name", FieldType::String).required())
            .field(Field::new("age", FieldType::Integer))
    }

    #[test]
    fn base_schema_accepts_any_mapping() {
        let data = json!({"name": "John Smith", "nested": {"a": [1, 2]}});
        let record = validate(None, &data).unwrap();
        assert_eq!(Value::Object(record), data);
    }

    #[test]
    fn non_mapping_is_rejected_at_root() {
        let err = validate(None, &json!([1, 2])).unwrap_err();
        assert_eq!(err.errors[0].loc, "__root__");
        assert_eq!(err.model, "BaseSchema");
    }

    #[test]
    fn declared_fields_are_coerced_and_extras_pass_through() {
        let record = user_schema()
            .validate(&json!({"name": "Ann", "age": "41", "dob": "01/03/2000"}))
            .unwrap();
        assert_eq!(record["age"], json!(41));
        assert_eq!(record["dob"], json!("01/03/2000"));
    }

    #[test]
    fn missing_optional_fields_are_omitted() {
        let record = user_schema().validate(&json!({"name": "Ann"})).unwrap();
        assert!(!record.contains_key("age"));
    }

    #[test]
    fn every_failing_field_is_reported() {
        let err = user_schema().validate(&json!({"age": "old"})).unwrap_err();
        assert_eq!(err.errors.len(), 2);
        let rendered = err.to_string();
        assert!(rendered.starts_with("2 validation errors for User"));
        assert!(rendered.contains("name\n  field required"));
        assert!(rendered.contains("age\n  value is not a valid integer"));
        assert_eq!(err.field_errors().len(), 2);
    }

    #[test]
    fn extra_policies() {
        let data = json!({"name": "Ann", "color": "red"});

        let ignored = user_schema().extra(Extra::Ignore).validate(&data).unwrap();
        assert!(!ignored.contains_key("color"));

        let err = user_schema().extra(Extra::Forbid).validate(&data).unwrap_err();
        assert_eq!(err.errors[0].loc, "color");
    }

    #[test]
    fn base_query_applies_defaults() {
        let record = validate(Some(&BASE_QUERY_SCHEMA), &json!({})).unwrap();
        assert_eq!(record["limit"], json!(100));
        assert_eq!(record["offset"], json!(0));
        assert_eq!(record["order_by"], json!("ASCENDING"));
        assert!(!record.contains_key("where"));
    }

    #[test]
    fn base_query_splits_compound_where() {
        let joined = BASE_QUERY_SCHEMA
            .validate(&json!({"where": "age > 30 AND name == Ann"}))
            .unwrap();
        let listed = BASE_QUERY_SCHEMA
            .validate(&json!({"where": ["age > 30", "name == Ann"]}))
            .unwrap();
        assert_eq!(joined, listed);
        assert_eq!(joined["where"], json!(["age > 30", "name == Ann"]));
    }

    #[test]
    fn base_query_rejects_negative_paging() {
        let err = BASE_QUERY_SCHEMA
            .validate(&json!({"limit": "-1", "offset": -5}))
            .unwrap_err();
        assert_eq!(err.errors.len(), 2);
    }

    #[test]
    fn redeclaring_a_field_replaces_it() {
        let schema = Schema::base_query().field(Field::new("limit", FieldType::Integer).default_value(10));
        let record = schema.validate(&json!({})).unwrap();
        assert_eq!(record["limit"], json!(10));
        assert_eq!(schema.fields().len(), 4);
    }
}
