use serde_json::Value;

use super::error::QueryError;
use crate::database::FilterOp;
use crate::schema::{FieldType, Schema};

/// One parsed `field operator value` clause, value still as written.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub field: String,
    pub op: FilterOp,
    pub literal: String,
}

/// Split off the first whitespace-delimited token.
fn next_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.find(char::is_whitespace) {
        Some(idx) => Some((&s[..idx], &s[idx..])),
        None => Some((s, "")),
    }
}

fn unquote(s: &str) -> &str {
    let quoted = s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')));
    if quoted {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

pub struct QueryWhere;

impl QueryWhere {
    /// Parse `field op value`. The value is everything after the operator, so
    /// it may contain spaces; one pair of surrounding quotes is removed.
    pub fn parse(clause: &str) -> Result<WhereClause, QueryError> {
        let missing = || QueryError::InvalidWhereClause(format!("expected 'field operator value', got '{}'", clause));

        let (field, rest) = next_token(clause).ok_or_else(missing)?;
        let (op, rest) = next_token(rest).ok_or_else(missing)?;
        let literal = rest.trim();
        if literal.is_empty() {
            return Err(missing());
        }

        let op = FilterOp::from_symbol(op).ok_or_else(|| QueryError::UnsupportedOperator(op.to_string()))?;

        Ok(WhereClause {
            field: field.to_string(),
            op,
            literal: unquote(literal).to_string(),
        })
    }

    /// Type a literal using the field's declaration in `schema`.
    ///
    /// Undeclared fields, and fields declared as `Array`, `Object` or `Any`,
    /// keep the literal as a string. List operators split the literal on `,`.
    pub fn typed_value(
        field: &str,
        op: FilterOp,
        literal: &str,
        schema: Option<&Schema>,
    ) -> Result<Value, QueryError> {
        let declared = schema.and_then(|s| s.get_field(field));

        let element_type = declared.and_then(|f| match (op, f.field_type()) {
            (FilterOp::ArrayContains | FilterOp::ArrayContainsAny, FieldType::Array) => f.item_type(),
            (_, FieldType::Array | FieldType::Object | FieldType::Any) => None,
            (_, ty) => Some(ty),
        });

        let coerce = |raw: &str| -> Result<Value, QueryError> {
            let raw = Value::String(raw.to_string());
            match element_type {
                Some(ty) => ty.coerce(raw).map_err(|(msg, _)| {
                    QueryError::InvalidOperatorData(format!("{} {} {}: {}", field, op.symbol(), literal, msg))
                }),
                None => Ok(raw),
            }
        };

        if op.takes_list() {
            literal
                .split(',')
                .map(|item| coerce(unquote(item.trim())))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        } else {
            coerce(literal)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new("Person")
            .field(Field::new("age", FieldType::Integer))
            .field(Field::new("score", FieldType::Number))
            .field(Field::new("active", FieldType::Boolean))
            .field(Field::new("tags", FieldType::Array).items(FieldType::String))
            .field(Field::new("lucky", FieldType::Array).items(FieldType::Integer))
    }

    #[test]
    fn parses_three_parts() {
        let c = QueryWhere::parse("age >= 21").unwrap();
        assert_eq!(c.field, "age");
        assert_eq!(c.op, FilterOp::Gte);
        assert_eq!(c.literal, "21");
    }

    #[test]
    fn value_keeps_inner_spaces_and_drops_quotes() {
        let c = QueryWhere::parse("  name   ==  \"John Smith\" ").unwrap();
        assert_eq!(c.field, "name");
        assert_eq!(c.literal, "John Smith");
    }

    #[test]
    fn rejects_short_clauses_and_unknown_operators() {
        assert!(matches!(QueryWhere::parse("age >="), Err(QueryError::InvalidWhereClause(_))));
        assert!(matches!(QueryWhere::parse(""), Err(QueryError::InvalidWhereClause(_))));
        assert_eq!(
            QueryWhere::parse("age => 3"),
            Err(QueryError::UnsupportedOperator("=>".to_string()))
        );
    }

    #[test]
    fn declared_fields_are_typed() {
        let s = schema();
        assert_eq!(QueryWhere::typed_value("age", FilterOp::Gt, "30", Some(&s)), Ok(json!(30)));
        assert_eq!(QueryWhere::typed_value("score", FilterOp::Lt, "2.5", Some(&s)), Ok(json!(2.5)));
        assert_eq!(QueryWhere::typed_value("active", FilterOp::Eq, "true", Some(&s)), Ok(json!(true)));
        assert_eq!(
            QueryWhere::typed_value("lucky", FilterOp::ArrayContains, "7", Some(&s)),
            Ok(json!(7))
        );
    }

    #[test]
    fn undeclared_fields_stay_strings() {
        assert_eq!(QueryWhere::typed_value("age", FilterOp::Gt, "30", None), Ok(json!("30")));
        assert_eq!(
            QueryWhere::typed_value("city", FilterOp::Eq, "Paris", Some(&schema())),
            Ok(json!("Paris"))
        );
    }

    #[test]
    fn list_operators_split_on_commas() {
        let s = schema();
        assert_eq!(
            QueryWhere::typed_value("age", FilterOp::In, "1, 2,3", Some(&s)),
            Ok(json!([1, 2, 3]))
        );
        assert_eq!(
            QueryWhere::typed_value("tags", FilterOp::ArrayContainsAny, "a,b", Some(&s)),
            Ok(json!(["a", "b"]))
        );
        assert_eq!(
            QueryWhere::typed_value("city", FilterOp::NotIn, "Paris,Rome", None),
            Ok(json!(["Paris", "Rome"]))
        );
    }

    #[test]
    fn mistyped_literal_is_an_error() {
        let err = QueryWhere::typed_value("age", FilterOp::Eq, "old", Some(&schema())).unwrap_err();
        assert!(matches!(err, QueryError::InvalidOperatorData(_)));
    }
}
