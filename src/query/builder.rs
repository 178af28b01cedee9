use serde_json::Value;

use super::error::QueryError;
use super::query_order::QueryOrder;
use super::query_where::QueryWhere;
use super::types::QuerySpec;
use crate::database::{CollectionRef, FilterOp, Query};
use crate::schema::Schema;

pub struct QueryBuilder;

impl QueryBuilder {
    /// Translate a validated [`QuerySpec`] into a database query on `collection`.
    ///
    /// `record_schema` types filter values for the fields it declares. All
    /// filtering is left to the database; nothing is filtered here.
    pub fn build(
        collection: &CollectionRef,
        spec: &QuerySpec,
        record_schema: Option<&Schema>,
    ) -> Result<Query, QueryError> {
        let mut query = collection.query();

        for raw in spec.where_clauses.iter().flatten() {
            if raw.trim().is_empty() {
                continue;
            }
            let clause = QueryWhere::parse(raw)?;
            let value = QueryWhere::typed_value(&clause.field, clause.op, &clause.literal, record_schema)?;
            query = query.filter(clause.field, clause.op, value);
        }

        for (field, value) in &spec.filters {
            let value = match value {
                Value::String(s) => QueryWhere::typed_value(field, FilterOp::Eq, s, record_schema)?,
                other => other.clone(),
            };
            query = query.filter(field.clone(), FilterOp::Eq, value);
        }

        for order in QueryOrder::parse(&spec.order_by)? {
            query = query.order_by(order.field, order.direction);
        }

        tracing::debug!(
            "built query on {} with {} filter(s), offset {}, limit {}",
            collection.path(),
            query.filters().len(),
            spec.offset,
            spec.limit
        );

        Ok(query.offset(spec.offset).limit(spec.limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{Direction, FieldFilter, DOCUMENT_ID};
    use crate::schema::{Field, FieldType};
    use serde_json::json;

    fn users() -> CollectionRef {
        CollectionRef::new("users").unwrap()
    }

    #[test]
    fn defaults_produce_id_order_and_paging() {
        let q = QueryBuilder::build(&users(), &QuerySpec::default(), None).unwrap();
        assert!(q.filters().is_empty());
        assert_eq!(q.orders()[0].field, DOCUMENT_ID);
        assert_eq!(q.orders()[0].direction, Direction::Ascending);
        assert_eq!(q.offset_value(), Some(0));
        assert_eq!(q.limit_value(), Some(100));
    }

    #[test]
    fn clauses_and_field_filters_combine() {
        let schema = Schema::new("User").field(Field::new("age", FieldType::Integer));
        let mut spec = QuerySpec {
            where_clauses: Some(vec!["age > 30".into(), "name != Bob".into()]),
            order_by: "age DESCENDING".into(),
            limit: 5,
            offset: 10,
            ..QuerySpec::default()
        };
        spec.filters.insert("city".into(), json!("Paris"));

        let q = QueryBuilder::build(&users(), &spec, Some(&schema)).unwrap();
        assert_eq!(
            q.filters(),
            &[
                FieldFilter { field: "age".into(), op: FilterOp::Gt, value: json!(30) },
                FieldFilter { field: "name".into(), op: FilterOp::Ne, value: json!("Bob") },
                FieldFilter { field: "city".into(), op: FilterOp::Eq, value: json!("Paris") },
            ]
        );
        assert_eq!(q.orders()[0].field, "age");
        assert_eq!(q.orders()[0].direction, Direction::Descending);
        assert_eq!(q.offset_value(), Some(10));
        assert_eq!(q.limit_value(), Some(5));
    }

    #[test]
    fn blank_clauses_are_skipped() {
        let spec = QuerySpec {
            where_clauses: Some(vec!["".into()]),
            ..QuerySpec::default()
        };
        let q = QueryBuilder::build(&users(), &spec, None).unwrap();
        assert!(q.filters().is_empty());
    }

    #[test]
    fn bad_clause_fails_the_build() {
        let spec = QuerySpec {
            where_clauses: Some(vec!["age ~ 3".into()]),
            ..QuerySpec::default()
        };
        assert!(QueryBuilder::build(&users(), &spec, None).is_err());
    }
}
