use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::error::DatabaseError;
use super::path::DocumentRef;
use super::query::{Direction, FieldFilter, FilterOp, Query, DOCUMENT_ID};
use super::{DocumentDatabase, DocumentSnapshot};
use crate::schema::Record;

/// Largest candidate list accepted by `in`, `not-in` and `array-contains-any`.
pub const MAX_DISJUNCTION: usize = 30;

/// Document database held in process memory, keyed by full document path.
///
/// Follows hosted document-store semantics where they matter to resources:
/// documents lacking a filtered or ordered field never match, and results
/// fall back to document-id order.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    documents: Arc<RwLock<BTreeMap<String, Record>>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents across all collections
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentDatabase for InMemoryDatabase {
    async fn get(&self, doc: &DocumentRef) -> Result<DocumentSnapshot, DatabaseError> {
        let documents = self.documents.read().await;
        Ok(DocumentSnapshot::new(doc, documents.get(doc.path()).cloned()))
    }

    async fn create(&self, doc: &DocumentRef, data: Record) -> Result<(), DatabaseError> {
        let mut documents = self.documents.write().await;
        if documents.contains_key(doc.path()) {
            return Err(DatabaseError::already_exists(format!(
                "Document already exists: {}",
                doc.path()
            )));
        }
        documents.insert(doc.path().to_string(), data);
        tracing::debug!("created document {}", doc.path());
        Ok(())
    }

    async fn set(&self, doc: &DocumentRef, data: Record) -> Result<(), DatabaseError> {
        self.documents
            .write()
            .await
            .insert(doc.path().to_string(), data);
        tracing::debug!("set document {}", doc.path());
        Ok(())
    }

    async fn update(&self, doc: &DocumentRef, data: Record) -> Result<(), DatabaseError> {
        let mut documents = self.documents.write().await;
        let existing = documents
            .get_mut(doc.path())
            .ok_or_else(|| DatabaseError::not_found(format!("No document to update: {}", doc.path())))?;
        existing.extend(data);
        tracing::debug!("updated document {}", doc.path());
        Ok(())
    }

    async fn delete(&self, doc: &DocumentRef) -> Result<(), DatabaseError> {
        let mut documents = self.documents.write().await;
        documents
            .remove(doc.path())
            .ok_or_else(|| DatabaseError::not_found(format!("No document to delete: {}", doc.path())))?;
        tracing::debug!("deleted document {}", doc.path());
        Ok(())
    }

    async fn run_query(&self, query: &Query) -> Result<Vec<DocumentSnapshot>, DatabaseError> {
        check_query(query)?;

        let prefix = format!("{}/", query.parent().path());
        let documents = self.documents.read().await;

        let mut matched: Vec<(String, &Record)> = documents
            .range(prefix.clone()..)
            .take_while(|(path, _)| path.starts_with(&prefix))
            .filter_map(|(path, data)| {
                let id = &path[prefix.len()..];
                (!id.contains('/')).then(|| (id.to_string(), data))
            })
            .filter(|(_, data)| query.filters().iter().all(|f| matches_filter(data, f)))
            .filter(|(_, data)| {
                query
                    .orders()
                    .iter()
                    .all(|o| o.field == DOCUMENT_ID || data.contains_key(&o.field))
            })
            .collect();

        matched.sort_by(|(a_id, a), (b_id, b)| {
            for order in query.orders() {
                let ord = if order.field == DOCUMENT_ID {
                    a_id.cmp(b_id)
                } else {
                    compare_values(&a[&order.field], &b[&order.field])
                };
                let ord = match order.direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            a_id.cmp(b_id)
        });

        let offset = query.offset_value().unwrap_or(0);
        let limit = query.limit_value().unwrap_or(usize::MAX);

        Ok(matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(id, data)| DocumentSnapshot {
                path: format!("{}{}", prefix, id),
                id,
                data: Some(data.clone()),
            })
            .collect())
    }
}

/// Reject filter combinations a hosted document store would refuse.
fn check_query(query: &Query) -> Result<(), DatabaseError> {
    let mut array_filters = 0;
    let mut has_not_in = false;
    let mut has_ne = false;

    for filter in query.filters() {
        if filter.op.takes_list() {
            let size = filter.value.as_array().map(|a| a.len()).ok_or_else(|| {
                DatabaseError::invalid_argument(format!(
                    "'{}' filter on '{}' requires an array value",
                    filter.op.symbol(),
                    filter.field
                ))
            })?;
            if size == 0 || size > MAX_DISJUNCTION {
                return Err(DatabaseError::invalid_argument(format!(
                    "'{}' filter on '{}' requires between 1 and {} values",
                    filter.op.symbol(),
                    filter.field,
                    MAX_DISJUNCTION
                )));
            }
        }
        match filter.op {
            FilterOp::ArrayContains | FilterOp::ArrayContainsAny => array_filters += 1,
            FilterOp::NotIn => has_not_in = true,
            FilterOp::Ne => has_ne = true,
            _ => {}
        }
    }

    if array_filters > 1 {
        return Err(DatabaseError::invalid_argument(
            "A query may contain at most one 'array-contains' or 'array-contains-any' filter",
        ));
    }
    if has_not_in && has_ne {
        return Err(DatabaseError::invalid_argument(
            "'not-in' cannot be combined with '!=' in the same query",
        ));
    }
    Ok(())
}

fn matches_filter(data: &Record, filter: &FieldFilter) -> bool {
    let actual = match data.get(&filter.field) {
        Some(v) => v,
        None => return false,
    };
    let expected = &filter.value;
    let candidates = || expected.as_array().map(|a| a.as_slice()).unwrap_or(&[]);

    match filter.op {
        FilterOp::Eq => values_equal(actual, expected),
        FilterOp::Ne => !actual.is_null() && !values_equal(actual, expected),
        FilterOp::Lt => comparable(actual, expected) == Some(Ordering::Less),
        FilterOp::Lte => matches!(comparable(actual, expected), Some(Ordering::Less | Ordering::Equal)),
        FilterOp::Gt => comparable(actual, expected) == Some(Ordering::Greater),
        FilterOp::Gte => matches!(comparable(actual, expected), Some(Ordering::Greater | Ordering::Equal)),
        FilterOp::In => candidates().iter().any(|c| values_equal(actual, c)),
        FilterOp::NotIn => !actual.is_null() && !candidates().iter().any(|c| values_equal(actual, c)),
        FilterOp::ArrayContains => actual
            .as_array()
            .is_some_and(|items| items.iter().any(|i| values_equal(i, expected))),
        FilterOp::ArrayContainsAny => actual.as_array().is_some_and(|items| {
            items
                .iter()
                .any(|i| candidates().iter().any(|c| values_equal(i, c)))
        }),
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Ordering between values of the same kind; `None` across kinds.
fn comparable(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order used for sorting: kind first, then value.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    type_rank(a).cmp(&type_rank(b)).then_with(|| match (a, b) {
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y.iter())
            .map(|(i, j)| compare_values(i, j))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        _ => comparable(a, b).unwrap_or(Ordering::Equal),
    })
}
