use super::error::QueryError;
use crate::database::{Direction, OrderBy, DOCUMENT_ID};

pub struct QueryOrder;

impl QueryOrder {
    /// Parse an `order_by` value into orderings.
    ///
    /// Each comma-separated part is `ASCENDING`, `DESCENDING` (document id
    /// order), `field`, or `field DIRECTION`. Only the exact label
    /// `DESCENDING` sorts descending; any other direction is ascending.
    pub fn parse(order_by: &str) -> Result<Vec<OrderBy>, QueryError> {
        let mut out = Vec::new();
        for part in order_by.split(',') {
            let tokens: Vec<&str> = part.split_whitespace().collect();
            let order = match tokens.as_slice() {
                [] => continue,
                [label] if Direction::is_label(label) => OrderBy {
                    field: DOCUMENT_ID.to_string(),
                    direction: Direction::from_label(label),
                },
                [field] => OrderBy {
                    field: field.to_string(),
                    direction: Direction::Ascending,
                },
                [field, direction] => OrderBy {
                    field: field.to_string(),
                    direction: Direction::from_label(direction),
                },
                _ => return Err(QueryError::InvalidOrder(part.trim().to_string())),
            };
            out.push(order);
        }
        Ok(out)
    }
}
