use serde_json::Value;

use super::path::CollectionRef;

/// Field path that orders or filters by document id.
pub const DOCUMENT_ID: &str = "__name__";

/// Comparison operators a document query can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    NotIn,
    ArrayContains,
    ArrayContainsAny,
}

impl FilterOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "==" => FilterOp::Eq,
            "!=" => FilterOp::Ne,
            "<" => FilterOp::Lt,
            "<=" => FilterOp::Lte,
            ">" => FilterOp::Gt,
            ">=" => FilterOp::Gte,
            "in" => FilterOp::In,
            "not-in" => FilterOp::NotIn,
            "array-contains" => FilterOp::ArrayContains,
            "array-contains-any" => FilterOp::ArrayContainsAny,
            _ => return None,
        })
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            FilterOp::Eq => "==",
            FilterOp::Ne => "!=",
            FilterOp::Lt => "<",
            FilterOp::Lte => "<=",
            FilterOp::Gt => ">",
            FilterOp::Gte => ">=",
            FilterOp::In => "in",
            FilterOp::NotIn => "not-in",
            FilterOp::ArrayContains => "array-contains",
            FilterOp::ArrayContainsAny => "array-contains-any",
        }
    }

    /// Operators whose operand is a list of candidates.
    pub fn takes_list(&self) -> bool {
        matches!(self, FilterOp::In | FilterOp::NotIn | FilterOp::ArrayContainsAny)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    /// `"DESCENDING"` (exact, case-sensitive) is descending; every other label,
    /// including `"descending"`, is ascending.
    pub fn from_label(label: &str) -> Self {
        if label == "DESCENDING" {
            Direction::Descending
        } else {
            Direction::Ascending
        }
    }

    pub fn is_label(label: &str) -> bool {
        label == "ASCENDING" || label == "DESCENDING"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// A query over one collection. Filters combine with AND.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    parent: CollectionRef,
    filters: Vec<FieldFilter>,
    orders: Vec<OrderBy>,
    offset: Option<usize>,
    limit: Option<usize>,
}

impl Query {
    pub fn new(parent: CollectionRef) -> Self {
        Self {
            parent,
            filters: vec![],
            orders: vec![],
            offset: None,
            limit: None,
        }
    }

    pub fn filter(mut self, field: impl Into<String>, op: FilterOp, value: Value) -> Self {
        self.filters.push(FieldFilter {
            field: field.into(),
            op,
            value,
        });
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.orders.push(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn parent(&self) -> &CollectionRef {
        &self.parent
    }

    pub fn filters(&self) -> &[FieldFilter] {
        &self.filters
    }

    pub fn orders(&self) -> &[OrderBy] {
        &self.orders
    }

    pub fn offset_value(&self) -> Option<usize> {
        self.offset
    }

    pub fn limit_value(&self) -> Option<usize> {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_round_trip() {
        for symbol in ["==", "!=", "<", "<=", ">", ">=", "in", "not-in", "array-contains", "array-contains-any"] {
            let op = FilterOp::from_symbol(symbol).unwrap();
            assert_eq!(op.symbol(), symbol);
        }
        assert_eq!(FilterOp::from_symbol("=~"), None);
    }

    #[test]
    fn direction_labels_are_case_sensitive() {
        assert_eq!(Direction::from_label("DESCENDING"), Direction::Descending);
        assert_eq!(Direction::from_label("descending"), Direction::Ascending);
        assert_eq!(Direction::from_label("ASCENDING"), Direction::Ascending);
        assert_eq!(Direction::from_label("sideways"), Direction::Ascending);
    }
}
