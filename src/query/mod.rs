//! Collection queries from query-string parameters
//!
//! `where` clauses, field filters, `order_by`, `offset` and `limit` are
//! translated into a [`Query`](crate::database::Query) and handed to the
//! database unchanged.

pub mod builder;
pub mod error;
pub mod query_order;
pub mod query_where;
pub mod types;

pub use builder::QueryBuilder;
pub use error::QueryError;
pub use query_order::QueryOrder;
pub use query_where::{QueryWhere, WhereClause};
pub use types::QuerySpec;
