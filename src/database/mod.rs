//! Document database boundary
//!
//! Resources talk to storage only through [`DocumentDatabase`]. A hosted
//! database client implements the trait in the embedding application;
//! [`InMemoryDatabase`] backs the demo server and the test suite.

pub mod error;
pub mod memory;
pub mod path;
pub mod query;

pub use error::DatabaseError;
pub use memory::InMemoryDatabase;
pub use path::{CollectionRef, DocumentRef};
pub use query::{Direction, FieldFilter, FilterOp, OrderBy, Query, DOCUMENT_ID};

use async_trait::async_trait;

use crate::schema::Record;

/// A document read at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    pub id: String,
    pub path: String,
    data: Option<Record>,
}

impl DocumentSnapshot {
    pub fn new(doc: &DocumentRef, data: Option<Record>) -> Self {
        Self {
            id: doc.id().to_string(),
            path: doc.path().to_string(),
            data,
        }
    }

    pub fn exists(&self) -> bool {
        self.data.is_some()
    }

    pub fn data(&self) -> Option<&Record> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<Record> {
        self.data
    }
}

/// Operations a resource needs from a document database.
#[async_trait]
pub trait DocumentDatabase: Send + Sync {
    /// Read one document; a missing document yields a snapshot that does not exist.
    async fn get(&self, doc: &DocumentRef) -> Result<DocumentSnapshot, DatabaseError>;

    /// Write a new document; fails with `AlreadyExists` when it is present.
    async fn create(&self, doc: &DocumentRef, data: Record) -> Result<(), DatabaseError>;

    /// Replace (or create) a document.
    async fn set(&self, doc: &DocumentRef, data: Record) -> Result<(), DatabaseError>;

    /// Merge top-level fields into an existing document; fails with `NotFound`.
    async fn update(&self, doc: &DocumentRef, data: Record) -> Result<(), DatabaseError>;

    /// Remove an existing document; fails with `NotFound`.
    async fn delete(&self, doc: &DocumentRef) -> Result<(), DatabaseError>;

    async fn run_query(&self, query: &Query) -> Result<Vec<DocumentSnapshot>, DatabaseError>;
}
