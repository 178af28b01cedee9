use std::fmt;
use std::sync::Arc;

use crate::database::DocumentDatabase;
use crate::schema::Schema;
use crate::types::Handler;

/// Settings of one mounted resource; built once, shared by every request.
#[derive(Clone)]
pub struct ResourceConfig {
    pub(crate) db: Arc<dyn DocumentDatabase>,
    pub(crate) db_path_prefix: String,
    pub(crate) db_path: Option<String>,
    pub(crate) resource_type: String,
    pub(crate) schema_post: Option<Arc<Schema>>,
    pub(crate) schema_get: Option<Arc<Schema>>,
    pub(crate) schema_put: Option<Arc<Schema>>,
    pub(crate) schema_patch: Option<Arc<Schema>>,
    pub(crate) schema_query: Option<Arc<Schema>>,
    pub(crate) allowed: Option<Vec<Handler>>,
}

impl ResourceConfig {
    pub fn new(db: Arc<dyn DocumentDatabase>, resource_type: impl Into<String>) -> Self {
        Self {
            db,
            db_path_prefix: String::new(),
            db_path: None,
            resource_type: resource_type.into(),
            schema_post: None,
            schema_get: None,
            schema_put: None,
            schema_patch: None,
            schema_query: None,
            allowed: None,
        }
    }

    /// Serve a fixed database path instead of one derived from the request path.
    pub fn db_path(mut self, path: impl Into<String>) -> Self {
        self.db_path = Some(path.into());
        self
    }

    /// Prepended to the fixed database path.
    pub fn db_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.db_path_prefix = prefix.into();
        self
    }

    pub fn schema_post(mut self, schema: Schema) -> Self {
        self.schema_post = Some(Arc::new(schema));
        self
    }

    pub fn schema_get(mut self, schema: Schema) -> Self {
        self.schema_get = Some(Arc::new(schema));
        self
    }

    pub fn schema_put(mut self, schema: Schema) -> Self {
        self.schema_put = Some(Arc::new(schema));
        self
    }

    pub fn schema_patch(mut self, schema: Schema) -> Self {
        self.schema_patch = Some(Arc::new(schema));
        self
    }

    pub fn schema_query(mut self, schema: Schema) -> Self {
        self.schema_query = Some(Arc::new(schema));
        self
    }

    /// Restrict non-admin callers to `handlers`.
    pub fn allowed(mut self, handlers: impl IntoIterator<Item = Handler>) -> Self {
        self.allowed = Some(handlers.into_iter().collect());
        self
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }
}

impl fmt::Debug for ResourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceConfig")
            .field("db_path_prefix", &self.db_path_prefix)
            .field("db_path", &self.db_path)
            .field("resource_type", &self.resource_type)
            .field("allowed", &self.allowed)
            .finish_non_exhaustive()
    }
}
