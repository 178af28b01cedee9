//! REST resources over a document collection
//!
//! A [`DocumentResource`] serves six handlers: `on_get` and `on_post` on the
//! collection path, `on_get_doc`, `on_put_doc`, `on_patch_doc` and
//! `on_delete_doc` on the document path. Every handler authorizes first, then
//! validates its input, calls the database and answers with an envelope.

pub mod config;
pub mod routes;

pub use config::ResourceConfig;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use serde_json::Value;
use tracing::{debug, info};
use url::form_urlencoded;

use crate::api::format::{collection_envelope, document_envelope};
use crate::auth::DecodedToken;
use crate::database::{CollectionRef, DatabaseError, DocumentRef};
use crate::error::ApiError;
use crate::middleware::{authorize, ApiResponse, ApiResult};
use crate::query::{QueryBuilder, QuerySpec};
use crate::schema::{self, Record, Schema, BASE_QUERY_SCHEMA};
use crate::types::Handler;

// Characters escaped when a document id becomes a path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug)]
pub struct DocumentResource {
    config: ResourceConfig,
}

impl DocumentResource {
    pub fn new(config: ResourceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    /// Database path served for `request_path`: the configured fixed path
    /// behind its prefix, or the decoded request path without its leading `/`.
    pub fn resolve_db_path(&self, request_path: &str) -> String {
        match &self.config.db_path {
            Some(fixed) => format!("{}{}", self.config.db_path_prefix, fixed),
            None => request_path
                .strip_prefix('/')
                .unwrap_or(request_path)
                .trim_end_matches('/')
                .split('/')
                .map(|segment| percent_decode_str(segment).decode_utf8_lossy())
                .collect::<Vec<_>>()
                .join("/"),
        }
    }

    /// Reject `token` when it may not reach `handler` on this resource.
    pub fn authorize(&self, handler: Handler, token: Option<&DecodedToken>) -> Result<(), ApiError> {
        authorize(handler, self.config.allowed.as_deref(), token)
    }

    /// GET collection - query documents
    pub async fn on_get(&self, request_path: &str, params: Record, token: Option<&DecodedToken>) -> ApiResult {
        self.authorize(Handler::OnGet, token)?;

        let collection = self.collection(request_path)?;
        let query_schema = self.config.schema_query.as_deref().unwrap_or(&BASE_QUERY_SCHEMA);
        let spec = QuerySpec::from_record(query_schema.validate(&Value::Object(params))?)?;
        let query = QueryBuilder::build(&collection, &spec, self.schema_get())?;

        let snapshots = self.config.db.run_query(&query).await?;
        let mut documents = Vec::with_capacity(snapshots.len());
        for snapshot in snapshots {
            let data = snapshot.data().cloned().unwrap_or_default();
            let record = schema::validate(self.schema_get(), &Value::Object(data))?;
            documents.push((snapshot.id, record));
        }

        debug!("{} returned {} document(s)", collection.path(), documents.len());

        let body = collection_envelope(
            request_path,
            &self.config.resource_type,
            documents.iter().map(|(id, record)| (id.as_str(), record)),
        );
        Ok(ApiResponse::success(body))
    }

    /// GET document - read one document
    pub async fn on_get_doc(&self, request_path: &str, id: Option<&str>, token: Option<&DecodedToken>) -> ApiResult {
        self.authorize(Handler::OnGetDoc, token)?;

        let doc = self.document(request_path, id)?;
        let data = self
            .config
            .db
            .get(&doc)
            .await?
            .into_data()
            .ok_or_else(|| DatabaseError::not_found(format!("No document found at {}", doc.path())))?;

        let record = schema::validate(self.schema_get(), &Value::Object(data))?;
        debug!("Read {}", doc.path());

        let body = document_envelope(request_path, doc.id(), &self.config.resource_type, &record);
        Ok(ApiResponse::success(body).with_location(request_path))
    }

    /// POST collection - create a document, named by the body `id` when present
    pub async fn on_post(&self, request_path: &str, body: Value, token: Option<&DecodedToken>) -> ApiResult {
        self.authorize(Handler::OnPost, token)?;

        let mut record = schema::validate(self.config.schema_post.as_deref(), &body)?;
        let collection = self.collection(request_path)?;

        let doc = match take_document_id(&mut record)? {
            Some(id) => collection.document(&id)?,
            None => collection.new_document(),
        };

        self.config.db.create(&doc, record.clone()).await?;
        info!("Created {}", doc.path());

        let location = format!(
            "{}/{}",
            request_path.trim_end_matches('/'),
            utf8_percent_encode(doc.id(), SEGMENT)
        );
        let body = document_envelope(&location, doc.id(), &self.config.resource_type, &record);
        Ok(ApiResponse::created(body).with_location(location))
    }

    /// PUT document - replace a document
    pub async fn on_put_doc(
        &self,
        request_path: &str,
        id: Option<&str>,
        body: Value,
        token: Option<&DecodedToken>,
    ) -> ApiResult {
        self.authorize(Handler::OnPutDoc, token)?;

        let mut record = schema::validate(self.config.schema_put.as_deref(), &body)?;
        record.remove("id");
        let doc = self.document(request_path, id)?;

        self.config.db.set(&doc, record.clone()).await?;
        info!("Replaced {}", doc.path());

        let body = document_envelope(request_path, doc.id(), &self.config.resource_type, &record);
        Ok(ApiResponse::success(body))
    }

    /// PATCH document - merge fields into an existing document
    pub async fn on_patch_doc(
        &self,
        request_path: &str,
        id: Option<&str>,
        body: Value,
        token: Option<&DecodedToken>,
    ) -> ApiResult {
        self.authorize(Handler::OnPatchDoc, token)?;

        let mut record = schema::validate(self.config.schema_patch.as_deref(), &body)?;
        record.remove("id");
        let doc = self.document(request_path, id)?;

        self.config.db.update(&doc, record.clone()).await?;
        info!("Updated {}", doc.path());

        let body = document_envelope(request_path, doc.id(), &self.config.resource_type, &record);
        Ok(ApiResponse::success(body))
    }

    /// DELETE document
    pub async fn on_delete_doc(&self, request_path: &str, id: Option<&str>, token: Option<&DecodedToken>) -> ApiResult {
        self.authorize(Handler::OnDeleteDoc, token)?;

        let doc = self.document(request_path, id)?;
        self.config.db.delete(&doc).await?;
        info!("Deleted {}", doc.path());

        Ok(ApiResponse::empty())
    }

    fn schema_get(&self) -> Option<&Schema> {
        self.config.schema_get.as_deref()
    }

    fn collection(&self, request_path: &str) -> Result<CollectionRef, ApiError> {
        Ok(CollectionRef::new(&self.resolve_db_path(request_path))?)
    }

    // A fixed collection path is completed with the routed id.
    fn document(&self, request_path: &str, id: Option<&str>) -> Result<DocumentRef, ApiError> {
        let path = self.resolve_db_path(request_path);
        if self.config.db_path.is_some() {
            if let (Some(id), Ok(collection)) = (id, CollectionRef::new(&path)) {
                return Ok(collection.document(id)?);
            }
        }
        Ok(DocumentRef::new(&path)?)
    }
}

/// Query-string parameters as a record; repeated keys collect into an array.
pub fn parse_query_params(raw: Option<&str>) -> Record {
    let mut params = Record::new();
    for (key, value) in form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
        let value = Value::String(value.into_owned());
        match params.get_mut(&*key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                params.insert(key.into_owned(), value);
            }
        }
    }
    params
}

/// Remove `id` from a validated body; strings and integers name a document.
fn take_document_id(record: &mut Record) -> Result<Option<String>, ApiError> {
    match record.remove("id") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(id)) => Ok(Some(id)),
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(Some(n.to_string())),
        Some(_) => Err(ApiError::validation_error(
            "Document id must be a string or an integer",
            [("id".to_string(), "invalid document id".to_string())].into(),
        )),
    }
}
