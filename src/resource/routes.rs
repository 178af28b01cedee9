use axum::{
    extract::{rejection::JsonRejection, OriginalUri, Path, RawQuery, State},
    routing::get,
    Extension, Json, Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::{parse_query_params, DocumentResource};
use crate::auth::DecodedToken;
use crate::error::ApiError;
use crate::middleware::ApiResult;
use crate::types::Handler;

type SharedResource = Arc<DocumentResource>;
type PathParams = Path<HashMap<String, String>>;
type Token = Option<Extension<DecodedToken>>;

impl DocumentResource {
    /// Mount the collection handlers on `collection_route` and the document
    /// handlers on `document_route` (for example `/users` and `/users/:id`).
    pub fn router<S>(self: Arc<Self>, collection_route: &str, document_route: &str) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        Router::new()
            .route(collection_route, get(collection_get).post(collection_post))
            .route(
                document_route,
                get(document_get)
                    .put(document_put)
                    .patch(document_patch)
                    .delete(document_delete),
            )
            .with_state(self)
    }

    /// Mount at `base` and `base/:id`.
    pub fn collection_router<S>(self: Arc<Self>, base: &str) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let document_route = format!("{}/:id", base.trim_end_matches('/'));
        self.router(base, &document_route)
    }
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::invalid_json(rejection.body_text()))
}

/// GET {collection} - list documents matching the query string
async fn collection_get(
    State(resource): State<SharedResource>,
    OriginalUri(uri): OriginalUri,
    RawQuery(query): RawQuery,
    token: Token,
) -> ApiResult {
    let params = parse_query_params(query.as_deref());
    resource
        .on_get(uri.path(), params, token.as_ref().map(|Extension(t)| t))
        .await
}

/// POST {collection} - create a document
async fn collection_post(
    State(resource): State<SharedResource>,
    OriginalUri(uri): OriginalUri,
    token: Token,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult {
    resource.authorize(Handler::OnPost, token.as_ref().map(|Extension(t)| t))?;
    let body = json_body(body)?;
    resource
        .on_post(uri.path(), body, token.as_ref().map(|Extension(t)| t))
        .await
}

/// GET {document} - show one document
async fn document_get(
    State(resource): State<SharedResource>,
    OriginalUri(uri): OriginalUri,
    Path(params): PathParams,
    token: Token,
) -> ApiResult {
    resource
        .on_get_doc(
            uri.path(),
            params.get("id").map(String::as_str),
            token.as_ref().map(|Extension(t)| t),
        )
        .await
}

/// PUT {document} - replace a document
async fn document_put(
    State(resource): State<SharedResource>,
    OriginalUri(uri): OriginalUri,
    Path(params): PathParams,
    token: Token,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult {
    resource.authorize(Handler::OnPutDoc, token.as_ref().map(|Extension(t)| t))?;
    let body = json_body(body)?;
    resource
        .on_put_doc(
            uri.path(),
            params.get("id").map(String::as_str),
            body,
            token.as_ref().map(|Extension(t)| t),
        )
        .await
}

/// PATCH {document} - update fields of a document
async fn document_patch(
    State(resource): State<SharedResource>,
    OriginalUri(uri): OriginalUri,
    Path(params): PathParams,
    token: Token,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult {
    resource.authorize(Handler::OnPatchDoc, token.as_ref().map(|Extension(t)| t))?;
    let body = json_body(body)?;
    resource
        .on_patch_doc(
            uri.path(),
            params.get("id").map(String::as_str),
            body,
            token.as_ref().map(|Extension(t)| t),
        )
        .await
}

/// DELETE {document} - remove a document
async fn document_delete(
    State(resource): State<SharedResource>,
    OriginalUri(uri): OriginalUri,
    Path(params): PathParams,
    token: Token,
) -> ApiResult {
    resource
        .on_delete_doc(
            uri.path(),
            params.get("id").map(String::as_str),
            token.as_ref().map(|Extension(t)| t),
        )
        .await
}
