use axum::{http::HeaderValue, middleware::from_fn_with_state, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::database::DocumentDatabase;
use crate::middleware::{authenticate, Authentication};
use crate::resource::{DocumentResource, ResourceConfig};
use crate::schema::{Field, FieldType, Schema};

/// Path the demo `user` resource is mounted at unless overridden
pub const DEFAULT_MOUNT: &str = "/users";

/// The `user` resource of the demo server: `name` required, `dob` optional,
/// other fields stored as sent.
pub fn user_resource(db: Arc<dyn DocumentDatabase>) -> DocumentResource {
    let user = Schema::new("User")
        .field(Field::new("name", FieldType::String).required())
        .field(Field::new("dob", FieldType::String));
    let user_update = Schema::new("UserUpdate")
        .field(Field::new("name", FieldType::String))
        .field(Field::new("dob", FieldType::String));

    DocumentResource::new(
        ResourceConfig::new(db, "user")
            .schema_post(user.clone())
            .schema_put(user)
            .schema_patch(user_update),
    )
}

/// Demo application: `resource` at `mount` behind bearer authentication,
/// `/health` public.
pub fn app(config: &AppConfig, auth: Authentication, resource: DocumentResource, mount: &str) -> Router {
    let protected = Arc::new(resource)
        .collection_router(mount)
        .layer(from_fn_with_state(auth, authenticate));

    let mut app = Router::new().route("/health", get(health)).merge(protected);

    if config.security.enable_cors {
        app = app.layer(cors_layer(&config.security.cors_origins));
    }
    if config.server.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    app
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
