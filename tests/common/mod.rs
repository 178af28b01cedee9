#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use firerest::auth::{JwtVerifier, TokenVerifier};
use firerest::config::{AppConfig, VerificationMode};
use firerest::database::{DocumentDatabase, InMemoryDatabase};
use firerest::middleware::Authentication;
use firerest::resource::DocumentResource;
use firerest::server::{self, DEFAULT_MOUNT};

pub const SECRET: &str = "integration-test-secret";

/// In-process server on a free port, torn down on drop
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub db: InMemoryDatabase,
    pub verifier: Arc<JwtVerifier>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// The demo `user` resource at `/users`
    pub async fn start() -> Result<Self> {
        Self::start_with(server::user_resource, VerificationMode::RevocationChecked).await
    }

    pub async fn start_with<F>(resource: F, mode: VerificationMode) -> Result<Self>
    where
        F: FnOnce(Arc<dyn DocumentDatabase>) -> DocumentResource,
    {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::from_env();
        config.auth.jwt_secret = SECRET.to_string();
        config.auth.verification_mode = mode;
        config.server.enable_request_logging = false;

        let db = InMemoryDatabase::new();
        let verifier = Arc::new(JwtVerifier::new(SECRET));
        let auth = Authentication::new(verifier.clone() as Arc<dyn TokenVerifier>, mode);
        let app = server::app(&config, auth, resource(Arc::new(db.clone())), DEFAULT_MOUNT);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind {}", base_url))?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            port,
            base_url,
            db,
            verifier,
            handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// HS256 token for `uid` with `role`, issued a few seconds ago
pub fn token(uid: &str, role: &str) -> String {
    sign(json!({"sub": uid, "role": role}))
}

pub fn sign(mut claims: Value) -> String {
    let now = Utc::now();
    if let Some(map) = claims.as_object_mut() {
        map.entry("iat").or_insert_with(|| json!((now - Duration::seconds(5)).timestamp()));
        map.entry("exp")
            .or_insert_with(|| json!((now + Duration::hours(1)).timestamp()));
    }
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes()))
        .expect("sign token")
}

/// Client that sends `Authorization: Bearer <token>` on every request
pub fn client_with_token(token: &str) -> Result<reqwest::Client> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::AUTHORIZATION,
        format!("Bearer {}", token).parse().context("invalid token header")?,
    );
    Ok(reqwest::Client::builder().default_headers(headers).build()?)
}

pub fn user_client() -> Result<reqwest::Client> {
    client_with_token(&token("alice", "user"))
}
