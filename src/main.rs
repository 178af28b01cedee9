use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use firerest::config;
use firerest::database::{DocumentDatabase, InMemoryDatabase};
use firerest::middleware::Authentication;
use firerest::server::{self, DEFAULT_MOUNT};

#[derive(Parser)]
#[command(name = "firerest")]
#[command(about = "Document resources over a document database, behind bearer-token authentication")]
#[command(version)]
struct Args {
    #[arg(long, short, help = "Port to listen on (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, default_value = DEFAULT_MOUNT, help = "Path the user resource is mounted at")]
    mount: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up AUTH_JWT_SECRET, PORT, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting firerest in {:?} mode", config.environment);

    if config.auth.jwt_secret.is_empty() {
        anyhow::bail!("AUTH_JWT_SECRET must be set outside development");
    }
    if firerest::is_development!() {
        tracing::warn!("Using development auth settings; do not expose this server");
    }

    let db: Arc<dyn DocumentDatabase> = Arc::new(InMemoryDatabase::new());
    let auth = Authentication::from_config(&config.auth);
    let app = server::app(config, auth, server::user_resource(db), &args.mount);

    let port = args.port.unwrap_or(config.server.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("firerest listening on http://{}{}", bind_addr, args.mount);

    axum::serve(listener, app).await.context("server")?;
    Ok(())
}
