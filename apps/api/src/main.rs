mod advisors;
mod config;
mod db;
mod errors;
mod flow;
mod llm_client;
mod models;
mod profile;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::advisors::Advisors;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::{GeminiClient, ModelBackend};
use crate::profile::{PgProfileStore, ProfileStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Advisor API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize model backend
    let gemini = GeminiClient::new(config.gemini_settings())?;
    if gemini.has_credential() {
        info!(
            "Gemini client initialized (model: {}, timeout: {:?})",
            gemini.default_model(),
            config.model_timeout
        );
    } else {
        warn!("No GEMINI_API_KEY or GOOGLE_API_KEY set; credential-gated flows will fail");
    }
    let backend: Arc<dyn ModelBackend> = Arc::new(gemini);

    // Compile every flow; a broken template stops startup here
    let advisors = Advisors::new(backend)?;
    let registry = advisors.registry()?;
    info!("Registered {} flows", registry.len());

    // Profile store is optional
    let profiles: Option<Arc<dyn ProfileStore>> = match &config.database_url {
        Some(url) => Some(Arc::new(PgProfileStore::new(create_pool(url).await?))),
        None => {
            warn!("DATABASE_URL not set; chatbot will not read stored profiles");
            None
        }
    };

    let state = AppState {
        registry: Arc::new(registry),
        advisors: Arc::new(advisors),
        profiles,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the web app's domain

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
