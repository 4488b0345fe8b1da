use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use clinidesk::config::AppConfig;
use clinidesk::db;
use clinidesk::handlers;
use clinidesk::services::ai::null::NullCompletionService;
use clinidesk::services::ai::ollama::OllamaProvider;
use clinidesk::services::ai::CompletionService;
use clinidesk::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    let llm: Box<dyn CompletionService> = match config.llm_provider.as_str() {
        "null" => {
            tracing::info!("using null completion service (regex routing only)");
            Box::new(NullCompletionService)
        }
        _ => {
            tracing::info!(
                "using Ollama completion service (url: {}, model: {})",
                config.ollama_url,
                config.ollama_model
            );
            Box::new(OllamaProvider::new(
                config.ollama_url.clone(),
                config.ollama_model.clone(),
            ))
        }
    };

    let (events_tx, _) = broadcast::channel(256);

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        llm,
        sessions: Mutex::new(HashMap::new()),
        active_chats: Mutex::new(HashMap::new()),
        events_tx,
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/chat", post(handlers::chat::send_message))
        .route("/api/chat/stop", post(handlers::chat::stop_generation))
        .route("/api/events", get(handlers::events::events_stream))
        .route(
            "/api/admin/appointments",
            get(handlers::admin::get_appointments),
        )
        .route("/api/admin/accounts", get(handlers::admin::get_accounts))
        .route("/api/admin/stats", get(handlers::admin::get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
