use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sheepish::{broadcast, config::AppConfig, questions::QuestionBank, state::AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheepish=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Sheepish...");

    let config = AppConfig::from_env()?;

    let store = config.store.build()?;
    tracing::info!("Using {} room store under '{}'", store.name(), config.room_root);

    let questions = QuestionBank::load_dir(&config.questions_dir);
    if questions.is_empty() {
        tracing::warn!("No questions loaded, every round will use the fallback question");
    }

    let state = Arc::new(AppState::from_config(&config, store, questions)?);

    // Spawn background task that pushes store changes to connected clients
    broadcast::spawn_room_watcher(state.clone());

    let app = sheepish::router(state);

    tracing::info!("Listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
