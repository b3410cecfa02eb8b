use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use gemini::Gemini;
use tracing_subscriber::EnvFilter;

use config::Config;
use routes::{router, AppState};
use storage::WordStore;

mod config;
mod enrichment;
mod routes;
mod storage;
mod utilities;
mod words;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = config::load_env_file(None);
    if let Err(error) = &dotenv {
        eprintln!("warning: ignoring malformed .env file: {error}");
    }
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    if let Ok(Some(path)) = dotenv {
        tracing::info!("Loaded settings from {}", path.display());
    }
    if !config.store.is_dir() {
        tracing::warn!("Word store {:?} is not a directory, lookups will miss", config.store);
    }

    let state = Arc::new(AppState {
        generator: Gemini::new(&config.api_key, &config.model),
        store: WordStore::open(&config.store),
    });
    tracing::info!(
        "Serving words from {:?} with model {}",
        state.store.root(),
        state.generator.model()
    );
    let app = router(state);

    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Word enrichment API listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
