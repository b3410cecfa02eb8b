use std::path::{Path, PathBuf};

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "word-enrichment",
    about = "Word enrichment API: model-backed word details and a static word store"
)]
pub struct Config {
    /// Key for the generative language API
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: String,
    /// Model used for enrichment
    #[arg(long, env = "MODEL_NAME", default_value = gemini::DEFAULT_MODEL)]
    pub model: String,
    /// Word store directory, one subdirectory per CEFR level
    #[arg(long, env = "WORD_STORE_DIR", default_value = "details")]
    pub store: PathBuf,
    /// Bind address
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,
    /// HTTP port
    #[arg(long, default_value = "8000")]
    pub port: u16,
    /// Log level, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Loads a `.env` settings file into the environment, the working directory's when `path` is
/// `None`. A missing file is not an error.
pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>, dotenvy::Error> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path).map(|()| path.to_owned()),
        None => dotenvy::dotenv(),
    };
    match loaded {
        Ok(path) => Ok(Some(path)),
        Err(error) if error.not_found() => Ok(None),
        Err(error) => Err(error),
    }
}

impl Config {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
