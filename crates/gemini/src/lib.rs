use generate_content_api::{generate_content, GENERATIVE_LANGUAGE_API_URL};

mod content;
mod generate_content_api;

pub const DEFAULT_MODEL: &str = "gemini-2.0-pro";

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("request to the model failed: {0}")]
    Fetch(reqwest::Error),
    #[error("model API returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unexpected model API response: {0}")]
    Deserialize(reqwest::Error),
    #[error("model returned no content ({reason})")]
    EmptyResponse { reason: String },
}

/// Client for the hosted `generateContent` endpoint.
pub struct Gemini {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl Gemini {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: GENERATIVE_LANGUAGE_API_URL.to_owned(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends `prompt` and returns the model's raw text, requested as JSON.
    pub async fn generate_json(&self, prompt: &str) -> Result<String, GeminiError> {
        tracing::debug!(model = %self.model, "calling generateContent");
        generate_content(
            &self.client,
            &self.base_url,
            &self.api_key,
            &self.model,
            prompt,
        )
        .await
    }
}
