use std::future::Future;

use gemini::{Gemini, GeminiError};
use serde_json::Value;

use crate::words::{WordDetails, WordEnrichment};

/// Anything that can turn a prompt into model text requested as JSON.
pub trait ContentGenerator {
    fn generate_json(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, GeminiError>> + Send;
}

impl ContentGenerator for Gemini {
    async fn generate_json(&self, prompt: &str) -> Result<String, GeminiError> {
        Gemini::generate_json(self, prompt).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    #[error("Error processing request: {0}")]
    Gateway(#[from] GeminiError),
    #[error("Invalid JSON in model response: {0}")]
    InvalidJson(serde_json::Error),
    #[error("Error parsing model response: {0}")]
    Schema(serde_json::Error),
}

pub async fn enrich<G: ContentGenerator>(
    generator: &G,
    details: &WordDetails,
) -> Result<WordEnrichment, EnrichmentError> {
    let prompt = build_prompt(details);
    let raw = generator.generate_json(&prompt).await.map_err(|error| {
        tracing::error!(word = %details.english, %error, "error enriching word");
        error
    })?;
    normalize_response(&raw).map_err(|error| {
        tracing::error!(
            word = %details.english,
            %error,
            raw_response = %raw,
            "error parsing model response"
        );
        error
    })
}

pub fn build_prompt(details: &WordDetails) -> String {
    format!(
        r#"Enrich the following word with structured dictionary information.
Return the response strictly in the following JSON schema:

{{
  "English": string,
  "Turkish": string,
  "CEFR": string,
  "type": string,
  "definition": string,
  "example": {{
    "en": string,
    "tr": string
  }},
  "synonyms": [string],
  "notes": string (optional)
}}

Important instructions:
1. The 'example' field must be an object with EXACTLY two fields: 'en' and 'tr'.
2. The 'synonyms' field must be an array of strings. If there are no synonyms, return an empty array [].
3. If no suitable note exists, you may omit the 'notes' field completely.

Word: {english}
Turkish translation: {turkish}
Type: {word_type}
CEFR Level: {cefr}
"#,
        english = details.english,
        turkish = details.turkish,
        word_type = details.word_type,
        cefr = details.cefr,
    )
}

/// Patches the usual model slips, then validates the result as a [`WordEnrichment`].
pub fn normalize_response(raw: &str) -> Result<WordEnrichment, EnrichmentError> {
    let mut value: Value = serde_json::from_str(raw).map_err(EnrichmentError::InvalidJson)?;

    if let Some(object) = value.as_object_mut() {
        if object.get("synonyms").map_or(true, Value::is_null) {
            object.insert("synonyms".to_owned(), Value::Array(Vec::new()));
        }
        if let Some(Value::Object(example)) = object.get("example") {
            let field = |name: &str| example.get(name).cloned().unwrap_or_else(|| Value::from(""));
            let rebuilt = serde_json::json!({ "en": field("en"), "tr": field("tr") });
            object.insert("example".to_owned(), rebuilt);
        }
    }

    serde_json::from_value(value).map_err(EnrichmentError::Schema)
}
