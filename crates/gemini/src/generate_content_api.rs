// https://ai.google.dev/api/generate-content - v1beta, api key passed as a header

use crate::content::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse};
use crate::GeminiError;

pub(crate) const GENERATIVE_LANGUAGE_API_URL: &'static str =
    "https://generativelanguage.googleapis.com/v1beta";

pub(crate) async fn generate_content(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    model: &str,
    prompt: &str,
) -> Result<String, GeminiError> {
    let url = format!("{}/models/{model}:generateContent", base_url.trim_end_matches('/'));
    let res: reqwest::Response = client
        .post(url)
        .header("x-goog-api-key", api_key)
        .json(&GenerateContentRequest::json_prompt(prompt))
        .send()
        .await
        .map_err(GeminiError::Fetch)?;

    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error.message)
            .unwrap_or(body);
        return Err(GeminiError::Status {
            status: status.as_u16(),
            message,
        });
    }

    let body = res
        .json::<GenerateContentResponse>()
        .await
        .map_err(GeminiError::Deserialize)?;
    first_candidate_text(body)
}

/// Joins the text parts of the first candidate.
pub(crate) fn first_candidate_text(body: GenerateContentResponse) -> Result<String, GeminiError> {
    let block_reason = body.prompt_feedback.and_then(|feedback| feedback.block_reason);
    let Some(candidate) = body.candidates.into_iter().next() else {
        return Err(GeminiError::EmptyResponse {
            reason: block_reason.unwrap_or_else(|| "no candidates".to_owned()),
        });
    };
    let text = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(GeminiError::EmptyResponse {
            reason: candidate
                .finish_reason
                .unwrap_or_else(|| "no text".to_owned()),
        });
    }
    Ok(text)
}
