// src/services/gemini_client.rs
// DOCUMENTATION: Google Gemini client for the Location Scout
// PURPOSE: Answer neighborhood questions with Google Search grounding and cite sources

use crate::errors::ApiError;
use crate::models::{ScoutRequest, ScoutResponse, ScoutSource};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<ChunkSource>,
    maps: Option<ChunkSource>,
}

#[derive(Debug, Deserialize)]
struct ChunkSource {
    uri: Option<String>,
    title: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            base_url: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Ask a grounded question about an area
    pub async fn scout(&self, req: &ScoutRequest) -> Result<ScoutResponse, ApiError> {
        if !self.is_configured() {
            return Err(ApiError::ServiceUnavailable(
                "Location Scout is not configured".to_string(),
            ));
        }

        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": build_prompt(req) }] }],
            "tools": [{ "googleSearch": {} }]
        });

        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        log::debug!("Location Scout question: {}", req.question);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                log::error!("Gemini request failed: {}", e);
                ApiError::ExternalApiError(format!("Request failed: {}", e))
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            log::warn!("Gemini quota exceeded");
            return Err(ApiError::RateLimitExceeded);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            log::error!("Gemini API error {}: {}", status, text);
            return Err(ApiError::ExternalApiError(format!("API error {}", status)));
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            log::error!("Failed to parse Gemini response: {}", e);
            ApiError::ExternalApiError(format!("Parse error: {}", e))
        })?;

        Ok(extract_answer(parsed))
    }
}

/// Question plus whatever location context the caller supplied
fn build_prompt(req: &ScoutRequest) -> String {
    let mut prompt = String::from(
        "You are a local guide helping a student choose where to study and live. \
         Answer briefly and factually.\n",
    );

    if let Some(city) = req.city.as_deref().filter(|c| !c.trim().is_empty()) {
        prompt.push_str(&format!("City: {}\n", city.trim()));
    }
    if let (Some(lat), Some(lng)) = (req.latitude, req.longitude) {
        prompt.push_str(&format!("Near coordinates: {:.5}, {:.5}\n", lat, lng));
    }

    prompt.push_str(&format!("Question: {}", req.question.trim()));
    prompt
}

/// Join the text parts of the first candidate and collect unique sources
fn extract_answer(response: GenerateResponse) -> ScoutResponse {
    let Some(candidate) = response.candidates.into_iter().next() else {
        return ScoutResponse {
            answer: "No answer available for this question.".to_string(),
            sources: Vec::new(),
        };
    };

    let answer = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let mut sources: Vec<ScoutSource> = Vec::new();
    let chunks = candidate
        .grounding_metadata
        .map(|m| m.grounding_chunks)
        .unwrap_or_default();

    for chunk in chunks {
        let Some(source) = chunk.web.or(chunk.maps) else {
            continue;
        };
        let Some(uri) = source.uri else {
            continue;
        };
        if sources.iter().any(|s| s.uri == uri) {
            continue;
        }
        sources.push(ScoutSource {
            title: source.title.unwrap_or_else(|| uri.clone()),
            uri,
        });
    }

    ScoutResponse {
        answer: answer.trim().to_string(),
        sources,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ScoutRequest {
        ScoutRequest {
            question: "Is the area safe at night?".to_string(),
            city: Some("Pune".to_string()),
            latitude: Some(18.52),
            longitude: Some(73.85),
        }
    }

    #[test]
    fn test_prompt_includes_context() {
        let prompt = build_prompt(&request());
        assert!(prompt.contains("City: Pune"));
        assert!(prompt.contains("18.52000, 73.85000"));
        assert!(prompt.ends_with("Question: Is the area safe at night?"));
    }

    #[test]
    fn test_extract_answer_and_dedupe_sources() {
        let raw = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "Mostly safe. "}, {"text": "Busy until late."}]},
                "groundingMetadata": {"groundingChunks": [
                    {"web": {"uri": "https://news.example/a", "title": "Local news"}},
                    {"web": {"uri": "https://news.example/a", "title": "Local news"}},
                    {"maps": {"uri": "https://maps.example/b"}}
                ]}
            }]
        }"#;

        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        let answer = extract_answer(parsed);

        assert_eq!(answer.answer, "Mostly safe. Busy until late.");
        assert_eq!(answer.sources.len(), 2);
        assert_eq!(answer.sources[0].title, "Local news");
        assert_eq!(answer.sources[1].title, "https://maps.example/b");
    }

    #[test]
    fn test_empty_candidates() {
        let parsed: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        let answer = extract_answer(parsed);
        assert!(answer.sources.is_empty());
        assert!(!answer.answer.is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_client_unavailable() {
        let client = GeminiClient::new(String::new(), "gemini-2.5-flash".to_string());
        assert!(matches!(
            client.scout(&request()).await,
            Err(ApiError::ServiceUnavailable(_))
        ));
    }
}
