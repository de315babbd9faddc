//! Google AI API client (Gemini provider)

use crate::types::{AnswerEngine, EngineAnswer, EngineError, Provider, QueryContext};
use governor::{Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Duration;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const MODEL: &str = "gemini-1.5-flash";
const REQUESTS_PER_SECOND: u32 = 2;

/// generateContent request body
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

/// generateContent response body
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Gemini generateContent client
pub struct GeminiClient {
    http_client: reqwest::Client,
    rate_limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to build HTTP client");

        let rate_limiter = RateLimiter::direct(Quota::per_second(
            NonZeroU32::new(REQUESTS_PER_SECOND).expect("rate is non-zero"),
        ));

        Self {
            http_client,
            rate_limiter,
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", GEMINI_BASE_URL, MODEL)
    }
}

#[async_trait::async_trait]
impl AnswerEngine for GeminiClient {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    async fn query(&self, ctx: &QueryContext) -> Result<EngineAnswer, EngineError> {
        self.rate_limiter.until_ready().await;

        let mut prompt = ctx.query.clone();
        if ctx.region != "us" || ctx.language != "en" {
            prompt = format!(
                "Answer for a user in region '{}' using language '{}'.\n\n{}",
                ctx.region, ctx.language, prompt
            );
        }

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        tracing::debug!(query = %ctx.query, "Querying Gemini");

        let response = self
            .http_client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| EngineError::Network(e.to_string()))?;

        let status = response.status();
        if status == 401 || status == 403 {
            return Err(EngineError::InvalidApiKey);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EngineError::Api(status.as_u16(), error_text));
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| EngineError::Parse(e.to_string()))?;

        let text: String = generated
            .candidates
            .first()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(EngineError::EmptyResponse);
        }

        Ok(EngineAnswer {
            text,
            citations: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parsing() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Acme and Rival both compete."}], "role": "model"}}
            ]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(body).expect("Failed to parse");
        assert_eq!(
            parsed.candidates[0].content.parts[0].text.as_deref(),
            Some("Acme and Rival both compete.")
        );
    }

    #[test]
    fn test_empty_candidates_parse_cleanly() {
        let parsed: GenerateResponse = serde_json::from_str("{}").expect("Failed to parse");
        assert!(parsed.candidates.is_empty());
    }

    #[test]
    fn test_endpoint_includes_model() {
        let client = GeminiClient::new("test-key".to_string());
        assert!(client.endpoint().ends_with("gemini-1.5-flash:generateContent"));
    }

    #[test]
    fn test_client_reports_gemini_provider() {
        let client = GeminiClient::new("test-key".to_string());
        assert_eq!(client.provider(), Provider::Gemini);
    }
}
