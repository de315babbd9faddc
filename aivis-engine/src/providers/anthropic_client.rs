//! Anthropic API client (Claude provider)

use crate::types::{AnswerEngine, EngineAnswer, EngineError, Provider, QueryContext};
use governor::{Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Duration;

const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MODEL: &str = "claude-3-5-haiku-latest";
const MAX_TOKENS: u32 = 1024;
const REQUESTS_PER_SECOND: u32 = 2;

/// Messages API request body
#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

/// Messages API response body
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

/// Anthropic messages client
pub struct AnthropicClient {
    http_client: reqwest::Client,
    rate_limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
    api_key: String,
}

impl AnthropicClient {
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
}

#[async_trait::async_trait]
impl AnswerEngine for AnthropicClient {
    fn provider(&self) -> Provider {
        Provider::Claude
    }

    async fn query(&self, ctx: &QueryContext) -> Result<EngineAnswer, EngineError> {
        self.rate_limiter.until_ready().await;

        let system = (ctx.region != "us" || ctx.language != "en").then(|| {
            format!(
                "Answer as you would for a user in region '{}' using language '{}'.",
                ctx.region, ctx.language
            )
        });

        let request = MessagesRequest {
            model: MODEL.to_string(),
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user",
                content: ctx.query.clone(),
            }],
            system,
        };

        tracing::debug!(query = %ctx.query, "Querying Anthropic");

        let response = self
            .http_client
            .post(ANTHROPIC_BASE_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| EngineError::Network(e.to_string()))?;

        let status = response.status();
        if status == 401 {
            return Err(EngineError::InvalidApiKey);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EngineError::Api(status.as_u16(), error_text));
        }

        let messages: MessagesResponse = response
            .json()
            .await
            .map_err(|e| EngineError::Parse(e.to_string()))?;

        // Concatenate text blocks; tool-use blocks carry no text
        let text: String = messages
            .content
            .iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n");

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
    fn test_response_parsing_joins_text_blocks() {
        let body = r#"{
            "content": [
                {"type": "text", "text": "Acme is one option."},
                {"type": "text", "text": "Rival is another."}
            ]
        }"#;
        let parsed: MessagesResponse = serde_json::from_str(body).expect("Failed to parse");
        let text: String = parsed
            .content
            .iter()
            .filter_map(|b| b.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(text, "Acme is one option.\nRival is another.");
    }

    #[test]
    fn test_non_text_blocks_are_ignored() {
        let body = r#"{
            "content": [
                {"type": "tool_use", "text": null},
                {"type": "text", "text": "Acme."}
            ]
        }"#;
        let parsed: MessagesResponse = serde_json::from_str(body).expect("Failed to parse");
        let text: Vec<&str> = parsed
            .content
            .iter()
            .filter(|b| b.block_type == "text")
            .filter_map(|b| b.text.as_deref())
            .collect();
        assert_eq!(text, vec!["Acme."]);
    }

    #[test]
    fn test_client_reports_claude_provider() {
        let client = AnthropicClient::new("test-key".to_string());
        assert_eq!(client.provider(), Provider::Claude);
    }
}
