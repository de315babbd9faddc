//! OpenAI-backed sentiment analysis
//!
//! Classifies how a provider's response talks about the brand. Best-effort
//! only: callers treat any failure here as "no enrichment".

use crate::types::{SentimentAnalyzer, SentimentError, SentimentInsight, SentimentLabel};
use governor::{Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Duration;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-4o-mini";
const REQUESTS_PER_SECOND: u32 = 2;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Expected JSON shape of the classification reply
#[derive(Debug, Deserialize)]
struct InsightReply {
    sentiment: String,
    brand_description: String,
}

fn build_prompt(response_text: &str, target_domain: &str) -> String {
    format!(
        "The following is an AI assistant's answer that mentions the brand behind '{}'.\n\
         Classify the answer's sentiment toward that brand and summarize how it\n\
         describes the brand in one sentence.\n\
         Reply with JSON only: {{\"sentiment\": \"positive|neutral|negative\",\n\
         \"brand_description\": \"...\"}}\n\n\
         Answer:\n{}",
        target_domain, response_text
    )
}

/// Parse the model's reply into an insight
///
/// Tolerates a fenced code block around the JSON; rejects unknown
/// sentiment labels.
fn parse_insight(reply: &str) -> Result<SentimentInsight, SentimentError> {
    let trimmed = reply
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let parsed: InsightReply = serde_json::from_str(trimmed)
        .map_err(|e| SentimentError::Parse(format!("Malformed insight JSON: {}", e)))?;

    let sentiment = SentimentLabel::parse(&parsed.sentiment).ok_or_else(|| {
        SentimentError::Parse(format!("Unknown sentiment label: {}", parsed.sentiment))
    })?;

    Ok(SentimentInsight {
        sentiment,
        brand_description: parsed.brand_description,
    })
}

/// OpenAI sentiment analyzer
pub struct OpenAiSentimentAnalyzer {
    http_client: reqwest::Client,
    rate_limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
    api_key: String,
}

impl OpenAiSentimentAnalyzer {
    pub fn new(api_key: String) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
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
impl SentimentAnalyzer for OpenAiSentimentAnalyzer {
    async fn analyze(
        &self,
        response_text: &str,
        target_domain: &str,
    ) -> Result<SentimentInsight, SentimentError> {
        self.rate_limiter.until_ready().await;

        let request = ChatRequest {
            model: MODEL.to_string(),
            messages: vec![ChatMessage {
                role: "user",
                content: build_prompt(response_text, target_domain),
            }],
        };

        tracing::debug!(target_domain = target_domain, "Classifying sentiment");

        let response = self
            .http_client
            .post(OPENAI_BASE_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SentimentError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SentimentError::Api(status.as_u16(), error_text));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| SentimentError::Parse(e.to_string()))?;

        let reply = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| SentimentError::Parse("Empty classification reply".to_string()))?;

        parse_insight(&reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json_reply() {
        let insight = parse_insight(
            r#"{"sentiment": "positive", "brand_description": "Described as the market leader."}"#,
        )
        .expect("Failed to parse");
        assert_eq!(insight.sentiment, SentimentLabel::Positive);
        assert_eq!(insight.brand_description, "Described as the market leader.");
    }

    #[test]
    fn test_parse_fenced_reply() {
        let reply = "```json\n{\"sentiment\": \"negative\", \"brand_description\": \"Called outdated.\"}\n```";
        let insight = parse_insight(reply).expect("Failed to parse");
        assert_eq!(insight.sentiment, SentimentLabel::Negative);
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        let result =
            parse_insight(r#"{"sentiment": "glowing", "brand_description": "whatever"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_non_json_reply_is_rejected() {
        assert!(parse_insight("The sentiment is positive.").is_err());
    }

    #[test]
    fn test_prompt_names_domain_and_text() {
        let prompt = build_prompt("Acme is great.", "acme.com");
        assert!(prompt.contains("acme.com"));
        assert!(prompt.contains("Acme is great."));
    }
}
