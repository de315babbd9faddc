//! OpenAI API client (ChatGPT provider)

use crate::types::{AnswerEngine, EngineAnswer, EngineError, Provider, QueryContext};
use governor::{Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Duration;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-4o-mini";
const REQUESTS_PER_SECOND: u32 = 2;

/// Chat completion request body
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

/// Chat completion response body
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

/// Build the message list for a visibility query
///
/// The query is sent verbatim as the user turn; a locale hint is added
/// only when the check targets a non-default region or language.
fn build_messages(ctx: &QueryContext) -> Vec<ChatMessage> {
    let mut messages = Vec::new();

    if ctx.region != "us" || ctx.language != "en" {
        messages.push(ChatMessage {
            role: "system",
            content: format!(
                "Answer as you would for a user in region '{}' using language '{}'.",
                ctx.region, ctx.language
            ),
        });
    }

    messages.push(ChatMessage {
        role: "user",
        content: ctx.query.clone(),
    });

    messages
}

/// OpenAI chat-completions client
pub struct OpenAiClient {
    http_client: reqwest::Client,
    rate_limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
    api_key: String,
}

impl OpenAiClient {
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
impl AnswerEngine for OpenAiClient {
    fn provider(&self) -> Provider {
        Provider::Chatgpt
    }

    async fn query(&self, ctx: &QueryContext) -> Result<EngineAnswer, EngineError> {
        self.rate_limiter.until_ready().await;

        let request = ChatRequest {
            model: MODEL.to_string(),
            messages: build_messages(ctx),
        };

        tracing::debug!(query = %ctx.query, "Querying OpenAI");

        let response = self
            .http_client
            .post(OPENAI_BASE_URL)
            .bearer_auth(&self.api_key)
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

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| EngineError::Parse(e.to_string()))?;

        let text = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(EngineError::EmptyResponse)?;

        Ok(EngineAnswer {
            text,
            citations: Vec::new(),
        })
    }
}
