//! Engine configuration resolution
//!
//! Each credential resolves with ENV over TOML priority; a key present in
//! both sources logs a warning and the environment wins. Providers whose
//! credential resolves to nothing are simply not registered.

use aivis_common::config::TomlConfig;
use tracing::warn;

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5810";

/// Resolved engine configuration
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub bind_address: String,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub perplexity_api_key: Option<String>,
    pub serp_api_key: Option<String>,
    pub backlink_api_key: Option<String>,
    pub backlink_api_url: Option<String>,
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve one credential with ENV -> TOML priority
fn resolve_credential(
    name: &str,
    env_var: &str,
    toml_value: Option<&String>,
) -> Option<String> {
    let env_key = std::env::var(env_var).ok().filter(|k| is_valid_key(k));
    let toml_key = toml_value.filter(|k| is_valid_key(k.as_str())).cloned();

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "{} found in both environment and TOML config. Using environment (highest priority).",
            name
        );
    }

    env_key.or(toml_key)
}

impl EngineConfig {
    /// Resolve configuration from environment variables and the optional
    /// TOML config file
    pub fn resolve(toml: Option<&TomlConfig>) -> Self {
        let bind_address = std::env::var("AIVIS_BIND_ADDRESS")
            .ok()
            .or_else(|| toml.and_then(|t| t.bind_address.clone()))
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        Self {
            bind_address,
            openai_api_key: resolve_credential(
                "OpenAI API key",
                "AIVIS_OPENAI_API_KEY",
                toml.and_then(|t| t.openai_api_key.as_ref()),
            ),
            anthropic_api_key: resolve_credential(
                "Anthropic API key",
                "AIVIS_ANTHROPIC_API_KEY",
                toml.and_then(|t| t.anthropic_api_key.as_ref()),
            ),
            gemini_api_key: resolve_credential(
                "Gemini API key",
                "AIVIS_GEMINI_API_KEY",
                toml.and_then(|t| t.gemini_api_key.as_ref()),
            ),
            perplexity_api_key: resolve_credential(
                "Perplexity API key",
                "AIVIS_PERPLEXITY_API_KEY",
                toml.and_then(|t| t.perplexity_api_key.as_ref()),
            ),
            serp_api_key: resolve_credential(
                "SERP API key",
                "AIVIS_SERP_API_KEY",
                toml.and_then(|t| t.serp_api_key.as_ref()),
            ),
            backlink_api_key: resolve_credential(
                "Backlink API key",
                "AIVIS_BACKLINK_API_KEY",
                toml.and_then(|t| t.backlink_api_key.as_ref()),
            ),
            backlink_api_url: toml.and_then(|t| t.backlink_api_url.clone()),
        }
    }
}
