//! OpenRouter narrative provider.
//!
//! Sends the summarized analysis to the OpenRouter chat completions API
//! (<https://openrouter.ai/>) and returns the model's answer. Any API failure
//! falls back to the [`TemplateNarrator`] text, so generating a narrative
//! does not fail once the narrator is constructed.

use super::{DatasetSummary, NarrativeProvider, TemplateNarrator};
use anyhow::{Result, anyhow};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default OpenRouter API endpoint.
const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model for narratives.
const DEFAULT_MODEL: &str = "deepseek/deepseek-chat";

/// Default timeout for API requests in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default temperature; narratives should vary little between runs.
const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Default max tokens for a narrative.
const DEFAULT_MAX_TOKENS: u32 = 800;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<Choice>>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<Message>,
}

/// Configuration for the OpenRouter narrator.
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    /// The model to use (e.g., "deepseek/deepseek-chat", "openai/gpt-4o").
    pub model: String,
    /// Temperature for response generation (0.0 - 2.0).
    pub temperature: f32,
    /// Maximum tokens in the response.
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Base URL for the API (useful for proxies or custom endpoints).
    pub base_url: String,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl OpenRouterConfig {
    /// Create a new configuration builder.
    pub fn builder() -> OpenRouterConfigBuilder {
        OpenRouterConfigBuilder::default()
    }
}

/// Builder for [`OpenRouterConfig`].
#[derive(Default)]
pub struct OpenRouterConfigBuilder {
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    timeout_secs: Option<u64>,
    base_url: Option<String>,
}

impl OpenRouterConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn build(self) -> OpenRouterConfig {
        OpenRouterConfig {
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}

/// Narrative provider backed by an OpenRouter-hosted model.
///
/// # Example
///
/// ```rust,ignore
/// use lex_analysis::narrative::{NarrativeProvider, OpenRouterConfig, OpenRouterNarrator};
///
/// let config = OpenRouterConfig::builder().model("openai/gpt-4o").build();
/// let narrator = OpenRouterNarrator::with_config(api_key, config)?;
/// let text = narrator.generate_narrative(&summary, "What stands out?")?;
/// ```
pub struct OpenRouterNarrator {
    api_key: String,
    config: OpenRouterConfig,
    client: Client,
    fallback: TemplateNarrator,
}

impl OpenRouterNarrator {
    /// Create a narrator with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, OpenRouterConfig::default())
    }

    /// Create a narrator with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_config(api_key: impl Into<String>, config: OpenRouterConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            api_key: api_key.into(),
            config,
            client,
            fallback: TemplateNarrator::new(),
        })
    }

    fn build_prompt(&self, summary: &DatasetSummary, query: &str) -> String {
        format!(
            "Analyze the following dataset and answer this query: {}\n\n\
            {}\n\
            Please provide:\n\
            1. Key Insights\n\
            2. Trends and Patterns\n\
            3. Notable Observations\n\
            4. Recommendations\n\n\
            Only use the figures given above. Format the response in clear sections with bullet points.",
            query.trim(),
            summary.to_prompt_context()
        )
    }

    fn call_api(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&self.config.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("X-Title", "lex-analysis")
            .json(&request)
            .send()?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "OpenRouter API Error {}: {}",
                response.status(),
                response.text()?
            ));
        }

        let result: ChatResponse = response.json()?;
        extract_content(result)
    }
}

fn extract_content(response: ChatResponse) -> Result<String> {
    response
        .choices
        .and_then(|choices| choices.into_iter().next())
        .and_then(|choice| choice.message)
        .map(|message| message.content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| anyhow!("No response content from OpenRouter API"))
}

impl NarrativeProvider for OpenRouterNarrator {
    fn generate_narrative(&self, summary: &DatasetSummary, query: &str) -> Result<String> {
        let prompt = self.build_prompt(summary, query);
        debug!("Requesting narrative from {} ({})", self.name(), self.config.model);

        match self.call_api(&prompt) {
            Ok(text) => Ok(text),
            Err(e) => {
                warn!("Narrative generation failed, using template: {}", e);
                Ok(self.fallback.render(summary, query))
            }
        }
    }

    fn name(&self) -> &str {
        "OpenRouter"
    }

    fn model(&self) -> Option<&str> {
        Some(&self.config.model)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DatasetShape;
    use indexmap::IndexMap;

    fn summary() -> DatasetSummary {
        DatasetSummary {
            shape: DatasetShape::Numerical,
            analysis_type: "numerical".to_string(),
            row_count: 4,
            column_count: 2,
            datetime_columns: Vec::new(),
            numeric_columns: vec!["price".to_string(), "qty".to_string()],
            categorical_columns: Vec::new(),
            column_dtypes: IndexMap::from([
                ("price".to_string(), "f64".to_string()),
                ("qty".to_string(), "i64".to_string()),
            ]),
            column_types: IndexMap::new(),
            completeness_score: 100.0,
            highlights: vec!["Strongest correlation: 'price' and 'qty' (r = -0.90)".to_string()],
        }
    }

    // -------------------------------------------------------------------------
    // Response parsing tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_extract_content() {
        let json = r#"{
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "  Prices fall as quantity rises.  "
                }
            }]
        }"#;

        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            extract_content(response).unwrap(),
            "Prices fall as quantity rises."
        );
    }

    #[test]
    fn test_extract_content_empty_choices() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(extract_content(response).is_err());
    }

    #[test]
    fn test_extract_content_null_choices() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices": null}"#).unwrap();
        assert!(extract_content(response).is_err());
    }

    #[test]
    fn test_extract_content_blank_message() {
        let json = r#"{"choices": [{"message": {"role": "assistant", "content": "   "}}]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(extract_content(response).is_err());
    }

    #[test]
    fn test_parse_malformed_message() {
        let json = r#"{"choices": [{"message": "not an object"}]}"#;
        let result: Result<ChatResponse, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    // -------------------------------------------------------------------------
    // Prompt tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_build_prompt_contains_required_parts() {
        let narrator = OpenRouterNarrator::new("test-key").unwrap();
        let prompt = narrator.build_prompt(&summary(), "How do price and quantity relate?");

        assert!(prompt.contains("answer this query: How do price and quantity relate?"));
        assert!(prompt.contains("- Rows: 4"));
        assert!(prompt.contains("- price: f64"));
        assert!(prompt.contains("Strongest correlation"));
        assert!(prompt.contains("Recommendations"));
    }

    // -------------------------------------------------------------------------
    // Fallback tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_unreachable_endpoint_falls_back_to_template() {
        let config = OpenRouterConfig::builder()
            .base_url("http://127.0.0.1:9/unreachable")
            .timeout_secs(2)
            .build();
        let narrator = OpenRouterNarrator::with_config("test-key", config).unwrap();

        let text = narrator.generate_narrative(&summary(), "q").unwrap();
        assert_eq!(text, TemplateNarrator::new().render(&summary(), "q"));
    }

    // -------------------------------------------------------------------------
    // Config builder tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_config_builder_defaults() {
        let config = OpenRouterConfig::builder().build();

        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_config_builder_custom() {
        let config = OpenRouterConfig::builder()
            .model("openai/gpt-4o")
            .temperature(0.0)
            .max_tokens(200)
            .build();

        assert_eq!(config.model, "openai/gpt-4o");
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.max_tokens, 200);
    }

    #[test]
    fn test_provider_identity() {
        let narrator = OpenRouterNarrator::new("test-key").unwrap();
        assert_eq!(narrator.name(), "OpenRouter");
        assert_eq!(narrator.model(), Some(DEFAULT_MODEL));
    }
}
