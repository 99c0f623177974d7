use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn, debug};

use crate::errors::LlmError;
use crate::secrets::ApiKey;

/// Configuration for LLM service
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<ApiKey>,
    /// Base URL of an OpenAI-compatible API
    pub base_url: String,
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.deepseek.com".to_string(),
            model: "deepseek-chat".to_string(),
            max_tokens: 200,
            temperature: 0.7,
            timeout: Duration::from_secs(30),
        }
    }
}

impl LlmConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: ApiKey::from_env("LLM_API_KEY"),
            base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(defaults.base_url),
            model: std::env::var("LLM_MODEL").unwrap_or(defaults.model),
            max_tokens: std::env::var("LLM_MAX_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_tokens),
            temperature: std::env::var("LLM_TEMPERATURE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.temperature),
            timeout: std::env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }
}

/// A chat-style completion request: one system and one user message.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
}

/// Trait for LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion and return the text of the first choice
    async fn generate_completion(&self, request: CompletionRequest) -> Result<String, LlmError>;
}

/// OpenAI-compatible chat completion request/response structures
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Debug, Serialize, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// Provider for any OpenAI-compatible `/chat/completions` endpoint
/// (DeepSeek by default).
pub struct ChatCompletionProvider {
    api_key: ApiKey,
    endpoint: String,
    model: String,
    max_tokens: usize,
    temperature: f32,
    client: Client,
}

impl ChatCompletionProvider {
    pub fn new(api_key: ApiKey, config: &LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::NetworkError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            client,
        })
    }

    async fn call_chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let response = self.client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key.expose()))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();

        if status == 429 {
            return Err(LlmError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::ApiError(format!("HTTP {}: {}", status, error_text)));
        }

        response.json::<ChatResponse>()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl LlmProvider for ChatCompletionProvider {
    async fn generate_completion(&self, request: CompletionRequest) -> Result<String, LlmError> {
        debug!("Generating LLM completion (model: {}, max_tokens: {})", self.model, self.max_tokens);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.system,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.user,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self.call_chat(&request).await?;

        if let Some(usage) = &response.usage {
            debug!("LLM completion generated. Tokens: {} prompt + {} completion = {} total",
                  usage.prompt_tokens, usage.completion_tokens, usage.total_tokens);
        }

        response.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| LlmError::InvalidResponse("No content in response".to_string()))
    }
}

/// LLM service with provider abstraction
pub struct LlmService {
    provider: Option<Arc<dyn LlmProvider>>,
}

impl LlmService {
    pub fn new(config: LlmConfig) -> Self {
        let provider = match &config.api_key {
            Some(api_key) => match ChatCompletionProvider::new(api_key.clone(), &config) {
                Ok(provider) => {
                    info!("Initializing LLM service (model: {}, endpoint: {})", config.model, config.base_url);
                    Some(Arc::new(provider) as Arc<dyn LlmProvider>)
                }
                Err(e) => {
                    warn!("Failed to initialize LLM provider: {}. LLM features disabled.", e);
                    None
                }
            },
            None => {
                warn!("LLM API key not configured. Analyses will use fallback text.");
                None
            }
        };

        Self { provider }
    }

    pub fn with_provider(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn generate_completion(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let provider = self.provider.as_ref()
            .ok_or(LlmError::Disabled)?;

        provider.generate_completion(request).await
    }
}
