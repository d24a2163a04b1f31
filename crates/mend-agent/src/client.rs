//! Chat-completions client used to rewrite files
//!
//! Each call is independent: one request, one response, no retry. The
//! caller decides what to do with the returned text; Mend writes it over the
//! original file as-is.

use async_trait::async_trait;
use mend_core::{AiConfig, MendError, Result};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::auth;
use crate::prompt::build_prompt;
use crate::types::{ChatMessage, ChatRequest, ChatResponse};

const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_MAX_TOKENS: u32 = 1000;
const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert software engineer.";

/// Something that can turn a prompt into generated text.
#[async_trait]
pub trait Rewriter: Send + Sync {
    /// Send one prompt and return the generated text
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Ask for an improved version of `code`; the reply is the full new content
    async fn rewrite(&self, code: &str, improvement_type: &str) -> Result<String> {
        self.complete(&build_prompt(improvement_type, code)).await
    }
}

/// Client for an OpenAI-compatible chat-completions API
#[derive(Clone)]
pub struct RewriteClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    system_prompt: String,
}

impl std::fmt::Debug for RewriteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewriteClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

impl RewriteClient {
    /// Create a client for the API rooted at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MendError::Api(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        })
    }

    /// Build from configuration. A missing API key is not fatal here; calls
    /// fail with an auth error until one is provided.
    pub fn from_config(config: &AiConfig) -> Result<Self> {
        let api_key = match auth::get_api_key(&config.api_key_env) {
            Ok(key) => Some(key),
            Err(e) => {
                tracing::warn!("{}", e);
                None
            }
        };

        Ok(Self::new(&config.base_url, config.timeout())?
            .with_api_key(api_key)
            .with_model(&config.model)
            .with_max_tokens(config.max_tokens)
            .with_system_prompt(&config.system_prompt))
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Set max tokens for responses
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: &str) -> Self {
        self.system_prompt = system_prompt.to_string();
        self
    }

    fn build_request(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(self.system_prompt.as_str()),
                ChatMessage::user(prompt),
            ],
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl Rewriter for RewriteClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            MendError::Auth("No API key configured for the text-generation API".to_string())
        })?;

        tracing::info!(
            "Requesting completion from {} ({} prompt chars)",
            self.model,
            prompt.len()
        );

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MendError::Timeout(format!("API request timed out: {}", e))
                } else {
                    MendError::Api(format!("Failed to send request: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown".to_string());
            return Err(MendError::Api(format!("API error {}: {}", status, error_text)));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| MendError::Api(format!("Failed to parse response: {}", e)))?;

        let output = chat
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| MendError::Api("No choices in response".to_string()))?
            .message
            .content
            .ok_or_else(|| MendError::Api("Response message has no content".to_string()))?;

        match chat.usage {
            Some(usage) => tracing::info!(
                "Completion received ({} chars, {} prompt tokens, {} completion tokens)",
                output.len(),
                usage.prompt_tokens,
                usage.completion_tokens
            ),
            None => tracing::info!("Completion received ({} chars)", output.len()),
        }

        Ok(output)
    }
}

/// Canned rewriter for testing; records every prompt it receives
#[derive(Clone, Default)]
pub struct MockRewriter {
    reply: Option<String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockRewriter {
    /// Always answer with `reply`
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            prompts: Arc::default(),
        }
    }

    /// Always fail with an API error
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl Rewriter for MockRewriter {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(prompt.to_string());

        self.reply
            .clone()
            .ok_or_else(|| MendError::Api("API error 429 Too Many Requests: quota".to_string()))
    }
}
