//! OpenAI-compatible LLM client.
//!
//! Works with any endpoint that speaks the `/v1/chat/completions` schema.
//! Every call is a single request: no retries, callers decide what to do
//! with a failure.

use crate::config::LlmConfig;
use crate::error::{Result, StoryError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// Message role in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// A message in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Request body for chat completion.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

/// Response from chat completion.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// OpenAI API error response.
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Response from an LLM call including metadata.
#[derive(Debug)]
pub struct LlmResponse {
    /// The generated content, never blank.
    pub content: String,
    /// Reason the model stopped generating.
    pub finish_reason: Option<String>,
    /// Token usage (if available).
    pub usage: Option<TokenUsage>,
}

#[derive(Debug)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Anything that can turn a system instruction plus user input into text.
///
/// [`LlmClient`] is the production implementation; the pipeline only
/// depends on this trait.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String>;
}

/// OpenAI-compatible LLM client.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    config: LlmConfig,
}

impl LlmClient {
    /// Create a new LLM client with the given configuration.
    ///
    /// Fails with [`StoryError::Configuration`] when no API key is set, so
    /// a client that exists can always authenticate.
    pub fn new(config: LlmConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(StoryError::Configuration(
                "LLM API key is not set".to_string(),
            ));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| StoryError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Model name requests are sent with.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Get the API endpoint URL.
    fn endpoint(&self) -> String {
        let base = self.config.api_base.trim_end_matches('/');
        format!("{}/v1/chat/completions", base)
    }

    /// Send a chat completion request.
    pub async fn chat(
        &self,
        messages: Vec<Message>,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<LlmResponse> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            temperature,
            max_tokens,
        };

        tracing::debug!(
            model = %self.config.model,
            max_tokens,
            temperature,
            "sending chat completion request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "LLM request did not complete"))?;

        let status = response.status();
        let body = response.text().await?;

        parse_completion(status, &body)
    }

    /// Test connectivity to the API.
    pub async fn test_connection(&self) -> Result<()> {
        let response = self
            .chat(vec![Message::user("Say 'hello' and nothing else.")], 16, 0.0)
            .await?;

        if response.content.to_lowercase().contains("hello") {
            Ok(())
        } else {
            Err(StoryError::InvalidInput(format!(
                "Unexpected response: {}",
                response.content
            )))
        }
    }
}

#[async_trait]
impl CompletionModel for LlmClient {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        check_request(user, max_tokens, temperature)?;

        let messages = vec![Message::system(system), Message::user(user)];
        let response = self.chat(messages, max_tokens, temperature).await?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                finish_reason = ?response.finish_reason,
                "completion received"
            );
        }

        Ok(response.content)
    }
}

/// Validate completion arguments before anything goes over the wire.
pub fn check_request(user: &str, max_tokens: u32, temperature: f32) -> Result<()> {
    if user.trim().is_empty() {
        return Err(StoryError::InvalidInput(
            "user input must not be empty".to_string(),
        ));
    }
    if max_tokens == 0 {
        return Err(StoryError::InvalidInput(
            "max_tokens must be positive".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&temperature) {
        return Err(StoryError::InvalidInput(format!(
            "temperature must be between 0 and 1, got {}",
            temperature
        )));
    }
    Ok(())
}

/// Interpret a chat completion HTTP response.
fn parse_completion(status: StatusCode, body: &str) -> Result<LlmResponse> {
    if !status.is_success() {
        match serde_json::from_str::<ApiError>(body) {
            Ok(api_error) => tracing::error!(
                status = status.as_u16(),
                message = %api_error.error.message,
                "LLM API returned an error"
            ),
            Err(_) => tracing::error!(status = status.as_u16(), body, "LLM request failed"),
        }
        return Err(StoryError::Transport {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }

    let completion: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
        tracing::error!(error = %e, "LLM response was not a chat completion");
        StoryError::Transport {
            status: status.as_u16(),
            body: body.to_string(),
        }
    })?;

    let usage = completion.usage.map(|u| TokenUsage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
    });

    let choice = completion.choices.into_iter().next();
    let finish_reason = choice.as_ref().and_then(|c| c.finish_reason.clone());
    let content = choice
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .filter(|c| !c.trim().is_empty());

    match content {
        Some(content) => Ok(LlmResponse {
            content,
            finish_reason,
            usage,
        }),
        None => {
            tracing::error!(finish_reason = ?finish_reason, "LLM response had no content");
            Err(StoryError::EmptyCompletion)
        }
    }
}
