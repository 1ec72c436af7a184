//! Chat-completion transport for the advisory service
//!
//! Supports both OpenAI-compatible APIs (DeepSeek, OpenAI, ...) and the
//! Anthropic messages API. The format is picked from the endpoint URL.

use crate::core::config::AdvisoryConfig;
use crate::core::error::{AgentError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
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

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Something that turns a message list into one reply
///
/// The advisory client owns the timeout; backends only report transport and
/// protocol failures.
pub trait ChatBackend: Send + Sync {
    fn complete(&self, messages: &[ChatMessage]) -> impl Future<Output = Result<String>> + Send;
}

/// API format type
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

/// reqwest-backed chat backend
pub struct HttpChatBackend {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    api_format: ApiFormat,
}

impl HttpChatBackend {
    pub fn new(api_key: String, config: &AdvisoryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Advisory(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            api_format: Self::detect_api_format(&config.api_url),
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// Build from config, reading the credential from the environment
    ///
    /// Fails when the credential variable is unset or blank.
    pub fn from_config(config: &AdvisoryConfig) -> Result<Self> {
        let api_key = config
            .api_key()
            .ok_or_else(|| AgentError::Advisory(format!("{} not set", config.api_key_env)))?;
        Self::new(api_key, config)
    }

    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            ApiFormat::OpenAI
        }
    }

    pub fn api_format(&self) -> &ApiFormat {
        &self.api_format
    }

    async fn complete_openai(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = OpenAIRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::Advisory(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AgentError::Advisory(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        let completion: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Advisory(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AgentError::Advisory("Empty response".into()))
    }

    async fn complete_anthropic(&self, messages: &[ChatMessage]) -> Result<String> {
        let system = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let request = AnthropicRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system,
            messages: messages.iter().filter(|m| m.role != Role::System).collect(),
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::Advisory(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AgentError::Advisory(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        let completion: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Advisory(e.to_string()))?;

        completion
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| AgentError::Advisory("Empty response".into()))
    }
}

impl ChatBackend for HttpChatBackend {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        match self.api_format {
            ApiFormat::OpenAI => self.complete_openai(messages).await,
            ApiFormat::Anthropic => self.complete_anthropic(messages).await,
        }
    }
}

// OpenAI-compatible API format (DeepSeek, OpenAI, etc.)
#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<&'a ChatMessage>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        let key = "test-key".to_string();
        let deepseek = HttpChatBackend::new(key.clone(), &AdvisoryConfig::default()).unwrap();
        assert_eq!(deepseek.api_format(), &ApiFormat::OpenAI);

        let config = AdvisoryConfig {
            api_url: "https://api.anthropic.com/v1/messages".into(),
            ..Default::default()
        };
        let anthropic = HttpChatBackend::new(key, &config).unwrap();
        assert_eq!(anthropic.api_format(), &ApiFormat::Anthropic);
    }

    #[test]
    fn test_missing_key_fails() {
        let config = AdvisoryConfig {
            api_key_env: "SHOWDOWN_AGENT_TEST_UNSET_KEY".into(),
            ..Default::default()
        };
        assert!(matches!(
            HttpChatBackend::from_config(&config),
            Err(AgentError::Advisory(_))
        ));
    }

    #[test]
    fn test_openai_body_shape() {
        let messages = vec![ChatMessage::system("rules"), ChatMessage::user("state")];
        let request = OpenAIRequest {
            model: "deepseek-chat",
            messages: &messages,
            temperature: 0.7,
            max_tokens: 500,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["model"], "deepseek-chat");
        assert_eq!(body["max_tokens"], 500);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "state");
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"move 2"}}]}"#;
        let parsed: OpenAIResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("move 2"));
    }
}
