use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::models::ChatMessage;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Downstream chat-completion provider.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Returns the text of the first completion.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, UpstreamError>;
}

// OpenAI chat completion request format
#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
}

// OpenAI chat completion response format, only what we read
#[derive(Deserialize)]
struct CompletionResponse {
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

pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiClient {
    pub fn new(
        base_url: &str,
        api_key: String,
        model: String,
        max_tokens: u32,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            max_tokens,
        })
    }
}

#[async_trait]
impl ChatBackend for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, UpstreamError> {
        let body = CompletionRequest {
            model: &self.model,
            messages,
            max_tokens: self.max_tokens,
        };

        let res = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(UpstreamError::Status(res.status()));
        }

        let parsed = res
            .json::<CompletionResponse>()
            .await
            .map_err(|e| UpstreamError::Malformed(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| UpstreamError::Malformed("no completion choices".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn request_body_matches_provider_shape() {
        let messages = vec![ChatMessage {
            role: Role::User,
            content: "What pH suits neon tetras?".to_string(),
        }];
        let body = CompletionRequest {
            model: "gpt-3.5-turbo",
            messages: &messages,
            max_tokens: 150,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "gpt-3.5-turbo",
                "messages": [{"role": "user", "content": "What pH suits neon tetras?"}],
                "max_tokens": 150
            })
        );
    }

    #[test]
    fn response_without_choices_has_no_content() {
        let parsed: CompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(parsed.choices.is_empty());

        let parsed: CompletionResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"hello"}}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn unreachable_provider_is_transport_error() {
        let client = OpenAiClient::new(
            "http://127.0.0.1:9",
            "key".to_string(),
            "gpt-3.5-turbo".to_string(),
            150,
            Duration::from_secs(2),
        )
        .unwrap();

        let err = client.complete(&[]).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Transport(_)));
    }
}
