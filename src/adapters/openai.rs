use crate::config::ShopperConfig;
use crate::domain::chat::{ChatMessage, ChatRequest};
use crate::domain::ports::ChatClient;
use crate::utils::error::{Result, ShopperError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// OpenAI-compatible chat completions over HTTP.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config(config: &ShopperConfig) -> Result<Self> {
        Self::new(
            &config.openai.base_url,
            config.api_key()?,
            Duration::from_secs(config.openai.timeout_seconds),
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatMessage> {
        let endpoint = self.endpoint();
        tracing::debug!(
            "🤖 POST {} (model: {}, messages: {}, tools: {})",
            endpoint,
            request.model,
            request.messages.len(),
            request.tools.len()
        );

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("🤖 Response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ShopperError::LlmError {
                message: format!("{} returned {}: {}", endpoint, status, body.trim()),
            });
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| ShopperError::LlmError {
                message: "response contained no choices".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> OpenAiClient {
        OpenAiClient::new(&server.base_url(), "sk-test", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .header("authorization", "Bearer sk-test")
                    .body_contains("\"model\":\"gpt-4.1-mini\"");
                then.status(200).json_body(json!({
                    "id": "chatcmpl-1",
                    "choices": [
                        {"index": 0, "message": {"role": "assistant", "content": "199.99"}},
                        {"index": 1, "message": {"role": "assistant", "content": "ignored"}}
                    ]
                }));
            })
            .await;

        let request = ChatRequest::new("gpt-4.1-mini", vec![ChatMessage::user("price?")]);
        let message = client_for(&server).complete(request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(message.text(), "199.99");
    }

    #[tokio::test]
    async fn test_error_status_becomes_llm_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(401).body("invalid api key");
            })
            .await;

        let request = ChatRequest::new("gpt-4.1", vec![ChatMessage::user("hi")]);
        let err = client_for(&server).complete(request).await.unwrap_err();

        match err {
            ShopperError::LlmError { message } => {
                assert!(message.contains("401"));
                assert!(message.contains("invalid api key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_choices_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(json!({"choices": []}));
            })
            .await;

        let request = ChatRequest::new("gpt-4.1", vec![ChatMessage::user("hi")]);
        let result = client_for(&server).complete(request).await;
        assert!(matches!(result, Err(ShopperError::LlmError { .. })));
    }
}
