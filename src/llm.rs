use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client as OpenAIClient;
use async_trait::async_trait;
use tokio::time::{timeout, Duration};
use tracing::{debug, error, warn};

use crate::environment::ChatConfig;
use crate::{HeraldError, Result, TARGET_LLM_REQUEST};

/// Turns a system instruction plus a prompt into plain text.
#[async_trait]
pub trait TextTransform: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}

/// Chat completions against an OpenAI-compatible endpoint (OpenRouter by default).
pub struct ChatCompletionClient {
    client: OpenAIClient<OpenAIConfig>,
    model: String,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    timeout: Duration,
}

impl ChatCompletionClient {
    pub fn new(config: &ChatConfig, timeout: Duration) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_base(&config.api_base)
            .with_api_key(&config.api_key);
        Self {
            client: OpenAIClient::with_config(openai_config),
            model: config.model.clone(),
            max_tokens: None,
            temperature: None,
            timeout,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    #[allow(deprecated)]
    fn build_request(
        &self,
        system: &str,
        prompt: &str,
    ) -> std::result::Result<async_openai::types::CreateChatCompletionRequest, async_openai::error::OpenAIError>
    {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into(),
        ];

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(self.model.clone()).messages(messages);
        if let Some(max_tokens) = self.max_tokens {
            builder.max_tokens(max_tokens);
        }
        if let Some(temperature) = self.temperature {
            builder.temperature(temperature);
        }
        builder.build()
    }
}

#[async_trait]
impl TextTransform for ChatCompletionClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let request = self
            .build_request(system, prompt)
            .map_err(|e| HeraldError::Transform(format!("Failed to build request: {}", e)))?;

        debug!(target: TARGET_LLM_REQUEST, "Sending completion request to {} (prompt length = {})", self.model, prompt.chars().count());

        let response = match timeout(self.timeout, self.client.chat().create(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(target: TARGET_LLM_REQUEST, "Completion request failed: {}", e);
                return Err(HeraldError::Transform(e.to_string()));
            }
            Err(_) => {
                warn!(target: TARGET_LLM_REQUEST, "Completion request timed out after {:?}", self.timeout);
                return Err(HeraldError::Transform(format!(
                    "request timed out after {} seconds",
                    self.timeout.as_secs()
                )));
            }
        };

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| HeraldError::Transform("response contained no message content".to_string()))?;

        debug!(target: TARGET_LLM_REQUEST, "Completion received (length = {})", content.chars().count());
        Ok(content)
    }
}

/// Runs the transform, substituting `fallback(error)` for any failure so the
/// notification still goes out.
pub async fn complete_or_else<T, F>(transform: &T, system: &str, prompt: &str, fallback: F) -> String
where
    T: TextTransform + ?Sized,
    F: FnOnce(&HeraldError) -> String,
{
    match transform.complete(system, prompt).await {
        Ok(text) => text,
        Err(e) => {
            error!(target: TARGET_LLM_REQUEST, " !! Text transform failed: {}", e);
            fallback(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingTransform;

    #[async_trait]
    impl TextTransform for FailingTransform {
        async fn complete(&self, _system: &str, _prompt: &str) -> Result<String> {
            Err(HeraldError::Transform("429 rate limited".to_string()))
        }
    }

    struct EchoTransform;

    #[async_trait]
    impl TextTransform for EchoTransform {
        async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
            Ok(format!("{}|{}", system, prompt))
        }
    }

    #[tokio::test]
    async fn test_failure_substitutes_placeholder() {
        let text = complete_or_else(&FailingTransform, "sys", "prompt", |e| {
            format!("summary unavailable: {}", e)
        })
        .await;
        assert_eq!(text, "summary unavailable: Transform error: 429 rate limited");
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let text = complete_or_else(&EchoTransform, "sys", "prompt", |_| unreachable!()).await;
        assert_eq!(text, "sys|prompt");
    }

    #[test]
    fn test_request_carries_options() {
        let config = ChatConfig {
            api_key: "key".to_string(),
            api_base: "http://localhost:1234/v1".to_string(),
            model: "test/model".to_string(),
        };
        let client = ChatCompletionClient::new(&config, Duration::from_secs(1))
            .with_max_tokens(8000)
            .with_temperature(0.5);
        let request = client.build_request("system", "user").unwrap();
        assert_eq!(request.model, "test/model");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.temperature, Some(0.5));
    }
}
