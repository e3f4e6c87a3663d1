use crate::types::{AppError, AppResult, LLMRequest, LLMResponse};
use async_trait::async_trait;

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

/// Configuration for an LLM provider selection.
pub struct LLMProviderConfig {
    pub name: String,
    pub api_key: String,
}

pub struct LLM {
    adapter: Box<dyn LLMAdapter>,
}

impl LLM {
    pub fn new(provider: LLMProviderConfig) -> AppResult<Self> {
        let adapter: Box<dyn LLMAdapter> = match provider.name.as_str() {
            "openai" => Box::new(crate::llm::openai::OpenAIAdapter::new(&provider.api_key)),
            "anthropic" => Box::new(crate::llm::anthropic::AnthropicAdapter::new(
                &provider.api_key,
            )),
            "openrouter" => Box::new(crate::llm::openrouter::OpenRouterAdapter::new(
                &provider.api_key,
            )),
            _ => {
                return Err(AppError::InvalidRequest(format!(
                    "Unsupported provider: {}",
                    provider.name
                )))
            }
        };

        Ok(Self { adapter })
    }

    /// Wrap an existing adapter. Used by tests to inject mock adapters.
    pub fn from_adapter(adapter: Box<dyn LLMAdapter>) -> Self {
        Self { adapter }
    }

    pub async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.adapter.create_chat_completion(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_is_rejected() {
        let result = LLM::new(LLMProviderConfig {
            name: "not-a-provider".to_string(),
            api_key: "key".to_string(),
        });
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[test]
    fn test_known_providers_construct() {
        for name in ["openai", "anthropic", "openrouter"] {
            assert!(LLM::new(LLMProviderConfig {
                name: name.to_string(),
                api_key: "key".to_string(),
            })
            .is_ok());
        }
    }
}
