use anyhow::Result;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub llm: LLMConfig,
    pub search: SearchConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LLMConfig {
    pub openai_api_key: String,
    pub anthropic_api_key: String,
    pub openrouter_api_key: String,
    pub default_provider: String,
    pub default_model: String,
}

impl LLMConfig {
    /// API key for the configured default provider, if one is set.
    pub fn active_api_key(&self) -> Option<String> {
        let key = match self.default_provider.as_str() {
            "openai" => &self.openai_api_key,
            "anthropic" => &self.anthropic_api_key,
            "openrouter" => &self.openrouter_api_key,
            _ => return None,
        };
        if key.is_empty() {
            None
        } else {
            Some(key.clone())
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub tavily_api_key: String,
    pub max_results: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            llm: LLMConfig {
                openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
                anthropic_api_key: env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
                openrouter_api_key: env::var("OPENROUTER_API_KEY").unwrap_or_default(),
                default_provider: env::var("TRIPFLOW_LLM_PROVIDER")
                    .unwrap_or_else(|_| "openai".to_string()),
                default_model: env::var("TRIPFLOW_LLM_MODEL")
                    .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            },
            search: SearchConfig {
                tavily_api_key: env::var("TAVILY_API_KEY").unwrap_or_default(),
                max_results: env::var("TAVILY_MAX_RESULTS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()?,
            },
            output: OutputConfig {
                dir: env::var("TRIPFLOW_OUTPUT_DIR").unwrap_or_else(|_| "output".to_string()),
            },
        })
    }
}
