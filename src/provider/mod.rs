// Model invocation
//
// A provider turns one rendered prompt into raw model text. Exactly one
// attempt is made per call; failures surface as `NewsglotError::Provider`.

pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use openai::OpenAiProvider;
use crate::config::ProviderConfig;
use crate::error::Result;

/// Everything a provider needs for one completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub prompt: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Model name and tuning parameters applied to every prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ModelSettings {
    pub fn request(&self, prompt: String) -> CompletionRequest {
        CompletionRequest {
            prompt,
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

impl From<&ProviderConfig> for ModelSettings {
    fn from(config: &ProviderConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Main trait for model invocation
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Send the prompt and return the raw text of the model's answer
    async fn invoke(&self, request: &CompletionRequest) -> Result<String>;

    /// Name used in logs
    fn provider_name(&self) -> &'static str;
}
