//! LLM Provider支持模块

use std::time::Duration;

use async_trait::async_trait;
use rig::{
    agent::Agent,
    client::CompletionClient,
    completion::{Prompt, PromptError},
};

use super::types::{CompletionRequest, LlmError};
use super::CompletionBackend;
use crate::config::{LLMConfig, LLMProvider};

/// 配置了非空基地址时才覆盖provider的默认地址
fn custom_base_url(config: &LLMConfig) -> Option<&str> {
    let base_url = config.api_base_url.trim();
    (!base_url.is_empty()).then_some(base_url)
}

/// 统一的Provider客户端枚举
#[derive(Clone)]
pub enum ProviderClient {
    OpenAI(rig::providers::openai::Client),
    Moonshot(rig::providers::moonshot::Client),
    DeepSeek(rig::providers::deepseek::Client),
    Mistral(rig::providers::mistral::Client),
    OpenRouter(rig::providers::openrouter::Client),
    Anthropic(rig::providers::anthropic::Client),
    Ollama(rig::providers::ollama::Client),
}

impl ProviderClient {
    /// 根据配置创建相应的provider客户端
    pub fn new(config: &LLMConfig) -> Result<Self, LlmError> {
        match config.provider {
            LLMProvider::OpenAI => {
                let mut builder = rig::providers::openai::Client::builder(&config.api_key);
                if let Some(base_url) = custom_base_url(config) {
                    builder = builder.base_url(base_url);
                }
                Ok(ProviderClient::OpenAI(builder.build()))
            }
            LLMProvider::Moonshot => {
                let mut builder = rig::providers::moonshot::Client::builder(&config.api_key);
                if let Some(base_url) = custom_base_url(config) {
                    builder = builder.base_url(base_url);
                }
                Ok(ProviderClient::Moonshot(builder.build()))
            }
            LLMProvider::DeepSeek => {
                let mut builder = rig::providers::deepseek::Client::builder(&config.api_key);
                if let Some(base_url) = custom_base_url(config) {
                    builder = builder.base_url(base_url);
                }
                Ok(ProviderClient::DeepSeek(builder.build()))
            }
            LLMProvider::Mistral => {
                let client = rig::providers::mistral::Client::builder(&config.api_key).build();
                Ok(ProviderClient::Mistral(client))
            }
            LLMProvider::OpenRouter => {
                let client = rig::providers::openrouter::Client::builder(&config.api_key).build();
                Ok(ProviderClient::OpenRouter(client))
            }
            LLMProvider::Anthropic => {
                let client = rig::providers::anthropic::ClientBuilder::new(&config.api_key)
                    .build()
                    .map_err(|e| LlmError::Failed(e.to_string()))?;
                Ok(ProviderClient::Anthropic(client))
            }
            LLMProvider::Ollama => {
                let mut builder = rig::providers::ollama::Client::builder();
                if let Some(base_url) = custom_base_url(config) {
                    builder = builder.base_url(base_url);
                }
                Ok(ProviderClient::Ollama(builder.build()))
            }
        }
    }

    /// 按请求参数创建一次性的Agent
    pub fn create_agent(&self, request: &CompletionRequest) -> ProviderAgent {
        let max_tokens = u64::from(request.max_tokens);
        match self {
            ProviderClient::OpenAI(client) => {
                let agent = client
                    .completion_model(&request.model)
                    .completions_api()
                    .into_agent_builder()
                    .preamble(&request.system_prompt)
                    .max_tokens(max_tokens)
                    .temperature(request.temperature)
                    .build();
                ProviderAgent::OpenAI(agent)
            }
            ProviderClient::Moonshot(client) => {
                let agent = client
                    .agent(&request.model)
                    .preamble(&request.system_prompt)
                    .max_tokens(max_tokens)
                    .temperature(request.temperature)
                    .build();
                ProviderAgent::Moonshot(agent)
            }
            ProviderClient::DeepSeek(client) => {
                let agent = client
                    .agent(&request.model)
                    .preamble(&request.system_prompt)
                    .max_tokens(max_tokens)
                    .temperature(request.temperature)
                    .build();
                ProviderAgent::DeepSeek(agent)
            }
            ProviderClient::Mistral(client) => {
                let agent = client
                    .agent(&request.model)
                    .preamble(&request.system_prompt)
                    .max_tokens(max_tokens)
                    .temperature(request.temperature)
                    .build();
                ProviderAgent::Mistral(agent)
            }
            ProviderClient::OpenRouter(client) => {
                let agent = client
                    .agent(&request.model)
                    .preamble(&request.system_prompt)
                    .max_tokens(max_tokens)
                    .temperature(request.temperature)
                    .build();
                ProviderAgent::OpenRouter(agent)
            }
            ProviderClient::Anthropic(client) => {
                let agent = client
                    .agent(&request.model)
                    .preamble(&request.system_prompt)
                    .max_tokens(max_tokens)
                    .temperature(request.temperature)
                    .build();
                ProviderAgent::Anthropic(agent)
            }
            ProviderClient::Ollama(client) => {
                let agent = client
                    .agent(&request.model)
                    .preamble(&request.system_prompt)
                    .max_tokens(max_tokens)
                    .temperature(request.temperature)
                    .build();
                ProviderAgent::Ollama(agent)
            }
        }
    }
}

/// 统一的Agent枚举
pub enum ProviderAgent {
    OpenAI(Agent<rig::providers::openai::CompletionModel>),
    Mistral(Agent<rig::providers::mistral::CompletionModel>),
    OpenRouter(Agent<rig::providers::openrouter::CompletionModel>),
    Anthropic(Agent<rig::providers::anthropic::completion::CompletionModel>),
    Moonshot(Agent<rig::providers::moonshot::CompletionModel>),
    DeepSeek(Agent<rig::providers::deepseek::CompletionModel>),
    Ollama(Agent<rig::providers::ollama::CompletionModel<reqwest::Client>>),
}

impl ProviderAgent {
    /// 执行prompt
    pub async fn prompt(&self, prompt: &str) -> Result<String, PromptError> {
        match self {
            ProviderAgent::OpenAI(agent) => agent.prompt(prompt).await,
            ProviderAgent::Moonshot(agent) => agent.prompt(prompt).await,
            ProviderAgent::DeepSeek(agent) => agent.prompt(prompt).await,
            ProviderAgent::Mistral(agent) => agent.prompt(prompt).await,
            ProviderAgent::OpenRouter(agent) => agent.prompt(prompt).await,
            ProviderAgent::Anthropic(agent) => agent.prompt(prompt).await,
            ProviderAgent::Ollama(agent) => agent.prompt(prompt).await,
        }
    }
}

/// 基于rig的补全后端
pub struct RigBackend {
    client: ProviderClient,
    timeout: Duration,
}

impl RigBackend {
    pub fn new(config: &LLMConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client: ProviderClient::new(config)?,
            timeout: Duration::from_secs(config.timeout_seconds),
        })
    }
}

#[async_trait]
impl CompletionBackend for RigBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let agent = self.client.create_agent(request);
        match tokio::time::timeout(self.timeout, agent.prompt(&request.user_prompt)).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(LlmError::from_provider_message(e.to_string())),
            Err(_) => Err(LlmError::Failed(format!(
                "request timed out after {}s",
                self.timeout.as_secs()
            ))),
        }
    }
}
