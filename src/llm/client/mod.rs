//! LLM客户端 - 提供统一的LLM服务接口

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::config::LLMConfig;

mod providers;
mod retry;
pub mod scripted;
pub mod types;

pub use providers::RigBackend;
pub use retry::{exponential_delay, retry_with_backoff};
pub use scripted::ScriptedBackend;
pub use types::{CompletionRequest, LlmError};

/// 文本补全服务的调用边界
///
/// 实现方需要把限流与其他失败区分开（[`LlmError::RateLimited`] 与
/// [`LlmError::Failed`]），重试策略由 [`LLMClient`] 统一处理。
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

/// LLM客户端 - 组合补全后端与限流重试策略
///
/// 重试状态只存在于单次调用的栈上，同一个客户端可以被并发的生成任务共享。
#[derive(Clone)]
pub struct LLMClient {
    config: LLMConfig,
    backend: Arc<dyn CompletionBackend>,
}

impl LLMClient {
    /// 根据配置创建基于rig的客户端
    pub fn new(config: LLMConfig) -> Result<Self, LlmError> {
        let backend = RigBackend::new(&config)?;
        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    /// 使用指定的后端创建客户端
    pub fn with_backend(config: LLMConfig, backend: Arc<dyn CompletionBackend>) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &LLMConfig {
        &self.config
    }

    /// 单轮对话，限流时按指数退避重试
    pub async fn prompt(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        let request = CompletionRequest {
            model: self.config.model.clone(),
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };
        debug!(
            model = %request.model,
            prompt_chars = request.user_prompt.len(),
            "sending completion request"
        );

        let backend = &self.backend;
        let request = &request;
        retry_with_backoff(
            self.config.retry_attempts,
            exponential_delay(self.config.retry_base_delay_secs),
            || backend.complete(request),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> LLMConfig {
        LLMConfig {
            retry_base_delay_secs: 0,
            ..LLMConfig::default()
        }
    }

    #[tokio::test]
    async fn test_prompt_forwards_model_parameters() {
        let backend = Arc::new(ScriptedBackend::new().with_response("[]"));
        let client = LLMClient::with_backend(test_config(), backend.clone());

        let text = client.prompt("system", "user").await.unwrap();
        assert_eq!(text, "[]");

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system_prompt, "system");
        assert_eq!(requests[0].user_prompt, "user");
        assert_eq!(requests[0].model, client.config().model);
        assert_eq!(requests[0].max_tokens, 16000);
        assert_eq!(requests[0].temperature, 0.3);
    }

    #[tokio::test]
    async fn test_prompt_retries_rate_limits() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .with_error(LlmError::RateLimited("429".to_string()))
                .with_response("ok"),
        );
        let client = LLMClient::with_backend(test_config(), backend.clone());

        assert_eq!(client.prompt("s", "u").await.unwrap(), "ok");
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn test_prompt_surfaces_exhausted_rate_limit() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .with_error(LlmError::RateLimited("429".to_string()))
                .with_error(LlmError::RateLimited("429".to_string()))
                .with_error(LlmError::RateLimited("429".to_string()))
                .with_response("never reached"),
        );
        let client = LLMClient::with_backend(test_config(), backend.clone());

        let err = client.prompt("s", "u").await.unwrap_err();
        assert!(matches!(err, LlmError::RateLimitExhausted { attempts: 3, .. }));
        assert_eq!(backend.call_count(), 3);
    }
}
