use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 独立出现的429状态码，不匹配 `204290` 这类数字中的片段
static STATUS_429: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b429\b").expect("valid regex"));

/// 一次文本补全请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

/// 模型调用边界上的错误，限流与其他失败可区分
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LlmError {
    /// 服务端限流，可重试
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// 限流重试次数用尽
    #[error("rate limit still hit after {attempts} attempts: {message}")]
    RateLimitExhausted { attempts: u32, message: String },

    /// 其他失败，不重试
    #[error("{0}")]
    Failed(String),
}

impl LlmError {
    /// 根据服务端返回的错误文本判断是否为限流
    pub fn from_provider_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if is_rate_limit_message(&message) {
            LlmError::RateLimited(message)
        } else {
            LlmError::Failed(message)
        }
    }
}

fn is_rate_limit_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    STATUS_429.is_match(&lower)
        || ["rate limit", "rate_limit", "ratelimit", "too many requests"]
            .iter()
            .any(|marker| lower.contains(marker))
}
