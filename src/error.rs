use thiserror::Error;

/// 主题地图流水线的错误
///
/// 每条消息都以所处阶段开头（configuration / research / generation /
/// validation / export），调用方可以直接展示给用户后让其手动重试。
#[derive(Debug, Error)]
pub enum TopicMapError {
    #[error("configuration error: {key} is not configured")]
    MissingCredential { key: &'static str },

    #[error("generation failed: invalid input: {0}")]
    InvalidInput(String),

    #[error("research failed: {0}")]
    Research(String),

    #[error("generation failed: LLM rate limit still hit after {attempts} attempts: {message}")]
    RateLimitExhausted { attempts: u32, message: String },

    #[error("generation failed: LLM request error: {0}")]
    Provider(String),

    #[error(
        "generation failed: could not parse the model response as a JSON array after a repair attempt: {message}"
    )]
    Parse { message: String },

    #[error("generation failed: no topic map entries were generated")]
    EmptyResult,

    #[error("validation failed:\n{}", .messages.join("\n"))]
    Validation { messages: Vec<String> },

    #[error("export failed: {0}")]
    Export(String),
}

impl TopicMapError {
    /// 输出阶段名，便于日志与测试区分
    pub fn phase(&self) -> &'static str {
        match self {
            TopicMapError::MissingCredential { .. } => "configuration",
            TopicMapError::Research(_) => "research",
            TopicMapError::InvalidInput(_)
            | TopicMapError::RateLimitExhausted { .. }
            | TopicMapError::Provider(_)
            | TopicMapError::Parse { .. }
            | TopicMapError::EmptyResult => "generation",
            TopicMapError::Validation { .. } => "validation",
            TopicMapError::Export(_) => "export",
        }
    }
}

impl From<crate::llm::client::LlmError> for TopicMapError {
    fn from(err: crate::llm::client::LlmError) -> Self {
        use crate::llm::client::LlmError;
        match err {
            LlmError::RateLimitExhausted { attempts, message } => {
                TopicMapError::RateLimitExhausted { attempts, message }
            }
            LlmError::RateLimited(message) => TopicMapError::RateLimitExhausted {
                attempts: 1,
                message,
            },
            LlmError::Failed(message) => TopicMapError::Provider(message),
        }
    }
}
