//! 主题地图生成编排
//!
//! 一次生成包括：主请求、解码失败时的一次修复请求、输出被截断时的一次续写请求，
//! 最后对原始JSON做结构校验。所有调用严格串行。

use serde_json::Value;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::error::TopicMapError;
use crate::llm::client::LLMClient;
use crate::types::{GeneratedTopicMap, TopicMapEntry, TopicMapRequest};
use crate::utils::json_repair::{
    DecodeError, looks_truncated, parse_continuation, parse_json_array, salvage_truncated,
};
use crate::validator::{self, Finding};

pub mod prompts;

use prompts::{SYSTEM_PROMPT, build_continuation_prompt, build_repair_prompt, build_user_prompt};

/// 校验失败时最多带出的严重问题条数
pub const MAX_REPORTED_VIOLATIONS: usize = 10;

/// 无法抢救原始输出时，续写结果至少要超过这个条数才单独采用
pub const MIN_STANDALONE_CONTINUATION: usize = 10;

/// 主题地图生成器
#[derive(Clone)]
pub struct TopicMapGenerator {
    llm_client: LLMClient,
}

impl TopicMapGenerator {
    pub fn new(llm_client: LLMClient) -> Self {
        Self { llm_client }
    }

    /// 根据用户参数与编译好的调研文本生成主题地图
    ///
    /// 严重的校验问题会让整次生成失败；其余问题作为 `warnings` 随结果返回。
    pub async fn generate(
        &self,
        request: &TopicMapRequest,
        compiled_research: &str,
    ) -> Result<GeneratedTopicMap, TopicMapError> {
        let run_id = Uuid::new_v4();
        let span = info_span!(
            "generate_topic_map",
            %run_id,
            topic = %request.topic,
            scope = %request.scope
        );
        self.generate_in_span(request, compiled_research)
            .instrument(span)
            .await
    }

    async fn generate_in_span(
        &self,
        request: &TopicMapRequest,
        compiled_research: &str,
    ) -> Result<GeneratedTopicMap, TopicMapError> {
        if request.topic.trim().is_empty() {
            return Err(TopicMapError::InvalidInput(
                "topic must not be empty".to_string(),
            ));
        }

        let user_prompt = build_user_prompt(request, compiled_research);
        info!(
            research_chars = compiled_research.len(),
            "requesting topic map from the model"
        );
        let raw = self.llm_client.prompt(SYSTEM_PROMPT, &user_prompt).await?;
        debug!(response_chars = raw.len(), "received model response");

        let parsed = match parse_json_array(&raw) {
            Ok(entries) => Ok(entries),
            Err(err) => self.repair(&raw, &err).await?,
        };

        let (mut entries, parse_failure) = match parsed {
            Ok(entries) => (entries, None),
            Err(err) => (Vec::new(), Some(err)),
        };

        if looks_truncated(&raw) {
            warn!("model response looks truncated, requesting a continuation");
            if let Some(completed) = self.continue_truncated(&raw, !entries.is_empty()).await? {
                entries = completed;
            }
        }

        if entries.is_empty() {
            return Err(match parse_failure {
                Some(err) => TopicMapError::Parse {
                    message: err.to_string(),
                },
                None => TopicMapError::EmptyResult,
            });
        }

        let warnings = check_entries(&entries)?;
        let entries: Vec<TopicMapEntry> = entries.iter().map(TopicMapEntry::from_value).collect();
        info!(
            entries = entries.len(),
            warnings = warnings.len(),
            "topic map generated"
        );

        Ok(GeneratedTopicMap { entries, warnings })
    }

    /// 把解码错误和原始输出交给模型修复，修复结果仍解码失败时返回内层的 `Err`
    async fn repair(
        &self,
        raw: &str,
        error: &DecodeError,
    ) -> Result<Result<Vec<Value>, DecodeError>, TopicMapError> {
        warn!(%error, "model response is not a valid JSON array, requesting a repair");
        let repaired = self
            .llm_client
            .prompt(SYSTEM_PROMPT, &build_repair_prompt(&error.to_string(), raw))
            .await?;

        let result = parse_json_array(&repaired);
        match &result {
            Ok(entries) => info!(entries = entries.len(), "repaired model response"),
            Err(err) => warn!(error = %err, "repaired response still does not decode"),
        }
        Ok(result)
    }

    /// 续写被截断的输出，返回 `None` 表示保留已有结果
    async fn continue_truncated(
        &self,
        raw: &str,
        has_entries: bool,
    ) -> Result<Option<Vec<Value>>, TopicMapError> {
        let text = match self
            .llm_client
            .prompt(SYSTEM_PROMPT, &build_continuation_prompt(raw))
            .await
        {
            Ok(text) => text,
            Err(err) if has_entries => {
                warn!(error = %err, "continuation request failed, keeping the entries already parsed");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let continuation = match parse_continuation(&text) {
            Ok(items) if !items.is_empty() => items,
            Ok(_) => {
                debug!("continuation is empty");
                return Ok(None);
            }
            Err(err) => {
                warn!(error = %err, "continuation does not decode, ignoring it");
                return Ok(None);
            }
        };

        match salvage_truncated(raw) {
            Some(Ok(mut salvaged)) => {
                info!(
                    salvaged = salvaged.len(),
                    continued = continuation.len(),
                    "merged truncated response with its continuation"
                );
                salvaged.extend(continuation);
                Ok(Some(salvaged))
            }
            Some(Err(_)) if continuation.len() > MIN_STANDALONE_CONTINUATION => {
                info!(
                    continued = continuation.len(),
                    "truncated response could not be salvaged, using the continuation alone"
                );
                Ok(Some(continuation))
            }
            Some(Err(err)) => {
                warn!(
                    error = %err,
                    continued = continuation.len(),
                    "truncated response could not be salvaged and the continuation is too short"
                );
                Ok(None)
            }
            None => {
                warn!(
                    continued = continuation.len(),
                    "truncated response has no complete object, ignoring the continuation"
                );
                Ok(None)
            }
        }
    }
}

/// 校验条目，有严重问题时失败，否则返回告警
fn check_entries(entries: &[Value]) -> Result<Vec<Finding>, TopicMapError> {
    let findings = validator::validate(entries);

    let critical = validator::critical_messages(&findings, MAX_REPORTED_VIOLATIONS);
    if !critical.is_empty() {
        return Err(TopicMapError::Validation { messages: critical });
    }

    for finding in &findings {
        warn!(finding = %finding, "topic map validation warning");
    }
    Ok(findings)
}
