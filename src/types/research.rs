use serde::{Deserialize, Serialize};

/// 调研阶段的产出：一份编译好的调研文档与统计信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchBrief {
    /// 作为上下文原样交给模型的调研文本
    pub compiled_text: String,
    /// 一句话摘要
    pub summary: String,
    pub query_count: usize,
    pub url_count: usize,
    pub snippet_count: usize,
    pub stats_count: usize,
    pub questions_count: usize,
}

impl ResearchBrief {
    /// 由外部提供的调研文本构建（跳过搜索阶段时使用）
    pub fn from_text(compiled_text: impl Into<String>) -> Self {
        let compiled_text = compiled_text.into();
        Self {
            summary: format!(
                "Using {} characters of externally supplied research.",
                compiled_text.chars().count()
            ),
            compiled_text,
            ..Default::default()
        }
    }
}
