//! 把多次搜索的结果编译为一份结构化的调研文档

use std::collections::HashSet;

use crate::config::ResearchConfig;
use crate::generator::research::tavily::SearchResponse;
use crate::types::ResearchBrief;
use crate::utils::json_repair::head_chars;

/// 摘要中出现这些标记时视为数据点
const STAT_INDICATORS: [&str; 6] = ["%", "percent", "billion", "million", "thousand", "$"];

/// 标题中出现这些词时记为一种排名内容类型
const CONTENT_TYPE_HINTS: [&str; 8] = [
    "guide",
    "how to",
    "vs",
    "comparison",
    "review",
    "best",
    "checklist",
    "faq",
];

/// 数据点摘录的最大长度（字符）
const STAT_EXCERPT_CHARS: usize = 300;

/// 调研结果编译器
#[derive(Debug, Clone)]
pub struct ResearchCompiler {
    answers: Vec<String>,
    urls: Vec<String>,
    snippets: Vec<String>,
    stats: Vec<String>,
    questions: Vec<String>,
    /// 按首次出现顺序记录的内容类型计数
    content_types: Vec<(&'static str, usize)>,
    max_urls: usize,
    max_snippets: usize,
    max_stats: usize,
    max_questions: usize,
}

impl ResearchCompiler {
    pub fn new(config: &ResearchConfig) -> Self {
        Self {
            answers: Vec::new(),
            urls: Vec::new(),
            snippets: Vec::new(),
            stats: Vec::new(),
            questions: Vec::new(),
            content_types: Vec::new(),
            max_urls: config.max_urls,
            max_snippets: config.max_snippets,
            max_stats: config.max_stats,
            max_questions: config.max_questions,
        }
    }

    /// 收录一次查询的响应
    pub fn add_response(&mut self, query: &str, response: &SearchResponse) {
        if let Some(answer) = response.answer.as_deref()
            && !answer.trim().is_empty()
        {
            self.answers.push(format!("**Query: {}**\n{}", query, answer));
        }

        for hit in &response.results {
            let title = hit.title.as_deref().unwrap_or_default();
            let url = hit.url.as_deref().unwrap_or_default();
            let snippet = hit.content.as_deref().unwrap_or_default();

            if !url.is_empty() && !title.is_empty() {
                self.urls.push(format!("- [{}]({})", title, url));
            }
            if !snippet.is_empty() {
                self.snippets.push(format!("[{}]: {}", title, snippet));
                if is_statistic(snippet) {
                    self.stats
                        .push(head_chars(snippet, STAT_EXCERPT_CHARS).to_string());
                }
            }

            for text in [title, snippet] {
                self.questions.extend(extract_questions(text));
            }

            self.record_content_types(title);
        }
    }

    fn record_content_types(&mut self, title: &str) {
        let title = title.to_lowercase();
        for hint in CONTENT_TYPE_HINTS {
            if !title.contains(hint) {
                continue;
            }
            match self.content_types.iter_mut().find(|(ct, _)| *ct == hint) {
                Some((_, count)) => *count += 1,
                None => self.content_types.push((hint, 1)),
            }
        }
    }

    /// 编译调研文档，各部分去重后按上限截取
    pub fn compile(&self, topic: &str, query_count: usize) -> ResearchBrief {
        let mut sections: Vec<String> = Vec::new();

        if !self.answers.is_empty() {
            sections.push("### AI-Generated Research Summaries\n".to_string());
            sections.push(self.answers.join("\n\n"));
        }

        let unique_urls = unique(&self.urls);
        if !unique_urls.is_empty() {
            sections.push("\n### Top-Ranking URLs and Titles\n".to_string());
            sections.push(take(&unique_urls, self.max_urls).join("\n"));
        }

        let unique_snippets = unique(&self.snippets);
        if !unique_snippets.is_empty() {
            sections.push("\n### Content Snippets from Search Results\n".to_string());
            sections.push(take(&unique_snippets, self.max_snippets).join("\n\n"));
        }

        let unique_stats = unique(&self.stats);
        if !unique_stats.is_empty() {
            sections.push("\n### Statistics and Data Points Found\n".to_string());
            sections.extend(
                take(&unique_stats, self.max_stats)
                    .iter()
                    .map(|s| format!("- {}", s)),
            );
        }

        let unique_questions = unique(&self.questions);
        if !unique_questions.is_empty() {
            sections.push("\n### Questions Identified in Results\n".to_string());
            sections.extend(
                take(&unique_questions, self.max_questions)
                    .iter()
                    .map(|q| format!("- {}", q)),
            );
        }

        if !self.content_types.is_empty() {
            sections.push("\n### Content Types Observed Ranking\n".to_string());
            let mut counts = self.content_types.clone();
            // 稳定排序，计数相同的保持首次出现顺序
            counts.sort_by(|a, b| b.1.cmp(&a.1));
            sections.extend(
                counts
                    .iter()
                    .map(|(ct, count)| format!("- {}: {} occurrences", ct, count)),
            );
        }

        let url_count = unique_urls.len();
        let summary = format!(
            "Executed {} research queries for '{}'. Found {} unique URLs, {} content snippets, {} data points, and {} questions.",
            query_count,
            topic,
            url_count,
            self.snippets.len(),
            self.stats.len(),
            self.questions.len()
        );

        ResearchBrief {
            compiled_text: sections.join("\n"),
            summary,
            query_count,
            url_count,
            snippet_count: self.snippets.len(),
            stats_count: self.stats.len(),
            questions_count: self.questions.len(),
        }
    }
}

fn is_statistic(snippet: &str) -> bool {
    let lower = snippet.to_lowercase();
    STAT_INDICATORS.iter().any(|indicator| lower.contains(indicator))
}

/// 从文本中提取问句：取每个 `?` 之前最后一个句子片段，长度限定在16..200字符
fn extract_questions(text: &str) -> Vec<String> {
    if !text.contains('?') {
        return Vec::new();
    }

    let mut parts: Vec<&str> = text.split('?').collect();
    parts.pop();

    parts
        .into_iter()
        .filter_map(|part| {
            let sentence = part.trim().rsplit('.').next().unwrap_or_default().trim();
            let question = format!("{}?", sentence);
            let len = question.chars().count();
            (len > 15 && len < 200).then_some(question)
        })
        .collect()
}

/// 去重并保留首次出现的顺序
fn unique(items: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    items
        .iter()
        .map(String::as_str)
        .filter(|item| seen.insert(*item))
        .collect()
}

fn take<'a>(items: &[&'a str], limit: usize) -> Vec<&'a str> {
    items.iter().take(limit).copied().collect()
}
