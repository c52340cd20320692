//! 主题地图结构校验
//!
//! 对模型解码出的原始JSON做校验，而不是对类型化后的条目：缺字段、
//! 值类型错误这类问题只有在原始数据上才看得到。

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::types::{Level, TopicMapEntry, UserIntent};

/// 一条校验发现的严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// 数据不可用，整次生成失败
    Critical,
    /// 保留数据，仅告警
    Advisory,
}

/// 具体的违规类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Violation {
    MissingField(&'static str),
    InvalidLevel(String),
    InvalidIntent(String),
    InvalidPriority(String),
    SemanticEntityCount(Option<usize>),
    PaaQuestionCount(Option<usize>),
    CitationCount(Option<usize>),
    PillarCount(usize),
    ClusterParentMismatch {
        title: String,
        parent: String,
        pillar: String,
    },
    SpokeParentMismatch {
        title: String,
        parent: String,
    },
}

impl Violation {
    pub fn severity(&self) -> Severity {
        match self {
            Violation::MissingField(_) | Violation::PillarCount(_) => Severity::Critical,
            _ => Severity::Advisory,
        }
    }
}

fn count_or_non_list(count: &Option<usize>) -> String {
    match count {
        Some(n) => n.to_string(),
        None => "non-list".to_string(),
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::MissingField(field) => write!(f, "Missing required field: {}", field),
            Violation::InvalidLevel(value) => write!(
                f,
                "Invalid level '{}'. Must be one of: {}",
                value,
                Level::VALID.join(", ")
            ),
            Violation::InvalidIntent(value) => write!(
                f,
                "Invalid user_intent '{}'. Must be one of: {}",
                value,
                UserIntent::VALID.join(", ")
            ),
            Violation::InvalidPriority(value) => {
                write!(f, "Invalid priority_score '{}'. Must be integer 1-5", value)
            }
            Violation::SemanticEntityCount(count) => write!(
                f,
                "semantic_entities must have 3-5 items, got {}",
                count_or_non_list(count)
            ),
            Violation::PaaQuestionCount(count) => write!(
                f,
                "paa_questions must have at least 2 items, got {}",
                count_or_non_list(count)
            ),
            Violation::CitationCount(count) => write!(
                f,
                "citations must have at least 1 item, got {}",
                count_or_non_list(count)
            ),
            Violation::PillarCount(found) => {
                write!(f, "Expected exactly 1 Pillar, found {}", found)
            }
            Violation::ClusterParentMismatch {
                title,
                parent,
                pillar,
            } => write!(
                f,
                "Cluster '{}' parent_topic '{}' does not match Pillar title '{}'",
                title, parent, pillar
            ),
            Violation::SpokeParentMismatch { title, parent } => write!(
                f,
                "Spoke '{}' parent_topic '{}' does not match any Cluster title",
                title, parent
            ),
        }
    }
}

/// 一条校验发现；逐条目检查带有条目序号与标题
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub entry: Option<(usize, String)>,
    pub violation: Violation,
}

impl Finding {
    pub fn is_critical(&self) -> bool {
        self.violation.severity() == Severity::Critical
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.entry {
            Some((index, title)) => write!(f, "Entry {} ({}): {}", index, title, self.violation),
            None => write!(f, "{}", self.violation),
        }
    }
}

/// 取出文本形式的值，非字符串按JSON文本展示
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn list_len(value: Option<&Value>) -> Option<usize> {
    value.and_then(Value::as_array).map(Vec::len)
}

/// 校验单个条目
///
/// 缺少任何必填字段时只报告缺失字段，其余检查跳过，以免在残缺数据上连锁报错。
pub fn validate_entry(entry: &Value) -> Vec<Violation> {
    let missing: Vec<Violation> = TopicMapEntry::REQUIRED_FIELDS
        .iter()
        .filter(|field| entry.get(**field).is_none())
        .map(|field| Violation::MissingField(*field))
        .collect();
    if !missing.is_empty() {
        return missing;
    }

    let mut violations = Vec::new();

    let level = &entry["level"];
    if !level
        .as_str()
        .is_some_and(|l| Level::VALID.contains(&l))
    {
        violations.push(Violation::InvalidLevel(display_value(level)));
    }

    let intent = &entry["user_intent"];
    if !intent
        .as_str()
        .is_some_and(|i| UserIntent::VALID.contains(&i))
    {
        violations.push(Violation::InvalidIntent(display_value(intent)));
    }

    let score = &entry["priority_score"];
    if !score.as_i64().is_some_and(|s| (1..=5).contains(&s)) {
        violations.push(Violation::InvalidPriority(display_value(score)));
    }

    let entities = list_len(entry.get("semantic_entities"));
    if !entities.is_some_and(|n| (3..=5).contains(&n)) {
        violations.push(Violation::SemanticEntityCount(entities));
    }

    let paa = list_len(entry.get("paa_questions"));
    if !paa.is_some_and(|n| n >= 2) {
        violations.push(Violation::PaaQuestionCount(paa));
    }

    let citations = list_len(entry.get("citations"));
    if !citations.is_some_and(|n| n >= 1) {
        violations.push(Violation::CitationCount(citations));
    }

    violations
}

/// 校验整份主题地图，返回空列表表示完全合法
pub fn validate(entries: &[Value]) -> Vec<Finding> {
    let mut findings = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        let title = entry
            .get("content_title")
            .map(display_value)
            .unwrap_or_else(|| "unknown".to_string());
        for violation in validate_entry(entry) {
            findings.push(Finding {
                entry: Some((index, title.clone())),
                violation,
            });
        }
    }

    if !findings.is_empty() {
        return findings;
    }

    findings.extend(validate_structure(entries).into_iter().map(|violation| Finding {
        entry: None,
        violation,
    }));
    findings
}

/// 层级结构检查：唯一Pillar、Cluster与Spoke的父级指向
fn validate_structure(entries: &[Value]) -> Vec<Violation> {
    let with_level = |level: &str| -> Vec<&Value> {
        entries
            .iter()
            .filter(|e| e["level"].as_str() == Some(level))
            .collect()
    };
    let pillars = with_level("Pillar");
    let clusters = with_level("Cluster");
    let spokes = with_level("Spoke");

    if pillars.len() != 1 {
        return vec![Violation::PillarCount(pillars.len())];
    }

    let pillar_title = display_value(&pillars[0]["content_title"]);
    let cluster_titles: HashSet<String> = clusters
        .iter()
        .map(|c| display_value(&c["content_title"]))
        .collect();

    let mut violations = Vec::new();

    for cluster in &clusters {
        if let Some(parent) = non_empty_parent(cluster)
            && parent != pillar_title
        {
            violations.push(Violation::ClusterParentMismatch {
                title: display_value(&cluster["content_title"]),
                parent,
                pillar: pillar_title.clone(),
            });
        }
    }

    for spoke in &spokes {
        if let Some(parent) = non_empty_parent(spoke)
            && !cluster_titles.contains(&parent)
        {
            violations.push(Violation::SpokeParentMismatch {
                title: display_value(&spoke["content_title"]),
                parent,
            });
        }
    }

    violations
}

/// 空串或null的父级不参与检查
fn non_empty_parent(entry: &Value) -> Option<String> {
    match entry.get("parent_topic") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(other) => Some(display_value(other)),
    }
}

/// 取前 `limit` 条严重问题的消息
pub fn critical_messages(findings: &[Finding], limit: usize) -> Vec<String> {
    findings
        .iter()
        .filter(|f| f.is_critical())
        .take(limit)
        .map(Finding::to_string)
        .collect()
}
