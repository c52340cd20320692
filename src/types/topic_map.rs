use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 主题地图层级
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Level {
    Pillar,
    Cluster,
    Spoke,
    /// 模型给出的非法层级，保留原值以便告警和导出
    Other(String),
}

impl Level {
    pub const VALID: [&'static str; 3] = ["Pillar", "Cluster", "Spoke"];

    pub fn as_str(&self) -> &str {
        match self {
            Level::Pillar => "Pillar",
            Level::Cluster => "Cluster",
            Level::Spoke => "Spoke",
            Level::Other(raw) => raw,
        }
    }
}

impl From<String> for Level {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Pillar" => Level::Pillar,
            "Cluster" => Level::Cluster,
            "Spoke" => Level::Spoke,
            _ => Level::Other(value),
        }
    }
}

impl From<Level> for String {
    fn from(value: Level) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 搜索意图分类
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserIntent {
    Informational,
    Navigational,
    CommercialInvestigation,
    Transactional,
    Other(String),
}

impl UserIntent {
    pub const VALID: [&'static str; 4] = [
        "Informational",
        "Navigational",
        "Commercial Investigation",
        "Transactional",
    ];

    pub fn as_str(&self) -> &str {
        match self {
            UserIntent::Informational => "Informational",
            UserIntent::Navigational => "Navigational",
            UserIntent::CommercialInvestigation => "Commercial Investigation",
            UserIntent::Transactional => "Transactional",
            UserIntent::Other(raw) => raw,
        }
    }
}

impl From<String> for UserIntent {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Informational" => UserIntent::Informational,
            "Navigational" => UserIntent::Navigational,
            "Commercial Investigation" => UserIntent::CommercialInvestigation,
            "Transactional" => UserIntent::Transactional,
            _ => UserIntent::Other(value),
        }
    }
}

impl From<UserIntent> for String {
    fn from(value: UserIntent) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for UserIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 主题地图中的一个节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicMapEntry {
    pub level: Level,
    pub content_title: String,
    pub primary_keyword: String,
    pub user_intent: UserIntent,
    /// 3-5个知识图谱实体
    pub semantic_entities: Vec<String>,
    /// 期望取自 [`CONTENT_TYPES`]，不做强校验
    pub content_type: String,
    pub rag_directions: String,
    pub paa_questions: Vec<String>,
    pub citations: Vec<String>,
    /// Pillar为空；Cluster指向Pillar标题；Spoke指向某个Cluster标题
    pub parent_topic: String,
    /// 1-5；模型给出非整数时为0
    pub priority_score: i64,
    /// "min-max"
    pub word_count_range: String,
    pub internal_link_targets: Vec<String>,
}

impl TopicMapEntry {
    /// 所有必填字段，顺序与导出列一致
    pub const REQUIRED_FIELDS: [&'static str; 13] = [
        "level",
        "content_title",
        "primary_keyword",
        "user_intent",
        "semantic_entities",
        "content_type",
        "rag_directions",
        "paa_questions",
        "citations",
        "parent_topic",
        "priority_score",
        "word_count_range",
        "internal_link_targets",
    ];

    /// 从模型输出的JSON对象宽松地构建条目
    ///
    /// 校验阶段已经报告过类型问题，这里只负责尽量保留数据：
    /// 缺失或为null的文本视为空串，单个字符串视为单元素列表，
    /// 非整数的优先级记为0。
    pub fn from_value(value: &Value) -> Self {
        let text = |key: &str| -> String {
            match value.get(key) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            }
        };
        let list = |key: &str| -> Vec<String> {
            match value.get(key) {
                Some(Value::Array(items)) => items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
                Some(Value::String(s)) if !s.is_empty() => vec![s.clone()],
                _ => Vec::new(),
            }
        };

        Self {
            level: Level::from(text("level")),
            content_title: text("content_title"),
            primary_keyword: text("primary_keyword"),
            user_intent: UserIntent::from(text("user_intent")),
            semantic_entities: list("semantic_entities"),
            content_type: text("content_type"),
            rag_directions: text("rag_directions"),
            paa_questions: list("paa_questions"),
            citations: list("citations"),
            parent_topic: text("parent_topic"),
            priority_score: value
                .get("priority_score")
                .and_then(Value::as_i64)
                .unwrap_or(0),
            word_count_range: text("word_count_range"),
            internal_link_targets: list("internal_link_targets"),
        }
    }
}

/// 内容类型目录及建议字数范围
pub const CONTENT_TYPES: [(&str, &str); 14] = [
    ("Pillar Page", "3000-5000"),
    ("Ultimate Guide", "2500-4000"),
    ("How-To Guide", "1500-2500"),
    ("Explainer", "1000-2000"),
    ("Comparison", "1500-2500"),
    ("Listicle", "1500-3000"),
    ("FAQ Page", "1000-2000"),
    ("Case Study", "1000-2000"),
    ("Checklist", "800-1500"),
    ("Statistics/Data Page", "1000-2000"),
    ("Glossary", "1500-3000"),
    ("Service Page", "800-1500"),
    ("Resource Hub", "1000-2000"),
    ("Product Page", "800-1500"),
];

/// 查询内容类型的建议字数范围
pub fn suggested_word_count(content_type: &str) -> Option<&'static str> {
    CONTENT_TYPES
        .iter()
        .find(|(name, _)| *name == content_type)
        .map(|(_, range)| *range)
}

/// 主题地图的规模
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    #[serde(rename = "focused")]
    #[default]
    Focused,
    #[serde(rename = "comprehensive")]
    Comprehensive,
}

impl Scope {
    /// 期望的条目数量区间（仅作为提示词指令，不做强校验）
    pub fn count_range(&self) -> (usize, usize) {
        match self {
            Scope::Focused => (15, 25),
            Scope::Comprehensive => (40, 75),
        }
    }

    /// 插入提示词的目标数量短语
    pub fn target_count_phrase(&self) -> String {
        let (min, max) = self.count_range();
        format!("{}-{}", min, max)
    }

    pub fn label(&self) -> String {
        match self {
            Scope::Focused => format!("Focused ({} topics)", self.target_count_phrase()),
            Scope::Comprehensive => {
                format!("Comprehensive ({} topics)", self.target_count_phrase())
            }
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Focused => write!(f, "focused"),
            Scope::Comprehensive => write!(f, "comprehensive"),
        }
    }
}

impl std::str::FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "focused" => Ok(Scope::Focused),
            "comprehensive" => Ok(Scope::Comprehensive),
            _ => Err(format!("Unknown scope: {}", s)),
        }
    }
}

/// 一次生成请求的用户参数
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicMapRequest {
    pub topic: String,
    pub scope: Scope,
    pub industry: Option<String>,
    pub audience: Option<String>,
    pub geo_focus: Option<String>,
    pub competitors: Vec<String>,
    pub existing_content: Option<String>,
}

impl TopicMapRequest {
    pub fn new(topic: impl Into<String>, scope: Scope) -> Self {
        Self {
            topic: topic.into().trim().to_string(),
            scope,
            ..Default::default()
        }
    }

    /// 解析逗号分隔的竞争对手列表，去掉空白项
    pub fn parse_competitors(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// 一次生成的结果：条目快照加上不阻断返回的告警
#[derive(Debug, Clone)]
pub struct GeneratedTopicMap {
    pub entries: Vec<TopicMapEntry>,
    pub warnings: Vec<crate::validator::Finding>,
}

impl GeneratedTopicMap {
    pub fn pillar(&self) -> Option<&TopicMapEntry> {
        self.entries.iter().find(|e| e.level == Level::Pillar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_level_round_trip_keeps_unknown_value() {
        assert_eq!(Level::from("Cluster".to_string()), Level::Cluster);
        let odd = Level::from("Hub".to_string());
        assert_eq!(odd, Level::Other("Hub".to_string()));
        assert_eq!(odd.to_string(), "Hub");
    }

    #[test]
    fn test_user_intent_with_space() {
        assert_eq!(
            UserIntent::from("Commercial Investigation".to_string()),
            UserIntent::CommercialInvestigation
        );
        assert_eq!(
            UserIntent::CommercialInvestigation.as_str(),
            "Commercial Investigation"
        );
    }

    #[test]
    fn test_entry_from_value_is_lenient() {
        let value = json!({
            "level": "Pillar",
            "content_title": "Content Marketing",
            "primary_keyword": "content marketing",
            "user_intent": "Informational",
            "semantic_entities": ["SEO", "HubSpot", "editorial calendar"],
            "content_type": "Pillar Page",
            "rag_directions": "Lead with a definition.",
            "paa_questions": "What is content marketing?",
            "citations": ["Spend statistics — industry report"],
            "parent_topic": null,
            "priority_score": 4.5,
            "word_count_range": "3000-5000",
            "internal_link_targets": []
        });

        let entry = TopicMapEntry::from_value(&value);
        assert_eq!(entry.level, Level::Pillar);
        assert_eq!(entry.parent_topic, "");
        assert_eq!(entry.paa_questions, vec!["What is content marketing?"]);
        assert_eq!(entry.priority_score, 0);
        assert_eq!(entry.semantic_entities.len(), 3);
    }

    #[test]
    fn test_scope_phrases() {
        assert_eq!(Scope::Focused.target_count_phrase(), "15-25");
        assert_eq!(Scope::Comprehensive.target_count_phrase(), "40-75");
        assert_eq!(Scope::Focused.label(), "Focused (15-25 topics)");
        assert_eq!("Comprehensive".parse::<Scope>().unwrap(), Scope::Comprehensive);
        assert!("huge".parse::<Scope>().is_err());
    }

    #[test]
    fn test_parse_competitors() {
        assert_eq!(
            TopicMapRequest::parse_competitors(" hubspot.com, ,semrush.com ,"),
            vec!["hubspot.com", "semrush.com"]
        );
    }

    #[test]
    fn test_suggested_word_count() {
        assert_eq!(suggested_word_count("Checklist"), Some("800-1500"));
        assert_eq!(suggested_word_count("Podcast"), None);
    }
}
