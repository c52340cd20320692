use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::TopicMapError;
use crate::types::{TopicMapEntry, suggested_word_count};

/// 导出列，顺序固定
pub const CSV_HEADERS: [&str; 13] = [
    "Level",
    "Content Title",
    "Primary Keyword",
    "User Intent",
    "Semantic Entities",
    "Content Type",
    "RAG Directions",
    "PAA Questions",
    "Citations",
    "Parent Topic",
    "Priority Score",
    "Word Count Range",
    "Internal Link Targets",
];

/// 列表字段的分隔符；元素本身含 `|` 时无法还原
pub const LIST_SEPARATOR: &str = "|";

static NON_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// 模型未给出字数范围时，按内容类型补上建议值
fn word_count_range(entry: &TopicMapEntry) -> String {
    match entry.word_count_range.trim() {
        "" => suggested_word_count(&entry.content_type)
            .unwrap_or_default()
            .to_string(),
        range => range.to_string(),
    }
}

fn record(entry: &TopicMapEntry) -> [String; 13] {
    [
        entry.level.to_string(),
        entry.content_title.clone(),
        entry.primary_keyword.clone(),
        entry.user_intent.to_string(),
        entry.semantic_entities.join(LIST_SEPARATOR),
        entry.content_type.clone(),
        entry.rag_directions.clone(),
        entry.paa_questions.join(LIST_SEPARATOR),
        entry.citations.join(LIST_SEPARATOR),
        entry.parent_topic.clone(),
        entry.priority_score.to_string(),
        word_count_range(entry),
        entry.internal_link_targets.join(LIST_SEPARATOR),
    ]
}

/// 将条目写为CSV（含表头）
pub fn write_csv<W: io::Write>(entries: &[TopicMapEntry], writer: W) -> Result<(), TopicMapError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(CSV_HEADERS)
        .map_err(|e| TopicMapError::Export(e.to_string()))?;
    for entry in entries {
        csv_writer
            .write_record(record(entry))
            .map_err(|e| TopicMapError::Export(e.to_string()))?;
    }
    csv_writer
        .flush()
        .map_err(|e| TopicMapError::Export(e.to_string()))
}

/// 生成导出文件名：`topical_map_{slug}_{YYYYMMDD}.csv`
pub fn generate_filename(topic: &str, date: NaiveDate) -> String {
    let lower = topic.to_lowercase();
    let slug = NON_SLUG_CHARS.replace_all(&lower, "_");
    format!(
        "topical_map_{}_{}.csv",
        slug.trim_matches('_'),
        date.format("%Y%m%d")
    )
}

/// 导出到目录，返回写入的文件路径
pub fn export_csv(
    entries: &[TopicMapEntry],
    output_dir: &Path,
    topic: &str,
    date: NaiveDate,
) -> Result<PathBuf, TopicMapError> {
    fs::create_dir_all(output_dir).map_err(|e| {
        TopicMapError::Export(format!(
            "cannot create output directory {}: {}",
            output_dir.display(),
            e
        ))
    })?;

    let path = output_dir.join(generate_filename(topic, date));
    let file = fs::File::create(&path).map_err(|e| {
        TopicMapError::Export(format!("cannot create {}: {}", path.display(), e))
    })?;
    write_csv(entries, io::BufWriter::new(file))?;
    Ok(path)
}
