//! 模型输出的JSON清洗与抢救
//!
//! 这里的启发式规则都是基于字符串位置的近似处理：去掉Markdown代码围栏、
//! 删除 `]`/`}` 前多余的逗号、在最后一个完整对象处截断后补上 `]`。
//! 它们可能误伤字符串值中的同类字符，调用方只应把结果当作尽力而为。

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```(?:json)?\s*\n?").expect("valid regex"));
static CLOSING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n?```\s*$").expect("valid regex"));
static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([\]}])").expect("valid regex"));

/// 解码失败的原因
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("{0}")]
    Syntax(String),

    #[error("expected a JSON array, found {0}")]
    NotAnArray(&'static str),
}

/// 去掉Markdown代码围栏
pub fn strip_code_fences(text: &str) -> String {
    let text = text.trim();
    let text = OPENING_FENCE.replace(text, "");
    let text = CLOSING_FENCE.replace(&text, "");
    text.trim().to_string()
}

/// 清洗模型输出：去围栏，再删除 `]`/`}` 前的多余逗号
pub fn clean_json_response(text: &str) -> String {
    let stripped = strip_code_fences(text);
    TRAILING_COMMA.replace_all(&stripped, "$1").into_owned()
}

/// 清洗后严格解码为JSON数组
pub fn parse_json_array(text: &str) -> Result<Vec<Value>, DecodeError> {
    let cleaned = clean_json_response(text);
    decode_array(&cleaned)
}

fn decode_array(cleaned: &str) -> Result<Vec<Value>, DecodeError> {
    match serde_json::from_str::<Value>(cleaned) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(other) => Err(DecodeError::NotAnArray(kind_of(&other))),
        Err(e) => Err(DecodeError::Syntax(e.to_string())),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// 判断输出是否被截断：去围栏、去尾部空白后不以 `]` 结尾
///
/// 这是近似判断：字符串值以 `]` 结尾的截断不会被识别。空输出不算截断。
/// 与只看去空白后原文末字符的做法不同，这里先去掉结尾的代码围栏，
/// 否则每个带围栏的完整回复都会触发一次续写并重复已有条目。
pub fn looks_truncated(raw: &str) -> bool {
    let stripped = strip_code_fences(raw);
    !stripped.is_empty() && !stripped.ends_with(']')
}

/// 抢救被截断的数组：在最后一个 `}` 之后截断并补上 `]`
///
/// 返回 `None` 表示没有可截断的位置（没有 `}`，或它位于开头）；
/// `Some(Err)` 表示截断后仍无法解码。
pub fn salvage_truncated(raw: &str) -> Option<Result<Vec<Value>, DecodeError>> {
    let cleaned = clean_json_response(raw);
    let last_brace = cleaned.rfind('}').filter(|&idx| idx > 0)?;
    Some(decode_array(&format!("{}]", &cleaned[..=last_brace])))
}

/// 解码续写输出
///
/// 续写通常从下一个对象开始，可能带一个前导逗号、缺少开头的 `[`，这里一并补齐。
pub fn parse_continuation(text: &str) -> Result<Vec<Value>, DecodeError> {
    let cleaned = clean_json_response(text);
    let body = cleaned.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
    if body.starts_with('[') {
        decode_array(body)
    } else {
        decode_array(&format!("[{}", body))
    }
}

/// 取前n个字符（按字符而非字节）
pub fn head_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// 取后n个字符（按字符而非字节）
pub fn tail_chars(text: &str, n: usize) -> &str {
    let total = text.chars().count();
    if total <= n {
        return text;
    }
    match text.char_indices().nth(total - n) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}
