//! 主题地图生成使用的提示词

use crate::types::TopicMapRequest;
use crate::utils::json_repair::{head_chars, tail_chars};

/// 修复请求中附带的原始输出长度上限（字符）
pub const REPAIR_EXCERPT_CHARS: usize = 8000;

/// 续写请求中附带的原始输出尾部长度（字符）
pub const CONTINUATION_TAIL_CHARS: usize = 500;

pub const SYSTEM_PROMPT: &str = r#"You are a senior SEO content strategist who designs topical-authority maps and content architectures optimized for retrieval-augmented generation (RAG). Analyze the research you are given and produce a complete topical map.

Respond with valid JSON only: a single JSON array that matches the required schema. Do not add markdown or explanations.

## Architecture of the map

### Hierarchy
- **Pillar**: the broadest, central topic. A map has exactly ONE pillar and it covers the whole subject. Its content type is always "Pillar Page".
- **Cluster**: a major subtopic branching from the Pillar; each cluster is a distinct facet of the pillar topic. Focused maps use 3-5 clusters, comprehensive maps 8-15.
- **Spoke**: a narrow topic supporting one cluster; each spoke answers one precise question, comparison or subtopic. Plan 2-5 spokes per cluster for focused maps and 4-10 for comprehensive maps.

### Internal linking
- Each Cluster links up to the Pillar.
- Each Spoke links up to its parent Cluster.
- Spokes under the same Cluster link to each other.
- Add cross-cluster links wherever topics are naturally related.

### Titles
- Every title contains the primary keyword or a close semantic variant.
- Titles follow the search intent: questions for informational topics, action phrases for transactional ones.
- Titles describe the content accurately; no clickbait.

### User intent
- **Informational**: the searcher wants to learn or understand ("what is", "how to", "why does").
- **Navigational**: the searcher is looking for a specific page or brand.
- **Commercial Investigation**: the searcher compares options before buying ("best", "vs", "review", "top").
- **Transactional**: the searcher is ready to act ("buy", "hire", "get quote", "sign up").

### Semantic entities
- Give 3-5 entities per topic that a knowledge graph expects to co-occur with it.
- Mix related concepts, named entities (people, organizations, tools), technical terms and co-occurring topics.
- Prefer entities that would show up in a knowledge panel or in entity-based search.

### RAG directions
Give concrete structural and formatting instructions so the finished article is easy for AI systems to retrieve. Cover:
- inverted-pyramid openings that lead with the direct answer
- atomic, self-contained sections of 150-400 words
- summary blocks closing each major section
- question-style headings that mirror conversational queries
- the data points or definitions to front-load
- how to structure the page to win featured snippets

### People Also Ask
- List 3-5 real or highly plausible People Also Ask questions per topic.
- Phrase them exactly as a user would type or speak them.
- Favor questions that recur across many results.
- Mix definitional, procedural and comparative questions.

### Citations
- Name the specific claims, statistics or facts in each topic that NEED a citation.
- Format each as "[Claim or data point] — [likely source type, or the specific source if the research found one]".
- Prefer government data, industry reports, peer-reviewed research and authoritative organizations.
- Every topic needs at least 1-2 citation needs.
- When the research surfaced concrete statistics, include them with their sources.

### Priority score
| Score | Criteria |
|-------|----------|
| 5 | High search volume + high intent + low competition + strong information gain potential |
| 4 | High volume + medium competition OR medium volume + low competition + clear differentiation |
| 3 | Medium volume + medium competition; solid supporting content |
| 2 | Lower volume but valuable for topical completeness and internal linking |
| 1 | Long-tail or highly competitive; nice-to-have for comprehensive coverage |
"#;

const ENTRY_SCHEMA: &str = r#"```json
{
  "level": "Pillar|Cluster|Spoke",
  "content_title": "SEO-optimized title",
  "primary_keyword": "main target keyword",
  "user_intent": "Informational|Navigational|Commercial Investigation|Transactional",
  "semantic_entities": ["entity1", "entity2", "entity3", "entity4", "entity5"],
  "content_type": "One of the defined content types",
  "rag_directions": "Specific formatting and structural guidance for RAG optimization",
  "paa_questions": ["Question 1?", "Question 2?", "Question 3?"],
  "citations": ["Claim needing citation — Source type", "Statistic — Source"],
  "parent_topic": "Name of parent Cluster (empty string for Pillar, Pillar name for Clusters)",
  "priority_score": 1-5,
  "word_count_range": "min-max",
  "internal_link_targets": ["Topic Title 1", "Topic Title 2"]
}
```"#;

fn or_placeholder<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => placeholder,
    }
}

/// 构建生成主题地图的用户提示词
pub fn build_user_prompt(request: &TopicMapRequest, compiled_research: &str) -> String {
    let competitors = request.competitors.join(", ");
    let competitors = if competitors.is_empty() {
        "None provided"
    } else {
        competitors.as_str()
    };

    format!(
        r#"## Input

**Topic:** {topic}
**Scope:** {scope}
**Industry/Niche:** {industry}
**Target Audience:** {audience}
**Geographic Focus:** {geo_focus}
**Competitors:** {competitors}
**Existing Content to Exclude:** {existing_content}

## Research Data

{research}

## Instructions

Using the research data above, build the complete topical map as a JSON array. Every element must use exactly these keys:

{schema}

Generate {count} topics in total.

**Return ONLY the JSON array. No markdown fences, no commentary.**"#,
        topic = request.topic,
        scope = request.scope.label(),
        industry = or_placeholder(request.industry.as_deref(), "Not specified"),
        audience = or_placeholder(request.audience.as_deref(), "Not specified"),
        geo_focus = or_placeholder(request.geo_focus.as_deref(), "Not specified"),
        competitors = competitors,
        existing_content = or_placeholder(request.existing_content.as_deref(), "None provided"),
        research = compiled_research,
        schema = ENTRY_SCHEMA,
        count = request.scope.target_count_phrase(),
    )
}

/// 构建JSON修复提示词，只附带原始输出的前8000个字符
pub fn build_repair_prompt(error: &str, raw_output: &str) -> String {
    format!(
        "The JSON below was returned but could not be parsed. Fix it so that it is valid JSON. \
Return ONLY the corrected JSON array, without markdown fences or commentary.\n\n\
Error: {}\n\nOriginal output:\n{}",
        error,
        head_chars(raw_output, REPAIR_EXCERPT_CHARS)
    )
}

/// 构建续写提示词，附带被截断输出的最后500个字符
pub fn build_continuation_prompt(raw_output: &str) -> String {
    format!(
        "The previous response was cut off. Continue the JSON array exactly where it stopped. \
Do NOT repeat entries that were already generated. Output ONLY the rest of the JSON array, \
starting with the next entry and ending with the closing bracket ].\n\n\
The previous output ended with:\n{}",
        tail_chars(raw_output, CONTINUATION_TAIL_CHARS)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Scope;

    #[test]
    fn test_user_prompt_uses_placeholders_for_missing_inputs() {
        let request = TopicMapRequest::new("Content Marketing", Scope::Focused);
        let prompt = build_user_prompt(&request, "RESEARCH-BODY");

        assert!(prompt.contains("**Topic:** Content Marketing"));
        assert!(prompt.contains("**Scope:** Focused (15-25 topics)"));
        assert!(prompt.contains("**Industry/Niche:** Not specified"));
        assert!(prompt.contains("**Geographic Focus:** Not specified"));
        assert!(prompt.contains("**Competitors:** None provided"));
        assert!(prompt.contains("**Existing Content to Exclude:** None provided"));
        assert!(prompt.contains("RESEARCH-BODY"));
        assert!(prompt.contains("Generate 15-25 topics in total."));
        assert!(prompt.contains("\"internal_link_targets\""));
    }

    #[test]
    fn test_user_prompt_interpolates_all_inputs() {
        let request = TopicMapRequest {
            topic: "Personal Injury Law".to_string(),
            scope: Scope::Comprehensive,
            industry: Some("Legal".to_string()),
            audience: Some("Accident victims".to_string()),
            geo_focus: Some("San Diego, CA".to_string()),
            competitors: vec!["nolo.com".to_string(), "findlaw.com".to_string()],
            existing_content: Some("   ".to_string()),
        };
        let prompt = build_user_prompt(&request, "");

        assert!(prompt.contains("**Industry/Niche:** Legal"));
        assert!(prompt.contains("**Target Audience:** Accident victims"));
        assert!(prompt.contains("**Geographic Focus:** San Diego, CA"));
        assert!(prompt.contains("**Competitors:** nolo.com, findlaw.com"));
        assert!(prompt.contains("**Existing Content to Exclude:** None provided"));
        assert!(prompt.contains("Generate 40-75 topics in total."));
    }

    #[test]
    fn test_repair_prompt_truncates_output() {
        let raw = "~".repeat(9000);
        let prompt = build_repair_prompt("EOF while parsing", &raw);
        assert!(prompt.contains("Error: EOF while parsing"));
        assert_eq!(prompt.matches('~').count(), REPAIR_EXCERPT_CHARS);
    }

    #[test]
    fn test_continuation_prompt_keeps_tail() {
        let raw = format!("{}TAIL-MARKER", "~".repeat(1000));
        let prompt = build_continuation_prompt(&raw);
        assert!(prompt.ends_with("TAIL-MARKER"));
        assert_eq!(prompt.matches('~').count(), 500 - "TAIL-MARKER".len());
    }
}
