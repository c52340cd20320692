/// 参与 `site:` 查询的竞争对手数量上限
pub const MAX_COMPETITOR_QUERIES: usize = 3;

/// 为主题构建调研查询列表
///
/// 固定10条查询覆盖定义、教程、问答、数据、对比等角度；
/// 再为前3个非空的竞争对手各加一条 `site:` 查询。
pub fn build_research_queries(
    topic: &str,
    industry: Option<&str>,
    competitors: &[String],
    year: i32,
) -> Vec<String> {
    let niche_query = match industry.map(str::trim) {
        Some(industry) if !industry.is_empty() => format!("{} {}", topic, industry),
        _ => format!("{} trends", topic),
    };

    let mut queries = vec![
        topic.to_string(),
        format!("{} guide", topic),
        format!("{} how to", topic),
        format!("what is {}", topic),
        format!("{} questions people ask", topic),
        format!("{} statistics {}", topic, year),
        format!("{} vs", topic),
        format!("best {}", topic),
        niche_query,
        format!("{} common mistakes", topic),
    ];

    queries.extend(
        competitors
            .iter()
            .take(MAX_COMPETITOR_QUERIES)
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(|c| format!("site:{} {}", c, topic)),
    );

    queries
}
