// 调研阶段：围绕主题构建一组搜索查询，串行执行后把结果编译为一份调研文档，
// 作为生成阶段的上下文。单条查询失败只会被跳过，不会中断整个调研。

use std::time::Duration;

use chrono::Datelike;
use tracing::{debug, info, warn};

use crate::config::ResearchConfig;
use crate::types::{ResearchBrief, TopicMapRequest};

pub mod compiler;
pub mod queries;
pub mod tavily;

pub use compiler::ResearchCompiler;
pub use queries::build_research_queries;
pub use tavily::{SearchHit, SearchProvider, SearchResponse, TavilyClient};

/// 执行调研阶段
pub async fn perform_research(
    search: &dyn SearchProvider,
    config: &ResearchConfig,
    request: &TopicMapRequest,
) -> ResearchBrief {
    let year = chrono::Local::now().year();
    let queries = build_research_queries(
        &request.topic,
        request.industry.as_deref(),
        &request.competitors,
        year,
    );
    info!(queries = queries.len(), topic = %request.topic, "starting research");

    let mut compiler = ResearchCompiler::new(config);
    let mut failed = 0usize;

    for (index, query) in queries.iter().enumerate() {
        debug!(query = %query, "researching");
        match search.search(query).await {
            Ok(response) => compiler.add_response(query, &response),
            Err(err) => {
                failed += 1;
                warn!(query = %query, error = %err, "research query skipped");
            }
        }

        if index + 1 < queries.len() && config.request_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(config.request_delay_ms)).await;
        }
    }

    if failed == queries.len() {
        warn!("every research query failed, continuing without research data");
    }

    let brief = compiler.compile(&request.topic, queries.len());
    info!(
        urls = brief.url_count,
        snippets = brief.snippet_count,
        stats = brief.stats_count,
        questions = brief.questions_count,
        skipped = failed,
        "research compiled"
    );
    brief
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TopicMapError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 记录查询，并让包含指定关键字的查询失败
    struct FakeSearch {
        fail_on: &'static str,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SearchProvider for FakeSearch {
        async fn search(&self, query: &str) -> Result<SearchResponse, TopicMapError> {
            self.seen.lock().unwrap().push(query.to_string());
            if query.contains(self.fail_on) {
                return Err(TopicMapError::Research("HTTP 500".to_string()));
            }
            Ok(SearchResponse {
                answer: None,
                results: vec![SearchHit {
                    title: Some(format!("Result for {}", query)),
                    url: Some(format!("https://example.com/{}", query.replace(' ', "-"))),
                    content: Some("Plain snippet".to_string()),
                }],
            })
        }
    }

    fn fast_config() -> ResearchConfig {
        ResearchConfig {
            request_delay_ms: 0,
            ..ResearchConfig::default()
        }
    }

    #[tokio::test]
    async fn test_failed_queries_are_skipped() {
        let search = FakeSearch {
            fail_on: "mistakes",
            seen: Mutex::new(Vec::new()),
        };
        let mut request = TopicMapRequest::new("seo", Default::default());
        request.competitors = vec!["moz.com".to_string()];

        let brief = perform_research(&search, &fast_config(), &request).await;

        assert_eq!(search.seen.lock().unwrap().len(), 11);
        assert_eq!(brief.query_count, 11);
        assert_eq!(brief.url_count, 10);
        assert!(brief.compiled_text.contains("site:moz.com-seo"));
        assert!(!brief.compiled_text.contains("seo-common-mistakes"));
    }

    #[tokio::test]
    async fn test_all_queries_failing_yields_empty_brief() {
        let search = FakeSearch {
            fail_on: "seo",
            seen: Mutex::new(Vec::new()),
        };
        let request = TopicMapRequest::new("seo", Default::default());

        let brief = perform_research(&search, &fast_config(), &request).await;
        assert!(brief.compiled_text.is_empty());
        assert_eq!(brief.query_count, 10);
    }
}
