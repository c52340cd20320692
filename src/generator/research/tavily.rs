//! Tavily 搜索API客户端

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ResearchConfig;
use crate::error::TopicMapError;

/// 单条搜索结果
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// 结果摘要片段
    #[serde(default)]
    pub content: Option<String>,
}

/// 一次查询的响应
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResponse {
    /// 搜索服务生成的综合回答
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

/// Web搜索服务的调用边界
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<SearchResponse, TopicMapError>;
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'a str,
    max_results: u32,
    include_answer: bool,
    include_raw_content: bool,
}

/// 基于reqwest的Tavily客户端
pub struct TavilyClient {
    client: Client,
    config: ResearchConfig,
}

impl TavilyClient {
    pub fn new(config: &ResearchConfig) -> Result<Self, TopicMapError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| TopicMapError::Research(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.config.api_base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(&self, query: &str) -> Result<SearchResponse, TopicMapError> {
        let body = SearchRequest {
            api_key: &self.config.api_key,
            query,
            search_depth: &self.config.search_depth,
            max_results: self.config.max_results,
            include_answer: true,
            include_raw_content: false,
        };

        let response = self
            .client
            .post(self.search_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| TopicMapError::Research(format!("search request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(TopicMapError::Research(format!(
                "search API returned HTTP {}: {}",
                status, text
            )));
        }

        response
            .json::<SearchResponse>()
            .await
            .map_err(|e| TopicMapError::Research(format!("invalid search response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_tolerates_missing_and_null_fields() {
        let response: SearchResponse = serde_json::from_str(
            r#"{
                "query": "seo",
                "answer": null,
                "results": [
                    {"title": "SEO Guide", "url": "https://example.com/seo", "content": "42% of clicks", "score": 0.9},
                    {"url": "https://example.com/other"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(response.answer, None);
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].title.as_deref(), Some("SEO Guide"));
        assert_eq!(response.results[1].content, None);
    }

    #[test]
    fn test_search_url_handles_trailing_slash() {
        let config = ResearchConfig {
            api_base_url: "https://api.tavily.com/".to_string(),
            ..ResearchConfig::default()
        };
        let client = TavilyClient::new(&config).unwrap();
        assert_eq!(client.search_url(), "https://api.tavily.com/search");
    }

    #[test]
    fn test_request_body_shape() {
        let body = SearchRequest {
            api_key: "tvly-test",
            query: "seo",
            search_depth: "advanced",
            max_results: 5,
            include_answer: true,
            include_raw_content: false,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["search_depth"], "advanced");
        assert_eq!(value["max_results"], 5);
        assert_eq!(value["include_answer"], true);
    }
}
