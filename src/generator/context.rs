use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use crate::generator::research::{SearchProvider, TavilyClient};
use crate::llm::client::LLMClient;

#[derive(Clone)]
pub struct GeneratorContext {
    /// LLM调用器，用于与AI通信。
    pub llm_client: LLMClient,
    /// Web搜索服务
    pub search: Arc<dyn SearchProvider>,
    /// 配置
    pub config: Config,
}

impl GeneratorContext {
    /// 根据配置创建生成器上下文
    pub fn new(config: Config) -> Result<Self> {
        let llm_client = LLMClient::new(config.llm.clone())?;
        let search = Arc::new(TavilyClient::new(&config.research)?);
        Ok(Self::with_components(config, llm_client, search))
    }

    /// 使用指定的LLM客户端与搜索服务创建上下文
    pub fn with_components(
        config: Config,
        llm_client: LLMClient,
        search: Arc<dyn SearchProvider>,
    ) -> Self {
        Self {
            llm_client,
            search,
            config,
        }
    }
}
