use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::config::{Config, LLMProvider};
use crate::generator::workflow::WorkflowOptions;
use crate::types::{Scope, TopicMapRequest};

/// 默认配置文件名，位于当前工作目录
pub const DEFAULT_CONFIG_FILE: &str = "topicmap.toml";

/// TopicMap-RS - 由Rust与AI驱动的SEO主题地图生成器
#[derive(Parser, Debug)]
#[command(name = "topicmap-rs")]
#[command(
    about = "Researches a topic on the web and asks an LLM for a Pillar/Cluster/Spoke topical map optimized for search and AI retrieval, then exports it to CSV."
)]
#[command(version)]
pub struct Args {
    /// 核心主题
    #[arg(short, long)]
    pub topic: String,

    /// 地图规模 (focused, comprehensive)
    #[arg(short, long, default_value = "focused")]
    pub scope: Scope,

    /// 行业/细分领域
    #[arg(short, long)]
    pub industry: Option<String>,

    /// 目标受众
    #[arg(short, long)]
    pub audience: Option<String>,

    /// 地域范围
    #[arg(short, long)]
    pub geo: Option<String>,

    /// 竞争对手域名，逗号分隔
    #[arg(long)]
    pub competitors: Option<String>,

    /// 需要排除的已有内容
    #[arg(long)]
    pub existing_content: Option<String>,

    /// CSV输出目录
    #[arg(short, long)]
    pub output_path: Option<PathBuf>,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// LLM Provider (anthropic, openai, moonshot, deepseek, mistral, openrouter, ollama)
    #[arg(long)]
    pub llm_provider: Option<String>,

    /// 模型标识
    #[arg(long)]
    pub model: Option<String>,

    /// LLM API基地址
    #[arg(long)]
    pub llm_api_base_url: Option<String>,

    /// LLM API KEY，未指定时读取所选provider对应的环境变量
    #[arg(long)]
    pub llm_api_key: Option<String>,

    /// Tavily API KEY
    #[arg(long, env = "TAVILY_API_KEY", hide_env_values = true)]
    pub tavily_api_key: Option<String>,

    /// 最大tokens数
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// 温度参数
    #[arg(long)]
    pub temperature: Option<f64>,

    /// 使用文件中的调研文本，跳过Web搜索
    #[arg(long)]
    pub research_file: Option<PathBuf>,

    /// 不导出CSV
    #[arg(long)]
    pub skip_export: bool,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// 将CLI参数转换为配置
    ///
    /// 优先级：命令行参数 > 环境变量 > 配置文件 > 默认值。
    pub fn to_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(config_path) => Config::from_file(config_path)?,
            None => {
                let default_config_path = std::env::current_dir()
                    .unwrap_or_else(|_| PathBuf::from("."))
                    .join(DEFAULT_CONFIG_FILE);
                if default_config_path.exists() {
                    Config::from_file(&default_config_path)?
                } else {
                    Config::default()
                }
            }
        };

        self.apply_overrides(&mut config, |key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// 用命令行参数覆盖配置；`env` 用于按provider查找API KEY
    fn apply_overrides(
        &self,
        config: &mut Config,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<()> {
        if let Some(output_path) = &self.output_path {
            config.output_path = output_path.clone();
        }

        if let Some(provider_str) = &self.llm_provider {
            config.llm.provider = provider_str
                .parse::<LLMProvider>()
                .map_err(anyhow::Error::msg)
                .context("Invalid --llm-provider")?;
        }
        if let Some(llm_api_base_url) = &self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url.clone();
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(max_tokens) = self.max_tokens {
            config.llm.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            config.llm.temperature = temperature;
        }

        let env_llm_key = env(config.llm.provider.api_key_name()).filter(|k| !k.trim().is_empty());
        if let Some(api_key) = self.llm_api_key.clone().or(env_llm_key) {
            config.llm.api_key = api_key;
        }
        if let Some(api_key) = self.tavily_api_key.clone().filter(|k| !k.trim().is_empty()) {
            config.research.api_key = api_key;
        }

        config.verbose = config.verbose || self.verbose;
        Ok(())
    }

    /// 构建生成请求
    pub fn to_request(&self) -> TopicMapRequest {
        let non_empty = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        TopicMapRequest {
            industry: non_empty(&self.industry),
            audience: non_empty(&self.audience),
            geo_focus: non_empty(&self.geo),
            competitors: self
                .competitors
                .as_deref()
                .map(TopicMapRequest::parse_competitors)
                .unwrap_or_default(),
            existing_content: non_empty(&self.existing_content),
            ..TopicMapRequest::new(self.topic.clone(), self.scope)
        }
    }

    /// 工作流选项
    pub fn to_options(&self) -> WorkflowOptions {
        WorkflowOptions {
            research_file: self.research_file.clone(),
            skip_export: self.skip_export,
        }
    }
}

// Include tests
#[cfg(test)]
mod tests;
