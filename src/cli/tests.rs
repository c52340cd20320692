#[cfg(test)]
mod tests {
    use crate::cli::Args;
    use crate::config::{Config, LLMProvider};
    use crate::types::Scope;
    use clap::Parser;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_args_requires_topic() {
        assert!(Args::try_parse_from(["topicmap-rs"]).is_err());
    }

    #[test]
    fn test_args_default_values() {
        let args = Args::try_parse_from(["topicmap-rs", "--topic", "Content Marketing"]).unwrap();

        assert_eq!(args.topic, "Content Marketing");
        assert_eq!(args.scope, Scope::Focused);
        assert!(args.industry.is_none());
        assert!(args.output_path.is_none());
        assert!(args.research_file.is_none());
        assert!(!args.skip_export);
        assert!(!args.verbose);
    }

    #[test]
    fn test_args_short_options() {
        let args = Args::try_parse_from([
            "topicmap-rs",
            "-t", "Personal Injury Law",
            "-s", "comprehensive",
            "-i", "Legal",
            "-a", "Accident victims",
            "-g", "San Diego, CA",
            "-o", "/tmp/maps",
            "-v",
        ])
        .unwrap();

        assert_eq!(args.scope, Scope::Comprehensive);
        assert_eq!(args.industry.as_deref(), Some("Legal"));
        assert_eq!(args.audience.as_deref(), Some("Accident victims"));
        assert_eq!(args.geo.as_deref(), Some("San Diego, CA"));
        assert_eq!(args.output_path, Some(PathBuf::from("/tmp/maps")));
        assert!(args.verbose);
    }

    #[test]
    fn test_args_rejects_unknown_scope() {
        assert!(Args::try_parse_from(["topicmap-rs", "-t", "SEO", "-s", "huge"]).is_err());
    }

    #[test]
    fn test_to_request_normalizes_inputs() {
        let args = Args::try_parse_from([
            "topicmap-rs",
            "--topic", "  Content Marketing ",
            "--industry", "   ",
            "--competitors", "hubspot.com, contentmarketinginstitute.com,,",
            "--existing-content", "What is content marketing",
        ])
        .unwrap();

        let request = args.to_request();
        assert_eq!(request.topic, "Content Marketing");
        assert_eq!(request.industry, None);
        assert_eq!(
            request.competitors,
            vec!["hubspot.com", "contentmarketinginstitute.com"]
        );
        assert_eq!(
            request.existing_content.as_deref(),
            Some("What is content marketing")
        );
    }

    #[test]
    fn test_overrides_apply_on_top_of_config() {
        let args = Args::try_parse_from([
            "topicmap-rs",
            "-t", "SEO",
            "--llm-provider", "openai",
            "--model", "gpt-4o",
            "--llm-api-base-url", "https://proxy.example.com/v1",
            "--max-tokens", "8000",
            "--temperature", "0.7",
            "--output-path", "./maps",
        ])
        .unwrap();

        let mut config = Config::default();
        args.apply_overrides(&mut config, no_env).unwrap();

        assert_eq!(config.llm.provider, LLMProvider::OpenAI);
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.api_base_url, "https://proxy.example.com/v1");
        assert_eq!(config.llm.max_tokens, 8000);
        assert_eq!(config.llm.temperature, 0.7);
        assert_eq!(config.output_path, PathBuf::from("./maps"));
    }

    #[test]
    fn test_llm_key_falls_back_to_provider_env() {
        let args = Args::try_parse_from(["topicmap-rs", "-t", "SEO", "--llm-provider", "deepseek"])
            .unwrap();
        let mut config = Config::default();
        args.apply_overrides(&mut config, |key| {
            (key == "DEEPSEEK_API_KEY").then(|| "sk-deepseek".to_string())
        })
        .unwrap();
        assert_eq!(config.llm.api_key, "sk-deepseek");

        let args = Args::try_parse_from(["topicmap-rs", "-t", "SEO", "--llm-api-key", "sk-flag"])
            .unwrap();
        let mut config = Config::default();
        args.apply_overrides(&mut config, |_| Some("sk-env".to_string()))
            .unwrap();
        assert_eq!(config.llm.api_key, "sk-flag");
    }

    #[test]
    fn test_empty_env_key_keeps_config_value() {
        let args = Args::try_parse_from(["topicmap-rs", "-t", "SEO"]).unwrap();
        let mut config = Config::default();
        config.llm.api_key = "sk-from-file".to_string();
        args.apply_overrides(&mut config, |_| Some("  ".to_string()))
            .unwrap();
        assert_eq!(config.llm.api_key, "sk-from-file");
    }

    #[test]
    fn test_unknown_provider_is_an_error() {
        let args = Args::try_parse_from(["topicmap-rs", "-t", "SEO", "--llm-provider", "gemini"])
            .unwrap();
        let mut config = Config::default();
        assert!(args.apply_overrides(&mut config, no_env).is_err());
    }

    #[test]
    fn test_to_config_reads_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        std::fs::write(&path, "[llm]\nmodel = \"claude-opus-4-1\"\nretry_attempts = 5\n").unwrap();

        let args = Args::try_parse_from([
            "topicmap-rs",
            "-t", "SEO",
            "-c", path.to_str().unwrap(),
        ])
        .unwrap();
        let config = args.to_config().unwrap();

        assert_eq!(config.llm.model, "claude-opus-4-1");
        assert_eq!(config.llm.retry_attempts, 5);
    }

    #[test]
    fn test_to_options() {
        let args = Args::try_parse_from([
            "topicmap-rs",
            "-t", "SEO",
            "--research-file", "research.md",
            "--skip-export",
        ])
        .unwrap();
        let options = args.to_options();
        assert_eq!(options.research_file, Some(PathBuf::from("research.md")));
        assert!(options.skip_export);
    }
}
