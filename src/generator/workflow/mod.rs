use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::config::Config;
use crate::generator::context::GeneratorContext;
use crate::generator::outlet;
use crate::generator::research::perform_research;
use crate::generator::topic_map::TopicMapGenerator;
use crate::types::{GeneratedTopicMap, ResearchBrief, TopicMapRequest};

/// 时间跟踪作用域
pub struct TimingScope {
    start_time: Instant,
    phase_start_times: Vec<(String, Instant)>,
    /// 按结束顺序记录的阶段耗时
    phase_durations: Vec<(String, Duration)>,
}

impl Default for TimingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingScope {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            phase_start_times: Vec::new(),
            phase_durations: Vec::new(),
        }
    }

    /// 开始一个新的阶段计时
    pub fn start_phase(&mut self, phase_name: &str) {
        self.phase_start_times.retain(|(name, _)| name != phase_name);
        self.phase_start_times
            .push((phase_name.to_string(), Instant::now()));
    }

    /// 结束一个阶段的计时
    pub fn end_phase(&mut self, phase_name: &str) -> Option<Duration> {
        let position = self
            .phase_start_times
            .iter()
            .position(|(name, _)| name == phase_name)?;
        let (name, start_time) = self.phase_start_times.remove(position);
        let duration = start_time.elapsed();
        self.phase_durations.push((name, duration));
        Some(duration)
    }

    /// 获取总执行时间
    pub fn get_total_duration(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// 获取所有阶段的执行时间
    pub fn get_phase_durations(&self) -> &[(String, Duration)] {
        &self.phase_durations
    }

    /// 获取格式化的执行时间报告
    pub fn generate_timing_report(&self) -> String {
        let mut report = format!(
            "Total time: {:.2}s\n",
            self.get_total_duration().as_secs_f64()
        );

        if !self.phase_durations.is_empty() {
            report.push_str("\nPhase timings:\n");
            for (phase, duration) in &self.phase_durations {
                report.push_str(&format!("- {}: {:.3}s\n", phase, duration.as_secs_f64()));
            }
        }

        report
    }
}

/// 时间跟踪常量
pub struct TimingKeys;

impl TimingKeys {
    pub const RESEARCH: &'static str = "research";
    pub const GENERATION: &'static str = "generation";
    pub const EXPORT: &'static str = "export";
}

/// 工作流选项
#[derive(Debug, Clone, Default)]
pub struct WorkflowOptions {
    /// 直接使用该文件中的调研文本，跳过搜索
    pub research_file: Option<PathBuf>,
    /// 不导出CSV
    pub skip_export: bool,
}

/// 一次工作流的产出
#[derive(Debug, Clone)]
pub struct WorkflowOutcome {
    pub research: ResearchBrief,
    pub topic_map: GeneratedTopicMap,
    pub csv_path: Option<PathBuf>,
}

/// 启动主题地图生成工作流
pub async fn launch(
    config: &Config,
    request: &TopicMapRequest,
    options: &WorkflowOptions,
) -> Result<WorkflowOutcome> {
    // 在任何网络调用之前检查凭据
    config.ensure_credentials(options.research_file.is_none())?;

    let context = GeneratorContext::new(config.clone())?;
    run(&context, request, options).await
}

/// 在给定上下文中执行 调研 → 生成 → 展示 → 导出
pub async fn run(
    context: &GeneratorContext,
    request: &TopicMapRequest,
    options: &WorkflowOptions,
) -> Result<WorkflowOutcome> {
    let mut timing = TimingScope::new();

    timing.start_phase(TimingKeys::RESEARCH);
    let research = match &options.research_file {
        Some(path) => {
            println!("📄 Loading research from {}", path.display());
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read research file: {}", path.display()))?;
            ResearchBrief::from_text(text)
        }
        None => {
            println!("🔍 Researching '{}'...", request.topic);
            perform_research(context.search.as_ref(), &context.config.research, request).await
        }
    };
    timing.end_phase(TimingKeys::RESEARCH);
    println!("✓ {}", research.summary);

    timing.start_phase(TimingKeys::GENERATION);
    println!(
        "🤖 Generating a {} topic map with {}...",
        request.scope, context.config.llm.model
    );
    let generator = TopicMapGenerator::new(context.llm_client.clone());
    let topic_map = generator.generate(request, &research.compiled_text).await?;
    timing.end_phase(TimingKeys::GENERATION);
    println!("✓ Generated {} topics", topic_map.entries.len());

    outlet::print_report(&topic_map);

    let csv_path = if options.skip_export {
        println!("\n⏭️ CSV export skipped");
        None
    } else {
        timing.start_phase(TimingKeys::EXPORT);
        let path = outlet::save(&context.config, &request.topic, &topic_map)?;
        timing.end_phase(TimingKeys::EXPORT);
        Some(path)
    };

    println!("\n⏱️ {}", timing.generate_timing_report());

    Ok(WorkflowOutcome {
        research,
        topic_map,
        csv_path,
    })
}
