use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;

use crate::config::Config;
use crate::types::GeneratedTopicMap;

pub mod csv_export;
pub mod report;

pub use csv_export::{CSV_HEADERS, export_csv, generate_filename, write_csv};
pub use report::{TopicMapStats, render_hierarchy};

/// 保存生成结果
pub fn save(config: &Config, topic: &str, result: &GeneratedTopicMap) -> Result<PathBuf> {
    println!("\n🖊️ Exporting topic map...");
    let today = Local::now().date_naive();
    let path = export_csv(&result.entries, &config.output_path, topic, today)?;
    println!(
        "💾 Saved {} topics to {}",
        result.entries.len(),
        path.display()
    );
    Ok(path)
}

/// 在终端展示统计、层级与告警
pub fn print_report(result: &GeneratedTopicMap) {
    println!("\n📊 {}", TopicMapStats::from_entries(&result.entries));
    println!("\n🌳 Topic hierarchy:\n{}", render_hierarchy(&result.entries));

    if !result.warnings.is_empty() {
        println!("\n⚠️ {} validation warning(s):", result.warnings.len());
        for warning in &result.warnings {
            println!("   - {}", warning);
        }
    }
}
