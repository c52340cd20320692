use std::collections::{BTreeMap, HashMap};

use crate::types::{Level, TopicMapEntry};

/// 主题地图统计
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicMapStats {
    pub total: usize,
    pub pillars: usize,
    pub clusters: usize,
    pub spokes: usize,
    /// 按意图名排序的分布
    pub intents: BTreeMap<String, usize>,
}

impl TopicMapStats {
    pub fn from_entries(entries: &[TopicMapEntry]) -> Self {
        let mut stats = Self {
            total: entries.len(),
            ..Default::default()
        };
        for entry in entries {
            match entry.level {
                Level::Pillar => stats.pillars += 1,
                Level::Cluster => stats.clusters += 1,
                Level::Spoke => stats.spokes += 1,
                Level::Other(_) => {}
            }
            *stats
                .intents
                .entry(entry.user_intent.to_string())
                .or_insert(0) += 1;
        }
        stats
    }
}

impl std::fmt::Display for TopicMapStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Total Topics: {} | Pillars: {} | Clusters: {} | Spokes: {}",
            self.total, self.pillars, self.clusters, self.spokes
        )?;
        let intents: Vec<String> = self
            .intents
            .iter()
            .map(|(intent, count)| format!("{}: {}", intent, count))
            .collect();
        write!(f, "Intent Distribution: {}", intents.join(", "))
    }
}

/// 以文本树展示 Pillar → Cluster → Spoke 层级
///
/// 父级不匹配任何Cluster的Spoke不会出现在树中。
pub fn render_hierarchy(entries: &[TopicMapEntry]) -> String {
    let Some(pillar) = entries.iter().find(|e| e.level == Level::Pillar) else {
        return "⚠️ No Pillar topic found in the map.".to_string();
    };

    let clusters: Vec<&TopicMapEntry> = entries
        .iter()
        .filter(|e| e.level == Level::Cluster)
        .collect();
    let mut spokes_by_parent: HashMap<&str, Vec<&TopicMapEntry>> = HashMap::new();
    for spoke in entries.iter().filter(|e| e.level == Level::Spoke) {
        spokes_by_parent
            .entry(spoke.parent_topic.as_str())
            .or_default()
            .push(spoke);
    }

    let mut lines = vec![format!(
        "{} (Priority: {})",
        pillar.content_title, pillar.priority_score
    )];

    for (i, cluster) in clusters.iter().enumerate() {
        let last_cluster = i + 1 == clusters.len();
        let (branch, indent) = if last_cluster {
            ("└──", "    ")
        } else {
            ("├──", "│   ")
        };
        lines.push(format!(
            "{} {} (Priority: {})",
            branch, cluster.content_title, cluster.priority_score
        ));

        let children = spokes_by_parent
            .get(cluster.content_title.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default();
        for (j, spoke) in children.iter().enumerate() {
            let spoke_branch = if j + 1 == children.len() {
                "└──"
            } else {
                "├──"
            };
            lines.push(format!(
                "{}{} {} (Priority: {})",
                indent, spoke_branch, spoke.content_title, spoke.priority_score
            ));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserIntent;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn entry(level: &str, title: &str, parent: &str, intent: &str, score: i64) -> TopicMapEntry {
        TopicMapEntry::from_value(&json!({
            "level": level,
            "content_title": title,
            "user_intent": intent,
            "parent_topic": parent,
            "priority_score": score,
        }))
    }

    fn sample() -> Vec<TopicMapEntry> {
        vec![
            entry("Pillar", "SEO", "", "Informational", 5),
            entry("Cluster", "Technical SEO", "SEO", "Informational", 4),
            entry("Spoke", "Crawl Budget", "Technical SEO", "Informational", 3),
            entry("Spoke", "Site Speed", "Technical SEO", "Transactional", 2),
            entry("Cluster", "Link Building", "SEO", "Commercial Investigation", 4),
            entry("Spoke", "Guest Posting", "Link Building", "Commercial Investigation", 3),
            entry("Spoke", "Orphan", "Nowhere", "Informational", 1),
        ]
    }

    #[test]
    fn test_stats() {
        let stats = TopicMapStats::from_entries(&sample());
        assert_eq!((stats.total, stats.pillars, stats.clusters, stats.spokes), (7, 1, 2, 4));
        assert_eq!(stats.intents[UserIntent::Informational.as_str()], 4);
        assert_eq!(stats.intents["Commercial Investigation"], 2);
        assert_eq!(
            stats.to_string(),
            "Total Topics: 7 | Pillars: 1 | Clusters: 2 | Spokes: 4\nIntent Distribution: Commercial Investigation: 2, Informational: 4, Transactional: 1"
        );
    }

    #[test]
    fn test_render_hierarchy() {
        assert_eq!(
            render_hierarchy(&sample()),
            [
                "SEO (Priority: 5)",
                "├── Technical SEO (Priority: 4)",
                "│   ├── Crawl Budget (Priority: 3)",
                "│   └── Site Speed (Priority: 2)",
                "└── Link Building (Priority: 4)",
                "    └── Guest Posting (Priority: 3)",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_render_hierarchy_without_pillar() {
        let entries = vec![entry("Cluster", "Technical SEO", "SEO", "Informational", 4)];
        assert!(render_hierarchy(&entries).contains("No Pillar topic found"));
    }
}
