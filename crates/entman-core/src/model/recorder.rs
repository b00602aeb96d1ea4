// ── Recorder report and maintenance results ──

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Row count recorded for one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub entity_id: String,
    pub record_count: u64,
}

/// Entities with the most recorded history, heaviest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecorderReport {
    pub entities_analyzed: u64,
    pub total_records: u64,
    pub entries: Vec<ReportEntry>,
    /// Where Home Assistant stored the full JSON report.
    pub download_url: Option<String>,
}

impl RecorderReport {
    /// Number of rows shown in summaries.
    pub const SUMMARY_ROWS: usize = 10;

    /// The first `n` entries.
    pub fn top(&self, n: usize) -> &[ReportEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// Ids in the report, for restricting the entity list to them.
    pub fn entity_ids(&self) -> HashSet<String> {
        self.entries.iter().map(|e| e.entity_id.clone()).collect()
    }
}

/// Result of rewriting the recorder exclusion config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecorderConfigOutcome {
    pub message: String,
    pub excluded_entities: Vec<String>,
    pub excluded_domains: Vec<String>,
}

/// Result of purging history for all excluded entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeOutcome {
    pub message: String,
    pub purged_entities: Vec<String>,
}

/// Outcome of asking the recorder for a short history query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecorderHealth {
    /// The history API answered with `rows` state rows.
    Healthy { rows: usize },
    /// The history API failed or returned something other than a list.
    Unavailable { reason: String },
}

impl RecorderHealth {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy { .. })
    }

    /// What to try next.
    pub fn guidance(&self) -> &'static [&'static str] {
        match self {
            Self::Healthy { .. } => &[
                "Check that the entity_manager integration is loaded",
                "Look for entity_manager errors in the Home Assistant log",
                "Generate the recorder report again",
            ],
            Self::Unavailable { .. } => &[
                "Make sure `recorder:` is present in configuration.yaml",
                "Check that the recorder database exists and is readable",
                "Restart Home Assistant",
                "Look for recorder errors in the Home Assistant log",
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_serializes_with_status_tag() {
        let json = serde_json::to_value(RecorderHealth::Healthy { rows: 3 })
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(json, serde_json::json!({"status": "healthy", "rows": 3}));
    }

    #[test]
    fn unavailable_guidance_points_at_configuration() {
        let health = RecorderHealth::Unavailable {
            reason: "HTTP 500".into(),
        };
        assert!(!health.is_healthy());
        assert!(health.guidance()[0].contains("configuration.yaml"));
    }
}
