// ── Domain aggregate ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Recorder coverage of a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DomainStatus {
    Empty,
    Included,
    PartiallyExcluded,
    FullyExcluded,
}

impl DomainStatus {
    /// Derive the status from entity counts.
    pub fn from_counts(excluded: u32, total: u32) -> Self {
        if total == 0 {
            Self::Empty
        } else if excluded == 0 {
            Self::Included
        } else if excluded >= total {
            Self::FullyExcluded
        } else {
            Self::PartiallyExcluded
        }
    }
}

/// Per-domain counts and retention, keyed by `domain`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainSummary {
    pub domain: String,
    pub total_entities: u32,
    pub excluded_entities: u32,
    pub enabled_entities: u32,
    /// Effective retention when configured at domain level.
    pub recorder_days: Option<u32>,
    /// Explicit domain override vs inherited default.
    pub has_domain_config: bool,
    pub status: DomainStatus,
    /// 0–100, excluded / total.
    pub exclusion_percentage: u8,
}

/// `round(excluded / total * 100)`, 0 for an empty domain.
pub(crate) fn exclusion_percentage(excluded: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let excluded = u64::from(excluded.min(total));
    let total = u64::from(total);
    u8::try_from((excluded * 200 + total) / (total * 2)).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_from_counts() {
        assert_eq!(DomainStatus::from_counts(0, 0), DomainStatus::Empty);
        assert_eq!(DomainStatus::from_counts(0, 4), DomainStatus::Included);
        assert_eq!(DomainStatus::from_counts(1, 4), DomainStatus::PartiallyExcluded);
        assert_eq!(DomainStatus::from_counts(4, 4), DomainStatus::FullyExcluded);
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(exclusion_percentage(0, 0), 0);
        assert_eq!(exclusion_percentage(1, 3), 33);
        assert_eq!(exclusion_percentage(2, 3), 67);
        assert_eq!(exclusion_percentage(1, 8), 13);
        assert_eq!(exclusion_percentage(5, 5), 100);
    }

    #[test]
    fn status_parses_wire_names() {
        assert_eq!(
            "partially_excluded".parse::<DomainStatus>().ok(),
            Some(DomainStatus::PartiallyExcluded)
        );
        assert_eq!(DomainStatus::FullyExcluded.to_string(), "fully_excluded");
    }
}
