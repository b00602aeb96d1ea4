// ── Bulk action executor ──
//
// Partitions a selection into fixed-size batches and issues one service
// call per batch, strictly in order. A failed batch is recorded and the
// run continues; there is no rollback.

use entman_api::EntityManagerClient;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CoreError;

/// Identifiers sent per service call.
pub const BATCH_SIZE: usize = 10;

/// Proof that the user confirmed a destructive action.
#[derive(Debug, Clone, Copy)]
pub struct Confirmed(());

impl Confirmed {
    /// Call only after an explicit prompt, dialog, or `--yes`.
    pub fn by_user() -> Self {
        Self(())
    }
}

/// Require confirmation for destructive operations.
pub(crate) fn ensure_confirmed(
    destructive: bool,
    confirmed: Option<Confirmed>,
    what: &str,
) -> Result<(), CoreError> {
    if destructive && confirmed.is_none() {
        return Err(CoreError::validation(format!(
            "{what} is irreversible and must be confirmed"
        )));
    }
    Ok(())
}

// ── Actions ──────────────────────────────────────────────────────────

/// Operation applied to every selected entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "action", content = "days")]
pub enum BulkAction {
    Enable,
    Disable,
    SetRecorderDays(u32),
    ExcludeRecorder,
    IncludeRecorder,
    Delete,
}

impl BulkAction {
    /// Parse an action verb (`enable`, `set-recorder-days`, ...).
    ///
    /// `days` is the raw user input for `set-recorder-days`.
    pub fn from_verb(verb: &str, days: Option<&str>) -> Result<Self, CoreError> {
        match verb {
            "enable" => Ok(Self::Enable),
            "disable" => Ok(Self::Disable),
            "exclude-recorder" => Ok(Self::ExcludeRecorder),
            "include-recorder" => Ok(Self::IncludeRecorder),
            "delete" => Ok(Self::Delete),
            "set-recorder-days" | "set-recorder" => {
                let raw = days.ok_or_else(|| {
                    CoreError::validation("set-recorder-days needs a number of days")
                })?;
                Ok(Self::SetRecorderDays(Self::parse_recorder_days(raw)?))
            }
            other => Err(CoreError::validation(format!("unknown bulk action: {other}"))),
        }
    }

    /// Validate a retention window typed by the user.
    pub fn parse_recorder_days(raw: &str) -> Result<u32, CoreError> {
        raw.trim().parse::<u32>().map_err(|_| {
            CoreError::validation(format!(
                "invalid number of days: {raw:?} (expected a non-negative integer)"
            ))
        })
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Self::Enable => "enable",
            Self::Disable => "disable",
            Self::SetRecorderDays(_) => "set-recorder-days",
            Self::ExcludeRecorder => "exclude-recorder",
            Self::IncludeRecorder => "include-recorder",
            Self::Delete => "delete",
        }
    }

    /// Progress title for this action.
    pub fn title(&self) -> String {
        match self {
            Self::Enable => "Enabling entities".into(),
            Self::Disable => "Disabling entities".into(),
            Self::SetRecorderDays(days) => format!("Setting recorder retention to {days} days"),
            Self::ExcludeRecorder => "Excluding from recorder".into(),
            Self::IncludeRecorder => "Including in recorder".into(),
            Self::Delete => "Deleting entities".into(),
        }
    }

    /// Question shown before running on `count` entities.
    pub fn confirm_prompt(&self, count: usize) -> String {
        match self {
            Self::Enable => format!("Enable {count} entities?"),
            Self::Disable => format!("Disable {count} entities?"),
            Self::SetRecorderDays(days) => {
                format!("Set {days} days of recorder retention for {count} entities?")
            }
            Self::ExcludeRecorder => format!("Exclude {count} entities from the recorder?"),
            Self::IncludeRecorder => format!("Include {count} entities in the recorder?"),
            Self::Delete => {
                format!("PERMANENTLY delete {count} entities? This cannot be undone!")
            }
        }
    }

    pub fn is_destructive(&self) -> bool {
        matches!(self, Self::Delete)
    }

    /// Issue the service call for one batch.
    pub(crate) async fn apply(
        &self,
        client: &EntityManagerClient,
        batch: &[String],
    ) -> Result<(), entman_api::Error> {
        match *self {
            Self::Enable => client.bulk_update(batch, Some(true), None).await,
            Self::Disable => client.bulk_update(batch, Some(false), None).await,
            Self::SetRecorderDays(days) => client.bulk_update(batch, None, Some(days)).await,
            Self::ExcludeRecorder => client.bulk_update_recorder_exclude(batch, true).await,
            Self::IncludeRecorder => client.bulk_update_recorder_exclude(batch, false).await,
            Self::Delete => client.bulk_delete(batch).await,
        }
    }
}

/// Operation applied to every selected domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "action", content = "days")]
pub enum DomainAction {
    Exclude,
    Include,
    SetRecorderDays(u32),
}

impl DomainAction {
    /// Validate a domain-level retention window (at least one day).
    pub fn parse_recorder_days(raw: &str) -> Result<u32, CoreError> {
        match raw.trim().parse::<u32>() {
            Ok(days) if days >= 1 => Ok(days),
            _ => Err(CoreError::validation(format!(
                "invalid number of days: {raw:?} (expected at least 1)"
            ))),
        }
    }

    pub fn is_destructive(&self) -> bool {
        matches!(self, Self::Exclude)
    }

    pub fn title(&self) -> String {
        match self {
            Self::Exclude => "Excluding domains".into(),
            Self::Include => "Including domains".into(),
            Self::SetRecorderDays(days) => format!("Setting domain retention to {days} days"),
        }
    }

    pub fn confirm_prompt(&self, count: usize) -> String {
        match self {
            Self::Exclude => format!("Exclude {count} domain(s) from the recorder?"),
            Self::Include => format!("Include {count} domain(s) in the recorder?"),
            Self::SetRecorderDays(days) => {
                format!("Set {days} days of retention for {count} domain(s)?")
            }
        }
    }
}

// ── Batching ─────────────────────────────────────────────────────────

/// Split `ids` into order-preserving chunks of at most `size`.
pub fn partition(ids: &[String], size: usize) -> Vec<&[String]> {
    ids.chunks(size.max(1)).collect()
}

/// `round(completed / total * 100)`; an empty run counts as done.
pub fn progress_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let completed = u64::try_from(completed.min(total)).unwrap_or(u64::MAX);
    let total = u64::try_from(total).unwrap_or(u64::MAX);
    u8::try_from((completed * 200 + total) / (total * 2)).unwrap_or(100)
}

/// Result of one batch call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "reason")]
pub enum BatchOutcome {
    Ok,
    Failed(String),
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// Emitted after every batch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkProgress {
    pub title: String,
    /// Batches attempted so far (1-based after the first batch).
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
    /// Ids covered by the batch just attempted.
    pub batch: Vec<String>,
    pub outcome: BatchOutcome,
}

impl BulkProgress {
    /// "Processing batch 2 of 5..."
    pub fn label(&self) -> String {
        format!("Processing batch {} of {}", self.completed, self.total)
    }
}

/// One attempted batch in a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub ids: Vec<String>,
    pub outcome: BatchOutcome,
}

/// Summary of a finished bulk run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkReport {
    pub action: BulkAction,
    pub batches: Vec<BatchResult>,
}

impl BulkReport {
    pub fn total_ids(&self) -> usize {
        self.batches.iter().map(|b| b.ids.len()).sum()
    }

    pub fn failed_batches(&self) -> impl Iterator<Item = &BatchResult> {
        self.batches.iter().filter(|b| !b.outcome.is_ok())
    }

    /// Every id whose batch failed, in selection order.
    pub fn failed_ids(&self) -> Vec<String> {
        self.failed_batches()
            .flat_map(|b| b.ids.iter().cloned())
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.failed_batches().next().is_none()
    }
}

/// Run `action` over `ids` in sequential batches of `batch_size`.
///
/// `on_progress` is called after each attempt, success or failure.
pub async fn execute_batches<F>(
    client: &EntityManagerClient,
    action: BulkAction,
    ids: &[String],
    batch_size: usize,
    mut on_progress: F,
) -> BulkReport
where
    F: FnMut(&BulkProgress),
{
    let batches = partition(ids, batch_size);
    let total = batches.len();
    let title = action.title();
    debug!(action = action.verb(), ids = ids.len(), total, "running bulk action");

    let mut results = Vec::with_capacity(total);
    for (index, batch) in batches.into_iter().enumerate() {
        let outcome = match action.apply(client, batch).await {
            Ok(()) => BatchOutcome::Ok,
            Err(e) => {
                warn!(
                    action = action.verb(),
                    batch = index + 1,
                    total,
                    error = %e,
                    "bulk batch failed"
                );
                BatchOutcome::Failed(e.to_string())
            }
        };

        on_progress(&BulkProgress {
            title: title.clone(),
            completed: index + 1,
            total,
            percent: progress_percent(index + 1, total),
            batch: batch.to_vec(),
            outcome: outcome.clone(),
        });
        results.push(BatchResult {
            ids: batch.to_vec(),
            outcome,
        });
    }

    BulkReport {
        action,
        batches: results,
    }
}
