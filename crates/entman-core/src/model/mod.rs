// ── Domain model ──
//
// Canonical types the panel works with. Wire types from entman-api are
// converted in `crate::convert`, which also applies backend defaults.

mod domain;
mod entity;
mod recorder;

pub use domain::{DomainStatus, DomainSummary};
pub(crate) use domain::exclusion_percentage;
pub use entity::{DEFAULT_RECORDER_DAYS, Entity};
pub use recorder::{
    PurgeOutcome, RecorderConfigOutcome, RecorderHealth, RecorderReport, ReportEntry,
};
