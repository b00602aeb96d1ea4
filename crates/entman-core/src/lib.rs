//! Panel state machine between `entman-api` and UI consumers (CLI / TUI).
//!
//! This crate owns the business logic of the entity manager panel:
//!
//! - **[`Panel`]**: Central facade managing the session lifecycle.
//!   [`connect()`](Panel::connect) probes the integration, loads entities
//!   and domains, then spawns background tasks for command processing and
//!   optional periodic refresh. [`Panel::oneshot()`](Panel::oneshot)
//!   provides a lightweight mode for single CLI invocations.
//!
//! - **[`PanelState`]**: Explicit state container (collections, filter,
//!   selection, view mode, progress) with pure transitions, published
//!   through a `tokio::sync::watch` channel.
//!
//! - **Filter engine** ([`filter`]) and **selection tracker**
//!   ([`selection`]): pure derivations over the loaded collection.
//!
//! - **Bulk executor** ([`bulk`]): sequential batches of [`BATCH_SIZE`]
//!   with per-batch outcomes and progress.
//!
//! - **[`Command`]**: Typed single-item writes routed through an `mpsc`
//!   channel to the panel's command processor.
//!
//! - **View** ([`view`]) and **export** ([`export`]): frontend-agnostic
//!   rendering of a state snapshot.

pub mod bulk;
pub mod command;
pub mod config;
pub mod convert;
pub mod error;
pub mod export;
pub mod filter;
pub mod model;
pub mod panel;
pub mod selection;
pub mod state;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use bulk::{
    BATCH_SIZE, BatchOutcome, BulkAction, BulkProgress, BulkReport, Confirmed, DomainAction,
};
pub use command::{Command, CommandResult};
pub use config::{PanelConfig, PanelOptions, TlsVerification};
pub use error::{CoreError, ErrorKind};
pub use export::{Export, export_entities};
pub use filter::{EnabledCategory, EntityFilter, RecorderCategory, StateCategory, apply_filters};
pub use panel::{ConnectionState, Panel, REPORT_LIMIT};
pub use selection::{CheckState, PrunePolicy, Selection};
pub use state::{LoadFailure, PanelState, ViewMode};
pub use view::{PanelView, ViewBody, compose};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    DEFAULT_RECORDER_DAYS, DomainStatus, DomainSummary, Entity, PurgeOutcome,
    RecorderConfigOutcome, RecorderHealth, RecorderReport, ReportEntry,
};
