//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use entman_core::{
    BulkAction, BulkReport, Command, DomainAction, EnabledCategory, PanelView, RecorderCategory,
    RecorderReport, StateCategory,
};

use crate::screen::ScreenId;

/// Panel output as published to the screens.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub view: PanelView,
    pub last_loaded: Option<DateTime<Utc>>,
}

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A toast notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Warning,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// Pending confirmation action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    Bulk { action: BulkAction, count: usize },
    DomainBulk { action: DomainAction, count: usize },
    Execute(Command),
}

impl ConfirmAction {
    /// Whether the dialog should be drawn as a warning.
    pub fn is_destructive(&self) -> bool {
        match self {
            Self::Bulk { action, .. } => action.is_destructive(),
            Self::DomainBulk { action, .. } => action.is_destructive(),
            Self::Execute(cmd) => cmd.is_destructive(),
        }
    }
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bulk { action, count } => f.write_str(&action.confirm_prompt(*count)),
            Self::DomainBulk { action, count } => f.write_str(&action.confirm_prompt(*count)),
            Self::Execute(cmd) => write!(f, "{}?", cmd.describe()),
        }
    }
}

/// One edit of the entity filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEdit {
    Search(String),
    State(Option<StateCategory>),
    Integration(Option<String>),
    Domain(Option<String>),
    Enabled(Option<EnabledCategory>),
    Recorder(Option<RecorderCategory>),
    Clear,
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    ToggleHelp,

    // ── Panel data ────────────────────────────────────────────────
    StateUpdated(Arc<Snapshot>),
    Connected,
    Connecting,
    Disconnected(String),
    Reload,

    // ── Filter & selection ────────────────────────────────────────
    EditFilter(FilterEdit),
    ToggleEntity(String),
    SelectAllVisible(bool),
    ClearSelection,
    ToggleDomain(String),
    SelectAllDomains(bool),

    // ── Writes ────────────────────────────────────────────────────
    RequestBulk(BulkAction),
    RequestDomainBulk(DomainAction),
    RequestCommand(Command),
    /// A bulk run ended; `Err` when it could not start.
    BulkFinished(Result<Arc<BulkReport>, String>),

    // ── Confirm dialog ────────────────────────────────────────────
    ShowConfirm(ConfirmAction),
    ConfirmYes,
    ConfirmNo,

    // ── Export & recorder report ──────────────────────────────────
    Export,
    RequestReport,
    ReportReady(Arc<RecorderReport>),
    CloseReport,
    FilterToReport,
    CheckRecorder,

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
}
