//! Application core: event loop, screen management, action dispatch.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Tabs},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use entman_core::{
    BulkReport, Command, CommandResult, Confirmed, ConnectionState, EntityFilter, Panel,
    REPORT_LIMIT, RecorderHealth, RecorderReport,
};

use crate::action::{Action, ConfirmAction, FilterEdit, Notification, NotificationLevel, Snapshot};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;
use crate::widgets::popup;

const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

/// Connection status as seen by the TUI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Apply one filter edit in place.
pub fn apply_filter_edit(filter: &mut EntityFilter, edit: FilterEdit) {
    match edit {
        FilterEdit::Search(search) => filter.search = search,
        FilterEdit::State(state) => filter.state = state,
        FilterEdit::Integration(integration) => filter.integration = integration,
        FilterEdit::Domain(domain) => filter.domain = domain,
        FilterEdit::Enabled(enabled) => filter.enabled = enabled,
        FilterEdit::Recorder(recorder) => filter.recorder = recorder,
        FilterEdit::Clear => filter.clear(),
    }
    // Typing a search leaves the recorder report view.
    if filter.only_ids.is_some() && !filter.search.is_empty() {
        filter.only_ids = None;
    }
}

/// Notification text for a finished single-item command.
pub fn result_message(result: &CommandResult, what: &str) -> String {
    match result {
        CommandResult::Ok => format!("{what}: done"),
        CommandResult::Message(message) => message.clone(),
        CommandResult::RecorderConfig(outcome) => format!(
            "{} ({} entities excluded)",
            outcome.message,
            outcome.excluded_entities.len()
        ),
        CommandResult::Purged(outcome) => format!(
            "{} ({} entities purged)",
            outcome.message,
            outcome.purged_entities.len()
        ),
    }
}

/// Notification for a finished bulk run.
pub fn bulk_notification(report: &BulkReport) -> Notification {
    let failed: Vec<_> = report.failed_batches().collect();
    if failed.is_empty() {
        Notification::success(format!(
            "{}: {} entities in {} batches",
            report.action.title(),
            report.total_ids(),
            report.batches.len()
        ))
    } else {
        Notification::warning(format!(
            "{}: {} of {} batches failed",
            report.action.title(),
            failed.len(),
            report.batches.len()
        ))
    }
}

/// Notification for a recorder health check.
pub fn recorder_notification(health: &RecorderHealth) -> Notification {
    match health {
        RecorderHealth::Healthy { rows } => Notification::success(format!(
            "Recorder is answering ({rows} history rows); press p to retry the report"
        )),
        RecorderHealth::Unavailable { reason } => {
            let hint = health.guidance().first().copied().unwrap_or_default();
            Notification::error(format!("Recorder is not answering: {reason}. {hint}"))
        }
    }
}

/// Top-level application state and event loop.
pub struct App {
    active_screen: ScreenId,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    connection_status: ConnectionStatus,
    help_visible: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    panel: Panel,
    /// Cancellation token for the data bridge task.
    data_cancel: CancellationToken,
    /// Latest panel output, for the header and overlays.
    snapshot: Option<Arc<Snapshot>>,
    /// Pending confirmation dialog (blocks other input while active).
    pending_confirm: Option<ConfirmAction>,
    notification: Option<(Notification, Instant)>,
    /// Last recorder report, kept for "show these entities".
    report: Option<Arc<RecorderReport>>,
    /// A bulk run is in flight; a second one is refused.
    bulk_running: bool,
    export_dir: PathBuf,
}

impl App {
    pub fn new(panel: Panel, export_dir: PathBuf) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let screens: HashMap<ScreenId, Box<dyn Component>> =
            create_screens().into_iter().collect();

        Self {
            active_screen: ScreenId::default(),
            screens,
            running: true,
            connection_status: ConnectionStatus::default(),
            help_visible: false,
            action_tx,
            action_rx,
            panel,
            data_cancel: CancellationToken::new(),
            snapshot: None,
            pending_confirm: None,
            notification: None,
            report: None,
            bulk_running: false,
            export_dir,
        }
    }

    /// Run the main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }

        let panel = self.panel.clone();
        let cancel = self.data_cancel.clone();
        let tx = self.action_tx.clone();
        let bridge = tokio::spawn(async move {
            crate::data_bridge::spawn_data_bridge(panel, tx, cancel).await;
        });

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(action.clone())?;
                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        events.stop();
        if let Err(e) = bridge.await {
            warn!(error = %e, "data bridge task failed");
        }
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here;
    /// screen-specific keys are delegated to the active screen component.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if self.pending_confirm.is_some() {
            return Ok(match key.code {
                KeyCode::Char('y' | 'Y') => Some(Action::ConfirmYes),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::ConfirmNo),
                _ => None,
            });
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?' | 'q') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        let Some(screen) = self.screens.get_mut(&self.active_screen) else {
            return Ok(None);
        };
        if screen.captures_input() {
            return screen.handle_key_event(key);
        }

        let global = match (key.modifiers, key.code) {
            (_, KeyCode::Char('q')) => Some(Action::Quit),
            (_, KeyCode::Char('?')) => Some(Action::ToggleHelp),
            (_, KeyCode::Char('r')) => Some(Action::Reload),
            (_, KeyCode::Char('R')) => Some(Action::CheckRecorder),
            (_, KeyCode::Char(c @ '1'..='9')) => {
                let n = c as u8 - b'0';
                ScreenId::from_number(n).map(Action::SwitchScreen)
            }
            (KeyModifiers::NONE, KeyCode::Tab) => {
                Some(Action::SwitchScreen(self.active_screen.next()))
            }
            (_, KeyCode::BackTab) => Some(Action::SwitchScreen(self.active_screen.prev())),
            (_, KeyCode::Char('U')) => Some(Action::RequestCommand(
                Command::UpdateRecorderConfig { backup: true },
            )),
            (_, KeyCode::Char('P')) => Some(Action::RequestCommand(
                Command::PurgeAllExcluded { force: false },
            )),
            (_, KeyCode::Char('L')) => Some(Action::RequestCommand(Command::ReloadConfig)),
            _ => None,
        };
        if global.is_some() {
            return Ok(global);
        }

        screen.handle_key_event(key)
    }

    /// Process a single action: update app state and propagate to components.
    #[allow(clippy::too_many_lines)]
    fn process_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,
            Action::Render | Action::Resize(..) => {}

            Action::Tick => {
                if let Some((_, created)) = &self.notification {
                    if created.elapsed() > NOTIFICATION_TTL {
                        self.notification = None;
                    }
                }
                self.forward_to_active(&Action::Tick)?;
            }

            Action::SwitchScreen(target) => {
                if target != self.active_screen {
                    debug!("switching screen: {} → {}", self.active_screen, target);
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(false);
                    }
                    self.active_screen = target;
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(true);
                    }
                    self.panel.set_view(target.view_mode());
                }
            }

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            // ── Panel data ────────────────────────────────────────
            Action::StateUpdated(ref snapshot) => {
                self.snapshot = Some(Arc::clone(snapshot));
                self.forward_to_all(&action)?;
            }
            Action::Connected => self.connection_status = ConnectionStatus::Connected,
            Action::Connecting => self.connection_status = ConnectionStatus::Connecting,
            Action::Disconnected(reason) => {
                if self.connection_status != ConnectionStatus::Disconnected {
                    warn!(%reason, "panel disconnected");
                }
                self.connection_status = ConnectionStatus::Disconnected;
            }
            Action::Reload => self.reload(),

            // ── Filter & selection ────────────────────────────────
            Action::EditFilter(ref edit) => {
                let edit = edit.clone();
                self.panel.update_filter(|f| apply_filter_edit(f, edit));
                self.forward_to_active(&action)?;
            }
            Action::ToggleEntity(id) => {
                let selected = self.panel.is_selected(&id);
                self.panel.toggle(&id, !selected);
            }
            Action::SelectAllVisible(selected) => self.panel.select_all_visible(selected),
            Action::ClearSelection => self.panel.clear_selection(),
            Action::ToggleDomain(domain) => {
                let selected = self.panel.is_domain_selected(&domain);
                self.panel.toggle_domain(&domain, !selected);
            }
            Action::SelectAllDomains(selected) => self.panel.select_all_domains(selected),

            // ── Writes ────────────────────────────────────────────
            Action::RequestBulk(bulk) => {
                let (count, _) = self.panel.selection_counts();
                if self.bulk_running {
                    self.notify(Notification::warning("A bulk action is already running"));
                } else if count == 0 {
                    self.notify(Notification::warning("No entities selected"));
                } else {
                    self.pending_confirm = Some(ConfirmAction::Bulk {
                        action: bulk,
                        count,
                    });
                }
            }
            Action::RequestDomainBulk(bulk) => {
                let (_, count) = self.panel.selection_counts();
                if count == 0 {
                    self.notify(Notification::warning("No domains selected"));
                } else {
                    self.pending_confirm = Some(ConfirmAction::DomainBulk {
                        action: bulk,
                        count,
                    });
                }
            }
            Action::RequestCommand(cmd) => {
                if cmd.is_destructive() {
                    self.pending_confirm = Some(ConfirmAction::Execute(cmd));
                } else {
                    self.execute_command(cmd, None);
                }
            }
            Action::BulkFinished(finished) => {
                self.bulk_running = false;
                match finished {
                    Ok(report) => self.notify(bulk_notification(&report)),
                    Err(e) => self.notify(Notification::error(e)),
                }
            }

            // ── Confirm dialog ────────────────────────────────────
            Action::ShowConfirm(confirm) => self.pending_confirm = Some(confirm),
            Action::ConfirmYes => {
                if let Some(confirm) = self.pending_confirm.take() {
                    self.execute_confirm(confirm);
                }
            }
            Action::ConfirmNo => {
                self.pending_confirm = None;
                self.notify(Notification::info("Cancelled"));
            }

            // ── Export & report ───────────────────────────────────
            Action::Export => self.export(),
            Action::RequestReport => self.request_report(),
            Action::ReportReady(ref report) => {
                self.report = Some(Arc::clone(report));
                self.action_tx.send(Action::SwitchScreen(ScreenId::Entities))?;
                self.forward_to_all(&action)?;
            }
            Action::CloseReport => self.forward_to_all(&action)?,
            Action::FilterToReport => {
                if let Some(report) = &self.report {
                    self.panel.filter_to_report(report);
                }
                self.forward_to_all(&Action::CloseReport)?;
            }
            Action::CheckRecorder => self.check_recorder(),

            Action::Notify(notification) => self.notify(notification),
        }
        Ok(())
    }

    fn forward_to_all(&mut self, action: &Action) -> Result<()> {
        for screen in self.screens.values_mut() {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    fn forward_to_active(&mut self, action: &Action) -> Result<()> {
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    fn notify(&mut self, notification: Notification) {
        self.notification = Some((notification, Instant::now()));
    }

    // ── Panel operations ─────────────────────────────────────────

    /// Reload, or reconnect when the session is gone.
    fn reload(&mut self) {
        let panel = self.panel.clone();
        let tx = self.action_tx.clone();
        self.notify(Notification::info("Reloading..."));
        tokio::spawn(async move {
            let connected = *panel.connection_state().borrow() == ConnectionState::Connected;
            let result = if connected {
                panel.load().await
            } else {
                panel.connect().await
            };
            let notification = match result {
                Ok(()) => Notification::success("Reloaded"),
                Err(e) => Notification::error(e.to_string()),
            };
            let _ = tx.send(Action::Notify(notification));
        });
    }

    fn execute_command(&self, cmd: Command, confirmed: Option<Confirmed>) {
        let panel = self.panel.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let what = cmd.describe();
            let notification = match panel.execute(cmd, confirmed).await {
                Ok(result) => Notification::success(result_message(&result, &what)),
                Err(e) => Notification::error(format!("{what}: {e}")),
            };
            let _ = tx.send(Action::Notify(notification));
        });
    }

    fn execute_confirm(&mut self, confirm: ConfirmAction) {
        let confirmed = Some(Confirmed::by_user());
        match confirm {
            ConfirmAction::Bulk { action, .. } => {
                self.bulk_running = true;
                let panel = self.panel.clone();
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    let finished = panel
                        .run_bulk(action, confirmed, |_| {})
                        .await
                        .map(Arc::new)
                        .map_err(|e| e.to_string());
                    let _ = tx.send(Action::BulkFinished(finished));
                });
            }
            ConfirmAction::DomainBulk { action, .. } => {
                let panel = self.panel.clone();
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    let title = action.title();
                    let notification = match panel.run_domain_bulk(action, confirmed).await {
                        Ok(result) => Notification::success(result_message(&result, &title)),
                        Err(e) => Notification::error(format!("{title}: {e}")),
                    };
                    let _ = tx.send(Action::Notify(notification));
                });
            }
            ConfirmAction::Execute(cmd) => self.execute_command(cmd, confirmed),
        }
    }

    /// Save the filtered entities to the export directory.
    fn export(&mut self) {
        let notification = match self.panel.export() {
            Ok(export) => {
                let path = self.export_dir.join(&export.filename);
                let written = std::fs::create_dir_all(&self.export_dir)
                    .and_then(|()| std::fs::write(&path, &export.content));
                match written {
                    Ok(()) => {
                        info!(path = %path.display(), count = export.count, "exported entities");
                        Notification::success(format!(
                            "Exported {} entities to {}",
                            export.count,
                            path.display()
                        ))
                    }
                    Err(e) => Notification::error(format!("Export failed: {e}")),
                }
            }
            Err(e) => Notification::error(e.to_string()),
        };
        self.notify(notification);
    }

    fn request_report(&mut self) {
        let panel = self.panel.clone();
        let tx = self.action_tx.clone();
        self.notify(Notification::info("Generating recorder report..."));
        tokio::spawn(async move {
            let action = match panel.recorder_report(REPORT_LIMIT).await {
                Ok(report) => Action::ReportReady(Arc::new(report)),
                Err(e) => Action::Notify(Notification::error(format!(
                    "{e} (press R to check the recorder)"
                ))),
            };
            let _ = tx.send(action);
        });
    }

    fn check_recorder(&mut self) {
        let panel = self.panel.clone();
        let tx = self.action_tx.clone();
        self.notify(Notification::info("Checking recorder..."));
        tokio::spawn(async move {
            let notification = match panel.check_recorder().await {
                Ok(health) => recorder_notification(&health),
                Err(e) => Notification::error(e.to_string()),
            };
            let _ = tx.send(Action::Notify(notification));
        });
    }

    // ── Rendering ─────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::vertical([
            Constraint::Length(1), // Header
            Constraint::Min(1),    // Screen content
            Constraint::Length(1), // Tab bar
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        self.render_header(frame, layout[0]);
        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, layout[1]);
        }
        self.render_tab_bar(frame, layout[2]);
        self.render_status_bar(frame, layout[3]);

        // Overlays: last = topmost.
        if let Some(progress) = self.snapshot.as_deref().and_then(|s| s.view.progress.as_ref()) {
            popup::render_progress(frame, area, progress);
        }
        if let Some((ref notif, _)) = self.notification {
            Self::render_notification(frame, area, notif);
        }
        if let Some(ref confirm) = self.pending_confirm {
            Self::render_confirm_dialog(frame, area, confirm);
        }
        if self.help_visible {
            Self::render_help_overlay(frame, area);
        }
    }

    /// Title plus entity counts.
    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let Some(snapshot) = self.snapshot.as_deref() else {
            return;
        };
        let stats = &snapshot.view.stats;
        let count = |n: usize, label: &'static str| {
            vec![
                Span::styled(n.to_string(), Style::default().fg(theme::NEON_CYAN)),
                Span::styled(format!(" {label}  "), theme::key_hint()),
            ]
        };

        let mut spans = vec![Span::styled(
            format!(" {}  ", snapshot.view.title),
            theme::title_style(),
        )];
        spans.extend(count(stats.total, "total"));
        spans.extend(count(stats.enabled, "enabled"));
        spans.extend(count(stats.disabled, "disabled"));
        spans.extend(count(stats.excluded, "excluded"));
        spans.extend(count(stats.shown, "shown"));
        if stats.selected > 0 {
            spans.push(Span::styled(
                format!("{} selected", stats.selected),
                Style::default().fg(theme::CORAL),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(
                    format!(" {} {} ", id.number(), id.label()),
                    style,
                ))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(
                ScreenId::ALL
                    .iter()
                    .position(|&s| s == self.active_screen)
                    .unwrap_or(0),
            );
        frame.render_widget(tabs, area);
    }

    /// Connection indicator, data age, and key hints.
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let connection = match self.connection_status {
            ConnectionStatus::Connected => {
                Span::styled("● connected", Style::default().fg(theme::SUCCESS_GREEN))
            }
            ConnectionStatus::Disconnected => {
                Span::styled("○ disconnected", Style::default().fg(theme::ERROR_RED))
            }
            ConnectionStatus::Connecting => {
                Span::styled("◐ connecting", Style::default().fg(theme::ELECTRIC_YELLOW))
            }
        };

        let mut spans = vec![Span::raw(" "), connection];

        if let Some(loaded) = self.snapshot.as_deref().and_then(|s| s.last_loaded) {
            let age = chrono::Utc::now()
                .signed_duration_since(loaded)
                .to_std()
                .unwrap_or_default();
            let age = Duration::from_secs(age.as_secs());
            spans.push(Span::styled(
                format!(" │ loaded {} ago", humantime::format_duration(age)),
                theme::key_hint(),
            ));
        }

        spans.push(Span::styled(" │", theme::key_hint()));
        if let Some(screen) = self.screens.get(&self.active_screen) {
            for (key, label) in screen.key_hints() {
                spans.push(Span::styled(format!(" {key} "), theme::key_hint_key()));
                spans.push(Span::styled(*label, theme::key_hint()));
            }
        }
        spans.push(Span::styled("  ? ", theme::key_hint_key()));
        spans.push(Span::styled("help", theme::key_hint()));
        spans.push(Span::styled("  q ", theme::key_hint_key()));
        spans.push(Span::styled("quit", theme::key_hint()));

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_help_overlay(frame: &mut Frame, area: Rect) {
        let help_area = popup::centered(area, 64, 26);
        let inner = popup::frame_block(frame, help_area, "Keyboard Shortcuts", theme::border_focused());

        let section = |title: &'static str| {
            Line::from(Span::styled(
                format!("  {title}"),
                Style::default().fg(theme::NEON_CYAN),
            ))
        };
        let entry = |key: &'static str, label: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
                Span::styled(label, theme::key_hint()),
            ])
        };

        let help_text = vec![
            section("Navigation"),
            entry("1-2 Tab", "Entities / Domains"),
            entry("j/k ↑/↓", "Move up/down"),
            entry("g/G", "Top / bottom"),
            entry("Ctrl+d/u", "Page down / up"),
            Line::from(""),
            section("Selection & actions"),
            entry("space", "Toggle row"),
            entry("a / u", "Select all shown / clear selection"),
            entry("b", "Bulk action menu"),
            entry("e / x / D", "Enable, recorder toggle, delete row"),
            Line::from(""),
            section("Filters"),
            entry("/", "Search entity id or name"),
            entry("f t h", "State / status / recorder"),
            entry("i o", "Integration / domain"),
            entry("c", "Clear filters"),
            Line::from(""),
            section("Panel"),
            entry("r / R", "Reload / check recorder health"),
            entry("E / p", "Export shown entities / recorder report"),
            entry("U / P / L", "Update recorder config / purge excluded / reload config"),
            Line::from(""),
            Line::from(Span::styled(
                "                         Esc or ? to close",
                theme::key_hint(),
            )),
        ];
        frame.render_widget(Paragraph::new(help_text), inner);
    }

    fn render_confirm_dialog(frame: &mut Frame, area: Rect, confirm: &ConfirmAction) {
        let border = if confirm.is_destructive() {
            Style::default().fg(theme::ERROR_RED)
        } else {
            Style::default().fg(theme::ELECTRIC_YELLOW)
        };
        let prompt = confirm.to_string();
        let width = u16::try_from(prompt.chars().count())
            .unwrap_or(u16::MAX)
            .saturating_add(6)
            .clamp(40, 80);
        let dialog_area = popup::centered(area, width, 5);
        let inner = popup::frame_block(frame, dialog_area, "Confirm", border);

        let text = vec![
            Line::from(Span::styled(
                format!("  {prompt}"),
                Style::default().fg(theme::DIM_WHITE),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("  y ", theme::key_hint_key()),
                Span::styled("confirm    ", theme::key_hint()),
                Span::styled("n ", theme::key_hint_key()),
                Span::styled("cancel", theme::key_hint()),
            ]),
        ];
        frame.render_widget(Paragraph::new(text), inner);
    }

    /// Notification toast in the bottom-right corner.
    fn render_notification(frame: &mut Frame, area: Rect, notif: &Notification) {
        let msg_len = u16::try_from(notif.message.chars().count()).unwrap_or(u16::MAX);
        let width = msg_len.saturating_add(6).clamp(20, area.width.saturating_sub(2).max(20));
        let height = 3u16;

        let x = area.width.saturating_sub(width + 1);
        let y = area.height.saturating_sub(height + 2); // above status bar
        let toast_area = Rect::new(area.x + x, area.y + y, width.min(area.width), height);

        let (border_color, icon) = match notif.level {
            NotificationLevel::Success => (theme::SUCCESS_GREEN, "✓"),
            NotificationLevel::Error => (theme::ERROR_RED, "✗"),
            NotificationLevel::Warning => (theme::ELECTRIC_YELLOW, "!"),
            NotificationLevel::Info => (theme::NEON_CYAN, "·"),
        };

        let inner = popup::frame_block(frame, toast_area, "", Style::default().fg(border_color));
        let line = Line::from(vec![
            Span::styled(format!(" {icon} "), Style::default().fg(border_color)),
            Span::styled(notif.message.clone(), Style::default().fg(theme::DIM_WHITE)),
        ]);
        frame.render_widget(Paragraph::new(line), inner);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use entman_core::bulk::BatchResult;
    use entman_core::{BatchOutcome, BulkAction, EnabledCategory, PurgeOutcome, StateCategory};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn filter_edits_touch_one_field() {
        let mut filter = EntityFilter::default();
        apply_filter_edit(&mut filter, FilterEdit::State(Some(StateCategory::Unavailable)));
        apply_filter_edit(&mut filter, FilterEdit::Integration(Some("hue".into())));
        apply_filter_edit(&mut filter, FilterEdit::Enabled(Some(EnabledCategory::Enabled)));
        assert_eq!(filter.state, Some(StateCategory::Unavailable));
        assert_eq!(filter.integration.as_deref(), Some("hue"));
        assert_eq!(filter.enabled, Some(EnabledCategory::Enabled));
        assert_eq!(filter.search, "");

        apply_filter_edit(&mut filter, FilterEdit::Clear);
        assert_eq!(filter, EntityFilter::default());
    }

    #[test]
    fn searching_leaves_the_report_view() {
        let ids: HashSet<String> = ["sensor.a".to_owned()].into_iter().collect();
        let mut filter = EntityFilter::only_ids(ids);
        apply_filter_edit(&mut filter, FilterEdit::Domain(Some("sensor".into())));
        assert!(filter.only_ids.is_some());
        apply_filter_edit(&mut filter, FilterEdit::Search("power".into()));
        assert!(filter.only_ids.is_none());
        assert_eq!(filter.search, "power");
    }

    #[test]
    fn result_messages() {
        assert_eq!(
            result_message(&CommandResult::Ok, "Enable light.a"),
            "Enable light.a: done"
        );
        assert_eq!(
            result_message(&CommandResult::Message("queued".into()), "x"),
            "queued"
        );
        let purged = CommandResult::Purged(PurgeOutcome {
            message: "Purged".into(),
            purged_entities: vec!["sensor.a".into(), "sensor.b".into()],
        });
        assert_eq!(result_message(&purged, "x"), "Purged (2 entities purged)");
    }

    #[test]
    fn bulk_notification_reports_failed_batches() {
        let ok = BulkReport {
            action: BulkAction::Enable,
            batches: vec![BatchResult {
                ids: vec!["light.a".into(), "light.b".into()],
                outcome: BatchOutcome::Ok,
            }],
        };
        let n = bulk_notification(&ok);
        assert_eq!(n.level, NotificationLevel::Success);
        assert!(n.message.ends_with("2 entities in 1 batches"), "{}", n.message);

        let partial = BulkReport {
            action: BulkAction::Enable,
            batches: vec![
                BatchResult {
                    ids: vec!["light.a".into()],
                    outcome: BatchOutcome::Ok,
                },
                BatchResult {
                    ids: vec!["light.b".into()],
                    outcome: BatchOutcome::Failed("HTTP 500".into()),
                },
            ],
        };
        let n = bulk_notification(&partial);
        assert_eq!(n.level, NotificationLevel::Warning);
        assert!(n.message.ends_with("1 of 2 batches failed"), "{}", n.message);
    }

    #[test]
    fn recorder_notification_names_the_next_step() {
        let n = recorder_notification(&RecorderHealth::Healthy { rows: 4 });
        assert_eq!(n.level, NotificationLevel::Success);
        assert!(n.message.contains("retry the report"), "{}", n.message);

        let n = recorder_notification(&RecorderHealth::Unavailable {
            reason: "API error: no database".into(),
        });
        assert_eq!(n.level, NotificationLevel::Error);
        assert!(n.message.contains("no database"), "{}", n.message);
        assert!(n.message.contains("configuration.yaml"), "{}", n.message);
    }
}
