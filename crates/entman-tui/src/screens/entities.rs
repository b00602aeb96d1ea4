//! Entities screen: filter bar, checkbox table, bulk menu and recorder report.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};
use strum::IntoEnumIterator;
use tui_input::Input;

use entman_core::view::EntityRow;
use entman_core::{
    BulkAction, CheckState, Command, EnabledCategory, RecorderCategory, RecorderReport,
    StateCategory, ViewBody,
};

use crate::action::{Action, FilterEdit, Notification, Snapshot};
use crate::component::Component;
use crate::screens::{body_placeholder, checkbox, menu::ActionMenu, menu::Choice};
use crate::theme;
use crate::widgets::{filter_bar, popup, text_input};

const PAGE: isize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Search,
}

pub struct EntitiesScreen {
    focused: bool,
    snapshot: Option<Arc<Snapshot>>,
    table_state: TableState,
    mode: Mode,
    search: Input,
    menu: ActionMenu<BulkAction>,
    report: Option<Arc<RecorderReport>>,
    throbber_state: throbber_widgets_tui::ThrobberState,
}

fn bulk_menu() -> ActionMenu<BulkAction> {
    ActionMenu::new(
        "Bulk actions",
        vec![
            ("Enable", Choice::Ready(BulkAction::Enable)),
            ("Disable", Choice::Ready(BulkAction::Disable)),
            (
                "Set recorder days",
                Choice::Days(|raw| {
                    BulkAction::parse_recorder_days(raw).map(BulkAction::SetRecorderDays)
                }),
            ),
            ("Exclude from recorder", Choice::Ready(BulkAction::ExcludeRecorder)),
            ("Include in recorder", Choice::Ready(BulkAction::IncludeRecorder)),
            ("Delete", Choice::Ready(BulkAction::Delete)),
        ],
    )
}

impl EntitiesScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            snapshot: None,
            table_state: TableState::default().with_selected(Some(0)),
            mode: Mode::Browse,
            search: Input::default(),
            menu: bulk_menu(),
            report: None,
            throbber_state: throbber_widgets_tui::ThrobberState::default(),
        }
    }

    fn rows(&self) -> &[EntityRow] {
        match self.snapshot.as_deref().map(|s| &s.view.body) {
            Some(ViewBody::Entities { rows, .. }) => rows,
            _ => &[],
        }
    }

    fn select_all_state(&self) -> CheckState {
        match self.snapshot.as_deref().map(|s| &s.view.body) {
            Some(ViewBody::Entities { select_all, .. }) => *select_all,
            _ => CheckState::Unchecked,
        }
    }

    fn current(&self) -> Option<&EntityRow> {
        self.rows().get(self.table_state.selected().unwrap_or(0))
    }

    fn clamp_cursor(&mut self) {
        let len = self.rows().len();
        let idx = self.table_state.selected().unwrap_or(0);
        self.table_state
            .select(Some(idx.min(len.saturating_sub(1))));
    }

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]
    fn move_selection(&mut self, delta: isize) {
        let len = self.rows().len();
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        self.table_state.select(Some(next as usize));
    }

    /// Next value of one category chip.
    fn cycle_edit(&self, key: char) -> Option<FilterEdit> {
        let view = &self.snapshot.as_deref()?.view;
        let filter = &view.filter;
        let edit = match key {
            'f' => {
                let options: Vec<StateCategory> = StateCategory::iter().collect();
                FilterEdit::State(filter_bar::cycle(filter.state.as_ref(), &options))
            }
            't' => {
                let options: Vec<EnabledCategory> = EnabledCategory::iter().collect();
                FilterEdit::Enabled(filter_bar::cycle(filter.enabled.as_ref(), &options))
            }
            'h' => {
                let options: Vec<RecorderCategory> = RecorderCategory::iter().collect();
                FilterEdit::Recorder(filter_bar::cycle(filter.recorder.as_ref(), &options))
            }
            'i' => FilterEdit::Integration(filter_bar::cycle(
                filter.integration.as_ref(),
                &view.filter_options.integrations,
            )),
            'o' => FilterEdit::Domain(filter_bar::cycle(
                filter.domain.as_ref(),
                &view.filter_options.domains,
            )),
            _ => return None,
        };
        Some(edit)
    }

    fn open_bulk_menu(&mut self) -> Option<Action> {
        let selected = self.snapshot.as_deref().map_or(0, |s| s.view.stats.selected);
        if selected == 0 {
            return Some(Action::Notify(Notification::warning(
                "Select entities first (space)",
            )));
        }
        self.menu.open();
        None
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Enter => {
                self.mode = Mode::Browse;
                None
            }
            KeyCode::Esc => {
                self.mode = Mode::Browse;
                self.search.reset();
                Some(Action::EditFilter(FilterEdit::Search(String::new())))
            }
            _ => text_input::apply_key(&mut self.search, key)
                .then(|| Action::EditFilter(FilterEdit::Search(self.search.value().to_owned()))),
        }
    }

    fn handle_report_key(key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q' | 'p') => Some(Action::CloseReport),
            KeyCode::Char('f') | KeyCode::Enter => Some(Action::FilterToReport),
            _ => None,
        }
    }

    fn entity_command(&self, key: char) -> Option<Action> {
        let row = self.current()?;
        let entity_id = row.entity_id.clone();
        let cmd = match key {
            'e' => Command::SetEnabled {
                entity_id,
                enabled: !row.enabled,
            },
            'x' => Command::SetRecorderExclude {
                entity_id,
                exclude: !row.recorder_exclude,
            },
            'D' => Command::DeleteEntity { entity_id },
            _ => return None,
        };
        Some(Action::RequestCommand(cmd))
    }

    // ── Rendering ────────────────────────────────────────────────

    fn render_filters(&self, frame: &mut Frame, area: Rect) {
        let Some(snapshot) = self.snapshot.as_deref() else {
            return;
        };
        let rows = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(area);

        if self.mode == Mode::Search {
            text_input::render_input(frame, rows[0], " / ", &self.search);
        } else {
            let search = &snapshot.view.filter.search;
            let line = if search.is_empty() {
                Line::from(vec![
                    Span::styled(" / ", theme::key_hint_key()),
                    Span::styled("search entity id or name", theme::key_hint()),
                ])
            } else {
                Line::from(vec![
                    Span::styled(" / ", theme::key_hint_key()),
                    Span::styled(search.clone(), Style::default().fg(theme::NEON_CYAN)),
                ])
            };
            frame.render_widget(Paragraph::new(line), rows[0]);
        }

        let mut chips = filter_bar::render_filter_chips(&snapshot.view.filter);
        chips.spans.insert(0, Span::raw(" "));
        frame.render_widget(Paragraph::new(chips), rows[1]);
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let rows_data = self.rows();
        let stats = self.snapshot.as_deref().map(|s| s.view.stats.clone()).unwrap_or_default();

        let block = Block::default()
            .title(format!(" Entities ({} of {}) ", stats.shown, stats.total))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        let header = Row::new(vec![
            Cell::from(checkbox(self.select_all_state())),
            Cell::from("Entity ID"),
            Cell::from("Name"),
            Cell::from("State"),
            Cell::from("Integration"),
            Cell::from("Enabled"),
            Cell::from("Recorder"),
        ])
        .style(theme::table_header());

        let rows: Vec<Row> = rows_data
            .iter()
            .map(|row| {
                let mark = if row.selected {
                    CheckState::Checked
                } else {
                    CheckState::Unchecked
                };
                let recorder = if row.recorder_exclude {
                    Span::styled("excluded", Style::default().fg(theme::ERROR_RED))
                } else {
                    Span::styled(
                        format!("{} days", row.recorder_days),
                        Style::default().fg(theme::DIM_WHITE),
                    )
                };
                let row_style = if row.selected {
                    Style::default().fg(theme::CORAL)
                } else {
                    theme::table_row()
                };
                Row::new(vec![
                    Cell::from(checkbox(mark)),
                    Cell::from(row.entity_id.clone())
                        .style(Style::default().fg(theme::NEON_CYAN)),
                    Cell::from(row.name.clone()),
                    Cell::from(row.state.clone())
                        .style(Style::default().fg(theme::state_color(&row.state))),
                    Cell::from(row.integration.clone()),
                    Cell::from(if row.enabled { "yes" } else { "no" })
                        .style(Style::default().fg(theme::enabled_color(row.enabled))),
                    Cell::from(recorder),
                ])
                .style(row_style)
            })
            .collect();

        let widths = [
            Constraint::Length(3),
            Constraint::Percentage(30),
            Constraint::Percentage(24),
            Constraint::Length(12),
            Constraint::Length(14),
            Constraint::Length(8),
            Constraint::Length(10),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(theme::table_selected())
            .highlight_symbol("▸");

        frame.render_stateful_widget(table, area, &mut self.table_state.clone());
    }

    fn render_report(frame: &mut Frame, area: Rect, report: &RecorderReport) {
        let top = report.top(RecorderReport::SUMMARY_ROWS);
        let height = u16::try_from(top.len()).unwrap_or(10).saturating_add(8);
        let dialog = popup::centered(area, 70, height);
        let inner = popup::frame_block(frame, dialog, "Recorder report", theme::border_focused());

        let mut lines = vec![
            Line::from(vec![
                Span::styled(" Entities analyzed: ", theme::key_hint()),
                Span::styled(
                    report.entities_analyzed.to_string(),
                    Style::default().fg(theme::NEON_CYAN),
                ),
                Span::styled("   Total records: ", theme::key_hint()),
                Span::styled(
                    report.total_records.to_string(),
                    Style::default().fg(theme::NEON_CYAN),
                ),
            ]),
            Line::from(""),
        ];
        for (i, entry) in top.iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(format!(" {:>2}. ", i + 1), theme::key_hint()),
                Span::styled(
                    format!("{:<44}", entry.entity_id),
                    Style::default().fg(theme::DIM_WHITE),
                ),
                Span::styled(
                    format!("{:>10}", entry.record_count),
                    Style::default()
                        .fg(theme::CORAL)
                        .add_modifier(Modifier::BOLD),
                ),
            ]));
        }
        if let Some(url) = &report.download_url {
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled(" Full report: ", theme::key_hint()),
                Span::styled(url.clone(), Style::default().fg(theme::NEON_CYAN)),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(" f ", theme::key_hint_key()),
            Span::styled("show these entities  ", theme::key_hint()),
            Span::styled("Esc ", theme::key_hint_key()),
            Span::styled("close", theme::key_hint()),
        ]));
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

impl Component for EntitiesScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.report.is_some() {
            return Ok(Self::handle_report_key(key));
        }
        if self.menu.is_open() {
            return Ok(self.menu.handle_key(key).map(Action::RequestBulk));
        }
        if self.mode == Mode::Search {
            return Ok(self.handle_search_key(key));
        }

        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(-1);
                None
            }
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.move_selection(PAGE);
                None
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.move_selection(-PAGE);
                None
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.table_state.select(Some(0));
                None
            }
            KeyCode::Char('G') | KeyCode::End => {
                let last = self.rows().len().saturating_sub(1);
                self.table_state.select(Some(last));
                None
            }
            KeyCode::Char(' ') => self
                .current()
                .map(|row| Action::ToggleEntity(row.entity_id.clone())),
            KeyCode::Char('a') => Some(Action::SelectAllVisible(
                self.select_all_state() != CheckState::Checked,
            )),
            KeyCode::Char('u') => Some(Action::ClearSelection),
            KeyCode::Char('/') => {
                let current = self
                    .snapshot
                    .as_deref()
                    .map(|s| s.view.filter.search.clone())
                    .unwrap_or_default();
                self.search = Input::new(current);
                self.mode = Mode::Search;
                None
            }
            KeyCode::Char(c @ ('f' | 't' | 'h' | 'i' | 'o')) => {
                self.cycle_edit(c).map(Action::EditFilter)
            }
            KeyCode::Char('c') => Some(Action::EditFilter(FilterEdit::Clear)),
            KeyCode::Char('b') => self.open_bulk_menu(),
            KeyCode::Char(c @ ('e' | 'x' | 'D')) => self.entity_command(c),
            KeyCode::Char('E') => Some(Action::Export),
            KeyCode::Char('p') => Some(Action::RequestReport),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::StateUpdated(snapshot) => {
                self.snapshot = Some(Arc::clone(snapshot));
                self.clamp_cursor();
            }
            Action::ReportReady(report) => {
                self.report = Some(Arc::clone(report));
            }
            Action::CloseReport => {
                self.report = None;
            }
            Action::EditFilter(_) => {
                self.table_state.select(Some(0));
            }
            Action::Tick => {
                self.throbber_state.calc_next();
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let body = self.snapshot.as_deref().map(|s| &s.view.body);
        let show_filters = self.snapshot.as_deref().is_some_and(|s| s.view.show_filters);

        match body {
            Some(ViewBody::Entities { .. }) => {
                let layout = Layout::vertical([
                    Constraint::Length(if show_filters { 2 } else { 0 }),
                    Constraint::Min(3),
                ])
                .split(area);
                if show_filters {
                    self.render_filters(frame, layout[0]);
                }
                self.render_table(frame, layout[1]);
            }
            other => body_placeholder(frame, area, other, &self.throbber_state),
        }

        self.menu.render(frame, area);
        if let Some(report) = &self.report {
            Self::render_report(frame, area, report);
        }
    }

    fn captures_input(&self) -> bool {
        self.mode == Mode::Search || self.menu.is_open() || self.report.is_some()
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn key_hints(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("space", "select"),
            ("a", "all"),
            ("b", "bulk"),
            ("e", "enable"),
            ("x", "recorder"),
            ("E", "export"),
            ("p", "report"),
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use entman_core::view::{FilterOptions, PanelStats};
    use entman_core::{EntityFilter, PanelView};

    use super::*;

    fn row(id: &str, selected: bool) -> EntityRow {
        EntityRow {
            entity_id: id.into(),
            name: id.into(),
            domain: "light".into(),
            integration: "hue".into(),
            state: "on".into(),
            enabled: true,
            recorder_days: 10,
            recorder_exclude: false,
            selected,
        }
    }

    fn snapshot(rows: Vec<EntityRow>, selected: usize) -> Arc<Snapshot> {
        Arc::new(Snapshot {
            view: PanelView {
                title: "Entity Manager".into(),
                stats: PanelStats {
                    total: rows.len(),
                    shown: rows.len(),
                    selected,
                    ..PanelStats::default()
                },
                body: ViewBody::Entities {
                    rows,
                    select_all: CheckState::Unchecked,
                },
                show_filters: true,
                show_bulk_actions: selected > 0,
                filter: EntityFilter::default(),
                filter_options: FilterOptions {
                    domains: vec!["light".into()],
                    integrations: vec!["hue".into(), "zha".into()],
                },
                progress: None,
            },
            last_loaded: None,
        })
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn loaded(rows: Vec<EntityRow>, selected: usize) -> EntitiesScreen {
        let mut screen = EntitiesScreen::new();
        screen
            .update(&Action::StateUpdated(snapshot(rows, selected)))
            .unwrap();
        screen
    }

    #[test]
    fn space_toggles_the_row_under_the_cursor() {
        let mut screen = loaded(vec![row("light.a", false), row("light.b", false)], 0);
        screen.handle_key_event(key(KeyCode::Down)).unwrap();
        let action = screen.handle_key_event(key(KeyCode::Char(' '))).unwrap();
        assert!(matches!(action, Some(Action::ToggleEntity(id)) if id == "light.b"));
    }

    #[test]
    fn cursor_is_clamped_when_rows_shrink() {
        let mut screen = loaded(vec![row("light.a", false), row("light.b", false)], 0);
        screen.handle_key_event(key(KeyCode::Char('G'))).unwrap();
        screen
            .update(&Action::StateUpdated(snapshot(vec![row("light.a", false)], 0)))
            .unwrap();
        assert_eq!(screen.table_state.selected(), Some(0));
    }

    #[test]
    fn integration_chip_cycles_through_options() {
        let mut screen = loaded(vec![row("light.a", false)], 0);
        let action = screen.handle_key_event(key(KeyCode::Char('i'))).unwrap();
        assert!(matches!(
            action,
            Some(Action::EditFilter(FilterEdit::Integration(Some(ref i)))) if i == "hue"
        ));
    }

    #[test]
    fn bulk_menu_needs_a_selection() {
        let mut screen = loaded(vec![row("light.a", false)], 0);
        let action = screen.handle_key_event(key(KeyCode::Char('b'))).unwrap();
        assert!(matches!(action, Some(Action::Notify(_))));
        assert!(!screen.captures_input());

        let mut screen = loaded(vec![row("light.a", true)], 1);
        assert!(screen.handle_key_event(key(KeyCode::Char('b'))).unwrap().is_none());
        assert!(screen.captures_input());
        let action = screen.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(matches!(action, Some(Action::RequestBulk(BulkAction::Enable))));
    }

    #[test]
    fn search_mode_emits_live_filter_edits() {
        let mut screen = loaded(vec![row("light.a", false)], 0);
        screen.handle_key_event(key(KeyCode::Char('/'))).unwrap();
        assert!(screen.captures_input());
        let action = screen.handle_key_event(key(KeyCode::Char('k'))).unwrap();
        assert!(matches!(
            action,
            Some(Action::EditFilter(FilterEdit::Search(ref s))) if s == "k"
        ));
        screen.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(!screen.captures_input());
    }

    #[test]
    fn enable_key_flips_the_current_entity() {
        let mut screen = loaded(vec![row("light.a", false)], 0);
        let action = screen.handle_key_event(key(KeyCode::Char('e'))).unwrap();
        assert!(matches!(
            action,
            Some(Action::RequestCommand(Command::SetEnabled { ref entity_id, enabled: false }))
                if entity_id == "light.a"
        ));
    }
}
