//! Domains screen: per-domain recorder coverage with bulk domain actions.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, BorderType, Borders, Cell, Row, Table, TableState};

use entman_core::view::DomainRow;
use entman_core::{CheckState, Command, DomainAction, DomainStatus, ViewBody};

use crate::action::{Action, Notification, Snapshot};
use crate::component::Component;
use crate::screens::{body_placeholder, checkbox, menu::ActionMenu, menu::Choice};
use crate::theme;

pub struct DomainsScreen {
    focused: bool,
    snapshot: Option<Arc<Snapshot>>,
    table_state: TableState,
    menu: ActionMenu<DomainAction>,
    throbber_state: throbber_widgets_tui::ThrobberState,
}

fn domain_menu() -> ActionMenu<DomainAction> {
    ActionMenu::new(
        "Domain actions",
        vec![
            ("Exclude from recorder", Choice::Ready(DomainAction::Exclude)),
            ("Include in recorder", Choice::Ready(DomainAction::Include)),
            (
                "Set retention days",
                Choice::Days(|raw| {
                    DomainAction::parse_recorder_days(raw).map(DomainAction::SetRecorderDays)
                }),
            ),
        ],
    )
}

impl DomainsScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            snapshot: None,
            table_state: TableState::default().with_selected(Some(0)),
            menu: domain_menu(),
            throbber_state: throbber_widgets_tui::ThrobberState::default(),
        }
    }

    fn rows(&self) -> &[DomainRow] {
        match self.snapshot.as_deref().map(|s| &s.view.body) {
            Some(ViewBody::Domains { rows, .. }) => rows,
            _ => &[],
        }
    }

    fn select_all_state(&self) -> CheckState {
        match self.snapshot.as_deref().map(|s| &s.view.body) {
            Some(ViewBody::Domains { select_all, .. }) => *select_all,
            _ => CheckState::Unchecked,
        }
    }

    fn current(&self) -> Option<&DomainRow> {
        self.rows().get(self.table_state.selected().unwrap_or(0))
    }

    fn move_selection(&mut self, down: bool) {
        let len = self.rows().len();
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        let next = if down {
            (current + 1).min(len - 1)
        } else {
            current.saturating_sub(1)
        };
        self.table_state.select(Some(next));
    }

    fn any_selected(&self) -> bool {
        self.rows().iter().any(|r| r.selected)
    }

    /// Single-domain toggle: fully excluded domains are included again,
    /// everything else is excluded.
    fn toggle_exclusion(&self) -> Option<Action> {
        let row = self.current()?;
        let domain = row.domain.clone();
        let cmd = if row.status == DomainStatus::FullyExcluded {
            Command::IncludeDomain { domain }
        } else {
            Command::ExcludeDomain { domain }
        };
        Some(Action::RequestCommand(cmd))
    }
}

impl Component for DomainsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.menu.is_open() {
            return Ok(self.menu.handle_key(key).map(Action::RequestDomainBulk));
        }

        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection(true);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection(false);
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
                .map(|row| Action::ToggleDomain(row.domain.clone())),
            KeyCode::Char('a') => Some(Action::SelectAllDomains(
                self.select_all_state() != CheckState::Checked,
            )),
            KeyCode::Char('b') => {
                if self.any_selected() {
                    self.menu.open();
                    None
                } else {
                    Some(Action::Notify(Notification::warning(
                        "Select domains first (space)",
                    )))
                }
            }
            KeyCode::Char('x') => self.toggle_exclusion(),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::StateUpdated(snapshot) => {
                self.snapshot = Some(Arc::clone(snapshot));
                let last = self.rows().len().saturating_sub(1);
                let idx = self.table_state.selected().unwrap_or(0).min(last);
                self.table_state.select(Some(idx));
            }
            Action::Tick => self.throbber_state.calc_next(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let body = self.snapshot.as_deref().map(|s| &s.view.body);
        if !matches!(body, Some(ViewBody::Domains { .. })) {
            body_placeholder(frame, area, body, &self.throbber_state);
            return;
        }

        let rows_data = self.rows();
        let block = Block::default()
            .title(format!(" Domains ({}) ", rows_data.len()))
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
            Cell::from("Domain"),
            Cell::from("Entities"),
            Cell::from("Enabled"),
            Cell::from("Excluded"),
            Cell::from("Excl %"),
            Cell::from("Retention"),
            Cell::from("Status"),
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
                Row::new(vec![
                    Cell::from(checkbox(mark)),
                    Cell::from(row.domain.clone()).style(Style::default().fg(theme::NEON_CYAN)),
                    Cell::from(row.total.to_string()),
                    Cell::from(row.enabled.to_string()),
                    Cell::from(row.excluded.to_string()),
                    Cell::from(format!("{}%", row.exclusion_percentage)),
                    Cell::from(row.retention.clone()),
                    Cell::from(row.status.to_string())
                        .style(Style::default().fg(theme::domain_status_color(row.status))),
                ])
                .style(if row.selected {
                    Style::default().fg(theme::CORAL)
                } else {
                    theme::table_row()
                })
            })
            .collect();

        let widths = [
            Constraint::Length(3),
            Constraint::Min(16),
            Constraint::Length(9),
            Constraint::Length(8),
            Constraint::Length(9),
            Constraint::Length(7),
            Constraint::Length(10),
            Constraint::Length(19),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(theme::table_selected())
            .highlight_symbol("▸");
        frame.render_stateful_widget(table, area, &mut self.table_state.clone());

        self.menu.render(frame, area);
    }

    fn captures_input(&self) -> bool {
        self.menu.is_open()
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn key_hints(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("space", "select"),
            ("a", "all"),
            ("b", "bulk"),
            ("x", "exclude/include"),
        ]
    }
}
