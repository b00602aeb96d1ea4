//! Bulk action menu with an inline prompt for retention days.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tui_input::Input;

use entman_core::CoreError;

use crate::theme;
use crate::widgets::{popup, text_input};

/// Validates typed days and builds the action.
pub type DaysParser<T> = fn(&str) -> Result<T, CoreError>;

/// What picking a menu entry does.
pub enum Choice<T> {
    Ready(T),
    /// Ask for a number of days first.
    Days(DaysParser<T>),
}

enum MenuState<T> {
    Closed,
    Open {
        cursor: usize,
    },
    Days {
        parse: DaysParser<T>,
        input: Input,
        error: Option<String>,
    },
}

pub struct ActionMenu<T> {
    title: &'static str,
    items: Vec<(&'static str, Choice<T>)>,
    state: MenuState<T>,
}

impl<T: Copy> ActionMenu<T> {
    pub fn new(title: &'static str, items: Vec<(&'static str, Choice<T>)>) -> Self {
        Self {
            title,
            items,
            state: MenuState::Closed,
        }
    }

    pub fn open(&mut self) {
        self.state = MenuState::Open { cursor: 0 };
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, MenuState::Closed)
    }

    /// Feed a key to the open menu. Returns the chosen action once complete.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<T> {
        match &mut self.state {
            MenuState::Closed => None,
            MenuState::Open { cursor } => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => {
                    self.state = MenuState::Closed;
                    None
                }
                KeyCode::Char('j') | KeyCode::Down => {
                    *cursor = (*cursor + 1).min(self.items.len().saturating_sub(1));
                    None
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    *cursor = cursor.saturating_sub(1);
                    None
                }
                KeyCode::Enter => {
                    let choice = self.items.get(*cursor).map(|(_, c)| c);
                    match choice {
                        Some(Choice::Ready(action)) => {
                            let action = *action;
                            self.state = MenuState::Closed;
                            Some(action)
                        }
                        Some(Choice::Days(parse)) => {
                            self.state = MenuState::Days {
                                parse: *parse,
                                input: Input::default(),
                                error: None,
                            };
                            None
                        }
                        None => None,
                    }
                }
                _ => None,
            },
            MenuState::Days {
                parse,
                input,
                error,
            } => match key.code {
                KeyCode::Esc => {
                    self.state = MenuState::Closed;
                    None
                }
                KeyCode::Enter => match parse(input.value()) {
                    Ok(action) => {
                        self.state = MenuState::Closed;
                        Some(action)
                    }
                    Err(e) => {
                        *error = Some(e.to_string());
                        None
                    }
                },
                _ => {
                    if text_input::apply_key(input, key) {
                        *error = None;
                    }
                    None
                }
            },
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        match &self.state {
            MenuState::Closed => {}
            MenuState::Open { cursor } => {
                let labels: Vec<String> = self.items.iter().map(|(l, _)| (*l).to_owned()).collect();
                popup::render_menu(frame, area, self.title, &labels, *cursor);
            }
            MenuState::Days { input, error, .. } => {
                let dialog = popup::centered(area, 52, 6);
                let inner = popup::frame_block(frame, dialog, "Retention", theme::border_focused());
                let rows = Layout::vertical([
                    Constraint::Length(1),
                    Constraint::Length(1),
                    Constraint::Length(1),
                    Constraint::Min(0),
                ])
                .split(inner);
                text_input::render_input(frame, rows[0], " Days to keep: ", input);
                if let Some(err) = error {
                    frame.render_widget(
                        Paragraph::new(Span::styled(
                            format!(" {err}"),
                            Style::default().fg(theme::ERROR_RED),
                        )),
                        rows[1],
                    );
                }
                frame.render_widget(
                    Paragraph::new(Line::from(vec![
                        Span::styled(" Enter ", theme::key_hint_key()),
                        Span::styled("apply  ", theme::key_hint()),
                        Span::styled("Esc ", theme::key_hint_key()),
                        Span::styled("cancel", theme::key_hint()),
                    ])),
                    rows[2],
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;
    use entman_core::{BulkAction, DomainAction};

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn bulk_menu() -> ActionMenu<BulkAction> {
        ActionMenu::new(
            "Bulk actions",
            vec![
                ("Enable", Choice::Ready(BulkAction::Enable)),
                (
                    "Set recorder days",
                    Choice::Days(|raw| {
                        BulkAction::parse_recorder_days(raw).map(BulkAction::SetRecorderDays)
                    }),
                ),
            ],
        )
    }

    fn type_text(menu: &mut ActionMenu<BulkAction>, text: &str) {
        for c in text.chars() {
            assert_eq!(menu.handle_key(key(KeyCode::Char(c))), None);
        }
    }

    #[test]
    fn enter_picks_the_item_under_the_cursor() {
        let mut menu = bulk_menu();
        assert!(!menu.is_open());
        menu.open();
        assert_eq!(menu.handle_key(key(KeyCode::Enter)), Some(BulkAction::Enable));
        assert!(!menu.is_open());
    }

    #[test]
    fn days_prompt_validates_before_choosing() {
        let mut menu = bulk_menu();
        menu.open();
        menu.handle_key(key(KeyCode::Down));
        assert_eq!(menu.handle_key(key(KeyCode::Enter)), None);
        assert!(menu.is_open());

        type_text(&mut menu, "abc");
        assert_eq!(menu.handle_key(key(KeyCode::Enter)), None);
        assert!(menu.is_open());

        for _ in 0..3 {
            menu.handle_key(key(KeyCode::Backspace));
        }
        type_text(&mut menu, "14");
        assert_eq!(
            menu.handle_key(key(KeyCode::Enter)),
            Some(BulkAction::SetRecorderDays(14))
        );
        assert!(!menu.is_open());
    }

    #[test]
    fn escape_closes_without_choosing() {
        let mut menu = bulk_menu();
        menu.open();
        assert_eq!(menu.handle_key(key(KeyCode::Esc)), None);
        assert!(!menu.is_open());
    }

    #[test]
    fn domain_days_reject_zero() {
        let mut menu: ActionMenu<DomainAction> = ActionMenu::new(
            "Domain actions",
            vec![(
                "Set retention",
                Choice::Days(|raw| {
                    DomainAction::parse_recorder_days(raw).map(DomainAction::SetRecorderDays)
                }),
            )],
        );
        menu.open();
        menu.handle_key(key(KeyCode::Enter));
        menu.handle_key(key(KeyCode::Char('0')));
        assert_eq!(menu.handle_key(key(KeyCode::Enter)), None);
        menu.handle_key(key(KeyCode::Backspace));
        menu.handle_key(key(KeyCode::Char('7')));
        assert_eq!(
            menu.handle_key(key(KeyCode::Enter)),
            Some(DomainAction::SetRecorderDays(7))
        );
    }
}
