//! Single-line text entry backed by `tui-input`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tui_input::{Input, InputRequest};

use crate::theme;

/// Translate an editing key into an input request.
fn request_for(key: KeyEvent) -> Option<InputRequest> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('u') if ctrl => Some(InputRequest::DeleteLine),
        KeyCode::Char('w') if ctrl => Some(InputRequest::DeletePrevWord),
        KeyCode::Char('a') if ctrl => Some(InputRequest::GoToStart),
        KeyCode::Char('e') if ctrl => Some(InputRequest::GoToEnd),
        KeyCode::Char(c) if !ctrl => Some(InputRequest::InsertChar(c)),
        KeyCode::Backspace => Some(InputRequest::DeletePrevChar),
        KeyCode::Delete => Some(InputRequest::DeleteNextChar),
        KeyCode::Left => Some(InputRequest::GoToPrevChar),
        KeyCode::Right => Some(InputRequest::GoToNextChar),
        KeyCode::Home => Some(InputRequest::GoToStart),
        KeyCode::End => Some(InputRequest::GoToEnd),
        _ => None,
    }
}

/// Apply `key` to `input`. Returns true when the value changed.
pub fn apply_key(input: &mut Input, key: KeyEvent) -> bool {
    let before = input.value().to_owned();
    if let Some(req) = request_for(key) {
        input.handle(req);
    }
    input.value() != before
}

/// Render `prompt` followed by the input, with the terminal cursor placed
/// inside it.
pub fn render_input(frame: &mut Frame, area: Rect, prompt: &str, input: &Input) {
    let prompt_width = u16::try_from(prompt.chars().count()).unwrap_or(u16::MAX);
    let width = usize::from(area.width.saturating_sub(prompt_width + 1));
    let scroll = input.visual_scroll(width);

    let line = Line::from(vec![
        Span::styled(prompt.to_owned(), theme::tab_active()),
        Span::styled(
            input.value().chars().skip(scroll).collect::<String>(),
            theme::title_style(),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);

    let cursor = input.visual_cursor().saturating_sub(scroll);
    let x = area
        .x
        .saturating_add(prompt_width)
        .saturating_add(u16::try_from(cursor).unwrap_or(u16::MAX));
    frame.set_cursor_position(Position::new(x.min(area.right().saturating_sub(1)), area.y));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typing_and_deleting() {
        let mut input = Input::default();
        assert!(apply_key(&mut input, key(KeyCode::Char('l'))));
        assert!(apply_key(&mut input, key(KeyCode::Char('x'))));
        assert_eq!(input.value(), "lx");
        assert!(apply_key(&mut input, key(KeyCode::Backspace)));
        assert_eq!(input.value(), "l");
    }

    #[test]
    fn cursor_moves_do_not_change_value() {
        let mut input = Input::new("kitchen".into());
        assert!(!apply_key(&mut input, key(KeyCode::Left)));
        assert!(!apply_key(&mut input, key(KeyCode::Home)));
        assert!(!apply_key(&mut input, key(KeyCode::Enter)));
        assert_eq!(input.value(), "kitchen");
    }

    #[test]
    fn ctrl_u_clears_line() {
        let mut input = Input::new("sensor.power".into());
        let clear = KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL);
        assert!(apply_key(&mut input, clear));
        assert_eq!(input.value(), "");
    }
}
