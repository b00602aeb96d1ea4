//! Screen implementations. Each screen is a top-level Component.

pub mod domains;
pub mod entities;
pub mod menu;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

use entman_core::{CheckState, ViewBody};

use crate::component::Component;
use crate::screen::ScreenId;
use crate::theme;

/// Create screen components for the tab bar.
pub fn create_screens() -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (
            ScreenId::Entities,
            Box::new(entities::EntitiesScreen::new()),
        ),
        (ScreenId::Domains, Box::new(domains::DomainsScreen::new())),
    ]
}

/// Checkbox glyph for a row or the select-all header.
pub fn checkbox(state: CheckState) -> &'static str {
    match state {
        CheckState::Checked => "[x]",
        CheckState::Indeterminate => "[-]",
        CheckState::Unchecked => "[ ]",
    }
}

/// Everything a screen shows when its own list is not available: the
/// load error with guidance, or a throbber while loading.
pub fn body_placeholder(
    frame: &mut Frame,
    area: Rect,
    body: Option<&ViewBody>,
    throbber: &throbber_widgets_tui::ThrobberState,
) {
    if let Some(ViewBody::Error { message, guidance }) = body {
        render_error(frame, area, message, guidance);
        return;
    }

    let layout = Layout::vertical([
        Constraint::Percentage(45),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .split(area);
    let spinner = throbber_widgets_tui::Throbber::default()
        .label("  Loading entities...")
        .style(Style::default().fg(theme::NEON_CYAN))
        .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
    frame.render_stateful_widget(spinner, layout[1], &mut throbber.clone());
}

fn render_error(frame: &mut Frame, area: Rect, message: &str, guidance: &[String]) {
    let block = Block::default()
        .title(" Could not load the entity manager ")
        .title_style(Style::default().fg(theme::ERROR_RED).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::ERROR_RED));

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {message}"),
            Style::default().fg(theme::DIM_WHITE),
        )),
        Line::from(""),
    ];
    lines.extend(guidance.iter().map(|g| {
        Line::from(vec![
            Span::styled("  • ", Style::default().fg(theme::ELECTRIC_YELLOW)),
            Span::styled(g.clone(), Style::default().fg(theme::DIM_WHITE)),
        ])
    }));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  r ", theme::key_hint_key()),
        Span::styled("retry", theme::key_hint()),
    ]));

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}
