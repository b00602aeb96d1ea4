//! Centered overlays: action menus and the bulk progress popup.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Gauge, Paragraph};

use entman_core::BulkProgress;

use crate::theme;

/// A `width` x `height` rectangle centered in `area`, clamped to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Clear `area` and draw a rounded block; returns the inner area.
pub fn frame_block(frame: &mut Frame, area: Rect, title: &str, border: Style) -> Rect {
    frame.render_widget(Clear, area);
    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG_DARK)),
        area,
    );
    let block = Block::default()
        .title(format!(" {title} "))
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

/// Vertical list of `items` with the cursor on `active`.
pub fn render_menu(frame: &mut Frame, area: Rect, title: &str, items: &[String], active: usize) {
    let height = u16::try_from(items.len()).unwrap_or(u16::MAX).saturating_add(4);
    let width = items
        .iter()
        .map(|i| i.chars().count())
        .max()
        .and_then(|w| u16::try_from(w).ok())
        .unwrap_or(20)
        .max(24)
        .saturating_add(8);
    let popup = centered(area, width, height);
    let inner = frame_block(frame, popup, title, theme::border_focused());

    let mut lines: Vec<Line> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            if i == active {
                Line::from(Span::styled(format!(" ▸ {item}"), theme::table_selected()))
            } else {
                Line::from(Span::styled(format!("   {item}"), theme::table_row()))
            }
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(" Enter ", theme::key_hint_key()),
        Span::styled("choose  ", theme::key_hint()),
        Span::styled("Esc ", theme::key_hint_key()),
        Span::styled("cancel", theme::key_hint()),
    ]));
    frame.render_widget(Paragraph::new(lines), inner);
}

/// Progress of a running bulk action.
pub fn render_progress(frame: &mut Frame, area: Rect, progress: &BulkProgress) {
    let popup = centered(area, 56, 7);
    let inner = frame_block(frame, popup, &progress.title, theme::border_focused());

    let layout = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .split(inner);

    frame.render_widget(
        Paragraph::new(Span::styled(
            format!(" {}...", progress.label()),
            Style::default().fg(theme::DIM_WHITE),
        )),
        layout[0],
    );
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(theme::ELECTRIC_PURPLE).bg(theme::BG_HIGHLIGHT))
            .percent(u16::from(progress.percent.min(100)))
            .label(format!("{}%", progress.percent)),
        layout[2],
    );
}
