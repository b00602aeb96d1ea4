//! Filter bar: search input plus one chip per category filter.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use entman_core::EntityFilter;

use crate::theme;

/// Step `current` through `options`: none, each option in order, none again.
pub fn cycle<T: Clone + PartialEq>(current: Option<&T>, options: &[T]) -> Option<T> {
    match current {
        None => options.first().cloned(),
        Some(value) => options
            .iter()
            .position(|o| o == value)
            .and_then(|i| options.get(i + 1))
            .cloned(),
    }
}

/// One chip: `key label:value`, highlighted while the filter is set.
fn chip<'a>(key: &'a str, label: &'a str, value: Option<String>) -> Vec<Span<'a>> {
    let (text, style) = match value {
        Some(v) => (
            v,
            theme::tab_active().add_modifier(Modifier::BOLD),
        ),
        None => ("all".to_owned(), theme::tab_inactive()),
    };
    vec![
        Span::styled(format!("{key} "), theme::key_hint_key()),
        Span::styled(format!("{label}:"), theme::key_hint()),
        Span::styled(text, style),
        Span::raw("  "),
    ]
}

/// The chip line describing `filter`.
pub fn render_filter_chips(filter: &EntityFilter) -> Line<'static> {
    if filter.only_ids.is_some() {
        return Line::from(vec![
            Span::styled(
                "Showing recorder report entities",
                Style::default().fg(theme::ELECTRIC_YELLOW),
            ),
            Span::styled("  c ", theme::key_hint_key()),
            Span::styled("clear", theme::key_hint()),
        ]);
    }

    let mut spans = Vec::new();
    spans.extend(chip("f", "state", filter.state.map(|s| s.to_string())));
    spans.extend(chip("i", "integration", filter.integration.clone()));
    spans.extend(chip("o", "domain", filter.domain.clone()));
    spans.extend(chip("t", "status", filter.enabled.map(|s| s.to_string())));
    spans.extend(chip("h", "recorder", filter.recorder.map(|s| s.to_string())));
    spans.push(Span::styled("c ", theme::key_hint_key()));
    spans.push(Span::styled("clear", theme::key_hint()));
    Line::from(spans)
}
