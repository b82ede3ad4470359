use crate::app::{App, InputMode};
use chrono::{DateTime, NaiveDateTime};
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use trendboard::util::{sanitize_line, truncate_to_width};

use super::render::spinner;

/// Shorten a backend timestamp to "YYYY-MM-DD HH:MM".
///
/// Accepts RFC 3339, RFC 2822 (Flask's default JSON date format) and
/// naive ISO timestamps; anything else is shown as-is.
pub fn format_visited_at(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return dt.format("%Y-%m-%d %H:%M").to_string();
        }
    }
    raw.to_string()
}

/// Render the visit history
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let view = &app.history;
    let filter = if app.input_mode == InputMode::Filter {
        format!(" | filter: {}_", view.filter)
    } else if !view.filter.is_empty() {
        format!(" | filter: {}", view.filter)
    } else {
        String::new()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("panel_border_focused"))
        .title(format!(
            " History ({}/{}){} ",
            view.visible_len(),
            view.items.len(),
            filter
        ));

    let placeholder = if view.loading && view.items.is_empty() {
        Some(format!("{} Loading history...", spinner(app)))
    } else if view.items.is_empty() {
        Some("No visits recorded yet.".to_string())
    } else if view.visible_len() == 0 {
        Some(format!("No match for \"{}\"", view.filter))
    } else {
        None
    };

    if let Some(text) = placeholder {
        let paragraph = Paragraph::new(text)
            .style(app.style("muted"))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = view
        .visible()
        .map(|visit| {
            let when = visit
                .visited_at
                .as_deref()
                .map(format_visited_at)
                .unwrap_or_default();
            let meta = format!("{:<16}  {:<8}  ", when, visit.source.tag());
            let room = width.saturating_sub(meta.chars().count());
            let title = sanitize_line(&visit.title);
            ListItem::new(Line::from(vec![
                Span::styled(meta, app.style("list_secondary")),
                Span::styled(
                    truncate_to_width(&title, room).into_owned(),
                    app.style("list_normal"),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(app.style("list_selected"));
    let mut state = ListState::default().with_selected(Some(view.selected));
    f.render_stateful_widget(list, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_visited_at() {
        assert_eq!(format_visited_at("2024-03-01T10:20:30"), "2024-03-01 10:20");
        assert_eq!(format_visited_at("2024-03-01T10:20:30.123+00:00"), "2024-03-01 10:20");
        assert_eq!(
            format_visited_at("Fri, 01 Mar 2024 10:20:30 GMT"),
            "2024-03-01 10:20"
        );
        assert_eq!(format_visited_at("yesterday"), "yesterday");
    }
}
