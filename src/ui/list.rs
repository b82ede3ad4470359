//! Source list panel and the entry detail overlay.

use crate::app::{App, InputMode};
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use trendboard::sources::{Entry, LoadState, Source, SourceEntry, SourcePage};
use trendboard::util::{display_width, sanitize_line, truncate_to_width};

use super::render::{centered, spinner};

/// Render one source's list.
pub fn render(f: &mut Frame, app: &App, source: Source, area: Rect) {
    let Some(page) = app.page(source) else {
        return;
    };

    let title = list_title(app, page);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("panel_border_focused"))
        .title(title);

    let placeholder = match &page.state {
        LoadState::Idle => Some("Press r to load".to_string()),
        LoadState::Loading => Some(format!("{} Loading {}...", spinner(app), source.title())),
        LoadState::Failed(e) => Some(format!("Could not load {}: {}", source.title(), e)),
        LoadState::Ready if page.items().is_empty() => Some("Nothing trending right now".into()),
        LoadState::Ready if page.visible_len() == 0 => {
            Some(format!("No match for \"{}\"", page.filter()))
        }
        LoadState::Ready => None,
    };

    if let Some(text) = placeholder {
        let style = if matches!(page.state, LoadState::Failed(_)) {
            app.style("error_text")
        } else {
            app.style("muted")
        };
        let paragraph = Paragraph::new(text)
            .style(style)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    // Border plus the favorite marker
    let text_width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = page
        .visible()
        .map(|entry| {
            let mark = if entry.is_favorite { "★ " } else { "  " };
            let title = sanitize_line(&entry.item.title()).into_owned();
            let subtitle = sanitize_line(&entry.item.subtitle()).into_owned();

            let title_room = text_width.saturating_sub(2);
            let title = truncate_to_width(&title, title_room).into_owned();
            let used = display_width(&title) + 2;
            let mut spans = vec![
                Span::styled(mark, app.style("favorite_mark")),
                Span::styled(title, app.style("list_normal")),
            ];
            // Subtitle only when there is room for a useful part of it
            let room = text_width.saturating_sub(used + 2);
            if room > 8 && !subtitle.is_empty() {
                spans.push(Span::styled(
                    format!("  {}", truncate_to_width(&subtitle, room)),
                    app.style("list_secondary"),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(app.style("list_selected"));
    let mut state = ListState::default().with_selected(Some(page.selected_index()));
    f.render_stateful_widget(list, area, &mut state);
}

fn list_title(app: &App, page: &SourcePage<SourceEntry>) -> String {
    let count = match page.state {
        LoadState::Ready => format!(" ({}/{})", page.visible_len(), page.items().len()),
        _ => String::new(),
    };
    let filter = if app.input_mode == InputMode::Filter {
        format!(" | filter: {}_", page.filter())
    } else if !page.filter().is_empty() {
        format!(" | filter: {}", page.filter())
    } else {
        String::new()
    };
    let country = if page.source == Source::Youtube {
        format!(" [{}]", app.country)
    } else {
        String::new()
    };
    format!(" {}{}{}{} ", page.source.title(), country, count, filter)
}

/// Render the detail overlay for the selected entry.
pub fn render_detail(f: &mut Frame, app: &App, page: &SourcePage<SourceEntry>) {
    let Some(entry) = page.selected() else {
        return;
    };
    let area = f.area();

    let width = (area.width * 70 / 100)
        .max(40)
        .min(area.width.saturating_sub(4));
    let height = (area.height * 70 / 100)
        .max(10)
        .min(area.height.saturating_sub(2));
    let popup = centered(area, width, height);
    if popup.width < 30 || popup.height < 6 {
        return;
    }

    f.render_widget(Clear, popup);

    let label_width = entry
        .item
        .details()
        .iter()
        .map(|(label, _)| label.len())
        .max()
        .unwrap_or(0);

    let mut lines: Vec<Line> = entry
        .item
        .details()
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(
                    format!("{:<width$}  ", label, width = label_width),
                    app.style("detail_label"),
                ),
                Span::styled(sanitize_line(&value).into_owned(), app.style("detail_value")),
            ])
        })
        .collect();

    lines.push(Line::from(""));
    let favorite = if entry.is_favorite {
        Span::styled("★ In your favorites", app.style("favorite_mark"))
    } else {
        Span::styled("Not in favorites", app.style("muted"))
    };
    lines.push(Line::from(favorite));

    let title = format!(" {} ", sanitize_line(&entry.item.title()));
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border_focused"))
                .title(truncate_to_width(&title, popup.width.saturating_sub(4) as usize).into_owned()),
        );
    f.render_widget(paragraph, popup);
}
