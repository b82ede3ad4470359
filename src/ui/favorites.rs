use crate::app::App;
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use trendboard::util::{sanitize_line, truncate_to_width};

use super::render::spinner;

/// Render the favorites list
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let view = &app.favorites;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("panel_border_focused"))
        .title(format!(" Favorites ({}) ", view.items.len()));

    let placeholder = if let Some(error) = &view.error {
        Some((error.clone(), app.style("error_text")))
    } else if view.loading && view.items.is_empty() {
        Some((format!("{} Loading favorites...", spinner(app)), app.style("muted")))
    } else if view.items.is_empty() {
        Some((
            "No favorites yet. Press f on any list entry to add one.".to_string(),
            app.style("muted"),
        ))
    } else {
        None
    };

    if let Some((text, style)) = placeholder {
        let paragraph = Paragraph::new(text)
            .style(style)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = view
        .items
        .iter()
        .map(|fav| {
            let tag = format!("[{}] ", fav.category);
            let title_room = width.saturating_sub(tag.chars().count());
            let title = sanitize_line(&fav.title);
            ListItem::new(Line::from(vec![
                Span::styled(tag, app.style("list_secondary")),
                Span::styled(
                    truncate_to_width(&title, title_room).into_owned(),
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
