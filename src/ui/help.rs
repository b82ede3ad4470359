//! Help overlay: keybinding table grouped by view.

use crate::app::App;
use ratatui::{
    layout::Constraint,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Row, Table},
    Frame,
};

use super::render::centered_rect;

/// Section label followed by (key, action) pairs.
const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "General",
        &[
            ("Tab / S-Tab", "Next / previous tab"),
            ("1-9", "Jump to tab"),
            ("t", "Toggle dark/light theme"),
            ("?", "Show or hide this help"),
            ("q / Ctrl+c", "Quit"),
        ],
    ),
    (
        "Lists",
        &[
            ("j / k", "Move down / up"),
            ("g / G", "First / last entry"),
            ("Enter", "Show details (records a visit)"),
            ("f", "Toggle favorite"),
            ("o", "Open in browser"),
            ("/", "Filter by title"),
            ("Esc", "Clear filter / close details"),
            ("s", "Search videos (YouTube tab)"),
            ("r", "Reload"),
        ],
    ),
    (
        "Favorites & History",
        &[
            ("d", "Delete entry"),
            ("C", "Clear all history"),
        ],
    ),
    (
        "Settings",
        &[
            ("l / n", "Sign-in / new account form"),
            ("p / w", "Change / reset password form"),
            ("Enter", "Edit form, submit on last field"),
            ("L", "Sign out"),
            ("g / G", "Sign in with Google / GitHub"),
            ("s", "Re-check session"),
        ],
    ),
];

/// Render the help overlay on top of the current view.
pub fn render(f: &mut Frame, app: &App) {
    let overlay = centered_rect(80, 80, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    f.render_widget(Clear, overlay);

    let mut rows: Vec<Row> = Vec::new();
    for (label, bindings) in SECTIONS {
        rows.push(
            Row::new(vec![
                Line::from(Span::styled(
                    format!("-- {} --", label),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
            ])
            .style(app.style("detail_label")),
        );
        for (key, action) in *bindings {
            rows.push(Row::new(vec![format!("  {}", key), action.to_string()]));
        }
        rows.push(Row::new(vec![String::new(), String::new()]));
    }
    rows.pop();

    let widths = [Constraint::Length(16), Constraint::Min(20)];
    let table = Table::new(rows, widths)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border_focused"))
                .title(" Help (? to close) "),
        )
        .header(
            Row::new(vec!["Key", "Action"])
                .style(
                    Style::default()
                        .add_modifier(Modifier::BOLD)
                        .add_modifier(Modifier::UNDERLINED),
                )
                .bottom_margin(1),
        )
        .style(app.style("detail_value"));

    f.render_widget(table, overlay);
}
