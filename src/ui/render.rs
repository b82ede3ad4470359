//! Render functions for the TUI.
//!
//! This module handles all rendering logic, dispatching to the appropriate
//! view based on application state.

use crate::app::{App, ConfirmAction, View};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use super::{dashboard, favorites, help, history, list, settings, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 10;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Number of frames in the loading spinner animation.
pub(super) const SPINNER_FRAMES: usize = SPINNER.len();

pub(super) fn spinner(app: &App) -> &'static str {
    SPINNER[app.spinner_frame % SPINNER_FRAMES]
}

/// Main render dispatch function.
///
/// Handles terminal size validation before rendering.
pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    // Guard against zero-width/height to prevent panics
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_tabs(f, app, chunks[0]);

    match app.view {
        View::Dashboard => dashboard::render(f, app, chunks[1]),
        View::Source(source) => list::render(f, app, source, chunks[1]),
        View::Favorites => favorites::render(f, app, chunks[1]),
        View::History => history::render(f, app, chunks[1]),
        View::Settings => settings::render(f, app, chunks[1]),
    }

    status::render(f, app, chunks[2]);

    if let View::Source(source) = app.view {
        if let Some(page) = app.page(source).filter(|p| p.detail_open()) {
            list::render_detail(f, app, page);
        }
    }

    if app.show_help {
        help::render(f, app);
    }

    if let Some(ref confirm) = app.pending_confirm {
        render_confirm_overlay(f, app, confirm);
    }
}

/// One-line tab bar with the signed-in user on the right.
fn render_tabs(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::TABS
        .iter()
        .enumerate()
        .map(|(i, v)| Line::from(format!("{} {}", i + 1, v.title())))
        .collect();
    let selected = View::TABS.iter().position(|v| *v == app.view).unwrap_or(0);

    let user = match &app.auth.identity {
        Some(name) if app.auth.authenticated => format!(" {} ", name),
        _ => " signed out ".to_string(),
    };
    let user_width = (user.chars().count() as u16).min(area.width / 3);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(user_width)])
        .split(area);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.style("tab_inactive"))
        .highlight_style(app.style("tab_active"))
        .divider("│");
    f.render_widget(tabs, cols[0]);
    f.render_widget(
        Paragraph::new(Span::styled(user, app.style("muted"))).alignment(Alignment::Right),
        cols[1],
    );
}

/// Render a confirmation dialog overlay centered on screen.
fn render_confirm_overlay(f: &mut Frame, app: &App, confirm: &ConfirmAction) {
    let area = f.area();

    let text = match confirm {
        ConfirmAction::ClearHistory => format!(
            "Clear all {} history entries?\n\nThis cannot be undone.\n\n(y) Confirm  (n/Esc) Cancel",
            app.history.items.len()
        ),
    };

    // Size: at most 50 chars wide, 7 lines tall, centered
    let width = 50u16.min(area.width.saturating_sub(4));
    let height = 7u16.min(area.height.saturating_sub(4));
    let overlay = centered(area, width, height);

    if overlay.width < 10 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border_focused"))
                .title(" Confirm "),
        )
        .alignment(Alignment::Center)
        .style(app.style("detail_value"));

    f.render_widget(paragraph, overlay);
}

/// A `width` x `height` rectangle centered in `area`.
pub(super) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Create a centered rectangle with the given percentage of the parent area.
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    centered(
        area,
        area.width * percent_x / 100,
        area.height * percent_y / 100,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Duration;
    use trendboard::api::ApiClient;
    use trendboard::config::Config;
    use trendboard::preferences::PreferenceManager;

    fn test_app() -> App {
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let prefs = PreferenceManager::load(
            &Config::default(),
            &std::env::temp_dir().join("trendboard_render_tests_missing_prefs.toml"),
        );
        App::new(client, "morocco", prefs)
    }

    fn draw(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_small_terminal_message() {
        let app = test_app();
        let screen = draw(&app, 40, 8);
        assert!(screen.contains("Terminal too small"));
    }

    #[test]
    fn test_every_tab_renders() {
        let mut app = test_app();
        for view in View::TABS {
            app.view = view;
            let screen = draw(&app, 100, 30);
            assert!(screen.contains("Dashboard"), "tab bar missing on {:?}", view);
        }
    }

    #[test]
    fn test_confirm_overlay_renders() {
        let mut app = test_app();
        app.view = View::History;
        app.pending_confirm = Some(ConfirmAction::ClearHistory);
        let screen = draw(&app, 100, 30);
        assert!(screen.contains("Confirm"));
    }

    #[test]
    fn test_centered_rect_is_inside_area() {
        let area = Rect::new(0, 0, 100, 50);
        let r = centered_rect(80, 80, area);
        assert_eq!(r, Rect::new(10, 5, 80, 40));
    }
}
