use crate::app::{App, InputMode, View};
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;
use trendboard::sources::Source;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let mut style = app.style("status_bar");

    // Use Cow to avoid allocations for static hints and borrowed messages
    let text: Cow<'_, str> = if let Some((msg, is_error, _)) = &app.status_message {
        if *is_error {
            style = app.style("status_error");
        }
        Cow::Borrowed(&**msg)
    } else {
        match &app.input_mode {
            InputMode::Filter => Cow::Borrowed("Type to filter | ESC clear | ENTER keep"),
            InputMode::Search(term) => Cow::Owned(format!(
                "Search videos: {}_ | ENTER search (empty reloads trending) | ESC cancel",
                term
            )),
            InputMode::Form => Cow::Borrowed("Type | TAB next field | ENTER submit | ESC stop editing"),
            InputMode::Normal => Cow::Borrowed(hints(app)),
        }
    };

    let paragraph = Paragraph::new(text).style(style);
    f.render_widget(paragraph, area);
}

/// Static keybinding hints for the current view.
fn hints(app: &App) -> &'static str {
    match app.view {
        View::Dashboard => "[r]eload [Tab/1-9]switch [t]heme [?]help [q]uit",
        View::Source(source) => {
            let detail = app.page(source).is_some_and(|p| p.detail_open());
            if detail {
                "[f]avorite [o]pen [Esc]close"
            } else if source == Source::Youtube {
                "[Enter]details [f]avorite [o]pen [/]filter [s]earch [r]eload [?]help [q]uit"
            } else {
                "[Enter]details [f]avorite [o]pen [/]filter [r]eload [?]help [q]uit"
            }
        }
        View::Favorites => "[d]elete [o]pen [r]eload [?]help [q]uit",
        View::History => "[/]filter [d]elete [C]lear all [o]pen [r]eload [?]help [q]uit",
        View::Settings => {
            "[l]ogin [n]ew account [p]assword [w] reset [Enter]edit [L]ogout [g/G]oogle/GitHub [s]ession"
        }
    }
}
