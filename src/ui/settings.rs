//! Settings view: session status, the account forms and appearance.

use crate::app::{App, InputMode};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use trendboard::settings::FormKind;

use super::render::spinner;

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_account(f, app, cols[0]);
    render_form(f, app, cols[1]);
}

fn render_account(f: &mut Frame, app: &App, area: Rect) {
    let label = |s: &'static str| Span::styled(s, app.style("detail_label"));
    let value = |s: String| Span::styled(s, app.style("detail_value"));

    let session = match (&app.auth.identity, app.auth.authenticated) {
        (Some(name), true) => format!("signed in as {}", name),
        _ => "signed out".to_string(),
    };

    let mut lines = vec![
        Line::from(vec![label("Session   "), value(session)]),
        Line::from(vec![label("Backend   "), value(app.client.origin().to_string())]),
        Line::from(vec![label("Theme     "), value(app.theme_variant.name().to_string())]),
        Line::from(vec![label("YouTube   "), value(app.country.clone())]),
        Line::from(""),
        Line::from(Span::styled("Forms", app.style("detail_label"))),
    ];
    let keys = [
        ('l', FormKind::Login),
        ('n', FormKind::Register),
        ('p', FormKind::ChangePassword),
        ('w', FormKind::ResetPassword),
    ];
    for (key, kind) in keys {
        let style = if app.form.kind() == kind {
            app.style("tab_active")
        } else {
            app.style("list_normal")
        };
        lines.push(Line::from(Span::styled(format!("  {}  {}", key, kind.title()), style)));
    }
    lines.extend([
        Line::from(""),
        Line::from(Span::styled("Other", app.style("detail_label"))),
        Line::from("  g  Sign in with Google"),
        Line::from("  G  Sign in with GitHub"),
        Line::from("  L  Sign out"),
        Line::from("  t  Toggle theme"),
    ]);

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.style("panel_border"))
            .title(" Account "),
    );
    f.render_widget(paragraph, area);
}

fn render_form(f: &mut Frame, app: &App, area: Rect) {
    let editing = app.input_mode == InputMode::Form;
    let label_width = app
        .form
        .kind()
        .fields()
        .iter()
        .map(|spec| spec.label.len())
        .max()
        .unwrap_or(0);

    let mut lines: Vec<Line> = Vec::new();
    for (i, (spec, shown)) in app.form.rows().enumerate() {
        let focused = editing && i == app.form.focus();
        let cursor = if focused { "_" } else { "" };
        let input_style = if focused {
            app.style("form_input_focused")
        } else {
            app.style("form_input")
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<width$} : ", spec.label, width = label_width),
                app.style("form_label"),
            ),
            Span::styled(format!("{}{}", shown, cursor), input_style),
        ]));
        lines.push(Line::from(""));
    }

    let footer = if app.form_busy {
        format!("{} Waiting for the server...", spinner(app))
    } else if editing {
        "Enter on the last field submits".to_string()
    } else {
        "Press Enter to fill in this form".to_string()
    };
    lines.push(Line::from(Span::styled(footer, app.style("muted"))));

    let border = if editing {
        app.style("panel_border_focused")
    } else {
        app.style("panel_border")
    };
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(format!(" {} ", app.form.kind().title())),
    );
    f.render_widget(paragraph, area);
}
