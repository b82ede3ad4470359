//! Dashboard: global trend counts per category.
//!
//! A bar per category in its category colour, next to a table of totals and
//! shares of the grand total.

use crate::app::{App, ChartState};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use trendboard::chart::{ChartData, DATASET_LABEL};
use trendboard::theme::slice_color;
use trendboard::util::{format_count, truncate_to_width};

use super::render::spinner;

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("panel_border"))
        .title(Line::styled(" Global trends ", app.style("chart_title")));

    let chart = match &app.chart {
        ChartState::Ready(chart) => chart,
        ChartState::Loading => {
            let text = format!("{} Loading global trends...", spinner(app));
            render_message(f, area, block, text, app.style("muted"));
            return;
        }
        ChartState::Failed(e) => {
            let text = format!("{}\n\nPress r to retry", e);
            render_message(f, area, block, text, app.style("error_text"));
            return;
        }
    };

    let inner = block.inner(area);
    f.render_widget(block, area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(inner);

    render_bars(f, app, chart, cols[0]);
    render_table(f, app, chart, cols[1]);
}

fn render_message(f: &mut Frame, area: Rect, block: Block<'_>, text: String, style: Style) {
    let paragraph = Paragraph::new(text)
        .style(style)
        .alignment(Alignment::Center)
        .block(block);
    f.render_widget(paragraph, area);
}

fn render_bars(f: &mut Frame, app: &App, chart: &ChartData, area: Rect) {
    let shares = chart.shares();
    if shares.is_empty() || area.width < 4 {
        return;
    }

    // Fit every bar: width per bar minus a one-column gap, at least 1.
    let per_bar = (area.width as usize / shares.len()).max(2);
    let bar_width = (per_bar - 1).clamp(1, 12) as u16;

    let bars: Vec<Bar> = shares
        .iter()
        .map(|share| {
            let color = slice_color(share.color);
            Bar::default()
                .value(share.value.round() as u64)
                .text_value(format_count(share.value.round() as u64))
                .label(Line::from(
                    truncate_to_width(share.label, bar_width as usize).into_owned(),
                ))
                .style(Style::default().fg(color))
                .value_style(app.style("chart_value").bg(color))
        })
        .collect();

    let widget = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1);
    f.render_widget(widget, area);
}

fn render_table(f: &mut Frame, app: &App, chart: &ChartData, area: Rect) {
    let mut rows: Vec<Row> = chart
        .shares()
        .into_iter()
        .map(|share| {
            Row::new(vec![
                Cell::from("■").style(Style::default().fg(slice_color(share.color))),
                Cell::from(share.label.to_string()),
                Cell::from(format!("{}", share.value)),
                Cell::from(format!("{:.1}%", share.percent)),
            ])
        })
        .collect();
    rows.push(
        Row::new(vec![
            Cell::from(""),
            Cell::from("Total"),
            Cell::from(format!("{}", chart.total())),
            Cell::from(""),
        ])
        .style(app.style("chart_value")),
    );

    let widths = [
        Constraint::Length(1),
        Constraint::Min(8),
        Constraint::Length(12),
        Constraint::Length(7),
    ];
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["", "Category", DATASET_LABEL, "Share"])
                .style(app.style("detail_label"))
                .bottom_margin(1),
        )
        .column_spacing(1);
    f.render_widget(table, area);
}
