//! Tab-based UI rendering

use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};
use ratatui::Frame;

use crate::app::{App, Tab};
use crate::domain::OrderFilter;

use super::layout::UiAreas;

/// Draw one bordered button per tab plus the backend line
pub fn draw_tab_bar(f: &mut Frame, areas: &UiAreas, app: &App) {
    for tab in Tab::ALL {
        let area = match tab {
            Tab::Stock => areas.stock_tab,
            Tab::Orders => areas.orders_tab,
        };
        let active = app.active_tab() == Some(tab);
        let (title_style, border_style) = if active {
            (
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
                Style::default().fg(Color::Cyan),
            )
        } else {
            (Style::default().fg(Color::White), Style::default())
        };

        let line = Line::from(vec![
            Span::styled(
                format!("{}:", tab.shortcut()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(tab.title(), title_style),
        ]);
        let button = Paragraph::new(line)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style),
            );
        f.render_widget(button, area);
    }

    let info = Line::from(vec![
        Span::styled(
            "Stockroom",
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("Backend", Style::default().fg(Color::DarkGray)),
        Span::raw(format!(" {}  ", app.backend_url)),
        Span::styled("Session", Style::default().fg(Color::DarkGray)),
        Span::raw(format!(" {}", app.session.label())),
    ]);
    f.render_widget(
        Paragraph::new(info).block(Block::default().borders(Borders::ALL)),
        areas.backend,
    );
}

/// Toolbar above the table: stock actions or the order filter
pub fn draw_toolbar(f: &mut Frame, area: Rect, app: &App) {
    let dim = Style::default().fg(Color::DarkGray);
    let line = match app.active_tab() {
        Some(Tab::Orders) => {
            let mut spans = vec![Span::styled("Filter ", dim)];
            for filter in OrderFilter::ALL {
                let style = if filter == app.order_filter() {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                spans.push(Span::styled(format!(" {} ", filter.as_str()), style));
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(" (f to cycle)", dim));
            Line::from(spans)
        }
        _ => Line::from(vec![
            Span::styled("a", Style::default().fg(Color::Yellow)),
            Span::raw(" add  "),
            Span::styled("e", Style::default().fg(Color::Yellow)),
            Span::raw(" edit  "),
            Span::styled("space", Style::default().fg(Color::Yellow)),
            Span::raw(" mark  "),
            Span::styled("d", Style::default().fg(Color::Yellow)),
            Span::raw(format!(" delete ({} marked)  ", app.marked_count())),
            Span::styled("r", Style::default().fg(Color::Yellow)),
            Span::raw(" reload"),
        ]),
    };

    f.render_widget(
        Paragraph::new(line).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn highlight() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    Row::new(titles.iter().map(|title| Cell::from(*title))).style(
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
}

/// Draw the stock table
pub fn draw_stock_tab(f: &mut Frame, area: Rect, app: &App) {
    let rows: Vec<Row> = app
        .stock_rows()
        .iter()
        .map(|row| {
            let mark = if app.is_marked(row.id) { "[x]" } else { "[ ]" };
            Row::new(vec![
                Cell::from(mark),
                Cell::from(row.id.to_string()),
                Cell::from(row.title.clone()),
                Cell::from(row.kind.clone()),
                Cell::from(row.description.clone()),
                Cell::from(row.quantity.to_string()),
                Cell::from(row.price.to_string()),
            ])
        })
        .collect();

    let empty = rows.is_empty();
    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Length(6),
            Constraint::Percentage(22),
            Constraint::Length(12),
            Constraint::Min(10),
            Constraint::Length(8),
            Constraint::Length(6),
        ],
    )
    .header(header_row(&[
        "", "Id", "Title", "Type", "Description", "Qty", "Price",
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Stock ({})", app.stock_rows().len())),
    )
    .highlight_style(highlight())
    .highlight_symbol(">> ");

    let mut state = TableState::default();
    if !empty {
        state.select(Some(app.selected_stock));
    }
    f.render_stateful_widget(table, area, &mut state);
}

/// Draw the orders table
pub fn draw_orders_tab(f: &mut Frame, area: Rect, app: &App) {
    let rows: Vec<Row> = app
        .order_rows()
        .iter()
        .map(|row| {
            let style = if row.fulfilled == "yes" {
                Style::default().fg(Color::LightGreen)
            } else {
                Style::default().fg(Color::White)
            };
            Row::new(vec![
                Cell::from(row.id.to_string()),
                Cell::from(row.name.clone()),
                Cell::from(row.street.clone()),
                Cell::from(row.zipcode.clone()),
                Cell::from(row.fulfilled),
            ])
            .style(style)
        })
        .collect();

    let empty = rows.is_empty();
    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Percentage(25),
            Constraint::Min(12),
            Constraint::Length(10),
            Constraint::Length(10),
        ],
    )
    .header(header_row(&["Id", "Name", "Street", "Zipcode", "Fulfilled"]))
    .block(Block::default().borders(Borders::ALL).title(format!(
        "Orders: {} ({})",
        app.order_filter(),
        app.order_rows().len()
    )))
    .highlight_style(highlight())
    .highlight_symbol(">> ");

    let mut state = TableState::default();
    if !empty {
        state.select(Some(app.selected_order));
    }
    f.render_stateful_widget(table, area, &mut state);
}
