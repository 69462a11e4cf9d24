use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

pub mod bindings;
pub mod layout;
pub mod tabs;

use crate::app::{App, InputMode, ItemModal, ModalMode, StatusLevel, Tab};
use crate::domain::FormField;

use bindings::ViewBinding;
use layout::centered_rect;

pub fn draw(f: &mut Frame, app: &App) {
    let size = f.size();
    let areas = layout::areas(size);

    tabs::draw_tab_bar(f, &areas, app);
    tabs::draw_toolbar(f, ViewBinding::OrderFilter.resolve(size), app);
    match app.active_tab() {
        Some(Tab::Stock) => tabs::draw_stock_tab(f, ViewBinding::StockList.resolve(size), app),
        Some(Tab::Orders) => tabs::draw_orders_tab(f, ViewBinding::OrderList.resolve(size), app),
        None => f.render_widget(
            Paragraph::new("Loading…").block(Block::default().borders(Borders::ALL)),
            areas.main,
        ),
    }
    draw_status_line(f, areas.status_line, app);
    draw_command_line(f, areas.command_line, app);

    if let Some(modal) = app.modal() {
        draw_item_modal(f, size, modal);
    }
    if app.help_open {
        draw_help_popup(f, size, app);
    }
    // Drawn last: an alert covers everything until dismissed
    if app.current_alert().is_some() {
        draw_alert_popup(f, size, app);
    }
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let tab = app
        .active_tab()
        .map(|tab| tab.title())
        .unwrap_or("--");
    let spans = vec![
        Span::styled("Tab ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}  ", tab)),
        Span::styled("Cached ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}  ", app.cached_stock().len())),
        Span::styled("Marked ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}  ", app.marked_count())),
        Span::styled("Filter ", Style::default().fg(Color::DarkGray)),
        Span::raw(app.order_filter().as_str()),
    ];

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left);

    f.render_widget(paragraph, area);
}

/// Get command hint for autocompletion
fn command_hint(input: &str) -> Option<&'static str> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    let commands = [
        ("tab", "Switch tab: tab stock | tab orders"),
        ("stock", "Show stock"),
        ("orders", "Show orders: orders all|fulfilled|unfulfilled"),
        ("reload", "Reload current tab"),
        ("add", "Add a stock item"),
        ("edit", "Edit selected item"),
        ("delete", "Delete marked items"),
        ("help", "Show key bindings"),
        ("quit", "Quit"),
    ];

    for (cmd, desc) in commands {
        if cmd.starts_with(&input) {
            return Some(desc);
        }
    }
    None
}

fn draw_command_line(f: &mut Frame, area: Rect, app: &App) {
    let content = match app.input_mode {
        InputMode::Command => {
            let hint = command_hint(&app.command.input);
            let hint_text = hint.unwrap_or("tab | orders | reload | add | delete | quit");
            Line::from(vec![
                Span::styled(": ", Style::default().fg(Color::Yellow)),
                Span::raw(&app.command.input),
                Span::styled(
                    format!("  {}", hint_text),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        }
        InputMode::Modal => Line::from(Span::styled(
            "Tab/Shift-Tab field  Enter save  Esc cancel",
            Style::default().fg(Color::DarkGray),
        )),
        InputMode::Normal => {
            if let Some((text, level)) = app.status_text() {
                let color = match level {
                    StatusLevel::Info => Color::LightGreen,
                    StatusLevel::Warn => Color::LightYellow,
                    StatusLevel::Error => Color::LightRed,
                };
                Line::from(vec![
                    Span::styled("msg: ", Style::default().fg(Color::DarkGray)),
                    Span::styled(text, Style::default().fg(color)),
                ])
            } else {
                action_hints()
            }
        }
    };

    let paragraph = Paragraph::new(content).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}

fn action_hints() -> Line<'static> {
    let key = Style::default().fg(Color::LightCyan);
    Line::from(vec![
        Span::styled("1/2", key),
        Span::raw(" Tab  "),
        Span::styled("j/k", key),
        Span::raw(" Move  "),
        Span::styled("f", key),
        Span::raw(" Filter  "),
        Span::styled(":", key),
        Span::raw(" Command  "),
        Span::styled("?", key),
        Span::raw(" Help  "),
        Span::styled("q", key),
        Span::raw(" Quit"),
    ])
}

fn draw_item_modal(f: &mut Frame, size: Rect, modal: &ItemModal) {
    let popup_area = ViewBinding::ItemModal.resolve(size);
    f.render_widget(Clear, popup_area);

    let title = match modal.mode {
        ModalMode::Add => "Add item".to_string(),
        ModalMode::Edit(id) => format!("Edit item #{id}"),
    };
    f.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::Cyan)),
        popup_area,
    );

    for field in FormField::ALL {
        let focused = modal.focus == field;
        let border_style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let mut value = modal.form.field(field).to_string();
        if focused {
            value.push('_');
        }
        let input = Paragraph::new(value).block(
            Block::default()
                .borders(Borders::ALL)
                .title(field.label())
                .border_style(border_style),
        );
        f.render_widget(input, ViewBinding::for_field(field).resolve(size));
    }

    let current = match modal.image_url.as_deref() {
        Some(url) => Line::from(vec![
            Span::styled("Current image ", Style::default().fg(Color::DarkGray)),
            Span::raw(url.to_string()),
        ]),
        None => Line::from(Span::styled(
            "Image file is required for new items",
            Style::default().fg(Color::DarkGray),
        )),
    };
    f.render_widget(Paragraph::new(current), ViewBinding::Image.resolve(size));

    let submit = Paragraph::new(Line::from(Span::styled(
        "[ Enter: Save ]",
        Style::default()
            .fg(Color::LightGreen)
            .add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    f.render_widget(submit, ViewBinding::SubmitItem.resolve(size));
}

fn draw_help_popup(f: &mut Frame, area: Rect, app: &App) {
    let popup_area = centered_rect(60, 64, area);
    f.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from("Navigation"),
        Line::from("  1 / 2 / Tab  Stock / Orders"),
        Line::from("  j / k        Move selection (vim)"),
        Line::from("  Esc          Close popup"),
        Line::from(""),
        Line::from("Stock"),
        Line::from("  a            Add item"),
        Line::from("  e / Enter    Edit selected item"),
        Line::from("  Space        Mark / unmark row"),
        Line::from("  d            Delete marked rows"),
        Line::from("  r            Reload"),
        Line::from(""),
        Line::from("Orders"),
        Line::from("  f            Cycle filter"),
        Line::from("  r            Reload"),
        Line::from(""),
        Line::from("  :            Command line"),
        Line::from("  ?            Toggle help"),
        Line::from("  q            Quit"),
        Line::from(""),
        Line::from(format!("Backend: {}", app.backend_url)),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().title("Help").borders(Borders::ALL))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

fn draw_alert_popup(f: &mut Frame, area: Rect, app: &App) {
    let Some(alert) = app.current_alert() else {
        return;
    };
    let popup_area = centered_rect(50, 30, area);
    f.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from(alert.message.clone()),
        Line::from(""),
        Line::from(Span::styled(
            format!("{}  ·  Enter/Esc to dismiss", alert.raised_at.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .title(alert.title.clone())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::LightRed)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}
