use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Debug, Clone, Copy)]
pub struct UiAreas {
    pub size: Rect,
    pub header: Rect,
    pub stock_tab: Rect,
    pub orders_tab: Rect,
    pub backend: Rect,
    pub toolbar: Rect,
    pub main: Rect,
    pub status_line: Rect,
    pub command_line: Rect,
}

pub fn areas(size: Rect) -> UiAreas {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(size);

    let header_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Min(0),
        ])
        .split(vertical[0]);

    UiAreas {
        size,
        header: vertical[0],
        stock_tab: header_chunks[0],
        orders_tab: header_chunks[1],
        backend: header_chunks[2],
        toolbar: vertical[1],
        main: vertical[2],
        status_line: vertical[3],
        command_line: vertical[4],
    }
}

/// Areas of the add/edit item popup
#[derive(Debug, Clone, Copy)]
pub struct ModalAreas {
    pub popup: Rect,
    pub title: Rect,
    pub kind: Rect,
    pub description: Rect,
    pub quantity: Rect,
    pub image_input: Rect,
    pub image: Rect,
    pub submit: Rect,
}

pub fn modal_areas(size: Rect) -> ModalAreas {
    let popup = centered_rect(70, 80, size);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner(popup));

    ModalAreas {
        popup,
        title: chunks[0],
        kind: chunks[1],
        description: chunks[2],
        quantity: chunks[3],
        image_input: chunks[4],
        image: chunks[5],
        submit: chunks[6],
    }
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Area inside a one-cell border
fn inner(r: Rect) -> Rect {
    Rect {
        x: r.x.saturating_add(1),
        y: r.y.saturating_add(1),
        width: r.width.saturating_sub(2),
        height: r.height.saturating_sub(2),
    }
}
