//! UI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use artsel_core::{Artwork, BlobStore, RecordSource, Session};

use super::app::{App, InputMode};

/// Main UI rendering function
pub fn draw<S: RecordSource, B: BlobStore>(frame: &mut Frame, app: &App, session: &Session<S, B>) {
    // Create vertical layout for status bar at the bottom
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    draw_table(frame, app, session, chunks[0]);

    match app.input_mode {
        InputMode::Normal => draw_status_bar(frame, app, session, chunks[1]),
        InputMode::Count => draw_count_input(frame, app, chunks[1]),
    }

    if app.show_help {
        draw_help_overlay(frame);
    }

    if let Some(message) = &app.error_message {
        draw_error_modal(frame, message);
    }
}

/// Draw the records table
fn draw_table<S: RecordSource, B: BlobStore>(
    frame: &mut Frame,
    app: &App,
    session: &Session<S, B>,
    area: Rect,
) {
    let records = session.visible_records();

    let header = Row::new(
        ["", "ID", "Title", "Origin", "Artist", "Inscriptions", "Dates"]
            .into_iter()
            .map(|h| Cell::from(h).style(Style::default().add_modifier(Modifier::BOLD))),
    );

    let rows: Vec<Row> = records
        .iter()
        .map(|record| record_row(record, session.is_selected(record.id)))
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Length(8),
        Constraint::Percentage(30),
        Constraint::Percentage(12),
        Constraint::Percentage(22),
        Constraint::Percentage(18),
        Constraint::Length(12),
    ];

    let visible_selected = session.visible_selection().len();
    let title = format!(
        " Artworks · page {} of {} · {}/{} on page selected ",
        session.current_page(),
        session.total_pages(),
        visible_selected,
        records.len()
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = TableState::default();
    if !records.is_empty() {
        state.select(Some(app.row_index));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

/// One table row for a record
fn record_row(record: &Artwork, selected: bool) -> Row<'static> {
    let mark = if selected {
        Span::styled("[x]", Style::default().fg(Color::Green))
    } else {
        Span::styled("[ ]", Style::default().add_modifier(Modifier::DIM))
    };

    let artist = record
        .artist_display
        .as_deref()
        .and_then(|s| s.lines().next())
        .unwrap_or("-")
        .to_string();

    Row::new(vec![
        Cell::from(mark),
        Cell::from(record.id.to_string()),
        Cell::from(record.display_title().to_string()),
        Cell::from(record.place_of_origin.clone().unwrap_or_else(|| "-".to_string())),
        Cell::from(artist),
        Cell::from(
            record
                .inscriptions
                .as_deref()
                .and_then(|s| s.lines().next())
                .unwrap_or("-")
                .to_string(),
        ),
        Cell::from(record.date_range().unwrap_or_else(|| "-".to_string())),
    ])
}

/// Draw the status bar at the bottom
fn draw_status_bar<S: RecordSource, B: BlobStore>(
    frame: &mut Frame,
    app: &App,
    session: &Session<S, B>,
    area: Rect,
) {
    let position = format!(
        " {} selected · {} records · {}/page ",
        session.total_selected(),
        session.total_records(),
        session.page_size()
    );

    let content = if app.is_loading {
        Span::styled(
            app.loading_label.clone(),
            Style::default().fg(Color::Yellow),
        )
    } else if let Some(msg) = &app.status_message {
        Span::raw(msg.clone())
    } else if session.is_loading() {
        // Last page load failed and nothing has loaded since
        Span::styled(
            "Loading... (r to retry)".to_string(),
            Style::default().fg(Color::Yellow),
        )
    } else {
        Span::styled(
            "space:toggle  a:page  #:select N  c:clear  n/p:page  +/-:size  ?:help  q:quit"
                .to_string(),
            Style::default().add_modifier(Modifier::DIM),
        )
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(position.chars().count() as u16),
        ])
        .split(area);

    frame.render_widget(Paragraph::new(Line::from(content)), chunks[0]);
    frame.render_widget(
        Paragraph::new(Span::styled(
            position,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        chunks[1],
    );
}

/// Draw the bulk count prompt at the bottom
fn draw_count_input(frame: &mut Frame, app: &App, area: Rect) {
    let prefix = "Select first N rows: ";
    let input = &app.count_input;

    let line = Line::from(vec![
        Span::styled(prefix, Style::default().fg(Color::Yellow)),
        Span::raw(input.as_str()),
        Span::styled(
            "  (Enter to select, Esc to cancel)",
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), area);

    // Position cursor
    let cursor_x = area.x + prefix.len() as u16 + input.len() as u16;
    frame.set_cursor_position((cursor_x, area.y));
}

/// Centered popup area inside the frame
fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let popup_width = width.min(area.width.saturating_sub(4));
    let popup_height = height.min(area.height.saturating_sub(4));
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    Rect::new(popup_x, popup_y, popup_width, popup_height)
}

/// Draw help overlay
fn draw_help_overlay(frame: &mut Frame) {
    let area = popup_area(frame.area(), 52, 22);
    frame.render_widget(Clear, area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("Rows:"),
        Line::from("  j/k, ↑/↓    Move up/down"),
        Line::from("  Space       Toggle selection"),
        Line::from("  a           Select / deselect page"),
        Line::from("  o, Enter    Open artwork in browser"),
        Line::from(""),
        Line::from("Pages:"),
        Line::from("  n/p, →/←    Next / previous page"),
        Line::from("  g/G         First / last page"),
        Line::from("  +/-         Change rows per page"),
        Line::from("  r           Reload page"),
        Line::from(""),
        Line::from("Selection:"),
        Line::from("  #           Select first N rows from here"),
        Line::from("  c           Clear all selections"),
        Line::from(""),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

/// Draw an error message in a modal
fn draw_error_modal(frame: &mut Frame, message: &str) {
    let area = popup_area(frame.area(), 60, 8);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Error ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let text = vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to dismiss",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    frame.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_popup_area_is_centered() {
        let area = popup_area(Rect::new(0, 0, 100, 40), 50, 20);
        assert_eq!(area, Rect::new(25, 10, 50, 20));
    }

    #[test]
    fn test_popup_area_shrinks_to_fit() {
        let area = popup_area(Rect::new(0, 0, 30, 10), 50, 20);
        assert_eq!(area.width, 26);
        assert_eq!(area.height, 6);
    }
}
