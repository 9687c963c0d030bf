//! UI renderer implementation.
//!
//! Contains the top-level `render` entry point used by the terminal loop. The screen is split
//! into a path bar, the table and a status line.
//!
//! This module should stay mostly "pure rendering": it asks the table for a committed
//! [TableFrame] and turns it into widgets, without owning any table logic. The only state it
//! writes back is the [LayoutMetrics] used for mouse hit testing.

use crate::app::{AppState, LayoutMetrics};
use crate::core::{FrameRow, TableFrame, TextWidth, sanitize_to_exact_width};
use crate::utils::shorten_home_path;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, Wrap},
};

use std::path::Path;

/// Render function which renders the entire terminal UI for tau on each frame.
pub fn render(frame: &mut Frame, app: &mut AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_path_bar(frame, app, chunks[0]);

    if let Some(error) = app.listing_error() {
        let text = Paragraph::new(vec![
            Line::from(Span::styled(
                "Cannot list this directory",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(error.to_string()),
        ])
        .wrap(Wrap { trim: true });
        frame.render_widget(text, chunks[1]);
        app.update_layout_metrics(LayoutMetrics::default());
    } else {
        render_table(frame, app, chunks[1]);
    }

    render_status_line(frame, app, chunks[2]);
}

fn render_path_bar(frame: &mut Frame, app: &AppState, area: Rect) {
    let path_str = shorten_home_path(app.nav().current_dir());
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                path_str,
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
        ])),
        area,
    );
}

/// Draws the sticky header and the rows inside the viewport.
fn render_table(frame: &mut Frame, app: &mut AppState, area: Rect) {
    let header_area = Rect {
        height: area.height.min(1),
        ..area
    };
    let body_area = Rect {
        y: area.y.saturating_add(1),
        height: area.height.saturating_sub(1),
        ..area
    };

    let viewport = app.prepare_viewport(body_area.height);
    let first_row = viewport.scroll_offset as usize;
    let cursor = app.nav().cursor().map(Path::to_path_buf);

    let table_frame = app.table_mut().render(&viewport, &TextWidth);
    let widths: Vec<u16> = table_frame
        .widths
        .iter()
        .map(|&w| u16::try_from(w).unwrap_or(u16::MAX))
        .collect();

    app.update_layout_metrics(LayoutMetrics {
        header: header_area,
        body: body_area,
        columns: column_spans(area, &widths),
    });

    let header = Row::new(table_frame.header.iter().zip(&widths).map(|(cell, &w)| {
        let mut style = Style::default().add_modifier(Modifier::BOLD);
        if cell.sorted {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        Cell::from(sanitize_to_exact_width(&cell.label, usize::from(w))).style(style)
    }));

    let rows = visible_body(&table_frame, first_row, body_area.height).map(|row| {
        let is_cursor = cursor.as_deref() == Some(row.path.as_path());
        Row::new(
            row.cells
                .iter()
                .zip(&widths)
                .map(|(text, &w)| Cell::from(sanitize_to_exact_width(text, usize::from(w)))),
        )
        .style(row_style(row, is_cursor))
    });

    let table = Table::new(rows, widths.iter().map(|&w| Constraint::Length(w)))
        .header(header)
        .column_spacing(0);
    frame.render_widget(table, area);
}

/// Committed rows that land on screen. Overscan rows above the scroll offset are skipped.
fn visible_body(
    frame: &TableFrame,
    first_row: usize,
    height: u16,
) -> impl Iterator<Item = &FrameRow> {
    frame
        .body
        .iter()
        .filter(move |row| row.index >= first_row)
        .take(usize::from(height))
}

fn row_style(row: &FrameRow, is_cursor: bool) -> Style {
    let mut style = Style::default();
    if row.is_broken_sym {
        style = style.fg(Color::Red);
    } else if row.is_dir {
        style = style.fg(Color::Blue).add_modifier(Modifier::BOLD);
    } else if row.is_symlink {
        style = style.fg(Color::Cyan);
    }
    if row.selected {
        style = style.bg(Color::DarkGray);
    }
    if is_cursor {
        style = style.add_modifier(Modifier::REVERSED);
    }
    style
}

/// Horizontal span of every column, clipped to `area`.
fn column_spans(area: Rect, widths: &[u16]) -> Vec<(u16, u16)> {
    let right = area.x.saturating_add(area.width);
    let mut x = area.x;
    widths
        .iter()
        .map(|&w| {
            let span = (x, w.min(right.saturating_sub(x)));
            x = x.saturating_add(w);
            span
        })
        .collect()
}

/// Entry count, selection, pending metadata, sort and notifications.
fn render_status_line(frame: &mut Frame, app: &AppState, area: Rect) {
    let table = app.table();
    let dim = Style::default().fg(Color::DarkGray);

    let mut spans = vec![
        Span::raw(format!(" {} entries", table.len())),
        Span::styled("  |  ", dim),
        Span::raw(format!("{} selected", table.selection_len())),
        Span::styled("  |  ", dim),
        Span::raw(format!("sort: {}", table.sort_spec())),
    ];

    let pending = table.pending_metadata();
    if pending > 0 {
        spans.push(Span::styled("  |  ", dim));
        spans.push(Span::raw(format!("resolving {pending}")));
    }
    if app.is_loading() {
        spans.push(Span::styled("  loading…", Style::default().fg(Color::Yellow)));
    }
    if let Some(text) = app.notification() {
        spans.push(Span::styled("  |  ", dim));
        spans.push(Span::styled(
            text.to_string(),
            Style::default().fg(Color::Green),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// render integration tests
#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::Config;
    use crate::core::DirEntry;
    use ratatui::{Terminal, backend::TestBackend};
    use std::error;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn column_spans_are_clipped() {
        let spans = column_spans(Rect::new(2, 0, 20, 5), &[8, 8, 8]);
        assert_eq!(spans, vec![(2, 8), (10, 8), (18, 4)]);
    }

    #[test]
    fn broken_links_are_red() {
        let mut row = FrameRow {
            index: 0,
            path: PathBuf::from("/r/dangling"),
            is_dir: false,
            is_symlink: true,
            is_broken_sym: true,
            selected: false,
            cells: Vec::new(),
        };
        assert_eq!(row_style(&row, false).fg, Some(Color::Red));

        row.is_broken_sym = false;
        assert_eq!(row_style(&row, false).fg, Some(Color::Cyan));
    }

    #[test]
    fn renders_header_rows_and_metrics() -> Result<(), Box<dyn error::Error>> {
        let config = Config::default();
        let temp = tempdir()?;
        let mut app = crate::app::AppState::from_dir(&config, temp.path())?;
        let root = temp.path();
        app.table_mut().set_listing(
            (0..30)
                .map(|i| DirEntry::file(root.join(format!("file{i:02}.txt")), 100))
                .chain([DirEntry::dir(root.join("docs"))])
                .collect(),
        );

        let mut terminal = Terminal::new(TestBackend::new(80, 12))?;
        terminal.draw(|f| render(f, &mut app))?;

        let text = screen_text(&terminal);
        assert!(text.contains("Name ↑"));
        assert!(text.contains("docs/"));
        assert!(text.contains("31 entries"));
        assert!(!text.contains("file20.txt"), "rows below the viewport are not drawn");

        let metrics = app.metrics();
        assert_eq!(metrics.header, Rect::new(0, 1, 80, 1));
        assert_eq!(metrics.body.height, 9);
        assert_eq!(metrics.columns.len(), 3);
        assert!(app.table().pending_metadata() > 0);
        Ok(())
    }
}
