//! Manual result renderer: a fixed header line over an independently
//! scrolling body, kept visually aligned by forcing the header cells to the
//! measured body column widths minus a per-cell padding correction. The first
//! column carries the widget's left border, so its correction is applied
//! twice. The layout always reserves one line for the body scrollbar.

use crate::data::result_set::ResultSet;
use ratatui::{
    layout::Constraint,
    prelude::*,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

/// Padding subtracted from each body width when sizing header cells
pub const CELL_PAD_CORRECTION: u16 = 1;
/// Extra correction for the first column's left border
pub const FIRST_COL_BORDER_CORRECTION: u16 = 1;
/// One line reserved for the body scrollbar
pub const SCROLLBAR_ALLOWANCE: u16 = 1;

const MIN_WIDTH: u16 = 5;
const MAX_WIDTH: u16 = 50;
const WIDTH_SAMPLE_ROWS: usize = 200;

/// Everything the renderer needs, decoupled from live UI state
pub struct TableContext<'a> {
    pub result: &'a ResultSet,
    pub show_row_numbers: bool,
    /// Rows beyond this are not rendered
    pub max_rows: usize,
}

/// Measure column widths from the rendered body cells
pub fn measure_body_widths(result: &ResultSet) -> Vec<u16> {
    let mut widths = vec![0u16; result.column_count()];

    let sample = result.row_count().min(WIDTH_SAMPLE_ROWS);
    for row_idx in 0..sample {
        for (col_idx, width) in widths.iter_mut().enumerate() {
            // Measure in chars, as truncate_to cuts; capped before the cast
            let cell_width = result
                .cell_text(row_idx, col_idx)
                .chars()
                .count()
                .min(MAX_WIDTH as usize) as u16;
            *width = (*width).max(cell_width);
        }
    }

    for width in &mut widths {
        *width = (*width).clamp(MIN_WIDTH, MAX_WIDTH);
    }

    widths
}

/// Force header cell widths to the measured body widths minus the padding
/// correction; the first cell takes the correction twice (left border).
pub fn sync_header_widths(body_widths: &[u16]) -> Vec<u16> {
    body_widths
        .iter()
        .enumerate()
        .map(|(idx, &width)| {
            let mut corrected = width.saturating_sub(CELL_PAD_CORRECTION);
            if idx == 0 {
                corrected = corrected.saturating_sub(FIRST_COL_BORDER_CORRECTION);
            }
            corrected
        })
        .collect()
}

/// Total widget height: header rows + body rows + the scrollbar allowance
pub fn widget_height(header_rows: u16, body_rows: u16) -> u16 {
    header_rows + body_rows + SCROLLBAR_ALLOWANCE
}

fn truncate_to(text: &str, width: u16) -> String {
    text.chars().take(width as usize).collect()
}

/// Render the result table into `area`. Clears whatever was there before.
pub fn render_table(f: &mut Frame, area: Rect, ctx: &TableContext, state: &mut TableState) {
    if ctx.result.row_count() == 0 {
        let empty = Paragraph::new("No results found")
            .block(Block::default().borders(Borders::ALL).title("Results"))
            .style(Style::default().fg(Color::Yellow));
        f.render_widget(empty, area);
        return;
    }

    let body_widths = measure_body_widths(ctx.result);
    let header_widths = sync_header_widths(&body_widths);

    let mut header_cells: Vec<Cell> = Vec::new();
    if ctx.show_row_numbers {
        header_cells.push(
            Cell::from("#").style(
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
        );
    }
    for (idx, name) in ctx.result.columns.iter().enumerate() {
        let width = header_widths.get(idx).copied().unwrap_or(MIN_WIDTH);
        header_cells.push(
            Cell::from(truncate_to(name, width)).style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
        );
    }
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let rows: Vec<Row> = ctx
        .result
        .to_text_rows()
        .into_iter()
        .take(ctx.max_rows)
        .enumerate()
        .map(|(row_idx, row_data)| {
            let mut cells: Vec<Cell> = Vec::new();
            if ctx.show_row_numbers {
                cells.push(
                    Cell::from((row_idx + 1).to_string())
                        .style(Style::default().fg(Color::DarkGray)),
                );
            }
            for (col_idx, value) in row_data.into_iter().enumerate() {
                let cell = if col_idx == 0 {
                    // First column is the link label for the row's URI
                    Cell::from(value).style(
                        Style::default()
                            .fg(Color::Blue)
                            .add_modifier(Modifier::UNDERLINED),
                    )
                } else {
                    Cell::from(value)
                };
                cells.push(cell);
            }
            Row::new(cells).height(1)
        })
        .collect();

    let title = if ctx.result.row_count() > ctx.max_rows {
        format!(
            "Results (showing {} of {} rows) - Enter copies the row link",
            ctx.max_rows,
            ctx.result.row_count()
        )
    } else {
        format!(
            "Results ({} rows) - Enter copies the row link",
            ctx.result.row_count()
        )
    };

    let mut widths: Vec<Constraint> = Vec::new();
    if ctx.show_row_numbers {
        widths.push(Constraint::Length(6));
    }
    widths.extend(body_widths.iter().map(|&w| Constraint::Length(w)));

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .column_spacing(1)
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    f.render_stateful_widget(table, area, state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::result_set::CellValue;

    fn result_with(rows: Vec<Vec<&str>>) -> ResultSet {
        ResultSet::new(
            vec!["File Name".to_string(), "Link Path".to_string()],
            rows.into_iter()
                .map(|r| {
                    r.into_iter()
                        .map(|v| CellValue::Text(v.to_string()))
                        .collect()
                })
                .collect(),
        )
    }

    #[test]
    fn body_widths_track_longest_cell_with_clamps() {
        let rs = result_with(vec![
            vec!["short.pdf", "x"],
            vec!["a-much-longer-file-name.pdf", "y"],
        ]);
        let widths = measure_body_widths(&rs);
        assert_eq!(widths[0], 27);
        assert_eq!(widths[1], MIN_WIDTH);

        let long = "x".repeat(120);
        let rs = result_with(vec![vec![long.as_str(), "y"]]);
        assert_eq!(measure_body_widths(&rs)[0], MAX_WIDTH);
    }

    #[test]
    fn widths_count_chars_not_bytes() {
        // "é" is two bytes per char; the measured width matches what
        // truncate_to would cut
        let accented = "é".repeat(10);
        let rs = result_with(vec![vec![accented.as_str(), "y"]]);
        assert_eq!(measure_body_widths(&rs)[0], 10);

        // A cell longer than u16::MAX bytes still clamps to MAX_WIDTH
        let huge = "x".repeat(70_000);
        let rs = result_with(vec![vec![huge.as_str(), "y"]]);
        assert_eq!(measure_body_widths(&rs)[0], MAX_WIDTH);
    }

    #[test]
    fn header_widths_get_pad_correction_doubled_for_first_column() {
        let synced = sync_header_widths(&[20, 20, 20]);
        assert_eq!(
            synced,
            vec![
                20 - CELL_PAD_CORRECTION - FIRST_COL_BORDER_CORRECTION,
                20 - CELL_PAD_CORRECTION,
                20 - CELL_PAD_CORRECTION,
            ]
        );
    }

    #[test]
    fn header_correction_saturates_at_zero() {
        let synced = sync_header_widths(&[1, 0]);
        assert_eq!(synced, vec![0, 0]);
    }

    #[test]
    fn height_always_includes_scrollbar_allowance() {
        assert_eq!(widget_height(1, 10), 11 + SCROLLBAR_ALLOWANCE);
        assert_eq!(widget_height(1, 0), 1 + SCROLLBAR_ALLOWANCE);
    }
}
