//! Grid subcommand and the plain-text grid renderer shared with `sync`.

use findmyclass_core::schedule::{EventBlock, GridDescription, GridLayout, Overlay};
use findmyclass_core::Config;

const CELL_WIDTH: usize = 12;

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let layout = config.grid.layout()?;
    let grid = layout.render_grid();

    if json {
        println!("{}", serde_json::to_string_pretty(&grid)?);
    } else {
        print!("{}", render_text(&layout, &grid, &Overlay::default()));
    }
    Ok(())
}

/// Draw the grid with event blocks as text, one line per hour row.
///
/// A block shows its summary in the row it starts in and `|` in the rows
/// it continues through. Empty cells are `.`.
pub fn render_text(layout: &GridLayout, grid: &GridDescription, overlay: &Overlay) -> String {
    let mut out = String::new();

    out.push_str(&format!("{:<7}", ""));
    for column in &grid.columns {
        out.push_str(&format!("{:<width$}", column.label, width = CELL_WIDTH));
    }
    out.push('\n');

    for (row_index, row) in grid.rows.iter().enumerate() {
        out.push_str(&format!("{:<7}", row.label));
        for cell in &row.cells {
            let text = overlay
                .for_day(cell.day_index)
                .find_map(|block| cell_text(layout, block, row_index))
                .unwrap_or_else(|| ".".to_string());
            out.push_str(&format!("{:<width$}", text, width = CELL_WIDTH));
        }
        let trimmed = out.trim_end().len();
        out.truncate(trimmed);
        out.push('\n');
    }

    out
}

fn cell_text(layout: &GridLayout, block: &EventBlock, row_index: usize) -> Option<String> {
    let m = &layout.metrics;
    let pos = &block.position;
    let first = (pos.top_offset - m.header_offset) / m.row_height;
    let last = (pos.top_offset + pos.height - m.header_offset) / m.row_height;
    let row = row_index as f64;

    if row + 1.0 <= first || row >= last {
        return None;
    }

    let starts_here = layout.row_at(pos.top_offset) == Some(row_index);
    let clipped_top = row_index == 0 && first < 0.0;
    if starts_here || clipped_top {
        Some(truncate(&block.summary, CELL_WIDTH - 1))
    } else {
        Some("|".to_string())
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max.saturating_sub(1)).collect();
    short.push('~');
    short
}
