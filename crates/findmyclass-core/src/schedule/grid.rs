//! Weekly grid layout.
//!
//! The grid is fixed: Monday through Friday, one row per hour from
//! 08:00 to 22:00. Events are positioned in pixel space over it.
//!
//! ## Placement
//!
//! ```text
//! top    = (hour + minute/60 - GRID_START_HOUR) * row_height + header_offset
//! height = max(duration_hours * row_height, row_height)
//! left   = time_column_width + day_index * column_width
//! ```

use chrono::{Datelike, Timelike};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::event::CalendarEvent;
use super::overlay::{EventBlock, Overlay};

/// First rendered hour.
pub const GRID_START_HOUR: u32 = 8;
/// Last rendered hour (inclusive).
pub const GRID_END_HOUR: u32 = 22;
/// Number of weekday columns.
pub const DAY_COUNT: usize = 5;
/// Column labels, Monday first.
pub const DAY_LABELS: [&str; DAY_COUNT] = ["Mon", "Tue", "Wed", "Thu", "Fri"];

pub const ROW_HEIGHT: f64 = 60.0;
pub const HEADER_OFFSET: f64 = 40.0;
pub const TIME_COLUMN_WIDTH: f64 = 50.0;
pub const COLUMN_WIDTH: f64 = 64.0;

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Pixel dimensions of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridMetrics {
    pub row_height: f64,
    pub header_offset: f64,
    pub time_column_width: f64,
    pub column_width: f64,
}

impl Default for GridMetrics {
    fn default() -> Self {
        Self {
            row_height: ROW_HEIGHT,
            header_offset: HEADER_OFFSET,
            time_column_width: TIME_COLUMN_WIDTH,
            column_width: COLUMN_WIDTH,
        }
    }
}

/// Where an event lands on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPosition {
    /// 0 = Monday .. 4 = Friday
    pub day_index: usize,
    pub top_offset: f64,
    pub height: f64,
    pub left_offset: f64,
    pub width: f64,
}

/// One day column header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayColumn {
    pub day_index: usize,
    pub label: String,
    pub left_offset: f64,
    pub width: f64,
}

/// One cell of an hour row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub day_index: usize,
    pub left_offset: f64,
    pub top_offset: f64,
}

/// One hour row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridRow {
    pub hour: u32,
    /// `HH:00`
    pub label: String,
    pub top_offset: f64,
    pub height: f64,
    pub cells: Vec<GridCell>,
}

/// The empty weekly grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridDescription {
    pub columns: Vec<DayColumn>,
    pub rows: Vec<GridRow>,
}

/// Grid geometry plus the zone used to read event wall-clock times.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GridLayout {
    pub metrics: GridMetrics,
    /// When `None`, each event's own offset decides its hour and weekday.
    pub zone: Option<Tz>,
}

impl GridLayout {
    pub fn new(metrics: GridMetrics, zone: Option<Tz>) -> Self {
        Self { metrics, zone }
    }

    /// Build the fixed grid. Never depends on event data.
    pub fn render_grid(&self) -> GridDescription {
        let m = &self.metrics;
        let columns = DAY_LABELS
            .iter()
            .enumerate()
            .map(|(day_index, label)| DayColumn {
                day_index,
                label: (*label).to_string(),
                left_offset: self.column_left(day_index),
                width: m.column_width,
            })
            .collect();

        let rows = (GRID_START_HOUR..=GRID_END_HOUR)
            .map(|hour| {
                let top_offset =
                    (hour - GRID_START_HOUR) as f64 * m.row_height + m.header_offset;
                GridRow {
                    hour,
                    label: format!("{hour:02}:00"),
                    top_offset,
                    height: m.row_height,
                    cells: (0..DAY_COUNT)
                        .map(|day_index| GridCell {
                            day_index,
                            left_offset: self.column_left(day_index),
                            top_offset,
                        })
                        .collect(),
                }
            })
            .collect();

        GridDescription { columns, rows }
    }

    /// Position an event, or `None` when it has no weekday column.
    ///
    /// Events whose start or end cannot be read are also `None`.
    pub fn place_event(&self, event: &CalendarEvent) -> Option<GridPosition> {
        let start = event.start.instant(self.zone)?;
        let end = event.end.instant(self.zone)?;
        let wall = event.start.wall_clock(self.zone)?;

        let day_index = wall.weekday().num_days_from_monday() as usize;
        if day_index >= DAY_COUNT {
            return None;
        }

        let m = &self.metrics;
        let duration_hours = (end - start).num_milliseconds() as f64 / MS_PER_HOUR;
        let height = (duration_hours * m.row_height).max(m.row_height);

        let hour_offset =
            wall.hour() as f64 + wall.minute() as f64 / 60.0 - GRID_START_HOUR as f64;

        Some(GridPosition {
            day_index,
            top_offset: hour_offset * m.row_height + m.header_offset,
            height,
            left_offset: self.column_left(day_index),
            width: m.column_width,
        })
    }

    /// Place every event; the ones without a column are dropped.
    pub fn build_overlay(&self, events: &[CalendarEvent]) -> Overlay {
        let blocks = events
            .iter()
            .filter_map(|event| match self.place_event(event) {
                Some(position) => Some(EventBlock {
                    key: event.key(),
                    summary: event.summary.clone(),
                    location: event.location.clone(),
                    position,
                }),
                None => {
                    tracing::debug!(key = %event.key(), "event has no weekday column, skipped");
                    None
                }
            })
            .collect();

        Overlay { blocks }
    }

    /// Hour row an offset falls into, if inside the grid.
    pub fn row_at(&self, top_offset: f64) -> Option<usize> {
        let rel = (top_offset - self.metrics.header_offset) / self.metrics.row_height;
        let rows = (GRID_END_HOUR - GRID_START_HOUR + 1) as f64;
        if rel < 0.0 || rel >= rows {
            return None;
        }
        Some(rel.floor() as usize)
    }

    fn column_left(&self, day_index: usize) -> f64 {
        self.metrics.time_column_width + day_index as f64 * self.metrics.column_width
    }
}
