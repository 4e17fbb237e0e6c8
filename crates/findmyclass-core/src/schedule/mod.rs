//! Weekly class schedule: event model, grid layout and overlay.

pub mod event;
pub mod grid;
pub mod overlay;


pub use event::{start_of_day, CalendarEvent, EventDateTime};
pub use grid::{
    DayColumn, GridCell, GridDescription, GridLayout, GridMetrics, GridPosition, GridRow,
    DAY_COUNT, DAY_LABELS, GRID_END_HOUR, GRID_START_HOUR,
};
pub use overlay::{EventBlock, Overlay};
