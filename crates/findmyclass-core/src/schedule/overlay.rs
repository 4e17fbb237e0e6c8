//! Positioned event blocks drawn over the weekly grid.

use serde::{Deserialize, Serialize};

use super::grid::GridPosition;

/// An event that made it onto the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventBlock {
    pub key: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub position: GridPosition,
}

/// All blocks for one sync, in provider order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub blocks: Vec<EventBlock>,
}

impl Overlay {
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Blocks in one weekday column.
    pub fn for_day(&self, day_index: usize) -> impl Iterator<Item = &EventBlock> {
        self.blocks
            .iter()
            .filter(move |b| b.position.day_index == day_index)
    }
}
