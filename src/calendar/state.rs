use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::grid::WeekGrid;

/// Root document for the whole board: which week is selected, every stored
/// week, and names added beyond the fixed household roster.
///
/// Field names follow the persisted/wire JSON shape. Every field defaults,
/// so documents written by older builds (or an empty `{}`) still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleState {
    pub current_week_index: u32,
    pub weeks: BTreeMap<String, WeekGrid>,
    pub custom_people: Vec<String>,
}

impl ScheduleState {
    /// The grid stored under `key`, or the empty grid when the week has
    /// never been written — callers cannot tell the two apart.
    pub fn week_or_empty(&self, key: &str) -> WeekGrid {
        self.weeks.get(key).cloned().unwrap_or_else(WeekGrid::empty)
    }
}
