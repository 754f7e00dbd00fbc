pub mod grid;
pub mod state;
pub mod week;

pub use grid::{Day, TimeBand, WeekGrid, DAYS, TIME_BANDS};
pub use state::ScheduleState;
