use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::calendar::ScheduleState;
use crate::error::StoreError;

/// Owner of the shared schedule: one in-memory copy plus its durable JSON
/// file. Clients replace the whole document and read whole snapshots;
/// there is no merging, so the last replace to land wins in full.
pub struct CalendarStore {
    path: PathBuf,
    state: Mutex<ScheduleState>,
}

impl CalendarStore {
    /// Opens the store backed by `path`, loading any previously saved
    /// schedule. A missing or unreadable file is treated as "no prior
    /// data" and logged, never surfaced to callers.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = load_or_default(&path);
        Self {
            path,
            state: Mutex::new(state),
        }
    }

    /// Read-only copy of the current state
    pub fn snapshot(&self) -> ScheduleState {
        self.state.lock().unwrap().clone()
    }

    /// Replaces the whole schedule and persists it. Returns whether the
    /// durable write succeeded; the in-memory state is updated either way.
    /// The lock is held across the file write so concurrent replaces land
    /// one at a time and the file never holds an interleaved document.
    pub fn replace(&self, new_state: ScheduleState) -> bool {
        let mut guard = self.state.lock().unwrap();
        *guard = new_state;
        match persist(&self.path, &guard) {
            Ok(()) => true,
            Err(e) => {
                log::error!("failed to save schedule to {}: {}", self.path.display(), e);
                false
            }
        }
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn load_or_default(path: &Path) -> ScheduleState {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            log::info!(
                "no schedule file at {} ({}), starting empty",
                path.display(),
                e
            );
            return ScheduleState::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(state) => state,
        Err(e) => {
            log::warn!(
                "schedule file {} is unreadable ({}), starting empty",
                path.display(),
                e
            );
            ScheduleState::default()
        }
    }
}

/// Write-to-temp-then-rename so a crash mid-write never leaves a
/// half-written file for the next load to trip over.
fn persist(path: &Path, state: &ScheduleState) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let content = serde_json::to_string_pretty(state)?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, content)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::week::week_key;
    use crate::calendar::{Day, TimeBand, WeekGrid};
    use tempfile::TempDir;

    fn state_with_week(index: u32, day: Day, band: TimeBand, person: &str) -> ScheduleState {
        let mut grid = WeekGrid::empty();
        grid.append(day, band, person);
        let mut state = ScheduleState::default();
        state.current_week_index = index;
        state.weeks.insert(week_key(index), grid);
        state
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let store = CalendarStore::open(dir.path().join("calendar.json"));
        assert_eq!(store.snapshot(), ScheduleState::default());
    }

    #[test]
    fn corrupt_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("calendar.json");
        fs::write(&path, "not json {{{").unwrap();

        let store = CalendarStore::open(&path);
        assert_eq!(store.snapshot(), ScheduleState::default());
    }

    #[test]
    fn replace_round_trips_through_snapshot_and_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("calendar.json");
        let state = state_with_week(2, Day::Wed, TimeBand::Afternoon, "Lisa");

        let store = CalendarStore::open(&path);
        assert!(store.replace(state.clone()));
        assert_eq!(store.snapshot(), state);

        // A fresh store over the same file sees the identical document
        let reopened = CalendarStore::open(&path);
        assert_eq!(reopened.snapshot(), state);
    }

    #[test]
    fn save_load_save_is_byte_stable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("calendar.json");
        let state = state_with_week(0, Day::Mon, TimeBand::Morning, "Mum");

        let store = CalendarStore::open(&path);
        assert!(store.replace(state));
        let first = fs::read_to_string(&path).unwrap();

        let reopened = CalendarStore::open(&path);
        let snapshot = reopened.snapshot();
        assert!(reopened.replace(snapshot));
        let second = fs::read_to_string(&path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn last_replace_wins_in_full() {
        let dir = TempDir::new().unwrap();
        let store = CalendarStore::open(dir.path().join("calendar.json"));

        let a = state_with_week(1, Day::Tue, TimeBand::Morning, "Dad");
        let b = state_with_week(5, Day::Sun, TimeBand::Evening, "Granny");

        assert!(store.replace(a));
        assert!(store.replace(b.clone()));
        assert_eq!(store.snapshot(), b);
    }

    #[test]
    fn replace_creates_missing_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/data/calendar.json");

        let store = CalendarStore::open(&path);
        assert!(store.replace(ScheduleState::default()));
        assert!(path.exists());
    }

    #[test]
    fn failed_save_reports_false_but_keeps_memory() {
        let dir = TempDir::new().unwrap();
        // A directory at the target path makes the rename fail
        let path = dir.path().join("calendar.json");
        fs::create_dir_all(&path).unwrap();

        let store = CalendarStore::open(&path);
        let state = state_with_week(3, Day::Thu, TimeBand::Midday, "Megan");
        assert!(!store.replace(state.clone()));
        assert_eq!(store.snapshot(), state);
    }
}
