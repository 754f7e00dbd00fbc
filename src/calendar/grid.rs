use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Days of the week, in board order. Serialized short names match the
/// keys used in the persisted document ("Mon".."Sun").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

pub const DAYS: [Day; 7] = [
    Day::Mon,
    Day::Tue,
    Day::Wed,
    Day::Thu,
    Day::Fri,
    Day::Sat,
    Day::Sun,
];

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Time bands that divide each day into four bookable slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBand {
    Morning,
    Midday,
    Afternoon,
    Evening,
}

pub const TIME_BANDS: [TimeBand; 4] = [
    TimeBand::Morning,
    TimeBand::Midday,
    TimeBand::Afternoon,
    TimeBand::Evening,
];

impl TimeBand {
    /// Clock-time label shown in the grid and in emails
    pub fn label(&self) -> &'static str {
        match self {
            TimeBand::Morning => "6-9am",
            TimeBand::Midday => "9am-1pm",
            TimeBand::Afternoon => "1-5pm",
            TimeBand::Evening => "5-8pm",
        }
    }
}

/// One week of assignments: day -> time band -> ordered list of names.
///
/// A slot that was never written and a slot holding an empty list are the
/// same thing; every accessor treats the two identically, and equality is
/// defined over the full 7x4 universe rather than the stored map shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekGrid {
    slots: BTreeMap<Day, BTreeMap<TimeBand, Vec<String>>>,
}

impl WeekGrid {
    /// A grid with every day/band slot materialized as an empty list —
    /// the canonical zero value, same shape the board client creates.
    pub fn empty() -> Self {
        let mut slots = BTreeMap::new();
        for day in DAYS {
            let mut bands = BTreeMap::new();
            for band in TIME_BANDS {
                bands.insert(band, Vec::new());
            }
            slots.insert(day, bands);
        }
        Self { slots }
    }

    /// People assigned to one slot, in insertion order. Never fails; a
    /// missing day or band reads as empty.
    pub fn get(&self, day: Day, band: TimeBand) -> &[String] {
        self.slots
            .get(&day)
            .and_then(|bands| bands.get(&band))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Appends a person to the end of a slot, creating the day and band
    /// entries if they are missing. Duplicates are allowed.
    pub fn append(&mut self, day: Day, band: TimeBand, person: impl Into<String>) {
        self.slots
            .entry(day)
            .or_default()
            .entry(band)
            .or_default()
            .push(person.into());
    }

    /// Removes the person at `index` from a slot. Removal is positional so
    /// duplicate names stay stable. Out-of-range index or absent slot is a
    /// no-op, never an error.
    pub fn remove_at(&mut self, day: Day, band: TimeBand, index: usize) {
        if let Some(people) = self.slots.get_mut(&day).and_then(|b| b.get_mut(&band)) {
            if index < people.len() {
                people.remove(index);
            }
        }
    }
}

impl PartialEq for WeekGrid {
    fn eq(&self, other: &Self) -> bool {
        DAYS.iter().all(|&day| {
            TIME_BANDS
                .iter()
                .all(|&band| self.get(day, band) == other.get(day, band))
        })
    }
}

impl Eq for WeekGrid {}
