//! Calendar-day source for "today" date resolution.

use crate::model::note::NoteDate;
use chrono::{Local, NaiveDate};

/// Supplies the current local calendar day.
pub trait Clock: Send + Sync {
    fn today(&self) -> NoteDate;
}

/// Wall clock in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NoteDate {
        NoteDate::from_naive(Local::now().date_naive())
    }
}

/// Clock pinned to one day.
#[derive(Debug, Clone)]
pub struct FixedClock {
    day: NoteDate,
}

impl FixedClock {
    pub fn new(day: NoteDate) -> Self {
        Self { day }
    }

    pub fn from_naive(day: NaiveDate) -> Self {
        Self::new(NoteDate::from_naive(day))
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NoteDate {
        self.day.clone()
    }
}
