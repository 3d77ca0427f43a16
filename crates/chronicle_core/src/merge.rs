//! Note creation policy and target-date resolution.
//!
//! # Responsibility
//! - Decide whether a submission appends to an existing note or creates one.
//! - Resolve which calendar day a submission belongs to.
//!
//! # Invariants
//! - Under [`MergePolicy::Accumulate`] a list built only through
//!   [`MergePolicy::apply`] holds at most one note per date.
//! - Appending never changes the target note's id.

use crate::clock::Clock;
use crate::model::note::{Note, NoteDate, NoteId};
use serde::{Deserialize, Serialize};

/// Rule for placing a new submission into the note list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// One note per day; later submissions are appended after a newline.
    #[default]
    Accumulate,
    /// Every submission becomes its own note.
    PerSubmission,
}

/// How the target date of a submission is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSelectionMode {
    /// The caller must pass the date picked by the user.
    #[default]
    Explicit,
    /// Always the current local day; any selected date is ignored.
    Today,
}

/// What [`MergePolicy::apply`] did, with a copy of the note that now holds
/// the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Created(Note),
    Appended(Note),
}

impl MergeOutcome {
    pub fn note(&self) -> &Note {
        match self {
            Self::Created(note) | Self::Appended(note) => note,
        }
    }

    pub fn note_id(&self) -> &NoteId {
        &self.note().id
    }

    pub fn into_note(self) -> Note {
        match self {
            Self::Created(note) | Self::Appended(note) => note,
        }
    }
}

impl MergePolicy {
    /// Places `text` for `date` into `notes`.
    pub fn apply(self, notes: &mut Vec<Note>, date: NoteDate, text: &str) -> MergeOutcome {
        if self == Self::Accumulate {
            if let Some(existing) = notes.iter_mut().find(|note| note.date == date) {
                existing.append_text(text);
                return MergeOutcome::Appended(existing.clone());
            }
        }

        let note = Note::new(date, text);
        notes.push(note.clone());
        MergeOutcome::Created(note)
    }
}

impl DateSelectionMode {
    /// Resolves the target date, or `None` when explicit mode has no date.
    pub fn resolve(self, selected: Option<NoteDate>, clock: &dyn Clock) -> Option<NoteDate> {
        match self {
            Self::Explicit => selected,
            Self::Today => Some(clock.today()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DateSelectionMode, MergeOutcome, MergePolicy};
    use crate::clock::FixedClock;
    use crate::model::note::NoteDate;

    fn day(value: &str) -> NoteDate {
        NoteDate::parse(value).unwrap()
    }

    #[test]
    fn accumulate_appends_to_existing_note_for_date() {
        let mut notes = Vec::new();
        let first = MergePolicy::Accumulate.apply(&mut notes, day("2024-01-02"), "a");
        let second = MergePolicy::Accumulate.apply(&mut notes, day("2024-01-02"), "b");

        assert!(matches!(first, MergeOutcome::Created(_)));
        assert!(matches!(second, MergeOutcome::Appended(_)));
        assert_eq!(second.note_id(), first.note_id());
        assert_eq!(second.note().text, "a\nb");
        assert_eq!(notes, vec![second.into_note()]);
    }

    #[test]
    fn per_submission_always_creates() {
        let mut notes = Vec::new();
        MergePolicy::PerSubmission.apply(&mut notes, day("2024-01-02"), "a");
        MergePolicy::PerSubmission.apply(&mut notes, day("2024-01-02"), "b");
        assert_eq!(notes.len(), 2);
        assert_ne!(notes[0].id, notes[1].id);
    }

    #[test]
    fn today_mode_ignores_selected_date() {
        let clock = FixedClock::new(day("2024-06-01"));
        let resolved = DateSelectionMode::Today.resolve(Some(day("2020-01-01")), &clock);
        assert_eq!(resolved, Some(day("2024-06-01")));
        assert_eq!(DateSelectionMode::Explicit.resolve(None, &clock), None);
    }
}
