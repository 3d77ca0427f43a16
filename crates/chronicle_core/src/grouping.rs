//! Date grouping over a note list.
//!
//! # Responsibility
//! - Partition notes by calendar day in one pure pass.
//! - Present groups most-recent-day first for display.
//!
//! # Invariants
//! - Groups borrow from the caller's list; they are never a second source of
//!   truth and cannot outlive it.
//! - Within a group, notes keep their relative insertion order.

use crate::model::note::{Note, NoteDate};
use std::collections::BTreeMap;

/// Read-only view of notes keyed by date.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DateGroups<'a> {
    groups: BTreeMap<&'a NoteDate, Vec<&'a Note>>,
}

/// Groups `notes` by date.
pub fn group(notes: &[Note]) -> DateGroups<'_> {
    let groups = notes.iter().fold(
        BTreeMap::<&NoteDate, Vec<&Note>>::new(),
        |mut acc, note| {
            acc.entry(&note.date).or_default().push(note);
            acc
        },
    );
    DateGroups { groups }
}

impl<'a> DateGroups<'a> {
    /// Number of distinct dates.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Notes for one date in insertion order.
    pub fn get(&self, date: &NoteDate) -> Option<&[&'a Note]> {
        self.groups.get(date).map(Vec::as_slice)
    }

    /// Iterates groups from the most recent date to the oldest.
    pub fn iter_recent_first(&self) -> impl Iterator<Item = (&'a NoteDate, &[&'a Note])> + '_ {
        self.groups
            .iter()
            .rev()
            .map(|(date, notes)| (*date, notes.as_slice()))
    }

    pub fn dates_recent_first(&self) -> Vec<&'a NoteDate> {
        self.groups.keys().rev().copied().collect()
    }

    /// Ordered note texts per date, most recent date first.
    pub fn texts_recent_first(&self) -> Vec<(NoteDate, Vec<String>)> {
        self.iter_recent_first()
            .map(|(date, notes)| {
                (
                    date.clone(),
                    notes.iter().map(|note| note.text.clone()).collect(),
                )
            })
            .collect()
    }

    /// Flattens the groups back into an owned list, most recent date first.
    pub fn to_notes(&self) -> Vec<Note> {
        self.iter_recent_first()
            .flat_map(|(_, notes)| notes.iter().map(|note| (*note).clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::group;
    use crate::model::note::{Note, NoteDate};

    fn note(date: &str, text: &str) -> Note {
        Note::new(NoteDate::parse(date).unwrap(), text)
    }

    #[test]
    fn groups_are_ordered_most_recent_first() {
        let notes = vec![note("2024-01-02", "a"), note("2024-01-05", "b")];
        let groups = group(&notes);
        let dates: Vec<&str> = groups
            .dates_recent_first()
            .into_iter()
            .map(NoteDate::as_str)
            .collect();
        assert_eq!(dates, vec!["2024-01-05", "2024-01-02"]);
    }

    #[test]
    fn group_preserves_insertion_order_within_date() {
        let notes = vec![
            note("2024-01-02", "one"),
            note("2024-01-03", "other"),
            note("2024-01-02", "two"),
            note("2024-01-02", "three"),
        ];
        let groups = group(&notes);
        let day = NoteDate::parse("2024-01-02").unwrap();
        let texts: Vec<&str> = groups
            .get(&day)
            .unwrap()
            .iter()
            .map(|n| n.text.as_str())
            .collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn regrouping_flattened_groups_reproduces_partition() {
        let notes = vec![
            note("2023-12-31", "x"),
            note("2024-01-02", "one"),
            note("2023-12-31", "y"),
            note("2024-01-02", "two"),
        ];
        let first = group(&notes);
        let flattened = first.to_notes();
        let second = group(&flattened);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_input_yields_no_groups() {
        assert!(group(&[]).is_empty());
    }
}
