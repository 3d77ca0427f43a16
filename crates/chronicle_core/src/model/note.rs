//! Note domain model.
//!
//! # Responsibility
//! - Define the record shared by the store, grouper and summarizer.
//! - Validate calendar-day keys once, at the type boundary.
//!
//! # Invariants
//! - `NoteId` is never empty and is never reused for another note.
//! - `NoteDate` is always zero-padded `YYYY-MM-DD` and a real calendar day.
//! - `NoteDate` ordering is plain string ordering, which matches
//!   chronological ordering because the format is fixed-width.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

static DATE_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date shape regex"));

/// Error returned when a note id or date fails validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteDateError {
    /// Input does not look like `YYYY-MM-DD`.
    InvalidFormat(String),
    /// Input has the right shape but is not a real calendar day.
    InvalidCalendarDay(String),
}

impl Display for NoteDateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFormat(value) => {
                write!(f, "date `{value}` must use the YYYY-MM-DD format")
            }
            Self::InvalidCalendarDay(value) => write!(f, "date `{value}` is not a calendar day"),
        }
    }
}

impl Error for NoteDateError {}

/// Calendar day used as the grouping key for notes.
///
/// Stored as its canonical string so comparisons never involve time zones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NoteDate(String);

impl NoteDate {
    /// Parses and validates a `YYYY-MM-DD` string.
    ///
    /// Surrounding whitespace is ignored; anything else that is not a
    /// zero-padded calendar day is rejected.
    pub fn parse(value: &str) -> Result<Self, NoteDateError> {
        let trimmed = value.trim();
        if !DATE_SHAPE_RE.is_match(trimmed) {
            return Err(NoteDateError::InvalidFormat(trimmed.to_string()));
        }
        NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
            .map_err(|_| NoteDateError::InvalidCalendarDay(trimmed.to_string()))?;
        Ok(Self(trimmed.to_string()))
    }

    /// Builds a key from an already-valid calendar day.
    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date.format(DATE_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NoteDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for NoteDate {
    type Error = NoteDateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<NoteDate> for String {
    fn from(value: NoteDate) -> Self {
        value.0
    }
}

/// Opaque stable note identifier.
///
/// New ids are hyphenless UUID v4 strings; ids loaded from older payloads
/// keep whatever non-empty shape they were written with.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NoteId(String);

impl NoteId {
    /// Generates a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Accepts any non-blank id, including legacy non-UUID shapes.
    pub fn parse(value: &str) -> Result<Self, String> {
        if value.trim().is_empty() {
            return Err("note id cannot be empty".to_string());
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for NoteId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for NoteId {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<NoteId> for String {
    fn from(value: NoteId) -> Self {
        value.0
    }
}

/// User-authored text bound to one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Grouping key.
    pub date: NoteDate,
    /// Raw user text; `\n` separates appended submissions.
    pub text: String,
}

impl Note {
    /// Creates a note with a generated id.
    pub fn new(date: NoteDate, text: impl Into<String>) -> Self {
        Self::with_id(NoteId::generate(), date, text)
    }

    /// Creates a note with a caller-provided id.
    ///
    /// Used by import paths and tests where identity already exists.
    pub fn with_id(id: NoteId, date: NoteDate, text: impl Into<String>) -> Self {
        Self {
            id,
            date,
            text: text.into(),
        }
    }

    /// Appends one submission using the newline separator.
    pub fn append_text(&mut self, text: &str) {
        self.text.push('\n');
        self.text.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, NoteDate, NoteDateError, NoteId};
    use chrono::NaiveDate;

    #[test]
    fn parse_accepts_padded_calendar_days() {
        let date = NoteDate::parse(" 2024-02-29 ").expect("leap day should parse");
        assert_eq!(date.as_str(), "2024-02-29");
    }

    #[test]
    fn parse_rejects_unpadded_and_impossible_days() {
        assert!(matches!(
            NoteDate::parse("2024-1-5"),
            Err(NoteDateError::InvalidFormat(_))
        ));
        assert!(matches!(
            NoteDate::parse("2023-02-29"),
            Err(NoteDateError::InvalidCalendarDay(_))
        ));
        assert!(matches!(
            NoteDate::parse("2024-01-05T10:00:00Z"),
            Err(NoteDateError::InvalidFormat(_))
        ));
    }

    #[test]
    fn from_naive_zero_pads() {
        let naive = NaiveDate::from_ymd_opt(2024, 3, 7).expect("valid date");
        assert_eq!(NoteDate::from_naive(naive).as_str(), "2024-03-07");
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(NoteId::generate(), NoteId::generate());
    }

    #[test]
    fn blank_ids_are_rejected_on_every_path() {
        assert!(NoteId::try_from("").is_err());
        assert!(NoteId::try_from("   ").is_err());
        assert!(NoteId::try_from(String::new()).is_err());
        assert!(serde_json::from_str::<NoteId>("\"\"").is_err());
        assert_eq!(NoteId::parse("legacy-7").unwrap().as_str(), "legacy-7");
    }

    #[test]
    fn append_text_uses_single_newline() {
        let mut note = Note::new(NoteDate::parse("2024-01-01").unwrap(), "first");
        note.append_text("second");
        assert_eq!(note.text, "first\nsecond");
    }
}
