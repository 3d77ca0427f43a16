//! Summarization provider contract.

use crate::grouping::DateGroups;
use crate::model::note::NoteDate;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Input for one date group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRequest {
    /// `YYYY-MM-DD`.
    pub date: String,
    /// Note texts in creation order.
    pub notes: Vec<String>,
}

/// Provider output for one date group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryError {
    /// Remote or backend failure reported by the provider.
    Provider(String),
    Timeout(Duration),
    MalformedInput(String),
    MalformedOutput(String),
}

impl Display for SummaryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Provider(message) => write!(f, "summary provider failed: {message}"),
            Self::Timeout(limit) => {
                write!(f, "summary provider timed out after {}ms", limit.as_millis())
            }
            Self::MalformedInput(message) => write!(f, "malformed summary request: {message}"),
            Self::MalformedOutput(message) => write!(f, "malformed summary response: {message}"),
        }
    }
}

impl Error for SummaryError {}

impl SummaryRequest {
    pub fn new(date: &NoteDate, notes: Vec<String>) -> Self {
        Self {
            date: date.to_string(),
            notes,
        }
    }

    /// One request per date group, most recent date first.
    pub fn from_groups(groups: &DateGroups<'_>) -> Vec<Self> {
        groups
            .texts_recent_first()
            .into_iter()
            .map(|(date, notes)| Self::new(&date, notes))
            .collect()
    }

    /// Checks the declared input shape.
    pub fn validate(&self) -> Result<(), SummaryError> {
        NoteDate::parse(&self.date).map_err(|err| SummaryError::MalformedInput(err.to_string()))?;
        if self.notes.is_empty() {
            return Err(SummaryError::MalformedInput(format!(
                "no notes for {}",
                self.date
            )));
        }
        Ok(())
    }
}

impl SummaryResponse {
    /// Checks the declared output shape.
    pub fn validate(&self) -> Result<(), SummaryError> {
        if self.summary.trim().is_empty() {
            return Err(SummaryError::MalformedOutput(
                "summary is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Opaque text-generation capability that reduces one day's notes.
///
/// Implementations own their retry policy; the orchestrator never retries.
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    async fn summarize(&self, request: SummaryRequest) -> Result<SummaryResponse, SummaryError>;
}

#[cfg(test)]
mod tests {
    use super::{SummaryError, SummaryRequest, SummaryResponse};
    use crate::grouping::group;
    use crate::model::note::{Note, NoteDate};

    #[test]
    fn from_groups_builds_one_request_per_date_recent_first() {
        let notes = vec![
            Note::new(NoteDate::parse("2024-01-02").unwrap(), "a"),
            Note::new(NoteDate::parse("2024-01-05").unwrap(), "b"),
            Note::new(NoteDate::parse("2024-01-02").unwrap(), "c"),
        ];
        let requests = SummaryRequest::from_groups(&group(&notes));
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].date, "2024-01-05");
        assert_eq!(requests[1].notes, vec!["a", "c"]);
    }

    #[test]
    fn request_validation_rejects_bad_date_and_empty_notes() {
        let bad_date = SummaryRequest {
            date: "01/02/2024".to_string(),
            notes: vec!["x".to_string()],
        };
        assert!(matches!(
            bad_date.validate(),
            Err(SummaryError::MalformedInput(_))
        ));

        let no_notes = SummaryRequest {
            date: "2024-01-02".to_string(),
            notes: Vec::new(),
        };
        assert!(matches!(
            no_notes.validate(),
            Err(SummaryError::MalformedInput(_))
        ));
    }

    #[test]
    fn response_validation_rejects_blank_summary() {
        let blank = SummaryResponse {
            summary: "  \n".to_string(),
        };
        assert!(matches!(
            blank.validate(),
            Err(SummaryError::MalformedOutput(_))
        ));
    }

    #[test]
    fn request_wire_shape_uses_date_and_notes() {
        let request = SummaryRequest {
            date: "2024-01-02".to_string(),
            notes: vec!["a".to_string(), "b".to_string()],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"date": "2024-01-02", "notes": ["a", "b"]}));
    }
}
