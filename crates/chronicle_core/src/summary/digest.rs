//! Offline provider that lists the first lines of a day's notes.

use super::provider::{SummaryError, SummaryProvider, SummaryRequest, SummaryResponse};
use async_trait::async_trait;

const MAX_LINE_CHARS: usize = 80;

#[derive(Debug, Clone, Copy, Default)]
pub struct DigestSummaryProvider;

#[async_trait]
impl SummaryProvider for DigestSummaryProvider {
    async fn summarize(&self, request: SummaryRequest) -> Result<SummaryResponse, SummaryError> {
        request.validate()?;
        let entries: Vec<String> = request
            .notes
            .iter()
            .flat_map(|note| note.lines())
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| clip(line, MAX_LINE_CHARS))
            .collect();
        let summary = format!(
            "{} entr{} for {}: {}",
            entries.len(),
            if entries.len() == 1 { "y" } else { "ies" },
            request.date,
            entries.join("; ")
        );
        Ok(SummaryResponse { summary })
    }
}

fn clip(line: &str, max_chars: usize) -> String {
    if line.chars().count() <= max_chars {
        return line.to_string();
    }
    let mut clipped: String = line.chars().take(max_chars).collect();
    clipped.push_str("...");
    clipped
}

#[cfg(test)]
mod tests {
    use super::DigestSummaryProvider;
    use crate::summary::provider::{SummaryProvider, SummaryRequest};

    #[tokio::test]
    async fn digest_splits_accumulated_notes_into_entries() {
        let response = DigestSummaryProvider
            .summarize(SummaryRequest {
                date: "2024-01-05".to_string(),
                notes: vec!["gym\ncall mom".to_string(), "  ".to_string()],
            })
            .await
            .unwrap();
        assert_eq!(response.summary, "2 entries for 2024-01-05: gym; call mom");
    }
}
