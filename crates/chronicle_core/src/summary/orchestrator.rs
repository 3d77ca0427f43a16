//! Concurrent per-date summarization rounds.
//!
//! # Responsibility
//! - Run one provider call per date group, all in flight at once.
//! - Record each result on the shared board as soon as it resolves.
//!
//! # Invariants
//! - Per date: `Pending -> Generating -> Succeeded | Failed`.
//! - Errors, timeouts and panics are captured per date and never abort the
//!   round or touch sibling dates.
//! - No cancellation: overlapping rounds resolve last-writer-wins per date,
//!   but never resurrect a date that a newer round dropped.
//! - A board entry's `input` is always the texts its current state was
//!   derived from, even when a slower round overwrites a newer one.

use super::provider::{SummaryError, SummaryProvider, SummaryRequest};
use crate::config::CoreConfig;
use crate::grouping::DateGroups;
use crate::model::note::NoteDate;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use log::{info, warn};
use std::collections::BTreeMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

pub const GENERATING_PLACEHOLDER: &str = "Generating summary...";
pub const FAILURE_PLACEHOLDER: &str = "Failed to generate summary.";

/// Summary lifecycle for one date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryState {
    Pending,
    Generating,
    Succeeded(String),
    /// Holds the user-facing failure text, not the provider error.
    Failed(String),
}

impl SummaryState {
    /// Text to show for this date right now.
    pub fn display_text(&self) -> &str {
        match self {
            Self::Pending | Self::Generating => GENERATING_PLACEHOLDER,
            Self::Succeeded(summary) => summary,
            Self::Failed(message) => message,
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct BoardEntry {
    state: SummaryState,
    round: u64,
    /// Note texts the current state was (or is being) derived from.
    input: Vec<String>,
}

/// Per-date summary states shared with the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryBoard {
    entries: BTreeMap<NoteDate, BoardEntry>,
}

impl SummaryBoard {
    pub fn state(&self, date: &NoteDate) -> Option<&SummaryState> {
        self.entries.get(date).map(|entry| &entry.state)
    }

    pub fn display_text(&self, date: &NoteDate) -> Option<&str> {
        self.state(date).map(SummaryState::display_text)
    }

    /// Round that last wrote the date.
    pub fn round_of(&self, date: &NoteDate) -> Option<u64> {
        self.entries.get(date).map(|entry| entry.round)
    }

    pub fn entries_recent_first(&self) -> Vec<(NoteDate, SummaryState)> {
        self.entries
            .iter()
            .rev()
            .map(|(date, entry)| (date.clone(), entry.state.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True once every tracked date has a final state.
    pub fn is_settled(&self) -> bool {
        self.entries.values().all(|entry| entry.state.is_settled())
    }

    fn reusable(&self, date: &NoteDate, input: &[String]) -> bool {
        self.entries.get(date).is_some_and(|entry| {
            matches!(entry.state, SummaryState::Succeeded(_)) && entry.input == input
        })
    }
}

/// Counters for one completed round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundReport {
    pub round: u64,
    /// Dates sent to the provider.
    pub requested: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Dates skipped because their texts were unchanged.
    pub reused: usize,
}

struct PreparedRound {
    id: u64,
    requests: Vec<(NoteDate, SummaryRequest)>,
    reused: usize,
}

/// Drives summarization rounds against one provider.
///
/// Cloning is cheap; clones share the provider, the board and the round
/// counter.
#[derive(Clone)]
pub struct SummaryOrchestrator {
    provider: Arc<dyn SummaryProvider>,
    board: Arc<Mutex<SummaryBoard>>,
    rounds: Arc<AtomicU64>,
    timeout: Duration,
    reuse_unchanged: bool,
}

impl SummaryOrchestrator {
    pub fn new(provider: Arc<dyn SummaryProvider>, timeout: Duration) -> Self {
        Self {
            provider,
            board: Arc::new(Mutex::new(SummaryBoard::default())),
            rounds: Arc::new(AtomicU64::new(0)),
            timeout,
            reuse_unchanged: false,
        }
    }

    pub fn from_config(provider: Arc<dyn SummaryProvider>, config: &CoreConfig) -> Self {
        Self::new(provider, config.summary_timeout())
            .with_reuse_unchanged(config.reuse_unchanged_summaries)
    }

    /// Skips dates whose texts match their last successful summary input.
    pub fn with_reuse_unchanged(mut self, enabled: bool) -> Self {
        self.reuse_unchanged = enabled;
        self
    }

    /// Snapshot of the current board.
    pub fn board(&self) -> SummaryBoard {
        self.lock_board().clone()
    }

    /// Starts a round and returns a future that completes it.
    ///
    /// The board is updated synchronously before this returns: dates absent
    /// from `groups` are dropped and every requested date turns `Pending`.
    /// The returned future borrows nothing from `groups`.
    pub fn run_round(
        &self,
        groups: &DateGroups<'_>,
    ) -> impl Future<Output = RoundReport> + Send + 'static {
        let prepared = self.begin_round(groups);
        let this = self.clone();
        async move { this.execute(prepared).await }
    }

    /// Starts a round in the background on the current tokio runtime.
    ///
    /// # Panics
    /// - When called outside a tokio runtime.
    pub fn spawn_round(&self, groups: &DateGroups<'_>) -> JoinHandle<RoundReport> {
        tokio::spawn(self.run_round(groups))
    }

    fn begin_round(&self, groups: &DateGroups<'_>) -> PreparedRound {
        let id = self.rounds.fetch_add(1, Ordering::SeqCst) + 1;
        let texts = groups.texts_recent_first();
        let mut board = self.lock_board();
        board
            .entries
            .retain(|date, _| texts.iter().any(|(current, _)| current == date));

        let mut requests = Vec::with_capacity(texts.len());
        let mut reused = 0;
        for (date, notes) in texts {
            if self.reuse_unchanged && board.reusable(&date, &notes) {
                reused += 1;
                continue;
            }
            board.entries.insert(
                date.clone(),
                BoardEntry {
                    state: SummaryState::Pending,
                    round: id,
                    input: notes.clone(),
                },
            );
            let request = SummaryRequest::new(&date, notes);
            requests.push((date, request));
        }

        info!(
            "event=summary_round module=summary status=start round={id} dates={} reused={reused}",
            requests.len()
        );
        PreparedRound {
            id,
            requests,
            reused,
        }
    }

    async fn execute(self, round: PreparedRound) -> RoundReport {
        let started_at = Instant::now();
        let mut report = RoundReport {
            round: round.id,
            requested: round.requests.len(),
            reused: round.reused,
            ..RoundReport::default()
        };

        let mut in_flight: FuturesUnordered<_> = round
            .requests
            .into_iter()
            .map(|(date, request)| {
                let input = request.notes.clone();
                self.update(&date, round.id, SummaryState::Generating, &input);
                let provider = Arc::clone(&self.provider);
                let timeout = self.timeout;
                async move {
                    let outcome = summarize_isolated(provider.as_ref(), request, timeout).await;
                    (date, input, outcome)
                }
            })
            .collect();

        while let Some((date, input, outcome)) = in_flight.next().await {
            let state = match outcome {
                Ok(summary) => {
                    report.succeeded += 1;
                    SummaryState::Succeeded(summary)
                }
                Err(err) => {
                    report.failed += 1;
                    warn!(
                        "event=summary_date module=summary status=error round={} date={date} error={err}",
                        round.id
                    );
                    SummaryState::Failed(FAILURE_PLACEHOLDER.to_string())
                }
            };
            self.update(&date, round.id, state, &input);
        }

        info!(
            "event=summary_round module=summary status=ok round={} requested={} succeeded={} failed={} reused={} duration_ms={}",
            report.round,
            report.requested,
            report.succeeded,
            report.failed,
            report.reused,
            started_at.elapsed().as_millis()
        );
        report
    }

    /// Writes `state` for a date still on the board, tagged with the round
    /// and texts that produced it. Dates dropped since are left alone.
    fn update(&self, date: &NoteDate, round: u64, state: SummaryState, input: &[String]) {
        let mut board = self.lock_board();
        if let Some(entry) = board.entries.get_mut(date) {
            if entry.input != input {
                info!(
                    "event=summary_date module=summary status=input_replaced date={date} round={round} previous_round={}",
                    entry.round
                );
                entry.input = input.to_vec();
            }
            entry.state = state;
            entry.round = round;
        }
    }

    fn lock_board(&self) -> MutexGuard<'_, SummaryBoard> {
        self.board.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn summarize_isolated(
    provider: &dyn SummaryProvider,
    request: SummaryRequest,
    timeout: Duration,
) -> Result<String, SummaryError> {
    request.validate()?;
    let call = AssertUnwindSafe(provider.summarize(request)).catch_unwind();
    let response = match tokio::time::timeout(timeout, call).await {
        Err(_) => return Err(SummaryError::Timeout(timeout)),
        Ok(Err(_)) => return Err(SummaryError::Provider("provider panicked".to_string())),
        Ok(Ok(result)) => result?,
    };
    response.validate()?;
    Ok(response.summary.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::{SummaryOrchestrator, SummaryState, FAILURE_PLACEHOLDER, GENERATING_PLACEHOLDER};
    use crate::grouping::group;
    use crate::model::note::{Note, NoteDate};
    use crate::summary::provider::{
        SummaryError, SummaryProvider, SummaryRequest, SummaryResponse,
    };
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    struct PanickingProvider;

    #[async_trait]
    impl SummaryProvider for PanickingProvider {
        async fn summarize(
            &self,
            request: SummaryRequest,
        ) -> Result<SummaryResponse, SummaryError> {
            if request.date == "2024-01-02" {
                panic!("boom");
            }
            Ok(SummaryResponse {
                summary: format!("ok {}", request.date),
            })
        }
    }

    fn day(value: &str) -> NoteDate {
        NoteDate::parse(value).unwrap()
    }

    #[test]
    fn placeholder_text_tracks_state() {
        assert_eq!(SummaryState::Pending.display_text(), GENERATING_PLACEHOLDER);
        assert_eq!(
            SummaryState::Generating.display_text(),
            GENERATING_PLACEHOLDER
        );
        assert_eq!(
            SummaryState::Succeeded("done".to_string()).display_text(),
            "done"
        );
    }

    #[tokio::test]
    async fn provider_panic_is_contained_to_its_date() {
        let notes = vec![
            Note::new(day("2024-01-02"), "a"),
            Note::new(day("2024-01-03"), "b"),
        ];
        let orchestrator =
            SummaryOrchestrator::new(Arc::new(PanickingProvider), Duration::from_secs(5));

        let report = orchestrator.run_round(&group(&notes)).await;

        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);
        let board = orchestrator.board();
        assert_eq!(
            board.display_text(&day("2024-01-02")),
            Some(FAILURE_PLACEHOLDER)
        );
        assert_eq!(board.display_text(&day("2024-01-03")), Some("ok 2024-01-03"));
    }

    #[tokio::test]
    async fn begin_round_marks_dates_pending_before_execution() {
        let notes = vec![Note::new(day("2024-01-02"), "a")];
        let orchestrator =
            SummaryOrchestrator::new(Arc::new(PanickingProvider), Duration::from_secs(5));

        let round = orchestrator.run_round(&group(&notes));
        assert_eq!(
            orchestrator.board().state(&day("2024-01-02")),
            Some(&SummaryState::Pending)
        );
        drop(round);
    }
}
