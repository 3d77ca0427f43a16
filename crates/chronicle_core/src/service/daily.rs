//! Daily notes session: CRUD plus summary refresh.
//!
//! # Responsibility
//! - Forward user intents to [`NoteService`].
//! - Start exactly one summarization round after each successful mutation.
//!
//! # Invariants
//! - Mutations and their persistence writes finish before any round starts.
//! - Rejected mutations never start a round.
//! - Rounds run in the background; callers are never blocked on a provider.

use crate::config::CoreConfig;
use crate::model::note::{Note, NoteDate, NoteId};
use crate::notify::NotificationSink;
use crate::service::note_service::{NoteService, NoteServiceError};
use crate::storage::PersistenceProvider;
use crate::summary::{RoundReport, SummaryBoard, SummaryOrchestrator, SummaryProvider};
use log::{debug, warn};
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

pub struct DailyNotes<P: PersistenceProvider, N: NotificationSink> {
    notes: NoteService<P, N>,
    summaries: SummaryOrchestrator,
    latest_round: Option<JoinHandle<RoundReport>>,
}

impl<P: PersistenceProvider, N: NotificationSink> DailyNotes<P, N> {
    pub fn new(notes: NoteService<P, N>, summaries: SummaryOrchestrator) -> Self {
        Self {
            notes,
            summaries,
            latest_round: None,
        }
    }

    /// Wires store, service and orchestrator from one config.
    pub fn from_config(
        provider: P,
        sink: N,
        summary_provider: Arc<dyn SummaryProvider>,
        config: &CoreConfig,
    ) -> Self {
        Self::new(
            NoteService::from_config(provider, sink, config),
            SummaryOrchestrator::from_config(summary_provider, config),
        )
    }

    pub fn create(
        &mut self,
        selected: Option<NoteDate>,
        text: &str,
    ) -> Result<Note, NoteServiceError> {
        let note = self.notes.create(selected, text)?;
        self.schedule_refresh();
        Ok(note)
    }

    pub fn edit(&mut self, id: &NoteId, text: &str) -> Result<Note, NoteServiceError> {
        let note = self.notes.edit(id, text)?;
        self.schedule_refresh();
        Ok(note)
    }

    pub fn delete(&mut self, id: &NoteId) -> Result<(), NoteServiceError> {
        self.notes.delete(id)?;
        self.schedule_refresh();
        Ok(())
    }

    pub fn delete_all_for_date(&mut self, date: &NoteDate) -> Result<usize, NoteServiceError> {
        let removed = self.notes.delete_all_for_date(date)?;
        self.schedule_refresh();
        Ok(removed)
    }

    /// Runs a round over the current groups; await it to wait for results.
    pub fn refresh_summaries(&self) -> impl Future<Output = RoundReport> + Send + 'static {
        self.summaries.run_round(&self.notes.groups())
    }

    /// Waits for the most recently scheduled background round, if any.
    pub async fn wait_for_latest_round(&mut self) -> Option<RoundReport> {
        let handle = self.latest_round.take()?;
        match handle.await {
            Ok(report) => Some(report),
            Err(err) => {
                warn!("event=summary_round module=session status=error error_code=join_failed error={err}");
                None
            }
        }
    }

    pub fn summaries(&self) -> SummaryBoard {
        self.summaries.board()
    }

    pub fn notes(&self) -> &NoteService<P, N> {
        &self.notes
    }

    fn schedule_refresh(&mut self) {
        if Handle::try_current().is_err() {
            debug!("event=summary_round module=session status=skip reason=no_runtime");
            return;
        }
        let handle = self.summaries.spawn_round(&self.notes.groups());
        self.latest_round = Some(handle);
    }
}
