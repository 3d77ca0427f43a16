//! Note CRUD use-case service.
//!
//! # Responsibility
//! - Validate submissions before any mutation.
//! - Apply the configured merge policy and date-selection mode.
//! - Persist every mutation through the store and notify the user.
//!
//! # Invariants
//! - A rejected call leaves the store untouched.
//! - A note's text is never blank right after a successful create or edit.
//! - `delete` is idempotent.

use crate::clock::{Clock, SystemClock};
use crate::config::CoreConfig;
use crate::grouping::{group, DateGroups};
use crate::merge::{DateSelectionMode, MergeOutcome, MergePolicy};
use crate::model::note::{Note, NoteDate, NoteId};
use crate::notify::{
    Notification, NotificationSink, TITLE_CREATED, TITLE_DATE_CLEARED, TITLE_DELETED,
    TITLE_EDITED, TITLE_EMPTY_TEXT, TITLE_NOT_FOUND, TITLE_NO_DATE, TITLE_SAVE_FAILED,
};
use crate::storage::PersistenceProvider;
use crate::store::{NoteStore, StoreError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use tokio::sync::watch;

/// Submission rejected before mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    EmptyText,
    NoDateSelected,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "note text cannot be empty"),
            Self::NoDateSelected => write!(f, "no date selected"),
        }
    }
}

impl Error for ValidationError {}

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    Validation(ValidationError),
    NotFound(NoteId),
    /// Persisting the mutated list failed; nothing was committed.
    Store(StoreError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<ValidationError> for NoteServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for NoteServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Note service facade over a [`NoteStore`].
pub struct NoteService<P: PersistenceProvider, N: NotificationSink> {
    store: NoteStore<P>,
    sink: N,
    policy: MergePolicy,
    date_mode: DateSelectionMode,
    clock: Box<dyn Clock>,
}

impl<P: PersistenceProvider, N: NotificationSink> NoteService<P, N> {
    /// Creates a service reading "today" from the system clock.
    pub fn new(
        store: NoteStore<P>,
        sink: N,
        policy: MergePolicy,
        date_mode: DateSelectionMode,
    ) -> Self {
        Self {
            store,
            sink,
            policy,
            date_mode,
            clock: Box::new(SystemClock),
        }
    }

    /// Opens the store under the configured key and applies config modes.
    pub fn from_config(provider: P, sink: N, config: &CoreConfig) -> Self {
        let store = NoteStore::open(provider, config.storage_key.as_str());
        Self::new(store, sink, config.merge_policy, config.date_mode)
    }

    /// Replaces the clock used by [`DateSelectionMode::Today`].
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Records `text` for the resolved target date.
    ///
    /// Returns the note that now holds the text: the new note, or the
    /// existing same-day note under [`MergePolicy::Accumulate`].
    pub fn create(
        &mut self,
        selected: Option<NoteDate>,
        text: &str,
    ) -> Result<Note, NoteServiceError> {
        let Some(date) = self.date_mode.resolve(selected, self.clock.as_ref()) else {
            return Err(self.reject(ValidationError::NoDateSelected));
        };
        if text.trim().is_empty() {
            return Err(self.reject(ValidationError::EmptyText));
        }

        let mut next = self.store.notes().to_vec();
        let outcome = self.policy.apply(&mut next, date.clone(), text);
        self.commit(next)?;

        let action = match outcome {
            MergeOutcome::Created(_) => "created",
            MergeOutcome::Appended(_) => "appended",
        };
        let note = outcome.into_note();
        info!(
            "event=note_create module=service status=ok action={action} note_id={} date={date}",
            note.id
        );
        self.sink.notify(Notification::info(TITLE_CREATED));
        Ok(note)
    }

    /// Replaces the text of one note.
    pub fn edit(&mut self, id: &NoteId, text: &str) -> Result<Note, NoteServiceError> {
        if text.trim().is_empty() {
            return Err(self.reject(ValidationError::EmptyText));
        }

        let mut next = self.store.notes().to_vec();
        let Some(target) = next.iter_mut().find(|note| note.id == *id) else {
            warn!("event=note_edit module=service status=error error_code=not_found note_id={id}");
            self.sink.notify(Notification::error(TITLE_NOT_FOUND));
            return Err(NoteServiceError::NotFound(id.clone()));
        };
        target.text = text.to_string();
        let edited = target.clone();
        self.commit(next)?;

        info!(
            "event=note_edit module=service status=ok note_id={id} date={}",
            edited.date
        );
        self.sink.notify(Notification::info(TITLE_EDITED));
        Ok(edited)
    }

    /// Removes one note; unknown ids are a successful no-op.
    pub fn delete(&mut self, id: &NoteId) -> Result<(), NoteServiceError> {
        let mut next = self.store.notes().to_vec();
        let before = next.len();
        next.retain(|note| note.id != *id);
        let removed = before - next.len();
        self.commit(next)?;

        info!("event=note_delete module=service status=ok note_id={id} removed={removed}");
        self.sink.notify(Notification::info(TITLE_DELETED));
        Ok(())
    }

    /// Removes every note for `date`; returns how many were removed.
    pub fn delete_all_for_date(&mut self, date: &NoteDate) -> Result<usize, NoteServiceError> {
        let mut next = self.store.notes().to_vec();
        let before = next.len();
        next.retain(|note| note.date != *date);
        let removed = before - next.len();
        self.commit(next)?;

        info!("event=note_delete_date module=service status=ok date={date} removed={removed}");
        self.sink.notify(Notification::info(TITLE_DATE_CLEARED));
        Ok(removed)
    }

    pub fn notes(&self) -> &[Note] {
        self.store.notes()
    }

    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.store.notes().iter().find(|note| note.id == *id)
    }

    /// Notes for one day in insertion order.
    pub fn notes_for_date(&self, date: &NoteDate) -> Vec<&Note> {
        self.store
            .notes()
            .iter()
            .filter(|note| note.date == *date)
            .collect()
    }

    /// Current date groups, derived on demand from the store.
    pub fn groups(&self) -> DateGroups<'_> {
        group(self.store.notes())
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.store.subscribe()
    }

    pub fn store(&self) -> &NoteStore<P> {
        &self.store
    }

    pub fn merge_policy(&self) -> MergePolicy {
        self.policy
    }

    pub fn date_mode(&self) -> DateSelectionMode {
        self.date_mode
    }

    fn reject(&self, err: ValidationError) -> NoteServiceError {
        let title = match err {
            ValidationError::EmptyText => TITLE_EMPTY_TEXT,
            ValidationError::NoDateSelected => TITLE_NO_DATE,
        };
        warn!("event=note_validate module=service status=error error_code={err:?}");
        self.sink.notify(Notification::error(title));
        err.into()
    }

    fn commit(&mut self, next: Vec<Note>) -> Result<(), NoteServiceError> {
        if let Err(err) = self.store.replace(next) {
            self.sink.notify(Notification::error(TITLE_SAVE_FAILED));
            return Err(err.into());
        }
        Ok(())
    }
}
