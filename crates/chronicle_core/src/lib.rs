//! Core domain logic for Chronicle daily notes.
//! This crate is the single source of truth for note invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod grouping;
pub mod logging;
pub mod merge;
pub mod model;
pub mod notify;
pub mod service;
pub mod storage;
pub mod store;
pub mod summary;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, CoreConfig};
pub use grouping::{group, DateGroups};
pub use logging::{default_log_level, init_logging, logging_status};
pub use merge::{DateSelectionMode, MergeOutcome, MergePolicy};
pub use model::note::{Note, NoteDate, NoteDateError, NoteId};
pub use notify::{
    LogNotificationSink, Notification, NotificationKind, NotificationSink, RecordingSink,
};
pub use service::daily::DailyNotes;
pub use service::note_service::{NoteService, NoteServiceError, ValidationError};
pub use storage::{MemoryProvider, PersistenceProvider, SqliteProvider, StorageError};
pub use store::{NoteStore, StoreError, DEFAULT_STORAGE_KEY};
pub use summary::{
    DigestSummaryProvider, PromptSummaryProvider, RoundReport, SummaryBoard, SummaryError,
    SummaryOrchestrator, SummaryProvider, SummaryRequest, SummaryResponse, SummaryState,
    TextGenerator, FAILURE_PLACEHOLDER, GENERATING_PLACEHOLDER,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
