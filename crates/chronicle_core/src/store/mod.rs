//! In-memory note list synchronized with a persistence provider.
//!
//! # Responsibility
//! - Own the single authoritative note list for a session.
//! - Persist every committed list before exposing it.
//! - Publish a change signal after each commit.
//!
//! # Invariants
//! - In-memory and persisted state never diverge after a failed write.
//! - Reads at load time fail soft to an empty list.

mod note_store;

pub use note_store::{NoteStore, StoreError, DEFAULT_STORAGE_KEY};
