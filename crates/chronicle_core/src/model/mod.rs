//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record and its identity/date newtypes.
//! - Keep persisted wire shape (`id`, `date`, `text`) stable.
//!
//! # Invariants
//! - Every note is identified by a non-empty `NoteId`.
//! - Every note date is a validated `YYYY-MM-DD` calendar day.

pub mod note;
