//! Core use-case services.
//!
//! # Responsibility
//! - Turn user intents (create/edit/delete) into validated store commits.
//! - Wire commits to notifications and summary refreshes.

pub mod daily;
pub mod note_service;
