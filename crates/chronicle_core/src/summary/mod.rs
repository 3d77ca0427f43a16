//! Per-date summarization pipeline.
//!
//! # Responsibility
//! - Define the summarization provider boundary and its request shapes.
//! - Fan one provider call out per date group and record each result alone.
//!
//! # Invariants
//! - A failing date never changes the state of a sibling date.
//! - Note texts reach the provider in creation order.
//! - Summaries are transient; nothing here is persisted.

pub mod digest;
pub mod orchestrator;
pub mod prompt;
pub mod provider;

pub use digest::DigestSummaryProvider;
pub use orchestrator::{
    RoundReport, SummaryBoard, SummaryOrchestrator, SummaryState, FAILURE_PLACEHOLDER,
    GENERATING_PLACEHOLDER,
};
pub use prompt::{render_prompt, PromptSummaryProvider, TextGenerator};
pub use provider::{SummaryError, SummaryProvider, SummaryRequest, SummaryResponse};
