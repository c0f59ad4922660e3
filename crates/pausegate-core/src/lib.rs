//! Pausegate - approval gating and history compaction for agent runs
//!
//! This crate provides:
//! - Pause/resume approval engine with resume tokens and staleness expiry
//! - Pluggable auto-approval predicates (threshold rules, closures)
//! - In-memory and redb-backed pending approval stores
//! - Async approval service with notification callbacks and a sweeper task
//! - Sliding-window conversation history compaction

pub mod approval;
pub mod compaction;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use approval::{
    ApprovalEngine, ApprovalPredicate, FnPredicate, RequireApproval, ThresholdRule,
    TokenGenerator, UuidTokenGenerator, from_fn,
};
pub use compaction::{
    CompactionPolicy, CompactionReport, ConversationLog, Summarizer, TranscriptSummarizer,
};
pub use config::PausegateConfig;
pub use error::{Error, PredicateError, Result};
pub use models::*;
pub use service::{ApprovalCallback, ApprovalService};
pub use store::{InMemoryPendingStore, PendingStore, RedbPendingStore};
