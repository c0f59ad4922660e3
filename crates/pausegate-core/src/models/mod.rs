//! Data model shared by the approval engine and the compaction policy.

pub mod approval;
pub mod conversation;

pub use approval::{
    ActionId, ActionRequest, ApprovalKind, ApprovalPrompt, ApprovalStatus, Decision, Outcome,
    Parameters, PendingApproval, ResumeToken,
};
pub use conversation::{Author, Entry, EntryContent, LogEntry, SummaryEntry, TurnRange};
