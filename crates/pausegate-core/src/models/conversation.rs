//! Conversation log entries.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role that contributed a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    User,
    Agent,
    Tool,
    System,
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Author::User => "User",
            Author::Agent => "Agent",
            Author::Tool => "Tool",
            Author::System => "System",
        };
        f.write_str(label)
    }
}

/// Text or structured payload of a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryContent {
    Text(String),
    ToolCall { name: String, arguments: Value },
    ToolResult { name: String, output: Value },
}

impl EntryContent {
    pub fn text(text: impl Into<String>) -> Self {
        EntryContent::Text(text.into())
    }

    pub fn tool_call(name: impl Into<String>, arguments: Value) -> Self {
        EntryContent::ToolCall {
            name: name.into(),
            arguments,
        }
    }

    pub fn tool_result(name: impl Into<String>, output: Value) -> Self {
        EntryContent::ToolResult {
            name: name.into(),
            output,
        }
    }
}

impl From<&str> for EntryContent {
    fn from(text: &str) -> Self {
        EntryContent::text(text)
    }
}

impl From<String> for EntryContent {
    fn from(text: String) -> Self {
        EntryContent::Text(text)
    }
}

/// One turn contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub author: Author,
    pub content: EntryContent,
    pub turn_index: u64,
}

/// Inclusive range of turn indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRange {
    pub start: u64,
    pub end: u64,
}

impl TurnRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, turn_index: u64) -> bool {
        (self.start..=self.end).contains(&turn_index)
    }
}

impl fmt::Display for TurnRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Synthetic entry standing in for a contiguous run of older turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub author: Author,
    pub content: String,
    /// Last turn covered
    pub turn_index: u64,
    pub covered_range: TurnRange,
}

impl SummaryEntry {
    pub fn new(content: impl Into<String>, covered_range: TurnRange) -> Self {
        Self {
            author: Author::System,
            content: content.into(),
            turn_index: covered_range.end,
            covered_range,
        }
    }
}

/// An element of a conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entry {
    Turn(LogEntry),
    Summary(SummaryEntry),
}

impl Entry {
    pub fn author(&self) -> Author {
        match self {
            Entry::Turn(entry) => entry.author,
            Entry::Summary(summary) => summary.author,
        }
    }

    pub fn turn_index(&self) -> u64 {
        match self {
            Entry::Turn(entry) => entry.turn_index,
            Entry::Summary(summary) => summary.turn_index,
        }
    }

    pub fn is_summary(&self) -> bool {
        matches!(self, Entry::Summary(_))
    }

    pub fn as_turn(&self) -> Option<&LogEntry> {
        match self {
            Entry::Turn(entry) => Some(entry),
            Entry::Summary(_) => None,
        }
    }

    pub fn as_summary(&self) -> Option<&SummaryEntry> {
        match self {
            Entry::Summary(summary) => Some(summary),
            Entry::Turn(_) => None,
        }
    }
}
