use crate::error::Result;
use crate::models::{EntryContent, LogEntry, TurnRange};

/// Default maximum characters kept per summarized line.
pub const DEFAULT_MAX_LINE_CHARS: usize = 200;

/// Produces the text of a summary entry for a run of turns.
pub trait Summarizer: Send + Sync {
    fn summarize(&self, range: TurnRange, entries: &[LogEntry]) -> Result<String>;
}

/// Digest of the summarized turns, one truncated line per entry. Makes no
/// model call.
#[derive(Debug, Clone)]
pub struct TranscriptSummarizer {
    max_line_chars: usize,
}

impl TranscriptSummarizer {
    pub fn new(max_line_chars: usize) -> Self {
        Self { max_line_chars }
    }

    pub fn max_line_chars(&self) -> usize {
        self.max_line_chars
    }

    fn format_entry(&self, entry: &LogEntry) -> String {
        let line = match &entry.content {
            EntryContent::Text(text) => format!("{}: {text}", entry.author),
            EntryContent::ToolCall { name, arguments } => {
                format!("Tool call {name}({arguments})")
            }
            EntryContent::ToolResult { name, output } => {
                let output = match output {
                    serde_json::Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                format!("Tool result {name}: {output}")
            }
        };
        truncate_with_ellipsis(&line, self.max_line_chars)
    }
}

impl Default for TranscriptSummarizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_CHARS)
    }
}

impl Summarizer for TranscriptSummarizer {
    fn summarize(&self, range: TurnRange, entries: &[LogEntry]) -> Result<String> {
        let mut output = format!(
            "[Conversation summary: turns {range}, {} entries compacted]",
            entries.len()
        );
        for entry in entries {
            output.push('\n');
            output.push_str(&self.format_entry(entry));
        }
        Ok(output)
    }
}

/// Truncate to at most `max_chars` characters, marking the cut with "...".
fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Author;
    use serde_json::json;

    fn entry(author: Author, content: EntryContent, turn_index: u64) -> LogEntry {
        LogEntry {
            author,
            content,
            turn_index,
        }
    }

    #[test]
    fn test_summary_lists_each_entry() {
        let entries = vec![
            entry(Author::User, EntryContent::text("Ship 10 containers"), 0),
            entry(
                Author::Agent,
                EntryContent::tool_call("place_shipping_order", json!({ "num_containers": 10 })),
                1,
            ),
            entry(
                Author::Tool,
                EntryContent::tool_result("place_shipping_order", json!("pending")),
                2,
            ),
        ];

        let summary = TranscriptSummarizer::default()
            .summarize(TurnRange::new(0, 2), &entries)
            .unwrap();
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(
            lines,
            vec![
                "[Conversation summary: turns 0-2, 3 entries compacted]",
                "User: Ship 10 containers",
                "Tool call place_shipping_order({\"num_containers\":10})",
                "Tool result place_shipping_order: pending",
            ]
        );
    }

    #[test]
    fn test_long_lines_are_truncated() {
        let long = "x".repeat(500);
        let summarizer = TranscriptSummarizer::new(20);
        let summary = summarizer
            .summarize(
                TurnRange::new(4, 4),
                &[entry(Author::User, EntryContent::text(long), 4)],
            )
            .unwrap();
        let line = summary.lines().nth(1).unwrap();
        assert_eq!(line.chars().count(), 20);
        assert!(line.ends_with("..."));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        assert_eq!(truncate_with_ellipsis("héllo wörld", 8), "héllo...");
        assert_eq!(truncate_with_ellipsis("short", 8), "short");
    }
}
