use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use pausegate_core::{Author, ConversationLog, Entry, EntryContent, PausegateConfig};
use serde::Deserialize;
use serde_json::json;

use crate::output::OutputFormat;

#[derive(Debug, Deserialize)]
struct TranscriptTurn {
    author: Author,
    content: EntryContent,
}

pub fn run(transcript: &Path, config: &PausegateConfig, format: OutputFormat) -> Result<()> {
    let raw = std::fs::read_to_string(transcript)
        .with_context(|| format!("Failed to read transcript {}", transcript.display()))?;
    let turns: Vec<TranscriptTurn> = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid transcript {}", transcript.display()))?;

    let summarizer = config.compaction.summarizer();
    let mut log = ConversationLog::new(config.compaction.policy()?);
    let mut passes = 0usize;
    for turn in turns {
        log.append(turn.author, turn.content);
        if log.maybe_compact_with(&summarizer)? {
            passes += 1;
        }
    }

    format.emit(&json!({ "passes": passes, "log": log }), |_| {
        print_log(&log, passes);
        Ok(())
    })
}

fn print_log(log: &ConversationLog, passes: usize) {
    println!(
        "{} {} compaction pass(es), {} entries remain",
        "✓".green(),
        passes,
        log.len()
    );
    for entry in log.entries() {
        match entry {
            Entry::Summary(summary) => {
                println!("\n{} turns {}", "[summary]".cyan(), summary.covered_range);
                for line in summary.content.lines() {
                    println!("  {}", line.dimmed());
                }
            }
            Entry::Turn(turn) => {
                println!("\n#{} {}: {}", turn.turn_index, turn.author, render(&turn.content));
            }
        }
    }
}

fn render(content: &EntryContent) -> String {
    match content {
        EntryContent::Text(text) => text.clone(),
        EntryContent::ToolCall { name, arguments } => format!("call {name}({arguments})"),
        EntryContent::ToolResult { name, output } => format!("result {name}: {output}"),
    }
}
