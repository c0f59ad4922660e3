use serde::Serialize;
use tracing::debug;

use super::policy::CompactionPolicy;
use super::summarizer::{Summarizer, TranscriptSummarizer};
use crate::error::Result;
use crate::models::{Author, Entry, EntryContent, LogEntry, SummaryEntry, TurnRange};

/// What a compaction pass did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompactionReport {
    pub entries_summarized: usize,
    pub covered_range: TurnRange,
    pub entries_after: usize,
}

/// Ordered entries of one session.
///
/// Summaries always form a contiguous prefix of the log; everything after
/// them is verbatim turns in append order. Each pass adds a summary, so the
/// prefix grows by one entry per pass and is never merged.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationLog {
    entries: Vec<Entry>,
    policy: CompactionPolicy,
    #[serde(skip)]
    next_turn: u64,
}

impl ConversationLog {
    pub fn new(policy: CompactionPolicy) -> Self {
        Self {
            entries: Vec::new(),
            policy,
            next_turn: 0,
        }
    }

    /// Append a turn and return its turn index.
    pub fn append(&mut self, author: Author, content: impl Into<EntryContent>) -> u64 {
        let turn_index = self.next_turn;
        self.next_turn += 1;
        self.entries.push(Entry::Turn(LogEntry {
            author,
            content: content.into(),
            turn_index,
        }));
        turn_index
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn policy(&self) -> &CompactionPolicy {
        &self.policy
    }

    /// Index of the last compaction boundary: the number of leading summaries.
    pub fn boundary(&self) -> usize {
        self.entries
            .iter()
            .take_while(|entry| entry.is_summary())
            .count()
    }

    pub fn summaries(&self) -> impl Iterator<Item = &SummaryEntry> {
        self.entries.iter().filter_map(Entry::as_summary)
    }

    pub fn turns(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter_map(Entry::as_turn)
    }

    /// Whether the next `maybe_compact` call would run a pass.
    pub fn needs_compaction(&self) -> bool {
        self.policy.should_compact(self.entries.len() - self.boundary())
    }

    /// Compact with the default [`TranscriptSummarizer`].
    pub fn maybe_compact(&mut self) -> Result<bool> {
        self.maybe_compact_with(&TranscriptSummarizer::default())
    }

    /// Compact with `summarizer`; returns whether a pass ran.
    pub fn maybe_compact_with(&mut self, summarizer: &dyn Summarizer) -> Result<bool> {
        Ok(self.compact_report(summarizer)?.is_some())
    }

    /// Run a compaction pass if the policy calls for one.
    ///
    /// Turns between the existing summaries and the last `overlap_size`
    /// entries are folded into one new summary placed after the existing
    /// ones. If the summarizer fails the log is left untouched.
    pub fn compact_report(
        &mut self,
        summarizer: &dyn Summarizer,
    ) -> Result<Option<CompactionReport>> {
        if !self.needs_compaction() {
            return Ok(None);
        }

        let boundary = self.boundary();
        let split = self.entries.len() - self.policy.overlap_size();
        let prefix: Vec<LogEntry> = self.entries[boundary..split]
            .iter()
            .filter_map(Entry::as_turn)
            .cloned()
            .collect();

        let (Some(first), Some(last)) = (prefix.first(), prefix.last()) else {
            return Ok(None);
        };
        let covered_range = TurnRange::new(first.turn_index, last.turn_index);
        let content = summarizer.summarize(covered_range, &prefix)?;

        let overlap = self.entries.split_off(split);
        self.entries.truncate(boundary);
        self.entries.push(Entry::Summary(SummaryEntry::new(content, covered_range)));
        self.entries.extend(overlap);

        let report = CompactionReport {
            entries_summarized: prefix.len(),
            covered_range,
            entries_after: self.entries.len(),
        };
        debug!(
            summarized = report.entries_summarized,
            covered = %report.covered_range,
            entries_after = report.entries_after,
            "Compacted conversation log"
        );
        Ok(Some(report))
    }
}
