//! History compaction for conversation logs.
//!
//! # Architecture
//!
//! ```text
//! before:  [S1] [t4] [t5] [t6] [t7] [t8]        interval = 4, overlap = 2
//!           └┬┘  └──── unsummarized ───┘
//!        boundary = 1
//!
//! after:   [S1] [S2: t4-t6] [t7] [t8]
//!           │        │       └─overlap─┘
//!           │        └ new summary of the prefix
//!           └ earlier summaries are kept as-is
//! ```
//!
//! A pass runs when the number of entries after the last boundary reaches
//! `compaction_interval`. Right after a pass only `overlap_size` entries
//! remain past the boundary, so calling `maybe_compact` again is a no-op.
//!
//! Only the verbatim tail is bounded, to fewer than `compaction_interval`
//! entries. Every pass appends one summary and existing summaries are never
//! merged, so a long session carries one summary per pass and the summary
//! prefix grows without limit.

mod log;
mod policy;
mod summarizer;

pub use log::{CompactionReport, ConversationLog};
pub use policy::CompactionPolicy;
pub use summarizer::{DEFAULT_MAX_LINE_CHARS, Summarizer, TranscriptSummarizer};
