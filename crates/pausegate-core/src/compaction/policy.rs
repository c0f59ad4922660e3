use serde::Serialize;

use crate::error::{Error, Result};

/// Sliding-window compaction settings, validated at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompactionPolicy {
    compaction_interval: usize,
    overlap_size: usize,
}

impl CompactionPolicy {
    /// Both values must be positive with `overlap_size < compaction_interval`;
    /// otherwise a pass would summarize nothing.
    pub fn new(compaction_interval: usize, overlap_size: usize) -> Result<Self> {
        if compaction_interval == 0 || overlap_size == 0 || overlap_size >= compaction_interval {
            return Err(Error::InvalidCompactionConfig {
                compaction_interval,
                overlap_size,
            });
        }
        Ok(Self {
            compaction_interval,
            overlap_size,
        })
    }

    pub fn compaction_interval(&self) -> usize {
        self.compaction_interval
    }

    pub fn overlap_size(&self) -> usize {
        self.overlap_size
    }

    /// Whether `unsummarized` entries past the last boundary warrant a pass.
    pub fn should_compact(&self, unsummarized: usize) -> bool {
        unsummarized >= self.compaction_interval
    }
}
