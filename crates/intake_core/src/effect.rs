use std::time::Duration;

use crate::{DocumentRecord, ItemId, SourceFile};

/// How long the success indicator stays up before the workflow resets.
pub const SUCCESS_RESET_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ExtractSingle { file: SourceFile },
    ExtractBatch { files: Vec<SourceFile> },
    SubmitSingle { job: SubmissionJob },
    SubmitBatch { jobs: Vec<SubmissionJob> },
    ScheduleReset { after: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionMode {
    Single,
    Batch,
}

impl SubmissionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionMode::Single => "single",
            SubmissionMode::Batch => "batch",
        }
    }
}

/// One record to forward downstream, with its source file when available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionJob {
    /// `None` for the single-item review.
    pub item_id: Option<ItemId>,
    pub mode: SubmissionMode,
    pub record: DocumentRecord,
    pub file: Option<SourceFile>,
}
