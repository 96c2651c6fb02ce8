use crate::{DocumentRecord, ItemId, SourceFile};

/// A successfully extracted file, identified by its position in the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFile {
    pub index: usize,
    pub record: DocumentRecord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked or dropped files.
    FilesSelected(Vec<SourceFile>),
    /// Batch extraction moved on to file `current` (1-based) of `total`.
    ExtractionProgress { current: usize, total: usize },
    /// Single-file extraction finished; errors are user-facing messages.
    SingleExtracted(Result<DocumentRecord, String>),
    /// Batch extraction finished. `Ok` carries only the successful files.
    BatchExtracted(Result<Vec<ExtractedFile>, String>),
    /// User confirmed the single-item review.
    ConfirmClicked,
    /// User confirmed the whole batch.
    ConfirmAllClicked,
    /// Single submission finished.
    SubmissionFinished(Result<(), String>),
    /// Batch submission finished; `submitted` lists delivered items in order.
    BatchSubmissionFinished {
        submitted: Vec<ItemId>,
        error: Option<String>,
    },
    /// User removed one item from the batch review.
    RemoveItem(ItemId),
    /// User discarded the single-item review.
    DiscardClicked,
    /// User asked to go back to the upload screen from the batch review.
    AddMoreClicked,
    /// User acknowledged an error; full reset.
    RetryClicked,
    /// User returns from a submission error to the review it came from.
    BackToReviewClicked,
    /// The success indicator timer ran out.
    SuccessTimerElapsed,
    /// Render tick.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
