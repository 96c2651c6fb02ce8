use rust_decimal::Decimal;

use crate::{DocumentRecord, IntakeStats, ItemId, Mode, Progress};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub mode: Mode,
    pub progress: Option<Progress>,
    pub single: Option<RecordView>,
    pub batch: Vec<BatchRowView>,
    /// Sum of the numeric totals of all batch items.
    pub batch_total: Decimal,
    pub unsubmitted: usize,
    pub error: Option<String>,
    /// The error screen can return to the review it came from.
    pub can_resume: bool,
    pub submitting: bool,
    pub last_intake: Option<IntakeStats>,
    pub notice: Option<String>,
    pub outstanding_previews: usize,
    pub dirty: bool,
}

/// Single-item card. `record` is `None` while the file is still being analyzed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordView {
    pub file_name: String,
    pub preview_uri: String,
    pub record: Option<DocumentRecord>,
    pub totals_consistent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRowView {
    pub id: ItemId,
    pub file_name: String,
    pub preview_uri: String,
    pub record: DocumentRecord,
    pub submitted: bool,
    pub totals_consistent: bool,
}
