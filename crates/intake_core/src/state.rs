use rust_decimal::Decimal;

use crate::view_model::{AppViewModel, BatchRowView, RecordView};
use crate::{
    DocumentRecord, ExtractedFile, PreviewHandle, PreviewRegistry, SourceFile, SubmissionJob,
    SubmissionMode,
};

pub type ItemId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    Analyzing,
    ReviewSingle,
    ReviewBatch,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

/// Outcome of the last file selection's media filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntakeStats {
    pub accepted: usize,
    pub skipped: usize,
}

/// One reviewed document held pending confirmation.
#[derive(Debug, PartialEq, Eq)]
pub struct BatchItem {
    pub id: ItemId,
    pub file: SourceFile,
    pub preview: PreviewHandle,
    pub record: DocumentRecord,
    /// Already delivered downstream; never re-sent.
    pub submitted: bool,
}

#[derive(Debug)]
struct PendingFile {
    file: SourceFile,
    preview: PreviewHandle,
}

#[derive(Debug)]
struct SingleReview {
    file: SourceFile,
    preview: PreviewHandle,
    record: Option<DocumentRecord>,
}

/// Workflow state for one session.
///
/// Owns every preview handle it hands out; all discarding transitions drop
/// the owning values, which releases the handles.
#[derive(Debug, Default)]
pub struct AppState {
    mode: Mode,
    previews: PreviewRegistry,
    single: Option<SingleReview>,
    pending: Vec<PendingFile>,
    batch: Vec<BatchItem>,
    progress: Option<Progress>,
    error: Option<String>,
    resume: Option<Mode>,
    submitting: bool,
    next_item_id: ItemId,
    last_intake: Option<IntakeStats>,
    /// One-shot message for the next render; cleared by the next update.
    notice: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a caller-provided registry, e.g. one the front-end also observes.
    pub fn with_previews(previews: PreviewRegistry) -> Self {
        Self {
            previews,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    pub fn batch_items(&self) -> &[BatchItem] {
        &self.batch
    }

    pub fn single_record(&self) -> Option<&DocumentRecord> {
        self.single.as_ref().and_then(|single| single.record.as_ref())
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn progress(&self) -> Option<Progress> {
        self.progress
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn view(&self) -> AppViewModel {
        let single = self.single.as_ref().map(|single| RecordView {
            file_name: single.file.name.clone(),
            preview_uri: single.preview.uri().to_string(),
            totals_consistent: single
                .record
                .as_ref()
                .is_none_or(DocumentRecord::totals_consistent),
            record: single.record.clone(),
        });
        let batch: Vec<BatchRowView> = self
            .batch
            .iter()
            .map(|item| BatchRowView {
                id: item.id,
                file_name: item.file.name.clone(),
                preview_uri: item.preview.uri().to_string(),
                totals_consistent: item.record.totals_consistent(),
                record: item.record.clone(),
                submitted: item.submitted,
            })
            .collect();
        let batch_total = self
            .batch
            .iter()
            .map(|item| item.record.total.value)
            .sum::<Decimal>();

        AppViewModel {
            mode: self.mode,
            progress: self.progress,
            single,
            unsubmitted: self.batch.iter().filter(|item| !item.submitted).count(),
            batch,
            batch_total,
            error: self.error.clone(),
            can_resume: self.mode == Mode::Error && self.resume.is_some(),
            submitting: self.submitting,
            last_intake: self.last_intake,
            notice: self.notice.clone(),
            outstanding_previews: self.previews.outstanding(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn has_batch_items(&self) -> bool {
        !self.batch.is_empty()
    }

    pub(crate) fn record_intake(&mut self, accepted: usize, skipped: usize) {
        self.last_intake = Some(IntakeStats { accepted, skipped });
        self.mark_dirty();
    }

    pub(crate) fn set_notice(&mut self, message: String) {
        self.notice = Some(message);
        self.mark_dirty();
    }

    pub(crate) fn clear_notice(&mut self) {
        self.notice = None;
    }

    pub(crate) fn begin_single(&mut self, file: SourceFile) -> SourceFile {
        let preview = self.previews.acquire(&file);
        self.single = Some(SingleReview {
            file: file.clone(),
            preview,
            record: None,
        });
        self.progress = None;
        self.error = None;
        self.resume = None;
        self.mode = Mode::Analyzing;
        self.mark_dirty();
        file
    }

    pub(crate) fn begin_batch(&mut self, files: Vec<SourceFile>) -> Vec<SourceFile> {
        self.pending = files
            .iter()
            .map(|file| PendingFile {
                preview: self.previews.acquire(file),
                file: file.clone(),
            })
            .collect();
        self.progress = Some(Progress {
            current: 0,
            total: files.len(),
        });
        self.error = None;
        self.resume = None;
        self.mode = Mode::Analyzing;
        self.mark_dirty();
        files
    }

    pub(crate) fn is_analyzing_single(&self) -> bool {
        self.mode == Mode::Analyzing && self.single.is_some()
    }

    pub(crate) fn is_analyzing_batch(&self) -> bool {
        self.mode == Mode::Analyzing && self.single.is_none()
    }

    pub(crate) fn apply_progress(&mut self, current: usize, total: usize) {
        self.progress = Some(Progress { current, total });
        self.mark_dirty();
    }

    pub(crate) fn complete_single(&mut self, record: DocumentRecord) {
        if let Some(single) = self.single.as_mut() {
            single.record = Some(record);
            self.mode = Mode::ReviewSingle;
            self.mark_dirty();
        }
    }

    /// Moves successful files into the batch in selection order and releases
    /// the previews of the files that failed. Returns the number appended.
    pub(crate) fn complete_batch(&mut self, mut extracted: Vec<ExtractedFile>) -> usize {
        extracted.sort_by_key(|file| file.index);
        let mut slots: Vec<Option<PendingFile>> =
            std::mem::take(&mut self.pending).into_iter().map(Some).collect();

        let mut appended = 0;
        for ExtractedFile { index, record } in extracted {
            let Some(PendingFile { file, preview }) = slots.get_mut(index).and_then(Option::take)
            else {
                continue;
            };
            self.next_item_id += 1;
            self.batch.push(BatchItem {
                id: self.next_item_id,
                file,
                preview,
                record,
                submitted: false,
            });
            appended += 1;
        }
        drop(slots);

        self.progress = None;
        self.mark_dirty();
        appended
    }

    /// Enters the error state. `resume` names the review mode the user may
    /// return to with data intact, if any.
    pub(crate) fn fail(&mut self, message: String, resume: Option<Mode>) {
        self.pending.clear();
        self.progress = None;
        self.submitting = false;
        self.error = Some(message);
        self.resume = resume;
        self.mode = Mode::Error;
        self.mark_dirty();
    }

    pub(crate) fn enter_batch_review(&mut self) {
        self.mode = Mode::ReviewBatch;
        self.mark_dirty();
    }

    /// Returns whether an item was removed. Removing the last item resets.
    pub(crate) fn remove_item(&mut self, id: crate::ItemId) -> bool {
        let before = self.batch.len();
        self.batch.retain(|item| item.id != id);
        if self.batch.len() == before {
            return false;
        }
        if self.batch.is_empty() {
            self.reset();
        } else {
            self.mark_dirty();
        }
        true
    }

    pub(crate) fn begin_single_submission(&mut self) -> Option<SubmissionJob> {
        let single = self.single.as_ref()?;
        let record = single.record.clone()?;
        let job = SubmissionJob {
            item_id: None,
            mode: SubmissionMode::Single,
            record,
            file: Some(single.file.clone()),
        };
        self.submitting = true;
        self.mark_dirty();
        Some(job)
    }

    pub(crate) fn begin_batch_submission(&mut self) -> Vec<SubmissionJob> {
        let jobs: Vec<SubmissionJob> = self
            .batch
            .iter()
            .filter(|item| !item.submitted)
            .map(|item| SubmissionJob {
                item_id: Some(item.id),
                mode: SubmissionMode::Batch,
                record: item.record.clone(),
                file: Some(item.file.clone()),
            })
            .collect();
        if !jobs.is_empty() {
            self.submitting = true;
            self.mark_dirty();
        }
        jobs
    }

    pub(crate) fn mark_submitted(&mut self, submitted: &[ItemId]) {
        for item in self.batch.iter_mut() {
            if submitted.contains(&item.id) {
                item.submitted = true;
            }
        }
        self.mark_dirty();
    }

    pub(crate) fn enter_success(&mut self) {
        self.submitting = false;
        self.error = None;
        self.mode = Mode::Success;
        self.mark_dirty();
    }

    pub(crate) fn resume_review(&mut self) -> bool {
        let Some(mode) = self.resume.take() else {
            return false;
        };
        self.error = None;
        self.mode = mode;
        self.mark_dirty();
        true
    }

    /// Full reset to `Idle`. Drops every held preview handle.
    pub(crate) fn reset(&mut self) {
        self.single = None;
        self.pending.clear();
        self.batch.clear();
        self.progress = None;
        self.error = None;
        self.resume = None;
        self.submitting = false;
        self.last_intake = None;
        self.mode = Mode::Idle;
        self.mark_dirty();
    }
}
