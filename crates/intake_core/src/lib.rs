//! Intake core: document data model and the pure review state machine.
mod effect;
mod file;
mod msg;
mod preview;
mod record;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, SubmissionJob, SubmissionMode, SUCCESS_RESET_DELAY};
pub use file::{MediaKind, SourceFile};
pub use msg::{ExtractedFile, Msg};
pub use preview::{PreviewHandle, PreviewId, PreviewRegistry};
pub use record::{Amount, DocumentRecord, DocumentType};
pub use state::{AppState, BatchItem, IntakeStats, ItemId, Mode, Progress};
pub use update::{update, BATCH_ALREADY_SENT, NO_SUPPORTED_FILES};
pub use view_model::{AppViewModel, BatchRowView, RecordView};
