use intake_core::{DocumentRecord, ItemId};

/// Coarse error taxonomy shown to users and used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing credential or backend list; not retryable without new configuration.
    Configuration,
    /// The backend cannot consume this media type directly.
    UnsupportedInput,
    /// Remote extraction failed or returned unusable content.
    Extraction,
    /// Downstream webhook call failed.
    Submission,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("no extraction credential configured")]
    MissingCredential,
    #[error("no extraction backend configured")]
    NoBackends,
    #[error("backend {backend} cannot read {media_type} input directly")]
    UnsupportedInput { media_type: String, backend: String },
    #[error("page rendering failed: {0}")]
    Rendering(String),
    #[error("extraction service returned http status {status}: {message}")]
    HttpStatus { status: u16, message: String },
    #[error("extraction request failed: {0}")]
    Network(String),
    #[error("extraction response could not be parsed: {0}")]
    MalformedResponse(String),
}

impl ExtractionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ExtractionError::MissingCredential | ExtractionError::NoBackends => {
                ErrorCategory::Configuration
            }
            ExtractionError::UnsupportedInput { .. } => ErrorCategory::UnsupportedInput,
            ExtractionError::Rendering(_)
            | ExtractionError::HttpStatus { .. }
            | ExtractionError::Network(_)
            | ExtractionError::MalformedResponse(_) => ErrorCategory::Extraction,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            ExtractionError::MissingCredential => {
                "The extraction API key is missing. Set INTAKE_API_KEY and restart.".to_string()
            }
            ExtractionError::NoBackends => {
                "No extraction model is configured. Check the configuration file.".to_string()
            }
            ExtractionError::UnsupportedInput { .. } => {
                "This document type cannot be read directly. Please upload a screenshot or photo (JPG/PNG) instead."
                    .to_string()
            }
            ExtractionError::Rendering(_) => {
                "The first page of the PDF could not be rendered. Please upload an image instead."
                    .to_string()
            }
            ExtractionError::HttpStatus { status: 400, message }
                if message.to_ascii_lowercase().contains("image") =>
            {
                "The image format is not supported. Try JPG or PNG.".to_string()
            }
            ExtractionError::HttpStatus { status: 401, .. } => {
                "The extraction API key is invalid.".to_string()
            }
            ExtractionError::HttpStatus { status: 429, .. } => {
                "The extraction service quota is exhausted. Check the account billing.".to_string()
            }
            ExtractionError::HttpStatus { status, .. } => {
                format!("The extraction service failed (HTTP {status}). Try again later.")
            }
            ExtractionError::Network(_) => {
                "Could not reach the extraction service. Check your connection.".to_string()
            }
            ExtractionError::MalformedResponse(_) => {
                "The document could not be read. Try better lighting or check the format."
                    .to_string()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("webhook returned http status {status}: {message}")]
    HttpStatus { status: u16, message: String },
    #[error("webhook request failed: {0}")]
    Network(String),
    #[error("webhook request could not be built: {0}")]
    Request(String),
}

impl SubmissionError {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::Submission
    }

    pub fn user_message(&self) -> String {
        match self {
            SubmissionError::HttpStatus { status, .. } => {
                format!("The storage system rejected the document (HTTP {status}).")
            }
            SubmissionError::Network(_) => {
                "Could not connect to the storage system. Check your connection.".to_string()
            }
            SubmissionError::Request(_) => {
                "The document could not be prepared for sending.".to_string()
            }
        }
    }
}

/// Batch-level extraction failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchIngestError {
    #[error("no files to ingest")]
    Empty,
    #[error("none of {attempted} files could be extracted; last error: {last_error}")]
    NothingExtracted {
        attempted: usize,
        last_error: ExtractionError,
    },
}

impl BatchIngestError {
    pub fn user_message(&self) -> String {
        match self {
            BatchIngestError::Empty => "No files were selected.".to_string(),
            BatchIngestError::NothingExtracted { last_error, .. } => last_error.user_message(),
        }
    }
}

/// A file of a batch that extracted successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedFile {
    pub index: usize,
    pub record: DocumentRecord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub index: usize,
    pub file_name: String,
    pub error: ExtractionError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// Successful files in selection order.
    pub extracted: Vec<IngestedFile>,
    pub failures: Vec<FileFailure>,
    pub attempted: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub item_id: Option<ItemId>,
    pub error: SubmissionError,
}

/// Outcome of a sequential batch submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeliveryReport {
    /// Delivered items, in submission order.
    pub submitted: Vec<ItemId>,
    pub failure: Option<DeliveryFailure>,
    /// Jobs never attempted because an earlier one failed.
    pub skipped: usize,
}

impl DeliveryReport {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Batch extraction started file `current` (1-based) of `total`.
    IngestProgress { current: usize, total: usize },
    SingleExtracted(Result<DocumentRecord, ExtractionError>),
    BatchExtracted(Result<IngestReport, BatchIngestError>),
    /// Batch submission started job `current` (1-based) of `total`.
    DeliveryProgress { current: usize, total: usize },
    Submitted(Result<(), SubmissionError>),
    BatchSubmitted(DeliveryReport),
    ResetTimerElapsed,
}
