//! Intake engine: extraction and submission clients, the sequential
//! ingestion and delivery pipelines, and a background runner for them.
mod deliver;
mod engine;
mod extract;
mod ingest;
mod normalize;
mod settings;
mod sink;
mod submit;
mod types;

pub use deliver::submit_sequentially;
pub use engine::EngineHandle;
pub use extract::{Extractor, PageRasterizer, VisionExtractor};
pub use ingest::ingest_files;
pub use normalize::{parse_record, RECORD_KEYS};
pub use settings::{
    BackendConfig, ExtractionSettings, SubmissionSettings, DEFAULT_EXTRACTION_ENDPOINT,
    INTER_SUBMISSION_DELAY,
};
pub use sink::{ChannelProgressSink, NullSink, ProgressSink};
pub use submit::{utc_clock, Clock, Submitter, WebhookPayload, WebhookSubmitter};
pub use types::{
    BatchIngestError, DeliveryFailure, DeliveryReport, EngineEvent, ErrorCategory,
    ExtractionError, FileFailure, IngestReport, IngestedFile, SubmissionError,
};
