use std::time::Duration;

use url::Url;

pub const DEFAULT_EXTRACTION_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Pause between two consecutive webhook calls of a batch.
pub const INTER_SUBMISSION_DELAY: Duration = Duration::from_secs(2);

/// One vision model to try, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub model: String,
    /// Accepts PDFs natively; otherwise PDFs must be rasterized first.
    pub accepts_documents: bool,
}

impl BackendConfig {
    pub fn image_only(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            accepts_documents: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractionSettings {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub backends: Vec<BackendConfig>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_EXTRACTION_ENDPOINT.to_string(),
            backends: vec![
                BackendConfig::image_only("gpt-4o"),
                BackendConfig::image_only("gpt-4o-mini"),
            ],
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(90),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubmissionSettings {
    pub webhook_url: Url,
    /// Value of the payload's `source` field.
    pub source: String,
    /// Send the original file along with the record as multipart form data.
    pub attach_files: bool,
    pub inter_item_delay: Duration,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl SubmissionSettings {
    pub fn new(webhook_url: Url) -> Self {
        Self {
            webhook_url,
            source: "intake".to_string(),
            attach_files: false,
            inter_item_delay: INTER_SUBMISSION_DELAY,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}
