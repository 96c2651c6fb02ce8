use std::sync::Arc;

use intake_core::{DocumentRecord, SubmissionJob};
use intake_logging::{intake_debug, intake_info};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{SubmissionError, SubmissionSettings};

/// Forwards one record downstream. No partial success: `Ok` or failed.
#[async_trait::async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, job: &SubmissionJob) -> Result<(), SubmissionError>;
}

/// Wire shape of one delivered record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookPayload {
    pub document_type: &'static str,
    pub document_number: Option<String>,
    pub date: String,
    pub supplier: String,
    pub concept: String,
    pub tax_base: String,
    pub taxes: String,
    pub total: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub base_numeric: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_numeric: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_numeric: Decimal,
    pub timestamp: String,
    pub source: String,
    pub mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

impl WebhookPayload {
    pub fn from_job(job: &SubmissionJob, source: &str, timestamp: String) -> Self {
        let DocumentRecord {
            document_type,
            document_number,
            date,
            supplier,
            concept,
            tax_base,
            taxes,
            total,
        } = &job.record;
        Self {
            document_type: document_type.as_str(),
            document_number: document_number.clone(),
            date: date.clone(),
            supplier: supplier.clone(),
            concept: concept.clone(),
            tax_base: tax_base.to_string(),
            taxes: taxes.to_string(),
            total: total.to_string(),
            base_numeric: tax_base.value,
            tax_numeric: taxes.value,
            total_numeric: total.value,
            timestamp,
            source: source.to_string(),
            mode: job.mode.as_str(),
            file_name: job.file.as_ref().map(|file| file.name.clone()),
            file_size: job.file.as_ref().map(|file| file.size()),
            file_type: job.file.as_ref().map(|file| file.media_type.clone()),
        }
    }
}

/// Produces the payload timestamp. Injected so tests can pin it.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

pub fn utc_clock() -> Clock {
    Arc::new(|| chrono::Utc::now().to_rfc3339())
}

/// Posts records to the fixed, pre-configured webhook URL.
pub struct WebhookSubmitter {
    settings: SubmissionSettings,
    client: reqwest::Client,
    clock: Clock,
}

impl WebhookSubmitter {
    pub fn new(settings: SubmissionSettings) -> Result<Self, SubmissionError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| SubmissionError::Request(err.to_string()))?;
        Ok(Self {
            settings,
            client,
            clock: utc_clock(),
        })
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &SubmissionSettings {
        &self.settings
    }

    fn build_request(
        &self,
        job: &SubmissionJob,
        payload: &WebhookPayload,
    ) -> Result<reqwest::RequestBuilder, SubmissionError> {
        let request = self.client.post(self.settings.webhook_url.clone());
        let file = match (&job.file, self.settings.attach_files) {
            (Some(file), true) => file,
            _ => return Ok(request.json(payload)),
        };

        let payload_json = serde_json::to_string(payload)
            .map_err(|err| SubmissionError::Request(err.to_string()))?;
        let media_type = if file.media_type.is_empty() {
            "application/octet-stream"
        } else {
            file.media_type.as_str()
        };
        let part = reqwest::multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(media_type)
            .map_err(|err| SubmissionError::Request(err.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("payload", payload_json)
            .part("file", part);
        Ok(request.multipart(form))
    }
}

#[async_trait::async_trait]
impl Submitter for WebhookSubmitter {
    async fn submit(&self, job: &SubmissionJob) -> Result<(), SubmissionError> {
        let payload = WebhookPayload::from_job(job, &self.settings.source, (self.clock)());
        intake_debug!(
            "Submitting {} record from {} ({})",
            payload.mode,
            payload.supplier,
            payload.file_name.as_deref().unwrap_or("no file")
        );

        let response = self
            .build_request(job, &payload)?
            .send()
            .await
            .map_err(|err| SubmissionError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubmissionError::HttpStatus {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            });
        }
        intake_info!("Webhook accepted record from {}", payload.supplier);
        Ok(())
    }
}
