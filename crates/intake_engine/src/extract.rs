use std::sync::Arc;

use base64::Engine as _;
use intake_core::{DocumentRecord, MediaKind, SourceFile};
use intake_logging::{intake_debug, intake_info, intake_warn};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::normalize::{parse_record, RECORD_KEYS};
use crate::{BackendConfig, ExtractionError, ExtractionSettings};

/// Turns one file into a normalized record.
#[async_trait::async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, file: &SourceFile) -> Result<DocumentRecord, ExtractionError>;
}

/// Renders the first page of a paginated document to a PNG image, for
/// backends that only accept flat images.
pub trait PageRasterizer: Send + Sync {
    fn render_first_page(&self, document: &[u8]) -> Result<Vec<u8>, ExtractionError>;
}

/// The model input for one file, ready to embed in a request.
#[derive(Debug, Clone, PartialEq, Eq)]
enum InputPart {
    Image { data_url: String },
    Document { file_name: String, data_url: String },
}

impl InputPart {
    fn to_json(&self) -> Value {
        match self {
            InputPart::Image { data_url } => json!({
                "type": "image_url",
                "image_url": { "url": data_url },
            }),
            InputPart::Document {
                file_name,
                data_url,
            } => json!({
                "type": "file",
                "file": { "filename": file_name, "file_data": data_url },
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Extraction over an OpenAI-compatible chat-completions endpoint with
/// vision input. Backends are tried in order; the first success wins.
pub struct VisionExtractor {
    settings: ExtractionSettings,
    client: reqwest::Client,
    rasterizer: Option<Arc<dyn PageRasterizer>>,
}

impl VisionExtractor {
    pub fn new(settings: ExtractionSettings) -> Result<Self, ExtractionError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ExtractionError::Network(err.to_string()))?;
        Ok(Self {
            settings,
            client,
            rasterizer: None,
        })
    }

    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn PageRasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    fn api_key(&self) -> Result<&str, ExtractionError> {
        self.settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ExtractionError::MissingCredential)
    }

    fn prepare_input(
        &self,
        file: &SourceFile,
        backend: &BackendConfig,
    ) -> Result<InputPart, ExtractionError> {
        match file.kind() {
            MediaKind::Image => {
                let media_type = if file.media_type.starts_with("image/") {
                    file.media_type.as_str()
                } else {
                    "image/jpeg"
                };
                Ok(InputPart::Image {
                    data_url: data_url(media_type, &file.bytes),
                })
            }
            MediaKind::Pdf if backend.accepts_documents => Ok(InputPart::Document {
                file_name: file.name.clone(),
                data_url: data_url("application/pdf", &file.bytes),
            }),
            MediaKind::Pdf => match &self.rasterizer {
                Some(rasterizer) => {
                    let png = rasterizer.render_first_page(&file.bytes)?;
                    intake_debug!(
                        "Rasterized first page of {} ({} bytes png)",
                        file.name,
                        png.len()
                    );
                    Ok(InputPart::Image {
                        data_url: data_url("image/png", &png),
                    })
                }
                None => Err(ExtractionError::UnsupportedInput {
                    media_type: "application/pdf".to_string(),
                    backend: backend.model.clone(),
                }),
            },
            MediaKind::Other => Err(ExtractionError::UnsupportedInput {
                media_type: file.media_type.clone(),
                backend: backend.model.clone(),
            }),
        }
    }

    async fn call_backend(
        &self,
        api_key: &str,
        backend: &BackendConfig,
        input: &InputPart,
    ) -> Result<DocumentRecord, ExtractionError> {
        let body = request_body(&backend.model, input);
        let response = self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ExtractionError::HttpStatus {
                status: status.as_u16(),
                message: vendor_error_message(&text).unwrap_or_else(|| status.to_string()),
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|err| ExtractionError::MalformedResponse(err.to_string()))?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ExtractionError::MalformedResponse("response has no content".to_string()))?;
        intake_debug!("Model {} answered {} chars", backend.model, content.len());
        parse_record(&content)
    }
}

#[async_trait::async_trait]
impl Extractor for VisionExtractor {
    async fn extract(&self, file: &SourceFile) -> Result<DocumentRecord, ExtractionError> {
        let api_key = self.api_key()?;
        if self.settings.backends.is_empty() {
            return Err(ExtractionError::NoBackends);
        }

        let mut last_error = ExtractionError::NoBackends;
        for backend in &self.settings.backends {
            let attempt = match self.prepare_input(file, backend) {
                Ok(input) => {
                    intake_info!("Sending {} to {}", file.name, backend.model);
                    self.call_backend(api_key, backend, &input).await
                }
                Err(err) => Err(err),
            };
            match attempt {
                Ok(record) => return Ok(record),
                Err(err) => {
                    intake_warn!("Backend {} failed for {}: {}", backend.model, file.name, err);
                    // A backend that never saw the file must not hide why one that did failed.
                    let input_skipped = matches!(err, ExtractionError::UnsupportedInput { .. });
                    let remote_failure_seen = !matches!(
                        last_error,
                        ExtractionError::NoBackends | ExtractionError::UnsupportedInput { .. }
                    );
                    if !(input_skipped && remote_failure_seen) {
                        last_error = err;
                    }
                }
            }
        }
        Err(last_error)
    }
}

fn extraction_prompt() -> String {
    format!(
        "You are an expert accountant. Analyze this document (invoice, receipt, delivery note or quote) \
         and answer with a strict JSON object with exactly these keys: {}. \
         document_type is one of TICKET, FACTURA, ALBARAN, PRESUPUESTO, OTRO. \
         date uses DD/MM/YYYY. concept is a short summary. \
         tax_base, taxes and total are amounts as printed on the document. \
         Use null for anything you cannot find.",
        RECORD_KEYS.join(", ")
    )
}

fn request_body(model: &str, input: &InputPart) -> Value {
    json!({
        "model": model,
        "messages": [{
            "role": "user",
            "content": [
                { "type": "text", "text": extraction_prompt() },
                input.to_json(),
            ],
        }],
        "response_format": { "type": "json_object" },
        "temperature": 0,
    })
}

fn data_url(media_type: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{media_type};base64,{encoded}")
}

fn vendor_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/message")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
}

fn map_reqwest_error(err: reqwest::Error) -> ExtractionError {
    if err.is_timeout() {
        return ExtractionError::Network(format!("timeout: {err}"));
    }
    ExtractionError::Network(err.to_string())
}
