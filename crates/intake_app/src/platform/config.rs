use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use intake_engine::{
    BackendConfig, ExtractionSettings, SubmissionSettings, DEFAULT_EXTRACTION_ENDPOINT,
};
use intake_logging::{intake_info, intake_warn};
use serde::{Deserialize, Serialize};
use url::Url;

pub const ENV_API_KEY: &str = "INTAKE_API_KEY";
pub const ENV_ENDPOINT: &str = "INTAKE_ENDPOINT";
pub const ENV_WEBHOOK_URL: &str = "INTAKE_WEBHOOK_URL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("no webhook URL configured; set submission.webhook_url or INTAKE_WEBHOOK_URL")]
    MissingWebhookUrl,
    #[error("invalid webhook URL {url:?}: {source}")]
    InvalidWebhookUrl {
        url: String,
        source: url::ParseError,
    },
}

/// On-disk configuration. The API key is never stored here.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub extraction: ExtractionConfig,
    pub submission: SubmissionConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub endpoint: String,
    pub backends: Vec<BackendEntry>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        let defaults = ExtractionSettings::default();
        Self {
            endpoint: DEFAULT_EXTRACTION_ENDPOINT.to_string(),
            backends: defaults
                .backends
                .into_iter()
                .map(|backend| BackendEntry {
                    model: backend.model,
                    accepts_documents: backend.accepts_documents,
                })
                .collect(),
            connect_timeout_secs: defaults.connect_timeout.as_secs(),
            request_timeout_secs: defaults.request_timeout.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendEntry {
    pub model: String,
    #[serde(default)]
    pub accepts_documents: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    pub webhook_url: Option<String>,
    pub source: String,
    pub attach_files: bool,
    pub inter_item_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            source: "intake".to_string(),
            attach_files: false,
            inter_item_delay_ms: 2000,
            request_timeout_secs: 30,
        }
    }
}

/// Settings ready to hand to the engine.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub extraction: ExtractionSettings,
    pub submission: SubmissionSettings,
}

impl AppConfig {
    /// Reads `path`. A missing file yields defaults when `optional` is set.
    pub fn load(path: &Path, optional: bool) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if optional && err.kind() == io::ErrorKind::NotFound => {
                intake_info!("No configuration at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config = ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        intake_info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Applies environment overrides and validates the result.
    ///
    /// A missing API key is accepted here; extraction reports it on first use.
    pub fn resolve(
        mut self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<RuntimeConfig, ConfigError> {
        if let Some(endpoint) = env(ENV_ENDPOINT).filter(|value| !value.trim().is_empty()) {
            self.extraction.endpoint = endpoint.trim().to_string();
        }
        if let Some(url) = env(ENV_WEBHOOK_URL).filter(|value| !value.trim().is_empty()) {
            self.submission.webhook_url = Some(url.trim().to_string());
        }
        let api_key = env(ENV_API_KEY);
        if api_key.is_none() {
            intake_warn!("{} is not set; extraction will fail until it is", ENV_API_KEY);
        }

        let raw_url = self
            .submission
            .webhook_url
            .ok_or(ConfigError::MissingWebhookUrl)?;
        let webhook_url =
            Url::parse(&raw_url).map_err(|source| ConfigError::InvalidWebhookUrl {
                url: raw_url.clone(),
                source,
            })?;

        let extraction = ExtractionSettings {
            api_key,
            endpoint: self.extraction.endpoint,
            backends: self
                .extraction
                .backends
                .into_iter()
                .map(|entry| BackendConfig {
                    model: entry.model,
                    accepts_documents: entry.accepts_documents,
                })
                .collect(),
            connect_timeout: Duration::from_secs(self.extraction.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.extraction.request_timeout_secs),
        };

        let mut submission = SubmissionSettings::new(webhook_url);
        submission.source = self.submission.source;
        submission.attach_files = self.submission.attach_files;
        submission.inter_item_delay = Duration::from_millis(self.submission.inter_item_delay_ms);
        submission.request_timeout = Duration::from_secs(self.submission.request_timeout_secs);

        Ok(RuntimeConfig {
            extraction,
            submission,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn missing_default_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("intake.ron"), true).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(&dir.path().join("custom.ron"), false).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"(
                extraction: (backends: [(model: "doc-model", accepts_documents: true)]),
                submission: (webhook_url: Some("https://hooks.example.com/in"), attach_files: true),
            )"#
        )
        .unwrap();

        let config = AppConfig::load(file.path(), false).unwrap();

        assert_eq!(
            config.extraction.backends,
            vec![BackendEntry {
                model: "doc-model".to_string(),
                accepts_documents: true,
            }]
        );
        assert_eq!(config.extraction.endpoint, DEFAULT_EXTRACTION_ENDPOINT);
        assert!(config.submission.attach_files);
        assert_eq!(config.submission.inter_item_delay_ms, 2000);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "(extraction: [").unwrap();
        let err = AppConfig::load(file.path(), false).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = AppConfig::default();
        config.submission.webhook_url = Some("https://file.example.com/hook".to_string());

        let runtime = config
            .resolve(env(&[
                (ENV_API_KEY, "sk-test"),
                (ENV_ENDPOINT, "http://localhost:9000/v1/chat/completions"),
                (ENV_WEBHOOK_URL, "https://env.example.com/hook"),
            ]))
            .unwrap();

        assert_eq!(runtime.extraction.api_key.as_deref(), Some("sk-test"));
        assert_eq!(
            runtime.extraction.endpoint,
            "http://localhost:9000/v1/chat/completions"
        );
        assert_eq!(
            runtime.submission.webhook_url.as_str(),
            "https://env.example.com/hook"
        );
        assert_eq!(
            runtime.submission.inter_item_delay,
            Duration::from_millis(2000)
        );
    }

    #[test]
    fn missing_api_key_is_not_a_load_error() {
        let mut config = AppConfig::default();
        config.submission.webhook_url = Some("https://hooks.example.com/in".to_string());
        let runtime = config.resolve(env(&[])).unwrap();
        assert_eq!(runtime.extraction.api_key, None);
    }

    #[test]
    fn webhook_url_is_required_and_validated() {
        let err = AppConfig::default().resolve(env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingWebhookUrl));

        let err = AppConfig::default()
            .resolve(env(&[(ENV_WEBHOOK_URL, "not a url")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWebhookUrl { .. }));
    }
}
