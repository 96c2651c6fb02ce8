use intake_core::SourceFile;
use intake_logging::{intake_info, intake_warn};

use crate::{
    BatchIngestError, EngineEvent, Extractor, FileFailure, IngestReport, IngestedFile, ProgressSink,
};

/// Extracts `files` strictly one after another.
///
/// A failing file is recorded and skipped; it never stops the batch. Progress
/// is emitted before each file. The batch fails only when every file failed,
/// carrying the last observed error.
pub async fn ingest_files(
    extractor: &dyn Extractor,
    files: &[SourceFile],
    sink: &dyn ProgressSink,
) -> Result<IngestReport, BatchIngestError> {
    if files.is_empty() {
        return Err(BatchIngestError::Empty);
    }

    let total = files.len();
    let mut extracted = Vec::new();
    let mut failures = Vec::new();

    for (index, file) in files.iter().enumerate() {
        sink.emit(EngineEvent::IngestProgress {
            current: index + 1,
            total,
        });
        match extractor.extract(file).await {
            Ok(record) => {
                intake_info!("Extracted {} ({}/{})", file.name, index + 1, total);
                extracted.push(IngestedFile { index, record });
            }
            Err(error) => {
                intake_warn!("Error processing file {}: {}", file.name, error);
                failures.push(FileFailure {
                    index,
                    file_name: file.name.clone(),
                    error,
                });
            }
        }
    }

    if extracted.is_empty() {
        if let Some(last) = failures.pop() {
            return Err(BatchIngestError::NothingExtracted {
                attempted: total,
                last_error: last.error,
            });
        }
    }

    intake_info!(
        "Batch extracted {} of {} files ({} failed)",
        extracted.len(),
        total,
        failures.len()
    );
    Ok(IngestReport {
        extracted,
        failures,
        attempted: total,
    })
}
