use std::time::Duration;

use intake_core::SubmissionJob;
use intake_logging::{intake_error, intake_info};

use crate::{DeliveryFailure, DeliveryReport, EngineEvent, ProgressSink, Submitter};

/// Submits `jobs` one at a time, sleeping `delay` before every call but the
/// first. Stops at the first failure; later jobs are never attempted.
pub async fn submit_sequentially(
    submitter: &dyn Submitter,
    jobs: &[SubmissionJob],
    delay: Duration,
    sink: &dyn ProgressSink,
) -> DeliveryReport {
    let total = jobs.len();
    let mut report = DeliveryReport::default();

    for (index, job) in jobs.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(delay).await;
        }
        sink.emit(EngineEvent::DeliveryProgress {
            current: index + 1,
            total,
        });
        match submitter.submit(job).await {
            Ok(()) => {
                if let Some(id) = job.item_id {
                    report.submitted.push(id);
                }
            }
            Err(error) => {
                intake_error!(
                    "Submission {}/{} failed, {} left unsent: {}",
                    index + 1,
                    total,
                    total - index - 1,
                    error
                );
                report.skipped = total - index - 1;
                report.failure = Some(DeliveryFailure {
                    item_id: job.item_id,
                    error,
                });
                return report;
            }
        }
    }

    intake_info!("Delivered {} records", total);
    report
}
