use std::sync::mpsc;
use std::thread;

use intake_core::{Effect, ExtractedFile, Msg};
use intake_engine::{EngineEvent, EngineHandle};
use intake_logging::{intake_debug, intake_info, intake_warn};

use super::app::AppEvent;

/// Hands core effects to the engine and feeds engine events back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(
        engine: EngineHandle,
        events: mpsc::Receiver<EngineEvent>,
        app_tx: mpsc::Sender<AppEvent>,
    ) -> Self {
        let runner = Self { engine };
        spawn_event_loop(events, app_tx);
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ExtractSingle { file } => {
                    intake_info!("ExtractSingle name={} size={}", file.name, file.size());
                    self.engine.extract_single(file);
                }
                Effect::ExtractBatch { files } => {
                    intake_info!("ExtractBatch files={}", files.len());
                    self.engine.extract_batch(files);
                }
                Effect::SubmitSingle { job } => {
                    intake_info!("SubmitSingle supplier={}", job.record.supplier);
                    self.engine.submit(job);
                }
                Effect::SubmitBatch { jobs } => {
                    intake_info!("SubmitBatch jobs={}", jobs.len());
                    self.engine.submit_batch(jobs);
                }
                Effect::ScheduleReset { after } => self.engine.schedule_reset(after),
            }
        }
    }
}

fn spawn_event_loop(events: mpsc::Receiver<EngineEvent>, app_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        while let Ok(event) = events.recv() {
            if app_tx.send(AppEvent::Engine(map_event(event))).is_err() {
                break;
            }
        }
    });
}

/// Translates an engine outcome into a core message. Errors become the
/// user-facing text the core stores.
pub fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::IngestProgress { current, total } => {
            Msg::ExtractionProgress { current, total }
        }
        EngineEvent::SingleExtracted(result) => Msg::SingleExtracted(result.map_err(|err| {
            intake_warn!("Extraction failed ({:?}): {}", err.category(), err);
            err.user_message()
        })),
        EngineEvent::BatchExtracted(result) => Msg::BatchExtracted(
            result
                .map(|report| {
                    for failure in &report.failures {
                        intake_warn!(
                            "Dropped {} from batch: {}",
                            failure.file_name,
                            failure.error
                        );
                    }
                    report
                        .extracted
                        .into_iter()
                        .map(|file| ExtractedFile {
                            index: file.index,
                            record: file.record,
                        })
                        .collect()
                })
                .map_err(|err| {
                    intake_warn!("Batch extraction failed: {}", err);
                    err.user_message()
                }),
        ),
        EngineEvent::DeliveryProgress { current, total } => {
            intake_debug!("Sending {} of {}", current, total);
            Msg::NoOp
        }
        EngineEvent::Submitted(result) => Msg::SubmissionFinished(result.map_err(|err| {
            intake_warn!("Submission failed: {}", err);
            err.user_message()
        })),
        EngineEvent::BatchSubmitted(report) => Msg::BatchSubmissionFinished {
            submitted: report.submitted,
            error: report.failure.map(|failure| failure.error.user_message()),
        },
        EngineEvent::ResetTimerElapsed => Msg::SuccessTimerElapsed,
    }
}
