use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use intake_core::{SourceFile, SubmissionJob};
use intake_logging::intake_debug;

use crate::sink::ChannelProgressSink;
use crate::{ingest_files, submit_sequentially, EngineEvent, Extractor, ProgressSink, Submitter};

enum EngineCommand {
    ExtractSingle { file: SourceFile },
    ExtractBatch { files: Vec<SourceFile> },
    Submit { job: SubmissionJob },
    SubmitBatch { jobs: Vec<SubmissionJob> },
    ScheduleReset { after: Duration },
}

struct Workers {
    extractor: Arc<dyn Extractor>,
    submitter: Arc<dyn Submitter>,
    inter_item_delay: Duration,
}

/// Runs extraction and submission on a background tokio runtime.
///
/// Commands are fire-and-forget; outcomes arrive as [`EngineEvent`]s on the
/// receiver returned by [`EngineHandle::new`].
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(
        extractor: Arc<dyn Extractor>,
        submitter: Arc<dyn Submitter>,
        inter_item_delay: Duration,
    ) -> io::Result<(Self, mpsc::Receiver<EngineEvent>)> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;
        let workers = Arc::new(Workers {
            extractor,
            submitter,
            inter_item_delay,
        });

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let workers = workers.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(&workers, command, event_tx).await;
                });
            }
            intake_debug!("Engine command channel closed");
        });

        Ok((Self { cmd_tx }, event_rx))
    }

    pub fn extract_single(&self, file: SourceFile) {
        let _ = self.cmd_tx.send(EngineCommand::ExtractSingle { file });
    }

    pub fn extract_batch(&self, files: Vec<SourceFile>) {
        let _ = self.cmd_tx.send(EngineCommand::ExtractBatch { files });
    }

    pub fn submit(&self, job: SubmissionJob) {
        let _ = self.cmd_tx.send(EngineCommand::Submit { job });
    }

    pub fn submit_batch(&self, jobs: Vec<SubmissionJob>) {
        let _ = self.cmd_tx.send(EngineCommand::SubmitBatch { jobs });
    }

    pub fn schedule_reset(&self, after: Duration) {
        let _ = self.cmd_tx.send(EngineCommand::ScheduleReset { after });
    }
}

async fn handle_command(
    workers: &Workers,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let sink = ChannelProgressSink::new(event_tx);
    match command {
        EngineCommand::ExtractSingle { file } => {
            let result = workers.extractor.extract(&file).await;
            sink.emit(EngineEvent::SingleExtracted(result));
        }
        EngineCommand::ExtractBatch { files } => {
            let result = ingest_files(workers.extractor.as_ref(), &files, &sink).await;
            sink.emit(EngineEvent::BatchExtracted(result));
        }
        EngineCommand::Submit { job } => {
            let result = workers.submitter.submit(&job).await;
            sink.emit(EngineEvent::Submitted(result));
        }
        EngineCommand::SubmitBatch { jobs } => {
            let report = submit_sequentially(
                workers.submitter.as_ref(),
                &jobs,
                workers.inter_item_delay,
                &sink,
            )
            .await;
            sink.emit(EngineEvent::BatchSubmitted(report));
        }
        EngineCommand::ScheduleReset { after } => {
            tokio::time::sleep(after).await;
            sink.emit(EngineEvent::ResetTimerElapsed);
        }
    }
}
