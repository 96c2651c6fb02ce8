use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use intake_core::{DocumentRecord, SourceFile, SubmissionJob, SubmissionMode};
use intake_engine::{
    ingest_files, submit_sequentially, BatchIngestError, EngineEvent, ExtractionError, Extractor,
    NullSink, ProgressSink, SubmissionError, Submitter, INTER_SUBMISSION_DELAY,
};
use pretty_assertions::assert_eq;
use tokio::time::Instant;

#[derive(Clone, Default)]
struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    fn events(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Fails for file names listed in `failing`; otherwise echoes the name as supplier.
#[derive(Default)]
struct ScriptedExtractor {
    failing: HashSet<String>,
    seen: Mutex<Vec<String>>,
}

impl ScriptedExtractor {
    fn failing(names: &[&str]) -> Self {
        Self {
            failing: names.iter().map(|name| name.to_string()).collect(),
            seen: Mutex::default(),
        }
    }
}

#[async_trait::async_trait]
impl Extractor for ScriptedExtractor {
    async fn extract(&self, file: &SourceFile) -> Result<DocumentRecord, ExtractionError> {
        self.seen.lock().unwrap().push(file.name.clone());
        if self.failing.contains(&file.name) {
            return Err(ExtractionError::MalformedResponse(format!("{} unreadable", file.name)));
        }
        Ok(DocumentRecord {
            supplier: file.name.clone(),
            ..DocumentRecord::default()
        })
    }
}

/// Records the instant of each call and fails on the listed item ids.
#[derive(Default)]
struct RecordingSubmitter {
    failing: HashSet<u64>,
    calls: Mutex<Vec<(Option<u64>, Instant)>>,
}

#[async_trait::async_trait]
impl Submitter for RecordingSubmitter {
    async fn submit(&self, job: &SubmissionJob) -> Result<(), SubmissionError> {
        self.calls.lock().unwrap().push((job.item_id, Instant::now()));
        match job.item_id {
            Some(id) if self.failing.contains(&id) => Err(SubmissionError::HttpStatus {
                status: 500,
                message: "Internal Server Error".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

fn image(name: &str) -> SourceFile {
    SourceFile::new(name, "image/jpeg", name.as_bytes().to_vec())
}

fn jobs(ids: &[u64]) -> Vec<SubmissionJob> {
    ids.iter()
        .map(|id| SubmissionJob {
            item_id: Some(*id),
            mode: SubmissionMode::Batch,
            record: DocumentRecord::default(),
            file: None,
        })
        .collect()
}

#[tokio::test]
async fn failing_file_is_skipped_and_order_kept() {
    let extractor = ScriptedExtractor::failing(&["b.jpg"]);
    let files = vec![image("a.jpg"), image("b.jpg"), image("c.jpg")];

    let report = ingest_files(&extractor, &files, &NullSink).await.unwrap();

    let extracted: Vec<(usize, String)> = report
        .extracted
        .iter()
        .map(|file| (file.index, file.record.supplier.clone()))
        .collect();
    assert_eq!(
        extracted,
        vec![(0, "a.jpg".to_string()), (2, "c.jpg".to_string())]
    );
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 1);
    assert_eq!(report.failures[0].file_name, "b.jpg");
    assert_eq!(report.attempted, 3);
    assert_eq!(
        *extractor.seen.lock().unwrap(),
        vec!["a.jpg", "b.jpg", "c.jpg"]
    );
}

#[tokio::test]
async fn progress_is_reported_before_each_file() {
    let extractor = ScriptedExtractor::failing(&["b.jpg"]);
    let files = vec![image("a.jpg"), image("b.jpg"), image("c.jpg")];
    let sink = TestSink::default();

    ingest_files(&extractor, &files, &sink).await.unwrap();

    assert_eq!(
        sink.events(),
        vec![
            EngineEvent::IngestProgress { current: 1, total: 3 },
            EngineEvent::IngestProgress { current: 2, total: 3 },
            EngineEvent::IngestProgress { current: 3, total: 3 },
        ]
    );
}

#[tokio::test]
async fn all_failures_carry_the_last_error() {
    let extractor = ScriptedExtractor::failing(&["a.jpg", "b.jpg"]);
    let files = vec![image("a.jpg"), image("b.jpg")];

    let err = ingest_files(&extractor, &files, &NullSink).await.unwrap_err();

    assert_eq!(
        err,
        BatchIngestError::NothingExtracted {
            attempted: 2,
            last_error: ExtractionError::MalformedResponse("b.jpg unreadable".to_string()),
        }
    );
}

#[tokio::test]
async fn empty_selection_is_rejected() {
    let extractor = ScriptedExtractor::default();
    let err = ingest_files(&extractor, &[], &NullSink).await.unwrap_err();
    assert_eq!(err, BatchIngestError::Empty);
    assert!(extractor.seen.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn submissions_are_spaced_by_the_inter_item_delay() {
    let submitter = RecordingSubmitter::default();
    let sink = TestSink::default();

    let report =
        submit_sequentially(&submitter, &jobs(&[1, 2, 3]), INTER_SUBMISSION_DELAY, &sink).await;

    assert!(report.is_complete());
    assert_eq!(report.submitted, vec![1, 2, 3]);
    assert_eq!(report.skipped, 0);

    let calls = submitter.calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 3);
    for pair in calls.windows(2) {
        assert!(pair[1].1 - pair[0].1 >= Duration::from_millis(2000));
    }
    assert_eq!(
        sink.events(),
        vec![
            EngineEvent::DeliveryProgress { current: 1, total: 3 },
            EngineEvent::DeliveryProgress { current: 2, total: 3 },
            EngineEvent::DeliveryProgress { current: 3, total: 3 },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn first_failure_stops_the_batch() {
    let submitter = RecordingSubmitter {
        failing: HashSet::from([2]),
        ..RecordingSubmitter::default()
    };

    let report = submit_sequentially(
        &submitter,
        &jobs(&[1, 2, 3, 4]),
        INTER_SUBMISSION_DELAY,
        &NullSink,
    )
    .await;

    assert!(!report.is_complete());
    assert_eq!(report.submitted, vec![1]);
    assert_eq!(report.skipped, 2);
    let failure = report.failure.expect("failure recorded");
    assert_eq!(failure.item_id, Some(2));
    assert!(matches!(
        failure.error,
        SubmissionError::HttpStatus { status: 500, .. }
    ));

    let attempted: Vec<Option<u64>> = submitter
        .calls
        .lock()
        .unwrap()
        .iter()
        .map(|(id, _)| *id)
        .collect();
    assert_eq!(attempted, vec![Some(1), Some(2)]);
}

#[tokio::test(start_paused = true)]
async fn single_job_does_not_wait() {
    let submitter = RecordingSubmitter::default();
    let started = Instant::now();

    let report =
        submit_sequentially(&submitter, &jobs(&[7]), INTER_SUBMISSION_DELAY, &NullSink).await;

    assert_eq!(report.submitted, vec![7]);
    assert!(started.elapsed() < INTER_SUBMISSION_DELAY);
}
