use std::sync::Once;

use intake_core::{
    update, Amount, AppState, DocumentRecord, DocumentType, Effect, ExtractedFile, Mode, Msg,
    SourceFile, SubmissionMode, NO_SUPPORTED_FILES, SUCCESS_RESET_DELAY,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(intake_logging::initialize_for_tests);
}

fn image(name: &str) -> SourceFile {
    SourceFile::new(name, "image/jpeg", name.as_bytes().to_vec())
}

fn record(supplier: &str, total: &str) -> DocumentRecord {
    DocumentRecord {
        document_type: DocumentType::Ticket,
        supplier: supplier.to_string(),
        total: Amount::parse(total),
        ..DocumentRecord::default()
    }
}

fn select(state: AppState, files: Vec<SourceFile>) -> (AppState, Vec<Effect>) {
    update(state, Msg::FilesSelected(files))
}

fn review_single(supplier: &str) -> AppState {
    let (state, _) = select(AppState::new(), vec![image("ticket.jpg")]);
    let (state, _) = update(state, Msg::SingleExtracted(Ok(record(supplier, "10,00"))));
    assert_eq!(state.mode(), Mode::ReviewSingle);
    state
}

#[test]
fn one_file_without_batch_enters_single_mode() {
    init_logging();
    let (mut state, effects) = select(AppState::new(), vec![image("ticket.jpg")]);

    assert_eq!(state.mode(), Mode::Analyzing);
    assert_eq!(
        effects,
        vec![Effect::ExtractSingle {
            file: image("ticket.jpg")
        }]
    );
    let view = state.view();
    assert!(view.progress.is_none());
    assert_eq!(view.single.as_ref().map(|s| s.file_name.as_str()), Some("ticket.jpg"));
    assert!(view.single.as_ref().is_some_and(|s| s.record.is_none()));
    assert_eq!(view.outstanding_previews, 1);
    assert!(state.consume_dirty());
}

#[test]
fn several_files_enter_batch_mode() {
    init_logging();
    let files = vec![image("a.jpg"), image("b.jpg")];
    let (state, effects) = select(AppState::new(), files.clone());

    assert_eq!(state.mode(), Mode::Analyzing);
    assert_eq!(effects, vec![Effect::ExtractBatch { files }]);
    let view = state.view();
    assert_eq!(view.progress.map(|p| (p.current, p.total)), Some((0, 2)));
    assert!(view.single.is_none());
    assert_eq!(view.outstanding_previews, 2);
}

#[test]
fn selection_while_batch_exists_stays_in_batch_mode() {
    init_logging();
    let (state, _) = select(AppState::new(), vec![image("a.jpg"), image("b.jpg")]);
    let (state, _) = update(
        state,
        Msg::BatchExtracted(Ok(vec![
            ExtractedFile {
                index: 0,
                record: record("A", "1"),
            },
            ExtractedFile {
                index: 1,
                record: record("B", "2"),
            },
        ])),
    );
    assert_eq!(state.mode(), Mode::ReviewBatch);

    let (state, effects) = select(state, vec![image("c.jpg")]);
    assert_eq!(state.mode(), Mode::Analyzing);
    assert_eq!(
        effects,
        vec![Effect::ExtractBatch {
            files: vec![image("c.jpg")]
        }]
    );

    let (state, _) = update(
        state,
        Msg::BatchExtracted(Ok(vec![ExtractedFile {
            index: 0,
            record: record("C", "3"),
        }])),
    );
    let suppliers: Vec<_> = state
        .batch_items()
        .iter()
        .map(|item| item.record.supplier.clone())
        .collect();
    assert_eq!(suppliers, vec!["A", "B", "C"]);
    assert_eq!(state.view().outstanding_previews, 3);
}

#[test]
fn unsupported_files_are_skipped_at_intake() {
    init_logging();
    let notes = SourceFile::new("notes.txt", "text/plain", b"hi".to_vec());
    let (state, effects) = select(AppState::new(), vec![notes.clone()]);
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.mode, Mode::Error);
    assert_eq!(view.error.as_deref(), Some(NO_SUPPORTED_FILES));
    assert!(!view.can_resume);
    assert_eq!(view.outstanding_previews, 0);
    let stats = view.last_intake.expect("intake stats");
    assert_eq!((stats.accepted, stats.skipped), (0, 1));

    let (state, _) = update(state, Msg::RetryClicked);
    assert_eq!(state.mode(), Mode::Idle);

    // One accepted file plus one skipped still counts as a single selection.
    let (state, effects) = select(AppState::new(), vec![notes, image("a.jpg")]);
    assert!(matches!(effects.as_slice(), [Effect::ExtractSingle { .. }]));
    let stats = state.view().last_intake.expect("intake stats");
    assert_eq!((stats.accepted, stats.skipped), (1, 1));
}

#[test]
fn unsupported_addition_to_batch_keeps_review_and_shows_notice() {
    init_logging();
    let (state, _) = select(AppState::new(), vec![image("a.jpg"), image("b.jpg")]);
    let (state, _) = update(
        state,
        Msg::BatchExtracted(Ok(vec![
            ExtractedFile {
                index: 0,
                record: record("A", "1"),
            },
            ExtractedFile {
                index: 1,
                record: record("B", "2"),
            },
        ])),
    );
    let mut state = state;
    state.consume_dirty();

    let notes = SourceFile::new("notes.txt", "text/plain", b"hi".to_vec());
    let (mut state, effects) = select(state, vec![notes]);

    assert!(effects.is_empty());
    assert!(state.consume_dirty());
    let view = state.view();
    assert_eq!(view.mode, Mode::ReviewBatch);
    assert_eq!(view.batch.len(), 2);
    assert_eq!(view.notice.as_deref(), Some(NO_SUPPORTED_FILES));

    // The notice is shown once.
    let (state, _) = update(state, Msg::Tick);
    assert_eq!(state.notice(), None);
}

#[test]
fn empty_selection_is_ignored() {
    init_logging();
    let (mut state, effects) = select(AppState::new(), Vec::new());
    assert!(effects.is_empty());
    assert_eq!(state.mode(), Mode::Idle);
    assert!(!state.consume_dirty());
}

#[test]
fn selection_is_ignored_while_analyzing() {
    init_logging();
    let (state, _) = select(AppState::new(), vec![image("a.jpg")]);
    let (state, effects) = select(state, vec![image("b.jpg")]);
    assert!(effects.is_empty());
    assert_eq!(state.view().outstanding_previews, 1);
}

#[test]
fn single_failure_enters_error_without_resume() {
    init_logging();
    let (state, _) = select(AppState::new(), vec![image("a.jpg")]);
    let (state, _) = update(state, Msg::SingleExtracted(Err("Could not read".to_string())));

    let view = state.view();
    assert_eq!(view.mode, Mode::Error);
    assert_eq!(view.error.as_deref(), Some("Could not read"));
    assert!(!view.can_resume);

    let (state, _) = update(state, Msg::BackToReviewClicked);
    assert_eq!(state.mode(), Mode::Error);

    let (state, _) = update(state, Msg::RetryClicked);
    assert_eq!(state.mode(), Mode::Idle);
    assert_eq!(state.view().outstanding_previews, 0);
}

#[test]
fn confirm_single_submits_then_resets_after_success_delay() {
    init_logging();
    let state = review_single("Mercadona");

    let (state, effects) = update(state, Msg::ConfirmClicked);
    assert!(state.is_submitting());
    let [Effect::SubmitSingle { job }] = effects.as_slice() else {
        panic!("expected a single submission, got {effects:?}");
    };
    assert_eq!(job.mode, SubmissionMode::Single);
    assert_eq!(job.item_id, None);
    assert_eq!(job.record.supplier, "Mercadona");
    assert_eq!(job.file.as_ref().map(|f| f.name.as_str()), Some("ticket.jpg"));

    // A second click while sending does nothing.
    let (state, effects) = update(state, Msg::ConfirmClicked);
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::SubmissionFinished(Ok(())));
    assert_eq!(state.mode(), Mode::Success);
    assert_eq!(
        effects,
        vec![Effect::ScheduleReset {
            after: SUCCESS_RESET_DELAY
        }]
    );

    let (state, _) = update(state, Msg::SuccessTimerElapsed);
    let view = state.view();
    assert_eq!(view.mode, Mode::Idle);
    assert!(view.single.is_none());
    assert!(state.single_record().is_none());
    assert_eq!(view.outstanding_previews, 0);
}

#[test]
fn single_submission_failure_keeps_data_and_allows_resume() {
    init_logging();
    let state = review_single("Repsol");
    let (state, _) = update(state, Msg::ConfirmClicked);
    let (state, _) = update(state, Msg::SubmissionFinished(Err("webhook down".to_string())));

    let view = state.view();
    assert_eq!(view.mode, Mode::Error);
    assert!(view.can_resume);
    assert!(!view.submitting);
    assert_eq!(state.single_record().map(|r| r.supplier.as_str()), Some("Repsol"));

    let (state, _) = update(state, Msg::BackToReviewClicked);
    assert_eq!(state.mode(), Mode::ReviewSingle);
    assert!(state.error().is_none());

    let (_state, effects) = update(state, Msg::ConfirmClicked);
    assert!(matches!(effects.as_slice(), [Effect::SubmitSingle { .. }]));
}

#[test]
fn discard_single_resets_and_releases_preview() {
    init_logging();
    let state = review_single("Repsol");
    assert_eq!(state.view().outstanding_previews, 1);

    let (state, effects) = update(state, Msg::DiscardClicked);
    assert!(effects.is_empty());
    assert_eq!(state.mode(), Mode::Idle);
    assert_eq!(state.view().outstanding_previews, 0);
}

#[test]
fn late_submission_result_is_ignored_after_reset() {
    init_logging();
    let state = review_single("Repsol");
    let (state, _) = update(state, Msg::DiscardClicked);
    let (state, effects) = update(state, Msg::SubmissionFinished(Ok(())));
    assert!(effects.is_empty());
    assert_eq!(state.mode(), Mode::Idle);
}
