use crate::{AppState, Effect, Mode, Msg, SourceFile, SUCCESS_RESET_DELAY};

pub const NO_SUPPORTED_FILES: &str =
    "None of the selected files can be analyzed. Choose JPG, PNG or other images, or PDF documents.";
pub const BATCH_ALREADY_SENT: &str = "Every document in this batch has already been sent.";

/// Pure update function: applies a message to state and returns any effects.
///
/// Messages that do not apply to the current mode are ignored.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    state.clear_notice();
    let effects = match msg {
        Msg::FilesSelected(files) => select_files(&mut state, files),
        Msg::ExtractionProgress { current, total } => {
            if state.is_analyzing_batch() {
                state.apply_progress(current, total);
            }
            Vec::new()
        }
        Msg::SingleExtracted(result) => {
            if state.is_analyzing_single() {
                match result {
                    Ok(record) => state.complete_single(record),
                    Err(message) => state.fail(message, None),
                }
            }
            Vec::new()
        }
        Msg::BatchExtracted(result) => {
            if state.is_analyzing_batch() {
                // Earlier batch items survive a failed append and can be reviewed again.
                let resume = state.has_batch_items().then_some(Mode::ReviewBatch);
                match result {
                    Ok(extracted) => {
                        if state.complete_batch(extracted) == 0 && !state.has_batch_items() {
                            state.fail("None of the documents could be read.".to_string(), None);
                        } else {
                            state.enter_batch_review();
                        }
                    }
                    Err(message) => state.fail(message, resume),
                }
            }
            Vec::new()
        }
        Msg::ConfirmClicked => {
            if state.mode() != Mode::ReviewSingle || state.is_submitting() {
                return (state, Vec::new());
            }
            match state.begin_single_submission() {
                Some(job) => vec![Effect::SubmitSingle { job }],
                None => Vec::new(),
            }
        }
        Msg::ConfirmAllClicked => {
            if state.mode() != Mode::ReviewBatch || state.is_submitting() {
                return (state, Vec::new());
            }
            let jobs = state.begin_batch_submission();
            if !jobs.is_empty() {
                vec![Effect::SubmitBatch { jobs }]
            } else {
                // Only reachable once the unsent items were removed after a partial failure.
                state.set_notice(BATCH_ALREADY_SENT.to_string());
                state.enter_success();
                vec![Effect::ScheduleReset {
                    after: SUCCESS_RESET_DELAY,
                }]
            }
        }
        Msg::SubmissionFinished(result) => {
            if state.mode() != Mode::ReviewSingle || !state.is_submitting() {
                return (state, Vec::new());
            }
            match result {
                Ok(()) => {
                    state.enter_success();
                    vec![Effect::ScheduleReset {
                        after: SUCCESS_RESET_DELAY,
                    }]
                }
                Err(message) => {
                    state.fail(message, Some(Mode::ReviewSingle));
                    Vec::new()
                }
            }
        }
        Msg::BatchSubmissionFinished { submitted, error } => {
            if state.mode() != Mode::ReviewBatch || !state.is_submitting() {
                return (state, Vec::new());
            }
            state.mark_submitted(&submitted);
            match error {
                None => {
                    state.enter_success();
                    vec![Effect::ScheduleReset {
                        after: SUCCESS_RESET_DELAY,
                    }]
                }
                Some(message) => {
                    state.fail(message, Some(Mode::ReviewBatch));
                    Vec::new()
                }
            }
        }
        Msg::RemoveItem(id) => {
            if state.mode() == Mode::ReviewBatch && !state.is_submitting() {
                state.remove_item(id);
            }
            Vec::new()
        }
        Msg::DiscardClicked => {
            if state.mode() == Mode::ReviewSingle && !state.is_submitting() {
                state.reset();
            }
            Vec::new()
        }
        Msg::AddMoreClicked => {
            if state.mode() == Mode::ReviewBatch && !state.is_submitting() {
                state.reset();
            }
            Vec::new()
        }
        Msg::RetryClicked => {
            if state.mode() == Mode::Error {
                state.reset();
            }
            Vec::new()
        }
        Msg::BackToReviewClicked => {
            if state.mode() == Mode::Error {
                state.resume_review();
            }
            Vec::new()
        }
        Msg::SuccessTimerElapsed => {
            if state.mode() == Mode::Success {
                state.reset();
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn select_files(state: &mut AppState, files: Vec<SourceFile>) -> Vec<Effect> {
    if files.is_empty() {
        return Vec::new();
    }
    match state.mode() {
        Mode::Idle => {}
        Mode::ReviewBatch if !state.is_submitting() => {}
        _ => return Vec::new(),
    }

    let total = files.len();
    let accepted: Vec<SourceFile> = files.into_iter().filter(SourceFile::is_accepted).collect();
    state.record_intake(accepted.len(), total - accepted.len());
    if accepted.is_empty() {
        if state.mode() == Mode::Idle {
            state.fail(NO_SUPPORTED_FILES.to_string(), None);
        } else {
            state.set_notice(NO_SUPPORTED_FILES.to_string());
        }
        return Vec::new();
    }

    // Batch mode is sticky: once items exist, every selection appends to them.
    let is_batch = accepted.len() > 1 || state.has_batch_items();
    if is_batch {
        let files = state.begin_batch(accepted);
        vec![Effect::ExtractBatch { files }]
    } else {
        let Some(file) = accepted.into_iter().next() else {
            return Vec::new();
        };
        let file = state.begin_single(file);
        vec![Effect::ExtractSingle { file }]
    }
}
