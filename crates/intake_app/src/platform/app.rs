use std::io::{self, BufRead};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use intake_core::{update, AppState, Mode, Msg};
use intake_engine::{EngineHandle, VisionExtractor, WebhookSubmitter};
use intake_logging::{intake_debug, intake_info, intake_warn};

use super::cli::Args;
use super::config::AppConfig;
use super::effects::EffectRunner;
use super::intake::load_source_files;
use super::logging;
use super::ui::commands::{parse_command, Command, HELP};
use super::ui::render::render;

const TICK_INTERVAL: Duration = Duration::from_millis(75);

/// Everything the main loop reacts to.
pub enum AppEvent {
    Engine(Msg),
    Input(String),
    InputClosed,
}

pub fn run_app() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::initialize(&args);

    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            intake_warn!("Could not load .env: {}", err);
        }
    }

    let config = AppConfig::load(&args.config, args.config_is_default())
        .context("loading configuration")?
        .resolve(|key| std::env::var(key).ok())
        .context("resolving configuration")?;

    let inter_item_delay = config.submission.inter_item_delay;
    let extractor =
        VisionExtractor::new(config.extraction).context("building extraction client")?;
    let submitter =
        WebhookSubmitter::new(config.submission).context("building submission client")?;
    let (engine, events) =
        EngineHandle::new(Arc::new(extractor), Arc::new(submitter), inter_item_delay)
            .context("starting engine runtime")?;

    let files = load_source_files(&args.files);
    if files.is_empty() {
        bail!("none of the given files could be read");
    }

    let (app_tx, app_rx) = mpsc::channel();
    let runner = EffectRunner::new(engine, events, app_tx.clone());
    if !args.yes {
        spawn_input_reader(app_tx);
    }

    let mut session = Session::new(runner, args.yes);
    session.dispatch(Msg::FilesSelected(files));
    session.run(app_rx)
}

fn spawn_input_reader(app_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if app_tx.send(AppEvent::Input(line)).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    intake_warn!("Reading stdin failed: {}", err);
                    break;
                }
            }
        }
        let _ = app_tx.send(AppEvent::InputClosed);
    });
}

/// What `--yes` does next in the current state.
#[derive(Debug, PartialEq)]
enum AutoStep {
    Wait,
    Dispatch(Msg),
    Finish,
    Fail(String),
}

fn auto_step(state: &AppState) -> AutoStep {
    match state.mode() {
        Mode::Analyzing => AutoStep::Wait,
        Mode::ReviewSingle | Mode::ReviewBatch if state.is_submitting() => AutoStep::Wait,
        mode @ (Mode::ReviewSingle | Mode::ReviewBatch) => Command::Confirm
            .to_msg(mode)
            .map_or(AutoStep::Wait, AutoStep::Dispatch),
        Mode::Success => AutoStep::Finish,
        Mode::Error => AutoStep::Fail(
            state
                .error()
                .unwrap_or("processing failed")
                .to_string(),
        ),
        // Every selection leaves Idle, so Idle here means nothing is left to do.
        Mode::Idle => AutoStep::Fail("no documents to process".to_string()),
    }
}

enum Flow {
    Continue,
    Quit,
}

struct Session {
    state: AppState,
    runner: EffectRunner,
    auto_confirm: bool,
    input_closed: bool,
}

impl Session {
    fn new(runner: EffectRunner, auto_confirm: bool) -> Self {
        Self {
            state: AppState::new(),
            runner,
            auto_confirm,
            input_closed: false,
        }
    }

    fn run(mut self, app_rx: mpsc::Receiver<AppEvent>) -> anyhow::Result<()> {
        loop {
            let event = match app_rx.recv_timeout(TICK_INTERVAL) {
                Ok(event) => event,
                Err(mpsc::RecvTimeoutError::Timeout) => AppEvent::Engine(Msg::Tick),
                Err(mpsc::RecvTimeoutError::Disconnected) => return Ok(()),
            };

            match event {
                AppEvent::Engine(msg) => self.dispatch(msg),
                AppEvent::Input(line) => {
                    if let Flow::Quit = self.handle_line(&line) {
                        return Ok(());
                    }
                }
                AppEvent::InputClosed => self.input_closed = true,
            }

            if self.auto_confirm {
                match auto_step(&self.state) {
                    AutoStep::Wait => {}
                    AutoStep::Dispatch(msg) => self.dispatch(msg),
                    AutoStep::Finish => return Ok(()),
                    AutoStep::Fail(message) => bail!("{message}"),
                }
            } else if self.input_closed && !self.is_busy() {
                intake_info!("Input closed, leaving");
                return Ok(());
            }
        }
    }

    fn is_busy(&self) -> bool {
        self.state.mode() == Mode::Analyzing || self.state.is_submitting()
    }

    fn handle_line(&mut self, line: &str) -> Flow {
        let command = match parse_command(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Flow::Continue,
            Err(err) => {
                println!("{err}");
                return Flow::Continue;
            }
        };
        intake_debug!("Command {:?} in {:?}", command, self.state.mode());

        match command {
            Command::Quit => return Flow::Quit,
            Command::Help => println!("{HELP}"),
            Command::Add(paths) => {
                let files = load_source_files(&paths);
                if !files.is_empty() {
                    self.dispatch(Msg::FilesSelected(files));
                }
            }
            other => {
                if let Some(msg) = other.to_msg(self.state.mode()) {
                    self.dispatch(msg);
                }
            }
        }
        Flow::Continue
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let before = state.mode();
        let (mut state, effects) = update(state, msg);
        if state.mode() != before {
            intake_debug!("Mode {:?} -> {:?}", before, state.mode());
        }
        if state.consume_dirty() {
            for line in render(&state.view()) {
                println!("{line}");
            }
        }
        self.state = state;
        self.runner.enqueue(effects);
    }
}
