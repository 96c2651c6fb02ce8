mod app;
mod cli;
mod config;
mod effects;
mod intake;
mod logging;
mod ui;

pub use app::run_app;
