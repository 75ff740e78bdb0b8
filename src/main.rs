mod app;
mod color;
mod config;
mod data;
mod format;
mod report;
mod state;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{value_parser, Arg, Command};
use eframe::egui;

use app::DashboardApp;
use config::DashboardConfig;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let matches = Command::new("vestibular-dashboard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Dashboard of admission seats, registrations and candidates per seat")
        .arg(
            Arg::new("data")
                .short('d')
                .long("data")
                .value_name("FILE")
                .help("Dataset file (.csv, .json or .parquet)")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .value_parser(value_parser!(PathBuf)),
        )
        .get_matches();

    let mut config = DashboardConfig::resolve(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;

    if let Some(path) = matches.get_one::<PathBuf>("data") {
        config.dataset_path = path.clone();
    } else if !config.dataset_path.exists() {
        log::warn!("{} not found, asking for a dataset", config.dataset_path.display());
        match pick_dataset_file() {
            Some(path) => config.dataset_path = path,
            None => bail!("no dataset: {} does not exist", config.dataset_path.display()),
        }
    }

    // Nothing can be shown without the dataset, so a failure here ends the process.
    let dataset = match data::loader::load_file(&config.dataset_path) {
        Ok(dataset) => Arc::new(dataset),
        Err(e) => {
            log::error!("Failed to load dataset: {e:#}");
            return Err(e);
        }
    };

    let title = config.window_title.clone();
    let source = config.dataset_path.display().to_string();
    let state = AppState::new(dataset, config, source);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

fn pick_dataset_file() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Abrir dados do vestibular")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file()
}
