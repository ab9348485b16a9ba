mod app;
mod cli;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;

use anyhow::Context;
use app::WeighMapApp;
use clap::Parser;
use eframe::egui;

use crate::cli::Cli;
use crate::config::Config;
use crate::data::filter::{FilterState, compute_view};
use crate::data::loader;
use crate::data::model::Category;
use crate::state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    config.apply_overrides(&cli);
    log::debug!("{config:?}");

    if cli.summary {
        return print_summary(&cli, &config);
    }

    let mut state = AppState::from_config(&config);
    state.start_loading(&config.scale_data, &config.weighbridge_data);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Weigh Map – Scale & Weighbridge Inspections",
        options,
        Box::new(move |_cc| Ok(Box::new(WeighMapApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("viewer failed: {e}"))
}

/// Headless mode: one filter pass, printed to stdout.
fn print_summary(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    let outcome = loader::load_store(&config.scale_data, &config.weighbridge_data);
    let filter = FilterState {
        regions: cli.regions.iter().cloned().collect(),
        category: cli.category.unwrap_or_default().into(),
    };
    let view = compute_view(&outcome.store, &filter, &config.default_region_policy);

    for line in view.counts.summary_lines() {
        println!("{line}");
    }
    for category in Category::ALL {
        println!(
            "{category} failing inspection: {}",
            view.failing_count(category)
        );
    }
    if view.skipped_without_position > 0 {
        println!("Without coordinates: {}", view.skipped_without_position);
    }

    if !outcome.errors.is_empty() && outcome.store.is_empty() {
        anyhow::bail!("no dataset could be loaded");
    }
    Ok(())
}
