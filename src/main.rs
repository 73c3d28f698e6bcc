use std::{env, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use log::{error, info, LevelFilter};
use snafu::Report;

use crate::{
    cli::Cli,
    config::models::Settings,
    cups_client::client::LpSpooler,
    maintenance::controller::{Controller, Request},
    test_page::renderer::ImageMagickRenderer,
};

mod cli;
mod config;
mod cups_client;
mod maintenance;
mod page_log;
mod process;
mod test_page;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (settings, work_dir) = match bootstrap() {
        Ok(bootstrapped) => bootstrapped,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let spooler = LpSpooler::new(&settings);
    let renderer = ImageMagickRenderer::new(&settings);
    let request = Request {
        force: cli.force,
        printer: cli.printer.as_deref(),
        threshold_days: cli.days.unwrap_or(settings.maintenance.threshold_days),
        dry_run: cli.dry_run,
    };

    match Controller::new(&spooler, &renderer, &settings, work_dir).run(&request, Utc::now()) {
        Ok(outcome) => {
            info!("{}", outcome);
            ExitCode::SUCCESS
        }
        Err(e) => {
            let code = e.exit_code();
            error!("{}", Report::from_error(e));
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: bool) {
    let mut builder = colog::default_builder();
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn bootstrap() -> Result<(Settings, PathBuf)> {
    let settings = config::loading::load_config().context("Could not load settings")?;
    let work_dir = env::current_dir().context("Could not determine the working directory")?;
    Ok((settings, work_dir))
}
