mod audio;
mod cli;
mod config;
mod error;
mod pipeline;
mod report;
mod tempo;

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use cli::Cli;
use config::Config;
use pipeline::Settings;
use report::Report;

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .format_timestamp_millis()
        .init();

    // Explicit --config path, or auto-detect bpmscan.toml / user config
    let mut cfg = match config::discover(cli.config.as_deref()) {
        Some(path) => match config::load_config(&path) {
            Ok(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg
            }
            Err(err) => {
                log::warn!("{:#}; using defaults", err);
                Config::default()
            }
        },
        None => Config::default(),
    };
    cli.apply_overrides(&mut cfg);
    let settings = Settings::from(&cfg);
    log::debug!("Settings: {:?}", settings);

    let spinner = if cli.json {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
        pb.set_message(format!("Analyzing {}", cli.input.display()));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    };

    let result = pipeline::analyze_file(&cli.input, &settings);
    spinner.finish_and_clear();

    if let Err(ref err) = result {
        log::debug!("Analysis failed: {:?}", err);
    }

    let report = Report::new(&cli.input.display().to_string(), result);
    if cli.json {
        println!("{}", report.render_json()?);
    } else {
        println!("{}", report.render_text());
    }

    Ok(())
}
