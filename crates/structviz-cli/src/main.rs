//! structviz CLI entry point.

use std::process;

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use structviz_cli::{Args, Settings, error_adapter::to_reportables, load_settings};

fn main() {
    miette::set_panic_hook();

    let args = Args::parse();

    // The level comes from the settings, so a settings error is reported at
    // the default level.
    let settings = load_settings(&args);
    let log_level = settings
        .as_ref()
        .map_or(LevelFilter::Info, Settings::log_level);

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting structviz");
    debug!(args:?; "Parsed arguments");

    let result = settings.and_then(|settings| structviz_cli::run_with_settings(&args, &settings));
    if let Err(err) = result {
        let reporter = miette::GraphicalReportHandler::new();

        for reportable in to_reportables(&err) {
            let mut writer = String::new();
            reporter
                .render_report(&mut writer, &reportable)
                .expect("Writing to String buffer is infallible");

            error!("{writer}");
        }

        process::exit(1);
    }

    info!("Completed successfully");
}
