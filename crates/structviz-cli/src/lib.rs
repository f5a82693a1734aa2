//! CLI logic for the structviz layout tool.
//!
//! This module contains the core CLI logic: picking the input, running it
//! through a [`Session`] and writing the layout as JSON.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;
pub use config::{ConfigSource, Settings, load_settings};

use std::{fs, io};

use log::{debug, info};

use structviz::{
    StructvizError, Visualizer,
    kind::{StructureKind, parse_forced_kind},
    samples,
    session::Session,
    share::ShareState,
};

/// Text to visualize and the structure type it was forced to, if any.
struct Input {
    source: String,
    forced: Option<StructureKind>,
}

fn read_input(args: &Args) -> Result<Input, StructvizError> {
    if let Some(token) = &args.share {
        let (forced, source) = ShareState::decode(token)?.into_parts();
        return Ok(Input { source, forced });
    }

    if let Some(name) = &args.sample {
        let kind = name
            .parse::<StructureKind>()
            .map_err(|err| StructvizError::Config(err.to_string()))?;
        let source = samples::sample(kind)
            .ok_or_else(|| StructvizError::Config(format!("there is no sample for {kind} data")))?;
        return Ok(Input {
            source: source.to_string(),
            forced: Some(kind),
        });
    }

    let forced =
        parse_forced_kind(&args.kind).map_err(|err| StructvizError::Config(err.to_string()))?;
    let path = args
        .input
        .as_deref()
        .ok_or_else(|| StructvizError::Config("no input file given".to_string()))?;
    let source = fs::read_to_string(path)?;
    Ok(Input { source, forced })
}

/// Run the structviz CLI application
///
/// Loads the settings for `args` and calls [`run_with_settings`].
///
/// # Errors
///
/// Returns `StructvizError` for configuration errors and for everything
/// [`run_with_settings`] reports.
pub fn run(args: &Args) -> Result<(), StructvizError> {
    let settings = load_settings(args)?;
    run_with_settings(args, &settings)
}

/// Lay out the input and write the resulting JSON to the output file.
///
/// With `--format` the re-indented input is written instead.
///
/// # Errors
///
/// Returns `StructvizError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed share tokens
/// - Parsing errors
/// - Validation errors
/// - Layout errors
pub fn run_with_settings(args: &Args, settings: &Settings) -> Result<(), StructvizError> {
    info!(
        input_path:? = args.input,
        output_path = args.output;
        "Processing input"
    );
    debug!(config_source:? = settings.source(); "Using configuration");

    let app_config = settings.app().clone();
    let Input { source, forced } = read_input(args)?;

    if args.strict {
        Visualizer::new(app_config.clone()).parse_strict(&source)?;
    }

    if args.format {
        let pretty = structviz_parser::format(&source)
            .map_err(|err| StructvizError::new_parse_error(err, source.as_str()))?;
        fs::write(&args.output, pretty)?;
        info!(output_file = args.output; "Formatted input written");
        return Ok(());
    }

    let max_ticks = app_config.layout().graph().max_ticks;
    let mut session = Session::new(app_config);
    let kind = session.run(&source, forced)?.kind();
    let ticks = session.settle(max_ticks);
    debug!(kind:% = kind, ticks = ticks; "Layout finished");

    let Some(visualization) = session.current() else {
        return Ok(());
    };
    let json = serde_json::to_string_pretty(visualization).map_err(io::Error::from)?;
    fs::write(&args.output, json)?;

    if args.print_share {
        if let Some(token) = session.share_token() {
            println!("{token}");
        }
    }

    info!(kind:% = kind, output_file = args.output; "Layout exported successfully");
    Ok(())
}
