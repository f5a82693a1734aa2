//! Settings for one CLI invocation.
//!
//! A configuration file holds the library sections (`[layout.*]`, `[style]`)
//! and an optional `[cli]` table for options that only the command-line tool
//! reads. [`load_settings`] finds the file, then applies the command-line
//! flags on top of it: `--width`, `--height` and `--max-ticks` are folded
//! into the [`AppConfig`], and `--log-level` wins over `cli.log_level`.
//!
//! ```toml
//! [cli]
//! log_level = "debug"
//!
//! [layout.viewport]
//! width = 1280.0
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use directories::ProjectDirs;
use log::LevelFilter;
use serde::Deserialize;
use thiserror::Error;

use structviz::{StructvizError, config::AppConfig, layout::Viewport};

use crate::Args;

/// Level used when neither the flag nor the file names one.
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// File looked up in the working directory when `--config` is not given.
const LOCAL_CONFIG: &str = "structviz/config.toml";

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Invalid log level `{0}`; expected off, error, warn, info, debug or trace")]
    LogLevel(String),
}

impl From<ConfigError> for StructvizError {
    fn from(err: ConfigError) -> Self {
        StructvizError::Config(err.to_string())
    }
}

/// The `[cli]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CliSection {
    log_level: Option<String>,
}

/// Everything a configuration file may contain.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(flatten)]
    app: AppConfig,
    #[serde(default)]
    cli: CliSection,
}

/// Where the configuration was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// The file named by `--config`.
    Explicit(PathBuf),
    /// `structviz/config.toml` under the working directory.
    Local(PathBuf),
    /// `config.toml` in the platform configuration directory.
    System(PathBuf),
    /// No file was found.
    Default,
}

impl ConfigSource {
    /// Find the file to read, in order: the explicit path, the local
    /// project file, the platform file.
    fn locate(explicit: Option<&str>) -> Self {
        if let Some(path) = explicit {
            return ConfigSource::Explicit(PathBuf::from(path));
        }

        let local = Path::new(LOCAL_CONFIG);
        if local.exists() {
            return ConfigSource::Local(local.to_path_buf());
        }

        ProjectDirs::from("com", "structviz", "structviz")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .filter(|path| path.exists())
            .map_or(ConfigSource::Default, ConfigSource::System)
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::Explicit(path) | ConfigSource::Local(path) | ConfigSource::System(path) => {
                Some(path)
            }
            ConfigSource::Default => None,
        }
    }
}

/// Library configuration and CLI options after merging file and flags.
#[derive(Debug)]
pub struct Settings {
    app: AppConfig,
    log_level: LevelFilter,
    source: ConfigSource,
}

impl Settings {
    /// The library configuration, with viewport and tick overrides applied.
    pub fn app(&self) -> &AppConfig {
        &self.app
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }
}

/// Load the configuration file and merge the command-line flags into it.
///
/// Runs before the logger is set up, so it reports through its result only.
///
/// # Errors
///
/// Returns [`StructvizError::Config`] if:
/// - `--config` names a file that doesn't exist
/// - the file cannot be parsed
/// - the log level from the flag or the file is not a level name
pub fn load_settings(args: &Args) -> Result<Settings, StructvizError> {
    let source = ConfigSource::locate(args.config.as_deref());
    let file = match source.path() {
        Some(path) => read_config_file(path)?,
        None => ConfigFile::default(),
    };

    let log_level = match args.log_level.as_deref().or(file.cli.log_level.as_deref()) {
        Some(level) => {
            LevelFilter::from_str(level).map_err(|_| ConfigError::LogLevel(level.to_string()))?
        }
        None => DEFAULT_LOG_LEVEL,
    };

    Ok(Settings {
        app: apply_overrides(file.app, args),
        log_level,
        source,
    })
}

/// Folds `--width`, `--height` and `--max-ticks` into `app`.
fn apply_overrides(app: AppConfig, args: &Args) -> AppConfig {
    let layout = app.layout().clone();
    let viewport = layout.viewport();
    let viewport = Viewport::new(
        args.width.unwrap_or(viewport.width()),
        args.height.unwrap_or(viewport.height()),
    );
    let mut graph = *layout.graph();
    if let Some(max_ticks) = args.max_ticks {
        graph.max_ticks = max_ticks;
    }

    AppConfig::new(
        layout.with_viewport(viewport).with_graph(graph),
        app.style().clone(),
    )
}

fn read_config_file(path: &Path) -> Result<ConfigFile, StructvizError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let file = toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(file)
}
