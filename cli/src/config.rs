use std::path::Path;

use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Configuration for the CLI.
#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Output related settings.
    pub output: OutputConfig,
    /// Configuration for the `grep` command.
    pub grep: GrepConfig,
}

/// Output related settings.
#[derive(Deserialize, Serialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Highlight matches when stdout is a terminal.
    pub color: bool,
}

/// Configuration for the `grep` command.
#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct GrepConfig {
    /// Prefix each line with its line number, as if `--line-number` was
    /// always passed.
    pub line_numbers: bool,
}

impl Default for OutputConfig {
    fn default() -> OutputConfig {
        OutputConfig { color: true }
    }
}

/// Load a config file from a given path. Path must contain a valid TOML file
/// or this function will propagate the error. Settings missing from the file
/// take their default values.
pub fn load_config_from_file(
    config_file: &Path,
) -> Result<Config, Box<figment::Error>> {
    let config: Config =
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file_exact(config_file))
            .extract()?;
    Ok(config)
}
