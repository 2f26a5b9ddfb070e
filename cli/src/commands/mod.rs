mod debug;
mod grep;
mod replace;
mod split;

pub use debug::*;
pub use grep::*;
pub use replace::*;
pub use split::*;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{arg, command, crate_authors, Command};
use pikere::Pattern;

use crate::{commands, help, APP_HELP_TEMPLATE};

pub fn command(name: &'static str) -> Command {
    Command::new(name).help_template(
        r#"{about-with-newline}
{usage-heading}
  {usage}

{all-args}
"#,
    )
}

pub fn cli() -> Command {
    command!()
        .author(crate_authors!("\n")) // requires `cargo` feature
        .arg_required_else_help(true)
        .arg(
            arg!(-C --config <CONFIG_FILE> "Config file")
                .value_parser(existing_path_parser)
                .long_help(help::CONFIG_FILE),
        )
        .help_template(APP_HELP_TEMPLATE)
        .subcommand_required(true)
        .subcommands(vec![
            commands::grep(),
            commands::replace(),
            commands::split(),
            commands::debug(),
        ])
}

/// Parses a path and makes sure that it exists.
fn existing_path_parser(input: &str) -> Result<PathBuf, anyhow::Error> {
    let path = PathBuf::from(input);
    if path.try_exists()? {
        Ok(path)
    } else {
        Err(anyhow!("file not found"))
    }
}

/// Compiles the regular expression passed as the `<PATTERN>` argument.
fn compile_pattern(source: &str) -> anyhow::Result<Pattern> {
    Ok(Pattern::compile(source)?)
}

/// Reads the whole content of the file at `path`, or the whole standard
/// input if `path` is `None`.
fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("can not read `{}`", path.display())),
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("can not read from stdin")?;
            Ok(input)
        }
    }
}
