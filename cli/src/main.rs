mod commands;
mod config;
mod help;

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::{io, panic, process};

use config::{load_config_from_file, Config};
use crossterm::tty::IsTty;
use yansi::Color::Red;
use yansi::Paint;

use crate::commands::cli;

const APP_HELP_TEMPLATE: &str = r#"pkr {version}, search, replace and split text with regular expressions.

{author-with-newline}
{before-help}{usage-heading}
  {usage}

{all-args}{after-help}
"#;

const EXIT_ERROR: i32 = 1;
const CONFIG_FILE: &str = ".pkr.toml";

fn main() -> anyhow::Result<()> {
    // Enable support for ANSI escape codes in Windows. In other platforms
    // this is a no-op.
    if let Err(err) = enable_ansi_support::enable_ansi_support() {
        println!("could not enable ANSI support: {}", err)
    }

    #[cfg(feature = "logging")]
    env_logger::init();

    // If stdout is not a tty (for example, because it was redirected to a
    // file) turn off colors, so that the output doesn't contain ANSI escape
    // codes.
    if !io::stdout().is_tty() {
        yansi::disable();
    }

    let args = cli().get_matches_from(wild::args());

    // Kill the process when some panic occurs, after the default handler
    // has printed the panic message.
    let orig_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        orig_hook(panic_info);
        process::exit(EXIT_ERROR);
    }));

    // A config file given explicitly must be valid, the one in the home
    // directory is ignored if it can't be loaded.
    let config: Config = if let Some(path) = args.get_one::<PathBuf>("config")
    {
        match load_config_from_file(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!(
                    "{} invalid config file `{}`: {}",
                    "error:".paint(Red).bold(),
                    path.display(),
                    err
                );
                process::exit(EXIT_ERROR);
            }
        }
    } else {
        match home::home_dir() {
            Some(home_path) if !home_path.as_os_str().is_empty() => {
                load_config_from_file(&home_path.join(CONFIG_FILE))
                    .unwrap_or_default()
            }
            _ => Config::default(),
        }
    };

    if !config.output.color {
        yansi::disable();
    }

    let result = match args.subcommand() {
        Some(("grep", args)) => commands::exec_grep(args, &config.grep),
        Some(("replace", args)) => commands::exec_replace(args),
        Some(("split", args)) => commands::exec_split(args),
        Some(("debug", args)) => commands::exec_debug(args),
        _ => unreachable!(),
    };

    if let Err(err) = result {
        if let Some(source) = err.source() {
            eprintln!("{} {}: {}", "error:".paint(Red).bold(), err, source);
        } else {
            eprintln!("{} {}", "error:".paint(Red).bold(), err);
        }
        process::exit(EXIT_ERROR);
    }

    Ok(())
}
