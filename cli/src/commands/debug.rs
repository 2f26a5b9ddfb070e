use clap::{arg, ArgMatches, Command};
use yansi::Paint;

use crate::commands::compile_pattern;
use crate::help;

pub fn debug() -> Command {
    super::command("debug")
        .about("Show how a regular expression is compiled")
        .long_about(help::DEBUG_LONG_HELP)
        .arg(arg!(<PATTERN>).help("Regular expression to compile"))
}

pub fn exec_debug(args: &ArgMatches) -> anyhow::Result<()> {
    let pattern = args.get_one::<String>("PATTERN").unwrap();
    let pattern = compile_pattern(pattern)?;

    println!("{} {}", "trivial:".bold(), pattern.is_trivial());
    println!("{} {}", "groups:".bold(), pattern.group_count());

    if let Some(listing) = pattern.disassemble() {
        print!("{}{}", "code:".bold(), listing);
    }

    Ok(())
}
