use std::io::{stdout, Write};

use clap::{arg, value_parser, ArgMatches, Command};

use crate::commands::compile_pattern;
use crate::help;

pub fn split() -> Command {
    super::command("split")
        .about("Split a string around the matches of a regular expression")
        .arg(arg!(<PATTERN>).help("Regular expression used as separator"))
        .arg(arg!(<INPUT>).help("String to split"))
        .arg(
            arg!(-l --limit <N>)
                .help("Maximum number of pieces")
                .long_help(help::SPLIT_LIMIT_LONG_HELP)
                .value_parser(value_parser!(i32))
                .allow_negative_numbers(true)
                .default_value("0"),
        )
}

pub fn exec_split(args: &ArgMatches) -> anyhow::Result<()> {
    let pattern = args.get_one::<String>("PATTERN").unwrap();
    let input = args.get_one::<String>("INPUT").unwrap();
    let limit = *args.get_one::<i32>("limit").unwrap();

    let pattern = compile_pattern(pattern)?;
    let mut output = stdout().lock();

    for piece in pattern.split(input, limit) {
        writeln!(output, "{}", piece)?;
    }

    Ok(())
}
