use std::io::{stdout, Write};
use std::path::PathBuf;

use clap::{arg, value_parser, ArgMatches, Command};

use crate::commands::{compile_pattern, read_input};
use crate::help;

pub fn replace() -> Command {
    super::command("replace")
        .about("Replace the matches of a regular expression")
        .long_about(help::REPLACE_LONG_HELP)
        .arg(arg!(<PATTERN>).help("Regular expression to search for"))
        .arg(arg!(<REPLACEMENT>).help("Text that replaces each match"))
        .arg(
            arg!([FILE])
                .help("File to read, stdin is read if not given")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(--first)
                .help("Replace only the first match in each line"),
        )
}

pub fn exec_replace(args: &ArgMatches) -> anyhow::Result<()> {
    let pattern = args.get_one::<String>("PATTERN").unwrap();
    let replacement = args.get_one::<String>("REPLACEMENT").unwrap();
    let file = args.get_one::<PathBuf>("FILE");
    let first_only = args.get_flag("first");

    let pattern = compile_pattern(pattern)?;
    let input = read_input(file.map(|path| path.as_path()))?;

    let mut output = stdout().lock();
    let mut matcher = pattern.matcher("");

    for line in input.lines() {
        matcher.reset_with(line);
        let replaced = if first_only {
            matcher.replace_first(replacement)
        } else {
            matcher.replace_all(replacement)
        };
        writeln!(output, "{}", replaced)?;
    }

    Ok(())
}
