use std::io::{stdout, Write};
use std::path::PathBuf;

use clap::{arg, value_parser, ArgMatches, Command};
use pikere::Matcher;
use yansi::Color::{Green, Magenta, Red};
use yansi::Paint;

use crate::commands::{compile_pattern, read_input};
use crate::config::GrepConfig;
use crate::help;

pub fn grep() -> Command {
    super::command("grep")
        .about("Print lines that match a regular expression")
        .long_about(help::GREP_LONG_HELP)
        .arg(arg!(<PATTERN>).help("Regular expression to search for"))
        .arg(
            arg!([FILE]...)
                .help("Files to search, stdin is read if not given")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(-n --"line-number").help("Prefix each line with its line number"),
        )
        .arg(
            arg!(-o --"only-matching")
                .help("Print only the matched parts of each line"),
        )
        .arg(
            arg!(-v --"invert-match").help("Print the lines that don't match"),
        )
        .arg(
            arg!(-c --count).help("Print only the number of selected lines"),
        )
}

pub fn exec_grep(
    args: &ArgMatches,
    config: &GrepConfig,
) -> anyhow::Result<()> {
    let pattern = args.get_one::<String>("PATTERN").unwrap();
    let pattern = compile_pattern(pattern)?;

    let files: Vec<&PathBuf> = args
        .get_many::<PathBuf>("FILE")
        .map(|files| files.collect())
        .unwrap_or_default();

    let options = GrepOptions {
        line_numbers: config.line_numbers || args.get_flag("line-number"),
        only_matching: args.get_flag("only-matching"),
        invert: args.get_flag("invert-match"),
        count: args.get_flag("count"),
        with_file_names: files.len() > 1,
    };

    let mut output = stdout().lock();

    if files.is_empty() {
        let input = read_input(None)?;
        grep_input(pattern.matcher(""), None, &input, &options, &mut output)?;
    } else {
        for path in files {
            let input = read_input(Some(path.as_path()))?;
            let name = path.display().to_string();
            grep_input(
                pattern.matcher(""),
                Some(name.as_str()),
                &input,
                &options,
                &mut output,
            )?;
        }
    }

    Ok(())
}

struct GrepOptions {
    line_numbers: bool,
    only_matching: bool,
    invert: bool,
    count: bool,
    with_file_names: bool,
}

fn grep_input<'h, W: Write>(
    mut matcher: Matcher<'_, 'h>,
    name: Option<&str>,
    input: &'h str,
    options: &GrepOptions,
    output: &mut W,
) -> anyhow::Result<()> {
    let mut selected = 0_usize;

    for (n, line) in input.lines().enumerate() {
        matcher.reset_with(line);

        let is_match = matcher.find();

        if is_match == options.invert {
            continue;
        }

        selected += 1;

        if options.count {
            continue;
        }

        // Prints the file name and line number, if required.
        let prefix = |output: &mut W| -> anyhow::Result<()> {
            if let (true, Some(name)) = (options.with_file_names, name) {
                write!(output, "{}:", name.paint(Magenta))?;
            }
            if options.line_numbers {
                write!(output, "{}:", (n + 1).paint(Green))?;
            }
            Ok(())
        };

        if options.invert {
            prefix(output)?;
            writeln!(output, "{}", line)?;
        } else if options.only_matching {
            loop {
                let range = matcher.range()?;
                // Empty matches are not printed.
                if !range.is_empty() {
                    prefix(output)?;
                    writeln!(output, "{}", line[range].paint(Red).bold())?;
                }
                if !matcher.find() {
                    break;
                }
            }
        } else {
            prefix(output)?;
            let mut last = 0;
            loop {
                let range = matcher.range()?;
                write!(
                    output,
                    "{}{}",
                    &line[last..range.start],
                    line[range.clone()].paint(Red).bold()
                )?;
                last = range.end;
                if !matcher.find() {
                    break;
                }
            }
            writeln!(output, "{}", &line[last..])?;
        }
    }

    if options.count {
        if let (true, Some(name)) = (options.with_file_names, name) {
            write!(output, "{}:", name.paint(Magenta))?;
        }
        writeln!(output, "{}", selected)?;
    }

    Ok(())
}
