pub const CONFIG_FILE: &str = r#"Config file for pkr

Specifies a config file which controls the behavior of pkr. If config file is not
specified, ${HOME}/.pkr.toml is used. If it does not exist the default options are
applied.

Supported options:

[output]
color = true          # highlight matches when stdout is a terminal

[grep]
line_numbers = false  # always prefix lines with their line numbers"#;

pub const GREP_LONG_HELP: &str = r#"Print lines that match a regular expression

Each line of the input is searched for <PATTERN>, and the lines that contain a
match are printed. If no <FILE> is given the input is read from stdin. When more
than one <FILE> is given each line is prefixed by the name of its file.

Examples:

pkr grep 'fo+' file.txt
pkr grep -n '\bTODO\b' src/*.rs
cat file.txt | pkr grep -c '(?<=user=)\w+'"#;

pub const REPLACE_LONG_HELP: &str = r#"Replace the matches of a regular expression

Every match of <PATTERN> in each line of the input is replaced with <REPLACEMENT>,
which is inserted literally. If no <FILE> is given the input is read from stdin.

Examples:

pkr replace '\s+' ' ' file.txt
pkr replace --first 'colou?r' hue file.txt"#;

pub const SPLIT_LIMIT_LONG_HELP: &str = r#"Maximum number of pieces

If <N> is positive the input is split at most <N>-1 times and the last piece
holds the rest of the input. If <N> is zero (the default) the input is split
as many times as possible and trailing empty pieces are discarded. If <N> is
negative trailing empty pieces are kept.

Examples:

--limit=2
--limit=-1"#;

pub const DEBUG_LONG_HELP: &str = r#"Show how a regular expression is compiled

Prints whether the pattern is a plain literal, which is searched for without
the regular expression engine, the number of capture groups, and the listing
of the program executed by the engine."#;
