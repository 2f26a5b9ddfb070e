
use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn cli_grep() {
    Command::cargo_bin("pkr")
        .unwrap()
        .arg("grep")
        .arg("fo+")
        .arg("src/tests/testdata/lines.txt")
        .assert()
        .success()
        .stdout("foo bar\nfoo foo\n");
}

#[test]
fn cli_grep_line_number() {
    Command::cargo_bin("pkr")
        .unwrap()
        .arg("grep")
        .arg("-n")
        .arg(r"\bfoo\b")
        .arg("src/tests/testdata/lines.txt")
        .assert()
        .success()
        .stdout("1:foo bar\n3:foo foo\n");
}

#[test]
fn cli_grep_only_matching() {
    Command::cargo_bin("pkr")
        .unwrap()
        .arg("grep")
        .arg("--only-matching")
        .arg("fo+|wor")
        .arg("src/tests/testdata/lines.txt")
        .assert()
        .success()
        .stdout("foo\nwor\nfoo\nfoo\n");
}

#[test]
fn cli_grep_invert_match() {
    Command::cargo_bin("pkr")
        .unwrap()
        .arg("grep")
        .arg("-v")
        .arg("foo")
        .arg("src/tests/testdata/lines.txt")
        .assert()
        .success()
        .stdout("hello world\nnothing here\n");
}

#[test]
fn cli_grep_count() {
    Command::cargo_bin("pkr")
        .unwrap()
        .arg("grep")
        .arg("-c")
        .arg("o")
        .arg("src/tests/testdata/lines.txt")
        .assert()
        .success()
        .stdout("4\n");

    Command::cargo_bin("pkr")
        .unwrap()
        .arg("grep")
        .arg("-c")
        .arg("-v")
        .arg("o")
        .arg("src/tests/testdata/lines.txt")
        .assert()
        .success()
        .stdout("0\n");
}

#[test]
fn cli_grep_many_files() {
    Command::cargo_bin("pkr")
        .unwrap()
        .arg("grep")
        .arg("foo")
        .arg("src/tests/testdata/lines.txt")
        .arg("src/tests/testdata/other.txt")
        .assert()
        .success()
        .stdout(
            "src/tests/testdata/lines.txt:foo bar
src/tests/testdata/lines.txt:foo foo
src/tests/testdata/other.txt:another foo
",
        );

    Command::cargo_bin("pkr")
        .unwrap()
        .arg("grep")
        .arg("--count")
        .arg("foo")
        .arg("src/tests/testdata/lines.txt")
        .arg("src/tests/testdata/other.txt")
        .assert()
        .success()
        .stdout(
            "src/tests/testdata/lines.txt:2\nsrc/tests/testdata/other.txt:1\n",
        );
}

#[test]
fn cli_grep_stdin() {
    Command::cargo_bin("pkr")
        .unwrap()
        .arg("grep")
        .arg("-o")
        .arg(r"(?<=id=)\d+")
        .write_stdin("id=1\nname=2\nid=33 id=4\n")
        .assert()
        .success()
        .stdout("1\n33\n4\n");
}

#[test]
fn cli_grep_invalid_pattern() {
    Command::cargo_bin("pkr")
        .unwrap()
        .arg("grep")
        .arg("ab(c")
        .arg("src/tests/testdata/lines.txt")
        .assert()
        .failure()
        .code(1)
        .stderr("error: unclosed group at index 2 in `ab(c`\n");

    Command::cargo_bin("pkr")
        .unwrap()
        .arg("grep")
        .arg("(?i)foo")
        .arg("src/tests/testdata/lines.txt")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not supported"));
}

#[test]
fn cli_grep_missing_file() {
    Command::cargo_bin("pkr")
        .unwrap()
        .arg("grep")
        .arg("foo")
        .arg("src/tests/testdata/missing.txt")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with(
            "error: can not read `src/tests/testdata/missing.txt`",
        ));
}

#[test]
fn cli_replace() {
    Command::cargo_bin("pkr")
        .unwrap()
        .arg("replace")
        .arg("colou?r")
        .arg("hue")
        .write_stdin("color colour\nnone\n")
        .assert()
        .success()
        .stdout("hue hue\nnone\n");

    Command::cargo_bin("pkr")
        .unwrap()
        .arg("replace")
        .arg("--first")
        .arg("colou?r")
        .arg("hue")
        .write_stdin("color colour\nnone\n")
        .assert()
        .success()
        .stdout("hue colour\nnone\n");
}

#[test]
fn cli_replace_file() {
    Command::cargo_bin("pkr")
        .unwrap()
        .arg("replace")
        .arg(r"\s+")
        .arg("_")
        .arg("src/tests/testdata/lines.txt")
        .assert()
        .success()
        .stdout("foo_bar\nhello_world\nfoo_foo\nnothing_here\n");
}

#[test]
fn cli_split() {
    Command::cargo_bin("pkr")
        .unwrap()
        .arg("split")
        .arg(",")
        .arg("a,b,,c,,")
        .assert()
        .success()
        .stdout("a\nb\n\nc\n");

    Command::cargo_bin("pkr")
        .unwrap()
        .arg("split")
        .arg("--limit=-1")
        .arg(",")
        .arg("a,b,,c,,")
        .assert()
        .success()
        .stdout("a\nb\n\nc\n\n\n");

    Command::cargo_bin("pkr")
        .unwrap()
        .arg("split")
        .arg("--limit")
        .arg("2")
        .arg(r"\s*,\s*")
        .arg("a , b, c")
        .assert()
        .success()
        .stdout("a\nb, c\n");
}

#[test]
fn cli_debug() {
    Command::cargo_bin("pkr")
        .unwrap()
        .arg("debug")
        .arg("abc")
        .assert()
        .success()
        .stdout("trivial: true\ngroups: 0\n");

    Command::cargo_bin("pkr")
        .unwrap()
        .arg("debug")
        .arg("a(b)")
        .assert()
        .success()
        .stdout(
            r#"trivial: false
groups: 1
code:
00000: SPLIT_JMP 00005
00002: DOTALL
00003: JMP 00000
00005: SAVE_OFFSET 0
00007: LIT 'a'
00008: SAVE_OFFSET 2
0000a: LIT 'b'
0000b: SAVE_OFFSET 3
0000d: SAVE_OFFSET 1
0000f: ACCEPT
"#,
        );

    Command::cargo_bin("pkr")
        .unwrap()
        .arg("debug")
        .arg("a(?=b)")
        .assert()
        .success()
        .stdout(predicate::str::contains("LOOKAROUND 0:"));
}
