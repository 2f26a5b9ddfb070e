/*! End-to-end tests. */
use pretty_assertions::assert_eq;

use crate::{CharacterMatcher, CompileError, Pattern};

macro_rules! test_find {
    ($re:expr, $input:expr, $expected:expr) => {{
        let pattern = Pattern::compile($re).unwrap();
        let mut matcher = pattern.matcher($input);
        let found = if matcher.find() {
            (0..=matcher.group_count())
                .map(|i| matcher.group(i).unwrap())
                .collect::<Vec<_>>()
        } else {
            vec![]
        };
        let expected: Vec<Option<&str>> = $expected;
        assert_eq!(
            found, expected,
            "\n\n`{}` in {:?} should find {:?}, but found {:?}",
            $re, $input, expected, found
        );
    }};
}

macro_rules! full_match {
    ($re:expr, $input:expr) => {{
        assert!(
            Pattern::compile($re).unwrap().matcher($input).matches(),
            "`{}` should match {:?}",
            $re,
            $input
        );
    }};
}

macro_rules! no_full_match {
    ($re:expr, $input:expr) => {{
        assert!(
            !Pattern::compile($re).unwrap().matcher($input).matches(),
            "`{}` should not match {:?}",
            $re,
            $input
        );
    }};
}

macro_rules! assert_compile_error {
    ($re:expr, $expected:pat) => {{
        let err = Pattern::compile($re).unwrap_err();
        assert!(
            matches!(err, $expected),
            "unexpected error for `{}`: {:?}",
            $re,
            err
        );
    }};
}

/// Returns the ranges of all the matches found by `find`.
fn find_all(pattern: &Pattern, input: &str) -> Vec<std::ops::Range<usize>> {
    let mut matcher = pattern.matcher(input);
    let mut ranges = vec![];
    while matcher.find() {
        ranges.push(matcher.range().unwrap());
    }
    ranges
}

/// All the strings of length up to `max_len` over the given alphabet.
fn strings(alphabet: &[char], max_len: usize) -> Vec<String> {
    let mut result = vec![String::new()];
    let mut last = vec![String::new()];
    for _ in 0..max_len {
        last = last
            .iter()
            .flat_map(|s| {
                alphabet.iter().map(move |c| {
                    let mut s = s.clone();
                    s.push(*c);
                    s
                })
            })
            .collect();
        result.extend(last.iter().cloned());
    }
    result
}

#[test]
fn literals() {
    test_find!("foo", "a foo", vec![Some("foo")]);
    test_find!("foo", "a fo", vec![]);
    test_find!("", "abc", vec![Some("")]);
    test_find!("año", "el año", vec![Some("año")]);
    test_find!(r"a\.b\*", "axb* a.b*", vec![Some("a.b*")]);
    test_find!(r"\Q(a+)\E+", "(a+))", vec![Some("(a+))")]);
    test_find!(r"\x41B\0103\t", "ABC\t", vec![Some("ABC\t")]);
    test_find!(r"\x{1F600}", "😀", vec![Some("😀")]);
    test_find!(r"😀", "😀", vec![Some("😀")]);
}

#[test]
fn greedy_and_lazy() {
    test_find!("a+", "aaa", vec![Some("aaa")]);
    test_find!("a+?", "aaa", vec![Some("a")]);
    test_find!("a*?b", "aaab", vec![Some("aaab")]);
    test_find!("a{2,3}", "aaaa", vec![Some("aaa")]);
    test_find!("a{2,3}?", "aaaa", vec![Some("aa")]);
    test_find!("a{2}", "a aa", vec![Some("aa")]);
    test_find!("a{2,}", "aaaaa", vec![Some("aaaaa")]);
    test_find!("<.+>", "<a><b>", vec![Some("<a><b>")]);
    test_find!("<.+?>", "<a><b>", vec![Some("<a>")]);
}

#[test]
fn alternatives_and_groups() {
    test_find!("foo|bar", "xbarfoo", vec![Some("bar")]);
    test_find!("a|ab", "ab", vec![Some("a")]);
    test_find!("ab|a", "ab", vec![Some("ab")]);
    test_find!("(a)(b)?", "a", vec![Some("a"), Some("a"), None]);
    test_find!(
        "(a|ab)(c|bcd)(d*)",
        "abcd",
        vec![Some("abcd"), Some("a"), Some("bcd"), Some("")]
    );
    test_find!("(?:ab)+(c)", "ababc", vec![Some("ababc"), Some("c")]);
    test_find!(
        "((a)|(b))+",
        "ab",
        vec![Some("ab"), Some("b"), Some("a"), Some("b")]
    );
    test_find!("x(a|)y", "xy", vec![Some("xy"), Some("")]);
}

#[test]
fn classes() {
    test_find!("[a-c]+", "xxabcd", vec![Some("abc")]);
    test_find!("[^a-c]+", "abxyc", vec![Some("xy")]);
    test_find!(r"\d+", "abc123", vec![Some("123")]);
    test_find!(r"\w+", "  foo_1 ", vec![Some("foo_1")]);
    test_find!(r"\s+", "a \t\nb", vec![Some(" \t\n")]);
    test_find!(r"[\d&&[^5]]+", "1234567", vec![Some("1234")]);
    test_find!("[a-z&&[^aeiou]]+", "hello", vec![Some("h")]);
    test_find!("[a[x-z]]+", "bayzx", vec![Some("ayzx")]);
    test_find!("[a-]+", "b-a-", vec![Some("-a-")]);
    test_find!("[^a]", "añ", vec![Some("ñ")]);
}

#[test]
fn character_matcher() {
    let class = CharacterMatcher::parse("[a-cX]").unwrap();
    assert!(class.matches('b'));
    assert!(class.matches('X'));
    assert!(!class.matches('d'));

    let class = CharacterMatcher::parse("[^a-c]").unwrap();
    assert!(!class.matches('a'));
    assert!(class.matches('€'));

    let class = CharacterMatcher::parse(r"\W").unwrap();
    assert!(class.matches(' '));
    assert!(!class.matches('_'));

    assert!(CharacterMatcher::parse("[]").is_err());
    assert!(CharacterMatcher::parse("[a-c").is_err());
    assert!(CharacterMatcher::parse("abc").is_err());
}

#[test]
fn anchors_and_boundaries() {
    full_match!("^a$", "a");
    no_full_match!("^a$", "ab");
    test_find!("^a$", "ab", vec![]);
    test_find!("a", "ab", vec![Some("a")]);
    test_find!("^b", "ab", vec![]);
    test_find!("b$", "abb", vec![Some("b")]);
    test_find!(r"\bfoo\b", "afoo foo", vec![Some("foo")]);
    test_find!(r"\Boo\b", "foo", vec![Some("oo")]);
    test_find!(r"\b", "  ", vec![]);
}

#[test]
fn lookarounds() {
    test_find!("(?<=foo)bar", "foobar", vec![Some("bar")]);
    test_find!("(?<!foo)bar", "foobar", vec![]);
    test_find!("(?<!foo)bar", "foobar xbar", vec![Some("bar")]);
    test_find!("foo(?=bar)", "foobaz foobar", vec![Some("foo")]);
    test_find!(r"\w+\b(?<!\d)", "abc1 def", vec![Some("def")]);
    test_find!("(?<=a(?=bc))b", "abd abc", vec![Some("b")]);
    test_find!("(?<=[0-9]{2})x", "1x 12x", vec![Some("x")]);
    test_find!("(?=(a))a", "a", vec![Some("a"), None]);

    let pattern = Pattern::compile("(?<=foo)bar").unwrap();
    assert_eq!(find_all(&pattern, "foobar barfoobar"), vec![3..6, 13..16]);
}

#[test]
fn full_match() {
    full_match!("a*", "");
    full_match!("a|ab", "ab");
    full_match!("(a|b)*c", "ababc");
    full_match!("[a-z]+@[a-z]+\\.com", "john@example.com");
    no_full_match!("a+", "aab");
    no_full_match!("(a|b)*c", "ababcc");

    assert_eq!(Pattern::is_match("a.c", "abc"), Ok(true));
    assert_eq!(Pattern::is_match("a.c", "a\nc"), Ok(false));
    assert_eq!(Pattern::is_match("a.c", "a\rc"), Ok(false));
}

#[test]
fn compile_errors() {
    assert_compile_error!("a(", CompileError::SyntaxError { .. });
    assert_compile_error!("a)", CompileError::SyntaxError { .. });
    assert_compile_error!("*a", CompileError::SyntaxError { .. });
    assert_compile_error!("a**", CompileError::SyntaxError { .. });
    assert_compile_error!("a{3,2}", CompileError::SyntaxError { .. });
    assert_compile_error!("a{1001}", CompileError::SyntaxError { .. });
    assert_compile_error!("[a", CompileError::SyntaxError { .. });
    assert_compile_error!(r"\y", CompileError::SyntaxError { .. });
    assert_compile_error!(r"(a)\1", CompileError::Unsupported { .. });
    assert_compile_error!("(?<name>a)", CompileError::Unsupported { .. });
    assert_compile_error!("(?i)a", CompileError::Unsupported { .. });
    assert_compile_error!("a*+", CompileError::Unsupported { .. });
    assert_compile_error!("(?>a)", CompileError::Unsupported { .. });
    assert_compile_error!(r"\p{L}", CompileError::Unsupported { .. });
    assert_compile_error!("(?:(?:a{1000}){1000}){2}", CompileError::TooLarge);

    assert_eq!(
        Pattern::compile("ab(c").unwrap_err().to_string(),
        "unclosed group at index 2 in `ab(c`"
    );
}

#[test]
fn idempotent_compilation() {
    let inputs = strings(&['a', 'b', ' '], 4);
    for re in ["(a|b)+", r"\bb", "a*?b", "(?<=a)b|a"] {
        let p1 = Pattern::compile(re).unwrap();
        let p2 = Pattern::compile(re).unwrap();
        assert_eq!(p1.disassemble(), p2.disassemble());
        for input in inputs.iter() {
            assert_eq!(find_all(&p1, input), find_all(&p2, input));
        }
    }
}

/// The literal fast path must find exactly the same matches as the VM.
#[test]
fn trivial_vs_vm() {
    let inputs = strings(&['a', 'b', 'ñ'], 5);

    for re in ["a", "ab", "aa", "aba", "ñ", "bñ", ""] {
        let trivial = Pattern::compile(re).unwrap();
        let vm = Pattern::builder().literal_fast_path(false).build(re).unwrap();

        assert!(trivial.is_trivial());
        assert!(!vm.is_trivial());

        for input in inputs.iter() {
            assert_eq!(
                find_all(&trivial, input),
                find_all(&vm, input),
                "`{}` in {:?}",
                re,
                input
            );
            assert_eq!(
                trivial.matcher(input).matches(),
                vm.matcher(input).matches()
            );
            assert_eq!(
                trivial.matcher(input).looking_at(),
                vm.matcher(input).looking_at()
            );
            assert_eq!(trivial.split(input, 0), vm.split(input, 0));
        }
    }
}

/// Compares the leftmost match, with its capture groups, with the one
/// found by the `regex` crate, starting the search at every offset of
/// every input.
#[test]
fn differential() {
    let mut inputs = strings(&['a', 'b'], 5);
    inputs.extend(["a b", "ab ba", " aab ", "b_a"].map(String::from));

    for re in [
        "a",
        "ab",
        "a|b",
        "a|ab",
        "ab|a",
        "a*",
        "a+",
        "a?",
        "a*?",
        "a+?",
        "a??",
        "(a)(b)?",
        "(a|ab)(b*)",
        "(ab|a)(b*)",
        "(a+)(b+)?",
        "a{2}",
        "a{1,2}",
        "a{2,}",
        "a{0,2}?b",
        "(a|b)*b",
        "(a|b)+?b",
        "[ab]+",
        "[^a]+",
        "^a",
        "b$",
        "^(a|b)*$",
        r"\bab",
        r"a\B",
        "(?:ab)+",
        "((a)|(b))+",
        "x*",
        ".b",
        "(a*)b",
        "(a|b)(a|b)?(a|b)??",
        "b(a{1,3})a",
        "(a+|b+)*?a",
        "(b|ab)*a",
        "a(?:b|)c?",
        "(?:|b)*",
        "(?:b|)*a",
    ] {
        let pattern = Pattern::compile(re).unwrap();
        let regex = regex::Regex::new(re).unwrap();
        let full = regex::Regex::new(&format!(r"\A(?:{})\z", re)).unwrap();

        for input in inputs.iter() {
            let mut matcher = pattern.matcher(input);

            for start in 0..=input.len() {
                let expected = regex.captures_at(input, start).map(|caps| {
                    caps.iter()
                        .map(|m| m.map(|m| m.range()))
                        .collect::<Vec<_>>()
                });

                let found = matcher.find_at(start).unwrap().then(|| {
                    (0..=matcher.group_count())
                        .map(|i| {
                            let start = matcher.start(i).unwrap();
                            let end = matcher.end(i).unwrap();
                            start.zip(end).map(|(s, e)| s..e)
                        })
                        .collect::<Vec<_>>()
                });

                assert_eq!(
                    found, expected,
                    "`{}` in {:?} from {}",
                    re, input, start
                );
            }

            assert_eq!(
                matcher.matches(),
                full.is_match(input),
                "`{}` matching {:?}",
                re,
                input
            );
        }
    }
}
