/*! Compiled regular expressions.

A [`Pattern`] is the compiled form of a regular expression. Compiling a
pattern consists in parsing it, and producing code for the Pike VM. Patterns
that turn out to be plain strings, which are very common, are not executed
by the VM, they are searched with a fast substring search algorithm instead.
Both kinds of patterns are used in the same way through a [`Matcher`].
*/

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Instant;

use log::*;

use crate::errors::CompileError;
use crate::matcher::Matcher;
use crate::re::parser::Parser;
use crate::re::thompson::{Compiler, PikeVM};

pub(crate) use trivial::TrivialPattern;

mod trivial;

/// Trait implemented by the engines that can execute a [`Pattern`].
pub(crate) trait Searcher {
    /// Looks for a match in `haystack`, starting at byte offset `start`.
    ///
    /// When `anchor_start` is true the match must begin at `start`, and when
    /// `anchor_end` is true it must finish at the end of `haystack`. If a
    /// match is found the function returns true and the capture offsets are
    /// written to `slots`, which contains two items per capture group,
    /// including the group 0 that represents the whole match.
    fn search(
        &self,
        haystack: &str,
        start: usize,
        anchor_start: bool,
        anchor_end: bool,
        slots: &mut [Option<usize>],
    ) -> bool;
}

impl Searcher for PikeVM {
    fn search(
        &self,
        haystack: &str,
        start: usize,
        anchor_start: bool,
        anchor_end: bool,
        slots: &mut [Option<usize>],
    ) -> bool {
        self.try_match(
            haystack,
            start,
            haystack.len(),
            anchor_start,
            anchor_end,
            Some(slots),
        )
    }
}

#[derive(Debug, Clone)]
enum Inner {
    Trivial(TrivialPattern),
    Regex(PikeVM),
}

/// A compiled regular expression.
///
/// # Example
///
/// ```rust
/// # use pikere::Pattern;
/// let pattern = Pattern::compile(r"(\w+)@(\w+)\.com").unwrap();
/// let mut matcher = pattern.matcher("write to john@example.com");
///
/// assert!(matcher.find());
/// assert_eq!(matcher.group(1).unwrap(), Some("john"));
/// assert_eq!(matcher.group(2).unwrap(), Some("example"));
/// assert_eq!(matcher.start(0).unwrap(), Some(9));
/// ```
///
/// Patterns are immutable, the same pattern can be shared by any number of
/// matchers, and used from multiple threads at the same time.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    flags: u32,
    group_count: usize,
    inner: Inner,
}

impl Pattern {
    /// Compiles a regular expression.
    pub fn compile(source: &str) -> Result<Self, CompileError> {
        Self::builder().build(source)
    }

    /// Compiles a regular expression with the given flags. No flags are
    /// supported at this moment, any value other than 0 produces an
    /// error.
    pub fn compile_with_flags(
        source: &str,
        flags: u32,
    ) -> Result<Self, CompileError> {
        Self::builder().flags(flags).build(source)
    }

    /// Returns a [`PatternBuilder`] for compiling a pattern with
    /// non-default settings.
    pub fn builder() -> PatternBuilder {
        PatternBuilder::new()
    }

    /// Compiles `regex` and returns true if it matches the whole `input`.
    pub fn is_match(regex: &str, input: &str) -> Result<bool, CompileError> {
        Ok(Self::compile(regex)?.matcher(input).matches())
    }

    /// Returns a regular expression that matches `s` literally.
    ///
    /// ```rust
    /// # use pikere::Pattern;
    /// let pattern = Pattern::compile(&Pattern::quote("1+1=2")).unwrap();
    /// assert!(pattern.matcher("1+1=2").matches());
    /// ```
    pub fn quote(s: &str) -> String {
        let mut quoted = String::with_capacity(s.len() + 4);
        let mut rest = s;

        quoted.push_str(r"\Q");

        // `\E` would end the quoted sequence. It's replaced by a `\E` that
        // ends the sequence, followed by `\\E` (a backslash and an `E`),
        // and a `\Q` that starts a new sequence.
        while let Some(i) = rest.find(r"\E") {
            quoted.push_str(&rest[..i]);
            quoted.push_str(r"\E\\E\Q");
            rest = &rest[i + 2..];
        }

        quoted.push_str(rest);
        quoted.push_str(r"\E");
        quoted
    }

    /// Returns the source of the regular expression.
    #[inline]
    pub fn as_str(&self) -> &str {
        self.source.as_str()
    }

    /// Returns the flags used when compiling the pattern.
    #[inline]
    pub fn flags(&self) -> u32 {
        self.flags
    }

    /// Returns the number of capture groups in the pattern, not counting
    /// the group 0 that represents the whole match.
    #[inline]
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    /// Returns true if the pattern is a plain string, which is searched
    /// without the regexp engine.
    #[inline]
    pub fn is_trivial(&self) -> bool {
        matches!(self.inner, Inner::Trivial(_))
    }

    /// Returns a listing of the code produced for the Pike VM, or `None` if
    /// the pattern is trivial.
    pub fn disassemble(&self) -> Option<String> {
        match &self.inner {
            Inner::Trivial(_) => None,
            Inner::Regex(vm) => Some(vm.to_string()),
        }
    }

    /// Creates a [`Matcher`] that finds this pattern in `haystack`.
    pub fn matcher<'h>(&self, haystack: &'h str) -> Matcher<'_, 'h> {
        Matcher::new(self, haystack)
    }

    /// Splits `input` around the matches of this pattern.
    ///
    /// The pieces are returned in the order in which they appear in the
    /// input. If the pattern doesn't match, the result is the whole input.
    /// A zero-width match at the start of the input never produces an empty
    /// leading piece.
    ///
    /// `limit` controls the number of pieces:
    ///
    /// * If `limit` is positive, the result has at most `limit` pieces, and
    ///   the last one contains the rest of the input after the last match
    ///   used.
    /// * If `limit` is zero, the input is split as many times as possible,
    ///   and trailing empty pieces are discarded.
    /// * If `limit` is negative, the input is split as many times as
    ///   possible, and trailing empty pieces are kept.
    ///
    /// ```rust
    /// # use pikere::Pattern;
    /// let comma = Pattern::compile(",").unwrap();
    /// assert_eq!(comma.split("a,b,,c", 0), vec!["a", "b", "", "c"]);
    /// assert_eq!(comma.split("a,b,,", 0), vec!["a", "b"]);
    /// assert_eq!(comma.split("a,b,,", -1), vec!["a", "b", "", ""]);
    /// assert_eq!(comma.split("a,b,,c", 2), vec!["a", "b,,c"]);
    /// ```
    pub fn split<'h>(&self, input: &'h str, limit: i32) -> Vec<&'h str> {
        let max_pieces = usize::try_from(limit).ok().filter(|l| *l > 0);
        let mut pieces = Vec::new();
        let mut index = 0;
        let mut matcher = self.matcher(input);

        while matcher.find() {
            if max_pieces.is_some_and(|max| pieces.len() + 1 >= max) {
                break;
            }
            let Some(m) = matcher.match_range() else {
                break;
            };
            if m.end == 0 {
                continue;
            }
            pieces.push(&input[index..m.start]);
            index = m.end;
        }

        if pieces.is_empty() {
            return vec![input];
        }

        pieces.push(&input[index..]);

        if limit == 0 {
            while pieces.last().is_some_and(|piece| piece.is_empty()) {
                pieces.pop();
            }
        }

        pieces
    }

    #[inline]
    pub(crate) fn searcher(&self) -> &dyn Searcher {
        match &self.inner {
            Inner::Trivial(trivial) => trivial,
            Inner::Regex(vm) => vm,
        }
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl FromStr for Pattern {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

/// Builds a [`Pattern`] with non-default settings.
///
/// ```rust
/// # use pikere::Pattern;
/// let pattern = Pattern::builder()
///     .literal_fast_path(false)
///     .build("foo")
///     .unwrap();
///
/// assert!(!pattern.is_trivial());
/// ```
#[derive(Debug, Clone)]
pub struct PatternBuilder {
    literal_fast_path: bool,
    flags: u32,
}

impl Default for PatternBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternBuilder {
    /// Creates a new builder with the default settings.
    pub fn new() -> Self {
        Self { literal_fast_path: true, flags: 0 }
    }

    /// Enables or disables the literal fast path. When enabled, which is
    /// the default, patterns that are plain strings are searched with a
    /// substring search instead of the Pike VM.
    pub fn literal_fast_path(mut self, yes: bool) -> Self {
        self.literal_fast_path = yes;
        self
    }

    /// Sets the compilation flags. No flags are supported at this moment,
    /// [`PatternBuilder::build`] fails if they are not 0.
    pub fn flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    /// Compiles the regular expression.
    pub fn build(&self, source: &str) -> Result<Pattern, CompileError> {
        if self.flags != 0 {
            return Err(CompileError::UnsupportedFlags(self.flags));
        }

        let start = Instant::now();

        let tree = Parser::new().parse(source)?;
        let vm = Compiler::new().compile(&tree)?;
        let group_count = vm.group_count();

        let inner = match vm.plain_string() {
            Some(literal) if self.literal_fast_path => {
                debug!("`{}` is a plain string", source);
                Inner::Trivial(TrivialPattern::new(literal))
            }
            _ => {
                debug!(
                    "`{}` compiled to {} slots, {} groups",
                    source,
                    vm.code().len(),
                    group_count
                );
                trace!("code for `{}`: {}", source, vm);
                Inner::Regex(vm)
            }
        };

        info!("Pattern compile time: {:?}", Instant::elapsed(&start));

        Ok(Pattern {
            source: source.to_string(),
            flags: self.flags,
            group_count,
            inner,
        })
    }
}
