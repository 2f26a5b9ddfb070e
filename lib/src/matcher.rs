use std::borrow::Cow;
use std::ops::Range;

use crate::errors::MatchError;
use crate::pattern::Pattern;

/// Finds the matches of a [`Pattern`] in some input.
///
/// A matcher is created with [`Pattern::matcher`] and keeps the state of the
/// search: the input, the capture groups of the last match, and where the
/// next call to [`Matcher::find`] will resume.
///
/// Offsets are byte offsets within the input, and they are always at
/// character boundaries.
///
/// ```rust
/// # use pikere::Pattern;
/// let pattern = Pattern::compile(r"\d+").unwrap();
/// let mut matcher = pattern.matcher("10 + 200");
/// let mut numbers = vec![];
///
/// while matcher.find() {
///     numbers.push(matcher.group(0).unwrap().unwrap());
/// }
///
/// assert_eq!(numbers, vec!["10", "200"]);
/// ```
#[derive(Debug, Clone)]
pub struct Matcher<'p, 'h> {
    pattern: &'p Pattern,
    haystack: &'h str,
    /// Capture offsets of the last match, two for each group.
    offsets: Vec<Option<usize>>,
    /// True if the last operation produced a match.
    matched: bool,
    /// Where the next call to `find` starts, `None` if the input has been
    /// exhausted.
    next: Option<usize>,
}

impl<'p, 'h> Matcher<'p, 'h> {
    pub(crate) fn new(pattern: &'p Pattern, haystack: &'h str) -> Self {
        Self {
            pattern,
            haystack,
            offsets: vec![None; 2 * pattern.group_count() + 2],
            matched: false,
            next: Some(0),
        }
    }

    /// Returns the pattern used by this matcher.
    #[inline]
    pub fn pattern(&self) -> &'p Pattern {
        self.pattern
    }

    /// Returns the input where the matcher is searching.
    #[inline]
    pub fn haystack(&self) -> &'h str {
        self.haystack
    }

    /// Returns the number of capture groups in the pattern.
    #[inline]
    pub fn group_count(&self) -> usize {
        self.pattern.group_count()
    }

    /// Returns true if the whole input matches the pattern.
    pub fn matches(&mut self) -> bool {
        self.search(0, true, true)
    }

    /// Returns true if some prefix of the input matches the pattern. Unlike
    /// [`Matcher::matches`], the match doesn't need to cover the whole
    /// input.
    pub fn looking_at(&mut self) -> bool {
        self.search(0, true, false)
    }

    /// Finds the next match in the input.
    ///
    /// The search starts at the end of the previous match or, if the
    /// previous match was empty, one character after it. A failed call to
    /// [`Matcher::matches`] or [`Matcher::looking_at`] doesn't change where
    /// the search starts. Once this returns false, subsequent calls keep
    /// returning false until the matcher is [reset][`Matcher::reset`].
    pub fn find(&mut self) -> bool {
        match self.next {
            Some(from) => self.search(from, false, false),
            None => {
                self.clear();
                false
            }
        }
    }

    /// Resets the matcher and finds the first match that starts at `from`
    /// or after it.
    ///
    /// Returns an error if `from` is beyond the end of the input or it is
    /// not at a character boundary.
    pub fn find_at(&mut self, from: usize) -> Result<bool, MatchError> {
        if !self.haystack.is_char_boundary(from) {
            return Err(MatchError::InvalidOffset {
                offset: from,
                len: self.haystack.len(),
            });
        }
        self.reset();
        Ok(self.search(from, false, false))
    }

    /// Discards the state of the matcher. The next call to
    /// [`Matcher::find`] will start at the beginning of the input.
    pub fn reset(&mut self) -> &mut Self {
        self.clear();
        self.next = Some(0);
        self
    }

    /// Resets the matcher and changes its input.
    pub fn reset_with(&mut self, haystack: &'h str) -> &mut Self {
        self.haystack = haystack;
        self.reset()
    }

    /// Returns the text captured by group `n` in the last match. The group
    /// 0 is the whole match.
    ///
    /// Returns `Ok(None)` if the group didn't participate in the match.
    pub fn group(&self, n: usize) -> Result<Option<&'h str>, MatchError> {
        Ok(self.span(n)?.map(|span| &self.haystack[span]))
    }

    /// Returns the offset where group `n` starts in the last match.
    pub fn start(&self, n: usize) -> Result<Option<usize>, MatchError> {
        Ok(self.span(n)?.map(|span| span.start))
    }

    /// Returns the offset where group `n` ends in the last match.
    pub fn end(&self, n: usize) -> Result<Option<usize>, MatchError> {
        Ok(self.span(n)?.map(|span| span.end))
    }

    /// Returns the range of the input covered by the last match.
    pub fn range(&self) -> Result<Range<usize>, MatchError> {
        self.match_range().ok_or(MatchError::NoMatch)
    }

    /// Replaces every match of the pattern with `replacement`.
    ///
    /// The replacement is inserted literally. The matcher is reset before
    /// searching, and is left in exhausted state.
    pub fn replace_all(&mut self, replacement: &str) -> Cow<'h, str> {
        self.replace(replacement, usize::MAX)
    }

    /// Replaces the first match of the pattern with `replacement`.
    ///
    /// The replacement is inserted literally. The matcher is reset before
    /// searching.
    pub fn replace_first(&mut self, replacement: &str) -> Cow<'h, str> {
        self.replace(replacement, 1)
    }

    fn replace(&mut self, replacement: &str, limit: usize) -> Cow<'h, str> {
        let haystack = self.haystack;
        let mut result = String::new();
        let mut last = 0;
        let mut count = 0;

        self.reset();

        while count < limit && self.find() {
            if let Some(m) = self.match_range() {
                result.push_str(&haystack[last..m.start]);
                result.push_str(replacement);
                last = m.end;
                count += 1;
            }
        }

        if count == 0 {
            return Cow::Borrowed(haystack);
        }

        result.push_str(&haystack[last..]);
        Cow::Owned(result)
    }

    /// Returns the range of the whole match, `None` if there's no match.
    pub(crate) fn match_range(&self) -> Option<Range<usize>> {
        match (self.matched, self.offsets[0], self.offsets[1]) {
            (true, Some(start), Some(end)) => Some(start..end),
            _ => None,
        }
    }

    fn span(&self, n: usize) -> Result<Option<Range<usize>>, MatchError> {
        if !self.matched {
            return Err(MatchError::NoMatch);
        }
        if n > self.group_count() {
            return Err(MatchError::NoSuchGroup {
                group: n,
                count: self.group_count(),
            });
        }
        Ok(match (self.offsets[2 * n], self.offsets[2 * n + 1]) {
            (Some(start), Some(end)) => Some(start..end),
            _ => None,
        })
    }

    fn clear(&mut self) {
        self.matched = false;
        self.offsets.fill(None);
    }

    fn search(
        &mut self,
        from: usize,
        anchor_start: bool,
        anchor_end: bool,
    ) -> bool {
        self.clear();

        self.matched = self.pattern.searcher().search(
            self.haystack,
            from,
            anchor_start,
            anchor_end,
            &mut self.offsets,
        );

        self.next = match self.match_range() {
            // After an empty match the next search starts one character
            // later, or never if the match is at the end of the input.
            Some(m) if m.is_empty() => self.haystack[m.end..]
                .chars()
                .next()
                .map(|c| m.end + c.len_utf8()),
            Some(m) => Some(m.end),
            // A failed anchored attempt doesn't move the position used by
            // `find`.
            None if anchor_start => self.next,
            None => None,
        };

        self.matched
    }
}
