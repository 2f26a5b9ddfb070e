use memchr::memmem;

use crate::pattern::Searcher;

/// A pattern that matches a fixed string.
///
/// Patterns without any special syntax, like `foo` or `\Q1+1\E`, don't need
/// the VM at all, finding them in some input is a matter of searching for a
/// substring, which is much faster.
#[derive(Debug, Clone)]
pub(crate) struct TrivialPattern {
    literal: String,
    finder: memmem::Finder<'static>,
}

impl TrivialPattern {
    pub fn new(literal: String) -> Self {
        let finder = memmem::Finder::new(literal.as_bytes()).into_owned();
        Self { literal, finder }
    }
}

impl Searcher for TrivialPattern {
    fn search(
        &self,
        haystack: &str,
        start: usize,
        anchor_start: bool,
        anchor_end: bool,
        slots: &mut [Option<usize>],
    ) -> bool {
        let input = &haystack[start..];

        let found = match (anchor_start, anchor_end) {
            (true, true) => (input == self.literal).then_some(0),
            (true, false) => input.starts_with(&self.literal).then_some(0),
            (false, true) => input
                .ends_with(&self.literal)
                .then(|| input.len() - self.literal.len()),
            (false, false) => self.finder.find(input.as_bytes()),
        };

        match found {
            Some(offset) => {
                slots[0] = Some(start + offset);
                slots[1] = Some(start + offset + self.literal.len());
                true
            }
            None => false,
        }
    }
}
