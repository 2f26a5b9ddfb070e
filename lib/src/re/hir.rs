use crate::re::class::CharacterMatcher;

/// Zero-width assertions that look at the characters surrounding the
/// current position.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum Look {
    /// `^`, matches at the start of the input.
    LineStart,
    /// `$`, matches at the end of the input.
    LineEnd,
    /// `\b`
    WordBoundary,
    /// `\B`
    NonWordBoundary,
}

/// High-level intermediate representation of a regular expression.
///
/// This is the tree produced by [`crate::re::parser::Parser`] and consumed by
/// [`crate::re::thompson::compiler::Compiler`]. It only exists while a
/// pattern is being compiled.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Hir {
    /// A single character.
    Literal(char),
    /// `.`, any character except `\r` and `\n`.
    Dot,
    /// A character class, either a bracket expression or a predefined
    /// class like `\d`.
    Class(CharacterMatcher),
    /// A zero-width assertion.
    Look(Look),
    /// A quantified expression. `max` is `None` for unbounded quantifiers
    /// like `*`, `+` or `{n,}`.
    Repeat { hir: Box<Hir>, min: u32, max: Option<u32>, greedy: bool },
    /// A group, capturing or not.
    Group(Group),
    /// A lookahead (`ahead == true`) or lookbehind assertion, possibly
    /// negated.
    Lookaround { ahead: bool, negative: bool, group: Group },
}

impl Hir {
    /// Returns true if the expression can match without consuming any
    /// character.
    pub fn can_match_empty(&self) -> bool {
        match self {
            Hir::Literal(_) | Hir::Dot | Hir::Class(_) => false,
            Hir::Look(_) | Hir::Lookaround { .. } => true,
            Hir::Repeat { hir, min, .. } => *min == 0 || hir.can_match_empty(),
            Hir::Group(group) => group.can_match_empty(),
        }
    }
}

/// A sequence of alternatives, like `(foo|bar)`. A group without `|` has a
/// single alternative.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Group {
    /// Index of the capture group, `None` for non-capturing groups. The
    /// whole pattern is the group with index 0.
    pub capture: Option<usize>,
    /// Each alternative is a concatenation of expressions.
    pub alternatives: Vec<Vec<Hir>>,
}

/// The result of parsing a regular expression.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Tree {
    /// The group that represents the whole pattern, its capture index is
    /// always 0.
    pub root: Group,
    /// Number of capture groups in the pattern, not counting the root.
    pub group_count: usize,
}

impl Group {
    /// Returns true if some alternative can match the empty string.
    pub fn can_match_empty(&self) -> bool {
        self.alternatives
            .iter()
            .any(|alternative| alternative.iter().all(Hir::can_match_empty))
    }
}
