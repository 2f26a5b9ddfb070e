use std::mem;

use crate::errors::CompileError;
use crate::re::class::{parse_class, parse_escape, Escape};
use crate::re::hir::{Group, Hir, Look, Tree};

/// Maximum value accepted in a `{n,m}` quantifier.
pub const MAX_REPETITIONS: u32 = 1000;

/// A regular expression parser.
///
/// Takes the source code of a regular expression and produces its
/// corresponding [`Tree`].
pub(crate) struct Parser {
    max_repetitions: u32,
}

impl Parser {
    pub fn new() -> Self {
        Self { max_repetitions: MAX_REPETITIONS }
    }

    /// Maximum value allowed in bounded quantifiers like `{n,m}`. Patterns
    /// with larger bounds are rejected with a syntax error.
    #[cfg(test)]
    pub fn max_repetitions(mut self, n: u32) -> Self {
        self.max_repetitions = n;
        self
    }

    /// Parses the regexp and returns its tree.
    pub fn parse(&self, pattern: &str) -> Result<Tree, CompileError> {
        let mut ctx = Context::new(pattern, self.max_repetitions);

        while let Some(c) = ctx.peek() {
            match c {
                '(' => ctx.open_group()?,
                ')' => ctx.close_group()?,
                '|' => {
                    ctx.bump();
                    let top = ctx.top();
                    let alternative = mem::take(&mut top.current);
                    top.alternatives.push(alternative);
                }
                '*' | '+' | '?' | '{' => ctx.parse_quantifier()?,
                '.' => {
                    ctx.bump();
                    ctx.push(Hir::Dot);
                }
                '^' => {
                    ctx.bump();
                    ctx.push(Hir::Look(Look::LineStart));
                }
                '$' => {
                    ctx.bump();
                    ctx.push(Hir::Look(Look::LineEnd));
                }
                '[' => {
                    let (class, end) = parse_class(pattern, ctx.pos)?;
                    ctx.pos = end;
                    ctx.push(Hir::Class(class));
                }
                '\\' => {
                    let (escape, end) = parse_escape(pattern, ctx.pos)?;
                    ctx.pos = end;
                    match escape {
                        Escape::Char(c) => ctx.push(Hir::Literal(c)),
                        Escape::Class(class) => ctx.push(Hir::Class(class)),
                        Escape::WordBoundary => {
                            ctx.push(Hir::Look(Look::WordBoundary))
                        }
                        Escape::NonWordBoundary => {
                            ctx.push(Hir::Look(Look::NonWordBoundary))
                        }
                        Escape::Quote(quoted) => {
                            for c in quoted.chars() {
                                ctx.push(Hir::Literal(c));
                            }
                        }
                    }
                }
                c => {
                    ctx.bump();
                    ctx.push(Hir::Literal(c));
                }
            }
        }

        ctx.finish()
    }
}

/// Kinds of groups that can be open while parsing.
#[derive(Debug, Clone, Copy)]
enum GroupKind {
    Root,
    Capture(usize),
    NonCapture,
    Lookaround { ahead: bool, negative: bool },
}

/// A group whose closing parenthesis has not been found yet.
struct OpenGroup {
    kind: GroupKind,
    /// Position of the opening parenthesis.
    start: usize,
    /// Alternatives already closed by a `|`.
    alternatives: Vec<Vec<Hir>>,
    /// The alternative that is being parsed.
    current: Vec<Hir>,
}

/// State of the parser while it walks the pattern.
///
/// Groups are kept in a stack, the bottom of the stack is the group that
/// represents the whole pattern, which is never closed explicitly.
struct Context<'a> {
    pattern: &'a str,
    pos: usize,
    max_repetitions: u32,
    stack: Vec<OpenGroup>,
    group_count: usize,
}

impl<'a> Context<'a> {
    fn new(pattern: &'a str, max_repetitions: u32) -> Self {
        Self {
            pattern,
            pos: 0,
            max_repetitions,
            stack: vec![OpenGroup {
                kind: GroupKind::Root,
                start: 0,
                alternatives: vec![],
                current: vec![],
            }],
            group_count: 0,
        }
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.pattern[self.pos..].chars().next()
    }

    #[inline]
    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    #[inline]
    fn rest(&self) -> &'a str {
        &self.pattern[self.pos..]
    }

    fn top(&mut self) -> &mut OpenGroup {
        // The root group is never popped, the stack can't be empty.
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn push(&mut self, hir: Hir) {
        self.top().current.push(hir);
    }

    fn syntax_error<M: Into<String>>(
        &self,
        index: usize,
        msg: M,
    ) -> CompileError {
        CompileError::syntax(self.pattern, index, msg)
    }

    fn open_group(&mut self) -> Result<(), CompileError> {
        let start = self.pos;
        self.bump();

        let prefixes = [
            ("?:", GroupKind::NonCapture),
            ("?=", GroupKind::Lookaround { ahead: true, negative: false }),
            ("?!", GroupKind::Lookaround { ahead: true, negative: true }),
            ("?<=", GroupKind::Lookaround { ahead: false, negative: false }),
            ("?<!", GroupKind::Lookaround { ahead: false, negative: true }),
        ];

        let kind = match prefixes
            .iter()
            .find(|(prefix, _)| self.rest().starts_with(prefix))
        {
            Some((prefix, kind)) => {
                self.pos += prefix.len();
                *kind
            }
            None if self.rest().starts_with("?<") => {
                return Err(CompileError::unsupported(
                    self.pattern,
                    start,
                    "named groups",
                ))
            }
            None if self.rest().starts_with("?>") => {
                return Err(CompileError::unsupported(
                    self.pattern,
                    start,
                    "atomic groups",
                ))
            }
            None if self.rest().starts_with('?') => {
                return Err(CompileError::unsupported(
                    self.pattern,
                    start,
                    "embedded flags",
                ))
            }
            None => {
                self.group_count += 1;
                GroupKind::Capture(self.group_count)
            }
        };

        self.stack.push(OpenGroup {
            kind,
            start,
            alternatives: vec![],
            current: vec![],
        });

        Ok(())
    }

    fn close_group(&mut self) -> Result<(), CompileError> {
        if self.stack.len() == 1 {
            return Err(
                self.syntax_error(self.pos, "unmatched closing parenthesis")
            );
        }

        self.bump();

        let group = match self.stack.pop() {
            Some(group) => group,
            None => unreachable!(),
        };

        let kind = group.kind;
        let group = Self::build_group(group, None);

        let hir = match kind {
            GroupKind::Capture(index) => {
                Hir::Group(Group { capture: Some(index), ..group })
            }
            GroupKind::NonCapture => Hir::Group(group),
            GroupKind::Lookaround { ahead, negative } => {
                Hir::Lookaround { ahead, negative, group }
            }
            GroupKind::Root => unreachable!(),
        };

        self.push(hir);
        Ok(())
    }

    fn build_group(open: OpenGroup, capture: Option<usize>) -> Group {
        let mut alternatives = open.alternatives;
        alternatives.push(open.current);
        Group { capture, alternatives }
    }

    fn parse_quantifier(&mut self) -> Result<(), CompileError> {
        let start = self.pos;

        let (min, max) = match self.bump() {
            Some('*') => (0, None),
            Some('+') => (1, None),
            Some('?') => (0, Some(1)),
            Some('{') => self.parse_bounds(start)?,
            _ => unreachable!(),
        };

        let greedy = match self.peek() {
            Some('?') => {
                self.bump();
                false
            }
            Some('+') => {
                return Err(CompileError::unsupported(
                    self.pattern,
                    start,
                    "possessive quantifiers",
                ))
            }
            _ => true,
        };

        let hir = match self.top().current.pop() {
            None => {
                return Err(self.syntax_error(start, "dangling quantifier"))
            }
            Some(Hir::Repeat { .. }) => {
                return Err(self.syntax_error(start, "repeated quantifier"))
            }
            Some(hir) => hir,
        };

        self.push(Hir::Repeat { hir: Box::new(hir), min, max, greedy });
        Ok(())
    }

    /// Parses the bounds in `{n}`, `{n,}` or `{n,m}`. When called the
    /// opening brace has been consumed already.
    fn parse_bounds(
        &mut self,
        start: usize,
    ) -> Result<(u32, Option<u32>), CompileError> {
        let min = self
            .parse_number()
            .ok_or_else(|| self.syntax_error(start, "illegal repetition"))?;

        let max = match self.bump() {
            Some('}') => Some(min),
            Some(',') => {
                if self.peek() == Some('}') {
                    self.bump();
                    None
                } else {
                    let max = self.parse_number().ok_or_else(|| {
                        self.syntax_error(start, "illegal repetition")
                    })?;
                    if self.bump() != Some('}') {
                        return Err(
                            self.syntax_error(start, "illegal repetition")
                        );
                    }
                    Some(max)
                }
            }
            _ => return Err(self.syntax_error(start, "illegal repetition")),
        };

        if min > self.max_repetitions
            || matches!(max, Some(max) if max > self.max_repetitions)
        {
            return Err(self.syntax_error(
                start,
                format!(
                    "repetition count exceeds the maximum ({})",
                    self.max_repetitions
                ),
            ));
        }

        if matches!(max, Some(max) if max < min) {
            return Err(self.syntax_error(start, "illegal repetition range"));
        }

        Ok((min, max))
    }

    /// Parses a decimal number. Returns `None` if there are no digits at the
    /// current position or the number doesn't fit in an `u32`.
    fn parse_number(&mut self) -> Option<u32> {
        let len = self.rest().bytes().take_while(u8::is_ascii_digit).count();
        if len == 0 {
            return None;
        }
        let n = self.rest()[..len].parse().ok()?;
        self.pos += len;
        Some(n)
    }

    fn finish(mut self) -> Result<Tree, CompileError> {
        if self.stack.len() > 1 {
            let start = self.top().start;
            return Err(self.syntax_error(start, "unclosed group"));
        }

        let root = match self.stack.pop() {
            Some(root) => root,
            None => unreachable!(),
        };

        Ok(Tree {
            root: Self::build_group(root, Some(0)),
            group_count: self.group_count,
        })
    }
}
