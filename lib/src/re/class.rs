/*!
Character classes.

A [`CharacterMatcher`] is a predicate over characters, backed by a bitmap
with one bit per code point and an `inverted` flag. The bitmap only needs to
be as long as the largest code point explicitly mentioned in the class, any
code point beyond the end of the bitmap is considered absent from it. The
result of [`CharacterMatcher::matches`] is the bit for the character XOR'ed
with `inverted`, which means that negating a class is a constant time
operation that doesn't touch the bitmap.

This module also contains the parser for the character class syntax
(`[a-z]`, `[^abc]`, `[a-z&&[^aeiou]]`, ...) and for escape sequences, which
are shared with the main regexp parser.
*/

use bitvec::vec::BitVec;

use crate::errors::CompileError;

/// A set of characters.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CharacterMatcher {
    map: BitVec,
    inverted: bool,
}

impl CharacterMatcher {
    /// Parses a character class description, like `[a-z_]`, `[^0-9]` or
    /// `\w`.
    ///
    /// The description must consist in exactly one bracket expression or
    /// predefined class, anything after it is an error.
    pub fn parse(description: &str) -> Result<Self, CompileError> {
        let (class, end) = match description.chars().next() {
            Some('[') => parse_class(description, 0)?,
            Some('\\') => match parse_escape(description, 0)? {
                (Escape::Class(class), end) => (class, end),
                _ => {
                    return Err(CompileError::syntax(
                        description,
                        0,
                        "not a character class",
                    ))
                }
            },
            _ => {
                return Err(CompileError::syntax(
                    description,
                    0,
                    "not a character class",
                ))
            }
        };

        if end != description.len() {
            return Err(CompileError::syntax(
                description,
                end,
                "unexpected characters after character class",
            ));
        }

        Ok(class)
    }

    /// Returns true if `c` belongs to the class.
    #[inline]
    pub fn matches(&self, c: char) -> bool {
        let i = c as usize;
        let in_map = i < self.map.len() && self.map[i];
        in_map ^ self.inverted
    }

    /// Creates an empty class.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Creates a class that contains a single character.
    pub(crate) fn from_char(c: char) -> Self {
        let mut class = Self::new();
        class.set_range(c, c);
        class
    }

    /// Creates a class from a list of inclusive ranges.
    pub(crate) fn from_ranges(ranges: &[(char, char)]) -> Self {
        let mut class = Self::new();
        for (lo, hi) in ranges {
            class.set_range(*lo, *hi);
        }
        class
    }

    /// Returns the predefined class corresponding to `\d`, `\D`, `\s`,
    /// `\S`, `\w` or `\W`, where `c` is the letter after the backslash.
    pub(crate) fn predefined(c: char) -> Option<Self> {
        let mut class = match c.to_ascii_lowercase() {
            'd' => Self::from_ranges(&[('0', '9')]),
            's' => Self::from_ranges(&[
                (' ', ' '),
                ('\t', '\r'), // \t \n \x0B \f \r
            ]),
            'w' => Self::from_ranges(&[
                ('a', 'z'),
                ('A', 'Z'),
                ('_', '_'),
                ('0', '9'),
            ]),
            _ => return None,
        };
        if c.is_ascii_uppercase() {
            class.negate();
        }
        Some(class)
    }

    /// Adds the characters in `lo..=hi` to the class.
    ///
    /// Bits are stored before inversion, adding a character to a negated
    /// class removes it from the set of matching characters.
    pub(crate) fn set_range(&mut self, lo: char, hi: char) {
        let (lo, hi) = (lo as usize, hi as usize);
        self.ensure_capacity(hi + 1);
        self.map[lo..=hi].fill(true);
    }

    /// Negates the class.
    pub(crate) fn negate(&mut self) {
        self.inverted = !self.inverted;
    }

    /// Returns the union of two classes.
    pub(crate) fn union(&self, other: &Self) -> Self {
        self.combine(other, self.inverted || other.inverted, |a, b| a || b)
    }

    /// Returns the intersection of two classes.
    pub(crate) fn intersect(&self, other: &Self) -> Self {
        self.combine(other, self.inverted && other.inverted, |a, b| a && b)
    }

    /// Grows the bitmap so that it has at least `len` bits. Existing bits
    /// are preserved, new bits are zero.
    fn ensure_capacity(&mut self, len: usize) {
        if self.map.len() < len {
            self.map.resize(len, false);
        }
    }

    /// Computes a new class where each character `c` matches if
    /// `op(self.matches(c), other.matches(c))` is true.
    ///
    /// `inverted` must be the result of `op` for characters that are beyond
    /// the end of both bitmaps, that's what makes a bitmap of length
    /// `max(self.len, other.len)` enough for representing the result.
    fn combine(
        &self,
        other: &Self,
        inverted: bool,
        op: impl Fn(bool, bool) -> bool,
    ) -> Self {
        let len = self.map.len().max(other.map.len());
        let mut map = BitVec::repeat(false, len);

        for i in 0..len {
            let a = (i < self.map.len() && self.map[i]) ^ self.inverted;
            let b = (i < other.map.len() && other.map[i]) ^ other.inverted;
            map.set(i, op(a, b) ^ inverted);
        }

        Self { map, inverted }
    }
}

/// Result of parsing an escape sequence.
#[derive(Debug, Eq, PartialEq)]
pub(crate) enum Escape {
    /// A single character, like `\n`, `\x41` or `\.`.
    Char(char),
    /// A predefined class, like `\d` or `\W`.
    Class(CharacterMatcher),
    /// `\b`
    WordBoundary,
    /// `\B`
    NonWordBoundary,
    /// The text between `\Q` and `\E`, which must be matched literally.
    Quote(String),
}

/// Parses the escape sequence that starts at `index`, which must be the
/// position of a backslash. Returns the escape and the index of the first
/// byte after it.
pub(crate) fn parse_escape(
    pattern: &str,
    index: usize,
) -> Result<(Escape, usize), CompileError> {
    debug_assert_eq!(pattern.as_bytes().get(index), Some(&b'\\'));

    let mut pos = index + 1;

    let c = match pattern[pos..].chars().next() {
        Some(c) => c,
        None => {
            return Err(CompileError::syntax(
                pattern,
                index,
                "trailing backslash",
            ))
        }
    };

    pos += c.len_utf8();

    let escape = match c {
        '0' => {
            // Octal escape, \0o, \0oo or \0ooo where the first digit of a
            // three digit escape can't be greater than 3.
            let digits: String = pattern[pos..]
                .chars()
                .take_while(|c| c.is_digit(8))
                .take(3)
                .collect();

            let digits = if digits.len() == 3 && digits.as_bytes()[0] > b'3' {
                &digits[..2]
            } else {
                digits.as_str()
            };

            if digits.is_empty() {
                return Err(CompileError::syntax(
                    pattern,
                    index,
                    "illegal octal escape sequence",
                ));
            }

            pos += digits.len();
            // Octal escapes are at most 0o377, always a valid char.
            Escape::Char(char::from(
                u8::from_str_radix(digits, 8).unwrap_or_default(),
            ))
        }
        '1'..='9' => {
            return Err(CompileError::unsupported(
                pattern,
                index,
                "backreferences",
            ))
        }
        'x' => {
            let (value, end) = if pattern[pos..].starts_with('{') {
                let close = pattern[pos..].find('}').ok_or_else(|| {
                    CompileError::syntax(
                        pattern,
                        index,
                        "unclosed hexadecimal escape sequence",
                    )
                })?;
                let digits = &pattern[pos + 1..pos + close];
                (parse_hex(pattern, index, digits)?, pos + close + 1)
            } else {
                (parse_fixed_hex(pattern, index, pos, 2)?, pos + 2)
            };
            pos = end;
            Escape::Char(to_char(pattern, index, value)?)
        }
        'u' => {
            let mut value = parse_fixed_hex(pattern, index, pos, 4)?;
            pos += 4;
            // A high surrogate followed by a low surrogate is combined into
            // a single character.
            if (0xD800..0xDC00).contains(&value)
                && pattern[pos..].starts_with("\\u")
            {
                if let Ok(low) = parse_fixed_hex(pattern, index, pos + 2, 4) {
                    if (0xDC00..0xE000).contains(&low) {
                        value = 0x10000
                            + ((value - 0xD800) << 10)
                            + (low - 0xDC00);
                        pos += 6;
                    }
                }
            }
            Escape::Char(to_char(pattern, index, value)?)
        }
        't' => Escape::Char('\t'),
        'n' => Escape::Char('\n'),
        'r' => Escape::Char('\r'),
        'f' => Escape::Char('\x0C'),
        'a' => Escape::Char('\x07'),
        'e' => Escape::Char('\x1B'),
        'd' | 'D' | 's' | 'S' | 'w' | 'W' => {
            // `predefined` always returns a class for these letters.
            Escape::Class(CharacterMatcher::predefined(c).unwrap_or_default())
        }
        'b' => Escape::WordBoundary,
        'B' => Escape::NonWordBoundary,
        'Q' => {
            // Everything until the next `\E`, or the end of the pattern if
            // there's no `\E`, is taken literally.
            let (quoted, end) = match pattern[pos..].find("\\E") {
                Some(i) => (&pattern[pos..pos + i], pos + i + 2),
                None => (&pattern[pos..], pattern.len()),
            };
            pos = end;
            Escape::Quote(quoted.to_string())
        }
        'E' => {
            return Err(CompileError::syntax(
                pattern,
                index,
                "\\E without a preceding \\Q",
            ))
        }
        'k' => {
            return Err(CompileError::unsupported(
                pattern,
                index,
                "named backreferences",
            ))
        }
        'p' | 'P' => {
            return Err(CompileError::unsupported(
                pattern,
                index,
                "unicode property classes",
            ))
        }
        'c' => {
            return Err(CompileError::unsupported(
                pattern,
                index,
                "control character escapes",
            ))
        }
        'A' | 'z' | 'Z' | 'G' => {
            return Err(CompileError::unsupported(
                pattern,
                index,
                format!("anchor `\\{}`", c),
            ))
        }
        c if c.is_ascii_alphanumeric() => {
            return Err(CompileError::syntax(
                pattern,
                index,
                format!("illegal escape sequence `\\{}`", c),
            ))
        }
        c => Escape::Char(c),
    };

    Ok((escape, pos))
}

/// Parses exactly `n` hexadecimal digits starting at `pos`.
fn parse_fixed_hex(
    pattern: &str,
    index: usize,
    pos: usize,
    n: usize,
) -> Result<u32, CompileError> {
    match pattern.get(pos..pos + n) {
        Some(digits) => parse_hex(pattern, index, digits),
        None => Err(CompileError::syntax(
            pattern,
            index,
            "illegal hexadecimal escape sequence",
        )),
    }
}

fn parse_hex(
    pattern: &str,
    index: usize,
    digits: &str,
) -> Result<u32, CompileError> {
    let bad_hex = || {
        CompileError::syntax(
            pattern,
            index,
            "illegal hexadecimal escape sequence",
        )
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(bad_hex());
    }

    u32::from_str_radix(digits, 16).map_err(|_| bad_hex())
}

fn to_char(
    pattern: &str,
    index: usize,
    value: u32,
) -> Result<char, CompileError> {
    char::from_u32(value).ok_or_else(|| {
        CompileError::syntax(
            pattern,
            index,
            format!("escape sequence is not a valid character: {:#x}", value),
        )
    })
}

/// Parses the character class that starts at `index`, which must be the
/// position of a `[`. Returns the class and the index of the first byte
/// after the closing `]`.
pub(crate) fn parse_class(
    pattern: &str,
    index: usize,
) -> Result<(CharacterMatcher, usize), CompileError> {
    let mut parser = ClassParser { pattern, pos: index };
    let class = parser.parse_class()?;
    Ok((class, parser.pos))
}

/// Recursive-descent parser for bracket expressions.
///
/// ```text
/// class        := '[' '^'? union ']'
/// union        := intersection+
/// intersection := item ('&&' item)*
/// item         := class | escape | char ('-' char)?
/// ```
///
/// Union is expressed by juxtaposition, while `&&` intersects the two items
/// immediately adjacent to it. In `[a-z&&[^x]0-9]` the intersection applies
/// to `a-z` and `[^x]`, and the result is joined with `0-9`.
struct ClassParser<'a> {
    pattern: &'a str,
    pos: usize,
}

impl<'a> ClassParser<'a> {
    fn peek(&self) -> Option<char> {
        self.pattern[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error<M: Into<String>>(&self, index: usize, msg: M) -> CompileError {
        CompileError::syntax(self.pattern, index, msg)
    }

    fn parse_class(&mut self) -> Result<CharacterMatcher, CompileError> {
        let start = self.pos;
        debug_assert_eq!(self.peek(), Some('['));
        self.bump();

        let negated = if self.peek() == Some('^') {
            self.bump();
            true
        } else {
            false
        };

        let mut class = CharacterMatcher::new();
        let mut empty = true;

        loop {
            match self.peek() {
                None => {
                    return Err(self.error(start, "unclosed character class"))
                }
                Some(']') => {
                    if empty {
                        return Err(
                            self.error(start, "empty character class")
                        );
                    }
                    self.bump();
                    break;
                }
                Some(_) if self.pattern[self.pos..].starts_with("&&") => {
                    return Err(self.error(
                        self.pos,
                        "missing left operand for `&&`",
                    ));
                }
                Some(_) => {
                    let mut item = self.parse_item()?;
                    while self.pattern[self.pos..].starts_with("&&") {
                        let op_pos = self.pos;
                        self.pos += 2;
                        if matches!(self.peek(), None | Some(']')) {
                            return Err(self.error(
                                op_pos,
                                "missing right operand for `&&`",
                            ));
                        }
                        item = item.intersect(&self.parse_item()?);
                    }
                    class = class.union(&item);
                    empty = false;
                }
            }
        }

        if negated {
            class.negate();
        }

        Ok(class)
    }

    fn parse_item(&mut self) -> Result<CharacterMatcher, CompileError> {
        let start = self.pos;

        let lo = match self.peek() {
            Some('[') => return self.parse_class(),
            Some('\\') => {
                let (escape, end) = parse_escape(self.pattern, self.pos)?;
                self.pos = end;
                match escape {
                    Escape::Char(c) => c,
                    Escape::Class(class) => return Ok(class),
                    Escape::Quote(quoted) => {
                        let mut class = CharacterMatcher::new();
                        for c in quoted.chars() {
                            class.set_range(c, c);
                        }
                        return Ok(class);
                    }
                    Escape::WordBoundary | Escape::NonWordBoundary => {
                        return Err(self.error(
                            start,
                            "word boundaries are not allowed in a character class",
                        ))
                    }
                }
            }
            Some(c) => {
                self.bump();
                c
            }
            None => return Err(self.error(start, "unclosed character class")),
        };

        // A `-` that is followed by `]` is a literal hyphen, not a range.
        let is_range = self.peek() == Some('-')
            && !matches!(
                self.pattern[self.pos + 1..].chars().next(),
                None | Some(']')
            );

        if !is_range {
            return Ok(CharacterMatcher::from_char(lo));
        }

        // Skip the `-`.
        self.bump();

        let hi = match self.peek() {
            Some('\\') => {
                let (escape, end) = parse_escape(self.pattern, self.pos)?;
                match escape {
                    Escape::Char(c) => {
                        self.pos = end;
                        c
                    }
                    _ => {
                        return Err(
                            self.error(start, "illegal character range")
                        )
                    }
                }
            }
            Some('[') => {
                return Err(self.error(start, "illegal character range"))
            }
            Some(c) => {
                self.bump();
                c
            }
            None => return Err(self.error(start, "unclosed character class")),
        };

        if lo > hi {
            return Err(self.error(
                start,
                format!("illegal character range `{}-{}`", lo, hi),
            ));
        }

        Ok(CharacterMatcher::from_ranges(&[(lo, hi)]))
    }
}
