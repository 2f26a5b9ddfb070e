/*!
This module defines the instructions utilized by Pike's VM, along with various
types that aid in generating and executing sequences of VM instructions.

Instruction encoding format
---------------------------

A program is a flat sequence of `i32` values. For most regular expressions
the code consists in long sequences of instructions that match specific
characters, so instead of having a "match character" opcode followed by the
character, the character itself is put in the instruction stream. Literal
characters are always non-negative (they are Unicode code points), while
opcodes are negative numbers. Telling apart a literal from an opcode is just
a matter of checking the sign.

For instance, the regexp `/ab.c/` is represented by:

```text
    0x61  0x62   -1   0x63
     a     b    DOT    c
```

Some opcodes are followed by an operand, which is the index of a capture
offset, the index of a character class, the index of a lookaround sub-program,
or the absolute location of the target of a jump. Those instructions occupy
two slots, all others occupy a single slot. The opcodes are arranged so that
the ones that have an operand lie in [`Instr::JMP`]`..=`[`Instr::CHARACTER_CLASS`]
and the ones that jump lie in [`Instr::JMP`]`..=`[`Instr::SPLIT`].

The end of the program is the accept state: a thread that reaches the location
`code.len()` has found a match.
 */

use std::fmt::{Display, Formatter};

/// Instructions supported by the Pike VM.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Instr {
    /// Matches a specific character.
    Char(char),

    /// Matches any character except `\r` and `\n`.
    Dot,

    /// Matches any character.
    DotAll,

    /// Matches a position where one of the surrounding characters is a word
    /// character (`\w`) and the other is not. The start and end of the input
    /// count as non-word characters.
    WordBoundary,

    /// The negation of WordBoundary.
    NonWordBoundary,

    /// Matches the start of the input (^).
    LineStart,

    /// Matches the end of the input ($).
    LineEnd,

    /// Matches a character that belongs to the character class with the
    /// given index.
    Class(usize),

    /// Succeeds if the lookaround sub-program with the given index matches
    /// at the current position, running forward.
    Lookahead(usize),

    /// Succeeds if the lookaround sub-program with the given index matches
    /// at the current position, running backward. The sub-program has been
    /// reversed.
    Lookbehind(usize),

    /// The negation of Lookahead.
    NegativeLookahead(usize),

    /// The negation of Lookbehind.
    NegativeLookbehind(usize),

    /// Stores the current position in the capture offset with the given
    /// index.
    SaveOffset(usize),

    /// Continues executing the code at two different locations. The next
    /// instruction has higher priority than the target, which means that
    /// the current thread prefers not jumping.
    Split(usize),

    /// Like Split, but the target has higher priority than the next
    /// instruction, the current thread prefers jumping.
    SplitJmp(usize),

    /// Absolute jump.
    Jmp(usize),
}

impl Instr {
    pub const DOT: i32 = -1;
    pub const DOTALL: i32 = -2;
    pub const WORD_BOUNDARY: i32 = -10;
    pub const NON_WORD_BOUNDARY: i32 = -11;
    pub const LINE_START: i32 = -12;
    pub const LINE_END: i32 = -13;
    pub const CHARACTER_CLASS: i32 = -20;
    pub const LOOKAHEAD: i32 = -30;
    pub const LOOKBEHIND: i32 = -31;
    pub const NEGATIVE_LOOKAHEAD: i32 = -32;
    pub const NEGATIVE_LOOKBEHIND: i32 = -33;
    pub const SAVE_OFFSET: i32 = -40;
    pub const SPLIT: i32 = -50;
    pub const SPLIT_JMP: i32 = -51;
    pub const JMP: i32 = -52;
}

/// Returns the number of slots occupied by an instruction with the given
/// opcode.
#[inline(always)]
pub fn length(opcode: i32) -> usize {
    if (Instr::JMP..=Instr::CHARACTER_CLASS).contains(&opcode) {
        2
    } else {
        1
    }
}

/// Returns true if the opcode is `SPLIT`, `SPLIT_JMP` or `JMP`.
#[inline(always)]
pub fn is_jump(opcode: i32) -> bool {
    (Instr::JMP..=Instr::SPLIT).contains(&opcode)
}

/// Parses a slice of `i32` that contains Pike VM instructions, returning
/// individual instructions and their locations.
pub(crate) struct InstrParser<'a> {
    code: &'a [i32],
    addr: usize,
}

impl<'a> InstrParser<'a> {
    pub fn new(code: &'a [i32]) -> Self {
        Self { code, addr: 0 }
    }

    /// Decodes the instruction at the start of `code`, returning the
    /// instruction and its size in slots.
    ///
    /// # Panics
    ///
    /// If `code` doesn't start with a valid instruction. Programs produced by
    /// the compiler always contain valid instructions, an invalid one means
    /// that the program is corrupt.
    #[inline(always)]
    pub fn decode_instr(code: &[i32]) -> (Instr, usize) {
        let operand = || code[1] as usize;
        match code[0] {
            Instr::DOT => (Instr::Dot, 1),
            Instr::DOTALL => (Instr::DotAll, 1),
            Instr::WORD_BOUNDARY => (Instr::WordBoundary, 1),
            Instr::NON_WORD_BOUNDARY => (Instr::NonWordBoundary, 1),
            Instr::LINE_START => (Instr::LineStart, 1),
            Instr::LINE_END => (Instr::LineEnd, 1),
            Instr::CHARACTER_CLASS => (Instr::Class(operand()), 2),
            Instr::LOOKAHEAD => (Instr::Lookahead(operand()), 2),
            Instr::LOOKBEHIND => (Instr::Lookbehind(operand()), 2),
            Instr::NEGATIVE_LOOKAHEAD => {
                (Instr::NegativeLookahead(operand()), 2)
            }
            Instr::NEGATIVE_LOOKBEHIND => {
                (Instr::NegativeLookbehind(operand()), 2)
            }
            Instr::SAVE_OFFSET => (Instr::SaveOffset(operand()), 2),
            Instr::SPLIT => (Instr::Split(operand()), 2),
            Instr::SPLIT_JMP => (Instr::SplitJmp(operand()), 2),
            Instr::JMP => (Instr::Jmp(operand()), 2),
            op => match u32::try_from(op).ok().and_then(char::from_u32) {
                Some(c) => (Instr::Char(c), 1),
                None => unreachable!("invalid opcode {} in VM code", op),
            },
        }
    }
}

impl<'a> Iterator for InstrParser<'a> {
    type Item = (Instr, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.addr >= self.code.len() {
            return None;
        }
        let (instr, size) = InstrParser::decode_instr(&self.code[self.addr..]);
        let addr = self.addr;
        self.addr += size;
        Some((instr, addr))
    }
}

impl Display for Instr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Instr::Char(c) => write!(f, "LIT {:?}", c),
            Instr::Dot => write!(f, "DOT"),
            Instr::DotAll => write!(f, "DOTALL"),
            Instr::WordBoundary => write!(f, "WORD_BOUNDARY"),
            Instr::NonWordBoundary => write!(f, "NON_WORD_BOUNDARY"),
            Instr::LineStart => write!(f, "LINE_START"),
            Instr::LineEnd => write!(f, "LINE_END"),
            Instr::Class(i) => write!(f, "CLASS {}", i),
            Instr::Lookahead(i) => write!(f, "LOOKAHEAD {}", i),
            Instr::Lookbehind(i) => write!(f, "LOOKBEHIND {}", i),
            Instr::NegativeLookahead(i) => {
                write!(f, "NEGATIVE_LOOKAHEAD {}", i)
            }
            Instr::NegativeLookbehind(i) => {
                write!(f, "NEGATIVE_LOOKBEHIND {}", i)
            }
            Instr::SaveOffset(i) => write!(f, "SAVE_OFFSET {}", i),
            Instr::Split(target) => write!(f, "SPLIT {:05x}", target),
            Instr::SplitJmp(target) => write!(f, "SPLIT_JMP {:05x}", target),
            Instr::Jmp(target) => write!(f, "JMP {:05x}", target),
        }
    }
}

/// Writes a listing of the program in `code`, one instruction per line,
/// each one prefixed by its location. The listing ends with the location of
/// the accept state.
pub(crate) fn write_listing(
    f: &mut Formatter<'_>,
    code: &[i32],
) -> std::fmt::Result {
    writeln!(f)?;
    for (instr, addr) in InstrParser::new(code) {
        writeln!(f, "{:05x}: {}", addr, instr)?;
    }
    writeln!(f, "{:05x}: ACCEPT", code.len())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{is_jump, length, Instr, InstrParser};

    #[test]
    fn opcode_properties() {
        assert_eq!(length('a' as i32), 1);
        assert_eq!(length(Instr::DOT), 1);
        assert_eq!(length(Instr::LINE_END), 1);
        assert_eq!(length(Instr::CHARACTER_CLASS), 2);
        assert_eq!(length(Instr::SAVE_OFFSET), 2);
        assert_eq!(length(Instr::JMP), 2);

        assert!(is_jump(Instr::SPLIT));
        assert!(is_jump(Instr::SPLIT_JMP));
        assert!(is_jump(Instr::JMP));
        assert!(!is_jump(Instr::SAVE_OFFSET));
        assert!(!is_jump(0));
    }

    #[test]
    fn parse_instructions() {
        let code = [
            'a' as i32,
            Instr::SPLIT_JMP,
            0,
            Instr::CHARACTER_CLASS,
            3,
            Instr::LINE_END,
            '\u{1F600}' as i32,
        ];

        assert_eq!(
            InstrParser::new(&code).collect::<Vec<_>>(),
            vec![
                (Instr::Char('a'), 0),
                (Instr::SplitJmp(0), 1),
                (Instr::Class(3), 3),
                (Instr::LineEnd, 5),
                (Instr::Char('\u{1F600}'), 6),
            ]
        );
    }

    #[test]
    #[should_panic]
    fn invalid_opcode() {
        InstrParser::decode_instr(&[-99]);
    }
}
