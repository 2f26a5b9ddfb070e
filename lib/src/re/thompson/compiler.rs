/*!
This module provides a compiler that takes a regex's [`Tree`] and produces a
program for the Pike's VM.

The program is produced in a single pass over the tree. Instructions that jump
forward are emitted with a zero target, their locations are remembered, and
they are patched once the target is known. Repetitions like `{n,m}` are
expanded by cloning the code emitted for the first copy of the repeated
expression, relocating the targets of any jump inside the cloned code.
*/

use crate::errors::CompileError;
use crate::re::class::CharacterMatcher;
use crate::re::hir::{Group, Hir, Look, Tree};
use crate::re::thompson::instr::{is_jump, length, Instr};
use crate::re::thompson::pikevm::PikeVM;

/// Maximum number of slots in a VM program.
pub const MAX_CODE_LEN: usize = 1 << 20;

/// Compiles a regular expression.
///
/// Compiling a regexp consists in performing a DFS traversal of the tree
/// while emitting code for the Pike VM. Character classes and lookaround
/// assertions are not stored in the code itself, they are put in side tables
/// and referenced by index from `CHARACTER_CLASS` and `LOOKAHEAD`/`LOOKBEHIND`
/// instructions. Each lookaround is compiled into an independent [`PikeVM`]
/// by a nested compiler.
pub(crate) struct Compiler {
    /// Code for the Pike VM.
    code: InstrSeq,
    /// Character classes referenced by the code.
    classes: Vec<CharacterMatcher>,
    /// Sub-programs for lookaround assertions referenced by the code.
    lookarounds: Vec<PikeVM>,
    /// When false, capture groups are compiled as non-capturing ones. This
    /// is the case for lookaround sub-programs, as their captures are not
    /// exposed.
    captures: bool,
}

impl Compiler {
    /// Creates a new regexp compiler.
    pub fn new() -> Self {
        Self {
            code: InstrSeq::new(),
            classes: Vec::new(),
            lookarounds: Vec::new(),
            captures: true,
        }
    }

    /// Given the tree for a regular expression, produces a [`PikeVM`] that
    /// matches it.
    ///
    /// The code starts with a preamble that allows the VM to find matches
    /// starting at any position of the input:
    ///
    /// ```text
    /// 00000: SPLIT_JMP 00005
    /// 00002: DOTALL
    /// 00003: JMP 00000
    /// ```
    ///
    /// The `SPLIT_JMP` prefers starting the match at the current position,
    /// while the lower priority thread skips one character and tries again.
    /// The code for the pattern itself goes after the preamble, wrapped in
    /// the capture group 0.
    pub fn compile(mut self, tree: &Tree) -> Result<PikeVM, CompileError> {
        let split = self.code.emit_instr(Instr::SPLIT_JMP)?;
        self.code.emit_instr(Instr::DOTALL)?;
        self.code.emit_instr_with(Instr::JMP, split)?;

        let find_prefix_length = self.code.location();
        self.code.patch_instr(split, find_prefix_length);

        self.emit_group(&tree.root)?;

        Ok(PikeVM::new(
            self.code.into_inner(),
            find_prefix_length,
            tree.group_count,
            self.classes,
            self.lookarounds,
        ))
    }

    /// Compiles the body of a lookaround assertion into an independent
    /// [`PikeVM`] without preamble and without captures. The code for
    /// lookbehind assertions is reversed, as the VM executes it right to
    /// left.
    pub(super) fn compile_lookaround(
        group: &Group,
        ahead: bool,
    ) -> Result<PikeVM, CompileError> {
        let mut compiler = Self { captures: false, ..Self::new() };

        compiler.emit_alternatives(&group.alternatives)?;

        let mut vm = PikeVM::new(
            compiler.code.into_inner(),
            0,
            0,
            compiler.classes,
            compiler.lookarounds,
        );

        if !ahead {
            vm.reverse();
        }

        Ok(vm)
    }

    fn emit(&mut self, hir: &Hir) -> Result<(), CompileError> {
        match hir {
            Hir::Literal(c) => {
                self.code.emit_char(*c)?;
            }
            Hir::Dot => {
                self.code.emit_instr(Instr::DOT)?;
            }
            Hir::Class(class) => {
                self.code
                    .emit_instr_with(Instr::CHARACTER_CLASS, self.classes.len())?;
                self.classes.push(class.clone());
            }
            Hir::Look(look) => {
                self.code.emit_instr(match look {
                    Look::LineStart => Instr::LINE_START,
                    Look::LineEnd => Instr::LINE_END,
                    Look::WordBoundary => Instr::WORD_BOUNDARY,
                    Look::NonWordBoundary => Instr::NON_WORD_BOUNDARY,
                })?;
            }
            Hir::Group(group) => self.emit_group(group)?,
            Hir::Lookaround { ahead, negative, group } => {
                let vm = Self::compile_lookaround(group, *ahead)?;
                let opcode = match (ahead, negative) {
                    (true, false) => Instr::LOOKAHEAD,
                    (true, true) => Instr::NEGATIVE_LOOKAHEAD,
                    (false, false) => Instr::LOOKBEHIND,
                    (false, true) => Instr::NEGATIVE_LOOKBEHIND,
                };
                self.code.emit_instr_with(opcode, self.lookarounds.len())?;
                self.lookarounds.push(vm);
            }
            Hir::Repeat { hir, min, max, greedy } => {
                self.emit_repeat(hir, *min, *max, *greedy)?
            }
        }
        Ok(())
    }

    fn emit_group(&mut self, group: &Group) -> Result<(), CompileError> {
        let capture = group.capture.filter(|_| self.captures);

        if let Some(index) = capture {
            self.code.emit_instr_with(Instr::SAVE_OFFSET, 2 * index)?;
        }

        self.emit_alternatives(&group.alternatives)?;

        if let Some(index) = capture {
            self.code.emit_instr_with(Instr::SAVE_OFFSET, 2 * index + 1)?;
        }

        Ok(())
    }

    /// Emits code for a list of alternatives. For `a|b|c` the code is:
    ///
    /// ```text
    /// 00000: SPLIT 00005
    /// 00002: LIT 'a'
    /// 00003: JMP 0000b
    /// 00005: SPLIT 0000a
    /// 00007: LIT 'b'
    /// 00008: JMP 0000b
    /// 0000a: LIT 'c'
    /// ```
    ///
    /// Each `SPLIT` gives priority to the alternative that follows it, so
    /// alternatives are tried from left to right.
    fn emit_alternatives(
        &mut self,
        alternatives: &[Vec<Hir>],
    ) -> Result<(), CompileError> {
        let mut bookmarks = Vec::with_capacity(alternatives.len());

        for (i, alternative) in alternatives.iter().enumerate() {
            let is_last = i == alternatives.len() - 1;

            let split = if is_last {
                None
            } else {
                Some(self.code.emit_instr(Instr::SPLIT)?)
            };

            for hir in alternative {
                self.emit(hir)?;
            }

            if let Some(split) = split {
                bookmarks.push(self.code.emit_instr(Instr::JMP)?);
                self.code.patch_instr(split, self.code.location());
            }
        }

        let end = self.code.location();

        for jump in bookmarks {
            self.code.patch_instr(jump, end);
        }

        Ok(())
    }

    /// Emits code for a repetition.
    ///
    /// ```text
    /// e*    L1: SPLIT L2        e*?   L1: SPLIT_JMP L2
    ///           e                         e
    ///           JMP L1                    JMP L1
    ///       L2:                       L2:
    ///
    /// e+    L1: e               e+?   L1: e
    ///           SPLIT_JMP L1              SPLIT L1
    ///
    /// e?        SPLIT L1        e??       SPLIT_JMP L1
    ///           e                         e
    ///       L1:                       L1:
    /// ```
    ///
    /// When `e` can match the empty string `e*` is emitted as `(?:e+)?`.
    ///
    /// `e{n,}` is `e` repeated `n-1` times followed by `e+`, and `e{n,m}` is
    /// `e` repeated `n` times followed by `m-n` copies of `e?` that jump to
    /// the same location when skipped.
    fn emit_repeat(
        &mut self,
        hir: &Hir,
        min: u32,
        max: Option<u32>,
        greedy: bool,
    ) -> Result<(), CompileError> {
        let (split, split_back) = if greedy {
            (Instr::SPLIT, Instr::SPLIT_JMP)
        } else {
            (Instr::SPLIT_JMP, Instr::SPLIT)
        };

        match (min, max) {
            (_, Some(0)) => {}
            // `(?:e+)?`, an empty iteration must leave the loop before the
            // alternatives of `e` that consume characters are tried.
            (0, None) if hir.can_match_empty() => {
                let l1 = self.code.emit_instr(split)?;
                let start = self.code.location();
                self.emit(hir)?;
                self.code.emit_instr_with(split_back, start)?;
                self.code.patch_instr(l1, self.code.location());
            }
            (0, None) => {
                let l1 = self.code.emit_instr(split)?;
                self.emit(hir)?;
                self.code.emit_instr_with(Instr::JMP, l1)?;
                self.code.patch_instr(l1, self.code.location());
            }
            (min, None) => {
                let start = self.code.location();
                self.emit(hir)?;
                let end = self.code.location();

                let mut last = start;
                for _ in 1..min {
                    last = self.code.emit_clone(start, end)?;
                }

                self.code.emit_instr_with(split_back, last)?;
            }
            (min, Some(max)) => {
                // Location of the first copy of `e`, once emitted. The
                // remaining copies are clones of it.
                let mut body: Option<(usize, usize)> = None;

                let mut emit_copy = |c: &mut Self| -> Result<(), CompileError> {
                    match body {
                        Some((start, end)) => {
                            c.code.emit_clone(start, end)?;
                        }
                        None => {
                            let start = c.code.location();
                            c.emit(hir)?;
                            body = Some((start, c.code.location()));
                        }
                    }
                    Ok(())
                };

                for _ in 0..min {
                    emit_copy(self)?;
                }

                let mut bookmarks = Vec::with_capacity((max - min) as usize);

                for _ in min..max {
                    bookmarks.push(self.code.emit_instr(split)?);
                    emit_copy(self)?;
                }

                let end = self.code.location();

                for split in bookmarks {
                    self.code.patch_instr(split, end);
                }
            }
        }

        Ok(())
    }
}

/// A sequence of instructions for the Pike VM.
#[derive(Default)]
pub(crate) struct InstrSeq {
    seq: Vec<i32>,
}

impl InstrSeq {
    /// Creates a new [`InstrSeq`].
    pub fn new() -> Self {
        Self { seq: Vec::new() }
    }

    /// Consumes the [`InstrSeq`] and returns the inner vector that contains
    /// the code.
    pub fn into_inner(self) -> Vec<i32> {
        self.seq
    }

    /// Returns the current location within the instruction sequence.
    ///
    /// The first instruction is at location 0. This function always returns
    /// the location where the next instruction will be put.
    #[inline]
    pub fn location(&self) -> usize {
        self.seq.len()
    }

    /// Makes sure that `n` more slots can be added without exceeding
    /// [`MAX_CODE_LEN`].
    fn check_size(&self, n: usize) -> Result<(), CompileError> {
        if self.seq.len() + n > MAX_CODE_LEN {
            return Err(CompileError::TooLarge);
        }
        Ok(())
    }

    /// Adds an instruction that matches the character `c`.
    pub fn emit_char(&mut self, c: char) -> Result<usize, CompileError> {
        self.check_size(1)?;
        let location = self.location();
        self.seq.push(c as i32);
        Ok(location)
    }

    /// Adds some instruction at the end of the sequence and returns the
    /// location where the newly added instruction resides. If the
    /// instruction has an operand it is set to zero.
    pub fn emit_instr(&mut self, opcode: i32) -> Result<usize, CompileError> {
        debug_assert!(opcode < 0);
        self.check_size(length(opcode))?;

        let location = self.location();

        self.seq.push(opcode);
        if length(opcode) == 2 {
            self.seq.push(0);
        }

        Ok(location)
    }

    /// Adds an instruction that has an operand at the end of the sequence
    /// and returns the location where the newly added instruction resides.
    pub fn emit_instr_with(
        &mut self,
        opcode: i32,
        operand: usize,
    ) -> Result<usize, CompileError> {
        debug_assert_eq!(length(opcode), 2);
        let location = self.emit_instr(opcode)?;
        self.seq[location + 1] =
            operand.try_into().map_err(|_| CompileError::TooLarge)?;
        Ok(location)
    }

    /// Emits a clone of the code that goes from `start` to `end`, the
    /// latter not included.
    ///
    /// Jump targets are absolute, the targets of the jumps in the cloned
    /// code are moved by the distance between the original and the clone.
    /// This assumes that the code in `start..end` only jumps to locations
    /// within `start..=end`.
    pub fn emit_clone(
        &mut self,
        start: usize,
        end: usize,
    ) -> Result<usize, CompileError> {
        self.check_size(end - start)?;

        let location = self.location();
        let delta = (location - start) as i32;

        self.seq.extend_from_within(start..end);

        let cloned = &mut self.seq[location..];
        let mut pc = 0;

        while pc < cloned.len() {
            let opcode = cloned[pc];
            if is_jump(opcode) {
                cloned[pc + 1] += delta;
            }
            pc += length(opcode);
        }

        Ok(location)
    }

    /// Patches the target of the jump or split instruction that starts at
    /// the given location.
    ///
    /// # Panics
    ///
    /// If the instruction at `location` is not a jump or split.
    pub fn patch_instr(&mut self, location: usize, target: usize) {
        assert!(is_jump(self.seq[location]));
        // Locations never exceed MAX_CODE_LEN, they always fit in an i32.
        self.seq[location + 1] = target as i32;
    }
}
