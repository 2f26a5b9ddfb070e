use std::fmt::{Display, Formatter};
use std::mem;

use bitvec::vec::BitVec;

use super::instr::{is_jump, length, write_listing, Instr, InstrParser};
use crate::re::class::CharacterMatcher;

/// Represents a [Pike's VM](https://swtch.com/~rsc/regexp/regexp2.html) that
/// executes VM code produced by the [compiler][`crate::re::thompson::Compiler`].
///
/// The VM advances all its threads in lock-step, one input character at a
/// time, so the time required for matching is proportional to the length of
/// the input times the length of the program, no matter how the regexp looks
/// like. Threads are kept in priority order, and each thread carries its own
/// array of capture offsets.
///
/// A [`PikeVM`] is immutable once created, all the state required while
/// matching is allocated by [`PikeVM::try_match`] itself. This means that the
/// same VM can be used concurrently from multiple threads.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct PikeVM {
    /// The code for the VM. Produced by [`crate::re::thompson::Compiler`].
    code: Vec<i32>,
    /// Length of the preamble that makes the VM look for matches at every
    /// position of the input. Running the code from this location produces
    /// matches that start exactly where the VM started.
    find_prefix_length: usize,
    /// Number of capture groups, not counting the whole match.
    group_count: usize,
    /// Character classes referenced by `CHARACTER_CLASS` instructions.
    classes: Vec<CharacterMatcher>,
    /// Sub-programs referenced by lookaround instructions.
    lookarounds: Vec<PikeVM>,
}

impl PikeVM {
    /// Creates a new [`PikeVM`].
    pub fn new(
        code: Vec<i32>,
        find_prefix_length: usize,
        group_count: usize,
        classes: Vec<CharacterMatcher>,
        lookarounds: Vec<PikeVM>,
    ) -> Self {
        Self { code, find_prefix_length, group_count, classes, lookarounds }
    }

    #[inline]
    pub fn code(&self) -> &[i32] {
        self.code.as_slice()
    }

    #[inline]
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    #[cfg(test)]
    pub fn find_prefix_length(&self) -> usize {
        self.find_prefix_length
    }

    /// Returns the number of capture offsets that the `result` slice passed
    /// to [`PikeVM::try_match`] must have.
    #[inline]
    pub fn offsets_len(&self) -> usize {
        2 * self.group_count + 2
    }

    /// If the program only matches a fixed string, returns that string.
    ///
    /// This is the case when the code after the preamble consists only of
    /// literal characters, optionally surrounded by the instructions that
    /// save the bounds of the whole match. Such patterns can be searched
    /// with a plain substring search.
    pub fn plain_string(&self) -> Option<String> {
        const SAVE_START: [i32; 2] = [Instr::SAVE_OFFSET, 0];
        const SAVE_END: [i32; 2] = [Instr::SAVE_OFFSET, 1];

        let mut body = &self.code[self.find_prefix_length..];

        if body.starts_with(&SAVE_START) {
            body = &body[2..];
        }
        if body.ends_with(&SAVE_END) {
            body = &body[..body.len() - 2];
        }

        // Every instruction other than a literal contains an opcode, which
        // is negative.
        body.iter()
            .map(|op| u32::try_from(*op).ok().and_then(char::from_u32))
            .collect()
    }

    /// Runs the program on `input`, starting at byte offset `start`, and
    /// returns true if some match was found.
    ///
    /// When `end` is lower than `start` the VM runs backwards, reading the
    /// characters to the left of the current position and moving towards
    /// `end`. This is how lookbehind sub-programs, which have been
    /// [reversed][`PikeVM::reverse`], are executed.
    ///
    /// When `anchor_start` is true the match must start at `start`, when it
    /// is false the match can start anywhere between `start` and `end`.
    /// When `anchor_end` is true the match must finish exactly at `end`.
    ///
    /// If `result` is `None`, the function returns as soon as any thread
    /// reaches the accept state. Otherwise the VM keeps running until the
    /// match preferred by the regexp priorities is known, and its capture
    /// offsets are copied to `result`, which must have
    /// [`PikeVM::offsets_len`] items. Offsets for groups that didn't
    /// participate in the match are `None`.
    pub fn try_match(
        &self,
        input: &str,
        start: usize,
        end: usize,
        anchor_start: bool,
        anchor_end: bool,
        mut result: Option<&mut [Option<usize>]>,
    ) -> bool {
        let backwards = end < start;
        let accept = self.code.len();

        let mut arena = OffsetsArena::new(self.offsets_len());
        let mut queued = ThreadQueue::new(accept);
        let mut next = ThreadQueue::new(accept);
        // Locations already claimed by some thread in the current step.
        let mut claimed: BitVec = BitVec::repeat(false, accept + 1);
        let mut stack: Vec<(usize, usize)> = Vec::new();

        let mut found = false;
        let mut pos = start;

        let initial_pc = if anchor_start { self.find_prefix_length } else { 0 };
        queued.push_back(initial_pc, arena.alloc());

        loop {
            let curr_char = if pos == end {
                None
            } else if backwards {
                input[..pos].chars().next_back()
            } else {
                input[pos..].chars().next()
            };

            // Threads are run in priority order. Each one walks through the
            // zero-width instructions in depth-first order, the branch with
            // higher priority first, so the first thread that reaches some
            // location is always the one with highest priority.
            'step: while let Some(thread) = queued.pop_front() {
                stack.push(thread);

                while let Some((pc, buf)) = stack.pop() {
                    if claimed[pc] {
                        arena.release(buf);
                        continue;
                    }

                    claimed.set(pc, true);

                    if pc == accept {
                        if anchor_end && pos != end {
                            arena.release(buf);
                            continue;
                        }

                        let Some(result) = result.as_deref_mut() else {
                            return true;
                        };

                        result.copy_from_slice(arena.get(buf));
                        arena.release(buf);
                        found = true;

                        // Threads in the next generation that started after
                        // the match can't produce a match with higher
                        // priority.
                        if !anchor_start {
                            if let Some(match_start) = result[0] {
                                next.retain(&mut arena, |offsets| {
                                    match offsets[0] {
                                        Some(s) if backwards => s >= match_start,
                                        Some(s) => s <= match_start,
                                        None => false,
                                    }
                                });
                            }
                        }

                        // Everything still pending in this step has lower
                        // priority than the match.
                        for (_, buf) in stack.drain(..) {
                            arena.release(buf);
                        }
                        queued.clear(&mut arena);
                        break 'step;
                    }

                    let (instr, size) =
                        InstrParser::decode_instr(&self.code[pc..]);

                    // Whether the instruction consumes a character, and
                    // whether the thread survives it.
                    let (consumes, alive) = match instr {
                        Instr::Char(c) => (true, curr_char == Some(c)),
                        Instr::Dot => (
                            true,
                            matches!(curr_char, Some(c) if c != '\n' && c != '\r'),
                        ),
                        Instr::DotAll => (true, curr_char.is_some()),
                        Instr::Class(i) => (
                            true,
                            matches!(curr_char, Some(c) if self.classes[i].matches(c)),
                        ),
                        Instr::Split(target) => {
                            stack.push((target, arena.fork(buf)));
                            stack.push((pc + size, buf));
                            continue;
                        }
                        Instr::SplitJmp(target) => {
                            stack.push((pc + size, arena.fork(buf)));
                            stack.push((target, buf));
                            continue;
                        }
                        Instr::Jmp(target) => {
                            stack.push((target, buf));
                            continue;
                        }
                        Instr::SaveOffset(i) => {
                            arena.set(buf, i, pos);
                            (false, true)
                        }
                        Instr::LineStart => (false, pos == 0),
                        Instr::LineEnd => (false, pos == input.len()),
                        Instr::WordBoundary => {
                            (false, is_word_boundary(input, pos))
                        }
                        Instr::NonWordBoundary => {
                            (false, !is_word_boundary(input, pos))
                        }
                        Instr::Lookahead(i) => {
                            (false, self.lookahead(i, input, pos))
                        }
                        Instr::NegativeLookahead(i) => {
                            (false, !self.lookahead(i, input, pos))
                        }
                        Instr::Lookbehind(i) => {
                            (false, self.lookbehind(i, input, pos))
                        }
                        Instr::NegativeLookbehind(i) => {
                            (false, !self.lookbehind(i, input, pos))
                        }
                    };

                    if !alive {
                        arena.release(buf);
                    } else if !consumes {
                        stack.push((pc + size, buf));
                    } else if !next.push_back(pc + size, buf) {
                        arena.release(buf);
                    }
                }
            }

            claimed.fill(false);
            mem::swap(&mut queued, &mut next);

            let Some(c) = curr_char else {
                break;
            };

            if queued.is_empty() {
                break;
            }

            if backwards {
                pos -= c.len_utf8();
            } else {
                pos += c.len_utf8();
            }
        }

        found
    }

    #[inline]
    fn lookahead(&self, i: usize, input: &str, pos: usize) -> bool {
        self.lookarounds[i].try_match(input, pos, input.len(), true, false, None)
    }

    #[inline]
    fn lookbehind(&self, i: usize, input: &str, pos: usize) -> bool {
        self.lookarounds[i].try_match(input, pos, 0, true, false, None)
    }

    /// Reverses the program, so that it matches the same strings when
    /// executed from right to left.
    ///
    /// The preamble is left untouched, only the code after it is reversed.
    /// This is used for lookbehind assertions, which are compiled as any
    /// other expression and then reversed.
    pub fn reverse(&mut self) {
        let end = self.code.len();
        reverse_code(&mut self.code, self.find_prefix_length, end);
    }
}

impl Display for PikeVM {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write_listing(f, self.code.as_slice())?;
        for (i, lookaround) in self.lookarounds.iter().enumerate() {
            write!(f, "\nLOOKAROUND {}:", i)?;
            Display::fmt(lookaround, f)?;
        }
        Ok(())
    }
}

/// Returns true if one of the characters around `pos` is a word character
/// and the other is not. Positions outside the input count as non-word
/// characters.
fn is_word_boundary(input: &str, pos: usize) -> bool {
    let is_word = |c: Option<char>| {
        matches!(c, Some(c) if c == '_' || c.is_ascii_alphanumeric())
    };
    is_word(input[..pos].chars().next_back())
        != is_word(input[pos..].chars().next())
}

/// Reverses the code in `start..end`.
///
/// Sequences of consuming instructions are simply reversed. The hard part
/// are the jumps: an instruction at location `t` that is the target of a
/// jump at `j` means that, in the reversed code, there must be a jump at the
/// location corresponding to `t` that goes to the location corresponding to
/// `j`. In other words, the arrows are inverted.
///
/// ```text
/// a*      00000: SPLIT 00005       00000: JMP 00003
///         00002: LIT 'a'           00002: LIT 'a'
///         00003: JMP 00000         00003: SPLIT 00002
/// ```
///
/// A `JMP` is an arrow that can't be followed by falling through the
/// instruction before it, so the first arrow inverted at the location that
/// follows a `JMP` becomes a `JMP` itself, while the remaining ones become
/// splits with the same priority as the original.
///
/// The reversal is done in three passes. The first one collects, for each
/// location, the list of jumps that target it. The second one computes the
/// location in the reversed code of every instruction, and the last one
/// writes the reversed code.
fn reverse_code(code: &mut [i32], start: usize, end: usize) {
    // Linked lists of jumps by target. `incoming[t]` is the location of the
    // operand of the first jump to `t` (0 if none), and `incoming[j]`, where
    // `j` is the location of an operand, is the next jump with the same
    // target. Operands are never at the start of an instruction, so both
    // uses of the vector don't collide.
    let mut incoming = vec![0_usize; end + 1];
    // Locations that follow a `JMP`, which can't be reached by falling
    // through the previous instruction.
    let mut broken_arrows: BitVec = BitVec::repeat(false, end + 1);

    let mut pc = start;
    while pc < end {
        let opcode = code[pc];
        if is_jump(opcode) {
            let target = code[pc + 1] as usize;
            incoming[pc + 1] = incoming[target];
            incoming[target] = pc + 1;
            if opcode == Instr::JMP {
                broken_arrows.set(pc + 2, true);
            }
        }
        pc += length(opcode);
    }

    let mut mapping = vec![0_usize; end];
    let mut mapped = end;

    pc = start;
    while pc < end {
        let mut jump = incoming[pc];
        while jump > 0 {
            mapped -= 2;
            jump = incoming[jump];
        }
        let opcode = code[pc];
        if !is_jump(opcode) {
            mapped -= length(opcode);
        }
        mapping[pc] = mapped;
        pc += length(opcode);
    }

    let mut reversed = vec![0_i32; end];
    mapped = end;

    pc = start;
    loop {
        let mut broken_arrow = broken_arrows[pc];
        let mut jump = incoming[pc];
        while jump > 0 {
            mapped -= 1;
            reversed[mapped] = mapping[jump - 1] as i32;
            mapped -= 1;
            reversed[mapped] = if broken_arrow {
                broken_arrow = false;
                Instr::JMP
            } else if code[jump - 1] == Instr::SPLIT_JMP {
                Instr::SPLIT_JMP
            } else {
                Instr::SPLIT
            };
            jump = incoming[jump];
        }

        if pc == end {
            break;
        }

        let opcode = code[pc];
        let len = length(opcode);
        if !is_jump(opcode) {
            for i in (0..len).rev() {
                mapped -= 1;
                reversed[mapped] = code[pc + i];
            }
        }
        pc += len;
    }

    code[start..end].copy_from_slice(&reversed[start..end]);
}

/// A queue of threads in priority order.
///
/// There's at most one thread per location, so the queue is represented as
/// a linked list stored in a vector indexed by location, which makes checking
/// whether a location is already scheduled an O(1) operation and avoids any
/// allocation after the queue is created.
struct ThreadQueue {
    /// Location of the first thread, `NIL` if the queue is empty.
    head: usize,
    /// Location of the last thread, `NIL` if the queue is empty.
    tail: usize,
    /// Number of threads in the queue.
    len: usize,
    /// `next[pc]` is the location of the thread that follows the one at `pc`,
    /// plus one. Zero means that `pc` is not linked to any other thread.
    next: Vec<usize>,
    /// Offsets buffer of the thread at each location.
    offsets: Vec<usize>,
}

impl ThreadQueue {
    const NIL: usize = usize::MAX;

    /// Creates a queue for a program with the given length. The accept
    /// state, at location `code_len`, is a valid location too.
    fn new(code_len: usize) -> Self {
        Self {
            head: Self::NIL,
            tail: Self::NIL,
            len: 0,
            next: vec![0; code_len + 1],
            offsets: vec![0; code_len + 1],
        }
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.head == Self::NIL
    }

    #[inline]
    fn is_scheduled(&self, pc: usize) -> bool {
        self.tail == pc || self.next[pc] != 0
    }

    /// Adds a thread at the end of the queue. Returns false, without adding
    /// it, if there's already a thread at the same location.
    fn push_back(&mut self, pc: usize, buf: usize) -> bool {
        if self.is_scheduled(pc) {
            return false;
        }
        if self.tail == Self::NIL {
            self.head = pc;
        } else {
            self.next[self.tail] = pc + 1;
        }
        self.tail = pc;
        self.offsets[pc] = buf;
        self.len += 1;
        true
    }

    fn pop_front(&mut self) -> Option<(usize, usize)> {
        if self.is_empty() {
            return None;
        }
        let pc = self.head;
        if pc == self.tail {
            self.head = Self::NIL;
            self.tail = Self::NIL;
        } else {
            self.head = self.next[pc] - 1;
        }
        self.next[pc] = 0;
        self.len -= 1;
        Some((pc, self.offsets[pc]))
    }

    /// Keeps only the threads for which `f` returns true, preserving their
    /// order. The buffers of removed threads are released.
    fn retain<F>(&mut self, arena: &mut OffsetsArena, f: F)
    where
        F: Fn(&[Option<usize>]) -> bool,
    {
        for _ in 0..self.len {
            if let Some((pc, buf)) = self.pop_front() {
                if f(arena.get(buf)) {
                    self.push_back(pc, buf);
                } else {
                    arena.release(buf);
                }
            }
        }
    }

    fn clear(&mut self, arena: &mut OffsetsArena) {
        while let Some((_, buf)) = self.pop_front() {
            arena.release(buf);
        }
    }
}

/// Storage for the capture offsets of all the threads.
///
/// Each thread owns a buffer identified by an index. Buffers are slices of
/// a single vector, and released buffers are recycled, so the memory used
/// by the arena is proportional to the maximum number of threads alive at
/// the same time.
struct OffsetsArena {
    width: usize,
    slots: Vec<Option<usize>>,
    free: Vec<usize>,
}

impl OffsetsArena {
    fn new(width: usize) -> Self {
        Self { width, slots: Vec::new(), free: Vec::new() }
    }

    /// Returns a buffer where all the offsets are `None`.
    fn alloc(&mut self) -> usize {
        match self.free.pop() {
            Some(buf) => {
                self.slots[buf * self.width..(buf + 1) * self.width]
                    .fill(None);
                buf
            }
            None => {
                let buf = self.slots.len() / self.width;
                self.slots.resize(self.slots.len() + self.width, None);
                buf
            }
        }
    }

    /// Returns a new buffer with a copy of the offsets in `buf`.
    fn fork(&mut self, buf: usize) -> usize {
        let new = self.alloc();
        let src = buf * self.width;
        self.slots.copy_within(src..src + self.width, new * self.width);
        new
    }

    #[inline]
    fn release(&mut self, buf: usize) {
        self.free.push(buf);
    }

    #[inline]
    fn get(&self, buf: usize) -> &[Option<usize>] {
        &self.slots[buf * self.width..(buf + 1) * self.width]
    }

    #[inline]
    fn set(&mut self, buf: usize, i: usize, pos: usize) {
        self.slots[buf * self.width + i] = Some(pos);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{OffsetsArena, ThreadQueue};

    #[test]
    fn thread_queue() {
        let mut arena = OffsetsArena::new(2);
        let mut queue = ThreadQueue::new(10);

        assert!(queue.is_empty());

        let bufs: Vec<usize> = (0..4).map(|_| arena.alloc()).collect();

        assert!(queue.push_back(5, bufs[0]));
        assert!(queue.push_back(0, bufs[1]));
        assert!(queue.push_back(10, bufs[2]));
        assert!(!queue.push_back(5, bufs[3]));
        assert!(!queue.push_back(10, bufs[3]));

        arena.set(bufs[1], 0, 7);

        queue.retain(&mut arena, |offsets| offsets[0].is_none());

        assert_eq!(queue.pop_front(), Some((5, bufs[0])));
        assert_eq!(queue.pop_front(), Some((10, bufs[2])));
        assert_eq!(queue.pop_front(), None);
        assert!(queue.is_empty());

        // Locations can be scheduled again once they leave the queue.
        assert!(queue.push_back(5, bufs[0]));
        queue.clear(&mut arena);
        assert!(queue.is_empty());
    }

    #[test]
    fn offsets_arena() {
        let mut arena = OffsetsArena::new(4);

        let a = arena.alloc();
        arena.set(a, 1, 3);
        let b = arena.fork(a);
        arena.set(b, 2, 5);

        assert_eq!(arena.get(a), &[None, Some(3), None, None]);
        assert_eq!(arena.get(b), &[None, Some(3), Some(5), None]);

        arena.release(a);
        let c = arena.alloc();

        assert_eq!(c, a);
        assert_eq!(arena.get(c), &[None, None, None, None]);
    }
}
