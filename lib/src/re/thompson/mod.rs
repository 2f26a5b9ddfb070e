/*! A regexp compiler based on the [Thompson's construction][1] algorithm that
produces code for the Pike VM described in Russ Cox's article
[Regular Expression Matching: the Virtual Machine Approach][2].

Besides the classic instructions (literal characters, character classes,
splits and jumps), the VM supports zero-width assertions and lookarounds.
Each lookaround is compiled into an independent program that is executed by
a nested [`PikeVM`] at the position where the assertion is evaluated.
Lookbehinds are executed right to left, their code is [reversed][3] after
being compiled, so that it matches the reversed input.

Repetitions like `(?:ab){2,4}` are expanded as `abab(?:ab(?:ab)?)?`, the number
of repetitions is bounded by the parser, and the total size of a program by
[`compiler::MAX_CODE_LEN`].

[1]: https://en.wikipedia.org/wiki/Thompson%27s_construction
[2]: https://swtch.com/~rsc/regexp/regexp2.html
[3]: PikeVM::reverse
*/

pub(crate) use compiler::Compiler;
pub(crate) use pikevm::PikeVM;

pub(crate) mod compiler;
pub(crate) mod instr;
mod pikevm;
