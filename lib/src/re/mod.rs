/*! This module parses, compiles, and executes regular expressions.

A regular expression in text form is first parsed by [`parser::Parser`],
which produces a [`hir::Tree`]: a tree of groups, each one with a list of
alternatives, where each alternative is a sequence of [`hir::Hir`] items.
The same parser takes care of escape sequences and character classes with
the help of the [`class`] module.

Then, given a [`hir::Tree`], the compiler in [`thompson`] produces code for a
[Pike VM][1], which is later executed for finding matches in some input.

[1]: https://swtch.com/~rsc/regexp/regexp2.html
*/

pub mod class;
pub mod hir;
pub mod parser;
pub mod thompson;
