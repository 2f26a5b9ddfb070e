/*! A regular expression engine based on the Pike VM, written in Rust.

Regular expressions are compiled into code for a [Pike VM][1], which finds
matches in time proportional to the length of the input times the size of
the pattern, without backtracking. The supported syntax is similar to the
one of Java's `java.util.regex`: character classes with unions and
intersections, greedy and lazy quantifiers, capture groups, lookahead and
lookbehind assertions, and word boundaries.

There are two main types in this crate: [`Pattern`] and [`Matcher`]. A
pattern is the compiled form of a regular expression, and a matcher uses a
pattern for finding matches in some input. A pattern can be shared by any
number of matchers.

# Example

```rust
# use pikere;
// Compile a regular expression.
let pattern = pikere::Pattern::compile(r"(\w+)=(\d+)").unwrap();

// Find all the matches in some input.
let mut matcher = pattern.matcher("a=1, b=22");
let mut pairs = vec![];

while matcher.find() {
    pairs.push((
        matcher.group(1).unwrap().unwrap(),
        matcher.group(2).unwrap().unwrap(),
    ));
}

assert_eq!(pairs, vec![("a", "1"), ("b", "22")]);
```

[1]: https://swtch.com/~rsc/regexp/regexp2.html
*/

#![deny(missing_docs)]

pub use errors::CompileError;
pub use errors::MatchError;

pub use matcher::Matcher;

pub use pattern::Pattern;
pub use pattern::PatternBuilder;

pub use re::class::CharacterMatcher;

mod errors;
mod matcher;
mod pattern;
mod re;

#[cfg(test)]
mod tests;
