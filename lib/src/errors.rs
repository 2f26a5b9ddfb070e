use thiserror::Error;

/// Errors returned while compiling a regular expression.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum CompileError {
    /// The regular expression is malformed. `index` is the byte offset
    /// within `pattern` where the problem was detected.
    #[error("{msg} at index {index} in `{pattern}`")]
    SyntaxError {
        /// Description of the problem.
        msg: String,
        /// Byte offset within `pattern`.
        index: usize,
        /// The regular expression.
        pattern: String,
    },

    /// The regular expression is well-formed, but uses some construct that
    /// is not implemented by this engine, like backreferences or named
    /// groups.
    #[error("{feature} not supported (at index {index} in `{pattern}`)")]
    Unsupported {
        /// The unsupported construct.
        feature: String,
        /// Byte offset within `pattern`.
        index: usize,
        /// The regular expression.
        pattern: String,
    },

    /// Compilation flags are not supported, the only accepted value is 0.
    #[error("unsupported flags: {0:#x}")]
    UnsupportedFlags(u32),

    /// The regular expression produces a program that is too large.
    #[error("regexp too large")]
    TooLarge,
}

/// Errors returned by [`crate::Matcher`] when querying match results.
#[derive(Error, Debug, Clone, Copy, Eq, PartialEq)]
#[non_exhaustive]
pub enum MatchError {
    /// There is no current match, either because no search has been
    /// performed yet or because the last one failed.
    #[error("no match available")]
    NoMatch,

    /// The requested capture group doesn't exist.
    #[error("no group {group}, the pattern has {count} groups")]
    NoSuchGroup {
        /// The requested group.
        group: usize,
        /// Number of groups in the pattern.
        count: usize,
    },

    /// The offset passed to [`crate::Matcher::find_at`] is beyond the end
    /// of the input, or it is not at a character boundary.
    #[error("invalid offset {offset} for input of length {len}")]
    InvalidOffset {
        /// The offset.
        offset: usize,
        /// Length of the input in bytes.
        len: usize,
    },
}

impl CompileError {
    pub(crate) fn syntax<M: Into<String>>(
        pattern: &str,
        index: usize,
        msg: M,
    ) -> Self {
        Self::SyntaxError {
            msg: msg.into(),
            index,
            pattern: pattern.to_string(),
        }
    }

    pub(crate) fn unsupported<F: Into<String>>(
        pattern: &str,
        index: usize,
        feature: F,
    ) -> Self {
        Self::Unsupported {
            feature: feature.into(),
            index,
            pattern: pattern.to_string(),
        }
    }
}
