//! Markup-level errors.
//!
//! Every error here is fatal: the input stream is a control protocol, not a
//! tolerant document format, so a malformed line terminates the process
//! after a single-line diagnostic.

use thiserror::Error;

/// Errors raised while tokenizing a line or parsing command arguments.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarkupError {
    /// A `^name{}` command not present in the command table.
    #[error("^{name}{{}}: unrecognised command")]
    UnknownCommand { name: String },

    /// A `^name` without `{`, or an argument without a closing `}`.
    #[error("syntax error: missing '{expected}'")]
    MissingDelimiter { expected: char },

    /// Input line exceeds the bounded-buffer limit. Never truncated.
    #[error("input line exceeds {max} bytes ({len})")]
    LineTooLong { len: usize, max: usize },

    /// Not a named CSS color or a 3/6/8-digit `#` hex form.
    #[error("{value}: invalid color")]
    InvalidColor { value: String },

    /// Malformed numeric argument.
    #[error("{value}: invalid number")]
    InvalidNumber { value: String },

    /// Numeric argument outside its permitted range.
    #[error("{value}: out of range")]
    OutOfRange { value: String },

    /// A keyword argument outside its enum's vocabulary.
    #[error("{value}: unrecognised {what}")]
    InvalidKeyword { what: &'static str, value: String },

    /// File extension not in the supported set for its role.
    #[error("{path}: unsupported file extension (supported: {supported})")]
    UnsupportedExtension {
        path: String,
        supported: &'static str,
    },
}
