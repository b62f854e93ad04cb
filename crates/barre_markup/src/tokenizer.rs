//! Line tokenizer.
//!
//! One input line is scanned into a sequence of [`Op`] records. The scanner
//! never mutates or aliases the input: every argument is copied out, so the
//! operations outlive the line buffer they came from.

use memchr::{memchr, memchr3};

use crate::error::MarkupError;
use crate::op::{Op, OpKind};

/// Bounded-buffer policy: a longer line is a fatal error, never truncated.
pub const MAX_LINE_LEN: usize = 8192;

/// Scan one line into operations.
///
/// Grammar:
/// - a run of literal characters (anything but `^`, `{`, `}`) accumulates
///   into a text operation, flushed at a delimiter or end of line;
/// - `^name{argument}` with `name` matched case-sensitively against the
///   command table; the argument runs to the next `}`;
/// - bare `{` and `}` open and close nested containers.
///
/// Horizontal control whitespace (tab, vertical tab, form feed) inside
/// literal runs is normalized to a plain space.
pub fn tokenize(line: &str) -> Result<Vec<Op>, MarkupError> {
    if line.len() > MAX_LINE_LEN {
        return Err(MarkupError::LineTooLong {
            len: line.len(),
            max: MAX_LINE_LEN,
        });
    }

    let bytes = line.as_bytes();
    let mut ops = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'^' => {
                let name_start = pos + 1;
                let brace = memchr(b'{', &bytes[name_start..])
                    .map(|i| name_start + i)
                    .ok_or(MarkupError::MissingDelimiter { expected: '{' })?;
                let kind = OpKind::from_command(&line[name_start..brace])?;

                let arg_start = brace + 1;
                let close = memchr(b'}', &bytes[arg_start..])
                    .map(|i| arg_start + i)
                    .ok_or(MarkupError::MissingDelimiter { expected: '}' })?;
                ops.push(Op::new(kind, &line[arg_start..close]));
                pos = close + 1;
            }
            b'{' => {
                ops.push(Op::new(OpKind::Open, ""));
                pos += 1;
            }
            b'}' => {
                ops.push(Op::new(OpKind::Close, ""));
                pos += 1;
            }
            _ => {
                // Literal run up to the next delimiter. The delimiter itself
                // is re-examined as syntax on the next iteration, so pending
                // text is always flushed first.
                let end = memchr3(b'^', b'{', b'}', &bytes[pos..])
                    .map_or(bytes.len(), |i| pos + i);
                ops.push(Op::new(OpKind::Text, normalize_whitespace(&line[pos..end])));
                pos = end;
            }
        }
    }

    Ok(ops)
}

/// Replace horizontal control whitespace with a plain space.
fn normalize_whitespace(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\t' | '\u{b}' | '\u{c}' => ' ',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(ops: &[Op]) -> Vec<OpKind> {
        ops.iter().map(|op| op.kind).collect()
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(tokenize("").unwrap(), vec![]);
    }

    #[test]
    fn test_plain_text() {
        let ops = tokenize("hello world").unwrap();
        assert_eq!(ops, vec![Op::new(OpKind::Text, "hello world")]);
    }

    #[test]
    fn test_commands() {
        let ops = tokenize("^bg{black}^fg{white}^text{ hi }").unwrap();
        assert_eq!(
            ops,
            vec![
                Op::new(OpKind::Bg, "black"),
                Op::new(OpKind::Fg, "white"),
                Op::new(OpKind::TextCmd, " hi "),
            ]
        );
    }

    #[test]
    fn test_containers() {
        let ops = tokenize("{ ^text{a} ^text{b} }").unwrap();
        assert_eq!(
            kinds(&ops),
            vec![
                OpKind::Open,
                OpKind::Text,
                OpKind::TextCmd,
                OpKind::Text,
                OpKind::TextCmd,
                OpKind::Text,
                OpKind::Close,
            ]
        );
    }

    #[test]
    fn test_text_flushed_before_delimiter() {
        let ops = tokenize("ab^fg{red}").unwrap();
        assert_eq!(
            ops,
            vec![Op::new(OpKind::Text, "ab"), Op::new(OpKind::Fg, "red")]
        );
    }

    #[test]
    fn test_brace_inside_argument() {
        // An opening brace is plain data inside an argument; the argument
        // runs to the first closing brace.
        let ops = tokenize("^text{a{b}").unwrap();
        assert_eq!(ops, vec![Op::new(OpKind::TextCmd, "a{b")]);
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            tokenize("^nope{x}"),
            Err(MarkupError::UnknownCommand {
                name: "nope".into()
            })
        );
    }

    #[test]
    fn test_missing_delimiters() {
        assert_eq!(
            tokenize("^fg"),
            Err(MarkupError::MissingDelimiter { expected: '{' })
        );
        assert_eq!(
            tokenize("^fg{red"),
            Err(MarkupError::MissingDelimiter { expected: '}' })
        );
    }

    #[test]
    fn test_whitespace_normalized() {
        let ops = tokenize("a\tb\u{b}c").unwrap();
        assert_eq!(ops, vec![Op::new(OpKind::Text, "a b c")]);
    }

    #[test]
    fn test_line_too_long() {
        let line = "x".repeat(MAX_LINE_LEN + 1);
        assert!(matches!(
            tokenize(&line),
            Err(MarkupError::LineTooLong { .. })
        ));
    }

    #[test]
    fn test_reserialize_preserves_commands_and_args() {
        let line = "^ca{btn}{^fg{#ff0000}^text{X}}tail";
        let ops = tokenize(line).unwrap();
        let round: String = ops.iter().map(Op::to_string).collect();
        assert_eq!(round, "^ca{btn}{^fg{#ff0000}^text{X}}tail");
    }

    #[test]
    fn test_utf8_text_and_args() {
        let ops = tokenize("héllo^text{日本語}").unwrap();
        assert_eq!(
            ops,
            vec![
                Op::new(OpKind::Text, "héllo"),
                Op::new(OpKind::TextCmd, "日本語"),
            ]
        );
    }
}
