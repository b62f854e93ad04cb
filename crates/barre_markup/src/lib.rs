//! Line-oriented markup for describing a single status-bar row.
//!
//! Each input line is a sequence of `^command{argument}` forms, bare `{`
//! and `}` container delimiters, and literal text runs. [`tokenize`]
//! turns a line into a flat [`Op`] stream; [`value`] parses the argument
//! vocabulary (colors, ranged numbers, keywords, font descriptions).

pub mod error;
pub mod op;
pub mod tokenizer;
pub mod value;

pub use error::MarkupError;
pub use op::{Op, OpKind};
pub use tokenizer::{tokenize, MAX_LINE_LEN};
pub use value::{
    image_kind, output_format, parse_color, parse_float, parse_int, Align, Color, Direction,
    Ellipsize, FontSpec, ImageKind, JustifyContent, LineCap, LineJoin, OutputFormat, WrapMode,
};
