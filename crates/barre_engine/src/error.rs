//! Evaluation and rendering errors.

use std::path::PathBuf;

use barre_markup::MarkupError;
use thiserror::Error;

/// Fatal errors raised while evaluating a line or realising its layout.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A `}` with no matching `{`.
    #[error("syntax error: unbalanced '}}'")]
    UnbalancedClose,

    /// A `{` left open at end of line.
    #[error("syntax error: unbalanced '{{'")]
    UnbalancedOpen,

    /// `^ca{}` wrapped around `^rule{}`.
    #[error("^rule{{}} is a non-clickable area")]
    ClickableRule,

    /// Inline text markup that failed to parse.
    #[error("invalid text markup: {0}")]
    BadMarkup(String),

    #[error(transparent)]
    Markup(#[from] MarkupError),

    #[error("failed to load image {path}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("layout failed: {0}")]
    Layout(#[from] taffy::TaffyError),
}
