//! Status-bar evaluation engine: folds a tokenized markup line into a
//! flexbox layout, snapshots the computed geometry into self-contained
//! render Actions, and rasterizes or hit-tests those Actions.
//!
//! The layout tree is transient; everything downstream of [`evaluate`]
//! works on the flat [`Action`] buffer, which is safe to share across
//! threads once published.

pub mod action;
pub mod error;
pub mod eval;
pub mod geom;
pub mod hit;
pub mod image;
pub mod raster;
pub mod text;

pub use action::{Action, ActionKind, LineStyle, RgbaSurface};
pub use error::EngineError;
pub use eval::evaluate;
pub use geom::{Outline, Rect};
pub use hit::hit_test;
pub use image::ImageCache;
pub use raster::{paint, Frame};
pub use text::{CosmicSizer, Span, TextSizer};
