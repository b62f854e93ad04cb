//! Argument value parsing: colors, ranged numbers, keywords, font specs
//! and file-extension detection.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::MarkupError;

/// An RGBA color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Parse a color argument.
///
/// Accepted forms are CSS named colors and `#` hex with 3, 6 or 8 digits
/// (3-digit expands per-nibble, 6-digit implies full opacity, 8-digit
/// carries alpha). Functional notations like `rgb()` are rejected.
pub fn parse_color(value: &str) -> Result<Color, MarkupError> {
    let trimmed = value.trim();
    let invalid = || MarkupError::InvalidColor {
        value: value.to_string(),
    };

    if let Some(hex) = trimmed.strip_prefix('#') {
        let digits_ok = hex.chars().all(|c| c.is_ascii_hexdigit());
        if !digits_ok || !matches!(hex.len(), 3 | 6 | 8) {
            return Err(invalid());
        }
    } else if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(invalid());
    }

    let parsed = csscolorparser::parse(trimmed).map_err(|_| invalid())?;
    let [r, g, b, a] = parsed.to_array();
    Ok(Color::rgba(r, g, b, a))
}

/// Parse a float argument within `[min, max]`.
pub fn parse_float(value: &str, min: f32, max: f32) -> Result<f32, MarkupError> {
    let parsed: f32 = value.trim().parse().map_err(|_| MarkupError::InvalidNumber {
        value: value.to_string(),
    })?;
    if parsed.is_nan() {
        return Err(MarkupError::InvalidNumber {
            value: value.to_string(),
        });
    }
    if parsed < min || parsed > max {
        return Err(MarkupError::OutOfRange {
            value: value.to_string(),
        });
    }
    Ok(parsed)
}

/// Parse an integer argument within `[min, max]`.
pub fn parse_int(value: &str, min: i32, max: i32) -> Result<i32, MarkupError> {
    let parsed: i64 = value.trim().parse().map_err(|_| MarkupError::InvalidNumber {
        value: value.to_string(),
    })?;
    if parsed < i64::from(min) || parsed > i64::from(max) {
        return Err(MarkupError::OutOfRange {
            value: value.to_string(),
        });
    }
    Ok(parsed as i32)
}

macro_rules! keyword_enum {
    ($(#[$doc:meta])* $name:ident, $what:literal, { $($kw:literal => $variant:ident),+ $(,)? }) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub enum $name {
            #[default]
            $($variant),+
        }

        impl FromStr for $name {
            type Err = MarkupError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($kw => Ok(Self::$variant),)+
                    _ => Err(MarkupError::InvalidKeyword {
                        what: $what,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl $name {
            /// The canonical keyword.
            pub fn keyword(self) -> &'static str {
                match self {
                    $(Self::$variant => $kw),+
                }
            }
        }
    };
}

keyword_enum!(
    /// Container main-axis direction. Defaults to `row`.
    Direction, "direction", {
        "row" => Row,
        "row-rev" => RowRev,
        "col" => Col,
        "col-rev" => ColRev,
    }
);

keyword_enum!(
    /// Container wrapping mode. Defaults to `no-wrap`.
    WrapMode, "wrap", {
        "no-wrap" => NoWrap,
        "wrap" => Wrap,
        "wrap-rev" => WrapRev,
    }
);

keyword_enum!(
    /// Text elision mode. Defaults to `none`.
    Ellipsize, "ellipsize mode", {
        "none" => None,
        "start" => Start,
        "middle" => Middle,
        "end" => End,
    }
);

keyword_enum!(
    /// Main-axis content distribution. Defaults to `start`.
    JustifyContent, "justify-content", {
        "start" => Start,
        "end" => End,
        "center" => Center,
        "space-between" => SpaceBetween,
        "space-around" => SpaceAround,
        "space-evenly" => SpaceEvenly,
    }
);

keyword_enum!(
    /// Cross-axis alignment, shared by `align-items` and `align-self`.
    /// Defaults to `auto`.
    Align, "alignment", {
        "auto" => Auto,
        "start" => Start,
        "end" => End,
        "center" => Center,
        "stretch" => Stretch,
    }
);

keyword_enum!(
    /// Stroke end-cap shape. Defaults to `butt`.
    LineCap, "line cap", {
        "butt" => Butt,
        "round" => Round,
        "square" => Square,
    }
);

keyword_enum!(
    /// Stroke corner shape. Defaults to `miter`.
    LineJoin, "line join", {
        "miter" => Miter,
        "round" => Round,
        "bevel" => Bevel,
    }
);

/// A resolved font description.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "Sans".to_string(),
            size: 12.0,
            bold: false,
            italic: false,
        }
    }
}

impl FontSpec {
    /// Parse a `"Family [Bold] [Italic] [size]"` description.
    ///
    /// The trailing token is the point size when numeric; `Bold` and
    /// `Italic`/`Oblique` style words before it fold into flags. An empty
    /// family falls back to `Sans`.
    pub fn parse(value: &str) -> Self {
        let mut tokens: Vec<&str> = value.split_whitespace().collect();
        let mut spec = Self::default();

        if let Some(last) = tokens.last() {
            if let Ok(size) = last.parse::<f32>() {
                if size > 0.0 && size.is_finite() {
                    spec.size = size;
                }
                tokens.pop();
            }
        }

        while let Some(last) = tokens.last() {
            match last.to_ascii_lowercase().as_str() {
                "bold" => spec.bold = true,
                "italic" | "oblique" => spec.italic = true,
                _ => break,
            }
            tokens.pop();
        }

        if !tokens.is_empty() {
            spec.family = tokens.join(" ");
        }
        spec
    }
}

impl fmt::Display for FontSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.family)?;
        if self.bold {
            write!(f, " Bold")?;
        }
        if self.italic {
            write!(f, " Italic")?;
        }
        write!(f, " {}", self.size)
    }
}

/// Image formats accepted by `^img{}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
}

/// Static output formats selected by the output path's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Svg,
}

fn extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

/// Classify an image path by extension.
pub fn image_kind(path: &str) -> Result<ImageKind, MarkupError> {
    match extension(path).as_deref() {
        Some("png") => Ok(ImageKind::Png),
        Some("jpg") | Some("jpeg") => Ok(ImageKind::Jpeg),
        _ => Err(MarkupError::UnsupportedExtension {
            path: path.to_string(),
            supported: "png, jpg, jpeg",
        }),
    }
}

/// Classify a static output path by extension.
pub fn output_format(path: &str) -> Result<OutputFormat, MarkupError> {
    match extension(path).as_deref() {
        Some("png") => Ok(OutputFormat::Png),
        Some("svg") => Ok(OutputFormat::Svg),
        _ => Err(MarkupError::UnsupportedExtension {
            path: path.to_string(),
            supported: "png, svg",
        }),
    }
}
