//! Operations produced by the tokenizer.

use std::fmt;

use crate::error::MarkupError;

/// The kind of a single markup operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    /// `{` — open a nested flex container.
    Open,
    /// `}` — close the innermost open container.
    Close,
    /// `^ca{name}` — tag the next content node as a clickable area.
    Ca,
    /// `^bg{color}`
    Bg,
    /// `^fg{color}`
    Fg,
    /// `^font{family size}`
    Font,
    /// `^dir{row|row-rev|col|col-rev}` — current container direction.
    Dir,
    /// `^wrap{no-wrap|wrap|wrap-rev}`
    Wrap,
    /// `^ellipsize{none|start|middle|end}`
    Ellipsize,
    /// `^justify-content{…}` — current container main-axis distribution.
    JustifyContent,
    /// `^align-items{…}` — current container cross-axis alignment.
    AlignItems,
    /// `^align-self{…}` — next node's cross-axis alignment.
    AlignSelf,
    /// `^grow{float}`
    Grow,
    /// `^shrink{float}`
    Shrink,
    /// `^order{int}`
    Order,
    /// `^basis{float}`
    Basis,
    /// `^line-cap{butt|round|square}`
    LineCap,
    /// `^line-join{miter|round|bevel}`
    LineJoin,
    /// `^line-offset{float}` — dash phase.
    LineOffset,
    /// `^line-width{float}`
    LineWidth,
    /// `^miter-limit{float}`
    MiterLimit,
    /// `^img{path}`
    Img,
    /// `^rule{}` — horizontal divider sized to the font's line height.
    Rule,
    /// `^markup{spans}` — marked-up text.
    Markup,
    /// `^text{…}` — explicit text. Evaluates exactly like a literal run
    /// but keeps its command form when re-serialized.
    TextCmd,
    /// A literal text run.
    Text,
}

/// Command table. Names are matched case-sensitively.
static COMMANDS: phf::Map<&'static str, OpKind> = phf::phf_map! {
    "ca" => OpKind::Ca,
    "bg" => OpKind::Bg,
    "fg" => OpKind::Fg,
    "font" => OpKind::Font,
    "dir" => OpKind::Dir,
    "wrap" => OpKind::Wrap,
    "ellipsize" => OpKind::Ellipsize,
    "justify-content" => OpKind::JustifyContent,
    "align-items" => OpKind::AlignItems,
    "align-self" => OpKind::AlignSelf,
    "grow" => OpKind::Grow,
    "shrink" => OpKind::Shrink,
    "order" => OpKind::Order,
    "basis" => OpKind::Basis,
    "line-cap" => OpKind::LineCap,
    "line-join" => OpKind::LineJoin,
    "line-offset" => OpKind::LineOffset,
    "line-width" => OpKind::LineWidth,
    "miter-limit" => OpKind::MiterLimit,
    "img" => OpKind::Img,
    "rule" => OpKind::Rule,
    "markup" => OpKind::Markup,
    "text" => OpKind::TextCmd,
};

impl OpKind {
    /// Look a command name up in the fixed table.
    pub fn from_command(name: &str) -> Result<Self, MarkupError> {
        COMMANDS.get(name).copied().ok_or(MarkupError::UnknownCommand {
            name: name.to_string(),
        })
    }

    /// The canonical command name, or `None` for the forms that have none
    /// (container delimiters and literal runs).
    pub fn command(self) -> Option<&'static str> {
        match self {
            OpKind::Open | OpKind::Close | OpKind::Text => None,
            OpKind::Ca => Some("ca"),
            OpKind::Bg => Some("bg"),
            OpKind::Fg => Some("fg"),
            OpKind::Font => Some("font"),
            OpKind::Dir => Some("dir"),
            OpKind::Wrap => Some("wrap"),
            OpKind::Ellipsize => Some("ellipsize"),
            OpKind::JustifyContent => Some("justify-content"),
            OpKind::AlignItems => Some("align-items"),
            OpKind::AlignSelf => Some("align-self"),
            OpKind::Grow => Some("grow"),
            OpKind::Shrink => Some("shrink"),
            OpKind::Order => Some("order"),
            OpKind::Basis => Some("basis"),
            OpKind::LineCap => Some("line-cap"),
            OpKind::LineJoin => Some("line-join"),
            OpKind::LineOffset => Some("line-offset"),
            OpKind::LineWidth => Some("line-width"),
            OpKind::MiterLimit => Some("miter-limit"),
            OpKind::Img => Some("img"),
            OpKind::Rule => Some("rule"),
            OpKind::Markup => Some("markup"),
            OpKind::TextCmd => Some("text"),
        }
    }
}

/// One `(operation, argument)` pair. Immutable once produced; the argument
/// is an owned copy, never a view into the input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Op {
    pub kind: OpKind,
    pub arg: String,
}

impl Op {
    pub fn new(kind: OpKind, arg: impl Into<String>) -> Self {
        Self {
            kind,
            arg: arg.into(),
        }
    }
}

impl fmt::Display for Op {
    /// Re-serialize to source form. Round-trips everything the tokenizer
    /// accepted except the whitespace normalization it already applied.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            OpKind::Open => f.write_str("{"),
            OpKind::Close => f.write_str("}"),
            // Literal runs serialize bare.
            OpKind::Text => f.write_str(&self.arg),
            kind => match kind.command() {
                Some(name) => write!(f, "^{}{{{}}}", name, self.arg),
                None => Ok(()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_lookup() {
        assert_eq!(OpKind::from_command("fg"), Ok(OpKind::Fg));
        assert_eq!(
            OpKind::from_command("justify-content"),
            Ok(OpKind::JustifyContent)
        );
        assert!(matches!(
            OpKind::from_command("Fg"),
            Err(MarkupError::UnknownCommand { .. })
        ));
    }

    #[test]
    fn test_command_names_round_trip() {
        for (name, kind) in COMMANDS.entries() {
            assert_eq!(kind.command(), Some(*name));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Op::new(OpKind::Fg, "red").to_string(), "^fg{red}");
        assert_eq!(Op::new(OpKind::Open, "").to_string(), "{");
        assert_eq!(Op::new(OpKind::Text, "hi").to_string(), "hi");
        assert_eq!(Op::new(OpKind::TextCmd, "hi").to_string(), "^text{hi}");
    }
}
