//! Evaluation: folding one line's operations into layout nodes and a
//! fresh Action generation.
//!
//! The layout tree lives only inside [`evaluate`]. Once the flex pass
//! has run, each node's resolved frame is copied into its Action and the
//! tree is dropped, so the returned buffer holds no engine-owned state.

use barre_markup::{
    parse_color, parse_float, parse_int, Align, Color, Direction, Ellipsize, FontSpec,
    JustifyContent, Op, OpKind, WrapMode,
};
use rustc_hash::FxHashMap;
use taffy::geometry::Rect as Edges;
use taffy::style::{
    AlignContent, AlignItems, AlignSelf, Dimension, FlexDirection, FlexWrap,
    JustifyContent as JustifyStyle, LengthPercentage, LengthPercentageAuto, Style,
};
use taffy::{AvailableSpace, NodeId, Size, TaffyTree};
use tracing::debug;

use crate::action::{Action, ActionKind, LineStyle};
use crate::error::EngineError;
use crate::geom::{Outline, Rect};
use crate::image::ImageCache;
use crate::text::{parse_spans, Span, TextSizer};

/// Per-line evaluation state. Created fresh for every input line.
///
/// Colors, font, margin, padding, ellipsize, basis and line style persist
/// across content operations; grow, shrink, order, align-self and the
/// clickable tag are consumed by the next node they apply to.
struct Context {
    margin: f32,
    padding: f32,
    fg: Color,
    bg: Color,
    font: FontSpec,
    ellipsize: Ellipsize,
    align_self: Align,
    grow: f32,
    shrink: f32,
    basis: Option<f32>,
    order: i32,
    line: LineStyle,
    ca: Option<String>,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            margin: 0.0,
            padding: 0.0,
            fg: Color::WHITE,
            bg: Color::BLACK,
            font: FontSpec::default(),
            ellipsize: Ellipsize::None,
            align_self: Align::Auto,
            grow: 0.0,
            shrink: 0.0,
            basis: None,
            order: 0,
            line: LineStyle::default(),
            ca: None,
        }
    }
}

impl Context {
    /// Consume the one-shot properties after they were applied to a node.
    fn reset_after_node(&mut self) {
        self.grow = 0.0;
        self.shrink = 0.0;
        self.order = 0;
        self.align_self = Align::Auto;
        self.ca = None;
    }

    /// Item-level style for the node about to be created.
    fn item_style(&self, width: f32, height: f32) -> Style {
        Style {
            size: Size {
                width: Dimension::Length(width + self.padding * 2.0),
                height: Dimension::Length(height + self.padding * 2.0),
            },
            margin: Edges {
                left: LengthPercentageAuto::Length(self.margin),
                right: LengthPercentageAuto::Length(self.margin),
                top: LengthPercentageAuto::Length(self.margin),
                bottom: LengthPercentageAuto::Length(self.margin),
            },
            padding: Edges {
                left: LengthPercentage::Length(self.padding),
                right: LengthPercentage::Length(self.padding),
                top: LengthPercentage::Length(self.padding),
                bottom: LengthPercentage::Length(self.padding),
            },
            flex_grow: self.grow,
            flex_shrink: self.shrink,
            flex_basis: self
                .basis
                .map(Dimension::Length)
                .unwrap_or(Dimension::Auto),
            align_self: align_self_style(self.align_self),
            ..Style::default()
        }
    }
}

/// An open `{` whose children are still being collected. Children are
/// buffered with their `^order{}` value and attached sorted at close.
struct OpenContainer {
    node: NodeId,
    style: Style,
    children: Vec<(i32, NodeId)>,
    size: (f32, f32),
}

/// An Action awaiting its geometry.
struct PendingAction {
    node: NodeId,
    margin: f32,
    padding: f32,
    bg: Color,
    name: Option<String>,
    kind: ActionKind,
}

/// Evaluate one line's operations against a bar of the given size.
///
/// Returns the new Action generation in declaration order. Any error is
/// fatal to the line and, per the protocol, to the process.
pub fn evaluate(
    ops: &[Op],
    bar_width: f32,
    bar_height: f32,
    sizer: &mut dyn TextSizer,
    images: &mut ImageCache,
) -> Result<Vec<Action>, EngineError> {
    let mut tree: TaffyTree<()> = TaffyTree::new();
    let root = tree.new_leaf(Style::default())?;

    let root_style = Style {
        flex_direction: FlexDirection::Row,
        align_items: Some(AlignItems::FlexEnd),
        align_content: Some(AlignContent::Center),
        size: Size {
            width: Dimension::Length(bar_width),
            height: Dimension::Length(bar_height),
        },
        ..Style::default()
    };

    let mut stack = vec![OpenContainer {
        node: root,
        style: root_style,
        children: Vec::new(),
        size: (bar_width, bar_height),
    }];
    let mut ctx = Context::default();
    let mut pending: Vec<PendingAction> = Vec::new();

    for op in ops {
        let arg = op.arg.as_str();
        match op.kind {
            OpKind::Open => {
                let parent_size = stack[stack.len() - 1].size;
                let mut style = ctx.item_style(0.0, 0.0);
                style.size = Size {
                    width: Dimension::Length(parent_size.0),
                    height: Dimension::Length(parent_size.1),
                };
                let node = tree.new_leaf(Style::default())?;
                let top = stack.len() - 1;
                stack[top].children.push((ctx.order, node));
                stack.push(OpenContainer {
                    node,
                    style,
                    children: Vec::new(),
                    size: parent_size,
                });
                ctx.reset_after_node();
            }
            OpKind::Close => {
                if stack.len() == 1 {
                    return Err(EngineError::UnbalancedClose);
                }
                let closed = stack.pop().ok_or(EngineError::UnbalancedClose)?;
                seal(&mut tree, closed)?;
            }

            OpKind::Ca => {
                ctx.ca = if arg.is_empty() {
                    None
                } else {
                    Some(arg.to_string())
                };
            }
            OpKind::Bg => ctx.bg = parse_color(arg)?,
            OpKind::Fg => ctx.fg = parse_color(arg)?,
            OpKind::Font => ctx.font = FontSpec::parse(arg),
            OpKind::Ellipsize => ctx.ellipsize = arg.parse()?,
            OpKind::AlignSelf => ctx.align_self = arg.parse()?,

            OpKind::Dir => {
                let dir: Direction = arg.parse()?;
                current(&mut stack).style.flex_direction = flex_direction(dir);
            }
            OpKind::Wrap => {
                let wrap: WrapMode = arg.parse()?;
                current(&mut stack).style.flex_wrap = flex_wrap(wrap);
            }
            OpKind::JustifyContent => {
                let justify: JustifyContent = arg.parse()?;
                current(&mut stack).style.justify_content = Some(justify_style(justify));
            }
            OpKind::AlignItems => {
                let align: Align = arg.parse()?;
                current(&mut stack).style.align_items = align_items_style(align);
            }

            OpKind::Grow => ctx.grow = parse_float(arg, 0.0, f32::INFINITY)?,
            OpKind::Shrink => ctx.shrink = parse_float(arg, 0.0, f32::INFINITY)?,
            OpKind::Order => ctx.order = parse_int(arg, 0, i32::MAX)?,
            OpKind::Basis => ctx.basis = Some(parse_float(arg, 0.0, f32::INFINITY)?),

            OpKind::LineCap => ctx.line.cap = arg.parse()?,
            OpKind::LineJoin => ctx.line.join = arg.parse()?,
            OpKind::LineOffset => ctx.line.offset = parse_float(arg, 0.0, f32::INFINITY)?,
            OpKind::LineWidth => ctx.line.width = parse_float(arg, 0.0, f32::INFINITY)?,
            OpKind::MiterLimit => ctx.line.miter_limit = parse_float(arg, 0.0, f32::INFINITY)?,

            OpKind::Img => {
                let surface = images.load(arg)?;
                let size = (surface.width as f32, surface.height as f32);
                let kind = ActionKind::Image { surface };
                push_content(&mut tree, &mut stack, &mut pending, &mut ctx, size, kind)?;
            }
            OpKind::Rule => {
                if ctx.ca.is_some() {
                    return Err(EngineError::ClickableRule);
                }
                let line_height = sizer.measure(&[Span::plain("M")], &ctx.font).1;
                if ctx.grow == 0.0 {
                    ctx.grow = 10.0;
                }
                let kind = ActionKind::Rule {
                    color: ctx.fg,
                    style: ctx.line,
                };
                let size = (line_height, line_height);
                push_content(&mut tree, &mut stack, &mut pending, &mut ctx, size, kind)?;
            }
            OpKind::Markup => {
                let spans = parse_spans(arg)?;
                let size = sizer.measure(&spans, &ctx.font);
                let kind = ActionKind::Text {
                    spans,
                    font: ctx.font.clone(),
                    color: ctx.fg,
                    ellipsize: ctx.ellipsize,
                };
                push_content(&mut tree, &mut stack, &mut pending, &mut ctx, size, kind)?;
            }
            OpKind::Text | OpKind::TextCmd => {
                // Bare literal runs between commands are often pure spacing;
                // those produce no node. An explicit `^text{}` always does.
                if op.kind == OpKind::Text && arg.chars().all(char::is_whitespace) {
                    continue;
                }
                let spans = vec![Span::plain(arg)];
                let size = sizer.measure(&spans, &ctx.font);
                let kind = ActionKind::Text {
                    spans,
                    font: ctx.font.clone(),
                    color: ctx.fg,
                    ellipsize: ctx.ellipsize,
                };
                push_content(&mut tree, &mut stack, &mut pending, &mut ctx, size, kind)?;
            }
        }
    }

    if stack.len() > 1 {
        return Err(EngineError::UnbalancedOpen);
    }
    let root_open = stack.pop().ok_or(EngineError::UnbalancedOpen)?;
    seal(&mut tree, root_open)?;

    tree.compute_layout(
        root,
        Size {
            width: AvailableSpace::Definite(bar_width),
            height: AvailableSpace::Definite(bar_height),
        },
    )?;

    // Frames out, tree dropped. Locations are parent-relative, so walk
    // accumulating absolute origins.
    let mut frames: FxHashMap<u64, Rect> = FxHashMap::default();
    let mut walk: Vec<(NodeId, (f32, f32))> = vec![(root, (0.0, 0.0))];
    while let Some((node, origin)) = walk.pop() {
        let layout = tree.layout(node)?;
        let x = origin.0 + layout.location.x;
        let y = origin.1 + layout.location.y;
        frames.insert(
            u64::from(node),
            Rect::new(x, y, layout.size.width, layout.size.height),
        );
        for child in tree.children(node)? {
            walk.push((child, (x, y)));
        }
    }

    debug!(ops = ops.len(), actions = pending.len(), "evaluated");

    Ok(pending
        .into_iter()
        .map(|p| Action {
            rect: frames.get(&u64::from(p.node)).copied().unwrap_or_default(),
            margin: Outline::uniform(p.margin),
            padding: Outline::uniform(p.padding),
            bg: p.bg,
            name: p.name,
            kind: p.kind,
        })
        .collect())
}

fn current<'a>(stack: &'a mut [OpenContainer]) -> &'a mut OpenContainer {
    let top = stack.len() - 1;
    &mut stack[top]
}

/// Create a content node, buffer it under the innermost container and
/// record its Action with geometry still unset.
fn push_content(
    tree: &mut TaffyTree<()>,
    stack: &mut [OpenContainer],
    pending: &mut Vec<PendingAction>,
    ctx: &mut Context,
    size: (f32, f32),
    kind: ActionKind,
) -> Result<(), EngineError> {
    let node = tree.new_leaf(ctx.item_style(size.0, size.1))?;
    let top = current(stack);
    top.children.push((ctx.order, node));
    pending.push(PendingAction {
        node,
        margin: ctx.margin,
        padding: ctx.padding,
        bg: ctx.bg,
        name: ctx.ca.take(),
        kind,
    });
    ctx.reset_after_node();
    Ok(())
}

/// Attach a closed container's children in `^order{}` order (stable, so
/// equal orders keep declaration order) and commit its final style.
fn seal(tree: &mut TaffyTree<()>, open: OpenContainer) -> Result<(), taffy::TaffyError> {
    let mut children = open.children;
    children.sort_by_key(|(order, _)| *order);
    for (_, child) in &children {
        tree.add_child(open.node, *child)?;
    }
    tree.set_style(open.node, open.style)
}

fn flex_direction(dir: Direction) -> FlexDirection {
    match dir {
        Direction::Row => FlexDirection::Row,
        Direction::RowRev => FlexDirection::RowReverse,
        Direction::Col => FlexDirection::Column,
        Direction::ColRev => FlexDirection::ColumnReverse,
    }
}

fn flex_wrap(wrap: WrapMode) -> FlexWrap {
    match wrap {
        WrapMode::NoWrap => FlexWrap::NoWrap,
        WrapMode::Wrap => FlexWrap::Wrap,
        WrapMode::WrapRev => FlexWrap::WrapReverse,
    }
}

fn justify_style(justify: JustifyContent) -> JustifyStyle {
    match justify {
        JustifyContent::Start => JustifyStyle::FlexStart,
        JustifyContent::End => JustifyStyle::FlexEnd,
        JustifyContent::Center => JustifyStyle::Center,
        JustifyContent::SpaceBetween => JustifyStyle::SpaceBetween,
        JustifyContent::SpaceAround => JustifyStyle::SpaceAround,
        JustifyContent::SpaceEvenly => JustifyStyle::SpaceEvenly,
    }
}

fn align_items_style(align: Align) -> Option<AlignItems> {
    match align {
        Align::Auto => None,
        Align::Start => Some(AlignItems::FlexStart),
        Align::End => Some(AlignItems::FlexEnd),
        Align::Center => Some(AlignItems::Center),
        Align::Stretch => Some(AlignItems::Stretch),
    }
}

fn align_self_style(align: Align) -> Option<AlignSelf> {
    align_items_style(align)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::FixedSizer;
    use barre_markup::tokenize;

    fn eval(line: &str, width: f32, height: f32) -> Result<Vec<Action>, EngineError> {
        let ops = tokenize(line).map_err(EngineError::Markup)?;
        let mut sizer = FixedSizer;
        let mut images = ImageCache::new();
        evaluate(&ops, width, height, &mut sizer, &mut images)
    }

    fn text_content(action: &Action) -> String {
        match &action.kind {
            ActionKind::Text { spans, .. } => spans.iter().map(|s| s.text.as_str()).collect(),
            other => panic!("not a text action: {other:?}"),
        }
    }

    #[test]
    fn test_single_text_action() {
        let actions = eval("^bg{black}^fg{white}^text{ hi }", 100.0, 20.0).unwrap();
        assert_eq!(actions.len(), 1);
        let action = &actions[0];
        assert_eq!(action.bg, Color::BLACK);
        assert_eq!(text_content(action), " hi ");
        match &action.kind {
            ActionKind::Text { color, .. } => assert_eq!(*color, Color::WHITE),
            _ => unreachable!(),
        }
        // 4 chars at 8px each.
        assert_eq!(action.rect.width, 32.0);
        assert_eq!(action.rect.height, 16.0);
    }

    #[test]
    fn test_explicit_text_matches_bare_run() {
        let bare = eval("hi", 100.0, 20.0).unwrap();
        let explicit = eval("^text{hi}", 100.0, 20.0).unwrap();
        assert_eq!(bare, explicit);
        // Explicit whitespace is deliberate spacing and keeps its node.
        assert_eq!(eval("^text{  }", 100.0, 20.0).unwrap().len(), 1);
    }

    #[test]
    fn test_clickable_tag_consumed() {
        let actions = eval("^ca{btn}^bg{red}^text{X}^text{Y}", 100.0, 20.0).unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].name.as_deref(), Some("btn"));
        assert_eq!(actions[1].name, None);
    }

    #[test]
    fn test_colors_persist() {
        let actions = eval("^fg{red}^text{a}^text{b}", 100.0, 20.0).unwrap();
        for action in &actions {
            match &action.kind {
                ActionKind::Text { color, .. } => {
                    assert_eq!((color.r, color.g, color.b), (1.0, 0.0, 0.0));
                }
                _ => unreachable!(),
            }
        }
    }

    #[test]
    fn test_rule_grows_by_default() {
        let actions = eval("^rule{}", 100.0, 20.0).unwrap();
        assert_eq!(actions.len(), 1);
        assert!(matches!(actions[0].kind, ActionKind::Rule { .. }));
        // Sole child with implicit grow takes the whole row.
        assert_eq!(actions[0].rect.width, 100.0);
    }

    #[test]
    fn test_grow_resets_after_rule() {
        // Rule flexes, the following text keeps its natural width.
        let actions = eval("^grow{2.0}^rule{}^text{ab}", 100.0, 20.0).unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[1].rect.width, 16.0);
        assert_eq!(actions[0].rect.width, 84.0);
    }

    #[test]
    fn test_container_children() {
        let actions = eval("{ ^text{a} ^text{b} }", 100.0, 20.0).unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(text_content(&actions[0]), "a");
        assert_eq!(text_content(&actions[1]), "b");
    }

    #[test]
    fn test_unbalanced_close() {
        assert!(matches!(
            eval("^text{a}}", 100.0, 20.0),
            Err(EngineError::UnbalancedClose)
        ));
    }

    #[test]
    fn test_unbalanced_open() {
        assert!(matches!(
            eval("{^text{a}", 100.0, 20.0),
            Err(EngineError::UnbalancedOpen)
        ));
    }

    #[test]
    fn test_clickable_rule_rejected() {
        assert!(matches!(
            eval("^ca{x}^rule{}", 100.0, 20.0),
            Err(EngineError::ClickableRule)
        ));
    }

    #[test]
    fn test_order_sorts_children() {
        let actions = eval("^order{2}^text{a}^order{1}^text{b}", 100.0, 20.0).unwrap();
        // Declaration order in the buffer, layout order by ^order{}.
        assert_eq!(text_content(&actions[0]), "a");
        assert_eq!(text_content(&actions[1]), "b");
        assert!(actions[1].rect.x < actions[0].rect.x);
    }

    #[test]
    fn test_idempotent_geometry() {
        let line = "^fg{red}{ ^text{abc} ^grow{1}^rule{} }^text{tail}";
        let first = eval(line, 300.0, 24.0).unwrap();
        let second = eval(line, 300.0, 24.0).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_bad_color_is_fatal() {
        assert!(eval("^fg{chartreuse-ish}^text{a}", 100.0, 20.0).is_err());
    }

    #[test]
    fn test_ellipsize_recorded() {
        let actions = eval("^ellipsize{end}^text{abc}", 100.0, 20.0).unwrap();
        match &actions[0].kind {
            ActionKind::Text { ellipsize, .. } => assert_eq!(*ellipsize, Ellipsize::End),
            _ => unreachable!(),
        }
    }
}
