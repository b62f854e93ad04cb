//! Inline text markup: `<b>`, `<i>` and `<span fg="...">` with the
//! usual `&amp;`/`&lt;`/`&gt;` entities.

use barre_markup::{parse_color, Color};

use crate::error::EngineError;

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub fg: Option<Color>,
    pub bold: bool,
    pub italic: bool,
}

impl Span {
    /// An unstyled run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fg: None,
            bold: false,
            italic: false,
        }
    }
}

/// Parse marked-up text into styled spans.
///
/// Tags nest; `</b>` must close the innermost open tag of its kind.
/// Unknown tags and mismatched closers are fatal.
pub fn parse_spans(input: &str) -> Result<Vec<Span>, EngineError> {
    let mut spans = Vec::new();
    let mut buf = String::new();
    let mut bold = 0usize;
    let mut italic = 0usize;
    let mut fg_stack: Vec<Color> = Vec::new();
    // Remembers which tag each open <span>/<b>/<i> was, for close matching.
    let mut open: Vec<Tag> = Vec::new();

    let flush = |buf: &mut String, bold: usize, italic: usize, fg: Option<Color>, spans: &mut Vec<Span>| {
        if !buf.is_empty() {
            spans.push(Span {
                text: std::mem::take(buf),
                fg,
                bold: bold > 0,
                italic: italic > 0,
            });
        }
    };

    let mut rest = input;
    while let Some(lt) = rest.find('<') {
        let (text, tail) = rest.split_at(lt);
        decode_entities(text, &mut buf)?;
        let gt = tail.find('>').ok_or_else(|| {
            EngineError::BadMarkup(format!("unterminated tag in {input:?}"))
        })?;
        let tag = &tail[1..gt];
        rest = &tail[gt + 1..];

        flush(&mut buf, bold, italic, fg_stack.last().copied(), &mut spans);
        match parse_tag(tag)? {
            TagEvent::Open(t) => {
                match t {
                    Tag::Bold => bold += 1,
                    Tag::Italic => italic += 1,
                    Tag::Fg(color) => fg_stack.push(color),
                }
                open.push(t);
            }
            TagEvent::Close(name) => {
                let top = open.pop().ok_or_else(|| {
                    EngineError::BadMarkup(format!("stray </{name}>"))
                })?;
                if top.name() != name {
                    return Err(EngineError::BadMarkup(format!(
                        "</{name}> closes <{}>",
                        top.name()
                    )));
                }
                match top {
                    Tag::Bold => bold -= 1,
                    Tag::Italic => italic -= 1,
                    Tag::Fg(_) => {
                        fg_stack.pop();
                    }
                }
            }
        }
    }
    decode_entities(rest, &mut buf)?;
    flush(&mut buf, bold, italic, fg_stack.last().copied(), &mut spans);

    if let Some(top) = open.last() {
        return Err(EngineError::BadMarkup(format!("unclosed <{}>", top.name())));
    }
    Ok(spans)
}

#[derive(Debug, Clone, Copy)]
enum Tag {
    Bold,
    Italic,
    Fg(Color),
}

impl Tag {
    fn name(self) -> &'static str {
        match self {
            Tag::Bold => "b",
            Tag::Italic => "i",
            Tag::Fg(_) => "span",
        }
    }
}

enum TagEvent {
    Open(Tag),
    Close(String),
}

fn parse_tag(tag: &str) -> Result<TagEvent, EngineError> {
    let tag = tag.trim();
    if let Some(name) = tag.strip_prefix('/') {
        return Ok(TagEvent::Close(name.trim().to_string()));
    }
    match tag {
        "b" => return Ok(TagEvent::Open(Tag::Bold)),
        "i" => return Ok(TagEvent::Open(Tag::Italic)),
        _ => {}
    }
    if let Some(attrs) = tag.strip_prefix("span") {
        let attrs = attrs.trim();
        let value = attrs
            .strip_prefix("fg=\"")
            .and_then(|v| v.strip_suffix('"'))
            .or_else(|| attrs.strip_prefix("fg='").and_then(|v| v.strip_suffix('\'')))
            .ok_or_else(|| EngineError::BadMarkup(format!("bad span attributes: {attrs:?}")))?;
        let color = parse_color(value)?;
        return Ok(TagEvent::Open(Tag::Fg(color)));
    }
    Err(EngineError::BadMarkup(format!("unknown tag <{tag}>")))
}

fn decode_entities(text: &str, out: &mut String) -> Result<(), EngineError> {
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        let (plain, tail) = rest.split_at(amp);
        out.push_str(plain);
        let semi = tail
            .find(';')
            .ok_or_else(|| EngineError::BadMarkup(format!("unterminated entity in {text:?}")))?;
        match &tail[1..semi] {
            "amp" => out.push('&'),
            "lt" => out.push('<'),
            "gt" => out.push('>'),
            other => {
                return Err(EngineError::BadMarkup(format!("unknown entity &{other};")));
            }
        }
        rest = &tail[semi + 1..];
    }
    out.push_str(rest);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        let spans = parse_spans("hello world").unwrap();
        assert_eq!(spans, vec![Span::plain("hello world")]);
    }

    #[test]
    fn test_bold_and_italic() {
        let spans = parse_spans("a<b>b<i>c</i></b>d").unwrap();
        assert_eq!(spans.len(), 4);
        assert_eq!(spans[0], Span::plain("a"));
        assert!(spans[1].bold && !spans[1].italic);
        assert!(spans[2].bold && spans[2].italic);
        assert_eq!(spans[3], Span::plain("d"));
    }

    #[test]
    fn test_span_fg() {
        let spans = parse_spans("<span fg=\"red\">hot</span>").unwrap();
        assert_eq!(spans.len(), 1);
        let fg = spans[0].fg.unwrap();
        assert_eq!((fg.r, fg.g, fg.b), (1.0, 0.0, 0.0));
    }

    #[test]
    fn test_entities() {
        let spans = parse_spans("1 &lt; 2 &amp;&amp; 3 &gt; 2").unwrap();
        assert_eq!(spans[0].text, "1 < 2 && 3 > 2");
    }

    #[test]
    fn test_errors() {
        assert!(parse_spans("<b>open").is_err());
        assert!(parse_spans("text</b>").is_err());
        assert!(parse_spans("<b>x</i>").is_err());
        assert!(parse_spans("<u>x</u>").is_err());
        assert!(parse_spans("bad &entity; here").is_err());
        assert!(parse_spans("<span fg=\"nope\">x</span>").is_err());
    }
}
