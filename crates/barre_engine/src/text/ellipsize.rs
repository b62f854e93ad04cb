//! Text elision for runs that overflow their layout box.

use barre_markup::Ellipsize;

const ELLIPSIS: char = '\u{2026}';

/// Shorten `text` until `measure` reports it fits in `max_width`,
/// replacing the removed region with an ellipsis.
///
/// Returns the input unchanged when it already fits or when the mode is
/// `None`. A box too narrow for even the ellipsis yields the bare
/// ellipsis.
pub fn elide(
    text: &str,
    mode: Ellipsize,
    max_width: f32,
    measure: &mut dyn FnMut(&str) -> f32,
) -> String {
    if mode == Ellipsize::None || measure(text) <= max_width {
        return text.to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    // Drop one more character per iteration until the elided form fits.
    for keep in (0..chars.len()).rev() {
        let candidate = match mode {
            Ellipsize::None => unreachable!(),
            Ellipsize::End => {
                let mut s: String = chars[..keep].iter().collect();
                s.push(ELLIPSIS);
                s
            }
            Ellipsize::Start => {
                let mut s = String::from(ELLIPSIS);
                s.extend(&chars[chars.len() - keep..]);
                s
            }
            Ellipsize::Middle => {
                let head = keep / 2 + keep % 2;
                let mut s: String = chars[..head].iter().collect();
                s.push(ELLIPSIS);
                s.extend(&chars[chars.len() - keep / 2..]);
                s
            }
        };
        if measure(&candidate) <= max_width {
            return candidate;
        }
    }
    ELLIPSIS.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    // 8px per char keeps the arithmetic obvious.
    fn measure(s: &str) -> f32 {
        s.chars().count() as f32 * 8.0
    }

    #[test]
    fn test_fits_untouched() {
        let out = elide("short", Ellipsize::End, 100.0, &mut measure);
        assert_eq!(out, "short");
    }

    #[test]
    fn test_none_never_elides() {
        let out = elide("way too long for the box", Ellipsize::None, 8.0, &mut measure);
        assert_eq!(out, "way too long for the box");
    }

    #[test]
    fn test_end() {
        // 5 chars fit: 4 kept + ellipsis.
        let out = elide("abcdefgh", Ellipsize::End, 40.0, &mut measure);
        assert_eq!(out, "abcd\u{2026}");
    }

    #[test]
    fn test_start() {
        let out = elide("abcdefgh", Ellipsize::Start, 40.0, &mut measure);
        assert_eq!(out, "\u{2026}efgh");
    }

    #[test]
    fn test_middle() {
        let out = elide("abcdefgh", Ellipsize::Middle, 40.0, &mut measure);
        assert_eq!(out, "ab\u{2026}gh");
    }

    #[test]
    fn test_too_narrow() {
        let out = elide("abcdefgh", Ellipsize::End, 4.0, &mut measure);
        assert_eq!(out, "\u{2026}");
    }
}
