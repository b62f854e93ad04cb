//! Messages exchanged between the reader, coordinator and window
//! threads over one ordered channel.

use std::fmt;

use barre_markup::MarkupError;
use bitflags::bitflags;

bitflags! {
    /// Keyboard modifiers held during a button press.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CTRL  = 1 << 1;
        const ALT   = 1 << 2;
        const SUPER = 1 << 3;
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        let mut sep = "";
        for (name, flag) in [
            ("shift", Modifiers::SHIFT),
            ("ctrl", Modifiers::CTRL),
            ("alt", Modifiers::ALT),
            ("super", Modifiers::SUPER),
        ] {
            if self.contains(flag) {
                write!(f, "{sep}{name}")?;
                sep = "+";
            }
        }
        Ok(())
    }
}

/// One event for the coordinator, processed strictly in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// The pending-operations buffer was repopulated from a new line.
    NewInput,
    /// The window changed size.
    Resized { width: u32, height: u32 },
    /// A pointer press, to be hit-tested against the current generation.
    ButtonPress {
        x: f32,
        y: f32,
        button: u8,
        modifiers: Modifiers,
    },
    /// The window needs repainting from the current generation.
    Paint,
    /// Orderly shutdown (end of input in static mode, quit key, window
    /// close).
    Exit,
    /// The reader hit a fatal parse error; the process must terminate.
    Fatal(MarkupError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_display() {
        assert_eq!(Modifiers::empty().to_string(), "-");
        assert_eq!(Modifiers::SHIFT.to_string(), "shift");
        assert_eq!((Modifiers::CTRL | Modifiers::ALT).to_string(), "ctrl+alt");
    }
}
