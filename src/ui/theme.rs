//! Design tokens for the treepick terminal UI.
//!
//! All icons used by the chooser are sourced from this module, with an
//! ASCII fallback for terminals without Unicode.

use dialoguer::theme::ColorfulTheme;

pub mod icons {
    // Filter states.
    pub const INCLUDED: &str = "●";
    pub const EXCLUDED: &str = "○";
    pub const PARTIAL: &str = "◐";

    // Tree expansion.
    pub const EXPAND: &str = "▼";
    pub const COLLAPSE: &str = "▶";

    pub const CURSOR: &str = "❯";
    pub const SEPARATOR: &str = "─";
}

pub mod icons_ascii {
    // Filter states.
    pub const INCLUDED: &str = "[x]";
    pub const EXCLUDED: &str = "[ ]";
    pub const PARTIAL: &str = "[-]";

    // Tree expansion.
    pub const EXPAND: &str = "[v]";
    pub const COLLAPSE: &str = "[>]";

    pub const CURSOR: &str = ">";
    pub const SEPARATOR: &str = "-";
}

/// Marker appended to nodes that carry notes
pub const NOTES_MARKER: &str = "*";

/// Icon set for the current terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyphs {
    unicode: bool,
}

impl Glyphs {
    pub fn new(unicode: bool) -> Self {
        Self { unicode }
    }

    fn pick(&self, unicode: &'static str, ascii: &'static str) -> &'static str {
        if self.unicode {
            unicode
        } else {
            ascii
        }
    }

    pub fn included(&self) -> &'static str {
        self.pick(icons::INCLUDED, icons_ascii::INCLUDED)
    }

    pub fn excluded(&self) -> &'static str {
        self.pick(icons::EXCLUDED, icons_ascii::EXCLUDED)
    }

    pub fn partial(&self) -> &'static str {
        self.pick(icons::PARTIAL, icons_ascii::PARTIAL)
    }

    pub fn expanded(&self) -> &'static str {
        self.pick(icons::EXPAND, icons_ascii::EXPAND)
    }

    pub fn collapsed(&self) -> &'static str {
        self.pick(icons::COLLAPSE, icons_ascii::COLLAPSE)
    }

    pub fn cursor(&self) -> &'static str {
        self.pick(icons::CURSOR, icons_ascii::CURSOR)
    }

    pub fn separator(&self) -> &'static str {
        self.pick(icons::SEPARATOR, icons_ascii::SEPARATOR)
    }
}

/// Theme for the notes prompt
pub fn prompt_theme() -> ColorfulTheme {
    ColorfulTheme::default()
}
