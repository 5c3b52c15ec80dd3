// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

/// One character cell of the boot screen surface. The backdrop color is
/// frame-wide (the glow), so cells only carry glyph and foreground attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bold: bool,
    pub dim: bool,
}

impl Cell {
    pub fn blank() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bold: false,
            dim: false,
        }
    }

    pub fn glyph(ch: char, fg: Option<Color>) -> Self {
        Self {
            ch,
            fg,
            bold: false,
            dim: false,
        }
    }
}
