use std::fmt;

use crate::density::DensityGrid;

pub const MARK_CHAR: char = '*';
pub const BLANK_CHAR: char = ' ';
pub const ANSI_GREEN: &str = "\x1b[32m";
pub const ANSI_RESET: &str = "\x1b[0m";

/// Character grid produced from a [`DensityGrid`], plus its text form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMap {
    width: usize,
    height: usize,
    symbols: Vec<char>,
    text: String,
}

impl RenderedMap {
    /// Marks every cell with a positive density and serializes the rows, each
    /// terminated by `'\n'`. With `color_enabled` every mark is wrapped in ANSI
    /// green/reset codes.
    pub fn from_grid(grid: &DensityGrid, color_enabled: bool) -> Self {
        let (width, height) = (grid.width(), grid.height());
        let symbols: Vec<char> = grid
            .rows()
            .flat_map(|row| row.iter())
            .map(|&density| if density > 0 { MARK_CHAR } else { BLANK_CHAR })
            .collect();

        let text = serialize(&symbols, width, height, color_enabled);

        Self {
            width,
            height,
            symbols,
            text,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn symbol(&self, row: usize, col: usize) -> Option<char> {
        if row >= self.height || col >= self.width {
            return None;
        }
        Some(self.symbols[row * self.width + col])
    }

    pub fn mark_count(&self) -> usize {
        self.symbols.iter().filter(|&&c| c == MARK_CHAR).count()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for RenderedMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn serialize(symbols: &[char], width: usize, height: usize, color_enabled: bool) -> String {
    let mut capacity = (width + 1) * height;
    if color_enabled {
        let marks = symbols.iter().filter(|&&c| c != BLANK_CHAR).count();
        capacity += marks * (ANSI_GREEN.len() + ANSI_RESET.len());
    }

    let mut out = String::with_capacity(capacity);
    for row in symbols.chunks(width.max(1)).take(height) {
        for &symbol in row {
            if color_enabled && symbol != BLANK_CHAR {
                out.push_str(ANSI_GREEN);
                out.push(symbol);
                out.push_str(ANSI_RESET);
            } else {
                out.push(symbol);
            }
        }
        out.push('\n');
    }
    out
}
