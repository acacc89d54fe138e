//! Cell, header and sum-bar presentation.

use std::fmt;

/// Horizontal alignment inside a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// Pad on the right.
    #[default]
    Left,
    /// Pad on the left.
    Right,
    /// Pad on both sides.
    Center,
}

impl Align {
    /// Parses `left`, `right` or `center`.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "left" => Some(Align::Left),
            "right" => Some(Align::Right),
            "center" | "centre" => Some(Align::Center),
            _ => None,
        }
    }
}

/// Backend-neutral color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum GridColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    Gray,
    DarkGray,
    White,
    Rgb(u8, u8, u8),
}

impl GridColor {
    /// Parses a color name (`red`, `darkgray`, ...) or a `#rrggbb` hex string.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(hex) = text.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return None;
            }
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            return Some(GridColor::Rgb(r, g, b));
        }
        let color = match text.to_ascii_lowercase().replace(['_', '-', ' '], "").as_str() {
            "black" => GridColor::Black,
            "red" => GridColor::Red,
            "green" => GridColor::Green,
            "yellow" => GridColor::Yellow,
            "blue" => GridColor::Blue,
            "magenta" | "purple" => GridColor::Magenta,
            "cyan" => GridColor::Cyan,
            "gray" | "grey" => GridColor::Gray,
            "darkgray" | "darkgrey" => GridColor::DarkGray,
            "white" => GridColor::White,
            _ => return None,
        };
        Some(color)
    }

    /// RGB components, for backends without a named palette.
    #[must_use]
    pub fn to_rgb(self) -> (u8, u8, u8) {
        match self {
            GridColor::Black => (0, 0, 0),
            GridColor::Red => (205, 49, 49),
            GridColor::Green => (13, 188, 121),
            GridColor::Yellow => (229, 229, 16),
            GridColor::Blue => (36, 114, 200),
            GridColor::Magenta => (188, 63, 188),
            GridColor::Cyan => (17, 168, 205),
            GridColor::Gray => (192, 192, 192),
            GridColor::DarkGray => (102, 102, 102),
            GridColor::White => (255, 255, 255),
            GridColor::Rgb(r, g, b) => (r, g, b),
        }
    }
}

impl fmt::Display for GridColor {
    /// Formats as `#rrggbb`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b) = self.to_rgb();
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

/// Presentation of a cell, header or sum item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GridStyle {
    /// Alignment.
    pub align: Align,
    /// Foreground color.
    pub fg: Option<GridColor>,
    /// Background color.
    pub bg: Option<GridColor>,
    /// Bold text.
    pub bold: bool,
    /// Italic text.
    pub italic: bool,
    /// Underlined text.
    pub underline: bool,
    /// Struck-through text.
    pub strikethrough: bool,
    /// Draw a `|` separator after the cell.
    pub border: bool,
    /// Text prepended to every value.
    pub prefix: String,
    /// Text appended to every value.
    pub suffix: String,
}

impl GridStyle {
    /// Left-aligned, uncolored style.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default column header style.
    #[must_use]
    pub fn header() -> Self {
        Self::new().align(Align::Center).fg(GridColor::Black).bg(GridColor::DarkGray).bold(true)
    }

    /// Default sum bar style.
    #[must_use]
    pub fn sum_bar() -> Self {
        Self::new().align(Align::Right).fg(GridColor::Black).bg(GridColor::DarkGray).bold(true)
    }

    /// Sets alignment.
    #[must_use]
    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Sets foreground color.
    #[must_use]
    pub fn fg(mut self, color: GridColor) -> Self {
        self.fg = Some(color);
        self
    }

    /// Sets background color.
    #[must_use]
    pub fn bg(mut self, color: GridColor) -> Self {
        self.bg = Some(color);
        self
    }

    /// Sets bold.
    #[must_use]
    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Sets italic.
    #[must_use]
    pub fn italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    /// Sets the cell border.
    #[must_use]
    pub fn border(mut self, border: bool) -> Self {
        self.border = border;
        self
    }

    /// Sets the prefix.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the suffix.
    #[must_use]
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Decorates `raw` with prefix and suffix.
    #[must_use]
    pub fn decorate(&self, raw: &str) -> String {
        format!("{}{}{}", self.prefix, raw, self.suffix)
    }

    /// Decorates, truncates and pads `raw` to exactly `width` characters.
    ///
    /// With a border the last character is a `|`.
    #[must_use]
    pub fn fit(&self, raw: &str, width: usize) -> String {
        if width == 0 {
            return String::new();
        }
        let inner = if self.border { width - 1 } else { width };
        let text: String = self.decorate(raw).chars().take(inner).collect();
        let len = text.chars().count();
        let pad = inner - len;
        let mut out = match self.align {
            Align::Left => format!("{text}{}", " ".repeat(pad)),
            Align::Right => format!("{}{text}", " ".repeat(pad)),
            Align::Center => {
                let left = pad / 2;
                format!("{}{text}{}", " ".repeat(left), " ".repeat(pad - left))
            }
        };
        if self.border {
            out.push('|');
        }
        out
    }
}
