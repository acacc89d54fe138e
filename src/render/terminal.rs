//! Terminal renderer drawing into a ratatui buffer.

use crate::grid::{Align, CellItem, GridColor, GridColumn, GridStyle, HeaderItem, Placement, Rect, Renderer};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect as TuiRect;
use ratatui::style::{Color, Modifier, Style};
use std::any::Any;

/// Draws a clipped view into an off-screen buffer that the driver copies
/// into the terminal frame.
#[derive(Debug, Clone)]
pub struct TerminalRenderer {
    buffer: Buffer,
    host: Option<(u16, u16)>,
}

impl TerminalRenderer {
    /// Creates an empty renderer.
    #[must_use]
    pub fn new() -> Self {
        Self { buffer: Buffer::empty(TuiRect::default()), host: None }
    }

    /// Records the terminal size used by auto-sizing views.
    pub fn set_host_size(&mut self, width: u16, height: u16) {
        self.host = Some((width, height));
    }

    /// Buffer of the last frame.
    #[must_use]
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Copies the last frame into `target`, clipped to its area.
    pub fn blit(&self, target: &mut Buffer) {
        let area = self.buffer.area.intersection(target.area);
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                if let (Some(src), Some(dst)) = (self.buffer.cell((x, y)), target.cell_mut((x, y))) {
                    *dst = src.clone();
                }
            }
        }
    }

    /// Text of line `y` of the last frame, trailing blanks trimmed.
    #[must_use]
    pub fn line(&self, y: u16) -> String {
        let area = self.buffer.area;
        let text: String = (area.left()..area.right())
            .filter_map(|x| self.buffer.cell((x, y)).map(ratatui::buffer::Cell::symbol))
            .collect();
        text.trim_end().to_string()
    }

    fn put(&mut self, at: Placement, text: &str, style: &GridStyle) {
        let area = self.buffer.area;
        if at.y < area.top() || at.y >= area.bottom() || at.x < area.left() || at.x >= area.right() {
            return;
        }
        self.buffer.set_stringn(at.x, at.y, text, usize::from(at.width), to_style(style));
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Maps a backend-neutral color to a terminal color.
#[must_use]
pub fn to_color(color: GridColor) -> Color {
    match color {
        GridColor::Black => Color::Black,
        GridColor::Red => Color::Red,
        GridColor::Green => Color::Green,
        GridColor::Yellow => Color::Yellow,
        GridColor::Blue => Color::Blue,
        GridColor::Magenta => Color::Magenta,
        GridColor::Cyan => Color::Cyan,
        GridColor::Gray => Color::Gray,
        GridColor::DarkGray => Color::DarkGray,
        GridColor::White => Color::White,
        GridColor::Rgb(r, g, b) => Color::Rgb(r, g, b),
    }
}

/// Maps a grid style to a terminal style.
#[must_use]
pub fn to_style(style: &GridStyle) -> Style {
    let mut out = Style::default();
    if let Some(fg) = style.fg {
        out = out.fg(to_color(fg));
    }
    if let Some(bg) = style.bg {
        out = out.bg(to_color(bg));
    }
    let mut modifier = Modifier::empty();
    if style.bold {
        modifier |= Modifier::BOLD;
    }
    if style.italic {
        modifier |= Modifier::ITALIC;
    }
    if style.underline {
        modifier |= Modifier::UNDERLINED;
    }
    if style.strikethrough {
        modifier |= Modifier::CROSSED_OUT;
    }
    out.add_modifier(modifier)
}

impl Renderer for TerminalRenderer {
    fn before_render(&mut self, area: Rect) {
        let area = TuiRect::new(area.x, area.y, area.width, area.height);
        if self.buffer.area == area {
            self.buffer.reset();
        } else {
            self.buffer = Buffer::empty(area);
        }
    }

    fn render_column_header(&mut self, _header: &HeaderItem<'_>, text: &str, at: Placement, style: &GridStyle) {
        self.put(at, text, style);
    }

    fn render_cell(&mut self, _cell: &CellItem<'_>, text: &str, at: Placement, style: &GridStyle) {
        self.put(at, text, style);
    }

    fn render_separator(&mut self, at: Placement, style: &GridStyle) {
        let line = "─".repeat(usize::from(at.width));
        let style = GridStyle { align: Align::Left, ..style.clone() };
        self.put(at, &line, &style);
    }

    fn render_sum_bar_item(&mut self, _column: &GridColumn, text: &str, at: Placement, style: &GridStyle) {
        self.put(at, text, style);
    }

    fn host_size(&self) -> Option<(u16, u16)> {
        self.host
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
