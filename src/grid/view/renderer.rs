//! Output backend interface driven by [`GridView::render`](super::GridView::render).

use super::layout::Rect;
use super::SortOrder;
use crate::error::Result;
use crate::grid::cell::GridCell;
use crate::grid::column::GridColumn;
use crate::grid::row::GridRow;
use crate::grid::style::GridStyle;
use crate::grid::{ColumnKey, RowKey};
use std::any::Any;

/// Where an item is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Column of the first character.
    pub x: u16,
    /// Line.
    pub y: u16,
    /// Width in characters.
    pub width: u16,
}

/// Column header being drawn.
#[derive(Debug, Clone, Copy)]
pub struct HeaderItem<'a> {
    /// Column handle.
    pub key: ColumnKey,
    /// Model column.
    pub column: &'a GridColumn,
    /// Sort order when the view is sorted by this column.
    pub sort: Option<SortOrder>,
}

/// Cell being drawn; `cell` is `None` when the pair was never assigned.
#[derive(Debug, Clone, Copy)]
pub struct CellItem<'a> {
    /// Row handle.
    pub row_key: RowKey,
    /// Model row.
    pub row: &'a GridRow,
    /// Column handle.
    pub column_key: ColumnKey,
    /// Model column.
    pub column: &'a GridColumn,
    /// Model cell.
    pub cell: Option<&'a GridCell>,
}

/// Output backend of a view.
///
/// The view calls, in order: `before_render`, one `render_column_header` per
/// rendered column, then per row `render_row` followed by its cells, then the
/// sum bar when any column sums, and finally `after_render`.
pub trait Renderer {
    /// Starts a frame covering `area`.
    fn before_render(&mut self, area: Rect);

    /// Draws one column header.
    fn render_column_header(&mut self, header: &HeaderItem<'_>, text: &str, at: Placement, style: &GridStyle);

    /// Starts a row.
    fn render_row(&mut self, _row: &GridRow, _at: Placement) {}

    /// Draws one cell.
    fn render_cell(&mut self, cell: &CellItem<'_>, text: &str, at: Placement, style: &GridStyle);

    /// Draws an extra separator line under the header or above the sum bar.
    fn render_separator(&mut self, _at: Placement, _style: &GridStyle) {}

    /// Starts the sum bar.
    fn render_sum_bar(&mut self, _at: Placement) {}

    /// Draws the sum of one column (empty text for columns without a sum).
    fn render_sum_bar_item(&mut self, column: &GridColumn, text: &str, at: Placement, style: &GridStyle);

    /// Ends the frame; `width` and `height` are the extent actually drawn.
    fn after_render(&mut self, _width: u16, _height: u16) -> Result<()> {
        Ok(())
    }

    /// Turns a raw value into the text handed to the draw calls.
    fn show_text(&self, raw: &str, width: u16, style: &GridStyle) -> String {
        style.fit(raw, usize::from(width))
    }

    /// True when every row and column is emitted regardless of geometry.
    fn render_all_items(&self) -> bool {
        false
    }

    /// Size of the host surface, used by auto-sizing views.
    fn host_size(&self) -> Option<(u16, u16)> {
        None
    }

    /// Downcasting support.
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcasting support.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Plain text renderer drawing into a character canvas.
#[derive(Debug, Clone, Default)]
pub struct TextRenderer {
    origin: (u16, u16),
    lines: Vec<Vec<char>>,
    host: Option<(u16, u16)>,
}

impl TextRenderer {
    /// Creates an empty renderer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretends to run on a host of the given size (for auto-sizing views).
    #[must_use]
    pub fn with_host_size(mut self, width: u16, height: u16) -> Self {
        self.host = Some((width, height));
        self
    }

    fn put(&mut self, at: Placement, text: &str) {
        let line = usize::from(at.y.saturating_sub(self.origin.1));
        let column = usize::from(at.x.saturating_sub(self.origin.0));
        if self.lines.len() <= line {
            self.lines.resize_with(line + 1, Vec::new);
        }
        let target = &mut self.lines[line];
        for (i, c) in text.chars().take(usize::from(at.width)).enumerate() {
            let pos = column + i;
            if target.len() <= pos {
                target.resize(pos + 1, ' ');
            }
            target[pos] = c;
        }
    }

    /// Lines of the last frame, trailing blanks trimmed.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.iter().map(|l| l.iter().collect::<String>().trim_end().to_string()).collect()
    }

    /// Last frame as one string.
    #[must_use]
    pub fn content(&self) -> String {
        self.lines().join("\n")
    }
}

impl Renderer for TextRenderer {
    fn before_render(&mut self, area: Rect) {
        self.origin = (area.x, area.y);
        self.lines.clear();
    }

    fn render_column_header(&mut self, _header: &HeaderItem<'_>, text: &str, at: Placement, _style: &GridStyle) {
        self.put(at, text);
    }

    fn render_cell(&mut self, _cell: &CellItem<'_>, text: &str, at: Placement, _style: &GridStyle) {
        self.put(at, text);
    }

    fn render_separator(&mut self, at: Placement, _style: &GridStyle) {
        self.put(at, &"-".repeat(usize::from(at.width)));
    }

    fn render_sum_bar_item(&mut self, _column: &GridColumn, text: &str, at: Placement, _style: &GridStyle) {
        self.put(at, text);
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
