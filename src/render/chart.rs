//! Bar chart renderer: one bar per row, labelled by a key column and sized by
//! a value column.

use super::svg::{SvgEncoder, TextAnchor};
use crate::error::Result;
use crate::grid::{CellItem, ColumnKey, GridColor, GridColumn, GridRow, GridStyle, HeaderItem, Placement, Rect, Renderer};
use std::any::Any;
use std::path::{Path, PathBuf};

const BAR_HEIGHT: f32 = 18.0;
const LABEL_WIDTH: f32 = 160.0;
const CHART_WIDTH: u32 = 640;

/// Collects (key, value) pairs during a frame and draws them as an SVG bar chart.
#[derive(Debug, Clone, Default)]
pub struct ChartRenderer {
    key_column: Option<ColumnKey>,
    value_column: Option<ColumnKey>,
    titles: (String, String),
    bars: Vec<(String, f64)>,
    svg: String,
    output: Option<PathBuf>,
}

impl ChartRenderer {
    /// Chart labelled by `key` and sized by `value`.
    #[must_use]
    pub fn new(key: ColumnKey, value: ColumnKey) -> Self {
        Self { key_column: Some(key), value_column: Some(value), ..Self::default() }
    }

    /// Chart with no columns selected yet; it draws nothing until they are.
    #[must_use]
    pub fn unbound() -> Self {
        Self::default()
    }

    /// Selects the key and value columns.
    pub fn set_chart_columns(&mut self, key: Option<ColumnKey>, value: Option<ColumnKey>) {
        self.key_column = key;
        self.value_column = value;
    }

    /// Saves the SVG to `path` after each frame.
    #[must_use]
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Bars of the last frame.
    #[must_use]
    pub fn bars(&self) -> &[(String, f64)] {
        &self.bars
    }

    /// SVG of the last frame.
    #[must_use]
    pub fn svg(&self) -> &str {
        &self.svg
    }

    /// Writes the SVG to `path`.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.svg)?;
        Ok(())
    }

    fn draw(&self) -> SvgEncoder {
        let count = u32::try_from(self.bars.len()).unwrap_or(u32::MAX);
        let height = 30 + count.saturating_mul(BAR_HEIGHT as u32 + 4);
        let max = self.bars.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
        let room = CHART_WIDTH as f32 - LABEL_WIDTH - 60.0;

        let mut svg = SvgEncoder::new(CHART_WIDTH, height)
            .text(LABEL_WIDTH - 8.0, 16.0, &self.titles.0, 12.0, GridColor::DarkGray, TextAnchor::End)
            .text(LABEL_WIDTH, 16.0, &self.titles.1, 12.0, GridColor::DarkGray, TextAnchor::Start);
        for (i, (label, value)) in self.bars.iter().enumerate() {
            let y = 26.0 + i as f32 * (BAR_HEIGHT + 4.0);
            let width = if max > 0.0 { (value / max) as f32 * room } else { 0.0 };
            svg = svg
                .text(LABEL_WIDTH - 8.0, y + 13.0, label, 12.0, GridColor::Black, TextAnchor::End)
                .rect(LABEL_WIDTH, y, width.max(0.0), BAR_HEIGHT, GridColor::Blue)
                .text(LABEL_WIDTH + width.max(0.0) + 4.0, y + 13.0, &value.to_string(), 11.0, GridColor::Black, TextAnchor::Start);
        }
        svg
    }
}

impl Renderer for ChartRenderer {
    fn before_render(&mut self, _area: Rect) {
        self.bars.clear();
    }

    fn render_column_header(&mut self, header: &HeaderItem<'_>, _text: &str, _at: Placement, _style: &GridStyle) {
        if Some(header.key) == self.key_column {
            self.titles.0 = header.column.title().to_string();
        } else if Some(header.key) == self.value_column {
            self.titles.1 = header.column.title().to_string();
        }
    }

    fn render_row(&mut self, _row: &GridRow, _at: Placement) {
        self.bars.push((String::new(), 0.0));
    }

    fn render_cell(&mut self, cell: &CellItem<'_>, text: &str, _at: Placement, _style: &GridStyle) {
        let Some(bar) = self.bars.last_mut() else {
            return;
        };
        if Some(cell.column_key) == self.key_column {
            bar.0 = text.to_string();
        } else if Some(cell.column_key) == self.value_column {
            bar.1 = cell.cell.map_or(0.0, |c| c.value().as_f64());
        }
    }

    fn render_sum_bar_item(&mut self, _column: &GridColumn, _text: &str, _at: Placement, _style: &GridStyle) {}

    fn after_render(&mut self, _width: u16, _height: u16) -> Result<()> {
        if self.key_column.is_none() || self.value_column.is_none() {
            self.svg.clear();
            return Ok(());
        }
        self.svg = self.draw().render();
        match &self.output {
            Some(path) => self.save_to_file(path),
            None => Ok(()),
        }
    }

    fn show_text(&self, raw: &str, _width: u16, _style: &GridStyle) -> String {
        raw.to_string()
    }

    fn render_all_items(&self) -> bool {
        true
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
