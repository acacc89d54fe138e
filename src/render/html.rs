//! HTML table renderer.

use crate::error::Result;
use crate::format::escape_xml;
use crate::grid::{CellItem, GridColumn, GridStyle, HeaderItem, Placement, Rect, Renderer};
use std::any::Any;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_HEADER: &str = "<!doctype html>\n<html>\n  <head>\n    <title>ectop</title>\n    \
                              <link rel='stylesheet' type='text/css' href='style.css' />\n  </head>\n  <body>\n";
const DEFAULT_FOOTER: &str = "\n  </body>\n</html>\n";

/// Renders every row and column into an HTML table, optionally saving the
/// page to a file after each frame.
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    table: String,
    header: String,
    footer: String,
    output: Option<PathBuf>,
}

impl HtmlRenderer {
    /// Renderer keeping its output in memory.
    #[must_use]
    pub fn new() -> Self {
        Self { table: String::new(), header: DEFAULT_HEADER.to_string(), footer: DEFAULT_FOOTER.to_string(), output: None }
    }

    /// Saves the page to `path` after each frame.
    #[must_use]
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Replaces the page text around the table.
    pub fn set_page(&mut self, header: impl Into<String>, footer: impl Into<String>) {
        self.header = header.into();
        self.footer = footer.into();
    }

    /// Output file, if any.
    #[must_use]
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    /// Table of the last frame.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.table
    }

    /// Full page of the last frame.
    #[must_use]
    pub fn page(&self) -> String {
        format!("{}{}{}", self.header, self.table, self.footer)
    }

    /// Writes the page to `path`.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        fs::write(path, self.page())?;
        Ok(())
    }

    fn push_item(&mut self, tag: &str, text: &str, style: &GridStyle) {
        let class = style_class(style);
        if class.is_empty() {
            self.table.push_str(&format!("<{tag}>{}</{tag}>", escape_xml(text, true)));
        } else {
            self.table.push_str(&format!("<{tag} style='{class}'>{}</{tag}>", escape_xml(text, true)));
        }
    }
}

fn style_class(style: &GridStyle) -> String {
    let mut css = Vec::new();
    if let Some(fg) = style.fg {
        css.push(format!("color:{fg}"));
    }
    if let Some(bg) = style.bg {
        css.push(format!("background:{bg}"));
    }
    if style.bold {
        css.push("font-weight:bold".to_string());
    }
    if style.italic {
        css.push("font-style:italic".to_string());
    }
    css.join(";")
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for HtmlRenderer {
    fn before_render(&mut self, _area: Rect) {
        self.table = String::from("<table>\n\t<tr>");
    }

    fn render_column_header(&mut self, _header: &HeaderItem<'_>, text: &str, _at: Placement, style: &GridStyle) {
        self.push_item("th", text, style);
    }

    fn render_row(&mut self, _row: &crate::grid::GridRow, _at: Placement) {
        self.table.push_str("</tr>\n\t<tr>");
    }

    fn render_cell(&mut self, _cell: &CellItem<'_>, text: &str, _at: Placement, style: &GridStyle) {
        self.push_item("td", text, style);
    }

    fn render_sum_bar(&mut self, _at: Placement) {
        self.table.push_str("</tr>\n\t<tr class='sum'>");
    }

    fn render_sum_bar_item(&mut self, _column: &GridColumn, text: &str, _at: Placement, style: &GridStyle) {
        self.push_item("td", text, style);
    }

    fn after_render(&mut self, _width: u16, _height: u16) -> Result<()> {
        self.table.push_str("</tr>\n</table>");
        match &self.output {
            Some(path) => self.save_to_file(path),
            None => Ok(()),
        }
    }

    fn show_text(&self, raw: &str, _width: u16, style: &GridStyle) -> String {
        style.decorate(raw)
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
