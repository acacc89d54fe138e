//! JSON document renderer.

use crate::error::Result;
use crate::grid::{CellItem, GridColumn, GridRow, GridStyle, HeaderItem, Placement, Rect, Renderer};
use crate::value::{Value, ValueKind};
use serde_json::{json, Map, Value as Json};
use std::any::Any;
use std::fs;
use std::path::{Path, PathBuf};

/// Renders every row and column as one JSON document:
/// `{"columns": [...], "rows": [[...]], "sums": [...]}`.
///
/// Numeric cells become JSON numbers unless a style decorates them.
#[derive(Debug, Clone, Default)]
pub struct JsonRenderer {
    columns: Vec<Json>,
    rows: Vec<Vec<Json>>,
    sums: Vec<Json>,
    document: Json,
    output: Option<PathBuf>,
    pretty: bool,
}

impl JsonRenderer {
    /// Renderer keeping its output in memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Saves the document to `path` after each frame.
    #[must_use]
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Pretty-prints saved output.
    #[must_use]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Document of the last frame.
    #[must_use]
    pub fn document(&self) -> &Json {
        &self.document
    }

    /// Serialized document of the last frame.
    pub fn content(&self) -> Result<String> {
        let text = if self.pretty { serde_json::to_string_pretty(&self.document)? } else { serde_json::to_string(&self.document)? };
        Ok(text)
    }

    /// Writes the document to `path`.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        fs::write(path, self.content()?)?;
        Ok(())
    }
}

fn to_json(value: &Value, text: &str, style: &GridStyle) -> Json {
    if !style.prefix.is_empty() || !style.suffix.is_empty() {
        return Json::String(text.to_string());
    }
    match value.kind() {
        ValueKind::Bool => Json::Bool(value.as_bool()),
        ValueKind::Int => json!(value.as_i64()),
        ValueKind::UInt => json!(value.as_u64()),
        ValueKind::Double => serde_json::Number::from_f64(value.as_f64()).map_or(Json::Null, Json::Number),
        ValueKind::String => Json::String(text.to_string()),
    }
}

impl Renderer for JsonRenderer {
    fn before_render(&mut self, _area: Rect) {
        self.columns.clear();
        self.rows.clear();
        self.sums.clear();
    }

    fn render_column_header(&mut self, header: &HeaderItem<'_>, _text: &str, _at: Placement, _style: &GridStyle) {
        self.columns.push(Json::String(header.column.title().to_string()));
    }

    fn render_row(&mut self, _row: &GridRow, _at: Placement) {
        self.rows.push(Vec::new());
    }

    fn render_cell(&mut self, cell: &CellItem<'_>, text: &str, _at: Placement, style: &GridStyle) {
        let item = match cell.cell {
            Some(c) => to_json(c.value(), text, style),
            None => Json::Null,
        };
        if let Some(row) = self.rows.last_mut() {
            row.push(item);
        }
    }

    fn render_sum_bar_item(&mut self, column: &GridColumn, text: &str, _at: Placement, _style: &GridStyle) {
        if text.is_empty() {
            self.sums.push(Json::Null);
        } else if column.kind().is_numeric() {
            let value = Value::from(text).to_kind(column.kind());
            self.sums.push(to_json(&value, text, &GridStyle::new()));
        } else {
            self.sums.push(Json::String(text.to_string()));
        }
    }

    fn after_render(&mut self, _width: u16, _height: u16) -> Result<()> {
        let mut document = Map::new();
        document.insert("columns".to_string(), Json::Array(std::mem::take(&mut self.columns)));
        let rows = std::mem::take(&mut self.rows).into_iter().map(Json::Array).collect();
        document.insert("rows".to_string(), Json::Array(rows));
        if !self.sums.is_empty() {
            document.insert("sums".to_string(), Json::Array(std::mem::take(&mut self.sums)));
        }
        self.document = Json::Object(document);
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
