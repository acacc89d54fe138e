//! Streaming structured-text formatters for grid logs.
//!
//! A [`Formatter`] accumulates blocks of values into an internal buffer.
//! [`GridLog`](crate::grid::GridLog) takes the buffer after every record
//! and clears it, queueing the text until the sink accepts it. The four implementations share the same
//! contract and differ only in syntax.

mod csv;
mod gnuplot;
mod json;
mod xml;

pub use csv::CsvFormatter;
pub use gnuplot::GnuplotFormatter;
pub use json::JsonFormatter;
pub use xml::XmlFormatter;
pub(crate) use xml::escape_xml;

use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Kind of record written by a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    /// Plain record (explicit log requests).
    Default,
    /// A row became visible.
    Added,
    /// A visible row went away.
    Erased,
    /// A visible row changed.
    Updated,
}

impl BlockType {
    /// All block types, in index order.
    pub const ALL: [BlockType; 4] = [BlockType::Default, BlockType::Added, BlockType::Erased, BlockType::Updated];

    fn index(self) -> usize {
        match self {
            BlockType::Default => 0,
            BlockType::Added => 1,
            BlockType::Erased => 2,
            BlockType::Updated => 3,
        }
    }
}

/// Per-block-type names, overridable per formatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockNames([String; 4]);

impl BlockNames {
    /// Names for default, added, erased and updated blocks.
    #[must_use]
    pub fn new(default: &str, added: &str, erased: &str, updated: &str) -> Self {
        Self([default.to_string(), added.to_string(), erased.to_string(), updated.to_string()])
    }

    /// `+`, `-` and `.` markers with an empty default name.
    #[must_use]
    pub fn markers() -> Self {
        Self::new("", "+", "-", ".")
    }

    /// Name for `block`.
    #[must_use]
    pub fn get(&self, block: BlockType) -> &str {
        &self.0[block.index()]
    }

    /// Overrides the name for `block`.
    pub fn set(&mut self, block: BlockType, name: &str) {
        self.0[block.index()] = name.to_string();
    }
}

/// Output syntax of a formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    /// Comma separated values.
    Csv,
    /// One JSON object per line.
    Json,
    /// XML elements.
    #[default]
    Xml,
    /// Whitespace separated columns for gnuplot.
    Gnuplot,
}

/// Options shared by the formatter constructors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormatOptions {
    /// Field separator for CSV and gnuplot (their defaults when `None`).
    pub separator: Option<String>,
    /// XML: write values as attributes instead of child elements.
    pub attr_mode: Option<bool>,
    /// XML: indent prepended to every line.
    pub indent: String,
}

/// Streaming structured-text builder.
pub trait Formatter {
    /// Output syntax.
    fn kind(&self) -> FormatKind;

    /// Block name table.
    fn block_names(&self) -> &BlockNames;

    /// Mutable block name table.
    fn block_names_mut(&mut self) -> &mut BlockNames;

    /// Starts a block.
    fn open_block(&mut self, name: &str);

    /// Ends the block opened with `name`.
    fn close_block(&mut self, name: &str);

    /// Appends an unnamed value.
    fn format(&mut self, value: &Value);

    /// Appends a named value.
    fn format_named(&mut self, name: &str, value: &Value);

    /// Appends a comment line.
    fn format_comment(&mut self, text: &str);

    /// Discards the buffer.
    fn clear(&mut self);

    /// Current buffer.
    fn peek(&self) -> &str;

    /// Name used for `block`.
    fn block_name(&self, block: BlockType) -> &str {
        self.block_names().get(block)
    }

    /// Overrides the name used for `block`.
    fn set_block_name(&mut self, block: BlockType, name: &str) {
        self.block_names_mut().set(block, name);
    }

    /// Starts a block named after `block`.
    fn open_block_type(&mut self, block: BlockType) {
        let name = self.block_name(block).to_string();
        self.open_block(&name);
    }

    /// Ends a block named after `block`.
    fn close_block_type(&mut self, block: BlockType) {
        let name = self.block_name(block).to_string();
        self.close_block(&name);
    }
}

/// Builds a boxed formatter of `kind`.
#[must_use]
pub fn create_formatter(kind: FormatKind, options: &FormatOptions) -> Box<dyn Formatter> {
    match kind {
        FormatKind::Csv => {
            let mut f = CsvFormatter::new();
            if let Some(sep) = &options.separator {
                f.set_separator(sep);
            }
            Box::new(f)
        }
        FormatKind::Gnuplot => {
            let mut f = GnuplotFormatter::new();
            if let Some(sep) = &options.separator {
                f.set_separator(sep);
            }
            Box::new(f)
        }
        FormatKind::Json => Box::new(JsonFormatter::new()),
        FormatKind::Xml => {
            let mut f = XmlFormatter::new();
            if let Some(attr_mode) = options.attr_mode {
                f.set_attr_mode(attr_mode);
            }
            f.set_indent(&options.indent);
            Box::new(f)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_block_names_per_kind() {
        for kind in [FormatKind::Csv, FormatKind::Json, FormatKind::Gnuplot] {
            let f = create_formatter(kind, &FormatOptions::default());
            assert_eq!(f.block_name(BlockType::Added), "+");
            assert_eq!(f.block_name(BlockType::Erased), "-");
            assert_eq!(f.block_name(BlockType::Updated), ".");
        }
        let xml = create_formatter(FormatKind::Xml, &FormatOptions::default());
        assert_eq!(xml.block_name(BlockType::Default), "data");
        assert_eq!(xml.block_name(BlockType::Added), "add");
        assert_eq!(xml.block_name(BlockType::Erased), "delete");
        assert_eq!(xml.block_name(BlockType::Updated), "update");
    }

    #[test]
    fn test_block_name_override() {
        let mut f = create_formatter(FormatKind::Csv, &FormatOptions::default());
        f.set_block_name(BlockType::Added, "new");
        f.open_block_type(BlockType::Added);
        f.format(&Value::from(1i64));
        f.close_block_type(BlockType::Added);
        assert_eq!(f.peek(), "new,1\n");
    }

    #[test]
    fn test_factory_applies_separator() {
        let options = FormatOptions { separator: Some(";".to_string()), ..FormatOptions::default() };
        let mut f = create_formatter(FormatKind::Csv, &options);
        f.open_block("x");
        f.format(&Value::from("a"));
        f.close_block("x");
        assert_eq!(f.peek(), "x;a\n");
        assert_eq!(f.kind(), FormatKind::Csv);
    }
}
