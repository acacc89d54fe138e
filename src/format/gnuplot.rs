use super::csv::quote_field;
use super::{BlockNames, FormatKind, Formatter};
use crate::value::Value;

/// Tab-separated data lines with `#` comments, readable by gnuplot.
#[derive(Debug, Clone)]
pub struct GnuplotFormatter {
    names: BlockNames,
    separator: String,
    buffer: String,
    needs_separator: bool,
}

impl GnuplotFormatter {
    /// Tab-separated formatter.
    #[must_use]
    pub fn new() -> Self {
        Self { names: BlockNames::markers(), separator: "\t".to_string(), buffer: String::new(), needs_separator: false }
    }

    /// Changes the field separator.
    pub fn set_separator(&mut self, separator: &str) {
        self.separator = separator.to_string();
    }

    fn end_line(&mut self) {
        if !self.buffer.is_empty() && !self.buffer.ends_with('\n') {
            self.buffer.push('\n');
        }
        self.needs_separator = false;
    }

    fn push_field(&mut self, field: &str) {
        if self.needs_separator {
            self.buffer.push_str(&self.separator);
        }
        // gnuplot splits on whitespace, so embedded blanks need quotes too
        let field = if field.contains(char::is_whitespace) && !field.contains('"') {
            format!("\"{field}\"")
        } else {
            quote_field(field, &self.separator)
        };
        self.buffer.push_str(&field);
        self.needs_separator = true;
    }
}

impl Default for GnuplotFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for GnuplotFormatter {
    fn kind(&self) -> FormatKind {
        FormatKind::Gnuplot
    }

    fn block_names(&self) -> &BlockNames {
        &self.names
    }

    fn block_names_mut(&mut self) -> &mut BlockNames {
        &mut self.names
    }

    fn open_block(&mut self, name: &str) {
        self.end_line();
        if !name.is_empty() {
            self.push_field(name);
        }
    }

    fn close_block(&mut self, _name: &str) {
        self.end_line();
    }

    fn format(&mut self, value: &Value) {
        self.push_field(&value.to_string());
    }

    fn format_named(&mut self, _name: &str, value: &Value) {
        self.format(value);
    }

    fn format_comment(&mut self, text: &str) {
        self.end_line();
        self.buffer.push('#');
        self.buffer.push_str(&text.replace('\n', " "));
        self.buffer.push('\n');
    }

    fn clear(&mut self) {
        self.buffer.clear();
        self.needs_separator = false;
    }

    fn peek(&self) -> &str {
        &self.buffer
    }
}
