use super::{BlockNames, FormatKind, Formatter};
use crate::value::Value;

/// One line per block: the block name followed by its values.
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    names: BlockNames,
    separator: String,
    buffer: String,
    needs_separator: bool,
}

impl CsvFormatter {
    /// Comma-separated formatter.
    #[must_use]
    pub fn new() -> Self {
        Self { names: BlockNames::markers(), separator: ",".to_string(), buffer: String::new(), needs_separator: false }
    }

    /// Field separator.
    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
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
        let quoted = quote_field(field, &self.separator);
        self.buffer.push_str(&quoted);
        self.needs_separator = true;
    }
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

pub(super) fn quote_field(field: &str, separator: &str) -> String {
    let needs_quotes = field.contains([',', ';', '"', '\n'])
        || (!separator.is_empty() && field.contains(separator));
    if needs_quotes {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

impl Formatter for CsvFormatter {
    fn kind(&self) -> FormatKind {
        FormatKind::Csv
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
