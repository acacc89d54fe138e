use super::{BlockNames, FormatKind, Formatter};
use crate::value::Value;

struct OpenTag {
    name: String,
    has_children: bool,
}

/// XML elements, with values as attributes (default) or child elements.
pub struct XmlFormatter {
    names: BlockNames,
    attr_mode: bool,
    indent: String,
    stack: Vec<OpenTag>,
    buffer: String,
}

impl XmlFormatter {
    /// Attribute-mode formatter without indent.
    #[must_use]
    pub fn new() -> Self {
        Self {
            names: BlockNames::new("data", "add", "delete", "update"),
            attr_mode: true,
            indent: String::new(),
            stack: Vec::new(),
            buffer: String::new(),
        }
    }

    /// Writes values as attributes when true, as child elements otherwise.
    pub fn set_attr_mode(&mut self, attr_mode: bool) {
        self.attr_mode = attr_mode;
    }

    /// Attribute mode flag.
    #[must_use]
    pub fn attr_mode(&self) -> bool {
        self.attr_mode
    }

    /// Prefix written before every line.
    pub fn set_indent(&mut self, indent: &str) {
        self.indent = indent.to_string();
    }

    fn line_start(&mut self, depth: usize) {
        self.buffer.push_str(&self.indent);
        self.buffer.push_str(&"\t".repeat(depth));
    }

    /// Closes the start tag of the innermost attribute-mode element so that
    /// children can follow it.
    fn open_parent(&mut self) {
        if let Some(parent) = self.stack.last_mut() {
            if self.attr_mode && !parent.has_children {
                self.buffer.push_str(">\n");
            }
            parent.has_children = true;
        }
    }
}

impl Default for XmlFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Escapes XML markup characters, and quotes too when `quotes` is set.
pub(crate) fn escape_xml(text: &str, quotes: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' if quotes => out.push_str("&quot;"),
            '\'' if quotes => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

fn element_name(name: &str) -> String {
    if name.is_empty() {
        return "data".to_string();
    }
    name.chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':') { c } else { '_' })
        .collect()
}

impl Formatter for XmlFormatter {
    fn kind(&self) -> FormatKind {
        FormatKind::Xml
    }

    fn block_names(&self) -> &BlockNames {
        &self.names
    }

    fn block_names_mut(&mut self) -> &mut BlockNames {
        &mut self.names
    }

    fn open_block(&mut self, name: &str) {
        self.open_parent();
        let name = element_name(name);
        self.line_start(self.stack.len());
        self.buffer.push('<');
        self.buffer.push_str(&name);
        if !self.attr_mode {
            self.buffer.push_str(">\n");
        }
        self.stack.push(OpenTag { name, has_children: false });
    }

    fn close_block(&mut self, _name: &str) {
        let Some(tag) = self.stack.pop() else {
            return;
        };
        if self.attr_mode && !tag.has_children {
            self.buffer.push_str("/>\n");
        } else {
            self.line_start(self.stack.len());
            self.buffer.push_str(&format!("</{}>\n", tag.name));
        }
    }

    fn format(&mut self, value: &Value) {
        self.format_named("data", value);
    }

    fn format_named(&mut self, name: &str, value: &Value) {
        let name = element_name(name);
        let text = escape_xml(&value.to_string(), self.attr_mode);
        let in_open_tag = self.stack.last().is_some_and(|tag| !tag.has_children);
        if self.attr_mode && in_open_tag {
            self.buffer.push_str(&format!(" {name}=\"{text}\""));
        } else {
            self.open_parent();
            self.line_start(self.stack.len());
            self.buffer.push_str(&format!("<{name}>{}</{name}>\n", escape_xml(&value.to_string(), false)));
        }
    }

    fn format_comment(&mut self, text: &str) {
        self.open_parent();
        self.line_start(self.stack.len());
        self.buffer.push_str(&format!("<!--{}-->\n", escape_xml(&text.replace("--", "- -"), false)));
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }

    fn peek(&self) -> &str {
        &self.buffer
    }
}
