use super::{BlockNames, FormatKind, Formatter};
use crate::value::{Value, ValueData};
use serde_json::{json, Map, Value as Json};

struct Frame {
    name: String,
    named: Map<String, Json>,
    values: Vec<Json>,
}

impl Frame {
    fn into_json(self) -> Json {
        let mut object = Map::new();
        object.insert("block".to_string(), Json::String(self.name));
        if !self.named.is_empty() {
            object.insert("fields".to_string(), Json::Object(self.named));
        }
        if !self.values.is_empty() {
            object.insert("values".to_string(), Json::Array(self.values));
        }
        Json::Object(object)
    }
}

/// One JSON object per top-level block, one object per line.
///
/// Nested blocks become entries of their parent's `values` array.
pub struct JsonFormatter {
    names: BlockNames,
    stack: Vec<Frame>,
    buffer: String,
}

impl JsonFormatter {
    /// Creates an empty formatter.
    #[must_use]
    pub fn new() -> Self {
        Self { names: BlockNames::markers(), stack: Vec::new(), buffer: String::new() }
    }

    fn emit(&mut self, object: &Json) {
        self.buffer.push_str(&object.to_string());
        self.buffer.push('\n');
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn to_json(value: &Value) -> Json {
    match value.data() {
        ValueData::Bool(b) => Json::Bool(*b),
        ValueData::Int(i) => json!(i),
        ValueData::UInt(u) => json!(u),
        ValueData::Double(d) => serde_json::Number::from_f64(*d).map_or(Json::Null, Json::Number),
        ValueData::String(s) => Json::String(s.clone()),
    }
}

impl Formatter for JsonFormatter {
    fn kind(&self) -> FormatKind {
        FormatKind::Json
    }

    fn block_names(&self) -> &BlockNames {
        &self.names
    }

    fn block_names_mut(&mut self) -> &mut BlockNames {
        &mut self.names
    }

    fn open_block(&mut self, name: &str) {
        self.stack.push(Frame { name: name.to_string(), named: Map::new(), values: Vec::new() });
    }

    fn close_block(&mut self, _name: &str) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let object = frame.into_json();
        match self.stack.last_mut() {
            Some(parent) => parent.values.push(object),
            None => self.emit(&object),
        }
    }

    fn format(&mut self, value: &Value) {
        let json = to_json(value);
        match self.stack.last_mut() {
            Some(frame) => frame.values.push(json),
            None => self.emit(&json),
        }
    }

    fn format_named(&mut self, name: &str, value: &Value) {
        let json = to_json(value);
        match self.stack.last_mut() {
            Some(frame) => {
                frame.named.insert(name.to_string(), json);
            }
            None => {
                let mut object = Map::new();
                object.insert(name.to_string(), json);
                self.emit(&Json::Object(object));
            }
        }
    }

    fn format_comment(&mut self, text: &str) {
        self.emit(&json!({ "comment": text }));
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }

    fn peek(&self) -> &str {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_becomes_object_line() {
        let mut f = JsonFormatter::new();
        f.open_block("+");
        f.format_named("name", &Value::from("bash \"x\""));
        f.format_named("cpu", &Value::from(2.5));
        f.close_block("+");

        let line: Json = serde_json::from_str(f.peek().trim_end()).unwrap();
        assert_eq!(line["block"], "+");
        assert_eq!(line["fields"]["name"], "bash \"x\"");
        assert_eq!(line["fields"]["cpu"], 2.5);
    }

    #[test]
    fn test_nested_blocks_and_values() {
        let mut f = JsonFormatter::new();
        f.open_block("grid");
        f.open_block("row0");
        f.format(&Value::from(1i64));
        f.close_block("row0");
        f.close_block("grid");

        let line: Json = serde_json::from_str(f.peek().trim_end()).unwrap();
        assert_eq!(line["values"][0]["block"], "row0");
        assert_eq!(line["values"][0]["values"][0], 1);
    }

    #[test]
    fn test_comment_line() {
        let mut f = JsonFormatter::new();
        f.format_comment("started");
        assert_eq!(f.peek(), "{\"comment\":\"started\"}\n");
        f.clear();
        assert!(f.peek().is_empty());
    }
}
