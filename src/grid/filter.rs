//! Row predicate language.
//!
//! ```text
//! expr     := or
//! or       := and { ("|" | "||" | ";") and }
//! and      := primary { ("&" | "&&") primary }
//! primary  := "(" or ")" | element
//! element  := column op value { "," value }
//! column   := name | "$" digits
//! op       := "=" | "==" | ":=" | "!=" | "<>" | ">=" | "=>" | "<=" | "=<" | "<" | ">"
//! value    := 'quoted' | "quoted" | bare
//! ```
//!
//! `Name == 'firefox','chrome' & CPU > 10` keeps rows whose name is one of the
//! two literals and whose CPU exceeds 10. Equality passes when any listed value
//! matches, `!=` when none does. `$N` is the 1-based column position.
//!
//! A filter that failed to parse stays disabled and accepts every row.

use super::data::GridData;
use super::{ColumnKey, RowKey};
use crate::error::{EctopError, Result};
use crate::value::{Value, ValueKind};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Op {
    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Op::Eq => ordering == Ordering::Equal,
            Op::Ne => ordering != Ordering::Equal,
            Op::Lt => ordering == Ordering::Less,
            Op::Le => ordering != Ordering::Greater,
            Op::Gt => ordering == Ordering::Greater,
            Op::Ge => ordering != Ordering::Less,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ColumnRef {
    Name(String),
    Position(usize),
}

#[derive(Debug, Clone)]
struct Resolved {
    column: ColumnKey,
    kind: ValueKind,
    values: Vec<Value>,
}

#[derive(Debug, Clone)]
struct Element {
    column: ColumnRef,
    op: Op,
    literals: Vec<String>,
    resolved: Option<Resolved>,
}

impl Element {
    fn resolve(&mut self, data: &GridData) {
        let key = match &self.column {
            ColumnRef::Name(name) => data.column_key(name.as_str()),
            ColumnRef::Position(index) => data.column_key(*index),
        };
        self.resolved = key.and_then(|column| {
            let kind = data.column(column)?.kind();
            let values = self.literals.iter().map(|raw| Value::from(raw.as_str()).to_kind(kind)).collect();
            Some(Resolved { column, kind, values })
        });
    }

    fn apply(&self, data: &GridData, row: RowKey) -> bool {
        let Some(resolved) = &self.resolved else {
            return false;
        };
        let Some(current) = data.value_or_default(row, resolved.column) else {
            return false;
        };
        let current = if current.kind() == resolved.kind { current } else { current.to_kind(resolved.kind) };
        match self.op {
            Op::Ne => resolved.values.iter().all(|v| current.compare(v) != Ordering::Equal),
            op => resolved.values.iter().any(|v| op.accepts(current.compare(v))),
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Or(Vec<Node>),
    And(Vec<Node>),
    Element(Element),
}

impl Node {
    fn resolve(&mut self, data: &GridData) {
        match self {
            Node::Or(nodes) | Node::And(nodes) => nodes.iter_mut().for_each(|n| n.resolve(data)),
            Node::Element(element) => element.resolve(data),
        }
    }

    fn apply(&self, data: &GridData, row: RowKey) -> bool {
        match self {
            Node::Or(nodes) => nodes.iter().any(|n| n.apply(data, row)),
            Node::And(nodes) => nodes.iter().all(|n| n.apply(data, row)),
            Node::Element(element) => element.apply(data, row),
        }
    }
}

/// Parsed row predicate.
#[derive(Debug, Clone, Default)]
pub struct GridFilter {
    expression: String,
    root: Option<Node>,
    error: Option<(usize, String)>,
}

impl GridFilter {
    /// Creates an empty filter that accepts every row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `expression` into a new filter.
    pub fn parse(expression: &str) -> Result<Self> {
        let mut filter = Self::new();
        filter.set(expression)?;
        Ok(filter)
    }

    /// Replaces the expression.
    ///
    /// On a parse error the filter is disabled and the error is both kept
    /// and returned. Call [`GridFilter::refresh`] before applying.
    pub fn set(&mut self, expression: &str) -> Result<()> {
        self.expression = expression.to_string();
        self.root = None;
        self.error = None;
        match Parser::new(expression).parse() {
            Ok(root) => {
                self.root = root;
                Ok(())
            }
            Err((position, message)) => {
                self.error = Some((position, message.clone()));
                Err(EctopError::FilterParse { position, message })
            }
        }
    }

    /// Removes the expression.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Source expression.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Returns true if the filter restricts rows.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.root.is_some()
    }

    /// Parse error of the current expression, as (offset, message).
    #[must_use]
    pub fn error(&self) -> Option<(usize, &str)> {
        self.error.as_ref().map(|(p, m)| (*p, m.as_str()))
    }

    /// Re-resolves column references and literal kinds against `data`.
    pub fn refresh(&mut self, data: &GridData) {
        if let Some(root) = &mut self.root {
            root.resolve(data);
        }
    }

    /// Returns true if `row` passes.
    #[must_use]
    pub fn apply(&self, data: &GridData, row: RowKey) -> bool {
        self.root.as_ref().map_or(true, |root| root.apply(data, row))
    }
}

type ParseResult<T> = std::result::Result<T, (usize, String)>;

/// Deepest parenthesis nesting accepted in an expression.
pub const MAX_NESTING: usize = 64;

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0, depth: 0 }
    }

    fn parse(mut self) -> ParseResult<Option<Node>> {
        self.skip_ws();
        if self.at_end() {
            return Ok(None);
        }
        let root = self.parse_or()?;
        self.skip_ws();
        if !self.at_end() {
            return Err(self.fail("unexpected trailing input"));
        }
        Ok(Some(root))
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn fail(&self, message: &str) -> (usize, String) {
        (self.pos, message.to_string())
    }

    fn parse_or(&mut self) -> ParseResult<Node> {
        let mut nodes = vec![self.parse_and()?];
        loop {
            self.skip_ws();
            if self.eat("||") || self.eat("|") || self.eat(";") {
                nodes.push(self.parse_and()?);
            } else {
                break;
            }
        }
        Ok(if nodes.len() == 1 { nodes.remove(0) } else { Node::Or(nodes) })
    }

    fn parse_and(&mut self) -> ParseResult<Node> {
        let mut nodes = vec![self.parse_primary()?];
        loop {
            self.skip_ws();
            if self.eat("&&") || self.eat("&") {
                nodes.push(self.parse_primary()?);
            } else {
                break;
            }
        }
        Ok(if nodes.len() == 1 { nodes.remove(0) } else { Node::And(nodes) })
    }

    fn parse_primary(&mut self) -> ParseResult<Node> {
        self.skip_ws();
        if self.eat("(") {
            if self.depth >= MAX_NESTING {
                return Err(self.fail("parentheses nested too deeply"));
            }
            self.depth += 1;
            let node = self.parse_or()?;
            self.depth -= 1;
            self.skip_ws();
            if !self.eat(")") {
                return Err(self.fail("expected ')'"));
            }
            return Ok(node);
        }
        self.parse_element().map(Node::Element)
    }

    fn parse_element(&mut self) -> ParseResult<Element> {
        let column = self.parse_column()?;
        self.skip_ws();
        let op = self.parse_op()?;
        let mut literals = vec![self.parse_value()?];
        loop {
            self.skip_ws();
            if self.eat(",") {
                literals.push(self.parse_value()?);
            } else {
                break;
            }
        }
        Ok(Element { column, op, literals, resolved: None })
    }

    fn parse_column(&mut self) -> ParseResult<ColumnRef> {
        let positional = self.eat("$");
        let start = self.pos;
        let len = self
            .rest()
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '.')))
            .unwrap_or(self.rest().len());
        if len == 0 {
            return Err(self.fail("expected column name"));
        }
        self.pos += len;
        let name = &self.src[start..self.pos];
        if positional {
            match name.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(ColumnRef::Position(n - 1)),
                _ => Err((start, "expected 1-based column position after '$'".to_string())),
            }
        } else {
            Ok(ColumnRef::Name(name.to_string()))
        }
    }

    fn parse_op(&mut self) -> ParseResult<Op> {
        const OPS: [(&str, Op); 11] = [
            ("==", Op::Eq),
            (":=", Op::Eq),
            ("!=", Op::Ne),
            ("<>", Op::Ne),
            (">=", Op::Ge),
            ("=>", Op::Ge),
            ("<=", Op::Le),
            ("=<", Op::Le),
            ("=", Op::Eq),
            ("<", Op::Lt),
            (">", Op::Gt),
        ];
        for (token, op) in OPS {
            if self.eat(token) {
                return Ok(op);
            }
        }
        Err(self.fail("expected comparison operator"))
    }

    fn parse_value(&mut self) -> ParseResult<String> {
        self.skip_ws();
        match self.peek() {
            Some(quote @ ('\'' | '"')) => {
                let start = self.pos;
                self.pos += 1;
                let mut out = String::new();
                let mut escaped = false;
                for c in self.rest().chars() {
                    self.pos += c.len_utf8();
                    if escaped {
                        out.push(c);
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == quote {
                        return Ok(out);
                    } else {
                        out.push(c);
                    }
                }
                Err((start, "unterminated quoted value".to_string()))
            }
            _ => {
                let len = self
                    .rest()
                    .find(|c: char| c.is_whitespace() || matches!(c, ',' | '&' | '|' | ';' | '(' | ')'))
                    .unwrap_or(self.rest().len());
                if len == 0 {
                    return Err(self.fail("expected value"));
                }
                let value = self.rest()[..len].to_string();
                self.pos += len;
                Ok(value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{ColumnSpec, GridModel};
    use proptest::prelude::*;

    fn model() -> (GridModel, Vec<RowKey>) {
        let mut model = GridModel::new();
        let name = model.add_column(ColumnSpec::new("Name", ValueKind::String));
        let cpu = model.add_column(ColumnSpec::new("CPU", ValueKind::Double));
        let rows = [("firefox", 12.0), ("chrome", 3.5), ("bash", 0.0)]
            .iter()
            .map(|(n, c)| {
                let row = model.add_row(None);
                model.set_value(row, name, &Value::from(*n));
                model.set_value(row, cpu, &Value::from(*c));
                row
            })
            .collect();
        (model, rows)
    }

    fn matching(model: &GridModel, expr: &str) -> Vec<usize> {
        let mut filter = GridFilter::parse(expr).unwrap();
        filter.refresh(model);
        model.row_keys().iter().enumerate().filter(|(_, r)| filter.apply(model, **r)).map(|(i, _)| i).collect()
    }

    #[test]
    fn test_empty_filter_accepts_all() {
        let (model, _) = model();
        assert_eq!(matching(&model, ""), vec![0, 1, 2]);
        assert!(!GridFilter::new().is_active());
    }

    #[test]
    fn test_equality_with_value_list() {
        let (model, _) = model();
        assert_eq!(matching(&model, "Name == 'firefox','BASH'"), vec![0, 2]);
        assert_eq!(matching(&model, "name = chrome"), vec![1]);
    }

    #[test]
    fn test_not_equal_requires_no_match() {
        let (model, _) = model();
        assert_eq!(matching(&model, "Name != firefox, chrome"), vec![2]);
        assert_eq!(matching(&model, "Name <> bash"), vec![0, 1]);
    }

    #[test]
    fn test_numeric_ordering() {
        let (model, _) = model();
        assert_eq!(matching(&model, "CPU > 3"), vec![0, 1]);
        assert_eq!(matching(&model, "CPU =< 3.5"), vec![1, 2]);
        assert_eq!(matching(&model, "$2 >= 12"), vec![0]);
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let (model, _) = model();
        assert_eq!(matching(&model, "Name = bash | Name = firefox & CPU < 1"), vec![2]);
        assert_eq!(matching(&model, "(Name = bash | Name = firefox) & CPU > 1"), vec![0]);
        assert_eq!(matching(&model, "Name = bash ; CPU > 10"), vec![0, 2]);
    }

    #[test]
    fn test_unknown_column_evaluates_false() {
        let (model, _) = model();
        assert!(matching(&model, "Missing = 1").is_empty());
        assert_eq!(matching(&model, "Missing = 1 | CPU > 10"), vec![0]);
    }

    #[test]
    fn test_quoted_escape() {
        let mut model = GridModel::new();
        let name = model.add_column(ColumnSpec::new("Name", ValueKind::String));
        let row = model.add_row(None);
        model.set_value(row, name, &Value::from("it's"));
        assert_eq!(matching(&model, r"Name = 'it\'s'"), vec![0]);
    }

    #[test]
    fn test_parse_error_disables_filter() {
        let (model, rows) = model();
        let mut filter = GridFilter::new();
        let err = filter.set("Name ~ firefox").unwrap_err();
        assert!(matches!(err, EctopError::FilterParse { position: 5, .. }), "{err}");
        assert!(!filter.is_active());
        assert_eq!(filter.error().map(|(p, _)| p), Some(5));
        filter.refresh(&model);
        assert!(rows.iter().all(|r| filter.apply(&model, *r)));
    }

    #[test]
    fn test_parse_errors() {
        assert!(GridFilter::parse("(Name = a").is_err());
        assert!(GridFilter::parse("Name = 'open").is_err());
        assert!(GridFilter::parse("$0 = 1").is_err());
        assert!(GridFilter::parse("Name =").is_err());
        assert!(GridFilter::parse("Name = a b").is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let (model, _) = model();
        let nested = |depth: usize| format!("{}CPU > 3{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(matching(&model, &nested(MAX_NESTING)), vec![0, 1]);

        let mut filter = GridFilter::new();
        let err = filter.set(&nested(MAX_NESTING + 1)).unwrap_err();
        assert!(matches!(err, EctopError::FilterParse { position, .. } if position == MAX_NESTING + 1), "{err}");
        assert!(!filter.is_active());

        let deep = "(".repeat(100_000);
        assert!(GridFilter::parse(&deep).is_err());
    }

    proptest! {
        #[test]
        fn prop_parse_never_panics(expr in ".{0,40}") {
            let _ = GridFilter::parse(&expr);
        }
    }
}
