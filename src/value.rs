//! Tagged scalar stored in every grid cell.
//!
//! A [`Value`] is one of five kinds. Assignment either converts the incoming
//! value into the current kind or, with auto-kind enabled, adopts the incoming
//! kind. Comparison is kind-aware: strings compare case-insensitively, numbers
//! and booleans compare through a common numeric type.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{AddAssign, SubAssign};

/// Kind of a [`Value`], also the declared kind of a grid column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Boolean.
    Bool,
    /// Signed 64-bit integer.
    #[default]
    Int,
    /// Unsigned 64-bit integer.
    UInt,
    /// 64-bit float.
    Double,
    /// UTF-8 text.
    String,
}

impl ValueKind {
    /// Default scalar for this kind (false / 0 / 0.0 / empty).
    #[must_use]
    pub fn default_data(self) -> ValueData {
        match self {
            ValueKind::Bool => ValueData::Bool(false),
            ValueKind::Int => ValueData::Int(0),
            ValueKind::UInt => ValueData::UInt(0),
            ValueKind::Double => ValueData::Double(0.0),
            ValueKind::String => ValueData::String(String::new()),
        }
    }

    /// True for the numeric kinds that can be summed.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(self, ValueKind::Int | ValueKind::UInt | ValueKind::Double)
    }

    /// Parses a kind name as used in configuration files.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Some(ValueKind::Bool),
            "int" | "integer" => Some(ValueKind::Int),
            "uint" | "unsigned" => Some(ValueKind::UInt),
            "double" | "float" => Some(ValueKind::Double),
            "string" | "str" => Some(ValueKind::String),
            _ => None,
        }
    }
}

/// Raw scalar payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueData {
    /// Boolean payload.
    Bool(bool),
    /// Signed payload.
    Int(i64),
    /// Unsigned payload.
    UInt(u64),
    /// Float payload.
    Double(f64),
    /// Text payload.
    String(String),
}

impl ValueData {
    fn kind(&self) -> ValueKind {
        match self {
            ValueData::Bool(_) => ValueKind::Bool,
            ValueData::Int(_) => ValueKind::Int,
            ValueData::UInt(_) => ValueKind::UInt,
            ValueData::Double(_) => ValueKind::Double,
            ValueData::String(_) => ValueKind::String,
        }
    }
}

/// Scalar with a kind, a payload that always matches the kind, and an
/// auto-kind flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Value {
    data: ValueData,
    #[serde(default)]
    auto_kind: bool,
}

impl Default for Value {
    fn default() -> Self {
        Self::of_kind(ValueKind::Int)
    }
}

impl Value {
    /// Creates the default value of `kind`.
    #[must_use]
    pub fn of_kind(kind: ValueKind) -> Self {
        Self { data: kind.default_data(), auto_kind: false }
    }

    /// Enables or disables auto-kind (builder form).
    #[must_use]
    pub fn with_auto_kind(mut self, auto_kind: bool) -> Self {
        self.auto_kind = auto_kind;
        self
    }

    /// Current kind.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        self.data.kind()
    }

    /// Raw payload.
    #[must_use]
    pub fn data(&self) -> &ValueData {
        &self.data
    }

    /// Whether assignment adopts the incoming kind.
    #[must_use]
    pub fn auto_kind(&self) -> bool {
        self.auto_kind
    }

    /// Sets the auto-kind flag.
    pub fn set_auto_kind(&mut self, auto_kind: bool) {
        self.auto_kind = auto_kind;
    }

    /// Changes the kind; a different kind resets the payload to its default.
    pub fn set_kind(&mut self, kind: ValueKind) {
        if kind != self.kind() {
            self.data = kind.default_data();
        }
    }

    /// Restores the default of the current kind.
    pub fn reset(&mut self) {
        self.data = self.kind().default_data();
    }

    /// Assigns `other`, converting it to the current kind unless auto-kind is on.
    pub fn set(&mut self, other: &Value) {
        if self.auto_kind || other.kind() == self.kind() {
            self.data = other.data.clone();
        } else {
            self.data = other.convert_to(self.kind());
        }
    }

    /// Returns a copy converted to `kind`.
    #[must_use]
    pub fn to_kind(&self, kind: ValueKind) -> Value {
        Value { data: self.convert_to(kind), auto_kind: self.auto_kind }
    }

    fn convert_to(&self, kind: ValueKind) -> ValueData {
        match kind {
            ValueKind::Bool => ValueData::Bool(self.as_bool()),
            ValueKind::Int => ValueData::Int(self.as_i64()),
            ValueKind::UInt => ValueData::UInt(self.as_u64()),
            ValueKind::Double => ValueData::Double(self.as_f64()),
            ValueKind::String => ValueData::String(self.to_string()),
        }
    }

    /// Boolean view: non-zero numbers, `"1"` and `"true"` are true.
    #[must_use]
    pub fn as_bool(&self) -> bool {
        match &self.data {
            ValueData::Bool(b) => *b,
            ValueData::Int(i) => *i != 0,
            ValueData::UInt(u) => *u != 0,
            ValueData::Double(d) => *d != 0.0,
            ValueData::String(s) => {
                let s = s.trim();
                s == "1" || s.eq_ignore_ascii_case("true")
            }
        }
    }

    /// Signed view; unparsable strings give 0.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        match &self.data {
            ValueData::Bool(b) => i64::from(*b),
            ValueData::Int(i) => *i,
            ValueData::UInt(u) => i64::try_from(*u).unwrap_or(i64::MAX),
            ValueData::Double(d) => *d as i64,
            ValueData::String(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| s.parse::<f64>().ok().map(|d| d as i64)).unwrap_or(0)
            }
        }
    }

    /// Unsigned view; negative numbers and unparsable strings give 0.
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        match &self.data {
            ValueData::Bool(b) => u64::from(*b),
            ValueData::Int(i) => u64::try_from(*i).unwrap_or(0),
            ValueData::UInt(u) => *u,
            ValueData::Double(d) => *d as u64,
            ValueData::String(s) => {
                let s = s.trim();
                s.parse::<u64>().ok().or_else(|| s.parse::<f64>().ok().map(|d| d as u64)).unwrap_or(0)
            }
        }
    }

    /// Float view; unparsable strings give 0.0.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match &self.data {
            ValueData::Bool(b) => f64::from(u8::from(*b)),
            ValueData::Int(i) => *i as f64,
            ValueData::UInt(u) => *u as f64,
            ValueData::Double(d) => *d,
            ValueData::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        }
    }

    /// Text payload when the value is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match &self.data {
            ValueData::String(s) => Some(s),
            _ => None,
        }
    }

    /// Kind-aware three-way comparison.
    #[must_use]
    pub fn compare(&self, other: &Value) -> Ordering {
        use ValueData as D;
        match (&self.data, &other.data) {
            (D::String(a), D::String(b)) => compare_text(a, b),
            (D::String(a), _) => match a.trim().parse::<f64>() {
                Ok(n) => total_cmp(n, other.as_f64()),
                Err(_) => compare_text(a, &other.to_string()),
            },
            (_, D::String(b)) => match b.trim().parse::<f64>() {
                Ok(n) => total_cmp(self.as_f64(), n),
                Err(_) => compare_text(&self.to_string(), b),
            },
            (D::UInt(a), D::UInt(b)) => a.cmp(b),
            (D::Int(_) | D::Bool(_), D::Int(_) | D::Bool(_)) => self.as_i64().cmp(&other.as_i64()),
            _ => total_cmp(self.as_f64(), other.as_f64()),
        }
    }
}

fn total_cmp(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
}

fn compare_text(a: &str, b: &str) -> Ordering {
    let folded = a
        .bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()));
    folded.then(a.len().cmp(&b.len()))
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            ValueData::Bool(b) => write!(f, "{}", u8::from(*b)),
            ValueData::Int(i) => write!(f, "{i}"),
            ValueData::UInt(u) => write!(f, "{u}"),
            ValueData::Double(d) => write!(f, "{d}"),
            ValueData::String(s) => f.write_str(s),
        }
    }
}

impl AddAssign<&Value> for Value {
    fn add_assign(&mut self, rhs: &Value) {
        self.data = match &self.data {
            ValueData::Bool(b) => ValueData::Bool(*b || rhs.as_bool()),
            ValueData::Int(i) => ValueData::Int(i.wrapping_add(rhs.as_i64())),
            ValueData::UInt(u) => ValueData::UInt(u.wrapping_add(rhs.as_u64())),
            ValueData::Double(d) => ValueData::Double(d + rhs.as_f64()),
            ValueData::String(s) => ValueData::String(format!("{s}{rhs}")),
        };
    }
}

impl SubAssign<&Value> for Value {
    fn sub_assign(&mut self, rhs: &Value) {
        self.data = match &self.data {
            ValueData::Bool(b) => ValueData::Bool(*b && !rhs.as_bool()),
            ValueData::Int(i) => ValueData::Int(i.wrapping_sub(rhs.as_i64())),
            ValueData::UInt(u) => ValueData::UInt(u.saturating_sub(rhs.as_u64())),
            ValueData::Double(d) => ValueData::Double(d - rhs.as_f64()),
            ValueData::String(_) => return,
        };
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self { data: ValueData::Bool(v), auto_kind: false }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self { data: ValueData::Int(v), auto_kind: false }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::from(i64::from(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self { data: ValueData::UInt(v), auto_kind: false }
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::from(u64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self { data: ValueData::Double(v), auto_kind: false }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self { data: ValueData::String(v.to_string()), auto_kind: false }
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self { data: ValueData::String(v), auto_kind: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_is_int_zero() {
        let v = Value::default();
        assert_eq!(v.kind(), ValueKind::Int);
        assert_eq!(v.as_i64(), 0);
    }

    #[test]
    fn test_set_converts_to_current_kind() {
        let mut v = Value::of_kind(ValueKind::Double);
        v.set(&Value::from("2.5"));
        assert_eq!(v.kind(), ValueKind::Double);
        assert!((v.as_f64() - 2.5).abs() < f64::EPSILON);

        let mut n = Value::of_kind(ValueKind::Int);
        n.set(&Value::from("not a number"));
        assert_eq!(n.as_i64(), 0);
    }

    #[test]
    fn test_set_with_auto_kind_adopts_kind() {
        let mut v = Value::of_kind(ValueKind::Int).with_auto_kind(true);
        v.set(&Value::from("hello"));
        assert_eq!(v.kind(), ValueKind::String);
        assert_eq!(v.as_str(), Some("hello"));
    }

    #[test]
    fn test_bool_conversions() {
        let mut b = Value::of_kind(ValueKind::Bool);
        b.set(&Value::from("TRUE"));
        assert!(b.as_bool());
        b.set(&Value::from("0"));
        assert!(!b.as_bool());

        let mut s = Value::of_kind(ValueKind::String);
        s.set(&Value::from(true));
        assert_eq!(s.to_string(), "1");

        let mut i = Value::of_kind(ValueKind::Int);
        i.set(&Value::from(true));
        assert_eq!(i.as_i64(), 1);
    }

    #[test]
    fn test_set_kind_resets_only_on_change() {
        let mut v = Value::from(7i64);
        v.set_kind(ValueKind::Int);
        assert_eq!(v.as_i64(), 7);
        v.set_kind(ValueKind::String);
        assert_eq!(v.as_str(), Some(""));
    }

    #[test]
    fn test_string_compare_is_case_insensitive() {
        assert_eq!(Value::from("Firefox").compare(&Value::from("firefox")), Ordering::Equal);
        assert_eq!(Value::from("abc").compare(&Value::from("ABD")), Ordering::Less);
        assert_eq!(Value::from("ab").compare(&Value::from("abc")), Ordering::Less);
    }

    #[test]
    fn test_mixed_numeric_compare() {
        assert_eq!(Value::from(1i64).compare(&Value::from(1.0)), Ordering::Equal);
        assert_eq!(Value::from(true).compare(&Value::from(1i64)), Ordering::Equal);
        assert_eq!(Value::from(3u64).compare(&Value::from(2i64)), Ordering::Greater);
        assert_eq!(Value::from("10").compare(&Value::from(9i64)), Ordering::Greater);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(false).to_string(), "0");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
        assert_eq!(Value::from(-3i64).to_string(), "-3");
    }

    #[test]
    fn test_add_sub_assign() {
        let mut total = Value::of_kind(ValueKind::Double);
        total += &Value::from(1.5);
        total += &Value::from(2i64);
        assert!((total.as_f64() - 3.5).abs() < f64::EPSILON);
        total -= &Value::from(0.5);
        assert!((total.as_f64() - 3.0).abs() < f64::EPSILON);

        let mut text = Value::from("a");
        text += &Value::from(1i64);
        assert_eq!(text.as_str(), Some("a1"));

        let mut unsigned = Value::from(1u64);
        unsigned -= &Value::from(5u64);
        assert_eq!(unsigned.as_u64(), 0);
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(ValueKind::parse("Double"), Some(ValueKind::Double));
        assert_eq!(ValueKind::parse("string"), Some(ValueKind::String));
        assert_eq!(ValueKind::parse("matrix"), None);
    }

    proptest! {
        #[test]
        fn prop_compare_is_antisymmetric(a in any::<i64>(), b in -1.0e12f64..1.0e12) {
            let x = Value::from(a);
            let y = Value::from(b);
            prop_assert_eq!(x.compare(&y), y.compare(&x).reverse());
        }

        #[test]
        fn prop_reset_restores_kind_default(s in ".*") {
            let mut v = Value::from(s);
            v.reset();
            prop_assert_eq!(v.as_str(), Some(""));
        }
    }
}
