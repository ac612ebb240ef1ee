// used to print out readable forms of a value
use std::fmt;
// used to indicate that values need to be hashable, so they can key indexes and nodes
use std::hash::{Hash, Hasher};

// the "standard" regular expression package, compiled once
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_ASCII: Regex = Regex::new(r"[^\x00-\x7F]+").unwrap();
}

/// Cell contents that are read as a missing value unless the caller says otherwise.
pub const DEFAULT_MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-NaN", "-nan", "<NA>", "N/A", "NA", "NULL", "NaN", "None",
    "n/a", "nan", "null",
];

/// Removes every character outside the ASCII range. Characters are dropped, not replaced.
pub fn sanitize(text: &str) -> String {
    NON_ASCII.replace_all(text, "").into_owned()
}

// ------------- Value -------------
/// A scalar cell of a table, as typed by the source.
///
/// Equality is strict: values of different variants are never equal, so
/// `Integer(5)`, `Float(5.0)` and `Text("5")` are three different values.
/// Floats compare by bit pattern (with `-0.0` folded into `0.0`), which
/// keeps `Eq` and `Hash` consistent for use as index and node keys.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
}

fn float_key(f: f64) -> u64 {
    if f == 0.0 { 0 } else { f.to_bits() }
}

impl Value {
    pub fn data_type(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::Text(_) => "Text",
        }
    }
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
    /// Text with non-ASCII characters stripped; every other variant is returned as is.
    pub fn sanitized(&self) -> Value {
        match self {
            Value::Text(s) => Value::Text(sanitize(s)),
            other => other.clone(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => float_key(*a) == float_key(*b),
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => (),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => float_key(*f).hash(state),
            Value::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Integer(i) => write!(f, "{}", i),
            // Debug keeps the trailing ".0" so floats never read like integers
            Value::Float(v) => write!(f, "{:?}", v),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}
impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}
impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}
impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(o: Option<T>) -> Self {
        o.map_or(Value::Null, Into::into)
    }
}

// ------------- ColumnType -------------
/// The type a whole column is read as. Inference looks at every present
/// cell, so a single non-numeric cell turns the column into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Text,
}

// Surrounding whitespace is not part of a number or a missing marker.
fn is_missing<S: AsRef<str>>(cell: &str, missing: &[S]) -> bool {
    let cell = cell.trim();
    missing.iter().any(|m| m.as_ref() == cell)
}

fn parse_float(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|f| !f.is_nan())
}

impl ColumnType {
    pub fn infer<'a, I, S>(cells: I, missing: &[S]) -> ColumnType
    where
        I: IntoIterator<Item = &'a str>,
        S: AsRef<str>,
    {
        let mut integer = true;
        let mut float = true;
        let mut present = false;
        for cell in cells {
            if is_missing(cell, missing) {
                continue;
            }
            present = true;
            let cell = cell.trim();
            if integer && cell.parse::<i64>().is_err() {
                integer = false;
            }
            if !integer && parse_float(cell).is_none() {
                float = false;
                break;
            }
        }
        match (present, integer, float) {
            (false, _, _) => ColumnType::Text,
            (true, true, _) => ColumnType::Integer,
            (true, false, true) => ColumnType::Float,
            _ => ColumnType::Text,
        }
    }
    /// Converts one raw cell. A cell that does not parse as the column type
    /// falls back to text rather than being coerced. Text cells keep their
    /// whitespace.
    pub fn convert<S: AsRef<str>>(&self, cell: &str, missing: &[S]) -> Value {
        if is_missing(cell, missing) {
            return Value::Null;
        }
        match self {
            ColumnType::Integer => cell
                .trim()
                .parse::<i64>()
                .map_or_else(|_| Value::from(cell), Value::Integer),
            ColumnType::Float => {
                parse_float(cell.trim()).map_or_else(|| Value::from(cell), Value::Float)
            }
            ColumnType::Text => Value::from(cell),
        }
    }
}
