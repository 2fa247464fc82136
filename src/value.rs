//! Tagged scalar values and rows.
//!
//! A [`Value`] is one of the three scalar kinds the core understands. A [`Row`]
//! maps column names to values; column order is not significant, but printing
//! and a few tests want a deterministic iteration order, hence `BTreeMap`.

use std::collections::BTreeMap;
use std::fmt;

/// A scalar value. Equality is structural and type-strict: an `Int` never
/// equals a `Text`, even if their textual forms coincide.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    Int(i64),
    Text(String),
    Boolean(bool),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "INT",
            Value::Text(_) => "TEXT",
            Value::Boolean(_) => "BOOLEAN",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "\"{s}\""),
            Value::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// A row: column name -> value. Keys are unique by construction (`BTreeMap`).
pub type Row = BTreeMap<String, Value>;

/// Build a [`Row`] from `(name, value)` pairs, for tests and fixtures.
pub fn row(pairs: impl IntoIterator<Item = (&'static str, Value)>) -> Row {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_never_equals_text() {
        assert_ne!(Value::Int(1), Value::Text("1".to_string()));
    }

    #[test]
    fn display_quotes_text_only() {
        assert_eq!(Value::Int(12).to_string(), "12");
        assert_eq!(Value::Text("x".to_string()).to_string(), "\"x\"");
        assert_eq!(Value::Boolean(true).to_string(), "true");
    }

    #[test]
    fn row_builder_preserves_all_pairs() {
        let r = row([("a", Value::Int(1)), ("b", Value::Text("y".to_string()))]);
        assert_eq!(r.len(), 2);
        assert_eq!(r.get("a"), Some(&Value::Int(1)));
    }
}
