//! Composite index keys.

use crate::value::{Row, Value};

/// A composite key: the indexed columns' values from a row, in `key_columns`
/// order. `Vec<Value>`'s derived `Ord` already compares element-wise in that
/// order, and since every position in a given tree always holds the same
/// `Value` variant (fixed by the key profile at creation), the derived
/// per-variant comparison is exactly "integers numerically, text byte-wise"
/// that spec.md asks for.
pub type Key = Vec<Value>;

/// Projects a row through `key_columns` to obtain its composite key.
pub fn extract_key(row: &Row, key_columns: &[String]) -> Key {
    key_columns
        .iter()
        .map(|c| row.get(c).cloned().expect("row missing indexed column"))
        .collect()
}
