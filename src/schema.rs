//! Column name lists, column attribute lists, and record handles.

use std::fmt;
use strum_macros::{EnumString, IntoStaticStr};

/// The data type of a column. A parser-facing column can only be `Int` or
/// `Text` (anything else, e.g. `DOUBLE`, is rejected by the caller before a
/// `ColumnAttribute` is ever constructed); `Boolean` exists for catalog
/// columns the core itself declares, such as `_indices.is_unique`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
pub enum ColumnAttribute {
    #[strum(serialize = "INT")]
    Int,
    #[strum(serialize = "TEXT")]
    Text,
    #[strum(serialize = "BOOLEAN")]
    Boolean,
}

impl ColumnAttribute {
    pub fn as_db_string(self) -> &'static str {
        self.into()
    }
}

impl fmt::Display for ColumnAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_string())
    }
}

pub type ColumnNames = Vec<String>;
pub type ColumnAttributes = Vec<ColumnAttribute>;

/// Opaque address of a record inside a relation's file: a block id and the
/// slot within that block. Stable for the record's lifetime; invalidated by
/// deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle {
    pub block_id: u32,
    pub slot_id: u16,
}

impl Handle {
    pub fn new(block_id: u32, slot_id: u16) -> Self {
        Handle { block_id, slot_id }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.block_id, self.slot_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn round_trips_through_db_string() {
        assert_eq!(ColumnAttribute::Int.as_db_string(), "INT");
        assert_eq!(ColumnAttribute::from_str("TEXT").unwrap(), ColumnAttribute::Text);
        assert_eq!(ColumnAttribute::from_str("BOOLEAN").unwrap(), ColumnAttribute::Boolean);
    }

    #[test]
    fn unknown_type_name_fails_to_parse() {
        assert!(ColumnAttribute::from_str("DOUBLE").is_err());
    }
}
