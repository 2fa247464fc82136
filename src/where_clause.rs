//! WHERE-clause lowering (C6): an AST expression tree down to an equality
//! conjunction map.
//!
//! Grammar accepted: `E ::= E AND E | Column '=' Literal`. Anything else —
//! OR, any other operator, any non-equality comparison — is
//! `UnsupportedPredicate`. An unknown column name is `UnknownColumn`; a
//! literal that isn't an int or a string is `UnsupportedLiteralType`.

use crate::ast::{Expr, Literal};
use crate::error::{CoreError, Result};
use crate::value::{Row, Value};

/// Lowers `expr` to a `ValueDict`, checking each referenced column against
/// `known_columns`. On a duplicate column binding, the later one wins — this
/// matches spec.md §4.3 and is acceptable because duplicate equalities on
/// the same column would be semantically redundant or contradictory anyway.
pub fn lower(expr: &Expr, known_columns: &[String]) -> Result<Row> {
    match expr {
        Expr::Operator { op, left, right } if op == "AND" => {
            let mut merged = lower(left, known_columns)?;
            merged.extend(lower(right, known_columns)?);
            Ok(merged)
        }
        Expr::Operator { op, left, right } if op == "=" => {
            let column = match left.as_ref() {
                Expr::ColumnRef(name) => name,
                _ => return Err(CoreError::UnsupportedPredicate),
            };
            if !known_columns.iter().any(|c| c == column) {
                return Err(CoreError::UnknownColumn(column.clone()));
            }
            let value = match right.as_ref() {
                Expr::Literal(Literal::Int(n)) => Value::Int(*n),
                Expr::Literal(Literal::String(s)) => Value::Text(s.clone()),
                _ => return Err(CoreError::UnsupportedLiteralType),
            };
            let mut row = Row::new();
            row.insert(column.clone(), value);
            Ok(row)
        }
        _ => Err(CoreError::UnsupportedPredicate),
    }
}
