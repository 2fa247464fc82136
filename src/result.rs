//! QueryResult (C10): the uniform result envelope every executed statement
//! returns, plus its printable form.

use crate::schema::ColumnAttributes;
use crate::value::{Row, Value};
use std::fmt;

/// Optional column names, optional column attributes, optional row list, and
/// a status message. A result with only a message and no rows indicates a
/// successful no-data operation (DDL, INSERT, DELETE); errors never end up
/// embedded in a `QueryResult` — they propagate as `CoreError` instead.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub columns: Option<Vec<String>>,
    pub attributes: Option<ColumnAttributes>,
    pub rows: Option<Vec<Row>>,
    pub message: String,
}

impl QueryResult {
    pub fn message(message: impl Into<String>) -> Self {
        QueryResult {
            columns: None,
            attributes: None,
            rows: None,
            message: message.into(),
        }
    }

    pub fn rows(
        columns: Vec<String>,
        attributes: Option<ColumnAttributes>,
        rows: Vec<Row>,
        message: impl Into<String>,
    ) -> Self {
        QueryResult {
            columns: Some(columns),
            attributes,
            rows: Some(rows),
            message: message.into(),
        }
    }
}

fn format_cell(value: Option<&Value>) -> String {
    match value {
        Some(Value::Int(n)) => n.to_string(),
        Some(Value::Text(s)) => format!("\"{s}\""),
        Some(Value::Boolean(b)) => b.to_string(),
        None => "???".to_string(),
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(columns) = &self.columns {
            writeln!(f, "{}", columns.join(" "))?;
            writeln!(f, "+{}", "----------+".repeat(columns.len()))?;
            if let Some(rows) = &self.rows {
                for row in rows {
                    let cells: Vec<String> = columns.iter().map(|c| format_cell(row.get(c))).collect();
                    writeln!(f, "{}", cells.join(" "))?;
                }
            }
        }
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::row;
    use insta::assert_snapshot;

    #[test]
    fn message_only_result_prints_just_the_message() {
        let result = QueryResult::message("table t created");
        assert_eq!(result.to_string(), "table t created");
    }

    #[test]
    fn printable_form_matches_header_divider_body_message_layout() {
        let result = QueryResult::rows(
            vec!["a".to_string(), "b".to_string()],
            None,
            vec![row([("a", Value::Int(12)), ("b", Value::Text("x".to_string()))])],
            "1 rows selected",
        );
        assert_snapshot!(result.to_string(), @r###"
        a b
        +----------+----------+
        12 "x"
        1 rows selected
        "###);
    }

    #[test]
    fn boolean_and_missing_cells_print_distinctly() {
        let mut row = Row::new();
        row.insert("flag".to_string(), Value::Boolean(true));
        let result = QueryResult::rows(
            vec!["flag".to_string(), "missing".to_string()],
            None,
            vec![row],
            "1 rows selected",
        );
        assert!(result.to_string().contains("true ???"));
    }
}
