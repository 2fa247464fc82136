//! Top-level statement dispatcher: the single entry point a caller drives a
//! `DbContext` through. Matches on `Statement` and routes to the DDL and DML
//! executors, plus the three SHOW forms the catalog can answer directly
//! without involving the evaluation plan.

use crate::ast::{ShowKind, Statement};
use crate::catalog::DbContext;
use crate::ddl;
use crate::dml;
use crate::error::{CoreError, Result};
use crate::relation::DbRelation;
use crate::result::QueryResult;
use crate::value::{row, Value};

pub fn execute(ctx: &mut DbContext, statement: &Statement) -> Result<QueryResult> {
    match statement {
        Statement::Create {
            kind,
            table,
            columns,
            if_not_exists,
            index_name,
            index_columns,
            index_type,
        } => match kind {
            crate::ast::SchemaObjectKind::Table => {
                ddl::create_table(ctx, table, columns, *if_not_exists)
            }
            crate::ast::SchemaObjectKind::Index => {
                let name = index_name
                    .as_ref()
                    .ok_or(CoreError::UnsupportedPredicate)?;
                ddl::create_index(ctx, name, table, index_columns, index_type.as_deref())
            }
        },
        Statement::Drop {
            kind,
            table,
            index_name,
        } => match kind {
            crate::ast::SchemaObjectKind::Table => ddl::drop_table(ctx, table),
            crate::ast::SchemaObjectKind::Index => {
                let name = index_name
                    .as_ref()
                    .ok_or(CoreError::UnsupportedPredicate)?;
                ddl::drop_index(ctx, table, name)
            }
        },
        Statement::Show { kind, table } => match kind {
            ShowKind::Tables => show_tables(ctx),
            ShowKind::Columns => show_columns(ctx, table.as_deref().ok_or(CoreError::UnknownTable(String::new()))?),
            ShowKind::Index => show_index(ctx, table.as_deref().ok_or(CoreError::UnknownTable(String::new()))?),
        },
        Statement::Insert {
            table,
            columns,
            values,
        } => dml::insert(ctx, table, columns.as_deref(), values),
        Statement::Delete { table, where_clause } => {
            dml::delete(ctx, table, where_clause.as_ref())
        }
        Statement::Select {
            select_list,
            from,
            where_clause,
        } => dml::select(ctx, select_list, from, where_clause.as_ref()),
    }
}

/// Every user table name, excluding the three catalog relations.
fn show_tables(ctx: &mut DbContext) -> Result<QueryResult> {
    let names = ctx.tables.user_table_names()?;
    let count = names.len();
    let rows = names
        .into_iter()
        .map(|name| row([("table_name", Value::Text(name))]))
        .collect();
    Ok(QueryResult::rows(
        vec!["table_name".to_string()],
        None,
        rows,
        format!("{count} rows selected"),
    ))
}

/// Raw `_columns` rows for `table`, in declaration order.
fn show_columns(ctx: &mut DbContext, table: &str) -> Result<QueryResult> {
    if !ctx.tables.contains(table)? {
        return Err(CoreError::UnknownTable(table.to_string()));
    }
    let handles = ctx
        .columns_relation()
        .select(Some(&row([("table_name", Value::Text(table.to_string()))])))?;
    let mut rows = Vec::with_capacity(handles.len());
    for handle in handles {
        rows.push(ctx.columns_relation().project(handle, None)?);
    }
    let count = rows.len();
    Ok(QueryResult::rows(
        vec![
            "table_name".to_string(),
            "column_name".to_string(),
            "data_type".to_string(),
        ],
        None,
        rows,
        format!("{count} rows selected"),
    ))
}

/// Raw `_indices` rows for `table`, ordered by `seq_in_index`.
fn show_index(ctx: &mut DbContext, table: &str) -> Result<QueryResult> {
    if !ctx.tables.contains(table)? {
        return Err(CoreError::UnknownTable(table.to_string()));
    }
    let handles = ctx
        .indices
        .select(Some(&row([("table_name", Value::Text(table.to_string()))])))?;
    let mut rows = Vec::with_capacity(handles.len());
    for handle in handles {
        rows.push(ctx.indices.project(handle, None)?);
    }
    rows.sort_by_key(|r| match r.get("seq_in_index") {
        Some(Value::Int(n)) => *n,
        _ => i64::MAX,
    });
    let count = rows.len();
    Ok(QueryResult::rows(
        vec![
            "table_name".to_string(),
            "index_name".to_string(),
            "seq_in_index".to_string(),
            "column_name".to_string(),
            "index_type".to_string(),
            "is_unique".to_string(),
        ],
        None,
        rows,
        format!("{count} rows selected"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ColumnDef, SchemaObjectKind};

    fn ctx_with_table() -> DbContext {
        let mut ctx = DbContext::bootstrap(4096).unwrap();
        execute(
            &mut ctx,
            &Statement::Create {
                kind: SchemaObjectKind::Table,
                table: "t".to_string(),
                columns: vec![
                    ColumnDef {
                        name: "a".to_string(),
                        data_type: "INT".to_string(),
                    },
                    ColumnDef {
                        name: "b".to_string(),
                        data_type: "TEXT".to_string(),
                    },
                ],
                if_not_exists: false,
                index_name: None,
                index_columns: vec![],
                index_type: None,
            },
        )
        .unwrap();
        ctx
    }

    #[test]
    fn show_tables_excludes_catalog_relations() {
        let mut ctx = ctx_with_table();
        let result = execute(&mut ctx, &Statement::Show { kind: ShowKind::Tables, table: None }).unwrap();
        let rows = result.rows.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("table_name"), Some(&Value::Text("t".to_string())));
    }

    #[test]
    fn show_columns_returns_declared_order() {
        let mut ctx = ctx_with_table();
        let result = execute(
            &mut ctx,
            &Statement::Show {
                kind: ShowKind::Columns,
                table: Some("t".to_string()),
            },
        )
        .unwrap();
        let rows = result.rows.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("column_name"), Some(&Value::Text("a".to_string())));
        assert_eq!(rows[1].get("column_name"), Some(&Value::Text("b".to_string())));
    }

    #[test]
    fn show_index_orders_by_seq_in_index() {
        let mut ctx = ctx_with_table();
        execute(
            &mut ctx,
            &Statement::Create {
                kind: SchemaObjectKind::Index,
                table: "t".to_string(),
                columns: vec![],
                if_not_exists: false,
                index_name: Some("i".to_string()),
                index_columns: vec!["b".to_string(), "a".to_string()],
                index_type: None,
            },
        )
        .unwrap();
        let result = execute(
            &mut ctx,
            &Statement::Show {
                kind: ShowKind::Index,
                table: Some("t".to_string()),
            },
        )
        .unwrap();
        let rows = result.rows.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("column_name"), Some(&Value::Text("b".to_string())));
        assert_eq!(rows[1].get("column_name"), Some(&Value::Text("a".to_string())));
    }

    #[test]
    fn insert_then_select_round_trips_through_the_dispatcher() {
        let mut ctx = ctx_with_table();
        execute(
            &mut ctx,
            &Statement::Insert {
                table: "t".to_string(),
                columns: None,
                values: vec![
                    crate::ast::Expr::Literal(crate::ast::Literal::Int(1)),
                    crate::ast::Expr::Literal(crate::ast::Literal::String("x".to_string())),
                ],
            },
        )
        .unwrap();
        let result = execute(
            &mut ctx,
            &Statement::Select {
                select_list: vec![crate::ast::Expr::Star],
                from: "t".to_string(),
                where_clause: None,
            },
        )
        .unwrap();
        assert_eq!(result.rows.unwrap().len(), 1);
    }
}
