//! DDL executor (C5): CREATE/DROP TABLE and INDEX, orchestrating catalog
//! writes and physical create/drop with compensating rollback.
//!
//! Compensations are best-effort and themselves swallow errors (logged via
//! `eprintln!`) so the original failure is always what reaches the caller —
//! spec.md §4.2 and §7 are explicit that this is not meant to be
//! crash-safe, only catalog-consistent on the happy path and on clean
//! failure.

use crate::ast::ColumnDef;
use crate::catalog::{self, is_schema_relation, DbContext};
use crate::error::{CoreError, Result};
use crate::index::DbIndex;
use crate::relation::DbRelation;
use crate::result::QueryResult;
use crate::schema::Handle;
use crate::value::{row, Value};

pub fn create_table(
    ctx: &mut DbContext,
    table: &str,
    columns: &[ColumnDef],
    if_not_exists: bool,
) -> Result<QueryResult> {
    if if_not_exists && ctx.tables.contains(table)? {
        return Ok(QueryResult::message(format!(
            "table {table} already exists, skipped"
        )));
    }

    let mapped = catalog::map_column_defs(columns)?;

    let t_handle = ctx
        .tables
        .insert(&row([("table_name", Value::Text(table.to_string()))]))?;
    let mut c_handles = Vec::new();

    if let Err(e) = insert_columns_and_materialize(ctx, table, &mapped, &mut c_handles) {
        compensate_columns(ctx, &c_handles);
        compensate_table_row(ctx, t_handle);
        return Err(e);
    }

    Ok(QueryResult::message(format!("table {table} created")))
}

fn insert_columns_and_materialize(
    ctx: &mut DbContext,
    table: &str,
    mapped: &[(String, crate::schema::ColumnAttribute)],
    c_handles: &mut Vec<Handle>,
) -> Result<()> {
    for (name, attr) in mapped {
        let h = ctx.columns_relation().insert(&row([
            ("table_name", Value::Text(table.to_string())),
            ("column_name", Value::Text(name.clone())),
            ("data_type", Value::Text(attr.as_db_string().to_string())),
        ]))?;
        c_handles.push(h);
    }
    ctx.get_table(table)?;
    Ok(())
}

fn compensate_columns(ctx: &mut DbContext, handles: &[Handle]) {
    for handle in handles {
        if let Err(e) = ctx.columns_relation().del(*handle) {
            eprintln!("warning: compensation failed deleting _columns row: {e}");
        }
    }
}

fn compensate_table_row(ctx: &mut DbContext, handle: Handle) {
    if let Err(e) = ctx.tables.del(handle) {
        eprintln!("warning: compensation failed deleting _tables row: {e}");
    }
}

pub fn create_index(
    ctx: &mut DbContext,
    index_name: &str,
    table: &str,
    columns: &[String],
    index_type: Option<&str>,
) -> Result<QueryResult> {
    let index_type = index_type.unwrap_or("BTREE").to_string();
    let is_unique = index_type == "BTREE";

    let table_columns = ctx.get_table(table)?.get_column_names();
    for c in columns {
        if !table_columns.contains(c) {
            return Err(CoreError::UnknownColumn(c.clone()));
        }
    }

    let mut i_handles = Vec::new();
    if let Err(e) = insert_index_rows_and_build(
        ctx,
        index_name,
        table,
        columns,
        &index_type,
        is_unique,
        &mut i_handles,
    ) {
        for handle in &i_handles {
            if let Err(ce) = ctx.indices.del(*handle) {
                eprintln!("warning: compensation failed deleting _indices row: {ce}");
            }
        }
        return Err(e);
    }

    Ok(QueryResult::message(format!("index {index_name} created")))
}

fn insert_index_rows_and_build(
    ctx: &mut DbContext,
    index_name: &str,
    table: &str,
    columns: &[String],
    index_type: &str,
    is_unique: bool,
    i_handles: &mut Vec<Handle>,
) -> Result<()> {
    for (i, col) in columns.iter().enumerate() {
        let h = ctx.indices.insert(&row([
            ("table_name", Value::Text(table.to_string())),
            ("index_name", Value::Text(index_name.to_string())),
            ("seq_in_index", Value::Int((i + 1) as i64)),
            ("column_name", Value::Text(col.clone())),
            ("index_type", Value::Text(index_type.to_string())),
            ("is_unique", Value::Boolean(is_unique)),
        ]))?;
        i_handles.push(h);
    }

    let index = ctx.indices.get_index(table, index_name, &mut ctx.tables, &ctx.columns)?;
    let relation = ctx
        .tables
        .get_open(table)
        .expect("table materialized by the column pre-check above");
    index.create(relation)
}

/// Refuses to drop `_tables`, `_columns`, `_indices`. Drops every index on
/// the table first, then deletes the `_indices` rows via a single path
/// (`indices.select(where)`, not the duplicated original path spec.md §9
/// flags), then `_columns` rows, then the physical relation, and finally the
/// one `_tables` row.
pub fn drop_table(ctx: &mut DbContext, table: &str) -> Result<QueryResult> {
    if is_schema_relation(table) {
        return Err(CoreError::SchemaProtected(table.to_string()));
    }
    if !ctx.tables.contains(table)? {
        return Err(CoreError::UnknownTable(table.to_string()));
    }
    // Materialize (or fetch the cached) relation now, while `_columns` still
    // has rows for it -- `relation.drop_relation()` below must not need to
    // re-read a schema that will already be gone by the time we call it.
    ctx.get_table(table)?;

    for index_name in ctx.indices.get_index_names(table)? {
        let index = ctx.get_index(table, &index_name)?;
        index.drop_index()?;
        ctx.forget_index(table, &index_name);
    }

    let index_row_handles = ctx
        .indices
        .select(Some(&row([("table_name", Value::Text(table.to_string()))])))?;
    for handle in index_row_handles {
        ctx.indices.del(handle)?;
    }

    let column_row_handles = ctx
        .columns_relation()
        .select(Some(&row([("table_name", Value::Text(table.to_string()))])))?;
    for handle in column_row_handles {
        ctx.columns_relation().del(handle)?;
    }

    ctx.get_table(table)?.drop_relation()?;
    ctx.forget_table(table);

    let table_row_handle = ctx
        .tables
        .find_handle(table)?
        .ok_or_else(|| CoreError::UnknownTable(table.to_string()))?;
    ctx.tables.del(table_row_handle)?;

    Ok(QueryResult::message(format!("table {table} dropped")))
}

pub fn drop_index(ctx: &mut DbContext, table: &str, index_name: &str) -> Result<QueryResult> {
    let index = ctx.get_index(table, index_name)?;
    index.drop_index()?;
    ctx.forget_index(table, index_name);

    let handles = ctx.indices.select(Some(&row([
        ("table_name", Value::Text(table.to_string())),
        ("index_name", Value::Text(index_name.to_string())),
    ])))?;
    for handle in handles {
        ctx.indices.del(handle)?;
    }

    Ok(QueryResult::message(format!("index {index_name} dropped")))
}
