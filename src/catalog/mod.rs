//! The catalog manager (C4): `_tables`, `_columns`, `_indices` built atop
//! relations, plus named access to user relations and indices.

use crate::ast::ColumnDef;
use crate::btree::BTreeIndex;
use crate::error::{CoreError, Result};
use crate::index::DbIndex;
use crate::relation::DbRelation;
use crate::schema::{ColumnAttribute, ColumnAttributes, ColumnNames, Handle};
use crate::storage::heap::HeapTable;
use crate::value::{row, Row, Value};
use std::collections::HashMap;
use std::str::FromStr;

pub const TABLES_NAME: &str = "_tables";
pub const COLUMNS_NAME: &str = "_columns";
pub const INDICES_NAME: &str = "_indices";

/// The three catalog relation names; never droppable (spec.md §4.2).
pub fn is_schema_relation(name: &str) -> bool {
    matches!(name, TABLES_NAME | COLUMNS_NAME | INDICES_NAME)
}

/// `_tables` itself, plus the cache of materialized user (and catalog)
/// relations. `_tables` has the hardcoded shape `{table_name: TEXT}` because,
/// per spec.md §4.1, it cannot consult itself.
pub struct Tables {
    relation: HeapTable,
    open: HashMap<String, HeapTable>,
    block_size: usize,
}

impl Tables {
    fn bootstrap(block_size: usize) -> Result<Self> {
        let mut relation = HeapTable::new(
            TABLES_NAME,
            vec!["table_name".to_string()],
            vec![ColumnAttribute::Text],
            block_size,
        );
        relation.create_if_not_exists()?;
        Ok(Tables {
            relation,
            open: HashMap::new(),
            block_size,
        })
    }

    pub fn insert(&mut self, row: &Row) -> Result<Handle> {
        self.relation.insert(row)
    }

    pub fn del(&mut self, handle: Handle) -> Result<()> {
        self.relation.del(handle)
    }

    pub fn select(&self, where_clause: Option<&Row>) -> Result<Vec<Handle>> {
        self.relation.select(where_clause)
    }

    pub fn project(&self, handle: Handle, columns: Option<&[String]>) -> Result<Row> {
        self.relation.project(handle, columns)
    }

    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(!self
            .select(Some(&row([("table_name", Value::Text(name.to_string()))])))?
            .is_empty())
    }

    /// Returns the handle of `name`'s row in `_tables`, if present.
    pub fn find_handle(&self, name: &str) -> Result<Option<Handle>> {
        Ok(self
            .select(Some(&row([("table_name", Value::Text(name.to_string()))])))?
            .into_iter()
            .next())
    }

    /// All user table names (the three catalog relations excluded), in
    /// insertion order.
    pub fn user_table_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for handle in self.select(None)? {
            let row = self.project(handle, None)?;
            if let Some(Value::Text(name)) = row.get("table_name") {
                if !is_schema_relation(name) {
                    names.push(name.clone());
                }
            }
        }
        Ok(names)
    }

    /// An already-materialized table, without triggering lazy construction.
    pub(crate) fn get_open(&self, name: &str) -> Option<&HeapTable> {
        self.open.get(name)
    }

    pub(crate) fn get_table(&mut self, name: &str, columns: &HeapTable) -> Result<&mut HeapTable> {
        if !self.open.contains_key(name) {
            if !self.contains(name)? {
                return Err(CoreError::UnknownTable(name.to_string()));
            }
            let (names, attrs) = read_columns_for(columns, name)?;
            let mut table = HeapTable::new(name, names, attrs, self.block_size);
            // First in-process access to a catalog-registered table also
            // materializes its physical relation (spec.md §4.2 step 4); later
            // accesses just return the cached, already-open instance.
            table.create_if_not_exists()?;
            self.open.insert(name.to_string(), table);
        }
        Ok(self.open.get_mut(name).expect("just inserted"))
    }

    fn forget(&mut self, name: &str) {
        self.open.remove(name);
    }
}

/// `_columns` row rows for `table_name`, in insertion (declaration) order.
fn read_columns_for(columns: &HeapTable, table_name: &str) -> Result<(ColumnNames, ColumnAttributes)> {
    let handles = columns.select(Some(&row([(
        "table_name",
        Value::Text(table_name.to_string()),
    )])))?;
    let mut names = Vec::with_capacity(handles.len());
    let mut attrs = Vec::with_capacity(handles.len());
    for handle in handles {
        let r = columns.project(handle, None)?;
        let Some(Value::Text(column_name)) = r.get("column_name") else {
            return Err(CoreError::StorageError(
                crate::storage::heap::HeapError::Corrupt("_columns row missing column_name"),
            ));
        };
        let Some(Value::Text(data_type)) = r.get("data_type") else {
            return Err(CoreError::StorageError(
                crate::storage::heap::HeapError::Corrupt("_columns row missing data_type"),
            ));
        };
        let attr = ColumnAttribute::from_str(data_type)
            .map_err(|_| CoreError::UnsupportedType(data_type.clone()))?;
        names.push(column_name.clone());
        attrs.push(attr);
    }
    Ok((names, attrs))
}

/// `_indices` itself, plus the cache of opened B+Tree indices.
pub struct Indices {
    relation: HeapTable,
    open: HashMap<(String, String), BTreeIndex>,
    block_size: usize,
}

impl Indices {
    fn bootstrap(block_size: usize) -> Result<Self> {
        let mut relation = HeapTable::new(
            INDICES_NAME,
            vec![
                "table_name".to_string(),
                "index_name".to_string(),
                "seq_in_index".to_string(),
                "column_name".to_string(),
                "index_type".to_string(),
                "is_unique".to_string(),
            ],
            vec![
                ColumnAttribute::Text,
                ColumnAttribute::Text,
                ColumnAttribute::Int,
                ColumnAttribute::Text,
                ColumnAttribute::Text,
                ColumnAttribute::Boolean,
            ],
            block_size,
        );
        relation.create_if_not_exists()?;
        Ok(Indices {
            relation,
            open: HashMap::new(),
            block_size,
        })
    }

    pub fn insert(&mut self, row: &Row) -> Result<Handle> {
        self.relation.insert(row)
    }

    pub fn del(&mut self, handle: Handle) -> Result<()> {
        self.relation.del(handle)
    }

    pub fn select(&self, where_clause: Option<&Row>) -> Result<Vec<Handle>> {
        self.relation.select(where_clause)
    }

    pub fn project(&self, handle: Handle, columns: Option<&[String]>) -> Result<Row> {
        self.relation.project(handle, columns)
    }

    /// Distinct index names on `table`, grouped by `(table_name, index_name)`.
    pub fn get_index_names(&self, table: &str) -> Result<Vec<String>> {
        let handles = self.select(Some(&row([("table_name", Value::Text(table.to_string()))])))?;
        let mut names = Vec::new();
        for handle in handles {
            let r = self.project(handle, None)?;
            if let Some(Value::Text(name)) = r.get("index_name") {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        Ok(names)
    }

    fn rows_for_index(&self, table: &str, name: &str) -> Result<Vec<Row>> {
        let handles = self.select(Some(&row([
            ("table_name", Value::Text(table.to_string())),
            ("index_name", Value::Text(name.to_string())),
        ])))?;
        let mut rows: Vec<Row> = handles
            .into_iter()
            .map(|h| self.project(h, None))
            .collect::<Result<Vec<_>>>()?;
        rows.sort_by_key(|r| match r.get("seq_in_index") {
            Some(Value::Int(n)) => *n,
            _ => i64::MAX,
        });
        Ok(rows)
    }

    pub(crate) fn get_index(
        &mut self,
        table: &str,
        name: &str,
        tables: &mut Tables,
        columns: &HeapTable,
    ) -> Result<&mut BTreeIndex> {
        let key = (table.to_string(), name.to_string());
        if !self.open.contains_key(&key) {
            let rows = self.rows_for_index(table, name)?;
            if rows.is_empty() {
                return Err(CoreError::UnknownIndex(name.to_string()));
            }
            let mut key_columns = Vec::with_capacity(rows.len());
            let mut is_unique = true;
            for r in &rows {
                if let Some(Value::Text(col)) = r.get("column_name") {
                    key_columns.push(col.clone());
                }
                if let Some(Value::Boolean(flag)) = r.get("is_unique") {
                    is_unique = *flag;
                }
            }
            let relation = tables.get_table(table, columns)?;
            let key_profile = relation.get_column_attributes(Some(&key_columns));
            let index = BTreeIndex::new(
                table,
                name,
                key_columns,
                key_profile,
                is_unique,
                crate::btree::DEFAULT_ORDER,
            )?;
            self.open.insert(key.clone(), index);
        }
        Ok(self.open.get_mut(&key).expect("just inserted"))
    }

    fn forget(&mut self, table: &str, name: &str) {
        self.open.remove(&(table.to_string(), name.to_string()));
    }
}

/// The explicit database-context value threaded through `execute()`
/// (spec.md §9: "Prefer an explicit database-context value ... rather than
/// rely on global mutable state"). Owns the three catalog relations and the
/// caches of materialized user relations and opened indices.
pub struct DbContext {
    pub tables: Tables,
    pub(crate) columns: HeapTable,
    pub indices: Indices,
    block_size: usize,
}

impl DbContext {
    /// Lazily materializes the catalog on first use: creates `_tables`,
    /// `_columns`, `_indices` if absent, and registers the three of them in
    /// `_tables` (spec.md §3: "`_tables` contains exactly the set of
    /// existing relations, including the three catalogs").
    pub fn bootstrap(block_size: usize) -> Result<Self> {
        let tables = Tables::bootstrap(block_size)?;
        let mut columns = HeapTable::new(
            COLUMNS_NAME,
            vec![
                "table_name".to_string(),
                "column_name".to_string(),
                "data_type".to_string(),
            ],
            vec![
                ColumnAttribute::Text,
                ColumnAttribute::Text,
                ColumnAttribute::Text,
            ],
            block_size,
        );
        columns.create_if_not_exists()?;
        let indices = Indices::bootstrap(block_size)?;

        let mut ctx = DbContext {
            tables,
            columns,
            indices,
            block_size,
        };
        for name in [TABLES_NAME, COLUMNS_NAME, INDICES_NAME] {
            if !ctx.tables.contains(name)? {
                ctx.tables.insert(&row([("table_name", Value::Text(name.to_string()))]))?;
            }
        }
        Ok(ctx)
    }

    pub fn get_table(&mut self, name: &str) -> Result<&mut HeapTable> {
        match name {
            TABLES_NAME => Ok(&mut self.tables.relation),
            COLUMNS_NAME => Ok(&mut self.columns),
            INDICES_NAME => Ok(&mut self.indices.relation),
            _ => self.tables.get_table(name, &self.columns),
        }
    }

    pub fn columns_relation(&mut self) -> &mut HeapTable {
        &mut self.columns
    }

    pub fn get_index(&mut self, table: &str, name: &str) -> Result<&mut BTreeIndex> {
        self.indices.get_index(table, name, &mut self.tables, &self.columns)
    }

    pub fn forget_table(&mut self, name: &str) {
        self.tables.forget(name);
    }

    pub fn forget_index(&mut self, table: &str, name: &str) {
        self.indices.forget(table, name);
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

/// Builds a `ColumnDef` list into `_columns` rows ready for insertion, after
/// mapping each declared type keyword to a `ColumnAttribute`. Used by the
/// DDL executor; kept here because it is purely catalog-shape logic.
pub fn map_column_defs(columns: &[ColumnDef]) -> Result<Vec<(String, ColumnAttribute)>> {
    columns
        .iter()
        .map(|c| {
            ColumnAttribute::from_str(&c.data_type)
                .map(|attr| (c.name.clone(), attr))
                .map_err(|_| CoreError::UnsupportedType(c.data_type.clone()))
        })
        .collect()
}
