//! The contract a heap relation (and its backing file) exposes to the core.
//!
//! These traits are the boundary spec.md §6 calls "storage below the relation
//! abstraction" — page files, buffer pools, slotted pages live behind them.
//! The core only ever calls through `DbRelation`; `DbFile` is the
//! block-addressable capability a relation is built on top of, named here so
//! an implementation has somewhere to put it.

use crate::error::Result;
use crate::schema::{ColumnAttributes, ColumnNames, Handle};
use crate::value::Row;

/// A heap-organized relation: insert/select/project/delete over handles.
pub trait DbRelation {
    fn create(&mut self) -> Result<()>;
    fn create_if_not_exists(&mut self) -> Result<()>;
    fn drop_relation(&mut self) -> Result<()>;
    fn open(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;

    fn insert(&mut self, row: &Row) -> Result<Handle>;
    fn del(&mut self, handle: Handle) -> Result<()>;
    /// Optional: not every relation needs in-place update support.
    fn update(&mut self, _handle: Handle, _row: &Row) -> Result<()> {
        Err(crate::error::CoreError::NotImplemented)
    }

    /// Returns handles of rows matching an equality conjunction, or every
    /// live handle when `where_clause` is `None`.
    fn select(&self, where_clause: Option<&Row>) -> Result<Vec<Handle>>;
    fn project(&self, handle: Handle, columns: Option<&[String]>) -> Result<Row>;

    fn get_column_names(&self) -> ColumnNames;
    fn get_column_attributes(&self, columns: Option<&[String]>) -> ColumnAttributes;
    fn get_table_name(&self) -> &str;
}

/// Block-addressable file underneath a `DbRelation`.
pub trait DbFile {
    fn create(&mut self) -> Result<()>;
    fn drop_file(&mut self) -> Result<()>;
    fn open(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;

    /// Allocates a fresh block and returns its id.
    fn get_new_block(&mut self) -> Result<u32>;
    fn get_block(&self, block_id: u32) -> Result<Vec<u8>>;
    fn put_block(&mut self, block_id: u32, data: Vec<u8>) -> Result<()>;
    fn block_ids(&self) -> Vec<u32>;
}
