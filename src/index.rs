//! The contract an index exposes to the core (spec.md §6).
//!
//! Only one concrete implementation exists in this crate ([`crate::btree`]),
//! but the operations the DML executor and catalog need are named here so
//! the two don't have to know about B+Tree internals. `create()` is not part
//! of this trait: it needs a scan of the owning relation, which only the DDL
//! executor (who already holds a concrete relation) can provide; see
//! `BTreeIndex::create`.
use crate::error::Result;
use crate::schema::Handle;
use crate::value::Row;

pub trait DbIndex {
    fn drop_index(&mut self) -> Result<()>;
    fn open(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;

    fn lookup(&self, key: &Row) -> Result<Vec<Handle>>;
    /// Out of scope per spec.md §4.6; implementations return `NotImplemented`.
    fn range(&self, min: Option<&Row>, max: Option<&Row>) -> Result<Vec<Handle>>;
    fn insert(&mut self, handle: Handle, row: &Row) -> Result<()>;
    /// Out of scope per spec.md §4.6; implementations return `NotImplemented`.
    fn del(&mut self, handle: Handle) -> Result<()>;
}
