//! Unique B+Tree secondary index.
//!
//! Grounded directly on the node/page split algorithm of the course project
//! this crate's behavior is drawn from: recursive insert returning an
//! optional split, root splits wrapping the old root as the new interior's
//! `first` child, height tracked in a small stats record. Node storage here
//! is an in-memory block map rather than a paged file, matching
//! SPEC_FULL.md's note that the storage layer proper is out of scope; nodes
//! are still addressed purely by block id, never by pointer, so a real
//! paged backing could be dropped in without touching this module's logic.

mod key;
mod node;
mod stat;

pub use key::{extract_key, Key};
pub use node::{BlockId, Node};
pub use stat::BTreeStat;

use crate::error::{CoreError, Result};
use crate::index::DbIndex;
use crate::relation::DbRelation;
use crate::schema::{ColumnAttributes, Handle};
use crate::value::Row;
use std::collections::HashMap;

/// Default maximum number of entries in a leaf or boundaries in an interior
/// node before it splits. Kept small enough that modest test data exercises
/// splitting without needing thousands of rows.
pub const DEFAULT_ORDER: usize = 64;

pub struct BTreeIndex {
    table_name: String,
    index_name: String,
    key_columns: Vec<String>,
    #[allow(dead_code)] // captured for introspection; comparisons go through `Value`'s own Ord
    key_profile: ColumnAttributes,
    is_unique: bool,
    max_entries: usize,
    nodes: HashMap<BlockId, Node>,
    next_block_id: BlockId,
    stat: BTreeStat,
    is_open: bool,
}

impl BTreeIndex {
    /// Constructs a (closed, unpopulated) index. Non-unique indices are
    /// rejected here, matching spec.md §4.6 ("Non-unique indices are
    /// rejected at construction").
    pub fn new(
        table_name: impl Into<String>,
        index_name: impl Into<String>,
        key_columns: Vec<String>,
        key_profile: ColumnAttributes,
        is_unique: bool,
        max_entries: usize,
    ) -> Result<Self> {
        if !is_unique {
            return Err(CoreError::NotImplemented);
        }
        Ok(BTreeIndex {
            table_name: table_name.into(),
            index_name: index_name.into(),
            key_columns,
            key_profile,
            is_unique,
            max_entries,
            nodes: HashMap::new(),
            next_block_id: 1,
            stat: BTreeStat { root_id: 0, height: 0 },
            is_open: false,
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    pub fn stat(&self) -> BTreeStat {
        self.stat
    }

    fn alloc_block(&mut self) -> BlockId {
        let id = self.next_block_id;
        self.next_block_id += 1;
        id
    }

    fn tkey(&self, row: &Row) -> Key {
        extract_key(row, &self.key_columns)
    }

    /// Transitions the index from Closed to Open, bulk-loading by scanning
    /// the relation and inserting every row, one at a time (single-pass:
    /// no second accumulator list is kept alongside this loop).
    pub fn create(&mut self, relation: &dyn DbRelation) -> Result<()> {
        let root_id = self.alloc_block();
        self.nodes.insert(root_id, Node::empty_leaf());
        self.stat = BTreeStat { root_id, height: 1 };
        self.is_open = true;

        for handle in relation.select(None)? {
            let row = relation.project(handle, Some(self.key_columns.as_slice()))?;
            self.insert(handle, &row)?;
        }
        Ok(())
    }

    fn lookup_node(&self, block_id: BlockId, height: u32, key: &Key) -> Vec<Handle> {
        let node = self.nodes.get(&block_id).expect("dangling block id");
        match node {
            Node::Leaf(entries) => node::Node::leaf_find_eq(entries, key)
                .into_iter()
                .collect(),
            Node::Interior { first, boundaries } => {
                let child = node::Node::interior_find(*first, boundaries, key);
                self.lookup_node(child, height - 1, key)
            }
        }
    }

    fn insert_node(&mut self, block_id: BlockId, height: u32, key: &Key, handle: Handle) -> Result<node::Split> {
        if height == 1 {
            let node = self.nodes.get_mut(&block_id).expect("dangling block id");
            let Node::Leaf(entries) = node else {
                unreachable!("height 1 must be a leaf")
            };
            node::leaf_insert(entries, key.clone(), handle).map_err(|()| CoreError::DuplicateKey)?;
            if entries.len() > self.max_entries {
                let (new_node, boundary) = node::split_leaf(entries);
                let new_block_id = self.alloc_block();
                self.nodes.insert(new_block_id, new_node);
                return Ok(Some((boundary, new_block_id)));
            }
            return Ok(None);
        }

        let child = {
            let node = self.nodes.get(&block_id).expect("dangling block id");
            let Node::Interior { first, boundaries } = node else {
                unreachable!("height > 1 must be interior")
            };
            node::Node::interior_find(*first, boundaries, key)
        };

        let child_split = self.insert_node(child, height - 1, key, handle)?;
        let Some((boundary, new_child)) = child_split else {
            return Ok(None);
        };

        let node = self.nodes.get_mut(&block_id).expect("dangling block id");
        let Node::Interior { boundaries, .. } = node else {
            unreachable!("height > 1 must be interior")
        };
        node::interior_insert(boundaries, boundary, new_child);
        if boundaries.len() > self.max_entries {
            let (new_node, promoted) = node::split_interior(boundaries);
            let new_block_id = self.alloc_block();
            self.nodes.insert(new_block_id, new_node);
            return Ok(Some((promoted, new_block_id)));
        }
        Ok(None)
    }
}

impl DbIndex for BTreeIndex {
    fn drop_index(&mut self) -> Result<()> {
        self.nodes.clear();
        self.is_open = false;
        Ok(())
    }

    fn open(&mut self) -> Result<()> {
        self.is_open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.is_open = false;
        Ok(())
    }

    fn lookup(&self, key_dict: &Row) -> Result<Vec<Handle>> {
        debug_assert!(self.is_open, "lookup on a closed index");
        let key = self.tkey(key_dict);
        Ok(self.lookup_node(self.stat.root_id, self.stat.height, &key))
    }

    fn range(&self, _min: Option<&Row>, _max: Option<&Row>) -> Result<Vec<Handle>> {
        Err(CoreError::NotImplemented)
    }

    fn insert(&mut self, handle: Handle, row: &Row) -> Result<()> {
        debug_assert!(self.is_open, "insert on a closed index");
        let key = self.tkey(row);
        if let Some((boundary, new_child)) =
            self.insert_node(self.stat.root_id, self.stat.height, &key, handle)?
        {
            let new_root_id = self.alloc_block();
            self.nodes.insert(
                new_root_id,
                Node::Interior {
                    first: self.stat.root_id,
                    boundaries: vec![(boundary, new_child)],
                },
            );
            self.stat.root_id = new_root_id;
            self.stat.height += 1;
        }
        Ok(())
    }

    fn del(&mut self, _handle: Handle) -> Result<()> {
        Err(CoreError::NotImplemented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnAttribute;
    use crate::storage::heap::HeapTable;
    use crate::value::{row, Value};

    fn index(max_entries: usize) -> BTreeIndex {
        BTreeIndex::new(
            "t",
            "i",
            vec!["a".to_string()],
            vec![ColumnAttribute::Int],
            true,
            max_entries,
        )
        .unwrap()
    }

    #[test]
    fn non_unique_index_rejected_at_construction() {
        let result = BTreeIndex::new(
            "t",
            "i",
            vec!["a".to_string()],
            vec![ColumnAttribute::Int],
            false,
            64,
        );
        assert!(matches!(result, Err(CoreError::NotImplemented)));
    }

    #[test]
    fn create_bulk_loads_and_lookup_finds_rows() {
        let mut table = HeapTable::new(
            "t",
            vec!["a".to_string(), "b".to_string()],
            vec![ColumnAttribute::Int, ColumnAttribute::Int],
            4096,
        );
        table.create().unwrap();
        for a in 100..1100 {
            let b = -(a - 100);
            table
                .insert(&row([("a", Value::Int(a)), ("b", Value::Int(b))]))
                .unwrap();
        }

        let mut idx = index(8);
        idx.create(&table).unwrap();

        let found = idx.lookup(&row([("a", Value::Int(150))])).unwrap();
        assert_eq!(found.len(), 1);
        let r = table.project(found[0], None).unwrap();
        assert_eq!(r.get("a"), Some(&Value::Int(150)));
        assert_eq!(r.get("b"), Some(&Value::Int(-50)));

        assert!(idx.lookup(&row([("a", Value::Int(6))])).unwrap().is_empty());
    }

    #[test]
    fn duplicate_key_insert_fails() {
        let mut idx = index(8);
        idx.create_root_for_test();
        idx.insert(Handle::new(1, 0), &row([("a", Value::Int(1))])).unwrap();
        let err = idx.insert(Handle::new(1, 1), &row([("a", Value::Int(1))]));
        assert!(matches!(err, Err(CoreError::DuplicateKey)));
    }

    #[test]
    fn root_split_increments_height_and_wraps_old_root() {
        let mut idx = index(2);
        idx.create_root_for_test();
        for a in 0..10 {
            idx.insert(Handle::new(1, a as u16), &row([("a", Value::Int(a))]))
                .unwrap();
        }
        assert!(idx.stat().height >= 2);
        let root = idx.nodes.get(&idx.stat().root_id).unwrap();
        match root {
            Node::Interior { first, .. } => {
                assert!(idx.nodes.contains_key(first));
            }
            Node::Leaf(_) => panic!("expected interior root after splits"),
        }
    }

    #[test]
    fn leaves_stay_in_strictly_ascending_key_order() {
        let mut idx = index(3);
        idx.create_root_for_test();
        for a in [9, 1, 5, 3, 7, 2, 8, 4, 6, 0] {
            idx.insert(Handle::new(1, a as u16), &row([("a", Value::Int(a))]))
                .unwrap();
        }
        for node in idx.nodes.values() {
            if let Node::Leaf(entries) = node {
                let keys: Vec<_> = entries.iter().map(|(k, _)| k.clone()).collect();
                let mut sorted = keys.clone();
                sorted.sort();
                assert_eq!(keys, sorted, "leaf keys must be strictly ascending");
            }
        }
    }

    impl BTreeIndex {
        /// Test-only helper: set up a root leaf without scanning a relation,
        /// for tests that only want to exercise the insert/split path.
        fn create_root_for_test(&mut self) {
            let root_id = self.alloc_block();
            self.nodes.insert(root_id, Node::empty_leaf());
            self.stat = BTreeStat { root_id, height: 1 };
            self.is_open = true;
        }
    }
}
