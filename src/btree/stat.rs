//! The B+Tree's statistics record: which block is the root, and the tree's
//! height. Lives at a reserved block in the original design; here it is just
//! a field on [`crate::btree::BTreeIndex`] since nodes are kept in memory
//! rather than paged from a real file.

#[derive(Debug, Clone, Copy)]
pub struct BTreeStat {
    pub root_id: u32,
    pub height: u32,
}
