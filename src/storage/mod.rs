//! In-memory reference implementation of the relation interface (§6).
//!
//! Everything below the `DbRelation`/`DbFile` boundary is, per the core's
//! scope, somebody else's problem. This module is that somebody: a small,
//! slotted-page-flavored in-memory heap, just enough to make the rest of the
//! crate testable end-to-end. It does not attempt durability, buffering, or a
//! real on-disk layout.

pub mod heap;
