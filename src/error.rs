//! Error taxonomy for the execution core.
//!
//! Variants are grouped by *kind*, matching the failure categories the core
//! distinguishes, not by call site. Storage-layer failures are caught only at
//! the executor's outer boundary and rewrapped here; every other error
//! propagates unchanged.

use crate::storage::heap::HeapError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("statement kind not supported by the executor")]
    ParseDispatch,

    #[error("unsupported column type: {0}")]
    UnsupportedType(String),

    #[error("unsupported literal type in this context")]
    UnsupportedLiteralType,

    #[error("unsupported predicate: only AND of column = literal is accepted")]
    UnsupportedPredicate,

    #[error("unknown table: {0}")]
    UnknownTable(String),

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("unknown index: {0}")]
    UnknownIndex(String),

    #[error("cannot drop schema relation: {0}")]
    SchemaProtected(String),

    #[error("duplicate key in unique index")]
    DuplicateKey,

    #[error("not implemented")]
    NotImplemented,

    #[error("DbRelationError: {0}")]
    StorageError(#[from] HeapError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
