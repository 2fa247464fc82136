//! The statement and expression AST the executor consumes.
//!
//! This is a fixed, minimal shape (spec.md §6): the parser that produces it
//! is out of scope. Statements and expressions are tagged variants dispatched
//! by a single `match` on the kind, rather than a trait-object hierarchy.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaObjectKind {
    Table,
    Index,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowKind {
    Tables,
    Columns,
    Index,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    /// Raw type keyword as the parser saw it (`"INT"`, `"TEXT"`, `"DOUBLE"`, ...).
    /// Mapping to `ColumnAttribute` and rejecting unsupported keywords happens
    /// in the DDL executor, not here.
    pub data_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Create {
        kind: SchemaObjectKind,
        table: String,
        /// `Create::Table` fields.
        columns: Vec<ColumnDef>,
        if_not_exists: bool,
        /// `Create::Index` fields.
        index_name: Option<String>,
        index_columns: Vec<String>,
        index_type: Option<String>,
    },
    Drop {
        kind: SchemaObjectKind,
        table: String,
        index_name: Option<String>,
    },
    Show {
        kind: ShowKind,
        table: Option<String>,
    },
    Insert {
        table: String,
        columns: Option<Vec<String>>,
        values: Vec<Expr>,
    },
    Delete {
        table: String,
        where_clause: Option<Expr>,
    },
    Select {
        select_list: Vec<Expr>,
        from: String,
        where_clause: Option<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A binary operator node: `AND`, `=`, `<`, and so on. The executor only
    /// understands `AND` and `=`; anything else surfaces `UnsupportedPredicate`
    /// when it reaches WHERE lowering.
    Operator {
        op: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    ColumnRef(String),
    Literal(Literal),
    Star,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Int(i64),
    String(String),
}
