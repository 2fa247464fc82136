//! The evaluation plan (C7): a small tagged tree of plan nodes, one rewrite
//! rule, and two evaluation modes.

use crate::catalog::DbContext;
use crate::error::Result;
use crate::schema::Handle;
use crate::value::Row;

/// A plan node. `TableScan`'s `predicate` starts `None` (every live handle);
/// `optimize()` may push a `Select` immediately above it down into this
/// field, since the relation interface promises `select(where)` returns
/// matching handles directly.
#[derive(Debug, Clone)]
pub enum PlanNode {
    TableScan {
        table: String,
        predicate: Option<Row>,
    },
    Select {
        predicate: Row,
        child: Box<PlanNode>,
    },
    ProjectAll {
        child: Box<PlanNode>,
    },
    Project {
        columns: Vec<String>,
        child: Box<PlanNode>,
    },
}

impl PlanNode {
    pub fn table_scan(table: impl Into<String>) -> Self {
        PlanNode::TableScan {
            table: table.into(),
            predicate: None,
        }
    }

    /// The only rewrite rule the core performs: a `Select` directly above a
    /// `TableScan` is pushed down into the scan's own predicate. Any other
    /// shape is returned unchanged.
    pub fn optimize(self) -> Self {
        match self {
            PlanNode::Select { predicate, child } => match *child {
                PlanNode::TableScan { table, predicate: None } => PlanNode::TableScan {
                    table,
                    predicate: Some(predicate),
                },
                other => PlanNode::Select {
                    predicate,
                    child: Box::new(other.optimize()),
                },
            },
            PlanNode::ProjectAll { child } => PlanNode::ProjectAll {
                child: Box::new(child.optimize()),
            },
            PlanNode::Project { columns, child } => PlanNode::Project {
                columns,
                child: Box::new(child.optimize()),
            },
            leaf @ PlanNode::TableScan { .. } => leaf,
        }
    }

    /// Yields handles of the relation named by the plan's `TableScan`, and
    /// the relation's own name, for mutating statements (DELETE) that need
    /// both.
    pub fn pipeline(&self, ctx: &mut DbContext) -> Result<(String, Vec<Handle>)> {
        match self {
            PlanNode::TableScan { table, predicate } => {
                let relation = ctx.get_table(table)?;
                Ok((table.clone(), relation.select(predicate.as_ref())?))
            }
            PlanNode::Select { predicate, child } => {
                let (table, handles) = child.pipeline(ctx)?;
                let relation = ctx.get_table(&table)?;
                let mut kept = Vec::new();
                for h in handles {
                    let row = relation.project(h, None)?;
                    if predicate.iter().all(|(k, v)| row.get(k) == Some(v)) {
                        kept.push(h);
                    }
                }
                Ok((table, kept))
            }
            PlanNode::ProjectAll { child } | PlanNode::Project { child, .. } => child.pipeline(ctx),
        }
    }

    /// Yields rows, for SELECT.
    pub fn evaluate(&self, ctx: &mut DbContext) -> Result<Vec<Row>> {
        match self {
            PlanNode::TableScan { table, predicate } => {
                let relation = ctx.get_table(table)?;
                let handles = relation.select(predicate.as_ref())?;
                handles.into_iter().map(|h| relation.project(h, None)).collect()
            }
            PlanNode::Select { predicate, child } => {
                let rows = child.evaluate(ctx)?;
                Ok(rows
                    .into_iter()
                    .filter(|row| predicate.iter().all(|(k, v)| row.get(k) == Some(v)))
                    .collect())
            }
            PlanNode::ProjectAll { child } => child.evaluate(ctx),
            PlanNode::Project { columns, child } => {
                let rows = child.evaluate(ctx)?;
                Ok(rows
                    .into_iter()
                    .map(|row| {
                        columns
                            .iter()
                            .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
                            .collect()
                    })
                    .collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimize_pushes_select_into_table_scan() {
        let mut predicate = Row::new();
        predicate.insert("a".to_string(), crate::value::Value::Int(1));
        let plan = PlanNode::Select {
            predicate: predicate.clone(),
            child: Box::new(PlanNode::table_scan("t")),
        };
        let optimized = plan.optimize();
        match optimized {
            PlanNode::TableScan { table, predicate: p } => {
                assert_eq!(table, "t");
                assert_eq!(p, Some(predicate));
            }
            _ => panic!("expected pushdown into TableScan"),
        }
    }

    #[test]
    fn optimize_leaves_other_shapes_unchanged() {
        let plan = PlanNode::ProjectAll {
            child: Box::new(PlanNode::table_scan("t")),
        };
        let optimized = plan.optimize();
        assert!(matches!(optimized, PlanNode::ProjectAll { .. }));
    }
}
