//! Typestate builder for `Select` ASTs: columns first, then the relation,
//! then the optional clauses.

use crate::query::ast::{
    common::{JoinKind, OrderDir, TableRef},
    expr::Expr,
    select::{FromClause, JoinClause, OrderByExpr, Select},
};

#[derive(Debug, Default, Clone)]
pub struct InitialState;

#[derive(Debug, Default, Clone)]
pub struct SelectState;

/// A relation is set; clauses may follow in any order.
#[derive(Debug, Default, Clone)]
pub struct FromState;

#[derive(Debug, Clone)]
pub struct SelectBuilder<State> {
    ast: Select,
    state: State,
}

impl Default for SelectBuilder<InitialState> {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectBuilder<InitialState> {
    pub fn new() -> Self {
        Self {
            ast: Select::default(),
            state: InitialState,
        }
    }

    /// Sets the select list. An empty list renders as `*`.
    pub fn select(self, columns: Vec<Expr>) -> SelectBuilder<SelectState> {
        SelectBuilder {
            ast: Select {
                columns,
                ..self.ast
            },
            state: SelectState,
        }
    }
}

impl SelectBuilder<SelectState> {
    pub fn from(self, table: TableRef, alias: Option<&str>) -> SelectBuilder<FromState> {
        self.with_from(FromClause::Table {
            table,
            alias: alias.map(String::from),
        })
    }

    /// Reads from a virtual relation whose source is substituted at compile time.
    pub fn from_relation(self, relation: &str) -> SelectBuilder<FromState> {
        self.with_from(FromClause::Relation(relation.to_string()))
    }

    fn with_from(mut self, from: FromClause) -> SelectBuilder<FromState> {
        self.ast.from = Some(from);
        SelectBuilder {
            ast: self.ast,
            state: FromState,
        }
    }
}

impl SelectBuilder<FromState> {
    pub fn join(mut self, kind: JoinKind, table: TableRef, alias: Option<&str>, on: Expr) -> Self {
        self.ast.joins.push(JoinClause {
            kind,
            table,
            alias: alias.map(String::from),
            on,
        });
        self
    }

    /// Adds a `WHERE` condition, AND-ed with any earlier one.
    pub fn where_clause(mut self, condition: Expr) -> Self {
        self.ast.where_clause = Some(match self.ast.where_clause.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    pub fn group_by(mut self, expr: Expr) -> Self {
        self.ast.group_by.push(expr);
        self
    }

    pub fn order_by(mut self, expr: Expr, direction: Option<OrderDir>) -> Self {
        self.ast.order_by.push(OrderByExpr { expr, direction });
        self
    }

    pub fn limit(mut self, limit: Expr) -> Self {
        self.ast.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: Expr) -> Self {
        self.ast.offset = Some(offset);
        self
    }

    pub fn build(self) -> Select {
        self.ast
    }
}

#[cfg(test)]
mod tests {
    use model::core::value::Value;

    use crate::query::{
        ast::{
            common::{JoinKind, OrderDir},
            expr::{BinaryOp, BinaryOperator, Expr},
            select::FromClause,
        },
        builder::select::SelectBuilder,
        ident, qual_ident, value,
    };

    fn gt(left: Expr, right: Expr) -> Expr {
        Expr::BinaryOp(Box::new(BinaryOp {
            left,
            op: BinaryOperator::Gt,
            right,
        }))
    }

    #[test]
    fn test_build_from_table() {
        let ast = SelectBuilder::new()
            .select(vec![ident("id"), ident("height")])
            .from(crate::table_ref!("human"), None)
            .build();

        assert_eq!(ast.columns, vec![ident("id"), ident("height")]);
        assert!(matches!(
            ast.from,
            Some(FromClause::Table { ref table, alias: None }) if table.name == "human"
        ));
        assert!(ast.where_clause.is_none());
    }

    #[test]
    fn test_build_from_relation() {
        let ast = SelectBuilder::new()
            .select(vec![qual_ident("backend", "pid")])
            .from_relation("backend")
            .build();

        assert_eq!(ast.from, Some(FromClause::Relation("backend".to_string())));
    }

    #[test]
    fn test_where_conditions_are_combined() {
        let ast = SelectBuilder::new()
            .select(vec![])
            .from(crate::table_ref!("human"), None)
            .where_clause(gt(ident("height"), value(Value::Int(150))))
            .where_clause(gt(ident("weight"), value(Value::Int(60))))
            .build();

        assert_eq!(
            ast.where_clause,
            Some(
                gt(ident("height"), value(Value::Int(150)))
                    .and(gt(ident("weight"), value(Value::Int(60))))
            )
        );
    }

    #[test]
    fn test_build_aggregate_with_join_and_paging() {
        let ast = SelectBuilder::new()
            .select(vec![qual_ident("o", "name"), qual_ident("i", "count")])
            .from(crate::table_ref!("inventory_record"), Some("i"))
            .join(
                JoinKind::Inner,
                crate::table_ref!("owner"),
                Some("o"),
                Expr::BinaryOp(Box::new(BinaryOp {
                    left: qual_ident("o", "id"),
                    op: BinaryOperator::Eq,
                    right: qual_ident("i", "owner_id"),
                })),
            )
            .group_by(qual_ident("o", "name"))
            .order_by(qual_ident("o", "name"), Some(OrderDir::Asc))
            .limit(value(Value::Int(20)))
            .offset(value(Value::Int(40)))
            .build();

        assert_eq!(ast.joins.len(), 1);
        assert_eq!(ast.group_by, vec![qual_ident("o", "name")]);
        assert_eq!(ast.order_by[0].direction, Some(OrderDir::Asc));
        assert_eq!(ast.limit, Some(value(Value::Int(20))));
        assert_eq!(ast.offset, Some(value(Value::Int(40))));
    }
}
