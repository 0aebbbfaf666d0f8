use crate::query::{
    ast::{
        common::{JoinKind, OrderDir},
        select::{FromClause, JoinClause, OrderByExpr, Select},
    },
    renderer::{Render, Renderer},
};

impl Render for Select {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("SELECT ");
        if self.columns.is_empty() {
            r.sql.push('*');
        } else {
            render_list(r, &self.columns);
        }

        if let Some(from) = &self.from {
            r.sql.push(' ');
            from.render(r);
        }

        for join in &self.joins {
            r.sql.push(' ');
            join.render(r);
        }

        if let Some(condition) = &self.where_clause {
            r.sql.push_str(" WHERE ");
            condition.render(r);
        }

        if !self.group_by.is_empty() {
            r.sql.push_str(" GROUP BY ");
            render_list(r, &self.group_by);
        }

        if !self.order_by.is_empty() {
            r.sql.push_str(" ORDER BY ");
            render_list(r, &self.order_by);
        }

        // Paging values are bound like any other parameter.
        if let Some(limit) = &self.limit {
            r.sql.push_str(" LIMIT ");
            limit.render(r);
        }
        if let Some(offset) = &self.offset {
            r.sql.push_str(" OFFSET ");
            offset.render(r);
        }
    }
}

/// Renders `items` separated by commas.
pub(crate) fn render_list<T: Render>(r: &mut Renderer, items: &[T]) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            r.sql.push_str(", ");
        }
        item.render(r);
    }
}

impl Render for FromClause {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("FROM ");
        match self {
            FromClause::Table { table, alias } => {
                r.render_table_ref(table);
                if let Some(alias) = alias {
                    r.sql.push_str(" AS ");
                    r.push_identifier(alias);
                }
            }
            FromClause::Relation(name) => r.push_slot(name),
        }
    }
}

impl Render for JoinClause {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str(match self.kind {
            JoinKind::Inner => "INNER JOIN ",
            JoinKind::Left => "LEFT JOIN ",
            JoinKind::Right => "RIGHT JOIN ",
            JoinKind::Full => "FULL OUTER JOIN ",
        });
        r.render_table_ref(&self.table);
        if let Some(alias) = &self.alias {
            r.sql.push_str(" AS ");
            r.push_identifier(alias);
        }
        r.sql.push_str(" ON ");
        self.on.render(r);
    }
}

impl Render for OrderByExpr {
    fn render(&self, r: &mut Renderer) {
        self.expr.render(r);
        match self.direction {
            Some(OrderDir::Asc) => r.sql.push_str(" ASC"),
            Some(OrderDir::Desc) => r.sql.push_str(" DESC"),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use model::core::value::Value;

    use crate::{
        compiler::tokens::{ClauseToken, SqlFragment},
        query::{
            ast::{
                common::{JoinKind, OrderDir},
                expr::{BinaryOp, BinaryOperator, Expr, FunctionCall},
                select::{FromClause, JoinClause, OrderByExpr, Select},
            },
            dialect::Postgres,
            ident, qual_ident,
            renderer::{Render, Renderer},
            value,
        },
    };

    fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
        Expr::BinaryOp(Box::new(BinaryOp { left, op, right }))
    }

    fn render(select: &Select) -> (String, Vec<Value>) {
        let mut renderer = Renderer::new(&Postgres);
        select.render(&mut renderer);
        renderer.finish()
    }

    #[test]
    fn test_filtered_table_select() {
        let ast = Select {
            columns: vec![ident("id"), ident("height")],
            from: Some(FromClause::Table {
                table: crate::table_ref!("human"),
                alias: None,
            }),
            where_clause: Some(binary(ident("height"), BinaryOperator::GtEq, value(Value::Int(180)))),
            ..Default::default()
        };

        let (sql, params) = render(&ast);
        assert_eq!(sql, r#"SELECT "id", "height" FROM "human" WHERE ("height" >= %s)"#);
        assert_eq!(params, vec![Value::Int(180)]);
    }

    #[test]
    fn test_aggregate_select_with_join_and_paging() {
        let ast = Select {
            columns: vec![
                qual_ident("o", "name"),
                Expr::FunctionCall(FunctionCall {
                    name: "SUM".to_string(),
                    args: vec![qual_ident("i", "count")],
                    wildcard: false,
                })
                .alias("total"),
            ],
            from: Some(FromClause::Table {
                table: crate::table_ref!("inventory_record"),
                alias: Some("i".to_string()),
            }),
            joins: vec![JoinClause {
                kind: JoinKind::Left,
                table: crate::table_ref!("owner"),
                alias: Some("o".to_string()),
                on: binary(qual_ident("o", "id"), BinaryOperator::Eq, qual_ident("i", "owner_id")),
            }],
            where_clause: Some(binary(
                qual_ident("o", "name"),
                BinaryOperator::NotEq,
                value(Value::from("nobody")),
            )),
            group_by: vec![qual_ident("o", "name")],
            order_by: vec![OrderByExpr {
                expr: ident("total"),
                direction: Some(OrderDir::Desc),
            }],
            limit: Some(value(Value::Int(10))),
            offset: Some(value(Value::Int(20))),
        };

        let (sql, params) = render(&ast);
        assert_eq!(
            sql,
            r#"SELECT "o"."name", SUM("i"."count") AS "total" FROM "inventory_record" AS "i" LEFT JOIN "owner" AS "o" ON ("o"."id" = "i"."owner_id") WHERE ("o"."name" <> %s) GROUP BY "o"."name" ORDER BY "total" DESC LIMIT %s OFFSET %s"#
        );
        assert_eq!(
            params,
            vec![Value::from("nobody"), Value::Int(10), Value::Int(20)]
        );
    }

    #[test]
    fn test_percent_in_identifiers_is_escaped() {
        let ast = Select {
            columns: vec![ident("growth_%")],
            from: Some(FromClause::Table {
                table: crate::table_ref!("human"),
                alias: None,
            }),
            ..Default::default()
        };

        let (sql, _) = render(&ast);
        assert_eq!(sql, r#"SELECT "growth_%%" FROM "human""#);
    }

    #[test]
    fn test_virtual_relation_splits_into_tokens() {
        let ast = Select {
            columns: vec![qual_ident("human", "id")],
            from: Some(FromClause::Relation("human".to_string())),
            where_clause: Some(binary(
                qual_ident("human", "rank"),
                BinaryOperator::Eq,
                value(Value::Int(2)),
            )),
            ..Default::default()
        };

        let mut renderer = Renderer::new(&Postgres);
        ast.render(&mut renderer);

        assert_eq!(
            renderer.finish_tokens(),
            vec![
                ClauseToken::Fragment(SqlFragment {
                    sql: r#"SELECT "human"."id" FROM "#.to_string(),
                    params: vec![],
                }),
                ClauseToken::Slot {
                    relation: "human".to_string(),
                },
                ClauseToken::Fragment(SqlFragment {
                    sql: r#" WHERE ("human"."rank" = %s)"#.to_string(),
                    params: vec![Value::Int(2)],
                }),
            ]
        );
    }

    #[test]
    fn test_virtual_relation_finish_writes_relation_name() {
        let ast = Select {
            columns: vec![],
            from: Some(FromClause::Relation("pid".to_string())),
            ..Default::default()
        };

        let (sql, params) = render(&ast);
        assert_eq!(sql, r#"SELECT * FROM "pid""#);
        assert!(params.is_empty());
    }
}
