#![allow(dead_code)]

use model::core::value::Value;
use planner::{
    query::{
        ast::{
            common::OrderDir,
            expr::{BinaryOp, BinaryOperator, Expr, FunctionCall, Window},
            select::{OrderByExpr, Select},
        },
        builder::select::SelectBuilder,
        ident, value,
    },
    relation::VirtualRelation,
    source::function::FunctionTemplate,
    table_ref,
};

/// Humans ranked by height within each owner, restricted to the tall ones.
/// Exposes `rank` as its only computed projection.
pub const RANKED_HUMANS_SQL: &str = r#"SELECT "id", "name", RANK() OVER (PARTITION BY "owner_id" ORDER BY "height" DESC) AS "rank" FROM "human" WHERE ("height" > %s)"#;

/// Inventory records summed per owner. Exposes `total`.
pub const OWNER_TOTALS_SQL: &str = r#"SELECT "owner_id", SUM("count") AS "total" FROM "inventory_record" GROUP BY "owner_id""#;

pub fn ranked_human() -> VirtualRelation {
    VirtualRelation::new("ranked_human", &["id", "name"]).expect("valid relation")
}

pub fn owner_inventory() -> VirtualRelation {
    VirtualRelation::new("owner_inventory", &["owner_id"]).expect("valid relation")
}

pub fn backend() -> VirtualRelation {
    VirtualRelation::new("backend", &["pid"])
        .expect("valid relation")
        .with_default_expression(FunctionTemplate::with_arity("pg_backend_pid", 0))
}

pub fn blocking() -> VirtualRelation {
    VirtualRelation::new("blocking", &["pg_blocking_pids"]).expect("valid relation")
}

pub fn inventory_snapshot() -> VirtualRelation {
    VirtualRelation::new("inventory_snapshot", &["id", "count"])
        .expect("valid relation")
        .with_default_expression(FunctionTemplate::new("get_inventory"))
}

pub fn ranked_humans_select(min_height: i64) -> Select {
    let rank = Expr::Window(Box::new(Window {
        function: FunctionCall {
            name: "RANK".to_string(),
            args: vec![],
            wildcard: false,
        },
        partition_by: vec![ident("owner_id")],
        order_by: vec![OrderByExpr {
            expr: ident("height"),
            direction: Some(OrderDir::Desc),
        }],
    }));

    SelectBuilder::new()
        .select(vec![ident("id"), ident("name"), rank.alias("rank")])
        .from(table_ref!("human"), None)
        .where_clause(binary(ident("height"), BinaryOperator::Gt, value(Value::Int(min_height))))
        .build()
}

pub fn owner_totals_select() -> Select {
    SelectBuilder::new()
        .select(vec![
            ident("owner_id"),
            call("SUM", vec![ident("count")]).alias("total"),
        ])
        .from(table_ref!("inventory_record"), None)
        .group_by(ident("owner_id"))
        .build()
}

pub fn call(name: &str, args: Vec<Expr>) -> Expr {
    Expr::FunctionCall(FunctionCall {
        name: name.to_string(),
        args,
        wildcard: false,
    })
}

pub fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
    Expr::BinaryOp(Box::new(BinaryOp { left, op, right }))
}

pub fn eq(left: Expr, right: Expr) -> Expr {
    binary(left, BinaryOperator::Eq, right)
}
