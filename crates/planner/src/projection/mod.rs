//! Named projections a source exposes, and the ones forwarded through a
//! virtual relation.

use crate::query::ast::{
    expr::{Expr, Ident},
    select::Select,
};
use indexmap::IndexMap;
use model::core::{data_type::DataType, identifiers::Alias};

pub mod resolver;

pub use resolver::resolve_forward_fields;

/// Where a projection's value comes from inside its source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectionOrigin {
    pub expr: Option<Expr>,
    pub data_type: Option<DataType>,
}

impl ProjectionOrigin {
    pub fn computed(expr: Expr) -> Self {
        let data_type = infer_data_type(&expr);
        Self {
            expr: Some(expr),
            data_type,
        }
    }

    pub fn typed(data_type: DataType) -> Self {
        Self {
            expr: None,
            data_type: Some(data_type),
        }
    }
}

/// The computed projections of a sub-query, in select-list order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectionCatalog {
    entries: IndexMap<String, ProjectionOrigin>,
}

impl ProjectionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the aliased expressions of `select`.
    ///
    /// Unaliased column references are not part of the catalog; they are
    /// the columns the relation declares itself.
    pub fn from_select(select: &Select) -> Self {
        let mut catalog = Self::new();
        for column in &select.columns {
            if let Expr::Alias { expr, alias } = column {
                catalog.insert(alias, ProjectionOrigin::computed(expr.as_ref().clone()));
            }
        }
        catalog
    }

    /// Adds or replaces an entry. A replaced entry keeps its position.
    pub fn insert(&mut self, name: &str, origin: ProjectionOrigin) {
        self.entries.insert(name.to_string(), origin);
    }

    pub fn get(&self, name: &str) -> Option<&ProjectionOrigin> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProjectionOrigin)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, ProjectionOrigin)> for ProjectionCatalog {
    fn from_iter<I: IntoIterator<Item = (String, ProjectionOrigin)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// A source projection made addressable on the outer query.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardProjection {
    pub name: String,
    pub origin: ProjectionOrigin,
    /// `alias.name`, where `alias` is the substituted relation.
    pub column: Ident,
}

impl ForwardProjection {
    pub fn new(name: &str, origin: ProjectionOrigin, alias: &Alias) -> Self {
        Self {
            name: name.to_string(),
            origin,
            column: Ident {
                qualifier: Some(alias.as_str().to_string()),
                name: name.to_string(),
            },
        }
    }

    /// The select-list entry exposing this projection: `"alias"."name" AS "name"`.
    pub fn select_expr(&self) -> Expr {
        Expr::Identifier(self.column.clone()).alias(&self.name)
    }
}

fn infer_data_type(expr: &Expr) -> Option<DataType> {
    match expr {
        Expr::Value(value) => Some(value.data_type()),
        Expr::Cast { data_type, .. } => DataType::from_postgres_type(data_type).ok(),
        Expr::FunctionCall(func) => aggregate_type(&func.name),
        Expr::Window(window) => aggregate_type(&window.function.name),
        _ => None,
    }
}

fn aggregate_type(name: &str) -> Option<DataType> {
    match name.to_ascii_uppercase().as_str() {
        "COUNT" | "RANK" | "DENSE_RANK" | "ROW_NUMBER" => Some(DataType::Long),
        "AVG" => Some(DataType::Decimal),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{
        ast::{
            expr::{BinaryOp, BinaryOperator, FunctionCall, Window},
            select::OrderByExpr,
        },
        ident,
    };

    fn rank() -> Expr {
        Expr::Window(Box::new(Window {
            function: FunctionCall {
                name: "RANK".to_string(),
                args: vec![],
                wildcard: false,
            },
            partition_by: vec![],
            order_by: vec![OrderByExpr {
                expr: ident("height"),
                direction: None,
            }],
        }))
    }

    #[test]
    fn test_catalog_from_select_keeps_aliased_columns_in_order() {
        let product = Expr::BinaryOp(Box::new(BinaryOp {
            left: ident("height"),
            op: BinaryOperator::Multiply,
            right: ident("weight"),
        }));
        let select = Select {
            columns: vec![
                ident("id"),
                ident("height").alias("h"),
                rank().alias("rank"),
                product.clone().alias("height_and_weight"),
            ],
            ..Default::default()
        };

        let catalog = ProjectionCatalog::from_select(&select);
        assert_eq!(
            catalog.names().collect::<Vec<_>>(),
            vec!["h", "rank", "height_and_weight"]
        );
        assert_eq!(catalog.get("h").unwrap().data_type, None);
        assert_eq!(catalog.get("rank").unwrap().data_type, Some(DataType::Long));
        assert_eq!(catalog.get("height_and_weight").unwrap().expr, Some(product));
    }

    #[test]
    fn test_forward_projection_select_expr() {
        let alias = Alias::new("human").unwrap();
        let projection = ForwardProjection::new("rank", ProjectionOrigin::typed(DataType::Long), &alias);
        assert_eq!(
            projection.select_expr(),
            crate::query::qual_ident("human", "rank").alias("rank")
        );
    }
}
