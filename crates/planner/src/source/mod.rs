//! Descriptors for what gets substituted into a virtual relation's slot.

use crate::{
    error::{QueryError, QueryResult},
    query::{
        ast::select::Select,
        dialect::Dialect,
        renderer::{Render, Renderer},
    },
};
use model::core::{identifiers::Alias, value::Value};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub mod function;
pub mod template;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// A nested, already compiled `SELECT`.
    SubQuery,
    /// A function call or other expression usable as a relation.
    Expression,
}

impl FromStr for SourceKind {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "subquery" | "sub_query" => Ok(SourceKind::SubQuery),
            "expression" => Ok(SourceKind::Expression),
            _ => Err(QueryError::UnsupportedSourceKind(s.to_string())),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::SubQuery => f.write_str("sub_query"),
            SourceKind::Expression => f.write_str("expression"),
        }
    }
}

/// SQL text with its bound parameters, ready to stand in for a relation.
///
/// Construction checks that every `%s` marker has exactly one parameter.
/// The descriptor is immutable afterwards and can be shared freely.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDescriptor {
    kind: SourceKind,
    sql_text: String,
    parameters: Vec<Value>,
    alias: Alias,
}

impl SourceDescriptor {
    /// Wraps an already compiled sub-query.
    pub fn from_subquery(
        sql: impl Into<String>,
        parameters: Vec<Value>,
        alias: &str,
    ) -> QueryResult<Self> {
        Self::new(SourceKind::SubQuery, sql.into(), parameters, alias)
    }

    /// Wraps an expression template, binding one argument per marker.
    pub fn from_expression(
        template: impl Into<String>,
        arguments: Vec<Value>,
        alias: &str,
    ) -> QueryResult<Self> {
        Self::new(SourceKind::Expression, template.into(), arguments, alias)
    }

    /// Renders `select` and wraps the result as a sub-query source.
    pub fn from_select(select: &Select, dialect: &dyn Dialect, alias: &str) -> QueryResult<Self> {
        let mut renderer = Renderer::new(dialect);
        select.render(&mut renderer);
        let (sql, params) = renderer.finish();
        Self::from_subquery(sql, params, alias)
    }

    pub fn new(
        kind: SourceKind,
        sql_text: String,
        parameters: Vec<Value>,
        alias: &str,
    ) -> QueryResult<Self> {
        if sql_text.trim().is_empty() {
            return Err(QueryError::MalformedSource("empty SQL text".to_string()));
        }

        let placeholders =
            template::count_placeholders(&sql_text).map_err(QueryError::MalformedSource)?;
        if placeholders != parameters.len() {
            return Err(QueryError::MalformedSource(format!(
                "{placeholders} placeholder(s) but {} parameter(s)",
                parameters.len()
            )));
        }

        Ok(Self {
            kind,
            sql_text,
            parameters,
            alias: Alias::new(alias)?,
        })
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn sql_text(&self) -> &str {
        &self.sql_text
    }

    pub fn parameters(&self) -> &[Value] {
        &self.parameters
    }

    pub fn alias(&self) -> &Alias {
        &self.alias
    }

    /// The source SQL with parameters written as literals.
    pub fn render_inline(&self) -> String {
        template::inline(&self.sql_text, &self.parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{
        ast::{
            common::TableRef,
            expr::{BinaryOp, BinaryOperator, Expr},
            select::FromClause,
        },
        dialect::Postgres,
        ident, value,
    };

    #[test]
    fn test_from_subquery() {
        let source =
            SourceDescriptor::from_subquery("SELECT a FROM t WHERE id = %s", vec![Value::Int(5)], "src")
                .unwrap();

        assert_eq!(source.kind(), SourceKind::SubQuery);
        assert_eq!(source.parameters(), &[Value::Int(5)]);
        assert_eq!(source.alias().as_str(), "src");
        assert_eq!(source.render_inline(), "SELECT a FROM t WHERE id = 5");
    }

    #[test]
    fn test_from_expression_without_arguments() {
        let source = SourceDescriptor::from_expression("pg_backend_pid()", vec![], "src").unwrap();
        assert_eq!(source.kind(), SourceKind::Expression);
        assert!(source.parameters().is_empty());
    }

    #[test]
    fn test_placeholder_mismatch_is_malformed() {
        let err = SourceDescriptor::from_expression("f(%s, %s)", vec![Value::Int(1)], "src")
            .unwrap_err();
        assert!(matches!(err, QueryError::MalformedSource(_)));

        let err = SourceDescriptor::from_subquery("SELECT 1", vec![Value::Int(1)], "src")
            .unwrap_err();
        assert!(matches!(err, QueryError::MalformedSource(_)));
    }

    #[test]
    fn test_stray_percent_and_empty_sql_are_malformed() {
        assert!(matches!(
            SourceDescriptor::from_subquery("SELECT 5 % 2", vec![], "src"),
            Err(QueryError::MalformedSource(_))
        ));
        assert!(matches!(
            SourceDescriptor::from_subquery("  ", vec![], "src"),
            Err(QueryError::MalformedSource(_))
        ));
    }

    #[test]
    fn test_invalid_alias() {
        let err = SourceDescriptor::from_expression("now()", vec![], "Src").unwrap_err();
        assert!(matches!(err, QueryError::InvalidAlias(_)));
    }

    #[test]
    fn test_from_select_renders_bound_parameters() {
        let select = Select {
            columns: vec![ident("a")],
            from: Some(FromClause::Table {
                table: TableRef {
                    schema: None,
                    name: "t".to_string(),
                },
                alias: None,
            }),
            where_clause: Some(Expr::BinaryOp(Box::new(BinaryOp {
                left: ident("id"),
                op: BinaryOperator::Eq,
                right: value(Value::Int(5)),
            }))),
            ..Default::default()
        };

        let source = SourceDescriptor::from_select(&select, &Postgres, "src").unwrap();
        assert_eq!(source.sql_text(), r#"SELECT "a" FROM "t" WHERE ("id" = %s)"#);
        assert_eq!(source.parameters(), &[Value::Int(5)]);
    }

    #[test]
    fn test_source_kind_from_str() {
        assert_eq!("subquery".parse::<SourceKind>(), Ok(SourceKind::SubQuery));
        assert_eq!("Expression".parse::<SourceKind>(), Ok(SourceKind::Expression));
        assert_eq!(
            "table".parse::<SourceKind>(),
            Err(QueryError::UnsupportedSourceKind("table".to_string()))
        );
    }

    #[test]
    fn test_source_kind_serde_tags() {
        assert_eq!(
            serde_json::to_string(&SourceKind::SubQuery).unwrap(),
            r#""sub_query""#
        );
        let kind: SourceKind = serde_json::from_str(r#""expression""#).unwrap();
        assert_eq!(kind, SourceKind::Expression);
    }
}
