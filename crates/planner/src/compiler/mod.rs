//! Splices a source into the relation slot of an outer query.

use crate::{
    compiler::tokens::{BaseFromClause, ClauseToken},
    error::{QueryError, QueryResult},
    projection::ForwardProjection,
    query::dialect::Dialect,
    source::{SourceDescriptor, SourceKind, template},
};
use model::core::value::Value;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

pub mod tokens;

/// A statement ready for execution. `sql_text` uses `%s` markers, one per
/// entry of `parameters`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    pub sql_text: String,
    pub parameters: Vec<Value>,
    /// Names of the forwarded source projections, in select-list order.
    pub forwarded: Vec<String>,
}

impl CompiledQuery {
    /// The statement with parameters written as literals, for logs.
    pub fn inline_debug(&self) -> String {
        template::inline(&self.sql_text, &self.parameters)
    }

    /// The statement using the dialect's native placeholders.
    pub fn to_native(&self, dialect: &dyn Dialect) -> (String, Vec<Value>) {
        (
            template::to_native(&self.sql_text, dialect),
            self.parameters.clone(),
        )
    }
}

/// Replaces the relation slot of `base` with `source`.
///
/// Sub-queries are parenthesized, expressions are not. Parameters are
/// collected left to right, so the source's parameters sit between those
/// of the tokens before and after the slot.
pub fn compile(
    base: &BaseFromClause,
    source: Option<&SourceDescriptor>,
    projections: &[ForwardProjection],
) -> QueryResult<CompiledQuery> {
    let source = source.ok_or(QueryError::SourceNotSet)?;
    if base.slot_relation() != source.alias().as_str() {
        return Err(QueryError::AliasMismatch {
            expected: base.slot_relation().to_string(),
            found: source.alias().to_string(),
        });
    }
    check_projections(source, projections)?;

    let substituted = render_source(source);
    let mut sql_text = String::new();
    let mut parameters = Vec::new();

    for token in base.tokens() {
        match token {
            ClauseToken::Fragment(fragment) => {
                sql_text.push_str(&fragment.sql);
                parameters.extend(fragment.params.iter().cloned());
            }
            ClauseToken::Slot { .. } => {
                sql_text.push_str(&substituted);
                parameters.extend(source.parameters().iter().cloned());
            }
        }
    }

    debug!(
        kind = %source.kind(),
        alias = source.alias().as_str(),
        params = parameters.len(),
        "Compiled query over virtual relation"
    );

    Ok(CompiledQuery {
        sql_text,
        parameters,
        forwarded: projections.iter().map(|p| p.name.clone()).collect(),
    })
}

fn render_source(source: &SourceDescriptor) -> String {
    match source.kind() {
        SourceKind::SubQuery => format!("({}) AS {}", source.sql_text(), source.alias()),
        SourceKind::Expression => format!("{} AS {}", source.sql_text(), source.alias()),
    }
}

fn check_projections(
    source: &SourceDescriptor,
    projections: &[ForwardProjection],
) -> QueryResult<()> {
    let mut seen = HashSet::new();
    for projection in projections {
        let qualifier = projection.column.qualifier.as_deref().unwrap_or_default();
        if qualifier != source.alias().as_str() {
            return Err(QueryError::AliasMismatch {
                expected: source.alias().to_string(),
                found: qualifier.to_string(),
            });
        }
        if !seen.insert(projection.name.as_str()) {
            return Err(QueryError::DuplicateForwardField(projection.name.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        compiler::tokens::SqlFragment,
        projection::{ProjectionCatalog, ProjectionOrigin, resolve_forward_fields},
        query::dialect::Postgres,
    };
    use model::core::{data_type::DataType, identifiers::Alias};

    fn fragment(sql: &str, params: Vec<Value>) -> ClauseToken {
        ClauseToken::Fragment(SqlFragment {
            sql: sql.to_string(),
            params,
        })
    }

    fn base(relation: &str) -> BaseFromClause {
        BaseFromClause::new(vec![
            fragment(r#"SELECT "src"."a" FROM "#, vec![]),
            ClauseToken::Slot {
                relation: relation.to_string(),
            },
            fragment(r#" WHERE ("src"."a" > %s)"#, vec![Value::Int(1)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_subquery_is_parenthesized() {
        let source =
            SourceDescriptor::from_subquery("SELECT a FROM t WHERE id = %s", vec![Value::Int(5)], "src")
                .unwrap();

        let compiled = compile(&base("src"), Some(&source), &[]).unwrap();
        assert_eq!(
            compiled.sql_text,
            r#"SELECT "src"."a" FROM (SELECT a FROM t WHERE id = %s) AS src WHERE ("src"."a" > %s)"#
        );
        assert_eq!(compiled.parameters, vec![Value::Int(5), Value::Int(1)]);
        assert_eq!(
            compiled.inline_debug(),
            r#"SELECT "src"."a" FROM (SELECT a FROM t WHERE id = 5) AS src WHERE ("src"."a" > 1)"#
        );
    }

    #[test]
    fn test_expression_is_not_parenthesized() {
        let source = SourceDescriptor::from_expression("pg_backend_pid()", vec![], "src").unwrap();
        let clause = BaseFromClause::new(vec![
            fragment("SELECT * FROM ", vec![]),
            ClauseToken::Slot {
                relation: "src".to_string(),
            },
        ])
        .unwrap();

        let compiled = compile(&clause, Some(&source), &[]).unwrap();
        assert_eq!(compiled.sql_text, "SELECT * FROM pg_backend_pid() AS src");
        assert!(compiled.parameters.is_empty());
    }

    #[test]
    fn test_missing_source() {
        let err = compile(&base("src"), None, &[]).unwrap_err();
        assert_eq!(err, QueryError::SourceNotSet);
    }

    #[test]
    fn test_parameters_follow_placeholder_order() {
        let clause = BaseFromClause::new(vec![
            fragment("SELECT %s AS tag FROM ", vec![Value::from("x")]),
            ClauseToken::Slot {
                relation: "src".to_string(),
            },
            fragment(" LIMIT %s", vec![Value::Int(10)]),
        ])
        .unwrap();
        let source =
            SourceDescriptor::from_expression("get_inventory(%s)", vec![Value::Int(3)], "src")
                .unwrap();

        let compiled = compile(&clause, Some(&source), &[]).unwrap();
        assert_eq!(
            compiled.parameters,
            vec![Value::from("x"), Value::Int(3), Value::Int(10)]
        );
        assert_eq!(
            compiled.to_native(&Postgres).0,
            "SELECT $1 AS tag FROM get_inventory($2) AS src LIMIT $3"
        );
    }

    #[test]
    fn test_compile_is_idempotent() {
        let source =
            SourceDescriptor::from_subquery("SELECT a FROM t WHERE id = %s", vec![Value::Int(5)], "src")
                .unwrap();
        let catalog: ProjectionCatalog = [("a".to_string(), ProjectionOrigin::typed(DataType::Int))]
            .into_iter()
            .collect();
        let projections = resolve_forward_fields::<&str>(&source, &[], &catalog).unwrap();

        let first = compile(&base("src"), Some(&source), &projections).unwrap();
        let second = compile(&base("src"), Some(&source), &projections).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.forwarded, vec!["a".to_string()]);
    }

    #[test]
    fn test_source_alias_must_match_slot() {
        let source = SourceDescriptor::from_expression("pg_backend_pid()", vec![], "src").unwrap();
        let err = compile(&base("human"), Some(&source), &[]).unwrap_err();
        assert_eq!(
            err,
            QueryError::AliasMismatch {
                expected: "human".to_string(),
                found: "src".to_string(),
            }
        );
    }

    #[test]
    fn test_projection_bound_to_other_alias() {
        let source = SourceDescriptor::from_subquery("SELECT 1 AS a", vec![], "src").unwrap();
        let other = Alias::new("other").unwrap();
        let projection =
            ForwardProjection::new("a", ProjectionOrigin::typed(DataType::Int), &other);

        let err = compile(&base("src"), Some(&source), &[projection]).unwrap_err();
        assert_eq!(
            err,
            QueryError::AliasMismatch {
                expected: "src".to_string(),
                found: "other".to_string(),
            }
        );
    }
}
