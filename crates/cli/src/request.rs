//! JSON request describing a query over one virtual relation.

use crate::error::CliError;
use indexmap::IndexMap;
use model::core::{data_type::DataType, value::Value};
use planner::{
    projection::{ProjectionCatalog, ProjectionOrigin},
    query::{
        ast::{
            common::OrderDir,
            expr::{BinaryOp, BinaryOperator, Expr},
        },
        value,
    },
    relation::{DynamicQuery, VirtualRelation},
    source::{SourceDescriptor, SourceKind, function::FunctionTemplate},
};
use serde::Deserialize;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryRequest {
    pub relation: RelationRequest,
    #[serde(default)]
    pub source: Option<SourceRequest>,
    #[serde(default)]
    pub forward: Vec<String>,
    #[serde(default)]
    pub filters: Vec<FilterRequest>,
    #[serde(default)]
    pub order_by: Vec<OrderRequest>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationRequest {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub default_expression: Option<FunctionTemplate>,
}

/// Where the relation's rows come from.
///
/// `sub_query` needs `sql`. `expression` takes either a raw `sql` template,
/// a `function`, or neither, in which case the relation's default
/// expression is called with `params`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceRequest {
    pub kind: String,
    #[serde(default)]
    pub sql: Option<String>,
    #[serde(default)]
    pub function: Option<FunctionTemplate>,
    #[serde(default)]
    pub params: Vec<serde_json::Value>,
    /// Projection name to PostgreSQL type name.
    #[serde(default)]
    pub catalog: IndexMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterRequest {
    pub column: String,
    #[serde(default = "default_op")]
    pub op: String,
    pub value: serde_json::Value,
}

fn default_op() -> String {
    "=".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderRequest {
    pub column: String,
    #[serde(default)]
    pub descending: bool,
}

impl QueryRequest {
    pub async fn load(path: &str) -> Result<Self, CliError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn into_query(self) -> Result<DynamicQuery, CliError> {
        let mut relation = VirtualRelation::new(&self.relation.name, self.relation.columns.as_slice())?;
        if let Some(function) = self.relation.default_expression {
            relation = relation.with_default_expression(function);
        }

        let mut query = relation.query();
        if let Some(source) = self.source {
            query = apply_source(query, source, &self.forward)?;
        } else if !self.forward.is_empty() {
            return Err(CliError::InvalidRequest(
                "forward fields given without a source".to_string(),
            ));
        }

        for filter in self.filters {
            let op = parse_operator(&filter.op)?;
            query = query.filter(Expr::BinaryOp(Box::new(BinaryOp {
                left: relation.column(&filter.column),
                op,
                right: value(Value::from_json(filter.value)),
            })));
        }

        for order in self.order_by {
            let direction = order.descending.then_some(OrderDir::Desc);
            query = query.order_by(relation.column(&order.column), direction);
        }

        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }
        if let Some(offset) = self.offset {
            query = query.offset(offset);
        }

        Ok(query)
    }
}

fn apply_source(
    query: DynamicQuery,
    source: SourceRequest,
    forward: &[String],
) -> Result<DynamicQuery, CliError> {
    let kind = SourceKind::from_str(&source.kind)?;
    let params = source.params.into_iter().map(Value::from_json).collect();
    let alias = query.relation().name().to_string();
    debug!("Applying {kind} source to '{alias}'");

    match kind {
        SourceKind::SubQuery => {
            let sql = source.sql.ok_or_else(|| {
                CliError::InvalidRequest("a sub_query source needs `sql`".to_string())
            })?;
            let catalog = catalog(source.catalog)?;
            let descriptor = SourceDescriptor::from_subquery(sql, params, &alias)?;
            Ok(query.set_source(descriptor, &catalog, forward)?)
        }
        SourceKind::Expression => match (source.sql, source.function) {
            (Some(_), Some(_)) => Err(CliError::InvalidRequest(
                "an expression source takes `sql` or `function`, not both".to_string(),
            )),
            (Some(sql), None) => {
                let descriptor = SourceDescriptor::from_expression(sql, params, &alias)?;
                Ok(query.set_source(descriptor, &catalog(source.catalog)?, forward)?)
            }
            (None, Some(function)) if forward.is_empty() => {
                Ok(query.set_source_from_expression(&function, params)?)
            }
            (None, None) if forward.is_empty() => {
                Ok(query.fill_expression_with_parameters(params)?)
            }
            _ => Err(planner::error::QueryError::UnsupportedForwardingOnExpression.into()),
        },
    }
}

fn catalog(entries: IndexMap<String, String>) -> Result<ProjectionCatalog, CliError> {
    entries
        .into_iter()
        .map(|(name, type_name)| {
            let data_type = DataType::from_postgres_type(&type_name)
                .map_err(|err| CliError::InvalidRequest(format!("column '{name}': {err}")))?;
            Ok((name, ProjectionOrigin::typed(data_type)))
        })
        .collect()
}

fn parse_operator(op: &str) -> Result<BinaryOperator, CliError> {
    match op {
        "=" => Ok(BinaryOperator::Eq),
        "<>" | "!=" => Ok(BinaryOperator::NotEq),
        "<" => Ok(BinaryOperator::Lt),
        "<=" => Ok(BinaryOperator::LtEq),
        ">" => Ok(BinaryOperator::Gt),
        ">=" => Ok(BinaryOperator::GtEq),
        other => Err(CliError::InvalidRequest(format!(
            "unsupported filter operator '{other}'"
        ))),
    }
}
