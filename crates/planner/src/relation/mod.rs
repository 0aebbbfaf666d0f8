//! Virtual relations: table-like entities read from a substituted source.

use crate::{
    error::{QueryError, QueryResult},
    query::{ast::expr::Expr, qual_ident},
    source::function::FunctionTemplate,
};
use model::core::identifiers::Alias;
use std::collections::HashSet;

pub mod query;

pub use query::DynamicQuery;

/// A relation with no backing table.
///
/// Its name doubles as the alias its source is substituted under, and its
/// declared columns are read from that source.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualRelation {
    name: Alias,
    columns: Vec<String>,
    default_expression: Option<FunctionTemplate>,
}

impl VirtualRelation {
    pub fn new<S: AsRef<str>>(name: &str, columns: &[S]) -> QueryResult<Self> {
        let mut seen = HashSet::new();
        for column in columns.iter().map(|c| c.as_ref()) {
            if !seen.insert(column) {
                return Err(QueryError::DuplicateForwardField(column.to_string()));
            }
        }

        Ok(Self {
            name: Alias::new(name)?,
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            default_expression: None,
        })
    }

    /// Declares the function used by [`DynamicQuery::fill_expression_with_parameters`].
    pub fn with_default_expression(mut self, function: FunctionTemplate) -> Self {
        self.default_expression = Some(function);
        self
    }

    pub fn name(&self) -> &Alias {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn declares(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn default_expression(&self) -> Option<&FunctionTemplate> {
        self.default_expression.as_ref()
    }

    /// A reference to `column` on this relation, for filters and ordering.
    pub fn column(&self, column: &str) -> Expr {
        qual_ident(self.name.as_str(), column)
    }

    /// Starts a query over this relation.
    pub fn query(&self) -> DynamicQuery {
        DynamicQuery::new(self.clone())
    }
}
