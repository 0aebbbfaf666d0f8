use crate::{
    compiler::{CompiledQuery, compile, tokens::BaseFromClause},
    error::{QueryError, QueryResult},
    projection::{ForwardProjection, ProjectionCatalog, resolve_forward_fields},
    query::{
        ast::{
            common::{JoinKind, OrderDir, TableRef},
            expr::Expr,
            select::{FromClause, JoinClause, OrderByExpr, Select},
        },
        dialect::Dialect,
        renderer::{Render, Renderer},
        value,
    },
    relation::VirtualRelation,
    source::{SourceDescriptor, function::FunctionTemplate},
};
use model::core::value::Value;
use std::collections::HashSet;
use tracing::debug;

/// A query over a [`VirtualRelation`].
///
/// Holds the outer query skeleton and, once assigned, the source that
/// replaces the relation in the `FROM` clause. All operations consume the
/// query and return the updated one; clone it to branch.
#[derive(Debug, Clone)]
pub struct DynamicQuery {
    relation: VirtualRelation,
    skeleton: Select,
    source: Option<SourceDescriptor>,
    forwarded: Vec<ForwardProjection>,
}

impl DynamicQuery {
    pub fn new(relation: VirtualRelation) -> Self {
        let skeleton = Select {
            from: Some(FromClause::Relation(relation.name().to_string())),
            ..Default::default()
        };
        Self {
            relation,
            skeleton,
            source: None,
            forwarded: Vec::new(),
        }
    }

    /// Assigns a precompiled source.
    ///
    /// `forward` names catalog entries to expose on the relation. When it
    /// is empty, every catalog entry the relation does not declare itself
    /// is forwarded.
    pub fn set_source<S: AsRef<str>>(
        mut self,
        source: SourceDescriptor,
        catalog: &ProjectionCatalog,
        forward: &[S],
    ) -> QueryResult<Self> {
        if source.alias() != self.relation.name() {
            return Err(QueryError::AliasMismatch {
                expected: self.relation.name().to_string(),
                found: source.alias().to_string(),
            });
        }

        if let Some(declared) = forward
            .iter()
            .map(|name| name.as_ref())
            .find(|name| self.relation.declares(name))
        {
            return Err(QueryError::DuplicateForwardField(declared.to_string()));
        }

        let undeclared: ProjectionCatalog = catalog
            .iter()
            .filter(|(name, _)| !self.relation.declares(name))
            .map(|(name, origin)| (name.to_string(), origin.clone()))
            .collect();
        let forwarded = if forward.is_empty() && undeclared.is_empty() && !catalog.is_empty() {
            debug!(
                "Every projection of '{}' is a declared column, nothing to forward",
                self.relation.name()
            );
            Vec::new()
        } else {
            resolve_forward_fields(&source, forward, &undeclared)?
        };

        debug!(
            "Source of '{}' set to {} ({} forwarded)",
            self.relation.name(),
            source.kind(),
            forwarded.len()
        );

        self.source = Some(source);
        self.forwarded = forwarded;
        Ok(self)
    }

    /// Uses `select` as the source, forwarding its aliased projections.
    pub fn set_source_from_select<S: AsRef<str>>(
        self,
        select: &Select,
        dialect: &dyn Dialect,
        forward: &[S],
    ) -> QueryResult<Self> {
        let source = SourceDescriptor::from_select(select, dialect, self.relation.name().as_str())?;
        let catalog = ProjectionCatalog::from_select(select);
        self.set_source(source, &catalog, forward)
    }

    /// Uses a call to `function` with `args` as the source.
    pub fn set_source_from_expression(
        self,
        function: &FunctionTemplate,
        args: Vec<Value>,
    ) -> QueryResult<Self> {
        let source = function.to_source(args, self.relation.name().as_str())?;
        self.set_source::<&str>(source, &ProjectionCatalog::new(), &[])
    }

    /// Calls the relation's default expression with `args`.
    pub fn fill_expression_with_parameters(self, args: Vec<Value>) -> QueryResult<Self> {
        let function = self
            .relation
            .default_expression()
            .cloned()
            .ok_or_else(|| QueryError::NoDefaultExpression(self.relation.name().to_string()))?;
        self.set_source_from_expression(&function, args)
    }

    /// Adds a condition, AND-ed with any existing one.
    pub fn filter(mut self, condition: Expr) -> Self {
        self.skeleton.where_clause = Some(match self.skeleton.where_clause.take() {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    pub fn join(mut self, kind: JoinKind, table: TableRef, alias: Option<&str>, on: Expr) -> Self {
        self.skeleton.joins.push(JoinClause {
            kind,
            table,
            alias: alias.map(String::from),
            on,
        });
        self
    }

    /// Selects an extra expression next to the relation's columns, e.g. a
    /// column of a joined table.
    pub fn select_also(mut self, expr: Expr) -> Self {
        self.skeleton.columns.push(expr);
        self
    }

    pub fn order_by(mut self, expr: Expr, direction: Option<OrderDir>) -> Self {
        self.skeleton.order_by.push(OrderByExpr { expr, direction });
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.skeleton.limit = Some(value(Value::Int(limit)));
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.skeleton.offset = Some(value(Value::Int(offset)));
        self
    }

    pub fn relation(&self) -> &VirtualRelation {
        &self.relation
    }

    pub fn source(&self) -> Option<&SourceDescriptor> {
        self.source.as_ref()
    }

    pub fn forwarded(&self) -> &[ForwardProjection] {
        &self.forwarded
    }

    /// The outer query: declared columns, extra selections, then forwarded
    /// projections.
    pub fn to_select(&self) -> Select {
        let mut select = self.skeleton.clone();
        let extra = std::mem::take(&mut select.columns);
        select.columns = self
            .relation
            .columns()
            .iter()
            .map(|c| self.relation.column(c))
            .chain(extra)
            .chain(self.forwarded.iter().map(ForwardProjection::select_expr))
            .collect();
        select
    }

    /// Renders the outer query and substitutes the source into it.
    ///
    /// Fails with [`QueryError::DuplicateForwardField`] when two entries of
    /// the select list are exposed under the same name.
    pub fn build(&self, dialect: &dyn Dialect) -> QueryResult<CompiledQuery> {
        let select = self.to_select();
        let mut seen = HashSet::new();
        for name in select.columns.iter().filter_map(Expr::output_name) {
            if !seen.insert(name) {
                return Err(QueryError::DuplicateForwardField(name.to_string()));
            }
        }

        let mut renderer = Renderer::new(dialect);
        select.render(&mut renderer);
        let base = BaseFromClause::new(renderer.finish_tokens())?;
        compile(&base, self.source.as_ref(), &self.forwarded)
    }
}
