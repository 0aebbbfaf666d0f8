//! Defines the core rendering trait and context for converting AST to SQL.

use crate::{
    compiler::tokens::{ClauseToken, SqlFragment},
    query::{ast::common::TableRef, dialect::Dialect},
    source::template::{PLACEHOLDER, escape_percent},
};
use model::core::value::Value;

pub mod expr;
pub mod select;

/// A trait for any AST node that can be rendered into a SQL string.
pub trait Render {
    fn render(&self, renderer: &mut Renderer);
}

/// A context that holds the state during the rendering process.
///
/// It accumulates the SQL string and the parameters, and provides
/// access to the dialect for syntax-specific details. Parameters are
/// written as positional `%s` markers, so literal percent signs in the
/// emitted text are doubled.
///
/// When the rendered query reads from a virtual relation, the output is
/// split into clause tokens around the relation's slot.
pub struct Renderer<'a> {
    pub sql: String,
    pub params: Vec<Value>,
    pub dialect: &'a dyn Dialect,
    tokens: Vec<ClauseToken>,
}

impl<'a> Renderer<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
            dialect,
            tokens: Vec::new(),
        }
    }

    /// Consumes the renderer and returns the final SQL string and parameters.
    ///
    /// Relation slots are written as the quoted relation name.
    pub fn finish(self) -> (String, Vec<Value>) {
        let dialect = self.dialect;
        let mut sql = String::new();
        let mut params = Vec::new();
        for token in self.finish_tokens() {
            match token {
                ClauseToken::Fragment(fragment) => {
                    sql.push_str(&fragment.sql);
                    params.extend(fragment.params);
                }
                ClauseToken::Slot { relation } => {
                    sql.push_str(&escape_percent(&dialect.quote_identifier(&relation)));
                }
            }
        }
        (sql, params)
    }

    /// Consumes the renderer and returns the rendered clause tokens.
    pub fn finish_tokens(mut self) -> Vec<ClauseToken> {
        self.flush();
        self.tokens
    }

    pub fn add_param(&mut self, value: Value) {
        self.params.push(value);
        self.sql.push_str(PLACEHOLDER);
    }

    pub fn push_identifier(&mut self, ident: &str) {
        let quoted = self.dialect.quote_identifier(ident);
        self.sql.push_str(&escape_percent(&quoted));
    }

    /// Pushes caller-provided SQL text such as a function or type name.
    pub fn push_raw(&mut self, text: &str) {
        self.sql.push_str(&escape_percent(text));
    }

    pub fn render_table_ref(&mut self, table: &TableRef) {
        if let Some(schema) = &table.schema {
            self.push_identifier(schema);
            self.sql.push('.');
        }
        self.push_identifier(&table.name);
    }

    /// Marks the position where the virtual relation `relation` is read from.
    pub fn push_slot(&mut self, relation: &str) {
        self.flush();
        self.tokens.push(ClauseToken::Slot {
            relation: relation.to_string(),
        });
    }

    fn flush(&mut self) {
        if self.sql.is_empty() && self.params.is_empty() {
            return;
        }
        self.tokens.push(ClauseToken::Fragment(SqlFragment {
            sql: std::mem::take(&mut self.sql),
            params: std::mem::take(&mut self.params),
        }));
    }
}
