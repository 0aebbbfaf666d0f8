//! The outer query as rendered clause tokens.

use crate::{
    error::{QueryError, QueryResult},
    source::template,
};
use model::core::value::Value;
use serde::{Deserialize, Serialize};

/// Rendered SQL text and the parameters for its `%s` markers, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SqlFragment {
    pub sql: String,
    pub params: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClauseToken {
    Fragment(SqlFragment),
    /// Where the virtual relation is read from.
    Slot { relation: String },
}

/// Clause tokens of an outer query, holding exactly one relation slot.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseFromClause {
    tokens: Vec<ClauseToken>,
    relation: String,
}

impl BaseFromClause {
    pub fn new(tokens: Vec<ClauseToken>) -> QueryResult<Self> {
        let mut slots = tokens.iter().filter_map(|token| match token {
            ClauseToken::Slot { relation } => Some(relation),
            ClauseToken::Fragment(_) => None,
        });

        let relation = slots.next().cloned().ok_or_else(|| {
            QueryError::InvalidFromClause("no virtual relation slot".to_string())
        })?;
        if slots.next().is_some() {
            return Err(QueryError::InvalidFromClause(
                "more than one virtual relation slot".to_string(),
            ));
        }

        for fragment in tokens.iter().filter_map(|token| match token {
            ClauseToken::Fragment(fragment) => Some(fragment),
            ClauseToken::Slot { .. } => None,
        }) {
            let markers = template::count_placeholders(&fragment.sql)
                .map_err(QueryError::InvalidFromClause)?;
            if markers != fragment.params.len() {
                return Err(QueryError::InvalidFromClause(format!(
                    "fragment '{}' has {markers} placeholder(s) but {} parameter(s)",
                    fragment.sql,
                    fragment.params.len()
                )));
            }
        }

        Ok(Self { tokens, relation })
    }

    pub fn tokens(&self) -> &[ClauseToken] {
        &self.tokens
    }

    /// Name of the relation the slot stands for.
    pub fn slot_relation(&self) -> &str {
        &self.relation
    }
}
