use crate::{
    error::{QueryError, QueryResult},
    source::{SourceDescriptor, template::PLACEHOLDER},
};
use model::core::value::Value;
use serde::{Deserialize, Serialize};

/// A SQL function that can back a relation, e.g. `pg_backend_pid()` or a
/// set-returning function such as `get_inventory(%s)`.
///
/// `arity` pins the number of arguments; `None` accepts any count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionTemplate {
    pub function: String,
    #[serde(default)]
    pub arity: Option<usize>,
}

impl FunctionTemplate {
    pub fn new(function: &str) -> Self {
        Self {
            function: function.to_string(),
            arity: None,
        }
    }

    pub fn with_arity(function: &str, arity: usize) -> Self {
        Self {
            function: function.to_string(),
            arity: Some(arity),
        }
    }

    /// The call template for `argc` arguments, e.g. `f(%s, %s)`.
    pub fn template(&self, argc: usize) -> String {
        let args = vec![PLACEHOLDER; argc].join(", ");
        format!("{}({args})", self.function)
    }

    /// Binds `args` into an expression source aliased as `alias`.
    pub fn to_source(&self, args: Vec<Value>, alias: &str) -> QueryResult<SourceDescriptor> {
        if !is_function_name(&self.function) {
            return Err(QueryError::MalformedSource(format!(
                "'{}' is not a valid function name",
                self.function
            )));
        }

        if let Some(arity) = self.arity
            && arity != args.len()
        {
            return Err(QueryError::MalformedSource(format!(
                "{} takes {arity} argument(s), {} given",
                self.function,
                args.len()
            )));
        }

        SourceDescriptor::from_expression(self.template(args.len()), args, alias)
    }
}

// Allows schema-qualified names such as `pg_catalog.pg_backend_pid`.
fn is_function_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.ends_with('.')
        && name
            .chars()
            .all(|c| c == '_' || c == '.' || c.is_ascii_alphanumeric())
}
