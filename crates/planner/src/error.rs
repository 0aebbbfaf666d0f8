use model::core::identifiers::InvalidIdentifier;
use thiserror::Error;

/// Contract violations raised while building a query over a virtual
/// relation. None of these are transient; retrying the same call fails
/// the same way.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Malformed source: {0}")]
    MalformedSource(String),

    #[error("Source must be set before the query is compiled")]
    SourceNotSet,

    #[error("Unknown forward field '{0}'")]
    UnknownForwardField(String),

    #[error("Expression sources cannot forward named projections")]
    UnsupportedForwardingOnExpression,

    #[error("Unsupported source kind '{0}'")]
    UnsupportedSourceKind(String),

    #[error("Column '{0}' is exposed more than once")]
    DuplicateForwardField(String),

    #[error("Invalid alias: {0}")]
    InvalidAlias(#[from] InvalidIdentifier),

    #[error("Invalid FROM clause: {0}")]
    InvalidFromClause(String),

    #[error("Expected relation alias '{expected}', found '{found}'")]
    AliasMismatch { expected: String, found: String },

    #[error("Relation '{0}' declares no default expression")]
    NoDefaultExpression(String),
}

pub type QueryResult<T> = Result<T, QueryError>;
