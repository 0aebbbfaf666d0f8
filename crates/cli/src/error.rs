use planner::error::QueryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read or write a file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse the request as JSON: {0}")]
    RequestDeserialize(#[from] serde_json::Error),

    #[error("Failed to build the query: {0}")]
    Query(#[from] QueryError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(serde_json::Error),
}
