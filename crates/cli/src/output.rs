use crate::error::CliError;
use planner::{compiler::CompiledQuery, query::dialect::Dialect};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CompileReport {
    pub sql: String,
    pub parameters: Vec<serde_json::Value>,
    pub forwarded: Vec<String>,
    /// Set when the placeholders were rewritten for a specific dialect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline: Option<String>,
}

impl CompileReport {
    pub fn new(compiled: &CompiledQuery, native: Option<&dyn Dialect>, inline: bool) -> Self {
        let (sql, parameters) = match native {
            Some(dialect) => compiled.to_native(dialect),
            None => (compiled.sql_text.clone(), compiled.parameters.clone()),
        };

        Self {
            sql,
            parameters: parameters.iter().map(|p| p.to_json()).collect(),
            forwarded: compiled.forwarded.clone(),
            dialect: native.map(|dialect| dialect.name()),
            inline: inline.then(|| compiled.inline_debug()),
        }
    }
}

fn generate_report_json(report: &CompileReport) -> Result<String, CliError> {
    serde_json::to_string_pretty(report).map_err(CliError::JsonSerialize)
}

pub async fn write_report(report: &CompileReport, path: String) -> Result<(), CliError> {
    let report_json = generate_report_json(report)?;
    tokio::fs::write(path, report_json).await?;
    Ok(())
}

pub fn print_report(report: &CompileReport) -> Result<(), CliError> {
    let report_json = generate_report_json(report)?;
    println!("{report_json}");
    Ok(())
}
