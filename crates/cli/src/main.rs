use crate::{error::CliError, output::CompileReport, request::QueryRequest};
use clap::Parser;
use commands::Commands;
use planner::query::dialect::{Dialect, Postgres};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;
mod request;

#[derive(Parser)]
#[command(
    name = "dynfrom",
    version = "0.1.0",
    about = "Compile queries over virtual relations backed by sub-queries or SQL functions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Initialize logger
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compile {
            request,
            native,
            inline,
            output,
        } => {
            info!("Compiling request: {}, native: {}", request, native);

            let query = QueryRequest::load(&request).await?.into_query()?;
            let compiled = query.build(&Postgres)?;
            let dialect = native.then_some(&Postgres as &dyn Dialect);
            let report = CompileReport::new(&compiled, dialect, inline);

            match output {
                Some(path) => output::write_report(&report, path).await?,
                None => output::print_report(&report)?,
            }
        }
        Commands::Check { request } => {
            let query = QueryRequest::load(&request).await?.into_query()?;
            let compiled = query.build(&Postgres)?;
            info!(
                "Request '{}' is valid: {} parameter(s), {} forwarded column(s)",
                request,
                compiled.parameters.len(),
                compiled.forwarded.len()
            );
        }
    }

    Ok(())
}
