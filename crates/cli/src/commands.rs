use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a request into SQL and its bound parameters
    Compile {
        #[arg(long, help = "Request file path (JSON)")]
        request: String,

        #[arg(long, help = "Rewrite placeholders into PostgreSQL's $n form")]
        native: bool,

        #[arg(long, help = "Also print the statement with literals inlined")]
        inline: bool,

        #[arg(
            long,
            help = "If specified, writes the compiled query to this file instead of stdout"
        )]
        output: Option<String>,
    },
    /// Validate a request without printing the statement
    Check {
        #[arg(long, help = "Request file path (JSON)")]
        request: String,
    },
}
