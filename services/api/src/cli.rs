use crate::commands::{
    run_analyze, run_evaluate, run_summary, AnalyzeArgs, EvaluateArgs, SummaryArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use credit_ahp::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Credit AHP",
    about = "Score loan applicants with Analytic Hierarchy Process weights",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Evaluate one applicant (JSON) or a batch of applicants (CSV)
    Evaluate(EvaluateArgs),
    /// Print weights and consistency metrics for a single pairwise matrix
    Analyze(AnalyzeArgs),
    /// Print the consistency summary of a hierarchy
    Summary(SummaryArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Evaluate(args) => run_evaluate(args),
        Command::Analyze(args) => run_analyze(args),
        Command::Summary(args) => run_summary(args),
    }
}
