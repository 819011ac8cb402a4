use crate::commands::{run_eligibility, run_report, EligibilityArgs, ReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use hr_insights::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "HR Insights",
    about = "Evaluate request eligibility and build cross-module HR reports",
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
    /// Evaluate a request context against the configured eligibility criteria
    Eligibility(EligibilityArgs),
    /// Build a consolidated report over the in-memory module sources
    Report(ReportArgs),
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
        Command::Eligibility(args) => run_eligibility(args),
        Command::Report(args) => run_report(args).await,
    }
}
