use crate::report::{run_export, run_report, ExportArgs, ReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use facility_insights::config::BackendConfig;
use facility_insights::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Facility Insights",
    about = "Serve and inspect hospital, school and preschool need dashboards",
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
    /// Fetch one domain and print its dashboard as text
    Report(ReportArgs),
    /// Write one topic table of a domain as CSV
    Export(ExportArgs),
}

/// Where datasets come from; overrides the environment when given.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct SourceArgs {
    /// Override the survey backend base URL
    #[arg(long)]
    pub(crate) backend_url: Option<String>,
    /// Read `{domain}.csv` exports from this directory instead of the backend
    #[arg(long)]
    pub(crate) dataset_dir: Option<PathBuf>,
}

impl SourceArgs {
    pub(crate) fn apply(self, backend: &mut BackendConfig) {
        if let Some(url) = self.backend_url {
            backend.base_url = url;
        }
        if let Some(dir) = self.dataset_dir {
            backend.dataset_dir = Some(dir);
        }
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) source: SourceArgs,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report(args) => run_report(args).await,
        Command::Export(args) => run_export(args).await,
    }
}
