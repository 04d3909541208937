use crate::console::{self, ExportArgs, ListArgs, ShowArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use invoice_insight::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Invoice Insight",
    about = "Browse OCR-extracted invoices and their quality scores",
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
    /// Print fleet statistics and the most recently processed invoices
    Dashboard,
    /// Inspect, process, or export invoices
    Invoices {
        #[command(subcommand)]
        command: InvoicesCommand,
    },
}

#[derive(Subcommand, Debug)]
enum InvoicesCommand {
    /// List invoices, optionally filtered by a search term
    List(ListArgs),
    /// Show one invoice with its line items and quality breakdown
    Show(ShowArgs),
    /// Ask the invoice service to ingest and score new documents
    Process,
    /// Write the (optionally filtered) invoice list to a CSV file
    Export(ExportArgs),
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
        Command::Dashboard => console::run_dashboard().await,
        Command::Invoices { command } => match command {
            InvoicesCommand::List(args) => console::run_list(args).await,
            InvoicesCommand::Show(args) => console::run_show(args).await,
            InvoicesCommand::Process => console::run_process().await,
            InvoicesCommand::Export(args) => console::run_export(args).await,
        },
    }
}
