use crate::infra::http_gateway;
use clap::Args;
use invoice_insight::config::AppConfig;
use invoice_insight::error::AppError;
use invoice_insight::gateway::InvoiceGateway;
use invoice_insight::invoices::export::write_csv;
use invoice_insight::invoices::InvoiceId;
use invoice_insight::telemetry;
use invoice_insight::views::{
    DashboardSnapshot, DashboardView, InFlightGuard, InvoiceCardView, InvoiceDetailPage,
    InvoiceDetailView, InvoiceListView, ReachabilityProbe,
};
use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct ListArgs {
    /// Case-insensitive match on invoice number or recipient, or a substring of the amount
    #[arg(long)]
    pub(crate) search: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct ShowArgs {
    /// Invoice identifier as reported by the invoice service
    pub(crate) id: String,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Destination CSV file
    #[arg(long)]
    pub(crate) output: PathBuf,
    /// Only export invoices matching this search term
    #[arg(long)]
    pub(crate) search: Option<String>,
}

struct Session {
    gateway: Arc<dyn InvoiceGateway>,
    in_flight: InFlightGuard,
}

/// Loads config, probes the backend once, and prints the notice when it is down.
/// The commands still run; they fail with their own message if the backend stays down.
async fn connect() -> Result<Session, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let gateway = http_gateway(&config);
    let probe = ReachabilityProbe::new();
    let reachability = probe.handle();
    probe.run(gateway.as_ref()).await;
    if let Some(notice) = reachability.notice() {
        eprintln!("{notice}");
    }

    Ok(Session {
        gateway,
        in_flight: InFlightGuard::new(),
    })
}

pub(crate) async fn run_dashboard() -> Result<(), AppError> {
    let session = connect().await?;
    let mut view = DashboardView::new(session.gateway, session.in_flight);
    let snapshot = view.load().await?;
    print!("{}", DashboardReport(snapshot));
    Ok(())
}

pub(crate) async fn run_list(args: ListArgs) -> Result<(), AppError> {
    let session = connect().await?;
    let mut view = InvoiceListView::new(session.gateway, session.in_flight);
    view.load().await?;

    let cards = view.visible(args.search.as_deref().unwrap_or_default());
    print!("{}", CardList(&cards));
    Ok(())
}

pub(crate) async fn run_show(args: ShowArgs) -> Result<(), AppError> {
    let session = connect().await?;
    let mut view = InvoiceDetailView::new(session.gateway, session.in_flight);
    let record = view.load(&InvoiceId::from(args.id)).await?;
    print!("{}", DetailReport(&InvoiceDetailPage::from_record(record)));
    Ok(())
}

pub(crate) async fn run_process() -> Result<(), AppError> {
    let session = connect().await?;
    let mut view = DashboardView::new(session.gateway, session.in_flight);
    let feedback = view.process().await;
    if let Some(failure) = feedback.failure {
        return Err(failure.into());
    }

    println!("{}", feedback.message);
    if let Some(outcome) = &feedback.outcome {
        for document in outcome.results.iter().filter(|document| !document.success) {
            println!(
                "  failed: {} ({})",
                document.blob_name.as_deref().unwrap_or("unknown document"),
                document.error.as_deref().unwrap_or("no reason given")
            );
        }
    }
    if let Some(snapshot) = view.snapshot() {
        print!("\n{}", DashboardReport(snapshot));
    }
    Ok(())
}

pub(crate) async fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let ExportArgs { output, search } = args;

    let session = connect().await?;
    let mut view = InvoiceListView::new(session.gateway, session.in_flight);
    view.load().await?;

    let file = File::create(&output)?;
    let written = write_csv(
        BufWriter::new(file),
        view.matching(search.as_deref().unwrap_or_default()),
    )?;
    println!("Exported {written} invoices to {}", output.display());
    Ok(())
}

struct CardLine<'a>(&'a InvoiceCardView);

impl fmt::Display for CardLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let card = self.0;
        write!(
            f,
            "  {:<14} {:<24} {:<10} {:>16}  {} [{}]",
            card.invoice_number,
            card.recipient,
            card.date,
            card.total,
            card.quality_label,
            card.badge.label()
        )
    }
}

pub(crate) struct DashboardReport<'a>(pub(crate) &'a DashboardSnapshot);

impl fmt::Display for DashboardReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.0;
        writeln!(f, "Invoice dashboard")?;
        writeln!(f, "Total invoices: {}", snapshot.stats.total_invoices)?;
        writeln!(f, "Total amount: {}", snapshot.total_amount)?;
        writeln!(
            f,
            "Average quality: {} ({})",
            snapshot.average_quality,
            snapshot.average_quality_color.label()
        )?;
        writeln!(f, "Low quality invoices: {}", snapshot.stats.low_quality_count)?;

        if let Some(notice) = snapshot.empty_notice {
            return writeln!(f, "\n{notice}");
        }

        writeln!(f, "\nRecent invoices")?;
        for card in &snapshot.recent {
            writeln!(f, "{}", CardLine(card))?;
        }
        Ok(())
    }
}

pub(crate) struct CardList<'a>(pub(crate) &'a [InvoiceCardView]);

impl fmt::Display for CardList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No invoices found");
        }

        writeln!(f, "{} invoices", self.0.len())?;
        for card in self.0 {
            writeln!(f, "{}", CardLine(card))?;
        }
        Ok(())
    }
}

pub(crate) struct DetailReport<'a>(pub(crate) &'a InvoiceDetailPage);

impl fmt::Display for DetailReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let page = self.0;
        writeln!(f, "Invoice {}", page.invoice_number)?;
        writeln!(f, "Recipient: {}", page.recipient)?;
        writeln!(f, "Address: {}", page.address)?;
        writeln!(f, "Date: {}", page.date)?;
        writeln!(f, "Total: {}", page.total)?;
        writeln!(f, "Processed: {}", page.processed_on)?;
        if let Some(source) = &page.source {
            writeln!(f, "Source: {source}")?;
        }

        match &page.quality {
            Some(quality) => {
                writeln!(
                    f,
                    "\nQuality: {}% ({})",
                    quality.overall_percent,
                    quality.classification.label()
                )?;
                writeln!(f, "  Completeness: {}", quality.completeness_note)?;
                writeln!(f, "  Consistency: {}", quality.consistency_note)?;
            }
            None => writeln!(f, "\nQuality: N/A")?,
        }

        if !page.items.is_empty() {
            writeln!(f, "\nLine items")?;
            for item in &page.items {
                writeln!(
                    f,
                    "  {} x{} @ {} = {}",
                    item.description, item.quantity, item.unit_price, item.amount
                )?;
            }
        }

        writeln!(f, "\nOCR text\n{}", page.raw_text)
    }
}
