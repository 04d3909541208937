use async_trait::async_trait;
use invoice_insight::gateway::{GatewayError, InvoiceGateway, ProcessingOutcome};
use invoice_insight::invoices::export::write_csv;
use invoice_insight::invoices::{Decimal, InvoiceId, InvoiceRecord, QualityMetrics};
use invoice_insight::views::{
    DashboardView, FetchState, InFlightGuard, InvoiceDetailView, InvoiceListView, Reachability,
    ReachabilityProbe,
};
use std::sync::Arc;

struct StaticGateway {
    invoices: Vec<InvoiceRecord>,
    online: bool,
}

#[async_trait]
impl InvoiceGateway for StaticGateway {
    async fn list_invoices(&self) -> Result<Vec<InvoiceRecord>, GatewayError> {
        if !self.online {
            return Err(GatewayError::Unreachable("connection refused".to_string()));
        }
        Ok(self.invoices.clone())
    }

    async fn get_invoice(&self, id: &InvoiceId) -> Result<InvoiceRecord, GatewayError> {
        if !self.online {
            return Err(GatewayError::Unreachable("connection refused".to_string()));
        }
        self.invoices
            .iter()
            .find(|record| &record.id == id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(id.clone()))
    }

    async fn trigger_processing(&self) -> Result<ProcessingOutcome, GatewayError> {
        Err(GatewayError::server(Some(503), "ocr backend busy"))
    }

    async fn check_health(&self) -> Result<(), GatewayError> {
        if self.online {
            Ok(())
        } else {
            Err(GatewayError::Unreachable("connection refused".to_string()))
        }
    }
}

fn dec(raw: &str) -> Decimal {
    raw.parse().expect("valid decimal")
}

fn record(id: &str, number: &str, recipient: &str, score: Option<&str>, amount: &str) -> InvoiceRecord {
    let mut record = InvoiceRecord::new(id);
    record.invoice_number = Some(number.to_string());
    record.recipient = Some(recipient.to_string());
    record.total_amount = Some(dec(amount));
    record.quality_metrics = score.map(|score| QualityMetrics {
        overall_score: dec(score),
        completeness: dec("0.8"),
        consistency: dec("0.9"),
    });
    record
}

fn fleet() -> Vec<InvoiceRecord> {
    vec![
        record("a", "INV-1", "Acme", Some("0.9"), "100"),
        record("b", "INV-2", "Globex", Some("0.4"), "50"),
        record("c", "INV-3", "Initech", None, "25"),
    ]
}

#[tokio::test]
async fn online_session_renders_every_view() {
    let gateway = Arc::new(StaticGateway {
        invoices: fleet(),
        online: true,
    });
    let guard = InFlightGuard::new();

    let probe = ReachabilityProbe::new();
    let reachability = probe.handle();
    assert_eq!(probe.run(gateway.as_ref()).await, Reachability::Online);
    assert!(reachability.notice().is_none());

    let mut dashboard = DashboardView::new(Arc::clone(&gateway), guard.clone());
    let snapshot = dashboard.load().await.expect("dashboard");
    assert_eq!(snapshot.stats.total_invoices, 3);
    assert_eq!(snapshot.stats.total_amount, dec("175"));
    assert_eq!(snapshot.stats.average_quality, dec("0.65"));
    assert_eq!(snapshot.stats.low_quality_count, 1);
    assert_eq!(snapshot.average_quality, "65%");

    let mut list = InvoiceListView::new(Arc::clone(&gateway), guard.clone());
    list.load().await.expect("list");
    let cards = list.visible("acme");
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].id.as_str(), "a");

    let mut export = Vec::new();
    let written = write_csv(&mut export, list.matching("inv")).expect("csv export");
    assert_eq!(written, 3);

    let mut detail = InvoiceDetailView::new(Arc::clone(&gateway), guard);
    detail.load(&InvoiceId::from("b")).await.expect("detail");
    let page = detail.detail().expect("detail page");
    assert_eq!(page.invoice_number, "INV-2");
    assert_eq!(page.quality.expect("scored").completeness_percent, 80);
}

#[tokio::test]
async fn offline_session_fails_softly() {
    let gateway = Arc::new(StaticGateway {
        invoices: fleet(),
        online: false,
    });
    let guard = InFlightGuard::new();

    let probe = ReachabilityProbe::new();
    let reachability = probe.handle();
    probe.run(gateway.as_ref()).await;
    assert!(!reachability.is_online());
    assert!(reachability.notice().is_some());

    let mut dashboard = DashboardView::new(Arc::clone(&gateway), guard.clone());
    assert!(dashboard.load().await.is_err());
    assert!(matches!(
        dashboard.state(),
        FetchState::Failed { message } if message == "could not load invoices"
    ));
    assert!(dashboard.snapshot().is_none());

    let feedback = dashboard.process().await;
    assert!(!feedback.success);
    assert_eq!(feedback.message, "could not process invoices");

    let mut detail = InvoiceDetailView::new(gateway, guard);
    let failure = detail.load(&InvoiceId::from("a")).await.expect_err("offline");
    assert_eq!(failure.to_string(), "could not load invoice");
}
