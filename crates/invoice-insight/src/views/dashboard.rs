use super::fetch::{FetchState, ViewContext, ViewFailure, ViewFetch};
use super::in_flight::{FetchKey, InFlightGuard};
use crate::gateway::{InvoiceGateway, ProcessingOutcome};
use crate::invoices::report::views::DashboardSnapshot;
use serde::Serialize;
use std::sync::Arc;

/// Result of a processing run, phrased for a snackbar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingFeedback {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ProcessingOutcome>,
    #[serde(skip)]
    pub failure: Option<ViewFailure>,
}

impl ProcessingFeedback {
    fn succeeded(outcome: ProcessingOutcome) -> Self {
        Self {
            success: true,
            message: format!(
                "{} invoices processed successfully",
                outcome.processed_count
            ),
            outcome: Some(outcome),
            failure: None,
        }
    }

    fn failed(failure: ViewFailure) -> Self {
        Self {
            success: false,
            message: failure.to_string(),
            outcome: None,
            failure: Some(failure),
        }
    }
}

pub struct DashboardView<G: ?Sized> {
    gateway: Arc<G>,
    in_flight: InFlightGuard,
    fetch: ViewFetch<DashboardSnapshot>,
}

impl<G> DashboardView<G>
where
    G: InvoiceGateway + ?Sized,
{
    pub fn new(gateway: Arc<G>, in_flight: InFlightGuard) -> Self {
        Self {
            gateway,
            in_flight,
            fetch: ViewFetch::new(ViewContext::Dashboard),
        }
    }

    pub fn state(&self) -> &FetchState<DashboardSnapshot> {
        self.fetch.state()
    }

    pub fn snapshot(&self) -> Option<&DashboardSnapshot> {
        self.fetch.state().ready()
    }

    /// Fetches the collection and derives the stats. Stats are only computed
    /// from a successful fetch.
    pub async fn load(&mut self) -> Result<&DashboardSnapshot, ViewFailure> {
        if !self.fetch.is_mounted() {
            return Err(ViewFailure::discarded(ViewContext::Dashboard));
        }
        let Some(_permit) = self.in_flight.try_acquire(FetchKey::list()) else {
            return Err(ViewFailure::in_flight(ViewContext::Dashboard));
        };

        let ticket = self.fetch.begin();
        let result = self
            .gateway
            .list_invoices()
            .await
            .map(DashboardSnapshot::build);
        self.fetch.settle(ticket, result)
    }

    /// Runs upstream processing, then refreshes the dashboard when it succeeded.
    pub async fn process(&mut self) -> ProcessingFeedback {
        let Some(_permit) = self.in_flight.try_acquire(FetchKey::process()) else {
            return ProcessingFeedback::failed(ViewFailure::in_flight(ViewContext::Processing));
        };

        match self.gateway.trigger_processing().await {
            Ok(outcome) => {
                if outcome.failed_documents() > 0 {
                    tracing::warn!(
                        failed = outcome.failed_documents(),
                        "some documents failed to process"
                    );
                }
                let feedback = ProcessingFeedback::succeeded(outcome);
                if let Err(failure) = self.load().await {
                    tracing::debug!(%failure, "dashboard refresh after processing failed");
                }
                feedback
            }
            Err(err) => {
                tracing::warn!(view = ViewContext::Processing.label(), error = %err, "processing failed");
                ProcessingFeedback::failed(ViewFailure::from_gateway(ViewContext::Processing, &err))
            }
        }
    }

    pub fn unmount(&mut self) {
        self.fetch.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoices::Decimal;
    use crate::views::testing::{invoice, FakeGateway};
    use std::sync::atomic::Ordering;

    fn dec(raw: &str) -> Decimal {
        raw.parse().expect("valid decimal")
    }

    #[tokio::test]
    async fn load_builds_snapshot_from_the_collection() {
        let gateway = Arc::new(FakeGateway::with_invoices(vec![
            invoice("a", "INV-A", Some("0.9"), Some("100")),
            invoice("b", "INV-B", Some("0.4"), Some("50")),
            invoice("c", "INV-C", None, Some("25")),
        ]));
        let mut view = DashboardView::new(gateway, InFlightGuard::new());

        let snapshot = view.load().await.expect("dashboard loads");

        assert_eq!(snapshot.stats.total_invoices, 3);
        assert_eq!(snapshot.stats.total_amount, dec("175"));
        assert_eq!(snapshot.stats.average_quality, dec("0.65"));
        assert_eq!(snapshot.stats.low_quality_count, 1);
        assert_eq!(snapshot.recent.len(), 3);
    }

    #[tokio::test]
    async fn unreachable_gateway_fails_without_stats() {
        let mut view = DashboardView::new(Arc::new(FakeGateway::offline()), InFlightGuard::new());

        let failure = view.load().await.expect_err("offline");

        assert_eq!(failure.to_string(), "could not load invoices");
        let message = view.state().failure_message().expect("failed state");
        assert!(!message.is_empty());
        assert!(view.snapshot().is_none());
    }

    #[tokio::test]
    async fn identical_load_in_flight_is_rejected() {
        let gateway = Arc::new(FakeGateway::default());
        let guard = InFlightGuard::new();
        let _held = guard.try_acquire(FetchKey::list()).expect("permit");
        let mut view = DashboardView::new(Arc::clone(&gateway), guard);

        let failure = view.load().await.expect_err("duplicate");

        assert_eq!(failure.kind, crate::views::FailureKind::AlreadyInFlight);
        assert_eq!(gateway.list_calls.load(Ordering::SeqCst), 0);
        assert_eq!(view.state(), &FetchState::Idle);
    }

    #[tokio::test]
    async fn unmounted_dashboard_does_not_fetch() {
        let gateway = Arc::new(FakeGateway::with_invoices(vec![invoice(
            "a",
            "INV-A",
            Some("0.9"),
            Some("10"),
        )]));
        let mut view = DashboardView::new(Arc::clone(&gateway), InFlightGuard::new());
        view.unmount();

        let failure = view.load().await.expect_err("unmounted");

        assert_eq!(failure.kind, crate::views::FailureKind::Discarded);
        assert_eq!(gateway.list_calls.load(Ordering::SeqCst), 0);
        assert!(view.snapshot().is_none());
    }

    #[tokio::test]
    async fn processing_refreshes_the_dashboard() {
        let gateway = Arc::new(FakeGateway::with_invoices(vec![invoice(
            "a",
            "INV-A",
            Some("0.9"),
            Some("10"),
        )]));
        gateway
            .pending
            .lock()
            .expect("pending lock")
            .extend([
                invoice("b", "INV-B", Some("0.8"), Some("5")),
                invoice("c", "INV-C", Some("0.7"), Some("5")),
            ]);
        let mut view = DashboardView::new(Arc::clone(&gateway), InFlightGuard::new());
        view.load().await.expect("initial load");

        let feedback = view.process().await;

        assert!(feedback.success);
        assert_eq!(feedback.message, "2 invoices processed successfully");
        assert_eq!(gateway.list_calls.load(Ordering::SeqCst), 2);
        let snapshot = view.snapshot().expect("refreshed");
        assert_eq!(snapshot.stats.total_invoices, 3);
        assert_eq!(snapshot.stats.total_amount, dec("20"));
    }

    #[tokio::test]
    async fn processing_failure_reports_generic_message() {
        let mut view = DashboardView::new(Arc::new(FakeGateway::offline()), InFlightGuard::new());

        let feedback = view.process().await;

        assert!(!feedback.success);
        assert_eq!(feedback.message, "could not process invoices");
        assert!(feedback.outcome.is_none());
        assert_eq!(
            feedback.failure.map(|failure| failure.kind),
            Some(crate::views::FailureKind::Upstream)
        );
        assert_eq!(view.state(), &FetchState::Idle);
    }
}
