use super::fetch::{FetchState, ViewContext, ViewFailure, ViewFetch};
use super::in_flight::{FetchKey, InFlightGuard};
use crate::gateway::InvoiceGateway;
use crate::invoices::report::views::InvoiceCardView;
use crate::invoices::{filter, InvoiceRecord};
use std::sync::Arc;

pub struct InvoiceListView<G: ?Sized> {
    gateway: Arc<G>,
    in_flight: InFlightGuard,
    fetch: ViewFetch<Vec<InvoiceRecord>>,
}

impl<G> InvoiceListView<G>
where
    G: InvoiceGateway + ?Sized,
{
    pub fn new(gateway: Arc<G>, in_flight: InFlightGuard) -> Self {
        Self {
            gateway,
            in_flight,
            fetch: ViewFetch::new(ViewContext::InvoiceList),
        }
    }

    pub fn state(&self) -> &FetchState<Vec<InvoiceRecord>> {
        self.fetch.state()
    }

    pub async fn load(&mut self) -> Result<&[InvoiceRecord], ViewFailure> {
        if !self.fetch.is_mounted() {
            return Err(ViewFailure::discarded(ViewContext::InvoiceList));
        }
        let Some(_permit) = self.in_flight.try_acquire(FetchKey::list()) else {
            return Err(ViewFailure::in_flight(ViewContext::InvoiceList));
        };

        let ticket = self.fetch.begin();
        let result = self.gateway.list_invoices().await;
        self.fetch.settle(ticket, result).map(Vec::as_slice)
    }

    /// Records matching `term`, in fetch order. Empty until a load succeeded.
    pub fn matching(&self, term: &str) -> Vec<&InvoiceRecord> {
        self.fetch
            .state()
            .ready()
            .map(|records| filter(records, term))
            .unwrap_or_default()
    }

    pub fn visible(&self, term: &str) -> Vec<InvoiceCardView> {
        self.matching(term)
            .into_iter()
            .map(InvoiceCardView::from_record)
            .collect()
    }

    pub fn unmount(&mut self) {
        self.fetch.unmount();
    }
}
