use super::fetch::{FetchState, ViewContext, ViewFailure, ViewFetch};
use super::in_flight::{FetchKey, InFlightGuard};
use crate::gateway::InvoiceGateway;
use crate::invoices::report::views::InvoiceDetailPage;
use crate::invoices::{InvoiceId, InvoiceRecord};
use std::sync::Arc;

pub struct InvoiceDetailView<G: ?Sized> {
    gateway: Arc<G>,
    in_flight: InFlightGuard,
    fetch: ViewFetch<InvoiceRecord>,
}

impl<G> InvoiceDetailView<G>
where
    G: InvoiceGateway + ?Sized,
{
    pub fn new(gateway: Arc<G>, in_flight: InFlightGuard) -> Self {
        Self {
            gateway,
            in_flight,
            fetch: ViewFetch::new(ViewContext::InvoiceDetail),
        }
    }

    pub fn state(&self) -> &FetchState<InvoiceRecord> {
        self.fetch.state()
    }

    pub async fn load(&mut self, id: &InvoiceId) -> Result<&InvoiceRecord, ViewFailure> {
        if !self.fetch.is_mounted() {
            return Err(ViewFailure::discarded(ViewContext::InvoiceDetail));
        }
        let Some(_permit) = self.in_flight.try_acquire(FetchKey::invoice(id)) else {
            return Err(ViewFailure::in_flight(ViewContext::InvoiceDetail));
        };

        let ticket = self.fetch.begin();
        let result = self.gateway.get_invoice(id).await;
        self.fetch.settle(ticket, result)
    }

    pub fn detail(&self) -> Option<InvoiceDetailPage> {
        self.fetch.state().ready().map(InvoiceDetailPage::from_record)
    }

    pub fn unmount(&mut self) {
        self.fetch.unmount();
    }
}
