//! View controllers and the state they share.
//!
//! Each controller drives one [`ViewFetch`] against an [`InvoiceGateway`]
//! and exposes render models from `invoices::report::views`. Failures reach
//! users only as the generic message of their [`ViewContext`].
//!
//! [`InvoiceGateway`]: crate::gateway::InvoiceGateway

mod dashboard;
mod detail;
mod fetch;
mod in_flight;
mod list;
mod reachability;

#[cfg(test)]
pub(crate) mod testing;

pub use dashboard::{DashboardView, ProcessingFeedback};
pub use detail::InvoiceDetailView;
pub use fetch::{
    FailureKind, FetchCompletion, FetchState, FetchTicket, ViewContext, ViewFailure, ViewFetch,
};
pub use in_flight::{FetchKey, FetchOperation, InFlightGuard, InFlightPermit};
pub use list::InvoiceListView;
pub use reachability::{BackendNotice, Reachability, ReachabilityHandle, ReachabilityProbe};

pub use crate::invoices::report::views::{
    DashboardSnapshot, InvoiceCardView, InvoiceDetailPage, LineItemRow, QualityBreakdown,
};
