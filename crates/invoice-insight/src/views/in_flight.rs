use crate::invoices::InvoiceId;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchOperation {
    ListInvoices,
    GetInvoice,
    Process,
}

/// Identity of a fetch: two requests with the same key are the same fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey {
    pub operation: FetchOperation,
    pub invoice_id: Option<InvoiceId>,
}

impl FetchKey {
    pub fn list() -> Self {
        Self {
            operation: FetchOperation::ListInvoices,
            invoice_id: None,
        }
    }

    pub fn invoice(id: &InvoiceId) -> Self {
        Self {
            operation: FetchOperation::GetInvoice,
            invoice_id: Some(id.clone()),
        }
    }

    pub fn process() -> Self {
        Self {
            operation: FetchOperation::Process,
            invoice_id: None,
        }
    }
}

/// Tracks outstanding fetches so identical ones are not issued twice.
#[derive(Debug, Clone, Default)]
pub struct InFlightGuard {
    active: Arc<Mutex<HashSet<FetchKey>>>,
}

impl InFlightGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` while an identical fetch is still outstanding.
    pub fn try_acquire(&self, key: FetchKey) -> Option<InFlightPermit> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if !active.insert(key.clone()) {
            tracing::debug!(?key, "identical fetch already in flight");
            return None;
        }
        Some(InFlightPermit {
            key,
            active: Arc::clone(&self.active),
        })
    }

    pub fn is_in_flight(&self, key: &FetchKey) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }
}

/// Releases its key when dropped.
#[derive(Debug)]
pub struct InFlightPermit {
    key: FetchKey,
    active: Arc<Mutex<HashSet<FetchKey>>>,
}

impl InFlightPermit {
    pub fn key(&self) -> &FetchKey {
        &self.key
    }
}

impl Drop for InFlightPermit {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
