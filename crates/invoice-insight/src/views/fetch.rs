use crate::gateway::GatewayError;
use serde::Serialize;
use std::fmt;

/// The screen a fetch belongs to. Decides the message users see on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewContext {
    Dashboard,
    InvoiceList,
    InvoiceDetail,
    Processing,
    Reachability,
}

impl ViewContext {
    pub const fn user_message(self) -> &'static str {
        match self {
            ViewContext::Dashboard | ViewContext::InvoiceList => "could not load invoices",
            ViewContext::InvoiceDetail => "could not load invoice",
            ViewContext::Processing => "could not process invoices",
            ViewContext::Reachability => "could not reach server",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ViewContext::Dashboard => "dashboard",
            ViewContext::InvoiceList => "invoice_list",
            ViewContext::InvoiceDetail => "invoice_detail",
            ViewContext::Processing => "processing",
            ViewContext::Reachability => "reachability",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed { message: String },
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            FetchState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure_message(&self) -> Option<&str> {
        match self {
            FetchState::Failed { message } => Some(message),
            _ => None,
        }
    }
}

/// Proof that a completion belongs to the most recent `begin()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchCompletion {
    Applied,
    Discarded,
}

/// Why a view could not show its data. `Display` is the user-facing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewFailure {
    pub context: ViewContext,
    pub kind: FailureKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Upstream,
    NotFound,
    AlreadyInFlight,
    Discarded,
}

impl ViewFailure {
    pub fn from_gateway(context: ViewContext, err: &GatewayError) -> Self {
        let kind = match err {
            GatewayError::NotFound(_) => FailureKind::NotFound,
            _ => FailureKind::Upstream,
        };
        Self { context, kind }
    }

    pub fn upstream(context: ViewContext) -> Self {
        Self {
            context,
            kind: FailureKind::Upstream,
        }
    }

    pub fn in_flight(context: ViewContext) -> Self {
        Self {
            context,
            kind: FailureKind::AlreadyInFlight,
        }
    }

    pub fn discarded(context: ViewContext) -> Self {
        Self {
            context,
            kind: FailureKind::Discarded,
        }
    }

    pub fn message(&self) -> &'static str {
        match self.kind {
            FailureKind::AlreadyInFlight => "a request for this view is already in progress",
            FailureKind::Discarded => "view is no longer active",
            FailureKind::Upstream | FailureKind::NotFound => self.context.user_message(),
        }
    }
}

impl fmt::Display for ViewFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ViewFailure {}

/// Per-view fetch lifecycle: `Idle -> Loading -> Ready | Failed`.
///
/// Every `begin()` issues a new ticket. Only the completion carrying the
/// latest ticket is applied, and nothing is applied once the view has been
/// unmounted, so a slow response can never overwrite newer state.
///
/// Controllers borrow the view mutably for the whole fetch, so a fetch that
/// is still outstanding is torn down by dropping its future. `unmount` covers
/// views that are kept around after they leave the screen.
#[derive(Debug)]
pub struct ViewFetch<T> {
    context: ViewContext,
    state: FetchState<T>,
    generation: u64,
    mounted: bool,
}

impl<T> ViewFetch<T> {
    pub fn new(context: ViewContext) -> Self {
        Self {
            context,
            state: FetchState::Idle,
            generation: 0,
            mounted: true,
        }
    }

    pub fn context(&self) -> ViewContext {
        self.context
    }

    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn begin(&mut self) -> FetchTicket {
        self.generation += 1;
        if self.mounted {
            self.state = FetchState::Loading;
        }
        FetchTicket {
            generation: self.generation,
        }
    }

    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<T, GatewayError>,
    ) -> FetchCompletion {
        if !self.mounted || ticket.generation != self.generation {
            tracing::debug!(
                view = self.context.label(),
                mounted = self.mounted,
                "discarding stale fetch result"
            );
            return FetchCompletion::Discarded;
        }

        self.state = match result {
            Ok(value) => FetchState::Ready(value),
            Err(err) => {
                tracing::warn!(view = self.context.label(), error = %err, "fetch failed");
                FetchState::Failed {
                    message: self.context.user_message().to_string(),
                }
            }
        };
        FetchCompletion::Applied
    }

    /// Completes the fetch and hands back the fresh value, or the failure a
    /// caller should surface.
    pub fn settle(
        &mut self,
        ticket: FetchTicket,
        result: Result<T, GatewayError>,
    ) -> Result<&T, ViewFailure> {
        let context = self.context;
        let failure = result
            .as_ref()
            .err()
            .map(|err| ViewFailure::from_gateway(context, err));

        if self.complete(ticket, result) == FetchCompletion::Discarded {
            return Err(ViewFailure::discarded(context));
        }

        match &self.state {
            FetchState::Ready(value) => Ok(value),
            _ => Err(failure.unwrap_or_else(|| ViewFailure::upstream(context))),
        }
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
    }
}
