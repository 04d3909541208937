use crate::gateway::InvoiceGateway;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, OnceLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Reachability {
    Pending,
    Online,
    Offline,
}

impl Reachability {
    pub const fn label(self) -> &'static str {
        match self {
            Reachability::Pending => "pending",
            Reachability::Online => "online",
            Reachability::Offline => "offline",
        }
    }
}

/// Non-blocking banner shown while the backend is known to be down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BackendNotice {
    pub message: &'static str,
}

impl BackendNotice {
    pub const OFFLINE: BackendNotice = BackendNotice {
        message: "could not reach server. Check that the backend is running.",
    };
}

impl fmt::Display for BackendNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}

/// Sole writer of the process-wide reachability flag.
///
/// `run` consumes the probe, so the flag is written at most once. Views only
/// ever see a [`ReachabilityHandle`].
#[derive(Debug, Default)]
pub struct ReachabilityProbe {
    cell: Arc<OnceLock<bool>>,
}

impl ReachabilityProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> ReachabilityHandle {
        ReachabilityHandle {
            cell: Arc::clone(&self.cell),
        }
    }

    pub async fn run<G>(self, gateway: &G) -> Reachability
    where
        G: InvoiceGateway + ?Sized,
    {
        let online = match gateway.check_health().await {
            Ok(()) => {
                tracing::info!("invoice service reachable");
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "invoice service unreachable");
                false
            }
        };

        if self.cell.set(online).is_err() {
            tracing::debug!("reachability already recorded");
        }
        self.handle().status()
    }
}

/// Read-only view of the reachability flag. Cheap to clone into each view.
#[derive(Debug, Clone)]
pub struct ReachabilityHandle {
    cell: Arc<OnceLock<bool>>,
}

impl ReachabilityHandle {
    pub fn status(&self) -> Reachability {
        match self.cell.get() {
            None => Reachability::Pending,
            Some(true) => Reachability::Online,
            Some(false) => Reachability::Offline,
        }
    }

    pub fn is_online(&self) -> bool {
        self.status() == Reachability::Online
    }

    /// Present only once the probe has reported the backend as down.
    pub fn notice(&self) -> Option<BackendNotice> {
        (self.status() == Reachability::Offline).then_some(BackendNotice::OFFLINE)
    }
}
