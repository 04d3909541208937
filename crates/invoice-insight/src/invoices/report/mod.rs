mod recency;
mod search;
mod stats;
pub mod views;

pub use recency::{recent, RECENT_INVOICE_LIMIT};
pub use search::{filter, matches};
pub use stats::{aggregate, FleetStats};
