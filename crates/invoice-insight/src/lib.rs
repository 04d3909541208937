pub mod config;
pub mod error;
pub mod gateway;
pub mod invoices;
pub mod telemetry;
pub mod views;
