mod cli;
mod console;
mod infra;
mod routes;
mod server;

use invoice_insight::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
