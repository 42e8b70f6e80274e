mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use family_estate::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
