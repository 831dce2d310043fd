//! Migration CLI tool.
//!
//! Reads `DATABASE_URL` and runs `up`, `down`, `status`, `fresh` and friends.

use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt().with_env_filter("info").init();
    tracing::info!("Running Blogicum migrations");

    cli::run_cli(migration::Migrator).await;
}
