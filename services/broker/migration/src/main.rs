use sea_orm_migration::prelude::*;

use swingdesk_broker_migration::Migrator;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
