use migration::Migrator;
use sea_orm_migration::cli;

/// `migration up | down | status | fresh | refresh | reset`, reading `DATABASE_URL`.
#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
