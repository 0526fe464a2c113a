mod collectors;
mod config;
mod db;
mod error;
mod models;
mod prompt;
mod render;
#[cfg(test)]
mod testing;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::collectors::hh::{self, HhClient};
use crate::config::{Command, Config};
use crate::db::DbManager;
use crate::models::employer::Employer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hhloader=info")),
        )
        .init();

    let config = Config::parse();
    let mut db = DbManager::new(config.db.clone());

    match config.resolved_command() {
        Command::Init => {
            if db.ensure_database().await? {
                tracing::info!("Created database {}", config.db.dbname);
            }
            tracing::info!("Running database migrations...");
            db.run_migrations().await?;
            tracing::info!("Migrations complete");
        }
        Command::Load { top, max_pages } => {
            let top_n = hh::parse_top_n(&top)?;
            let client = HhClient::new()?;
            let summary = collectors::runner::run(&client, &mut db, top_n, max_pages).await?;
            println!(
                "Stored {} employers and {} vacancies",
                summary.employers, summary.vacancies
            );
        }
        Command::Search { keyword } => {
            let client = HhClient::new()?;
            let employers: Vec<Employer> = client
                .search_employers_by_keyword(&keyword)
                .await?
                .iter()
                .filter_map(Employer::from_api)
                .collect();
            println!("{}", render::render_table(&employers));
        }
        Command::Query => prompt::run(&mut db).await?,
    }

    Ok(())
}
