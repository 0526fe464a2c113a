//! PostgreSQL container shared by the database tests.
//!
//! The container starts once on first use and lives for the whole test run.
//! Every test gets its own freshly created and migrated database on it, so
//! tests can run in parallel without seeing each other's rows.

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

use crate::config::DbParams;
use crate::db::DbManager;

struct SharedPostgres {
    host: String,
    port: u16,
    // Keep the container alive for the entire test run
    _container: ContainerAsync<Postgres>,
}

static SHARED_POSTGRES: OnceCell<SharedPostgres> = OnceCell::const_new();
static NEXT_DATABASE: AtomicUsize = AtomicUsize::new(0);

impl SharedPostgres {
    async fn start() -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let container = Postgres::default()
            .with_tag("16")
            .start()
            .await
            .context("Failed to start Postgres container")?;
        let host = container.get_host().await?.to_string();
        let port = container.get_host_port_ipv4(5432).await?;

        Ok(Self {
            host,
            port,
            _container: container,
        })
    }

    async fn get() -> &'static Self {
        SHARED_POSTGRES
            .get_or_init(|| async {
                Self::start()
                    .await
                    .expect("Failed to initialize shared Postgres container")
            })
            .await
    }

    fn params(&self, dbname: &str) -> DbParams {
        DbParams {
            host: self.host.clone(),
            user: "postgres".to_string(),
            port: self.port,
            dbname: dbname.to_string(),
            password: Some("postgres".to_string()),
        }
    }
}

/// A `DbManager` bound to a new, migrated, empty database.
pub async fn fresh_database() -> DbManager {
    let shared = SharedPostgres::get().await;
    let n = NEXT_DATABASE.fetch_add(1, Ordering::Relaxed);
    let mut db = DbManager::new(shared.params(&format!("hhloader_test_{n}")));

    assert!(db.ensure_database().await.unwrap(), "database already existed");
    db.run_migrations().await.unwrap();
    db
}
