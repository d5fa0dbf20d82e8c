use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::DatabaseConfig;

/// Postgres-backed storage. Repository impls live next to each feature
/// (`users::repo`, `expenses::repo`).
#[derive(Clone)]
pub struct PgStorage {
    pub db: PgPool,
}

impl PgStorage {
    pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .connect(&cfg.url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub async fn migrate(&self) {
        if let Err(e) = sqlx::migrate!("./migrations").run(&self.db).await {
            tracing::warn!(error = %e, "migration failed; continuing");
        }
    }
}
