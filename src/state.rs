use std::sync::Arc;

use anyhow::Context;

use crate::config::{AppConfig, StorageBackend};
use crate::db::PgStorage;
use crate::expenses::services::ExpenseService;
use crate::storage::{ExpenseRepository, MemoryStore, UserRepository};
use crate::users::services::UserService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: UserService,
    pub expenses: ExpenseService,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        match config.backend {
            StorageBackend::Postgres => {
                let db_cfg = config
                    .database
                    .as_ref()
                    .context("postgres backend without database config")?;
                let pg = Arc::new(PgStorage::connect(db_cfg).await?);
                pg.migrate().await;
                tracing::info!("using postgres storage");
                Ok(Self::from_parts(config, pg.clone(), pg))
            }
            StorageBackend::Memory => {
                tracing::warn!("using in-memory storage; data is lost on restart");
                let mem = Arc::new(MemoryStore::new());
                Ok(Self::from_parts(config, mem.clone(), mem))
            }
        }
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserRepository>,
        expenses: Arc<dyn ExpenseRepository>,
    ) -> Self {
        Self {
            config,
            users: UserService::new(users.clone()),
            expenses: ExpenseService::new(expenses, users),
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        let mem = Arc::new(MemoryStore::new());
        Self::from_parts(Arc::new(AppConfig::memory()), mem.clone(), mem)
    }
}
