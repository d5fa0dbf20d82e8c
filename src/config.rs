#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "memory" | "mem" => Ok(Self::Memory),
            other => anyhow::bail!("unknown STORAGE_BACKEND {other:?}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: StorageBackend,
    /// Only present for the Postgres backend.
    pub database: Option<DatabaseConfig>,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let backend = match get("STORAGE_BACKEND") {
            Some(v) => v.parse()?,
            None => StorageBackend::Postgres,
        };

        let database = match backend {
            StorageBackend::Postgres => {
                let url = get("DATABASE_URL")
                    .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for the postgres backend"))?;
                let max_connections = get("DATABASE_MAX_CONNECTIONS")
                    .and_then(|v| v.parse::<u32>().ok())
                    .unwrap_or(10);
                Some(DatabaseConfig { url, max_connections })
            }
            StorageBackend::Memory => None,
        };

        let port = match get("APP_PORT") {
            Some(v) => v.parse::<u16>()?,
            None => 8080,
        };

        Ok(Self {
            backend,
            database,
            host: get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
        })
    }

    #[cfg(test)]
    pub fn memory() -> Self {
        Self {
            backend: StorageBackend::Memory,
            database: None,
            host: "127.0.0.1".into(),
            port: 0,
        }
    }
}
