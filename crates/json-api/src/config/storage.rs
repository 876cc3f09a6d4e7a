//! Storage Config

use clap::{Args, ValueEnum};

/// Where tenants and jobs are kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StorageBackend {
    /// `PostgreSQL`, durable across restarts.
    Postgres,

    /// Process memory; everything is lost on exit.
    Memory,
}

/// Storage settings.
#[derive(Debug, Args)]
pub struct StorageConfig {
    /// Storage backend (postgres, memory)
    #[arg(long, env = "STORAGE_BACKEND", value_enum, default_value_t = StorageBackend::Postgres)]
    pub storage_backend: StorageBackend,

    /// `PostgreSQL` connection string, required for the postgres backend
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Apply pending migrations before serving
    #[arg(long, env = "RUN_MIGRATIONS", default_value_t = false)]
    pub run_migrations: bool,

    /// Create the demo tenants on startup if they do not exist
    #[arg(long, env = "SEED_DEMO_TENANTS", default_value_t = false)]
    pub seed_demo_tenants: bool,
}
