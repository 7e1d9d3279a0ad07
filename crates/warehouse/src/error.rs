use thiserror::Error;

#[derive(Error, Debug)]
pub enum WarehouseError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("not configured: {0}")]
    NotConfigured(String),
}
