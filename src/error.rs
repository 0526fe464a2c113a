#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("API response is not a mapping")]
    NotAMapping,

    #[error("Argument is not an integer: {0}")]
    NotAnInteger(String),

    #[error("Count must be in the range 1 to 100, got {0}")]
    OutOfRange(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}
