use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("StoreError - Sqlx: {0}")]
    Sqlx(sqlx::Error),
    #[error("StoreError - Migrate: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("StoreError - Duplicate: '{0}' already exists")]
    Duplicate(String),
    #[error("StoreError - ConstraintViolation: {0}")]
    ConstraintViolation(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(ref err) if err.is_unique_violation() => {
                Self::Duplicate(err.constraint().unwrap_or(err.message()).to_string())
            }
            sqlx::Error::Database(ref err)
                if err.is_foreign_key_violation() || err.is_check_violation() =>
            {
                let detail = match err.constraint() {
                    Some(constraint) => format!("{constraint}: {}", err.message()),
                    None => err.message().to_string(),
                };
                Self::ConstraintViolation(detail)
            }
            e => Self::Sqlx(e),
        }
    }
}
