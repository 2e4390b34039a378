use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("{entity} is still referenced by an offer and cannot be deleted")]
    Protected { entity: &'static str },

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Error::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// True when the underlying SQLite error is a constraint violation,
    /// e.g. a UNIQUE or CHECK failure that slipped past up-front validation.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Error::Sqlite(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
