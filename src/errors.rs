use std::path::PathBuf;
use thiserror::Error;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    // Storage already present
    #[error("Database with name \"{0}\" already exists.")]
    DatabaseAlreadyExists(String),
    #[error("Table with name \"{0}\" already exists.")]
    TableAlreadyExists(String),

    // Lookup misses
    #[error("Database with name \"{0}\" does not exist.")]
    DatabaseNotFound(String),
    #[error("Table with name \"{0}\" does not exist.")]
    TableNotFound(String),

    // Row validation
    #[error("Invalid amount of fields: given {given}, expected {expected}")]
    InvalidFieldCount { expected: usize, given: usize },
    #[error("Invalid type of field \"{field}\": Given \"{given}\", expected \"{expected}\"")]
    InvalidType {
        field: String,
        given: String,
        expected: String,
    },
    #[error("Invalid value of field \"{field}\": {reason}")]
    InvalidValue { field: String, reason: String },

    // Schema and naming
    #[error("Unknown column \"{0}\"")]
    UnknownColumn(String),
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
    #[error("Invalid name \"{0}\": use letters, digits, '_' or '-'")]
    InvalidName(String),

    // File system
    #[error("Cannot read table file {}: {reason}", path.display())]
    Deserialization { path: PathBuf, reason: String },
    #[error("File system error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DbError {
    pub fn invalid_type(field: &str, given: &str, expected: &str) -> Self {
        DbError::InvalidType {
            field: field.to_string(),
            given: given.to_string(),
            expected: expected.to_string(),
        }
    }

    pub fn invalid_value(field: &str, reason: impl Into<String>) -> Self {
        DbError::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn deserialization(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        DbError::Deserialization {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DbError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the errors raised while checking a row before it is written.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DbError::InvalidFieldCount { .. }
                | DbError::InvalidType { .. }
                | DbError::InvalidValue { .. }
        )
    }
}
