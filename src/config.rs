use crate::errors::{DbError, DbResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming the storage root.
pub const ROOT_ENV_VAR: &str = "JSONFILE_DB_ROOT";
pub const DEFAULT_ROOT: &str = "data";

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_-]*$").expect("valid name pattern"));

/// Where databases live: one directory per database under `root`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub root: PathBuf,
}

impl StorageConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_env() -> Self {
        let root = env::var_os(ROOT_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT));
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn database_path(&self, name: &str) -> DbResult<PathBuf> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT)
    }
}

/// Database and table names become path components, so they are restricted
/// to a safe character set.
pub fn validate_name(name: &str) -> DbResult<()> {
    if NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(DbError::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("library").is_ok());
        assert!(validate_name("test-db").is_ok());
        assert!(validate_name("db_1").is_ok());

        for bad in ["", "../etc", "a/b", ".hidden", "authors.json", "-x", "two words"] {
            assert!(matches!(validate_name(bad), Err(DbError::InvalidName(_))), "{}", bad);
        }
    }

    #[test]
    fn test_database_path() {
        let config = StorageConfig::new("/srv/db");
        assert_eq!(config.database_path("library").unwrap(), PathBuf::from("/srv/db/library"));
        assert!(config.database_path("..").is_err());
    }
}
