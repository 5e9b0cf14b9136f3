use crate::config::{validate_name, StorageConfig};
use crate::errors::{DbError, DbResult};
use crate::table::{Table, TABLE_FILE_EXTENSION};
use crate::types::Schema;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A database directory and handles to the tables found in it.
///
/// The table list is a snapshot taken at connect time, extended by
/// [`Database::create_table`]; tables added through another handle are not
/// picked up.
#[derive(Debug)]
pub struct Database {
    name: String,
    path: PathBuf,
    table_names: Vec<String>,
    tables: HashMap<String, Table>,
}

impl Database {
    /// Creates the directory for a new, empty database.
    pub fn create(config: &StorageConfig, name: &str) -> DbResult<()> {
        let path = config.database_path(name)?;

        fs::create_dir_all(config.root()).map_err(|e| DbError::io(config.root(), e))?;
        match fs::create_dir(&path) {
            Ok(()) => {
                info!("Created database {} at {}", name, path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(DbError::DatabaseAlreadyExists(name.to_string()))
            }
            Err(e) => Err(DbError::io(&path, e)),
        }
    }

    /// Opens an existing database and loads a handle for every table file.
    pub fn connect(config: &StorageConfig, name: &str) -> DbResult<Self> {
        let path = config.database_path(name)?;
        if !path.is_dir() {
            return Err(DbError::DatabaseNotFound(name.to_string()));
        }

        let table_names = Self::read_tables(&path)?;
        let mut tables = HashMap::with_capacity(table_names.len());
        for table_name in &table_names {
            tables.insert(table_name.clone(), Table::open(&path, table_name)?);
        }

        info!("Connected to database {} ({} tables)", name, table_names.len());
        Ok(Self {
            name: name.to_string(),
            path,
            table_names,
            tables,
        })
    }

    /// Table names derived from the `*.json` files in `path`, sorted.
    fn read_tables(path: &Path) -> DbResult<Vec<String>> {
        let entries = fs::read_dir(path).map_err(|e| DbError::io(path, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DbError::io(path, e))?;
            let file_path = entry.path();

            if !file_path.is_file()
                || file_path.extension().and_then(|s| s.to_str()) != Some(TABLE_FILE_EXTENSION)
            {
                continue;
            }

            let Some(stem) = file_path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if stem.starts_with('.') {
                continue;
            }
            if validate_name(stem).is_err() {
                warn!("Skipping {}: not a valid table name", file_path.display());
                continue;
            }

            debug!("Found table file {}", file_path.display());
            names.push(stem.to_string());
        }

        names.sort();
        Ok(names)
    }

    /// Creates a new table file and registers its handle.
    pub fn create_table(&mut self, name: &str, schema: Schema) -> DbResult<&Table> {
        validate_name(name)?;
        if self.tables.contains_key(name) {
            return Err(DbError::TableAlreadyExists(name.to_string()));
        }

        let table = Table::create(&self.path, name, schema)?;
        self.table_names.push(name.to_string());
        Ok(&*self.tables.entry(name.to_string()).or_insert(table))
    }

    pub fn show_tables(&self) -> &[String] {
        &self.table_names
    }

    pub fn table(&self, name: &str) -> DbResult<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Creates a database under the configured storage root and connects to it.
pub fn create_database(name: &str) -> DbResult<Database> {
    let config = StorageConfig::from_env();
    Database::create(&config, name)?;
    Database::connect(&config, name)
}

/// Connects to an existing database under the configured storage root.
pub fn connect_database(name: &str) -> DbResult<Database> {
    Database::connect(&StorageConfig::from_env(), name)
}
