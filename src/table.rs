use crate::codec;
use crate::errors::{DbError, DbResult};
use crate::row::Row;
use crate::types::{Column, Schema, TypedValue};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const TABLE_FILE_EXTENSION: &str = "json";

/// On-disk layout of a table: the schema header and positional rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TableFile {
    columns: Schema,
    rows: Vec<Vec<JsonValue>>,
}

/// Handle to one table file. Only the schema is kept in memory; every
/// operation goes back to the file.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    path: PathBuf,
    schema: Schema,
}

impl Table {
    /// Writes an empty table file to `<db_path>/<name>.json`.
    pub(crate) fn create(db_path: &Path, name: &str, schema: Schema) -> DbResult<Self> {
        let path = Self::file_path(db_path, name);
        if path.exists() {
            return Err(DbError::TableAlreadyExists(name.to_string()));
        }

        let table = Self {
            name: name.to_string(),
            path,
            schema,
        };
        let file = TableFile {
            columns: table.schema.clone(),
            rows: Vec::new(),
        };
        table.write_file(&file)?;

        info!("Created table {} with {} columns", table.name, table.schema.len());
        Ok(table)
    }

    /// Loads the schema of an existing table file.
    pub(crate) fn open(db_path: &Path, name: &str) -> DbResult<Self> {
        let path = Self::file_path(db_path, name);
        remove_stale_temp_files(db_path, name)?;
        let file = read_table_file(&path)?;

        debug!("Opened table {} ({} rows)", name, file.rows.len());
        Ok(Self {
            name: name.to_string(),
            path,
            schema: file.columns,
        })
    }

    pub(crate) fn file_path(db_path: &Path, name: &str) -> PathBuf {
        db_path.join(format!("{}.{}", name, TABLE_FILE_EXTENSION))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Schema captured when the handle was built.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Validates a positional row and appends it to the file.
    ///
    /// The field count is checked before any type, and the first failing
    /// field aborts the insert with the file left as it was.
    pub fn insert(&self, values: Vec<TypedValue>) -> DbResult<()> {
        if values.len() != self.schema.len() {
            return Err(DbError::InvalidFieldCount {
                expected: self.schema.len(),
                given: values.len(),
            });
        }

        for (column, value) in self.schema.columns().iter().zip(&values) {
            codec::validate(column, value)?;
        }

        let mut file = self.read_file()?;
        file.rows.push(values.iter().map(codec::encode).collect());
        self.write_file(&file)?;

        debug!("Inserted row into {} ({} rows)", self.name, file.rows.len());
        Ok(())
    }

    /// Rows whose fields equal every given filter, in insertion order.
    ///
    /// Filters are checked against the schema first: an unknown column or a
    /// value of the wrong type is an error rather than an empty result. The
    /// file is read once per call and rows are decoded as the iterator
    /// advances.
    pub fn query<I, K, V>(&self, filters: I) -> DbResult<Rows>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<TypedValue>,
    {
        let mut resolved = Vec::new();
        for (name, value) in filters {
            let name: String = name.into();
            let value: TypedValue = value.into();
            let (index, column) = self
                .schema
                .column(&name)
                .ok_or_else(|| DbError::UnknownColumn(name.clone()))?;
            if value.get_type() != column.data_type {
                return Err(DbError::invalid_type(
                    &column.name,
                    value.type_name(),
                    column.data_type.as_str(),
                ));
            }
            resolved.push((index, value));
        }

        let file = self.read_file()?;
        Ok(Rows {
            path: self.path.clone(),
            columns: file.columns.columns().to_vec(),
            raw: file.rows.into_iter(),
            position: 0,
            filters: resolved,
            failed: false,
        })
    }

    pub fn all(&self) -> DbResult<Rows> {
        self.query(std::iter::empty::<(String, TypedValue)>())
    }

    pub fn count(&self) -> DbResult<usize> {
        Ok(self.read_file()?.rows.len())
    }

    /// The column list as persisted in the table file.
    pub fn describe(&self) -> DbResult<Vec<Column>> {
        Ok(self.read_file()?.columns.into())
    }

    fn read_file(&self) -> DbResult<TableFile> {
        let file = read_table_file(&self.path)?;
        if file.columns != self.schema {
            return Err(DbError::deserialization(
                &self.path,
                "persisted columns differ from the table schema",
            ));
        }
        Ok(file)
    }

    /// Replaces the table file: the document goes to a hidden temp file in
    /// the same directory, which is then renamed over the original.
    fn write_file(&self, file: &TableFile) -> DbResult<()> {
        let json = serde_json::to_vec_pretty(file)
            .map_err(|e| DbError::io(&self.path, io::Error::new(io::ErrorKind::InvalidData, e)))?;

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let tmp_path = dir.join(format!(
            ".{}.{}.{}.tmp",
            self.name,
            TABLE_FILE_EXTENSION,
            Uuid::new_v4()
        ));

        if let Err(e) = write_and_sync(&tmp_path, &json) {
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                warn!("Could not remove {}: {}", tmp_path.display(), cleanup);
            }
            return Err(DbError::io(&tmp_path, e));
        }

        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                warn!("Could not remove {}: {}", tmp_path.display(), cleanup);
            }
            return Err(DbError::io(&self.path, e));
        }

        debug!("Wrote {} bytes to {}", json.len(), self.path.display());
        Ok(())
    }
}

fn write_and_sync(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// Removes `.<name>.json.*.tmp` files left by writes that never reached the
/// rename, e.g. after a crash.
fn remove_stale_temp_files(db_path: &Path, name: &str) -> DbResult<()> {
    let prefix = format!(".{}.{}.", name, TABLE_FILE_EXTENSION);
    let entries = fs::read_dir(db_path).map_err(|e| DbError::io(db_path, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| DbError::io(db_path, e))?;
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };

        if file_name.starts_with(&prefix) && file_name.ends_with(".tmp") {
            let stale = entry.path();
            warn!("Removing stale temp file {}", stale.display());
            fs::remove_file(&stale).map_err(|e| DbError::io(&stale, e))?;
        }
    }

    Ok(())
}

fn read_table_file(path: &Path) -> DbResult<TableFile> {
    let content = match fs::read(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(DbError::deserialization(path, "table file is missing"));
        }
        Err(e) => return Err(DbError::io(path, e)),
    };

    serde_json::from_slice(&content).map_err(|e| DbError::deserialization(path, e))
}

/// Lazy sequence of rows produced by [`Table::query`] and [`Table::all`].
///
/// A row that cannot be decoded yields one error and ends the sequence.
#[derive(Debug)]
pub struct Rows {
    path: PathBuf,
    columns: Vec<Column>,
    raw: std::vec::IntoIter<Vec<JsonValue>>,
    position: usize,
    filters: Vec<(usize, TypedValue)>,
    failed: bool,
}

impl Rows {
    fn decode(&self, raw: Vec<JsonValue>) -> DbResult<Vec<TypedValue>> {
        if raw.len() != self.columns.len() {
            return Err(DbError::deserialization(
                &self.path,
                format!(
                    "row {} has {} values, expected {}",
                    self.position,
                    raw.len(),
                    self.columns.len()
                ),
            ));
        }

        self.columns
            .iter()
            .zip(&raw)
            .map(|(column, value)| {
                codec::decode(column.data_type, value).map_err(|reason| {
                    DbError::deserialization(
                        &self.path,
                        format!("row {}, field \"{}\": {}", self.position, column.name, reason),
                    )
                })
            })
            .collect()
    }

    fn matches(&self, values: &[TypedValue]) -> bool {
        self.filters
            .iter()
            .all(|(index, expected)| values.get(*index) == Some(expected))
    }
}

impl Iterator for Rows {
    type Item = DbResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        while let Some(raw) = self.raw.next() {
            let decoded = self.decode(raw);
            self.position += 1;

            match decoded {
                Ok(values) if self.matches(&values) => {
                    let fields = self
                        .columns
                        .iter()
                        .map(|c| c.name.clone())
                        .zip(values)
                        .collect();
                    return Some(Ok(Row::from_values(fields)));
                }
                Ok(_) => continue,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            (0, Some(0))
        } else {
            (0, Some(self.raw.len()))
        }
    }
}

impl std::iter::FusedIterator for Rows {}
