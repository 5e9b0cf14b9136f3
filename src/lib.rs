//! A small record store backed by plain files: a database is a directory and
//! each table is one JSON file holding its schema and rows.
//!
//! ```no_run
//! use jsonfile_db::{create_database, Schema, TypedValue};
//!
//! let mut db = create_database("library")?;
//! let authors = db.create_table("authors", Schema::from_pairs([("id", "int"), ("name", "str")])?)?;
//! authors.insert(vec![TypedValue::Int(1), "Jorge Luis Borges".into()])?;
//! for row in authors.query([("name", "Jorge Luis Borges")])? {
//!     println!("{}", row?);
//! }
//! # Ok::<(), jsonfile_db::DbError>(())
//! ```

pub mod cli;
pub mod codec;
pub mod config;
pub mod database;
pub mod errors;
pub mod row;
pub mod table;
pub mod types;

pub use config::StorageConfig;
pub use database::{connect_database, create_database, Database};
pub use errors::{DbError, DbResult};
pub use row::Row;
pub use table::{Rows, Table};
pub use types::{Column, DataType, Schema, TypedValue};
