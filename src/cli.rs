use crate::config::StorageConfig;
use crate::database::Database;
use crate::errors::{DbError, DbResult};
use crate::types::{Column, Schema, TypedValue};

pub const USAGE: &str = "\
Usage:
  jsonfile-db create-db <db>
  jsonfile-db tables <db>
  jsonfile-db create-table <db> <table> <column:type>...
  jsonfile-db insert <db> <table> <value>...
  jsonfile-db query <db> <table> [column=value]...
  jsonfile-db count <db> <table>
  jsonfile-db describe <db> <table>

Types: int, str, date (YYYY-MM-DD), bool, float.
The storage root is read from JSONFILE_DB_ROOT (default: ./data).";

/// Parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    CreateDatabase(String),
    ShowTables(String),
    /// database, table, `column:type` specs
    CreateTable(String, String, Vec<String>),
    /// database, table, raw values in column order
    Insert(String, String, Vec<String>),
    /// database, table, `column=value` filters
    Query(String, String, Vec<String>),
    Count(String, String),
    Describe(String, String),
    Help,
}

impl CliCommand {
    /// Parses the arguments that follow the program name.
    pub fn parse(args: &[String]) -> Result<Self, String> {
        let Some((command, rest)) = args.split_first() else {
            return Ok(CliCommand::Help);
        };

        let db = |i: usize| -> Result<String, String> {
            rest.get(i)
                .cloned()
                .ok_or_else(|| format!("{}: missing argument", command))
        };

        match command.as_str() {
            "create-db" => Ok(CliCommand::CreateDatabase(db(0)?)),
            "tables" => Ok(CliCommand::ShowTables(db(0)?)),
            "create-table" => {
                let specs = rest.get(2..).unwrap_or_default().to_vec();
                if specs.is_empty() {
                    return Err("create-table: at least one <column:type> is required".to_string());
                }
                Ok(CliCommand::CreateTable(db(0)?, db(1)?, specs))
            }
            "insert" => Ok(CliCommand::Insert(
                db(0)?,
                db(1)?,
                rest.get(2..).unwrap_or_default().to_vec(),
            )),
            "query" => Ok(CliCommand::Query(
                db(0)?,
                db(1)?,
                rest.get(2..).unwrap_or_default().to_vec(),
            )),
            "count" => Ok(CliCommand::Count(db(0)?, db(1)?)),
            "describe" => Ok(CliCommand::Describe(db(0)?, db(1)?)),
            "help" | "-h" | "--help" => Ok(CliCommand::Help),
            other => Err(format!("unknown command '{}'", other)),
        }
    }
}

/// Runs commands against one storage root.
pub struct DatabaseCli {
    config: StorageConfig,
}

impl DatabaseCli {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    /// Executes a command and returns what should be printed.
    pub fn execute(&self, command: CliCommand) -> DbResult<String> {
        let mut out = String::new();

        match command {
            CliCommand::CreateDatabase(name) => {
                Database::create(&self.config, &name)?;
                out.push_str(&format!("Database {} created\n", name));
            }
            CliCommand::ShowTables(name) => {
                let db = Database::connect(&self.config, &name)?;
                for table in db.show_tables() {
                    out.push_str(&format!("{}\n", table));
                }
            }
            CliCommand::CreateTable(db_name, table_name, specs) => {
                let schema = parse_schema(&specs)?;
                let mut db = Database::connect(&self.config, &db_name)?;
                db.create_table(&table_name, schema)?;
                out.push_str(&format!("Table {} created\n", table_name));
            }
            CliCommand::Insert(db_name, table_name, raw) => {
                let db = Database::connect(&self.config, &db_name)?;
                let table = db.table(&table_name)?;
                let columns = table.schema().columns();
                if raw.len() != columns.len() {
                    return Err(DbError::InvalidFieldCount {
                        expected: columns.len(),
                        given: raw.len(),
                    });
                }

                let values = columns
                    .iter()
                    .zip(&raw)
                    .map(|(column, text)| parse_value(column, text))
                    .collect::<DbResult<Vec<_>>>()?;
                table.insert(values)?;
                out.push_str("1 row inserted\n");
            }
            CliCommand::Query(db_name, table_name, raw_filters) => {
                let db = Database::connect(&self.config, &db_name)?;
                let table = db.table(&table_name)?;

                let mut filters = Vec::with_capacity(raw_filters.len());
                for raw in &raw_filters {
                    let (name, text) = raw.split_once('=').ok_or_else(|| {
                        DbError::invalid_value(raw, "filters are written as column=value")
                    })?;
                    let (_, column) = table
                        .schema()
                        .column(name)
                        .ok_or_else(|| DbError::UnknownColumn(name.to_string()))?;
                    filters.push((name.to_string(), parse_value(column, text)?));
                }

                for row in table.query(filters)? {
                    out.push_str(&format!("{}\n", row?));
                }
            }
            CliCommand::Count(db_name, table_name) => {
                let db = Database::connect(&self.config, &db_name)?;
                out.push_str(&format!("{}\n", db.table(&table_name)?.count()?));
            }
            CliCommand::Describe(db_name, table_name) => {
                let db = Database::connect(&self.config, &db_name)?;
                for column in db.table(&table_name)?.describe()? {
                    out.push_str(&format!("{}: {}\n", column.name, column.data_type));
                }
            }
            CliCommand::Help => {
                out.push_str(USAGE);
                out.push('\n');
            }
        }

        Ok(out)
    }
}

fn parse_schema(specs: &[String]) -> DbResult<Schema> {
    let columns = specs
        .iter()
        .map(|spec| {
            let (name, type_tag) = spec.split_once(':').ok_or_else(|| {
                DbError::InvalidSchema(format!("expected <column:type>, got \"{}\"", spec))
            })?;
            Column::parse(name, type_tag)
        })
        .collect::<DbResult<Vec<_>>>()?;
    Schema::new(columns)
}

fn parse_value(column: &Column, text: &str) -> DbResult<TypedValue> {
    TypedValue::from_string(text, column.data_type)
        .map_err(|reason| DbError::invalid_value(&column.name, reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(String::from).collect()
    }

    fn run(cli: &DatabaseCli, line: &str) -> DbResult<String> {
        cli.execute(CliCommand::parse(&args(line)).unwrap())
    }

    #[test]
    fn test_parse() {
        assert_eq!(CliCommand::parse(&[]).unwrap(), CliCommand::Help);
        assert_eq!(
            CliCommand::parse(&args("count library authors")).unwrap(),
            CliCommand::Count("library".to_string(), "authors".to_string())
        );
        assert!(CliCommand::parse(&args("count library")).is_err());
        assert!(CliCommand::parse(&args("create-table library authors")).is_err());
        assert!(CliCommand::parse(&args("drop library")).is_err());
    }

    #[test]
    fn test_help_output() {
        let dir = TempDir::new().unwrap();
        let cli = DatabaseCli::new(StorageConfig::new(dir.path()));
        let out = cli.execute(CliCommand::Help).unwrap();
        assert!(out.starts_with("Usage:"));
        assert!(out.ends_with("(default: ./data).\n"));
    }

    #[test]
    fn test_session() {
        let dir = TempDir::new().unwrap();
        let cli = DatabaseCli::new(StorageConfig::new(dir.path()));

        run(&cli, "create-db library").unwrap();
        run(&cli, "create-table library authors id:int name:str born:date alive:bool").unwrap();
        run(&cli, "insert library authors 1 Borges 1899-08-24 false").unwrap();
        run(&cli, "insert library authors 2 Poe 1809-01-19 false").unwrap();

        assert_eq!(run(&cli, "tables library").unwrap(), "authors\n");
        assert_eq!(run(&cli, "count library authors").unwrap(), "2\n");
        assert_eq!(
            run(&cli, "query library authors born=1809-01-19").unwrap(),
            "id=2, name=Poe, born=1809-01-19, alive=false\n"
        );
        assert_eq!(
            run(&cli, "describe library authors").unwrap(),
            "id: int\nname: str\nborn: date\nalive: bool\n"
        );
    }

    #[test]
    fn test_session_errors() {
        let dir = TempDir::new().unwrap();
        let cli = DatabaseCli::new(StorageConfig::new(dir.path()));
        run(&cli, "create-db library").unwrap();
        run(&cli, "create-table library authors id:int born:date").unwrap();

        assert!(matches!(
            run(&cli, "create-db library"),
            Err(DbError::DatabaseAlreadyExists(_))
        ));
        assert!(matches!(
            run(&cli, "insert library authors 1"),
            Err(DbError::InvalidFieldCount { .. })
        ));
        assert!(matches!(
            run(&cli, "insert library authors 1 1899-8-xx"),
            Err(DbError::InvalidValue { .. })
        ));
        assert!(matches!(
            run(&cli, "query library authors country=ARG"),
            Err(DbError::UnknownColumn(_))
        ));
        assert!(matches!(
            run(&cli, "create-table library books title:text"),
            Err(DbError::InvalidSchema(_))
        ));
        assert_eq!(run(&cli, "count library authors").unwrap(), "0\n");
    }
}
