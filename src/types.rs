use crate::errors::{DbError, DbResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Column type tags as they appear in the table file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Int,
    Str,
    Date,
    Bool,
    Float,
}

impl DataType {
    pub fn from_string(s: &str) -> DbResult<Self> {
        match s {
            "int" => Ok(DataType::Int),
            "str" => Ok(DataType::Str),
            "date" => Ok(DataType::Date),
            "bool" => Ok(DataType::Bool),
            "float" => Ok(DataType::Float),
            _ => Err(DbError::InvalidSchema(format!("unsupported data type \"{}\"", s))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Str => "str",
            DataType::Date => "date",
            DataType::Bool => "bool",
            DataType::Float => "float",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }

    /// Builds a column from a free-form type tag, rejecting unknown tags.
    pub fn parse(name: impl Into<String>, type_tag: &str) -> DbResult<Self> {
        Ok(Self::new(name, DataType::from_string(type_tag)?))
    }
}

/// Ordered column list of a table. Names are unique and the list is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Column>", into = "Vec<Column>")]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> DbResult<Self> {
        if columns.is_empty() {
            return Err(DbError::InvalidSchema("a table needs at least one column".to_string()));
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if column.name.is_empty() {
                return Err(DbError::InvalidSchema("column names cannot be empty".to_string()));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(DbError::InvalidSchema(format!(
                    "duplicate column \"{}\"",
                    column.name
                )));
            }
        }

        Ok(Self { columns })
    }

    /// Parses `(name, type_tag)` pairs, e.g. `[("id", "int"), ("name", "str")]`.
    pub fn from_pairs<'a, I>(pairs: I) -> DbResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let columns = pairs
            .into_iter()
            .map(|(name, type_tag)| Column::parse(name, type_tag))
            .collect::<DbResult<Vec<_>>>()?;
        Self::new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<(usize, &Column)> {
        self.columns.iter().enumerate().find(|(_, c)| c.name == name)
    }
}

impl TryFrom<Vec<Column>> for Schema {
    type Error = DbError;

    fn try_from(columns: Vec<Column>) -> DbResult<Self> {
        Schema::new(columns)
    }
}

impl From<Schema> for Vec<Column> {
    fn from(schema: Schema) -> Self {
        schema.columns
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Int(i64),
    Str(String),
    Bool(bool),
    Date(NaiveDate),
    Float(f64),
}

impl TypedValue {
    pub fn get_type(&self) -> DataType {
        match self {
            TypedValue::Int(_) => DataType::Int,
            TypedValue::Str(_) => DataType::Str,
            TypedValue::Bool(_) => DataType::Bool,
            TypedValue::Date(_) => DataType::Date,
            TypedValue::Float(_) => DataType::Float,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.get_type().as_str()
    }

    /// Parses a textual literal as a value of `data_type`.
    pub fn from_string(s: &str, data_type: DataType) -> Result<Self, String> {
        match data_type {
            DataType::Int => s
                .parse::<i64>()
                .map(TypedValue::Int)
                .map_err(|_| format!("cannot parse '{}' as int", s)),
            DataType::Str => Ok(TypedValue::Str(s.to_string())),
            DataType::Bool => match s.to_lowercase().as_str() {
                "true" => Ok(TypedValue::Bool(true)),
                "false" => Ok(TypedValue::Bool(false)),
                _ => Err(format!("cannot parse '{}' as bool", s)),
            },
            DataType::Date => NaiveDate::parse_from_str(s, DATE_FORMAT)
                .map(TypedValue::Date)
                .map_err(|_| format!("cannot parse '{}' as date, expected YYYY-MM-DD", s)),
            DataType::Float => s
                .parse::<f64>()
                .map(TypedValue::Float)
                .map_err(|_| format!("cannot parse '{}' as float", s)),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            TypedValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            TypedValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            TypedValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Int(i) => write!(f, "{}", i),
            TypedValue::Str(s) => write!(f, "{}", s),
            TypedValue::Bool(b) => write!(f, "{}", b),
            TypedValue::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            TypedValue::Float(x) => write!(f, "{}", x),
        }
    }
}

impl From<i64> for TypedValue {
    fn from(v: i64) -> Self {
        TypedValue::Int(v)
    }
}

impl From<i32> for TypedValue {
    fn from(v: i32) -> Self {
        TypedValue::Int(v.into())
    }
}

impl From<&str> for TypedValue {
    fn from(v: &str) -> Self {
        TypedValue::Str(v.to_string())
    }
}

impl From<String> for TypedValue {
    fn from(v: String) -> Self {
        TypedValue::Str(v)
    }
}

impl From<bool> for TypedValue {
    fn from(v: bool) -> Self {
        TypedValue::Bool(v)
    }
}

impl From<NaiveDate> for TypedValue {
    fn from(v: NaiveDate) -> Self {
        TypedValue::Date(v)
    }
}

impl From<f64> for TypedValue {
    fn from(v: f64) -> Self {
        TypedValue::Float(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_rejects_unknown_type_tag() {
        let err = Schema::from_pairs([("id", "int"), ("price", "money")]).unwrap_err();
        assert!(matches!(err, DbError::InvalidSchema(_)));
    }

    #[test]
    fn test_schema_rejects_duplicates_and_empty() {
        assert!(Schema::new(vec![]).is_err());
        assert!(Schema::from_pairs([("id", "int"), ("id", "str")]).is_err());
        assert!(Schema::from_pairs([("", "int")]).is_err());
    }

    #[test]
    fn test_schema_json_shape() {
        let schema = Schema::from_pairs([("id", "int"), ("born", "date")]).unwrap();
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"name": "id", "type": "int"},
                {"name": "born", "type": "date"}
            ])
        );

        let back: Schema = serde_json::from_value(json).unwrap();
        assert_eq!(back, schema);
    }

    #[test]
    fn test_schema_json_with_duplicates_fails() {
        let json = serde_json::json!([
            {"name": "id", "type": "int"},
            {"name": "id", "type": "int"}
        ]);
        assert!(serde_json::from_value::<Schema>(json).is_err());
    }

    #[test]
    fn test_from_string() {
        assert_eq!(TypedValue::from_string("42", DataType::Int), Ok(TypedValue::Int(42)));
        assert_eq!(TypedValue::from_string("TRUE", DataType::Bool), Ok(TypedValue::Bool(true)));
        assert_eq!(
            TypedValue::from_string("1899-08-24", DataType::Date),
            Ok(TypedValue::Date(NaiveDate::from_ymd_opt(1899, 8, 24).unwrap()))
        );
        assert!(TypedValue::from_string("1899-8-xx", DataType::Date).is_err());
        assert!(TypedValue::from_string("yes", DataType::Bool).is_err());
        assert!(TypedValue::from_string("4.2", DataType::Int).is_err());
    }

    #[test]
    fn test_cross_variant_values_never_equal() {
        assert_ne!(TypedValue::Int(1), TypedValue::Float(1.0));
        assert_ne!(TypedValue::Str("1".into()), TypedValue::Int(1));
        assert_eq!(TypedValue::from("ARG"), TypedValue::Str("ARG".to_string()));
    }
}
