use crate::types::TypedValue;
use chrono::NaiveDate;
use std::fmt;

/// One record, with fields in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    fields: Vec<(String, TypedValue)>,
}

impl Row {
    pub fn from_values(values: Vec<(String, TypedValue)>) -> Self {
        Self { fields: values }
    }

    pub fn get(&self, column: &str) -> Option<&TypedValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn get_int(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(TypedValue::as_int)
    }

    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(TypedValue::as_str)
    }

    pub fn get_bool(&self, column: &str) -> Option<bool> {
        self.get(column).and_then(TypedValue::as_bool)
    }

    pub fn get_date(&self, column: &str) -> Option<NaiveDate> {
        self.get(column).and_then(TypedValue::as_date)
    }

    pub fn get_float(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(TypedValue::as_float)
    }

    pub fn get_as_string(&self, column: &str) -> Option<String> {
        self.get(column).map(|value| value.to_string())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &TypedValue> {
        self.fields.iter().map(|(_, value)| value)
    }

    pub fn get_all(&self) -> &[(String, TypedValue)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn borges() -> Row {
        Row::from_values(vec![
            ("id".to_string(), TypedValue::Int(1)),
            ("name".to_string(), TypedValue::from("Jorge Luis Borges")),
            (
                "birth_date".to_string(),
                TypedValue::Date(NaiveDate::from_ymd_opt(1899, 8, 24).unwrap()),
            ),
            ("alive".to_string(), TypedValue::Bool(false)),
        ])
    }

    #[test]
    fn test_typed_getters() {
        let row = borges();
        assert_eq!(row.get_int("id"), Some(1));
        assert_eq!(row.get_str("name"), Some("Jorge Luis Borges"));
        assert_eq!(row.get_bool("alive"), Some(false));
        assert_eq!(row.get_date("birth_date").map(|d| d.to_string()), Some("1899-08-24".to_string()));
        // wrong type and missing column
        assert_eq!(row.get_int("name"), None);
        assert!(row.get("nationality").is_none());
    }

    #[test]
    fn test_order_and_display() {
        let row = borges();
        let columns: Vec<_> = row.columns().collect();
        assert_eq!(columns, vec!["id", "name", "birth_date", "alive"]);
        assert_eq!(
            row.to_string(),
            "id=1, name=Jorge Luis Borges, birth_date=1899-08-24, alive=false"
        );
    }
}
