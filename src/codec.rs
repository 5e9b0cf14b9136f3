//! Conversion between [`TypedValue`]s and their JSON form in a table file.
//!
//! Dates are stored as `YYYY-MM-DD` strings and come back as [`NaiveDate`]s;
//! every other type uses its natural JSON representation.

use crate::errors::{DbError, DbResult};
use crate::types::{Column, DataType, TypedValue, DATE_FORMAT};
use chrono::NaiveDate;
use serde_json::Value as JsonValue;

/// Checks that `value` can be stored in `column`.
pub fn validate(column: &Column, value: &TypedValue) -> DbResult<()> {
    if value.get_type() != column.data_type {
        return Err(DbError::invalid_type(
            &column.name,
            value.type_name(),
            column.data_type.as_str(),
        ));
    }

    if let TypedValue::Float(f) = value {
        if !f.is_finite() {
            return Err(DbError::invalid_value(&column.name, format!("{} cannot be stored", f)));
        }
    }

    Ok(())
}

/// Encodes an already validated value.
pub fn encode(value: &TypedValue) -> JsonValue {
    match value {
        TypedValue::Int(i) => JsonValue::from(*i),
        TypedValue::Str(s) => JsonValue::String(s.clone()),
        TypedValue::Bool(b) => JsonValue::Bool(*b),
        TypedValue::Date(d) => JsonValue::String(d.format(DATE_FORMAT).to_string()),
        // Non-finite floats are rejected by `validate`
        TypedValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
    }
}

/// Decodes a stored value for `data_type`. The error is a short reason;
/// callers attach the file path.
pub fn decode(data_type: DataType, raw: &JsonValue) -> Result<TypedValue, String> {
    let decoded = match data_type {
        DataType::Int => raw.as_i64().map(TypedValue::Int),
        DataType::Str => raw.as_str().map(|s| TypedValue::Str(s.to_string())),
        DataType::Bool => raw.as_bool().map(TypedValue::Bool),
        DataType::Float => raw.as_f64().map(TypedValue::Float),
        DataType::Date => match raw.as_str() {
            Some(s) => Some(
                NaiveDate::parse_from_str(s, DATE_FORMAT)
                    .map(TypedValue::Date)
                    .map_err(|e| format!("invalid date '{}': {}", s, e))?,
            ),
            None => None,
        },
    };

    decoded.ok_or_else(|| format!("expected {} value, found {}", data_type, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_validate_reports_field_and_types() {
        let column = Column::new("birth_date", DataType::Date);
        let err = validate(&column, &TypedValue::from("1914-8-26")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid type of field \"birth_date\": Given \"str\", expected \"date\""
        );
    }

    #[test]
    fn test_validate_int_rejects_float_and_bool() {
        let column = Column::new("id", DataType::Int);
        assert!(validate(&column, &TypedValue::Int(3)).is_ok());
        assert!(validate(&column, &TypedValue::Float(3.0)).is_err());
        assert!(validate(&column, &TypedValue::Bool(true)).is_err());
    }

    #[test]
    fn test_validate_rejects_non_finite_float() {
        let column = Column::new("ratio", DataType::Float);
        let err = validate(&column, &TypedValue::Float(f64::NAN)).unwrap_err();
        assert!(matches!(err, DbError::InvalidValue { .. }));
        assert!(validate(&column, &TypedValue::Float(0.25)).is_ok());
    }

    #[test]
    fn test_date_encodes_as_iso_string() {
        let value = TypedValue::Date(date(1809, 1, 19));
        assert_eq!(encode(&value), json!("1809-01-19"));
        assert_eq!(decode(DataType::Date, &json!("1809-01-19")), Ok(value));
    }

    #[test]
    fn test_decoded_date_is_a_date() {
        let decoded = decode(DataType::Date, &json!("1899-08-24")).unwrap();
        assert_eq!(decoded.as_date(), Some(date(1899, 8, 24)));
        assert!(decoded.as_str().is_none());
    }

    #[test]
    fn test_decode_rejects_mismatched_json() {
        assert!(decode(DataType::Int, &json!("1")).is_err());
        assert!(decode(DataType::Int, &json!(1.5)).is_err());
        assert!(decode(DataType::Bool, &json!(0)).is_err());
        assert!(decode(DataType::Date, &json!("24/08/1899")).is_err());
        assert!(decode(DataType::Str, &json!(null)).is_err());
    }

    #[test]
    fn test_float_accepts_integral_json() {
        assert_eq!(decode(DataType::Float, &json!(2)), Ok(TypedValue::Float(2.0)));
        assert_eq!(encode(&TypedValue::Float(2.5)), json!(2.5));
    }
}
