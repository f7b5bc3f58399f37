use actix_web::error::ErrorBadRequest;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use sqlx::MySqlPool;

/// SQL bindable value enum
#[derive(Debug)]
pub enum SqlValue {
    String(String),
    I64(i64),
    F64(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}

/// SQL update container
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Build a dynamic UPDATE from a JSON payload. Only keys present in
/// `allowed` become SET columns, so callers control the writable surface.
pub fn build_update_sql(
    table: &str,
    payload: &Value,
    allowed: &[&str],
    id_column: &str,
    id_value: i64,
) -> Result<SqlUpdate, actix_web::Error> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ErrorBadRequest("Payload must be a JSON object"))?;

    if obj.is_empty() {
        return Err(ErrorBadRequest("No fields provided for update"));
    }

    if let Some(unknown) = obj.keys().find(|k| !allowed.contains(&k.as_str())) {
        return Err(ErrorBadRequest(format!("Unknown field: {}", unknown)));
    }

    let set_clause = obj
        .keys()
        .map(|k| format!("{} = ?", k))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values = Vec::with_capacity(obj.len() + 1);

    // Convert JSON values -> SqlValue
    for value in obj.values() {
        match value {
            Value::String(s) => {
                if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    values.push(SqlValue::Date(d));
                } else if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                    values.push(SqlValue::DateTime(dt));
                } else {
                    values.push(SqlValue::String(s.clone()));
                }
            }
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    values.push(SqlValue::I64(i));
                } else if let Some(f) = n.as_f64() {
                    values.push(SqlValue::F64(f));
                }
            }
            Value::Bool(b) => values.push(SqlValue::Bool(*b)),
            Value::Null => values.push(SqlValue::Null),
            _ => return Err(ErrorBadRequest("Unsupported JSON value type")),
        }
    }

    // WHERE id = ?
    values.push(SqlValue::I64(id_value));

    Ok(SqlUpdate { sql, values })
}

/// Zero-based row offset for a 1-based page. Widens to i64 first so an
/// adversarial page number cannot overflow the u32 multiply.
pub fn page_offset(page: u32, per_page: u32) -> i64 {
    (page as i64 - 1) * per_page as i64
}

/// Execute the update
pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::F64(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ALLOWED: &[&str] = &["department", "basic_salary", "date_of_joining"];

    #[test]
    fn builds_set_clause_from_allowed_keys() {
        let payload = json!({"department": "Finance", "basic_salary": 28000.0});
        let update = build_update_sql("employees", &payload, ALLOWED, "id", 7).unwrap();

        assert!(update.sql.starts_with("UPDATE employees SET "));
        assert!(update.sql.contains("department = ?"));
        assert!(update.sql.contains("basic_salary = ?"));
        assert!(update.sql.ends_with("WHERE id = ?"));
        assert_eq!(update.values.len(), 3); // two fields + id
    }

    #[test]
    fn rejects_unknown_field() {
        let payload = json!({"password_hash": "x"});
        assert!(build_update_sql("employees", &payload, ALLOWED, "id", 7).is_err());
    }

    #[test]
    fn rejects_empty_payload() {
        let payload = json!({});
        assert!(build_update_sql("employees", &payload, ALLOWED, "id", 7).is_err());
    }

    #[test]
    fn page_offset_is_zero_based() {
        assert_eq!(page_offset(1, 50), 0);
        assert_eq!(page_offset(3, 20), 40);
    }

    #[test]
    fn page_offset_survives_extreme_page_numbers() {
        // u32::MAX * 100 would overflow u32; widened math must not panic
        assert_eq!(page_offset(u32::MAX, 100), (u32::MAX as i64 - 1) * 100);
    }

    #[test]
    fn parses_date_strings_as_dates() {
        let payload = json!({"date_of_joining": "2024-01-01"});
        let update = build_update_sql("employees", &payload, ALLOWED, "id", 1).unwrap();
        assert!(matches!(update.values[0], SqlValue::Date(_)));
    }
}
