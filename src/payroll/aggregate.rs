use std::str::FromStr;

use sqlx::MySqlPool;
use tracing::warn;

use crate::model::attendance::AttendanceStatus;
use crate::payroll::calc::{month_bounds, weigh_attendance};

/// Weighted attended-day count for one employee-month: a single read of the
/// attendance rows within the month, reduced with the standard weights.
/// An empty month yields 0.0, which is not an error.
pub async fn attended_days(
    pool: &MySqlPool,
    employee_id: u64,
    year: i32,
    month: u32,
) -> Result<f64, sqlx::Error> {
    let (first, last) = match month_bounds(year, month) {
        Some(bounds) => bounds,
        None => return Ok(0.0),
    };

    let rows = sqlx::query_as::<_, (String,)>(
        r#"
        SELECT status
        FROM attendance
        WHERE employee_id = ?
        AND date BETWEEN ? AND ?
        "#,
    )
    .bind(employee_id)
    .bind(first)
    .bind(last)
    .fetch_all(pool)
    .await?;

    let statuses: Vec<AttendanceStatus> = rows
        .into_iter()
        .filter_map(|(status,)| match AttendanceStatus::from_str(&status) {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                warn!(employee_id, %status, "Skipping unknown attendance status");
                None
            }
        })
        .collect();

    Ok(weigh_attendance(&statuses))
}
