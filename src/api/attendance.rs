use crate::auth::auth::AuthUser;
use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::payroll::calc::month_bounds;
use crate::utils::db_utils::page_offset;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct MarkAttendance {
    #[schema(example = "2025-01-06", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "Present")]
    pub status: AttendanceStatus,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AttendanceQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,
    #[schema(example = 50)]
    pub per_page: Option<u32>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct MonthlyQuery {
    #[schema(example = 2025)]
    pub year: i32,
    #[schema(example = 1)]
    pub month: u32,
}

#[derive(Serialize, ToSchema)]
pub struct MonthlyStats {
    #[schema(example = 22)]
    pub total_days: i64,
    #[schema(example = 20)]
    pub present: i64,
    #[schema(example = 1)]
    pub absent: i64,
    #[schema(example = 1)]
    pub half_day: i64,
}

/// Mark attendance for the current employee
#[utoipa::path(
    post,
    path = "/api/v1/attendance",
    request_body = MarkAttendance,
    responses(
        (status = 201, description = "Attendance marked", body = Object, example = json!({
            "message": "Attendance marked"
        })),
        (status = 400, description = "Already marked for this date", body = Object, example = json!({
            "message": "Attendance already marked for this date"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn mark_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<MarkAttendance>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth.employee_profile()?;

    let result = sqlx::query(
        r#"
        INSERT INTO attendance (employee_id, date, status)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(payload.date)
    .bind(payload.status.to_string())
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Created().json(serde_json::json!({
            "message": "Attendance marked"
        }))),

        Err(e) => {
            // Unique (employee_id, date) key
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                        "message": "Attendance already marked for this date"
                    })));
                }
            }

            tracing::error!(error = %e, employee_id, "Failed to mark attendance");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Attendance logs for the current employee
#[utoipa::path(
    get,
    path = "/api/v1/attendance/my-logs",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Attendance records, newest first"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn my_logs(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth.employee_profile()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(50).clamp(1, 100);
    let offset = page_offset(page, per_page);

    let records = sqlx::query_as::<_, Attendance>(
        r#"
        SELECT id, employee_id, date, status
        FROM attendance
        WHERE employee_id = ?
        ORDER BY date DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(employee_id)
    .bind(per_page as i64)
    .bind(offset)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to fetch attendance logs");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(records))
}

/// All attendance records (HR Officer/Admin)
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Attendance records, newest first"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(50).clamp(1, 100);
    let offset = page_offset(page, per_page);

    let records = sqlx::query_as::<_, Attendance>(
        r#"
        SELECT id, employee_id, date, status
        FROM attendance
        ORDER BY date DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(per_page as i64)
    .bind(offset)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch attendance list");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(records))
}

/// Monthly attendance records and stats for one employee (HR Officer/Admin)
#[utoipa::path(
    get,
    path = "/api/v1/attendance/monthly/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID"),
        MonthlyQuery
    ),
    responses(
        (status = 200, description = "Records plus status counts for the month"),
        (status = 400, description = "Invalid month"),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn monthly_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    query: web::Query<MonthlyQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr()?;

    let employee_id = path.into_inner();

    let (first, last) = match month_bounds(query.year, query.month) {
        Some(bounds) => bounds,
        None => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "Invalid month value"
            })));
        }
    };

    let known: Option<i64> = sqlx::query_scalar("SELECT id FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Failed to check employee");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if known.is_none() {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Employee not found"
        })));
    }

    let records = sqlx::query_as::<_, Attendance>(
        r#"
        SELECT id, employee_id, date, status
        FROM attendance
        WHERE employee_id = ?
        AND date BETWEEN ? AND ?
        ORDER BY date ASC
        "#,
    )
    .bind(employee_id)
    .bind(first)
    .bind(last)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to fetch monthly attendance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let count_of = |status: AttendanceStatus| {
        records
            .iter()
            .filter(|r| r.status == status.to_string())
            .count() as i64
    };

    let stats = MonthlyStats {
        total_days: records.len() as i64,
        present: count_of(AttendanceStatus::Present),
        absent: count_of(AttendanceStatus::Absent),
        half_day: count_of(AttendanceStatus::HalfDay),
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "records": records,
        "stats": stats
    })))
}

/// Edit an attendance record (HR Officer/Admin)
#[utoipa::path(
    put,
    path = "/api/v1/attendance/{attendance_id}",
    params(
        ("attendance_id", Path, description = "Attendance record ID")
    ),
    request_body = MarkAttendance,
    responses(
        (status = 200, description = "Attendance updated"),
        (status = 400, description = "Another record already exists for this date"),
        (status = 404, description = "Attendance record not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn edit_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<MarkAttendance>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr()?;

    let attendance_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE attendance
        SET date = ?, status = ?
        WHERE id = ?
        "#,
    )
    .bind(payload.date)
    .bind(payload.status.to_string())
    .bind(attendance_id)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(res) if res.rows_affected() == 0 => {
            Ok(HttpResponse::NotFound().json(serde_json::json!({
                "message": "Attendance record not found"
            })))
        }
        Ok(_) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "Attendance updated"
        }))),
        Err(e) => {
            // Moving onto an already-marked date trips the unique key
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                        "message": "Another attendance already exists for this date"
                    })));
                }
            }

            tracing::error!(error = %e, attendance_id, "Failed to edit attendance");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}
