use crate::auth::auth::AuthUser;
use crate::model::leave::{LeaveStatus, LeaveType};
use crate::utils::db_utils::page_offset;
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{MySqlPool, prelude::FromRow};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct ApplyLeave {
    #[schema(example = "Sick")]
    pub leave_type: LeaveType,
    #[schema(example = "2025-02-03", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2025-02-05", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Flu", nullable = true)]
    pub reason: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct AllocateLeave {
    #[schema(example = 1001)]
    pub employee_id: u64,
    #[schema(example = 2025)]
    pub year: i32,
    #[schema(example = "Casual")]
    pub leave_type: LeaveType,
    #[schema(example = 12)]
    pub total_days: i32,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    #[schema(example = 1001)]
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    #[schema(example = "Pending")]
    /// Filter by leave status
    pub status: Option<String>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u32>,
    #[schema(example = 25)]
    /// Pagination per page number
    pub per_page: Option<u32>,
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

#[derive(Serialize, Deserialize, FromRow, ToSchema)]
pub struct LeaveResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1001)]
    pub employee_id: u64,
    #[schema(example = "Sick", value_type = String)]
    pub leave_type: String,
    #[schema(example = "2025-02-03", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2025-02-05", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Flu", nullable = true)]
    pub reason: Option<String>,
    #[schema(example = "Pending", value_type = String)]
    pub status: String,
    #[schema(example = 2, nullable = true)]
    pub approver_id: Option<u64>,
    #[schema(example = "2025-02-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveResponse>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 25)]
    pub per_page: u32,
    #[schema(example = 3)]
    pub total: i64,
}

#[derive(Serialize, FromRow, ToSchema)]
pub struct LeaveBalance {
    #[schema(example = "Casual")]
    pub leave_type: String,
    #[schema(example = 12)]
    pub total_days: i32,
    #[schema(example = 3)]
    pub used_days: i32,
    #[schema(example = 9)]
    pub remaining: i32,
}

fn requested_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/* =========================
Apply for leave (Employee)
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body(
        content = ApplyLeave,
        description = "Leave application payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted",
         body = Object,
         example = json!({
            "message": "Leave request submitted",
            "status": "Pending"
         })
        ),
        (status = 400, description = "Bad request or insufficient balance"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn apply_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<ApplyLeave>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth.employee_profile()?;

    if payload.start_date > payload.end_date {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "start_date cannot be after end_date"
        })));
    }

    let days = requested_days(payload.start_date, payload.end_date);
    let year = payload.start_date.year();

    // balance check against this year's allocation for the type
    let allocation = sqlx::query_as::<_, (i32, i32)>(
        r#"
        SELECT total_days, used_days
        FROM leave_allocations
        WHERE employee_id = ? AND year = ? AND leave_type = ?
        "#,
    )
    .bind(employee_id)
    .bind(year)
    .bind(payload.leave_type.to_string())
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to fetch leave allocation");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let remaining = match allocation {
        Some((total, used)) => (total - used) as i64,
        None => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "No leave allocation for this leave type"
            })));
        }
    };

    if days > remaining {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Insufficient leave balance"
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO leave_requests
            (employee_id, leave_type, start_date, end_date, reason, status)
        VALUES (?, ?, ?, ?, ?, 'Pending')
        "#,
    )
    .bind(employee_id)
    .bind(payload.leave_type.to_string())
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(&payload.reason)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to create leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Leave request submitted",
        "status": LeaveStatus::Pending.to_string()
    })))
}

/* =========================
Own leave balances
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/leave/balance",
    responses(
        (status = 200, description = "Balances per leave type", body = [LeaveBalance]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_balance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth.employee_profile()?;

    let balances = sqlx::query_as::<_, LeaveBalance>(
        r#"
        SELECT leave_type, total_days, used_days, total_days - used_days AS remaining
        FROM leave_allocations
        WHERE employee_id = ?
        ORDER BY year DESC, leave_type
        "#,
    )
    .bind(employee_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to fetch leave balances");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(balances))
}

/* =========================
Allocate leave (HR/Admin)
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/leave/allocate",
    request_body = AllocateLeave,
    responses(
        (status = 200, description = "Leave allocated", body = Object, example = json!({
            "message": "Leave allocated"
        })),
        (status = 400, description = "Invalid allocation"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn allocate_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<AllocateLeave>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr()?;

    if payload.total_days < 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "total_days must be non-negative"
        })));
    }

    // upsert on the (employee, year, leave_type) unique key
    sqlx::query(
        r#"
        INSERT INTO leave_allocations (employee_id, year, leave_type, total_days, used_days)
        VALUES (?, ?, ?, ?, 0)
        ON DUPLICATE KEY UPDATE total_days = VALUES(total_days)
        "#,
    )
    .bind(payload.employee_id)
    .bind(payload.year)
    .bind(payload.leave_type.to_string())
    .bind(payload.total_days)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to allocate leave");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave allocated"
    })))
}

/* =========================
Approve leave (Payroll Officer/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    responses(
        (status = 200, description = "Leave approved", body = Object, example = json!({
            "message": "Leave approved"
        })),
        (status = 400, description = "Leave request not found or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_payroll_officer()?;

    let leave_id = path.into_inner();

    let mut tx = pool.get_ref().begin().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to open transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let pending = sqlx::query_as::<_, (u64, String, NaiveDate, NaiveDate)>(
        r#"
        SELECT employee_id, leave_type, start_date, end_date
        FROM leave_requests
        WHERE id = ? AND status = 'Pending'
        FOR UPDATE
        "#,
    )
    .bind(leave_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Approve leave failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let (employee_id, leave_type, start_date, end_date) = match pending {
        Some(row) => row,
        None => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "Leave request not found or already processed"
            })));
        }
    };

    sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = 'Approved', approver_id = ?
        WHERE id = ?
        "#,
    )
    .bind(auth.employee_id)
    .bind(leave_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Approve leave failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // approved days consume the year's allocation
    sqlx::query(
        r#"
        UPDATE leave_allocations
        SET used_days = used_days + ?
        WHERE employee_id = ? AND year = ? AND leave_type = ?
        "#,
    )
    .bind(requested_days(start_date, end_date))
    .bind(employee_id)
    .bind(start_date.year())
    .bind(&leave_type)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Failed to consume allocation");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to commit approval");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave approved"
    })))
}

/* =========================
Reject leave (Payroll Officer/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    responses(
        (status = 200, description = "Leave rejected", body = Object, example = json!({
            "message": "Leave rejected"
        })),
        (status = 400, description = "Leave request not found or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_payroll_officer()?;

    let leave_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = 'Rejected', approver_id = ?
        WHERE id = ?
        AND status = 'Pending'
        "#,
    )
    .bind(auth.employee_id)
    .bind(leave_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Reject leave failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Leave request not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave rejected"
    })))
}

/// Leave request details
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_payroll_officer()?;

    let leave_id = path.into_inner();

    let leave = sqlx::query_as::<_, LeaveResponse>(
        r#"
        SELECT id, employee_id, leave_type, start_date, end_date, reason,
               status, approver_id, created_at
        FROM leave_requests
        WHERE id = ?
        "#,
    )
    .bind(leave_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Failed to fetch leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match leave {
        Some(data) => Ok(HttpResponse::Ok().json(data)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Leave request not found"
        }))),
    }
}

/// Paginated leave list with filters
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_payroll_officer()?;

    // -------------------------
    // Pagination
    // -------------------------
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(25).clamp(1, 100);
    let offset = page_offset(page, per_page);

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status));
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error=%e, "Failed to count leave requests");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        r#"
        SELECT id, employee_id, leave_type, start_date, end_date, reason,
               status, approver_id, created_at
        FROM leave_requests
        {}
        ORDER BY created_at DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, LeaveResponse>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let leaves = data_q
        .bind(per_page as i64)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error=%e, "Failed to fetch leave list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let response = LeaveListResponse {
        data: leaves,
        page,
        per_page,
        total,
    };

    Ok(HttpResponse::Ok().json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requested_days_is_inclusive() {
        let start = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 2, 5).unwrap();
        assert_eq!(requested_days(start, end), 3);
        assert_eq!(requested_days(start, start), 1);
    }
}
