use crate::auth::auth::AuthUser;
use crate::payroll::calc::month_bounds;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::{MySqlPool, prelude::FromRow};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PeriodQuery {
    #[schema(example = 2025)]
    pub year: i32,
    #[schema(example = 1)]
    pub month: u32,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct YearQuery {
    #[schema(example = 2025)]
    pub year: i32,
}

#[derive(Serialize, FromRow, ToSchema)]
pub struct StatusCount {
    #[schema(example = "Present")]
    pub status: String,
    #[schema(example = 410)]
    pub count: i64,
}

#[derive(Serialize, FromRow, ToSchema)]
pub struct MonthlyPayout {
    #[schema(example = 1)]
    pub month: u32,
    #[schema(example = 12)]
    pub payrolls: i64,
    #[schema(example = 512340.55)]
    pub total_net: f64,
    #[schema(example = 540000.0)]
    pub total_gross: f64,
}

#[derive(Serialize, FromRow, ToSchema)]
pub struct RoleCount {
    #[schema(example = 4)]
    pub role_id: u8,
    #[schema(example = 38)]
    pub count: i64,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeStats {
    #[schema(example = 42)]
    pub total_users: i64,
    #[schema(example = 40)]
    pub active_users: i64,
    #[schema(example = 2)]
    pub inactive_users: i64,
    #[schema(example = 38)]
    pub employees_with_profile: i64,
    pub by_role: Vec<RoleCount>,
}

/// Attendance status counts for one month (Admin)
#[utoipa::path(
    get,
    path = "/api/v1/analytics/attendance-summary",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Status counts for the month", body = [StatusCount]),
        (status = 400, description = "Invalid month"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Analytics"
)]
pub async fn attendance_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<PeriodQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let (first, last) = match month_bounds(query.year, query.month) {
        Some(bounds) => bounds,
        None => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "Invalid month value"
            })));
        }
    };

    let counts = sqlx::query_as::<_, StatusCount>(
        r#"
        SELECT status, COUNT(*) AS count
        FROM attendance
        WHERE date BETWEEN ? AND ?
        GROUP BY status
        "#,
    )
    .bind(first)
    .bind(last)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to build attendance summary");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(counts))
}

/// Leave request status counts (Admin)
#[utoipa::path(
    get,
    path = "/api/v1/analytics/leave-summary",
    responses(
        (status = 200, description = "Request counts per status", body = [StatusCount]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Analytics"
)]
pub async fn leave_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let counts = sqlx::query_as::<_, StatusCount>(
        r#"
        SELECT status, COUNT(*) AS count
        FROM leave_requests
        GROUP BY status
        "#,
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to build leave summary");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(counts))
}

/// Per-month payroll payout for a year (Admin)
#[utoipa::path(
    get,
    path = "/api/v1/analytics/payroll-summary",
    params(YearQuery),
    responses(
        (status = 200, description = "Payout totals grouped by month", body = [MonthlyPayout]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Analytics"
)]
pub async fn payroll_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<YearQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let payouts = sqlx::query_as::<_, MonthlyPayout>(
        r#"
        SELECT month,
               COUNT(*) AS payrolls,
               COALESCE(SUM(net_salary), 0) AS total_net,
               COALESCE(SUM(gross_salary), 0) AS total_gross
        FROM payroll
        WHERE year = ?
        GROUP BY month
        ORDER BY month
        "#,
    )
    .bind(query.year)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, year = query.year, "Failed to build payroll summary");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(payouts))
}

/// Headcount breakdown (Admin)
#[utoipa::path(
    get,
    path = "/api/v1/analytics/employee-stats",
    responses(
        (status = 200, description = "User and profile counts", body = EmployeeStats),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Analytics"
)]
pub async fn employee_stats(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let (total_users, active_users) = sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT COUNT(*),
               CAST(COALESCE(SUM(is_active = TRUE), 0) AS SIGNED)
        FROM users
        "#,
    )
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to count users");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let employees_with_profile = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees")
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to count employee profiles");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let by_role = sqlx::query_as::<_, RoleCount>(
        r#"
        SELECT role_id, COUNT(*) AS count
        FROM users
        GROUP BY role_id
        ORDER BY role_id
        "#,
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to count users per role");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let stats = EmployeeStats {
        total_users,
        active_users,
        inactive_users: total_users - active_users,
        employees_with_profile,
        by_role,
    };

    Ok(HttpResponse::Ok().json(stats))
}
