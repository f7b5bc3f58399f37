use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::model::payroll::Payroll;
use crate::payroll::calc::{month_bounds, validate_compensation};
use crate::utils::db_utils::page_offset;
use crate::payroll::{CompensationTerms, PayrollBreakdown, PayrollRules, calculate_for_employee};

#[derive(Deserialize, ToSchema)]
pub struct GeneratePayroll {
    #[schema(example = 1001)]
    pub employee_id: u64,

    #[schema(example = 1)]
    pub month: u32,

    #[schema(example = 2025)]
    pub year: i32,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePayroll {
    #[schema(example = 32000.0)]
    pub basic_salary: Option<f64>,

    #[schema(example = 6000.0)]
    pub allowances: Option<f64>,
}

#[derive(Deserialize, ToSchema)]
pub struct GeneratePayslips {
    #[schema(example = 1)]
    pub month: u32,

    #[schema(example = 2025)]
    pub year: i32,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PayrollQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,

    #[schema(example = 25)]
    pub per_page: Option<u32>,

    #[schema(example = 1)]
    pub month: Option<u32>,

    #[schema(example = 2025)]
    pub year: Option<i32>,

    #[schema(example = 1001)]
    pub employee_id: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedPayrollResponse {
    pub data: Vec<Payroll>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    U32(u32),
    I32(i32),
}

fn valid_period(year: i32, month: u32) -> bool {
    (1..=12).contains(&month) && month_bounds(year, month).is_some()
}

async fn fetch_terms(
    pool: &MySqlPool,
    employee_id: u64,
) -> Result<Option<CompensationTerms>, sqlx::Error> {
    let row = sqlx::query_as::<_, (f64, f64)>(
        "SELECT basic_salary, allowances FROM employees WHERE id = ?",
    )
    .bind(employee_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|(basic_salary, allowances)| CompensationTerms {
        basic_salary,
        allowances,
    }))
}

/// Generate payroll for an employee-month (Payroll Officer/Admin)
#[utoipa::path(
    post,
    path = "/api/v1/payroll/generate",
    request_body = GeneratePayroll,
    responses(
        (status = 201, description = "Payroll generated", body = PayrollBreakdown),
        (status = 400, description = "Invalid period, invalid compensation or duplicate payroll"),
        (status = 404, description = "Employee not found"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn generate_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    rules: web::Data<PayrollRules>,
    payload: web::Json<GeneratePayroll>,
) -> actix_web::Result<impl Responder> {
    auth.require_payroll_officer()?;

    if !valid_period(payload.year, payload.month) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Invalid payroll period"
        })));
    }

    let terms = fetch_terms(pool.get_ref(), payload.employee_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id = payload.employee_id, "Failed to fetch employee");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let terms = match terms {
        Some(t) => t,
        None => {
            return Ok(HttpResponse::NotFound().json(serde_json::json!({
                "message": "Employee not found"
            })));
        }
    };

    // compensation is validated up front; the calculator never guards
    if let Err(msg) = validate_compensation(terms.basic_salary, terms.allowances) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({ "message": msg })));
    }

    let existing: Option<u64> = sqlx::query_scalar(
        "SELECT id FROM payroll WHERE employee_id = ? AND month = ? AND year = ?",
    )
    .bind(payload.employee_id)
    .bind(payload.month)
    .bind(payload.year)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to check existing payroll");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if existing.is_some() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Payroll already generated for this period"
        })));
    }

    let breakdown = calculate_for_employee(
        pool.get_ref(),
        rules.get_ref(),
        payload.employee_id,
        terms,
        payload.year,
        payload.month,
    )
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to aggregate attendance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    sqlx::query(
        r#"
        INSERT INTO payroll
        (employee_id, month, year, basic_salary, allowances, gross_salary,
         pf_contribution, professional_tax, net_salary, working_days, attended_days, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'Processed')
        "#,
    )
    .bind(payload.employee_id)
    .bind(payload.month)
    .bind(payload.year)
    .bind(breakdown.basic_salary)
    .bind(breakdown.allowances)
    .bind(breakdown.gross_salary)
    .bind(breakdown.pf_contribution)
    .bind(breakdown.professional_tax)
    .bind(breakdown.net_salary)
    .bind(breakdown.working_days)
    .bind(breakdown.attended_days)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to persist payroll");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(breakdown))
}

/// Edit payroll inputs and recalculate (Payroll Officer/Admin)
///
/// Attendance is re-read fresh, so corrections made after the original run
/// retroactively affect the recalculated breakdown.
#[utoipa::path(
    put,
    path = "/api/v1/payroll/{payroll_id}",
    request_body = UpdatePayroll,
    params(
        ("payroll_id", description = "Payroll ID")
    ),
    responses(
        (status = 200, description = "Payroll recalculated", body = PayrollBreakdown),
        (status = 400, description = "Invalid compensation"),
        (status = 404, description = "Payroll not found"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn update_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    rules: web::Data<PayrollRules>,
    path: web::Path<u64>,
    body: web::Json<UpdatePayroll>,
) -> actix_web::Result<impl Responder> {
    auth.require_payroll_officer()?;

    let payroll_id = path.into_inner();

    let current = sqlx::query_as::<_, (u64, u32, i32, f64, f64)>(
        r#"
        SELECT employee_id, month, year, basic_salary, allowances
        FROM payroll
        WHERE id = ?
        "#,
    )
    .bind(payroll_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, payroll_id, "Failed to fetch payroll");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let (employee_id, month, year, current_basic, current_allowances) = match current {
        Some(row) => row,
        None => {
            return Ok(HttpResponse::NotFound().json(serde_json::json!({
                "message": "Payroll record not found"
            })));
        }
    };

    let terms = CompensationTerms {
        basic_salary: body.basic_salary.unwrap_or(current_basic),
        allowances: body.allowances.unwrap_or(current_allowances),
    };

    if let Err(msg) = validate_compensation(terms.basic_salary, terms.allowances) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({ "message": msg })));
    }

    let breakdown = calculate_for_employee(
        pool.get_ref(),
        rules.get_ref(),
        employee_id,
        terms,
        year,
        month,
    )
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to aggregate attendance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    sqlx::query(
        r#"
        UPDATE payroll
        SET basic_salary = ?, allowances = ?, gross_salary = ?, pf_contribution = ?,
            professional_tax = ?, net_salary = ?, working_days = ?, attended_days = ?
        WHERE id = ?
        "#,
    )
    .bind(breakdown.basic_salary)
    .bind(breakdown.allowances)
    .bind(breakdown.gross_salary)
    .bind(breakdown.pf_contribution)
    .bind(breakdown.professional_tax)
    .bind(breakdown.net_salary)
    .bind(breakdown.working_days)
    .bind(breakdown.attended_days)
    .bind(payroll_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, payroll_id, "Failed to update payroll");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(breakdown))
}

#[utoipa::path(
    get,
    path = "/api/v1/payroll/{payroll_id}",
    params(
        ("payroll_id", description = "Payroll ID")
    ),
    responses(
        (status = 200, description = "Payroll record"),
        (status = 404),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_payroll_officer()?;

    let payroll_id = path.into_inner();

    let payroll = sqlx::query_as::<_, Payroll>(
        r#"
        SELECT id, employee_id, month, year, basic_salary, allowances, gross_salary,
               pf_contribution, professional_tax, net_salary, working_days, attended_days,
               status, created_at
        FROM payroll
        WHERE id = ?
        "#,
    )
    .bind(payroll_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, payroll_id, "Failed to fetch payroll");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match payroll {
        Some(p) => Ok(HttpResponse::Ok().json(p)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Payroll not found"
        }))),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/payroll",
    params(PayrollQuery),
    responses(
        (status = 200, description = "Paginated payroll list", body = PaginatedPayrollResponse),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_payrolls(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<PayrollQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_payroll_officer()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(25).clamp(1, 100);
    let offset = page_offset(page, per_page);

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(month) = query.month {
        where_sql.push_str(" AND month = ?");
        args.push(FilterValue::U32(month));
    }

    if let Some(year) = query.year {
        where_sql.push_str(" AND year = ?");
        args.push(FilterValue::I32(year));
    }

    if let Some(employee_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(employee_id));
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!("SELECT COUNT(*) FROM payroll{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::U32(v) => count_q.bind(*v),
            FilterValue::I32(v) => count_q.bind(*v),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count payrolls");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        r#"
        SELECT id, employee_id, month, year, basic_salary, allowances, gross_salary,
               pf_contribution, professional_tax, net_salary, working_days, attended_days,
               status, created_at
        FROM payroll
        {}
        ORDER BY year DESC, month DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, Payroll>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::U32(v) => data_q.bind(v),
            FilterValue::I32(v) => data_q.bind(v),
        };
    }

    let data = data_q
        .bind(per_page as i64)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch payroll list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(PaginatedPayrollResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Generate payslips for all processed payrolls in a month (Payroll Officer/Admin)
#[utoipa::path(
    post,
    path = "/api/v1/payroll/generate-payslips",
    request_body = GeneratePayslips,
    responses(
        (status = 200, description = "Payslips generated", body = Object, example = json!({
            "message": "Payslips generated: 12"
        })),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn generate_payslips(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<GeneratePayslips>,
) -> actix_web::Result<impl Responder> {
    auth.require_payroll_officer()?;

    // one payslip per processed payroll, skipping those already issued
    let result = sqlx::query(
        r#"
        INSERT INTO payslips (payroll_id, employee_id, payout_date)
        SELECT p.id, p.employee_id, CURDATE()
        FROM payroll p
        LEFT JOIN payslips s ON s.payroll_id = p.id
        WHERE p.month = ? AND p.year = ? AND p.status = 'Processed' AND s.id IS NULL
        "#,
    )
    .bind(payload.month)
    .bind(payload.year)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to generate payslips");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Payslips generated: {}", result.rows_affected())
    })))
}
