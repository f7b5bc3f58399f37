use crate::{
    auth::auth::AuthUser,
    model::employee::Employee,
    payroll::calc::validate_compensation,
    utils::db_utils::{build_update_sql, execute_update, page_offset},
};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::ToSchema;

/// Columns writable through the dynamic update endpoint
const UPDATABLE_COLUMNS: &[&str] = &[
    "department",
    "position",
    "basic_salary",
    "allowances",
    "date_of_joining",
    "reporting_manager_id",
];

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = 7, value_type = u64)]
    pub user_id: u64,
    #[schema(example = "Engineering", value_type = String)]
    pub department: String,
    #[schema(example = "Backend Developer", value_type = String)]
    pub position: String,
    #[schema(example = 30000.0)]
    pub basic_salary: f64,
    #[schema(example = 5000.0)]
    #[serde(default)]
    pub allowances: f64,
    #[schema(example = "2024-01-01", format = "date", value_type = String)]
    pub date_of_joining: NaiveDate,
    #[schema(example = 2, nullable = true)]
    pub reporting_manager_id: Option<u64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EmployeeQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/v1/employee",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee profile created", body = Object, example = json!({
            "message": "Employee created successfully"
        })),
        (status = 400, description = "Invalid compensation terms"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr()?;

    // compensation terms are checked here, never inside the calculator
    if let Err(msg) = validate_compensation(payload.basic_salary, payload.allowances) {
        return Ok(HttpResponse::BadRequest().json(json!({ "message": msg })));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO employees
        (user_id, department, position, basic_salary, allowances, date_of_joining, reporting_manager_id)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.user_id)
    .bind(&payload.department)
    .bind(&payload.position)
    .bind(payload.basic_salary)
    .bind(payload.allowances)
    .bind(payload.date_of_joining)
    .bind(payload.reporting_manager_id)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Created().json(json!({
            "message": "Employee created successfully"
        }))),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(json!({
                        "message": "User already has an employee profile"
                    })));
                }
            }

            error!(error = %e, "Failed to create employee");
            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/employee",
    params(
        ("page", Query, description = "Page number"),
        ("per_page", Query, description = "Items per page"),
        ("department", Query, description = "Filter by department"),
        ("position", Query, description = "Filter by position"),
        ("search", Query, description = "Search by department or position")
    ),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse)
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = page_offset(page, per_page);

    // ---------- build WHERE clause dynamically ----------
    let mut conditions = Vec::new();
    let mut bindings: Vec<sqlx::types::JsonValue> = Vec::new();

    if let Some(department) = &query.department {
        conditions.push("department = ?");
        bindings.push(department.clone().into());
    }

    if let Some(position) = &query.position {
        conditions.push("position = ?");
        bindings.push(position.clone().into());
    }

    if let Some(search) = &query.search {
        conditions.push("(department LIKE ? OR position LIKE ?)");
        let like = format!("%{}%", search);
        bindings.push(like.clone().into());
        bindings.push(like.into());
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) as total FROM employees {}", where_clause);
    debug!(sql = %count_sql, bindings = ?bindings, "Counting employees");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = count_query.bind(b);
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %count_sql, "Failed to count employees");
        ErrorInternalServerError("Database error")
    })?;

    // ---------- data query ----------
    let data_sql = format!(
        "SELECT * FROM employees {} ORDER BY id DESC LIMIT ? OFFSET ?",
        where_clause
    );
    debug!(sql = %data_sql, bindings = ?bindings, page, per_page, offset, "Fetching employees");

    let mut data_query = sqlx::query_as::<_, Employee>(&data_sql);
    for b in &bindings {
        data_query = data_query.bind(b);
    }
    data_query = data_query.bind(per_page as i64).bind(offset);

    let employees = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %data_sql, "Failed to fetch employees");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page,
        per_page,
        total,
    }))
}

/// Merge a partial update payload with the stored compensation and run the
/// standard pre-check, so an update can never park invalid terms on the row.
fn resolve_compensation(
    body: &Value,
    current_basic: f64,
    current_allowances: f64,
) -> Result<(), &'static str> {
    let basic = match body.get("basic_salary") {
        Some(v) => v.as_f64().ok_or("basic_salary must be a number")?,
        None => current_basic,
    };
    let allowances = match body.get("allowances") {
        Some(v) => v.as_f64().ok_or("allowances must be a number")?,
        None => current_allowances,
    };
    validate_compensation(basic, allowances)
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/v1/employee/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee updated successfully"),
        (status = 400, description = "Unknown or invalid field"),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr()?;

    let employee_id = path.into_inner();

    if body.get("basic_salary").is_some() || body.get("allowances").is_some() {
        let current = sqlx::query_as::<_, (f64, f64)>(
            "SELECT basic_salary, allowances FROM employees WHERE id = ?",
        )
        .bind(employee_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to fetch employee for update");
            ErrorInternalServerError("Internal Server Error")
        })?;

        let (current_basic, current_allowances) = match current {
            Some(row) => row,
            None => return Ok(HttpResponse::NotFound().body("Employee not found")),
        };

        if let Err(msg) = resolve_compensation(&body, current_basic, current_allowances) {
            return Ok(HttpResponse::BadRequest().json(json!({ "message": msg })));
        }
    }

    let update = build_update_sql("employees", &body, UPDATABLE_COLUMNS, "id", employee_id)?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().body("Employee not found"));
    }

    Ok(HttpResponse::Ok().body("Employee updated successfully"))
}

/// Delete Employee
#[utoipa::path(
    delete,
    path = "/api/v1/employee/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr()?;

    let employee_id = path.into_inner();

    let result = sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(employee_id)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(res) => {
            if res.rows_affected() == 0 {
                return Ok(HttpResponse::NotFound().json(json!({
                    "message": "Employee not found"
                })));
            }

            Ok(HttpResponse::Ok().json(json!({
                "message": "Successfully deleted"
            })))
        }

        Err(e) => {
            error!(error = %e, employee_id, "Failed to delete employee");

            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/v1/employee/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr()?;

    let employee_id: u64 = path.into_inner();

    let employee = sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, user_id, department, position, basic_salary, allowances,
               date_of_joining, reporting_manager_id
        FROM employees
        WHERE id = ?
        "#,
    )
    .bind(employee_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch employee");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match employee {
        Some(emp) => Ok(HttpResponse::Ok().json(emp)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        }))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn update_rejects_negative_basic_salary() {
        let body = json!({"basic_salary": -5000.0});
        assert_eq!(
            resolve_compensation(&body, 30_000.0, 5_000.0),
            Err("Basic salary cannot be negative")
        );
    }

    #[test]
    fn update_rejects_zeroed_basic_salary() {
        let body = json!({"basic_salary": 0.0});
        assert_eq!(
            resolve_compensation(&body, 30_000.0, 5_000.0),
            Err("Basic salary must be greater than zero")
        );
    }

    #[test]
    fn update_merges_missing_keys_from_stored_terms() {
        // only allowances in the payload: the stored basic still applies
        let body = json!({"allowances": 1_000.0});
        assert!(resolve_compensation(&body, 30_000.0, 0.0).is_ok());

        let body = json!({"allowances": -1.0});
        assert_eq!(
            resolve_compensation(&body, 30_000.0, 0.0),
            Err("Allowances cannot be negative")
        );
    }

    #[test]
    fn update_rejects_non_numeric_compensation() {
        let body = json!({"basic_salary": "lots"});
        assert_eq!(
            resolve_compensation(&body, 30_000.0, 5_000.0),
            Err("basic_salary must be a number")
        );
    }

    #[test]
    fn update_without_compensation_keys_skips_the_check() {
        let body = json!({"department": "Finance"});
        assert!(resolve_compensation(&body, 30_000.0, 5_000.0).is_ok());
    }
}
