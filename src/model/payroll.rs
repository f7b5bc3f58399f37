use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One persisted payroll run, unique per (employee_id, month, year).
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Payroll {
    pub id: u64,
    pub employee_id: u64,
    pub month: u32,
    pub year: i32,
    pub basic_salary: f64,
    pub allowances: f64,
    pub gross_salary: f64,
    pub pf_contribution: f64,
    pub professional_tax: f64,
    pub net_salary: f64,
    pub working_days: u32,
    pub attended_days: f64,
    pub status: String,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub created_at: Option<DateTime<Utc>>,
}
