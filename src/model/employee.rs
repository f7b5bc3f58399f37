use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "user_id": 7,
        "department": "Engineering",
        "position": "Backend Developer",
        "basic_salary": 30000.0,
        "allowances": 5000.0,
        "date_of_joining": "2024-01-01",
        "reporting_manager_id": null
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 7)]
    pub user_id: u64,

    #[schema(example = "Engineering")]
    pub department: String,

    #[schema(example = "Backend Developer")]
    pub position: String,

    /// Contracted monthly basic salary
    #[schema(example = 30000.0)]
    pub basic_salary: f64,

    /// Contracted monthly allowances
    #[schema(example = 5000.0)]
    pub allowances: f64,

    #[schema(
        example = "2024-01-01",
        value_type = String,
        format = "date"
    )]
    pub date_of_joining: NaiveDate,

    #[schema(example = 2, nullable = true)]
    pub reporting_manager_id: Option<u64>,
}
