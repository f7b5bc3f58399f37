use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Daily attendance status as stored in the `attendance.status` column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum AttendanceStatus {
    Present,
    Absent,
    #[serde(rename = "Half Day")]
    #[strum(serialize = "Half Day")]
    HalfDay,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Attendance {
    pub id: u64,
    pub employee_id: u64,
    pub date: NaiveDate,
    pub status: String,
}
