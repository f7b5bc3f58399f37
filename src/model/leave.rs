use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum LeaveType {
    Casual,
    Sick,
    Personal,
    Annual,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}
