use crate::api::analytics::{EmployeeStats, MonthlyPayout, RoleCount, StatusCount};
use crate::api::attendance::{MarkAttendance, MonthlyStats};
use crate::api::employee::{CreateEmployee, EmployeeListResponse};
use crate::api::leave::{
    AllocateLeave, ApplyLeave, LeaveBalance, LeaveFilter, LeaveListResponse, LeaveResponse,
};
use crate::api::payroll::{
    GeneratePayroll, GeneratePayslips, PaginatedPayrollResponse, PayrollQuery, UpdatePayroll,
};
use crate::model::attendance::AttendanceStatus;
use crate::model::employee::Employee;
use crate::model::leave::{LeaveStatus, LeaveType};
use crate::model::payroll::Payroll;
use crate::payroll::PayrollBreakdown;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "WorkZen HRMS API",
        version = "1.0.0",
        description = r#"
## WorkZen Human Resource Management System

This API powers an HRMS backend covering the day-to-day operations of an organization.

### 🔹 Key Features
- **Employee Management**
  - Create, update, list, and view employee profiles with compensation terms
- **Attendance Management**
  - Daily marking (Present / Absent / Half Day), per-employee logs, monthly stats
- **Leave Management**
  - Allocations, balance-checked applications, approve/reject workflow
- **Payroll Management**
  - Attendance-prorated payroll generation, recalculation, payslip issuance
- **Analytics**
  - Admin summaries over attendance, leaves, payroll and headcount

### 🔐 Security
Most endpoints are protected using **JWT Bearer authentication**.
Roles: Admin, HR Officer, Payroll Officer, Employee.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::attendance::mark_attendance,
        crate::api::attendance::my_logs,
        crate::api::attendance::list_attendance,
        crate::api::attendance::monthly_attendance,
        crate::api::attendance::edit_attendance,

        crate::api::leave::apply_leave,
        crate::api::leave::leave_balance,
        crate::api::leave::allocate_leave,
        crate::api::leave::leave_list,
        crate::api::leave::get_leave,
        crate::api::leave::approve_leave,
        crate::api::leave::reject_leave,

        crate::api::payroll::generate_payroll,
        crate::api::payroll::update_payroll,
        crate::api::payroll::get_payroll,
        crate::api::payroll::list_payrolls,
        crate::api::payroll::generate_payslips,

        crate::api::analytics::attendance_summary,
        crate::api::analytics::leave_summary,
        crate::api::analytics::payroll_summary,
        crate::api::analytics::employee_stats
    ),
    components(
        schemas(
            CreateEmployee,
            Employee,
            EmployeeListResponse,

            AttendanceStatus,
            MarkAttendance,
            MonthlyStats,

            LeaveType,
            LeaveStatus,
            ApplyLeave,
            AllocateLeave,
            LeaveFilter,
            LeaveResponse,
            LeaveListResponse,
            LeaveBalance,

            Payroll,
            PayrollBreakdown,
            GeneratePayroll,
            UpdatePayroll,
            GeneratePayslips,
            PayrollQuery,
            PaginatedPayrollResponse,

            StatusCount,
            MonthlyPayout,
            RoleCount,
            EmployeeStats
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Employee", description = "Employee management APIs"),
        (name = "Attendance", description = "Attendance management APIs"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Payroll", description = "Payroll management APIs"),
        (name = "Analytics", description = "Admin analytics APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
