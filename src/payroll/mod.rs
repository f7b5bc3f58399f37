//! Payroll computation: working-day counting, attendance aggregation and
//! the salary breakdown calculator with injectable statutory rules.

pub mod aggregate;
pub mod calc;
pub mod rules;

use sqlx::MySqlPool;

pub use calc::{CompensationTerms, PayrollBreakdown};
pub use rules::PayrollRules;

/// Calculate the breakdown for an employee-month, reading attendance fresh
/// from the store. Recalculating after attendance corrections picks up the
/// corrected records.
pub async fn calculate_for_employee(
    pool: &MySqlPool,
    rules: &PayrollRules,
    employee_id: u64,
    terms: CompensationTerms,
    year: i32,
    month: u32,
) -> Result<PayrollBreakdown, sqlx::Error> {
    let attended = aggregate::attended_days(pool, employee_id, year, month).await?;
    Ok(calc::calculate(rules, terms, year, month, attended))
}
