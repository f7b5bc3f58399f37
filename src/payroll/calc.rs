use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::attendance::AttendanceStatus;
use crate::payroll::rules::PayrollRules;

/// Monthly compensation as contracted on the employee record.
#[derive(Debug, Clone, Copy)]
pub struct CompensationTerms {
    pub basic_salary: f64,
    pub allowances: f64,
}

/// Full salary breakdown for one employee-month.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PayrollBreakdown {
    #[schema(example = 30000.0)]
    pub basic_salary: f64,
    #[schema(example = 5000.0)]
    pub allowances: f64,
    #[schema(example = 33478.26)]
    pub gross_salary: f64,
    #[schema(example = 3443.48)]
    pub pf_contribution: f64,
    #[schema(example = 150.0)]
    pub professional_tax: f64,
    #[schema(example = 29884.78)]
    pub net_salary: f64,
    #[schema(example = 23)]
    pub working_days: u32,
    #[schema(example = 22.0)]
    pub attended_days: f64,
    #[schema(example = 0.957)]
    pub attendance_ratio: f64,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// First and last calendar date of a month, or `None` for an invalid period.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_first.pred_opt()?))
}

/// Count of weekdays (Mon-Fri) in a month. Every weekday counts as a
/// working day; no holiday calendar is modeled.
pub fn working_days(year: i32, month: u32) -> u32 {
    let mut count = 0;
    for day in 1..=31 {
        match NaiveDate::from_ymd_opt(year, month, day) {
            Some(date) if date.weekday().number_from_monday() <= 5 => count += 1,
            Some(_) => {}
            None => break,
        }
    }
    count
}

/// Day weight of a single attendance status.
pub fn attendance_weight(status: AttendanceStatus) -> f64 {
    match status {
        AttendanceStatus::Present => 1.0,
        AttendanceStatus::HalfDay => 0.5,
        AttendanceStatus::Absent => 0.0,
    }
}

/// Reduce a month's attendance statuses to a weighted day count.
/// Dates without a record simply never appear in the input, so they
/// contribute nothing. Order does not matter.
pub fn weigh_attendance(statuses: &[AttendanceStatus]) -> f64 {
    statuses.iter().copied().map(attendance_weight).sum()
}

/// Pre-check for payroll inputs, kept separate from the calculator so the
/// calculation itself stays pure and unconditional.
pub fn validate_compensation(basic_salary: f64, allowances: f64) -> Result<(), &'static str> {
    if basic_salary < 0.0 {
        return Err("Basic salary cannot be negative");
    }
    if allowances < 0.0 {
        return Err("Allowances cannot be negative");
    }
    if basic_salary == 0.0 {
        return Err("Basic salary must be greater than zero");
    }
    Ok(())
}

/// Derive the full payroll breakdown for one employee-month.
///
/// Pure and deterministic: identical inputs yield identical output. The
/// caller is responsible for validating the period and the compensation
/// terms beforehand; this function does not guard against bad inputs.
///
/// Professional tax is stepped on the *unadjusted* basic salary and only
/// zeroed when the employee attended nothing at all that month. Net salary
/// may come out negative when the fixed tax exceeds a tiny attendance-
/// prorated gross; it is deliberately not clamped.
pub fn calculate(
    rules: &PayrollRules,
    terms: CompensationTerms,
    year: i32,
    month: u32,
    attended_days: f64,
) -> PayrollBreakdown {
    let gross_full = terms.basic_salary + terms.allowances;

    let working_days = working_days(year, month);
    let attendance_ratio = if working_days > 0 {
        attended_days / working_days as f64
    } else {
        0.0
    };

    let adjusted_gross = round2(gross_full * attendance_ratio);
    let adjusted_basic = terms.basic_salary * attendance_ratio;
    let pf_contribution = round2(adjusted_basic * rules.pf_rate);

    let professional_tax = if attended_days == 0.0 {
        0.0
    } else {
        rules.professional_tax(terms.basic_salary)
    };

    let net_salary = round2(adjusted_gross - pf_contribution - professional_tax);

    PayrollBreakdown {
        basic_salary: round2(terms.basic_salary),
        allowances: round2(terms.allowances),
        gross_salary: adjusted_gross,
        pf_contribution,
        professional_tax: round2(professional_tax),
        net_salary,
        working_days,
        attended_days,
        attendance_ratio: round3(attendance_ratio),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payroll::rules::TaxSlab;

    fn approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    fn terms(basic_salary: f64, allowances: f64) -> CompensationTerms {
        CompensationTerms {
            basic_salary,
            allowances,
        }
    }

    #[test]
    fn working_days_january_2025() {
        assert_eq!(working_days(2025, 1), 23);
    }

    #[test]
    fn working_days_february_2025() {
        assert_eq!(working_days(2025, 2), 20);
    }

    #[test]
    fn working_days_leap_february() {
        // Feb 2024 has 29 days, 8 of them weekend
        assert_eq!(working_days(2024, 2), 21);
    }

    #[test]
    fn working_days_matches_per_date_enumeration() {
        use chrono::Datelike;
        for month in 1..=12 {
            let (first, last) = month_bounds(2025, month).unwrap();
            let expected = first
                .iter_days()
                .take_while(|d| *d <= last)
                .filter(|d| d.weekday().number_from_monday() <= 5)
                .count() as u32;
            assert_eq!(working_days(2025, month), expected, "month {month}");
        }
    }

    #[test]
    fn month_bounds_handles_december() {
        let (first, last) = month_bounds(2025, 12).unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    #[test]
    fn month_bounds_rejects_invalid_month() {
        assert!(month_bounds(2025, 0).is_none());
        assert!(month_bounds(2025, 13).is_none());
    }

    #[test]
    fn professional_tax_slab_boundaries() {
        let rules = PayrollRules::default();
        let cases = [
            (10_000.0, 0.0),
            (10_000.01, 150.0),
            (30_000.0, 150.0),
            (30_000.01, 200.0),
            (45_000.0, 200.0),
        ];
        for (salary, expected) in cases {
            approx(rules.professional_tax(salary), expected);
        }
    }

    #[test]
    fn professional_tax_with_custom_ladder() {
        let rules = PayrollRules {
            pf_rate: 0.10,
            tax_slabs: vec![
                TaxSlab { up_to: Some(20_000.0), tax: 0.0 },
                TaxSlab { up_to: None, tax: 500.0 },
            ],
        };
        approx(rules.professional_tax(20_000.0), 0.0);
        approx(rules.professional_tax(20_000.01), 500.0);
    }

    #[test]
    fn attendance_weights_sum_commutatively() {
        use AttendanceStatus::*;
        let forward = [Present, Present, HalfDay, Absent, Present];
        let backward = [Present, Absent, HalfDay, Present, Present];
        approx(weigh_attendance(&forward), 3.5);
        approx(weigh_attendance(&backward), 3.5);
        approx(weigh_attendance(&[]), 0.0);
    }

    #[test]
    fn validate_compensation_messages() {
        assert!(validate_compensation(30_000.0, 5_000.0).is_ok());
        assert!(validate_compensation(30_000.0, 0.0).is_ok());
        assert_eq!(
            validate_compensation(-1_000.0, 2_000.0),
            Err("Basic salary cannot be negative")
        );
        assert_eq!(
            validate_compensation(1_000.0, -1.0),
            Err("Allowances cannot be negative")
        );
        assert_eq!(
            validate_compensation(0.0, 0.0),
            Err("Basic salary must be greater than zero")
        );
    }

    #[test]
    fn end_to_end_january_2025() {
        let rules = PayrollRules::default();
        // 23 working days, 22 present
        let out = calculate(&rules, terms(30_000.0, 5_000.0), 2025, 1, 22.0);

        assert_eq!(out.working_days, 23);
        approx(out.attended_days, 22.0);
        approx(out.attendance_ratio, 0.957);
        approx(out.gross_salary, 33_478.26);
        approx(out.pf_contribution, 3_443.48);
        // basic is exactly 30,000, which still falls in the 150 slab
        approx(out.professional_tax, 150.0);
        approx(out.net_salary, 29_884.78);
    }

    #[test]
    fn identical_inputs_yield_identical_output() {
        let rules = PayrollRules::default();
        let a = calculate(&rules, terms(27_500.0, 1_250.0), 2025, 3, 17.5);
        let b = calculate(&rules, terms(27_500.0, 1_250.0), 2025, 3, 17.5);
        assert_eq!(a.gross_salary, b.gross_salary);
        assert_eq!(a.pf_contribution, b.pf_contribution);
        assert_eq!(a.professional_tax, b.professional_tax);
        assert_eq!(a.net_salary, b.net_salary);
        assert_eq!(a.attendance_ratio, b.attendance_ratio);
    }

    #[test]
    fn zero_attendance_zeroes_everything_including_tax() {
        let rules = PayrollRules::default();
        // basic well above the top slab, but no days worked
        let out = calculate(&rules, terms(50_000.0, 10_000.0), 2025, 1, 0.0);

        approx(out.attended_days, 0.0);
        approx(out.attendance_ratio, 0.0);
        approx(out.gross_salary, 0.0);
        approx(out.pf_contribution, 0.0);
        approx(out.professional_tax, 0.0);
        approx(out.net_salary, 0.0);
    }

    #[test]
    fn full_attendance_pays_contracted_gross() {
        let rules = PayrollRules::default();
        let out = calculate(&rules, terms(30_000.0, 5_000.0), 2025, 2, 20.0);

        assert_eq!(out.working_days, 20);
        approx(out.attendance_ratio, 1.0);
        approx(out.gross_salary, 35_000.0);
        approx(out.pf_contribution, 3_600.0);
        approx(out.professional_tax, 150.0);
        approx(out.net_salary, 31_250.0);
    }

    #[test]
    fn partial_attendance_still_incurs_full_tax() {
        let rules = PayrollRules::default();
        // one half day in January: tax is not prorated
        let out = calculate(&rules, terms(40_000.0, 0.0), 2025, 1, 0.5);

        approx(out.professional_tax, 200.0);
        assert!(out.gross_salary > 0.0);
    }

    #[test]
    fn negative_net_is_not_clamped() {
        let rules = PayrollRules::default();
        // fixed tax dwarfs an almost-zero prorated gross
        let out = calculate(&rules, terms(12_000.0, 0.0), 2025, 1, 0.1);

        approx(out.gross_salary, 52.17);
        approx(out.professional_tax, 150.0);
        assert!(out.net_salary < 0.0, "net was {}", out.net_salary);
        approx(out.net_salary, round2(52.17 - out.pf_contribution - 150.0));
    }

    #[test]
    fn zero_working_days_defends_against_division() {
        let rules = PayrollRules::default();
        // month 13 resolves to no dates at all, so the denominator is zero
        let out = calculate(&rules, terms(10_000.0, 0.0), 2025, 13, 0.0);
        assert_eq!(out.working_days, 0);
        approx(out.attendance_ratio, 0.0);
        approx(out.net_salary, 0.0);
    }
}
