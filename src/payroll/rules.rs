/// Statutory deduction parameters for one jurisdiction.
///
/// Passed into the calculator instead of living as module state so a
/// different tax ladder or PF rate can be swapped in without touching
/// the calculation itself.
#[derive(Debug, Clone)]
pub struct PayrollRules {
    /// Provident Fund rate applied to the attendance-adjusted basic salary.
    pub pf_rate: f64,
    /// Professional tax ladder, ascending by `up_to`. The open-ended top
    /// slab carries `up_to: None`.
    pub tax_slabs: Vec<TaxSlab>,
}

/// One professional-tax slab: a flat monthly amount for salaries up to
/// (and including) `up_to`.
#[derive(Debug, Clone, Copy)]
pub struct TaxSlab {
    pub up_to: Option<f64>,
    pub tax: f64,
}

impl Default for PayrollRules {
    /// Indian statutory defaults: 12% PF, professional tax of 0 up to
    /// 10,000, 150 up to 30,000 and 200 above.
    fn default() -> Self {
        Self {
            pf_rate: 0.12,
            tax_slabs: vec![
                TaxSlab { up_to: Some(10_000.0), tax: 0.0 },
                TaxSlab { up_to: Some(30_000.0), tax: 150.0 },
                TaxSlab { up_to: None, tax: 200.0 },
            ],
        }
    }
}

impl PayrollRules {
    /// Flat monthly professional tax for a given contracted basic salary.
    ///
    /// Evaluated on the unadjusted monthly amount: the bracket reflects
    /// pay grade, not days worked. Zeroing on zero attendance happens in
    /// the calculator, not here.
    pub fn professional_tax(&self, salary: f64) -> f64 {
        for slab in &self.tax_slabs {
            match slab.up_to {
                Some(bound) if salary <= bound => return slab.tax,
                Some(_) => continue,
                None => return slab.tax,
            }
        }
        0.0
    }
}
