use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::DealSnapError;
use crate::types::{Money, Percent};
use crate::DealSnapResult;

const MONTHS_PER_YEAR: u32 = 12;

/// Longest amortisation the engine will schedule.
pub const MAX_AMORT_YEARS: u32 = 40;

// Rounding residue below this is treated as a paid-off loan.
const BALANCE_EPSILON: Decimal = dec!(0.000001);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Loan terms as seen by the amortisation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    /// Annual interest rate (6.5 = 6.5%)
    pub annual_rate_pct: Percent,
    pub amort_years: u32,
    /// Months of interest-only payments at the start of the loan
    #[serde(default)]
    pub interest_only_months: u32,
    /// Interest-only for the life of the schedule; the balance never amortises
    #[serde(default)]
    pub entire_loan_interest_only: bool,
}

/// One month of the amortisation schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyAmortization {
    /// 1-indexed month number
    pub month: u32,
    pub is_interest_only: bool,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub beginning_balance: Money,
    pub ending_balance: Money,
}

/// Twelve months of the schedule rolled up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnualDebtService {
    pub year: u32,
    pub debt_service: Money,
    pub interest_paid: Money,
    pub principal_paid: Money,
    pub beginning_balance: Money,
    pub ending_balance: Money,
    pub interest_only_months: u32,
}

impl AnnualDebtService {
    pub fn is_interest_only_year(&self) -> bool {
        self.interest_only_months > 0
    }
}

/// Month-by-month loan schedule with an optional interest-only lead-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub terms: LoanTerms,
    /// Payment during the interest-only months
    pub interest_only_payment: Money,
    /// Level payment once amortisation starts
    pub amortizing_payment: Money,
    pub months: Vec<MonthlyAmortization>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Standard fixed-rate mortgage payment: P * r(1+r)^n / ((1+r)^n - 1).
///
/// A zero rate degrades to straight-line repayment, `principal / (amort_years * 12)`.
pub fn monthly_payment(
    principal: Money,
    annual_rate_pct: Percent,
    amort_years: u32,
) -> DealSnapResult<Money> {
    validate_amortization(amort_years)?;
    validate_rate_and_principal(principal, annual_rate_pct)?;
    payment_over_months(principal, monthly_rate(annual_rate_pct), amort_years * MONTHS_PER_YEAR)
}

/// Debt service paid in `year` (1-indexed) of the loan.
///
/// Years that overlap the interest-only window pay interest-only for those months and
/// the amortising payment for the rest of the year.
pub fn year_debt_service(terms: &LoanTerms, year: u32) -> DealSnapResult<AnnualDebtService> {
    if year == 0 {
        return Err(DealSnapError::invalid("year", "Loan years are 1-indexed"));
    }
    let months = year
        .checked_mul(MONTHS_PER_YEAR)
        .ok_or_else(|| DealSnapError::invalid("year", "Loan year is out of range"))?;
    let schedule = build_schedule(terms, months)?;
    Ok(schedule.year(year))
}

/// Build the monthly schedule for the first `total_months` months of the loan.
pub fn build_schedule(terms: &LoanTerms, total_months: u32) -> DealSnapResult<AmortizationSchedule> {
    validate_terms(terms)?;

    let rate = monthly_rate(terms.annual_rate_pct);
    let amort_months = terms.amort_years * MONTHS_PER_YEAR;
    let interest_only_payment = terms
        .principal
        .checked_mul(rate)
        .ok_or_else(|| overflow("annual_rate_pct"))?;

    let io_months = if terms.entire_loan_interest_only {
        total_months
    } else {
        terms.interest_only_months.min(amort_months)
    };

    // The full principal amortises over whatever is left after the IO lead-in.
    let remaining = amort_months - terms.interest_only_months.min(amort_months);
    let amortizing_payment = if terms.entire_loan_interest_only || remaining == 0 {
        interest_only_payment
    } else {
        payment_over_months(terms.principal, rate, remaining)?
    };

    let mut months = Vec::with_capacity(total_months as usize);
    let mut balance = terms.principal;

    for month in 1..=total_months {
        let is_interest_only = month <= io_months || remaining == 0;
        // balance never exceeds principal, so this cannot overflow once the IO payment fits
        let interest = balance * rate;
        let (payment, principal) = if is_interest_only {
            (interest_only_payment, Decimal::ZERO)
        } else if balance.is_zero() {
            (Decimal::ZERO, Decimal::ZERO)
        } else {
            // Final payment retires whatever is left rather than overshooting.
            let principal = (amortizing_payment - interest).min(balance);
            (principal + interest, principal)
        };
        let mut ending_balance = (balance - principal).max(Decimal::ZERO);
        if ending_balance < BALANCE_EPSILON {
            ending_balance = Decimal::ZERO;
        }

        months.push(MonthlyAmortization {
            month,
            is_interest_only,
            payment,
            interest,
            principal,
            beginning_balance: balance,
            ending_balance,
        });

        balance = ending_balance;
    }

    Ok(AmortizationSchedule {
        terms: terms.clone(),
        interest_only_payment,
        amortizing_payment,
        months,
    })
}

impl AmortizationSchedule {
    /// Roll up the twelve months of `year`. Years past the end of the schedule
    /// report zero debt service and the last known balance.
    pub fn year(&self, year: u32) -> AnnualDebtService {
        let start = year.saturating_sub(1).saturating_mul(MONTHS_PER_YEAR) as usize;
        let end = (year.saturating_mul(MONTHS_PER_YEAR) as usize).min(self.months.len());

        if start >= end {
            let balance = self.balance_after(year.saturating_sub(1).saturating_mul(MONTHS_PER_YEAR));
            return AnnualDebtService {
                year,
                debt_service: Decimal::ZERO,
                interest_paid: Decimal::ZERO,
                principal_paid: Decimal::ZERO,
                beginning_balance: balance,
                ending_balance: balance,
                interest_only_months: 0,
            };
        }

        let slice = &self.months[start..end];
        AnnualDebtService {
            year,
            debt_service: slice.iter().map(|m| m.payment).sum(),
            interest_paid: slice.iter().map(|m| m.interest).sum(),
            principal_paid: slice.iter().map(|m| m.principal).sum(),
            beginning_balance: slice[0].beginning_balance,
            ending_balance: slice[slice.len() - 1].ending_balance,
            interest_only_months: slice.iter().filter(|m| m.is_interest_only).count() as u32,
        }
    }

    /// Outstanding balance after `month` payments, never negative.
    pub fn balance_after(&self, month: u32) -> Money {
        if month == 0 {
            return self.terms.principal;
        }
        let idx = (month as usize).min(self.months.len());
        if idx == 0 {
            return self.terms.principal;
        }
        self.months[idx - 1].ending_balance.max(Decimal::ZERO)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn monthly_rate(annual_rate_pct: Percent) -> Decimal {
    annual_rate_pct / dec!(100) / dec!(12)
}

fn payment_over_months(principal: Money, rate: Decimal, months: u32) -> DealSnapResult<Money> {
    if months == 0 {
        return Err(DealSnapError::DivisionByZero {
            context: "payment over zero months".into(),
        });
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(months));
    }

    let compound = (Decimal::ONE + rate)
        .checked_powi(months as i64)
        .ok_or_else(|| overflow("annual_rate_pct"))?;
    let denominator = compound - Decimal::ONE;
    if denominator.is_zero() {
        return Err(DealSnapError::DivisionByZero {
            context: "mortgage payment denominator".into(),
        });
    }

    principal
        .checked_mul(rate)
        .and_then(|interest| interest.checked_mul(compound))
        .and_then(|scaled| scaled.checked_div(denominator))
        .ok_or_else(|| overflow("principal"))
}

fn overflow(field: &str) -> DealSnapError {
    DealSnapError::invalid(field, "Loan terms exceed decimal precision")
}

fn validate_amortization(amort_years: u32) -> DealSnapResult<()> {
    if amort_years == 0 || amort_years > MAX_AMORT_YEARS {
        return Err(DealSnapError::invalid(
            "amort_years",
            format!("Amortization period must be between 1 and {MAX_AMORT_YEARS} years"),
        ));
    }
    Ok(())
}

fn validate_rate_and_principal(principal: Money, annual_rate_pct: Percent) -> DealSnapResult<()> {
    if principal < Decimal::ZERO {
        return Err(DealSnapError::invalid(
            "principal",
            "Loan principal cannot be negative",
        ));
    }
    if annual_rate_pct < Decimal::ZERO {
        return Err(DealSnapError::invalid(
            "annual_rate_pct",
            "Interest rate cannot be negative",
        ));
    }
    Ok(())
}

fn validate_terms(terms: &LoanTerms) -> DealSnapResult<()> {
    validate_amortization(terms.amort_years)?;
    validate_rate_and_principal(terms.principal, terms.annual_rate_pct)
}
