//! Debt service: fixed-rate payments, interest-only lead-ins and balance tracking.

pub mod amortization;

pub use amortization::{
    build_schedule, monthly_payment, year_debt_service, AmortizationSchedule, AnnualDebtService,
    LoanTerms, MonthlyAmortization, MAX_AMORT_YEARS,
};
