//! DealSnap quick screen: one year, a few inputs, a points-based triage.

pub mod defaults;
pub mod snap;
pub mod triage;

pub use defaults::{ExpenseResponsibility, InsuranceRisk, PropertyCondition, PropertyType};
pub use snap::{
    snap_deal, ExpenseAnalysis, FinanceRealityCheck, IncomeAnalysis, QuickModeInputs,
    QuickModeResults, RentLiftSensitivity, ReverseEngineering,
};
pub use triage::{score_triage, TriageScore, TriageVerdict, MAX_TRIAGE_SCORE};
