//! Full underwriting: multi-year pro forma, exit, IRR and the target verdict.

pub mod deal;
pub mod income;
pub mod inputs;
pub mod pro_forma;
pub mod returns;
pub mod verdict;

pub use deal::{underwrite_deal, AuditData, DealResults, OperatingRatios};
pub use income::{IncomeExpenseYear, IncomeProjector};
pub use inputs::{
    DealInputs, ExpenseCategory, ExpenseLineItem, ExpensePayer, OtherIncomeItem, Targets,
    DEFAULT_SPLIT_OWNER_SHARE_PCT,
};
pub use pro_forma::{build_pro_forma, ProFormaYear};
pub use returns::{capital_stack, compute_returns, CapitalStack, ReturnMetrics};
pub use verdict::{evaluate, CheckName, Verdict, VerdictCheck, VerdictMetrics, VerdictStatus};
