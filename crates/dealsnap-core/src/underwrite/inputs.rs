use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::DealSnapError;
use crate::types::{Money, Percent};
use crate::debt::MAX_AMORT_YEARS;
use crate::validation::{amount, in_range, unit_count, years_in_range};
use crate::DealSnapResult;

/// Owner share assumed for `split` items that do not state one.
pub const DEFAULT_SPLIT_OWNER_SHARE_PCT: Percent = dec!(50);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Who pays an operating expense line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpensePayer {
    #[default]
    Owner,
    Tenant,
    Split,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Taxes,
    Insurance,
    Utilities,
    Repairs,
    Admin,
    Management,
    Landscaping,
    Cleaning,
    Pest,
    Contracted,
    #[default]
    Other,
}

/// A single annual operating expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseLineItem {
    pub label: String,
    pub annual_amount: Money,
    #[serde(default)]
    pub category: ExpenseCategory,
    #[serde(default)]
    pub payer: ExpensePayer,
    /// Owner's share of a `split` item (0-100). Ignored for owner/tenant items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_share_pct: Option<Percent>,
}

impl ExpenseLineItem {
    /// Portion of the line the owner carries, as a percent.
    pub fn owner_share(&self) -> Percent {
        match self.payer {
            ExpensePayer::Owner => dec!(100),
            ExpensePayer::Tenant => Decimal::ZERO,
            ExpensePayer::Split => self
                .owner_share_pct
                .unwrap_or(DEFAULT_SPLIT_OWNER_SHARE_PCT),
        }
    }

    /// Owner-paid annual amount in the base year.
    pub fn owner_amount(&self) -> Money {
        self.annual_amount * self.owner_share() / dec!(100)
    }
}

/// Ancillary income source (laundry, parking, storage).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtherIncomeItem {
    pub label: String,
    pub monthly_amount: Money,
}

/// Investor hurdles the full underwrite is judged against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Targets {
    /// Minimum levered IRR (%)
    #[serde(default = "default_min_irr")]
    pub min_irr_pct: Percent,
    /// Minimum year-1 cash-on-cash (%)
    #[serde(default = "default_min_coc")]
    pub min_cash_on_cash_pct: Percent,
    #[serde(default = "default_min_dscr")]
    pub min_dscr: Decimal,
    #[serde(default = "default_max_equity")]
    pub max_equity: Money,
}

impl Default for Targets {
    fn default() -> Self {
        Targets {
            min_irr_pct: default_min_irr(),
            min_cash_on_cash_pct: default_min_coc(),
            min_dscr: default_min_dscr(),
            max_equity: default_max_equity(),
        }
    }
}

/// Complete deal assumptions for a full underwrite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealInputs {
    // --- Identity (carried through, not used) ---
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    // --- Income ---
    pub units: u32,
    pub avg_monthly_rent_per_unit: Money,
    #[serde(default)]
    pub other_monthly_income: Money,
    /// When non-empty, replaces `other_monthly_income`
    #[serde(default)]
    pub other_income_line_items: Vec<OtherIncomeItem>,
    #[serde(default = "default_vacancy")]
    pub vacancy_pct: Percent,
    /// Vacancy applies to other income as well as rent
    #[serde(default = "default_true")]
    pub apply_vacancy_to_other_income: bool,

    // --- Acquisition & financing ---
    pub purchase_price: Money,
    #[serde(default)]
    pub closing_costs: Money,
    #[serde(default)]
    pub renovation_budget: Money,
    #[serde(default = "default_down_payment")]
    pub down_payment_pct: Percent,
    #[serde(default = "default_interest_rate")]
    pub interest_rate_pct: Percent,
    #[serde(default = "default_amort_years")]
    pub amort_years: u32,
    #[serde(default = "default_amort_years")]
    pub loan_term_years: u32,
    #[serde(default)]
    pub interest_only_months: u32,
    #[serde(default)]
    pub entire_loan_interest_only: bool,
    /// Lender fees as a percent of purchase price
    #[serde(default)]
    pub loan_fees_pct: Percent,
    /// Roll lender fees into the loan instead of paying them from equity
    #[serde(default)]
    pub finance_loan_fees: bool,

    // --- Operations ---
    #[serde(default = "default_growth")]
    pub rent_growth_pct: Percent,
    #[serde(default = "default_growth")]
    pub expense_growth_pct: Percent,
    #[serde(default = "default_management")]
    pub management_pct_of_egi: Percent,
    #[serde(default = "default_capex")]
    pub capex_reserve_pct_of_egi: Percent,
    #[serde(default)]
    pub expense_line_items: Vec<ExpenseLineItem>,

    // --- Exit ---
    #[serde(default = "default_hold_years")]
    pub hold_years: u32,
    #[serde(default = "default_exit_cap")]
    pub exit_cap_rate_pct: Percent,
    #[serde(default = "default_selling_costs")]
    pub selling_costs_pct: Percent,

    #[serde(default)]
    pub targets: Targets,
}

fn default_true() -> bool {
    true
}
fn default_vacancy() -> Percent {
    dec!(5)
}
fn default_down_payment() -> Percent {
    dec!(25)
}
fn default_interest_rate() -> Percent {
    dec!(6.5)
}
fn default_amort_years() -> u32 {
    30
}
fn default_growth() -> Percent {
    dec!(3)
}
fn default_management() -> Percent {
    dec!(8)
}
fn default_capex() -> Percent {
    dec!(5)
}
fn default_hold_years() -> u32 {
    5
}
fn default_exit_cap() -> Percent {
    dec!(6)
}
fn default_selling_costs() -> Percent {
    dec!(6)
}
fn default_min_irr() -> Percent {
    dec!(12)
}
fn default_min_coc() -> Percent {
    dec!(6)
}
fn default_min_dscr() -> Decimal {
    dec!(1.25)
}
fn default_max_equity() -> Money {
    dec!(500000)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub(crate) fn validate_deal_inputs(
    input: &DealInputs,
    warnings: &mut Vec<String>,
) -> DealSnapResult<()> {
    unit_count(input.units)?;
    amount("avg_monthly_rent_per_unit", input.avg_monthly_rent_per_unit)?;
    amount("other_monthly_income", input.other_monthly_income)?;
    for item in &input.other_income_line_items {
        amount("other_income_line_items.monthly_amount", item.monthly_amount)?;
    }
    in_range("vacancy_pct", input.vacancy_pct, dec!(0), dec!(100))?;

    if input.purchase_price <= Decimal::ZERO {
        return Err(DealSnapError::invalid(
            "purchase_price",
            "Purchase price must be positive",
        ));
    }
    amount("purchase_price", input.purchase_price)?;
    amount("closing_costs", input.closing_costs)?;
    amount("renovation_budget", input.renovation_budget)?;
    in_range("down_payment_pct", input.down_payment_pct, dec!(0), dec!(100))?;
    in_range("interest_rate_pct", input.interest_rate_pct, dec!(0), dec!(30))?;
    years_in_range("amort_years", input.amort_years, 1, MAX_AMORT_YEARS)?;
    years_in_range("loan_term_years", input.loan_term_years, 1, 40)?;
    if input.interest_only_months > 120 {
        return Err(DealSnapError::invalid(
            "interest_only_months",
            "Interest-only period cannot exceed 120 months",
        ));
    }
    in_range("loan_fees_pct", input.loan_fees_pct, dec!(0), dec!(10))?;

    in_range("rent_growth_pct", input.rent_growth_pct, dec!(-10), dec!(20))?;
    in_range("expense_growth_pct", input.expense_growth_pct, dec!(-10), dec!(20))?;
    in_range("management_pct_of_egi", input.management_pct_of_egi, dec!(0), dec!(30))?;
    in_range("capex_reserve_pct_of_egi", input.capex_reserve_pct_of_egi, dec!(0), dec!(20))?;

    for item in &input.expense_line_items {
        amount("expense_line_items.annual_amount", item.annual_amount)?;
        if let Some(share) = item.owner_share_pct {
            in_range("expense_line_items.owner_share_pct", share, dec!(0), dec!(100))?;
        }
        if item.payer == ExpensePayer::Split && item.owner_share_pct.is_none() {
            warnings.push(format!(
                "Split expense '{}' has no owner share; assuming {DEFAULT_SPLIT_OWNER_SHARE_PCT}% owner-paid",
                item.label
            ));
        }
    }

    years_in_range("hold_years", input.hold_years, 1, 30)?;
    if input.exit_cap_rate_pct <= Decimal::ZERO || input.exit_cap_rate_pct > dec!(20) {
        return Err(DealSnapError::invalid(
            "exit_cap_rate_pct",
            "Exit cap rate must be greater than 0% and at most 20%",
        ));
    }
    in_range("selling_costs_pct", input.selling_costs_pct, dec!(0), dec!(15))?;

    if input.targets.max_equity < Decimal::ZERO {
        return Err(DealSnapError::invalid(
            "targets.max_equity",
            "Maximum equity cannot be negative",
        ));
    }

    // --- Warnings for unusual assumptions ---
    if input.vacancy_pct > dec!(15) {
        warnings.push(format!(
            "Vacancy rate {:.1}% exceeds 15%, above typical market norms",
            input.vacancy_pct
        ));
    }

    if input.hold_years > input.loan_term_years {
        warnings.push(format!(
            "Loan term of {} years ends before the {}-year hold; balloon refinance is not modelled",
            input.loan_term_years, input.hold_years
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(payer: ExpensePayer, share: Option<Percent>) -> ExpenseLineItem {
        ExpenseLineItem {
            label: "Water".into(),
            annual_amount: dec!(2400),
            category: ExpenseCategory::Utilities,
            payer,
            owner_share_pct: share,
        }
    }

    #[test]
    fn test_owner_share_by_payer() {
        assert_eq!(item(ExpensePayer::Owner, None).owner_amount(), dec!(2400));
        assert_eq!(item(ExpensePayer::Tenant, Some(dec!(80))).owner_amount(), dec!(0));
        assert_eq!(item(ExpensePayer::Split, Some(dec!(25))).owner_amount(), dec!(600));
        assert_eq!(item(ExpensePayer::Split, None).owner_amount(), dec!(1200));
    }

    #[test]
    fn test_deserialise_applies_defaults() {
        let json = r#"{
            "units": 4,
            "avg_monthly_rent_per_unit": "1200",
            "purchase_price": "500000"
        }"#;
        let input: DealInputs = serde_json::from_str(json).unwrap();
        assert_eq!(input.down_payment_pct, dec!(25));
        assert_eq!(input.amort_years, 30);
        assert_eq!(input.hold_years, 5);
        assert!(input.apply_vacancy_to_other_income);
        assert_eq!(input.targets.min_dscr, dec!(1.25));
        assert_eq!(input.targets.max_equity, dec!(500000));
    }

    #[test]
    fn test_payer_serialises_lowercase() {
        let json = serde_json::to_string(&ExpensePayer::Split).unwrap();
        assert_eq!(json, "\"split\"");
    }
}
