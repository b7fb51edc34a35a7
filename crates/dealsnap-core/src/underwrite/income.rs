use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::inputs::{DealInputs, ExpenseCategory};
use crate::types::{Money, Percent};

/// Income and owner-borne expenses for one year of operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeExpenseYear {
    pub year: u32,
    /// Gross potential rent, including other income
    pub gross_potential_rent: Money,
    /// Portion of GPR from ancillary income
    pub other_income: Money,
    pub vacancy_loss: Money,
    pub effective_gross_income: Money,
    /// Owner-paid line items (tenant-paid lines and the tenant share of splits excluded)
    pub operating_expenses: Money,
    pub management_fee: Money,
    /// Reserve for capital items; reported, never deducted from NOI
    pub capex_reserve: Money,
    /// Operating expenses + management fee
    pub total_opex: Money,
    /// EGI - total opex
    pub noi: Money,
    /// Owner-paid repairs-category expenses, for the repairs ratio
    pub repairs: Money,
}

/// Grows the base-year rent roll and expense ledger forward.
///
/// Everything is resolved once at construction: owner shares of each line item,
/// the base other-income figure, and which lines are skipped. Each year is then a
/// closed-form compounding of the base year, so years can be asked for in any order.
#[derive(Debug, Clone)]
pub struct IncomeProjector {
    base_rent: Money,
    base_other_income: Money,
    base_owner_expenses: Money,
    base_repairs: Money,
    vacancy_pct: Percent,
    apply_vacancy_to_other_income: bool,
    rent_growth_pct: Percent,
    expense_growth_pct: Percent,
    management_pct: Percent,
    capex_pct: Percent,
    skipped_management_items: Vec<String>,
}

impl IncomeProjector {
    pub fn new(input: &DealInputs) -> Self {
        let base_rent =
            Decimal::from(input.units) * input.avg_monthly_rent_per_unit * dec!(12);

        let monthly_other = if input.other_income_line_items.is_empty() {
            input.other_monthly_income
        } else {
            input
                .other_income_line_items
                .iter()
                .map(|i| i.monthly_amount)
                .sum()
        };

        let mut base_owner_expenses = Decimal::ZERO;
        let mut base_repairs = Decimal::ZERO;
        let mut skipped_management_items = Vec::new();

        for item in &input.expense_line_items {
            // Management is modelled as a percent of EGI; a fixed line would double count.
            if item.category == ExpenseCategory::Management {
                skipped_management_items.push(item.label.clone());
                continue;
            }
            let owner = item.owner_amount();
            base_owner_expenses += owner;
            if item.category == ExpenseCategory::Repairs {
                base_repairs += owner;
            }
        }

        IncomeProjector {
            base_rent,
            base_other_income: monthly_other * dec!(12),
            base_owner_expenses,
            base_repairs,
            vacancy_pct: input.vacancy_pct,
            apply_vacancy_to_other_income: input.apply_vacancy_to_other_income,
            rent_growth_pct: input.rent_growth_pct,
            expense_growth_pct: input.expense_growth_pct,
            management_pct: input.management_pct_of_egi,
            capex_pct: input.capex_reserve_pct_of_egi,
            skipped_management_items,
        }
    }

    /// Labels of management-category lines left out of fixed expenses.
    pub fn skipped_management_items(&self) -> &[String] {
        &self.skipped_management_items
    }

    /// Project year `year` (1-indexed; year 1 is the base year).
    pub fn year(&self, year: u32) -> IncomeExpenseYear {
        let periods = year.saturating_sub(1);
        let rent_growth = growth_factor(self.rent_growth_pct, periods);
        let expense_growth = growth_factor(self.expense_growth_pct, periods);

        let rent = self.base_rent * rent_growth;
        let other_income = self.base_other_income * rent_growth;
        let gross_potential_rent = rent + other_income;

        let vacancy_base = if self.apply_vacancy_to_other_income {
            gross_potential_rent
        } else {
            rent
        };
        let vacancy_loss = vacancy_base * self.vacancy_pct / dec!(100);
        let effective_gross_income = gross_potential_rent - vacancy_loss;

        let operating_expenses = self.base_owner_expenses * expense_growth;
        let management_fee = effective_gross_income * self.management_pct / dec!(100);
        let capex_reserve = effective_gross_income * self.capex_pct / dec!(100);
        let total_opex = operating_expenses + management_fee;
        let noi = effective_gross_income - total_opex;

        IncomeExpenseYear {
            year,
            gross_potential_rent,
            other_income,
            vacancy_loss,
            effective_gross_income,
            operating_expenses,
            management_fee,
            capex_reserve,
            total_opex,
            noi,
            repairs: self.base_repairs * expense_growth,
        }
    }
}

/// (1 + pct/100)^periods
pub(crate) fn growth_factor(pct: Percent, periods: u32) -> Decimal {
    if periods == 0 {
        return Decimal::ONE;
    }
    (Decimal::ONE + pct / dec!(100)).powi(periods as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::underwrite::inputs::{ExpenseLineItem, ExpensePayer, OtherIncomeItem, Targets};

    fn base_input() -> DealInputs {
        DealInputs {
            property_name: None,
            address: None,
            units: 4,
            avg_monthly_rent_per_unit: dec!(1200),
            other_monthly_income: Decimal::ZERO,
            other_income_line_items: vec![],
            vacancy_pct: dec!(5),
            apply_vacancy_to_other_income: true,
            purchase_price: dec!(500000),
            closing_costs: Decimal::ZERO,
            renovation_budget: Decimal::ZERO,
            down_payment_pct: dec!(25),
            interest_rate_pct: dec!(6.5),
            amort_years: 30,
            loan_term_years: 30,
            interest_only_months: 0,
            entire_loan_interest_only: false,
            loan_fees_pct: Decimal::ZERO,
            finance_loan_fees: false,
            rent_growth_pct: dec!(3),
            expense_growth_pct: dec!(2),
            management_pct_of_egi: Decimal::ZERO,
            capex_reserve_pct_of_egi: dec!(5),
            expense_line_items: vec![ExpenseLineItem {
                label: "Taxes & insurance".into(),
                annual_amount: dec!(16000),
                category: ExpenseCategory::Taxes,
                payer: ExpensePayer::Owner,
                owner_share_pct: None,
            }],
            hold_years: 5,
            exit_cap_rate_pct: dec!(6),
            selling_costs_pct: dec!(6),
            targets: Targets::default(),
        }
    }

    #[test]
    fn test_year_one_income_and_noi() {
        let y1 = IncomeProjector::new(&base_input()).year(1);
        assert_eq!(y1.gross_potential_rent, dec!(57600));
        assert_eq!(y1.vacancy_loss, dec!(2880));
        assert_eq!(y1.effective_gross_income, dec!(54720));
        assert_eq!(y1.noi, dec!(38720));
    }

    #[test]
    fn test_capex_reserve_not_in_noi() {
        let y1 = IncomeProjector::new(&base_input()).year(1);
        assert_eq!(y1.capex_reserve, dec!(2736));
        assert_eq!(y1.noi, y1.effective_gross_income - y1.total_opex);
        assert_eq!(y1.total_opex, y1.operating_expenses + y1.management_fee);
    }

    #[test]
    fn test_growth_compounds_from_year_one() {
        let p = IncomeProjector::new(&base_input());
        let y3 = p.year(3);
        assert_eq!(y3.gross_potential_rent, dec!(57600) * dec!(1.03) * dec!(1.03));
        assert_eq!(y3.operating_expenses, dec!(16000) * dec!(1.02) * dec!(1.02));
    }

    #[test]
    fn test_tenant_paid_item_does_not_change_noi() {
        let mut input = base_input();
        let before = IncomeProjector::new(&input).year(2).noi;
        input.expense_line_items.push(ExpenseLineItem {
            label: "Electric".into(),
            annual_amount: dec!(9000),
            category: ExpenseCategory::Utilities,
            payer: ExpensePayer::Tenant,
            owner_share_pct: None,
        });
        let after = IncomeProjector::new(&input).year(2).noi;
        assert_eq!(before, after);
    }

    #[test]
    fn test_management_category_is_skipped() {
        let mut input = base_input();
        input.expense_line_items.push(ExpenseLineItem {
            label: "PM company".into(),
            annual_amount: dec!(5000),
            category: ExpenseCategory::Management,
            payer: ExpensePayer::Owner,
            owner_share_pct: None,
        });
        let p = IncomeProjector::new(&input);
        assert_eq!(p.skipped_management_items(), &["PM company".to_string()]);
        assert_eq!(p.year(1).operating_expenses, dec!(16000));
    }

    #[test]
    fn test_other_income_line_items_replace_flat_amount() {
        let mut input = base_input();
        input.other_monthly_income = dec!(999);
        input.other_income_line_items = vec![
            OtherIncomeItem {
                label: "Laundry".into(),
                monthly_amount: dec!(60),
            },
            OtherIncomeItem {
                label: "Parking".into(),
                monthly_amount: dec!(40),
            },
        ];
        let y1 = IncomeProjector::new(&input).year(1);
        assert_eq!(y1.other_income, dec!(1200));
        assert_eq!(y1.gross_potential_rent, dec!(58800));
    }

    #[test]
    fn test_vacancy_on_rent_only() {
        let mut input = base_input();
        input.other_monthly_income = dec!(100);
        input.apply_vacancy_to_other_income = false;
        let y1 = IncomeProjector::new(&input).year(1);
        assert_eq!(y1.vacancy_loss, dec!(2880));
        assert_eq!(y1.effective_gross_income, dec!(58800) - dec!(2880));
    }
}
