use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use dealsnap_core::quick::{
    self, ExpenseResponsibility, InsuranceRisk, PropertyCondition, PropertyType, QuickModeInputs,
};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PropertyTypeArg {
    SingleFamily,
    Multifamily,
    Apartment,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ConditionArg {
    Newer,
    Average,
    Older,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ResponsibilityArg {
    MostlyOwner,
    Mixed,
    MostlyTenant,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum InsuranceArg {
    Low,
    Moderate,
    High,
}

/// Arguments for the DealSnap quick screen
#[derive(Args)]
pub struct SnapArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Number of units
    #[arg(long)]
    pub units: Option<u32>,

    /// Average monthly rent per unit
    #[arg(long)]
    pub rent: Option<Decimal>,

    /// Asking or offer price
    #[arg(long)]
    pub price: Option<Decimal>,

    #[arg(long, value_enum, default_value = "multifamily")]
    pub property_type: PropertyTypeArg,

    #[arg(long, value_enum, default_value = "average")]
    pub property_condition: ConditionArg,

    #[arg(long, value_enum, default_value = "mostly-owner")]
    pub expense_responsibility: ResponsibilityArg,

    #[arg(long, value_enum, default_value = "moderate")]
    pub insurance_risk: InsuranceArg,

    /// Vacancy, percent of gross rent
    #[arg(long, default_value = "8")]
    pub vacancy_pct: Decimal,

    #[arg(long, default_value = "25")]
    pub down_payment_pct: Decimal,

    #[arg(long, default_value = "7")]
    pub interest_rate_pct: Decimal,

    #[arg(long, default_value_t = 25)]
    pub amort_years: u32,

    /// Known annual property tax bill
    #[arg(long)]
    pub annual_taxes: Option<Decimal>,

    /// Property tax as a percent of price
    #[arg(long)]
    pub tax_rate_pct: Option<Decimal>,

    /// Target cap rate for the reverse-engineered price and rent
    #[arg(long, default_value = "8")]
    pub target_cap_rate_pct: Decimal,

    /// Monthly rent increase per unit in dollars (wins over --rent-lift-pct)
    #[arg(long, allow_hyphen_values = true)]
    pub rent_lift_amount: Option<Decimal>,

    /// Monthly rent increase as a percent of current rent
    #[arg(long, allow_hyphen_values = true)]
    pub rent_lift_pct: Option<Decimal>,
}

pub fn run_snap(args: SnapArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let snap_input: QuickModeInputs = match input::load(args.input.as_deref())? {
        Some(record) => record,
        None => from_flags(&args)?,
    };

    let result = quick::snap_deal(&snap_input)?;
    Ok(serde_json::to_value(result)?)
}

fn from_flags(args: &SnapArgs) -> Result<QuickModeInputs, Box<dyn std::error::Error>> {
    let units = args.units.ok_or("--units is required (or provide --input)")?;
    let rent = args.rent.ok_or("--rent is required (or provide --input)")?;
    let price = args.price.ok_or("--price is required (or provide --input)")?;

    Ok(QuickModeInputs {
        property_name: None,
        units,
        avg_monthly_rent: rent,
        purchase_price: price,
        property_type: match args.property_type {
            PropertyTypeArg::SingleFamily => PropertyType::SingleFamily,
            PropertyTypeArg::Multifamily => PropertyType::Multifamily,
            PropertyTypeArg::Apartment => PropertyType::Apartment,
        },
        property_condition: match args.property_condition {
            ConditionArg::Newer => PropertyCondition::Newer,
            ConditionArg::Average => PropertyCondition::Average,
            ConditionArg::Older => PropertyCondition::Older,
        },
        vacancy_pct: args.vacancy_pct,
        expense_responsibility: match args.expense_responsibility {
            ResponsibilityArg::MostlyOwner => ExpenseResponsibility::MostlyOwner,
            ResponsibilityArg::Mixed => ExpenseResponsibility::Mixed,
            ResponsibilityArg::MostlyTenant => ExpenseResponsibility::MostlyTenant,
        },
        insurance_risk: match args.insurance_risk {
            InsuranceArg::Low => InsuranceRisk::Low,
            InsuranceArg::Moderate => InsuranceRisk::Moderate,
            InsuranceArg::High => InsuranceRisk::High,
        },
        down_payment_pct: args.down_payment_pct,
        interest_rate_pct: args.interest_rate_pct,
        amort_years: args.amort_years,
        annual_taxes: args.annual_taxes,
        tax_rate_pct: args.tax_rate_pct,
        rent_lift_amount: args.rent_lift_amount,
        rent_lift_pct: args.rent_lift_pct,
        target_cap_rate_pct: args.target_cap_rate_pct,
    })
}
