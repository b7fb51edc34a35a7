//! Smart defaults for the quick screen: expense ratio, CapEx reserve, insurance and taxes
//! inferred from a handful of property descriptors.

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Percent};

/// Property tax as a share of price when neither a tax bill nor a rate is given.
pub const DEFAULT_TAX_RATE_PCT: Percent = dec!(1.2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    SingleFamily,
    /// 2-4 units
    #[default]
    Multifamily,
    /// 5+ units
    Apartment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyCondition {
    Newer,
    #[default]
    Average,
    Older,
}

/// Who carries most of the operating bills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseResponsibility {
    #[default]
    MostlyOwner,
    Mixed,
    MostlyTenant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsuranceRisk {
    Low,
    #[default]
    Moderate,
    High,
}

/// Operating expense ratio, percent of EGI.
pub fn expense_ratio_pct(
    property_type: PropertyType,
    condition: PropertyCondition,
    responsibility: ExpenseResponsibility,
) -> Percent {
    use ExpenseResponsibility::*;
    use PropertyCondition::*;
    use PropertyType::*;

    // [mostly owner, mixed, mostly tenant]
    let row = match (property_type, condition) {
        (SingleFamily, Newer) => [dec!(35), dec!(30), dec!(22)],
        (SingleFamily, Average) => [dec!(42), dec!(35), dec!(28)],
        (SingleFamily, Older) => [dec!(52), dec!(42), dec!(35)],
        (Multifamily, Newer) => [dec!(40), dec!(33), dec!(25)],
        (Multifamily, Average) => [dec!(48), dec!(40), dec!(32)],
        (Multifamily, Older) => [dec!(55), dec!(48), dec!(38)],
        (Apartment, Newer) => [dec!(38), dec!(32), dec!(25)],
        (Apartment, Average) => [dec!(45), dec!(38), dec!(30)],
        (Apartment, Older) => [dec!(52), dec!(45), dec!(35)],
    };

    match responsibility {
        MostlyOwner => row[0],
        Mixed => row[1],
        MostlyTenant => row[2],
    }
}

/// CapEx reserve, percent of EGI.
pub fn capex_reserve_pct(property_type: PropertyType, condition: PropertyCondition) -> Percent {
    match (property_type, condition) {
        (PropertyType::SingleFamily, PropertyCondition::Newer) => dec!(3),
        (PropertyType::SingleFamily, PropertyCondition::Average) => dec!(5),
        (PropertyType::SingleFamily, PropertyCondition::Older) => dec!(8),
        (PropertyType::Multifamily, PropertyCondition::Newer) => dec!(4),
        (PropertyType::Multifamily, PropertyCondition::Average) => dec!(6),
        (PropertyType::Multifamily, PropertyCondition::Older) => dec!(9),
        (PropertyType::Apartment, PropertyCondition::Newer) => dec!(4),
        (PropertyType::Apartment, PropertyCondition::Average) => dec!(6),
        (PropertyType::Apartment, PropertyCondition::Older) => dec!(10),
    }
}

/// Annual insurance premium per unit.
pub fn insurance_per_unit(risk: InsuranceRisk) -> Money {
    match risk {
        InsuranceRisk::Low => dec!(600),
        InsuranceRisk::Moderate => dec!(900),
        InsuranceRisk::High => dec!(1400),
    }
}

/// Annual property tax: the bill if known, else rate × price, else 1.2% of price.
pub fn estimate_taxes(
    purchase_price: Money,
    annual_taxes: Option<Money>,
    tax_rate_pct: Option<Percent>,
) -> Money {
    match (annual_taxes, tax_rate_pct) {
        (Some(bill), _) => bill,
        (None, Some(rate)) => purchase_price * rate / dec!(100),
        (None, None) => purchase_price * DEFAULT_TAX_RATE_PCT / dec!(100),
    }
}
