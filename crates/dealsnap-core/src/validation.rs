//! Numeric-domain checks shared by both calculation paths.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::DealSnapError;
use crate::DealSnapResult;

/// Ceiling on any single money input (one trillion). Keeps every projected
/// figure inside `Decimal` range.
pub(crate) const MAX_AMOUNT: Decimal = dec!(1000000000000);

/// Ceiling on the unit count of a single property.
pub(crate) const MAX_UNITS: u32 = 10_000;

pub(crate) fn non_negative(field: &str, value: Decimal) -> DealSnapResult<()> {
    if value < Decimal::ZERO {
        return Err(DealSnapError::invalid(field, "Must not be negative"));
    }
    Ok(())
}

pub(crate) fn in_range(field: &str, value: Decimal, min: Decimal, max: Decimal) -> DealSnapResult<()> {
    if value < min || value > max {
        return Err(DealSnapError::invalid(
            field,
            format!("Must be between {min} and {max} (got {value})"),
        ));
    }
    Ok(())
}

pub(crate) fn years_in_range(field: &str, value: u32, min: u32, max: u32) -> DealSnapResult<()> {
    if value < min || value > max {
        return Err(DealSnapError::invalid(
            field,
            format!("Must be between {min} and {max} years (got {value})"),
        ));
    }
    Ok(())
}

/// Non-negative money amount no larger than [`MAX_AMOUNT`].
pub(crate) fn amount(field: &str, value: Decimal) -> DealSnapResult<()> {
    non_negative(field, value)?;
    if value > MAX_AMOUNT {
        return Err(DealSnapError::invalid(
            field,
            format!("Must not exceed {MAX_AMOUNT} (got {value})"),
        ));
    }
    Ok(())
}

pub(crate) fn unit_count(units: u32) -> DealSnapResult<()> {
    if units == 0 || units > MAX_UNITS {
        return Err(DealSnapError::invalid(
            "units",
            format!("Property must have between 1 and {MAX_UNITS} units"),
        ));
    }
    Ok(())
}
