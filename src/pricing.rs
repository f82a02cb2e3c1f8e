//! Line-item pricing
//!
//! Money is kept as exact `Decimal` values through every calculation and only
//! rounded to the smallest currency unit when it is persisted or displayed.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{AppError, AppResult};

/// Decimal places of the smallest currency unit
pub const MONEY_SCALE: u32 = 2;

/// Largest quantity accepted on a single line
pub const MAX_QUANTITY: i32 = 10_000;

/// Largest rate an equipment record can hold, 9 999 999 999.99 (`NUMERIC(12, 2)`)
pub fn max_rate() -> Decimal {
    Decimal::new(999_999_999_999, MONEY_SCALE)
}

/// Largest stored total or deposit, 999 999 999 999.99 (`NUMERIC(14, 2)`)
pub fn max_amount() -> Decimal {
    Decimal::new(99_999_999_999_999, MONEY_SCALE)
}

/// One priced line: `subtotal = rate * quantity`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub rate: Decimal,
    pub quantity: i32,
    pub subtotal: Decimal,
}

/// Result of pricing a list of lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub lines: Vec<PricedLine>,
    pub total: Decimal,
}

/// Price `(rate, quantity)` pairs. The total is the exact sum of subtotals, so
/// it does not depend on the order of the lines.
///
/// Fails with a validation error when a subtotal or the total does not fit
/// the stored amount range.
pub fn price_lines<I>(lines: I) -> AppResult<PriceBreakdown>
where
    I: IntoIterator<Item = (Decimal, i32)>,
{
    let mut priced = Vec::new();
    let mut total = Decimal::ZERO;
    for (rate, quantity) in lines {
        let subtotal = rate
            .checked_mul(Decimal::from(quantity))
            .ok_or_else(amount_too_large)?;
        total = total.checked_add(subtotal).ok_or_else(amount_too_large)?;
        priced.push(PricedLine {
            rate,
            quantity,
            subtotal,
        });
    }
    ensure_amount("total_amount", round_money(total))?;

    Ok(PriceBreakdown {
        lines: priced,
        total,
    })
}

fn amount_too_large() -> AppError {
    AppError::Validation(format!("Total amount exceeds {}", max_amount()))
}

/// Round to the currency unit, halves away from zero
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Reject negative monetary amounts
pub fn ensure_non_negative(field: &str, value: Decimal) -> AppResult<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AppError::Validation(format!("{} must not be negative", field)));
    }
    Ok(())
}

/// Rates are non-negative and fit an equipment rate column
pub fn ensure_rate(field: &str, value: Decimal) -> AppResult<()> {
    ensure_non_negative(field, value)?;
    if round_money(value) > max_rate() {
        return Err(AppError::Validation(format!(
            "{} must not exceed {}",
            field,
            max_rate()
        )));
    }
    Ok(())
}

/// Totals and deposits are non-negative and fit an amount column
pub fn ensure_amount(field: &str, value: Decimal) -> AppResult<()> {
    ensure_non_negative(field, value)?;
    if value > max_amount() {
        return Err(AppError::Validation(format!(
            "{} must not exceed {}",
            field,
            max_amount()
        )));
    }
    Ok(())
}

/// Line quantities run from one to [`MAX_QUANTITY`]
pub fn ensure_quantity(quantity: i32) -> AppResult<()> {
    if !(1..=MAX_QUANTITY).contains(&quantity) {
        return Err(AppError::Validation(format!(
            "Quantity must be between 1 and {} (got {})",
            MAX_QUANTITY, quantity
        )));
    }
    Ok(())
}

/// Parse a loosely typed amount (JSON number or numeric string).
/// Anything else yields `None`.
pub fn parse_amount(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Number(n) => {
            let text = n.to_string();
            text.parse::<Decimal>()
                .ok()
                .or_else(|| Decimal::from_scientific(&text).ok())
        }
        serde_json::Value::String(s) => s.trim().parse::<Decimal>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_subtotals_and_total() {
        let breakdown = price_lines([(dec("2500.00"), 2), (dec("1200.50"), 3)]).unwrap();
        assert_eq!(breakdown.lines[0].subtotal, dec("5000.00"));
        assert_eq!(breakdown.lines[1].subtotal, dec("3601.50"));
        assert_eq!(breakdown.total, dec("8601.50"));
    }

    #[test]
    fn test_total_is_order_independent() {
        let lines = vec![
            (dec("0.10"), 3),
            (dec("1999.99"), 7),
            (dec("0.01"), 1),
            (dec("150.25"), 4),
        ];
        let forward = price_lines(lines.clone()).unwrap().total;
        let mut reversed = lines.clone();
        reversed.reverse();
        let mut rotated = lines;
        rotated.rotate_left(2);

        assert_eq!(forward, price_lines(reversed).unwrap().total);
        assert_eq!(forward, price_lines(rotated).unwrap().total);
        assert_eq!(forward, dec("14601.24"));
    }

    #[test]
    fn test_no_float_drift() {
        // 0.1 * 3 is not 0.3 in binary floating point
        let breakdown = price_lines([(dec("0.1"), 3)]).unwrap();
        assert_eq!(breakdown.total, dec("0.3"));
    }

    #[test]
    fn test_empty_lines() {
        let breakdown = price_lines(Vec::<(Decimal, i32)>::new()).unwrap();
        assert!(breakdown.lines.is_empty());
        assert_eq!(breakdown.total, Decimal::ZERO);
    }

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(dec("10.005")), dec("10.01"));
        assert_eq!(round_money(dec("10.004")), dec("10.00"));
        assert_eq!(round_money(dec("-10.005")), dec("-10.01"));
    }

    #[test]
    fn test_guards() {
        assert!(ensure_non_negative("rate", dec("0")).is_ok());
        assert!(ensure_non_negative("rate", dec("12.5")).is_ok());
        assert!(matches!(
            ensure_non_negative("rate", dec("-0.01")),
            Err(AppError::Validation(_))
        ));
        assert!(ensure_quantity(1).is_ok());
        assert!(matches!(ensure_quantity(0), Err(AppError::Validation(_))));
        assert!(matches!(ensure_quantity(-3), Err(AppError::Validation(_))));
        assert!(ensure_quantity(MAX_QUANTITY).is_ok());
        assert!(matches!(
            ensure_quantity(MAX_QUANTITY + 1),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_rate_and_amount_bounds() {
        assert!(ensure_rate("daily_rate", dec("9999999999.99")).is_ok());
        assert!(matches!(
            ensure_rate("daily_rate", dec("10000000000")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            ensure_rate("daily_rate", dec("10000000000000000000000000000")),
            Err(AppError::Validation(_))
        ));
        assert!(ensure_amount("security_deposit", dec("999999999999.99")).is_ok());
        assert!(matches!(
            ensure_amount("security_deposit", dec("1000000000000")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_overflow_is_a_validation_error() {
        // Would overflow the 96-bit mantissa
        assert!(matches!(
            price_lines([(dec("10000000000000000000000000000"), 100)]),
            Err(AppError::Validation(_))
        ));
        // Fits in a Decimal, not in the stored column
        assert!(matches!(
            price_lines([(max_rate(), MAX_QUANTITY)]),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            price_lines([(max_rate(), 60), (max_rate(), 60)]),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(&json!(5000)), Some(dec("5000")));
        assert_eq!(parse_amount(&json!(12.5)), Some(dec("12.5")));
        assert_eq!(parse_amount(&json!(" 750.25 ")), Some(dec("750.25")));
        assert_eq!(parse_amount(&json!("abc")), None);
        assert_eq!(parse_amount(&json!(null)), None);
        assert_eq!(parse_amount(&json!(true)), None);
    }
}
