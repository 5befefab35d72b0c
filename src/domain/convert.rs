//! Fixed-point conversion between display values and protocol integers.
//!
//! Token amounts live on-chain in the token's smallest unit and
//! percentage odds are implied probabilities scaled by 10^20. All
//! arithmetic here is done on the decimal mantissa with `U256` so no
//! precision is lost at either scale; `f64` only appears as the final
//! display step, produced by parsing the exact decimal string.

use std::str::FromStr;

use alloy::primitives::U256;
use rust_decimal::Decimal;

use super::errors::{Result, SportxError};

/// Decimal places of the percentage odds fixed-point space.
pub const ODDS_PRECISION: u32 = 20;

/// Decimal places of the protocol's base tokens (DAI, WETH).
pub const DEFAULT_TOKEN_DECIMALS: u32 = 18;

/// Token amount in the token's smallest unit.
pub type TokenAmount = U256;

/// Implied probability scaled by 10^20, always below [`odds_scale`].
pub type PercentageOdds = U256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rounding {
    Truncate,
    HalfUp,
}

/// 10^20, the value representing probability 1.
pub fn odds_scale() -> U256 {
    pow10(ODDS_PRECISION)
}

fn pow10(exp: u32) -> U256 {
    U256::from(10u64).pow(U256::from(exp))
}

fn checked_pow10(exp: u32) -> Option<U256> {
    U256::from(10u64).checked_pow(U256::from(exp))
}

/// Move an unsigned mantissa from `from` decimal places to `to` decimal places.
fn rescale(mantissa: u128, from: u32, to: u32, rounding: Rounding) -> Option<U256> {
    let mantissa = U256::from(mantissa);
    if to >= from {
        return mantissa.checked_mul(checked_pow10(to - from)?);
    }
    let divisor = checked_pow10(from - to)?;
    let quotient = mantissa / divisor;
    let remainder = mantissa % divisor;
    match rounding {
        Rounding::Truncate => Some(quotient),
        Rounding::HalfUp if remainder * U256::from(2u8) >= divisor => {
            quotient.checked_add(U256::from(1u8))
        }
        Rounding::HalfUp => Some(quotient),
    }
}

/// Render `value / 10^decimals` as an exact decimal string.
fn format_fixed(value: U256, decimals: u32) -> String {
    if decimals == 0 {
        return value.to_string();
    }
    let unit = pow10(decimals);
    let whole = value / unit;
    let frac = value % unit;
    format!(
        "{whole}.{:0>width$}",
        frac.to_string(),
        width = decimals as usize
    )
}

fn decimal_from_f64(value: f64) -> Option<Decimal> {
    // f64 Display is the shortest round-tripping representation.
    Decimal::from_str(&value.to_string()).ok()
}

/// Convert a display amount into the token's smallest unit, truncating
/// any digits beyond `decimals`.
///
/// # Errors
/// `InvalidAmount` when `display` is negative or the result does not fit
/// in 256 bits.
pub fn to_protocol_amount(display: Decimal, decimals: u32) -> Result<TokenAmount> {
    if display.is_sign_negative() && !display.is_zero() {
        return Err(SportxError::InvalidAmount(format!(
            "{display} is negative"
        )));
    }
    rescale(
        display.mantissa().unsigned_abs(),
        display.scale(),
        decimals,
        Rounding::Truncate,
    )
    .ok_or_else(|| {
        SportxError::InvalidAmount(format!("{display} overflows at {decimals} decimals"))
    })
}

/// Float entry point for [`to_protocol_amount`].
///
/// # Errors
/// `InvalidAmount` on NaN, infinities and negative values.
pub fn to_protocol_amount_f64(display: f64, decimals: u32) -> Result<TokenAmount> {
    if !display.is_finite() {
        return Err(SportxError::InvalidAmount(format!(
            "{display} is not finite"
        )));
    }
    let value = decimal_from_f64(display).ok_or_else(|| {
        SportxError::InvalidAmount(format!("{display} is out of decimal range"))
    })?;
    to_protocol_amount(value, decimals)
}

/// Convert a protocol amount back into display units. Informational only.
pub fn to_display_amount(amount: TokenAmount, decimals: u32) -> f64 {
    format_fixed(amount, decimals).parse().unwrap_or(f64::NAN)
}

/// Scale a probability in `[0, 1)` into protocol percentage odds,
/// rounding half-up at the 20th decimal place.
///
/// # Errors
/// `InvalidOdds` when the probability is outside `[0, 1)`.
pub fn to_protocol_odds(probability: Decimal) -> Result<PercentageOdds> {
    if (probability.is_sign_negative() && !probability.is_zero()) || probability >= Decimal::ONE {
        return Err(SportxError::InvalidOdds(format!(
            "{probability} is outside [0, 1)"
        )));
    }
    let odds = rescale(
        probability.mantissa().unsigned_abs(),
        probability.scale(),
        ODDS_PRECISION,
        Rounding::HalfUp,
    )
    .filter(|odds| *odds < odds_scale())
    .ok_or_else(|| SportxError::InvalidOdds(format!("{probability} rounds to 1")))?;
    Ok(odds)
}

/// Float entry point for [`to_protocol_odds`].
///
/// # Errors
/// `InvalidOdds` on NaN, infinities and values outside `[0, 1)`.
pub fn to_protocol_odds_f64(probability: f64) -> Result<PercentageOdds> {
    if !probability.is_finite() {
        return Err(SportxError::InvalidOdds(format!(
            "{probability} is not finite"
        )));
    }
    let value = decimal_from_f64(probability).ok_or_else(|| {
        SportxError::InvalidOdds(format!("{probability} is out of decimal range"))
    })?;
    to_protocol_odds(value)
}

/// Convert protocol percentage odds into a display probability.
///
/// The quotient is formed exactly before the single rounding step to
/// `f64`, which keeps every significant digit a double can hold.
pub fn from_protocol_odds(value: PercentageOdds) -> f64 {
    format_fixed(value, ODDS_PRECISION)
        .parse()
        .unwrap_or(f64::NAN)
}

/// [`from_protocol_odds`] for the decimal-string form the relayer emits.
///
/// # Errors
/// `InvalidOdds` when `value` is not an unsigned integer string.
pub fn from_protocol_odds_str(value: &str) -> Result<f64> {
    let odds = U256::from_str(value.trim())
        .map_err(|e| SportxError::InvalidOdds(format!("{value:?}: {e}")))?;
    Ok(from_protocol_odds(odds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn units(whole: u64, decimals: u32) -> U256 {
        U256::from(whole) * pow10(decimals)
    }

    #[test]
    fn test_to_protocol_amount_whole_tokens() {
        assert_eq!(to_protocol_amount(dec!(10), 18).unwrap(), units(10, 18));
    }

    #[test]
    fn test_to_protocol_amount_truncates() {
        assert_eq!(
            to_protocol_amount(dec!(1.23456789), 6).unwrap(),
            U256::from(1_234_567u64)
        );
    }

    #[test]
    fn test_to_protocol_amount_rejects_negative() {
        let err = to_protocol_amount(dec!(-0.01), 18).unwrap_err();
        assert!(matches!(err, SportxError::InvalidAmount(_)));
    }

    #[test]
    fn test_to_protocol_amount_f64_rejects_non_finite() {
        assert!(to_protocol_amount_f64(f64::NAN, 18).is_err());
        assert!(to_protocol_amount_f64(f64::INFINITY, 18).is_err());
        assert_eq!(to_protocol_amount_f64(10.0, 18).unwrap(), units(10, 18));
    }

    #[test]
    fn test_to_display_amount() {
        let amount = U256::from(1_500_000_000_000_000_000u128);
        assert!((to_display_amount(amount, 18) - 1.5).abs() < f64::EPSILON);
        assert!((to_display_amount(U256::from(7u8), 0) - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_to_protocol_odds_half() {
        assert_eq!(to_protocol_odds(dec!(0.5)).unwrap(), units(5, 19));
        assert_eq!(to_protocol_odds(Decimal::ZERO).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_to_protocol_odds_rounds_half_up() {
        // 22 decimal places: the last two digits fall below the protocol scale.
        assert_eq!(
            to_protocol_odds(dec!(0.0000000000000000000049)).unwrap(),
            U256::ZERO
        );
        assert_eq!(
            to_protocol_odds(dec!(0.0000000000000000000050)).unwrap(),
            U256::from(1u8)
        );
    }

    #[test]
    fn test_to_protocol_odds_rejects_out_of_range() {
        assert!(matches!(
            to_protocol_odds(Decimal::ONE),
            Err(SportxError::InvalidOdds(_))
        ));
        assert!(matches!(
            to_protocol_odds(dec!(-0.1)),
            Err(SportxError::InvalidOdds(_))
        ));
        assert!(to_protocol_odds_f64(f64::NAN).is_err());
    }

    #[test]
    fn test_from_protocol_odds_preserves_precision() {
        let odds = from_protocol_odds_str("88985727650227679586").unwrap();
        assert_eq!(odds, 0.8898572765022768);
    }

    #[test]
    fn test_from_protocol_odds_str_rejects_garbage() {
        assert!(matches!(
            from_protocol_odds_str("0.5e20"),
            Err(SportxError::InvalidOdds(_))
        ));
    }

    #[test]
    fn test_odds_round_trip_half() {
        let odds = to_protocol_odds_f64(0.5).unwrap();
        assert_eq!(from_protocol_odds(odds), 0.5);
    }
}
