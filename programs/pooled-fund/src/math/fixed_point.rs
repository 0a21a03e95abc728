use anchor_lang::prelude::*;

use crate::constants::{LN_2, MAX_EXP_INPUT, MIN_EXP_INPUT, WAD};
use crate::errors::FundError;

/// Direction in which a fixed-point division is rounded.
///
/// Conversions always round against the caller: down for what the fund pays
/// out, up for what the fund asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    Down,
    Up,
}

/// (a * b) / denominator with the requested rounding
pub fn mul_div(a: u128, b: u128, denominator: u128, rounding: Rounding) -> Result<u128> {
    require!(denominator != 0, FundError::DivisionByZero);
    let product = a.checked_mul(b).ok_or(FundError::MathOverflow)?;
    let quotient = product / denominator;
    match rounding {
        Rounding::Up if product % denominator != 0 => quotient
            .checked_add(1)
            .ok_or(FundError::MathOverflow.into()),
        _ => Ok(quotient),
    }
}

/// Multiply two WAD values: (a * b) / WAD, rounded down.
///
/// The larger operand is split into whole and fractional WADs so the
/// product never has to fit a u128 on its own; only the result does.
pub fn wad_mul(a: u128, b: u128) -> Result<u128> {
    let (small, large) = if a <= b { (a, b) } else { (b, a) };
    let whole = small
        .checked_mul(large / WAD)
        .ok_or(FundError::MathOverflow)?;
    let fraction = mul_div(small, large % WAD, WAD, Rounding::Down)?;
    whole
        .checked_add(fraction)
        .ok_or(FundError::MathOverflow.into())
}

/// Divide two WAD values: (a * WAD) / b
pub fn wad_div(a: u128, b: u128) -> Result<u128> {
    mul_div(a, WAD, b, Rounding::Down)
}

/// Narrow a u128 intermediate back to a token amount
pub fn to_u64(value: u128) -> Result<u64> {
    u64::try_from(value).map_err(|_| FundError::MathOverflow.into())
}

/// e^x for a signed WAD exponent, returned in WAD.
///
/// x is split into k*ln(2) + r with |r| <= ln(2)/2; e^r comes from its Taylor
/// series and the result is shifted by k. Inputs above `MAX_EXP_INPUT` would
/// not fit an i128 and are rejected.
pub fn exp_wad(x: i128) -> Result<i128> {
    if x < MIN_EXP_INPUT {
        return Ok(0);
    }
    require!(x <= MAX_EXP_INPUT, FundError::ExponentOutOfRange);

    let half_ln_2 = LN_2 / 2;
    let k = if x >= 0 {
        (x + half_ln_2) / LN_2
    } else {
        (x - half_ln_2) / LN_2
    };
    let r = x - k * LN_2;

    let wad = WAD as i128;
    let mut term = wad;
    let mut sum = wad;
    for n in 1..=24i128 {
        term = term * r / wad / n;
        if term == 0 {
            break;
        }
        sum += term;
    }

    if k >= 0 {
        sum.checked_mul(1i128 << k).ok_or(FundError::MathOverflow.into())
    } else {
        Ok(sum >> (-k))
    }
}

/// Natural logarithm of a positive WAD value, returned in WAD.
///
/// x is normalised to y * 2^k with y in [1, 2); ln(y) uses
/// 2 * atanh((y - 1) / (y + 1)), which converges quickly on that range.
pub fn ln_wad(x: i128) -> Result<i128> {
    require!(x > 0, FundError::ExponentOutOfRange);
    let wad = WAD as i128;

    let bits = 127 - x.leading_zeros() as i128;
    let wad_bits = 127 - wad.leading_zeros() as i128;
    let mut k = bits - wad_bits;
    let mut y = if k >= 0 { x >> k } else { x << (-k) };
    if y < wad {
        y <<= 1;
        k -= 1;
    }
    if y >= 2 * wad {
        y >>= 1;
        k += 1;
    }

    let z = (y - wad) * wad / (y + wad);
    let z_squared = z * z / wad;
    let mut power = z;
    let mut series = 0i128;
    let mut denominator = 1i128;
    while power != 0 {
        series += power / denominator;
        power = power * z_squared / wad;
        denominator += 2;
    }

    Ok(k * LN_2 + 2 * series)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wad_f64(value: i128) -> f64 {
        value as f64 / WAD as f64
    }

    fn assert_close(actual: i128, expected: f64, relative: f64) {
        let actual = wad_f64(actual);
        let error = ((actual - expected) / expected).abs();
        assert!(
            error <= relative,
            "actual {actual} expected {expected} error {error}"
        );
    }

    #[test]
    fn test_mul_div_rounding() {
        assert_eq!(mul_div(10, 1, 3, Rounding::Down).unwrap(), 3);
        assert_eq!(mul_div(10, 1, 3, Rounding::Up).unwrap(), 4);
        // Exact results are not bumped
        assert_eq!(mul_div(9, 1, 3, Rounding::Up).unwrap(), 3);
    }

    #[test]
    fn test_mul_div_errors() {
        assert!(mul_div(1, 1, 0, Rounding::Down).is_err());
        assert!(mul_div(u128::MAX, 2, 1, Rounding::Down).is_err());
    }

    #[test]
    fn test_wad_mul_beyond_u128_product() {
        // 1e22 * 5e17 does not fit a u128 but the result does
        let growth = 10_000 * WAD;
        assert_eq!(wad_mul(growth, WAD / 2).unwrap(), 5_000 * WAD);
        assert_eq!(wad_mul(WAD / 2, growth).unwrap(), 5_000 * WAD);
        assert_eq!(wad_mul(3, WAD / 2).unwrap(), 1);
        assert!(wad_mul(u128::MAX, 2 * WAD).is_err());
    }

    #[test]
    fn test_exp_known_values() {
        assert_eq!(exp_wad(0).unwrap(), WAD as i128);
        assert_close(exp_wad(WAD as i128).unwrap(), std::f64::consts::E, 1e-12);
        assert_close(exp_wad(-(WAD as i128)).unwrap(), 1.0 / std::f64::consts::E, 1e-12);
        assert_close(exp_wad(10 * WAD as i128).unwrap(), 10f64.exp(), 1e-12);
        assert_close(exp_wad(WAD as i128 / 100).unwrap(), 0.01f64.exp(), 1e-15);
    }

    #[test]
    fn test_exp_domain() {
        assert!(exp_wad(MAX_EXP_INPUT).is_ok());
        assert!(exp_wad(MAX_EXP_INPUT + 1).is_err());
        assert_eq!(exp_wad(MIN_EXP_INPUT - 1).unwrap(), 0);
    }

    #[test]
    fn test_ln_known_values() {
        assert_eq!(ln_wad(WAD as i128).unwrap(), 0);
        assert_close(ln_wad(2 * WAD as i128).unwrap(), std::f64::consts::LN_2, 1e-15);
        assert_close(ln_wad(WAD as i128 / 2).unwrap(), -std::f64::consts::LN_2, 1e-15);
        assert_close(ln_wad(99 * WAD as i128 / 100).unwrap(), 0.99f64.ln(), 1e-12);
        assert_close(ln_wad(1_000_000 * WAD as i128).unwrap(), 1e6f64.ln(), 1e-12);
    }

    #[test]
    fn test_ln_rejects_non_positive() {
        assert!(ln_wad(0).is_err());
        assert!(ln_wad(-1).is_err());
    }

    #[test]
    fn test_exp_inverts_ln() {
        let x = 1_234_567_890_000_000_000i128;
        let round_trip = exp_wad(ln_wad(x).unwrap()).unwrap();
        assert_close(round_trip, wad_f64(x), 1e-12);
    }
}
