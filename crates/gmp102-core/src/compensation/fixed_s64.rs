//! 64-bit fixed-point compensation.
//!
//! Each coefficient is handled as the integer `c[i] = mantissa[i] × 10^scale[i]`
//! with its decade exponent folded into the arithmetic. The temperature-only
//! terms are summed directly in centi-Pa. The three temperature sums fit
//! `i64` for any `i16` temperature code and mantissa; only their products with
//! the pressure code are formed in `i128`, and the total is narrowed back
//! to `i64` once, saturating.

use super::{FixedReadingS64, RawReading};
use crate::calibration::CALIBRATION_PARAMETER_COUNT;

const TEMPERATURE_LSB_PER_DEGREE: i64 = 256;

pub(super) fn compensate(
    raw: RawReading,
    mantissas: &[i16; CALIBRATION_PARAMETER_COUNT],
    scales: &[u8; CALIBRATION_PARAMETER_COUNT],
) -> FixedReadingS64 {
    let c = integer_coefficients(mantissas, scales);
    let t = raw.temperature as i64;
    let p = raw.pressure as i128;
    let t2 = t * t;

    // a0 + a1·T + a2·T², centi-Pa
    let offset = c[0] * 100 + div_round(c[1] * t, 1_000) + div_round(c[2] * t2, 100_000_000);

    // a3 + a4·T + a5·T², 1e-14 Pa per code
    let linear = c[3] * 1_000_000_000 + c[4] * t * 10_000 + div_round(c[5] * t2, 10);

    // a6 + a7·T + a8·T², 1e-22 Pa per code²
    let quadratic = c[6] * 10_000_000_000 + c[7] * t * 100_000 + c[8] * t2 * 10;

    let linear_term = div_round_wide(linear as i128 * p, 1_000_000_000_000);
    let quadratic_term = div_round_wide(quadratic as i128 * p * p, 100_000_000_000_000_000_000);
    let total = offset as i128 + linear_term + quadratic_term;

    FixedReadingS64 {
        temperature_milli_celsius: div_round(t * 1_000, TEMPERATURE_LSB_PER_DEGREE) as i32,
        pressure_centi_pa: total.clamp(i64::MIN as i128, i64::MAX as i128) as i64,
    }
}

fn integer_coefficients(
    mantissas: &[i16; CALIBRATION_PARAMETER_COUNT],
    scales: &[u8; CALIBRATION_PARAMETER_COUNT],
) -> [i64; CALIBRATION_PARAMETER_COUNT] {
    let mut c = [0i64; CALIBRATION_PARAMETER_COUNT];
    for i in 0..CALIBRATION_PARAMETER_COUNT {
        c[i] = mantissas[i] as i64 * 10i64.pow(scales[i] as u32);
    }
    c
}

/// Divides rounding half away from zero.
fn div_round(value: i64, divisor: i64) -> i64 {
    let half = divisor / 2;
    if value >= 0 {
        value.saturating_add(half) / divisor
    } else {
        value.saturating_sub(half) / divisor
    }
}

fn div_round_wide(value: i128, divisor: i128) -> i128 {
    let half = divisor / 2;
    if value >= 0 {
        (value + half) / divisor
    } else {
        (value - half) / divisor
    }
}
