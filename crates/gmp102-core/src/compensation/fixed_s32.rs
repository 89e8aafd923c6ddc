//! 32-bit fixed-point compensation for targets without cheap 64-bit math.
//!
//! Works like the 64-bit path at coarser scales: the offset terms land in
//! Pa, the linear coefficient in 1e-7 Pa per code and the quadratic one in
//! 1e-14 Pa per code². Every step saturates, so out-of-range codes clamp
//! instead of wrapping.

use super::{FixedReadingS32, RawReading};
use crate::calibration::CALIBRATION_PARAMETER_COUNT;

const TEMPERATURE_LSB_PER_DEGREE: i32 = 256;

pub(super) fn compensate(
    raw: RawReading,
    mantissas: &[i16; CALIBRATION_PARAMETER_COUNT],
    scales: &[u8; CALIBRATION_PARAMETER_COUNT],
) -> FixedReadingS32 {
    let c = integer_coefficients(mantissas, scales);
    let t = raw.temperature as i32;
    let p = raw.pressure;
    // |T| <= 2^15, so T² fits
    let t2 = t * t;
    let t2_e5 = t2 / 100_000;
    let t2_e4 = t2 / 10_000;

    let offset = c[0]
        .saturating_add(mul_div_pow10(c[1], t, 3, 5))
        .saturating_add(mul_div_pow10(c[2], t2_e5, 3, 5));

    let linear = c[3]
        .saturating_mul(100)
        .saturating_add(mul_div_pow10(c[4], t, 3, 3))
        .saturating_add(mul_div_pow10(c[5], t2_e4, 3, 4));

    let quadratic = c[6]
        .saturating_mul(100)
        .saturating_add(mul_div_pow10(c[7], t, 3, 3))
        .saturating_add(mul_div_pow10(c[8], t2_e4, 3, 3));

    let linear_term = mul_div_pow10(p, linear, 4, 7);
    let quadratic_term = mul_div_pow10(p, mul_div_pow10(p, quadratic, 4, 7), 4, 7);

    FixedReadingS32 {
        temperature_centi_celsius: div_round(t * 100, TEMPERATURE_LSB_PER_DEGREE),
        pressure_pa: offset
            .saturating_add(linear_term)
            .saturating_add(quadratic_term),
    }
}

fn integer_coefficients(
    mantissas: &[i16; CALIBRATION_PARAMETER_COUNT],
    scales: &[u8; CALIBRATION_PARAMETER_COUNT],
) -> [i32; CALIBRATION_PARAMETER_COUNT] {
    let mut c = [0i32; CALIBRATION_PARAMETER_COUNT];
    for i in 0..CALIBRATION_PARAMETER_COUNT {
        c[i] = mantissas[i] as i32 * 10i32.pow(scales[i] as u32);
    }
    c
}

fn div_round(value: i32, divisor: i32) -> i32 {
    let half = divisor / 2;
    if value >= 0 {
        value.saturating_add(half) / divisor
    } else {
        value.saturating_sub(half) / divisor
    }
}

/// `a × b / 10^n`, splitting `a` at `10^split` to keep products in range.
fn mul_div_pow10(a: i32, b: i32, split: u32, n: u32) -> i32 {
    let unit = 10i32.pow(split);
    let high = div_round((a / unit).saturating_mul(b), 10i32.pow(n - split));
    let low = div_round((a % unit).saturating_mul(b), 10i32.pow(n));
    high.saturating_add(low)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::fixtures::{REFERENCE_MANTISSAS, REFERENCE_SCALES};

    #[test]
    fn test_reference_vectors() {
        let cases = [
            ((6_400, 6_589_632), (2_500, 101_324)),
            ((0, 0), (0, 31_000)),
            ((-10_240, 2_000_000), (-4_000, 60_849)),
            ((21_760, 7_800_000), (8_500, 92_479)),
            ((2_560, 4_000_000), (1_000, 76_404)),
            ((256, -1_000), (100, 30_849)),
        ];

        for ((t, p), (centi_celsius, pa)) in cases {
            let reading = compensate(
                RawReading::new(t, p),
                &REFERENCE_MANTISSAS,
                &REFERENCE_SCALES,
            );
            assert_eq!(reading.temperature_centi_celsius, centi_celsius, "T for {t}/{p}");
            assert_eq!(reading.pressure_pa, pa, "P for {t}/{p}");
        }
    }

    #[test]
    fn test_most_negative_mantissas_saturate() {
        let reading = compensate(
            RawReading::new(i16::MIN, i32::MIN),
            &[i16::MIN; 9],
            &[3; 9],
        );

        assert_eq!(reading.temperature_centi_celsius, -12_800);
    }

    #[test]
    fn test_mul_div_pow10_rounds() {
        assert_eq!(mul_div_pow10(123_456_789, 1_000, 3, 5), 1_234_568);
        assert_eq!(mul_div_pow10(-1_234_567, 3, 3, 4), -370);
        assert_eq!(mul_div_pow10(i32::MAX, i32::MAX, 4, 7), 2_147_697);
    }
}
