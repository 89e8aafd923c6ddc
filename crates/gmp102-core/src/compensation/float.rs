use super::{FloatReading, RawReading};
use crate::calibration::CALIBRATION_PARAMETER_COUNT;

const TEMPERATURE_LSB_PER_DEGREE: f32 = 256.0;

/// Evaluates the compensation polynomial in `f32`.
pub(super) fn compensate(
    raw: RawReading,
    a: &[f32; CALIBRATION_PARAMETER_COUNT],
) -> FloatReading {
    let t = raw.temperature as f32;
    let p = raw.pressure as f32;

    let pressure_pa = a[0]
        + a[1] * t
        + a[2] * t * t
        + a[3] * p
        + a[4] * t * p
        + a[5] * t * t * p
        + a[6] * p * p
        + a[7] * t * p * p
        + a[8] * t * t * p * p;

    FloatReading {
        temperature_celsius: t / TEMPERATURE_LSB_PER_DEGREE,
        pressure_pa,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_codes_give_offset_term() {
        let mut a = [0.0f32; CALIBRATION_PARAMETER_COUNT];
        a[0] = 31_000.0;
        a[3] = 1.0;

        let reading = compensate(RawReading::new(0, 0), &a);

        assert_eq!(reading.temperature_celsius, 0.0);
        assert_eq!(reading.pressure_pa, 31_000.0);
    }

    #[test]
    fn test_each_term_contributes() {
        // Raw codes T = 2, P = 3
        let raw = RawReading::new(2, 3);
        let expected = [1.0, 2.0, 4.0, 3.0, 6.0, 12.0, 9.0, 18.0, 36.0];

        for (i, &value) in expected.iter().enumerate() {
            let mut a = [0.0f32; CALIBRATION_PARAMETER_COUNT];
            a[i] = 1.0;
            assert_eq!(compensate(raw, &a).pressure_pa, value, "term {i}");
        }
    }

    #[test]
    fn test_temperature_scale() {
        let a = [0.0f32; CALIBRATION_PARAMETER_COUNT];

        assert_eq!(compensate(RawReading::new(-10_240, 0), &a).temperature_celsius, -40.0);
        assert_eq!(compensate(RawReading::new(128, 0), &a).temperature_celsius, 0.5);
    }
}
