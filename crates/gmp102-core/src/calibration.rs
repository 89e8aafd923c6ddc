//! GMP102 calibration coefficients.
//!
//! The sensor stores nine pressure-compensation coefficients in registers
//! 0xAA–0xBB as big-endian 16-bit words. Each word packs a 14-bit signed
//! mantissa (bits 15:2) and a 2-bit power-of-ten code (bits 1:0). Coefficient
//! `i` is then
//!
//! ```text
//! a[i] = mantissa[i] × 10^scale[i] × 10^-BASE_DECADE[i]
//! ```
//!
//! [`CalibrationData`] decodes the words once and keeps both the fixed-point
//! pairs and the derived `f32` coefficients, so the float and integer
//! compensation paths always see the same calibration.

use crate::error::CalibrationError;

/// Number of calibration bytes read from the sensor
pub const CALIBRATION_REGISTER_COUNT: usize = 18;

/// Number of polynomial coefficients
pub const CALIBRATION_PARAMETER_COUNT: usize = CALIBRATION_REGISTER_COUNT / 2;

/// Largest power-of-ten code a register word can carry
pub const MAX_SCALE: u8 = 0x03;

/// Fixed decimal exponent of each coefficient, independent of the device.
pub const BASE_DECADE: [u32; CALIBRATION_PARAMETER_COUNT] = [0, 5, 10, 5, 10, 15, 12, 17, 21];

const POWER_OF_TEN: [f32; 4] = [1.0, 10.0, 100.0, 1000.0];

const BASE_FACTOR: [f32; CALIBRATION_PARAMETER_COUNT] = [
    1.0E+00, 1.0E-05, 1.0E-10, 1.0E-05, 1.0E-10, 1.0E-15, 1.0E-12, 1.0E-17, 1.0E-21,
];

/// Decoded calibration of one GMP102, in fixed-point and float form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationData {
    mantissas: [i16; CALIBRATION_PARAMETER_COUNT],
    scales: [u8; CALIBRATION_PARAMETER_COUNT],
    coefficients: [f32; CALIBRATION_PARAMETER_COUNT],
}

impl CalibrationData {
    /// Decodes the 18-byte calibration block as read from register 0xAA.
    ///
    /// # Errors
    /// `InvalidCalibration` if `bytes` is not exactly 18 bytes long.
    pub fn from_registers(bytes: &[u8]) -> Result<Self, CalibrationError> {
        if bytes.len() != CALIBRATION_REGISTER_COUNT {
            return Err(CalibrationError::InvalidCalibration {
                expected: CALIBRATION_REGISTER_COUNT,
                found: bytes.len(),
            });
        }

        let mut mantissas = [0i16; CALIBRATION_PARAMETER_COUNT];
        let mut scales = [0u8; CALIBRATION_PARAMETER_COUNT];
        for (i, word) in bytes.chunks_exact(2).enumerate() {
            // Arithmetic shift keeps the sign of the 14-bit mantissa
            mantissas[i] = i16::from_be_bytes([word[0], word[1]]) >> 2;
            scales[i] = word[1] & MAX_SCALE;
        }

        Ok(Self::from_parts(mantissas, scales))
    }

    /// Builds calibration data from parallel mantissa and scale-code slices.
    ///
    /// # Errors
    /// - `InvalidCalibration` if either slice does not hold nine entries
    /// - `InvalidScale` if a scale code is above [`MAX_SCALE`]
    pub fn from_fixed_point(mantissas: &[i16], scales: &[u8]) -> Result<Self, CalibrationError> {
        let (mantissas, scales) = validate_fixed_point(mantissas, scales)?;
        Ok(Self::from_parts(mantissas, scales))
    }

    fn from_parts(
        mantissas: [i16; CALIBRATION_PARAMETER_COUNT],
        scales: [u8; CALIBRATION_PARAMETER_COUNT],
    ) -> Self {
        let mut coefficients = [0.0f32; CALIBRATION_PARAMETER_COUNT];
        for i in 0..CALIBRATION_PARAMETER_COUNT {
            coefficients[i] =
                mantissas[i] as f32 * POWER_OF_TEN[scales[i] as usize] * BASE_FACTOR[i];
        }

        Self {
            mantissas,
            scales,
            coefficients,
        }
    }

    /// Float coefficients `a0..a8`.
    pub fn float_coefficients(&self) -> [f32; CALIBRATION_PARAMETER_COUNT] {
        self.coefficients
    }

    /// Signed 14-bit mantissas.
    pub fn mantissas(&self) -> &[i16; CALIBRATION_PARAMETER_COUNT] {
        &self.mantissas
    }

    /// Power-of-ten codes, each in `0..=3`.
    pub fn scales(&self) -> &[u8; CALIBRATION_PARAMETER_COUNT] {
        &self.scales
    }

    /// Float coefficient `a[index]`.
    pub fn coefficient(&self, index: usize) -> Option<f32> {
        self.coefficients.get(index).copied()
    }

    /// Mantissa and scale code pair for coefficient `index`.
    pub fn fixed_point(&self, index: usize) -> Option<(i16, u8)> {
        Some((*self.mantissas.get(index)?, *self.scales.get(index)?))
    }
}

/// Checks slice lengths and scale codes and copies them into fixed arrays.
pub(crate) fn validate_fixed_point(
    mantissas: &[i16],
    scales: &[u8],
) -> Result<
    (
        [i16; CALIBRATION_PARAMETER_COUNT],
        [u8; CALIBRATION_PARAMETER_COUNT],
    ),
    CalibrationError,
> {
    let mantissas: [i16; CALIBRATION_PARAMETER_COUNT] =
        mantissas
            .try_into()
            .map_err(|_| CalibrationError::InvalidCalibration {
                expected: CALIBRATION_PARAMETER_COUNT,
                found: mantissas.len(),
            })?;
    let scales: [u8; CALIBRATION_PARAMETER_COUNT] =
        scales
            .try_into()
            .map_err(|_| CalibrationError::InvalidCalibration {
                expected: CALIBRATION_PARAMETER_COUNT,
                found: scales.len(),
            })?;

    if let Some(index) = scales.iter().position(|&scale| scale > MAX_SCALE) {
        return Err(CalibrationError::InvalidScale {
            index,
            scale: scales[index],
        });
    }

    Ok((mantissas, scales))
}

/// Shared calibration fixture for the crate's tests.
///
/// At 25 °C (temperature code 6400) a pressure code of 6 589 632 compensates
/// to 101 325 Pa.
#[cfg(test)]
pub(crate) mod fixtures {
    use super::CALIBRATION_REGISTER_COUNT;

    pub const REFERENCE_MANTISSAS: [i16; 9] = [3100, -5432, 3217, 1234, -235, 120, -150, 300, -500];
    pub const REFERENCE_SCALES: [u8; 9] = [1, 1, 0, 0, 0, 0, 0, 0, 0];

    pub const REFERENCE_REGISTERS: [u8; CALIBRATION_REGISTER_COUNT] = [
        0x30, 0x71, 0xAB, 0x21, 0x32, 0x44, 0x13, 0x48, 0xFC, 0x54, 0x01, 0xE0, 0xFD, 0xA8, 0x04,
        0xB0, 0xF8, 0x30,
    ];

    pub const REFERENCE_TEMPERATURE_CODE: i16 = 6400;
    pub const REFERENCE_PRESSURE_CODE: i32 = 6_589_632;

    /// Evaluates the reference polynomial in `f64` as ground truth.
    pub fn reference_pressure(temperature: i16, pressure: i32) -> f64 {
        polynomial_pressure(&REFERENCE_MANTISSAS, &REFERENCE_SCALES, temperature, pressure)
    }

    /// Evaluates any calibration's polynomial in `f64`, Pa.
    pub fn polynomial_pressure(
        mantissas: &[i16; 9],
        scales: &[u8; 9],
        temperature: i16,
        pressure: i32,
    ) -> f64 {
        const BASE: [i32; 9] = [0, 5, 10, 5, 10, 15, 12, 17, 21];
        let mut a = [0.0f64; 9];
        for i in 0..9 {
            a[i] = mantissas[i] as f64 * libm::pow(10.0, (scales[i] as i32 - BASE[i]) as f64);
        }
        let t = temperature as f64;
        let p = pressure as f64;
        a[0] + a[1] * t
            + a[2] * t * t
            + p * (a[3] + a[4] * t + a[5] * t * t)
            + p * p * (a[6] + a[7] * t + a[8] * t * t)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_decode_reference_registers() {
        let calib = CalibrationData::from_registers(&REFERENCE_REGISTERS).unwrap();

        assert_eq!(calib.mantissas(), &REFERENCE_MANTISSAS);
        assert_eq!(calib.scales(), &REFERENCE_SCALES);
    }

    #[test]
    fn test_negative_mantissa_is_sign_extended() {
        let mut bytes = [0u8; CALIBRATION_REGISTER_COUNT];
        // 0xFFFF -> mantissa -1, scale 3
        bytes[0] = 0xFF;
        bytes[1] = 0xFF;
        // 0x8000 -> most negative 14-bit mantissa, scale 0
        bytes[2] = 0x80;
        bytes[3] = 0x00;

        let calib = CalibrationData::from_registers(&bytes).unwrap();

        assert_eq!(calib.fixed_point(0), Some((-1, 3)));
        assert_eq!(calib.fixed_point(1), Some((-8192, 0)));
        assert_eq!(calib.fixed_point(9), None);
        assert_eq!(calib.coefficient(0), Some(-1000.0));
        assert_eq!(calib.coefficient(9), None);
    }

    #[test]
    fn test_float_and_fixed_forms_agree() {
        let calib = CalibrationData::from_registers(&REFERENCE_REGISTERS).unwrap();
        let coefficients = calib.float_coefficients();

        for i in 0..CALIBRATION_PARAMETER_COUNT {
            let (mantissa, scale) = calib.fixed_point(i).unwrap();
            let exponent = scale as i32 - BASE_DECADE[i] as i32;
            let exact = mantissa as f64 * libm::pow(10.0, exponent as f64);
            let relative = ((coefficients[i] as f64 - exact) / exact).abs();
            assert!(
                relative < 1e-6,
                "coefficient {i}: float {} vs fixed {exact}",
                coefficients[i]
            );
        }
    }

    #[test]
    fn test_reference_coefficient_values() {
        let calib = CalibrationData::from_registers(&REFERENCE_REGISTERS).unwrap();
        let a = calib.float_coefficients();

        assert_eq!(a[0], 31000.0);
        assert!((a[1] - -0.5432).abs() < 1e-6);
        assert!((a[3] - 0.01234).abs() < 1e-8);
        assert!((a[6] - -1.5e-10).abs() < 1e-16);
    }

    #[test]
    fn test_wrong_register_count_is_rejected() {
        let result = CalibrationData::from_registers(&REFERENCE_REGISTERS[..16]);

        assert_eq!(
            result,
            Err(CalibrationError::InvalidCalibration {
                expected: 18,
                found: 16
            })
        );
    }

    #[test]
    fn test_from_fixed_point_matches_registers() {
        let from_regs = CalibrationData::from_registers(&REFERENCE_REGISTERS).unwrap();
        let from_pairs =
            CalibrationData::from_fixed_point(&REFERENCE_MANTISSAS, &REFERENCE_SCALES).unwrap();

        assert_eq!(from_regs, from_pairs);
    }

    #[test]
    fn test_from_fixed_point_validates_input() {
        assert_eq!(
            CalibrationData::from_fixed_point(&REFERENCE_MANTISSAS[..8], &REFERENCE_SCALES),
            Err(CalibrationError::InvalidCalibration {
                expected: 9,
                found: 8
            })
        );

        let mut scales = REFERENCE_SCALES;
        scales[4] = 7;
        assert_eq!(
            CalibrationData::from_fixed_point(&REFERENCE_MANTISSAS, &scales),
            Err(CalibrationError::InvalidScale { index: 4, scale: 7 })
        );
    }
}
