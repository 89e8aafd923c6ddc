//! GMP102 temperature and pressure compensation.
//!
//! Raw ADC codes are converted to physical units with the calibration
//! polynomial
//!
//! ```text
//! T[°C] = T_code / 256
//! P[Pa] = a0 + a1·T + a2·T² + P·(a3 + a4·T + a5·T²) + P²·(a6 + a7·T + a8·T²)
//! ```
//!
//! where `T` and `P` are the raw temperature and pressure codes. The formula
//! is available in three numeric forms trading cost for precision:
//!
//! | Mode       | Arithmetic | Temperature | Pressure | Agreement with float (typ.) |
//! |------------|------------|-------------|----------|-----------------------------|
//! | `Float`    | `f32`      | °C          | Pa       | -                           |
//! | `FixedS64` | `i64`      | milli-°C    | centi-Pa | ≤ 0.1 Pa                    |
//! | `FixedS32` | `i32`      | centi-°C    | Pa       | ≤ 5 Pa                      |
//!
//! Both fixed-point forms saturate instead of wrapping when fed codes far
//! outside the sensor's range, so every `i16`/`i32` input is accepted.

mod fixed_s32;
mod fixed_s64;
mod float;

use serde::{Deserialize, Serialize};

use crate::calibration::{CALIBRATION_PARAMETER_COUNT, CalibrationData, validate_fixed_point};
use crate::error::CalibrationError;

/// One pair of uncalibrated ADC samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawReading {
    /// Raw temperature code (1/256 °C per LSB)
    pub temperature: i16,
    /// Raw 24-bit pressure code, sign-extended
    pub pressure: i32,
}

impl RawReading {
    pub const fn new(temperature: i16, pressure: i32) -> Self {
        Self {
            temperature,
            pressure,
        }
    }
}

/// Numeric strategy used to evaluate the compensation polynomial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CompensationMode {
    /// Single-precision float
    #[default]
    Float,
    /// 64-bit fixed point
    FixedS64,
    /// 32-bit fixed point
    FixedS32,
}

impl CompensationMode {
    /// Short label for logs and command lines
    pub const fn label(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::FixedS64 => "s64",
            Self::FixedS32 => "s32",
        }
    }

    /// Inverse of [`label`](Self::label)
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "float" => Some(Self::Float),
            "s64" => Some(Self::FixedS64),
            "s32" => Some(Self::FixedS32),
            _ => None,
        }
    }
}

/// Decimal digits carried by a scaled integer reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Precision {
    /// Temperature is expressed in units of 10^-n °C
    pub temperature_decimals: u8,
    /// Pressure is expressed in units of 10^-n Pa
    pub pressure_decimals: u8,
}

impl Precision {
    /// Divisor turning the scaled temperature into °C
    pub fn temperature_divisor(self) -> f32 {
        pow10_f32(self.temperature_decimals)
    }

    /// Divisor turning the scaled pressure into Pa
    pub fn pressure_divisor(self) -> f32 {
        pow10_f32(self.pressure_decimals)
    }
}

fn pow10_f32(decimals: u8) -> f32 {
    (0..decimals).fold(1.0, |acc, _| acc * 10.0)
}

/// Result of the float compensation path.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FloatReading {
    pub temperature_celsius: f32,
    pub pressure_pa: f32,
}

/// Result of the 64-bit fixed-point path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedReadingS64 {
    pub temperature_milli_celsius: i32,
    pub pressure_centi_pa: i64,
}

impl FixedReadingS64 {
    pub const PRECISION: Precision = Precision {
        temperature_decimals: 3,
        pressure_decimals: 2,
    };

    pub fn temperature_celsius(&self) -> f32 {
        self.temperature_milli_celsius as f32 / Self::PRECISION.temperature_divisor()
    }

    pub fn pressure_pa(&self) -> f32 {
        self.pressure_centi_pa as f32 / Self::PRECISION.pressure_divisor()
    }
}

/// Result of the 32-bit fixed-point path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedReadingS32 {
    pub temperature_centi_celsius: i32,
    pub pressure_pa: i32,
}

impl FixedReadingS32 {
    pub const PRECISION: Precision = Precision {
        temperature_decimals: 2,
        pressure_decimals: 0,
    };

    pub fn temperature_celsius(&self) -> f32 {
        self.temperature_centi_celsius as f32 / Self::PRECISION.temperature_divisor()
    }

    pub fn pressure_pa(&self) -> f32 {
        self.pressure_pa as f32
    }
}

/// Compensated output of one measurement cycle, in whichever form was requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompensatedReading {
    Float(FloatReading),
    FixedS64(FixedReadingS64),
    FixedS32(FixedReadingS32),
}

impl CompensatedReading {
    /// Mode that produced this reading
    pub const fn mode(&self) -> CompensationMode {
        match self {
            Self::Float(_) => CompensationMode::Float,
            Self::FixedS64(_) => CompensationMode::FixedS64,
            Self::FixedS32(_) => CompensationMode::FixedS32,
        }
    }

    /// Scaling of the integer forms; `None` for float readings
    pub const fn precision(&self) -> Option<Precision> {
        match self {
            Self::Float(_) => None,
            Self::FixedS64(_) => Some(FixedReadingS64::PRECISION),
            Self::FixedS32(_) => Some(FixedReadingS32::PRECISION),
        }
    }

    pub fn temperature_celsius(&self) -> f32 {
        match self {
            Self::Float(reading) => reading.temperature_celsius,
            Self::FixedS64(reading) => reading.temperature_celsius(),
            Self::FixedS32(reading) => reading.temperature_celsius(),
        }
    }

    pub fn pressure_pa(&self) -> f32 {
        match self {
            Self::Float(reading) => reading.pressure_pa,
            Self::FixedS64(reading) => reading.pressure_pa(),
            Self::FixedS32(reading) => reading.pressure_pa(),
        }
    }
}

/// Applies one device's calibration to raw readings.
///
/// Owns the [`CalibrationData`] for the lifetime of a sensor session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Compensator {
    calibration: CalibrationData,
}

impl Compensator {
    pub const fn new(calibration: CalibrationData) -> Self {
        Self { calibration }
    }

    pub fn calibration(&self) -> &CalibrationData {
        &self.calibration
    }

    pub fn compensate_float(&self, raw: RawReading) -> FloatReading {
        float::compensate(raw, &self.calibration.float_coefficients())
    }

    pub fn compensate_fixed_s64(&self, raw: RawReading) -> FixedReadingS64 {
        fixed_s64::compensate(raw, self.calibration.mantissas(), self.calibration.scales())
    }

    pub fn compensate_fixed_s32(&self, raw: RawReading) -> FixedReadingS32 {
        fixed_s32::compensate(raw, self.calibration.mantissas(), self.calibration.scales())
    }

    /// Compensates `raw` with the requested numeric strategy.
    pub fn compensate(&self, raw: RawReading, mode: CompensationMode) -> CompensatedReading {
        match mode {
            CompensationMode::Float => CompensatedReading::Float(self.compensate_float(raw)),
            CompensationMode::FixedS64 => {
                CompensatedReading::FixedS64(self.compensate_fixed_s64(raw))
            }
            CompensationMode::FixedS32 => {
                CompensatedReading::FixedS32(self.compensate_fixed_s32(raw))
            }
        }
    }
}

/// Float compensation from a bare coefficient slice.
///
/// # Errors
/// `InvalidCalibration` unless exactly nine coefficients are supplied.
pub fn compensate_float(
    raw: RawReading,
    coefficients: &[f32],
) -> Result<FloatReading, CalibrationError> {
    let coefficients: &[f32; CALIBRATION_PARAMETER_COUNT] =
        coefficients
            .try_into()
            .map_err(|_| CalibrationError::InvalidCalibration {
                expected: CALIBRATION_PARAMETER_COUNT,
                found: coefficients.len(),
            })?;
    Ok(float::compensate(raw, coefficients))
}

/// 64-bit fixed-point compensation from bare mantissa/scale slices.
///
/// # Errors
/// `InvalidCalibration` on a count mismatch, `InvalidScale` on a scale code above 3.
pub fn compensate_fixed_s64(
    raw: RawReading,
    mantissas: &[i16],
    scales: &[u8],
) -> Result<FixedReadingS64, CalibrationError> {
    let (mantissas, scales) = validate_fixed_point(mantissas, scales)?;
    Ok(fixed_s64::compensate(raw, &mantissas, &scales))
}

/// 32-bit fixed-point compensation from bare mantissa/scale slices.
///
/// # Errors
/// `InvalidCalibration` on a count mismatch, `InvalidScale` on a scale code above 3.
pub fn compensate_fixed_s32(
    raw: RawReading,
    mantissas: &[i16],
    scales: &[u8],
) -> Result<FixedReadingS32, CalibrationError> {
    let (mantissas, scales) = validate_fixed_point(mantissas, scales)?;
    Ok(fixed_s32::compensate(raw, &mantissas, &scales))
}
