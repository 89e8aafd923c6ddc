//! Error types shared across the crate

use thiserror_no_std::Error;

/// Malformed calibration data handed to the compensation core.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationError {
    /// Coefficient or register count does not match the GMP102 schema
    #[error("Invalid calibration: expected {expected} entries, found {found}")]
    InvalidCalibration {
        /// Count required by the sensor schema
        expected: usize,
        /// Count actually supplied
        found: usize,
    },

    /// Power-of-ten scale code outside the 2-bit register field
    #[error("Invalid scale code {scale} for coefficient {index} (max 3)")]
    InvalidScale {
        /// Coefficient index
        index: usize,
        /// The offending scale code
        scale: u8,
    },
}

/// Errors raised by the GMP102 bus driver.
///
/// Bus errors are carried through unchanged in [`Gmp102Error::Communication`]
/// so the caller can inspect the HAL's own error value.
#[derive(Error, Debug)]
pub enum Gmp102Error<E: core::fmt::Debug> {
    /// The I2C transaction failed
    #[error("I2C communication failed during {operation}: {error:?}")]
    Communication {
        /// Driver operation that issued the transaction
        operation: &'static str,
        /// Error reported by the bus
        error: E,
    },

    /// The data-ready flag never came up within the poll budget
    #[error("Data not ready during {operation}")]
    DataNotReady {
        /// Measurement that timed out
        operation: &'static str,
    },

    /// Calibration registers decoded to an invalid parameter set
    #[error("Calibration error: {0}")]
    Calibration(#[from] CalibrationError),
}

/// Errors from persisting a [`crate::config::SensorConfig`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to encode configuration: {0:?}")]
    Encode(postcard::Error),
    #[error("Failed to decode configuration: {0:?}")]
    Decode(postcard::Error),
}
