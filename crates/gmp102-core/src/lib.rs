//! Hardware-independent core library for gmp102-rs
//!
//! This crate contains all platform-agnostic logic for a GMP102 barometric
//! pressure/temperature sensor: calibration decoding, the compensation
//! polynomial in float and fixed-point forms, pressure altitude, an async
//! I2C driver and the acquisition loop that ties them together.
//!
//! It is `#![no_std]` with `extern crate alloc` so it compiles on both
//! embedded targets and desktop hosts (for the simulator and tests).

#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

extern crate alloc;

pub mod acquisition;
pub mod altitude;
pub mod calibration;
pub mod compensation;
pub mod config;
pub mod error;
pub mod gmp102;
pub mod sensors;

pub use altitude::AltitudeConverter;
pub use calibration::CalibrationData;
pub use compensation::{CompensatedReading, CompensationMode, Compensator, RawReading};
pub use error::{CalibrationError, ConfigError, Gmp102Error};
