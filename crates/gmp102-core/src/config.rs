//! Persistent sensor configuration.

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::altitude::STANDARD_SEA_LEVEL_PA;
use crate::compensation::CompensationMode;
use crate::error::ConfigError;
use crate::gmp102::registers::{GMP102_I2C_ADDRESS, PressureOsr};

/// Everything needed to bring up a GMP102 and run the acquisition loop.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SensorConfig {
    /// 7-bit I2C address
    pub address: u8,
    pub pressure_osr: PressureOsr,
    pub mode: CompensationMode,
    /// Sea-level reference for altitude, Pa
    pub sea_level_pa: f32,
    /// Pause between acquisition cycles, ms
    pub sample_interval_ms: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            address: GMP102_I2C_ADDRESS,
            pressure_osr: PressureOsr::Osr1024,
            mode: CompensationMode::Float,
            sea_level_pa: STANDARD_SEA_LEVEL_PA,
            sample_interval_ms: 1000,
        }
    }
}

impl SensorConfig {
    /// Encodes the configuration for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        postcard::to_allocvec(self).map_err(ConfigError::Encode)
    }

    /// Decodes a configuration written by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        postcard::from_bytes(bytes).map_err(ConfigError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_demo_board() {
        let config = SensorConfig::default();

        assert_eq!(config.address, 0x6C);
        assert_eq!(config.pressure_osr, PressureOsr::Osr1024);
        assert_eq!(config.mode, CompensationMode::Float);
        assert_eq!(config.sea_level_pa, 101_325.0);
        assert_eq!(config.sample_interval_ms, 1000);
    }

    #[test]
    fn test_persisted_config_restores() {
        let config = SensorConfig {
            pressure_osr: PressureOsr::Osr16384,
            mode: CompensationMode::FixedS32,
            sea_level_pa: 100_110.0,
            ..SensorConfig::default()
        };

        let bytes = config.to_bytes().unwrap();

        assert_eq!(SensorConfig::from_bytes(&bytes), Ok(config));
    }

    #[test]
    fn test_truncated_bytes_are_rejected() {
        let bytes = SensorConfig::default().to_bytes().unwrap();

        let result = SensorConfig::from_bytes(&bytes[..bytes.len() - 2]);

        assert!(matches!(result, Err(ConfigError::Decode(_))));
    }

    #[test]
    fn test_decode_error_keeps_postcard_cause() {
        use std::string::ToString;

        let error = SensorConfig::from_bytes(&[]).unwrap_err();
        let reported = error.clone();

        assert_eq!(
            reported,
            ConfigError::Decode(postcard::Error::DeserializeUnexpectedEnd)
        );
        assert_eq!(
            error.to_string(),
            "Failed to decode configuration: DeserializeUnexpectedEnd"
        );
    }
}
