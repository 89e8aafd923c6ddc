use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use log::{error, info};

use super::{Sensor, SensorReadings};
use crate::altitude::AltitudeConverter;
use crate::compensation::{CompensatedReading, CompensationMode, Compensator, RawReading};
use crate::config::SensorConfig;
use crate::error::Gmp102Error;
use crate::gmp102::Gmp102;
use crate::gmp102::registers::PressureOsr;

/// Typed readings from one GMP102 measurement cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gmp102Readings {
    pub raw: RawReading,
    pub compensated: CompensatedReading,
    /// Pressure altitude against the sensor's sea-level reference, m
    pub altitude_m: f32,
}

impl SensorReadings<3> for Gmp102Readings {
    /// `[milli-°C, centi-Pa, millimetres]`, saturating at the `i32` range.
    fn to_array(self) -> [i32; 3] {
        let (temperature, pressure) = match self.compensated {
            CompensatedReading::Float(reading) => (
                (reading.temperature_celsius * 1000.0) as i32,
                (reading.pressure_pa * 100.0) as i32,
            ),
            CompensatedReading::FixedS64(reading) => (
                reading.temperature_milli_celsius,
                reading
                    .pressure_centi_pa
                    .clamp(i32::MIN as i64, i32::MAX as i64) as i32,
            ),
            CompensatedReading::FixedS32(reading) => (
                reading.temperature_centi_celsius.saturating_mul(10),
                reading.pressure_pa.saturating_mul(100),
            ),
        };

        [temperature, pressure, (self.altitude_m * 1000.0) as i32]
    }
}

/// A GMP102 on an I2C bus, compensated and converted to altitude.
///
/// The sensor is reset and its calibration loaded on the first read.
pub struct Gmp102Sensor<I, D> {
    driver: Gmp102<I, D>,
    compensator: Option<Compensator>,
    altitude: AltitudeConverter,
    mode: CompensationMode,
    pressure_osr: PressureOsr,
}

impl<I: I2c, D: DelayNs> Gmp102Sensor<I, D> {
    pub fn new(i2c: I, delay: D, config: &SensorConfig) -> Self {
        Self {
            driver: Gmp102::new(i2c, delay, config.address),
            compensator: None,
            altitude: AltitudeConverter::new(config.sea_level_pa),
            mode: config.mode,
            pressure_osr: config.pressure_osr,
        }
    }

    /// Resets the sensor, loads calibration and applies the oversampling ratio.
    /// Called automatically by the first [`Sensor::read`].
    pub async fn initialize(&mut self) -> Result<Compensator, Gmp102Error<I::Error>> {
        let calibration = self.driver.init().await?;
        self.driver.set_pressure_osr(self.pressure_osr).await?;

        let compensator = Compensator::new(calibration);
        self.compensator = Some(compensator);
        info!("GMP102: ready, {} compensation", self.mode.label());
        Ok(compensator)
    }

    pub fn mode(&self) -> CompensationMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: CompensationMode) {
        self.mode = mode;
    }

    pub fn altitude_converter(&self) -> &AltitudeConverter {
        &self.altitude
    }

    pub fn altitude_converter_mut(&mut self) -> &mut AltitudeConverter {
        &mut self.altitude
    }

    /// Calibration in use, once the sensor has been initialized.
    pub fn compensator(&self) -> Option<&Compensator> {
        self.compensator.as_ref()
    }

    pub fn release(self) -> (I, D) {
        self.driver.release()
    }
}

impl<I: I2c, D: DelayNs> Sensor<3> for Gmp102Sensor<I, D> {
    type Readings = Gmp102Readings;
    type Error = Gmp102Error<I::Error>;

    async fn read(&mut self) -> Result<Gmp102Readings, Self::Error> {
        let compensator = match self.compensator {
            Some(compensator) => compensator,
            None => self.initialize().await.inspect_err(|e| {
                error!("GMP102 initialization failed: {:?}", e);
            })?,
        };

        let raw = self.driver.read_raw().await?;
        let compensated = compensator.compensate(raw, self.mode);
        let altitude_m = self.altitude.pressure_to_altitude(compensated.pressure_pa());

        Ok(Gmp102Readings {
            raw,
            compensated,
            altitude_m,
        })
    }
}
