//! Async I2C driver for the GMP102.
//!
//! The driver only moves bytes: it resets the part, reads the calibration
//! block, triggers single conversions and returns raw codes. Turning those
//! codes into physical units is the job of [`crate::compensation`].

pub mod registers;

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;
use log::{debug, error, info};

use crate::calibration::{CALIBRATION_PARAMETER_COUNT, CALIBRATION_REGISTER_COUNT, CalibrationData};
use crate::compensation::RawReading;
use crate::error::Gmp102Error;
use registers::*;

/// Time the part needs after a soft reset before it answers again
pub const RESET_DELAY_MS: u32 = 100;

/// Interval between data-ready polls
pub const POLL_INTERVAL_MS: u32 = 1;

/// Data-ready polls before a conversion is declared lost
pub const MAX_POLLS: u32 = 100;

pub struct Gmp102<I, D> {
    i2c: I,
    delay: D,
    address: u8,
}

impl<I: I2c, D: DelayNs> Gmp102<I, D> {
    pub fn new(i2c: I, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Brings the sensor into a known state and returns its calibration.
    ///
    /// Sequence:
    /// 1. Soft reset (0x00 ← 0x24)
    /// 2. Wait 100 ms
    /// 3. Read the 18 calibration bytes from 0xAA
    /// 4. Write the default CONFIG1
    pub async fn init(&mut self) -> Result<CalibrationData, Gmp102Error<I::Error>> {
        self.soft_reset().await?;
        self.delay.delay_ms(RESET_DELAY_MS).await;

        let calibration = self.read_calibration().await?;
        self.initialize().await?;

        info!("GMP102 at 0x{:02X} initialized", self.address);
        Ok(calibration)
    }

    pub async fn soft_reset(&mut self) -> Result<(), Gmp102Error<I::Error>> {
        self.write_register(Register::Reset, SOFT_RESET_VALUE, "soft reset")
            .await?;
        info!("GMP102 soft reset issued");
        Ok(())
    }

    /// Writes the power-on configuration that single-shot measurements expect.
    pub async fn initialize(&mut self) -> Result<(), Gmp102Error<I::Error>> {
        self.write_register(Register::Config1, CONFIG1_DEFAULT, "initialize")
            .await
    }

    /// Burst-reads and decodes the calibration registers.
    pub async fn read_calibration(&mut self) -> Result<CalibrationData, Gmp102Error<I::Error>> {
        let mut bytes = [0u8; CALIBRATION_REGISTER_COUNT];
        self.read_registers(Register::CalibrationStart, &mut bytes, "read calibration")
            .await?;

        let calibration = CalibrationData::from_registers(&bytes)?;
        debug!(
            "GMP102 calibration mantissas {:?}, scales {:?}",
            calibration.mantissas(),
            calibration.scales()
        );
        Ok(calibration)
    }

    /// Calibration coefficients `a0..a8` for the float path.
    pub async fn load_float_parameters(
        &mut self,
    ) -> Result<[f32; CALIBRATION_PARAMETER_COUNT], Gmp102Error<I::Error>> {
        Ok(self.read_calibration().await?.float_coefficients())
    }

    /// Mantissa and scale codes for the fixed-point paths.
    pub async fn load_fixed_point_parameters(
        &mut self,
    ) -> Result<
        (
            [i16; CALIBRATION_PARAMETER_COUNT],
            [u8; CALIBRATION_PARAMETER_COUNT],
        ),
        Gmp102Error<I::Error>,
    > {
        let calibration = self.read_calibration().await?;
        Ok((*calibration.mantissas(), *calibration.scales()))
    }

    /// Selects the pressure oversampling ratio, preserving the other CONFIG2 bits.
    pub async fn set_pressure_osr(&mut self, osr: PressureOsr) -> Result<(), Gmp102Error<I::Error>> {
        let mut config = [0u8; 1];
        self.read_registers(Register::Config2, &mut config, "read pressure OSR")
            .await?;

        let value = (config[0] & !CONFIG2_OSR_MASK) | osr.code();
        self.write_register(Register::Config2, value, "set pressure OSR")
            .await?;

        info!("GMP102 pressure OSR set to {}", osr.ratio());
        Ok(())
    }

    /// Runs one pressure conversion and returns the sign-extended 24-bit code.
    pub async fn measure_pressure(&mut self) -> Result<i32, Gmp102Error<I::Error>> {
        self.start_conversion(COMMAND_MEASURE_PRESSURE, "measure pressure")
            .await?;

        let mut data = [0u8; 3];
        self.read_registers(Register::PressureMsb, &mut data, "read pressure")
            .await?;

        let code = i32::from_be_bytes([data[0], data[1], data[2], 0]) >> 8;
        debug!("GMP102 pressure code {}", code);
        Ok(code)
    }

    /// Runs one temperature conversion and returns the 16-bit code.
    pub async fn measure_temperature(&mut self) -> Result<i16, Gmp102Error<I::Error>> {
        self.start_conversion(COMMAND_MEASURE_TEMPERATURE, "measure temperature")
            .await?;

        let mut data = [0u8; 2];
        self.read_registers(Register::TemperatureMsb, &mut data, "read temperature")
            .await?;

        let code = i16::from_be_bytes(data);
        debug!("GMP102 temperature code {}", code);
        Ok(code)
    }

    /// Pressure conversion followed by a temperature conversion.
    pub async fn read_raw(&mut self) -> Result<RawReading, Gmp102Error<I::Error>> {
        let pressure = self.measure_pressure().await?;
        let temperature = self.measure_temperature().await?;
        Ok(RawReading::new(temperature, pressure))
    }

    /// Gives back the bus and delay.
    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }

    async fn start_conversion(
        &mut self,
        command: u8,
        operation: &'static str,
    ) -> Result<(), Gmp102Error<I::Error>> {
        self.write_register(Register::Command, command, operation)
            .await?;

        for _ in 0..MAX_POLLS {
            self.delay.delay_ms(POLL_INTERVAL_MS).await;

            let mut status = [0u8; 1];
            self.read_registers(Register::Status, &mut status, operation)
                .await?;
            if status[0] & STATUS_DATA_READY != 0 {
                return Ok(());
            }
        }

        error!("GMP102 data not ready after {} polls during {}", MAX_POLLS, operation);
        Err(Gmp102Error::DataNotReady { operation })
    }

    async fn write_register(
        &mut self,
        register: Register,
        value: u8,
        operation: &'static str,
    ) -> Result<(), Gmp102Error<I::Error>> {
        self.i2c
            .write(self.address, &[register.addr(), value])
            .await
            .map_err(|e| {
                error!("GMP102 {} failed: {:?}", operation, e);
                Gmp102Error::Communication {
                    operation,
                    error: e,
                }
            })
    }

    async fn read_registers(
        &mut self,
        register: Register,
        buffer: &mut [u8],
        operation: &'static str,
    ) -> Result<(), Gmp102Error<I::Error>> {
        self.i2c
            .write_read(self.address, &[register.addr()], buffer)
            .await
            .map_err(|e| {
                error!("GMP102 {} failed: {:?}", operation, e);
                Gmp102Error::Communication {
                    operation,
                    error: e,
                }
            })
    }
}
