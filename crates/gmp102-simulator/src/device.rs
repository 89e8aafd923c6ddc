//! Register-level emulation of a GMP102 on an I2C bus.
//!
//! Conversions report codes derived from a slowly varying synthetic weather
//! signal. The pressure code is found by inverting the calibration
//! polynomial, so compensating it gives the synthetic pressure back.

use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation};
use embedded_hal_async::i2c::I2c;
use log::{debug, info};

use gmp102_core::CalibrationError;
use gmp102_core::calibration::{
    BASE_DECADE, CALIBRATION_PARAMETER_COUNT, CALIBRATION_REGISTER_COUNT, CalibrationData,
};
use gmp102_core::gmp102::registers::{
    COMMAND_MEASURE_PRESSURE, COMMAND_MEASURE_TEMPERATURE, Register, SOFT_RESET_VALUE,
    STATUS_DATA_READY,
};

/// Calibration block burnt into the simulated part.
pub const FACTORY_CALIBRATION: [u8; CALIBRATION_REGISTER_COUNT] = [
    0x30, 0x71, 0xAB, 0x21, 0x32, 0x44, 0x13, 0x48, 0xFC, 0x54, 0x01, 0xE0, 0xFD, 0xA8, 0x04, 0xB0,
    0xF8, 0x30,
];

/// Status polls that report "busy" after each conversion command
const CONVERSION_POLLS: u8 = 1;

/// Simulated seconds between two pressure conversions
const SECONDS_PER_CONVERSION: f64 = 1.0;

const PRESSURE_CODE_MIN: f64 = -8_388_608.0;
const PRESSURE_CODE_MAX: f64 = 8_388_607.0;

// ---------------------------------------------------------------------------
// Synthetic weather
// ---------------------------------------------------------------------------

/// Temperature and pressure that drift over simulated time.
#[derive(Debug, Clone, Copy, Default)]
pub struct Weather {
    elapsed_secs: f64,
}

impl Weather {
    fn advance(&mut self, dt_secs: f64) {
        self.elapsed_secs += dt_secs;
    }

    /// 20–26 °C sinusoidal with slow drift
    pub fn temperature_celsius(&self) -> f64 {
        let t = self.elapsed_secs;
        23.0 + 3.0 * (t / 120.0).sin() + 0.5 * (t / 37.0).cos()
    }

    /// Around the demo's 100 110 Pa sea-level reference
    pub fn pressure_pa(&self) -> f64 {
        let t = self.elapsed_secs;
        100_110.0 + 150.0 * (t / 300.0).sin() + 20.0 * (t / 41.0).cos()
    }
}

// ---------------------------------------------------------------------------
// Device
// ---------------------------------------------------------------------------

pub struct SimulatedGmp102 {
    address: u8,
    registers: [u8; 256],
    pointer: u8,
    busy_polls: u8,
    weather: Weather,
    coefficients: [f64; CALIBRATION_PARAMETER_COUNT],
}

impl SimulatedGmp102 {
    pub fn new(address: u8) -> Result<Self, CalibrationError> {
        let calibration = CalibrationData::from_registers(&FACTORY_CALIBRATION)?;

        let mut coefficients = [0.0; CALIBRATION_PARAMETER_COUNT];
        for (i, coefficient) in coefficients.iter_mut().enumerate() {
            let exponent = calibration.scales()[i] as i32 - BASE_DECADE[i] as i32;
            *coefficient = calibration.mantissas()[i] as f64 * 10f64.powi(exponent);
        }

        let mut device = Self {
            address,
            registers: [0; 256],
            pointer: 0,
            busy_polls: 0,
            weather: Weather::default(),
            coefficients,
        };
        device.reset();
        Ok(device)
    }

    pub fn weather(&self) -> &Weather {
        &self.weather
    }

    fn reset(&mut self) {
        self.registers = [0; 256];
        let start = Register::CalibrationStart.addr() as usize;
        self.registers[start..start + CALIBRATION_REGISTER_COUNT]
            .copy_from_slice(&FACTORY_CALIBRATION);
        self.busy_polls = 0;
    }

    fn is_calibration(register: u8) -> bool {
        let start = Register::CalibrationStart.addr();
        (start..start + CALIBRATION_REGISTER_COUNT as u8).contains(&register)
    }

    fn handle_write(&mut self, bytes: &[u8]) {
        let Some((&register, values)) = bytes.split_first() else {
            return;
        };

        self.pointer = register;
        for &value in values {
            self.store(self.pointer, value);
            self.pointer = self.pointer.wrapping_add(1);
        }
    }

    fn handle_read(&mut self, buffer: &mut [u8]) {
        for byte in buffer.iter_mut() {
            *byte = self.load(self.pointer);
            self.pointer = self.pointer.wrapping_add(1);
        }
    }

    fn store(&mut self, register: u8, value: u8) {
        if register == Register::Reset.addr() {
            if value == SOFT_RESET_VALUE {
                info!("Simulated GMP102: soft reset");
                self.reset();
            }
        } else if register == Register::Command.addr() {
            self.convert(value);
        } else if !Self::is_calibration(register) {
            self.registers[register as usize] = value;
        }
    }

    fn load(&mut self, register: u8) -> u8 {
        let value = self.registers[register as usize];
        if register == Register::Status.addr() && self.busy_polls > 0 {
            self.busy_polls -= 1;
            return value & !STATUS_DATA_READY;
        }
        value
    }

    fn convert(&mut self, command: u8) {
        let status = Register::Status.addr() as usize;
        match command {
            COMMAND_MEASURE_PRESSURE => {
                self.weather.advance(SECONDS_PER_CONVERSION);
                let code = self.pressure_code();
                let start = Register::PressureMsb.addr() as usize;
                self.registers[start..start + 3].copy_from_slice(&code.to_be_bytes()[1..]);
                debug!("Simulated GMP102: pressure code {}", code);
            }
            COMMAND_MEASURE_TEMPERATURE => {
                let code = self.temperature_code();
                let start = Register::TemperatureMsb.addr() as usize;
                self.registers[start..start + 2].copy_from_slice(&code.to_be_bytes());
                debug!("Simulated GMP102: temperature code {}", code);
            }
            _ => return,
        }
        self.registers[status] |= STATUS_DATA_READY;
        self.busy_polls = CONVERSION_POLLS;
    }

    fn temperature_code(&self) -> i16 {
        (self.weather.temperature_celsius() * 256.0).round() as i16
    }

    /// Solves `A + B·P + C·P² = target` for the code `P` nearest the linear guess.
    fn pressure_code(&self) -> i32 {
        let a = &self.coefficients;
        let t = self.temperature_code() as f64;
        let target = self.weather.pressure_pa();

        let offset = a[0] + a[1] * t + a[2] * t * t - target;
        let linear = a[3] + a[4] * t + a[5] * t * t;
        let quadratic = a[6] + a[7] * t + a[8] * t * t;

        let guess = -offset / linear;
        let discriminant = linear * linear - 4.0 * quadratic * offset;
        let code = if quadratic == 0.0 || discriminant < 0.0 {
            guess
        } else {
            let root = discriminant.sqrt();
            let first = (-linear + root) / (2.0 * quadratic);
            let second = (-linear - root) / (2.0 * quadratic);
            if (first - guess).abs() <= (second - guess).abs() {
                first
            } else {
                second
            }
        };

        code.round().clamp(PRESSURE_CODE_MIN, PRESSURE_CODE_MAX) as i32
    }
}

impl ErrorType for SimulatedGmp102 {
    type Error = ErrorKind;
}

impl I2c for SimulatedGmp102 {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }

        for operation in operations {
            match operation {
                Operation::Write(bytes) => self.handle_write(bytes),
                Operation::Read(buffer) => self.handle_read(buffer),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use gmp102_core::Compensator;
    use gmp102_core::compensation::RawReading;
    use gmp102_core::gmp102::registers::GMP102_I2C_ADDRESS;

    fn device() -> SimulatedGmp102 {
        SimulatedGmp102::new(GMP102_I2C_ADDRESS).unwrap()
    }

    #[test]
    fn test_calibration_is_readable() {
        let mut device = device();
        let mut bytes = [0u8; CALIBRATION_REGISTER_COUNT];

        block_on(device.write_read(GMP102_I2C_ADDRESS, &[0xAA], &mut bytes)).unwrap();

        assert_eq!(bytes, FACTORY_CALIBRATION);
    }

    #[test]
    fn test_wrong_address_is_not_acknowledged() {
        let mut device = device();

        let result = block_on(device.write(0x77, &[0x00, SOFT_RESET_VALUE]));

        assert_eq!(
            result,
            Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address))
        );
    }

    #[test]
    fn test_status_is_busy_once_after_command() {
        let mut device = device();
        let mut status = [0u8; 1];

        block_on(device.write(GMP102_I2C_ADDRESS, &[0x30, COMMAND_MEASURE_TEMPERATURE])).unwrap();

        block_on(device.write_read(GMP102_I2C_ADDRESS, &[0x02], &mut status)).unwrap();
        assert_eq!(status[0] & STATUS_DATA_READY, 0);
        block_on(device.write_read(GMP102_I2C_ADDRESS, &[0x02], &mut status)).unwrap();
        assert_eq!(status[0] & STATUS_DATA_READY, STATUS_DATA_READY);
    }

    #[test]
    fn test_pressure_code_compensates_to_weather() {
        let calibration = CalibrationData::from_registers(&FACTORY_CALIBRATION).unwrap();
        let compensator = Compensator::new(calibration);
        let mut device = device();

        for _ in 0..50 {
            device.convert(COMMAND_MEASURE_PRESSURE);
            let raw = RawReading::new(device.temperature_code(), device.pressure_code());

            let reading = compensator.compensate_fixed_s64(raw);
            let expected = device.weather().pressure_pa();
            assert!(
                (reading.pressure_pa() as f64 - expected).abs() < 0.5,
                "{raw:?}: {} vs {expected}",
                reading.pressure_pa()
            );
        }
    }
}
