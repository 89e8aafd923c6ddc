use serde::{Deserialize, Serialize};

/// 7-bit I2C address of the GMP102 (8-bit write address 0xD8)
pub const GMP102_I2C_ADDRESS: u8 = 0x6C;

/// GMP102 register map.
///
/// Key groups:
/// - **Reset** - 0x00, written with [`SOFT_RESET_VALUE`]
/// - **Status** - 0x02, bit 0 set when a conversion result is ready
/// - **Results** - 0x06–0x08 pressure (24-bit), 0x09–0x0A temperature (16-bit), big-endian
/// - **Command** - 0x30 starts a single conversion
/// - **Configuration** - 0xA5, 0xA6 (pressure OSR in bits 2:0)
/// - **Calibration** - 0xAA–0xBB (18 bytes, factory trimmed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Register {
    Reset = 0x00,
    Status = 0x02,
    PressureMsb = 0x06,
    TemperatureMsb = 0x09,
    Command = 0x30,
    Config1 = 0xA5,
    Config2 = 0xA6,
    CalibrationStart = 0xAA,
}

impl Register {
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

pub const SOFT_RESET_VALUE: u8 = 0x24;

/// Status bit raised when the last conversion finished
pub const STATUS_DATA_READY: u8 = 0x01;

pub const COMMAND_MEASURE_PRESSURE: u8 = 0x09;
pub const COMMAND_MEASURE_TEMPERATURE: u8 = 0x08;

/// CONFIG1 value written by `initialize`
pub const CONFIG1_DEFAULT: u8 = 0x00;

/// CONFIG2 bits holding the pressure oversampling code
pub const CONFIG2_OSR_MASK: u8 = 0x07;

/// Pressure oversampling ratio (CONFIG2 bits 2:0).
///
/// Higher ratios lower noise at the cost of conversion time and current.
///
/// | Variant    | Code | Typical use            |
/// |------------|------|------------------------|
/// | `Osr256`   | 0x04 | Ultra low power        |
/// | `Osr1024`  | 0x00 | Low power (default)    |
/// | `Osr4096`  | 0x02 | Standard resolution    |
/// | `Osr8192`  | 0x03 | High resolution        |
/// | `Osr16384` | 0x06 | Ultra high resolution  |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum PressureOsr {
    Osr256 = 0x04,
    Osr512 = 0x05,
    #[default]
    Osr1024 = 0x00,
    Osr2048 = 0x01,
    Osr4096 = 0x02,
    Osr8192 = 0x03,
    Osr16384 = 0x06,
    Osr32768 = 0x07,
}

impl PressureOsr {
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decodes the low three bits of CONFIG2.
    pub const fn from_code(code: u8) -> Self {
        match code & CONFIG2_OSR_MASK {
            0x04 => Self::Osr256,
            0x05 => Self::Osr512,
            0x00 => Self::Osr1024,
            0x01 => Self::Osr2048,
            0x02 => Self::Osr4096,
            0x03 => Self::Osr8192,
            0x06 => Self::Osr16384,
            _ => Self::Osr32768,
        }
    }

    /// Number of samples averaged per conversion
    pub const fn ratio(self) -> u32 {
        match self {
            Self::Osr256 => 256,
            Self::Osr512 => 512,
            Self::Osr1024 => 1024,
            Self::Osr2048 => 2048,
            Self::Osr4096 => 4096,
            Self::Osr8192 => 8192,
            Self::Osr16384 => 16384,
            Self::Osr32768 => 32768,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [PressureOsr; 8] = [
        PressureOsr::Osr256,
        PressureOsr::Osr512,
        PressureOsr::Osr1024,
        PressureOsr::Osr2048,
        PressureOsr::Osr4096,
        PressureOsr::Osr8192,
        PressureOsr::Osr16384,
        PressureOsr::Osr32768,
    ];

    #[test]
    fn test_osr_codes_are_unique_and_decode() {
        for osr in ALL {
            assert_eq!(PressureOsr::from_code(osr.code()), osr);
            assert_eq!(osr.code() & !CONFIG2_OSR_MASK, 0);
        }
        assert_eq!(PressureOsr::from_code(0xF8), PressureOsr::Osr1024);
    }

    #[test]
    fn test_default_is_low_power() {
        assert_eq!(PressureOsr::default(), PressureOsr::Osr1024);
        assert_eq!(PressureOsr::default().ratio(), 1024);
    }
}
