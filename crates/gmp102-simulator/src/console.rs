//! Serial-console style output of each acquisition cycle.

use core::fmt::{self, Write};

use embedded_hal::i2c::ErrorKind;
use heapless::String;
use log::{error, warn};

use gmp102_core::Gmp102Error;
use gmp102_core::acquisition::ReadingSink;
use gmp102_core::compensation::{CompensatedReading, FixedReadingS32, FixedReadingS64};
use gmp102_core::sensors::Gmp102Readings;

/// Longest line the console prints
const LINE_CAPACITY: usize = 32;

/// Formats each reading the way the demo board's UART does, one value per line.
///
/// Fixed-point readings print their scaled integer, tagged with its decimal
/// scale: `P(1e-2 Pa)=10132500`.
#[derive(Debug, Default)]
pub struct SerialConsole {
    lines_written: usize,
}

impl SerialConsole {
    /// Renders the lines for one reading, ending with an empty separator line.
    pub fn format(readings: &Gmp102Readings) -> [String<LINE_CAPACITY>; 6] {
        let mut lines: [String<LINE_CAPACITY>; 6] = Default::default();

        let (pressure, temperature) = match readings.compensated {
            CompensatedReading::Float(reading) => (
                write!(lines[2], "P(Pa)={:.1}", reading.pressure_pa),
                write!(lines[3], "T(C)={:.3}", reading.temperature_celsius),
            ),
            CompensatedReading::FixedS64(reading) => {
                let precision = FixedReadingS64::PRECISION;
                (
                    write_scaled(
                        &mut lines[2],
                        "P",
                        "Pa",
                        reading.pressure_centi_pa,
                        precision.pressure_decimals,
                    ),
                    write_scaled(
                        &mut lines[3],
                        "T",
                        "C",
                        reading.temperature_milli_celsius.into(),
                        precision.temperature_decimals,
                    ),
                )
            }
            CompensatedReading::FixedS32(reading) => {
                let precision = FixedReadingS32::PRECISION;
                (
                    write_scaled(
                        &mut lines[2],
                        "P",
                        "Pa",
                        reading.pressure_pa.into(),
                        precision.pressure_decimals,
                    ),
                    write_scaled(
                        &mut lines[3],
                        "T",
                        "C",
                        reading.temperature_centi_celsius.into(),
                        precision.temperature_decimals,
                    ),
                )
            }
        };

        let results = [
            write!(lines[0], "P(code)={}", readings.raw.pressure),
            write!(lines[1], "T(code)={}", readings.raw.temperature),
            pressure,
            temperature,
            write!(lines[4], "Alt(m)={:.3}", readings.altitude_m),
        ];
        if results.iter().any(Result::is_err) {
            warn!("Console line truncated at {} bytes", LINE_CAPACITY);
        }

        lines
    }

    pub fn lines_written(&self) -> usize {
        self.lines_written
    }
}

/// Writes `Q(unit)=value`, or `Q(1e-n unit)=value` for a scaled integer.
fn write_scaled(
    line: &mut String<LINE_CAPACITY>,
    quantity: &str,
    unit: &str,
    value: i64,
    decimals: u8,
) -> fmt::Result {
    if decimals == 0 {
        write!(line, "{quantity}({unit})={value}")
    } else {
        write!(line, "{quantity}(1e-{decimals} {unit})={value}")
    }
}

impl ReadingSink<Gmp102Readings, Gmp102Error<ErrorKind>> for SerialConsole {
    fn publish(&mut self, readings: &Gmp102Readings) {
        for line in Self::format(readings) {
            println!("{}", line);
            self.lines_written += 1;
        }
    }

    fn report_error(&mut self, e: &Gmp102Error<ErrorKind>) {
        error!("Measurement failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gmp102_core::compensation::{FloatReading, RawReading};

    #[test]
    fn test_float_reading_lines() {
        let readings = Gmp102Readings {
            raw: RawReading::new(6_400, 6_589_632),
            compensated: CompensatedReading::Float(FloatReading {
                temperature_celsius: 25.0,
                pressure_pa: 101_325.0,
            }),
            altitude_m: -101.875,
        };

        let lines = SerialConsole::format(&readings);

        assert_eq!(lines[0], "P(code)=6589632");
        assert_eq!(lines[1], "T(code)=6400");
        assert_eq!(lines[2], "P(Pa)=101325.0");
        assert_eq!(lines[3], "T(C)=25.000");
        assert_eq!(lines[4], "Alt(m)=-101.875");
        assert_eq!(lines[5], "");
    }

    #[test]
    fn test_fixed_s32_lines_print_scaled_integers() {
        let readings = Gmp102Readings {
            raw: RawReading::new(-10_240, 2_000_000),
            compensated: CompensatedReading::FixedS32(FixedReadingS32 {
                temperature_centi_celsius: -4_000,
                pressure_pa: 60_849,
            }),
            altitude_m: 4_013.5,
        };

        let lines = SerialConsole::format(&readings);

        assert_eq!(lines[2], "P(Pa)=60849");
        assert_eq!(lines[3], "T(1e-2 C)=-4000");
    }

    #[test]
    fn test_fixed_s64_lines_print_scaled_integers() {
        let mut readings = Gmp102Readings {
            raw: RawReading::new(6_400, 6_589_632),
            compensated: CompensatedReading::FixedS64(FixedReadingS64 {
                temperature_milli_celsius: 25_000,
                pressure_centi_pa: 10_132_500,
            }),
            altitude_m: 0.0,
        };

        let lines = SerialConsole::format(&readings);
        assert_eq!(lines[2], "P(1e-2 Pa)=10132500");
        assert_eq!(lines[3], "T(1e-3 C)=25000");

        // The widest value still fits one line
        readings.compensated = CompensatedReading::FixedS64(FixedReadingS64 {
            temperature_milli_celsius: i32::MIN,
            pressure_centi_pa: i64::MIN,
        });
        let lines = SerialConsole::format(&readings);
        assert_eq!(lines[2], "P(1e-2 Pa)=-9223372036854775808");
        assert_eq!(lines[3], "T(1e-3 C)=-2147483648");
    }

    #[test]
    fn test_publish_counts_lines() {
        let mut console = SerialConsole::default();
        let readings = Gmp102Readings {
            raw: RawReading::default(),
            compensated: CompensatedReading::Float(FloatReading::default()),
            altitude_m: 0.0,
        };

        console.publish(&readings);
        console.publish(&readings);

        assert_eq!(console.lines_written(), 12);
    }
}
