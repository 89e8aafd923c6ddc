mod gmp102;

pub use gmp102::{Gmp102Readings, Gmp102Sensor};

/// Trait for sensor reading data structures.
/// Provides compile-time guarantees about the number of values and their conversion to arrays.
pub trait SensorReadings<const COUNT: usize> {
    /// Convert the readings into a fixed-size array of milli-unit integers.
    fn to_array(self) -> [i32; COUNT];
}

/// Trait for sensors that produce typed readings.
pub trait Sensor<const COUNT: usize> {
    /// The type of readings this sensor produces.
    type Readings: SensorReadings<COUNT>;

    /// Error reported when a read fails.
    type Error: core::fmt::Debug;

    /// Read the sensor and return typed readings.
    fn read(&mut self) -> impl Future<Output = Result<Self::Readings, Self::Error>>;
}

pub mod indices {
    //! Positions of each quantity in [`SensorReadings::to_array`] output.

    pub const TEMPERATURE: usize = 0;
    pub const PRESSURE: usize = 1;
    pub const ALTITUDE: usize = 2;
}
