//! Pressure altitude from the international barometric formula.

/// Mean sea-level pressure of the standard atmosphere, Pa
pub const STANDARD_SEA_LEVEL_PA: f32 = 101_325.0;

const ALTITUDE_SCALE_M: f32 = 44_330.0;
const EXPONENT: f32 = 0.190_294_96;

/// Converts pressure to altitude against a sea-level reference.
///
/// Each converter owns its reference, so independent sensors can be
/// calibrated independently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltitudeConverter {
    sea_level_pa: f32,
}

impl Default for AltitudeConverter {
    fn default() -> Self {
        Self::new(STANDARD_SEA_LEVEL_PA)
    }
}

impl AltitudeConverter {
    pub const fn new(sea_level_pa: f32) -> Self {
        Self { sea_level_pa }
    }

    /// Replaces the sea-level reference. The value is not validated.
    pub fn set_sea_level_reference(&mut self, sea_level_pa: f32) {
        self.sea_level_pa = sea_level_pa;
    }

    pub fn sea_level_reference(&self) -> f32 {
        self.sea_level_pa
    }

    /// Altitude in metres of a point at `pressure_pa`.
    ///
    /// Non-physical inputs (zero or negative pressure, zero reference) give
    /// non-finite or meaningless results rather than an error.
    pub fn pressure_to_altitude(&self, pressure_pa: f32) -> f32 {
        ALTITUDE_SCALE_M * (1.0 - libm::powf(pressure_pa / self.sea_level_pa, EXPONENT))
    }

    /// Sea-level pressure that places `pressure_pa` at `altitude_m`.
    ///
    /// Feeding the result to [`set_sea_level_reference`](Self::set_sea_level_reference)
    /// calibrates the converter against a known elevation.
    pub fn sea_level_reference_for(pressure_pa: f32, altitude_m: f32) -> f32 {
        pressure_pa / libm::powf(1.0 - altitude_m / ALTITUDE_SCALE_M, 1.0 / EXPONENT)
    }
}
