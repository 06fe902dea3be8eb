//! Accelerometer types and configuration
//!
//! Provides types, enums, and utility functions for the MPU6886's 3-axis accelerometer.

/// Accelerometer full-scale range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelFullScale {
    /// ±2g range (most sensitive, least range)
    G2 = 0,
    /// ±4g range
    G4 = 1,
    /// ±8g range
    G8 = 2,
    /// ±16g range (least sensitive, most range)
    G16 = 3,
}

impl AccelFullScale {
    /// Get the resolution in g per LSB
    ///
    /// This is the multiplicative factor that converts raw sensor values to
    /// physical units. It must be recomputed whenever the range changes; the
    /// driver caches it for the hot read path.
    #[must_use]
    pub const fn resolution(self) -> f32 {
        match self {
            Self::G2 => 2.0 / 32768.0,
            Self::G4 => 4.0 / 32768.0,
            Self::G8 => 8.0 / 32768.0,
            Self::G16 => 16.0 / 32768.0,
        }
    }

    /// Get the maximum measurable value in g
    #[must_use]
    pub const fn max_g(self) -> u8 {
        match self {
            Self::G2 => 2,
            Self::G4 => 4,
            Self::G8 => 8,
            Self::G16 => 16,
        }
    }
}

/// Accelerometer data in physical units (g-force)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelDataG {
    /// X-axis acceleration in g
    pub x: f32,
    /// Y-axis acceleration in g
    pub y: f32,
    /// Z-axis acceleration in g
    pub z: f32,
}

impl AccelDataG {
    /// Create from raw sensor values
    ///
    /// # Arguments
    ///
    /// * `raw_x` - Raw X-axis value
    /// * `raw_y` - Raw Y-axis value
    /// * `raw_z` - Raw Z-axis value
    /// * `resolution` - Resolution in g/LSB (from [`AccelFullScale::resolution()`])
    #[must_use]
    pub fn from_raw(raw_x: i16, raw_y: i16, raw_z: i16, resolution: f32) -> Self {
        Self {
            x: f32::from(raw_x) * resolution,
            y: f32::from(raw_y) * resolution,
            z: f32::from(raw_z) * resolution,
        }
    }

    /// Get the magnitude of the acceleration vector
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        libm::sqrtf(self.x * self.x + self.y * self.y + self.z * self.z)
    }
}
