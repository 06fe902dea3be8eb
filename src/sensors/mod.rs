//! Sensor types and configuration for the MPU6886
//!
//! Full-scale range selection trades measurable range for precision: the raw
//! 16-bit sample always spans ±32768 LSB, so the physical value of one LSB is
//! `range / 32768`.

pub mod accelerometer;
pub mod gyroscope;

pub use accelerometer::{AccelDataG, AccelFullScale};
pub use gyroscope::{GyroDataDps, GyroFullScale, GyroOffset};
