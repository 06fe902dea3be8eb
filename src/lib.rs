#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod device;
pub mod interface;
pub mod power;
pub mod registers;
pub mod sensors;
pub mod tilt;

// Re-export main types
pub use device::{AccelData, GyroData, Mpu6886Driver};
pub use interface::{I2cInterface, RegOp};
pub use power::{Axp192Driver, PowerConfig, Rail};
pub use sensors::{AccelDataG, AccelFullScale, GyroDataDps, GyroFullScale, GyroOffset};
pub use tilt::{
    compute_angles, step_axis, AxisMapping, BorderPalette, EffectConfig, LedMatrix, PixelSink,
    TiltAngles, TiltBall,
};

/// MPU6886 I2C address (fixed, the chip has no address select pin)
pub const MPU6886_I2C_ADDRESS: u8 = 0x68;

/// AXP192 I2C address
pub const AXP192_I2C_ADDRESS: u8 = 0x34;

/// Expected value of the MPU6886 `WHO_AM_I` register
pub const WHO_AM_I_VALUE: u8 = 0x19;

/// Driver errors
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Communication error with the device
    Bus(E),
    /// Invalid `WHO_AM_I` register value (contains the actual value read)
    InvalidDevice(u8),
    /// Invalid configuration parameter
    InvalidConfig,
    /// Requested an ADC field decode with a bit width the chip does not use
    /// (supported widths: 8, 16, 24, 12 and 13 bits)
    UnsupportedWidth(u8),
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Self::Bus(error)
    }
}
