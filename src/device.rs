//! High-level driver API for the MPU6886 IMU
//!
//! This module provides the driver for the 6-axis inertial sensor on the
//! M5StickC and ATOM Matrix: identity verification, data-driven
//! initialization, full-scale range configuration with cached per-LSB
//! resolution constants, and raw/scaled sample reads.

use crate::interface::{run_register_program, RegOp};
use crate::registers::Mpu6886 as RegisterDevice;
use crate::sensors::{AccelDataG, AccelFullScale, GyroDataDps, GyroFullScale, GyroOffset};
use crate::{Error, WHO_AM_I_VALUE};
use device_driver::RegisterInterface;

/// First accelerometer data register (ACCEL_XOUT_H through ACCEL_ZOUT_L)
const ACCEL_XOUT_H: u8 = 0x3B;
/// First temperature data register (TEMP_OUT_H, TEMP_OUT_L)
const TEMP_OUT_H: u8 = 0x41;
/// First gyroscope data register (GYRO_XOUT_H through GYRO_ZOUT_L)
const GYRO_XOUT_H: u8 = 0x43;

/// Settle time after a full-scale range register write
const RANGE_SETTLE_MS: u32 = 10;

/// Wait between calibration samples
const CALIBRATION_SAMPLE_INTERVAL_MS: u32 = 50;

/// Power-up and configuration sequence
///
/// Replayed in order by [`Mpu6886Driver::init`]. The settle delays are a
/// hardware requirement, not a tuning knob.
static INIT_PROGRAM: &[RegOp] = &[
    // PWR_MGMT_1: clear sleep and clock bits
    RegOp { addr: 0x6B, value: 0x00, settle_ms: 10 },
    // PWR_MGMT_1: device reset
    RegOp { addr: 0x6B, value: 0x80, settle_ms: 10 },
    // PWR_MGMT_1: wake, auto-select clock source
    RegOp { addr: 0x6B, value: 0x01, settle_ms: 10 },
    // ACCEL_CONFIG: ±8g
    RegOp { addr: 0x1C, value: 0x10, settle_ms: 1 },
    // GYRO_CONFIG: ±2000°/s
    RegOp { addr: 0x1B, value: 0x18, settle_ms: 1 },
    // CONFIG: gyro low-pass filter 176Hz
    RegOp { addr: 0x1A, value: 0x01, settle_ms: 1 },
    // SMPLRT_DIV: 1kHz / (1 + 5)
    RegOp { addr: 0x19, value: 0x05, settle_ms: 1 },
    // INT_ENABLE: all interrupts off during configuration
    RegOp { addr: 0x38, value: 0x00, settle_ms: 1 },
    // ACCEL_CONFIG2: accel low-pass filter defaults
    RegOp { addr: 0x1D, value: 0x00, settle_ms: 1 },
    // USER_CTRL: FIFO off
    RegOp { addr: 0x6A, value: 0x00, settle_ms: 1 },
    // FIFO_EN: no sensors feed the FIFO
    RegOp { addr: 0x23, value: 0x00, settle_ms: 1 },
    // INT_PIN_CFG: latched, cleared on any read
    RegOp { addr: 0x37, value: 0x22, settle_ms: 1 },
    // INT_ENABLE: data-ready interrupt
    RegOp { addr: 0x38, value: 0x01, settle_ms: 100 },
];

/// Accelerometer data (raw 16-bit values)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelData {
    /// X-axis acceleration (raw)
    pub x: i16,
    /// Y-axis acceleration (raw)
    pub y: i16,
    /// Z-axis acceleration (raw)
    pub z: i16,
}

/// Gyroscope data (raw 16-bit values)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GyroData {
    /// X-axis rotation (raw)
    pub x: i16,
    /// Y-axis rotation (raw)
    pub y: i16,
    /// Z-axis rotation (raw)
    pub z: i16,
}

/// Main driver for the MPU6886
pub struct Mpu6886Driver<I> {
    device: RegisterDevice<I>,
    accel_range: AccelFullScale,
    gyro_range: GyroFullScale,
    // Cached per-LSB constants for the hot read path; recomputed on every
    // range change.
    accel_resolution: f32,
    gyro_resolution: f32,
}

impl<I> Mpu6886Driver<I>
where
    I: RegisterInterface<AddressType = u8>,
{
    /// Create a new MPU6886 driver instance
    ///
    /// This verifies the `WHO_AM_I` register but does not initialize the
    /// device. Call [`init`](Self::init) after construction. Ranges default
    /// to ±8g and ±2000°/s.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Communication with the device fails
    /// - The `WHO_AM_I` register contains an unexpected value
    pub fn new(interface: I) -> Result<Self, Error<I::Error>> {
        Self::with_ranges(interface, AccelFullScale::G8, GyroFullScale::Dps2000)
    }

    /// Create a driver with explicit full-scale ranges
    ///
    /// The ranges are written to the device by [`init`](Self::init); until
    /// then they only size the cached resolution constants.
    ///
    /// # Errors
    ///
    /// Returns an error if communication fails or the device identity is
    /// wrong.
    pub fn with_ranges(
        interface: I,
        accel_range: AccelFullScale,
        gyro_range: GyroFullScale,
    ) -> Result<Self, Error<I::Error>> {
        let mut driver = Self {
            device: RegisterDevice::new(interface),
            accel_range,
            gyro_range,
            accel_resolution: accel_range.resolution(),
            gyro_resolution: gyro_range.resolution(),
        };

        let who_am_i = driver.who_am_i()?;
        if who_am_i != WHO_AM_I_VALUE {
            return Err(Error::InvalidDevice(who_am_i));
        }

        Ok(driver)
    }

    /// Read the `WHO_AM_I` register
    ///
    /// Should return 0x19 for a valid MPU6886.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn who_am_i(&mut self) -> Result<u8, Error<I::Error>> {
        let reg = self.device.who_am_i().read()?;
        Ok(reg.who_am_i())
    }

    /// Initialize the device
    ///
    /// Replays the power-up register program (reset, wake, clock select,
    /// filter bandwidths, sample-rate divider, interrupt and FIFO setup),
    /// honoring every settle delay, then applies the configured full-scale
    /// ranges and refreshes the cached resolution constants.
    ///
    /// # Arguments
    ///
    /// * `delay` - Delay provider implementing `embedded_hal::delay::DelayNs`
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn init<D>(&mut self, delay: &mut D) -> Result<(), Error<I::Error>>
    where
        D: embedded_hal::delay::DelayNs,
    {
        delay.delay_ms(1);
        run_register_program(&mut self.device.interface, INIT_PROGRAM, delay)?;

        // The program leaves the chip at its stock ±8g / ±2000°/s; apply
        // whatever the driver was constructed with.
        self.set_accel_range(self.accel_range, delay)?;
        self.set_gyro_range(self.gyro_range, delay)?;

        Ok(())
    }

    /// Set the accelerometer full-scale range
    ///
    /// Writes the range select bits, waits the mandatory settle time, and
    /// recomputes the cached resolution constant. Callable at any point
    /// after initialization to change sensitivity without reinitializing.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_accel_range<D>(
        &mut self,
        range: AccelFullScale,
        delay: &mut D,
    ) -> Result<(), Error<I::Error>>
    where
        D: embedded_hal::delay::DelayNs,
    {
        self.device.accel_config().write(|w| {
            w.set_accel_fs_sel(range as u8);
        })?;
        delay.delay_ms(RANGE_SETTLE_MS);

        self.accel_range = range;
        self.accel_resolution = range.resolution();
        Ok(())
    }

    /// Set the gyroscope full-scale range
    ///
    /// Writes the range select bits, waits the mandatory settle time, and
    /// recomputes the cached resolution constant.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_gyro_range<D>(
        &mut self,
        range: GyroFullScale,
        delay: &mut D,
    ) -> Result<(), Error<I::Error>>
    where
        D: embedded_hal::delay::DelayNs,
    {
        self.device.gyro_config().write(|w| {
            w.set_gyro_fs_sel(range as u8);
        })?;
        delay.delay_ms(RANGE_SETTLE_MS);

        self.gyro_range = range;
        self.gyro_resolution = range.resolution();
        Ok(())
    }

    /// Get the configured accelerometer range
    #[must_use]
    pub const fn accel_range(&self) -> AccelFullScale {
        self.accel_range
    }

    /// Get the configured gyroscope range
    #[must_use]
    pub const fn gyro_range(&self) -> GyroFullScale {
        self.gyro_range
    }

    /// Read raw accelerometer data
    ///
    /// Reads all 6 bytes in one transaction to prevent torn reads and
    /// decodes each axis as a big-endian two's-complement 16-bit value.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_accel(&mut self) -> Result<AccelData, Error<I::Error>> {
        let mut buffer = [0u8; 6];
        self.device
            .interface
            .read_register(ACCEL_XOUT_H, 48, &mut buffer)?;

        Ok(AccelData {
            x: i16::from_be_bytes([buffer[0], buffer[1]]),
            y: i16::from_be_bytes([buffer[2], buffer[3]]),
            z: i16::from_be_bytes([buffer[4], buffer[5]]),
        })
    }

    /// Read raw gyroscope data
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_gyro(&mut self) -> Result<GyroData, Error<I::Error>> {
        let mut buffer = [0u8; 6];
        self.device
            .interface
            .read_register(GYRO_XOUT_H, 48, &mut buffer)?;

        Ok(GyroData {
            x: i16::from_be_bytes([buffer[0], buffer[1]]),
            y: i16::from_be_bytes([buffer[2], buffer[3]]),
            z: i16::from_be_bytes([buffer[4], buffer[5]]),
        })
    }

    /// Read accelerometer data in g
    ///
    /// Raw samples scaled by the cached resolution constant for the
    /// configured range.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_accelerometer(&mut self) -> Result<AccelDataG, Error<I::Error>> {
        let raw = self.read_accel()?;
        Ok(AccelDataG::from_raw(
            raw.x,
            raw.y,
            raw.z,
            self.accel_resolution,
        ))
    }

    /// Read gyroscope data in °/s
    ///
    /// No calibration offset is applied; see
    /// [`calibrate_gyroscope`](Self::calibrate_gyroscope).
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_gyroscope(&mut self) -> Result<GyroDataDps, Error<I::Error>> {
        let raw = self.read_gyro()?;
        Ok(GyroDataDps::from_raw(
            raw.x,
            raw.y,
            raw.z,
            self.gyro_resolution,
        ))
    }

    /// Read the raw temperature word
    ///
    /// The register pair is read as an unsigned big-endian word; the stock
    /// firmware applies the conversion formula to the word as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_temperature(&mut self) -> Result<u16, Error<I::Error>> {
        let mut buffer = [0u8; 2];
        self.device
            .interface
            .read_register(TEMP_OUT_H, 16, &mut buffer)?;

        Ok(u16::from_be_bytes([buffer[0], buffer[1]]))
    }

    /// Read the die temperature in °C
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_temperature_celsius(&mut self) -> Result<f32, Error<I::Error>> {
        let raw = self.read_temperature()?;
        Ok(Self::temperature_to_celsius(raw))
    }

    /// Convert a raw temperature word to degrees Celsius
    ///
    /// Sensitivity is 326.8 LSB/°C with a 25°C offset.
    #[must_use]
    pub fn temperature_to_celsius(raw: u16) -> f32 {
        f32::from(raw) / 326.8 + 25.0
    }

    /// Measure the gyroscope zero-rate offset
    ///
    /// Takes `samples` scaled readings 50ms apart and returns their mean.
    /// The device must rest stationary and level for the whole capture; this
    /// is a blocking one-shot operation meant to run before the sampling
    /// loop starts, never interleaved with it.
    ///
    /// The offset is returned, not stored: readings from
    /// [`read_gyroscope`](Self::read_gyroscope) stay uncorrected until the
    /// caller subtracts the offset with [`GyroOffset::correct`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for zero samples, or a bus error if
    /// communication fails mid-capture.
    pub fn calibrate_gyroscope<D>(
        &mut self,
        samples: u16,
        delay: &mut D,
    ) -> Result<GyroOffset, Error<I::Error>>
    where
        D: embedded_hal::delay::DelayNs,
    {
        if samples == 0 {
            return Err(Error::InvalidConfig);
        }

        let mut sum_x = 0.0f32;
        let mut sum_y = 0.0f32;
        let mut sum_z = 0.0f32;

        for _ in 0..samples {
            let data = self.read_gyroscope()?;
            sum_x += data.x;
            sum_y += data.y;
            sum_z += data.z;
            delay.delay_ms(CALIBRATION_SAMPLE_INTERVAL_MS);
        }

        let n = f32::from(samples);
        Ok(GyroOffset {
            x: sum_x / n,
            y: sum_y / n,
            z: sum_z / n,
        })
    }

    /// Enter or leave sleep mode
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_sleep(&mut self, enable: bool) -> Result<(), Error<I::Error>> {
        self.device.pwr_mgmt_1().modify(|w| {
            w.set_sleep(enable);
        })?;
        Ok(())
    }

    /// Consume the driver and return the underlying interface
    pub fn release(self) -> I {
        self.device.interface
    }
}
