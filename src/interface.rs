//! Bus interface implementation and register-program replay
//!
//! Both chips sit on the same two-wire bus (MPU6886 at 0x68, AXP192 at 0x34).
//! This module provides the `device-driver` trait implementation for I2C and
//! the data-driven register-program format used by the initialization
//! sequences.

use crate::{AXP192_I2C_ADDRESS, MPU6886_I2C_ADDRESS};
use device_driver::RegisterInterface;

/// I2C interface for a single device on the bus
pub struct I2cInterface<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cInterface<I2C> {
    /// Create an interface bound to the MPU6886 IMU (address 0x68)
    ///
    /// # Arguments
    /// * `i2c` - The I2C peripheral
    pub const fn mpu6886(i2c: I2C) -> Self {
        Self {
            i2c,
            address: MPU6886_I2C_ADDRESS,
        }
    }

    /// Create an interface bound to the AXP192 PMU (address 0x34)
    ///
    /// # Arguments
    /// * `i2c` - The I2C peripheral
    pub const fn axp192(i2c: I2C) -> Self {
        Self {
            i2c,
            address: AXP192_I2C_ADDRESS,
        }
    }

    /// Create an interface with a custom device address
    pub const fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Consume the interface and return the I2C peripheral
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, E> RegisterInterface for I2cInterface<I2C>
where
    I2C: embedded_hal::i2c::I2c<Error = E>,
{
    type Error = E;
    type AddressType = u8;

    fn read_register(
        &mut self,
        address: Self::AddressType,
        size_bits: u32,
        read_data: &mut [u8],
    ) -> Result<(), Self::Error> {
        let _ = size_bits; // Size is implicit in read_data.len() for I2C
        self.i2c.write_read(self.address, &[address], read_data)
    }

    fn write_register(
        &mut self,
        address: Self::AddressType,
        size_bits: u32,
        write_data: &[u8],
    ) -> Result<(), Self::Error> {
        let _ = size_bits; // Size is implicit in write_data.len() for I2C
        // Create a buffer with address + data. Registers on both chips are at
        // most 8 bits wide, so writes are one or two data bytes.
        let mut buffer = [0u8; 5]; // Max: 1 address + 4 data bytes
        buffer[0] = address;
        let len = write_data.len().min(4);
        buffer[1..=len].copy_from_slice(&write_data[..len]);

        self.i2c.write(self.address, &buffer[..=len])
    }
}

/// One step of a register initialization program
///
/// Hardware bring-up on both chips is a fixed, ordered sequence of
/// single-byte register writes, some followed by a mandatory settle delay
/// before the device state is valid. Keeping the sequences as static tables
/// makes them replayable against a fake transport in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegOp {
    /// Register address
    pub addr: u8,
    /// Value to write
    pub value: u8,
    /// Mandatory wait after the write, in milliseconds (0 = none)
    pub settle_ms: u32,
}

/// Replay a register program through a bus interface
///
/// Settle delays are part of the hardware contract and are never skipped or
/// shortened.
pub(crate) fn run_register_program<I, D>(
    interface: &mut I,
    program: &[RegOp],
    delay: &mut D,
) -> Result<(), I::Error>
where
    I: RegisterInterface<AddressType = u8>,
    D: embedded_hal::delay::DelayNs,
{
    for op in program {
        interface.write_register(op.addr, 8, &[op.value])?;
        if op.settle_ms > 0 {
            delay.delay_ms(op.settle_ms);
        }
    }
    Ok(())
}
