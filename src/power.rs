//! AXP192 power-management unit driver
//!
//! The AXP192 supplies the regulated rails on the M5StickC, charges the
//! battery, and exposes battery/bus/input telemetry through its internal
//! ADC. The ADC channels come at inconsistent bit depths (8, 12 and 13
//! bits) with the significant bits packed into the high positions of the
//! first byte; [`Axp192Driver::read_field`] centralizes the decode,
//! dispatched on the declared field width.
//!
//! Rail state lives in an in-memory [`PowerConfig`]; every toggle rewrites
//! the whole output-control register (merged with a fixed always-on mask)
//! rather than patching single bits.

use crate::interface::{run_register_program, RegOp};
use crate::registers::Axp192 as RegisterDevice;
use crate::Error;
use device_driver::RegisterInterface;

// Control registers
const REG_POWER_OUTPUT_CTRL: u8 = 0x12;
const REG_LDO23_VOLTAGE: u8 = 0x28;
const REG_VBUS_IPSOUT: u8 = 0x30;
const REG_BATTERY_DETECT: u8 = 0x32;
const REG_CHARGE_CONTROL_1: u8 = 0x33;
const REG_BACKUP_CHARGE: u8 = 0x35;
const REG_PEK: u8 = 0x36;
const REG_TEMP_PROTECTION: u8 = 0x39;
const REG_IRQ_STATUS_3: u8 = 0x46;
const REG_ADC_ENABLE_1: u8 = 0x82;
const REG_ADC_SAMPLE_RATE: u8 = 0x84;
const REG_GPIO0_CTRL: u8 = 0x90;
const REG_GPIO0_LDO_VOLTAGE: u8 = 0x91;

// ADC data fields (address, bit width)
const ADC_ACIN_VOLTAGE: u8 = 0x56;
const ADC_ACIN_CURRENT: u8 = 0x58;
const ADC_VBUS_VOLTAGE: u8 = 0x5A;
const ADC_VBUS_CURRENT: u8 = 0x5C;
const ADC_INTERNAL_TEMP: u8 = 0x5E;
const ADC_BATTERY_POWER: u8 = 0x70;
const ADC_BATTERY_VOLTAGE: u8 = 0x78;
const ADC_BATTERY_CHARGE_CURRENT: u8 = 0x7A;
const ADC_BATTERY_DISCHARGE_CURRENT: u8 = 0x7C;
const ADC_APS_VOLTAGE: u8 = 0x7E;

/// Bits of the output-control register that stay set no matter what the
/// rail configuration says (EXTEN and the buck converters the firmware
/// never switches).
const OUTPUT_CTRL_ALWAYS_ON: u8 = 0x4D;

/// Acknowledge byte for the PEK button IRQ status register
const BUTTON_ACK: u8 = 0x03;

/// Fixed head of the setup program: ADC configuration and charger limits
static SETUP_HEAD: &[RegOp] = &[
    // LDO2 and LDO3 (display and backlight) to 3.0V
    RegOp { addr: REG_LDO23_VOLTAGE, value: 0xCC, settle_ms: 0 },
    // ADC sample rate 200Hz
    RegOp { addr: REG_ADC_SAMPLE_RATE, value: 0xF2, settle_ms: 0 },
    // All ADC channels enabled
    RegOp { addr: REG_ADC_ENABLE_1, value: 0xFF, settle_ms: 0 },
    // Charge target 4.2V, current limit 100mA
    RegOp { addr: REG_CHARGE_CONTROL_1, value: 0xC0, settle_ms: 0 },
];

/// Fixed tail of the setup program
static SETUP_TAIL: &[RegOp] = &[
    // Disable the VBUS hold voltage limit
    RegOp { addr: REG_VBUS_IPSOUT, value: 0x80, settle_ms: 0 },
    // Charger temperature protection thresholds
    RegOp { addr: REG_TEMP_PROTECTION, value: 0xFC, settle_ms: 0 },
];

/// Switchable output rails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rail {
    /// DCDC1 buck converter (main 3.3V rail)
    Dcdc1,
    /// DCDC3 buck converter
    Dcdc3,
    /// LDO2 output; drives the LCD backlight on the M5StickC
    Ldo2,
    /// LDO3 output; drives the LCD logic on the M5StickC
    Ldo3,
}

/// Desired state of the AXP192 outputs
///
/// Held by the driver and re-applied to hardware as a whole register every
/// time any rail changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerConfig {
    /// DCDC1 enabled
    pub dcdc1: bool,
    /// DCDC3 enabled
    pub dcdc3: bool,
    /// LDO2 enabled
    pub ldo2: bool,
    /// LDO3 enabled
    pub ldo3: bool,
    /// RTC rail: GPIO0 as LDO at 3.3V plus backup battery charging
    pub rtc: bool,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            dcdc1: true,
            dcdc3: true,
            ldo2: true,
            ldo3: true,
            rtc: true,
        }
    }
}

impl PowerConfig {
    /// Low-nibble bitmask for the output-control register
    #[must_use]
    pub const fn rail_mask(&self) -> u8 {
        let mut mask = 0;
        if self.ldo3 {
            mask |= 1 << 3;
        }
        if self.ldo2 {
            mask |= 1 << 2;
        }
        if self.dcdc3 {
            mask |= 1 << 1;
        }
        if self.dcdc1 {
            mask |= 1 << 0;
        }
        mask
    }
}

/// Main driver for the AXP192
///
/// The chip has no identity register, so construction cannot fail; the
/// first `setup`/telemetry call surfaces a missing device as a bus error.
pub struct Axp192Driver<I> {
    device: RegisterDevice<I>,
    config: PowerConfig,
}

impl<I> Axp192Driver<I>
where
    I: RegisterInterface<AddressType = u8>,
{
    /// Create a new AXP192 driver with the default rail configuration
    /// (everything on)
    pub fn new(interface: I) -> Self {
        Self::with_config(interface, PowerConfig::default())
    }

    /// Create a driver with an explicit rail configuration
    ///
    /// The configuration reaches the hardware when [`setup`](Self::setup)
    /// runs.
    pub fn with_config(interface: I, config: PowerConfig) -> Self {
        Self {
            device: RegisterDevice::new(interface),
            config,
        }
    }

    /// Get the current rail configuration
    #[must_use]
    pub const fn config(&self) -> &PowerConfig {
        &self.config
    }

    fn read_reg(&mut self, addr: u8) -> Result<u8, Error<I::Error>> {
        let mut buffer = [0u8; 1];
        self.device.interface.read_register(addr, 8, &mut buffer)?;
        Ok(buffer[0])
    }

    fn write_reg(&mut self, addr: u8, value: u8) -> Result<(), Error<I::Error>> {
        self.device.interface.write_register(addr, 8, &[value])?;
        Ok(())
    }

    /// Initialize the chip with the M5StickC defaults
    ///
    /// Replays the fixed register program (ADC sample rate and channel
    /// enables, charge voltage/current limits, power-button timing,
    /// temperature protection, battery detection), applies the rail
    /// configuration, and sets up the RTC rail when configured.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn setup<D>(&mut self, delay: &mut D) -> Result<(), Error<I::Error>>
    where
        D: embedded_hal::delay::DelayNs,
    {
        run_register_program(&mut self.device.interface, SETUP_HEAD, delay)?;

        self.apply_rails()?;

        // Power button: 128ms power-on, 4s forced power-off
        self.write_reg(REG_PEK, 0x0C)?;

        if self.config.rtc {
            // GPIO0 as LDO at 3.3V
            self.write_reg(REG_GPIO0_LDO_VOLTAGE, 0xF0)?;
            self.write_reg(REG_GPIO0_CTRL, 0x02)?;
        }

        run_register_program(&mut self.device.interface, SETUP_TAIL, delay)?;

        // Backup battery charging, 3.0V / 200µA; bit 7 gates the charger on
        // the RTC rail configuration
        let backup = 0xA2 & if self.config.rtc { 0xFF } else { 0x7F };
        self.write_reg(REG_BACKUP_CHARGE, backup)?;

        // Battery detection enabled
        self.write_reg(REG_BATTERY_DETECT, 0x46)?;

        Ok(())
    }

    /// Rewrite the output-control register from the in-memory configuration
    ///
    /// Read-modify-write: the high nibble of the current value survives
    /// (merged with the always-on mask), the low nibble is replaced by the
    /// configured rail bits.
    fn apply_rails(&mut self) -> Result<(), Error<I::Error>> {
        let current = self.read_reg(REG_POWER_OUTPUT_CTRL)?;
        let merged = (current & 0xEF) | OUTPUT_CTRL_ALWAYS_ON;
        let value = (merged & 0xF0) | self.config.rail_mask();
        self.write_reg(REG_POWER_OUTPUT_CTRL, value)
    }

    /// Switch one output rail on or off
    ///
    /// Updates the in-memory configuration, then rewrites the whole
    /// output-control register.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_rail(&mut self, rail: Rail, enabled: bool) -> Result<(), Error<I::Error>> {
        match rail {
            Rail::Dcdc1 => self.config.dcdc1 = enabled,
            Rail::Dcdc3 => self.config.dcdc3 = enabled,
            Rail::Ldo2 => self.config.ldo2 = enabled,
            Rail::Ldo3 => self.config.ldo3 = enabled,
        }
        self.apply_rails()
    }

    /// Switch the LCD backlight on or off
    ///
    /// The backlight is wired to LDO2 on the M5StickC.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_backlight(&mut self, on: bool) -> Result<(), Error<I::Error>> {
        self.set_rail(Rail::Ldo2, on)
    }

    /// Read an ADC field of the given bit width
    ///
    /// Byte-aligned widths (8, 16, 24) concatenate big-endian. The packed
    /// widths follow the chip's layout with the significant bits in the
    /// high positions of the first byte: 12-bit fields decode as
    /// `(b0 << 4) | b1`, 13-bit fields as `(b0 << 5) | b1`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedWidth`] for any other width (a
    /// programming defect, not a runtime condition), or a bus error if
    /// communication fails.
    pub fn read_field(&mut self, address: u8, bits: u8) -> Result<u32, Error<I::Error>> {
        let nbytes = match bits {
            8 => 1,
            16 => 2,
            24 => 3,
            12 | 13 => 2,
            other => return Err(Error::UnsupportedWidth(other)),
        };

        let mut buffer = [0u8; 3];
        self.device
            .interface
            .read_register(address, u32::from(bits), &mut buffer[..nbytes])?;

        let value = match bits {
            12 => (u32::from(buffer[0]) << 4) | u32::from(buffer[1]),
            13 => (u32::from(buffer[0]) << 5) | u32::from(buffer[1]),
            _ => buffer[..nbytes]
                .iter()
                .fold(0u32, |acc, &byte| (acc << 8) | u32::from(byte)),
        };

        Ok(value)
    }

    /// Battery voltage in volts (1.1mV/LSB)
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn battery_voltage(&mut self) -> Result<f32, Error<I::Error>> {
        let raw = self.read_field(ADC_BATTERY_VOLTAGE, 12)?;
        Ok(raw as f32 * (1.1 / 1000.0))
    }

    /// Net battery current in milliamps (0.5mA/LSB)
    ///
    /// Positive while charging, negative while discharging.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn battery_current(&mut self) -> Result<f32, Error<I::Error>> {
        let current_in = self.read_field(ADC_BATTERY_CHARGE_CURRENT, 13)?;
        let current_out = self.read_field(ADC_BATTERY_DISCHARGE_CURRENT, 13)?;
        Ok((current_in as f32 - current_out as f32) * 0.5)
    }

    /// ACIN input voltage in volts (1.7mV/LSB)
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn input_voltage(&mut self) -> Result<f32, Error<I::Error>> {
        let raw = self.read_field(ADC_ACIN_VOLTAGE, 12)?;
        Ok(raw as f32 * (1.7 / 1000.0))
    }

    /// ACIN input current in milliamps (0.625mA/LSB)
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn input_current(&mut self) -> Result<f32, Error<I::Error>> {
        let raw = self.read_field(ADC_ACIN_CURRENT, 12)?;
        Ok(raw as f32 * 0.625)
    }

    /// VBUS voltage in volts (1.7mV/LSB)
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn bus_voltage(&mut self) -> Result<f32, Error<I::Error>> {
        let raw = self.read_field(ADC_VBUS_VOLTAGE, 12)?;
        Ok(raw as f32 * (1.7 / 1000.0))
    }

    /// VBUS current in milliamps (0.375mA/LSB)
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn bus_current(&mut self) -> Result<f32, Error<I::Error>> {
        let raw = self.read_field(ADC_VBUS_CURRENT, 12)?;
        Ok(raw as f32 * 0.375)
    }

    /// Die temperature in °C (0.1°C/LSB, -144.7°C offset)
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn temperature(&mut self) -> Result<f32, Error<I::Error>> {
        let raw = self.read_field(ADC_INTERNAL_TEMP, 12)?;
        Ok(raw as f32 * 0.1 - 144.7)
    }

    /// Instantaneous battery power in milliwatts (1.1mV × 0.5mA per LSB)
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn battery_power(&mut self) -> Result<f32, Error<I::Error>> {
        let raw = self.read_field(ADC_BATTERY_POWER, 24)?;
        Ok(raw as f32 * 1.1 * 0.5)
    }

    /// Battery charge current in milliamps (0.5mA/LSB)
    ///
    /// Reads the charge-current register at 12 bits, unlike
    /// [`battery_current`](Self::battery_current) which reads the same
    /// address at 13 bits; the asymmetry matches the reference firmware and
    /// is deliberately not unified.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn battery_charge_current(&mut self) -> Result<f32, Error<I::Error>> {
        let raw = self.read_field(ADC_BATTERY_CHARGE_CURRENT, 12)?;
        Ok(raw as f32 * 0.5)
    }

    /// APS (internal supply) voltage in volts (1.4mV/LSB)
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn aps_voltage(&mut self) -> Result<f32, Error<I::Error>> {
        let raw = self.read_field(ADC_APS_VOLTAGE, 12)?;
        Ok(raw as f32 * (1.4 / 1000.0))
    }

    /// Low-supply warning flag
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn warning_level(&mut self) -> Result<bool, Error<I::Error>> {
        let status = self.device.irq_status_4().read()?;
        Ok(status.aps_low_voltage())
    }

    /// Poll the power button
    ///
    /// Returns `true` if a press was latched since the last poll. A nonzero
    /// status is acknowledged by writing the fixed ack byte back to the
    /// status register, re-arming it for the next press.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn power_button(&mut self) -> Result<bool, Error<I::Error>> {
        let status = self.read_reg(REG_IRQ_STATUS_3)?;
        if status != 0 {
            self.write_reg(REG_IRQ_STATUS_3, BUTTON_ACK)?;
        }
        Ok(status != 0)
    }

    /// Shut down the managed outputs
    ///
    /// Arms sleep mode, detaches GPIO0 from the RTC LDO, and drops all
    /// switchable rails. Not reversible from this driver; on real hardware
    /// the device stays down until an external re-power.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn sleep_mode(&mut self) -> Result<(), Error<I::Error>> {
        self.device.voff().modify(|w| {
            w.set_sleep_wakeup(true);
        })?;

        self.write_reg(REG_GPIO0_CTRL, 0x00)?;
        self.write_reg(REG_POWER_OUTPUT_CTRL, 0x09)?;
        self.write_reg(REG_POWER_OUTPUT_CTRL, 0x00)?;
        Ok(())
    }

    /// Consume the driver and return the underlying interface
    pub fn release(self) -> I {
        self.device.interface
    }
}
