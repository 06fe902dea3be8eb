//! Register definitions for the MPU6886 IMU and the AXP192 PMU
//!
//! Configuration registers are declared through the `device-driver` DSL so
//! bit fields get typed accessors. Multi-byte data registers (sensor output,
//! ADC fields) are read as raw bursts by the drivers instead: the MPU6886
//! samples must be read in one transaction to avoid torn reads, and the
//! AXP192 ADC fields use non-byte-aligned packing that is decoded by a
//! width-dispatched routine in [`crate::power`].

/// MPU6886 register map
pub mod mpu6886 {
    device_driver::create_device!(
        device_name: Mpu6886,
        dsl: {
            config {
                type RegisterAddressType = u8;
                type DefaultByteOrder = BE;
            }

            /// SMPLRT_DIV - Sample Rate Divider (0x19)
            /// Sample rate = internal rate / (1 + div)
            register SmplrtDiv {
                const ADDRESS = 0x19;
                const SIZE_BITS = 8;

                /// Divider value
                div: uint = 0..8,
            },

            /// CONFIG - Configuration (0x1A)
            register Config {
                const ADDRESS = 0x1A;
                const SIZE_BITS = 8;

                /// Digital low-pass filter setting
                dlpf_cfg: uint = 0..3,
                /// FSYNC pin sample location
                ext_sync_set: uint = 3..6,
                /// FIFO stops writing when full
                fifo_mode: bool = 6,
                reserved_7: uint = 7..8,
            },

            /// GYRO_CONFIG - Gyroscope Configuration (0x1B)
            register GyroConfig {
                const ADDRESS = 0x1B;
                const SIZE_BITS = 8;

                /// Gyroscope filter choice bypass
                fchoice_b: uint = 0..2,
                reserved_2: uint = 2..3,
                /// Gyroscope full-scale select (0=±250, 1=±500, 2=±1000, 3=±2000 dps)
                gyro_fs_sel: uint = 3..5,
                /// Z-axis gyroscope self-test
                zg_st: bool = 5,
                /// Y-axis gyroscope self-test
                yg_st: bool = 6,
                /// X-axis gyroscope self-test
                xg_st: bool = 7,
            },

            /// ACCEL_CONFIG - Accelerometer Configuration (0x1C)
            register AccelConfig {
                const ADDRESS = 0x1C;
                const SIZE_BITS = 8;

                reserved_2_0: uint = 0..3,
                /// Accelerometer full-scale select (0=±2, 1=±4, 2=±8, 3=±16 g)
                accel_fs_sel: uint = 3..5,
                /// Z-axis accelerometer self-test
                za_st: bool = 5,
                /// Y-axis accelerometer self-test
                ya_st: bool = 6,
                /// X-axis accelerometer self-test
                xa_st: bool = 7,
            },

            /// ACCEL_CONFIG2 - Accelerometer Configuration 2 (0x1D)
            register AccelConfig2 {
                const ADDRESS = 0x1D;
                const SIZE_BITS = 8;

                /// Accelerometer low-pass filter setting
                a_dlpf_cfg: uint = 0..3,
                /// Accelerometer filter choice bypass
                accel_fchoice_b: bool = 3,
                /// Averaging filter for low-power mode
                dec2_cfg: uint = 4..6,
                reserved_7_6: uint = 6..8,
            },

            /// FIFO_EN - FIFO Enable (0x23)
            register FifoEn {
                const ADDRESS = 0x23;
                const SIZE_BITS = 8;

                reserved_2_0: uint = 0..3,
                /// Write gyroscope data to FIFO
                gyro_fifo_en: bool = 3,
                /// Write accelerometer data to FIFO
                accel_fifo_en: bool = 4,
                reserved_7_5: uint = 5..8,
            },

            /// INT_PIN_CFG - Interrupt Pin Configuration (0x37)
            register IntPinCfg {
                const ADDRESS = 0x37;
                const SIZE_BITS = 8;

                reserved_1_0: uint = 0..2,
                /// FSYNC interrupt mode enable
                fsync_int_mode_en: bool = 2,
                /// FSYNC active low
                actl_fsync: bool = 3,
                /// Interrupt status cleared on any read
                int_anyrd_2clear: bool = 4,
                /// Latch interrupt pin until cleared
                latch_int_en: bool = 5,
                /// Interrupt pin open drain
                int_open: bool = 6,
                /// Interrupt pin active low
                int_level: bool = 7,
            },

            /// INT_ENABLE - Interrupt Enable (0x38)
            register IntEnable {
                const ADDRESS = 0x38;
                const SIZE_BITS = 8;

                /// Data-ready interrupt enable
                data_rdy_int_en: bool = 0,
                reserved_3_1: uint = 1..4,
                /// FIFO overflow interrupt enable
                fifo_oflow_en: bool = 4,
                /// Wake-on-motion interrupt enable (X/Y/Z)
                wom_int_en: uint = 5..8,
            },

            /// USER_CTRL - User Control (0x6A)
            register UserCtrl {
                const ADDRESS = 0x6A;
                const SIZE_BITS = 8;

                /// Signal path and register reset
                sig_cond_rst: bool = 0,
                reserved_1: uint = 1..2,
                /// FIFO reset
                fifo_rst: bool = 2,
                reserved_5_3: uint = 3..6,
                /// FIFO enable
                fifo_en: bool = 6,
                reserved_7: uint = 7..8,
            },

            /// PWR_MGMT_1 - Power Management 1 (0x6B)
            register PwrMgmt1 {
                const ADDRESS = 0x6B;
                const SIZE_BITS = 8;

                /// Clock source select (1 = auto-select best available)
                clksel: uint = 0..3,
                /// Temperature sensor disable
                temp_dis: bool = 3,
                /// Gyroscope standby
                gyro_standby: bool = 4,
                /// Cycle mode enable
                cycle: bool = 5,
                /// Sleep mode enable
                sleep: bool = 6,
                /// Device reset
                device_reset: bool = 7,
            },

            /// PWR_MGMT_2 - Power Management 2 (0x6C)
            register PwrMgmt2 {
                const ADDRESS = 0x6C;
                const SIZE_BITS = 8;

                /// Disable gyroscope Z-axis
                stby_zg: bool = 0,
                /// Disable gyroscope Y-axis
                stby_yg: bool = 1,
                /// Disable gyroscope X-axis
                stby_xg: bool = 2,
                /// Disable accelerometer Z-axis
                stby_za: bool = 3,
                /// Disable accelerometer Y-axis
                stby_ya: bool = 4,
                /// Disable accelerometer X-axis
                stby_xa: bool = 5,
                reserved_7_6: uint = 6..8,
            },

            /// WHO_AM_I - Device ID Register (0x75)
            /// Expected value: 0x19
            register WhoAmI {
                const ADDRESS = 0x75;
                const SIZE_BITS = 8;

                /// Device ID (should read 0x19)
                who_am_i: uint = 0..8,
            },
        }
    );
}

/// AXP192 register map
pub mod axp192 {
    device_driver::create_device!(
        device_name: Axp192,
        dsl: {
            config {
                type RegisterAddressType = u8;
                type DefaultByteOrder = BE;
            }

            /// Power output control (0x12)
            /// Low nibble carries the switchable rails; the driver rewrites
            /// the whole register on every toggle.
            register PowerOutputCtrl {
                const ADDRESS = 0x12;
                const SIZE_BITS = 8;

                /// DCDC1 output enable
                dcdc1: bool = 0,
                /// DCDC3 output enable
                dcdc3: bool = 1,
                /// LDO2 output enable (LCD backlight on the M5StickC)
                ldo2: bool = 2,
                /// LDO3 output enable
                ldo3: bool = 3,
                /// DCDC2 output enable
                dcdc2: bool = 4,
                reserved_5: uint = 5..6,
                /// EXTEN output enable
                exten: bool = 6,
                reserved_7: uint = 7..8,
            },

            /// VOFF shutdown voltage / sleep control (0x31)
            register Voff {
                const ADDRESS = 0x31;
                const SIZE_BITS = 8;

                /// VOFF threshold (2.6V + 100mV per step)
                voff_voltage: uint = 0..3,
                /// Arm sleep mode; outputs shut down until the next wake
                sleep_wakeup: bool = 3,
                reserved_7_4: uint = 4..8,
            },

            /// PEK button IRQ status (0x46)
            /// Write 1 to a set bit to acknowledge it.
            register IrqStatus3 {
                const ADDRESS = 0x46;
                const SIZE_BITS = 8;

                /// PEK short press
                short_press: bool = 0,
                /// PEK long press
                long_press: bool = 1,
                reserved_7_2: uint = 2..8,
            },

            /// Power status IRQ status (0x47)
            register IrqStatus4 {
                const ADDRESS = 0x47;
                const SIZE_BITS = 8;

                /// APS voltage below warning level
                aps_low_voltage: bool = 0,
                reserved_7_1: uint = 1..8,
            },
        }
    );
}

pub use axp192::Axp192;
pub use mpu6886::Mpu6886;
