//! Error taxonomy and propagation

use crate::common::mock_interface::MockInterface;
use crate::common::test_utils::{self, create_imu_driver, create_power_driver};
use m5stick::{Error, Mpu6886Driver};

#[test]
fn test_wrong_identity_fails_construction() {
    let interface = MockInterface::new();
    interface.set_who_am_i(0x42);

    let result = Mpu6886Driver::new(interface);
    assert!(matches!(result, Err(Error::InvalidDevice(0x42))));
}

#[test]
fn test_absent_device_fails_construction() {
    // A floating bus reads zero, which is not the MPU6886 identity
    let interface = MockInterface::new();

    let result = Mpu6886Driver::new(interface);
    assert!(matches!(result, Err(Error::InvalidDevice(0x00))));
}

#[test]
fn test_read_failure_propagates_and_recovers() {
    let (mut driver, interface) = create_imu_driver();
    driver.init(&mut test_utils::MockDelay).unwrap();

    interface.fail_next_read();
    let result = driver.read_accel();
    assert!(matches!(result, Err(Error::Bus(_))));

    // The failure was one-shot; the driver holds no poisoned state
    interface.set_accel_data(100, 200, 300);
    let raw = driver.read_accel().unwrap();
    assert_eq!((raw.x, raw.y, raw.z), (100, 200, 300));
}

#[test]
fn test_init_write_failure_propagates() {
    let (mut driver, interface) = create_imu_driver();

    interface.fail_next_write();
    let result = driver.init(&mut test_utils::MockDelay);
    assert!(matches!(result, Err(Error::Bus(_))));
}

#[test]
fn test_range_change_failure_keeps_old_cache() {
    let (mut driver, interface) = create_imu_driver();
    driver.init(&mut test_utils::MockDelay).unwrap();

    interface.fail_next_write();
    let result = driver.set_accel_range(m5stick::AccelFullScale::G2, &mut test_utils::MockDelay);
    assert!(result.is_err());

    // The cached resolution still matches the range on the hardware
    assert_eq!(driver.accel_range(), m5stick::AccelFullScale::G8);
    interface.set_accel_data(16384, 0, 0);
    let data = driver.read_accelerometer().unwrap();
    assert!((data.x - 4.0).abs() < 1e-3);
}

#[test]
fn test_telemetry_failure_propagates_and_recovers() {
    let (mut driver, interface) = create_power_driver();

    interface.fail_next_read();
    assert!(matches!(driver.battery_voltage(), Err(Error::Bus(_))));

    // A telemetry consumer that logs and continues sees the next read work
    interface.set_field12(0x78, 1000);
    let voltage = driver.battery_voltage().unwrap();
    assert!((voltage - 1.1).abs() < 1e-6);
}

#[test]
fn test_rail_toggle_failure_propagates() {
    let (mut driver, interface) = create_power_driver();
    driver.setup(&mut test_utils::MockDelay).unwrap();

    interface.fail_next_read(); // the read half of the read-modify-write
    let result = driver.set_rail(m5stick::Rail::Ldo3, false);
    assert!(matches!(result, Err(Error::Bus(_))));
}
