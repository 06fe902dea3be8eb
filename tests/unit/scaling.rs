//! Raw sample decode and physical-unit scaling

use crate::common::test_utils::{self, assert_float_eq, create_imu_driver};
use m5stick::{AccelFullScale, GyroFullScale};

#[test]
fn test_twos_complement_round_trip() {
    // Decode then re-encode recovers the original bit pattern for the whole
    // 16-bit range boundary cases
    for raw in [0i16, 1, -1, 127, -128, 32767, -32768, -12345] {
        let bytes = raw.to_be_bytes();
        assert_eq!(i16::from_be_bytes(bytes), raw);
    }
}

#[test]
fn test_sign_unwrap_matches_subtraction() {
    // Values at or above 0x8000 reinterpret as raw - 65536
    for raw in [0x8000u16, 0x8001, 0xFFFF, 0xABCD] {
        let signed = i16::from_be_bytes(raw.to_be_bytes());
        assert_eq!(i32::from(signed), i32::from(raw) - 65536);
    }
    // Below 0x8000 the value passes through unchanged
    for raw in [0u16, 1, 0x7FFF] {
        let signed = i16::from_be_bytes(raw.to_be_bytes());
        assert_eq!(i32::from(signed), i32::from(raw));
    }
}

#[test]
fn test_raw_accel_read_decodes_negative_axes() {
    let (mut driver, interface) = create_imu_driver();
    driver.init(&mut test_utils::MockDelay).unwrap();

    interface.set_accel_data(-1, -32768, 32767);
    let raw = driver.read_accel().unwrap();
    assert_eq!(raw.x, -1);
    assert_eq!(raw.y, -32768);
    assert_eq!(raw.z, 32767);
}

#[test]
fn test_accel_scaling_default_range() {
    let (mut driver, interface) = create_imu_driver();
    driver.init(&mut test_utils::MockDelay).unwrap();

    // Default range is ±8g: half scale raw reads 4g
    interface.set_accel_data(16384, -16384, 0);
    let data = driver.read_accelerometer().unwrap();
    assert_float_eq(data.x, 4.0, 1e-3);
    assert_float_eq(data.y, -4.0, 1e-3);
    assert_float_eq(data.z, 0.0, 1e-6);
}

#[test]
fn test_accel_scaling_tracks_range_change() {
    let (mut driver, interface) = create_imu_driver();
    driver.init(&mut test_utils::MockDelay).unwrap();

    interface.set_accel_data(16384, 0, 0);

    driver
        .set_accel_range(AccelFullScale::G2, &mut test_utils::MockDelay)
        .unwrap();
    let data = driver.read_accelerometer().unwrap();
    assert_float_eq(data.x, 1.0, 1e-3);

    driver
        .set_accel_range(AccelFullScale::G16, &mut test_utils::MockDelay)
        .unwrap();
    let data = driver.read_accelerometer().unwrap();
    assert_float_eq(data.x, 8.0, 1e-3);
}

#[test]
fn test_gyro_scaling_default_range() {
    let (mut driver, interface) = create_imu_driver();
    driver.init(&mut test_utils::MockDelay).unwrap();

    // Default range is ±2000°/s
    interface.set_gyro_data(16384, 0, -16384);
    let data = driver.read_gyroscope().unwrap();
    assert_float_eq(data.x, 1000.0, 0.1);
    assert_float_eq(data.z, -1000.0, 0.1);
}

#[test]
fn test_gyro_scaling_tracks_range_change() {
    let (mut driver, interface) = create_imu_driver();
    driver.init(&mut test_utils::MockDelay).unwrap();

    interface.set_gyro_data(16384, 0, 0);

    driver
        .set_gyro_range(GyroFullScale::Dps500, &mut test_utils::MockDelay)
        .unwrap();
    let data = driver.read_gyroscope().unwrap();
    assert_float_eq(data.x, 250.0, 0.1);
}

#[test]
fn test_burst_read_is_consecutive() {
    let (mut driver, interface) = create_imu_driver();
    driver.init(&mut test_utils::MockDelay).unwrap();
    interface.set_accel_data(1000, 2000, 3000);
    interface.clear_operations();

    let raw = driver.read_accel().unwrap();
    assert_eq!((raw.x, raw.y, raw.z), (1000, 2000, 3000));

    // All 6 bytes come from one burst starting at ACCEL_XOUT_H (0x3B)
    let reads: Vec<u8> = interface
        .operations()
        .iter()
        .filter_map(|op| match op {
            crate::common::Operation::Read { address, .. } => Some(*address),
            _ => None,
        })
        .collect();
    assert_eq!(reads, [0x3B, 0x3C, 0x3D, 0x3E, 0x3F, 0x40]);
}
