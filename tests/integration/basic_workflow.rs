//! Integration tests: full sample → angle → dot → LED frame cycles

use core::convert::Infallible;

use crate::common::test_utils::{self, create_imu_driver, create_power_driver};
use m5stick::{compute_angles, EffectConfig, LedMatrix, PixelSink, TiltBall};
use smart_leds::{SmartLedsWrite, RGB8};

/// Records the pixel operations the effect emits
#[derive(Debug, Default)]
struct RecordingSink {
    ops: Vec<SinkOp>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SinkOp {
    Set(usize, RGB8),
    Flush,
}

impl PixelSink for RecordingSink {
    type Error = Infallible;

    fn set_pixel(&mut self, index: usize, color: RGB8) -> Result<(), Self::Error> {
        self.ops.push(SinkOp::Set(index, color));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.ops.push(SinkOp::Flush);
        Ok(())
    }
}

/// Captures every frame written through the smart-leds seam
#[derive(Debug, Default)]
struct FakeStrip {
    frames: Vec<Vec<RGB8>>,
}

impl SmartLedsWrite for FakeStrip {
    type Error = Infallible;
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        self.frames
            .push(iterator.into_iter().map(Into::into).collect());
        Ok(())
    }
}

#[test]
fn test_sample_to_pixel_cycle() {
    let (mut imu, interface) = create_imu_driver();
    imu.init(&mut test_utils::MockDelay).unwrap();

    // 1g on X and Z at the default ±8g range: pitch = atan(1/1) = 45°
    interface.set_accel_data(4096, 0, 4096);

    let accel = imu.read_accelerometer().unwrap();
    let angles = compute_angles(accel.x, accel.y, accel.z);
    assert!((angles.pitch - 45.0).abs() < 0.1);
    assert!(angles.roll.abs() < 0.1);

    let mut ball = TiltBall::new(EffectConfig::atom_matrix());
    let mut sink = RecordingSink::default();
    ball.tick(angles, &mut sink).unwrap();

    // Previous pixel off, new pixel on in the initial color, one flush
    assert_eq!(
        sink.ops,
        [
            SinkOp::Set(12, RGB8::default()),
            SinkOp::Set(13, RGB8::new(0, 0, 20)),
            SinkOp::Flush,
        ]
    );
}

#[test]
fn test_walk_to_border_recolors_dot() {
    let (mut imu, interface) = create_imu_driver();
    imu.init(&mut test_utils::MockDelay).unwrap();
    interface.set_accel_data(4096, 0, 4096);

    let mut ball = TiltBall::new(EffectConfig::atom_matrix());
    let mut matrix: LedMatrix<FakeStrip, 25> = LedMatrix::new(FakeStrip::default());

    for _ in 0..3 {
        let accel = imu.read_accelerometer().unwrap();
        let angles = compute_angles(accel.x, accel.y, accel.z);
        ball.tick(angles, &mut matrix).unwrap();
    }

    // Two moves to the right border, then a held push that recolors
    assert_eq!(ball.position(), (4, 2));
    assert_eq!(ball.color(), RGB8::new(20, 0, 0));

    let strip = matrix.release();
    assert_eq!(strip.frames.len(), 3);

    // Final frame: exactly one lit pixel, at the border, in the new color
    let last = strip.frames.last().unwrap();
    assert_eq!(last.len(), 25);
    assert_eq!(last[14], RGB8::new(20, 0, 0));
    let lit = last.iter().filter(|&&px| px != RGB8::default()).count();
    assert_eq!(lit, 1);
}

#[test]
fn test_level_device_keeps_dot_centered() {
    let (mut imu, interface) = create_imu_driver();
    imu.init(&mut test_utils::MockDelay).unwrap();

    // Flat on the table: gravity entirely on Z, pitch and roll at 0°
    interface.set_accel_data(0, 0, 4096);

    let mut ball = TiltBall::new(EffectConfig::atom_matrix());
    let mut sink = RecordingSink::default();

    for _ in 0..5 {
        let accel = imu.read_accelerometer().unwrap();
        let angles = compute_angles(accel.x, accel.y, accel.z);
        ball.tick(angles, &mut sink).unwrap();
    }

    assert_eq!(ball.position(), (2, 2));
    assert_eq!(ball.color(), RGB8::new(0, 0, 20));
}

#[test]
fn test_gyro_calibration_before_loop() {
    let (mut imu, interface) = create_imu_driver();
    imu.init(&mut test_utils::MockDelay).unwrap();

    // Calibrate against a constant bias, then correct loop readings with it
    interface.set_gyro_data(50, -30, 10);
    let offset = imu
        .calibrate_gyroscope(20, &mut test_utils::MockDelay)
        .unwrap();

    let corrected = offset.correct(imu.read_gyroscope().unwrap());
    assert!(corrected.x.abs() < 1e-3);
    assert!(corrected.y.abs() < 1e-3);
    assert!(corrected.z.abs() < 1e-3);
}

#[test]
fn test_power_bringup_and_telemetry() {
    let (mut pmu, interface) = create_power_driver();
    pmu.setup(&mut test_utils::MockDelay).unwrap();

    // Blink the backlight the way the demo does
    pmu.set_backlight(true).unwrap();
    pmu.set_backlight(false).unwrap();
    assert_eq!(interface.get_register(0x12) & 0x04, 0);

    // Telemetry snapshot
    interface.set_field12(0x78, 3755); // ~4.13V battery
    interface.set_field13(0x7A, 0);
    interface.set_field13(0x7C, 250); // discharging 125mA
    interface.set_field12(0x5E, 1947); // 50°C

    let voltage = pmu.battery_voltage().unwrap();
    assert!((voltage - 4.1305).abs() < 1e-3);

    let current = pmu.battery_current().unwrap();
    assert!((current - (-125.0)).abs() < 1e-3);

    let temp = pmu.temperature().unwrap();
    assert!((temp - 50.0).abs() < 1e-3);

    // A transient failure skips one cycle, the loop keeps going
    interface.fail_next_read();
    assert!(pmu.battery_voltage().is_err());
    assert!(pmu.battery_voltage().is_ok());
}
