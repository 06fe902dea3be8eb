//! Tilt-to-position engine: the ball-in-a-maze LED effect
//!
//! Accelerometer samples become tilt angles, the angles drive one bounded
//! dot coordinate per matrix axis, and each cycle repaints the dot through
//! the [`PixelSink`] rendering seam. Pushing the dot against a matrix
//! border while tilted past the threshold changes the active color instead
//! of moving.

use libm::{atanf, sqrtf};
use smart_leds::{SmartLedsWrite, RGB8};

/// Tilt angles in degrees, derived from one accelerometer sample
///
/// Stateless; recomputed every cycle from the current sample.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TiltAngles {
    /// Rotation toward the X axis
    pub pitch: f32,
    /// Rotation toward the Y axis
    pub roll: f32,
    /// Rotation toward the Z axis. Not a heading: yaw is unobservable from
    /// the accelerometer alone, this is the same axis/plane ratio as the
    /// other two angles and is kept for compatibility with the reference
    /// firmware.
    pub yaw: f32,
}

/// Angle of one axis component against the plane of the other two, degrees
///
/// When both plane components are zero the ratio has no finite value; the
/// angle saturates to ±90° following the sign of the axis component (0° for
/// the all-zero vector) instead of going through `0.0 / 0.0`.
fn axis_angle(axis: f32, plane_a: f32, plane_b: f32) -> f32 {
    let denom = sqrtf(plane_a * plane_a + plane_b * plane_b);
    if denom == 0.0 {
        if axis > 0.0 {
            return 90.0;
        } else if axis < 0.0 {
            return -90.0;
        }
        return 0.0;
    }
    atanf(axis / denom).to_degrees()
}

/// Compute pitch, roll and yaw from an accelerometer sample in g
///
/// `pitch = atan(ax / √(ay² + az²))`, `roll = atan(ay / √(ax² + az²))`,
/// `yaw = atan(az / √(ax² + ay²))`.
#[must_use]
pub fn compute_angles(ax: f32, ay: f32, az: f32) -> TiltAngles {
    TiltAngles {
        pitch: axis_angle(ax, ay, az),
        roll: axis_angle(ay, ax, az),
        yaw: axis_angle(az, ax, ay),
    }
}

/// Advance one axis of the dot position state machine
///
/// The comparison against the threshold is strict, so an angle exactly at
/// ±threshold produces no movement. Moving past a border is impossible:
/// when the dot is already at the border and still pushed outward, the
/// active color is set to the matching border color and the position holds.
///
/// # Arguments
///
/// * `position` - Current coordinate, in `[0, size - 1]`
/// * `angle` - Driving tilt angle in degrees
/// * `size` - Axis length in pixels
/// * `threshold` - Hysteresis threshold in degrees
/// * `positive_color` - Border color for the `size - 1` edge
/// * `negative_color` - Border color for the `0` edge
/// * `active` - Active dot color, mutated on border pushes
#[must_use]
pub fn step_axis(
    position: usize,
    angle: f32,
    size: usize,
    threshold: f32,
    positive_color: RGB8,
    negative_color: RGB8,
    active: &mut RGB8,
) -> usize {
    if angle > threshold {
        if position < size - 1 {
            position + 1
        } else {
            *active = positive_color;
            position
        }
    } else if angle < -threshold {
        if position > 0 {
            position - 1
        } else {
            *active = negative_color;
            position
        }
    } else {
        position
    }
}

/// Which tilt angle drives which matrix axis
///
/// The two hardware variants mount the IMU with different orientations
/// relative to the LED matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AxisMapping {
    /// ATOM Matrix: pitch drives X, roll drives Y
    AtomMatrix,
    /// M5StickC with the NeoFlash hat: -roll drives X, pitch drives Y
    NeoFlashHat,
}

impl AxisMapping {
    /// Resolve the (x, y) driving angles for this orientation
    #[must_use]
    pub fn drive_angles(&self, angles: TiltAngles) -> (f32, f32) {
        match self {
            Self::AtomMatrix => (angles.pitch, angles.roll),
            Self::NeoFlashHat => (-angles.roll, angles.pitch),
        }
    }
}

/// Border colors per axis and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderPalette {
    /// Color taken when pushed against the right border
    pub x_positive: RGB8,
    /// Color taken when pushed against the left border
    pub x_negative: RGB8,
    /// Color taken when pushed against the bottom border
    pub y_positive: RGB8,
    /// Color taken when pushed against the top border
    pub y_negative: RGB8,
}

impl Default for BorderPalette {
    fn default() -> Self {
        Self {
            x_positive: RGB8::new(20, 0, 0),
            x_negative: RGB8::new(20, 20, 0),
            y_positive: RGB8::new(20, 0, 20),
            y_negative: RGB8::new(0, 20, 20),
        }
    }
}

/// Effect configuration: matrix geometry, threshold and colors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectConfig {
    /// Matrix width in pixels
    pub width: usize,
    /// Matrix height in pixels
    pub height: usize,
    /// Tilt threshold in degrees; strict comparison
    pub threshold: f32,
    /// Dot color at startup
    pub initial_color: RGB8,
    /// Hardware variant orientation
    pub mapping: AxisMapping,
    /// Border colors
    pub palette: BorderPalette,
}

impl EffectConfig {
    /// Preset for the ATOM Matrix (5×5 matrix)
    #[must_use]
    pub fn atom_matrix() -> Self {
        Self {
            width: 5,
            height: 5,
            threshold: 5.0,
            initial_color: RGB8::new(0, 0, 20),
            mapping: AxisMapping::AtomMatrix,
            palette: BorderPalette::default(),
        }
    }

    /// Preset for the M5StickC with the NeoFlash hat (18×7 matrix)
    #[must_use]
    pub fn neoflash_hat() -> Self {
        Self {
            width: 18,
            height: 7,
            threshold: 5.0,
            initial_color: RGB8::new(0, 0, 20),
            mapping: AxisMapping::NeoFlashHat,
            palette: BorderPalette::default(),
        }
    }
}

/// Rendering collaborator contract
///
/// `index` is `row * width + col`; the caller keeps coordinates inside the
/// configured matrix dimensions, no further bounds contract is assumed.
pub trait PixelSink {
    /// Sink error type
    type Error;

    /// Stage one pixel color
    fn set_pixel(&mut self, index: usize, color: RGB8) -> Result<(), Self::Error>;

    /// Push the staged frame out to the hardware
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Frame buffer adapter driving a smart-leds strip
///
/// Stages pixels in an owned frame of `N` LEDs and writes the whole frame
/// through [`SmartLedsWrite`] on flush.
pub struct LedMatrix<S, const N: usize> {
    writer: S,
    frame: [RGB8; N],
}

impl<S, const N: usize> LedMatrix<S, N> {
    /// Create a matrix adapter over a strip writer, all pixels off
    pub fn new(writer: S) -> Self {
        Self {
            writer,
            frame: [RGB8::default(); N],
        }
    }

    /// Current staged frame
    #[must_use]
    pub fn frame(&self) -> &[RGB8; N] {
        &self.frame
    }

    /// Consume the adapter and return the strip writer
    pub fn release(self) -> S {
        self.writer
    }
}

impl<S, const N: usize> PixelSink for LedMatrix<S, N>
where
    S: SmartLedsWrite,
    RGB8: Into<S::Color>,
{
    type Error = S::Error;

    fn set_pixel(&mut self, index: usize, color: RGB8) -> Result<(), Self::Error> {
        self.frame[index] = color;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.writer.write(self.frame.iter().copied())
    }
}

/// The dot state: position, active color, configuration
///
/// One owned instance per effect; there is no hidden module state. The dot
/// starts at the matrix center and persists across cycles.
#[derive(Debug, Clone, Copy)]
pub struct TiltBall {
    config: EffectConfig,
    x: usize,
    y: usize,
    color: RGB8,
}

impl TiltBall {
    /// Create the effect state with the dot at the matrix center
    #[must_use]
    pub fn new(config: EffectConfig) -> Self {
        Self {
            x: config.width / 2,
            y: config.height / 2,
            color: config.initial_color,
            config,
        }
    }

    /// Current dot coordinates
    #[must_use]
    pub const fn position(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    /// Current active color
    #[must_use]
    pub const fn color(&self) -> RGB8 {
        self.color
    }

    /// Frame index of the dot (`row * width + col`)
    #[must_use]
    pub const fn index(&self) -> usize {
        self.y * self.config.width + self.x
    }

    /// Advance both axis state machines for one sample
    pub fn step(&mut self, angles: TiltAngles) {
        let (x_angle, y_angle) = self.config.mapping.drive_angles(angles);
        let palette = self.config.palette;

        self.x = step_axis(
            self.x,
            x_angle,
            self.config.width,
            self.config.threshold,
            palette.x_positive,
            palette.x_negative,
            &mut self.color,
        );
        self.y = step_axis(
            self.y,
            y_angle,
            self.config.height,
            self.config.threshold,
            palette.y_positive,
            palette.y_negative,
            &mut self.color,
        );
    }

    /// Run one render cycle
    ///
    /// Turns the previous pixel off, steps both axes, paints the dot at its
    /// new position in the active color, and flushes the frame.
    ///
    /// # Errors
    ///
    /// Propagates the sink error; the dot state has already advanced when a
    /// flush fails.
    pub fn tick<S: PixelSink>(&mut self, angles: TiltAngles, sink: &mut S) -> Result<(), S::Error> {
        sink.set_pixel(self.index(), RGB8::default())?;
        self.step(angles);
        sink.set_pixel(self.index(), self.color)?;
        sink.flush()
    }
}
