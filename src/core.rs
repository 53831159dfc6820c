use crate::error::{VaporError, VaporResult};

pub use kurbo::{BezPath, Point, Vec2};

/// Straight (non-premultiplied) RGB color, full alpha implied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
    };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for Rgb8 {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Premultiply a straight channel value by an alpha byte.
pub fn premul_channel(c: u8, a: u8) -> u8 {
    let c = u16::from(c);
    let a = u16::from(a);
    (((c * a) + 127) / 255) as u8
}

/// Recover a straight channel value from a premultiplied one.
///
/// Zero alpha maps to zero.
pub fn unpremul_channel(c: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    let c = u32::from(c);
    let a = u32::from(a);
    (((c * 255) + a / 2) / a).min(255) as u8
}

/// Pixel dimensions of a render target, in device pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SurfaceSize {
    /// Width in device pixels.
    pub width: u32,
    /// Height in device pixels.
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Pixel count, saturating.
    pub fn area(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Horizontal extent of the rasterized source in device-pixel coordinates.
///
/// The sweep front travels from `left` to `right`; `width` is their distance.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextBoundary {
    /// Leftmost device-pixel x of the source.
    pub left: f64,
    /// Rightmost device-pixel x of the source.
    pub right: f64,
    /// `right - left`.
    pub width: f64,
}

impl TextBoundary {
    /// Boundary of a measured width centered on `center_x`.
    pub fn centered(center_x: f64, width: f64) -> Self {
        let width = width.max(0.0);
        let left = center_x - width / 2.0;
        Self {
            left,
            right: left + width,
            width,
        }
    }

    /// Sweep front position for a progress value in percent.
    ///
    /// Progress is clamped to 100 so the front never overshoots `right`.
    pub fn front_at(self, progress_pct: f64) -> f64 {
        self.left + self.width * progress_pct.min(100.0) / 100.0
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> VaporResult<Self> {
        if den == 0 {
            return Err(VaporError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(VaporError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }
}
