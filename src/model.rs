use crate::{
    core::Rgb8,
    error::{VaporError, VaporResult},
    math::{remap_clamped, spread_base_for_font_size},
};

/// Floor applied to non-finite or non-positive `duration_secs`.
const MIN_DURATION_SECS: f64 = 1e-3;
/// Floor applied to non-finite or non-positive `spread`.
const MIN_SPREAD: f64 = 1e-3;

/// What gets rasterized into particles.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum VaporSource {
    /// Shaped text rendered with an explicit font file.
    Text { text: String, font: FontSpec },
    /// A filled vector path given as SVG path data, in device-pixel units.
    Path { svg_path_d: String },
}

impl Default for VaporSource {
    fn default() -> Self {
        Self::Text {
            text: "Tracky".to_string(),
            font: FontSpec::default(),
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct FontSpec {
    /// Font file path, resolved by the caller before rasterization.
    pub source: String,
    pub size_px: f32,
    pub weight: u16,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            source: String::new(),
            size_px: 72.0,
            weight: 800,
        }
    }
}

/// One vaporization run, fully described.
///
/// Out-of-range knob values are sanitized by the accessor methods rather
/// than rejected, so a hostile config can degrade the visuals but not the
/// run.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct VaporizeConfig {
    #[serde(default)]
    pub source: VaporSource,
    #[serde(default)]
    pub color: Rgb8,
    /// Dispersion multiplier on the font-size-derived base.
    #[serde(default = "default_spread")]
    pub spread: f64,
    /// Particle retention knob, 0..10. Low values fast-fade most particles.
    #[serde(default = "default_density")]
    pub density: f64,
    /// Sweep duration for the front to cross the source.
    #[serde(default = "default_duration_secs")]
    pub duration_secs: f64,
    /// Determinism seed for the per-run random stream.
    #[serde(default)]
    pub seed: u64,
}

fn default_spread() -> f64 {
    5.0
}

fn default_density() -> f64 {
    5.0
}

fn default_duration_secs() -> f64 {
    2.0
}

impl Default for VaporizeConfig {
    fn default() -> Self {
        Self {
            source: VaporSource::default(),
            color: Rgb8::default(),
            spread: default_spread(),
            density: default_density(),
            duration_secs: default_duration_secs(),
            seed: 0,
        }
    }
}

impl VaporizeConfig {
    /// Reject configs that can never rasterize.
    pub fn validate(&self) -> VaporResult<()> {
        if let VaporSource::Text { font, .. } = &self.source {
            if font.source.trim().is_empty() {
                return Err(VaporError::validation(
                    "text source requires a font file path",
                ));
            }
            if !font.size_px.is_finite() || font.size_px <= 0.0 {
                return Err(VaporError::validation(
                    "font size_px must be finite and > 0",
                ));
            }
        }
        Ok(())
    }

    /// Sweep duration with the positivity floor applied.
    pub fn duration_secs_clamped(&self) -> f64 {
        if self.duration_secs.is_finite() && self.duration_secs > 0.0 {
            self.duration_secs
        } else {
            MIN_DURATION_SECS
        }
    }

    /// Spread multiplier with the positivity floor applied.
    pub fn spread_clamped(&self) -> f64 {
        if self.spread.is_finite() && self.spread > 0.0 {
            self.spread
        } else {
            MIN_SPREAD
        }
    }

    /// Dispersion amplitude in pixels: font-size base times the multiplier.
    ///
    /// Path sources have no font size; they use the largest base so bar-sized
    /// shapes scatter visibly.
    pub fn spread_px(&self) -> f64 {
        let base = match &self.source {
            VaporSource::Text { font, .. } => spread_base_for_font_size(f64::from(font.size_px)),
            VaporSource::Path { .. } => spread_base_for_font_size(100.0),
        };
        base * self.spread_clamped()
    }

    /// Density remapped from the 0..10 input scale to the 0.3..1 Bernoulli
    /// scale used for the decay draw.
    pub fn density_norm(&self) -> f64 {
        let d = if self.density.is_finite() {
            self.density
        } else {
            default_density()
        };
        remap_clamped(d, 0.0, 10.0, 0.3, 1.0)
    }
}
