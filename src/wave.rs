use rayon::prelude::*;

use crate::{core::SurfaceSize, surface::Surface};

/// Seconds of shader time per second of wall clock.
const TIME_RATE: f64 = 0.6;

/// Scalar inputs of the wave fragment function.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WaveUniforms {
    /// Horizontal frequency of the sine band.
    pub x_scale: f64,
    /// Vertical amplitude of the sine band.
    pub y_scale: f64,
    /// Chromatic spread between the three channel lobes.
    pub distortion: f64,
}

impl Default for WaveUniforms {
    fn default() -> Self {
        Self {
            x_scale: 1.0,
            y_scale: 0.5,
            distortion: 0.05,
        }
    }
}

/// Full-surface animated wave backdrop.
///
/// One glowing sine band evaluated per pixel, fragment-shader style: the red
/// and blue channels are sampled at slightly distorted x positions, which
/// fringes the band toward its ends.
pub struct WaveSession {
    surface: Surface,
    uniforms: WaveUniforms,
    time: f64,
}

impl WaveSession {
    pub fn new(surface: Surface) -> Self {
        Self::with_uniforms(surface, WaveUniforms::default())
    }

    pub fn with_uniforms(surface: Surface, uniforms: WaveUniforms) -> Self {
        Self {
            surface,
            uniforms,
            time: 0.0,
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn uniforms(&self) -> WaveUniforms {
        self.uniforms
    }

    /// Shader time in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Advance shader time by `dt` seconds and repaint the whole surface.
    ///
    /// Non-finite or negative `dt` counts as zero time, which repaints the
    /// current frame unchanged.
    pub fn render(&mut self, dt: f64) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.time += dt * TIME_RATE;
        self.fill();
    }

    /// Change the target dimensions. The next `render` paints at the new
    /// size; shader time is unaffected.
    pub fn resize(&mut self, size: SurfaceSize) {
        self.surface.resize(size);
    }

    fn fill(&mut self) {
        let size = self.surface.size();
        if size.is_empty() {
            return;
        }
        let width = size.width as usize;
        let height = f64::from(size.height);
        let w = f64::from(size.width);
        let min_dim = w.min(height);
        let u = self.uniforms;
        let time = self.time;

        self.surface
            .data_mut()
            .par_chunks_exact_mut(width * 4)
            .enumerate()
            .for_each(|(row, pixels)| {
                // Fragment y counts up from the bottom edge, rows count down
                // from the top.
                let frag_y = height - row as f64 - 0.5;
                let py = (frag_y * 2.0 - height) / min_dim;
                for (col, px_bytes) in pixels.chunks_exact_mut(4).enumerate() {
                    let frag_x = col as f64 + 0.5;
                    let px = (frag_x * 2.0 - w) / min_dim;
                    let d = (px * px + py * py).sqrt() * u.distortion;

                    let r = band(px * (1.0 + d), py, time, u);
                    let g = band(px, py, time, u);
                    let b = band(px * (1.0 - d), py, time, u);

                    px_bytes[0] = to_channel_u8(r);
                    px_bytes[1] = to_channel_u8(g);
                    px_bytes[2] = to_channel_u8(b);
                    px_bytes[3] = 255;
                }
            });
    }
}

/// Glow intensity of one channel at normalized coordinates.
///
/// Unbounded near the band center where the denominator crosses zero; the
/// caller clamps.
fn band(cx: f64, py: f64, time: f64, u: WaveUniforms) -> f64 {
    0.05 / (py + ((cx + time) * u.x_scale).sin() * u.y_scale).abs()
}

fn to_channel_u8(v: f64) -> u8 {
    (v.min(1.0).max(0.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(w: u32, h: u32) -> Surface {
        Surface::new(w, h, 1.0).unwrap()
    }

    #[test]
    fn renders_an_opaque_frame() {
        let mut s = WaveSession::new(surface(16, 8));
        s.render(0.0);
        let data = s.surface().data();
        assert!(data.chunks_exact(4).all(|p| p[3] == 255));
        assert!(data.chunks_exact(4).any(|p| p[0] > 0 || p[1] > 0 || p[2] > 0));
    }

    #[test]
    fn zero_distortion_is_channel_aligned() {
        let uniforms = WaveUniforms {
            distortion: 0.0,
            ..WaveUniforms::default()
        };
        let mut s = WaveSession::with_uniforms(surface(16, 8), uniforms);
        s.render(0.25);
        for p in s.surface().data().chunks_exact(4) {
            assert_eq!(p[0], p[1]);
            assert_eq!(p[1], p[2]);
        }
    }

    #[test]
    fn time_advances_at_the_shader_rate() {
        let mut s = WaveSession::new(surface(4, 4));
        s.render(1.0);
        assert!((s.time() - 0.6).abs() < 1e-12);
        s.render(0.5);
        assert!((s.time() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn bad_dt_does_not_rewind_time() {
        let mut s = WaveSession::new(surface(4, 4));
        s.render(1.0);
        s.render(-3.0);
        s.render(f64::NAN);
        assert!((s.time() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn equal_time_renders_equal_frames() {
        let mut a = WaveSession::new(surface(20, 10));
        let mut b = WaveSession::new(surface(20, 10));
        a.render(0.3);
        a.render(0.3);
        b.render(0.6);
        assert_eq!(a.surface().data(), b.surface().data());
    }

    #[test]
    fn resize_redirects_the_next_frame() {
        let mut s = WaveSession::new(surface(8, 8));
        s.render(0.1);
        s.resize(SurfaceSize::new(12, 6));
        assert_eq!(s.surface().size(), SurfaceSize::new(12, 6));
        s.render(0.0);
        assert_eq!(s.surface().data().len(), 12 * 6 * 4);
        assert!((s.time() - 0.06).abs() < 1e-12);
    }

    #[test]
    fn zero_area_render_is_a_noop() {
        let mut s = WaveSession::new(surface(0, 5));
        s.render(0.5);
        assert!(s.surface().data().is_empty());
    }
}
