/// Linearly remap `v` from `[in_min, in_max]` to `[out_min, out_max]`, clamping
/// the result to the output range.
pub fn remap_clamped(v: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    let span = in_max - in_min;
    if span == 0.0 {
        return out_min;
    }
    let t = (v - in_min) / span;
    let out = out_min + t * (out_max - out_min);
    if out_max >= out_min {
        out.clamp(out_min, out_max)
    } else {
        out.clamp(out_max, out_min)
    }
}

/// Control points of the font-size to dispersion-base curve.
const SPREAD_POINTS: [(f64, f64); 3] = [(20.0, 0.2), (50.0, 0.5), (100.0, 1.5)];

/// Base dispersion amplitude for a font size in pixels.
///
/// Piecewise-linear through the control points, held flat outside them. Small
/// glyphs scatter just a fraction of a pixel per step; display sizes scatter
/// more than one.
pub fn spread_base_for_font_size(size_px: f64) -> f64 {
    let (first, last) = (SPREAD_POINTS[0], SPREAD_POINTS[SPREAD_POINTS.len() - 1]);
    if size_px <= first.0 {
        return first.1;
    }
    if size_px >= last.0 {
        return last.1;
    }

    let i = SPREAD_POINTS.partition_point(|&(s, _)| s < size_px) - 1;
    let (s0, v0) = SPREAD_POINTS[i];
    let (s1, v1) = SPREAD_POINTS[i + 1];
    v0 + (size_px - s0) * (v1 - v0) / (s1 - s0)
}

/// Deterministic xorshift64* generator.
///
/// The simulation draws per-particle angles, speeds and jitter from this
/// stream; seeding it from the config keeps whole runs reproducible.
#[derive(Clone, Debug)]
pub struct VaporRng {
    state: u64,
}

impl VaporRng {
    /// Seed the generator. Any seed is valid, including zero.
    pub fn new(seed: u64) -> Self {
        // splitmix64 scramble so nearby seeds do not yield nearby streams and
        // the xorshift state is never zero.
        let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        Self { state: z | 1 }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Uniform f64 in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform f64 in `[lo, hi)`.
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + self.next_f64() * (hi - lo)
    }
}
