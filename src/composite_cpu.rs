use crate::core::{Rgb8, premul_channel};

pub type PremulRgba8 = [u8; 4];

/// Premultiplied source-over with an extra opacity factor.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Premultiplied pixel for a straight color at a fractional opacity.
pub fn premul_from_opacity(color: Rgb8, opacity: f64) -> PremulRgba8 {
    let a = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    [
        premul_channel(color.r, a),
        premul_channel(color.g, a),
        premul_channel(color.b, a),
        a,
    ]
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_opacity_0_is_noop() {
        let dst = [1, 2, 3, 4];
        let src = [200, 200, 200, 200];
        assert_eq!(over(dst, src, 0.0), dst);
    }

    #[test]
    fn over_src_alpha_0_is_noop() {
        let dst = [10, 20, 30, 40];
        let src = [255, 255, 255, 0];
        assert_eq!(over(dst, src, 1.0), dst);
    }

    #[test]
    fn over_src_opaque_replaces_dst() {
        let dst = [0, 0, 0, 255];
        let src = [255, 0, 0, 255];
        assert_eq!(over(dst, src, 1.0), src);
    }

    #[test]
    fn over_dst_transparent_returns_src() {
        let dst = [0, 0, 0, 0];
        let src = [100, 110, 120, 200];
        assert_eq!(over(dst, src, 1.0), src);
    }

    #[test]
    fn premul_from_opacity_scales_channels() {
        let px = premul_from_opacity(Rgb8::WHITE, 0.5);
        assert_eq!(px[3], 128);
        assert_eq!(px[0], 128);
        let zero = premul_from_opacity(Rgb8::new(10, 20, 30), 0.0);
        assert_eq!(zero, [0, 0, 0, 0]);
        let clamped = premul_from_opacity(Rgb8::WHITE, 4.0);
        assert_eq!(clamped, [255, 255, 255, 255]);
    }
}
