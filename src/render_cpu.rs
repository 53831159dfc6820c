use crate::{
    composite_cpu::{over, premul_from_opacity},
    error::{VaporError, VaporResult},
    sim::Particle,
    surface::Surface,
};

/// Repaint the particle cloud.
///
/// The surface is cleared first; the intact glyph raster is never shown, only
/// its particles. Each live particle covers one logical pixel: a block of
/// `ceil(dpr)` device pixels at its current device position, source-over with
/// the particle color at its current opacity.
pub fn paint_particles(surface: &mut Surface, particles: &[Particle]) {
    surface.clear();

    let size = surface.size();
    if size.is_empty() {
        return;
    }
    let block = surface.dpr().ceil().max(1.0) as i64;
    let (w, h) = (i64::from(size.width), i64::from(size.height));
    let stride = size.width as usize * 4;

    for p in particles {
        if p.opacity <= 0.0 {
            continue;
        }
        let src = premul_from_opacity(p.color, p.opacity);

        let x0 = p.pos.x.floor() as i64;
        let y0 = p.pos.y.floor() as i64;
        if x0 + block <= 0 || y0 + block <= 0 || x0 >= w || y0 >= h {
            continue;
        }

        let data = surface.data_mut();
        for y in y0.max(0)..(y0 + block).min(h) {
            let row = y as usize * stride;
            for x in x0.max(0)..(x0 + block).min(w) {
                let i = row + x as usize * 4;
                let dst = [data[i], data[i + 1], data[i + 2], data[i + 3]];
                let out = over(dst, src, 1.0);
                data[i..i + 4].copy_from_slice(&out);
            }
        }
    }
}

/// Source-over `overlay` onto `base` in place.
///
/// Both surfaces are premultiplied; an opaque base stays opaque, which is how
/// the effect is flattened onto its backdrop for export.
pub fn composite_over(base: &mut Surface, overlay: &Surface) -> VaporResult<()> {
    if base.size() != overlay.size() {
        return Err(VaporError::animation(format!(
            "composite size mismatch: base {:?}, overlay {:?}",
            base.size(),
            overlay.size()
        )));
    }
    let dst = base.data_mut();
    for (d, s) in dst.chunks_exact_mut(4).zip(overlay.data().chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], 1.0);
        d.copy_from_slice(&out);
    }
    Ok(())
}
