use kurbo::Shape;

use crate::{
    core::{Rgb8, SurfaceSize, TextBoundary, unpremul_channel},
    error::{VaporError, VaporResult},
    model::{VaporSource, VaporizeConfig},
    raster::text::{TextBrushRgba8, TextLayoutEngine},
    sim::Particle,
};

pub mod text;

/// Reference device-pixel ratio the sampling stride is defined against.
const BASE_DPR: f64 = 3.0;

/// Everything the simulator needs from one rasterization.
#[derive(Clone, Debug)]
pub struct RasterOutput {
    pub particles: Vec<Particle>,
    pub boundary: TextBoundary,
    pub sample_rate: u32,
}

impl RasterOutput {
    /// Output for a target that cannot produce particles.
    pub fn empty(center_x: f64) -> Self {
        Self {
            particles: Vec::new(),
            boundary: TextBoundary::centered(center_x, 0.0),
            sample_rate: 1,
        }
    }
}

/// Sampling stride in device pixels for a device-pixel ratio.
///
/// At the baseline DPR every pixel becomes a particle; denser displays skip
/// pixels so the particle count stays roughly resolution-independent.
pub fn sample_rate_for_dpr(dpr: f64) -> u32 {
    ((dpr / BASE_DPR).round() as i64).max(1) as u32
}

/// Initial opacity of a sampled pixel.
///
/// The stride-to-DPR ratio spreads one pixel's worth of coverage over the
/// block each particle paints, so the at-rest cloud has the same apparent
/// density as the glyph it came from. Capped at 1: below a DPR of 1 the
/// stride floors at one pixel and the ratio would overshoot full coverage.
pub fn initial_opacity(alpha: u8, sample_rate: u32, dpr: f64) -> f64 {
    (f64::from(alpha) / 255.0 * (f64::from(sample_rate) / dpr)).min(1.0)
}

/// Turns a configured source into particles on a scratch raster.
///
/// The raster buffer lives only for the duration of one call; the host
/// surface never shows the intact source.
pub struct Rasterizer {
    text_engine: TextLayoutEngine,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer {
    pub fn new() -> Self {
        Self {
            text_engine: TextLayoutEngine::new(),
        }
    }

    /// Rasterize the configured source at device resolution and sample it
    /// into particles.
    pub fn rasterize(
        &mut self,
        config: &VaporizeConfig,
        size: SurfaceSize,
        dpr: f64,
    ) -> VaporResult<RasterOutput> {
        let center_x = f64::from(size.width) / 2.0;
        if size.is_empty() {
            return Ok(RasterOutput::empty(center_x));
        }
        let center_y = f64::from(size.height) / 2.0;

        let width: u16 = size
            .width
            .try_into()
            .map_err(|_| VaporError::raster("surface width exceeds u16 range"))?;
        let height: u16 = size
            .height
            .try_into()
            .map_err(|_| VaporError::raster("surface height exceeds u16 range"))?;

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        let boundary = match &config.source {
            VaporSource::Text { text, font } => {
                let font_bytes = std::fs::read(&font.source).map_err(|e| {
                    VaporError::raster(format!("failed to read font '{}': {e}", font.source))
                })?;
                let brush = TextBrushRgba8 {
                    r: config.color.r,
                    g: config.color.g,
                    b: config.color.b,
                    a: 255,
                };
                // Font size scales with DPR so glyphs land on device pixels.
                let layout = self.text_engine.layout_plain(
                    text,
                    &font_bytes,
                    font.size_px * dpr as f32,
                    font.weight,
                    brush,
                )?;

                let text_width = f64::from(layout.width());
                let left = center_x - text_width / 2.0;
                let top = center_y - f64::from(layout.height()) / 2.0;

                let font_data = vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(font_bytes),
                    0,
                );
                ctx.set_transform(vello_cpu::kurbo::Affine::translate((left, top)));
                for line in layout.lines() {
                    for item in line.items() {
                        let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                            continue;
                        };
                        let b = run.style().brush;
                        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(b.r, b.g, b.b, b.a));
                        let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                            id: g.id,
                            x: g.x,
                            y: g.y,
                        });
                        ctx.glyph_run(&font_data)
                            .font_size(run.run().font_size())
                            .fill_glyphs(glyphs);
                    }
                }

                TextBoundary::centered(center_x, text_width)
            }
            VaporSource::Path { svg_path_d } => {
                let path = kurbo::BezPath::from_svg(svg_path_d.trim())
                    .map_err(|e| VaporError::validation(format!("invalid svg_path_d: {e}")))?;
                let bbox = path.bounding_box();
                if bbox.width() <= 0.0 || bbox.height() <= 0.0 {
                    return Ok(RasterOutput::empty(center_x));
                }

                let offset = (
                    center_x - (bbox.x0 + bbox.x1) / 2.0,
                    center_y - (bbox.y0 + bbox.y1) / 2.0,
                );
                ctx.set_transform(vello_cpu::kurbo::Affine::translate(offset));
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    config.color.r,
                    config.color.g,
                    config.color.b,
                    255,
                ));
                ctx.fill_path(&bezpath_to_cpu(&path));

                TextBoundary::centered(center_x, bbox.width())
            }
        };

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        let sample_rate = sample_rate_for_dpr(dpr);
        let particles = sample_particles(&pixmap, sample_rate, dpr);

        Ok(RasterOutput {
            particles,
            boundary,
            sample_rate,
        })
    }
}

/// Walk the raster with the sampling stride and lift every covered pixel into
/// a particle, recovering straight RGB from the premultiplied buffer.
fn sample_particles(pixmap: &vello_cpu::Pixmap, sample_rate: u32, dpr: f64) -> Vec<Particle> {
    let data = pixmap.data_as_u8_slice();
    let width = usize::from(pixmap.width());
    let height = usize::from(pixmap.height());
    let step = sample_rate as usize;

    let mut particles = Vec::new();
    let mut y = 0usize;
    while y < height {
        let mut x = 0usize;
        while x < width {
            let i = (y * width + x) * 4;
            let a = data[i + 3];
            if a > 0 {
                let color = Rgb8::new(
                    unpremul_channel(data[i], a),
                    unpremul_channel(data[i + 1], a),
                    unpremul_channel(data[i + 2], a),
                );
                particles.push(Particle::at_rest(
                    x as f64,
                    y as f64,
                    color,
                    initial_opacity(a, sample_rate, dpr),
                ));
            }
            x += step;
        }
        y += step;
    }
    particles
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    let mut out = vello_cpu::kurbo::BezPath::new();
    for el in path.elements() {
        match *el {
            kurbo::PathEl::MoveTo(p) => out.move_to((p.x, p.y)),
            kurbo::PathEl::LineTo(p) => out.line_to((p.x, p.y)),
            kurbo::PathEl::QuadTo(p1, p2) => out.quad_to((p1.x, p1.y), (p2.x, p2.y)),
            kurbo::PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to((p1.x, p1.y), (p2.x, p2.y), (p3.x, p3.y))
            }
            kurbo::PathEl::ClosePath => out.close_path(),
        }
    }
    out
}
