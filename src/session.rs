use crate::{
    core::{SurfaceSize, TextBoundary},
    error::{VaporError, VaporResult},
    math::VaporRng,
    model::VaporizeConfig,
    raster::{RasterOutput, Rasterizer},
    render_cpu::paint_particles,
    sim::{Particle, SweepParams, advance_particles},
    surface::Surface,
};

/// Animation lifecycle. Transitions only move rightward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Complete,
}

/// One vaporization run: rasterized particles, a progress clock, and the
/// surface they are painted into.
///
/// The session is single-threaded and host-driven: the host calls
/// `advance(dt)` once per display frame while the run is live. A session is
/// one-shot; `start` after completion does nothing.
pub struct VaporizeSession {
    config: VaporizeConfig,
    surface: Surface,
    rasterizer: Rasterizer,
    rng: VaporRng,

    particles: Vec<Particle>,
    boundary: TextBoundary,

    phase: Phase,
    progress: f64,
    pending_resize: Option<SurfaceSize>,
    on_complete: Option<Box<dyn FnOnce()>>,
}

impl VaporizeSession {
    /// Build a session, rasterize the source, and paint the at-rest frame.
    ///
    /// Invalid configs fail here; I/O trouble (an unreadable font file) is
    /// downgraded to an empty particle set so the run still completes and the
    /// host's flow is never blocked on a visual.
    #[tracing::instrument(skip_all, fields(seed = config.seed))]
    pub fn new(
        config: VaporizeConfig,
        surface: Surface,
        on_complete: impl FnOnce() + 'static,
    ) -> VaporResult<Self> {
        config.validate()?;

        let mut session = Self {
            rng: VaporRng::new(config.seed),
            config,
            surface,
            rasterizer: Rasterizer::new(),
            particles: Vec::new(),
            boundary: TextBoundary::default(),
            phase: Phase::Idle,
            progress: 0.0,
            pending_resize: None,
            on_complete: Some(Box::new(on_complete)),
        };
        session.rasterize_in_place()?;
        paint_particles(&mut session.surface, &session.particles);
        Ok(session)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Sweep progress in percent, clamped to 100 for display.
    pub fn progress(&self) -> f64 {
        self.progress.min(100.0)
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn config(&self) -> &VaporizeConfig {
        &self.config
    }

    pub fn boundary(&self) -> TextBoundary {
        self.boundary
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Begin the run. No-op unless the session is idle.
    pub fn start(&mut self) {
        if self.phase != Phase::Idle {
            return;
        }
        self.progress = 0.0;
        self.phase = Phase::Running;
        tracing::debug!(particles = self.particles.len(), "vaporize run started");
    }

    /// Advance the run by `dt` seconds and repaint the surface.
    ///
    /// Outside `Running` this does nothing. Non-finite or negative `dt`
    /// counts as zero time. Returns the phase after the step so the host can
    /// stop scheduling frames on `Complete`.
    pub fn advance(&mut self, dt: f64) -> Phase {
        if self.phase != Phase::Running {
            return self.phase;
        }

        if self.surface.size().is_empty() {
            self.complete();
            return self.phase;
        }

        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let duration_secs = self.config.duration_secs_clamped();
        self.progress += dt * 100.0 / duration_secs;

        let params = SweepParams {
            vaporize_x: self.boundary.front_at(self.progress),
            spread_px: self.config.spread_px(),
            duration_ms: duration_secs * 1000.0,
            density_norm: self.config.density_norm(),
        };
        let all_vaporized = advance_particles(&mut self.particles, &mut self.rng, &params, dt);

        paint_particles(&mut self.surface, &self.particles);

        if self.progress >= 100.0 && all_vaporized {
            self.complete();
        }
        self.phase
    }

    /// Cancel the run. Idempotent; the completion callback is dropped
    /// unfired.
    pub fn stop(&mut self) {
        if self.on_complete.take().is_some() && self.phase == Phase::Running {
            tracing::debug!("vaporize run cancelled");
        }
        self.phase = Phase::Complete;
        self.apply_pending_resize();
    }

    /// Change the target dimensions.
    ///
    /// Idle sessions re-rasterize immediately. A running session keeps its
    /// particle set; the new size is remembered and applied once the run
    /// leaves `Running`, because re-materializing half-vaporized glyphs reads
    /// as a glitch.
    pub fn resize(&mut self, size: SurfaceSize) {
        match self.phase {
            Phase::Running => {
                tracing::debug!(?size, "resize deferred until the run ends");
                self.pending_resize = Some(size);
            }
            Phase::Idle => {
                self.surface.resize(size);
                if let Err(e) = self.rasterize_in_place() {
                    // Config was valid at construction, so only I/O can fail
                    // here; keep the degenerate empty run.
                    tracing::warn!(error = %e, "re-rasterization failed; particle set is empty");
                    self.particles = Vec::new();
                    self.boundary =
                        TextBoundary::centered(f64::from(size.width) / 2.0, 0.0);
                }
                paint_particles(&mut self.surface, &self.particles);
            }
            Phase::Complete => {
                self.surface.resize(size);
            }
        }
    }

    fn complete(&mut self) {
        self.phase = Phase::Complete;
        self.apply_pending_resize();
        if let Some(cb) = self.on_complete.take() {
            tracing::debug!(progress = self.progress, "vaporize run complete");
            cb();
        }
    }

    fn apply_pending_resize(&mut self) {
        if let Some(size) = self.pending_resize.take() {
            self.surface.resize(size);
        }
    }

    /// Rasterize and install particles. Validation errors propagate; raster
    /// (I/O-level) errors degrade to an empty set with a warning.
    fn rasterize_in_place(&mut self) -> VaporResult<()> {
        let size = self.surface.size();
        let out = match self
            .rasterizer
            .rasterize(&self.config, size, self.surface.dpr())
        {
            Ok(out) => out,
            Err(VaporError::Raster(msg)) => {
                tracing::warn!(%msg, "rasterization failed; continuing with an empty particle set");
                RasterOutput::empty(f64::from(size.width) / 2.0)
            }
            Err(e) => return Err(e),
        };
        self.particles = out.particles;
        self.boundary = out.boundary;
        Ok(())
    }
}
