use crate::{
    core::{Point, Rgb8, Vec2},
    math::VaporRng,
};

/// Opacity below which a particle no longer holds the run open.
const SETTLED_OPACITY: f64 = 0.01;
/// Pull back toward the origin, per pixel of displacement.
const RESTORING: f64 = 0.002;
/// Velocity-to-position scale per second, horizontal.
const VEL_SCALE_X: f64 = 20.0;
/// Velocity-to-position scale per second, vertical.
const VEL_SCALE_Y: f64 = 10.0;
/// Dispersed-particle fade rate per second at the 2s reference duration.
const BASE_FADE_RATE: f64 = 0.25;
/// Reference duration the fade rate is normalized against, in ms.
const REFERENCE_DURATION_MS: f64 = 2000.0;

/// How a swept particle loses opacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecayMode {
    /// Disperse with jittered velocity while fading at the duration-scaled
    /// rate.
    SpreadAndFade,
    /// Stay in place and fade at one opacity unit per second.
    FastFade,
}

/// One sampled source pixel.
///
/// `origin` never changes after rasterization; sweep membership and the
/// restoring force both read it. `decay` doubles as the first-sweep marker:
/// `None` means the front has not reached this particle yet.
#[derive(Clone, Debug)]
pub struct Particle {
    pub origin: Point,
    pub pos: Point,
    pub color: Rgb8,
    pub opacity: f64,
    pub velocity: Vec2,
    pub angle: f64,
    pub speed: f64,
    pub decay: Option<DecayMode>,
}

impl Particle {
    /// A freshly sampled particle sitting at its origin.
    pub fn at_rest(x: f64, y: f64, color: Rgb8, opacity: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            pos: Point::new(x, y),
            color,
            opacity,
            velocity: Vec2::ZERO,
            angle: 0.0,
            speed: 0.0,
            decay: None,
        }
    }

    /// Whether this particle still blocks completion.
    pub fn holds_run_open(&self) -> bool {
        self.decay.is_none() || self.opacity > SETTLED_OPACITY
    }
}

/// Per-step inputs shared by every particle.
#[derive(Clone, Copy, Debug)]
pub struct SweepParams {
    /// Current front position in device pixels.
    pub vaporize_x: f64,
    /// Dispersion amplitude in pixels.
    pub spread_px: f64,
    /// Configured sweep duration in milliseconds.
    pub duration_ms: f64,
    /// Probability that a swept particle disperses instead of fast-fading.
    pub density_norm: f64,
}

/// Advance every particle by `dt` seconds against the current front.
///
/// Particles left of the front receive their velocity, angle and decay mode
/// on the first step that reaches them, then integrate in place. Returns
/// `true` once every particle has been swept and faded out; unswept particles
/// always report the run as still live.
pub fn advance_particles(
    particles: &mut [Particle],
    rng: &mut VaporRng,
    params: &SweepParams,
    dt: f64,
) -> bool {
    let mut all_vaporized = true;
    let max_velocity = params.spread_px * 2.0;
    let fade_rate = BASE_FADE_RATE * (REFERENCE_DURATION_MS / params.duration_ms.max(1.0));

    for p in particles.iter_mut() {
        if p.origin.x > params.vaporize_x {
            all_vaporized = false;
            continue;
        }

        let decay = match p.decay {
            Some(d) => d,
            None => {
                p.angle = rng.uniform(0.0, std::f64::consts::TAU);
                p.speed = rng.uniform(0.5, 1.5) * params.spread_px;
                p.velocity = Vec2::new(p.angle.cos() * p.speed, p.angle.sin() * p.speed);
                let d = if rng.next_f64() > params.density_norm {
                    DecayMode::FastFade
                } else {
                    DecayMode::SpreadAndFade
                };
                p.decay = Some(d);
                d
            }
        };

        match decay {
            DecayMode::FastFade => {
                p.opacity = (p.opacity - dt).max(0.0);
            }
            DecayMode::SpreadAndFade => {
                let dx = p.origin.x - p.pos.x;
                let dy = p.origin.y - p.pos.y;
                let dist = (dx * dx + dy * dy).sqrt();
                let damping = (1.0 - dist / (100.0 * params.spread_px)).max(0.95);

                let jitter = params.spread_px * 3.0;
                let jx = (rng.next_f64() - 0.5) * jitter;
                let jy = (rng.next_f64() - 0.5) * jitter;

                p.velocity.x = (p.velocity.x + jx + dx * RESTORING) * damping;
                p.velocity.y = (p.velocity.y + jy + dy * RESTORING) * damping;

                let v = p.velocity.hypot();
                if v > max_velocity {
                    p.velocity *= max_velocity / v;
                }

                p.pos.x += p.velocity.x * dt * VEL_SCALE_X;
                p.pos.y += p.velocity.y * dt * VEL_SCALE_Y;

                p.opacity = (p.opacity - dt * fade_rate).max(0.0);
            }
        }

        if p.holds_run_open() {
            all_vaporized = false;
        }
    }

    all_vaporized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swept(vaporize_x: f64) -> SweepParams {
        SweepParams {
            vaporize_x,
            spread_px: 5.0,
            duration_ms: 2000.0,
            density_norm: 0.65,
        }
    }

    #[test]
    fn unswept_particle_never_moves_and_blocks_completion() {
        let mut ps = vec![Particle::at_rest(50.0, 10.0, Rgb8::WHITE, 0.3)];
        let mut rng = VaporRng::new(1);
        let done = advance_particles(&mut ps, &mut rng, &swept(10.0), 0.016);
        assert!(!done);
        assert_eq!(ps[0].pos, Point::new(50.0, 10.0));
        assert_eq!(ps[0].opacity, 0.3);
        assert!(ps[0].decay.is_none());
    }

    #[test]
    fn first_sweep_assigns_motion_exactly_once() {
        let mut ps = vec![Particle::at_rest(5.0, 10.0, Rgb8::WHITE, 0.3)];
        let mut rng = VaporRng::new(1);
        advance_particles(&mut ps, &mut rng, &swept(10.0), 0.016);
        let angle = ps[0].angle;
        let speed = ps[0].speed;
        let decay = ps[0].decay;
        assert!(decay.is_some());
        assert!(speed >= 0.5 * 5.0 && speed < 1.5 * 5.0);

        advance_particles(&mut ps, &mut rng, &swept(10.0), 0.016);
        assert_eq!(ps[0].angle, angle);
        assert_eq!(ps[0].speed, speed);
        assert_eq!(ps[0].decay, decay);
    }

    #[test]
    fn fast_fade_loses_exactly_dt() {
        let mut p = Particle::at_rest(0.0, 0.0, Rgb8::WHITE, 1.0);
        p.decay = Some(DecayMode::FastFade);

        // Rate is independent of spread and duration.
        for sp in [
            SweepParams {
                vaporize_x: 10.0,
                spread_px: 0.5,
                duration_ms: 500.0,
                density_norm: 0.3,
            },
            SweepParams {
                vaporize_x: 10.0,
                spread_px: 7.5,
                duration_ms: 8000.0,
                density_norm: 1.0,
            },
        ] {
            let mut ps = vec![p.clone()];
            let mut rng = VaporRng::new(3);
            advance_particles(&mut ps, &mut rng, &sp, 0.016);
            assert!((ps[0].opacity - (1.0 - 0.016)).abs() < 1e-12);
            assert_eq!(ps[0].pos, Point::new(0.0, 0.0));
        }
    }

    #[test]
    fn opacity_floors_at_zero() {
        let mut p = Particle::at_rest(0.0, 0.0, Rgb8::WHITE, 0.05);
        p.decay = Some(DecayMode::FastFade);
        let mut ps = vec![p];
        let mut rng = VaporRng::new(3);
        advance_particles(&mut ps, &mut rng, &swept(10.0), 1.0);
        assert_eq!(ps[0].opacity, 0.0);
    }

    #[test]
    fn opacity_is_monotonically_non_increasing() {
        let mut ps: Vec<Particle> = (0..32)
            .map(|i| Particle::at_rest(f64::from(i), 0.0, Rgb8::WHITE, 0.33))
            .collect();
        let mut rng = VaporRng::new(7);
        let mut last: Vec<f64> = ps.iter().map(|p| p.opacity).collect();
        for step in 0..300 {
            let front = f64::from(step);
            advance_particles(&mut ps, &mut rng, &swept(front), 0.016);
            for (p, prev) in ps.iter().zip(&last) {
                assert!(p.opacity <= *prev + 1e-12);
            }
            last = ps.iter().map(|p| p.opacity).collect();
        }
    }

    #[test]
    fn dispersed_velocity_respects_speed_clamp() {
        let mut ps = vec![Particle::at_rest(0.0, 0.0, Rgb8::WHITE, 0.33)];
        ps[0].decay = Some(DecayMode::SpreadAndFade);
        let mut rng = VaporRng::new(11);
        let sp = swept(10.0);
        for _ in 0..200 {
            advance_particles(&mut ps, &mut rng, &sp, 0.016);
            assert!(ps[0].velocity.hypot() <= sp.spread_px * 2.0 + 1e-9);
        }
    }

    #[test]
    fn same_seed_same_trajectories() {
        let build = || -> Vec<Particle> {
            (0..16)
                .map(|i| Particle::at_rest(f64::from(i), 2.0, Rgb8::WHITE, 0.33))
                .collect()
        };
        let mut a = build();
        let mut b = build();
        let mut rng_a = VaporRng::new(99);
        let mut rng_b = VaporRng::new(99);
        for _ in 0..100 {
            advance_particles(&mut a, &mut rng_a, &swept(100.0), 0.016);
            advance_particles(&mut b, &mut rng_b, &swept(100.0), 0.016);
        }
        for (pa, pb) in a.iter().zip(&b) {
            assert_eq!(pa.pos, pb.pos);
            assert_eq!(pa.opacity, pb.opacity);
            assert_eq!(pa.decay, pb.decay);
        }
    }

    #[test]
    fn all_vaporized_requires_sweep_and_fade() {
        let mut faded = Particle::at_rest(0.0, 0.0, Rgb8::WHITE, 0.0);
        faded.decay = Some(DecayMode::FastFade);

        // A faded particle alone completes.
        let mut ps = vec![faded.clone()];
        let mut rng = VaporRng::new(5);
        assert!(advance_particles(&mut ps, &mut rng, &swept(10.0), 0.016));

        // Adding one unswept particle holds the run open.
        let mut ps = vec![faded, Particle::at_rest(500.0, 0.0, Rgb8::WHITE, 0.33)];
        assert!(!advance_particles(&mut ps, &mut rng, &swept(10.0), 0.016));
    }

    #[test]
    fn faded_particles_stay_in_collection() {
        let mut ps = vec![Particle::at_rest(0.0, 0.0, Rgb8::WHITE, 0.2)];
        let mut rng = VaporRng::new(13);
        for _ in 0..600 {
            advance_particles(&mut ps, &mut rng, &swept(10.0), 0.016);
        }
        assert_eq!(ps.len(), 1);
        assert_eq!(ps[0].opacity, 0.0);
    }
}
