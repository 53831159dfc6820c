//! Vaportext turns rendered text into particles and sweeps them away.
//!
//! A source (shaped text or an SVG path) is rasterized at device resolution
//! and sampled into a particle cloud. A front then sweeps the cloud left to
//! right; swept particles disperse and fade until nothing remains. The public
//! API is session-oriented:
//!
//! - Describe a run with a [`VaporizeConfig`]
//! - Create a [`VaporizeSession`] over a [`Surface`]
//! - Call [`VaporizeSession::advance`] once per display frame until it
//!   reports [`Phase::Complete`]
//!
//! [`WaveSession`] renders the animated backdrop the effect composites over.
#![forbid(unsafe_code)]

pub mod composite_cpu;
pub mod core;
pub mod error;
pub mod math;
pub mod model;
pub mod raster;
pub mod render_cpu;
pub mod session;
pub mod sim;
pub mod surface;
pub mod wave;

pub use crate::core::{Fps, Rgb8, SurfaceSize, TextBoundary};
pub use error::{VaporError, VaporResult};
pub use model::{FontSpec, VaporSource, VaporizeConfig};
pub use raster::{RasterOutput, Rasterizer};
pub use session::{Phase, VaporizeSession};
pub use sim::{DecayMode, Particle};
pub use surface::Surface;
pub use wave::{WaveSession, WaveUniforms};
