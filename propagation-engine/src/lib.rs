//! # propagation-engine
//!
//! Core wavefront propagation: the multistep ray-fan integrator, collision
//! detection and reflection, caustic/edge detection, eigenray extraction,
//! and eigenverb/biverb generation for reverberation. Consumes an ocean
//! environment (sound speed, boundaries, scattering) supplied by the
//! caller through the `propagation-types` traits; produces events through
//! caller-supplied listeners.

mod biverb_combiner;
mod config;
mod edge_detector;
mod eigenray_extractor;
mod eigenverb_emitter;
mod error;
mod listener;
mod ray_ode;
mod reflection;
mod wave_state;
mod wavefront_queue;

pub use biverb_combiner::BiverbCombiner;
pub use config::{BounceLimits, RunConfig};
pub use edge_detector::EdgeDetector;
pub use eigenray_extractor::EigenrayExtractor;
pub use eigenverb_emitter::EigenverbEmitter;
pub use error::{PropagationError, Result};
pub use listener::{BiverbListener, EigenrayListener, EigenverbListener, WavefrontListener};
pub use reflection::{CollisionInfo, CollisionKind, ReflectionEngine};
pub use wave_state::WaveState;
pub use wavefront_queue::{Ring, StepOutcome, WavefrontQueue};
