//! # propagation-types
//!
//! Shared data model for the underwater acoustic propagation engine:
//! spherical-earth geometry, the ray-fan grid, eigenray/eigenverb/biverb
//! records, and the narrow traits (`SoundSpeedProfile`, `BoundaryModel`,
//! `ScatteringModel`) an ocean environment must implement to drive a run.
//!
//! Positions use spherical-earth coordinates `(rho, theta, phi)`: radial
//! distance from the earth's center, colatitude, and longitude. Direction
//! is carried as a normalized slowness vector, the propagation direction
//! divided by the local sound speed.

mod biverb;
mod eigenray;
mod eigenverb;
mod environment;
mod frequencies;
mod geometry;
mod grid;

pub use biverb::Biverb;
pub use eigenray::{BounceCounts, Eigenray};
pub use eigenverb::{Eigenverb, Interface};
pub use environment::{BoundaryModel, ScatteringModel, SoundSpeedProfile};
pub use frequencies::Frequencies;
pub use geometry::{Gradient3, Grid2D, Rate3, Slowness, WPosition, EARTH_RADIUS_METERS};
pub use grid::RayGrid;
