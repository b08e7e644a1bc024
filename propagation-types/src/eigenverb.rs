use serde::{Deserialize, Serialize};

use crate::eigenray::BounceCounts;
use crate::geometry::WPosition;

/// Interface a collision occurred at. Volume layers carry their 1-based
/// layer index so upper/lower crossings stay attributable to the layer
/// that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interface {
    Bottom,
    Surface,
    VolumeUpper(u32),
    VolumeLower(u32),
}

/// A Gaussian "patch" representing the ensonified footprint of one ray at
/// one boundary collision. Length and width are 1-sigma semi-axes of the
/// footprint projected onto the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Eigenverb {
    pub interface: Interface,
    pub travel_time_s: f64,
    pub position: WPosition,
    /// True bearing of the patch's major axis, radians.
    pub direction_rad: f64,
    /// Grazing angle at the collision, radians, positive up out of the
    /// boundary.
    pub grazing_rad: f64,
    pub sound_speed_mps: f64,
    pub length_m: f64,
    pub width_m: f64,
    /// One-way transmission power per frequency at the patch, linear units.
    pub power: Vec<f64>,
    pub de_index: usize,
    pub az_index: usize,
    pub source_de_deg: f64,
    pub source_az_deg: f64,
    pub counts: BounceCounts,
}
