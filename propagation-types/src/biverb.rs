use serde::{Deserialize, Serialize};

use crate::eigenray::BounceCounts;
use crate::eigenverb::Interface;

/// The bistatic combination of a source-side and a receiver-side
/// eigenverb at a shared interface: the overlap of their two Gaussian
/// footprints, scaled by the interface scattering strength.
///
/// `source_de_deg`/`source_az_deg` and `receiver_de_deg`/`receiver_az_deg`
/// are kept as four distinct fields on purpose: an earlier formulation
/// conflated the two pairs and silently dropped the receiver azimuth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Biverb {
    pub interface: Interface,
    pub travel_time_s: f64,
    /// Peak power per frequency, linear units.
    pub power: Vec<f64>,
    pub duration_s: f64,
    pub source_de_deg: f64,
    pub source_az_deg: f64,
    pub receiver_de_deg: f64,
    pub receiver_az_deg: f64,
    pub receiver_de_index: usize,
    pub receiver_az_index: usize,
    pub source_counts: BounceCounts,
    pub receiver_counts: BounceCounts,
}
