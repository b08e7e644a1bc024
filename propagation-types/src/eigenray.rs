use serde::{Deserialize, Serialize};

/// Per-interaction bounce counters carried by both eigenrays and eigenverbs.
/// `upper`/`lower` count volume-layer crossings from above and below
/// respectively and must never be merged into a single counter — a ray
/// can cross the same layer from both directions over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BounceCounts {
    pub surface: u32,
    pub bottom: u32,
    pub caustic: u32,
    pub upper: u32,
    pub lower: u32,
}

impl BounceCounts {
    /// True if any counter here exceeds the matching maximum in `max`.
    pub fn exceeds(&self, max: &BounceCounts) -> bool {
        self.surface > max.surface
            || self.bottom > max.bottom
            || self.caustic > max.caustic
            || self.upper > max.upper
            || self.lower > max.lower
    }
}

/// A single acoustic path from a source to one target, recovered by
/// closest-point-of-approach search and local quadratic refinement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Eigenray {
    pub target_row: usize,
    pub target_col: usize,
    pub travel_time_s: f64,
    pub source_de_deg: f64,
    pub source_az_deg: f64,
    pub target_de_deg: f64,
    pub target_az_deg: f64,
    /// Propagation loss per frequency, dB, positive.
    pub intensity_db: Vec<f64>,
    /// Accumulated phase per frequency, radians, wrapped to `(-pi, pi]`.
    pub phase_rad: Vec<f64>,
    pub counts: BounceCounts,
}

impl Eigenray {
    /// Linear amplitude at frequency index `f`: `10^(-intensity_db[f]/20)`.
    pub fn amplitude(&self, f: usize) -> f64 {
        10f64.powf(-self.intensity_db[f] / 20.0)
    }
}
