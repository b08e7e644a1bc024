//! Narrow facades the propagation engine queries but never implements.
//! Concrete oceans, boundaries, and scattering models live outside this
//! crate; these traits are the seam between them and the engine.

use crate::frequencies::Frequencies;
use crate::geometry::{Gradient3, WPosition};

/// Sound-speed profile of the water column.
pub trait SoundSpeedProfile {
    /// Sound speed (m/s) and its spatial gradient at each position.
    fn sound_speed(&self, positions: &[WPosition]) -> Vec<(f64, Gradient3)>;

    /// Additional attenuation (dB) accumulated over `step_distance_m` at
    /// each position, one entry per frequency.
    fn attenuation(
        &self,
        positions: &[WPosition],
        frequencies: &Frequencies,
        step_distance_m: &[f64],
    ) -> Vec<Vec<f64>>;
}

/// A reflecting boundary (sea surface, sea bottom, or one face of a
/// volume scattering layer).
pub trait BoundaryModel {
    /// Radial distance of the boundary (meters from earth center) and its
    /// outward unit normal at `position`.
    fn height(&self, position: &WPosition) -> (f64, Gradient3);

    /// Reflection amplitude (linear, per frequency) and phase shift
    /// (radians, per frequency) for a ray striking at `grazing_rad`.
    fn reflect_loss(
        &self,
        position: &WPosition,
        frequencies: &Frequencies,
        grazing_rad: f64,
    ) -> (Vec<f64>, Vec<f64>);
}

/// Interface scattering strength used to combine source and receiver
/// eigenverbs into biverbs.
pub trait ScatteringModel {
    /// Scattering strength (linear, per frequency) at `position` for a
    /// ray arriving at `grazing_in_rad`/`direction_in_rad` and leaving at
    /// `grazing_out_rad`/`direction_out_rad`.
    #[allow(clippy::too_many_arguments)]
    fn scattering(
        &self,
        position: &WPosition,
        frequencies: &Frequencies,
        grazing_in_rad: f64,
        grazing_out_rad: f64,
        direction_in_rad: f64,
        direction_out_rad: f64,
    ) -> Vec<f64>;
}
