//! A flat-bottom, isovelocity ocean: the minimal environment needed to
//! drive a `WavefrontQueue` end to end. Not a physically rich model —
//! just enough surface/bottom/scattering behavior to exercise every
//! module in `propagation-engine`.

use propagation_types::{BoundaryModel, Frequencies, Gradient3, ScatteringModel, SoundSpeedProfile, WPosition, EARTH_RADIUS_METERS};

/// Absorption coefficient used for the per-step attenuation, roughly in
/// the range Thorp's formula gives for a few kHz.
const ABSORPTION_DB_PER_M: f64 = 3e-5;

pub struct FlatOcean {
    pub sound_speed_mps: f64,
}

impl SoundSpeedProfile for FlatOcean {
    fn sound_speed(&self, positions: &[WPosition]) -> Vec<(f64, Gradient3)> {
        positions.iter().map(|_| (self.sound_speed_mps, Gradient3::default())).collect()
    }

    fn attenuation(&self, positions: &[WPosition], frequencies: &Frequencies, step_distance_m: &[f64]) -> Vec<Vec<f64>> {
        positions
            .iter()
            .zip(step_distance_m)
            .map(|(_, &d)| vec![ABSORPTION_DB_PER_M * d; frequencies.len()])
            .collect()
    }
}

/// The sea surface: a perfect radial boundary at altitude 0.
pub struct Surface {
    pub reflect_loss_db: f64,
}

impl BoundaryModel for Surface {
    fn height(&self, _position: &WPosition) -> (f64, Gradient3) {
        (EARTH_RADIUS_METERS, Gradient3::new(1.0, 0.0, 0.0))
    }

    fn reflect_loss(&self, _position: &WPosition, frequencies: &Frequencies, _grazing_rad: f64) -> (Vec<f64>, Vec<f64>) {
        let amp = 10f64.powf(-self.reflect_loss_db / 20.0);
        (vec![amp; frequencies.len()], vec![0.0; frequencies.len()])
    }
}

/// A flat sea bottom at constant depth.
pub struct Bottom {
    pub depth_m: f64,
    pub reflect_loss_db: f64,
}

impl BoundaryModel for Bottom {
    fn height(&self, _position: &WPosition) -> (f64, Gradient3) {
        (EARTH_RADIUS_METERS - self.depth_m, Gradient3::new(1.0, 0.0, 0.0))
    }

    fn reflect_loss(&self, _position: &WPosition, frequencies: &Frequencies, _grazing_rad: f64) -> (Vec<f64>, Vec<f64>) {
        let amp = 10f64.powf(-self.reflect_loss_db / 20.0);
        (vec![amp; frequencies.len()], vec![0.0; frequencies.len()])
    }
}

/// Constant scattering strength, independent of geometry — a stand-in
/// for a real Lambert's-law or Eckart model.
pub struct ConstantScattering {
    pub strength: f64,
}

impl ScatteringModel for ConstantScattering {
    fn scattering(
        &self,
        _position: &WPosition,
        frequencies: &Frequencies,
        _grazing_in_rad: f64,
        _grazing_out_rad: f64,
        _direction_in_rad: f64,
        _direction_out_rad: f64,
    ) -> Vec<f64> {
        vec![self.strength; frequencies.len()]
    }
}
