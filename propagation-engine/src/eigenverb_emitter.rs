//! Builds an `Eigenverb` footprint from a detected collision and forwards
//! it to the per-interface sink, unless its power falls below threshold.

use propagation_types::{Eigenverb, Frequencies, Interface};

use crate::config::RunConfig;
use crate::listener::EigenverbListener;
use crate::reflection::{CollisionInfo, CollisionKind};
use crate::wavefront_queue::Ring;

pub struct EigenverbEmitter;

impl EigenverbEmitter {
    /// Computes the ensonified-patch footprint at `(i, j)` from the local
    /// ray-tube angular spacing and the slant range at collision, and
    /// forwards it to `listener` unless every frequency's power is below
    /// `cfg.eigenverb_power_threshold()`.
    pub fn emit(
        info: &CollisionInfo,
        ring: &Ring,
        i: usize,
        j: usize,
        freq: &Frequencies,
        cfg: &RunConfig,
        listener: &mut dyn EigenverbListener,
    ) {
        let num_de = ring.curr.num_de();
        let num_az = ring.curr.num_az();
        let ray_grid = ring.curr.ray_grid();

        let de_spacing_rad = angular_spacing(|k| ray_grid.de_deg(k), i, num_de);
        let az_spacing_rad = angular_spacing(|k| ray_grid.az_deg(k), j, num_az);

        let slant_range = *ring.curr.path_length_m.get(i, j);
        let sin_grazing = info.grazing_rad.sin().max(1e-6);
        let length_m = slant_range * de_spacing_rad / sin_grazing;
        let width_m = slant_range * az_spacing_rad;

        let attenuation_db = ring.next.attenuation_db.get(i, j);
        let power: Vec<f64> = attenuation_db.iter().map(|db| 10f64.powf(-0.1 * db.abs())).collect();

        let peak_power_ok = (0..freq.len()).any(|f| power[f] >= cfg.eigenverb_power_threshold());
        if !peak_power_ok {
            return; // ThresholdReject: silent
        }

        let counts = *ring.next.counts.get(i, j);
        let source_de_deg = ray_grid.de_deg(i);
        let source_az_deg = ray_grid.az_deg(j);

        let interface_index = interface_slot(info.kind);
        let verb = Eigenverb {
            interface: interface_of(info.kind),
            travel_time_s: ring.next.time_s,
            position: info.position,
            direction_rad: info.direction_rad,
            grazing_rad: info.grazing_rad,
            sound_speed_mps: info.sound_speed,
            length_m,
            width_m,
            power,
            de_index: i,
            az_index: j,
            source_de_deg,
            source_az_deg,
            counts,
        };
        listener.add_eigenverb(verb, interface_index);
    }
}

fn angular_spacing(angle_deg_at: impl Fn(usize) -> f64, index: usize, len: usize) -> f64 {
    let lo = if index > 0 { index - 1 } else { index };
    let hi = if index + 1 < len { index + 1 } else { index };
    if lo == hi {
        return 0.0;
    }
    ((angle_deg_at(hi) - angle_deg_at(lo)) / 2.0).abs().to_radians()
}

fn interface_of(kind: CollisionKind) -> Interface {
    match kind {
        CollisionKind::Surface => Interface::Surface,
        CollisionKind::Bottom => Interface::Bottom,
        CollisionKind::VolumeUpper(layer) => Interface::VolumeUpper(layer),
        CollisionKind::VolumeLower(layer) => Interface::VolumeLower(layer),
    }
}

fn interface_slot(kind: CollisionKind) -> usize {
    match kind {
        CollisionKind::Surface => 0,
        CollisionKind::Bottom => 1,
        CollisionKind::VolumeUpper(layer) => 2 + 2 * (layer as usize - 1),
        CollisionKind::VolumeLower(layer) => 3 + 2 * (layer as usize - 1),
    }
}
