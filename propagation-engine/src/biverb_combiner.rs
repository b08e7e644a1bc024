//! Bistatic combination of a source-side and a receiver-side eigenverb
//! collection into `Biverb`s, via the closed-form bivariate-Gaussian
//! footprint overlap.

use propagation_types::{Biverb, Eigenverb, Frequencies, ScatteringModel};

use crate::config::RunConfig;
use crate::listener::BiverbListener;

pub struct BiverbCombiner<'a> {
    pub scattering: &'a dyn ScatteringModel,
}

impl<'a> BiverbCombiner<'a> {
    /// Combines every receiver verb on one interface against every source
    /// verb on the same interface, emitting a `Biverb` for each surviving
    /// pair. Candidates are pruned by a receiver-local bounding box before
    /// the exact overlap is evaluated, standing in for a real spatial
    /// index over the (typically modest) per-interface verb counts.
    pub fn combine(
        &self,
        source_verbs: &[Eigenverb],
        receiver_verbs: &[Eigenverb],
        interface_index: usize,
        cfg: &RunConfig,
        freq: &Frequencies,
        listener: &mut dyn BiverbListener,
    ) {
        for v_r in receiver_verbs {
            for v_s in source_verbs {
                if let Some(biverb) = self.try_combine(v_s, v_r, cfg, freq) {
                    listener.add_biverb(biverb, interface_index);
                }
            }
        }
    }

    fn try_combine(&self, v_s: &Eigenverb, v_r: &Eigenverb, cfg: &RunConfig, freq: &Frequencies) -> Option<Biverb> {
        let (range, bearing) = v_r.position.gc_range(&v_s.position);
        let max_extent = v_r.length_m.max(v_r.width_m);
        if range > cfg.distance_threshold * max_extent {
            return None;
        }

        let rel_bearing = bearing - v_r.direction_rad;
        let y_s = range * rel_bearing.cos();
        let x_s = range * rel_bearing.sin();
        if y_s.abs() > cfg.distance_threshold * v_r.length_m || x_s.abs() > cfg.distance_threshold * v_r.width_m {
            return None;
        }

        let scatter = self.scattering.scattering(
            &v_r.position,
            freq,
            v_s.grazing_rad,
            v_r.grazing_rad,
            v_s.direction_rad,
            v_r.direction_rad,
        );
        let scatter_threshold = 10f64.powf(-0.1 * cfg.intensity_threshold_db.abs());
        if !(0..freq.len()).any(|f| scatter[f] >= scatter_threshold) {
            return None; // ThresholdReject: silent
        }

        let l2s = v_s.length_m * v_s.length_m;
        let w2s = v_s.width_m * v_s.width_m;
        let l2r = v_r.length_m * v_r.length_m;
        let w2r = v_r.width_m * v_r.width_m;
        let s = l2s + w2s;
        let d = l2s - w2s;
        let p = l2s * w2s;
        let sp = l2r + w2r;
        let dp = l2r - w2r;
        let pp = l2r * w2r;
        let alpha = v_s.direction_rad - v_r.direction_rad;
        let cos2a = (2.0 * alpha).cos();
        let sin2a = (2.0 * alpha).sin();

        let det = 0.5 * (2.0 * (p + pp) + s * sp - d * dp * cos2a);
        if det <= 0.0 {
            return None;
        }

        let kappa = -0.25
            * (x_s * x_s * (s + d * cos2a + 2.0 * l2r) + y_s * y_s * (s - d * cos2a + 2.0 * w2r)
                - 2.0 * (x_s * x_s * y_s * y_s).sqrt() * d * sin2a)
            / det;

        let sigma2 = 0.5
            * ((1.0 / w2s + 1.0 / l2s) + (1.0 / w2s - 1.0 / l2s) * cos2a + 2.0 / w2r)
            / (det / (p * pp));
        if sigma2 <= 0.0 {
            return None;
        }
        let duration_s = 0.5 * (v_r.grazing_rad.cos() / v_r.sound_speed_mps) * sigma2.sqrt();

        let coeff = 0.25 * 0.5 * kappa.exp() / det.sqrt();
        let power: Vec<f64> = (0..freq.len())
            .map(|f| coeff * v_s.power[f] * v_r.power[f] * scatter[f])
            .collect();
        if power.iter().all(|&p| p < cfg.power_threshold) {
            return None; // ThresholdReject: silent
        }

        Some(Biverb {
            interface: v_r.interface,
            travel_time_s: v_s.travel_time_s + v_r.travel_time_s,
            power,
            duration_s,
            source_de_deg: v_s.source_de_deg,
            source_az_deg: v_s.source_az_deg,
            receiver_de_deg: v_r.source_de_deg,
            receiver_az_deg: v_r.source_az_deg,
            receiver_de_index: v_r.de_index,
            receiver_az_index: v_r.az_index,
            source_counts: v_s.counts,
            receiver_counts: v_r.counts,
        })
    }
}
