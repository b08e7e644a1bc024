//! Closest-point-of-approach detection and the local quadratic refinement
//! that turns a CPA into an `Eigenray`.

use propagation_types::{BounceCounts, Eigenray, Frequencies, WPosition};

use crate::config::{BounceLimits, RunConfig};
use crate::listener::EigenrayListener;
use crate::reflection::wrap_phase;
use crate::wavefront_queue::Ring;

pub struct EigenrayExtractor;

/// Fits a 1D parabola through three equally spaced samples and returns the
/// offset (in the same units as `h`) of its vertex, or `0.0` if the
/// samples don't describe a genuine minimum.
fn parabola_vertex(minus: f64, center: f64, plus: f64, h: f64) -> f64 {
    let b = (plus - minus) / (2.0 * h);
    let a = (plus - 2.0 * center + minus) / (h * h);
    if a <= 0.0 {
        return 0.0;
    }
    (-b / a).clamp(-h, h)
}

fn lerp_angle(grid_value_at: impl Fn(usize) -> f64, index: usize, len: usize, frac: f64) -> f64 {
    if frac >= 0.0 && index + 1 < len {
        let a = grid_value_at(index);
        let b = grid_value_at(index + 1);
        a + frac * (b - a)
    } else if frac < 0.0 && index > 0 {
        let a = grid_value_at(index);
        let b = grid_value_at(index - 1);
        a + (-frac) * (b - a)
    } else {
        grid_value_at(index)
    }
}

impl EigenrayExtractor {
    /// Scans every target's distance-squared grid for a closest-point-of-
    /// approach at the current step, refines it with an (approximately
    /// separable) quadratic fit in time, DE, and AZ, and emits an
    /// `Eigenray` to `listener` when it survives the intensity and bounce
    /// thresholds.
    pub fn scan(
        ring: &Ring,
        freq: &Frequencies,
        targets: &[WPosition],
        cfg: &RunConfig,
        run_id: u64,
        listener: &mut dyn EigenrayListener,
    ) {
        let num_de = ring.curr.num_de();
        let num_az = ring.curr.num_az();

        for (t, _target) in targets.iter().enumerate() {
            for i in 0..num_de {
                for j in 0..num_az {
                    let d_prev = *ring.prev.target_distance2[t].get(i, j);
                    let d_curr = *ring.curr.target_distance2[t].get(i, j);
                    let d_next = *ring.next.target_distance2[t].get(i, j);
                    if !(d_prev > d_curr && d_curr <= d_next) {
                        continue;
                    }

                    let dt = ring.time_step_s();
                    let tau = parabola_vertex(d_prev, d_curr, d_next, dt);

                    let d_i_minus = if i > 0 { *ring.curr.target_distance2[t].get(i - 1, j) } else { d_curr };
                    let d_i_plus = if i + 1 < num_de { *ring.curr.target_distance2[t].get(i + 1, j) } else { d_curr };
                    let frac_i = parabola_vertex(d_i_minus, d_curr, d_i_plus, 1.0);

                    let d_j_minus = if j > 0 { *ring.curr.target_distance2[t].get(i, j - 1) } else { d_curr };
                    let d_j_plus = if j + 1 < num_az { *ring.curr.target_distance2[t].get(i, j + 1) } else { d_curr };
                    let frac_j = parabola_vertex(d_j_minus, d_curr, d_j_plus, 1.0);

                    let ray_grid = ring.curr.ray_grid();
                    let source_de_deg = lerp_angle(|k| ray_grid.de_deg(k), i, num_de, frac_i);
                    let source_az_deg = lerp_angle(|k| ray_grid.az_deg(k), j, num_az, frac_j);

                    let xi = ring.curr.slowness.get(i, j);
                    let target_de_deg = (xi.rho / xi.norm()).clamp(-1.0, 1.0).asin().to_degrees();
                    let target_az_deg = xi.phi.atan2(-xi.theta).to_degrees();

                    let intensity_db = ring.curr.attenuation_db.get(i, j).clone();
                    let phase_rad = ring.curr.phase_rad.get(i, j).clone();
                    let counts = *ring.curr.counts.get(i, j);

                    if counts.exceeds(&limits_to_counts(&cfg.bounce_limits)) {
                        continue; // ThresholdReject: silent
                    }
                    let passes_intensity = (0..freq.len()).any(|f| intensity_db[f] < cfg.intensity_threshold_db);
                    if !passes_intensity {
                        continue; // ThresholdReject: silent
                    }

                    let ray = Eigenray {
                        target_row: t,
                        target_col: 0,
                        travel_time_s: ring.curr.time_s + tau,
                        source_de_deg,
                        source_az_deg,
                        target_de_deg,
                        target_az_deg,
                        intensity_db,
                        phase_rad,
                        counts,
                    };
                    listener.add_eigenray(t, 0, ray, run_id);
                }
            }
        }
    }

    /// Combines a target's individual eigenrays into one summed arrival,
    /// as `cfg.coherent` selects: coherent phasors include the
    /// `2*pi*f*T` travel-time term, incoherent ones omit it. The
    /// magnitude of the per-frequency phasor sum gives the summed
    /// intensity, its argument the summed phase. Launch/arrival angles
    /// and travel time are weighted-averaged, and counts are taken from
    /// the strongest contributing ray, both by linear amplitude.
    /// Returns `None` for an empty ray set.
    pub fn combine_for_target(rays: &[Eigenray], freq: &Frequencies, cfg: &RunConfig) -> Option<Eigenray> {
        if rays.is_empty() {
            return None;
        }

        let weights: Vec<f64> = rays.iter().map(representative_amplitude).collect();
        let weight_sum: f64 = weights.iter().sum();

        let mut intensity_db = vec![0.0; freq.len()];
        let mut phase_rad = vec![0.0; freq.len()];
        for f in 0..freq.len() {
            let mut re = 0.0;
            let mut im = 0.0;
            for ray in rays {
                let a = ray.amplitude(f);
                let angle = if cfg.coherent {
                    std::f64::consts::TAU * freq[f] * ray.travel_time_s + ray.phase_rad[f]
                } else {
                    ray.phase_rad[f]
                };
                re += a * angle.cos();
                im += a * angle.sin();
            }
            let magnitude = (re * re + im * im).sqrt();
            intensity_db[f] = -20.0 * magnitude.max(1e-300).log10();
            phase_rad[f] = wrap_phase(im.atan2(re));
        }

        let weighted_avg = |pick: fn(&Eigenray) -> f64| -> f64 {
            if weight_sum <= 0.0 {
                rays.iter().map(pick).sum::<f64>() / rays.len() as f64
            } else {
                rays.iter().zip(&weights).map(|(r, w)| pick(r) * w).sum::<f64>() / weight_sum
            }
        };

        let strongest = rays
            .iter()
            .zip(&weights)
            .max_by(|(_, wa), (_, wb)| wa.partial_cmp(wb).unwrap())
            .map(|(r, _)| r)
            .expect("rays is non-empty");

        Some(Eigenray {
            target_row: strongest.target_row,
            target_col: strongest.target_col,
            travel_time_s: weighted_avg(|r| r.travel_time_s),
            source_de_deg: weighted_avg(|r| r.source_de_deg),
            source_az_deg: weighted_avg(|r| r.source_az_deg),
            target_de_deg: weighted_avg(|r| r.target_de_deg),
            target_az_deg: weighted_avg(|r| r.target_az_deg),
            intensity_db,
            phase_rad,
            counts: strongest.counts,
        })
    }

    /// Reprojects an eigenray for a small displacement of the source
    /// and/or receiver endpoint ("dead reckoning"): travel time and
    /// level are adjusted by the component of each endpoint's
    /// displacement along the ray's local direction there, assuming
    /// launch/arrival angles are unchanged. Endpoints are reprojected
    /// sequentially, source then receiver.
    pub fn dead_reckon(
        ray: &Eigenray,
        freq: &Frequencies,
        source_sound_speed_mps: f64,
        source_displacement_along_ray_m: f64,
        receiver_sound_speed_mps: f64,
        receiver_displacement_along_ray_m: f64,
    ) -> Eigenray {
        let after_source =
            Self::dead_reckon_endpoint(ray, freq, source_sound_speed_mps, source_displacement_along_ray_m);
        Self::dead_reckon_endpoint(&after_source, freq, receiver_sound_speed_mps, receiver_displacement_along_ray_m)
    }

    /// Single-endpoint half of `dead_reckon`: the endpoint's range is
    /// approximated as `travel_time_s * sound_speed_mps` (an eigenray
    /// carries no range of its own), and level shifts by the equivalent
    /// spherical-spreading change over that range.
    fn dead_reckon_endpoint(
        ray: &Eigenray,
        freq: &Frequencies,
        sound_speed_mps: f64,
        displacement_along_ray_m: f64,
    ) -> Eigenray {
        let range_m = (ray.travel_time_s * sound_speed_mps).max(1.0);
        let range_ratio = (range_m + displacement_along_ray_m).max(1e-3) / range_m;
        let mut intensity_db = ray.intensity_db.clone();
        for f in 0..freq.len().min(intensity_db.len()) {
            intensity_db[f] += 20.0 * range_ratio.log10();
        }
        Eigenray {
            travel_time_s: ray.travel_time_s + displacement_along_ray_m / sound_speed_mps,
            intensity_db,
            ..ray.clone()
        }
    }
}

fn representative_amplitude(ray: &Eigenray) -> f64 {
    let n = ray.intensity_db.len().max(1);
    (0..ray.intensity_db.len()).map(|f| ray.amplitude(f)).sum::<f64>() / n as f64
}

fn limits_to_counts(limits: &BounceLimits) -> BounceCounts {
    BounceCounts {
        surface: limits.max_surface,
        bottom: limits.max_bottom,
        caustic: limits.max_caustic,
        upper: limits.max_upper,
        lower: limits.max_lower,
    }
}
