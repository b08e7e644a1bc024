//! Surface, bottom, and volume-layer collision handling: detection,
//! sub-step localization via a quadratic Taylor expansion, and rebuilding
//! the ring history so the Adams-Bashforth predictor can continue past
//! the reflection.

use propagation_types::{BoundaryModel, Frequencies, Slowness, SoundSpeedProfile, WPosition};

use crate::ray_ode;
use crate::wavefront_queue::Ring;

/// Minimum normal-component speed (m/s) used when computing the sub-step
/// offset to a collision. Guards against the nearly-grazing case where the
/// ray barely approaches a boundary and a naive division blows up.
const MIN_REFLECT_MPS: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    Surface,
    Bottom,
    VolumeUpper(u32),
    VolumeLower(u32),
}

/// Everything about a detected collision an `EigenverbEmitter` needs.
pub struct CollisionInfo {
    pub kind: CollisionKind,
    pub position: WPosition,
    pub incident: Slowness,
    pub reflected: Slowness,
    pub grazing_rad: f64,
    pub sound_speed: f64,
    pub direction_rad: f64,
}

pub struct ReflectionEngine<'a> {
    pub surface: &'a dyn BoundaryModel,
    pub bottom: &'a dyn BoundaryModel,
    /// One `BoundaryModel` per volume layer, in layer order (layer 1 first).
    pub volume_layers: &'a [&'a dyn BoundaryModel],
}

impl<'a> ReflectionEngine<'a> {
    /// Detects and processes, in order, a surface reflection, a bottom
    /// reflection, or a volume-layer crossing for ray `(i, j)`. At most
    /// one collision is processed per step per ray, matching the
    /// `WavefrontQueue::step` ordering.
    pub fn process_ray(
        &self,
        env: &dyn SoundSpeedProfile,
        ring: &mut Ring,
        i: usize,
        j: usize,
        dt: f64,
        freq: &Frequencies,
    ) -> Option<CollisionInfo> {
        if let Some(info) = self.try_collide(self.surface, env, ring, i, j, dt, freq, true, -std::f64::consts::PI, CollisionKind::Surface)
        {
            return Some(info);
        }
        if let Some(info) = self.try_collide(self.bottom, env, ring, i, j, dt, freq, false, 0.0, CollisionKind::Bottom)
        {
            return Some(info);
        }
        for (layer_idx, boundary) in self.volume_layers.iter().enumerate() {
            let layer = (layer_idx + 1) as u32;
            if let Some(info) = self.try_collide(*boundary, env, ring, i, j, dt, freq, false, 0.0, CollisionKind::VolumeUpper(layer)) {
                return Some(info);
            }
            if let Some(info) = self.try_collide(*boundary, env, ring, i, j, dt, freq, true, 0.0, CollisionKind::VolumeLower(layer)) {
                return Some(info);
            }
        }
        None
    }

    /// `rising`: the boundary is crossed from below (position.rho below
    /// boundary height moving to above it) — the case for the surface and
    /// for a volume layer hit from below. `!rising`: crossed from above —
    /// the bottom, and a volume layer hit from above.
    #[allow(clippy::too_many_arguments)]
    fn try_collide(
        &self,
        boundary: &dyn BoundaryModel,
        env: &dyn SoundSpeedProfile,
        ring: &mut Ring,
        i: usize,
        j: usize,
        dt: f64,
        freq: &Frequencies,
        rising: bool,
        extra_phase_rad: f64,
        kind: CollisionKind,
    ) -> Option<CollisionInfo> {
        let curr_pos = *ring.curr.position.get(i, j);
        let next_pos = *ring.next.position.get(i, j);
        let (height_curr, normal) = boundary.height(&curr_pos);
        let (height_next, _) = boundary.height(&next_pos);
        let signed_curr = curr_pos.rho - height_curr;
        let signed_next = next_pos.rho - height_next;

        let crossed = if rising {
            signed_curr <= 0.0 && signed_next > 0.0
        } else {
            signed_curr >= 0.0 && signed_next < 0.0
        };
        if !crossed {
            return None;
        }

        let xi_curr = *ring.curr.slowness.get(i, j);
        let c_curr = *ring.curr.sound_speed.get(i, j);
        let dot_vel = c_curr * c_curr
            * (xi_curr.rho * normal.rho + xi_curr.theta * normal.theta + xi_curr.phi * normal.phi);
        if dot_vel.abs() < 1e-12 {
            return None;
        }
        let dot_vel_clamped = dot_vel.signum() * dot_vel.abs().max(MIN_REFLECT_MPS);
        let mut dtau = (height_curr - curr_pos.rho) * normal.rho / dot_vel_clamped;
        dtau = dtau.clamp(-dt, dt);

        let (refined_pos, refined_xi_in, refined_c) =
            Self::collision_location(ring, i, j, dt, dtau);

        let xi_norm = refined_xi_in.norm();
        if xi_norm <= 0.0 {
            return None;
        }
        let cos_incidence = (refined_xi_in.rho * normal.rho
            + refined_xi_in.theta * normal.theta
            + refined_xi_in.phi * normal.phi)
            / xi_norm;
        let grazing = (-cos_incidence).clamp(-1.0, 1.0).asin();
        if grazing <= 0.0 {
            return None; // near miss: silent, not an error
        }

        let xi_dot_n = refined_xi_in.rho * normal.rho
            + refined_xi_in.theta * normal.theta
            + refined_xi_in.phi * normal.phi;
        let unnormalized = Slowness::new(
            refined_xi_in.rho - 2.0 * xi_dot_n * normal.rho,
            refined_xi_in.theta - 2.0 * xi_dot_n * normal.theta,
            refined_xi_in.phi - 2.0 * xi_dot_n * normal.phi,
        );
        let target_norm = 1.0 / refined_c;
        let reflected = unnormalized.scale(target_norm / unnormalized.norm());

        let (amp, phase) = boundary.reflect_loss(&refined_pos, freq, grazing);
        let attenuation_delta: Vec<f64> = amp.iter().map(|a| -20.0 * a.max(1e-300).log10()).collect();
        let phase_delta: Vec<f64> = phase.iter().map(|p| p + extra_phase_rad).collect();

        self.reflection_reinit(env, ring, i, j, dt, dtau, refined_pos, reflected);

        let prior_attenuation = ring.curr.attenuation_db.get(i, j).clone();
        let prior_phase = ring.curr.phase_rad.get(i, j).clone();
        let next_attn = ring.next.attenuation_db.get_mut(i, j);
        for (f, delta) in attenuation_delta.iter().enumerate() {
            next_attn[f] = prior_attenuation[f] + delta;
        }
        let next_phase = ring.next.phase_rad.get_mut(i, j);
        for (f, delta) in phase_delta.iter().enumerate() {
            next_phase[f] = wrap_phase(prior_phase[f] + delta);
        }

        let mut counts = *ring.curr.counts.get(i, j);
        match kind {
            CollisionKind::Surface => counts.surface += 1,
            CollisionKind::Bottom => counts.bottom += 1,
            CollisionKind::VolumeUpper(_) => counts.upper += 1,
            CollisionKind::VolumeLower(_) => counts.lower += 1,
        }
        ring.next.counts.set(i, j, counts);

        let direction_rad = reflected.theta.atan2(reflected.phi);

        tracing::trace!(ray = ?(i, j), kind = ?kind, grazing_deg = grazing.to_degrees(), "collision");

        Some(CollisionInfo {
            kind,
            position: refined_pos,
            incident: refined_xi_in,
            reflected,
            grazing_rad: grazing,
            sound_speed: refined_c,
            direction_rad,
        })
    }

    /// Second-order centered Taylor expansion around `curr`, evaluated at
    /// offset `dtau` (the sub-step time to the collision).
    fn collision_location(ring: &Ring, i: usize, j: usize, dt: f64, dtau: f64) -> (WPosition, Slowness, f64) {
        let prev = ring.prev.position.get(i, j);
        let curr = ring.curr.position.get(i, j);
        let next = ring.next.position.get(i, j);
        let taylor = |p: f64, c: f64, n: f64| -> f64 {
            let d1 = (n - p) / (2.0 * dt);
            let d2 = (n - 2.0 * c + p) / (dt * dt);
            c + d1 * dtau + 0.5 * d2 * dtau * dtau
        };
        let pos = WPosition::new(
            taylor(prev.rho, curr.rho, next.rho),
            taylor(prev.theta, curr.theta, next.theta),
            taylor(prev.phi, curr.phi, next.phi),
        );

        let xi_prev = ring.prev.slowness.get(i, j);
        let xi_curr = ring.curr.slowness.get(i, j);
        let xi_next = ring.next.slowness.get(i, j);
        let xi = Slowness::new(
            taylor(xi_prev.rho, xi_curr.rho, xi_next.rho),
            taylor(xi_prev.theta, xi_curr.theta, xi_next.theta),
            taylor(xi_prev.phi, xi_curr.phi, xi_next.phi),
        );

        let c = taylor(
            *ring.prev.sound_speed.get(i, j),
            *ring.curr.sound_speed.get(i, j),
            *ring.next.sound_speed.get(i, j),
        );
        (pos, xi, c)
    }

    /// Rebuilds past/prev/curr/next around the reflected ray so the AB3
    /// predictor can keep stepping: integrate backward from the collision
    /// point to recover a corrected curr, prev, and past, then forward
    /// with AB3 to recover next. Bookkeeping fields (attenuation, phase,
    /// counts) are left untouched here; the caller updates `next`'s.
    #[allow(clippy::too_many_arguments)]
    fn reflection_reinit(
        &self,
        env: &dyn SoundSpeedProfile,
        ring: &mut Ring,
        i: usize,
        j: usize,
        dt: f64,
        dtau: f64,
        position: WPosition,
        slowness: Slowness,
    ) {
        let sample = |p: WPosition| -> (f64, propagation_types::Gradient3) {
            env.sound_speed(&[p])[0]
        };

        let (curr_pos, curr_xi) = ray_ode::rk3_step(sample, position, slowness, -dtau);
        let (prev_pos, prev_xi) = ray_ode::rk3_step(sample, curr_pos, curr_xi, -dt);
        let (past_pos, past_xi) = ray_ode::rk3_step(sample, prev_pos, prev_xi, -dt);

        let write = |state: &mut crate::wave_state::WaveState, pos: WPosition, xi: Slowness| {
            let (c, grad) = sample(pos);
            state.position.set(i, j, pos);
            state.slowness.set(i, j, xi);
            state.sound_speed.set(i, j, c);
            state.sound_gradient.set(i, j, grad);
            let (pos_rate, xi_rate) = ray_ode::derivative(c, grad, pos, xi);
            state.pos_gradient.set(i, j, pos_rate);
            state.slowness_gradient.set(i, j, xi_rate);
        };

        write(&mut ring.past, past_pos, past_xi);
        write(&mut ring.prev, prev_pos, prev_xi);
        write(&mut ring.curr, curr_pos, curr_xi);

        let rate_of = |state: &crate::wave_state::WaveState| {
            let pos = *state.position.get(i, j);
            let xi = *state.slowness.get(i, j);
            let c = *state.sound_speed.get(i, j);
            let grad = *state.sound_gradient.get(i, j);
            ray_ode::derivative(c, grad, pos, xi)
        };
        let rates = [rate_of(&ring.past), rate_of(&ring.prev), rate_of(&ring.curr)];
        let curr_pos = *ring.curr.position.get(i, j);
        let curr_xi = *ring.curr.slowness.get(i, j);
        let (next_pos, next_xi) = ray_ode::ab3_step(curr_pos, curr_xi, rates, dt);
        write(&mut ring.next, next_pos, next_xi);
    }
}

/// Wraps a phase accumulator to `(-pi, pi]`.
pub fn wrap_phase(phase_rad: f64) -> f64 {
    let two_pi = std::f64::consts::TAU;
    let mut wrapped = (phase_rad + std::f64::consts::PI) % two_pi;
    if wrapped <= 0.0 {
        wrapped += two_pi;
    }
    wrapped - std::f64::consts::PI
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_phase_keeps_values_in_range() {
        assert!((wrap_phase(0.0)).abs() < 1e-12);
        assert!((wrap_phase(3.0 * std::f64::consts::PI) - std::f64::consts::PI).abs() < 1e-9);
        assert!((wrap_phase(-3.0 * std::f64::consts::PI) - std::f64::consts::PI).abs() < 1e-9);
    }
}
