//! The Hamiltonian ray equations (Reilly eqns. 36-41) and the small-step
//! integrators built on them. `WaveState::update` evaluates these across
//! the whole grid; `reflection` re-uses the same derivative and a single-
//! point RK3/AB3 pair to rebuild ring history around a collision.

use propagation_types::{Gradient3, Rate3, Slowness, WPosition};

/// Time derivative of position and slowness at one point, given the local
/// sound speed and its gradient.
pub fn derivative(c: f64, grad: Gradient3, pos: WPosition, xi: Slowness) -> (Rate3, Rate3) {
    let c2 = c * c;
    let sin_theta = pos.theta.sin();
    let cos_theta = pos.theta.cos();
    let cot_theta = cos_theta / sin_theta;
    let dc_c = Gradient3::new(grad.rho / c, grad.theta / c, grad.phi / c);

    let pos_rate = Rate3::new(
        c2 * xi.rho,
        c2 * xi.theta / pos.rho,
        c2 * xi.phi / (pos.rho * sin_theta),
    );

    let c2_r = c2 / pos.rho;
    let xi_rate = Rate3::new(
        c2_r * (xi.theta * xi.theta + xi.phi * xi.phi) - dc_c.rho,
        -c2_r * (xi.rho * xi.theta - xi.phi * xi.phi * cot_theta) - dc_c.theta / pos.rho,
        -c2_r * xi.phi * (xi.rho + xi.theta * cot_theta) - dc_c.phi / (pos.rho * sin_theta),
    );
    (pos_rate, xi_rate)
}

fn apply(pos: WPosition, xi: Slowness, pos_rate: Rate3, xi_rate: Rate3, dt: f64) -> (WPosition, Slowness) {
    (
        WPosition::new(
            pos.rho + pos_rate.rho * dt,
            pos.theta + pos_rate.theta * dt,
            pos.phi + pos_rate.phi * dt,
        ),
        Slowness::new(
            xi.rho + xi_rate.rho * dt,
            xi.theta + xi_rate.theta * dt,
            xi.phi + xi_rate.phi * dt,
        ),
    )
}

/// Third-order Runge-Kutta step of size `dt` (negative for backward
/// integration), sampling the environment for sound speed/gradient at
/// each stage.
pub fn rk3_step(
    sample: impl Fn(WPosition) -> (f64, Gradient3),
    pos: WPosition,
    xi: Slowness,
    dt: f64,
) -> (WPosition, Slowness) {
    let (c0, g0) = sample(pos);
    let (k1_pos, k1_xi) = derivative(c0, g0, pos, xi);
    let (p1, x1) = apply(pos, xi, k1_pos, k1_xi, dt / 2.0);

    let (c1, g1) = sample(p1);
    let (k2_pos, k2_xi) = derivative(c1, g1, p1, x1);
    let (p2, x2) = apply(pos, xi, k2_pos, k2_xi, dt);
    let (p2b, x2b) = apply(pos, xi, k2_pos, k2_xi, dt / 2.0);
    let _ = (p2, x2);

    let (c2, g2) = sample(p2b);
    let (k3_pos, k3_xi) = derivative(c2, g2, p2b, x2b);

    let avg_pos_rate = Rate3::new(
        (k1_pos.rho + 4.0 * k2_pos.rho + k3_pos.rho) / 6.0,
        (k1_pos.theta + 4.0 * k2_pos.theta + k3_pos.theta) / 6.0,
        (k1_pos.phi + 4.0 * k2_pos.phi + k3_pos.phi) / 6.0,
    );
    let avg_xi_rate = Rate3::new(
        (k1_xi.rho + 4.0 * k2_xi.rho + k3_xi.rho) / 6.0,
        (k1_xi.theta + 4.0 * k2_xi.theta + k3_xi.theta) / 6.0,
        (k1_xi.phi + 4.0 * k2_xi.phi + k3_xi.phi) / 6.0,
    );
    apply(pos, xi, avg_pos_rate, avg_xi_rate, dt)
}

/// Adams-Bashforth-3 predictor step using derivatives already evaluated at
/// the three most recent points (oldest first).
pub fn ab3_step(
    pos: WPosition,
    xi: Slowness,
    rates: [(Rate3, Rate3); 3],
    dt: f64,
) -> (WPosition, Slowness) {
    let [(p_past, x_past), (p_prev, x_prev), (p_curr, x_curr)] = rates;
    let coeff = |a: f64, b: f64, c: f64| (23.0 * c - 16.0 * b + 5.0 * a) / 12.0;
    let pos_rate = Rate3::new(
        coeff(p_past.rho, p_prev.rho, p_curr.rho),
        coeff(p_past.theta, p_prev.theta, p_curr.theta),
        coeff(p_past.phi, p_prev.phi, p_curr.phi),
    );
    let xi_rate = Rate3::new(
        coeff(x_past.rho, x_prev.rho, x_curr.rho),
        coeff(x_past.theta, x_prev.theta, x_curr.theta),
        coeff(x_past.phi, x_prev.phi, x_curr.phi),
    );
    apply(pos, xi, pos_rate, xi_rate, dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn isovelocity(_pos: WPosition) -> (f64, Gradient3) {
        (1500.0, Gradient3::default())
    }

    #[test]
    fn rk3_step_preserves_slowness_normalization_in_isovelocity() {
        let pos = WPosition::from_lat_lon_depth(0.0, 0.0, 1000.0);
        let xi = Slowness::from_de_az_deg(10.0, 0.0).scale(1.0 / 1500.0);
        let (_p, xi2) = rk3_step(isovelocity, pos, xi, 0.1);
        assert!((xi2.norm() * 1500.0 - 1.0).abs() < 1e-6);
    }
}
