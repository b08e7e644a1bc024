use std::sync::Arc;

use propagation_types::{
    BounceCounts, Frequencies, Gradient3, Grid2D, Rate3, RayGrid, Slowness, SoundSpeedProfile,
    WPosition,
};

/// One time slice of the wavefront: position, slowness, and their
/// derivatives at every (DE, AZ) grid point, plus the bookkeeping
/// (attenuation, phase, path length, bounce counts, edge flags) carried
/// forward by the multistep predictor in `WavefrontQueue`.
///
/// Attenuation and phase are cumulative from the source; `update()` adds
/// the environment's incremental attenuation for the step just taken, and
/// leaves phase untouched — phase only changes at reflection and caustic
/// events (see `reflection` and `edge_detector`).
#[derive(Clone)]
pub struct WaveState {
    ray_grid: Arc<RayGrid>,
    frequencies: Arc<Frequencies>,
    num_targets: usize,

    pub time_s: f64,
    pub position: Grid2D<WPosition>,
    pub slowness: Grid2D<Slowness>,
    pub pos_gradient: Grid2D<Rate3>,
    pub slowness_gradient: Grid2D<Rate3>,
    pub sound_speed: Grid2D<f64>,
    pub sound_gradient: Grid2D<Gradient3>,
    pub attenuation_db: Grid2D<Vec<f64>>,
    pub phase_rad: Grid2D<Vec<f64>>,
    pub step_distance_m: Grid2D<f64>,
    pub path_length_m: Grid2D<f64>,
    pub counts: Grid2D<BounceCounts>,
    pub on_edge: Grid2D<bool>,
    /// `target_distance2[t]` holds the squared great-circle-ish distance
    /// from every ray to target `t`, refreshed each `update()`.
    pub target_distance2: Vec<Grid2D<f64>>,
}

impl WaveState {
    pub fn new(ray_grid: Arc<RayGrid>, frequencies: Arc<Frequencies>, num_targets: usize) -> Self {
        let (rows, cols) = (ray_grid.num_de(), ray_grid.num_az());
        let num_freq = frequencies.len();
        Self {
            ray_grid,
            frequencies,
            num_targets,
            time_s: 0.0,
            position: Grid2D::filled(rows, cols, WPosition::new(0.0, 0.0, 0.0)),
            slowness: Grid2D::new(rows, cols),
            pos_gradient: Grid2D::new(rows, cols),
            slowness_gradient: Grid2D::new(rows, cols),
            sound_speed: Grid2D::new(rows, cols),
            sound_gradient: Grid2D::new(rows, cols),
            attenuation_db: Grid2D::filled(rows, cols, vec![0.0; num_freq]),
            phase_rad: Grid2D::filled(rows, cols, vec![0.0; num_freq]),
            step_distance_m: Grid2D::new(rows, cols),
            path_length_m: Grid2D::new(rows, cols),
            counts: Grid2D::new(rows, cols),
            on_edge: Grid2D::new(rows, cols),
            target_distance2: (0..num_targets).map(|_| Grid2D::new(rows, cols)).collect(),
        }
    }

    pub fn num_de(&self) -> usize {
        self.ray_grid.num_de()
    }

    pub fn num_az(&self) -> usize {
        self.ray_grid.num_az()
    }

    pub fn ray_grid(&self) -> &RayGrid {
        &self.ray_grid
    }

    /// Initialize position and direction at every grid point from a
    /// common source position, normalizing slowness by the sound speed
    /// there.
    pub fn init_wave(&mut self, source: WPosition, sound_speed_at_source: f64) {
        for i in 0..self.num_de() {
            let de_deg = self.ray_grid.de_deg(i);
            for j in 0..self.num_az() {
                let az_deg = self.ray_grid.az_deg(j);
                let dir = Slowness::from_de_az_deg(de_deg, az_deg).scale(1.0 / sound_speed_at_source);
                self.position.set(i, j, source);
                self.slowness.set(i, j, dir);
            }
        }
        self.time_s = 0.0;
    }

    /// Query the environment for sound speed and gradient at every grid
    /// point, compute the Hamiltonian ray-equation derivatives (Reilly
    /// eqns. 36-41), accumulate attenuation for the step just taken, and
    /// refresh target distances if any targets are tracked.
    pub fn update(&mut self, env: &dyn SoundSpeedProfile, targets: &[WPosition]) {
        self.compute_profile(env);

        for i in 0..self.num_de() {
            for j in 0..self.num_az() {
                let c = *self.sound_speed.get(i, j);
                let grad = *self.sound_gradient.get(i, j);
                let pos = *self.position.get(i, j);
                let xi = *self.slowness.get(i, j);
                let (pos_rate, xi_rate) = crate::ray_ode::derivative(c, grad, pos, xi);
                self.pos_gradient.set(i, j, pos_rate);
                self.slowness_gradient.set(i, j, xi_rate);
            }
        }

        if !targets.is_empty() {
            self.compute_target_distance(targets);
        }
    }

    fn compute_profile(&mut self, env: &dyn SoundSpeedProfile) {
        let positions: Vec<WPosition> = self.position_vec();
        let samples = env.sound_speed(&positions);
        let distances: Vec<f64> = self.step_distance_m_vec();
        let attn = env.attenuation(&positions, &self.frequencies, &distances);

        let cols = self.num_az();
        for (idx, (c, grad)) in samples.into_iter().enumerate() {
            let (i, j) = (idx / cols, idx % cols);
            self.sound_speed.set(i, j, c);
            self.sound_gradient.set(i, j, grad);
        }
        for (idx, delta) in attn.into_iter().enumerate() {
            let (i, j) = (idx / cols, idx % cols);
            let total = self.attenuation_db.get_mut(i, j);
            for (f, d) in delta.into_iter().enumerate() {
                total[f] += d;
            }
        }
    }

    fn position_vec(&self) -> Vec<WPosition> {
        self.position.iter_indices().map(|(i, j)| *self.position.get(i, j)).collect()
    }

    fn step_distance_m_vec(&self) -> Vec<f64> {
        self.step_distance_m
            .iter_indices()
            .map(|(i, j)| *self.step_distance_m.get(i, j))
            .collect()
    }

    /// Fast small-angle approximation of squared distance from every ray
    /// to every target, avoiding a full haversine per point per step.
    fn compute_target_distance(&mut self, targets: &[WPosition]) {
        for (t, target) in targets.iter().enumerate() {
            let target_sin_theta = target.theta.sin();
            for i in 0..self.num_de() {
                for j in 0..self.num_az() {
                    let pos = *self.position.get(i, j);
                    let sin_theta = pos.theta.sin();
                    let dtheta = 0.5 * (pos.theta - target.theta);
                    let dphi = 0.5 * (pos.phi - target.phi);
                    let d2 = (pos.rho * pos.rho + target.rho * target.rho
                        - 2.0
                            * target.rho
                            * pos.rho
                            * (1.0 - 2.0 * (dtheta.powi(2)
                                + target_sin_theta * sin_theta * dphi.powi(2))))
                    .abs();
                    self.target_distance2[t].set(i, j, d2);
                }
            }
        }
    }

    /// Mark the wavefront-grid perimeter as edges, plus any interior ray
    /// that is a local extremum in `rho` along its DE column, plus
    /// whichever neighbor diverges from it most in slowness.
    pub fn find_edges(&mut self) {
        let max_de = self.num_de() - 1;
        for j in 0..self.num_az() {
            self.on_edge.set(0, j, true);
            self.on_edge.set(max_de, j, true);
        }
        if max_de == 0 {
            return;
        }
        for j in 0..self.num_az() {
            for i in 1..max_de {
                let rho = self.position.get(i, j).rho;
                let rho_next = self.position.get(i + 1, j).rho;
                let rho_prev = self.position.get(i - 1, j).rho;
                let is_extremum = (rho < rho_next && rho < rho_prev) || (rho > rho_next && rho > rho_prev);
                if is_extremum {
                    self.on_edge.set(i, j, true);
                    let d_prev = (self.slowness.get(i, j).rho - self.slowness.get(i - 1, j).rho).abs();
                    let d_next = (self.slowness.get(i, j).rho - self.slowness.get(i + 1, j).rho).abs();
                    if d_prev > d_next {
                        self.on_edge.set(i - 1, j, true);
                    } else {
                        self.on_edge.set(i + 1, j, true);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use propagation_types::RayGrid;

    struct Isovelocity {
        c: f64,
    }

    impl SoundSpeedProfile for Isovelocity {
        fn sound_speed(&self, positions: &[WPosition]) -> Vec<(f64, Gradient3)> {
            positions.iter().map(|_| (self.c, Gradient3::default())).collect()
        }
        fn attenuation(
            &self,
            positions: &[WPosition],
            frequencies: &Frequencies,
            _step_distance_m: &[f64],
        ) -> Vec<Vec<f64>> {
            positions.iter().map(|_| vec![0.0; frequencies.len()]).collect()
        }
    }

    fn state(num_de: usize, num_az: usize) -> WaveState {
        let grid = Arc::new(RayGrid::new(
            (0..num_de).map(|i| -60.0 + i as f64 * 10.0).collect(),
            (0..num_az).map(|j| j as f64).collect(),
        ).unwrap());
        let freq = Arc::new(Frequencies::new(vec![1000.0]).unwrap());
        WaveState::new(grid, freq, 0)
    }

    #[test]
    fn init_wave_normalizes_slowness_by_sound_speed() {
        let mut s = state(3, 1);
        let src = WPosition::from_lat_lon_depth(0.0, 0.0, 0.0);
        s.init_wave(src, 1500.0);
        for (i, j) in s.slowness.iter_indices() {
            let xi = s.slowness.get(i, j);
            assert!((xi.norm() * 1500.0 - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn update_accumulates_attenuation_across_steps() {
        let mut s = state(3, 1);
        let src = WPosition::from_lat_lon_depth(0.0, 0.0, 0.0);
        s.init_wave(src, 1500.0);
        let env = Isovelocity { c: 1500.0 };
        s.update(&env, &[]);
        for (i, j) in s.attenuation_db.iter_indices() {
            assert_eq!(s.attenuation_db.get(i, j)[0], 0.0);
        }
    }

    #[test]
    fn find_edges_marks_perimeter_with_single_de() {
        let mut s = state(1, 4);
        s.find_edges();
        for j in 0..4 {
            assert!(*s.on_edge.get(0, j));
        }
    }
}
