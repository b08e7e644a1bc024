//! The four-slot ring buffer and the per-step orchestration that ties
//! `WaveState`, `ReflectionEngine`, `EdgeDetector`, `EigenrayExtractor`, and
//! `EigenverbEmitter` together into one propagation run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use propagation_types::{Frequencies, RayGrid, SoundSpeedProfile, WPosition};

use crate::config::RunConfig;
use crate::edge_detector::EdgeDetector;
use crate::eigenray_extractor::EigenrayExtractor;
use crate::eigenverb_emitter::EigenverbEmitter;
use crate::error::{PropagationError, Result};
use crate::listener::{EigenrayListener, EigenverbListener, WavefrontListener};
use crate::ray_ode;
use crate::reflection::ReflectionEngine;
use crate::wave_state::WaveState;

/// Four consecutive time slices of the wavefront: `past` and `prev` feed
/// the Adams-Bashforth predictor, `curr` is the last fully processed
/// step, and `next` is being built by the current call to `step()`.
pub struct Ring {
    pub past: WaveState,
    pub prev: WaveState,
    pub curr: WaveState,
    pub next: WaveState,
}

impl Ring {
    /// `past <- prev <- curr <- next`, reusing `next`'s old allocation
    /// (now holding the oldest data) as the buffer for the following step.
    fn rotate(&mut self) {
        std::mem::swap(&mut self.past, &mut self.prev);
        std::mem::swap(&mut self.prev, &mut self.curr);
        std::mem::swap(&mut self.curr, &mut self.next);
    }

    pub fn time_step_s(&self) -> f64 {
        self.curr.time_s - self.prev.time_s
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continued,
    TimeLimitReached,
    Aborted,
}

/// Drives one propagation run: owns the ring, the environment handle, and
/// the reflection engine, and advances them one time step at a time.
pub struct WavefrontQueue<'a> {
    ring: Ring,
    ray_grid: Arc<RayGrid>,
    freq: Arc<Frequencies>,
    targets: Vec<WPosition>,
    env: &'a dyn SoundSpeedProfile,
    reflection: ReflectionEngine<'a>,
    cfg: RunConfig,
    dt: f64,
    run_id: u64,
}

impl<'a> WavefrontQueue<'a> {
    /// Builds the initial wave at `source` and bootstraps `past`/`prev`
    /// by integrating backward with RK3, so the AB3 predictor has a full
    /// three-point history before the first real step.
    pub fn new(
        env: &'a dyn SoundSpeedProfile,
        reflection: ReflectionEngine<'a>,
        cfg: RunConfig,
        source: WPosition,
        targets: Vec<WPosition>,
        run_id: u64,
    ) -> Result<Self> {
        cfg.validate()?;
        let ray_grid = Arc::new(
            RayGrid::new(cfg.de_fan_deg.clone(), cfg.az_fan_deg.clone())
                .map_err(PropagationError::InvalidConfiguration)?,
        );
        let freq = Arc::new(
            Frequencies::new(cfg.frequencies_hz.clone()).map_err(PropagationError::InvalidConfiguration)?,
        );
        let dt = cfg.time_step_s;
        let num_targets = targets.len();

        let mut curr = WaveState::new(ray_grid.clone(), freq.clone(), num_targets);
        let (c0, _) = env.sound_speed(&[source])[0];
        curr.init_wave(source, c0);
        curr.update(env, &targets);

        let sample = |p: WPosition| env.sound_speed(&[p])[0];
        let mut prev = WaveState::new(ray_grid.clone(), freq.clone(), num_targets);
        let mut past = WaveState::new(ray_grid.clone(), freq.clone(), num_targets);
        for i in 0..ray_grid.num_de() {
            for j in 0..ray_grid.num_az() {
                let pos = *curr.position.get(i, j);
                let xi = *curr.slowness.get(i, j);
                let (p1, x1) = ray_ode::rk3_step(sample, pos, xi, -dt);
                prev.position.set(i, j, p1);
                prev.slowness.set(i, j, x1);
                let (p2, x2) = ray_ode::rk3_step(sample, p1, x1, -dt);
                past.position.set(i, j, p2);
                past.slowness.set(i, j, x2);
            }
        }
        prev.time_s = -dt;
        past.time_s = -2.0 * dt;
        prev.update(env, &targets);
        past.update(env, &targets);

        let next = curr.clone();
        let ring = Ring { past, prev, curr, next };

        Ok(Self {
            ring,
            ray_grid,
            freq,
            targets,
            env,
            reflection,
            cfg,
            dt,
            run_id,
        })
    }

    pub fn time_s(&self) -> f64 {
        self.ring.curr.time_s
    }

    pub fn ring(&self) -> &Ring {
        &self.ring
    }

    /// Advances the wavefront by one time step:
    /// 1. Predict `next`'s geometry from the AB3 rates at `past`/`prev`/`curr`.
    /// 2. `next.update()`: refresh environment samples, accumulate attenuation.
    /// 3. `ReflectionEngine::process_ray` per ray (surface, bottom, volume layers).
    /// 4. `next.find_edges()`.
    /// 5. `EdgeDetector::detect_caustics`.
    /// 6. `EigenrayExtractor::scan`.
    /// 7. `EigenverbEmitter::emit` per collision.
    /// 8. Rotate the ring.
    #[allow(clippy::too_many_arguments)]
    pub fn step(
        &mut self,
        eigenray_listener: &mut dyn EigenrayListener,
        eigenverb_listener: &mut dyn EigenverbListener,
        wavefront_listener: &mut dyn WavefrontListener,
        abort: &AtomicBool,
    ) -> StepOutcome {
        if abort.load(Ordering::Relaxed) {
            return StepOutcome::Aborted;
        }
        if self.ring.curr.time_s >= self.cfg.time_maximum_s {
            return StepOutcome::TimeLimitReached;
        }

        let num_de = self.ray_grid.num_de();
        let num_az = self.ray_grid.num_az();

        for i in 0..num_de {
            for j in 0..num_az {
                let rates = [
                    (*self.ring.past.pos_gradient.get(i, j), *self.ring.past.slowness_gradient.get(i, j)),
                    (*self.ring.prev.pos_gradient.get(i, j), *self.ring.prev.slowness_gradient.get(i, j)),
                    (*self.ring.curr.pos_gradient.get(i, j), *self.ring.curr.slowness_gradient.get(i, j)),
                ];
                let pos = *self.ring.curr.position.get(i, j);
                let xi = *self.ring.curr.slowness.get(i, j);
                let (next_pos, next_xi) = ray_ode::ab3_step(pos, xi, rates, self.dt);

                let step_distance = pos.straight_line_distance(&next_pos);
                let path_so_far = *self.ring.curr.path_length_m.get(i, j);

                self.ring.next.position.set(i, j, next_pos);
                self.ring.next.slowness.set(i, j, next_xi);
                self.ring.next.step_distance_m.set(i, j, step_distance);
                self.ring.next.path_length_m.set(i, j, path_so_far + step_distance);
                self.ring.next.attenuation_db.set(i, j, self.ring.curr.attenuation_db.get(i, j).clone());
                self.ring.next.phase_rad.set(i, j, self.ring.curr.phase_rad.get(i, j).clone());
                self.ring.next.counts.set(i, j, *self.ring.curr.counts.get(i, j));
            }
        }
        self.ring.next.time_s = self.ring.curr.time_s + self.dt;

        self.ring.next.update(self.env, &self.targets);

        let mut collisions = Vec::new();
        for i in 0..num_de {
            for j in 0..num_az {
                if let Some(info) =
                    self.reflection.process_ray(self.env, &mut self.ring, i, j, self.dt, &self.freq)
                {
                    collisions.push((i, j, info));
                }
            }
        }

        tracing::trace!(
            run_id = self.run_id,
            time_s = self.ring.next.time_s,
            collisions = collisions.len(),
            "wavefront step"
        );

        self.ring.next.find_edges();
        EdgeDetector::detect_caustics(&mut self.ring, &self.freq);

        EigenrayExtractor::scan(
            &self.ring,
            &self.freq,
            &self.targets,
            &self.cfg,
            self.run_id,
            eigenray_listener,
        );

        for (i, j, info) in &collisions {
            EigenverbEmitter::emit(info, &self.ring, *i, *j, &self.freq, &self.cfg, eigenverb_listener);
        }

        wavefront_listener.on_step(self.ring.next.time_s, &self.ring.next);
        self.ring.rotate();

        StepOutcome::Continued
    }

    /// Runs steps until the time limit is reached or the abort flag is
    /// set, returning the outcome that stopped the loop.
    pub fn run(
        &mut self,
        eigenray_listener: &mut dyn EigenrayListener,
        eigenverb_listener: &mut dyn EigenverbListener,
        wavefront_listener: &mut dyn WavefrontListener,
        abort: &AtomicBool,
    ) -> StepOutcome {
        loop {
            match self.step(eigenray_listener, eigenverb_listener, wavefront_listener, abort) {
                StepOutcome::Continued => continue,
                other => return other,
            }
        }
    }
}
