use propagation_types::{Biverb, Eigenray, Eigenverb};

use crate::wave_state::WaveState;

/// Receives eigenrays as the wavefront finds them. Implementations are
/// expected not to panic or unwind; a listener that does aborts the run.
pub trait EigenrayListener {
    fn add_eigenray(&mut self, target_row: usize, target_col: usize, ray: Eigenray, run_id: u64);
}

impl EigenrayListener for () {
    fn add_eigenray(&mut self, _target_row: usize, _target_col: usize, _ray: Eigenray, _run_id: u64) {}
}

/// Receives eigenverbs as the wavefront collides with boundaries.
pub trait EigenverbListener {
    fn add_eigenverb(&mut self, verb: Eigenverb, interface_index: usize);
}

impl EigenverbListener for () {
    fn add_eigenverb(&mut self, _verb: Eigenverb, _interface_index: usize) {}
}

/// Receives biverbs as `BiverbCombiner` pairs source and receiver verbs.
pub trait BiverbListener {
    fn add_biverb(&mut self, verb: Biverb, interface_index: usize);
}

impl BiverbListener for () {
    fn add_biverb(&mut self, _verb: Biverb, _interface_index: usize) {}
}

/// Optional diagnostic hook invoked once per step with the freshly
/// advanced snapshot. A no-op implementation is provided for callers who
/// don't need it.
pub trait WavefrontListener {
    fn on_step(&mut self, time_s: f64, snapshot: &WaveState);
}

impl WavefrontListener for () {
    fn on_step(&mut self, _time_s: f64, _snapshot: &WaveState) {}
}
