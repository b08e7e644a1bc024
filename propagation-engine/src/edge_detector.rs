//! Caustic detection: a wavefront fold (found by `WaveState::find_edges`)
//! turns into a caustic when the folded ray actually crosses its neighbor
//! between one step and the next, without either ray picking up a new
//! bounce in between.

use propagation_types::Frequencies;

use crate::reflection::wrap_phase;
use crate::wavefront_queue::Ring;

pub struct EdgeDetector;

impl EdgeDetector {
    /// Scans every adjacent DE pair in every AZ column of `ring.next` for a
    /// sign change in `position.rho` relative to `ring.curr`, applying the
    /// `-pi/2` caustic phase shift and incrementing the caustic counter on
    /// whichever of the pair was flagged `on_edge`.
    pub fn detect_caustics(ring: &mut Ring, freq: &Frequencies) {
        let num_de = ring.curr.num_de();
        let num_az = ring.curr.num_az();
        if num_de < 2 {
            return;
        }
        for j in 0..num_az {
            for i in 0..num_de - 1 {
                let flagged = *ring.next.on_edge.get(i, j) || *ring.next.on_edge.get(i + 1, j);
                if !flagged {
                    continue;
                }

                let curr_diff = ring.curr.position.get(i, j).rho - ring.curr.position.get(i + 1, j).rho;
                let next_diff = ring.next.position.get(i, j).rho - ring.next.position.get(i + 1, j).rho;
                if curr_diff == 0.0 || next_diff == 0.0 {
                    continue;
                }
                if curr_diff.signum() == next_diff.signum() {
                    continue; // no crossing
                }

                let target = if *ring.next.on_edge.get(i, j) { i } else { i + 1 };
                let bounced = *ring.curr.counts.get(target, j) != *ring.next.counts.get(target, j);
                if bounced {
                    continue;
                }

                let mut counts = *ring.next.counts.get(target, j);
                counts.caustic += 1;
                ring.next.counts.set(target, j, counts);

                let phase = ring.next.phase_rad.get_mut(target, j);
                for f in 0..freq.len() {
                    phase[f] = wrap_phase(phase[f] - std::f64::consts::FRAC_PI_2);
                }
            }
        }
    }
}
