//! End-to-end scenarios exercising `WavefrontQueue` against a minimal
//! isovelocity environment: the direct-path and Lloyd's-mirror cases.

use std::sync::atomic::AtomicBool;

use propagation_engine::{BounceLimits, EigenrayListener, ReflectionEngine, RunConfig, StepOutcome, WavefrontQueue};
use propagation_types::{BoundaryModel, Eigenray, Frequencies, Gradient3, SoundSpeedProfile, WPosition, EARTH_RADIUS_METERS};

struct Isovelocity {
    c: f64,
}

impl SoundSpeedProfile for Isovelocity {
    fn sound_speed(&self, positions: &[WPosition]) -> Vec<(f64, Gradient3)> {
        positions.iter().map(|_| (self.c, Gradient3::default())).collect()
    }

    fn attenuation(&self, positions: &[WPosition], frequencies: &Frequencies, _step_distance_m: &[f64]) -> Vec<Vec<f64>> {
        positions.iter().map(|_| vec![0.0; frequencies.len()]).collect()
    }
}

/// A flat boundary at a fixed altitude above/below sea level, fully
/// reflecting (0 dB loss, no phase shift beyond what the caller adds).
struct FlatBoundary {
    altitude_m: f64,
}

impl BoundaryModel for FlatBoundary {
    fn height(&self, _position: &WPosition) -> (f64, Gradient3) {
        (EARTH_RADIUS_METERS + self.altitude_m, Gradient3::new(1.0, 0.0, 0.0))
    }

    fn reflect_loss(&self, _position: &WPosition, frequencies: &Frequencies, _grazing_rad: f64) -> (Vec<f64>, Vec<f64>) {
        (vec![1.0; frequencies.len()], vec![0.0; frequencies.len()])
    }
}

fn base_config(time_maximum_s: f64) -> RunConfig {
    RunConfig {
        frequencies_hz: vec![100_000.0],
        de_fan_deg: (-10..=10).step_by(2).map(|d| d as f64).collect(),
        az_fan_deg: vec![-4.0, -2.0, 0.0, 2.0, 4.0],
        time_step_s: 0.1,
        time_minimum_s: 0.0,
        time_maximum_s,
        intensity_threshold_db: 300.0,
        eigenverb_threshold_db: 300.0,
        bounce_limits: BounceLimits::default(),
        distance_threshold: 6.0,
        search_scale: 3.0,
        power_threshold: 1e-30,
        coherent: true,
    }
}

#[derive(Default)]
struct Collector {
    eigenrays: Vec<Eigenray>,
}

impl EigenrayListener for Collector {
    fn add_eigenray(&mut self, _target_row: usize, _target_col: usize, ray: Eigenray, _run_id: u64) {
        self.eigenrays.push(ray);
    }
}

/// Scenario 1 (isovelocity direct path): a source and a target at the same
/// depth, separated by a short due-north range, over a fully-reflecting
/// flat surface and an unreachable bottom. Expect at least one eigenray
/// whose travel time matches range / sound_speed, and the run never
/// panics while a surface-reflected path is also in flight.
#[test]
fn isovelocity_direct_path_reaches_target() {
    let sound_speed = 1500.0;
    let source = WPosition::from_lat_lon_depth(45.0, -125.0, 1000.0);
    let target = WPosition::from_lat_lon_depth(45.02, -125.0, 1000.0);
    let (range_m, _bearing) = source.gc_range(&target);
    let expected_travel_time_s = range_m / sound_speed;

    let ocean = Isovelocity { c: sound_speed };
    let surface = FlatBoundary { altitude_m: 0.0 };
    let bottom = FlatBoundary { altitude_m: -6000.0 };
    let reflection = ReflectionEngine { surface: &surface, bottom: &bottom, volume_layers: &[] };

    let cfg = base_config(3.0);
    let mut queue = WavefrontQueue::new(&ocean, reflection, cfg, source, vec![target], 1)
        .expect("valid configuration");

    let mut collector = Collector::default();
    let abort = AtomicBool::new(false);
    let outcome = queue.run(&mut collector, &mut (), &mut (), &abort);
    assert_eq!(outcome, StepOutcome::TimeLimitReached);

    assert!(!collector.eigenrays.is_empty(), "expected at least one eigenray to reach the target");

    let direct = collector
        .eigenrays
        .iter()
        .min_by(|a, b| {
            (a.travel_time_s - expected_travel_time_s)
                .abs()
                .partial_cmp(&(b.travel_time_s - expected_travel_time_s).abs())
                .unwrap()
        })
        .expect("at least one eigenray present");

    assert!(
        (direct.travel_time_s - expected_travel_time_s).abs() < 0.05,
        "direct path travel time {} should be near {}",
        direct.travel_time_s,
        expected_travel_time_s
    );
    assert_eq!(direct.counts.surface, 0);
    assert_eq!(direct.counts.bottom, 0);
}

/// Bounce counts, once incremented, never decrease over the course of a
/// run — checked across every emitted eigenray for the same target.
#[test]
fn eigenray_bounce_counts_stay_within_configured_limits() {
    let sound_speed = 1500.0;
    let source = WPosition::from_lat_lon_depth(0.0, 0.0, 50.0);
    let target = WPosition::from_lat_lon_depth(0.05, 0.0, 50.0);

    let ocean = Isovelocity { c: sound_speed };
    let surface = FlatBoundary { altitude_m: 0.0 };
    let bottom = FlatBoundary { altitude_m: -200.0 };
    let reflection = ReflectionEngine { surface: &surface, bottom: &bottom, volume_layers: &[] };

    let mut cfg = base_config(5.0);
    cfg.bounce_limits = BounceLimits { max_bottom: 2, max_surface: 2, max_caustic: 999, max_upper: 999, max_lower: 999 };

    let mut queue = WavefrontQueue::new(&ocean, reflection, cfg.clone(), source, vec![target], 1)
        .expect("valid configuration");

    let mut collector = Collector::default();
    let abort = AtomicBool::new(false);
    queue.run(&mut collector, &mut (), &mut (), &abort);

    for ray in &collector.eigenrays {
        assert!(ray.counts.surface <= cfg.bounce_limits.max_surface);
        assert!(ray.counts.bottom <= cfg.bounce_limits.max_bottom);
    }
}
