//! propagation-demo — runs one monostatic propagation over a flat,
//! isovelocity ocean and reports the eigenrays, eigenverbs, and
//! self-combined (monostatic) biverbs it produces.

mod flat_ocean;

use std::sync::atomic::AtomicBool;
use std::collections::HashMap;

use clap::Parser;
use serde::Deserialize;
use tracing::info;

use propagation_engine::{
    BiverbCombiner, BiverbListener, EigenrayExtractor, EigenrayListener, EigenverbListener, ReflectionEngine,
    RunConfig, WavefrontQueue,
};
use propagation_types::{Biverb, Eigenray, Eigenverb, Frequencies, WPosition};

use flat_ocean::{Bottom, ConstantScattering, FlatOcean, Surface};

#[derive(Parser, Debug)]
#[command(name = "propagation-demo", about = "Underwater acoustic wavefront propagation demo")]
struct Args {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Debug, Deserialize)]
struct DemoConfig {
    source: PointConfig,
    #[serde(default)]
    targets: Vec<PointConfig>,
    run: RunConfig,
    environment: EnvironmentConfig,
}

#[derive(Debug, Deserialize)]
struct PointConfig {
    latitude_deg: f64,
    longitude_deg: f64,
    depth_m: f64,
}

impl PointConfig {
    fn to_position(&self) -> WPosition {
        WPosition::from_lat_lon_depth(self.latitude_deg, self.longitude_deg, self.depth_m)
    }
}

#[derive(Debug, Deserialize)]
struct EnvironmentConfig {
    sound_speed_mps: f64,
    bottom_depth_m: f64,
    bottom_reflect_loss_db: f64,
    surface_reflect_loss_db: f64,
}

#[derive(Default)]
struct EigenrayCollector {
    eigenrays: Vec<(usize, usize, Eigenray)>,
}

impl EigenrayListener for EigenrayCollector {
    fn add_eigenray(&mut self, target_row: usize, target_col: usize, ray: Eigenray, _run_id: u64) {
        info!(
            "eigenray -> target ({target_row},{target_col}) travel_time={:.4}s loss[0]={:.1}dB bounces(s={},b={})",
            ray.travel_time_s, ray.intensity_db[0], ray.counts.surface, ray.counts.bottom
        );
        self.eigenrays.push((target_row, target_col, ray));
    }
}

#[derive(Default)]
struct EigenverbCollector {
    eigenverbs: Vec<(usize, Eigenverb)>,
}

impl EigenverbListener for EigenverbCollector {
    fn add_eigenverb(&mut self, verb: Eigenverb, interface_index: usize) {
        self.eigenverbs.push((interface_index, verb));
    }
}

#[derive(Default)]
struct BiverbCollector {
    biverbs: Vec<(usize, Biverb)>,
}

impl BiverbListener for BiverbCollector {
    fn add_biverb(&mut self, verb: Biverb, interface_index: usize) {
        self.biverbs.push((interface_index, verb));
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "propagation_demo=info".into()),
        )
        .init();

    let args = Args::parse();

    let config_str =
        std::fs::read_to_string(&args.config).unwrap_or_else(|_| include_str!("../config.toml").to_string());
    let cfg: DemoConfig = toml::from_str(&config_str).expect("invalid config file");
    cfg.run.validate().expect("invalid run configuration");

    let source = cfg.source.to_position();
    let targets: Vec<WPosition> = cfg.targets.iter().map(PointConfig::to_position).collect();

    info!(
        "propagation run: source=({:.4},{:.4},{:.1}m) targets={} de_fan={} az_fan={} freqs={}",
        cfg.source.latitude_deg,
        cfg.source.longitude_deg,
        cfg.source.depth_m,
        targets.len(),
        cfg.run.de_fan_deg.len(),
        cfg.run.az_fan_deg.len(),
        cfg.run.frequencies_hz.len(),
    );

    let ocean = FlatOcean { sound_speed_mps: cfg.environment.sound_speed_mps };
    let surface = Surface { reflect_loss_db: cfg.environment.surface_reflect_loss_db };
    let bottom = Bottom { depth_m: cfg.environment.bottom_depth_m, reflect_loss_db: cfg.environment.bottom_reflect_loss_db };
    let scattering = ConstantScattering { strength: 1e-3 };

    let reflection = ReflectionEngine { surface: &surface, bottom: &bottom, volume_layers: &[] };

    let mut queue = WavefrontQueue::new(&ocean, reflection, cfg.run.clone(), source, targets, 1)
        .expect("failed to build wavefront queue");

    let mut eigenray_collector = EigenrayCollector::default();
    let mut eigenverb_collector = EigenverbCollector::default();
    let abort = AtomicBool::new(false);
    let outcome = queue.run(&mut eigenray_collector, &mut eigenverb_collector, &mut (), &abort);
    info!("propagation finished: {outcome:?}");

    info!(
        "collected {} eigenrays, {} eigenverbs",
        eigenray_collector.eigenrays.len(),
        eigenverb_collector.eigenverbs.len()
    );

    let mut by_interface: HashMap<usize, Vec<Eigenverb>> = HashMap::new();
    for (idx, verb) in eigenverb_collector.eigenverbs.drain(..) {
        by_interface.entry(idx).or_default().push(verb);
    }

    let freq = Frequencies::new(cfg.run.frequencies_hz.clone()).expect("frequencies already validated");
    let combiner = BiverbCombiner { scattering: &scattering };
    let mut biverb_sink = BiverbCollector::default();
    for (idx, verbs) in &by_interface {
        combiner.combine(verbs, verbs, *idx, &cfg.run, &freq, &mut biverb_sink);
    }
    info!("combined {} monostatic biverbs across {} interfaces", biverb_sink.biverbs.len(), by_interface.len());

    let mut by_target: HashMap<usize, Vec<Eigenray>> = HashMap::new();
    for (target_row, _target_col, ray) in eigenray_collector.eigenrays.drain(..) {
        by_target.entry(target_row).or_default().push(ray);
    }
    for (target_row, rays) in &by_target {
        if let Some(summed) = EigenrayExtractor::combine_for_target(rays, &freq, &cfg.run) {
            info!(
                "target {target_row}: {} arrivals combined ({}herent) -> loss[0]={:.1}dB travel_time={:.4}s",
                rays.len(),
                if cfg.run.coherent { "co" } else { "inco" },
                summed.intensity_db[0],
                summed.travel_time_s
            );
        }
    }
}
