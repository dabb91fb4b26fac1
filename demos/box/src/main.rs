//! box — nucleons and pions released from a cubic volume.
//!
//! Samples a gas of nucleons and pions uniformly in a box, lets them collide
//! elastically, form and excite Δ(1232) resonances, and decay, then prints
//! per-event totals and a process tally.  Energy and momentum are checked
//! against the initial state every timestep.
//!
//! ```text
//! RUST_LOG=info cargo run --release -p box -- --nucleons 400 --events 3
//! ```

mod model;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mt_action::ProcessType;
use mt_core::{FourVector, ParticleTypes, PdgCode, SimConfig, SimRng, ThreeVector};
use mt_particles::{ParticleData, Particles};
use mt_sim::{FreeStreaming, ScatterFinder, SimBuilder, SimObserver};

use model::{BoxModel, decay_table, particle_table};

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "box", about = "Hadron gas released from a box")]
struct Args {
    /// JSON file with a `SimConfig`; missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured seed.
    #[arg(long)]
    seed: Option<u64>,

    /// Override the configured end time (fm/c).
    #[arg(long)]
    end_time: Option<f64>,

    #[arg(long, default_value_t = 200)]
    nucleons: usize,

    #[arg(long, default_value_t = 100)]
    pions: usize,

    /// Box edge length (fm).
    #[arg(long, default_value_t = 10.0)]
    length: f64,

    /// Momentum components are drawn from `[-pmax, pmax]` (GeV).
    #[arg(long, default_value_t = 1.0)]
    pmax: f64,

    /// Elastic cross section for every pair (mb).
    #[arg(long, default_value_t = 20.0)]
    elastic_mb: f64,

    #[arg(long, default_value_t = 1)]
    events: u32,

    /// Sample elastic and 2→2 angles isotropically.
    #[arg(long)]
    isotropic: bool,
}

// ── Observer ──────────────────────────────────────────────────────────────────

/// Counts executed interactions by process type.
#[derive(Default)]
struct ProcessTally {
    counts: BTreeMap<String, usize>,
}

impl SimObserver for ProcessTally {
    fn at_interaction(&mut self, _incoming: &[ParticleData], _outgoing: &[ParticleData], process: ProcessType) {
        *self.counts.entry(process.to_string()).or_default() += 1;
    }
}

// ── Initial state ─────────────────────────────────────────────────────────────

fn load_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(end) = args.end_time {
        config.end_time = end;
    }
    Ok(config)
}

/// Uniform positions in `[0, length)³` at `time`, momentum components
/// uniform in `[-pmax, pmax]`, charges drawn uniformly.
fn sample_box(args: &Args, types: &ParticleTypes, time: f64, rng: &mut SimRng) -> Result<Particles> {
    let nucleons = [types.find(PdgCode::PROTON)?, types.find(PdgCode::NEUTRON)?];
    let pions = [
        types.find(PdgCode::PI_PLUS)?,
        types.find(PdgCode::PI_ZERO)?,
        types.find(PdgCode::PI_MINUS)?,
    ];

    let mut particles = Particles::with_capacity(args.nucleons + args.pions);
    let mut species = Vec::with_capacity(args.nucleons + args.pions);
    for _ in 0..args.nucleons {
        species.push(&nucleons[rng.gen_range(0..nucleons.len())]);
    }
    for _ in 0..args.pions {
        species.push(&pions[rng.gen_range(0..pions.len())]);
    }

    for ptype in species {
        let mut record = ParticleData::new(ptype.clone());
        let p = ThreeVector::new(
            rng.uniform(-args.pmax, args.pmax),
            rng.uniform(-args.pmax, args.pmax),
            rng.uniform(-args.pmax, args.pmax),
        );
        record.set_4momentum(ptype.mass(), p);
        record.position = FourVector::new(
            time,
            rng.uniform(0.0, args.length),
            rng.uniform(0.0, args.length),
            rng.uniform(0.0, args.length),
        );
        particles.insert(record);
    }
    Ok(particles)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let types = particle_table()?;

    println!("=== box — hadron gas ===");
    println!(
        "Nucleons: {}  |  Pions: {}  |  Edge: {} fm  |  Seed: {}",
        args.nucleons, args.pions, args.length, config.seed
    );
    println!(
        "Time: {} → {} fm/c, Δt = {} fm/c",
        config.start_time, config.end_time, config.delta_time
    );
    println!();

    for event in 0..args.events {
        let mut event_config = config.clone();
        event_config.seed = config.seed.wrapping_add(u64::from(event));

        let mut sampler = SimRng::new(event_config.seed).child(1);
        let particles = sample_box(&args, &types, event_config.start_time, &mut sampler)?;
        info!(event, particles = particles.len(), "sampled initial state");

        let model = BoxModel::new(&types, args.elastic_mb)?;
        let mut sim = SimBuilder::new(event_config, particles, FreeStreaming)
            .finder(decay_table(&types)?)
            .finder(ScatterFinder::new(model).isotropic(args.isotropic))
            .event(event)
            .build()
            .with_context(|| format!("building event {event}"))?;

        let mut tally = ProcessTally::default();
        let t0 = Instant::now();
        let summary = sim.run(&mut tally).with_context(|| format!("running event {event}"))?;
        let elapsed = t0.elapsed();

        println!("Event {event} complete in {:.3} s", elapsed.as_secs_f64());
        println!(
            "  timesteps: {}  |  end time: {} fm/c  |  particles: {}",
            summary.timesteps, summary.end_time, summary.particles
        );
        println!(
            "  interactions: {}  |  rejected: {}",
            summary.interactions, summary.rejected
        );
        println!("  {:<24} {:>8}", "Process", "Count");
        println!("  {}", "-".repeat(33));
        for (process, count) in &tally.counts {
            println!("  {process:<24} {count:>8}");
        }
        println!();
    }

    Ok(())
}
