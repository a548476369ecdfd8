use clap::Parser;
use crossbeam_channel::{bounded, Receiver};
use hdrhistogram::Histogram;
use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use swarmlab_config::{
    ConfigError, ConfigLoader, ConfigOverrides, SenderConfig, SerializerType, SwarmConfig,
};
use swarmlab_core::NullSink;
use swarmlab_simulation::Swarm;
use swarmlab_transport::{
    BinarySerializer, FileSender, FrameRecorder, JsonSerializer, NullSender, Sender, Serializer,
    StdoutSender, TransportError,
};
use thiserror::Error;

use std::path::PathBuf;
use std::process;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the swarm configuration file (.json or .toml)
    #[arg(short, long, default_value = "swarm.json")]
    config: PathBuf,

    /// Stop after this many ticks instead of running until Ctrl-C
    #[arg(long)]
    ticks: Option<u64>,

    #[command(flatten)]
    overrides: ConfigOverrides,
}

#[derive(Error, Debug)]
enum RunnerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Failed to install Ctrl-C handler: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error("Failed to create tick histogram: {0}")]
    Stats(#[from] hdrhistogram::CreationError),
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), RunnerError> {
    let mut config = ConfigLoader::from_file(&args.config)?;
    args.overrides.apply(&mut config);
    ConfigLoader::validate(&config)?;
    info!("Using configuration from {}", args.config.display());

    let mut rng = match config.simulation.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut swarm = config.build().instantiate(&mut rng);

    let serializer = create_serializer(&config);
    let mut sender = create_sender(&config)?;

    let (shutdown_tx, shutdown_rx) = bounded(1);
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.try_send(());
    })?;

    info!(
        "Running {} entities at {} FPS{}",
        swarm.len(),
        config.simulation.frame_rate,
        if config.simulation.parallel { " (parallel)" } else { "" }
    );

    let stats = simulate(
        &mut swarm,
        &config,
        args.ticks,
        serializer.as_ref(),
        sender.as_mut(),
        &shutdown_rx,
    )?;

    report(&swarm, &stats);
    Ok(())
}

/// Runs the fixed-step loop until the tick limit or a shutdown signal.
/// Returns per-tick compute times in microseconds.
fn simulate(
    swarm: &mut Swarm,
    config: &SwarmConfig,
    max_ticks: Option<u64>,
    serializer: &dyn Serializer,
    sender: &mut dyn Sender,
    shutdown: &Receiver<()>,
) -> Result<Histogram<u64>, RunnerError> {
    let frame_duration = Duration::from_secs_f64(1.0 / f64::from(config.simulation.frame_rate));
    let dt = frame_duration.as_secs_f32();
    let every_n = u64::from(config.output.every_n_ticks);

    let mut stats = Histogram::<u64>::new_with_bounds(1, 60_000_000, 3)?;
    let mut recorder = FrameRecorder::new();
    let mut overruns = 0u64;

    loop {
        if shutdown.try_recv().is_ok() {
            info!("Shutdown requested");
            break;
        }
        if max_ticks.map_or(false, |limit| swarm.tick_count() >= limit) {
            break;
        }

        let frame_start = Instant::now();

        if (swarm.tick_count() + 1) % every_n == 0 {
            swarm.step(dt, &mut recorder);
            if let Some(mut frame) = recorder.take() {
                frame.time = swarm.elapsed();
                let data = serializer.serialize(&frame)?;
                sender.send(data.as_bytes())?;
            }
        } else {
            swarm.step(dt, &mut NullSink);
        }

        let elapsed = frame_start.elapsed();
        stats.saturating_record(elapsed.as_micros().max(1) as u64);

        if elapsed < frame_duration {
            spin_sleep::sleep(frame_duration - elapsed);
        } else {
            overruns += 1;
            if config.simulation.frame_rate > 10 {
                warn!("Tick time exceeded budget: {:?} > {:?}", elapsed, frame_duration);
            }
        }
    }

    if overruns > 0 {
        warn!("{} ticks exceeded the frame budget", overruns);
    }
    Ok(stats)
}

fn report(swarm: &Swarm, stats: &Histogram<u64>) {
    info!(
        "Stopped after {} ticks ({:.2}s simulated)",
        swarm.tick_count(),
        swarm.elapsed()
    );
    if stats.len() == 0 {
        return;
    }
    info!(
        "Tick time (us): p50={} p90={} p99={} max={}",
        stats.value_at_quantile(0.5),
        stats.value_at_quantile(0.9),
        stats.value_at_quantile(0.99),
        stats.max()
    );
}

fn create_serializer(config: &SwarmConfig) -> Box<dyn Serializer> {
    match config.output.serializer {
        SerializerType::Json => Box::new(JsonSerializer),
        SerializerType::Binary => Box::new(BinarySerializer),
    }
}

fn create_sender(config: &SwarmConfig) -> Result<Box<dyn Sender>, TransportError> {
    let sender: Box<dyn Sender> = match &config.output.sender {
        SenderConfig::Stdout => {
            info!("Sending frames to standard output");
            Box::new(StdoutSender::new())
        }
        SenderConfig::File { path } => {
            info!("Appending frames to {}", path.display());
            Box::new(FileSender::create(path)?)
        }
        SenderConfig::Null => Box::new(NullSender),
    };
    Ok(sender)
}
