use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use splat_reveal::{
    Catalog, CatalogSource, CommandScript, DatasetId, DatasetRegistry, DirectorConfig,
    EffectKind, EffectParams, EvalThreading, FrameSnapshot, HeadlessHost, JsonFileStore,
    ParamStore, SceneDirector, Settings, SyntheticLoader, ThreadedLoader, evaluate_frame_with_stats,
};

#[derive(Parser, Debug)]
#[command(name = "splat-reveal", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate one frame of an effect over a synthetic cloud and print frame statistics.
    Sample(SampleArgs),
    /// Run a timed command script through the scene director and print the event log.
    Simulate(SimulateArgs),
    /// Print the dataset catalog.
    Scenes(ScenesArgs),
}

#[derive(Parser, Debug)]
struct SampleArgs {
    /// Effect kind: `radial`, `instant`, `fade`, `spread`, `unroll`, `twister` or `magic`.
    #[arg(long, default_value = "radial")]
    effect: EffectKind,

    /// Effect-local time in seconds.
    #[arg(long, default_value_t = 1.0)]
    time: f32,

    /// Number of synthetic points.
    #[arg(long, default_value_t = 4096)]
    points: usize,

    /// Dataset id used to seed the synthetic cloud.
    #[arg(long, default_value = "room")]
    dataset: String,

    /// Effect parameters JSON; missing fields take their defaults.
    #[arg(long)]
    params: Option<PathBuf>,

    /// Worker threads; 0 evaluates on the calling thread.
    #[arg(long)]
    threads: Option<usize>,

    /// Play the effect in reverse (hide).
    #[arg(long)]
    reverse: bool,
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Command script JSON: an array of `{ "at": <seconds>, "command": ... }`.
    #[arg(long)]
    script: PathBuf,

    /// Director configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scene listing JSON. Falls back to the built-in datasets when unusable.
    #[arg(long)]
    listing: Option<PathBuf>,

    /// Directory holding persisted settings; restored before and saved after the run.
    #[arg(long)]
    settings_dir: Option<PathBuf>,

    /// Simulation tick rate.
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// Keep ticking this many seconds after the last command.
    #[arg(long, default_value_t = 10.0)]
    tail: f64,

    /// Points per synthetic dataset.
    #[arg(long, default_value_t = 2048)]
    points: usize,

    /// Simulated load latency in milliseconds. Loads run on a background thread when set.
    #[arg(long)]
    load_latency_ms: Option<u64>,
}

#[derive(Parser, Debug)]
struct ScenesArgs {
    /// Scene listing JSON.
    #[arg(long)]
    listing: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Sample(args) => cmd_sample(args),
        Command::Simulate(args) => cmd_simulate(args),
        Command::Scenes(args) => cmd_scenes(args),
    }
}

fn read_text(path: &Path, what: &str) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {what} '{}'", path.display()))
}

fn load_catalog(listing: Option<&Path>) -> anyhow::Result<(Catalog, CatalogSource)> {
    match listing {
        Some(path) => Ok(Catalog::from_listing_or_builtin(&read_text(path, "scene listing")?)),
        None => Ok((Catalog::builtin(), CatalogSource::Builtin)),
    }
}

fn cmd_sample(args: SampleArgs) -> anyhow::Result<()> {
    let mut params = match &args.params {
        Some(path) => serde_json::from_str::<EffectParams>(&read_text(path, "parameters")?)
            .with_context(|| "parse parameters JSON")?,
        None => EffectParams::default(),
    };
    params = args.effect.build(&params);
    params.reverse_mode = args.reverse;

    let cloud = SyntheticLoader::with_points(args.points).generate(&DatasetId::new(args.dataset));
    let snapshot = FrameSnapshot::new(args.effect, &params, args.time);
    let threading = match args.threads {
        Some(0) => EvalThreading::sequential(),
        threads => EvalThreading {
            threads,
            ..EvalThreading::default()
        },
    };
    let (_, stats) = evaluate_frame_with_stats(&cloud.points, &snapshot, &threading)?;

    let report = serde_json::json!({
        "effect": args.effect,
        "time": snapshot.time,
        "front": snapshot.front,
        "stats": stats,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.fps.is_finite() && args.fps > 0.0,
        "fps must be finite and > 0"
    );
    anyhow::ensure!(
        args.tail.is_finite() && args.tail >= 0.0,
        "tail must be finite and >= 0"
    );

    let script = CommandScript::from_json(&read_text(&args.script, "command script")?)?;
    let config = match &args.config {
        Some(path) => DirectorConfig::from_json(&read_text(path, "director config")?)?,
        None => DirectorConfig::default(),
    };
    let (catalog, source) = load_catalog(args.listing.as_deref())?;
    tracing::info!(datasets = catalog.len(), ?source, "catalog ready");

    let synthetic = SyntheticLoader::with_points(args.points);
    let registry = match args.load_latency_ms {
        Some(ms) => DatasetRegistry::new(
            catalog,
            ThreadedLoader::new(synthetic).with_latency(Duration::from_millis(ms)),
        ),
        None => DatasetRegistry::new(catalog, synthetic),
    };

    let mut store = ParamStore::default();
    let mut settings_store = args.settings_dir.as_ref().map(JsonFileStore::new);
    let mut effect = config.initial_effect;
    if let Some(backend) = &settings_store
        && let Some(saved) = Settings::load_from(backend)?
    {
        let changes = saved.apply(&mut store);
        effect = saved.effect;
        tracing::info!(changed = changes.len(), "settings restored");
    }

    let mut director = SceneDirector::new(config, registry, HeadlessHost::default())?
        .with_params(store);
    director.set_effect(effect, 0.0);

    let dt = 1.0 / args.fps;
    let end = script.end_time() + args.tail;
    let mut steps = script.steps.iter().peekable();
    let mut frame: u64 = 0;
    loop {
        let now = frame as f64 * dt;
        while let Some(step) = steps.next_if(|s| s.at <= now) {
            if let Err(err) = director.dispatch(&step.command, now) {
                tracing::warn!(at = step.at, %err, "command failed");
            }
        }
        director.tick(now);
        if now >= end && steps.peek().is_none() {
            break;
        }
        frame += 1;
    }
    if args.load_latency_ms.is_some() && !director.is_idle() {
        tracing::warn!("simulation ended while a dataset was still loading");
    }

    if let Some(backend) = settings_store.as_mut() {
        Settings::capture(director.params().params(), director.effect_kind()).save_to(backend)?;
        tracing::info!(dir = %backend.dir().display(), "settings saved");
    }

    let report = serde_json::json!({
        "events": director.events(),
        "status": director.status(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_scenes(args: ScenesArgs) -> anyhow::Result<()> {
    let (catalog, source) = load_catalog(args.listing.as_deref())?;
    let report = serde_json::json!({
        "source": source,
        "scenes": catalog.entries(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
