use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use floor_core::{
    FloorManager, JsonFileStore, MemoryStore, MineConfig, NullSink, ObstacleKind, ProgressionStore,
    TemplateLibrary,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Depth to generate (clamped into 1..=120)
    #[arg(short, long, default_value_t = 1)]
    depth: i32,
    /// Fixed run seed; omitted means a fresh layout every run
    #[arg(short, long)]
    seed: Option<u64>,
    /// Optional JSON mine config
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Progression file to read and update; defaults to an in-memory store
    #[arg(long)]
    store: Option<PathBuf>,
    /// Use the per-user progression file instead of `--store`
    #[arg(long, conflicts_with = "store")]
    user_store: bool,
    /// Write a save with the generated layout here
    #[arg(long)]
    save: Option<PathBuf>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => MineConfig::load(path)
            .with_context(|| format!("Failed to load mine config: {}", path.display()))?,
        None => MineConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let store_path = if args.user_store {
        Some(JsonFileStore::default_path().context("No per-user data directory on this platform")?)
    } else {
        args.store.clone()
    };

    match store_path {
        Some(path) => {
            let store = JsonFileStore::open(&path)
                .with_context(|| format!("Failed to open progression file: {}", path.display()))?;
            report(config, store, &args)
        }
        None => report(config, MemoryStore::new(), &args),
    }
}

fn report<S: ProgressionStore>(config: MineConfig, store: S, args: &Args) -> Result<()> {
    let mut manager = FloorManager::new(config, TemplateLibrary::default(), store, NullSink);
    manager.go_to_depth(args.depth);

    let mut counts: BTreeMap<ObstacleKind, usize> = BTreeMap::new();
    for (_, node) in manager.obstacles().iter() {
        *counts.entry(node.kind).or_default() += 1;
    }

    println!("Depth: {}", manager.current_depth().get());
    println!("Theme: {:?}", manager.current_theme());
    println!("Template: {}", manager.template().name());
    println!("Obstacles: {}", manager.obstacles().len());
    for (kind, count) in &counts {
        println!("  {kind:?}: {count}");
    }
    println!("Main stairs: {:?}", manager.stairs().main().tile);
    for marker in manager.stairs().extras() {
        let note = if marker.covered_by_obstacle { " (covered)" } else { "" };
        println!("Extra stairs: {:?}{note}", marker.tile);
    }
    println!("Bottom floor: {}", manager.is_at_bottom_floor());
    println!("Unlocked elevators: {:?}", manager.unlocked_depths());
    println!("Layout fingerprint: {:016x}", manager.layout_fingerprint());

    if let Some(path) = &args.save {
        manager
            .snapshot(true)
            .write_atomic(path)
            .with_context(|| format!("Failed to write save: {}", path.display()))?;
        println!("Saved to {}", path.display());
    }

    Ok(())
}
