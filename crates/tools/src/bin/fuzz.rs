use std::collections::HashSet;

use anyhow::{Result, bail};
use clap::Parser;
use floor_core::{
    FloorManager, MemoryStore, MineConfig, RecordingSink, TemplateLibrary, TilePos, Vec2,
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(long, default_value_t = 5000)]
    steps: u32,
}

type Manager = FloorManager<TemplateLibrary, MemoryStore, RecordingSink>;

fn pick(rng: &mut ChaCha8Rng, bound: u64) -> u64 {
    rng.next_u64() % bound
}

fn check(manager: &Manager, step: u32, previous_unlocks: &[u8]) -> Result<()> {
    let depth = manager.current_depth().get();
    if depth > 120 {
        bail!("step {step}: depth {depth} out of range");
    }
    if manager.visuals().live_count() != manager.obstacles().len() {
        bail!(
            "step {step}: {} live visuals but {} obstacles",
            manager.visuals().live_count(),
            manager.obstacles().len()
        );
    }

    let stairs = manager.stairs();
    let mut stair_tiles: HashSet<TilePos> = stairs.extras().iter().map(|m| m.tile).collect();
    stair_tiles.insert(stairs.main().tile);
    for (_, node) in manager.obstacles().iter() {
        if stair_tiles.contains(&node.tile) {
            bail!("step {step}: depth {depth} has a node on stairs at {:?}", node.tile);
        }
        if node.hit_points <= 0 {
            bail!("step {step}: destroyed node left in the field");
        }
    }

    let unlocks = manager.unlocked_depths();
    if let Some(lost) = previous_unlocks.iter().find(|&&depth| !unlocks.contains(&depth)) {
        bail!("step {step}: elevator {lost} was lost");
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Starting floor soak on seed {} for {} steps...", args.seed, args.steps);
    let mut manager = FloorManager::new(
        MineConfig::seeded(args.seed),
        TemplateLibrary::default(),
        MemoryStore::new(),
        RecordingSink::new(),
    );
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut unlocks = Vec::new();
    let mut destroyed = 0_u32;
    let mut transitions = 0_u32;

    for step in 0..args.steps {
        match pick(&mut rng, 10) {
            0..=2 => {
                manager.descend_by(pick(&mut rng, 3) as i32 + 1);
                transitions += 1;
            }
            3 => {
                manager.go_to_depth(pick(&mut rng, 130) as i32);
                transitions += 1;
            }
            4 => {
                manager.load_entrance();
                transitions += 1;
            }
            5..=7 => {
                // Bias toward mining so stairs get uncovered
                let target = manager.obstacles().iter().map(|(_, node)| node.position).next();
                if let Some(pos) = target
                    && manager.strike(pos, pick(&mut rng, 3) as i32 + 1).destroyed
                {
                    destroyed += 1;
                }
            }
            8 => {
                let here = manager.spawn_point();
                let offset =
                    Vec2::new(pick(&mut rng, 48) as f32 - 24.0, pick(&mut rng, 48) as f32 - 24.0);
                let proposed = here + offset;
                let resolved = manager.resolve_move(here, proposed, 5.0);
                let x_step = Vec2::new(resolved.x, here.y);
                let y_step = Vec2::new(here.x, resolved.y);
                if resolved.x != here.x && manager.collides(x_step, 5.0, false) {
                    bail!("step {step}: slid along x into a collider at {x_step:?}");
                }
                if resolved.y != here.y && manager.collides(y_step, 5.0, false) {
                    bail!("step {step}: slid along y into a collider at {y_step:?}");
                }
            }
            _ => {
                let save = manager.snapshot(true);
                let before = manager.layout_fingerprint();
                manager.restore(&save);
                if manager.layout_fingerprint() != before {
                    let depth = save.current_depth.get();
                    bail!("step {step}: restore changed the layout at depth {depth}");
                }
            }
        }
        check(&manager, step, &unlocks)?;
        unlocks = manager.unlocked_depths();
    }

    println!(
        "Soak complete: {transitions} transitions, {destroyed} destroyed, depth {}, unlocks {:?}",
        manager.current_depth().get(),
        unlocks
    );
    Ok(())
}
