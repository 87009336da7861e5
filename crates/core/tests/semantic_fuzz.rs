use std::collections::HashSet;

use minefloor_core::{
    FloorManager, MemoryStore, MineConfig, RecordingSink, TemplateLibrary, TilePos, Vec2,
};
use proptest::{
    arbitrary::any,
    test_runner::{Config as ProptestConfig, TestCaseError, TestRunner},
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

type Manager = FloorManager<TemplateLibrary, MemoryStore, RecordingSink>;

fn pick(rng: &mut ChaCha8Rng, bound: u64) -> u64 {
    rng.next_u64() % bound
}

fn check_invariants(manager: &Manager, previous_unlocks: &[u8]) -> Result<(), String> {
    let depth = manager.current_depth().get();
    if depth > 120 {
        return Err(format!("depth {depth} escaped the mine"));
    }

    let live = manager.visuals().live_count();
    if live != manager.obstacles().len() {
        return Err(format!("{live} live visuals for {} obstacles", manager.obstacles().len()));
    }

    let stairs = manager.stairs();
    let extra_tiles: HashSet<TilePos> = stairs.extras().iter().map(|m| m.tile).collect();
    for (_, node) in manager.obstacles().iter() {
        if node.tile == stairs.main().tile {
            return Err(format!("depth {depth}: node on main stairs"));
        }
        if extra_tiles.contains(&node.tile) {
            return Err(format!("depth {depth}: node on extra stair {:?}", node.tile));
        }
        if node.hit_points <= 0 {
            return Err(format!("depth {depth}: destroyed node still listed"));
        }
    }

    let unlocks = manager.unlocked_depths();
    if unlocks.iter().any(|depth| depth % 5 != 0) {
        return Err(format!("non-elevator unlock in {unlocks:?}"));
    }
    if previous_unlocks.iter().any(|depth| !unlocks.contains(depth)) {
        return Err(format!("unlocks shrank from {previous_unlocks:?} to {unlocks:?}"));
    }
    Ok(())
}

fn run_fuzz_session(map_seed: u64, action_seed: u64, steps: u32) -> Result<(), String> {
    let mut manager = FloorManager::new(
        MineConfig::seeded(map_seed),
        TemplateLibrary::default(),
        MemoryStore::new(),
        RecordingSink::new(),
    );
    let mut rng = ChaCha8Rng::seed_from_u64(action_seed);
    let mut unlocks = Vec::new();

    for _ in 0..steps {
        match pick(&mut rng, 6) {
            0 => manager.descend_by(pick(&mut rng, 7) as i32 - 1),
            1 => manager.go_to_depth(pick(&mut rng, 160) as i32 - 20),
            2 => manager.load_entrance(),
            3 => {
                let target = manager.obstacles().iter().map(|(_, node)| node.position).next();
                if let Some(pos) = target {
                    manager.strike(pos, pick(&mut rng, 4) as i32);
                }
            }
            4 => {
                let here = manager.spawn_point();
                let proposed = Vec2::new(
                    here.x + pick(&mut rng, 64) as f32 - 32.0,
                    here.y + pick(&mut rng, 64) as f32 - 32.0,
                );
                let resolved = manager.resolve_move(here, proposed, 4.0);
                let x_step = Vec2::new(resolved.x, here.y);
                let y_step = Vec2::new(here.x, resolved.y);
                if resolved.x != here.x && manager.collides(x_step, 4.0, false) {
                    return Err(format!("slid along x into a collider at {x_step:?}"));
                }
                if resolved.y != here.y && manager.collides(y_step, 4.0, false) {
                    return Err(format!("slid along y into a collider at {y_step:?}"));
                }
            }
            _ => {
                let save = manager.snapshot(pick(&mut rng, 2) == 0);
                manager.restore(&save);
            }
        }
        check_invariants(&manager, &unlocks)?;
        unlocks = manager.unlocked_depths();
    }
    Ok(())
}

#[test]
fn test_fuzz_floor_sessions() {
    let mut runner = TestRunner::new(ProptestConfig::with_cases(24));
    let seeds = (any::<u64>(), any::<u64>());

    runner
        .run(&seeds, |(map_seed, action_seed)| {
            run_fuzz_session(map_seed, action_seed, 200).map_err(TestCaseError::fail)?;
            Ok(())
        })
        .expect("floor fuzz sessions should preserve invariants");
}
