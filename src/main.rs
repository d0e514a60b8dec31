//! Headless demo driving the full AI core
//!
//! Generates a level from a config (RON path as the first argument, or the
//! built-in default), spawns a horde, and runs a fixed-step simulation of a
//! scripted target walking the map while the agents chase it.

use std::env;

use horde::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn main() {
    env_logger::init();

    let config = match env::args().nth(1) {
        Some(path) => match LevelConfig::load_ron(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("could not load {path}: {e}; falling back to the default level");
                LevelConfig::default()
            }
        },
        None => LevelConfig::default(),
    };

    let map = config.build_map().expect("level generation failed");
    println!("{}", map.ascii());

    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(1));
    let mut horde = Horde::new(config.steering.clone(), config.behavior.clone());
    for _ in 0..config.agents {
        horde.spawn_at_random_ground(&map, &mut rng);
    }
    log::info!("spawned {} agents", horde.len());

    // scripted target: shuttle between the first and last ground tiles,
    // swinging at anything nearby for the second half of each leg
    let ground: Vec<usize> = map
        .graph()
        .nodes()
        .iter()
        .filter(|n| n.is_traversable())
        .map(|n| n.id)
        .collect();
    let (home, away) = (
        map.localize(ground[0]),
        map.localize(*ground.last().expect("level has no ground")),
    );

    let dt = 1.0 / 60.0;
    let leg_ticks = 300;
    let mut damage_taken = 0.0;

    for tick in 0..4 * leg_ticks {
        let leg = tick / leg_ticks;
        let t = (tick % leg_ticks) as f32 / leg_ticks as f32;
        let (from, to) = if leg % 2 == 0 { (home, away) } else { (away, home) };
        let target = TargetState {
            position: from.lerp(to, t),
            attacking: t > 0.5,
        };

        for event in horde.tick(&map, &target, dt) {
            match event {
                HordeEvent::DamageTarget { amount, .. } => damage_taken += amount,
                HordeEvent::AgentDied { agent } => log::info!("agent {agent:?} died"),
                HordeEvent::AgentRemoved { agent } => log::info!("agent {agent:?} removed"),
                HordeEvent::PathCleared { .. } => {}
            }
        }

        if tick % 120 == 0 {
            log::info!(
                "t={:.1}s agents={} target damage so far: {damage_taken}",
                tick as f32 * dt,
                horde.len()
            );
        }
    }

    println!(
        "simulation finished: {} agents alive, {damage_taken} damage dealt to the target",
        horde.len()
    );
}
