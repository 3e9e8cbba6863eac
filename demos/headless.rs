//! Runs the simulation without a renderer and logs per-frame timing.
//!
//! Usage: `RUST_LOG=debug cargo run --release --example headless [config.json] [frames]`

use std::time::Instant;

use sphere_sweep::*;

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => SimulationConfig::from_json_file(path)?,
        None => SimulationConfig::default(),
    };
    let frames: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(600);

    let mut world = SimulationWorld::new(config)?;
    let mut last = Instant::now();
    let mut contacts = 0;

    for _ in 0..frames {
        let now = Instant::now();
        let frame_time = now.duration_since(last).as_secs_f32() * 60.0;
        last = now;

        match world.step(frame_time) {
            Ok(stats) => contacts += stats.contacts,
            Err(SimError::FrameOverrun { pending, .. }) => {
                log::warn!("Frame {} overran with {pending} worker(s) pending", world.frame());
            }
            Err(err) => return Err(err),
        }
    }

    log::info!(
        "Ran {} frames on {} thread(s): {contacts} contacts",
        world.frame(),
        world.thread_count()
    );
    world.shutdown();
    Ok(())
}
