use std::collections::HashMap;

use approx::assert_relative_eq;
use sphere_sweep::*;

fn config(workers: usize) -> SimulationConfig {
    SimulationConfig::builder()
        .arena(Rect::square(5000.0))
        .worker_count(workers)
        .build()
}

fn moving_by_id(world: &SimulationWorld) -> HashMap<BodyId, Body> {
    world.moving().iter().map(|b| (b.id(), *b)).collect()
}

#[test]
fn mover_bounces_off_obstacle() {
    let mut world = SimulationWorld::from_bodies(
        config(1),
        vec![Body::stationary(0, Vec2::new(15.0, 0.0), 10.0)],
        vec![Body::moving(1, Vec2::ZERO, Vec2::new(10.0, 0.0), 10.0)],
    )
    .expect("world should build");

    let stats = world.step(1.0).expect("frame should complete");
    let body = world.moving()[0];

    assert_eq!(stats.contacts, 1);
    assert!(body.position.x < 10.0, "x = {}", body.position.x);
    assert!(body.position.distance(Vec2::new(15.0, 0.0)) >= 20.0);
    assert_relative_eq!(body.velocity.x, -10.0, epsilon = 1e-4);
    assert_relative_eq!(body.velocity.y, 0.0, epsilon = 1e-4);
}

#[test]
fn mover_clamps_at_right_wall() {
    let mut world = SimulationWorld::from_bodies(
        config(2),
        Vec::new(),
        vec![Body::moving(0, Vec2::new(4999.0, 0.0), Vec2::new(10.0, 0.0), 10.0)],
    )
    .unwrap();

    let stats = world.step(1.0).unwrap();
    let body = world.moving()[0];

    assert_eq!(stats.wall_hits, 1);
    assert_eq!(body.position.x, 5000.0);
    assert_eq!(body.velocity.x, -10.0);
}

#[test]
fn initialize_populates_requested_counts() {
    let world = initialize(
        300,
        500,
        Rect::square(2000.0),
        Rect::square(5.0),
        3,
    )
    .unwrap();

    assert_eq!(world.stationary().len(), 300);
    assert_eq!(world.moving().len(), 500);
    assert_eq!(world.positions().count(), 800);
    assert_eq!(world.thread_count(), 3);
    assert!(world
        .stationary()
        .as_slice()
        .windows(2)
        .all(|w| w[0].position.x <= w[1].position.x));
}

#[test]
fn initialize_rejects_bad_configuration() {
    assert!(matches!(
        initialize(1, 1, Rect::square(10.0), Rect::square(1.0), 0),
        Err(SimError::InvalidWorkerCount(0))
    ));
    assert!(matches!(
        initialize(1, 1, Rect::new(Bounds::new(0.0, 0.0), Bounds::symmetric(1.0)), Rect::square(1.0), 2),
        Err(SimError::DegenerateBounds { .. })
    ));
}

#[test]
fn movers_stay_inside_arena() {
    let config = SimulationConfig::builder()
        .stationary_count(200)
        .moving_count(2000)
        .arena(Rect::square(400.0))
        .velocity(Rect::square(50.0))
        .worker_count(4)
        .seed(42)
        .build();
    let mut world = SimulationWorld::new(config).unwrap();

    for _ in 0..60 {
        world.step(1.0).unwrap();
        for body in world.moving() {
            assert!(world.arena().contains(body.position), "{body:?} escaped");
        }
    }
}

#[test]
fn speed_is_preserved_across_frames() {
    let config = SimulationConfig::builder()
        .stationary_count(400)
        .moving_count(400)
        .arena(Rect::square(300.0))
        .worker_count(3)
        .seed(7)
        .build();
    let mut world = SimulationWorld::new(config).unwrap();
    let initial = moving_by_id(&world);

    let mut contacts = 0;
    for _ in 0..30 {
        contacts += world.step(0.5).unwrap().contacts;
    }
    assert!(contacts > 0, "scene should produce collisions");

    for body in world.moving() {
        let before = initial[&body.id()];
        assert_relative_eq!(body.speed(), before.speed(), epsilon = 1e-2, max_relative = 1e-3);
    }
}

#[test]
fn no_mover_rests_inside_an_isolated_obstacle() {
    // Obstacles far enough apart that one push-out can never land in another.
    let obstacles: Vec<Body> = (0..5)
        .flat_map(|i| (0..5).map(move |j| (i, j)))
        .map(|(i, j)| {
            Body::stationary(i * 5 + j, Vec2::new(i as f32 * 300.0 - 600.0, j as f32 * 300.0 - 600.0), 10.0)
        })
        .collect();
    let movers: Vec<Body> = (0..400)
        .map(|k| {
            let angle = k as f32 * 0.37;
            let position = Vec2::new((k % 20) as f32 * 60.0 - 570.0, (k / 20) as f32 * 60.0 - 570.0);
            Body::moving(100 + k, position, Vec2::from_angle(angle) * 8.0, 10.0)
        })
        .collect();
    let mut world = SimulationWorld::from_bodies(
        SimulationConfig::builder().arena(Rect::square(5000.0)).worker_count(4).build(),
        obstacles,
        movers,
    )
    .unwrap();

    for _ in 0..100 {
        world.step(1.0).unwrap();
        for mover in world.moving() {
            for obstacle in world.stationary().as_slice() {
                assert!(
                    mover.position.distance(obstacle.position) >= obstacle.combined_radius(mover),
                    "mover {} still inside obstacle {}",
                    mover.id(),
                    obstacle.id()
                );
            }
        }
    }
}

#[test]
fn empty_world_steps() {
    let mut world = SimulationWorld::from_bodies(config(4), Vec::new(), Vec::new()).unwrap();
    let stats = world.step(1.0).unwrap();
    assert_eq!(stats.moving_count, 0);
    assert_eq!(stats.contacts, 0);
}
