//! The independently-timed activities of a session.
//!
//! Each loop re-checks the session between lock-protected steps and exits by
//! falling out; nothing is ever killed from outside.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::compute::{self, Flight, Strike};
use crate::entities::{Notice, Projectile, Truck, World, MAX_DEPOT_AMMO, TRUCK_WIDTH};
use crate::session::Session;

/// Start enemy animation, enemy spawning and the supply truck.
pub fn spawn_background(session: &Arc<Session>) -> io::Result<Vec<JoinHandle<()>>> {
    let animation = {
        let session = Arc::clone(session);
        thread::Builder::new()
            .name("enemy-animation".into())
            .spawn(move || run_enemy_animation(&session))?
    };
    let spawner = {
        let session = Arc::clone(session);
        thread::Builder::new()
            .name("enemy-spawner".into())
            .spawn(move || run_enemy_spawner(&session, StdRng::from_entropy()))?
    };
    let truck = {
        let session = Arc::clone(session);
        thread::Builder::new()
            .name("supply-truck".into())
            .spawn(move || run_supply_truck(&session))?
    };
    Ok(vec![animation, spawner, truck])
}

// ── Enemies ───────────────────────────────────────────────────────────────────

pub fn run_enemy_animation(session: &Session) {
    let tick = session.timings().enemy_tick;
    loop {
        {
            let mut world = session.lock();
            if world.game_over {
                break;
            }
            if compute::animate_enemies(&mut world) {
                info!(
                    "game over: {} enemies alive, helicopter at ({}, {})",
                    compute::alive_count(&world.enemies),
                    world.helicopter.x,
                    world.helicopter.y
                );
                break;
            }
        }
        if !session.pause(tick) {
            break;
        }
    }
}

pub fn run_enemy_spawner<R: Rng>(session: &Session, mut rng: R) {
    let interval = session.difficulty().spawn_interval;
    while session.pause(interval) {
        let mut world = session.lock();
        if world.game_over {
            break;
        }
        if compute::spawn_enemy(&mut world, &mut rng) {
            info!(
                "enemy spawned, {} alive",
                compute::alive_count(&world.enemies)
            );
        }
    }
}

// ── Projectiles ───────────────────────────────────────────────────────────────

/// Fly one projectile until it hits something, leaves the field, or the
/// session ends. Works on a private copy and republishes it every tick.
pub fn run_projectile(session: &Session, mut projectile: Projectile) {
    let lethality = session.difficulty().lethality;
    let tick = session.timings().projectile_tick;

    while projectile.active && session.is_live() {
        {
            let mut world = session.lock();
            let World { field, enemies, projectiles, kills, .. } = &mut *world;

            match compute::advance_projectile(&mut projectile, enemies, lethality, field) {
                Flight::Hit { enemy, strike: Strike::Head, killed } => {
                    if killed {
                        *kills += 1;
                        info!("projectile {} killed enemy {enemy}", projectile.id);
                    } else {
                        debug!("projectile {} head hit on enemy {enemy}", projectile.id);
                    }
                }
                Flight::Hit { enemy, strike: Strike::Body, .. } => {
                    debug!("projectile {} absorbed by enemy {enemy}", projectile.id);
                }
                Flight::OutOfBounds | Flight::Flying => {}
            }

            if let Some(entry) = projectiles.iter_mut().find(|p| p.id == projectile.id) {
                *entry = projectile.clone();
            }
        }
        if !projectile.active {
            break;
        }
        thread::sleep(tick);
    }

    session.lock().projectiles.retain(|p| p.id != projectile.id);
}

// ── Supply truck ──────────────────────────────────────────────────────────────

/// Drive on, unload into the depot, drive off, repeat.
pub fn run_supply_truck(session: &Session) {
    let timings = *session.timings();
    let field = session.lock().field;

    while session.pause(timings.truck_interval) {
        let mut truck = Truck {
            x: -TRUCK_WIDTH,
            y: field.road_y(),
            moving_right: true,
        };

        if !drive(session, &mut truck, field.depot_x - 5) {
            break;
        }

        session.lock().notice = Some(Notice::TruckArrived);
        info!("truck at depot, {} rounds stocked", session.depot().ammo());

        let delivered = session
            .depot()
            .deposit(MAX_DEPOT_AMMO, timings.unload, || session.is_running());
        match delivered {
            Some(added) => {
                session.lock().notice = Some(Notice::DepotRestocked);
                info!("truck delivered {added} rounds");
            }
            None => break,
        }

        if !drive(session, &mut truck, field.width + TRUCK_WIDTH) {
            break;
        }
        session.lock().truck = None;
    }

    session.lock().truck = None;
}

/// Advance the truck one cell per step until it reaches `target_x`.
fn drive(session: &Session, truck: &mut Truck, target_x: i32) -> bool {
    let step = session.timings().truck_step;
    while truck.x < target_x {
        truck.x += 1;
        session.lock().truck = Some(*truck);
        if !session.pause(step) {
            return false;
        }
    }
    true
}
