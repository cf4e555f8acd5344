//! One play session: the shared world, the depot, and the tasks touching them.
//!
//! Lock order is world, then depot. Code holding the depot lock never takes
//! the world lock, which is why the truck's cancellation check only reads
//! the atomic running flag.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{error, info, warn};
use parking_lot::{Mutex, MutexGuard};

use crate::compute;
use crate::depot::Depot;
use crate::entities::{
    Command, Difficulty, Field, Notice, Projectile, ReloadState, Timings, World,
    MAX_DEPOT_AMMO,
};
use crate::reload::{self, ReloadEvent};
use crate::tasks;

/// Longest uninterrupted sleep inside [`Session::pause`].
const PAUSE_SLICE: Duration = Duration::from_millis(10);

pub struct Session {
    world: Mutex<World>,
    depot: Depot,
    running: AtomicBool,
    difficulty: Difficulty,
    timings: Timings,
    flights: Mutex<Vec<JoinHandle<()>>>,
    next_projectile: AtomicU64,
}

impl Session {
    /// A fresh session with a full depot.
    pub fn new(field: Field, difficulty: Difficulty, timings: Timings) -> Arc<Self> {
        Session::with_depot(field, difficulty, timings, Depot::new(MAX_DEPOT_AMMO, MAX_DEPOT_AMMO))
    }

    pub fn with_depot(
        field: Field,
        difficulty: Difficulty,
        timings: Timings,
        depot: Depot,
    ) -> Arc<Self> {
        Arc::new(Session {
            world: Mutex::new(compute::init_world(field, &difficulty)),
            depot,
            running: AtomicBool::new(true),
            difficulty,
            timings,
            flights: Mutex::new(Vec::new()),
            next_projectile: AtomicU64::new(0),
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    /// Take the general lock.
    pub fn lock(&self) -> MutexGuard<'_, World> {
        self.world.lock()
    }

    pub fn depot(&self) -> &Depot {
        &self.depot
    }

    pub fn difficulty(&self) -> &Difficulty {
        &self.difficulty
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn is_game_over(&self) -> bool {
        self.world.lock().game_over
    }

    /// Neither quit nor lost.
    pub fn is_live(&self) -> bool {
        self.is_running() && !self.is_game_over()
    }

    /// Ask every task to wind down. Does not wait for them.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Sleep for `duration`, waking early when the session ends.
    /// Returns `false` if it ended.
    pub fn pause(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if !self.is_live() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep((deadline - now).min(PAUSE_SLICE));
        }
    }

    // ── Control loop ──────────────────────────────────────────────────────────

    /// Apply one operator command.
    pub fn apply(self: &Arc<Self>, command: Command) {
        match command {
            Command::Quit => {
                info!("quit requested");
                self.stop();
            }
            Command::Fire => self.fire(),
            Command::None => {}
            movement => {
                let mut world = self.lock();
                let field = world.field;
                compute::move_helicopter(&mut world.helicopter, movement, &field);
            }
        }
    }

    fn fire(self: &Arc<Self>) {
        let id = self.next_projectile.fetch_add(1, Ordering::Relaxed);
        let shot = {
            let mut world = self.lock();
            let shot = compute::fire(&mut world.helicopter, id);
            if shot.is_none() {
                world.notice = Some(Notice::OutOfAmmo);
            }
            shot
        };
        if let Some(projectile) = shot {
            self.launch(projectile);
        }
    }

    /// Publish a projectile into the world and start its flight task.
    pub fn launch(self: &Arc<Self>, projectile: Projectile) {
        let id = projectile.id;
        self.lock().projectiles.push(projectile.clone());

        let session = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name(format!("projectile-{id}"))
            .spawn(move || tasks::run_projectile(&session, projectile));

        match spawned {
            Ok(handle) => {
                let mut flights = self.flights.lock();
                flights.retain(|h| !h.is_finished());
                flights.push(handle);
            }
            Err(e) => {
                error!("could not start projectile {id}: {e}");
                self.lock().projectiles.retain(|p| p.id != id);
            }
        }
    }

    /// Re-evaluate the reload state machine against the current position.
    pub fn control_tick(&self, now: Instant) -> ReloadEvent {
        let mut world = self.lock();
        let docked = compute::is_at_depot(&world.helicopter, &world.field);
        let event = reload::advance(
            &mut world.helicopter,
            docked,
            now,
            self.timings.reload,
            &self.depot,
        );
        if let Some(notice) = event.notice() {
            world.notice = Some(notice);
        }
        event
    }

    // ── Teardown ──────────────────────────────────────────────────────────────

    /// Wait for every projectile launched so far to finish its flight.
    pub fn join_flights(&self) {
        let handles: Vec<_> = self.flights.lock().drain(..).collect();
        for handle in handles {
            if handle.join().is_err() {
                warn!("a projectile task panicked");
            }
        }
    }

    /// Stop the session and wait for `background` plus all projectile tasks.
    pub fn shutdown(&self, background: Vec<JoinHandle<()>>) {
        self.stop();
        {
            let mut world = self.lock();
            if world.helicopter.is_reloading() {
                self.depot.cancel_reload();
                world.helicopter.reload = ReloadState::Normal;
            }
        }
        for handle in background {
            let name = handle.thread().name().unwrap_or("task").to_string();
            if handle.join().is_err() {
                warn!("{name} panicked");
            }
        }
        self.join_flights();
        info!("session shut down");
    }
}
