//! All game entity types. Pure data, no logic.

use std::time::{Duration, Instant};

// ── Fixed dimensions ──────────────────────────────────────────────────────────

/// Capacity of the ammunition depot.
pub const MAX_DEPOT_AMMO: u32 = 10;

/// Alive enemies at which the field is considered overrun.
pub const POPULATION_CAP: usize = 5;

pub const HELICOPTER_WIDTH: i32 = 9;
pub const HELICOPTER_HEIGHT: i32 = 2;
pub const DEPOT_WIDTH: i32 = 15;
pub const DEPOT_HEIGHT: i32 = 6;
pub const ENEMY_WIDTH: i32 = 20;
pub const ENEMY_HEIGHT: i32 = 6;
pub const TRUCK_WIDTH: i32 = 30;

// ── Session parameters ────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Level {
    Easy,
    Medium,
    Hard,
}

/// The three knobs a difficulty level turns. Immutable once a session starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Difficulty {
    /// Head hits needed to kill one enemy (`m`).
    pub lethality: u32,
    /// Helicopter ammo capacity (`n`).
    pub heli_capacity: u32,
    /// Time between spawn attempts (`t`).
    pub spawn_interval: Duration,
}

/// Tick lengths of every timed activity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timings {
    pub projectile_tick: Duration,
    pub enemy_tick: Duration,
    pub truck_interval: Duration,
    pub truck_step: Duration,
    pub unload: Duration,
    pub reload: Duration,
    /// Upper bound on how long the control loop waits for one command.
    pub frame: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Timings {
            projectile_tick: Duration::from_millis(20),
            enemy_tick: Duration::from_millis(100),
            truck_interval: Duration::from_secs(15),
            truck_step: Duration::from_millis(50),
            unload: Duration::from_secs(2),
            reload: Duration::from_secs(1),
            frame: Duration::from_millis(33), // ≈30 FPS
        }
    }
}

/// Playfield dimensions and where the depot sits in it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    pub width: i32,
    pub height: i32,
    pub depot_x: i32,
    pub depot_y: i32,
}

impl Field {
    pub fn new(width: i32, height: i32) -> Self {
        Field {
            width,
            height,
            depot_x: width - 20,
            depot_y: height - 15,
        }
    }

    /// Row the supply truck drives along.
    pub fn road_y(&self) -> i32 {
        self.height - 10
    }
}

impl Default for Field {
    fn default() -> Self {
        Field::new(100, 40)
    }
}

// ── Operator input ────────────────────────────────────────────────────────────

/// One discrete command per control-loop iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Fire,
    Quit,
    None,
}

// ── Actors ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enemy {
    pub x: i32,
    pub y: i32,
    /// Never flips back to `true` once cleared.
    pub alive: bool,
    pub moving_right: bool,
    /// Monotonic.
    pub headshot_hits: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Projectile {
    /// Identifies the world entry owned by this projectile's flight task.
    pub id: u64,
    pub x: i32,
    pub y: i32,
    pub active: bool,
    pub moving_right: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReloadState {
    Normal,
    Reloading { started: Instant },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Helicopter {
    pub x: i32,
    pub y: i32,
    /// Always within `0..=max_ammo`.
    pub ammo: u32,
    pub max_ammo: u32,
    pub moving_right: bool,
    pub reload: ReloadState,
}

impl Helicopter {
    pub fn is_reloading(&self) -> bool {
        matches!(self.reload, ReloadState::Reloading { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Truck {
    pub x: i32,
    pub y: i32,
    pub moving_right: bool,
}

// ── Operator notices ──────────────────────────────────────────────────────────

/// The one-line status message shown under the ammo counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    Reloading,
    WaitingToReload,
    ReloadComplete,
    ReloadCancelled,
    OutOfAmmo,
    TruckArrived,
    DepotRestocked,
}

// ── Master world state ────────────────────────────────────────────────────────

/// Everything the tasks share. Lives behind the session's general lock.
#[derive(Clone, Debug)]
pub struct World {
    pub field: Field,
    pub helicopter: Helicopter,
    /// May hold dead entries until the next animation tick compacts them.
    pub enemies: Vec<Enemy>,
    /// In-flight projectiles, as last published by their flight tasks.
    pub projectiles: Vec<Projectile>,
    /// Present only while the truck is on screen.
    pub truck: Option<Truck>,
    pub notice: Option<Notice>,
    pub kills: u32,
    /// Terminal: set once, never cleared.
    pub game_over: bool,
}
