//! Pure game-logic functions.
//!
//! Nothing in here locks, sleeps or draws. Callers hold the general lock
//! and pass the pieces of the world they are mutating; the only side effect
//! beyond that is the injected RNG.

use rand::Rng;

use crate::entities::{
    Command, Difficulty, Enemy, Field, Helicopter, Projectile, ReloadState, World,
    DEPOT_HEIGHT, DEPOT_WIDTH, ENEMY_HEIGHT, ENEMY_WIDTH, HELICOPTER_HEIGHT,
    HELICOPTER_WIDTH, POPULATION_CAP,
};

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Axis-aligned footprint in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    /// Closed-interval overlap: rectangles that merely share an edge count.
    pub fn touches(&self, other: &Rect) -> bool {
        self.x + self.w >= other.x
            && self.x <= other.x + other.w
            && self.y + self.h >= other.y
            && self.y <= other.y + other.h
    }

    /// Open-interval overlap: at least one cell in common.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

pub fn helicopter_rect(heli: &Helicopter) -> Rect {
    Rect { x: heli.x, y: heli.y, w: HELICOPTER_WIDTH, h: HELICOPTER_HEIGHT }
}

pub fn depot_rect(field: &Field) -> Rect {
    Rect { x: field.depot_x, y: field.depot_y, w: DEPOT_WIDTH, h: DEPOT_HEIGHT }
}

pub fn enemy_rect(enemy: &Enemy) -> Rect {
    Rect { x: enemy.x, y: enemy.y, w: ENEMY_WIDTH, h: ENEMY_HEIGHT }
}

/// Docking test used by the reload state machine.
pub fn is_at_depot(heli: &Helicopter, field: &Field) -> bool {
    helicopter_rect(heli).touches(&depot_rect(field))
}

pub fn collides_with_helicopter(enemy: &Enemy, heli: &Helicopter) -> bool {
    enemy.alive && enemy_rect(enemy).intersects(&helicopter_rect(heli))
}

// ── Projectile vs enemy ───────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strike {
    /// Counts towards the lethality threshold.
    Head,
    /// Stops the projectile, leaves the enemy untouched.
    Body,
}

/// The head is a single cell at a fixed offset from the sprite origin;
/// only the facing moves it.
pub fn head_point(enemy: &Enemy) -> (i32, i32) {
    let dx = if enemy.moving_right { 14 } else { 5 };
    (enemy.x + dx, enemy.y + 1)
}

/// Classify the overlap of a projectile with one enemy. Head wins over body.
pub fn strike(projectile: &Projectile, enemy: &Enemy) -> Option<Strike> {
    if !enemy.alive {
        return None;
    }
    if (projectile.x, projectile.y) == head_point(enemy) {
        return Some(Strike::Head);
    }
    let in_body = projectile.x >= enemy.x
        && projectile.x < enemy.x + ENEMY_WIDTH
        && projectile.y >= enemy.y + 2
        && projectile.y < enemy.y + ENEMY_HEIGHT;
    in_body.then_some(Strike::Body)
}

/// Credit one head hit. Returns `true` when this hit was the lethal one.
pub fn apply_head_hit(enemy: &mut Enemy, lethality: u32) -> bool {
    if !enemy.alive {
        return false;
    }
    enemy.headshot_hits += 1;
    if enemy.headshot_hits >= lethality {
        enemy.alive = false;
        return true;
    }
    false
}

/// What one flight tick did to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flight {
    Flying,
    Hit { enemy: usize, strike: Strike, killed: bool },
    OutOfBounds,
}

/// Advance a projectile by one cell and resolve at most one collision.
///
/// Enemies are scanned in order and the first overlap wins. A projectile
/// that scores any hit, or leaves the field, is deactivated.
pub fn advance_projectile(
    projectile: &mut Projectile,
    enemies: &mut [Enemy],
    lethality: u32,
    field: &Field,
) -> Flight {
    projectile.x += if projectile.moving_right { 1 } else { -1 };

    for (i, enemy) in enemies.iter_mut().enumerate() {
        if let Some(kind) = strike(projectile, enemy) {
            projectile.active = false;
            let killed = kind == Strike::Head && apply_head_hit(enemy, lethality);
            return Flight::Hit { enemy: i, strike: kind, killed };
        }
    }

    if projectile.x < 0 || projectile.x >= field.width {
        projectile.active = false;
        return Flight::OutOfBounds;
    }
    Flight::Flying
}

// ── Enemy motion & termination ────────────────────────────────────────────────

/// One cell in the current direction, reversing at either edge.
pub fn step_enemy(enemy: &mut Enemy, field: &Field) {
    if enemy.moving_right {
        enemy.x += 1;
        if enemy.x > field.width - ENEMY_WIDTH {
            enemy.moving_right = false;
        }
    } else {
        enemy.x -= 1;
        if enemy.x < 0 {
            enemy.moving_right = true;
        }
    }
}

pub fn alive_count(enemies: &[Enemy]) -> usize {
    enemies.iter().filter(|e| e.alive).count()
}

pub fn is_overrun(enemies: &[Enemy]) -> bool {
    alive_count(enemies) >= POPULATION_CAP
}

/// One animation tick over the whole population.
///
/// Moves every alive enemy, drops the dead ones, and latches `game_over`
/// if any enemy touches the helicopter or the field is overrun. Returns the
/// (possibly unchanged) game-over flag.
pub fn animate_enemies(world: &mut World) -> bool {
    let field = world.field;
    world.enemies.retain(|e| e.alive);

    for enemy in world.enemies.iter_mut() {
        step_enemy(enemy, &field);
        if collides_with_helicopter(enemy, &world.helicopter) {
            world.game_over = true;
        }
    }

    if is_overrun(&world.enemies) {
        world.game_over = true;
    }
    world.game_over
}

/// Check-then-act spawn: adds one enemy at the left edge unless the
/// population cap is reached. Returns whether an enemy was created.
pub fn spawn_enemy(world: &mut World, rng: &mut impl Rng) -> bool {
    if alive_count(&world.enemies) >= POPULATION_CAP {
        return false;
    }
    let y = world.field.height - 8 - rng.gen_range(0..5);
    world.enemies.push(Enemy {
        x: 0,
        y,
        alive: true,
        moving_right: true,
        headshot_hits: 0,
    });
    true
}

// ── Helicopter ────────────────────────────────────────────────────────────────

/// Apply a movement command, clamped to the field. Other commands are ignored.
pub fn move_helicopter(heli: &mut Helicopter, command: Command, field: &Field) {
    match command {
        Command::MoveUp if heli.y > 0 => heli.y -= 1,
        Command::MoveDown if heli.y < field.height - HELICOPTER_HEIGHT => heli.y += 1,
        Command::MoveLeft if heli.x > 0 => {
            heli.x -= 1;
            heli.moving_right = false;
        }
        Command::MoveRight if heli.x < field.width - HELICOPTER_WIDTH => {
            heli.x += 1;
            heli.moving_right = true;
        }
        _ => {}
    }
}

/// Spend one round and build the projectile it launches from the nose.
pub fn fire(heli: &mut Helicopter, id: u64) -> Option<Projectile> {
    if heli.ammo == 0 {
        return None;
    }
    heli.ammo -= 1;
    let x = if heli.moving_right { heli.x + HELICOPTER_WIDTH } else { heli.x - 1 };
    Some(Projectile {
        id,
        x,
        y: heli.y,
        active: true,
        moving_right: heli.moving_right,
    })
}

// ── Constructors ──────────────────────────────────────────────────────────────

/// Build the initial world: armed helicopter, no enemies, no truck.
pub fn init_world(field: Field, difficulty: &Difficulty) -> World {
    World {
        field,
        helicopter: Helicopter {
            x: 40,
            y: 20,
            ammo: difficulty.heli_capacity,
            max_ammo: difficulty.heli_capacity,
            moving_right: true,
            reload: ReloadState::Normal,
        },
        enemies: Vec::new(),
        projectiles: Vec::new(),
        truck: None,
        notice: None,
        kills: 0,
        game_over: false,
    }
}
