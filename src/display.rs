//! Rendering layer. All terminal I/O lives here.
//!
//! Each function receives a mutable writer and an immutable view of the
//! world. The caller holds the general lock while rendering, so no entity
//! is ever drawn half-updated. No game logic is performed here.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use dino_strike::depot::DepotStatus;
use dino_strike::entities::{
    Difficulty, Enemy, Field, Helicopter, Level, Notice, Projectile, Truck, World,
};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_HUD_AMMO: Color = Color::Yellow;
const C_HUD_DEPOT: Color = Color::Cyan;
const C_HUD_NOTICE: Color = Color::White;
const C_HELICOPTER: Color = Color::White;
const C_ENEMY: Color = Color::Green;
const C_PROJECTILE: Color = Color::Red;
const C_DEPOT: Color = Color::DarkYellow;
const C_TRUCK: Color = Color::Blue;
const C_GROUND: Color = Color::DarkGreen;
const C_HINT: Color = Color::DarkGrey;

// ── Glyphs ────────────────────────────────────────────────────────────────────

// Head cell sits at column 14 of row 1 facing right, column 5 facing left.
const ENEMY_RIGHT: [&str; 6] = [
    "             __     ",
    "            / o)    ",
    "   _/\\/\\/\\_/ /      ",
    "  _|         /      ",
    " _|  (  | (  |      ",
    "/__.-|_|--|_|       ",
];

const ENEMY_LEFT: [&str; 6] = [
    "     __             ",
    "    (o \\            ",
    "     \\ \\_/\\/\\/\\_    ",
    "      \\         |_  ",
    "      |  ) |  )  |_ ",
    "       |_|--|_|-.__\\",
];

const HELI_RIGHT: [&str; 2] = ["  __|__  ", "-=[___]o>"];
const HELI_LEFT: [&str; 2] = ["  __|__  ", "<o[___]=-"];

const DEPOT: [&str; 6] = [
    "   _________   ",
    "  /  AMMO   \\  ",
    " /___________\\ ",
    " |           | ",
    " |    [=]    | ",
    " |___________| ",
];

const TRUCK_RIGHT: [&str; 4] = [
    "       ____      ",
    "  ____|    |__   ",
    " | AMMO |  |_ \\_ ",
    " '-(o)-----(o)-' ",
];

const TRUCK_LEFT: [&str; 4] = [
    "      ____       ",
    "   __|    |____  ",
    " _/ _|  | AMMO | ",
    " '-(o)-----(o)-' ",
];

// ── Public entry points ───────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    world: &World,
    depot: DepotStatus,
    difficulty: &Difficulty,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_ground(out, &world.field)?;
    draw_sprite(out, &world.field, world.field.depot_x, world.field.depot_y, &DEPOT, C_DEPOT)?;
    if let Some(truck) = &world.truck {
        draw_truck(out, &world.field, truck)?;
    }
    for enemy in world.enemies.iter().filter(|e| e.alive) {
        draw_enemy(out, &world.field, enemy)?;
    }
    for projectile in world.projectiles.iter().filter(|p| p.active) {
        draw_projectile(out, &world.field, projectile)?;
    }
    draw_helicopter(out, &world.field, &world.helicopter)?;
    draw_hud(out, world, depot, difficulty)?;

    if world.game_over {
        draw_game_over(out, world)?;
    }

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, world.field.height as u16 + 1))?;
    out.flush()?;
    Ok(())
}

// ── Clipped drawing ───────────────────────────────────────────────────────────

/// Print `text` at (x, y), dropping the characters outside the field.
fn put<W: Write>(out: &mut W, field: &Field, x: i32, y: i32, text: &str) -> std::io::Result<()> {
    if y < 0 || y > field.height {
        return Ok(());
    }
    let visible: String = text
        .chars()
        .enumerate()
        .filter(|(i, _)| {
            let col = x + *i as i32;
            col >= 0 && col < field.width
        })
        .map(|(_, c)| c)
        .collect();
    if visible.is_empty() {
        return Ok(());
    }
    out.queue(cursor::MoveTo(x.max(0) as u16, y as u16))?;
    out.queue(Print(visible))?;
    Ok(())
}

fn draw_sprite<W: Write>(
    out: &mut W,
    field: &Field,
    x: i32,
    y: i32,
    rows: &[&str],
    color: Color,
) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(color))?;
    for (dy, row) in rows.iter().enumerate() {
        put(out, field, x, y + dy as i32, row)?;
    }
    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_ground<W: Write>(out: &mut W, field: &Field) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(C_GROUND))?;
    let line = "▀".repeat(field.width as usize);
    put(out, field, 0, field.height, &line)
}

fn draw_enemy<W: Write>(out: &mut W, field: &Field, enemy: &Enemy) -> std::io::Result<()> {
    let rows = if enemy.moving_right { &ENEMY_RIGHT } else { &ENEMY_LEFT };
    draw_sprite(out, field, enemy.x, enemy.y, rows, C_ENEMY)
}

fn draw_helicopter<W: Write>(out: &mut W, field: &Field, heli: &Helicopter) -> std::io::Result<()> {
    let rows = if heli.moving_right { &HELI_RIGHT } else { &HELI_LEFT };
    draw_sprite(out, field, heli.x, heli.y, rows, C_HELICOPTER)
}

fn draw_truck<W: Write>(out: &mut W, field: &Field, truck: &Truck) -> std::io::Result<()> {
    let rows = if truck.moving_right { &TRUCK_RIGHT } else { &TRUCK_LEFT };
    draw_sprite(out, field, truck.x, truck.y, rows, C_TRUCK)
}

fn draw_projectile<W: Write>(
    out: &mut W,
    field: &Field,
    projectile: &Projectile,
) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(C_PROJECTILE))?;
    put(out, field, projectile.x, projectile.y, "-")
}

// ── HUD (rows 0-2) ────────────────────────────────────────────────────────────

fn notice_text(notice: Notice) -> &'static str {
    match notice {
        Notice::Reloading => "Reloading...",
        Notice::WaitingToReload => "Waiting to reload...",
        Notice::ReloadComplete => "Reload complete.",
        Notice::ReloadCancelled => "Reload cancelled.",
        Notice::OutOfAmmo => "Out of missiles! Refill at the depot.",
        Notice::TruckArrived => "Supply truck at the depot, trying to unload...",
        Notice::DepotRestocked => "Depot restocked by the truck.",
    }
}

fn draw_hud<W: Write>(
    out: &mut W,
    world: &World,
    depot: DepotStatus,
    difficulty: &Difficulty,
) -> std::io::Result<()> {
    let heli = &world.helicopter;

    out.queue(cursor::MoveTo(0, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_AMMO))?;
    out.queue(Print(format!("Missiles: {:>2}/{:<2}", heli.ammo, heli.max_ammo)))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(style::SetForegroundColor(C_HUD_DEPOT))?;
    let mut depot_line = format!("Depot:    {:>2}/{:<2}", depot.ammo, depot.capacity);
    if depot.truck_unloading {
        depot_line.push_str("  [unloading]");
    }
    if depot.helicopter_reloading {
        depot_line.push_str("  [reloading]");
    }
    out.queue(Print(depot_line))?;

    if let Some(notice) = world.notice {
        out.queue(cursor::MoveTo(0, 2))?;
        out.queue(style::SetForegroundColor(C_HUD_NOTICE))?;
        out.queue(Print(notice_text(notice)))?;
    }

    let right = format!(
        "Kills: {}   hits to kill: {}",
        world.kills, difficulty.lethality
    );
    let rx = (world.field.width as u16).saturating_sub(right.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_AMMO))?;
    out.queue(Print(right))?;

    let hint = "Arrows / WASD : Fly   SPACE : Fire   Q : Quit";
    let hx = (world.field.width as u16).saturating_sub(hint.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(hx, 1))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(hint))?;

    Ok(())
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_game_over<W: Write>(out: &mut W, world: &World) -> std::io::Result<()> {
    let kills_line = format!("Dinosaurs down: {:>4}", world.kills);
    let lines: [(&str, Color); 5] = [
        ("╔════════════════════╗", Color::Red),
        ("║    GAME  OVER      ║", Color::Red),
        ("╚════════════════════╝", Color::Red),
        (kills_line.as_str(), Color::Yellow),
        ("R - Play Again  Q - Quit", Color::White),
    ];

    let cx = world.field.width as u16 / 2;
    let start_row = (world.field.height as u16 / 2).saturating_sub(lines.len() as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }
    Ok(())
}

// ── Menu ──────────────────────────────────────────────────────────────────────

pub fn draw_menu<W: Write>(out: &mut W) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "DINO STRIKE";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(6),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    out.queue(cursor::MoveTo(cx.saturating_sub(16), cy.saturating_sub(3)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Select difficulty:"))?;

    let options: [(&str, Level, Color); 3] = [
        ("1", Level::Easy, Color::Green),
        ("2", Level::Medium, Color::Yellow),
        ("3", Level::Hard, Color::Red),
    ];

    for (i, (key, level, color)) in options.iter().enumerate() {
        let d = level.difficulty();
        let row = cy.saturating_sub(1) + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(16), row))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("[{}] ", key)))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(format!("{:<8}", level.label())))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!(
            " m={} n={} t={}s",
            d.lethality,
            d.heli_capacity,
            d.spawn_interval.as_secs()
        )))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(16), cy + 3))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("Q : Quit"))?;

    out.queue(style::ResetColor)?;
    out.flush()?;
    Ok(())
}
