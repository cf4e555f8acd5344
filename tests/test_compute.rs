use dino_strike::compute::*;
use dino_strike::entities::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn make_world() -> World {
    init_world(Field::default(), &Level::Medium.difficulty())
}

fn enemy_at(x: i32, y: i32, moving_right: bool) -> Enemy {
    Enemy { x, y, alive: true, moving_right, headshot_hits: 0 }
}

fn projectile_at(x: i32, y: i32, moving_right: bool) -> Projectile {
    Projectile { id: 0, x, y, active: true, moving_right }
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

// ── init_world ────────────────────────────────────────────────────────────────

#[test]
fn init_world_helicopter_armed_and_placed() {
    let w = make_world();
    assert_eq!((w.helicopter.x, w.helicopter.y), (40, 20));
    assert_eq!(w.helicopter.ammo, 15);
    assert_eq!(w.helicopter.max_ammo, 15);
    assert!(w.helicopter.moving_right);
    assert_eq!(w.helicopter.reload, ReloadState::Normal);
}

#[test]
fn init_world_empty_collections() {
    let w = make_world();
    assert!(w.enemies.is_empty());
    assert!(w.projectiles.is_empty());
    assert!(w.truck.is_none());
    assert!(!w.game_over);
    assert_eq!(w.kills, 0);
}

// ── Rect ──────────────────────────────────────────────────────────────────────

#[test]
fn touches_counts_shared_edge() {
    let a = Rect { x: 0, y: 0, w: 9, h: 2 };
    let b = Rect { x: 9, y: 2, w: 15, h: 6 };
    assert!(a.touches(&b));
    assert!(b.touches(&a));
    assert!(!a.intersects(&b));
}

#[test]
fn intersects_is_symmetric() {
    let a = Rect { x: 0, y: 0, w: 20, h: 6 };
    let b = Rect { x: 19, y: 5, w: 9, h: 2 };
    assert!(a.intersects(&b));
    assert!(b.intersects(&a));
}

#[test]
fn disjoint_rects_neither_touch_nor_intersect() {
    let a = Rect { x: 0, y: 0, w: 9, h: 2 };
    let b = Rect { x: 11, y: 0, w: 9, h: 2 };
    assert!(!a.touches(&b));
    assert!(!a.intersects(&b));
}

// ── Docking / helicopter collision ────────────────────────────────────────────

#[test]
fn helicopter_docks_when_overlapping_depot() {
    let mut w = make_world();
    w.helicopter.x = w.field.depot_x + 2;
    w.helicopter.y = w.field.depot_y + 1;
    assert!(is_at_depot(&w.helicopter, &w.field));
}

#[test]
fn helicopter_far_from_depot_is_not_docked() {
    let w = make_world();
    assert!(!is_at_depot(&w.helicopter, &w.field));
}

#[test]
fn dead_enemy_never_collides_with_helicopter() {
    let w = make_world();
    let mut e = enemy_at(w.helicopter.x, w.helicopter.y, true);
    assert!(collides_with_helicopter(&e, &w.helicopter));
    e.alive = false;
    assert!(!collides_with_helicopter(&e, &w.helicopter));
}

// ── strike ────────────────────────────────────────────────────────────────────

#[test]
fn head_point_depends_only_on_facing() {
    assert_eq!(head_point(&enemy_at(10, 20, true)), (24, 21));
    assert_eq!(head_point(&enemy_at(10, 20, false)), (15, 21));
}

#[test]
fn strike_on_head_cell() {
    let e = enemy_at(10, 20, true);
    assert_eq!(strike(&projectile_at(24, 21, true), &e), Some(Strike::Head));
}

#[test]
fn strike_on_body_region() {
    let e = enemy_at(10, 20, true);
    assert_eq!(strike(&projectile_at(10, 22, true), &e), Some(Strike::Body));
    assert_eq!(strike(&projectile_at(29, 25, true), &e), Some(Strike::Body));
}

#[test]
fn strike_misses_outside_body_rows() {
    let e = enemy_at(10, 20, true);
    // Row y+1 is only vulnerable at the head cell.
    assert_eq!(strike(&projectile_at(12, 21, true), &e), None);
    assert_eq!(strike(&projectile_at(30, 22, true), &e), None);
    assert_eq!(strike(&projectile_at(12, 26, true), &e), None);
}

#[test]
fn strike_ignores_dead_enemy() {
    let mut e = enemy_at(10, 20, true);
    e.alive = false;
    assert_eq!(strike(&projectile_at(24, 21, true), &e), None);
}

// ── apply_head_hit ────────────────────────────────────────────────────────────

#[test]
fn enemy_dies_exactly_on_lethal_hit() {
    let mut e = enemy_at(10, 20, true);
    assert!(!apply_head_hit(&mut e, 3));
    assert!(!apply_head_hit(&mut e, 3));
    assert!(e.alive);
    assert!(apply_head_hit(&mut e, 3));
    assert!(!e.alive);
    assert_eq!(e.headshot_hits, 3);
}

#[test]
fn one_shot_kill_at_lethality_one() {
    let mut e = enemy_at(10, 20, true);
    assert!(apply_head_hit(&mut e, 1));
    assert!(!e.alive);
}

#[test]
fn dead_enemy_is_not_resurrected_or_recounted() {
    let mut e = enemy_at(10, 20, true);
    apply_head_hit(&mut e, 1);
    assert!(!apply_head_hit(&mut e, 1));
    assert!(!e.alive);
    assert_eq!(e.headshot_hits, 1);
}

// ── advance_projectile ────────────────────────────────────────────────────────

#[test]
fn projectile_moves_one_cell_in_its_direction() {
    let field = Field::default();
    let mut right = projectile_at(10, 5, true);
    let mut left = projectile_at(10, 5, false);
    assert_eq!(advance_projectile(&mut right, &mut [], 1, &field), Flight::Flying);
    assert_eq!(advance_projectile(&mut left, &mut [], 1, &field), Flight::Flying);
    assert_eq!(right.x, 11);
    assert_eq!(left.x, 9);
    assert!(right.active && left.active);
}

#[test]
fn projectile_leaving_field_is_deactivated() {
    let field = Field::default();
    let mut p = projectile_at(field.width - 1, 5, true);
    assert_eq!(advance_projectile(&mut p, &mut [], 1, &field), Flight::OutOfBounds);
    assert!(!p.active);

    let mut q = projectile_at(0, 5, false);
    assert_eq!(advance_projectile(&mut q, &mut [], 1, &field), Flight::OutOfBounds);
    assert!(!q.active);
}

#[test]
fn head_hit_deactivates_and_credits() {
    let field = Field::default();
    let mut enemies = vec![enemy_at(10, 20, true)];
    let mut p = projectile_at(23, 21, true);
    let flight = advance_projectile(&mut p, &mut enemies, 2, &field);
    assert_eq!(flight, Flight::Hit { enemy: 0, strike: Strike::Head, killed: false });
    assert!(!p.active);
    assert_eq!(enemies[0].headshot_hits, 1);
    assert!(enemies[0].alive);
}

#[test]
fn body_hit_consumes_projectile_without_damage() {
    let field = Field::default();
    let mut enemies = vec![enemy_at(10, 20, true)];
    let mut p = projectile_at(9, 23, true);
    let flight = advance_projectile(&mut p, &mut enemies, 1, &field);
    assert_eq!(flight, Flight::Hit { enemy: 0, strike: Strike::Body, killed: false });
    assert!(!p.active);
    assert_eq!(enemies[0].headshot_hits, 0);
    assert!(enemies[0].alive);
}

#[test]
fn only_first_matching_enemy_is_credited() {
    let field = Field::default();
    // Two enemies stacked so that the projectile lands on both heads.
    let mut enemies = vec![enemy_at(10, 20, true), enemy_at(10, 20, true)];
    let mut p = projectile_at(23, 21, true);
    let flight = advance_projectile(&mut p, &mut enemies, 1, &field);
    assert_eq!(flight, Flight::Hit { enemy: 0, strike: Strike::Head, killed: true });
    assert!(!enemies[0].alive);
    assert!(enemies[1].alive);
    assert_eq!(enemies[1].headshot_hits, 0);
}

#[test]
fn scan_order_decides_between_enemies() {
    let field = Field::default();
    // Enemy 0's body covers the cell and enemy 1's head is there too.
    // Enemy 0 is scanned first, so the shot is spent on its body.
    let mut enemies = vec![enemy_at(10, 19, true), enemy_at(10, 20, true)];
    let mut p = projectile_at(23, 21, true);
    let flight = advance_projectile(&mut p, &mut enemies, 1, &field);
    assert_eq!(flight, Flight::Hit { enemy: 0, strike: Strike::Body, killed: false });
    assert_eq!(enemies[1].headshot_hits, 0);
}

// ── step_enemy ────────────────────────────────────────────────────────────────

#[test]
fn enemy_bounces_off_right_edge() {
    let field = Field::default();
    let mut e = enemy_at(field.width - 20, 20, true);
    step_enemy(&mut e, &field);
    assert_eq!(e.x, field.width - 19);
    assert!(!e.moving_right);
    step_enemy(&mut e, &field);
    assert_eq!(e.x, field.width - 20);
}

#[test]
fn enemy_bounces_off_left_edge() {
    let field = Field::default();
    let mut e = enemy_at(0, 20, false);
    step_enemy(&mut e, &field);
    assert_eq!(e.x, -1);
    assert!(e.moving_right);
    step_enemy(&mut e, &field);
    assert_eq!(e.x, 0);
}

// ── animate_enemies ───────────────────────────────────────────────────────────

#[test]
fn animate_moves_alive_and_drops_dead() {
    let mut w = make_world();
    let mut dead = enemy_at(30, 30, true);
    dead.alive = false;
    w.enemies = vec![enemy_at(0, 30, true), dead];
    assert!(!animate_enemies(&mut w));
    assert_eq!(w.enemies.len(), 1);
    assert_eq!(w.enemies[0].x, 1);
}

#[test]
fn enemy_touching_helicopter_ends_game() {
    let mut w = make_world();
    let (hx, hy) = (w.helicopter.x, w.helicopter.y);
    w.enemies.push(enemy_at(hx - 20, hy, true));
    assert!(animate_enemies(&mut w));
    assert!(w.game_over);
}

#[test]
fn five_alive_enemies_end_game() {
    let mut w = make_world();
    for i in 0..POPULATION_CAP as i32 {
        w.enemies.push(enemy_at(i, 32, true));
    }
    assert!(animate_enemies(&mut w));
}

#[test]
fn four_alive_enemies_do_not_end_game() {
    let mut w = make_world();
    for i in 0..4 {
        w.enemies.push(enemy_at(i, 32, true));
    }
    assert!(!animate_enemies(&mut w));
}

#[test]
fn game_over_is_latched() {
    let mut w = make_world();
    w.game_over = true;
    assert!(animate_enemies(&mut w));
    assert!(w.game_over);
}

// ── spawn_enemy ───────────────────────────────────────────────────────────────

#[test]
fn spawn_places_enemy_in_band_at_left_edge() {
    let mut w = make_world();
    let mut rng = seeded_rng();
    for _ in 0..4 {
        assert!(spawn_enemy(&mut w, &mut rng));
    }
    let h = w.field.height;
    for e in &w.enemies {
        assert_eq!(e.x, 0);
        assert!(e.moving_right);
        assert!(e.alive);
        assert!(e.y <= h - 8 && e.y > h - 13, "y = {}", e.y);
    }
}

#[test]
fn spawn_respects_population_cap() {
    let mut w = make_world();
    let mut rng = seeded_rng();
    for _ in 0..10 {
        spawn_enemy(&mut w, &mut rng);
    }
    assert_eq!(alive_count(&w.enemies), POPULATION_CAP);
}

#[test]
fn spawn_counts_only_alive() {
    let mut w = make_world();
    let mut dead = enemy_at(0, 30, true);
    dead.alive = false;
    w.enemies = vec![dead; 5];
    assert!(spawn_enemy(&mut w, &mut seeded_rng()));
    assert_eq!(alive_count(&w.enemies), 1);
}

// ── move_helicopter ───────────────────────────────────────────────────────────

#[test]
fn movement_updates_position_and_facing() {
    let mut w = make_world();
    let field = w.field;
    move_helicopter(&mut w.helicopter, Command::MoveLeft, &field);
    assert_eq!(w.helicopter.x, 39);
    assert!(!w.helicopter.moving_right);
    move_helicopter(&mut w.helicopter, Command::MoveRight, &field);
    assert_eq!(w.helicopter.x, 40);
    assert!(w.helicopter.moving_right);
    move_helicopter(&mut w.helicopter, Command::MoveUp, &field);
    assert_eq!(w.helicopter.y, 19);
    move_helicopter(&mut w.helicopter, Command::MoveDown, &field);
    assert_eq!(w.helicopter.y, 20);
}

#[test]
fn movement_clamps_to_field() {
    let mut w = make_world();
    let field = w.field;
    w.helicopter.x = 0;
    w.helicopter.y = 0;
    move_helicopter(&mut w.helicopter, Command::MoveLeft, &field);
    move_helicopter(&mut w.helicopter, Command::MoveUp, &field);
    assert_eq!((w.helicopter.x, w.helicopter.y), (0, 0));

    w.helicopter.x = field.width - HELICOPTER_WIDTH;
    w.helicopter.y = field.height - HELICOPTER_HEIGHT;
    move_helicopter(&mut w.helicopter, Command::MoveRight, &field);
    move_helicopter(&mut w.helicopter, Command::MoveDown, &field);
    assert_eq!(
        (w.helicopter.x, w.helicopter.y),
        (field.width - HELICOPTER_WIDTH, field.height - HELICOPTER_HEIGHT)
    );
}

#[test]
fn blocked_left_move_keeps_facing() {
    let mut w = make_world();
    let field = w.field;
    w.helicopter.x = 0;
    move_helicopter(&mut w.helicopter, Command::MoveLeft, &field);
    assert!(w.helicopter.moving_right);
}

// ── fire ──────────────────────────────────────────────────────────────────────

#[test]
fn fire_spends_ammo_and_launches_from_nose() {
    let mut w = make_world();
    let p = fire(&mut w.helicopter, 7).expect("armed helicopter fires");
    assert_eq!(w.helicopter.ammo, 14);
    assert_eq!((p.x, p.y), (49, 20));
    assert_eq!(p.id, 7);
    assert!(p.active && p.moving_right);

    w.helicopter.moving_right = false;
    let q = fire(&mut w.helicopter, 8).expect("still armed");
    assert_eq!(q.x, 39);
    assert!(!q.moving_right);
}

#[test]
fn fire_with_empty_magazine_does_nothing() {
    let mut w = make_world();
    w.helicopter.ammo = 0;
    assert!(fire(&mut w.helicopter, 0).is_none());
    assert_eq!(w.helicopter.ammo, 0);
}
