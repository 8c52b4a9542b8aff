//! Row spawning: spacing accumulator, set cursor and crate scheduling
//!
//! A set is `OBSTACLES_PER_SET` standard rows sharing one rule. Between sets
//! sits an objective boundary where the next rule is chosen and, outside the
//! crate-free drills, announced by a crate row carrying that rule.

use rand::Rng;
use serde::Serialize;

use super::effects::PowerUpSet;
use super::pool::RowKind;
use super::rule::generate_rule;
use super::state::GameState;
use crate::consts::*;

/// Where the spawner is inside the set rhythm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "cursor", rename_all = "snake_case")]
pub enum SpawnCursor {
    /// `spawned` rows of the current set are out; at `OBSTACLES_PER_SET` the
    /// next spawn is an objective boundary
    InSet { spawned: u32 },
    /// A crate row just went out; the next spawn opens a set
    AfterCrate,
}

/// Spawn scheduling state
#[derive(Debug, Clone, Serialize)]
pub struct Spawner {
    pub cursor: SpawnCursor,
    /// Distance travelled since the last spawn, offset by `SPAWN_Y`
    pub last_spawn_y: f32,
    /// Gap required before the next spawn
    pub next_distance: f32,
    /// Objective boundaries crossed so far
    pub objectives_spawned: u32,
    next_row_id: u32,
}

impl Spawner {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            cursor: SpawnCursor::InSet { spawned: 0 },
            last_spawn_y: RESET_SPAWN_Y,
            next_distance: random_gap(rng),
            objectives_spawned: 0,
            next_row_id: 1,
        }
    }

    /// Forward travel this tick
    pub fn advance(&mut self, distance: f32) {
        self.last_spawn_y += distance;
    }

    pub fn is_due(&self) -> bool {
        self.last_spawn_y > SPAWN_Y + self.next_distance
    }

    /// After the track is cleared: spawn immediately, starting at a boundary
    pub fn reset_to_boundary(&mut self) {
        self.last_spawn_y = RESET_SPAWN_Y;
        self.cursor = SpawnCursor::InSet {
            spawned: OBSTACLES_PER_SET,
        };
    }

    /// After the warp ends: spawn immediately, keep the set position
    pub fn reset_distance(&mut self) {
        self.last_spawn_y = RESET_SPAWN_Y;
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_row_id;
        self.next_row_id = self.next_row_id.wrapping_add(1);
        id
    }

    /// Empty run-up between the previous spawn and a set's first row
    fn transition_gap(&self) -> f32 {
        self.last_spawn_y - SPAWN_Y
    }
}

/// Practice tutorial and guidance bookkeeping
#[derive(Debug, Clone, Default, Serialize)]
pub struct PracticeProgress {
    pub tutorial_crate_spawned: bool,
    pub guided_sets_spawned: u32,
    pub guided_sets_completed: u32,
    pub warp_sets_completed: u32,
}

/// Uniform gap in `[MIN_OBSTACLE_DISTANCE, MAX_OBSTACLE_DISTANCE)`
pub fn random_gap<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.random_range(MIN_OBSTACLE_DISTANCE..MAX_OBSTACLE_DISTANCE)
}

/// Spawn at most one row if the spacing accumulator says one is due.
///
/// A full pool skips the spawn; the accumulator keeps growing so the row
/// appears as soon as a slot frees up.
pub fn spawn_row(state: &mut GameState, effective_speed: f32) {
    if !state.spawner.is_due() {
        return;
    }
    let Some(slot) = state.pool.acquire() else {
        log::debug!("Pool exhausted, deferring spawn");
        return;
    };

    let lanes = state.progress.lanes;
    let practice = state.settings.practice;
    let id = state.spawner.next_id();
    let mut next_gap = random_gap(&mut state.rng);

    let tutorial_crate = practice
        .selected_crate()
        .filter(|_| !state.practice.tutorial_crate_spawned);

    if let Some(kind) = tutorial_crate {
        let rule = state.rule;
        state.pool.row_mut(slot).reset_crate(
            &mut state.rng,
            id,
            rule,
            lanes,
            PowerUpSet::all_except(kind),
        );
        state.spawner.cursor = SpawnCursor::AfterCrate;
        state.practice.tutorial_crate_spawned = true;
        next_gap = TUTORIAL_CRATE_GAP;
        log::debug!("Tutorial crate {} spawned", kind.label());
    } else {
        match state.spawner.cursor {
            SpawnCursor::InSet { spawned } if spawned >= OBSTACLES_PER_SET => {
                state.spawner.objectives_spawned += 1;
                if practice.skips_crates() {
                    let rule = generate_rule(&mut state.rng, Some(state.rule), practice.forced_rule_kind());
                    state.rule = rule;
                    let gap = state.spawner.transition_gap();
                    state.pool.row_mut(slot).reset_standard(
                        &mut state.rng,
                        id,
                        rule,
                        1,
                        OBSTACLES_PER_SET,
                        gap,
                        lanes,
                    );
                    state.spawner.cursor = SpawnCursor::InSet { spawned: 1 };
                    next_gap += effective_speed * SET_END_GAP_FACTOR;
                } else {
                    let forced = practice
                        .forced_rule_kind()
                        .or_else(|| state.history.forced_kind());
                    let rule = generate_rule(&mut state.rng, Some(state.rule), forced);
                    let disabled = state.disabled;
                    state
                        .pool
                        .row_mut(slot)
                        .reset_crate(&mut state.rng, id, rule, lanes, disabled);
                    state.rule = rule;
                    state.history.push(rule.kind);
                    state.spawner.cursor = SpawnCursor::AfterCrate;
                    next_gap += effective_speed * CRATE_GAP_FACTOR;
                    log::debug!("Crate row {id} ({} {:?})", rule.kind.as_str(), rule.target);
                }
            }
            SpawnCursor::AfterCrate => {
                let rule = state.rule;
                let gap = state.spawner.transition_gap();
                state.pool.row_mut(slot).reset_standard(
                    &mut state.rng,
                    id,
                    rule,
                    1,
                    OBSTACLES_PER_SET,
                    gap,
                    lanes,
                );
                state.spawner.cursor = SpawnCursor::InSet { spawned: 1 };
                if practice.is_active() && state.practice.tutorial_crate_spawned {
                    state.practice.guided_sets_spawned += 1;
                }
            }
            SpawnCursor::InSet { spawned } => {
                let set_index = spawned + 1;
                let rule = state.rule;
                state.pool.row_mut(slot).reset_standard(
                    &mut state.rng,
                    id,
                    rule,
                    set_index,
                    OBSTACLES_PER_SET,
                    0.0,
                    lanes,
                );
                state.spawner.cursor = SpawnCursor::InSet { spawned: set_index };
                if set_index == OBSTACLES_PER_SET {
                    // Every third boundary gets a wide breather before the surge
                    next_gap = if (state.spawner.objectives_spawned + 1) % 3 == 0 {
                        SURGE_GAP_BASE + state.progress.speed * SURGE_GAP_SPEED_FACTOR
                    } else {
                        next_gap + effective_speed * SET_END_GAP_FACTOR
                    };
                }
            }
        }
    }

    let guided = practice.is_active()
        && state.practice.tutorial_crate_spawned
        && if practice.is_warp_drill() {
            state.warp.is_active() && state.practice.warp_sets_completed < 1
        } else {
            state.practice.guided_sets_spawned <= GUIDED_SETS
        };
    let row = state.pool.row_mut(slot);
    row.is_guided = guided && row.kind == RowKind::Standard;

    state.spawner.last_spawn_y = SPAWN_Y;
    state.spawner.next_distance = next_gap;
}
