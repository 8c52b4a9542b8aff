//! Collision resolution against the rider's strike window
//!
//! Rows only interact with the rider inside `|y - PLAYER_Y_POS| < HIT_WINDOW`.
//! Whatever sits in the rider's lane decides the outcome: an empty lane lets
//! the row through untouched, a crate is picked up, a Stroop item is either
//! the correct match or a mistake.

use super::effects::{EffectState, PowerUpKind};
use super::events::{GameEvent, TextStyle};
use super::hydrate::LaneItem;
use super::lanes::LanePlan;
use super::pool::RowKind;
use super::state::{GamePhase, GameState};
use crate::audio::{AudioCue, SoundEffect};
use crate::consts::*;
use crate::level_for_score;

/// Where a row sits relative to the strike window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Still approaching
    Ahead,
    /// Inside the strike window
    Window,
    /// Beyond the window in the direction of travel
    Past,
}

impl Contact {
    pub fn classify(y: f32, reverse: bool) -> Self {
        if (y - PLAYER_Y_POS).abs() < HIT_WINDOW {
            Contact::Window
        } else if reverse {
            if y < PLAYER_Y_POS - HIT_WINDOW {
                Contact::Past
            } else {
                Contact::Ahead
            }
        } else if y > PLAYER_Y_POS + HIT_WINDOW {
            Contact::Past
        } else {
            Contact::Ahead
        }
    }
}

/// Resolve every active, un-passed row against the rider
pub fn resolve_collisions(state: &mut GameState) {
    for index in 0..state.pool.capacity() {
        // Earlier rows may have ended the run or cleared the track
        if state.phase == GamePhase::GameOver {
            return;
        }
        let row = state.pool.row(index);
        if !row.active || row.passed {
            continue;
        }
        let reverse = state.warp.is_reverse();

        match Contact::classify(row.y, reverse) {
            Contact::Ahead => {}
            Contact::Past => {
                let completes = !reverse && row.completes_set();
                state.pool.row_mut(index).passed = true;
                if completes {
                    complete_set(state, index);
                }
            }
            Contact::Window => {
                let lane = state.player_lane;
                match row.items[lane] {
                    LaneItem::Empty => {}
                    LaneItem::Crate(item) => {
                        let row = state.pool.row_mut(index);
                        row.items[lane].set_hit(true);
                        row.passed = true;
                        pickup(state, item.effect);
                    }
                    LaneItem::Stroop(item) if item.is_correct => strike(state, index),
                    LaneItem::Stroop(_) => mistake(state, index),
                }
            }
        }
    }
}

/// Correct item struck
fn strike(state: &mut GameState, index: usize) {
    let lane = state.player_lane;
    let reverse = state.warp.is_reverse();
    let row = state.pool.row_mut(index);
    row.items[lane].set_hit(true);
    row.passed = true;
    let completes = row.completes_set();
    let opens_set = row.set_index == 1;

    let points = if reverse {
        WARP_HIT_BONUS
    } else {
        state.effects.state().points()
    };
    state.add_score(points);
    state.float_text(lane, 85.0, format!("+{points}"), TextStyle::Plain);

    if !reverse && completes {
        complete_set(state, index);
    }
    if reverse && opens_set {
        end_warp(state);
    }
}

/// Wrong item struck: spend a life, or end the run
fn mistake(state: &mut GameState, index: usize) {
    if state.progress.lives == 0 {
        game_over(state);
        return;
    }

    state.progress.lives -= 1;
    state.emit(GameEvent::LifeLost {
        lives: state.progress.lives,
    });
    state.play(SoundEffect::LifeLost);
    state.float_text(state.player_lane, 85.0, "SAVED!".to_string(), TextStyle::Plain);

    let reverse = state.warp.is_reverse();
    let row = state.pool.row_mut(index);
    row.passed = true;
    let completes = row.completes_set();
    let opens_set = row.set_index == 1;

    if !reverse && completes {
        complete_set(state, index);
    }
    if reverse && opens_set {
        end_warp(state);
    }
}

fn game_over(state: &mut GameState) {
    state.phase = GamePhase::GameOver;
    state.play(SoundEffect::Wrong);
    state.haptic(HAPTIC_GAME_OVER_MS);
    log::info!(
        "Game over: score={}, level={}, elapsed={:.1}s",
        state.progress.score,
        state.progress.level,
        state.progress.elapsed_ms / 1000.0
    );
    state.emit(GameEvent::GameOver {
        final_score: state.progress.score,
        elapsed_ms: state.progress.elapsed_ms,
    });
}

/// Crate collected
fn pickup(state: &mut GameState, kind: PowerUpKind) {
    let lane = state.player_lane;
    log::debug!("Picked up {}", kind.label());

    match kind {
        PowerUpKind::Warp => {
            if state.warp.begin() {
                log::info!("Warp initiated");
                state.emit(GameEvent::WarpPhaseChanged {
                    phase: state.warp.phase(),
                });
            }
            state.play(SoundEffect::Crate);
            state.float_text(lane, PLAYER_Y_POS, "WARP INITIATED".to_string(), TextStyle::Warp);
            return;
        }
        PowerUpKind::Wild => {
            state.play(SoundEffect::Wild);
            state.float_text(lane, PLAYER_Y_POS, "WILD MODE!".to_string(), TextStyle::Plain);
        }
        other => {
            state.play(SoundEffect::Crate);
            state.float_text(lane, PLAYER_Y_POS, other.label().to_string(), TextStyle::Accent);
        }
    }

    let rule = state.displayed.rule;
    let disabled = state.disabled;
    let effect = state.effects.apply_pickup(&mut state.rng, kind, rule, disabled);
    if let EffectState::Wild(a, b) = effect {
        log::debug!("Wild pair: {} + {}", a.label(), b.label());
    }
    state.emit(GameEvent::EffectChanged { effect });
    if state.effects.is_spinning() {
        state.play(SoundEffect::Spin);
    }
}

/// Last row of a standard set resolved (struck, forgiven or passed)
fn complete_set(state: &mut GameState, index: usize) {
    let row = state.pool.row(index);
    let is_standard = row.kind == RowKind::Standard;
    let was_guided = row.is_guided;
    // Labels from the finished set are stale
    state.floating_text.clear();

    if state.warp.on_set_completed() {
        log::info!("Warp set complete, preparing rewind");
        state.emit(GameEvent::WarpPhaseChanged {
            phase: state.warp.phase(),
        });
        state.cue(AudioCue::WarpTransition(true));
    }

    let level = level_for_score(state.progress.score);
    if !state.warp.is_active() && level > state.progress.applied_level {
        level_up(state, level);
    }

    if is_standard {
        state.progress.completed_sets += 1;
        if state.progress.completed_sets % SETS_PER_SURGE == 0 {
            let surged = INITIAL_SPEED * (1.0 + SURGE_GAIN_PER_LEVEL * level as f32);
            state.progress.speed = surged.min(MAX_SPEED);
            log::info!("Velocity surge: speed={:.3}", state.progress.speed);
            state.emit(GameEvent::VelocitySurge {
                speed: state.progress.speed,
            });
            state.float_text(1, 60.0, "VELOCITY SURGE".to_string(), TextStyle::Accent);
            state.play(SoundEffect::Objective);
        }
    }

    let practice = state.settings.practice;
    if !practice.is_warp_drill()
        && practice.is_active()
        && state.practice.tutorial_crate_spawned
        && was_guided
    {
        state.practice.guided_sets_completed += 1;
        if state.practice.guided_sets_completed == GUIDED_SETS {
            log::info!("Guidance ended");
            state.emit(GameEvent::GuidanceEnded);
        }
    }

    if state.effects.clear() {
        state.emit(GameEvent::EffectChanged {
            effect: EffectState::None,
        });
    }
    state.spin_rule = None;
    state.displayed.alias_word = None;
}

/// Apply the lane policy for a newly reached level
fn level_up(state: &mut GameState, level: u32) {
    let previous = state.progress.applied_level;
    state.progress.applied_level = level;
    log::info!("Level {previous} -> {level}");
    state.emit(GameEvent::LevelChanged { level });
    state.play(SoundEffect::LevelUp);

    match LanePlan::for_level_up(previous, level, state.settings.practice.fixed_lanes()) {
        LanePlan::Announce => state.haptic(HAPTIC_LEVEL_MS),
        LanePlan::Expand => {
            log::info!("Lane expansion scheduled");
            state.lane_transition.begin_expansion(MAX_LANES);
        }
        LanePlan::Contract => {
            log::info!("Lane contraction to {BASE_LANES}");
            state.progress.lanes = BASE_LANES;
            state.player_lane = state.player_lane.min(BASE_LANES - 1);
            clear_track(state);
            state.emit(GameEvent::LaneCountChanged { lanes: BASE_LANES });
            state.haptic(HAPTIC_LEVEL_MS);
        }
    }
}

/// Despawn everything and restart the spawner at an objective boundary
pub fn clear_track(state: &mut GameState) {
    state.pool.release_all();
    state.spawner.reset_to_boundary();
}

/// Reverse run finished
pub fn end_warp(state: &mut GameState) {
    if !state.warp.finish() {
        return;
    }
    log::info!("Warp complete");
    state.emit(GameEvent::WarpPhaseChanged {
        phase: state.warp.phase(),
    });
    state.cue(AudioCue::ReverseMode(false));
    state.pool.release_all();
    state.spawner.reset_distance();
    if state.settings.practice.is_warp_drill() {
        state.practice.warp_sets_completed += 1;
    }
}
