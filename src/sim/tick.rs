//! Frame-driven simulation tick
//!
//! The host calls [`tick`] once per animation frame with its timestamp. Row
//! motion is scaled by the frame delta against a 60 fps reference so the game
//! plays at the same pace on any refresh rate; timers run on the same clamped
//! simulated clock so pausing freezes them exactly.

use super::collision::{clear_track, end_warp, resolve_collisions};
use super::effects::SpinStep;
use super::events::GameEvent;
use super::hydrate::hydrate_standard_row;
use super::lanes::LaneStep;
use super::pool::RowKind;
use super::rule::RuleKind;
use super::spawn::spawn_row;
use super::state::{GamePhase, GameState};
use super::warp::WarpPhase;
use crate::audio::{AudioCue, SoundEffect};
use crate::consts::*;
use crate::level_for_score;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Absolute lane request (clamped, mirrored under DYSLEXIA)
    pub target_lane: Option<i32>,
    /// Relative lane step (keyboard arrows)
    pub step: i32,
    /// Pause toggle
    pub pause: bool,
    /// Autopilot - steer to the correct lane of the nearest row
    pub autopilot: bool,
}

/// Advance the game to `timestamp_ms`
pub fn tick(state: &mut GameState, input: &TickInput, timestamp_ms: f64) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => state.pause(),
            GamePhase::Paused => state.resume(),
            GamePhase::GameOver => {}
        }
    }

    // The first frame only establishes the clock
    let Some(last) = state.last_timestamp.replace(timestamp_ms) else {
        return;
    };
    if state.phase != GamePhase::Playing {
        return;
    }

    let delta = (timestamp_ms - last).max(0.0);
    let time_scale = (delta as f32 / REFERENCE_FRAME_MS).min(MAX_TIME_SCALE);
    let dt_ms = time_scale * REFERENCE_FRAME_MS;
    state.progress.elapsed_ms += delta;
    state.time_ticks += 1;

    if input.autopilot {
        if let Some(lane) = autopilot_lane(state) {
            state.player_lane = lane;
        }
    } else {
        if let Some(lane) = input.target_lane {
            state.set_player_lane(lane);
        }
        if input.step != 0 {
            state.step_lane(input.step);
        }
    }

    if !state.lane_transition.freezes_motion() {
        let effective_speed = state.effective_speed();
        let distance = effective_speed * time_scale;
        advance_rows(state, distance * state.warp.direction());

        if !state.warp.is_reverse() {
            state.spawner.advance(distance);
            if !state.lane_transition.blocks_spawning()
                && state.warp.phase() != WarpPhase::PrepReverse
            {
                spawn_row(state, effective_speed);
            }
        }

        resolve_collisions(state);
        if state.phase == GamePhase::GameOver {
            return;
        }
    }

    update_progression(state, dt_ms);
}

/// Move every active row and release the ones that left the track
fn advance_rows(state: &mut GameState, dy: f32) {
    let retain = state.warp.retains_rows();
    let reverse = state.warp.is_reverse();

    for index in 0..state.pool.capacity() {
        let row = state.pool.row_mut(index);
        if !row.active {
            continue;
        }
        row.y += dy;
        let off_track = if reverse {
            row.y <= DESPAWN_Y_REVERSE
        } else {
            row.y >= DESPAWN_Y_FORWARD
        };
        if off_track && !retain {
            state.pool.release(index);
        }
    }
}

/// Lane the autopilot wants: the correct item of the nearest approaching
/// standard row, or the first crate of a crate row.
fn autopilot_lane(state: &GameState) -> Option<usize> {
    let reverse = state.warp.is_reverse();
    let pending = state.pool.active().filter(|r| !r.passed);
    let row = if reverse {
        pending
            .filter(|r| r.y > PLAYER_Y_POS - HIT_WINDOW)
            .min_by(|a, b| a.y.total_cmp(&b.y))
    } else {
        pending
            .filter(|r| r.y < PLAYER_Y_POS + HIT_WINDOW)
            .max_by(|a, b| a.y.total_cmp(&b.y))
    }?;

    match row.kind {
        RowKind::Standard => row.correct_lane(),
        RowKind::Crate => row.items.iter().position(|i| i.effect().is_some()),
    }
}

/// Timers, level and HUD rule
fn update_progression(state: &mut GameState, dt_ms: f32) {
    state.progress.level = level_for_score(state.progress.score);

    if state.warp.advance(dt_ms) {
        for row in state.pool.rows_mut().iter_mut().filter(|r| r.active) {
            row.unpass();
        }
        log::info!("Rewind started with {} rows", state.pool.active_count());
        state.emit(GameEvent::WarpPhaseChanged {
            phase: state.warp.phase(),
        });
        state.cue(AudioCue::WarpTransition(false));
        state.cue(AudioCue::ReverseMode(true));
        state.play(SoundEffect::Spin);
    }

    match state.effects.advance_spin(&mut state.rng, dt_ms) {
        Some(SpinStep::Transient(rule)) => state.spin_rule = Some(rule),
        Some(SpinStep::Final(rule)) => {
            state.spin_rule = None;
            state.rule = rule;
            rehydrate_in_flight(state);
        }
        None => {}
    }

    match state.lane_transition.advance(dt_ms) {
        LaneStep::Idle => {}
        LaneStep::ClearTrack => {
            clear_track(state);
            state.haptic(HAPTIC_LEVEL_MS);
            state.emit(GameEvent::Countdown {
                value: LANE_COUNTDOWN_SECS,
            });
            state.play(SoundEffect::Objective);
        }
        LaneStep::Countdown(value) => {
            state.emit(GameEvent::Countdown { value });
            state.play(SoundEffect::Objective);
        }
        LaneStep::Applied { lanes } => {
            log::info!("Lanes expanded to {lanes}");
            state.progress.lanes = lanes;
            state.emit(GameEvent::LaneCountChanged { lanes });
            state.emit(GameEvent::Countdown { value: 0 });
        }
    }

    // A rewind with nothing left to replay can never reach its exit row
    if state.warp.is_reverse() && state.pool.active_count() == 0 {
        end_warp(state);
    }

    refresh_displayed_rule(state);
    state.floating_text.advance(dt_ms);
}

/// Re-roll un-passed standard rows under the rule an ALIAS respin settled on
fn rehydrate_in_flight(state: &mut GameState) {
    let rule = state.rule;
    let lanes = state.progress.lanes;
    for index in 0..state.pool.capacity() {
        let row = state.pool.row_mut(index);
        if !row.active || row.passed || row.kind != RowKind::Standard {
            continue;
        }
        row.rule = rule;
        let id = row.id;
        let items = &mut state.pool.row_mut(index).items;
        hydrate_standard_row(&mut state.rng, items, rule, lanes, id);
    }
    log::debug!("Respun to {} {:?}", rule.kind.as_str(), rule.target);
}

/// HUD rule: the running respin, else the nearest visible standard row, else
/// the current rule
fn refresh_displayed_rule(state: &mut GameState) {
    let nearest = state
        .pool
        .active()
        .filter(|r| {
            r.kind == RowKind::Standard
                && !r.passed
                && r.y > RULE_LOOKAHEAD_MIN_Y
                && r.y < RULE_LOOKAHEAD_MAX_Y
        })
        .max_by(|a, b| a.y.total_cmp(&b.y))
        .map(|r| (r.rule, r.set_index.saturating_sub(1), r.set_size));

    let rule = match (state.spin_rule, nearest) {
        (Some(rule), _) => rule,
        (None, Some((rule, progress, total))) => {
            state.displayed.progress = progress;
            state.displayed.total = total;
            rule
        }
        (None, None) => {
            // Between sets the HUD shows an empty progress bar
            state.displayed.progress = 0;
            state.displayed.total = OBSTACLES_PER_SET;
            state.rule
        }
    };

    if rule == state.displayed.rule {
        return;
    }
    state.displayed.rule = rule;
    state.displayed.alias_word = if state.effects.state().flags().alias {
        state.pick_alias(rule)
    } else {
        None
    };
    state.emit(GameEvent::RuleChanged {
        rule,
        display_text: state.displayed.text().to_string(),
    });
    state.play(SoundEffect::Objective);
    state.cue(AudioCue::RuleTheme {
        word: rule.kind == RuleKind::MatchWord,
    });
}
