//! Read-only view of the game handed to presentation after each tick

use serde::Serialize;

use super::effects::{EffectFlags, EffectState};
use super::events::FloatingText;
use super::hydrate::LaneItem;
use super::pool::{Row, RowKind};
use super::rule::Rule;
use super::state::{GamePhase, GameState};
use super::warp::WarpPhase;
use crate::consts::{GPS_LOOKAHEAD_MAX_Y, HIT_WINDOW, MAX_LANES, PLAYER_Y_POS, RULE_LOOKAHEAD_MIN_Y};

/// HUD rule text while the rewind hides the rule
const HIDDEN_RULE_TEXT: &str = "?????";

/// One active row as the renderer sees it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView {
    pub id: u32,
    pub y: f32,
    pub kind: RowKind,
    pub items: [LaneItem; MAX_LANES],
    pub passed: bool,
    pub set_index: u32,
    pub set_size: u32,
    pub is_guided: bool,
    pub transition_gap_height: f32,
}

impl From<&Row> for RowView {
    fn from(row: &Row) -> Self {
        Self {
            id: row.id,
            y: row.y,
            kind: row.kind,
            items: row.items,
            passed: row.passed,
            set_index: row.set_index,
            set_size: row.set_size,
            is_guided: row.is_guided,
            transition_gap_height: row.transition_gap_height,
        }
    }
}

impl RowView {
    /// Drop the answer from standard rows drawn as ghosts
    fn hide_answer(&mut self) {
        if self.kind != RowKind::Standard {
            return;
        }
        for item in self.items.iter_mut() {
            if let LaneItem::Stroop(stroop) = item {
                stroop.is_correct = false;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub score: u64,
    pub level: u32,
    pub lives: u32,
    pub speed: f32,
    pub lanes: usize,
    pub player_lane: usize,
    pub elapsed_ms: f64,
    /// Hidden during the rewind
    pub rule: Option<Rule>,
    /// HUD text for the rule target (alias word under ALIAS)
    pub rule_text: String,
    pub rule_progress: u32,
    pub rule_total: u32,
    pub effect: EffectState,
    pub flags: EffectFlags,
    pub warp_phase: WarpPhase,
    /// Rows are drawn as ghosts during the rewind
    pub ghost: bool,
    /// Warp drill: ghost rows keep their answer so the target can be lit
    pub warp_guidance: bool,
    /// Lane-expansion countdown, while one is showing
    pub countdown: Option<u32>,
    /// GPS hint: correct lane of the next standard row
    pub gps_lane: Option<usize>,
    /// Practice guidance: correct lane of the next guided row
    pub guidance_lane: Option<usize>,
    pub rows: Vec<RowView>,
    pub floating_text: Vec<FloatingText>,
}

impl GameState {
    pub fn snapshot(&self) -> Snapshot {
        let effect = self.effects.state();
        let flags = effect.flags();

        let gps_lane = if flags.gps {
            self.pool
                .active()
                .filter(|r| {
                    r.kind == RowKind::Standard
                        && !r.passed
                        && r.y > RULE_LOOKAHEAD_MIN_Y
                        && r.y < GPS_LOOKAHEAD_MAX_Y
                })
                .max_by(|a, b| a.y.total_cmp(&b.y))
                .and_then(Row::correct_lane)
        } else {
            None
        };

        let guidance_lane = self
            .pool
            .active()
            .filter(|r| r.is_guided && !r.passed && r.y < PLAYER_Y_POS + HIT_WINDOW)
            .max_by(|a, b| a.y.total_cmp(&b.y))
            .and_then(Row::correct_lane);

        let ghost = self.warp.is_reverse();
        let warp_guidance = self.settings.practice.is_warp_drill()
            && self.warp.is_active()
            && self.practice.warp_sets_completed < 1;
        let mut rows: Vec<RowView> = self.pool.active().map(RowView::from).collect();
        if ghost && !warp_guidance {
            rows.iter_mut().for_each(RowView::hide_answer);
        }

        Snapshot {
            phase: self.phase,
            score: self.progress.score,
            level: self.progress.level,
            lives: self.progress.lives,
            speed: self.progress.speed,
            lanes: self.progress.lanes,
            player_lane: self.player_lane,
            elapsed_ms: self.progress.elapsed_ms,
            rule: (!ghost).then_some(self.displayed.rule),
            rule_text: if ghost {
                HIDDEN_RULE_TEXT.to_string()
            } else {
                self.displayed.text().to_string()
            },
            rule_progress: self.displayed.progress,
            rule_total: self.displayed.total,
            effect,
            flags,
            warp_phase: self.warp.phase(),
            ghost,
            warp_guidance,
            countdown: self.lane_transition.countdown(),
            gps_lane,
            guidance_lane,
            rows,
            floating_text: self.floating_text.iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{PracticeMode, Settings};
    use crate::consts::WARP_PREP_DELAY_MS;
    use crate::sim::PowerUpKind;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn place_row(state: &mut GameState, y: f32) -> usize {
        let slot = state.pool.acquire().unwrap();
        let rule = state.rule;
        let row = state.pool.row_mut(slot);
        row.reset_standard(&mut Pcg32::seed_from_u64(3), 40, rule, 1, 5, 0.0, 3);
        row.y = y;
        slot
    }

    #[test]
    fn test_snapshot_of_fresh_run() {
        let state = GameState::new(1, Settings::default());
        let snap = state.snapshot();
        assert_eq!(snap.phase, GamePhase::Playing);
        assert_eq!(snap.score, 0);
        assert_eq!(snap.lanes, 3);
        assert_eq!(snap.rule_text, state.rule.target.name());
        assert!(snap.rows.is_empty());
        assert!(!snap.ghost);
        assert_eq!(snap.gps_lane, None);
    }

    #[test]
    fn test_gps_hint_requires_effect() {
        let mut state = GameState::new(2, Settings::default());
        let slot = place_row(&mut state, 50.0);
        let correct = state.pool.row(slot).correct_lane();
        assert_eq!(state.snapshot().gps_lane, None);

        let rule = state.rule;
        let disabled = state.disabled;
        state
            .effects
            .apply_pickup(&mut state.rng, PowerUpKind::Gps, rule, disabled);
        let snap = state.snapshot();
        assert_eq!(snap.gps_lane, correct);
        assert_eq!(snap.rows.len(), 1);
    }

    #[test]
    fn test_guidance_lane_tracks_guided_rows() {
        let mut state = GameState::new(3, Settings::with_practice(PracticeMode::ColorOnly));
        let slot = place_row(&mut state, 60.0);
        assert_eq!(state.snapshot().guidance_lane, None);

        state.pool.row_mut(slot).is_guided = true;
        let correct = state.pool.row(slot).correct_lane();
        assert_eq!(state.snapshot().guidance_lane, correct);
    }

    #[test]
    fn test_rewind_hides_the_answer() {
        let mut state = GameState::new(5, Settings::default());
        let slot = place_row(&mut state, 90.0);
        let correct = state.pool.row(slot).correct_lane();
        state.warp.begin();
        state.warp.on_set_completed();
        state.warp.advance(WARP_PREP_DELAY_MS);
        assert!(state.warp.is_reverse());

        let snap = state.snapshot();
        assert!(snap.ghost);
        assert!(!snap.warp_guidance);
        assert_eq!(snap.rule, None);
        assert_eq!(snap.rule_text, HIDDEN_RULE_TEXT);
        assert!(snap.rows[0].items.iter().all(|i| !i.is_correct()));
        // The simulation still knows the answer
        assert_eq!(state.pool.row(slot).correct_lane(), correct);
    }

    #[test]
    fn test_warp_drill_keeps_the_answer() {
        let settings = Settings::with_practice(PracticeMode::SingleCrate(PowerUpKind::Warp));
        let mut state = GameState::new(6, settings);
        let slot = place_row(&mut state, 90.0);
        let correct = state.pool.row(slot).correct_lane();
        state.warp.begin();
        state.warp.on_set_completed();
        state.warp.advance(WARP_PREP_DELAY_MS);

        let snap = state.snapshot();
        assert!(snap.ghost);
        assert!(snap.warp_guidance);
        assert_eq!(RowView::from(state.pool.row(slot)).items, snap.rows[0].items);
        assert_eq!(snap.rows[0].items.iter().position(|i| !i.is_empty() && i.is_correct()), correct);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut state = GameState::new(4, Settings::default());
        place_row(&mut state, 10.0);
        let json = serde_json::to_string(&state.snapshot()).unwrap();
        assert!(json.contains("\"warp_phase\":\"NONE\""));
        assert!(json.contains("\"rows\""));
    }
}
