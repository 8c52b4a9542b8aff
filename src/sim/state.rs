//! Game state and core simulation types
//!
//! Everything a tick reads or writes lives here. Presentation only ever sees
//! a [`Snapshot`](super::Snapshot) and the drained events.
//!
//! Hosts are expected to call [`GameState::drain_events`] and
//! [`GameState::flush_audio`] after every tick. Both queues hold at most
//! `EVENT_QUEUE_CAPACITY` entries and drop their oldest when a host falls
//! behind.

use std::collections::VecDeque;

use rand::SeedableRng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effects::{EffectMachine, PowerUpSet};
use super::events::{FloatingTextQueue, GameEvent, TextStyle};
use super::lanes::LaneTransition;
use super::pool::ObstaclePool;
use super::rule::{Rule, RuleHistory, RuleKind, generate_rule};
use super::spawn::{PracticeProgress, Spawner};
use super::warp::WarpState;
use crate::audio::{AudioCue, AudioSink, SoundEffect};
use crate::consts::*;
use crate::settings::Settings;
use crate::{clamp_lane, level_for_score};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Menu, settings or tutorial overlay; ticks are no-ops
    Paused,
    /// Run ended
    GameOver,
}

/// Score, lives and pacing. Read-only to presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progression {
    pub score: u64,
    /// `floor(score / 50) + 1`, recomputed every tick
    pub level: u32,
    /// Level whose lane policy has been applied (changes at set boundaries)
    pub applied_level: u32,
    pub lives: u32,
    /// Base row speed (track-percent per reference frame)
    pub speed: f32,
    pub lanes: usize,
    pub completed_sets: u32,
    /// Unpaused play time (ms)
    pub elapsed_ms: f64,
}

impl Progression {
    fn new(lanes: usize) -> Self {
        Self {
            score: 0,
            level: 1,
            applied_level: 1,
            lives: 0,
            speed: INITIAL_SPEED,
            lanes,
            completed_sets: 0,
            elapsed_ms: 0.0,
        }
    }
}

/// Rule currently shown in the HUD
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayedRule {
    pub rule: Rule,
    /// Rows of the shown set already behind the rider
    pub progress: u32,
    pub total: u32,
    /// Synonym shown instead of the color name under ALIAS
    pub alias_word: Option<&'static str>,
}

impl DisplayedRule {
    pub fn text(&self) -> &'static str {
        self.alias_word.unwrap_or(self.rule.target.name())
    }
}

/// Complete game state (deterministic for a given seed and input stream)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub pool: ObstaclePool,
    /// Rule new rows are hydrated with
    pub rule: Rule,
    pub(crate) history: RuleHistory,
    pub displayed: DisplayedRule,
    /// Decoy rule shown while an ALIAS respin is running
    pub(crate) spin_rule: Option<Rule>,
    pub player_lane: usize,
    pub effects: EffectMachine,
    pub warp: WarpState,
    pub lane_transition: LaneTransition,
    pub spawner: Spawner,
    pub practice: PracticeProgress,
    pub settings: Settings,
    /// Crate kinds that must never spawn, derived from settings
    pub(crate) disabled: PowerUpSet,
    pub phase: GamePhase,
    pub progress: Progression,
    /// Host timestamp of the previous tick (ms)
    pub(crate) last_timestamp: Option<f64>,
    pub floating_text: FloatingTextQueue,
    events: VecDeque<GameEvent>,
    audio: VecDeque<AudioCue>,
    /// Simulation tick counter (advancing ticks only)
    pub time_ticks: u64,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64, settings: Settings) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let practice = settings.practice;
        let first_kind = practice.forced_rule_kind().unwrap_or(RuleKind::MatchColor);
        let rule = generate_rule(&mut rng, None, Some(first_kind));
        let spawner = Spawner::new(&mut rng);
        let lanes = practice.starting_lanes();

        log::info!(
            "New run: seed={seed}, practice={}, lanes={lanes}",
            practice.mode.as_str()
        );

        let mut state = Self {
            seed,
            rng,
            pool: ObstaclePool::new(),
            rule,
            history: RuleHistory::new(rule.kind),
            displayed: DisplayedRule {
                rule,
                progress: 0,
                total: OBSTACLES_PER_SET,
                alias_word: None,
            },
            spin_rule: None,
            player_lane: 1.min(lanes - 1),
            effects: EffectMachine::new(),
            warp: WarpState::new(),
            lane_transition: LaneTransition::default(),
            spawner,
            practice: PracticeProgress::default(),
            disabled: settings.disabled_crates(),
            settings,
            phase: GamePhase::Playing,
            progress: Progression::new(lanes),
            last_timestamp: None,
            floating_text: FloatingTextQueue::new(),
            events: VecDeque::with_capacity(EVENT_QUEUE_CAPACITY),
            audio: VecDeque::with_capacity(EVENT_QUEUE_CAPACITY),
            time_ticks: 0,
        };

        state.emit(GameEvent::LevelChanged { level: 1 });
        state.emit(GameEvent::RuleChanged {
            rule,
            display_text: rule.target.name().to_string(),
        });
        state.cue(AudioCue::RuleTheme {
            word: rule.kind == RuleKind::MatchWord,
        });
        state
    }

    /// Replace settings mid-run (crate toggles, haptics)
    pub fn apply_settings(&mut self, settings: Settings) {
        self.disabled = settings.disabled_crates();
        self.settings = settings;
    }

    /// Move to an absolute lane. Out-of-range requests clamp; under DYSLEXIA
    /// the request is mirrored.
    pub fn set_player_lane(&mut self, lane: i32) {
        if self.phase != GamePhase::Playing {
            return;
        }
        let lanes = self.progress.lanes;
        let lane = if self.effects.state().flags().lanes_inverted {
            lanes as i32 - 1 - lane
        } else {
            lane
        };
        self.player_lane = clamp_lane(lane, lanes);
    }

    /// Move one or more lanes left (negative) or right (positive)
    pub fn step_lane(&mut self, delta: i32) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.player_lane = clamp_lane(self.player_lane as i32 + delta, self.progress.lanes);
    }

    pub fn pause(&mut self) {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
            self.haptic(HAPTIC_PAUSE_MS);
            log::debug!("Paused at tick {}", self.time_ticks);
        }
    }

    pub fn resume(&mut self) {
        if self.phase == GamePhase::Paused {
            self.phase = GamePhase::Playing;
            log::debug!("Resumed at tick {}", self.time_ticks);
        }
    }

    /// Menu or settings overlay opened/closed
    pub fn set_menu_paused(&mut self, paused: bool) {
        if paused { self.pause() } else { self.resume() }
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain(..).collect()
    }

    /// Peek at pending events without draining
    pub fn pending_events(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }

    /// Send queued audio cues to the host's sink
    pub fn flush_audio(&mut self, sink: &mut dyn AudioSink) {
        for cue in self.audio.drain(..) {
            sink.dispatch(cue);
        }
    }

    /// Row speed after SPEED and reverse-run modifiers
    pub fn effective_speed(&self) -> f32 {
        self.progress.speed
            * self.effects.state().flags().speed_multiplier
            * self.warp.speed_multiplier()
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        if self.events.len() == EVENT_QUEUE_CAPACITY {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub(crate) fn cue(&mut self, cue: AudioCue) {
        if self.audio.len() == EVENT_QUEUE_CAPACITY {
            self.audio.pop_front();
        }
        self.audio.push_back(cue);
    }

    pub(crate) fn play(&mut self, effect: SoundEffect) {
        self.cue(AudioCue::Play(effect));
    }

    pub(crate) fn haptic(&mut self, ms: u32) {
        if self.settings.haptics {
            self.emit(GameEvent::HapticPulse { ms });
        }
    }

    pub(crate) fn float_text(&mut self, lane: usize, y: f32, text: String, style: TextStyle) {
        let entry = self.floating_text.push(lane, y, text, style);
        self.emit(GameEvent::FloatingText(entry));
    }

    /// Add points; crossing a multiple of 50 grants a life
    pub(crate) fn add_score(&mut self, points: u32) {
        let old = self.progress.score;
        self.progress.score += points as u64;
        self.emit(GameEvent::ScoreChanged {
            score: self.progress.score,
            delta: points,
        });
        if level_for_score(self.progress.score) > level_for_score(old) {
            self.progress.lives += 1;
            self.emit(GameEvent::LifeGained {
                lives: self.progress.lives,
            });
            self.play(SoundEffect::LifeUp);
            log::debug!("Extra life at score {}", self.progress.score);
        }
    }

    /// Random synonym for the ALIAS HUD
    pub(crate) fn pick_alias(&mut self, rule: Rule) -> Option<&'static str> {
        rule.target.aliases().choose(&mut self.rng).copied()
    }
}
